//! Baseline - the last-deployed resource list from one state file

use anyhow::{Context as _, Result};
use colored::Colorize;

use crate::Context;
use crate::cli::BaselineArgs;
use crate::ui;

pub fn run(ctx: &Context, args: BaselineArgs) -> Result<()> {
    let baseline = tfstate::read_baseline(&args.path)
        .inspect_err(super::hint)
        .with_context(|| format!("Failed to read baseline {}", args.path.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&baseline.to_json())?);
        return Ok(());
    }

    ui::header(&format!("Baseline: {}", baseline.path.display()));

    if baseline.is_empty() {
        ui::info("No resources declared");
        return Ok(());
    }

    if ctx.verbose > 0 {
        println!();
        for record in &baseline.resources {
            println!("  {} {}", record.key, record.resource_type.dimmed());
        }
    }

    ui::section("Types");
    for (resource_type, n) in baseline.type_counts() {
        ui::kv(&resource_type, &n.to_string());
    }

    println!();
    ui::success(&ui::count(baseline.len(), "resource"));
    Ok(())
}
