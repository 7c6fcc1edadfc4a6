//! Imported - merge the state files terraformer generated under a directory

use anyhow::{Context as _, Result};
use colored::Colorize;
use std::thread;
use std::time::Duration;
use tfstate::{AggregatedState, CancelToken, Collector, ModuleScope, NoProgress};

use crate::Context;
use crate::cli::ImportedArgs;
use crate::config::Config;
use crate::progress::ScanBar;
use crate::ui;

pub fn run(ctx: &Context, args: ImportedArgs) -> Result<()> {
    let config = Config::load()?;

    let cancel = CancelToken::new();
    let mut options = config.scan_options().with_cancel(cancel.clone());
    if args.all_modules {
        options = options.with_modules(ModuleScope::All);
    }

    if let Some(secs) = args.timeout {
        arm_timeout(cancel, Duration::from_secs(secs));
    }

    let collector = Collector::new(options);
    let scanned = if args.json || ctx.quiet {
        collector.scan_with_progress(&args.root, &mut NoProgress)
    } else {
        collector.scan_with_progress(&args.root, &mut ScanBar::new())
    };
    let state = scanned
        .inspect_err(super::hint)
        .with_context(|| format!("Failed to scan {}", args.root.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state.to_json())?);
        return Ok(());
    }

    print_state(ctx, &args, &state);
    Ok(())
}

/// Cancel the scan from a timer thread.
fn arm_timeout(cancel: CancelToken, after: Duration) {
    thread::spawn(move || {
        thread::sleep(after);
        log::debug!("Scan timeout of {}s reached", after.as_secs());
        cancel.cancel();
    });
}

fn print_state(ctx: &Context, args: &ImportedArgs, state: &AggregatedState) {
    ui::header(&format!("Imported state: {}", args.root.display()));

    if state.files_scanned == 0 && !state.cancelled {
        ui::info("No state files found");
    }

    if ctx.verbose > 0 && !state.is_empty() {
        println!();
        for (key, record) in &state.resources {
            println!("  {} {}", key, record.resource_type.dimmed());
        }
    }

    if !state.is_empty() {
        ui::section("Types");
        for (resource_type, n) in state.type_counts() {
            ui::kv(&resource_type, &n.to_string());
        }
    }

    if !state.overwrites.is_empty() {
        ui::section("Overwritten");
        for overwrite in &state.overwrites {
            ui::dim(&format!(
                "{}: {} replaced by {}",
                overwrite.key,
                overwrite.replaced.display(),
                overwrite.replaced_by.display()
            ));
        }
    }

    if !state.diagnostics.is_empty() {
        ui::section("Diagnostics");
        for diagnostic in &state.diagnostics {
            ui::warn(&format!("[{}] {}", diagnostic.kind, diagnostic));
        }
    }

    println!();
    let summary = format!(
        "{} from {}",
        ui::count(state.len(), "resource"),
        ui::count(state.files_scanned, "file")
    );
    if state.cancelled {
        ui::warn(&format!("Scan cancelled: {summary}"));
    } else {
        ui::success(&summary);
    }
}
