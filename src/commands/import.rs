//! Import - run terraformer against a live cloud account
//!
//! Importing every resource type is only done when asked for with `--all`;
//! a `*` hidden inside a `--resources` filter is refused.

use anyhow::{Context as _, Result, bail};
use tfstate::import::ALL_RESOURCES;
use tfstate::{ImportBackend, ImportRequest, ImportStatus};

use crate::Context;
use crate::cli::ImportArgs;
use crate::config::Config;
use crate::ui;

pub fn run(ctx: &Context, args: ImportArgs) -> Result<()> {
    let config = Config::load()?;
    let json = args.json;
    let request = build_request(args, &config)?;

    let backend = config.terraformer_backend();
    if !backend.is_available() {
        ui::warn(&format!(
            "{} not found at {}",
            backend.name(),
            backend.binary().display()
        ));
    }

    if !json && !ctx.quiet {
        ui::info(&format!(
            "Importing {} resources ({}) in {} into {}",
            request.cloud,
            request.resources,
            request.regions,
            request.output.display()
        ));
    }

    let report = tfstate::import_deployed_resources(&backend, &request);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in report.stdout.lines() {
            ui::dim(line);
        }
        if report.status == ImportStatus::Error {
            for line in report.stderr.lines() {
                ui::error(line);
            }
        }
    }

    if report.status == ImportStatus::Error {
        bail!("Import failed");
    }

    if !json {
        ui::success(&format!(
            "State files written to {}",
            request.output.display()
        ));
    }
    Ok(())
}

/// Turn CLI arguments and config defaults into a request.
fn build_request(args: ImportArgs, config: &Config) -> Result<ImportRequest> {
    let resources = if args.all {
        ALL_RESOURCES.to_string()
    } else {
        args.resources
            .filter(|r| !r.trim().is_empty())
            .context("No resource filter given; pass --resources or --all")?
    };

    let regions = args
        .regions
        .or_else(|| config.regions.clone())
        .context("No regions given; pass --regions or set `regions` in the config")?;
    let cloud = args.cloud.unwrap_or_else(|| config.cloud.clone());

    let request = ImportRequest::new(cloud, resources, regions, args.output);
    if request.is_unscoped() && !args.all {
        bail!("`{ALL_RESOURCES}` in --resources imports everything; use --all to ask for that");
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(resources: Option<&str>, all: bool, regions: Option<&str>) -> ImportArgs {
        ImportArgs {
            cloud: None,
            resources: resources.map(str::to_string),
            all,
            regions: regions.map(str::to_string),
            output: PathBuf::from("/out"),
            json: false,
        }
    }

    #[test]
    fn test_filter_with_config_defaults() {
        let config = Config {
            regions: Some("eu-west-1".to_string()),
            ..Config::default()
        };
        let request = build_request(args(Some("ec2,s3"), false, None), &config).unwrap();
        assert_eq!(
            request,
            ImportRequest::new("aws", "ec2,s3", "eu-west-1", "/out")
        );
    }

    #[test]
    fn test_all_sends_wildcard() {
        let request =
            build_request(args(None, true, Some("us-east-1")), &Config::default()).unwrap();
        assert_eq!(request.resources, "*");
        assert!(request.is_unscoped());
    }

    #[test]
    fn test_wildcard_in_filter_is_refused() {
        let err = build_request(args(Some("ec2,*"), false, Some("us-east-1")), &Config::default())
            .unwrap_err();
        assert!(err.to_string().contains("--all"));
    }

    #[test]
    fn test_regions_required() {
        assert!(build_request(args(Some("ec2"), false, None), &Config::default()).is_err());
    }
}
