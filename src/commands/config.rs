use anyhow::Result;

use crate::config::Config;
use crate::ui;
use tfstate::ImportBackend;

pub fn run() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load()?;

    ui::header("Configuration");
    ui::kv("Config file", &path.display().to_string());
    if !path.exists() {
        ui::dim("Not found, using defaults");
    }

    let backend = config.terraformer_backend();
    let status = if backend.is_available() {
        "found"
    } else {
        "missing"
    };
    ui::kv(
        "terraformer",
        &format!("{} ({status})", backend.binary().display()),
    );

    ui::section("Effective settings");
    println!();
    for line in config.to_toml()?.lines() {
        println!("  {line}");
    }
    Ok(())
}
