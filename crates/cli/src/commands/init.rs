//! Initialize .pindrop.toml configuration

use anyhow::Result;
use colored::Colorize;
use pindrop_core::config::CONFIG_FILENAME;
use pindrop_core::PindropConfig;
use std::path::Path;

pub fn run(path: Option<&Path>) -> Result<()> {
    let target_path = path.unwrap_or_else(|| Path::new("."));
    let config_path = target_path.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "  {} {} already exists at {}",
            "!".yellow(),
            CONFIG_FILENAME,
            config_path.display()
        );
        return Ok(());
    }

    PindropConfig::default().save(&config_path)?;

    eprintln!(
        "  {} Created {} at {}",
        "\u{2713}".green(),
        CONFIG_FILENAME,
        config_path.display()
    );
    eprintln!();
    eprintln!("  Set {} to enable checkout, then run:", "payment.public_key".bold());
    eprintln!("    {}", "pindrop download <PIN_URL>".bold());

    Ok(())
}
