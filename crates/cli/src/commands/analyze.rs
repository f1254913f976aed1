//! Analyze command: look up the media behind a pin without downloading

use anyhow::Result;
use colored::Colorize;
use std::time::Duration;

use crate::api::{ApiClient, MediaInfo};
use crate::progress::Step;
use crate::session::load_config;

pub fn run(url: &str, cli: &crate::Cli) -> Result<()> {
    let config = load_config(cli)?;
    let client = ApiClient::new(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_secs),
    )?;

    let step = Step::new("Analyzing pin");
    match client.analyze(url) {
        Ok(media) => {
            step.finish(media.kind().label());
            eprintln!();
            print_media(&media);
            Ok(())
        }
        Err(e) => {
            step.fail(&e);
            std::process::exit(1);
        }
    }
}

pub(crate) fn print_media(media: &MediaInfo) {
    let kind = media.kind();
    eprintln!("  {}: {}", "Type".bold(), kind.label().cyan());
    if let Some(ref title) = media.title {
        eprintln!("  {}: {}", "Title".bold(), title);
    }
    if let (Some(w), Some(h)) = (media.width, media.height) {
        eprintln!("  {}: {}x{}", "Size".bold(), w, h);
    }
    eprintln!("  {}: {}", "Source".bold(), media.url.dimmed());
    if let Some(ref thumb) = media.thumbnail {
        eprintln!("  {}: {}", "Thumbnail".bold(), thumb.dimmed());
    }
    eprintln!();
}
