//! History command: list or prune recent downloads

use anyhow::{bail, Result};
use colored::Colorize;

use crate::history::History;

pub fn run(clear: bool, remove: Option<u64>) -> Result<()> {
    let Some(mut history) = History::load_default() else {
        bail!("no config directory available for download history");
    };

    if clear {
        history.clear()?;
        eprintln!("  {} History cleared.", "\u{2713}".green());
        return Ok(());
    }

    if let Some(ts) = remove {
        if history.remove(ts)? {
            eprintln!("  {} Removed entry {}.", "\u{2713}".green(), ts);
        } else {
            eprintln!("  {} No entry with timestamp {}.", "!".yellow(), ts);
        }
        return Ok(());
    }

    if history.entries().is_empty() {
        eprintln!("  {}", "No downloads yet.".dimmed());
        return Ok(());
    }

    for entry in history.entries() {
        let title = entry.title.as_deref().unwrap_or(entry.url.as_str());
        eprintln!(
            "  {}  {:<5}  {}",
            entry.timestamp.to_string().dimmed(),
            entry.kind.label().cyan(),
            title
        );
        if let Some(ref file) = entry.file {
            eprintln!("  {:>13}  {:<5}  {}", "", "", file.dimmed());
        }
    }
    eprintln!();
    Ok(())
}
