//! Simulate command: run gated downloads with no network fetch
//!
//! Useful for checking ad frequency settings: each kind is gated in order
//! and the released "download" just prints its position.

use anyhow::Result;
use colored::Colorize;
use pindrop_core::{GateOutcome, MediaKind};

use crate::host::{Host, OverlayEnd};
use crate::session::Session;

pub fn run(kinds: &[MediaKind], fast: bool, cli: &crate::Cli) -> Result<()> {
    let mut session = Session::open(cli)?;
    let host = Host::new(true)?;
    let mut ads = 0u32;

    eprintln!(
        "{}",
        format!("  pindrop v{} — simulate", pindrop_core::VERSION).bold()
    );
    if session.premium.is_entitled() {
        eprintln!("  {}", "Premium active: no ads will be shown.".green());
    }
    eprintln!();

    for (i, &kind) in kinds.iter().enumerate() {
        if !host.is_running() {
            break;
        }
        let n = i + 1;
        let outcome = session.gate_download(
            kind,
            Box::new(move || {
                eprintln!("  {} #{} {}", "\u{2713}".green(), n, kind.label());
            }),
        );

        if outcome == GateOutcome::Deferred {
            ads += 1;
            eprintln!("  {} #{} {} gated by an ad", "\u{25b6}".yellow(), n, kind.label());
            if host.run_overlay(&mut session, fast) == OverlayEnd::Interrupted {
                eprintln!("  {}", "Interrupted.".dimmed());
                break;
            }
        }
    }

    eprintln!();
    eprintln!(
        "  {}: {} downloads, {} ads",
        "Summary".bold(),
        session.gate.total_downloads(),
        ads
    );
    for kind in MediaKind::ALL {
        let every = session.gate.frequency().every(kind);
        eprintln!(
            "    {:<5} {:>3}  {}",
            kind.label(),
            session.gate.download_count(kind),
            format!("(ad every {})", every).dimmed()
        );
    }
    eprintln!();
    Ok(())
}
