//! Download command: fetch pins through the ad gate

use anyhow::Result;
use colored::Colorize;
use pindrop_core::{GateOutcome, MediaKind};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiClient;
use crate::history::{now_millis, History, HistoryEntry};
use crate::host::{Host, OverlayEnd};
use crate::progress::Step;
use crate::session::Session;

type Slot = Rc<RefCell<Option<Result<PathBuf>>>>;

pub fn run(
    urls: &[String],
    output: Option<&Path>,
    kind_override: Option<MediaKind>,
    fast: bool,
    cli: &crate::Cli,
) -> Result<()> {
    let mut session = Session::open(cli)?;
    let host = Host::new(true)?;
    let client = Rc::new(ApiClient::new(
        &session.config.api.base_url,
        Duration::from_secs(session.config.api.timeout_secs),
    )?);
    let dir = output.unwrap_or_else(|| Path::new(".")).to_path_buf();
    let mut history = History::load_default();
    let mut failures = 0usize;
    let running = host.running_flag();

    for url in urls {
        if !host.is_running() {
            break;
        }

        let step = Step::new("Analyzing pin");
        let media = match client.analyze(url) {
            Ok(m) => {
                step.finish(m.kind().label());
                m
            }
            Err(e) => {
                step.fail(&e);
                failures += 1;
                continue;
            }
        };
        // Ctrl-C during the lookup takes effect once it returns.
        if !host.is_running() {
            eprintln!("  {}", "Stopped.".dimmed());
            break;
        }
        let kind = kind_override.unwrap_or_else(|| media.kind());

        let slot: Slot = Rc::new(RefCell::new(None));
        let action = {
            let slot = Rc::clone(&slot);
            let client = Rc::clone(&client);
            let media = media.clone();
            let dir = dir.clone();
            let running = Arc::clone(&running);
            Box::new(move || {
                let step = Step::new(format!("Downloading {}", kind.label()));
                let result = client.download(&media, kind, &dir, &running);
                match result {
                    Ok(ref path) => step.finish(&path.display().to_string()),
                    Err(ref e) => step.fail(e),
                }
                *slot.borrow_mut() = Some(result);
            })
        };

        if session.gate_download(kind, action) == GateOutcome::Deferred {
            eprintln!(
                "  {} (Ctrl-C to cancel)",
                "A short ad plays before this download.".yellow()
            );
            match host.run_overlay(&mut session, fast) {
                OverlayEnd::Interrupted => {
                    eprintln!("  {}", "Download cancelled.".dimmed());
                    break;
                }
                OverlayEnd::Completed | OverlayEnd::Skipped => {}
            }
            if !session.premium.is_entitled() {
                eprintln!(
                    "  {} {}",
                    "Go ad-free:".dimmed(),
                    "pindrop premium upgrade".bold()
                );
            }
        }

        match slot.borrow_mut().take() {
            Some(Ok(path)) => {
                if let Some(ref mut h) = history {
                    let entry = HistoryEntry {
                        url: url.trim().to_string(),
                        kind,
                        title: media.title.clone(),
                        file: Some(path.display().to_string()),
                        timestamp: now_millis(),
                    };
                    if let Err(e) = h.record(entry) {
                        tracing::warn!(error = %e, "could not update download history");
                    }
                }
            }
            Some(Err(_)) => failures += 1,
            None => {}
        }
        eprintln!();
    }

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
