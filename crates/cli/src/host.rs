//! Terminal host for the ad overlay
//!
//! Drives the gate's countdown once per second, turns Enter into a skip
//! request and tears the overlay down on Ctrl-C. Background verification
//! results are applied on every loop turn so an upgrade finishing elsewhere
//! is reflected before the next download.

use crate::progress::AdBar;
use crate::session::Session;
use anyhow::Result;
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEnd {
    /// Countdown reached zero and the download was released.
    Completed,
    /// The user skipped and the download was released.
    Skipped,
    /// Ctrl-C: the overlay was torn down and the download dropped.
    Interrupted,
}

pub struct Host {
    running: Arc<AtomicBool>,
    input: Option<Receiver<()>>,
}

impl Host {
    /// Installs the Ctrl-C handler. With `interactive`, each line on stdin
    /// becomes a skip request.
    pub fn new(interactive: bool) -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let r = running.clone();
        ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
        })?;

        let input = interactive.then(spawn_stdin_pump);
        Ok(Self { running, input })
    }

    /// No signal handler and no input; the countdown always runs out.
    pub fn headless() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            input: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Shared Ctrl-C flag, for work that runs outside the overlay loop.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Runs the showing overlay, and any queued behind it, to the end. With
    /// `fast`, every loop turn is one countdown second.
    pub fn run_overlay(&self, session: &mut Session, fast: bool) -> OverlayEnd {
        let mut end = OverlayEnd::Completed;
        while session.gate.is_showing() {
            end = self.run_one(session, fast);
            if end == OverlayEnd::Interrupted {
                break;
            }
        }
        end
    }

    fn run_one(&self, session: &mut Session, fast: bool) -> OverlayEnd {
        let bar = AdBar::new(session.gate.timing().total_seconds);
        bar.update(&session.gate.overlay_state(), session.gate.skip_in());

        // Enter pressed before the overlay appeared is not a skip.
        if let Some(ref rx) = self.input {
            while rx.try_recv().is_ok() {}
        }

        let second = if fast {
            Duration::ZERO
        } else {
            Duration::from_secs(1)
        };
        let mut last_tick = Instant::now();

        let end = loop {
            if !self.is_running() {
                session.gate.teardown();
                break OverlayEnd::Interrupted;
            }
            session.premium.poll();

            let wait = second.saturating_sub(last_tick.elapsed()).min(POLL_INTERVAL);
            if self.wait_for_input(wait) && session.gate.skip_ad() {
                break OverlayEnd::Skipped;
            }

            if last_tick.elapsed() >= second {
                last_tick = Instant::now();
                if session.gate.tick() {
                    break OverlayEnd::Completed;
                }
                bar.update(&session.gate.overlay_state(), session.gate.skip_in());
            }
        };

        bar.finish();
        debug!(?end, "ad overlay ended");
        end
    }

    fn wait_for_input(&self, wait: Duration) -> bool {
        match self.input {
            Some(ref rx) => match rx.recv_timeout(wait) {
                Ok(()) => true,
                Err(RecvTimeoutError::Timeout) => false,
                Err(RecvTimeoutError::Disconnected) => {
                    std::thread::sleep(wait);
                    false
                }
            },
            None => {
                if !wait.is_zero() {
                    std::thread::sleep(wait);
                }
                false
            }
        }
    }
}

fn spawn_stdin_pump() -> Receiver<()> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            if line.is_err() || tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}
