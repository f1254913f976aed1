//! Ad gate: decides whether a timed overlay runs before a download
//!
//! Every gated download bumps a per-kind counter. Free users get an overlay
//! on every Nth download of a kind; entitled users always pass straight
//! through. The entitlement is read through a shared cell on every call, so
//! an upgrade mid-session takes effect on the very next download.

use crate::countdown::{Countdown, Tick};
use crate::media::MediaKind;
use anyhow::{bail, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Deferred download work released by the gate.
pub type DownloadAction = Box<dyn FnOnce() + 'static>;

/// Live-read entitlement cell shared between the entitlement store (writer)
/// and the ad gate (reader).
#[derive(Debug, Clone, Default)]
pub struct EntitlementFlag(Arc<AtomicBool>);

impl EntitlementFlag {
    pub fn new(entitled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(entitled)))
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self, entitled: bool) {
        self.0.store(entitled, Ordering::SeqCst);
    }
}

/// "Show an ad on every Nth download" per media kind. N is always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdFrequencyTable {
    video: u32,
    image: u32,
    gif: u32,
}

impl AdFrequencyTable {
    pub fn new(video: u32, image: u32, gif: u32) -> Result<Self> {
        if video == 0 || image == 0 || gif == 0 {
            bail!("ad frequency must be at least 1 for every media kind");
        }
        Ok(Self { video, image, gif })
    }

    pub fn every(&self, kind: MediaKind) -> u32 {
        match kind {
            MediaKind::Video => self.video,
            MediaKind::Image => self.image,
            MediaKind::Gif => self.gif,
        }
    }
}

impl Default for AdFrequencyTable {
    fn default() -> Self {
        Self {
            video: 2,
            image: 3,
            gif: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdTiming {
    pub total_seconds: u32,
    pub skip_after_seconds: u32,
}

impl Default for AdTiming {
    fn default() -> Self {
        Self {
            total_seconds: 15,
            skip_after_seconds: 5,
        }
    }
}

/// Snapshot of the overlay for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdOverlayState {
    pub visible: bool,
    pub remaining_seconds: u32,
    pub skippable: bool,
    pub kind: Option<MediaKind>,
}

/// What `gate_download` did with the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Entitled user: the action ran immediately.
    Bypassed,
    /// No ad due: the action ran immediately.
    Released,
    /// An overlay started, or was queued behind the one showing; the action
    /// runs when that overlay completes or is skipped.
    Deferred,
}

struct Overlay {
    kind: MediaKind,
    countdown: Countdown,
    pending: Option<DownloadAction>,
}

pub struct AdManager {
    frequency: AdFrequencyTable,
    timing: AdTiming,
    counters: HashMap<MediaKind, u64>,
    entitlement: EntitlementFlag,
    overlay: Option<Overlay>,
    /// Due ads waiting for the current overlay to close, oldest first.
    queued: VecDeque<(MediaKind, DownloadAction)>,
}

impl AdManager {
    pub fn new(frequency: AdFrequencyTable, timing: AdTiming) -> Self {
        Self {
            frequency,
            timing: AdTiming {
                total_seconds: timing.total_seconds.max(1),
                skip_after_seconds: timing.skip_after_seconds,
            },
            counters: HashMap::new(),
            entitlement: EntitlementFlag::default(),
            overlay: None,
            queued: VecDeque::new(),
        }
    }

    /// Gates `action` behind an ad when one is due for `kind`.
    ///
    /// The counter always increments first. Actions must not call back into
    /// this manager.
    pub fn gate_download(&mut self, kind: MediaKind, action: DownloadAction) -> GateOutcome {
        let count = {
            let c = self.counters.entry(kind).or_insert(0);
            *c += 1;
            *c
        };

        if self.entitlement.get() {
            debug!(%kind, count, "download bypasses ads (premium)");
            action();
            return GateOutcome::Bypassed;
        }

        let needs_ad = count % u64::from(self.frequency.every(kind)) == 0;
        if !needs_ad {
            action();
            return GateOutcome::Released;
        }

        if self.overlay.is_some() {
            debug!(%kind, count, queued = self.queued.len() + 1, "ad due while showing, queued");
            self.queued.push_back((kind, action));
        } else {
            self.show(kind, action);
            info!(%kind, count, "ad overlay shown");
        }
        GateOutcome::Deferred
    }

    /// Advances the overlay by one second. Returns `true` if this tick
    /// completed the countdown and released the pending action.
    pub fn tick(&mut self) -> bool {
        let finished = match self.overlay.as_mut() {
            Some(overlay) => overlay.countdown.tick() == Tick::Finished,
            None => false,
        };
        if !finished {
            return false;
        }

        let action = self.close_overlay();
        info!("ad overlay completed");
        if let Some(action) = action {
            action();
        }
        self.show_next();
        true
    }

    /// Skips the overlay if it is skippable. Returns `true` if the pending
    /// action was released by this call.
    pub fn skip_ad(&mut self) -> bool {
        let skippable = self
            .overlay
            .as_ref()
            .is_some_and(|o| o.countdown.is_skippable());
        if !skippable {
            return false;
        }

        // Hidden state is committed before the action runs.
        let action = self.close_overlay();
        info!("ad skipped");
        if let Some(action) = action {
            action();
        }
        self.show_next();
        true
    }

    /// Cancels any running overlay and drops every queued one without
    /// releasing their actions.
    pub fn teardown(&mut self) {
        if let Some(mut overlay) = self.overlay.take() {
            overlay.countdown.cancel();
            debug!(kind = %overlay.kind, dropped = self.queued.len(), "ad overlay torn down");
        }
        self.queued.clear();
    }

    /// Updates the live entitlement read by the next `gate_download`.
    pub fn set_entitlement(&self, entitled: bool) {
        self.entitlement.set(entitled);
    }

    /// Shared handle to the entitlement cell, for the entitlement store to push into.
    pub fn entitlement_flag(&self) -> EntitlementFlag {
        self.entitlement.clone()
    }

    pub fn is_entitled(&self) -> bool {
        self.entitlement.get()
    }

    pub fn is_showing(&self) -> bool {
        self.overlay.is_some()
    }

    /// Due ads waiting behind the one showing.
    pub fn queued_ads(&self) -> usize {
        self.queued.len()
    }

    pub fn overlay_state(&self) -> AdOverlayState {
        match &self.overlay {
            Some(o) => AdOverlayState {
                visible: true,
                remaining_seconds: o.countdown.remaining(),
                skippable: o.countdown.is_skippable(),
                kind: Some(o.kind),
            },
            None => AdOverlayState {
                visible: false,
                remaining_seconds: self.timing.total_seconds,
                skippable: false,
                kind: None,
            },
        }
    }

    /// Seconds until the overlay becomes skippable (zero when hidden or skippable).
    pub fn skip_in(&self) -> u32 {
        self.overlay
            .as_ref()
            .map(|o| o.countdown.skip_in())
            .unwrap_or(0)
    }

    pub fn download_count(&self, kind: MediaKind) -> u64 {
        self.counters.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_downloads(&self) -> u64 {
        self.counters.values().sum()
    }

    pub fn timing(&self) -> AdTiming {
        self.timing
    }

    pub fn frequency(&self) -> AdFrequencyTable {
        self.frequency
    }

    fn show(&mut self, kind: MediaKind, action: DownloadAction) {
        self.overlay = Some(Overlay {
            kind,
            countdown: Countdown::start(self.timing.total_seconds, self.timing.skip_after_seconds),
            pending: Some(action),
        });
    }

    /// Promotes the oldest queued ad. Entitlement gained meanwhile releases
    /// the whole queue instead.
    fn show_next(&mut self) {
        if self.overlay.is_some() {
            return;
        }
        if self.entitlement.get() {
            while let Some((kind, action)) = self.queued.pop_front() {
                debug!(%kind, "queued ad bypassed (premium)");
                action();
            }
            return;
        }
        if let Some((kind, action)) = self.queued.pop_front() {
            info!(%kind, "queued ad overlay shown");
            self.show(kind, action);
        }
    }

    fn close_overlay(&mut self) -> Option<DownloadAction> {
        let mut overlay = self.overlay.take()?;
        overlay.countdown.cancel();
        overlay.pending.take()
    }
}

impl Default for AdManager {
    fn default() -> Self {
        Self::new(AdFrequencyTable::default(), AdTiming::default())
    }
}

impl Drop for AdManager {
    fn drop(&mut self) {
        self.teardown();
    }
}
