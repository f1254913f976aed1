//! PinDrop Core - download gating and premium entitlement
//!
//! This crate provides the state machines behind the PinDrop downloader:
//! - Per-kind download counters and the timed, skippable ad overlay
//! - The premium entitlement store, reconciled against the backend
//! - Plan pricing and `.pindrop.toml` configuration

pub mod ad_gate;
pub mod config;
pub mod countdown;
pub mod media;
pub mod plans;
pub mod premium;

pub use ad_gate::{
    AdFrequencyTable, AdManager, AdOverlayState, AdTiming, DownloadAction, EntitlementFlag,
    GateOutcome,
};
pub use config::PindropConfig;
pub use countdown::{Countdown, Tick};
pub use media::MediaKind;
pub use plans::{Plan, PlanCatalog, PlanId};
pub use premium::{PremiumError, PremiumManager, PremiumState};

/// PinDrop version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
