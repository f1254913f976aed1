//! Wires config, the ad gate and the entitlement store together
//!
//! The premium store pushes every entitlement change into the gate's shared
//! flag, so the two never disagree about whether an ad is due.

use anyhow::Result;
use colored::Colorize;
use pindrop_core::premium::{
    FileTokenStore, HttpAuthority, MemoryTokenStore, TokenStore, VerificationAuthority,
};
use pindrop_core::{
    AdManager, DownloadAction, GateOutcome, MediaKind, PindropConfig, PlanCatalog, PremiumManager,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub type SessionPremium = PremiumManager<Box<dyn TokenStore>>;

pub struct Session {
    pub config: PindropConfig,
    pub gate: AdManager,
    pub premium: SessionPremium,
}

/// Resolves config: `.pindrop.toml` upward from the cwd, then the
/// environment, then `--api`.
pub fn load_config(cli: &crate::Cli) -> Result<PindropConfig> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| Path::new(".").to_path_buf());
    let mut config = PindropConfig::find_and_load(&cwd)?.with_env_overrides();
    if let Some(ref api) = cli.api {
        config.api.base_url = api.trim_end_matches('/').to_string();
    }
    Ok(config)
}

/// Token store in the user config dir. Without one, premium status lives
/// only as long as the process.
pub fn default_store() -> Box<dyn TokenStore> {
    match FileTokenStore::in_config_dir() {
        Some(store) => Box::new(store),
        None => {
            eprintln!(
                "  {}: no config directory; premium status will not be saved",
                "warn".yellow()
            );
            Box::new(MemoryTokenStore::new())
        }
    }
}

impl Session {
    /// Builds the session and starts verifying any stored token.
    pub fn build(
        config: PindropConfig,
        authority: Arc<dyn VerificationAuthority>,
        store: Box<dyn TokenStore>,
    ) -> Result<Self> {
        let gate = AdManager::new(config.ads.frequency_table()?, config.ads.timing());
        let catalog = PlanCatalog::new(config.payment.monthly_plan_code.clone());
        let mut premium = PremiumManager::new(authority, store, catalog)
            .with_public_key(config.payment.public_key.clone());
        premium.attach_flag(gate.entitlement_flag());
        premium.bootstrap();
        debug!(entitled = premium.is_entitled(), "session ready");

        Ok(Self {
            config,
            gate,
            premium,
        })
    }

    pub fn open(cli: &crate::Cli) -> Result<Self> {
        let config = load_config(cli)?;
        let authority = HttpAuthority::new(
            &config.api.base_url,
            Duration::from_secs(config.api.timeout_secs),
        )?;
        Self::build(config, Arc::new(authority), default_store())
    }

    /// Gates a download against the latest entitlement. Any verification
    /// that finished since the last poll is applied first.
    pub fn gate_download(&mut self, kind: MediaKind, action: DownloadAction) -> GateOutcome {
        self.premium.poll();
        self.gate.gate_download(kind, action)
    }

    /// Waits up to the API timeout for the startup verification.
    pub fn settle(&mut self) -> bool {
        let timeout = Duration::from_secs(self.config.api.timeout_secs.max(1));
        self.premium.settle(timeout)
    }
}
