//! Core types for the premium/entitlement system

use crate::plans::PlanId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Monthly records older than this are not trusted optimistically (32 days).
pub const MONTHLY_HINT_TTL_SECS: u64 = 32 * 24 * 60 * 60;

/// A server-issued entitlement. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementRecord {
    pub plan: PlanId,
    pub email: String,
    pub issued_at: u64,
    /// Opaque signed token; only the server can judge it.
    pub token: String,
}

impl EntitlementRecord {
    pub fn meta(&self) -> EntitlementMeta {
        EntitlementMeta {
            plan: self.plan,
            email: self.email.clone(),
            issued_at: self.issued_at,
        }
    }

    /// Whether the persisted hint is still fresh enough to show as premium
    /// before the server has answered.
    pub fn is_fresh_hint(&self, now: u64) -> bool {
        match self.plan {
            PlanId::Lifetime => true,
            PlanId::Monthly => now.saturating_sub(self.issued_at) <= MONTHLY_HINT_TTL_SECS,
        }
    }
}

/// Display-only metadata persisted next to the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementMeta {
    pub plan: PlanId,
    pub email: String,
    #[serde(default)]
    pub issued_at: u64,
}

/// Observable state of the entitlement store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PremiumState {
    pub entitled: bool,
    pub record: Option<EntitlementRecord>,
    pub loading: bool,
    /// Last user-facing error, cleared when a new flow starts
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PremiumError {
    #[error("{0}")]
    Validation(String),
    #[error("Payment setup failed: {0}")]
    PaymentSetup(String),
    #[error("Verification failed: {0}")]
    VerificationRejected(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Could not save premium status: {0}")]
    Storage(String),
}

impl PremiumError {
    /// Worth retrying the same action unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PremiumError::Network(_) | PremiumError::PaymentSetup(_))
    }

    /// The authority explicitly said no; cached state must go.
    pub fn clears_entitlement(&self) -> bool {
        matches!(self, PremiumError::VerificationRejected(_))
    }
}

/// Basic `local@domain.tld` shape check, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
        .is_match(email)
}

pub fn now_epoch() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
