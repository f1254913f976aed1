//! Payment collaborator seam
//!
//! Mirrors the provider's `setup(config) -> handler` / `handler.open()`
//! shape: setup can fail outright (script or SDK unavailable), and an opened
//! checkout ends either with a transaction reference or with the user
//! closing it.

use super::types::PremiumError;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

pub const CHECKOUT_LABEL: &str = "PinDrop Premium";

/// Everything the provider needs to charge for a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    pub public_key: String,
    pub email: String,
    /// Amount in minor units (cents)
    pub amount: u64,
    pub currency: String,
    /// Idempotency reference for this attempt
    pub reference: String,
    /// Recurring-plan identifier, monthly only
    pub plan_code: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Completed { reference: String },
    /// Closed without paying.
    Closed,
}

pub trait CheckoutHandle {
    /// Runs the checkout to completion or close.
    fn open(self: Box<Self>) -> CheckoutOutcome;
}

pub trait PaymentGateway {
    /// Fails with `PremiumError::PaymentSetup` when the provider cannot start.
    fn setup(&self, config: &CheckoutConfig) -> Result<Box<dyn CheckoutHandle>, PremiumError>;
}

static REFERENCE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Returns a fresh `pdrop_<millis>_<7 chars>` reference.
pub fn generate_reference() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let seq = REFERENCE_COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha256::new();
    hasher.update(now.as_nanos().to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());
    hasher.update(seq.to_le_bytes());
    let digest = hasher.finalize();

    let suffix: String = digest
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
        .chars()
        .take(7)
        .collect();

    format!("pdrop_{}_{}", now.as_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_has_expected_shape() {
        let r = generate_reference();
        let parts: Vec<&str> = r.split('_').collect();
        assert_eq!(parts.len(), 3, "unexpected reference: {r}");
        assert_eq!(parts[0], "pdrop");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 7);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn references_are_unique() {
        let a = generate_reference();
        let b = generate_reference();
        assert_ne!(a, b);
    }
}
