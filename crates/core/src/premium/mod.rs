//! Premium/entitlement system
//!
//! Handles token storage, remote verification, payment checkout and the
//! optimistic local cache. The server's signature is the only source of
//! truth; everything persisted here is a hint that gets re-checked.

pub mod cache;
pub mod client;
pub mod manager;
pub mod payment;
pub mod types;

pub use cache::{FileTokenStore, MemoryTokenStore, StoredEntitlement, TokenStore};
pub use client::{HttpAuthority, TokenVerdict, VerificationAuthority, VerifiedPayment};
pub use manager::{PaymentOutcome, PremiumManager};
pub use payment::{CheckoutConfig, CheckoutHandle, CheckoutOutcome, PaymentGateway};
pub use types::{is_valid_email, EntitlementRecord, PremiumError, PremiumState};
