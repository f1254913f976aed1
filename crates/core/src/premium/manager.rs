//! Entitlement store: caches the server's premium decision locally
//!
//! Flow:
//! 1. `bootstrap` trusts a persisted token optimistically, then re-checks it
//!    with the authority on a background thread
//! 2. `poll`/`settle` apply that answer: success refreshes metadata, an
//!    explicit rejection wipes everything, an unreachable server keeps the
//!    optimistic state
//! 3. `init_payment`/`restore_by_reference` obtain a fresh signed token
//!
//! Each change of `entitled` is pushed into the attached [`EntitlementFlag`].

use super::cache::TokenStore;
use super::client::{TokenVerdict, VerificationAuthority, VerifyPaymentRequest};
use super::payment::{
    generate_reference, CheckoutConfig, CheckoutOutcome, PaymentGateway, CHECKOUT_LABEL,
};
use super::types::{
    is_valid_email, now_epoch, EntitlementRecord, PremiumError, PremiumState,
};
use crate::ad_gate::EntitlementFlag;
use crate::plans::{PlanCatalog, PlanId};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const INVALID_EMAIL: &str = "Please enter a valid email address.";
const RESTORE_EMAIL: &str = "Please enter the email used at payment.";
const RESTORE_REFERENCE: &str = "Please enter the transaction reference from your receipt.";

/// Result of a payment attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Activated(PlanId),
    /// The user closed checkout without paying.
    Closed,
}

struct PendingVerification {
    generation: u64,
    rx: Receiver<Result<TokenVerdict, PremiumError>>,
}

pub struct PremiumManager<S: TokenStore> {
    authority: Arc<dyn VerificationAuthority>,
    store: S,
    catalog: PlanCatalog,
    public_key: String,
    state: PremiumState,
    flag: Option<EntitlementFlag>,
    generation: u64,
    pending: Option<PendingVerification>,
}

impl<S: TokenStore> PremiumManager<S> {
    pub fn new(authority: Arc<dyn VerificationAuthority>, store: S, catalog: PlanCatalog) -> Self {
        Self {
            authority,
            store,
            catalog,
            public_key: String::new(),
            state: PremiumState::default(),
            flag: None,
            generation: 0,
            pending: None,
        }
    }

    /// Payment provider public key passed to checkout.
    pub fn with_public_key(mut self, key: impl Into<String>) -> Self {
        self.public_key = key.into();
        self
    }

    /// Attaches the ad gate's live flag and pushes the current value into it.
    pub fn attach_flag(&mut self, flag: EntitlementFlag) {
        flag.set(self.state.entitled);
        self.flag = Some(flag);
    }

    pub fn state(&self) -> &PremiumState {
        &self.state
    }

    pub fn is_entitled(&self) -> bool {
        self.state.entitled
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    pub fn is_verifying(&self) -> bool {
        self.pending.is_some()
    }

    /// Loads the persisted token, reports it optimistically and starts the
    /// background re-check. Returns immediately.
    pub fn bootstrap(&mut self) {
        self.supersede();

        let Some(stored) = self.store.load() else {
            debug!("no stored premium token");
            self.state = PremiumState::default();
            self.publish();
            return;
        };

        let record = stored.record();
        let trusted = record
            .as_ref()
            .map(|r| r.is_fresh_hint(now_epoch()))
            .unwrap_or(true);

        self.state = PremiumState {
            entitled: trusted,
            record,
            loading: true,
            error: None,
        };
        self.publish();
        debug!(optimistic = trusted, "stored premium token found, verifying");

        let (tx, rx) = mpsc::channel();
        let authority = Arc::clone(&self.authority);
        let token = stored.token;
        std::thread::spawn(move || {
            // Receiver gone means the store was dropped or superseded.
            let _ = tx.send(authority.verify_token(&token));
        });

        self.pending = Some(PendingVerification {
            generation: self.generation,
            rx,
        });
    }

    /// Applies a finished background verification, if any. Returns `true`
    /// when state changed as a result.
    pub fn poll(&mut self) -> bool {
        let received = match self.pending.as_ref() {
            Some(p) => match p.rx.try_recv() {
                Ok(result) => Some((p.generation, result)),
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => None,
            },
            None => return false,
        };
        self.finish_pending(received)
    }

    /// Blocks up to `timeout` for the background verification.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let received = match self.pending.as_ref() {
            Some(p) => match p.rx.recv_timeout(timeout) {
                Ok(result) => Some((p.generation, result)),
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => None,
            },
            None => return false,
        };
        self.finish_pending(received)
    }

    /// Starts checkout for `plan_id` and, once paid, verifies the payment.
    pub fn init_payment(
        &mut self,
        plan_id: PlanId,
        email: &str,
        gateway: &dyn PaymentGateway,
    ) -> Result<PaymentOutcome, PremiumError> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(self.fail(PremiumError::Validation(INVALID_EMAIL.to_string())));
        }

        self.state.error = None;
        self.state.loading = true;

        let plan = self.catalog.get(plan_id);
        let config = CheckoutConfig {
            public_key: self.public_key.clone(),
            email: email.to_string(),
            amount: plan.price_cents,
            currency: plan.currency.to_string(),
            reference: generate_reference(),
            plan_code: plan.provider_plan_code.clone(),
            label: CHECKOUT_LABEL.to_string(),
        };

        let handle = match gateway.setup(&config) {
            Ok(h) => h,
            Err(e) => {
                let e = match e {
                    PremiumError::PaymentSetup(_) => e,
                    other => PremiumError::PaymentSetup(other.to_string()),
                };
                return Err(self.fail(e));
            }
        };

        match handle.open() {
            CheckoutOutcome::Closed => {
                debug!(plan = %plan_id, "checkout closed without payment");
                self.state.loading = false;
                Ok(PaymentOutcome::Closed)
            }
            CheckoutOutcome::Completed { reference } => {
                info!(plan = %plan_id, "checkout completed, verifying payment");
                self.verify_payment(&reference, email, plan_id)
                    .map(PaymentOutcome::Activated)
            }
        }
    }

    /// Re-establishes a lifetime entitlement from an earlier payment.
    pub fn restore_by_reference(&mut self, reference: &str, email: &str) -> Result<PlanId, PremiumError> {
        let reference = reference.trim();
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(self.fail(PremiumError::Validation(RESTORE_EMAIL.to_string())));
        }
        if reference.is_empty() {
            return Err(self.fail(PremiumError::Validation(RESTORE_REFERENCE.to_string())));
        }

        self.state.error = None;
        self.state.loading = true;
        self.verify_payment(reference, email, PlanId::Lifetime)
    }

    /// Wipes local entitlement and the persisted token unconditionally.
    pub fn clear(&mut self) {
        self.supersede();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to remove stored premium token");
        }
        self.state = PremiumState::default();
        self.publish();
        info!("premium status cleared");
    }

    fn verify_payment(&mut self, reference: &str, email: &str, plan: PlanId) -> Result<PlanId, PremiumError> {
        let req = VerifyPaymentRequest {
            reference,
            email,
            plan,
        };

        let verified = match self.authority.verify_payment(&req) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, plan = %plan, "payment verification failed");
                return Err(self.fail(e));
            }
        };

        // A fresh token outranks whatever the bootstrap check may still say.
        self.supersede();

        let record = EntitlementRecord {
            plan: verified.plan.unwrap_or(plan),
            email: email.to_string(),
            issued_at: now_epoch(),
            token: verified.token,
        };
        if let Err(e) = self.store.save(&record) {
            warn!(error = %e, "premium active for this session only");
        }

        let activated = record.plan;
        self.state = PremiumState {
            entitled: true,
            record: Some(record),
            loading: false,
            error: None,
        };
        self.publish();
        info!(plan = %activated, "premium activated");
        Ok(activated)
    }

    fn finish_pending(&mut self, received: Option<(u64, Result<TokenVerdict, PremiumError>)>) -> bool {
        self.pending = None;
        self.state.loading = false;

        match received {
            Some((generation, result)) if generation == self.generation => {
                self.apply_token_verdict(result);
                true
            }
            Some(_) => {
                debug!("discarding superseded token verification");
                false
            }
            None => {
                warn!("token verification ended without an answer; keeping cached state");
                false
            }
        }
    }

    fn apply_token_verdict(&mut self, result: Result<TokenVerdict, PremiumError>) {
        match result {
            Ok(verdict) => {
                let Some(stored) = self.store.load() else {
                    return;
                };
                let previous = self.state.record.take();
                let plan = verdict.plan.or(previous.as_ref().map(|r| r.plan));
                let email = verdict
                    .email
                    .or_else(|| previous.as_ref().map(|r| r.email.clone()));

                let record = match (plan, email) {
                    (Some(plan), Some(email)) => Some(EntitlementRecord {
                        plan,
                        email,
                        // confirmation restarts the local hint window
                        issued_at: now_epoch(),
                        token: stored.token,
                    }),
                    _ => None,
                };

                if let Some(ref r) = record {
                    if let Err(e) = self.store.save(r) {
                        warn!(error = %e, "could not refresh premium metadata");
                    }
                }

                self.state.entitled = true;
                self.state.record = record;
                self.publish();
                info!("premium token confirmed");
            }
            Err(e) if e.clears_entitlement() => {
                if let Err(err) = self.store.clear() {
                    warn!(error = %err, "failed to remove rejected premium token");
                }
                self.state = PremiumState::default();
                self.publish();
                info!(reason = %e, "premium token rejected, entitlement revoked");
            }
            Err(e) => {
                warn!(error = %e, "premium server unreachable; keeping cached status");
            }
        }
    }

    /// Invalidates any in-flight verification.
    fn supersede(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    fn fail(&mut self, err: PremiumError) -> PremiumError {
        self.state.loading = false;
        self.state.error = Some(err.to_string());
        err
    }

    fn publish(&self) {
        if let Some(flag) = &self.flag {
            flag.set(self.state.entitled);
        }
    }
}
