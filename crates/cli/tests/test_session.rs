//! Session wiring: entitlement store and ad gate share one live flag

use pindrop_cli::host::{Host, OverlayEnd};
use pindrop_cli::session::Session;
use pindrop_core::premium::client::VerifyPaymentRequest;
use pindrop_core::premium::{
    MemoryTokenStore, StoredEntitlement, TokenStore, TokenVerdict, VerificationAuthority,
    VerifiedPayment,
};
use pindrop_core::{GateOutcome, MediaKind, PindropConfig, PlanId, PremiumError};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct FixedAuthority {
    token: Result<TokenVerdict, PremiumError>,
}

impl VerificationAuthority for FixedAuthority {
    fn verify_payment(&self, _req: &VerifyPaymentRequest<'_>) -> Result<VerifiedPayment, PremiumError> {
        Err(PremiumError::Network("offline".to_string()))
    }

    fn verify_token(&self, _token: &str) -> Result<TokenVerdict, PremiumError> {
        self.token.clone()
    }
}

/// Rejects every token and reports when it has answered.
struct SignallingAuthority {
    answered: Mutex<mpsc::Sender<()>>,
}

impl VerificationAuthority for SignallingAuthority {
    fn verify_payment(&self, _req: &VerifyPaymentRequest<'_>) -> Result<VerifiedPayment, PremiumError> {
        Err(PremiumError::Network("offline".to_string()))
    }

    fn verify_token(&self, _token: &str) -> Result<TokenVerdict, PremiumError> {
        let _ = self.answered.lock().unwrap().send(());
        Err(PremiumError::VerificationRejected("expired".to_string()))
    }
}

fn session_with(stored: Option<&str>, token: Result<TokenVerdict, PremiumError>) -> Session {
    let store: Box<dyn TokenStore> = match stored {
        Some(t) => Box::new(MemoryTokenStore::with_stored(StoredEntitlement {
            token: t.to_string(),
            meta: None,
        })),
        None => Box::new(MemoryTokenStore::new()),
    };
    Session::build(
        PindropConfig::default(),
        Arc::new(FixedAuthority { token }),
        store,
    )
    .unwrap()
}

fn counter_action(hits: &Rc<Cell<u32>>) -> Box<dyn FnOnce()> {
    let hits = Rc::clone(hits);
    Box::new(move || hits.set(hits.get() + 1))
}

#[test]
fn free_session_defers_second_video() {
    let mut session = session_with(None, Ok(TokenVerdict::default()));
    let hits = Rc::new(Cell::new(0));

    assert_eq!(
        session.gate.gate_download(MediaKind::Video, counter_action(&hits)),
        GateOutcome::Released
    );
    assert_eq!(
        session.gate.gate_download(MediaKind::Video, counter_action(&hits)),
        GateOutcome::Deferred
    );
    assert_eq!(hits.get(), 1);
}

#[test]
fn stored_token_bypasses_ads_before_verification() {
    let mut session = session_with(
        Some("signed.token"),
        Ok(TokenVerdict {
            plan: Some(PlanId::Lifetime),
            email: Some("a@b.co".to_string()),
        }),
    );
    assert!(session.gate.is_entitled());

    let hits = Rc::new(Cell::new(0));
    for _ in 0..4 {
        assert_eq!(
            session.gate.gate_download(MediaKind::Video, counter_action(&hits)),
            GateOutcome::Bypassed
        );
    }
    assert_eq!(hits.get(), 4);
}

#[test]
fn rejected_token_turns_ads_back_on() {
    let mut session = session_with(
        Some("forged.token"),
        Err(PremiumError::VerificationRejected("bad signature".to_string())),
    );
    assert!(session.gate.is_entitled());

    assert!(session.settle());
    assert!(!session.premium.is_entitled());
    assert!(!session.gate.is_entitled());

    let hits = Rc::new(Cell::new(0));
    session.gate.gate_download(MediaKind::Video, counter_action(&hits));
    assert_eq!(
        session.gate.gate_download(MediaKind::Video, counter_action(&hits)),
        GateOutcome::Deferred
    );
}

#[test]
fn network_failure_keeps_optimistic_state() {
    let mut session = session_with(
        Some("signed.token"),
        Err(PremiumError::Network("timeout".to_string())),
    );
    session.settle();
    assert!(session.gate.is_entitled());
}

#[test]
fn headless_overlay_runs_to_completion() {
    let mut session = session_with(None, Ok(TokenVerdict::default()));
    let host = Host::headless();
    let hits = Rc::new(Cell::new(0));

    session.gate.gate_download(MediaKind::Video, counter_action(&hits));
    session.gate.gate_download(MediaKind::Video, counter_action(&hits));
    assert!(session.gate.is_showing());

    assert_eq!(host.run_overlay(&mut session, true), OverlayEnd::Completed);
    assert!(!session.gate.is_showing());
    assert_eq!(hits.get(), 2);
}

#[test]
fn headless_overlay_drains_queued_ads() {
    let mut config = PindropConfig::default();
    config.ads.video_every = 1;
    config.ads.image_every = 1;
    let mut session = Session::build(
        config,
        Arc::new(FixedAuthority {
            token: Ok(TokenVerdict::default()),
        }),
        Box::new(MemoryTokenStore::new()),
    )
    .unwrap();
    let host = Host::headless();
    let hits = Rc::new(Cell::new(0));

    session.gate.gate_download(MediaKind::Video, counter_action(&hits));
    session.gate.gate_download(MediaKind::Image, counter_action(&hits));
    assert_eq!(session.gate.queued_ads(), 1);

    assert_eq!(host.run_overlay(&mut session, true), OverlayEnd::Completed);
    assert!(!session.gate.is_showing());
    assert_eq!(hits.get(), 2);
}

#[test]
fn overlay_with_nothing_showing_is_a_no_op() {
    let mut session = session_with(None, Ok(TokenVerdict::default()));
    let host = Host::headless();
    assert_eq!(host.run_overlay(&mut session, true), OverlayEnd::Completed);
    assert_eq!(session.gate.total_downloads(), 0);
}

#[test]
fn invalid_ad_settings_fail_to_build() {
    let mut config = PindropConfig::default();
    config.ads.image_every = 0;
    let result = Session::build(
        config,
        Arc::new(FixedAuthority {
            token: Ok(TokenVerdict::default()),
        }),
        Box::new(MemoryTokenStore::new()),
    );
    assert!(result.is_err());
}

#[test]
fn gating_applies_a_verdict_that_arrived_in_between() {
    let (tx, rx) = mpsc::channel();
    let mut session = Session::build(
        PindropConfig::default(),
        Arc::new(SignallingAuthority {
            answered: Mutex::new(tx),
        }),
        Box::new(MemoryTokenStore::with_stored(StoredEntitlement {
            token: "expired.token".to_string(),
            meta: None,
        })),
    )
    .unwrap();
    assert!(session.gate.is_entitled());

    // verdict lands while the host is busy elsewhere (e.g. analyzing a pin)
    rx.recv_timeout(Duration::from_secs(5)).unwrap();
    std::thread::sleep(Duration::from_millis(100));
    assert!(session.gate.is_entitled(), "nothing polled yet");

    let hits = Rc::new(Cell::new(0));
    assert_eq!(
        session.gate_download(MediaKind::Video, counter_action(&hits)),
        GateOutcome::Released
    );
    assert!(!session.gate.is_entitled());
    assert_eq!(
        session.gate_download(MediaKind::Video, counter_action(&hits)),
        GateOutcome::Deferred
    );
    assert_eq!(hits.get(), 1);
}
