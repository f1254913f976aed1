use pindrop_core::premium::client::{
    interpret_payment_response, interpret_token_response, VerifyPaymentRequest,
    VerifyPaymentResponse, VerifyTokenRequest, VerifyTokenResponse,
};
use pindrop_core::{PlanId, PremiumError};

#[test]
fn payment_request_serialization() {
    let req = VerifyPaymentRequest {
        reference: "pdrop_1_abc",
        email: "me@example.com",
        plan: PlanId::Lifetime,
    };
    let json: serde_json::Value = serde_json::to_value(&req).unwrap();
    assert_eq!(json["reference"], "pdrop_1_abc");
    assert_eq!(json["email"], "me@example.com");
    assert_eq!(json["plan"], "lifetime");
}

#[test]
fn token_request_serialization() {
    let json = serde_json::to_string(&VerifyTokenRequest { token: "t.o.k" }).unwrap();
    assert_eq!(json, r#"{"token":"t.o.k"}"#);
}

#[test]
fn payment_success_yields_token() {
    let resp: VerifyPaymentResponse =
        serde_json::from_str(r#"{"success": true, "token": "abc.def", "plan": "monthly"}"#)
            .unwrap();
    let verified = interpret_payment_response(resp).unwrap();
    assert_eq!(verified.token, "abc.def");
    assert_eq!(verified.plan, Some(PlanId::Monthly));
}

#[test]
fn payment_rejection_carries_detail() {
    let resp: VerifyPaymentResponse =
        serde_json::from_str(r#"{"success": false, "detail": "Reference not found"}"#).unwrap();
    let err = interpret_payment_response(resp).unwrap_err();
    assert_eq!(
        err,
        PremiumError::VerificationRejected("Reference not found".to_string())
    );
}

#[test]
fn payment_rejection_without_detail_has_default_message() {
    let resp: VerifyPaymentResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
    let err = interpret_payment_response(resp).unwrap_err();
    assert!(err.clears_entitlement());
    assert!(!err.to_string().is_empty());
}

#[test]
fn payment_success_without_token_is_not_a_rejection() {
    let resp: VerifyPaymentResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
    let err = interpret_payment_response(resp).unwrap_err();
    assert!(matches!(err, PremiumError::Network(_)));
    assert!(!err.clears_entitlement());
}

#[test]
fn unknown_plan_is_dropped() {
    let resp: VerifyPaymentResponse =
        serde_json::from_str(r#"{"success": true, "token": "t", "plan": "weekly"}"#).unwrap();
    assert_eq!(interpret_payment_response(resp).unwrap().plan, None);
}

#[test]
fn token_valid_response() {
    let resp: VerifyTokenResponse = serde_json::from_str(
        r#"{"valid": true, "plan": "lifetime", "email": "me@example.com"}"#,
    )
    .unwrap();
    let verdict = interpret_token_response(resp).unwrap();
    assert_eq!(verdict.plan, Some(PlanId::Lifetime));
    assert_eq!(verdict.email.as_deref(), Some("me@example.com"));
}

#[test]
fn token_minimal_invalid_response() {
    let resp: VerifyTokenResponse = serde_json::from_str(r#"{"valid": false}"#).unwrap();
    let err = interpret_token_response(resp).unwrap_err();
    assert!(matches!(err, PremiumError::VerificationRejected(_)));
}

#[test]
fn error_classification() {
    assert!(PremiumError::Network("x".into()).is_retryable());
    assert!(PremiumError::PaymentSetup("x".into()).is_retryable());
    assert!(!PremiumError::Validation("x".into()).is_retryable());
    assert!(!PremiumError::VerificationRejected("x".into()).is_retryable());
    assert!(!PremiumError::Network("x".into()).clears_entitlement());
    assert!(!PremiumError::Storage("x".into()).clears_entitlement());
}

#[test]
fn email_shape() {
    use pindrop_core::premium::is_valid_email;
    assert!(is_valid_email("me@example.com"));
    assert!(is_valid_email("a.b+c@sub.domain.io"));
    assert!(!is_valid_email("not-an-email"));
    assert!(!is_valid_email("me@example"));
    assert!(!is_valid_email("me @example.com"));
    assert!(!is_valid_email(""));
}
