//! HTTP client for payment and token verification against the backend

use super::types::PremiumError;
use crate::plans::PlanId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const VERIFY_PAYMENT_PATH: &str = "/api/verify-payment";
const VERIFY_TOKEN_PATH: &str = "/api/verify-token";

#[derive(Debug, Serialize)]
pub struct VerifyPaymentRequest<'a> {
    pub reference: &'a str,
    pub email: &'a str,
    pub plan: PlanId,
}

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub token: Option<String>,
    pub plan: Option<String>,
    pub detail: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyTokenRequest<'a> {
    pub token: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct VerifyTokenResponse {
    pub valid: bool,
    pub plan: Option<String>,
    pub email: Option<String>,
}

/// A payment the authority accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayment {
    pub token: String,
    pub plan: Option<PlanId>,
}

/// Authoritative details for a token the authority accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenVerdict {
    pub plan: Option<PlanId>,
    pub email: Option<String>,
}

/// The remote authority that issues and re-checks signed tokens.
///
/// Explicit refusals come back as `VerificationRejected`; anything that
/// stops us from getting an answer is `Network`.
pub trait VerificationAuthority: Send + Sync {
    fn verify_payment(&self, req: &VerifyPaymentRequest<'_>) -> Result<VerifiedPayment, PremiumError>;

    fn verify_token(&self, token: &str) -> Result<TokenVerdict, PremiumError>;
}

pub struct HttpAuthority {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpAuthority {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PremiumError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PremiumError::Network(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POSTs `body` and decodes the JSON reply. 4xx replies that still carry
    /// a well-formed body are returned so the caller can read the refusal.
    fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, PremiumError> {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .map_err(|e| PremiumError::Network(e.to_string()))?;

        let status = resp.status();
        if status.is_server_error() {
            return Err(PremiumError::Network(format!("HTTP {}", status)));
        }

        let text = resp
            .text()
            .map_err(|e| PremiumError::Network(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| {
            if status.is_success() {
                PremiumError::Network(format!("invalid response: {}", e))
            } else {
                PremiumError::Network(format!("HTTP {}", status))
            }
        })
    }
}

impl VerificationAuthority for HttpAuthority {
    fn verify_payment(&self, req: &VerifyPaymentRequest<'_>) -> Result<VerifiedPayment, PremiumError> {
        let data: VerifyPaymentResponse = self.post(VERIFY_PAYMENT_PATH, req)?;
        interpret_payment_response(data)
    }

    fn verify_token(&self, token: &str) -> Result<TokenVerdict, PremiumError> {
        let data: VerifyTokenResponse = self.post(VERIFY_TOKEN_PATH, &VerifyTokenRequest { token })?;
        interpret_token_response(data)
    }
}

pub fn interpret_payment_response(data: VerifyPaymentResponse) -> Result<VerifiedPayment, PremiumError> {
    if !data.success {
        return Err(PremiumError::VerificationRejected(data.detail.unwrap_or_else(|| {
            "payment could not be verified".to_string()
        })));
    }

    let token = match data.token {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => {
            return Err(PremiumError::Network(
                "invalid response: missing token".to_string(),
            ))
        }
    };

    Ok(VerifiedPayment {
        token,
        plan: data.plan.as_deref().and_then(|p| p.parse().ok()),
    })
}

pub fn interpret_token_response(data: VerifyTokenResponse) -> Result<TokenVerdict, PremiumError> {
    if !data.valid {
        return Err(PremiumError::VerificationRejected(
            "premium token is invalid or expired".to_string(),
        ));
    }

    Ok(TokenVerdict {
        plan: data.plan.as_deref().and_then(|p| p.parse().ok()),
        email: data.email.filter(|e| !e.trim().is_empty()),
    })
}
