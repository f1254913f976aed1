//! Browser checkout: the terminal stand-in for the provider's popup

use colored::Colorize;
use pindrop_core::premium::{
    CheckoutConfig, CheckoutHandle, CheckoutOutcome, PaymentGateway, PremiumError,
};
use std::io::{BufRead, Write};

pub struct BrowserCheckout {
    checkout_url: String,
}

impl BrowserCheckout {
    pub fn new(checkout_url: impl Into<String>) -> Self {
        Self {
            checkout_url: checkout_url.into(),
        }
    }

    /// Checkout page URL carrying the full payment config.
    pub fn checkout_link(&self, config: &CheckoutConfig) -> Result<reqwest::Url, PremiumError> {
        let amount = config.amount.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("key", config.public_key.as_str()),
            ("email", config.email.as_str()),
            ("amount", amount.as_str()),
            ("currency", config.currency.as_str()),
            ("ref", config.reference.as_str()),
            ("label", config.label.as_str()),
        ];
        if let Some(ref code) = config.plan_code {
            params.push(("plan", code.as_str()));
        }
        reqwest::Url::parse_with_params(&self.checkout_url, &params)
            .map_err(|e| PremiumError::PaymentSetup(format!("invalid checkout URL: {}", e)))
    }
}

impl PaymentGateway for BrowserCheckout {
    fn setup(&self, config: &CheckoutConfig) -> Result<Box<dyn CheckoutHandle>, PremiumError> {
        if config.public_key.trim().is_empty() {
            return Err(PremiumError::PaymentSetup(
                "payment provider is not configured (payment.public_key)".to_string(),
            ));
        }
        let url = self.checkout_link(config)?;
        Ok(Box::new(BrowserHandle {
            url,
            reference: config.reference.clone(),
        }))
    }
}

struct BrowserHandle {
    url: reqwest::Url,
    reference: String,
}

impl CheckoutHandle for BrowserHandle {
    fn open(self: Box<Self>) -> CheckoutOutcome {
        eprintln!("{}", "  Opening checkout in your browser...".bold());
        if let Err(e) = open::that(self.url.as_str()) {
            eprintln!("  {} Could not open browser: {}", "Error:".red().bold(), e);
            eprintln!("  Visit {} to pay.", self.url.as_str().bold());
        }
        eprintln!();
        eprintln!(
            "  Your payment reference is {}",
            self.reference.as_str().cyan()
        );
        eprint!("  Paste the reference from your receipt (empty to cancel): ");
        let _ = std::io::stderr().flush();

        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line).is_err() {
            return CheckoutOutcome::Closed;
        }
        match line.trim() {
            "" => CheckoutOutcome::Closed,
            reference => CheckoutOutcome::Completed {
                reference: reference.to_string(),
            },
        }
    }
}
