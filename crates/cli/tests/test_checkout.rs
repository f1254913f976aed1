use pindrop_cli::checkout::BrowserCheckout;
use pindrop_core::premium::{CheckoutConfig, PaymentGateway, PremiumError};

fn config(public_key: &str, plan_code: Option<&str>) -> CheckoutConfig {
    CheckoutConfig {
        public_key: public_key.to_string(),
        email: "a@b.co".to_string(),
        amount: 100,
        currency: "USD".to_string(),
        reference: "pdrop_1_abcdefg".to_string(),
        plan_code: plan_code.map(str::to_string),
        label: "PinDrop Premium".to_string(),
    }
}

#[test]
fn missing_public_key_fails_setup() {
    let gateway = BrowserCheckout::new("https://pindrop.app/checkout");
    let err = gateway.setup(&config("", None)).err().unwrap();
    assert!(matches!(err, PremiumError::PaymentSetup(_)));
}

#[test]
fn bad_checkout_url_fails_setup() {
    let gateway = BrowserCheckout::new("not a url");
    let err = gateway.setup(&config("pk_live_x", None)).err().unwrap();
    assert!(matches!(err, PremiumError::PaymentSetup(_)));
}

#[test]
fn checkout_link_carries_payment_details() {
    let gateway = BrowserCheckout::new("https://pindrop.app/checkout");
    let url = gateway
        .checkout_link(&config("pk_live_x", Some("PLN_monthly")))
        .unwrap();
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

    let get = |k: &str| pairs.iter().find(|(key, _)| key == k).map(|(_, v)| v.as_str());
    assert_eq!(get("key"), Some("pk_live_x"));
    assert_eq!(get("amount"), Some("100"));
    assert_eq!(get("ref"), Some("pdrop_1_abcdefg"));
    assert_eq!(get("plan"), Some("PLN_monthly"));
    assert_eq!(get("email"), Some("a@b.co"));
}

#[test]
fn one_time_checkout_has_no_plan_param() {
    let gateway = BrowserCheckout::new("https://pindrop.app/checkout");
    let url = gateway.checkout_link(&config("pk_live_x", None)).unwrap();
    assert!(!url.query_pairs().any(|(k, _)| k == "plan"));
}
