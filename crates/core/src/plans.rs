//! Premium plan catalog

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    Monthly,
    Lifetime,
}

impl PlanId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Monthly => "monthly",
            PlanId::Lifetime => "lifetime",
        }
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(PlanId::Monthly),
            "lifetime" => Ok(PlanId::Lifetime),
            other => Err(format!("unknown plan '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Monthly,
    Once,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub id: PlanId,
    pub label: &'static str,
    pub price_cents: u64,
    pub currency: &'static str,
    pub interval: BillingInterval,
    pub description: &'static str,
    /// Recurring-plan code at the payment provider (monthly only)
    pub provider_plan_code: Option<String>,
}

impl Plan {
    /// "$1.00" style display price.
    pub fn display_price(&self) -> String {
        let symbol = if self.currency == "USD" { "$" } else { "" };
        format!(
            "{}{}.{:02}",
            symbol,
            self.price_cents / 100,
            self.price_cents % 100
        )
    }
}

/// Read-only mapping from plan id to its pricing.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    monthly: Plan,
    lifetime: Plan,
}

impl PlanCatalog {
    pub fn new(monthly_plan_code: Option<String>) -> Self {
        Self {
            monthly: Plan {
                id: PlanId::Monthly,
                label: "Monthly",
                price_cents: 100,
                currency: "USD",
                interval: BillingInterval::Monthly,
                description: "$1 / month · Cancel anytime",
                provider_plan_code: monthly_plan_code.filter(|c| !c.trim().is_empty()),
            },
            lifetime: Plan {
                id: PlanId::Lifetime,
                label: "Lifetime",
                price_cents: 2900,
                currency: "USD",
                interval: BillingInterval::Once,
                description: "$29 once · Forever ad-free",
                provider_plan_code: None,
            },
        }
    }

    pub fn get(&self, id: PlanId) -> &Plan {
        match id {
            PlanId::Monthly => &self.monthly,
            PlanId::Lifetime => &self.lifetime,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plan> {
        [&self.monthly, &self.lifetime].into_iter()
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::new(None)
    }
}
