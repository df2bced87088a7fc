use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unit prices used to translate a missed profit into the pain scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainScale {
    /// Average price of one pizza
    pub average_pizza_price: f64,

    /// Average price of one vacation
    pub average_vacation_price: f64,

    /// Average monthly living expense in retirement
    pub monthly_retirement_expense: f64,
}

impl Default for PainScale {
    fn default() -> Self {
        Self {
            average_pizza_price: 15.0,
            average_vacation_price: 2500.0,
            monthly_retirement_expense: 4000.0,
        }
    }
}

/// Explicit configuration passed into the calculator — no ambient/global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// API keys for market data providers.
    /// Keys: provider name (e.g., "fmp"). Values: the API key string.
    pub api_keys: HashMap<String, String>,

    /// Pain scale unit prices.
    pub pain_scale: PainScale,

    /// Risk-free rate used for the Sharpe ratio, percent.
    pub risk_free_rate_pct: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_keys: HashMap::new(),
            pain_scale: PainScale::default(),
            risk_free_rate_pct: 2.0,
        }
    }
}
