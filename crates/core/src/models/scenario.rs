use serde::{Deserialize, Serialize};

use super::investment::InvestmentResult;
use super::price::PricePoint;

/// A built-in "what if you had invested in X instead" preset.
///
/// The multiplier expresses the relative aggressiveness of the hypothetical
/// asset class against the queried asset (0.7 = conservative, 2.5 = crypto).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioPreset {
    pub id: String,
    pub name: String,
    pub description: String,
    pub multiplier: f64,
}

impl ScenarioPreset {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        multiplier: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            multiplier,
        }
    }

    /// The four built-in presets.
    #[must_use]
    pub fn defaults() -> Vec<ScenarioPreset> {
        vec![
            ScenarioPreset::new(
                "sp500",
                "S&P 500 Index",
                "Compare with the market benchmark",
                1.0,
            ),
            ScenarioPreset::new(
                "tech",
                "Tech Giants",
                "FAANG stocks average performance",
                1.5,
            ),
            ScenarioPreset::new(
                "conservative",
                "Conservative Portfolio",
                "60% bonds, 40% stocks",
                0.7,
            ),
            ScenarioPreset::new(
                "crypto",
                "Crypto Basket",
                "Top 5 cryptocurrencies by market cap",
                2.5,
            ),
        ]
    }
}

/// A synthetic comparison projection produced by the Scenario Generator.
///
/// Never persisted — regenerated whenever the selected scenario changes.
/// The series is noise-scaled from a real result, so it is illustrative only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub name: String,
    pub profit_loss_percentage: f64,
    pub profit_loss: f64,
    pub historical_prices: Vec<PricePoint>,
}

/// A predefined head-to-head comparison between two real assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonScenario {
    pub id: String,
    pub label: String,
    pub asset1_symbol: String,
    pub asset2_symbol: String,
    pub asset1_name: String,
    pub asset2_name: String,
    pub description: String,
}

/// The outcome of a head-to-head comparison: both assets are run through the
/// full investment calculation with identical dates and amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub scenario: ComparisonScenario,
    pub asset1_result: InvestmentResult,
    pub asset2_result: InvestmentResult,
}
