use serde::{Deserialize, Serialize};

use super::metrics::DerivedMetrics;
use super::price::PricePoint;

/// The full outcome of one "what if I had invested" query.
///
/// Created fresh per (symbol, entry date, exit date, amount) query and never
/// mutated — a new query supersedes the previous result. Field names
/// serialize in camelCase to match the wire contract the frontend consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentResult {
    /// Asset symbol the query was made for (e.g., "BTC", "TSLA")
    pub asset_name: String,

    /// Resolved price at the entry date (closest trading day)
    pub entry_price: f64,

    /// Resolved price at the exit date (closest trading day)
    pub exit_price: f64,

    /// Amount hypothetically invested
    pub investment_amount: f64,

    /// exit value − investment amount (negative for a loss)
    pub profit_loss: f64,

    /// profit_loss / investment_amount × 100
    pub profit_loss_percentage: f64,

    // ── Pain Scale ──────────────────────────────────────────────────
    /// Whole pizzas the missed profit would have bought (0 on a loss)
    pub pizza_count: u32,

    /// Whole vacations the missed profit would have bought (0 on a loss)
    pub vacation_count: u32,

    /// Years of retirement the missed profit would have funded (0 on a loss)
    pub retirement_years: f64,

    /// Daily price history over the holding window, ascending by date
    pub historical_prices: Vec<PricePoint>,

    /// Risk/return metrics derived from `historical_prices`
    pub metrics: DerivedMetrics,
}

impl InvestmentResult {
    /// Number of (fractional) shares implied by the investment.
    #[must_use]
    pub fn shares(&self) -> f64 {
        self.investment_amount / self.entry_price
    }
}
