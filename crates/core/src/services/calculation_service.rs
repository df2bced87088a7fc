use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::investment::InvestmentResult;
use crate::models::price::PriceCache;
use crate::models::settings::{PainScale, Settings};
use crate::services::market_data_service::MarketDataService;
use crate::services::metrics_engine::MetricsEngine;

/// Computes the full outcome of one hypothetical investment and aggregates
/// it into a single `InvestmentResult`:
///
/// 1. Resolve entry/exit prices (closest trading day to each date).
/// 2. Straight-line profit/loss math over the implied fractional shares.
/// 3. Pain scale counts from the configured unit prices.
/// 4. Fetch the holding-period price history and attach the derived metrics.
///
/// Server-resolved fields pass through unchanged; the metrics layer is
/// bolted on top. Upstream fetch failures propagate — no metric is ever
/// computed against an absent series.
pub struct CalculationService {
    metrics_engine: MetricsEngine,
}

impl CalculationService {
    pub fn new() -> Self {
        Self {
            metrics_engine: MetricsEngine::new(),
        }
    }

    pub async fn calculate_investment(
        &self,
        market: &MarketDataService,
        cache: &mut PriceCache,
        settings: &Settings,
        symbol: &str,
        entry_date: NaiveDate,
        exit_date: NaiveDate,
        amount: f64,
    ) -> Result<InvestmentResult, CoreError> {
        tracing::info!(
            "Calculating investment for {symbol}: entry {entry_date}, exit {exit_date}, amount ${amount}"
        );

        let entry_price = market.closest_price(cache, symbol, entry_date).await?;
        let exit_price = market.closest_price(cache, symbol, exit_date).await?;
        tracing::debug!("Resolved prices for {symbol} — entry: ${entry_price}, exit: ${exit_price}");

        // Fractional shares are assumed possible
        let shares = amount / entry_price;
        let final_value = shares * exit_price;
        let profit_loss = final_value - amount;
        let profit_loss_percentage = (profit_loss / amount) * 100.0;

        let pain = &settings.pain_scale;
        let pizza_count = Self::unit_count(profit_loss, pain.average_pizza_price);
        let vacation_count = Self::unit_count(profit_loss, pain.average_vacation_price);
        let retirement_years = Self::retirement_years(profit_loss, pain);

        let historical_prices = market
            .get_price_range(cache, symbol, entry_date, exit_date)
            .await?;

        let metrics = self.metrics_engine.compute(
            &historical_prices,
            profit_loss_percentage,
            settings.risk_free_rate_pct,
        );

        tracing::info!(
            "Investment calculation completed for {symbol} — profit/loss: ${profit_loss:.2} ({profit_loss_percentage:.2}%)"
        );

        Ok(InvestmentResult {
            asset_name: symbol.to_uppercase(),
            entry_price,
            exit_price,
            investment_amount: amount,
            profit_loss,
            profit_loss_percentage,
            pizza_count,
            vacation_count,
            retirement_years,
            historical_prices,
            metrics,
        })
    }

    // ── Pain Scale ──────────────────────────────────────────────────

    /// Whole units of `unit_price` a profit would have bought. Losses and
    /// break-even count as zero — the pain scale only measures missed gains.
    fn unit_count(profit_loss: f64, unit_price: f64) -> u32 {
        if profit_loss <= 0.0 || unit_price <= 0.0 {
            return 0;
        }
        (profit_loss / unit_price) as u32
    }

    fn retirement_years(profit_loss: f64, pain: &PainScale) -> f64 {
        if profit_loss <= 0.0 || pain.monthly_retirement_expense <= 0.0 {
            return 0.0;
        }
        let months = profit_loss / pain.monthly_retirement_expense;
        months / 12.0
    }
}

impl Default for CalculationService {
    fn default() -> Self {
        Self::new()
    }
}
