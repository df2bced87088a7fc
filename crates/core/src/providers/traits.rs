use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::price::PricePoint;

/// Trait abstraction for market data providers.
///
/// The calculation layer only ever sees this trait. If an API stops working
/// or changes, we replace only that one implementation — the rest of the
/// codebase is untouched. Tests register mock implementations.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Get daily price data for a symbol over a date range (inclusive).
    /// Returns a Vec of PricePoints sorted ascending by date. Non-trading
    /// days (weekends, holidays) simply produce no point.
    async fn get_price_range(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError>;
}
