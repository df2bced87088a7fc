use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::price::{PriceCache, PricePoint};
use crate::providers::traits::MarketDataProvider;

/// Number of calendar days searched on each side of a requested date when
/// resolving a price (weekends and holidays have no trading data).
const CLOSEST_PRICE_WINDOW_DAYS: i64 = 5;

/// Fetches historical prices from API providers with caching and fallback.
///
/// Providers are tried in registration order; if the primary fails (API
/// down, rate limited), the next one is tried automatically.
///
/// Cache strategy: historical prices never change, so every fetched range is
/// stored in the `PriceCache` and repeated queries are served locally.
///
/// **Note on precision**: prices are `f64` (~15-17 significant decimal
/// digits), which is sufficient for display math but not for accounting.
pub struct MarketDataService {
    providers: Vec<Box<dyn MarketDataProvider>>,
}

impl MarketDataService {
    /// Create a service with no providers. Fetches fail with `NoProvider`
    /// until one is registered.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    pub fn with_providers(providers: Vec<Box<dyn MarketDataProvider>>) -> Self {
        Self { providers }
    }

    /// Register a provider. Earlier registrations have higher priority.
    pub fn register(&mut self, provider: Box<dyn MarketDataProvider>) {
        self.providers.push(provider);
    }

    /// Check if at least one provider is registered.
    pub fn has_provider(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Names of all registered providers, in priority order.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Fetch daily prices for a symbol over a date range (inclusive).
    /// Serves from cache when the range has been fully fetched before.
    pub async fn get_price_range(
        &self,
        cache: &mut PriceCache,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        if cache.is_covered(symbol, from, to) {
            return Ok(cache.get_price_range(symbol, from, to));
        }

        // Cache miss — fetch from providers with fallback
        tracing::debug!("Cache miss for {symbol} [{from} → {to}], fetching from API");
        let points = self.fetch_range(symbol, from, to).await?;
        cache.set_price_range(symbol, from, to, &points);
        Ok(points)
    }

    /// Resolve the price of a symbol closest to a requested date.
    ///
    /// Searches a ±5 calendar-day window around the date so that queries
    /// landing on non-trading days still resolve; the nearest sample wins.
    /// Returned prices are validated strictly positive — they become
    /// division bases in the profit/loss math.
    pub async fn closest_price(
        &self,
        cache: &mut PriceCache,
        symbol: &str,
        date: NaiveDate,
    ) -> Result<f64, CoreError> {
        let from = date - chrono::Duration::days(CLOSEST_PRICE_WINDOW_DAYS);
        let to = date + chrono::Duration::days(CLOSEST_PRICE_WINDOW_DAYS);

        let points = self.get_price_range(cache, symbol, from, to).await?;

        points
            .iter()
            .filter(|p| p.price.is_finite() && p.price > 0.0)
            .min_by_key(|p| (p.date - date).num_days().abs())
            .map(|p| p.price)
            .ok_or_else(|| CoreError::PriceNotAvailable {
                symbol: symbol.to_uppercase(),
                date: date.to_string(),
            })
    }

    /// Internal: fetch a range from providers with automatic fallback.
    async fn fetch_range(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        if self.providers.is_empty() {
            return Err(CoreError::NoProvider);
        }

        let mut last_error = None;
        for provider in &self.providers {
            match provider.get_price_range(symbol, from, to).await {
                Ok(points) => return Ok(points),
                Err(e) => {
                    tracing::debug!(
                        "Provider {} failed for {symbol}: {e}, trying next",
                        provider.name()
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoProvider))
    }
}

impl Default for MarketDataService {
    fn default() -> Self {
        Self::new()
    }
}
