use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::traits::MarketDataProvider;
use crate::errors::CoreError;
use crate::models::price::PricePoint;

const BASE_URL: &str = "https://financialmodelingprep.com/api/v3";
const PROVIDER_NAME: &str = "Financial Modeling Prep";

/// Financial Modeling Prep provider for daily historical prices.
///
/// - **Requires**: API key (set via settings as "fmp").
/// - **Coverage**: stocks, ETFs, and major crypto symbols.
/// - **Endpoint**: `/historical-price-full/{symbol}?from=&to=`.
///
/// The API returns entries newest-first; they are re-sorted ascending here.
/// Adjusted close is preferred over raw close when present.
pub struct FmpProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FmpProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL.to_string())
    }

    /// Point the provider at a different base URL (test servers).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let builder = Client::builder().timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
            base_url,
        }
    }
}

// ── FMP API response types ──────────────────────────────────────────

#[derive(Deserialize)]
struct FmpHistoricalResponse {
    historical: Option<Vec<FmpHistoricalPrice>>,
}

#[derive(Deserialize)]
struct FmpHistoricalPrice {
    date: String,
    close: f64,
    #[serde(rename = "adjClose")]
    adj_close: Option<f64>,
}

#[async_trait]
impl MarketDataProvider for FmpProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn get_price_range(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let url = format!(
            "{}/historical-price-full/{}",
            self.base_url,
            symbol.to_uppercase()
        );

        let resp: FmpHistoricalResponse = self
            .client
            .get(&url)
            .query(&[
                ("from", from.format("%Y-%m-%d").to_string()),
                ("to", to.format("%Y-%m-%d").to_string()),
                ("apikey", self.api_key.clone()),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER_NAME.into(),
                message: format!("Failed to parse historical data for {symbol}: {e}"),
            })?;

        let historical = resp
            .historical
            .filter(|h| !h.is_empty())
            .ok_or_else(|| CoreError::NoHistoricalData(symbol.to_uppercase()))?;

        let mut points: Vec<PricePoint> = historical
            .iter()
            .filter_map(|entry| {
                let date = NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d").ok()?;
                Some(PricePoint {
                    date,
                    price: entry.adj_close.unwrap_or(entry.close),
                })
            })
            .collect();

        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}
