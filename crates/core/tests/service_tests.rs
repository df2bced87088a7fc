// ═══════════════════════════════════════════════════════════════════
// Service & Integration Tests — MarketDataService, CalculationService,
// ComparisonService, FomoCalculator facade
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fomo_calculator_core::errors::CoreError;
use fomo_calculator_core::models::price::{PriceCache, PricePoint};
use fomo_calculator_core::providers::traits::MarketDataProvider;
use fomo_calculator_core::services::market_data_service::MarketDataService;
use fomo_calculator_core::FomoCalculator;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Mock Providers
// ═══════════════════════════════════════════════════════════════════

/// In-memory provider with a fixed price history per symbol.
/// Counts fetches so tests can assert on cache behavior.
struct MockMarketDataProvider {
    prices: HashMap<String, Vec<PricePoint>>,
    fetch_count: Arc<AtomicUsize>,
}

impl MockMarketDataProvider {
    fn new() -> (Self, Arc<AtomicUsize>) {
        let mut prices = HashMap::new();

        // AAPL: +50% over 2021 with a dip in autumn
        prices.insert(
            "AAPL".to_string(),
            vec![
                PricePoint { date: d(2021, 1, 4), price: 100.0 },
                PricePoint { date: d(2021, 4, 1), price: 110.0 },
                PricePoint { date: d(2021, 7, 1), price: 120.0 },
                PricePoint { date: d(2021, 10, 1), price: 110.0 },
                PricePoint { date: d(2021, 12, 31), price: 150.0 },
            ],
        );

        // TSLA: two points close together for nearest-date resolution
        prices.insert(
            "TSLA".to_string(),
            vec![
                PricePoint { date: d(2021, 1, 4), price: 700.0 },
                PricePoint { date: d(2021, 1, 8), price: 800.0 },
            ],
        );

        // DOWN: a clean loser
        prices.insert(
            "DOWN".to_string(),
            vec![
                PricePoint { date: d(2021, 1, 4), price: 100.0 },
                PricePoint { date: d(2021, 12, 31), price: 50.0 },
            ],
        );

        // BTC / SPY for comparison scenarios
        prices.insert(
            "BTC".to_string(),
            vec![
                PricePoint { date: d(2021, 1, 4), price: 30000.0 },
                PricePoint { date: d(2021, 12, 31), price: 45000.0 },
            ],
        );
        prices.insert(
            "SPY".to_string(),
            vec![
                PricePoint { date: d(2021, 1, 4), price: 370.0 },
                PricePoint { date: d(2021, 12, 31), price: 470.0 },
            ],
        );

        let fetch_count = Arc::new(AtomicUsize::new(0));
        (
            Self {
                prices,
                fetch_count: Arc::clone(&fetch_count),
            },
            fetch_count,
        )
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketDataProvider {
    fn name(&self) -> &str {
        "MockProvider"
    }

    async fn get_price_range(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let history = self
            .prices
            .get(&symbol.to_uppercase())
            .ok_or_else(|| CoreError::NoHistoricalData(symbol.to_uppercase()))?;
        Ok(history
            .iter()
            .filter(|p| p.date >= from && p.date <= to)
            .cloned()
            .collect())
    }
}

/// A provider that always fails (for testing fallback behavior).
struct FailingProvider;

#[async_trait]
impl MarketDataProvider for FailingProvider {
    fn name(&self) -> &str {
        "FailingProvider"
    }

    async fn get_price_range(
        &self,
        _symbol: &str,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        Err(CoreError::Api {
            provider: "FailingProvider".into(),
            message: "simulated outage".into(),
        })
    }
}

fn calculator_with_mock() -> (FomoCalculator, Arc<AtomicUsize>) {
    let (mock, fetch_count) = MockMarketDataProvider::new();
    let mut calc = FomoCalculator::new();
    calc.register_provider(Box::new(mock));
    (calc, fetch_count)
}

// ═══════════════════════════════════════════════════════════════════
//  MarketDataService
// ═══════════════════════════════════════════════════════════════════

mod market_data {
    use super::*;

    #[tokio::test]
    async fn no_provider_errors() {
        let service = MarketDataService::new();
        let mut cache = PriceCache::new();
        let result = service
            .get_price_range(&mut cache, "AAPL", d(2021, 1, 1), d(2021, 12, 31))
            .await;
        assert!(matches!(result, Err(CoreError::NoProvider)));
    }

    #[tokio::test]
    async fn falls_back_to_next_provider() {
        let (mock, _) = MockMarketDataProvider::new();
        let mut service = MarketDataService::new();
        service.register(Box::new(FailingProvider));
        service.register(Box::new(mock));
        let mut cache = PriceCache::new();

        let points = service
            .get_price_range(&mut cache, "AAPL", d(2021, 1, 1), d(2021, 12, 31))
            .await
            .unwrap();
        assert_eq!(points.len(), 5);
    }

    #[tokio::test]
    async fn last_provider_error_propagates() {
        let mut service = MarketDataService::new();
        service.register(Box::new(FailingProvider));
        let mut cache = PriceCache::new();

        let result = service
            .get_price_range(&mut cache, "AAPL", d(2021, 1, 1), d(2021, 12, 31))
            .await;
        assert!(matches!(result, Err(CoreError::Api { .. })));
    }

    #[tokio::test]
    async fn covered_range_is_served_from_cache() {
        let (mock, fetch_count) = MockMarketDataProvider::new();
        let mut service = MarketDataService::new();
        service.register(Box::new(mock));
        let mut cache = PriceCache::new();

        let first = service
            .get_price_range(&mut cache, "AAPL", d(2021, 1, 1), d(2021, 12, 31))
            .await
            .unwrap();
        assert_eq!(fetch_count.load(Ordering::SeqCst), 1);

        // Same range, and a sub-range, both come from cache
        let second = service
            .get_price_range(&mut cache, "AAPL", d(2021, 1, 1), d(2021, 12, 31))
            .await
            .unwrap();
        let sub = service
            .get_price_range(&mut cache, "AAPL", d(2021, 3, 1), d(2021, 8, 1))
            .await
            .unwrap();
        assert_eq!(fetch_count.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(sub.len(), 2); // Apr 1 + Jul 1
    }

    #[tokio::test]
    async fn sparse_points_alone_do_not_count_as_coverage() {
        let (mock, fetch_count) = MockMarketDataProvider::new();
        let mut service = MarketDataService::new();
        service.register(Box::new(mock));
        let mut cache = PriceCache::new();

        // Seed only the two boundary points, without coverage
        cache.set_price("AAPL", d(2021, 1, 4), 100.0);
        cache.set_price("AAPL", d(2021, 12, 31), 150.0);

        let points = service
            .get_price_range(&mut cache, "AAPL", d(2021, 1, 4), d(2021, 12, 31))
            .await
            .unwrap();

        // Must have gone to the provider and found the interior points too
        assert_eq!(fetch_count.load(Ordering::SeqCst), 1);
        assert_eq!(points.len(), 5);
    }

    #[tokio::test]
    async fn closest_price_picks_nearest_date() {
        let (mock, _) = MockMarketDataProvider::new();
        let mut service = MarketDataService::new();
        service.register(Box::new(mock));
        let mut cache = PriceCache::new();

        // TSLA trades on Jan 4 (700) and Jan 8 (800)
        let near_start = service
            .closest_price(&mut cache, "TSLA", d(2021, 1, 5))
            .await
            .unwrap();
        assert_eq!(near_start, 700.0);

        let near_end = service
            .closest_price(&mut cache, "TSLA", d(2021, 1, 7))
            .await
            .unwrap();
        assert_eq!(near_end, 800.0);
    }

    #[tokio::test]
    async fn closest_price_resolves_weekend_dates() {
        let (mock, _) = MockMarketDataProvider::new();
        let mut service = MarketDataService::new();
        service.register(Box::new(mock));
        let mut cache = PriceCache::new();

        // Saturday 2021-01-02: no trading data, nearest is Monday Jan 4
        let price = service
            .closest_price(&mut cache, "AAPL", d(2021, 1, 2))
            .await
            .unwrap();
        assert_eq!(price, 100.0);
    }

    #[tokio::test]
    async fn closest_price_outside_window_is_not_available() {
        let (mock, _) = MockMarketDataProvider::new();
        let mut service = MarketDataService::new();
        service.register(Box::new(mock));
        let mut cache = PriceCache::new();

        // Nearest AAPL sample to mid-February is weeks away — outside ±5 days
        let result = service
            .closest_price(&mut cache, "AAPL", d(2021, 2, 15))
            .await;
        assert!(matches!(result, Err(CoreError::PriceNotAvailable { .. })));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Investment Calculation (facade, end-to-end)
// ═══════════════════════════════════════════════════════════════════

mod calculation {
    use super::*;

    #[tokio::test]
    async fn profitable_investment_end_to_end() {
        let (mut calc, _) = calculator_with_mock();

        let result = calc
            .calculate_investment("AAPL", d(2021, 1, 4), d(2021, 12, 31), 1000.0)
            .await
            .unwrap();

        assert_eq!(result.asset_name, "AAPL");
        assert_eq!(result.entry_price, 100.0);
        assert_eq!(result.exit_price, 150.0);
        assert_eq!(result.investment_amount, 1000.0);
        // 10 shares × 150 = 1500 → +500 (+50%)
        assert!((result.profit_loss - 500.0).abs() < 1e-9);
        assert!((result.profit_loss_percentage - 50.0).abs() < 1e-9);
        assert!((result.shares() - 10.0).abs() < 1e-9);
        assert_eq!(result.historical_prices.len(), 5);
    }

    #[tokio::test]
    async fn pain_scale_counts_on_profit() {
        let (mut calc, _) = calculator_with_mock();

        let result = calc
            .calculate_investment("AAPL", d(2021, 1, 4), d(2021, 12, 31), 1000.0)
            .await
            .unwrap();

        // Defaults: pizza $15, vacation $2500, retirement $4000/month
        assert_eq!(result.pizza_count, 33); // floor(500 / 15)
        assert_eq!(result.vacation_count, 0); // floor(500 / 2500)
        let expected_years = 500.0 / 4000.0 / 12.0;
        assert!((result.retirement_years - expected_years).abs() < 1e-9);
    }

    #[tokio::test]
    async fn pain_scale_is_zero_on_loss() {
        let (mut calc, _) = calculator_with_mock();

        let result = calc
            .calculate_investment("DOWN", d(2021, 1, 4), d(2021, 12, 31), 1000.0)
            .await
            .unwrap();

        assert!(result.profit_loss < 0.0);
        assert_eq!(result.pizza_count, 0);
        assert_eq!(result.vacation_count, 0);
        assert_eq!(result.retirement_years, 0.0);
    }

    #[tokio::test]
    async fn derived_metrics_are_attached() {
        let (mut calc, _) = calculator_with_mock();

        let result = calc
            .calculate_investment("AAPL", d(2021, 1, 4), d(2021, 12, 31), 1000.0)
            .await
            .unwrap();

        // Peak 120 → trough 110: (120−110)/120 × 100
        let expected_dd = 10.0 / 120.0 * 100.0;
        assert!((result.metrics.max_drawdown_pct - expected_dd).abs() < 1e-9);
        assert!(result.metrics.volatility_pct > 0.0);
        // ~1 year holding period: annualized stays near the total return
        assert!(result.metrics.annualized_return_pct > 45.0);
        assert!(result.metrics.sharpe_ratio.is_finite());
    }

    #[tokio::test]
    async fn symbol_is_uppercased_and_trimmed() {
        let (mut calc, _) = calculator_with_mock();

        let result = calc
            .calculate_investment(" aapl ", d(2021, 1, 4), d(2021, 12, 31), 1000.0)
            .await
            .unwrap();
        assert_eq!(result.asset_name, "AAPL");
    }

    #[tokio::test]
    async fn repeated_query_is_served_from_cache() {
        let (mut calc, fetch_count) = calculator_with_mock();

        calc.calculate_investment("AAPL", d(2021, 1, 4), d(2021, 12, 31), 1000.0)
            .await
            .unwrap();
        let first_round = fetch_count.load(Ordering::SeqCst);
        assert!(first_round >= 1);

        calc.calculate_investment("AAPL", d(2021, 1, 4), d(2021, 12, 31), 2000.0)
            .await
            .unwrap();
        assert_eq!(fetch_count.load(Ordering::SeqCst), first_round);
    }

    #[tokio::test]
    async fn unknown_symbol_propagates_upstream_error() {
        let (mut calc, _) = calculator_with_mock();

        let result = calc
            .calculate_investment("NOPE", d(2021, 1, 4), d(2021, 12, 31), 1000.0)
            .await;
        assert!(matches!(result, Err(CoreError::NoHistoricalData(_))));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Input validation
// ═══════════════════════════════════════════════════════════════════

mod validation {
    use super::*;

    #[tokio::test]
    async fn empty_symbol_is_rejected() {
        let (mut calc, fetch_count) = calculator_with_mock();
        let result = calc
            .calculate_investment("   ", d(2021, 1, 4), d(2021, 12, 31), 1000.0)
            .await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
        // Rejected before any fetch
        assert_eq!(fetch_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected() {
        let (mut calc, _) = calculator_with_mock();
        for amount in [0.0, -100.0, f64::NAN] {
            let result = calc
                .calculate_investment("AAPL", d(2021, 1, 4), d(2021, 12, 31), amount)
                .await;
            assert!(matches!(result, Err(CoreError::ValidationError(_))));
        }
    }

    #[tokio::test]
    async fn exit_before_entry_is_rejected() {
        let (mut calc, _) = calculator_with_mock();
        let result = calc
            .calculate_investment("AAPL", d(2021, 12, 31), d(2021, 1, 4), 1000.0)
            .await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn same_day_entry_and_exit_is_allowed() {
        let (mut calc, _) = calculator_with_mock();
        let result = calc
            .calculate_investment("AAPL", d(2021, 1, 4), d(2021, 1, 4), 1000.0)
            .await
            .unwrap();
        assert_eq!(result.entry_price, result.exit_price);
        assert_eq!(result.profit_loss, 0.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Comparisons
// ═══════════════════════════════════════════════════════════════════

mod comparison {
    use super::*;

    #[test]
    fn three_predefined_scenarios() {
        let (calc, _) = calculator_with_mock();
        let ids: Vec<&str> = calc
            .comparison_scenarios()
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, ["btc-vs-sp500", "eth-vs-tesla", "btc-vs-gold"]);
    }

    #[tokio::test]
    async fn comparison_runs_both_assets() {
        let (mut calc, _) = calculator_with_mock();

        let result = calc
            .calculate_comparison("btc-vs-sp500", d(2021, 1, 4), d(2021, 12, 31), 1000.0)
            .await
            .unwrap();

        assert_eq!(result.scenario.id, "btc-vs-sp500");
        assert_eq!(result.asset1_result.asset_name, "BTC");
        assert_eq!(result.asset2_result.asset_name, "SPY");

        // BTC: 30000 → 45000 = +50%; SPY: 370 → 470 ≈ +27%
        assert!((result.asset1_result.profit_loss_percentage - 50.0).abs() < 1e-9);
        assert!(result.asset2_result.profit_loss_percentage > 25.0);
        assert_eq!(result.asset1_result.investment_amount, 1000.0);
        assert_eq!(result.asset2_result.investment_amount, 1000.0);
    }

    #[tokio::test]
    async fn unknown_scenario_id_is_rejected() {
        let (mut calc, _) = calculator_with_mock();
        let result = calc
            .calculate_comparison("doge-vs-everything", d(2021, 1, 4), d(2021, 12, 31), 1000.0)
            .await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Facade — providers, settings, cache, scenarios
// ═══════════════════════════════════════════════════════════════════

mod facade {
    use super::*;

    #[test]
    fn new_calculator_has_no_provider() {
        let calc = FomoCalculator::new();
        assert!(!calc.has_market_data_provider());
    }

    #[test]
    fn setting_fmp_key_registers_provider() {
        let mut calc = FomoCalculator::new();
        calc.set_api_key("fmp".into(), "demo-key".into());
        assert!(calc.has_market_data_provider());
        assert_eq!(calc.provider_names(), ["Financial Modeling Prep"]);

        assert!(calc.remove_api_key("fmp"));
        assert!(!calc.has_market_data_provider());
        assert!(!calc.remove_api_key("fmp"));
    }

    #[tokio::test]
    async fn cache_management_round_trip() {
        let (mut calc, _) = calculator_with_mock();
        assert_eq!(calc.cache_total_entries(), 0);

        calc.calculate_investment("AAPL", d(2021, 1, 4), d(2021, 12, 31), 1000.0)
            .await
            .unwrap();
        assert_eq!(calc.cache_total_entries(), 5);
        assert_eq!(calc.cache_symbol_count(), 1);
        assert_eq!(calc.get_cached_price("AAPL", d(2021, 7, 1)), Some(120.0));

        let removed = calc.cache_prune_before(d(2021, 6, 1));
        assert_eq!(removed, 2);

        calc.cache_clear();
        assert_eq!(calc.cache_total_entries(), 0);
    }

    #[tokio::test]
    async fn manually_cached_prices_serve_offline_queries() {
        let mut calc = FomoCalculator::new();
        assert!(!calc.has_market_data_provider());

        calc.set_cached_prices(
            "OFFL",
            &[
                PricePoint { date: d(2021, 1, 4), price: 10.0 },
                PricePoint { date: d(2021, 1, 8), price: 10.0 },
                PricePoint { date: d(2021, 6, 1), price: 12.0 },
                PricePoint { date: d(2021, 12, 20), price: 20.0 },
                PricePoint { date: d(2021, 12, 31), price: 20.0 },
            ],
        );

        // Entry/exit closest-price windows (±5 days) stay inside the covered
        // span, so the whole query works without any provider.
        let result = calc
            .calculate_investment("OFFL", d(2021, 1, 10), d(2021, 12, 20), 1000.0)
            .await
            .unwrap();
        assert!((result.profit_loss_percentage - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn preset_scenario_from_real_result() {
        let (mut calc, _) = calculator_with_mock();
        let base = calc
            .calculate_investment("AAPL", d(2021, 1, 4), d(2021, 12, 31), 1000.0)
            .await
            .unwrap();

        let scenario = calc.generate_preset_scenario(&base, "crypto").unwrap();
        assert_eq!(scenario.name, "Crypto Basket");
        assert_eq!(scenario.historical_prices.len(), base.historical_prices.len());

        let err = calc.generate_preset_scenario(&base, "unknown");
        assert!(matches!(err, Err(CoreError::ValidationError(_))));
    }

    #[test]
    fn risk_free_rate_feeds_sharpe() {
        let mut calc = FomoCalculator::new();
        let series = vec![
            PricePoint { date: d(2023, 1, 1), price: 100.0 },
            PricePoint { date: d(2024, 1, 1), price: 110.0 },
        ];

        let default_rf = calc.derived_metrics(&series, 10.0);
        calc.set_risk_free_rate(5.0);
        let raised_rf = calc.derived_metrics(&series, 10.0);

        assert!(raised_rf.sharpe_ratio < default_rf.sharpe_ratio);
    }
}
