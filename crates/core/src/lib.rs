pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use chrono::NaiveDate;
use rand::Rng;

use errors::CoreError;
use models::{
    investment::InvestmentResult,
    metrics::DerivedMetrics,
    price::{PriceCache, PricePoint},
    scenario::{ComparisonResult, ComparisonScenario, ScenarioPreset, ScenarioResult},
    settings::{PainScale, Settings},
};
use providers::fmp::FmpProvider;
use providers::traits::MarketDataProvider;
use services::{
    calculation_service::CalculationService, comparison_service::ComparisonService,
    market_data_service::MarketDataService, metrics_engine::MetricsEngine,
    scenario_service::ScenarioService,
};

/// Main entry point for the FOMO Calculator core library.
///
/// Holds the configuration, the price cache, and all services needed to
/// answer "what if I had invested" queries: real outcomes with derived risk
/// metrics, pain-scale framing, synthetic what-if scenarios, and head-to-head
/// asset comparisons.
#[must_use]
pub struct FomoCalculator {
    settings: Settings,
    price_cache: PriceCache,
    market_service: MarketDataService,
    calculation_service: CalculationService,
    comparison_service: ComparisonService,
    scenario_service: ScenarioService,
    metrics_engine: MetricsEngine,
}

impl std::fmt::Debug for FomoCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FomoCalculator")
            .field("settings", &self.settings)
            .field("cached_prices", &self.price_cache.total_entries())
            .field("providers", &self.market_service.provider_names())
            .finish()
    }
}

impl FomoCalculator {
    /// Create a calculator with default settings and no API keys.
    /// Market data fetches fail with `NoProvider` until a key is set or a
    /// provider is registered manually.
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Create a calculator from explicit settings.
    pub fn with_settings(settings: Settings) -> Self {
        let market_service = Self::build_market_service(&settings);
        Self {
            settings,
            price_cache: PriceCache::new(),
            market_service,
            calculation_service: CalculationService::new(),
            comparison_service: ComparisonService::new(),
            scenario_service: ScenarioService::new(),
            metrics_engine: MetricsEngine::new(),
        }
    }

    // ── Investment Calculation ──────────────────────────────────────

    /// Run the full investment calculation for one query.
    ///
    /// Validates the request, resolves entry/exit prices (closest trading
    /// day), computes profit/loss, pain-scale counts, and derived metrics
    /// over the holding-period price history.
    pub async fn calculate_investment(
        &mut self,
        symbol: &str,
        entry_date: NaiveDate,
        exit_date: NaiveDate,
        amount: f64,
    ) -> Result<InvestmentResult, CoreError> {
        Self::validate_query(symbol, entry_date, exit_date, amount)?;

        self.calculation_service
            .calculate_investment(
                &self.market_service,
                &mut self.price_cache,
                &self.settings,
                symbol.trim(),
                entry_date,
                exit_date,
                amount,
            )
            .await
    }

    // ── Derived Metrics ─────────────────────────────────────────────

    /// Compute the four derived metrics for an arbitrary price series and
    /// realized total return. Pure, synchronous, never fails — malformed
    /// series get the documented fallback values.
    #[must_use]
    pub fn derived_metrics(&self, series: &[PricePoint], total_return_pct: f64) -> DerivedMetrics {
        self.metrics_engine
            .compute(series, total_return_pct, self.settings.risk_free_rate_pct)
    }

    // ── What-If Scenarios ───────────────────────────────────────────

    /// The built-in what-if scenario presets.
    #[must_use]
    pub fn scenario_presets(&self) -> &[ScenarioPreset] {
        self.scenario_service.all_presets()
    }

    /// Generate a synthetic comparison scenario from a real result.
    /// Uses the thread RNG — output differs per call by design.
    #[must_use]
    pub fn generate_scenario(
        &self,
        base: &InvestmentResult,
        multiplier: f64,
        label: &str,
    ) -> ScenarioResult {
        self.scenario_service.generate_scenario(base, multiplier, label)
    }

    /// Generate a synthetic comparison scenario from an injected random
    /// source. Seeded RNGs make the output reproducible.
    #[must_use]
    pub fn generate_scenario_with_rng<R: Rng + ?Sized>(
        &self,
        base: &InvestmentResult,
        multiplier: f64,
        label: &str,
        rng: &mut R,
    ) -> ScenarioResult {
        self.scenario_service
            .generate_scenario_with_rng(base, multiplier, label, rng)
    }

    /// Generate a scenario from a built-in preset id.
    pub fn generate_preset_scenario(
        &self,
        base: &InvestmentResult,
        preset_id: &str,
    ) -> Result<ScenarioResult, CoreError> {
        let preset = self
            .scenario_service
            .preset_by_id(preset_id)
            .ok_or_else(|| {
                CoreError::ValidationError(format!("Invalid scenario preset ID: {preset_id}"))
            })?;
        Ok(self
            .scenario_service
            .generate_scenario(base, preset.multiplier, &preset.name))
    }

    // ── Head-to-Head Comparisons ────────────────────────────────────

    /// The predefined head-to-head comparison scenarios.
    #[must_use]
    pub fn comparison_scenarios(&self) -> &[ComparisonScenario] {
        self.comparison_service.all_scenarios()
    }

    /// Run both assets of a predefined comparison through the full
    /// investment calculation with identical dates and amount.
    pub async fn calculate_comparison(
        &mut self,
        scenario_id: &str,
        entry_date: NaiveDate,
        exit_date: NaiveDate,
        amount: f64,
    ) -> Result<ComparisonResult, CoreError> {
        // Symbols come from the scenario itself; validate the rest.
        Self::validate_query("comparison", entry_date, exit_date, amount)?;

        self.comparison_service
            .calculate_comparison(
                &self.market_service,
                &mut self.price_cache,
                &self.settings,
                scenario_id,
                entry_date,
                exit_date,
                amount,
            )
            .await
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Get current settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Set an API key for a provider (e.g., "fmp").
    /// Rebuilds the provider stack so the new key takes effect immediately.
    pub fn set_api_key(&mut self, provider: String, key: String) {
        self.settings.api_keys.insert(provider, key);
        self.market_service = Self::build_market_service(&self.settings);
    }

    /// Remove an API key for a provider.
    /// Rebuilds the provider stack so the removal takes effect immediately.
    pub fn remove_api_key(&mut self, provider: &str) -> bool {
        let removed = self.settings.api_keys.remove(provider).is_some();
        if removed {
            self.market_service = Self::build_market_service(&self.settings);
        }
        removed
    }

    /// Set the risk-free rate used for the Sharpe ratio, percent.
    pub fn set_risk_free_rate(&mut self, rate_pct: f64) {
        self.settings.risk_free_rate_pct = rate_pct;
    }

    /// Replace the pain-scale unit prices.
    pub fn set_pain_scale(&mut self, pain_scale: PainScale) {
        self.settings.pain_scale = pain_scale;
    }

    // ── Providers ───────────────────────────────────────────────────

    /// Register a custom market data provider (lowest priority).
    /// Useful for tests and offline data sources.
    pub fn register_provider(&mut self, provider: Box<dyn MarketDataProvider>) {
        self.market_service.register(provider);
    }

    /// Check if at least one market data provider is available.
    #[must_use]
    pub fn has_market_data_provider(&self) -> bool {
        self.market_service.has_provider()
    }

    /// Names of the registered providers, in priority order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.market_service.provider_names()
    }

    // ── Cache Management ────────────────────────────────────────────

    /// Get the total number of cached price points.
    #[must_use]
    pub fn cache_total_entries(&self) -> usize {
        self.price_cache.total_entries()
    }

    /// Get the number of distinct symbols cached.
    #[must_use]
    pub fn cache_symbol_count(&self) -> usize {
        self.price_cache.symbol_count()
    }

    /// Get a specific cached price.
    #[must_use]
    pub fn get_cached_price(&self, symbol: &str, date: NaiveDate) -> Option<f64> {
        self.price_cache.get_price(symbol, date)
    }

    /// Manually insert a price into the cache (offline data, tests,
    /// historical import).
    pub fn set_cached_price(&mut self, symbol: &str, date: NaiveDate, price: f64) {
        self.price_cache.set_price(symbol, date, price);
    }

    /// Manually insert a batch of prices into the cache. The span from the
    /// earliest to the latest point is treated as fully covered, so range
    /// queries inside it are served without hitting any provider.
    pub fn set_cached_prices(&mut self, symbol: &str, points: &[PricePoint]) {
        let from = points.iter().map(|p| p.date).min();
        let to = points.iter().map(|p| p.date).max();
        match (from, to) {
            (Some(from), Some(to)) => self.price_cache.set_price_range(symbol, from, to, points),
            _ => self.price_cache.set_prices(symbol, points),
        }
    }

    /// Remove all cached price points older than `before` date.
    /// Returns the number of entries removed.
    pub fn cache_prune_before(&mut self, before: NaiveDate) -> usize {
        self.price_cache.prune_before(before)
    }

    /// Clear all cached price data.
    pub fn cache_clear(&mut self) {
        self.price_cache.clear();
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build_market_service(settings: &Settings) -> MarketDataService {
        let mut service = MarketDataService::new();

        // Financial Modeling Prep — requires API key
        if let Some(key) = settings.api_keys.get("fmp") {
            service.register(Box::new(FmpProvider::new(key.clone())));
        }

        service
    }

    fn validate_query(
        symbol: &str,
        entry_date: NaiveDate,
        exit_date: NaiveDate,
        amount: f64,
    ) -> Result<(), CoreError> {
        if symbol.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Asset symbol is required".into(),
            ));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::ValidationError(
                "Investment amount must be greater than 0".into(),
            ));
        }
        if exit_date < entry_date {
            return Err(CoreError::ValidationError(
                "Exit date must be after entry date".into(),
            ));
        }
        Ok(())
    }
}

impl Default for FomoCalculator {
    fn default() -> Self {
        Self::new()
    }
}
