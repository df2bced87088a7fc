use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::price::PriceCache;
use crate::models::scenario::{ComparisonResult, ComparisonScenario};
use crate::models::settings::Settings;
use crate::services::calculation_service::CalculationService;
use crate::services::market_data_service::MarketDataService;

/// Runs predefined head-to-head asset comparisons.
///
/// Each scenario pits two real assets against each other: both are run
/// through the full investment calculation with identical dates and amount.
pub struct ComparisonService {
    scenarios: Vec<ComparisonScenario>,
    calculation_service: CalculationService,
}

impl ComparisonService {
    pub fn new() -> Self {
        Self {
            scenarios: Self::predefined_scenarios(),
            calculation_service: CalculationService::new(),
        }
    }

    /// All predefined comparison scenarios.
    pub fn all_scenarios(&self) -> &[ComparisonScenario] {
        &self.scenarios
    }

    /// Look up a scenario by its id.
    pub fn scenario_by_id(&self, id: &str) -> Option<&ComparisonScenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub async fn calculate_comparison(
        &self,
        market: &MarketDataService,
        cache: &mut PriceCache,
        settings: &Settings,
        scenario_id: &str,
        entry_date: NaiveDate,
        exit_date: NaiveDate,
        amount: f64,
    ) -> Result<ComparisonResult, CoreError> {
        tracing::info!(
            "Calculating comparison for scenario {scenario_id}: entry {entry_date}, exit {exit_date}, amount ${amount}"
        );

        let scenario = self.scenario_by_id(scenario_id).cloned().ok_or_else(|| {
            CoreError::ValidationError(format!("Invalid comparison scenario ID: {scenario_id}"))
        })?;

        let asset1_result = self
            .calculation_service
            .calculate_investment(
                market,
                cache,
                settings,
                &scenario.asset1_symbol,
                entry_date,
                exit_date,
                amount,
            )
            .await?;

        let asset2_result = self
            .calculation_service
            .calculate_investment(
                market,
                cache,
                settings,
                &scenario.asset2_symbol,
                entry_date,
                exit_date,
                amount,
            )
            .await?;

        tracing::info!("Comparison calculation completed for scenario {scenario_id}");

        Ok(ComparisonResult {
            scenario,
            asset1_result,
            asset2_result,
        })
    }

    fn predefined_scenarios() -> Vec<ComparisonScenario> {
        vec![
            ComparisonScenario {
                id: "btc-vs-sp500".into(),
                label: "Bitcoin vs S&P 500".into(),
                asset1_symbol: "BTC".into(),
                asset2_symbol: "SPY".into(),
                asset1_name: "Bitcoin".into(),
                asset2_name: "S&P 500".into(),
                description: "Compare Bitcoin's performance against the traditional S&P 500 index"
                    .into(),
            },
            ComparisonScenario {
                id: "eth-vs-tesla".into(),
                label: "Ethereum vs Tesla".into(),
                asset1_symbol: "ETH".into(),
                asset2_symbol: "TSLA".into(),
                asset1_name: "Ethereum".into(),
                asset2_name: "Tesla".into(),
                description: "Compare Ethereum's growth against Tesla's meteoric rise".into(),
            },
            ComparisonScenario {
                id: "btc-vs-gold".into(),
                label: "Bitcoin vs Gold".into(),
                asset1_symbol: "BTC".into(),
                asset2_symbol: "GLD".into(),
                asset1_name: "Bitcoin".into(),
                asset2_name: "Gold".into(),
                description:
                    "Digital gold vs Traditional gold: Compare Bitcoin with the classic store of value"
                        .into(),
            },
        ]
    }
}

impl Default for ComparisonService {
    fn default() -> Self {
        Self::new()
    }
}
