use rand::Rng;

use crate::models::investment::InvestmentResult;
use crate::models::price::PricePoint;
use crate::models::scenario::{ScenarioPreset, ScenarioResult};

/// Lower bound of the per-point noise factor.
const NOISE_MIN: f64 = 0.9;
/// Upper bound of the per-point noise factor.
const NOISE_MAX: f64 = 1.1;

/// Generates synthetic "what if you had invested in X instead" projections
/// without calling any external data source.
///
/// Each base price is scaled by `multiplier × U[0.9, 1.1]` with an
/// independent draw per point, so the synthetic series tracks the shape of
/// the real one without being a perfectly smooth multiple of it.
///
/// **Non-determinism is intentional**: the convenience [`generate_scenario`]
/// draws from the thread RNG and produces different output on every call.
/// Callers that need reproducible output (tests, cached renders) use
/// [`generate_scenario_with_rng`] with a seeded RNG.
///
/// [`generate_scenario`]: ScenarioService::generate_scenario
/// [`generate_scenario_with_rng`]: ScenarioService::generate_scenario_with_rng
pub struct ScenarioService {
    presets: Vec<ScenarioPreset>,
}

impl ScenarioService {
    pub fn new() -> Self {
        Self {
            presets: ScenarioPreset::defaults(),
        }
    }

    /// All built-in scenario presets.
    pub fn all_presets(&self) -> &[ScenarioPreset] {
        &self.presets
    }

    /// Look up a preset by its id.
    pub fn preset_by_id(&self, id: &str) -> Option<&ScenarioPreset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Generate a scenario using the thread RNG. Output differs per call.
    #[must_use]
    pub fn generate_scenario(
        &self,
        base: &InvestmentResult,
        multiplier: f64,
        label: &str,
    ) -> ScenarioResult {
        self.generate_scenario_with_rng(base, multiplier, label, &mut rand::rng())
    }

    /// Generate a scenario from an injected random source.
    ///
    /// Always succeeds for a well-formed base: a single-point series yields
    /// `entry == exit` and a 0% return; an empty base yields an empty series.
    ///
    /// The summary return uses only the first and last synthetic points (no
    /// compounding of intermediate points), and the absolute profit/loss is
    /// the synthetic price delta scaled by the share count implied by the
    /// real investment (`investment_amount / entry_price`).
    #[must_use]
    pub fn generate_scenario_with_rng<R: Rng + ?Sized>(
        &self,
        base: &InvestmentResult,
        multiplier: f64,
        label: &str,
        rng: &mut R,
    ) -> ScenarioResult {
        let historical_prices: Vec<PricePoint> = base
            .historical_prices
            .iter()
            .map(|p| PricePoint {
                date: p.date,
                price: p.price * multiplier * rng.random_range(NOISE_MIN..=NOISE_MAX),
            })
            .collect();

        let (profit_loss_percentage, profit_loss) = match (
            historical_prices.first(),
            historical_prices.last(),
        ) {
            (Some(first), Some(last)) if first.price > 0.0 => {
                let pct = (last.price - first.price) / first.price * 100.0;
                let shares = base.investment_amount / base.entry_price;
                let pl = (last.price - first.price) * shares;
                (pct, pl)
            }
            _ => (0.0, 0.0),
        };

        ScenarioResult {
            name: label.to_string(),
            profit_loss_percentage,
            profit_loss,
            historical_prices,
        }
    }
}

impl Default for ScenarioService {
    fn default() -> Self {
        Self::new()
    }
}
