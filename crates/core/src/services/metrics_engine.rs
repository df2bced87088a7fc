use crate::models::metrics::DerivedMetrics;
use crate::models::price::PricePoint;

/// Computes risk/return metrics from a price series: volatility, max
/// drawdown, annualized return, and Sharpe ratio.
///
/// Pure functions, no I/O, no hidden state — identical inputs always produce
/// bit-identical outputs. Malformed input (empty or single-point series) is
/// handled with defined fallback values rather than errors: this is a
/// recreational calculator, and a less meaningful number beats an error page.
///
/// The upstream data source does not guarantee chronological order, so every
/// entry point sorts defensively and de-duplicates dates last-seen-wins.
pub struct MetricsEngine;

impl MetricsEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute all four metrics over a single defensive sort of the series.
    ///
    /// `total_return_pct` is the realized total return of the holding period
    /// (already known from the entry/exit prices, not re-derived here).
    #[must_use]
    pub fn compute(
        &self,
        series: &[PricePoint],
        total_return_pct: f64,
        risk_free_rate_pct: f64,
    ) -> DerivedMetrics {
        let sorted = Self::normalize(series);
        let volatility_pct = Self::volatility_of_sorted(&sorted);
        let max_drawdown_pct = Self::max_drawdown_of_sorted(&sorted);
        let annualized_return_pct = Self::annualized_return_of_sorted(&sorted, total_return_pct);
        let sharpe_ratio =
            self.compute_sharpe_ratio(annualized_return_pct, volatility_pct, risk_free_rate_pct);

        DerivedMetrics {
            volatility_pct,
            max_drawdown_pct,
            annualized_return_pct,
            sharpe_ratio,
        }
    }

    /// Percent population standard deviation of period-over-period simple
    /// returns. Fewer than 2 points → 0.
    ///
    /// Pairs whose base price is not strictly positive (or not finite) are
    /// skipped: the input contract assumes positive prices, and skipping is
    /// the documented policy for violations — no NaN or Infinity escapes.
    #[must_use]
    pub fn compute_volatility(&self, series: &[PricePoint]) -> f64 {
        Self::volatility_of_sorted(&Self::normalize(series))
    }

    /// Largest percent peak-to-trough decline observed anywhere in the
    /// series, in [0, 100]. Fewer than 2 points → 0. Equal consecutive
    /// prices neither move the peak nor register a drawdown.
    #[must_use]
    pub fn compute_max_drawdown(&self, series: &[PricePoint]) -> f64 {
        Self::max_drawdown_of_sorted(&Self::normalize(series))
    }

    /// Total return normalized to a one-year compounding horizon, percent.
    ///
    /// Elapsed time is calendar days / 365. Holding periods under 0.1 years
    /// (~36 days) return `total_return_pct` unchanged — compounding a few
    /// days to a year produces absurd figures, so the contract short-circuits.
    /// Total returns at or below −100% also pass through unchanged rather
    /// than raising a negative base to a fractional power.
    #[must_use]
    pub fn compute_annualized_return(&self, series: &[PricePoint], total_return_pct: f64) -> f64 {
        Self::annualized_return_of_sorted(&Self::normalize(series), total_return_pct)
    }

    /// Excess annualized return per unit of volatility.
    ///
    /// Zero volatility substitutes a denominator of 1 instead of dividing by
    /// zero. That keeps flat/short series from producing Infinity, at the
    /// cost of the resulting ratio not being meaningful — see
    /// [`DerivedMetrics::sharpe_quality`].
    ///
    /// [`DerivedMetrics::sharpe_quality`]: crate::models::metrics::DerivedMetrics::sharpe_quality
    #[must_use]
    pub fn compute_sharpe_ratio(
        &self,
        annualized_return_pct: f64,
        volatility_pct: f64,
        risk_free_rate_pct: f64,
    ) -> f64 {
        let denominator = if volatility_pct == 0.0 {
            1.0
        } else {
            volatility_pct
        };
        (annualized_return_pct - risk_free_rate_pct) / denominator
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Sort ascending by date and de-duplicate dates, last-seen-wins.
    /// Stable sort keeps the original relative order of equal dates, so the
    /// later occurrence in the input is the one kept.
    fn normalize(series: &[PricePoint]) -> Vec<PricePoint> {
        let mut sorted = series.to_vec();
        sorted.sort_by_key(|p| p.date);

        let mut deduped: Vec<PricePoint> = Vec::with_capacity(sorted.len());
        for point in sorted {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }
        deduped
    }

    fn volatility_of_sorted(series: &[PricePoint]) -> f64 {
        if series.len() < 2 {
            return 0.0;
        }

        let returns: Vec<f64> = series
            .windows(2)
            .filter(|w| w[0].price > 0.0 && w[0].price.is_finite() && w[1].price.is_finite())
            .map(|w| (w[1].price - w[0].price) / w[0].price)
            .collect();

        if returns.is_empty() {
            return 0.0;
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        // Population variance (divide by N, not N−1)
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

        variance.sqrt() * 100.0
    }

    fn max_drawdown_of_sorted(series: &[PricePoint]) -> f64 {
        if series.len() < 2 {
            return 0.0;
        }

        let mut peak = series[0].price;
        let mut max_drawdown = 0.0_f64;

        for point in &series[1..] {
            if point.price > peak {
                peak = point.price;
            } else if peak > 0.0 {
                let drawdown = (peak - point.price) / peak;
                max_drawdown = max_drawdown.max(drawdown);
            }
        }

        max_drawdown * 100.0
    }

    fn annualized_return_of_sorted(series: &[PricePoint], total_return_pct: f64) -> f64 {
        if series.len() < 2 {
            return total_return_pct;
        }

        let first = series.first().map(|p| p.date).unwrap_or_default();
        let last = series.last().map(|p| p.date).unwrap_or_default();
        let years = (last - first).num_days() as f64 / 365.0;

        // Short horizons make compounded figures unreliable — pass through.
        if years < 0.1 {
            return total_return_pct;
        }

        let base = 1.0 + total_return_pct / 100.0;
        // A total loss of 100%+ would put a non-positive base under a
        // fractional exponent. Not reachable when profit is bounded at
        // −investment, but guarded explicitly rather than returning NaN.
        if base <= 0.0 {
            return total_return_pct;
        }

        (base.powf(1.0 / years) - 1.0) * 100.0
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}
