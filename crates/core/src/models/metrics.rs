use serde::{Deserialize, Serialize};

/// Risk classification derived from volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Volatility ≤ 10%
    Low,
    /// Volatility in (10%, 20%]
    Medium,
    /// Volatility > 20%
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low risk"),
            RiskLevel::Medium => write!(f, "Medium risk"),
            RiskLevel::High => write!(f, "High risk"),
        }
    }
}

/// Qualitative band for a Sharpe ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SharpeQuality {
    /// Sharpe ratio > 1
    Excellent,
    /// Sharpe ratio in (0, 1]
    Good,
    /// Sharpe ratio ≤ 0
    Poor,
}

impl std::fmt::Display for SharpeQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SharpeQuality::Excellent => write!(f, "Excellent"),
            SharpeQuality::Good => write!(f, "Good"),
            SharpeQuality::Poor => write!(f, "Poor"),
        }
    }
}

/// The four scalar risk/return metrics derived from a price series.
///
/// A pure view of the series — recomputed for every result, never stored
/// independently. All percentages are whole-number scale (10.0 == 10%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    /// Percent standard deviation of period-over-period simple returns
    pub volatility_pct: f64,

    /// Largest percent decline from a running peak, in [0, 100]
    pub max_drawdown_pct: f64,

    /// Total return normalized to a one-year compounding horizon, percent
    pub annualized_return_pct: f64,

    /// Excess annualized return per unit of volatility (dimensionless)
    pub sharpe_ratio: f64,
}

impl DerivedMetrics {
    /// Classify volatility into the display risk bands.
    #[must_use]
    pub fn volatility_risk(&self) -> RiskLevel {
        if self.volatility_pct > 20.0 {
            RiskLevel::High
        } else if self.volatility_pct > 10.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Classify the Sharpe ratio into the display quality bands.
    ///
    /// A ratio computed against near-zero volatility (flat or very short
    /// series) is not meaningful — the engine substitutes a denominator of 1
    /// in that case, so callers should treat the band as indicative only.
    #[must_use]
    pub fn sharpe_quality(&self) -> SharpeQuality {
        if self.sharpe_ratio > 1.0 {
            SharpeQuality::Excellent
        } else if self.sharpe_ratio > 0.0 {
            SharpeQuality::Good
        } else {
            SharpeQuality::Poor
        }
    }
}
