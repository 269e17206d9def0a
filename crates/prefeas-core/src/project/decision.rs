use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::project::assumptions::Thresholds;

/// Below `threshold × MIN_WIDE_FAIL` a min-type metric fails by a wide margin.
const MIN_WIDE_FAIL: Decimal = dec!(0.75);
/// Above `threshold × MAX_WIDE_FAIL` a max-type metric fails by a wide margin.
const MAX_WIDE_FAIL: Decimal = dec!(1.15);
/// Wide failures needed for a NOT VIABLE verdict.
const NOT_VIABLE_FAILS: usize = 4;

/// Whether the threshold is a floor or a ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    Min,
    Max,
}

/// Go / no-go verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "VIABLE")]
    Viable,
    #[serde(rename = "CAUTION")]
    Caution,
    #[serde(rename = "NOT VIABLE")]
    NotViable,
}

impl Verdict {
    /// Display colour used by the dashboard (hex RGB).
    pub fn color(&self) -> &'static str {
        match self {
            Verdict::Viable => "#10B981",
            Verdict::Caution => "#F59E0B",
            Verdict::NotViable => "#EF4444",
        }
    }

    /// Ordering from worst (0) to best (2).
    pub fn rank(&self) -> u8 {
        match self {
            Verdict::NotViable => 0,
            Verdict::Caution => 1,
            Verdict::Viable => 2,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Verdict::Viable => "VIABLE",
            Verdict::Caution => "CAUTION",
            Verdict::NotViable => "NOT VIABLE",
        };
        f.write_str(s)
    }
}

/// Traffic-light classification of a single value against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellTone {
    Good,
    Marginal,
    Poor,
}

impl CellTone {
    /// Classify with the standard 0.75 / 1.15 marginal bands.
    pub fn classify(value: Decimal, threshold: Decimal, bound: Bound) -> Self {
        match bound {
            Bound::Min => Self::classify_min(value, threshold, MIN_WIDE_FAIL),
            Bound::Max => Self::classify_max(value, threshold, MAX_WIDE_FAIL),
        }
    }

    /// Min-type classification with a custom marginal band (e.g. 0.85 for MOIC).
    pub fn classify_min(value: Decimal, threshold: Decimal, band: Decimal) -> Self {
        if value >= threshold {
            CellTone::Good
        } else if value >= threshold.saturating_mul(band) {
            CellTone::Marginal
        } else {
            CellTone::Poor
        }
    }

    pub fn classify_max(value: Decimal, threshold: Decimal, band: Decimal) -> Self {
        if value <= threshold {
            CellTone::Good
        } else if value <= threshold.saturating_mul(band) {
            CellTone::Marginal
        } else {
            CellTone::Poor
        }
    }
}

/// One metric compared against its threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCheck {
    pub name: String,
    pub value: Decimal,
    pub threshold: Decimal,
    pub bound: Bound,
    pub passes: bool,
    /// Misses the threshold by more than the tolerance band
    pub wide_fail: bool,
}

impl ThresholdCheck {
    fn new(name: &str, value: Decimal, threshold: Decimal, bound: Bound) -> Self {
        let (passes, wide_fail) = match bound {
            Bound::Min => (value >= threshold, value < threshold.saturating_mul(MIN_WIDE_FAIL)),
            Bound::Max => (value <= threshold, value > threshold.saturating_mul(MAX_WIDE_FAIL)),
        };
        Self {
            name: name.to_string(),
            value,
            threshold,
            bound,
            passes,
            wide_fail,
        }
    }
}

/// The seven headline ratios fed to the evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlineMetrics {
    pub roi: Decimal,
    pub margin: Decimal,
    pub moic: Decimal,
    pub markup: Decimal,
    pub irr: Decimal,
    pub ltv: Decimal,
    pub ltc: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub checks: Vec<ThresholdCheck>,
    pub pass_count: usize,
    pub fail_count: usize,
    pub verdict: Verdict,
    pub verdict_color: String,
}

/// Apply the seven-criterion go / no-go rule.
///
/// VIABLE needs all seven checks to pass; four or more wide failures make the
/// project NOT VIABLE; anything in between is CAUTION.
pub fn evaluate(metrics: &HeadlineMetrics, thresholds: &Thresholds) -> Decision {
    let checks = vec![
        ThresholdCheck::new("ROI", metrics.roi, thresholds.roi_min, Bound::Min),
        ThresholdCheck::new("Margin", metrics.margin, thresholds.margin_min, Bound::Min),
        ThresholdCheck::new("MOIC", metrics.moic, thresholds.moic_min, Bound::Min),
        ThresholdCheck::new("Markup", metrics.markup, thresholds.markup_min, Bound::Min),
        ThresholdCheck::new("IRR", metrics.irr, thresholds.irr_min, Bound::Min),
        ThresholdCheck::new("LTV", metrics.ltv, thresholds.ltv_max, Bound::Max),
        ThresholdCheck::new("LTC", metrics.ltc, thresholds.ltc_max, Bound::Max),
    ];

    let pass_count = checks.iter().filter(|c| c.passes).count();
    let fail_count = checks.iter().filter(|c| c.wide_fail).count();

    let verdict = if pass_count == checks.len() {
        Verdict::Viable
    } else if fail_count >= NOT_VIABLE_FAILS {
        Verdict::NotViable
    } else {
        Verdict::Caution
    };

    Decision {
        checks,
        pass_count,
        fail_count,
        verdict,
        verdict_color: verdict.color().to_string(),
    }
}
