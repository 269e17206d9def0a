use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;

use crate::analysis::labels::{absolute_label, format_amount, format_percent, relative_label, AxisTick};
use crate::error::PrefeasError;
use crate::math::round_months;
use crate::project::assumptions::{
    scale_prices, ProjectAssumptions, ProjectInput, Thresholds, UnitMixLine,
};
use crate::project::decision::CellTone;
use crate::project::metrics::{compute_project, MetricKey, MetricsReport};
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::PrefeasResult;

/// Smallest accepted per-step variation (1%).
pub const MIN_VARIATION: Rate = dec!(0.01);
/// Largest accepted per-step variation (25%).
pub const MAX_VARIATION: Rate = dec!(0.25);
/// Per-step variation used by the dashboard unless overridden.
pub const DEFAULT_VARIATION: Rate = dec!(0.05);

const MOIC_MARGINAL_BAND: Decimal = dec!(0.85);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input perturbed along one grid axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridVariable {
    /// Construction cost per m²
    ConstructionCost,
    /// Every mix line's unit price, scaled uniformly
    SalePrice,
    InterestRate,
    /// Partner cash equity
    CashEquity,
    /// Construction duration, rounded to whole months
    ConstructionMonths,
    PresalePct,
}

impl GridVariable {
    pub const ALL: [GridVariable; 6] = [
        GridVariable::ConstructionCost,
        GridVariable::SalePrice,
        GridVariable::InterestRate,
        GridVariable::CashEquity,
        GridVariable::ConstructionMonths,
        GridVariable::PresalePct,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GridVariable::ConstructionCost => "construction_cost",
            GridVariable::SalePrice => "sale_price",
            GridVariable::InterestRate => "interest_rate",
            GridVariable::CashEquity => "cash_equity",
            GridVariable::ConstructionMonths => "construction_months",
            GridVariable::PresalePct => "presale_pct",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GridVariable::ConstructionCost => "Cost/m²",
            GridVariable::SalePrice => "Price/m²",
            GridVariable::InterestRate => "Interest rate",
            GridVariable::CashEquity => "Cash equity",
            GridVariable::ConstructionMonths => "Construction months",
            GridVariable::PresalePct => "% Presales",
        }
    }

    /// Unperturbed value shown on absolute-value axes.
    fn base_value(&self, assumptions: &ProjectAssumptions, base: &MetricsReport) -> Decimal {
        match self {
            GridVariable::ConstructionCost => assumptions.construction_cost_per_m2,
            GridVariable::SalePrice => base.avg_price_per_m2,
            GridVariable::InterestRate => assumptions.annual_interest_rate,
            GridVariable::CashEquity => assumptions.partner_cash_equity,
            GridVariable::ConstructionMonths => Decimal::from(assumptions.construction_months),
            GridVariable::PresalePct => assumptions.presale_pct,
        }
    }

    fn format_value(&self, value: Decimal) -> String {
        match self {
            GridVariable::InterestRate | GridVariable::PresalePct => format_percent(value, 1),
            GridVariable::ConstructionMonths => format!("{}m", round_months(value)),
            _ => format_amount(value, 0),
        }
    }

    /// Apply `factor` to this variable, reading the unperturbed value from
    /// `base` and writing into the working copies.
    fn apply(
        &self,
        factor: Decimal,
        base: &ProjectInput,
        assumptions: &mut ProjectAssumptions,
        mix: &mut Vec<UnitMixLine>,
    ) {
        let b = &base.assumptions;
        match self {
            GridVariable::ConstructionCost => {
                assumptions.construction_cost_per_m2 = b.construction_cost_per_m2.saturating_mul(factor)
            }
            GridVariable::SalePrice => *mix = scale_prices(&base.unit_mix, factor),
            GridVariable::InterestRate => {
                assumptions.annual_interest_rate = b.annual_interest_rate.saturating_mul(factor)
            }
            GridVariable::CashEquity => {
                assumptions.partner_cash_equity = b.partner_cash_equity.saturating_mul(factor)
            }
            GridVariable::ConstructionMonths => {
                assumptions.construction_months =
                    round_months(Decimal::from(b.construction_months) * factor)
            }
            GridVariable::PresalePct => {
                assumptions.presale_pct = b.presale_pct.saturating_mul(factor)
            }
        }
    }
}

impl FromStr for GridVariable {
    type Err = PrefeasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace('-', "_");
        let alias = match needle.as_str() {
            "cost" | "construction_cost_per_m2" => "construction_cost",
            "price" | "price_per_unit" => "sale_price",
            "rate" | "annual_interest_rate" => "interest_rate",
            "equity" | "partner_cash_equity" => "cash_equity",
            "months" | "duration" => "construction_months",
            "presale" | "presales" => "presale_pct",
            other => other,
        };
        GridVariable::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == alias)
            .ok_or_else(|| PrefeasError::InvalidInput {
                field: "variable".into(),
                reason: format!(
                    "Unknown grid variable '{s}'. Available: {}",
                    GridVariable::ALL.map(|v| v.as_str()).join(", ")
                ),
            })
    }
}

/// Number of symmetric steps on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepSpan {
    /// −2..=2
    Five,
    /// −3..=3
    #[default]
    Seven,
}

impl StepSpan {
    pub fn steps(&self) -> Vec<i32> {
        match self {
            StepSpan::Five => (-2..=2).collect(),
            StepSpan::Seven => (-3..=3).collect(),
        }
    }
}

/// How a grid's cells were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridStrategy {
    /// Every cell re-runs the full metrics engine
    FullRecompute,
    /// Cells rescale cost / financing figures of the single base report,
    /// matching the legacy spreadsheet dashboard
    SpreadsheetRescale,
}

/// Request for a generic two-variable grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridRequest {
    pub metric: MetricKey,
    pub row: GridVariable,
    pub col: GridVariable,
    /// Relative change per step (0.05 = 5%)
    pub variation_pct: Rate,
    #[serde(default)]
    pub span: StepSpan,
    /// Label ticks with absolute values instead of percentage deltas
    #[serde(default)]
    pub absolute_labels: bool,
}

/// A filled sensitivity grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityGrid {
    pub title: String,
    pub metric: MetricKey,
    pub row_name: String,
    pub col_name: String,
    pub strategy: GridStrategy,
    pub variation_pct: Rate,
    pub rows: Vec<AxisTick>,
    pub cols: Vec<AxisTick>,
    /// values[i][j] = metric at rows[i], cols[j]
    pub values: Vec<Vec<Decimal>>,
    /// Traffic-light tone per cell, when the metric has a go / no-go bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tones: Option<Vec<Vec<CellTone>>>,
    pub base_position: (usize, usize),
    pub base_value: Decimal,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Reject per-step variations outside 1%..=25%.
pub fn validate_variation(variation_pct: Rate) -> PrefeasResult<()> {
    if variation_pct < MIN_VARIATION || variation_pct > MAX_VARIATION {
        return Err(PrefeasError::InvalidInput {
            field: "variation_pct".into(),
            reason: format!(
                "Variation per step must be between {MIN_VARIATION} and {MAX_VARIATION} (got {variation_pct})"
            ),
        });
    }
    Ok(())
}

/// Build a two-variable grid by re-running the engine once per cell.
///
/// Each axis multiplies its variable by `1 + step × variation_pct`; the
/// centre cell reproduces the unperturbed report.
pub fn build_sensitivity_grid(
    input: &ProjectInput,
    request: &GridRequest,
) -> PrefeasResult<SensitivityGrid> {
    validate_variation(request.variation_pct)?;
    if request.row == request.col {
        return Err(PrefeasError::InvalidInput {
            field: "col".into(),
            reason: format!("Row and column both vary '{}'", request.row.as_str()),
        });
    }

    let pct = request.variation_pct;
    let steps = request.span.steps();
    let base = compute_project(&input.assumptions, &input.unit_mix, &input.thresholds);

    tracing::debug!(
        metric = request.metric.as_str(),
        row = request.row.as_str(),
        col = request.col.as_str(),
        cells = steps.len() * steps.len(),
        "building sensitivity grid"
    );

    let values = evaluate_grid(&steps, &steps, |&r, &c| {
        let mut assumptions = input.assumptions.clone();
        let mut mix = input.unit_mix.clone();
        request.row.apply(step_factor(r, pct), input, &mut assumptions, &mut mix);
        request.col.apply(step_factor(c, pct), input, &mut assumptions, &mut mix);
        compute_project(&assumptions, &mix, &input.thresholds).metric(request.metric)
    });

    let axis = |variable: GridVariable| -> Vec<AxisTick> {
        let base_value = variable.base_value(&input.assumptions, &base);
        steps
            .iter()
            .map(|&s| {
                let value = base_value.saturating_mul(step_factor(s, pct));
                let label = if request.absolute_labels {
                    absolute_label(&variable.format_value(value), s, pct)
                } else {
                    relative_label(s, pct)
                };
                AxisTick {
                    value,
                    label,
                    is_base: s == 0,
                }
            })
            .collect()
    };

    let tones = metric_tones(request.metric, &values, &input.thresholds);

    let centre = steps.len() / 2;
    Ok(SensitivityGrid {
        title: format!(
            "{} vs {} × {}",
            request.metric.as_str(),
            request.row.display_name(),
            request.col.display_name()
        ),
        metric: request.metric,
        row_name: request.row.display_name().to_string(),
        col_name: request.col.display_name().to_string(),
        strategy: GridStrategy::FullRecompute,
        variation_pct: pct,
        rows: axis(request.row),
        cols: axis(request.col),
        base_value: values[centre][centre],
        values,
        tones,
        base_position: (centre, centre),
    })
}

/// Envelope wrapper around [`build_sensitivity_grid`].
pub fn analyze_sensitivity(
    input: &ProjectInput,
    request: &GridRequest,
) -> PrefeasResult<ComputationOutput<SensitivityGrid>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let grid = build_sensitivity_grid(input, request)?;

    let lowest = Decimal::ONE + Decimal::from(request.span.steps()[0]) * request.variation_pct;
    if lowest <= Decimal::ZERO {
        warnings.push(format!(
            "Lowest step scales inputs by {lowest}; negative or zero inputs are not meaningful"
        ));
    }
    if grid.base_value.is_zero() {
        warnings.push("Base case value is zero; check the project inputs".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "2-Way Sensitivity Analysis (full engine re-run per cell)",
        request,
        warnings,
        elapsed,
        grid,
    ))
}

// ---------------------------------------------------------------------------
// Helpers shared with the dashboard tables
// ---------------------------------------------------------------------------

/// `1 + step × pct`; exactly one at step 0 so the centre cell reproduces the
/// base report digit for digit.
pub(crate) fn step_factor(step: i32, pct: Rate) -> Decimal {
    if step == 0 {
        Decimal::ONE
    } else {
        Decimal::ONE + Decimal::from(step) * pct
    }
}

/// Evaluate `eval_fn` at every (row, col) pair.
pub(crate) fn evaluate_grid<R, C, F>(rows: &[R], cols: &[C], eval_fn: F) -> Vec<Vec<Decimal>>
where
    F: Fn(&R, &C) -> Decimal,
{
    rows.iter()
        .map(|r| cols.iter().map(|c| eval_fn(r, c)).collect())
        .collect()
}

/// Traffic-light tones for a grid of `metric` values, `None` when the metric
/// has no threshold. MOIC uses a tighter 0.85 marginal band.
pub(crate) fn metric_tones(
    metric: MetricKey,
    values: &[Vec<Decimal>],
    thresholds: &Thresholds,
) -> Option<Vec<Vec<CellTone>>> {
    let (threshold, bound) = metric.threshold(thresholds)?;
    let classify = |v: Decimal| match metric {
        MetricKey::Moic => CellTone::classify_min(v, threshold, MOIC_MARGINAL_BAND),
        _ => CellTone::classify(v, threshold, bound),
    };
    Some(
        values
            .iter()
            .map(|row| row.iter().map(|&v| classify(v)).collect())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(metric: MetricKey) -> GridRequest {
        GridRequest {
            metric,
            row: GridVariable::ConstructionCost,
            col: GridVariable::SalePrice,
            variation_pct: dec!(0.05),
            span: StepSpan::Seven,
            absolute_labels: false,
        }
    }

    #[test]
    fn test_grid_dimensions() {
        let grid = build_sensitivity_grid(&ProjectInput::sample(), &request(MetricKey::Margin)).unwrap();
        assert_eq!(grid.values.len(), 7);
        assert!(grid.values.iter().all(|row| row.len() == 7));
        assert_eq!(grid.base_position, (3, 3));
        assert_eq!(grid.strategy, GridStrategy::FullRecompute);
    }

    #[test]
    fn test_five_step_span() {
        let mut req = request(MetricKey::Roi);
        req.span = StepSpan::Five;
        let grid = build_sensitivity_grid(&ProjectInput::sample(), &req).unwrap();
        assert_eq!(grid.values.len(), 5);
        assert_eq!(grid.base_position, (2, 2));
        assert_eq!(grid.rows[0].label, "-10%");
    }

    #[test]
    fn test_centre_matches_engine() {
        let input = ProjectInput::sample();
        let report = compute_project(&input.assumptions, &input.unit_mix, &input.thresholds);
        for metric in [MetricKey::Margin, MetricKey::Roi, MetricKey::Irr, MetricKey::LoanAmount] {
            let grid = build_sensitivity_grid(&input, &request(metric)).unwrap();
            assert_eq!(grid.base_value, report.metric(metric));
        }
    }

    #[test]
    fn test_margin_monotonic_in_cost_and_price() {
        let grid = build_sensitivity_grid(&ProjectInput::sample(), &request(MetricKey::Margin)).unwrap();
        for i in 0..6 {
            // higher cost, lower margin
            assert!(grid.values[i][3] > grid.values[i + 1][3]);
            // higher price, higher margin
            assert!(grid.values[3][i] < grid.values[3][i + 1]);
        }
    }

    #[test]
    fn test_relative_labels() {
        let grid = build_sensitivity_grid(&ProjectInput::sample(), &request(MetricKey::Margin)).unwrap();
        let labels: Vec<&str> = grid.rows.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["-15%", "-10%", "-5%", "Base", "+5%", "+10%", "+15%"]);
    }

    #[test]
    fn test_absolute_labels() {
        let mut req = request(MetricKey::Margin);
        req.absolute_labels = true;
        let grid = build_sensitivity_grid(&ProjectInput::sample(), &req).unwrap();
        assert_eq!(grid.rows[3].label, "950 (Base)");
        assert_eq!(grid.rows[4].label, "998 (+5%)");
        assert_eq!(grid.rows[0].label, "808 (-15%)");
        // avg price 2,900,000 / 1,750 = 1,657.14
        assert_eq!(grid.cols[3].label, "1,657 (Base)");
    }

    #[test]
    fn test_construction_months_rounded() {
        let req = GridRequest {
            metric: MetricKey::Irr,
            row: GridVariable::ConstructionMonths,
            col: GridVariable::InterestRate,
            variation_pct: dec!(0.10),
            span: StepSpan::Seven,
            absolute_labels: true,
        };
        let grid = build_sensitivity_grid(&ProjectInput::sample(), &req).unwrap();
        // 18 × 0.7 = 12.6 → 13 months
        assert_eq!(grid.rows[0].label, "13m (-30%)");
        assert_eq!(grid.cols[3].label, "11.0% (Base)");
    }

    #[test]
    fn test_tones_only_for_headline_metrics() {
        let input = ProjectInput::sample();
        let grid = build_sensitivity_grid(&input, &request(MetricKey::Margin)).unwrap();
        assert!(grid.tones.is_some());
        let grid = build_sensitivity_grid(&input, &request(MetricKey::NetProfit)).unwrap();
        assert!(grid.tones.is_none());
    }

    #[test]
    fn test_moic_uses_tighter_band() {
        let thresholds = Thresholds::default();
        // 1.2 is 80% of the 1.5 minimum: marginal for most metrics, poor for MOIC
        let values = vec![vec![dec!(1.2), dec!(1.3), dec!(1.5)]];
        let tones = metric_tones(MetricKey::Moic, &values, &thresholds).unwrap();
        assert_eq!(tones[0], vec![CellTone::Poor, CellTone::Marginal, CellTone::Good]);
        let tones = metric_tones(MetricKey::Markup, &[vec![dec!(1.0)]], &thresholds).unwrap();
        assert_eq!(tones[0][0], CellTone::Marginal);
    }

    #[test]
    fn test_same_axis_rejected() {
        let mut req = request(MetricKey::Margin);
        req.col = GridVariable::ConstructionCost;
        assert!(build_sensitivity_grid(&ProjectInput::sample(), &req).is_err());
    }

    #[test]
    fn test_variation_bounds() {
        assert!(validate_variation(dec!(0.05)).is_ok());
        assert!(validate_variation(dec!(0.01)).is_ok());
        assert!(validate_variation(dec!(0.25)).is_ok());
        assert!(validate_variation(dec!(0.005)).is_err());
        assert!(validate_variation(dec!(0.3)).is_err());
    }

    #[test]
    fn test_variable_parsing() {
        assert_eq!("cost".parse::<GridVariable>().unwrap(), GridVariable::ConstructionCost);
        assert_eq!("sale-price".parse::<GridVariable>().unwrap(), GridVariable::SalePrice);
        assert_eq!("presales".parse::<GridVariable>().unwrap(), GridVariable::PresalePct);
        assert!("land".parse::<GridVariable>().is_err());
    }
}
