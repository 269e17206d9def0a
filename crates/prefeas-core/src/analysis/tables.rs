//! The six dashboard sensitivity tables.
//!
//! Tables 1, 2, 5 and 6 re-run the metrics engine for every cell. Tables 3
//! and 4 reproduce the legacy spreadsheet: they rescale interest, financing
//! and cost figures of the single base report and never re-solve the
//! financing plug, so off-centre cells drift from what the engine would
//! return. Both behaviours are kept behind [`build_table`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;

use crate::analysis::labels::{format_amount, format_percent, mark_base, relative_label, AxisTick};
use crate::analysis::sensitivity::{
    build_sensitivity_grid, evaluate_grid, metric_tones, step_factor, validate_variation,
    GridRequest, GridStrategy, GridVariable, SensitivityGrid, StepSpan,
};
use crate::error::PrefeasError;
use crate::math::{round_half_up, round_months, safe_div};
use crate::project::assumptions::ProjectInput;
use crate::project::metrics::{annualized_return, compute_project, MetricKey};
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::PrefeasResult;

const STEPS: [i32; 7] = [-3, -2, -1, 0, 1, 2, 3];
const BASE_INDEX: usize = 3;

const RATE_OFFSETS: [Decimal; 7] = [
    dec!(-0.06),
    dec!(-0.04),
    dec!(-0.02),
    dec!(0),
    dec!(0.02),
    dec!(0.04),
    dec!(0.06),
];
const RATE_FLOOR: Rate = dec!(0.01);
const RATE_CAP: Rate = dec!(0.30);

const DURATION_FACTORS: [Decimal; 7] = [
    dec!(0.5),
    dec!(0.65),
    dec!(0.85),
    dec!(1),
    dec!(1.15),
    dec!(1.35),
    dec!(1.5),
];
const MIN_SHORTENED_MONTHS: u32 = 3;

const PRESALE_OFFSETS: [Decimal; 7] = [
    dec!(-0.3),
    dec!(-0.2),
    dec!(-0.1),
    dec!(0),
    dec!(0.1),
    dec!(0.2),
    dec!(0.3),
];
const PRESALE_FLOOR: Rate = dec!(0.05);
const PRESALE_CAP: Rate = dec!(0.95);

/// Equity axis moves five times faster than the per-step variation.
const EQUITY_STEP_MULTIPLIER: Decimal = dec!(5);

/// Dashboard table identifiers, numbered as they appear on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityTable {
    /// 1. Margin vs cost/m² × price/m²
    MarginByCostAndPrice,
    /// 2. ROI vs cost/m² × price/m²
    RoiByCostAndPrice,
    /// 3. IRR vs interest rate × construction months
    IrrByRateAndMonths,
    /// 4. Margin vs cost/m² × presale %
    MarginByCostAndPresale,
    /// 5. IRR vs presale % × partner equity
    IrrByPresaleAndEquity,
    /// 6. MOIC vs presale % × partner equity
    MoicByPresaleAndEquity,
}

impl SensitivityTable {
    pub const ALL: [SensitivityTable; 6] = [
        SensitivityTable::MarginByCostAndPrice,
        SensitivityTable::RoiByCostAndPrice,
        SensitivityTable::IrrByRateAndMonths,
        SensitivityTable::MarginByCostAndPresale,
        SensitivityTable::IrrByPresaleAndEquity,
        SensitivityTable::MoicByPresaleAndEquity,
    ];

    pub fn number(&self) -> u8 {
        match self {
            SensitivityTable::MarginByCostAndPrice => 1,
            SensitivityTable::RoiByCostAndPrice => 2,
            SensitivityTable::IrrByRateAndMonths => 3,
            SensitivityTable::MarginByCostAndPresale => 4,
            SensitivityTable::IrrByPresaleAndEquity => 5,
            SensitivityTable::MoicByPresaleAndEquity => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityTable::MarginByCostAndPrice => "margin_by_cost_and_price",
            SensitivityTable::RoiByCostAndPrice => "roi_by_cost_and_price",
            SensitivityTable::IrrByRateAndMonths => "irr_by_rate_and_months",
            SensitivityTable::MarginByCostAndPresale => "margin_by_cost_and_presale",
            SensitivityTable::IrrByPresaleAndEquity => "irr_by_presale_and_equity",
            SensitivityTable::MoicByPresaleAndEquity => "moic_by_presale_and_equity",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SensitivityTable::MarginByCostAndPrice => "Margin: Cost/m² vs Price/m²",
            SensitivityTable::RoiByCostAndPrice => "ROI: Cost/m² vs Price/m²",
            SensitivityTable::IrrByRateAndMonths => "IRR: Interest rate vs Construction months",
            SensitivityTable::MarginByCostAndPresale => "Margin: Cost/m² vs % Presales",
            SensitivityTable::IrrByPresaleAndEquity => "IRR: % Presales vs Partner equity",
            SensitivityTable::MoicByPresaleAndEquity => "MOIC: % Presales vs Partner equity",
        }
    }

    pub fn metric(&self) -> MetricKey {
        match self {
            SensitivityTable::MarginByCostAndPrice | SensitivityTable::MarginByCostAndPresale => {
                MetricKey::Margin
            }
            SensitivityTable::RoiByCostAndPrice => MetricKey::Roi,
            SensitivityTable::IrrByRateAndMonths | SensitivityTable::IrrByPresaleAndEquity => {
                MetricKey::Irr
            }
            SensitivityTable::MoicByPresaleAndEquity => MetricKey::Moic,
        }
    }

    pub fn strategy(&self) -> GridStrategy {
        match self {
            SensitivityTable::IrrByRateAndMonths | SensitivityTable::MarginByCostAndPresale => {
                GridStrategy::SpreadsheetRescale
            }
            _ => GridStrategy::FullRecompute,
        }
    }
}

impl FromStr for SensitivityTable {
    type Err = PrefeasError;

    /// Accepts the table number ("3") or its snake/kebab-case name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace('-', "_");
        SensitivityTable::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == needle || t.number().to_string() == needle)
            .ok_or_else(|| PrefeasError::InvalidInput {
                field: "table".into(),
                reason: format!("Unknown table '{s}'. Use 1-6 or one of: {}", table_names()),
            })
    }
}

fn table_names() -> String {
    SensitivityTable::ALL.map(|t| t.as_str()).join(", ")
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build one dashboard table with the strategy it is tagged with.
pub fn build_table(
    table: SensitivityTable,
    input: &ProjectInput,
    variation_pct: Rate,
) -> PrefeasResult<SensitivityGrid> {
    validate_variation(variation_pct)?;
    tracing::debug!(table = table.as_str(), strategy = ?table.strategy(), "building dashboard table");

    let grid = match table {
        SensitivityTable::MarginByCostAndPrice | SensitivityTable::RoiByCostAndPrice => {
            let request = GridRequest {
                metric: table.metric(),
                row: GridVariable::ConstructionCost,
                col: GridVariable::SalePrice,
                variation_pct,
                span: StepSpan::Seven,
                absolute_labels: true,
            };
            build_sensitivity_grid(input, &request)?
        }
        SensitivityTable::IrrByRateAndMonths => spreadsheet_irr_by_rate_and_months(input),
        SensitivityTable::MarginByCostAndPresale => {
            spreadsheet_margin_by_cost_and_presale(input, variation_pct)
        }
        SensitivityTable::IrrByPresaleAndEquity | SensitivityTable::MoicByPresaleAndEquity => {
            presale_equity_grid(input, table.metric(), variation_pct)
        }
    };

    Ok(SensitivityGrid {
        title: table.title().to_string(),
        ..grid
    })
}

/// All six tables in dashboard order.
pub fn build_all_tables(
    input: &ProjectInput,
    variation_pct: Rate,
) -> PrefeasResult<Vec<SensitivityGrid>> {
    SensitivityTable::ALL
        .iter()
        .map(|&table| build_table(table, input, variation_pct))
        .collect()
}

/// Envelope wrapper around [`build_table`].
pub fn analyze_table(
    table: SensitivityTable,
    input: &ProjectInput,
    variation_pct: Rate,
) -> PrefeasResult<ComputationOutput<SensitivityGrid>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let grid = build_table(table, input, variation_pct)?;

    let methodology = match table.strategy() {
        GridStrategy::FullRecompute => "Dashboard sensitivity table (full engine re-run per cell)",
        GridStrategy::SpreadsheetRescale => {
            warnings.push(
                "Cells rescale the base report without re-solving the loan; off-centre values approximate the engine"
                    .into(),
            );
            "Dashboard sensitivity table (spreadsheet-parity rescaling of the base report)"
        }
    };
    if table == SensitivityTable::MarginByCostAndPresale
        && input.assumptions.presale_pct >= Decimal::ONE
    {
        warnings.push("Base presale is 100% or more; financing cost dropped from every cell".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &serde_json::json!({
            "table": table.as_str(),
            "variation_pct": variation_pct,
            "project": input,
        }),
        warnings,
        elapsed,
        grid,
    ))
}

// ---------------------------------------------------------------------------
// Spreadsheet-parity tables
// ---------------------------------------------------------------------------

/// Table 3: IRR over interest rate × construction months, rescaling interest
/// on the base loan.
///
/// Rates step ±2/4/6 points around the base, clamped to 1%..=30%. Shorter
/// durations are floored at three months. The loan amount stays at its base
/// value in every cell.
pub fn spreadsheet_irr_by_rate_and_months(input: &ProjectInput) -> SensitivityGrid {
    let a = &input.assumptions;
    let base = compute_project(a, &input.unit_mix, &input.thresholds);

    let rates: Vec<Rate> = RATE_OFFSETS
        .iter()
        .enumerate()
        .map(|(i, &offset)| match i.cmp(&BASE_INDEX) {
            std::cmp::Ordering::Less => a.annual_interest_rate.saturating_add(offset).max(RATE_FLOOR),
            std::cmp::Ordering::Equal => a.annual_interest_rate,
            std::cmp::Ordering::Greater => a.annual_interest_rate.saturating_add(offset).min(RATE_CAP),
        })
        .collect();

    let base_months = Decimal::from(a.construction_months);
    let durations: Vec<u32> = DURATION_FACTORS
        .iter()
        .enumerate()
        .map(|(i, &factor)| match i.cmp(&BASE_INDEX) {
            std::cmp::Ordering::Less => round_months(base_months * factor).max(MIN_SHORTENED_MONTHS),
            std::cmp::Ordering::Equal => a.construction_months,
            std::cmp::Ordering::Greater => round_months(base_months * factor),
        })
        .collect();

    let values = evaluate_grid(&rates, &durations, |&rate, &months| {
        let years = Decimal::from(months) / dec!(12);
        let interest = base
            .loan_amount
            .saturating_mul(rate.saturating_mul(a.draw_factor).saturating_mul(years));
        let fee = base.loan_amount.saturating_mul(a.bank_fee_pct);
        let net_profit = base
            .total_revenue
            .saturating_sub(base.pre_financing_cost.saturating_add(interest.saturating_add(fee)));
        let total_months = a
            .pre_dev_months
            .saturating_add(months)
            .saturating_add(a.post_sale_months);
        annualized_return(net_profit, base.total_equity, total_months)
    });

    let rows = rates
        .iter()
        .enumerate()
        .map(|(i, &rate)| AxisTick {
            value: rate,
            label: mark_base(format_percent(rate, 1), i == BASE_INDEX),
            is_base: i == BASE_INDEX,
        })
        .collect();
    let cols = durations
        .iter()
        .enumerate()
        .map(|(i, &months)| AxisTick {
            value: Decimal::from(months),
            label: mark_base(format!("{months}m"), i == BASE_INDEX),
            is_base: i == BASE_INDEX,
        })
        .collect();

    finish_grid(
        input,
        MetricKey::Irr,
        GridVariable::InterestRate,
        GridVariable::ConstructionMonths,
        GridStrategy::SpreadsheetRescale,
        // Axis steps here are fixed offsets, not the per-step variation.
        Decimal::ZERO,
        rows,
        cols,
        values,
    )
}

/// Table 4: margin over construction cost × presale %, rescaling the base
/// pre-financing cost by the cost step and the base financing cost by the
/// share of revenue still funded by the loan.
///
/// When the base presale is 100% or more the financing term is dropped.
pub fn spreadsheet_margin_by_cost_and_presale(
    input: &ProjectInput,
    variation_pct: Rate,
) -> SensitivityGrid {
    let a = &input.assumptions;
    let base = compute_project(a, &input.unit_mix, &input.thresholds);
    let presales = presale_axis(a.presale_pct);

    let values = evaluate_grid(&STEPS, &presales, |&step, &presale| {
        let pre_financing = base
            .pre_financing_cost
            .saturating_mul(step_factor(step, variation_pct));
        let financing_scale = if a.presale_pct < Decimal::ONE {
            safe_div(Decimal::ONE - presale, Decimal::ONE - a.presale_pct)
        } else {
            Decimal::ZERO
        };
        let financing = base.financing_cost.saturating_mul(financing_scale);
        if base.total_revenue > Decimal::ZERO {
            safe_div(
                base.total_revenue
                    .saturating_sub(pre_financing.saturating_add(financing)),
                base.total_revenue,
            )
        } else {
            Decimal::ZERO
        }
    });

    let rows = STEPS
        .iter()
        .map(|&step| AxisTick {
            value: a.construction_cost_per_m2 * step_factor(step, variation_pct),
            label: relative_label(step, variation_pct),
            is_base: step == 0,
        })
        .collect();

    finish_grid(
        input,
        MetricKey::Margin,
        GridVariable::ConstructionCost,
        GridVariable::PresalePct,
        GridStrategy::SpreadsheetRescale,
        variation_pct,
        rows,
        presale_ticks(&presales),
        values,
    )
}

// ---------------------------------------------------------------------------
// Full-recompute table over absolute axes
// ---------------------------------------------------------------------------

/// Tables 5 and 6: `metric` over presale % × partner equity, one engine run
/// per cell.
fn presale_equity_grid(input: &ProjectInput, metric: MetricKey, variation_pct: Rate) -> SensitivityGrid {
    let a = &input.assumptions;
    let presales = presale_axis(a.presale_pct);
    let equities: Vec<Decimal> = STEPS
        .iter()
        .map(|&step| {
            let factor = step_factor(step, variation_pct * EQUITY_STEP_MULTIPLIER);
            a.partner_cash_equity.saturating_mul(factor).max(Decimal::ZERO)
        })
        .collect();

    let values = evaluate_grid(&presales, &equities, |&presale, &equity| {
        let perturbed = a.with_presale_pct(presale).with_partner_cash_equity(equity);
        compute_project(&perturbed, &input.unit_mix, &input.thresholds).metric(metric)
    });

    let cols = equities
        .iter()
        .enumerate()
        .map(|(i, &equity)| AxisTick {
            value: equity,
            label: mark_base(
                format!("{}K", format_amount(equity / dec!(1000), 0)),
                i == BASE_INDEX,
            ),
            is_base: i == BASE_INDEX,
        })
        .collect();

    finish_grid(
        input,
        metric,
        GridVariable::PresalePct,
        GridVariable::CashEquity,
        GridStrategy::FullRecompute,
        variation_pct,
        presale_ticks(&presales),
        cols,
        values,
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Base presale ±10/20/30 points, clamped to 5%..=95% off-centre.
fn presale_axis(base: Rate) -> Vec<Rate> {
    PRESALE_OFFSETS
        .iter()
        .enumerate()
        .map(|(i, &offset)| match i.cmp(&BASE_INDEX) {
            std::cmp::Ordering::Less => base.saturating_add(offset).max(PRESALE_FLOOR),
            std::cmp::Ordering::Equal => base,
            std::cmp::Ordering::Greater => base.saturating_add(offset).min(PRESALE_CAP),
        })
        .collect()
}

fn presale_ticks(presales: &[Rate]) -> Vec<AxisTick> {
    presales
        .iter()
        .enumerate()
        .map(|(i, &presale)| AxisTick {
            value: presale,
            label: mark_base(
                format!("{}%", round_half_up(presale.saturating_mul(dec!(100)), 0)),
                i == BASE_INDEX,
            ),
            is_base: i == BASE_INDEX,
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn finish_grid(
    input: &ProjectInput,
    metric: MetricKey,
    row: GridVariable,
    col: GridVariable,
    strategy: GridStrategy,
    variation_pct: Rate,
    rows: Vec<AxisTick>,
    cols: Vec<AxisTick>,
    values: Vec<Vec<Decimal>>,
) -> SensitivityGrid {
    let tones = metric_tones(metric, &values, &input.thresholds);
    SensitivityGrid {
        title: String::new(),
        metric,
        row_name: row.display_name().to_string(),
        col_name: col.display_name().to_string(),
        strategy,
        variation_pct,
        rows,
        cols,
        base_value: values[BASE_INDEX][BASE_INDEX],
        values,
        tones,
        base_position: (BASE_INDEX, BASE_INDEX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::decision::CellTone;
    use rust_decimal_macros::dec;

    fn sample() -> ProjectInput {
        ProjectInput::sample()
    }

    #[test]
    fn test_strategies_tagged() {
        let rescaled: Vec<u8> = SensitivityTable::ALL
            .iter()
            .filter(|t| t.strategy() == GridStrategy::SpreadsheetRescale)
            .map(|t| t.number())
            .collect();
        assert_eq!(rescaled, vec![3, 4]);
    }

    #[test]
    fn test_centre_identity_all_tables() {
        let input = sample();
        let report = compute_project(&input.assumptions, &input.unit_mix, &input.thresholds);
        for table in SensitivityTable::ALL {
            let grid = build_table(table, &input, dec!(0.05)).unwrap();
            assert_eq!(grid.values.len(), 7, "{}", table.as_str());
            assert_eq!(grid.base_position, (3, 3));
            let diff = (grid.base_value - report.metric(table.metric())).abs();
            assert!(diff < dec!(0.0000000001), "{}: {diff}", table.as_str());
        }
    }

    #[test]
    fn test_rate_and_month_axes() {
        let grid = build_table(SensitivityTable::IrrByRateAndMonths, &sample(), dec!(0.05)).unwrap();
        let rows: Vec<&str> = grid.rows.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(
            rows,
            vec!["5.0%", "7.0%", "9.0%", "11.0% (Base)", "13.0%", "15.0%", "17.0%"]
        );
        let cols: Vec<&str> = grid.cols.iter().map(|t| t.label.as_str()).collect();
        // 18 × {0.5, 0.65, 0.85, 1.15, 1.35, 1.5} = 9, 11.7, 15.3, 20.7, 24.3, 27
        assert_eq!(cols, vec!["9m", "12m", "15m", "18m (Base)", "21m", "24m", "27m"]);
    }

    #[test]
    fn test_rate_axis_clamped() {
        let mut input = sample();
        input.assumptions.annual_interest_rate = dec!(0.03);
        input.assumptions.construction_months = 4;
        let grid = build_table(SensitivityTable::IrrByRateAndMonths, &input, dec!(0.05)).unwrap();
        assert_eq!(grid.rows[0].value, dec!(0.01));
        assert_eq!(grid.rows[1].value, dec!(0.01));
        assert_eq!(grid.rows[2].value, dec!(0.01));
        // 4 × 0.5 = 2, floored at 3
        assert_eq!(grid.cols[0].value, dec!(3));
    }

    #[test]
    fn test_irr_falls_with_rate_and_duration() {
        let grid = build_table(SensitivityTable::IrrByRateAndMonths, &sample(), dec!(0.05)).unwrap();
        for i in 0..6 {
            assert!(grid.values[i][3] > grid.values[i + 1][3]);
            assert!(grid.values[3][i] > grid.values[3][i + 1]);
        }
    }

    #[test]
    fn test_rescaled_table_keeps_base_loan() {
        // A full recompute re-solves the loan at 17%; the rescaled cell does not.
        let input = sample();
        let grid = build_table(SensitivityTable::IrrByRateAndMonths, &input, dec!(0.05)).unwrap();
        let bumped = input.assumptions.with_interest_rate(dec!(0.17));
        let full = compute_project(&bumped, &input.unit_mix, &input.thresholds);
        assert_ne!(grid.values[6][3], full.irr);
    }

    #[test]
    fn test_presale_axis_labels() {
        let grid = build_table(SensitivityTable::MarginByCostAndPresale, &sample(), dec!(0.05)).unwrap();
        let cols: Vec<&str> = grid.cols.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(cols, vec!["45%", "55%", "65%", "75% (Base)", "85%", "95%", "95%"]);
        assert_eq!(grid.rows[3].label, "Base");
        assert_eq!(grid.rows[0].label, "-15%");
    }

    #[test]
    fn test_margin_rises_with_presale() {
        let grid = build_table(SensitivityTable::MarginByCostAndPresale, &sample(), dec!(0.05)).unwrap();
        for j in 0..5 {
            assert!(grid.values[3][j] < grid.values[3][j + 1]);
        }
    }

    #[test]
    fn test_full_presale_drops_financing() {
        let mut input = sample();
        input.assumptions.presale_pct = Decimal::ONE;
        let grid = build_table(SensitivityTable::MarginByCostAndPresale, &input, dec!(0.05)).unwrap();
        let report = compute_project(&input.assumptions, &input.unit_mix, &input.thresholds);
        let expected = (report.total_revenue - report.pre_financing_cost) / report.total_revenue;
        assert_eq!(grid.values[3][0], expected);
    }

    #[test]
    fn test_equity_axis_labels_and_clamp() {
        let grid = build_table(SensitivityTable::MoicByPresaleAndEquity, &sample(), dec!(0.05)).unwrap();
        let cols: Vec<&str> = grid.cols.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(cols, vec!["75K", "150K", "225K", "300K (Base)", "375K", "450K", "525K"]);

        let grid = build_table(SensitivityTable::IrrByPresaleAndEquity, &sample(), dec!(0.25)).unwrap();
        // 1 - 3 × 0.25 × 5 < 0
        assert_eq!(grid.cols[0].value, Decimal::ZERO);
    }

    #[test]
    fn test_presale_equity_cells_rerun_engine() {
        let input = sample();
        for table in [
            SensitivityTable::IrrByPresaleAndEquity,
            SensitivityTable::MoicByPresaleAndEquity,
        ] {
            let grid = build_table(table, &input, dec!(0.05)).unwrap();
            for (i, j) in [(1, 5), (0, 6), (5, 2), (6, 0)] {
                let presale = grid.rows[i].value;
                let equity = grid.cols[j].value;
                let perturbed = input
                    .assumptions
                    .with_presale_pct(presale)
                    .with_partner_cash_equity(equity);
                let report = compute_project(&perturbed, &input.unit_mix, &input.thresholds);
                assert_eq!(grid.values[i][j], report.metric(table.metric()), "{table:?} [{i}][{j}]");
            }
        }
    }

    #[test]
    fn test_moic_tones_present() {
        let grid = build_table(SensitivityTable::MoicByPresaleAndEquity, &sample(), dec!(0.05)).unwrap();
        let tones = grid.tones.unwrap();
        assert_eq!(tones[3][3], CellTone::Good);
    }

    #[test]
    fn test_table_parsing() {
        assert_eq!("3".parse::<SensitivityTable>().unwrap(), SensitivityTable::IrrByRateAndMonths);
        assert_eq!(
            "moic-by-presale-and-equity".parse::<SensitivityTable>().unwrap(),
            SensitivityTable::MoicByPresaleAndEquity
        );
        assert!("7".parse::<SensitivityTable>().is_err());
    }

    #[test]
    fn test_invalid_variation_rejected() {
        assert!(build_table(SensitivityTable::MarginByCostAndPrice, &sample(), dec!(0.5)).is_err());
        assert!(build_all_tables(&sample(), dec!(0)).is_err());
    }

    #[test]
    fn test_rescaled_envelope_warns() {
        let out = analyze_table(SensitivityTable::IrrByRateAndMonths, &sample(), dec!(0.05)).unwrap();
        assert!(out.methodology.contains("spreadsheet"));
        assert_eq!(out.warnings.len(), 1);
        let out = analyze_table(SensitivityTable::RoiByCostAndPrice, &sample(), dec!(0.05)).unwrap();
        assert!(out.warnings.is_empty());
    }
}
