use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::math::{round_half_up, safe_div};
use crate::project::assumptions::{ProjectAssumptions, ProjectInput, Thresholds, UnitMixLine};
use crate::project::decision::Verdict;
use crate::project::metrics::compute_project;
use crate::types::{with_metadata, ComputationOutput, Money, Multiple, Rate};
use crate::PrefeasResult;

const SWEEP_LOW: Decimal = dec!(0.7);
const SWEEP_HIGH: Decimal = dec!(1.3);
const STEP_SHARE: Decimal = dec!(0.05);
const STEP_ROUNDING: Money = dec!(5000);
const MIN_STEP: Money = dec!(10000);
/// Levels closer than this to the current equity are marked as the base row.
const BASE_TOLERANCE: Money = dec!(5000);
/// Equity must fund at least this share of pre-financing cost.
pub const MIN_COVERAGE: Rate = dec!(0.25);

/// Engine output at one partner-equity level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalStructureRow {
    pub equity_level: Money,
    pub total_equity: Money,
    pub presale_proceeds: Money,
    pub loan_amount: Money,
    pub ltv: Rate,
    pub ltc: Rate,
    /// Total equity / pre-financing cost
    pub coverage_ratio: Rate,
    pub irr: Rate,
    pub moic: Multiple,
    pub verdict: Verdict,
    pub is_base: bool,
    /// LTV, LTC, coverage, IRR and MOIC all within bounds
    pub optimal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalStructureSweep {
    pub step: Money,
    pub rows: Vec<CapitalStructureRow>,
    /// Smallest swept equity level flagged optimal
    pub min_optimal_equity: Option<Money>,
}

/// Sweep partner cash equity from 70% to 130% of its current value.
///
/// The step is 5% of the current equity rounded to the nearest 5,000, never
/// below 10,000. Every level re-runs the full engine.
pub fn sweep_capital_structure(
    assumptions: &ProjectAssumptions,
    unit_mix: &[UnitMixLine],
    thresholds: &Thresholds,
) -> CapitalStructureSweep {
    let equity = assumptions.partner_cash_equity;
    let step = sweep_step(equity);
    let high = equity.saturating_mul(SWEEP_HIGH);

    let mut levels = Vec::new();
    let mut level = equity.saturating_mul(SWEEP_LOW);
    while level <= high {
        levels.push(round_half_up(level, 0));
        match level.checked_add(step) {
            Some(next) => level = next,
            None => break,
        }
    }
    tracing::debug!(%equity, %step, levels = levels.len(), "sweeping capital structure");

    let rows: Vec<CapitalStructureRow> = levels
        .into_iter()
        .map(|equity_level| {
            let perturbed = assumptions.with_partner_cash_equity(equity_level);
            let report = compute_project(&perturbed, unit_mix, thresholds);
            let coverage_ratio = if report.total_equity > Decimal::ZERO
                && report.pre_financing_cost > Decimal::ZERO
            {
                safe_div(report.total_equity, report.pre_financing_cost)
            } else {
                Decimal::ZERO
            };
            let optimal = report.ltv <= thresholds.ltv_max
                && report.ltc <= thresholds.ltc_max
                && coverage_ratio >= MIN_COVERAGE
                && report.irr >= thresholds.irr_min
                && report.moic >= thresholds.moic_min;

            CapitalStructureRow {
                equity_level,
                total_equity: report.total_equity,
                presale_proceeds: report.presale_proceeds,
                loan_amount: report.loan_amount,
                ltv: report.ltv,
                ltc: report.ltc,
                coverage_ratio,
                irr: report.irr,
                moic: report.moic,
                verdict: report.decision.verdict,
                is_base: (equity_level - equity).abs() < BASE_TOLERANCE,
                optimal,
            }
        })
        .collect();

    let min_optimal_equity = rows.iter().find(|r| r.optimal).map(|r| r.equity_level);

    CapitalStructureSweep {
        step,
        rows,
        min_optimal_equity,
    }
}

/// Envelope wrapper around [`sweep_capital_structure`].
pub fn analyze_capital_structure(
    input: &ProjectInput,
) -> PrefeasResult<ComputationOutput<CapitalStructureSweep>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let sweep = sweep_capital_structure(&input.assumptions, &input.unit_mix, &input.thresholds);

    if input.assumptions.partner_cash_equity <= Decimal::ZERO {
        warnings.push("Partner equity is zero; sweep collapses to a single level".into());
    }
    if sweep.min_optimal_equity.is_none() {
        warnings.push("No swept equity level satisfies every capital-structure bound".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Capital structure sweep of partner equity (±30%)",
        input,
        warnings,
        elapsed,
        sweep,
    ))
}

fn sweep_step(equity: Money) -> Money {
    let rounded = round_half_up(equity * STEP_SHARE / STEP_ROUNDING, 0).saturating_mul(STEP_ROUNDING);
    rounded.max(MIN_STEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sweep() -> CapitalStructureSweep {
        let input = ProjectInput::sample();
        sweep_capital_structure(&input.assumptions, &input.unit_mix, &input.thresholds)
    }

    #[test]
    fn test_step_rounding() {
        assert_eq!(sweep_step(dec!(300000)), dec!(15000));
        // 5% of 130,000 = 6,500 → 5,000, floored at 10,000
        assert_eq!(sweep_step(dec!(130000)), dec!(10000));
        // 5% of 1,000,000 = 50,000
        assert_eq!(sweep_step(dec!(1000000)), dec!(50000));
        assert_eq!(sweep_step(Decimal::ZERO), dec!(10000));
    }

    #[test]
    fn test_sample_levels() {
        let sweep = sample_sweep();
        assert_eq!(sweep.rows.len(), 13);
        assert_eq!(sweep.rows[0].equity_level, dec!(210000));
        assert_eq!(sweep.rows[12].equity_level, dec!(390000));
        let base: Vec<&CapitalStructureRow> = sweep.rows.iter().filter(|r| r.is_base).collect();
        assert_eq!(base.len(), 1);
        assert_eq!(base[0].equity_level, dec!(300000));
    }

    #[test]
    fn test_more_equity_less_loan() {
        let sweep = sample_sweep();
        for pair in sweep.rows.windows(2) {
            assert!(pair[0].loan_amount > pair[1].loan_amount);
            assert!(pair[0].coverage_ratio < pair[1].coverage_ratio);
        }
    }

    #[test]
    fn test_base_row_matches_engine() {
        let input = ProjectInput::sample();
        let report = compute_project(&input.assumptions, &input.unit_mix, &input.thresholds);
        let sweep = sample_sweep();
        let base = sweep.rows.iter().find(|r| r.is_base).unwrap();
        assert_eq!(base.irr, report.irr);
        assert_eq!(base.loan_amount, report.loan_amount);
        assert!(base.optimal);
    }

    #[test]
    fn test_optimal_flags_ignore_roi_and_margin() {
        let mut input = ProjectInput::sample();
        // Unreachable ROI does not affect the five capital-structure bounds
        input.thresholds.roi_min = dec!(10);
        let sweep = sweep_capital_structure(&input.assumptions, &input.unit_mix, &input.thresholds);
        let base = sweep.rows.iter().find(|r| r.is_base).unwrap();
        assert!(base.optimal);
        assert_ne!(base.verdict, Verdict::Viable);
    }

    #[test]
    fn test_zero_equity_single_row() {
        let out = analyze_capital_structure(&ProjectInput::default()).unwrap();
        assert_eq!(out.result.rows.len(), 1);
        assert_eq!(out.result.rows[0].coverage_ratio, Decimal::ZERO);
        assert!(out.result.rows[0].is_base);
        assert!(!out.warnings.is_empty());
    }
}
