use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::math::{ceil_count, safe_div};
use crate::project::assumptions::{ProjectAssumptions, ProjectInput};
use crate::project::metrics::{compute_project, MetricsReport};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::PrefeasResult;

/// Margin the minimum price is solved for.
pub const TARGET_MARGIN: Rate = dec!(0.15);

/// Price and volume floors derived from one metrics report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEven {
    /// Soft costs + commission + marketing, as a fraction of revenue
    pub variable_cost_fraction: Rate,
    /// Land + construction + contingency + financing
    pub fixed_costs: Money,
    pub target_margin: Rate,
    /// Average price per m² that yields the target margin
    pub min_price_per_m2: Money,
    pub contribution_per_unit: Money,
    pub units_to_recover_capital: u32,
    /// Units whose contribution covers the costs not funded by equity
    pub units_to_cover_financing: u32,
    /// (average price per m² − minimum) / minimum
    pub safety_margin: Rate,
    pub price_sufficient: bool,
    pub capital_units_share: Rate,
    pub financing_units_share: Rate,
}

/// Derive break-even figures from a report and its assumptions without
/// re-running the engine.
pub fn compute_break_even(report: &MetricsReport, assumptions: &ProjectAssumptions) -> BreakEven {
    let variable_cost_fraction = assumptions
        .soft_costs_pct
        .saturating_add(assumptions.sales_commission_pct)
        .saturating_add(assumptions.marketing_pct);
    let fixed_costs = report
        .land_price
        .saturating_add(report.construction_cost)
        .saturating_add(report.contingency_cost)
        .saturating_add(report.financing_cost);

    // Solve (price × area × (1 − v) − fixed) / (price × area) ≥ target for price.
    let margin_room = (Decimal::ONE - TARGET_MARGIN).saturating_sub(variable_cost_fraction);
    let min_price_per_m2 = if margin_room > Decimal::ZERO {
        safe_div(fixed_costs, margin_room.saturating_mul(report.sellable_area))
    } else {
        Decimal::ZERO
    };

    let contribution_per_unit = report
        .avg_price_per_unit
        .saturating_mul(Decimal::ONE.saturating_sub(variable_cost_fraction));
    let (units_to_recover_capital, units_to_cover_financing) =
        if contribution_per_unit > Decimal::ZERO {
            (
                ceil_count(safe_div(fixed_costs, contribution_per_unit)),
                ceil_count(safe_div(
                    fixed_costs.saturating_sub(report.total_equity),
                    contribution_per_unit,
                )),
            )
        } else {
            (0, 0)
        };

    let safety_margin = if min_price_per_m2 > Decimal::ZERO {
        safe_div(report.avg_price_per_m2 - min_price_per_m2, min_price_per_m2)
    } else {
        Decimal::ZERO
    };

    let units = Decimal::from(report.total_units);
    BreakEven {
        variable_cost_fraction,
        fixed_costs,
        target_margin: TARGET_MARGIN,
        min_price_per_m2,
        contribution_per_unit,
        units_to_recover_capital,
        units_to_cover_financing,
        safety_margin,
        price_sufficient: min_price_per_m2 > Decimal::ZERO
            && report.avg_price_per_m2 >= min_price_per_m2,
        capital_units_share: safe_div(Decimal::from(units_to_recover_capital), units),
        financing_units_share: safe_div(Decimal::from(units_to_cover_financing), units),
    }
}

/// Run the engine, then derive break-even figures, with warnings.
pub fn analyze_break_even(input: &ProjectInput) -> PrefeasResult<ComputationOutput<BreakEven>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let report = compute_project(&input.assumptions, &input.unit_mix, &input.thresholds);
    let result = compute_break_even(&report, &input.assumptions);

    if result.min_price_per_m2.is_zero() && report.sellable_area > Decimal::ZERO {
        warnings.push(format!(
            "Variable costs ({}) leave no room for a {} margin; minimum price undefined",
            result.variable_cost_fraction, TARGET_MARGIN
        ));
    }
    if result.units_to_recover_capital > report.total_units {
        warnings.push(format!(
            "Recovering costs needs {} units but only {} are planned",
            result.units_to_recover_capital, report.total_units
        ));
    }
    if !result.price_sufficient && result.min_price_per_m2 > Decimal::ZERO {
        warnings.push("Average price per m² is below the minimum for the target margin".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Break-even price and volume (15% target margin)",
        input,
        warnings,
        elapsed,
        result,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_break_even() -> BreakEven {
        let input = ProjectInput::sample();
        let report = compute_project(&input.assumptions, &input.unit_mix, &input.thresholds);
        compute_break_even(&report, &input.assumptions)
    }

    #[test]
    fn test_sample_break_even() {
        let be = sample_break_even();
        assert_eq!(be.variable_cost_fraction, dec!(0.078));
        assert!((be.fixed_costs - dec!(2091549.166)).abs() < dec!(0.001));
        assert!((be.min_price_per_m2 - dec!(1548.1489)).abs() < dec!(0.0001));
        assert_eq!(be.contribution_per_unit, dec!(133690));
        assert_eq!(be.units_to_recover_capital, 16);
        assert_eq!(be.units_to_cover_financing, 12);
        assert!((be.safety_margin - dec!(0.0704028)).abs() < dec!(0.0000001));
        assert!(be.price_sufficient);
        assert_eq!(be.capital_units_share, dec!(0.8));
    }

    #[test]
    fn test_zero_project() {
        let input = ProjectInput::default();
        let report = compute_project(&input.assumptions, &input.unit_mix, &input.thresholds);
        let be = compute_break_even(&report, &input.assumptions);
        assert_eq!(be.min_price_per_m2, Decimal::ZERO);
        assert_eq!(be.units_to_recover_capital, 0);
        assert_eq!(be.safety_margin, Decimal::ZERO);
        assert!(!be.price_sufficient);
    }

    #[test]
    fn test_variable_costs_above_room() {
        let mut input = ProjectInput::sample();
        input.assumptions.sales_commission_pct = dec!(0.90);
        let out = analyze_break_even(&input).unwrap();
        assert_eq!(out.result.min_price_per_m2, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("no room")));
    }

    #[test]
    fn test_equity_covers_fixed_costs() {
        let mut input = ProjectInput::sample();
        input.assumptions.partner_cash_equity = dec!(3000000);
        let report = compute_project(&input.assumptions, &input.unit_mix, &input.thresholds);
        let be = compute_break_even(&report, &input.assumptions);
        assert_eq!(be.units_to_cover_financing, 0);
    }
}
