use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;

use crate::error::PrefeasError;
use crate::math::{is_saturated, safe_div};
use crate::project::assumptions::{ProjectAssumptions, ProjectInput, Thresholds, UnitMixLine};
use crate::project::decision::{self, Bound, Decision, HeadlineMetrics};
use crate::project::parking::{self, ParkingRequirement};
use crate::types::{with_metadata, ComputationOutput, Money, Multiple, Rate};
use crate::PrefeasResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const M2_PER_HECTARE: Decimal = dec!(10000);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Every figure derived from one set of project assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    // --- Revenue ---
    pub total_units: u32,
    pub sellable_area: Decimal,
    pub total_revenue: Money,
    pub avg_price_per_m2: Money,
    pub avg_price_per_unit: Money,

    // --- Land ---
    pub land_price: Money,
    pub land_price_per_m2: Money,

    // --- Costs before financing ---
    pub construction_cost: Money,
    pub soft_cost: Money,
    pub commission_cost: Money,
    pub marketing_cost: Money,
    pub contingency_cost: Money,
    pub pre_financing_cost: Money,

    // --- Capital ---
    /// Land contributed in kind, counted as equity
    pub land_equity: Money,
    pub total_equity: Money,
    pub presale_proceeds: Money,

    // --- Financing plug ---
    /// 1 − rate × draw × construction years − bank fee
    pub financing_denominator: Decimal,
    /// Gap left after equity and presales
    pub financing_need: Money,
    pub loan_amount: Money,
    pub interest_cost: Money,
    pub bank_fee_cost: Money,
    pub financing_cost: Money,

    // --- Totals ---
    pub total_cost: Money,
    pub net_profit: Money,
    pub total_months: u32,

    // --- Headline metrics ---
    pub roi: Rate,
    pub moic: Multiple,
    pub markup: Multiple,
    pub margin: Rate,
    /// Annualised equity return; -1 signals total loss of capital
    pub irr: Rate,
    pub ltv: Rate,
    pub ltc: Rate,

    // --- Urbanistic ---
    /// Units per hectare
    pub density: Decimal,
    pub area_per_unit: Decimal,
    pub blended_cost_per_m2: Money,

    pub decision: Decision,
    pub parking: ParkingRequirement,
}

impl MetricsReport {
    /// Look up a numeric field by key.
    pub fn metric(&self, key: MetricKey) -> Decimal {
        match key {
            MetricKey::Roi => self.roi,
            MetricKey::Margin => self.margin,
            MetricKey::Moic => self.moic,
            MetricKey::Markup => self.markup,
            MetricKey::Irr => self.irr,
            MetricKey::Ltv => self.ltv,
            MetricKey::Ltc => self.ltc,
            MetricKey::NetProfit => self.net_profit,
            MetricKey::TotalRevenue => self.total_revenue,
            MetricKey::TotalCost => self.total_cost,
            MetricKey::PreFinancingCost => self.pre_financing_cost,
            MetricKey::LoanAmount => self.loan_amount,
            MetricKey::FinancingCost => self.financing_cost,
            MetricKey::TotalEquity => self.total_equity,
            MetricKey::PresaleProceeds => self.presale_proceeds,
            MetricKey::BlendedCostPerM2 => self.blended_cost_per_m2,
            MetricKey::AvgPricePerM2 => self.avg_price_per_m2,
        }
    }
}

/// Report fields that can be plotted in a sensitivity grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    Roi,
    Margin,
    Moic,
    Markup,
    Irr,
    Ltv,
    Ltc,
    NetProfit,
    TotalRevenue,
    TotalCost,
    PreFinancingCost,
    LoanAmount,
    FinancingCost,
    TotalEquity,
    PresaleProceeds,
    BlendedCostPerM2,
    AvgPricePerM2,
}

impl MetricKey {
    pub const ALL: [MetricKey; 17] = [
        MetricKey::Roi,
        MetricKey::Margin,
        MetricKey::Moic,
        MetricKey::Markup,
        MetricKey::Irr,
        MetricKey::Ltv,
        MetricKey::Ltc,
        MetricKey::NetProfit,
        MetricKey::TotalRevenue,
        MetricKey::TotalCost,
        MetricKey::PreFinancingCost,
        MetricKey::LoanAmount,
        MetricKey::FinancingCost,
        MetricKey::TotalEquity,
        MetricKey::PresaleProceeds,
        MetricKey::BlendedCostPerM2,
        MetricKey::AvgPricePerM2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::Roi => "roi",
            MetricKey::Margin => "margin",
            MetricKey::Moic => "moic",
            MetricKey::Markup => "markup",
            MetricKey::Irr => "irr",
            MetricKey::Ltv => "ltv",
            MetricKey::Ltc => "ltc",
            MetricKey::NetProfit => "net_profit",
            MetricKey::TotalRevenue => "total_revenue",
            MetricKey::TotalCost => "total_cost",
            MetricKey::PreFinancingCost => "pre_financing_cost",
            MetricKey::LoanAmount => "loan_amount",
            MetricKey::FinancingCost => "financing_cost",
            MetricKey::TotalEquity => "total_equity",
            MetricKey::PresaleProceeds => "presale_proceeds",
            MetricKey::BlendedCostPerM2 => "blended_cost_per_m2",
            MetricKey::AvgPricePerM2 => "avg_price_per_m2",
        }
    }

    /// Go / no-go bound for the seven headline metrics, `None` otherwise.
    pub fn threshold(&self, thresholds: &Thresholds) -> Option<(Decimal, Bound)> {
        match self {
            MetricKey::Roi => Some((thresholds.roi_min, Bound::Min)),
            MetricKey::Margin => Some((thresholds.margin_min, Bound::Min)),
            MetricKey::Moic => Some((thresholds.moic_min, Bound::Min)),
            MetricKey::Markup => Some((thresholds.markup_min, Bound::Min)),
            MetricKey::Irr => Some((thresholds.irr_min, Bound::Min)),
            MetricKey::Ltv => Some((thresholds.ltv_max, Bound::Max)),
            MetricKey::Ltc => Some((thresholds.ltc_max, Bound::Max)),
            _ => None,
        }
    }
}

impl FromStr for MetricKey {
    type Err = PrefeasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace('-', "_");
        MetricKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == needle)
            .ok_or_else(|| PrefeasError::InvalidInput {
                field: "metric".into(),
                reason: format!(
                    "Unknown metric '{s}'. Available: {}",
                    MetricKey::ALL.map(|k| k.as_str()).join(", ")
                ),
            })
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the full metrics report for one set of assumptions.
///
/// Total over all numeric input: every ratio whose denominator is zero
/// resolves to zero, a negative IRR base is floored at -1, and sums or
/// products beyond the decimal range saturate instead of overflowing.
pub fn compute_project(
    assumptions: &ProjectAssumptions,
    unit_mix: &[UnitMixLine],
    thresholds: &Thresholds,
) -> MetricsReport {
    let a = assumptions;

    // --- Revenue ---
    // Sums saturate at the Decimal / u32 range instead of panicking.
    let total_units = unit_mix
        .iter()
        .fold(0u32, |acc, u| acc.saturating_add(u.quantity));
    let units: Decimal = unit_mix.iter().map(|u| Decimal::from(u.quantity)).sum();
    let sellable_area = unit_mix.iter().fold(Decimal::ZERO, |acc, u| {
        acc.saturating_add(Decimal::from(u.quantity).saturating_mul(u.area_m2))
    });
    let total_revenue: Money = unit_mix.iter().fold(Decimal::ZERO, |acc, u| {
        acc.saturating_add(Decimal::from(u.quantity).saturating_mul(u.price_per_unit))
    });
    let avg_price_per_m2 = safe_div(total_revenue, sellable_area);
    let avg_price_per_unit = safe_div(total_revenue, units);

    // --- Land ---
    let land_price = a.land_price;
    let land_price_per_m2 = safe_div(land_price, a.land_area);

    // --- Hard and soft costs ---
    let construction_cost = sellable_area.saturating_mul(a.construction_cost_per_m2);
    let soft_cost = total_revenue.saturating_mul(a.soft_costs_pct);
    let commission_cost = total_revenue.saturating_mul(a.sales_commission_pct);
    let marketing_cost = total_revenue.saturating_mul(a.marketing_pct);
    let contingency_cost = construction_cost.saturating_mul(a.contingency_pct);

    let pre_financing_cost = land_price
        .saturating_add(construction_cost)
        .saturating_add(soft_cost)
        .saturating_add(commission_cost)
        .saturating_add(marketing_cost)
        .saturating_add(contingency_cost);

    // --- Equity and presales ---
    let land_equity = land_price;
    let total_equity = land_equity.saturating_add(a.partner_cash_equity);
    let presale_proceeds = total_revenue
        .saturating_mul(a.presale_pct)
        .saturating_mul(a.collection_pct);

    // --- Financing plug ---
    // loan = need + loan × (rate × draw × years + fee), isolated for loan.
    let construction_years = Decimal::from(a.construction_months) / MONTHS_PER_YEAR;
    let interest_factor = a
        .annual_interest_rate
        .saturating_mul(a.draw_factor)
        .saturating_mul(construction_years);
    let financing_denominator = Decimal::ONE
        .saturating_sub(interest_factor)
        .saturating_sub(a.bank_fee_pct);
    let financing_need = pre_financing_cost
        .saturating_sub(total_equity)
        .saturating_sub(presale_proceeds);
    let loan_amount = safe_div(financing_need, financing_denominator).max(Decimal::ZERO);

    let interest_cost = loan_amount.saturating_mul(interest_factor);
    let bank_fee_cost = loan_amount.saturating_mul(a.bank_fee_pct);
    let financing_cost = interest_cost.saturating_add(bank_fee_cost);

    // --- Totals ---
    let total_cost = pre_financing_cost.saturating_add(financing_cost);
    let net_profit = total_revenue.saturating_sub(total_cost);
    let total_months = a.total_months();

    // --- Seven metrics ---
    // ROI, markup and LTC are measured against cost before financing.
    let roi = safe_div(net_profit, pre_financing_cost);
    let moic = safe_div(net_profit.saturating_add(total_equity), total_equity);
    let markup = safe_div(total_revenue, pre_financing_cost);
    let margin = safe_div(net_profit, total_revenue);
    let irr = annualized_return(net_profit, total_equity, total_months);
    let ltv = safe_div(loan_amount, total_revenue);
    let ltc = safe_div(loan_amount, pre_financing_cost);

    // --- Urbanistic ---
    let density = safe_div(units.saturating_mul(M2_PER_HECTARE), a.land_area);
    let area_per_unit = safe_div(sellable_area, units);
    let blended_cost_per_m2 = safe_div(total_cost, sellable_area);

    let decision = decision::evaluate(
        &HeadlineMetrics {
            roi,
            margin,
            moic,
            markup,
            irr,
            ltv,
            ltc,
        },
        thresholds,
    );
    let parking = parking::required_parking(total_units, a);

    MetricsReport {
        total_units,
        sellable_area,
        total_revenue,
        avg_price_per_m2,
        avg_price_per_unit,
        land_price,
        land_price_per_m2,
        construction_cost,
        soft_cost,
        commission_cost,
        marketing_cost,
        contingency_cost,
        pre_financing_cost,
        land_equity,
        total_equity,
        presale_proceeds,
        financing_denominator,
        financing_need,
        loan_amount,
        interest_cost,
        bank_fee_cost,
        financing_cost,
        total_cost,
        net_profit,
        total_months,
        roi,
        moic,
        markup,
        margin,
        irr,
        ltv,
        ltc,
        density,
        area_per_unit,
        blended_cost_per_m2,
        decision,
        parking,
    }
}

/// Annualised equity return: (1 + profit / equity)^(12 / months) − 1.
///
/// Zero when there is no equity or no timeline; -1 when the loss wipes out
/// the equity (a fractional power of a non-positive base is undefined).
pub fn annualized_return(net_profit: Money, total_equity: Money, total_months: u32) -> Rate {
    if total_equity <= Decimal::ZERO || total_months == 0 {
        return Decimal::ZERO;
    }
    let base = Decimal::ONE.saturating_add(safe_div(net_profit, total_equity));
    if base <= Decimal::ZERO {
        return dec!(-1);
    }
    let exponent = MONTHS_PER_YEAR / Decimal::from(total_months);
    match base.checked_powd(exponent) {
        Some(growth) => growth - Decimal::ONE,
        None => {
            tracing::warn!(%base, %exponent, "annualized return overflowed decimal range");
            Decimal::MAX
        }
    }
}

/// Run the engine on a complete project and wrap the report with warnings.
pub fn analyze_project(input: &ProjectInput) -> PrefeasResult<ComputationOutput<MetricsReport>> {
    let start = Instant::now();

    let report = compute_project(&input.assumptions, &input.unit_mix, &input.thresholds);
    let warnings = report_warnings(&report);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Development Pre-Feasibility (closed-form financing plug)",
        input,
        warnings,
        elapsed,
        report,
    ))
}

/// Non-fatal conditions worth surfacing next to a report.
pub fn report_warnings(report: &MetricsReport) -> Vec<String> {
    let mut warnings = Vec::new();

    if report.total_units == 0 {
        warnings.push("Unit mix has no units; revenue-based metrics are zero".into());
    } else if report.total_units == u32::MAX {
        warnings.push("Unit count exceeds the supported range; total units saturated".into());
    }
    if [
        report.sellable_area,
        report.total_revenue,
        report.pre_financing_cost,
        report.loan_amount,
        report.total_cost,
        report.net_profit,
    ]
    .iter()
    .any(|v| is_saturated(*v))
    {
        warnings.push(
            "Inputs exceed the decimal range; saturated totals make the metrics unreliable".into(),
        );
    }
    if report.total_months == 0 {
        warnings.push("Timeline is zero months; IRR reported as zero".into());
    }
    if report.financing_denominator <= Decimal::ZERO {
        warnings.push(format!(
            "Financing denominator {} is not positive; interest and fees consume the whole loan, loan set to zero",
            report.financing_denominator
        ));
    } else if report.financing_need < Decimal::ZERO {
        warnings.push("Equity and presales cover all costs; no construction loan required".into());
    }
    if report.irr == dec!(-1) {
        warnings.push("Net loss exceeds total equity; IRR floored at -100%".into());
    } else if report.irr == Decimal::MAX {
        warnings.push("Annualised IRR exceeds decimal range; reported as the maximum value".into());
    }
    if !report.parking.compliant {
        warnings.push(format!(
            "Designed parking ({}) is below the requirement ({})",
            report.parking.designed_spaces, report.parking.required_spaces
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::decision::Verdict;
    use rust_decimal_macros::dec;

    fn sample() -> ProjectInput {
        ProjectInput::sample()
    }

    fn run(input: &ProjectInput) -> MetricsReport {
        compute_project(&input.assumptions, &input.unit_mix, &input.thresholds)
    }

    #[test]
    fn test_revenue_aggregation() {
        let r = run(&sample());
        assert_eq!(r.total_units, 20);
        assert_eq!(r.sellable_area, dec!(1750));
        assert_eq!(r.total_revenue, dec!(2900000));
        assert_eq!(r.avg_price_per_unit, dec!(145000));
    }

    #[test]
    fn test_cost_build_up() {
        let r = run(&sample());
        assert_eq!(r.construction_cost, dec!(1662500));
        assert_eq!(r.soft_cost, dec!(72500));
        assert_eq!(r.commission_cost, dec!(145000));
        assert_eq!(r.marketing_cost, dec!(8700));
        assert_eq!(r.contingency_cost, dec!(33250));
        assert_eq!(r.pre_financing_cost, dec!(2196950));
    }

    #[test]
    fn test_financing_plug() {
        let r = run(&sample());
        assert_eq!(r.total_equity, dec!(575000));
        assert_eq!(r.presale_proceeds, dec!(543750));
        assert_eq!(r.financing_denominator, dec!(0.89925));
        assert_eq!(r.financing_need, dec!(1078200));
        assert!((r.loan_amount - dec!(1198999.17)).abs() < dec!(0.01));
        // The loan exactly covers the need plus its own interest and fee.
        let covered = r.loan_amount - r.financing_cost;
        assert!((covered - r.financing_need).abs() < dec!(0.000001));
    }

    #[test]
    fn test_zero_denominator_gives_zero_loan() {
        let mut input = sample();
        input.assumptions.bank_fee_pct = Decimal::ONE;
        input.assumptions.annual_interest_rate = Decimal::ZERO;
        let r = run(&input);
        assert!(r.financing_denominator.is_zero());
        assert_eq!(r.loan_amount, Decimal::ZERO);
        assert_eq!(r.financing_cost, Decimal::ZERO);
    }

    #[test]
    fn test_negative_need_clamped() {
        let mut input = sample();
        input.assumptions.partner_cash_equity = dec!(5000000);
        let r = run(&input);
        assert!(r.financing_need < Decimal::ZERO);
        assert_eq!(r.loan_amount, Decimal::ZERO);
        assert_eq!(r.ltv, Decimal::ZERO);
    }

    #[test]
    fn test_negative_denominator_never_negative_loan() {
        let mut input = sample();
        input.assumptions.annual_interest_rate = dec!(2);
        let r = run(&input);
        assert!(r.financing_denominator < Decimal::ZERO);
        assert_eq!(r.loan_amount, Decimal::ZERO);
    }

    #[test]
    fn test_irr_total_loss_floor() {
        assert_eq!(annualized_return(dec!(-600), dec!(500), 24), dec!(-1));
        assert_eq!(annualized_return(dec!(-500), dec!(500), 24), dec!(-1));
    }

    #[test]
    fn test_irr_integer_exponent() {
        // 12 months: (1 + 0.2)^1 - 1
        assert_eq!(annualized_return(dec!(100), dec!(500), 12), dec!(0.2));
        // 6 months: 1.1^2 - 1
        let irr = annualized_return(dec!(50), dec!(500), 6);
        assert!((irr - dec!(0.21)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_irr_guards() {
        assert_eq!(annualized_return(dec!(100), Decimal::ZERO, 12), Decimal::ZERO);
        assert_eq!(annualized_return(dec!(100), dec!(500), 0), Decimal::ZERO);
    }

    #[test]
    fn test_sample_is_viable() {
        let r = run(&sample());
        assert_eq!(r.decision.pass_count, 7);
        assert_eq!(r.decision.verdict, Verdict::Viable);
        assert!(r.parking.compliant);
    }

    #[test]
    fn test_metric_lookup() {
        let r = run(&sample());
        assert_eq!(r.metric(MetricKey::Margin), r.margin);
        assert_eq!(r.metric(MetricKey::LoanAmount), r.loan_amount);
        assert_eq!("net-profit".parse::<MetricKey>().unwrap(), MetricKey::NetProfit);
        assert!("npv".parse::<MetricKey>().is_err());
    }

    #[test]
    fn test_warnings() {
        let out = analyze_project(&ProjectInput::default()).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("no units")));
        assert!(out.warnings.iter().any(|w| w.contains("parking")));
        let out = analyze_project(&sample()).unwrap();
        assert!(out.warnings.is_empty(), "unexpected: {:?}", out.warnings);
    }

    #[test]
    fn test_unit_count_beyond_u32_saturates() {
        let mut input = sample();
        input.unit_mix = vec![
            UnitMixLine::new("Tower A", 3_000_000_000, dec!(80), dec!(140000)),
            UnitMixLine::new("Tower B", 3_000_000_000, dec!(90), dec!(150000)),
        ];
        let r = run(&input);
        assert_eq!(r.total_units, u32::MAX);
        // Averages use the exact unit count
        assert_eq!(r.avg_price_per_unit, dec!(145000));
        assert_eq!(r.area_per_unit, dec!(85));

        let out = analyze_project(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("total units saturated")));
    }

    #[test]
    fn test_revenue_beyond_decimal_range_saturates() {
        let mut input = sample();
        input.unit_mix = vec![UnitMixLine::new(
            "Type 1",
            1_000_000_000,
            dec!(80),
            dec!(100000000000000000000),
        )];
        let r = run(&input);
        assert_eq!(r.total_revenue, Decimal::MAX);
        assert!(r.loan_amount >= Decimal::ZERO);

        let out = analyze_project(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("decimal range")));
    }

    #[test]
    fn test_huge_costs_do_not_overflow() {
        let mut input = sample();
        input.assumptions.land_price = Decimal::MAX;
        input.assumptions.construction_cost_per_m2 = Decimal::MAX;
        let r = run(&input);
        assert_eq!(r.pre_financing_cost, Decimal::MAX);
        assert_eq!(r.total_cost, Decimal::MAX);
        assert!(r.net_profit < Decimal::ZERO);
    }

    #[test]
    fn test_timeline_beyond_u32_saturates() {
        let mut input = sample();
        input.assumptions.pre_dev_months = u32::MAX;
        let r = run(&input);
        assert_eq!(r.total_months, u32::MAX);
        assert!(r.irr > dec!(-1));
    }
}
