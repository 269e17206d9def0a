use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::project::assumptions::{
    scale_prices, ProjectAssumptions, ProjectInput, Thresholds, UnitMixLine,
};
use crate::project::decision::Verdict;
use crate::project::metrics::{compute_project, MetricsReport};
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::PrefeasResult;

/// A named (price, cost) shock applied to the base project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScenarioDefinition {
    pub name: &'static str,
    pub price_delta: Rate,
    pub cost_delta: Rate,
}

/// The five fixed scenarios, most to least favourable.
pub const SCENARIOS: [ScenarioDefinition; 5] = [
    ScenarioDefinition {
        name: "Aggressive",
        price_delta: dec!(0.20),
        cost_delta: dec!(-0.10),
    },
    ScenarioDefinition {
        name: "Optimistic",
        price_delta: dec!(0.10),
        cost_delta: dec!(-0.05),
    },
    ScenarioDefinition {
        name: "Base",
        price_delta: dec!(0),
        cost_delta: dec!(0),
    },
    ScenarioDefinition {
        name: "Conservative",
        price_delta: dec!(-0.05),
        cost_delta: dec!(0.05),
    },
    ScenarioDefinition {
        name: "Pessimistic",
        price_delta: dec!(-0.15),
        cost_delta: dec!(0.10),
    },
];

/// One scenario run through the full engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub price_delta: Rate,
    pub cost_delta: Rate,
    pub verdict: Verdict,
    pub verdict_color: String,
    pub report: MetricsReport,
}

/// Run every fixed scenario against the base assumptions.
///
/// Unit prices scale by `1 + price_delta` and construction cost per m² by
/// `1 + cost_delta`; the inputs themselves are never modified.
pub fn build_scenarios(
    assumptions: &ProjectAssumptions,
    unit_mix: &[UnitMixLine],
    thresholds: &Thresholds,
) -> Vec<ScenarioOutcome> {
    SCENARIOS
        .iter()
        .map(|def| {
            let mix = scale_prices(unit_mix, Decimal::ONE + def.price_delta);
            let shocked = assumptions.with_construction_cost_per_m2(
                assumptions.construction_cost_per_m2 * (Decimal::ONE + def.cost_delta),
            );
            let report = compute_project(&shocked, &mix, thresholds);
            tracing::debug!(
                scenario = def.name,
                verdict = %report.decision.verdict,
                "scenario evaluated"
            );

            ScenarioOutcome {
                name: def.name.to_string(),
                price_delta: def.price_delta,
                cost_delta: def.cost_delta,
                verdict: report.decision.verdict,
                verdict_color: report.decision.verdict.color().to_string(),
                report,
            }
        })
        .collect()
}

/// Envelope wrapper around [`build_scenarios`].
pub fn analyze_scenarios(
    input: &ProjectInput,
) -> PrefeasResult<ComputationOutput<Vec<ScenarioOutcome>>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let outcomes = build_scenarios(&input.assumptions, &input.unit_mix, &input.thresholds);

    if let Some(first_loss) = outcomes.iter().find(|o| o.report.net_profit < Decimal::ZERO) {
        warnings.push(format!(
            "Project loses money from the {} scenario onward",
            first_loss.name
        ));
    }
    if outcomes.iter().all(|o| o.verdict == Verdict::NotViable) {
        warnings.push("No scenario is viable, including the most aggressive".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed price / cost scenarios (full engine re-run per scenario)",
        input,
        warnings,
        elapsed,
        outcomes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_scenarios_in_order() {
        let input = ProjectInput::sample();
        let out = build_scenarios(&input.assumptions, &input.unit_mix, &input.thresholds);
        let names: Vec<&str> = out.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Aggressive", "Optimistic", "Base", "Conservative", "Pessimistic"]
        );
    }

    #[test]
    fn test_base_equals_engine() {
        let input = ProjectInput::sample();
        let out = build_scenarios(&input.assumptions, &input.unit_mix, &input.thresholds);
        let direct = compute_project(&input.assumptions, &input.unit_mix, &input.thresholds);
        assert_eq!(out[2].report, direct);
    }

    #[test]
    fn test_profit_ordering() {
        let input = ProjectInput::sample();
        let out = build_scenarios(&input.assumptions, &input.unit_mix, &input.thresholds);
        for pair in out.windows(2) {
            assert!(pair[0].report.net_profit > pair[1].report.net_profit);
        }
        assert_eq!(out[0].report.total_revenue, dec!(3480000));
        assert_eq!(out[4].report.construction_cost, dec!(1828750));
    }

    #[test]
    fn test_verdict_colour_matches_verdict() {
        let input = ProjectInput::sample();
        for o in build_scenarios(&input.assumptions, &input.unit_mix, &input.thresholds) {
            assert_eq!(o.verdict_color, o.verdict.color());
            assert_eq!(o.verdict, o.report.decision.verdict);
        }
    }

    #[test]
    fn test_inputs_untouched() {
        let input = ProjectInput::sample();
        let before = input.clone();
        let _ = build_scenarios(&input.assumptions, &input.unit_mix, &input.thresholds);
        assert_eq!(input, before);
    }
}
