use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::analysis::break_even::{compute_break_even, BreakEven};
use crate::analysis::capital_structure::{sweep_capital_structure, CapitalStructureSweep};
use crate::analysis::scenarios::{build_scenarios, ScenarioOutcome};
use crate::analysis::sensitivity::{SensitivityGrid, DEFAULT_VARIATION};
use crate::analysis::tables::build_all_tables;
use crate::project::assumptions::ProjectInput;
use crate::project::metrics::{compute_project, report_warnings, MetricsReport};
use crate::project::validation::validate_for_analysis;
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::PrefeasResult;

/// Options for a full feasibility study.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyOptions {
    /// Per-step variation for the sensitivity tables
    pub variation_pct: Rate,
    /// Reject projects with missing required fields before running
    pub require_complete: bool,
}

impl Default for StudyOptions {
    fn default() -> Self {
        Self {
            variation_pct: DEFAULT_VARIATION,
            require_complete: true,
        }
    }
}

/// Everything the dashboard shows after "generate analysis".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeasibilityStudy {
    pub report: MetricsReport,
    pub tables: Vec<SensitivityGrid>,
    pub scenarios: Vec<ScenarioOutcome>,
    pub break_even: BreakEven,
    pub capital_structure: CapitalStructureSweep,
}

/// Run the engine and every generator on one project.
pub fn run_feasibility_study(
    input: &ProjectInput,
    options: &StudyOptions,
) -> PrefeasResult<ComputationOutput<FeasibilityStudy>> {
    let start = Instant::now();

    if options.require_complete {
        validate_for_analysis(input)?;
    }

    let a = &input.assumptions;
    let report = compute_project(a, &input.unit_mix, &input.thresholds);
    let warnings = report_warnings(&report);

    let tables = build_all_tables(input, options.variation_pct)?;
    let scenarios = build_scenarios(a, &input.unit_mix, &input.thresholds);
    let break_even = compute_break_even(&report, a);
    let capital_structure = sweep_capital_structure(a, &input.unit_mix, &input.thresholds);

    tracing::debug!(
        project = %a.project_name,
        verdict = %report.decision.verdict,
        "feasibility study complete"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Real-estate pre-feasibility study",
        &serde_json::json!({
            "project": input,
            "options": options,
        }),
        warnings,
        elapsed,
        FeasibilityStudy {
            report,
            tables,
            scenarios,
            break_even,
            capital_structure,
        },
    ))
}
