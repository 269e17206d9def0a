use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use prefeas_core::analysis::sensitivity::{GridRequest, DEFAULT_VARIATION};
use prefeas_core::analysis::study::StudyOptions;
use prefeas_core::analysis::tables::SensitivityTable;
use prefeas_core::project::assumptions::ProjectInput;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn default_variation() -> Decimal {
    DEFAULT_VARIATION
}

#[derive(Deserialize)]
struct SensitivityCall {
    project: ProjectInput,
    request: GridRequest,
}

#[derive(Deserialize)]
struct TableCall {
    project: ProjectInput,
    /// Table number or name
    table: String,
    #[serde(default = "default_variation")]
    variation_pct: Decimal,
}

#[derive(Deserialize)]
struct StudyCall {
    project: ProjectInput,
    #[serde(default)]
    options: StudyOptions,
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_project(input_json: String) -> NapiResult<String> {
    let input: ProjectInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        prefeas_core::project::metrics::analyze_project(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn missing_fields(input_json: String) -> NapiResult<String> {
    let input: ProjectInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let missing = prefeas_core::project::validation::missing_fields(&input);
    serde_json::to_string(&missing).map_err(to_napi_error)
}

#[napi]
pub fn sample_project() -> NapiResult<String> {
    serde_json::to_string(&ProjectInput::sample()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

#[napi]
pub fn sensitivity_grid(input_json: String) -> NapiResult<String> {
    let call: SensitivityCall = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        prefeas_core::analysis::sensitivity::analyze_sensitivity(&call.project, &call.request)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn sensitivity_table(input_json: String) -> NapiResult<String> {
    let call: TableCall = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let table: SensitivityTable = call.table.parse().map_err(to_napi_error)?;
    let output =
        prefeas_core::analysis::tables::analyze_table(table, &call.project, call.variation_pct)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Scenarios, break-even, capital structure
// ---------------------------------------------------------------------------

#[napi]
pub fn run_scenarios(input_json: String) -> NapiResult<String> {
    let input: ProjectInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        prefeas_core::analysis::scenarios::analyze_scenarios(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn break_even(input_json: String) -> NapiResult<String> {
    let input: ProjectInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        prefeas_core::analysis::break_even::analyze_break_even(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn capital_structure(input_json: String) -> NapiResult<String> {
    let input: ProjectInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = prefeas_core::analysis::capital_structure::analyze_capital_structure(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Full study
// ---------------------------------------------------------------------------

#[napi]
pub fn feasibility_study(input_json: String) -> NapiResult<String> {
    let call: StudyCall = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = prefeas_core::analysis::study::run_feasibility_study(&call.project, &call.options)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
