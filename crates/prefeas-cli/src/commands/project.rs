use clap::Args;
use serde_json::{json, Value};

use prefeas_core::analysis::break_even;
use prefeas_core::analysis::capital_structure;
use prefeas_core::analysis::scenarios;
use prefeas_core::project::assumptions::ProjectInput;
use prefeas_core::project::metrics;
use prefeas_core::project::validation;

use crate::input::project::{attach_warnings, load_project, ProjectArgs};

/// Arguments for the metrics report
#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loaded = load_project(&args.project)?;
    let result = metrics::analyze_project(&loaded.project)?;
    Ok(attach_warnings(serde_json::to_value(result)?, loaded.warnings))
}

/// Arguments for the fixed scenarios
#[derive(Args)]
pub struct ScenariosArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

pub fn run_scenarios(args: ScenariosArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loaded = load_project(&args.project)?;
    let result = scenarios::analyze_scenarios(&loaded.project)?;
    Ok(attach_warnings(serde_json::to_value(result)?, loaded.warnings))
}

/// Arguments for the break-even calculation
#[derive(Args)]
pub struct BreakEvenArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

pub fn run_break_even(args: BreakEvenArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loaded = load_project(&args.project)?;
    let result = break_even::analyze_break_even(&loaded.project)?;
    Ok(attach_warnings(serde_json::to_value(result)?, loaded.warnings))
}

/// Arguments for the partner-equity sweep
#[derive(Args)]
pub struct CapitalStructureArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

pub fn run_capital_structure(
    args: CapitalStructureArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let loaded = load_project(&args.project)?;
    let result = capital_structure::analyze_capital_structure(&loaded.project)?;
    Ok(attach_warnings(serde_json::to_value(result)?, loaded.warnings))
}

/// Arguments for printing a project template
#[derive(Args)]
pub struct TemplateArgs {
    /// Fill the template with the quick-fill example instead of blanks
    #[arg(long)]
    pub sample: bool,
}

pub fn run_template(args: TemplateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let project = if args.sample {
        ProjectInput::sample()
    } else {
        ProjectInput::default()
    };
    Ok(serde_json::to_value(project)?)
}

/// Arguments for the required-field check
#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Exit with an error when fields are missing
    #[arg(long)]
    pub strict: bool,
}

pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loaded = load_project(&args.project)?;
    if args.strict {
        validation::validate_for_analysis(&loaded.project)?;
    }
    let missing = validation::missing_fields(&loaded.project);
    let value = json!({
        "complete": missing.is_empty(),
        "missing": missing,
    });
    Ok(attach_warnings(value, loaded.warnings))
}
