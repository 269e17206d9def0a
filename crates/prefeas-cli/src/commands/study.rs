use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use prefeas_core::analysis::sensitivity::DEFAULT_VARIATION;
use prefeas_core::analysis::study::{self, StudyOptions};

use crate::input::project::{attach_warnings, load_project, ProjectArgs};

/// Arguments for the full feasibility study
#[derive(Args)]
pub struct StudyArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Relative change per step for the sensitivity tables (0.01 to 0.25)
    #[arg(long, default_value_t = DEFAULT_VARIATION)]
    pub variation: Decimal,

    /// Run even when required fields are missing
    #[arg(long)]
    pub allow_incomplete: bool,
}

pub fn run_study(args: StudyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loaded = load_project(&args.project)?;
    let options = StudyOptions {
        variation_pct: args.variation,
        require_complete: !args.allow_incomplete,
    };
    let result = study::run_feasibility_study(&loaded.project, &options)?;
    Ok(attach_warnings(serde_json::to_value(result)?, loaded.warnings))
}
