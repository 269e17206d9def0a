use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use prefeas_core::analysis::sensitivity::{
    self, GridRequest, GridVariable, StepSpan, DEFAULT_VARIATION,
};
use prefeas_core::analysis::tables::{self, SensitivityTable};
use prefeas_core::project::metrics::MetricKey;

use crate::input::project::{attach_warnings, load_project, ProjectArgs};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Span {
    /// -2..=2
    #[value(name = "5")]
    Five,
    /// -3..=3
    #[value(name = "7")]
    Seven,
}

/// Arguments for a generic two-variable grid
#[derive(Args)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Report field shown in the cells (e.g. margin, roi, irr, loan_amount)
    #[arg(long, default_value = "margin")]
    pub metric: String,

    /// Row variable: construction_cost, sale_price, interest_rate,
    /// cash_equity, construction_months, presale_pct
    #[arg(long, default_value = "construction_cost")]
    pub row: String,

    /// Column variable (same choices as --row)
    #[arg(long, default_value = "sale_price")]
    pub col: String,

    /// Relative change per step (0.01 to 0.25)
    #[arg(long, default_value_t = DEFAULT_VARIATION)]
    pub variation: Decimal,

    /// Number of steps per axis
    #[arg(long, value_enum, default_value = "7")]
    pub steps: Span,

    /// Label axes with absolute input values instead of percentage changes
    #[arg(long)]
    pub absolute: bool,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loaded = load_project(&args.project)?;
    let request = GridRequest {
        metric: args.metric.parse::<MetricKey>()?,
        row: args.row.parse::<GridVariable>()?,
        col: args.col.parse::<GridVariable>()?,
        variation_pct: args.variation,
        span: match args.steps {
            Span::Five => StepSpan::Five,
            Span::Seven => StepSpan::Seven,
        },
        absolute_labels: args.absolute,
    };
    let result = sensitivity::analyze_sensitivity(&loaded.project, &request)?;
    Ok(attach_warnings(serde_json::to_value(result)?, loaded.warnings))
}

/// Arguments for the dashboard tables
#[derive(Args)]
pub struct TableArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Table number (1-6), table name, or "all"
    #[arg(long, default_value = "all")]
    pub table: String,

    /// Relative change per step (0.01 to 0.25)
    #[arg(long, default_value_t = DEFAULT_VARIATION)]
    pub variation: Decimal,
}

pub fn run_table(args: TableArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loaded = load_project(&args.project)?;

    if args.table.trim().eq_ignore_ascii_case("all") {
        let grids = tables::build_all_tables(&loaded.project, args.variation)?;
        let value = json!({
            "result": grids,
            "methodology": "Dashboard sensitivity tables 1-6",
            "warnings": [],
        });
        return Ok(attach_warnings(value, loaded.warnings));
    }

    let table = args.table.parse::<SensitivityTable>()?;
    let result = tables::analyze_table(table, &loaded.project, args.variation)?;
    Ok(attach_warnings(serde_json::to_value(result)?, loaded.warnings))
}
