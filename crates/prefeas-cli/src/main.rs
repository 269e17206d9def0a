mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::project::{
    AnalyzeArgs, BreakEvenArgs, CapitalStructureArgs, ScenariosArgs, TemplateArgs, ValidateArgs,
};
use commands::sensitivity::{SensitivityArgs, TableArgs};
use commands::study::StudyArgs;

/// Real-estate development pre-feasibility analysis
#[derive(Parser)]
#[command(
    name = "prefeas",
    version,
    about = "Real-estate development pre-feasibility analysis",
    long_about = "A CLI for go / no-go analysis of residential development projects \
                  with decimal precision. Computes the financing plug, seven headline \
                  metrics and a verdict, sensitivity tables, fixed scenarios, \
                  break-even figures and a capital-structure sweep."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Increase diagnostic logging on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the metrics report and verdict for a project
    Analyze(AnalyzeArgs),
    /// Two-variable sensitivity grid (full engine re-run per cell)
    Sensitivity(SensitivityArgs),
    /// One or all of the six dashboard sensitivity tables
    Table(TableArgs),
    /// Run the five fixed price / cost scenarios
    Scenarios(ScenariosArgs),
    /// Minimum price and unit counts to break even
    BreakEven(BreakEvenArgs),
    /// Sweep partner equity from 70% to 130%
    CapitalStructure(CapitalStructureArgs),
    /// Full study: report, tables, scenarios, break-even, capital structure
    Study(StudyArgs),
    /// Print a blank or quick-fill project file
    Template(TemplateArgs),
    /// List required fields that are still missing
    Validate(ValidateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::project::run_analyze(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Table(args) => commands::sensitivity::run_table(args),
        Commands::Scenarios(args) => commands::project::run_scenarios(args),
        Commands::BreakEven(args) => commands::project::run_break_even(args),
        Commands::CapitalStructure(args) => commands::project::run_capital_structure(args),
        Commands::Study(args) => commands::study::run_study(args),
        Commands::Template(args) => commands::project::run_template(args),
        Commands::Validate(args) => commands::project::run_validate(args),
        Commands::Version => {
            println!("prefeas {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
