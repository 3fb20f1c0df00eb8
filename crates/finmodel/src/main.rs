use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use finmodel::{OutputFormat, init_logging, load_model, render_chart, render_ledger, render_summary};
use finmodel_core::chart::{ViewDetail, ViewFrequency};
use finmodel_core::{ModelSummary, ViewSettings, evaluate, make_chart_data};

#[derive(Parser, Debug)]
#[command(name = "finmodel")]
#[command(about = "Evaluate a household finance model over time")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the ledger of evaluations
    Evaluate {
        /// Model file (.json, .yaml or .yml)
        model: PathBuf,

        /// Print the final value of each item instead of the full ledger
        #[arg(short, long)]
        summary: bool,
    },
    /// Print chart series built from the ledger
    Chart {
        /// Model file (.json, .yaml or .yml)
        model: PathBuf,

        /// Override the model's view frequency (monthly, annual)
        #[arg(long, value_parser = parse_frequency)]
        view_frequency: Option<ViewFrequency>,

        /// Override the model's view detail (fine, coarse)
        #[arg(long, value_parser = parse_detail)]
        detail: Option<ViewDetail>,
    },
}

fn parse_frequency(text: &str) -> Result<ViewFrequency, String> {
    ViewFrequency::parse(text).ok_or_else(|| format!("unknown view frequency '{text}'"))
}

fn parse_detail(text: &str) -> Result<ViewDetail, String> {
    ViewDetail::parse(text).ok_or_else(|| format!("unknown view detail '{text}'"))
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level)?;

    let output = match args.command {
        Command::Evaluate { model, summary } => {
            let data = load_model(&model)?;
            let ledger = evaluate(&data)
                .wrap_err_with(|| format!("evaluating {}", model.display()))?;
            tracing::info!(evaluations = ledger.len(), "evaluation finished");
            if summary {
                render_summary(&ModelSummary::from_ledger(&ledger))
            } else {
                render_ledger(&ledger, args.format)?
            }
        }
        Command::Chart {
            model,
            view_frequency,
            detail,
        } => {
            let data = load_model(&model)?;
            let ledger = evaluate(&data)
                .wrap_err_with(|| format!("evaluating {}", model.display()))?;
            let mut view = ViewSettings::from_model(&data)?;
            if let Some(frequency) = view_frequency {
                view.frequency = frequency;
            }
            if let Some(detail) = detail {
                view.detail = detail;
            }
            let chart = make_chart_data(&data, &ledger, &view)?;
            render_chart(&chart, args.format)?
        }
    };

    print!("{output}");
    Ok(())
}
