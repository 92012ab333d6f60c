//! Compare retirement outcomes across contribution values or return rates
//!
//! Usage: cargo run --bin compare_rates -- --values 3,6,10,15
//!        cargo run --bin compare_rates -- --sweep return --values 0.04,0.07,0.10

use anyhow::Context;
use clap::{Parser, ValueEnum};
use contribution_planner::{
    projection::DEFAULT_ANNUAL_RETURN,
    scenario::{ScenarioOutcome, SweepAxis},
    ContributionType, ProjectionInput, ScenarioRunner,
};
use log::info;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Sweep {
    Contribution,
    Return,
}

#[derive(Debug, Parser)]
#[command(name = "compare_rates", about = "Sweep a projection over several inputs")]
struct Args {
    #[arg(long, value_enum, default_value = "contribution")]
    sweep: Sweep,

    /// Values to try, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    values: Vec<f64>,

    /// Treat contribution values as dollars per paycheck instead of percent
    #[arg(long)]
    fixed: bool,

    /// Contribution value held fixed during a return sweep
    #[arg(long, default_value_t = 6.0)]
    value: f64,

    #[arg(long, default_value_t = 75_000.0)]
    salary: f64,

    #[arg(long, default_value_t = 30)]
    current_age: u32,

    #[arg(long, default_value_t = 65)]
    retirement_age: u32,

    #[arg(long, default_value_t = 0.0)]
    balance: f64,

    /// Return held fixed during a contribution sweep
    #[arg(long, default_value_t = DEFAULT_ANNUAL_RETURN)]
    annual_return: f64,

    /// Output CSV path
    #[arg(long, default_value = "rate_comparison.csv")]
    output: PathBuf,

    /// Print JSON to stdout instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct ComparisonRow {
    axis: SweepAxis,
    value: f64,
    monthly_contribution: f64,
    total_contributions: f64,
    investment_gains: f64,
    total_at_retirement: f64,
}

impl From<&ScenarioOutcome> for ComparisonRow {
    fn from(outcome: &ScenarioOutcome) -> Self {
        Self {
            axis: outcome.axis,
            value: outcome.value,
            monthly_contribution: outcome.result.monthly_contribution,
            total_contributions: outcome.result.total_contributions,
            investment_gains: outcome.result.investment_gains,
            total_at_retirement: outcome.result.total_at_retirement,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let contribution_type = if args.fixed {
        ContributionType::FixedPerPaycheck
    } else {
        ContributionType::Percentage
    };
    let base = ProjectionInput::new(
        args.current_age,
        args.retirement_age,
        args.salary,
        contribution_type,
        args.value,
    )
    .with_current_balance(args.balance)
    .with_annual_return(args.annual_return);

    let start = Instant::now();
    let runner = ScenarioRunner::new();
    let outcomes = match args.sweep {
        Sweep::Contribution => runner.sweep_contribution_values(&base, &args.values)?,
        Sweep::Return => runner.sweep_return_rates(&base, &args.values)?,
    };
    info!("Ran {} projections in {:?}", outcomes.len(), start.elapsed());

    let rows: Vec<ComparisonRow> = outcomes.iter().map(ComparisonRow::from).collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!(
            "{:>10} {:>12} {:>14} {:>14} {:>16}",
            "Value", "Monthly", "Contributed", "Gains", "At retirement"
        );
        println!("{}", "-".repeat(70));
        for row in &rows {
            println!(
                "{:>10.2} {:>12.2} {:>14.0} {:>14.0} {:>16.0}",
                row.value,
                row.monthly_contribution,
                row.total_contributions,
                row.investment_gains,
                row.total_at_retirement
            );
        }
    }

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("\nComparison written to: {}", args.output.display());

    Ok(())
}
