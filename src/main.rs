//! Contribution Planner CLI
//!
//! Runs a single retirement projection and prints the summary and the
//! year-by-year balance table.

use clap::{Parser, ValueEnum};
use contribution_planner::{
    contribution::ContributionImpact,
    projection::{ProjectionConfig, SeriesCompounding, DEFAULT_ANNUAL_RETURN},
    ContributionType, ProjectionCalculator, ProjectionInput,
};
use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ElectionKind {
    /// Percent of annual salary
    Percentage,
    /// Fixed amount per biweekly paycheck
    Fixed,
}

impl From<ElectionKind> for ContributionType {
    fn from(kind: ElectionKind) -> Self {
        match kind {
            ElectionKind::Percentage => ContributionType::Percentage,
            ElectionKind::Fixed => ContributionType::FixedPerPaycheck,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Compounding {
    Annual,
    Monthly,
}

#[derive(Debug, Parser)]
#[command(name = "contribution_planner", version, about = "Project a 401(k) balance to retirement")]
struct Args {
    /// Basis of the contribution election
    #[arg(long = "type", value_enum, default_value = "percentage")]
    kind: ElectionKind,

    /// Percent of salary or dollars per paycheck
    #[arg(long, default_value_t = 6.0)]
    value: f64,

    #[arg(long, default_value_t = 75_000.0)]
    salary: f64,

    #[arg(long, default_value_t = 30)]
    current_age: u32,

    #[arg(long, default_value_t = 65)]
    retirement_age: u32,

    /// Balance already saved
    #[arg(long, default_value_t = 0.0)]
    balance: f64,

    /// Assumed annual return as a decimal
    #[arg(long, default_value_t = DEFAULT_ANNUAL_RETURN)]
    annual_return: f64,

    /// Compounding used for the yearly table
    #[arg(long, value_enum, default_value = "annual")]
    compounding: Compounding,

    /// Write the yearly table to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Contribution Planner v{}", env!("CARGO_PKG_VERSION"));
    println!("==========================\n");

    let input = ProjectionInput::new(
        args.current_age,
        args.retirement_age,
        args.salary,
        args.kind.into(),
        args.value,
    )
    .with_current_balance(args.balance)
    .with_annual_return(args.annual_return);

    let config = ProjectionConfig {
        include_series: true,
        series_compounding: match args.compounding {
            Compounding::Annual => SeriesCompounding::Annual,
            Compounding::Monthly => SeriesCompounding::Monthly,
        },
    };

    let result = ProjectionCalculator::new(config).project(&input)?;
    let impact: ContributionImpact = input.contribution_impact()?;

    println!("Election: {} {}", ContributionType::from(args.kind).as_str(), args.value);
    println!("  Per paycheck: ${:.2}", impact.per_paycheck);
    println!("  Monthly:      ${:.2}", impact.monthly);
    println!("  Annual:       ${:.2}", impact.annual);
    if impact.exceeds_irs_limit {
        println!("  Warning: annual contribution exceeds the IRS limit of ${:.0}", impact.irs_limit);
    }
    println!();

    println!(
        "Projection ({} years at {:.2}%):",
        result.years_to_retirement,
        result.assumed_annual_return * 100.0
    );
    println!("{:>5} {:>5} {:>16} {:>16}", "Year", "Age", "Balance", "Contributions");
    println!("{}", "-".repeat(45));

    let series = result.series.as_deref().unwrap_or_default();
    for point in series {
        println!(
            "{:>5} {:>5} {:>16.2} {:>16.2}",
            point.year, point.age, point.cumulative_balance, point.cumulative_contributions
        );
    }

    if let Some(path) = &args.csv {
        let mut writer = csv::Writer::from_writer(File::create(path)?);
        for point in series {
            writer.serialize(point)?;
        }
        writer.flush()?;
        println!("\nYearly table written to: {}", path.display());
    }

    let summary = result.summary();
    println!("\nSummary:");
    println!("  Total at retirement: ${:.0}", summary.total_at_retirement);
    println!("  Total contributions: ${:.0}", summary.total_contributions);
    println!("  Investment gains:    ${:.0}", summary.investment_gains);
    println!("  Growth share:        {:.1}%", summary.gains_share * 100.0);
    if let Some(final_balance) = summary.series_final_balance {
        println!(
            "  Table final balance: ${:.0} ({} compounding)",
            final_balance,
            config.series_compounding.as_str()
        );
    }

    Ok(())
}
