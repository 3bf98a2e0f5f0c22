//! Replay a bar file through the profile studies and print the key levels.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use profile_core::{AnchorPeriod, Bar, Config, FixedOffsetCalendar};
use profile_engine::ProfileParams;
use profile_ingestion::BarSeries;
use profile_studies::{CompositeProfile, FixedRangeProfile, ProfileSummary, VwapIndicator};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// JSON array of bars; `null` entries are gaps
    #[arg(short, long)]
    bars: PathBuf,

    /// Path to a JSON config file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile a fixed bar range
    Fixed {
        /// First bar index
        #[arg(long)]
        from: usize,

        /// Last bar index (inclusive)
        #[arg(long)]
        to: usize,
    },

    /// One profile per anchor period
    Composite {
        /// Period that starts a new profile
        #[arg(long, value_enum, default_value_t = Period::Session)]
        period: Period,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Period {
    None,
    Session,
    Day,
    Week,
    Month,
}

impl From<Period> for AnchorPeriod {
    fn from(period: Period) -> Self {
        match period {
            Period::None => AnchorPeriod::None,
            Period::Session => AnchorPeriod::Session,
            Period::Day => AnchorPeriod::Day,
            Period::Week => AnchorPeriod::Week,
            Period::Month => AnchorPeriod::Month,
        }
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    let json = fs::read_to_string(&cli.bars)
        .with_context(|| format!("reading bars {}", cli.bars.display()))?;
    let bars: Vec<Option<Bar>> = serde_json::from_str(&json).context("parsing bars")?;
    for (index, bar) in bars.iter().enumerate() {
        if let Some(bar) = bar {
            bar.validate().with_context(|| format!("bar {index}"))?;
        }
    }
    info!(bars = bars.len(), symbol = %config.instrument.symbol, "bars loaded");

    let series = BarSeries::from_bars(config.instrument.symbol_info(), bars);
    let calendar = FixedOffsetCalendar::from_config(&config.session)?;
    let params = ProfileParams::from_config(&config);

    let summaries = match cli.command {
        Commands::Fixed { from, to } => {
            let mut study = FixedRangeProfile::new(from, to, params);
            study.update(&series, &calendar);
            vec![ProfileSummary::new(study.profile(), study.vwap())]
        }
        Commands::Composite { period } => {
            let mut study = CompositeProfile::new(period.into(), params);
            study
                .update(&series, &calendar)
                .iter()
                .map(|p| ProfileSummary::new(p.profile(), p.vwap()).with_anchor_key(p.anchor_key()))
                .collect()
        }
    };

    let mut indicator = VwapIndicator::from_config(&config.vwap);
    indicator.update(&series, &calendar);
    if let Some(point) = indicator.last().filter(|_| config.vwap.enabled) {
        info!(vwap = point.vwap, deviation = point.deviation, "chart VWAP at last bar");
    }

    println!("{}", serde_json::to_string_pretty(&summaries)?);
    info!(profiles = summaries.len(), "replay finished");
    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init()
}
