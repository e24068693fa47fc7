//! Command-line embedding of the waveform statistics engine: resolves the
//! selection once per signal, analyses a capture file, and renders the
//! results. Acquisition from live hardware is out of scope; captures come
//! from files.

mod config;
mod error;
mod input;
mod report;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use config::MonitorConfig;
use error::MonitorResult;
use input::CaptureSet;
use rayon::prelude::*;
use report::{render_json, render_text, SignalReport};
use std::path::PathBuf;
use tracing::{info, warn};
use waveform_stats::{lister, resolve_slots, WaveformAnalyzer, CATALOG};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// List every statistic the engine can compute
    Statistics,

    /// Analyse one capture file against a monitor configuration
    Analyse(AnalyseArgs),
}

#[derive(Debug, Parser)]
struct AnalyseArgs {
    /// Monitor configuration file
    #[clap(long)]
    config: PathBuf,

    /// Capture file holding per-signal waveform and reference arrays
    #[clap(long)]
    captures: PathBuf,

    /// Output format
    #[clap(long, value_enum, default_value = "text")]
    format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.mode {
        Mode::Statistics => {
            lister::list_statistics(&CATALOG, &mut std::io::stdout())?;
            Ok(())
        }
        Mode::Analyse(args) => analyse(&args),
    }
}

fn analyse(args: &AnalyseArgs) -> Result<()> {
    let config = MonitorConfig::load(&args.config)?;
    let captures = CaptureSet::load(&args.captures)?;
    let decimation = config.decimation.unwrap_or(1);

    let analyzer = WaveformAnalyzer::new(
        config.shape_parameters(),
        config.regions(),
        config.effective_sample_interval(),
    );

    // pair every configured signal with its capture before any work starts
    let jobs = config
        .signals
        .iter()
        .map(|entry| {
            let capture = captures.find(&entry.name)?;
            capture.validate()?;
            Ok((entry, capture))
        })
        .collect::<MonitorResult<Vec<_>>>()?;

    info!(
        "analysing {} signals of {} statistics each",
        jobs.len(),
        CATALOG.len()
    );

    let reports: Vec<SignalReport> = jobs
        .par_iter()
        .map(|(entry, capture)| {
            let mut slots = resolve_slots(&CATALOG, &entry.to_signal_config(), &config.time_units);
            let (samples, reference) = capture.decimated(decimation);
            let problems = analyzer.analyse(&samples, &reference, &mut slots);
            if problems > 0 {
                warn!("signal {}: {problems} statistics not computable", entry.name);
            }
            SignalReport {
                name: entry.name.clone(),
                problems,
                slots,
            }
        })
        .collect();

    match args.format {
        Format::Text => print!("{}", render_text(&reports)),
        Format::Json => println!("{:#}", render_json(&reports)),
    }
    Ok(())
}
