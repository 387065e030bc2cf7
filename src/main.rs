//! Command-line front-end of the K⁰_S selection

use clap::Parser;
use eyre::WrapErr;
use log::info;

use kshort_selection::{
    analysis,
    config::Configuration,
    output,
    reader::{EventSource, JsonEventFile},
};

use std::{path::PathBuf, time::Instant};

/// Classify and select K⁰_S events from a JSON-lines ntuple dump
#[derive(Parser)]
#[command(name = "kshort_selection", version, long_about = None)]
struct Cli {
    /// Configuration file (built-in defaults if absent)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON-lines event file
    #[arg(long, default_value = "events.jsonl")]
    input: PathBuf,
}

/// We'll use eyre's type-erased result type throughout the application
type Result<T> = eyre::Result<T>;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    // ### CONFIGURATION READOUT ###

    let cfg = match &cli.config {
        Some(path) => Configuration::load(path).wrap_err("Failed to load the configuration")?,
        None => {
            info!("No configuration file given, using defaults");
            let cfg = Configuration::default();
            cfg.print();
            cfg
        }
    };
    let analysis = cfg.analysis()?;

    // ### EVENT LOOP ###

    let events = JsonEventFile::open(&cli.input)?;

    // Start the clock after input I/O, to avoid IO-induced timing fluctuations
    let saved_time = Instant::now();
    let results = analysis::run(&events, &analysis).wrap_err("Failed to analyse the events")?;
    let elapsed_time = saved_time.elapsed();
    info!(
        "Analysed {} events in {:.3} s",
        events.num_events(),
        elapsed_time.as_secs_f64()
    );

    // ### RESULTS DISPLAY AND STORAGE ###

    let cutflow = results.cutflow.finalize();
    let diagnostics = results.diagnostics.finalize();
    output::dump_results(&cfg, &cutflow, &diagnostics, elapsed_time)
        .wrap_err("Failed to output the results")?;
    Ok(())
}
