//! Placement CLI - predicts and explains placement for candidate records.
//!
//! Usage:
//!   placement --model model.json --input candidates.json
//!   placement --model model.json --format json --top-k 5 < candidate.json
//!   placement --model model.json --input candidates.json --no-explain --threads 4

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use placement::explain::{Explainer, DEFAULT_TOP_K};
use placement::logging::init_tracing_subscriber;
use placement::report::{build_reports, parse_records, render, OutputFormat};
use placement::{InferencePipeline, PipelineConfig};

#[derive(Parser)]
#[command(name = "placement")]
#[command(about = "Predict candidate placement and explain it with global feature importances")]
struct Cli {
    /// Path to the model artifact (JSON)
    #[arg(short, long, env = "PLACEMENT_MODEL")]
    model: PathBuf,

    /// Candidate records: a JSON object or array of objects; `-` reads stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Skip the feature-importance explanation
    #[arg(long)]
    no_explain: bool,

    /// Number of ranked features to show
    #[arg(short = 'k', long, env = "PLACEMENT_TOP_K", default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Override the model's decision threshold (0.0-1.0)
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Threads for batch prediction (0 = auto)
    #[arg(long, default_value_t = 0)]
    threads: usize,
}

fn main() -> Result<()> {
    init_tracing_subscriber("placement");
    let cli = Cli::parse();

    let config = PipelineConfig::builder()
        .model_path(cli.model)
        .top_k(cli.top_k)
        .maybe_threshold(cli.threshold)
        .n_threads(cli.threads)
        .build()
        .context("invalid configuration")?;

    let pipeline = match InferencePipeline::from_config(&config) {
        Ok(pipeline) => pipeline,
        Err(error) => {
            tracing::error!(path = %config.model_path.display(), %error, "failed to load model");
            return Err(error).with_context(|| format!("loading model {}", config.model_path.display()));
        }
    };

    let input = read_input(&cli.input)?;
    let records = parse_records(&input).context("reading candidate records")?;
    if records.is_empty() {
        tracing::info!("no candidate records in input");
        return Ok(());
    }

    let explainer = Explainer::with_top_k(config.top_k);
    let explainer = (!cli.no_explain).then_some(&explainer);
    let reports = build_reports(&pipeline, explainer, &records, config.n_threads);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&reports, cli.format, &mut out)?;
    out.flush()?;

    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(input).with_context(|| format!("reading {input}"))
    }
}
