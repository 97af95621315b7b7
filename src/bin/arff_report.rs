use std::path::PathBuf;

use anyhow::{Context as _, Result};
use arff_splitter::config::Config;
use arff_splitter::report::{handle, Outcome, Upload};
use clap::Parser;

/// Process one ARFF file and write the HTML report (or a JSON summary).
#[derive(Debug, Parser)]
#[command(name = "arff_report")]
struct Args {
    /// Dataset to process; must end in .arff.
    input: PathBuf,

    /// Output file (default: stdout).
    #[arg(long, short)]
    out: Option<PathBuf>,

    /// JSON config file; ARFF_SEED / ARFF_PREVIEW_ROWS override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the split seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Emit a JSON summary instead of HTML.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let upload = Upload::from_path(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let outcome = handle(&upload, &config);

    let rendered = match (&outcome, args.json) {
        (Outcome::Report(report), true) => {
            serde_json::to_string_pretty(&**report).context("serializing report")?
        }
        (Outcome::Error(message), true) => serde_json::json!({ "error": message }).to_string(),
        (_, false) => outcome.to_html(),
    };

    match &args.out {
        Some(path) => std::fs::write(path, &rendered)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{rendered}"),
    }

    if let Outcome::Error(message) = outcome {
        eprintln!("{message}");
        std::process::exit(1);
    }
    Ok(())
}
