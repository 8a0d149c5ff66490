mod emit;
mod error;
mod parser;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use emit::{Emitter, Template};
use parser::classify::Classifier;
use parser::language::WhatlangDetector;
use parser::nodes::Document;
use settings::Settings;

#[derive(Parser)]
#[command(
    name = "smyrna_extract",
    about = "Extract Smyrna graffiti from the catalogue HTML into EpiDoc XML"
)]
struct Cli {
    /// html file to read
    source: PathBuf,

    /// desired logging level (case-insensitive string: DEBUG, INFO, WARNING, or ERROR)
    #[arg(short = 'l', long = "loglevel", default_value = "NOTSET")]
    loglevel: String,

    /// verbose output (logging level == INFO)
    #[arg(short = 'v', long)]
    verbose: bool,

    /// very verbose output (logging level == DEBUG)
    #[arg(short = 'w', long = "veryverbose")]
    very_verbose: bool,
}

impl Cli {
    /// Explicit flags first, then RUST_LOG, then warnings only.
    fn filter(&self) -> anyhow::Result<EnvFilter> {
        if self.very_verbose {
            return Ok(EnvFilter::new("debug"));
        }
        if self.verbose {
            return Ok(EnvFilter::new("info"));
        }
        let level = match self.loglevel.to_ascii_uppercase().as_str() {
            "NOTSET" => {
                return Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
            }
            "DEBUG" => "debug",
            "INFO" => "info",
            "WARNING" | "WARN" => "warn",
            "ERROR" | "CRITICAL" => "error",
            other => bail!("unknown log level {:?}", other),
        };
        Ok(EnvFilter::new(level))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(cli.filter()?)
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let settings = Settings::load()?;
    info!(?settings, "settings loaded");

    let html = std::fs::read_to_string(&cli.source)
        .with_context(|| format!("Failed to read {:?}", cli.source))?;
    let template = Template::load(&settings.template)?;

    let doc = Document::parse(&html);
    let classifier = Classifier::new(Box::new(WhatlangDetector))
        .promote_late_description(settings.promote_late_description);
    let entries = parser::process_document(&doc, &classifier)?;

    let emitter = Emitter::new(template, &settings.output_dir);
    emitter.prepare()?;
    for entry in &entries {
        emitter.emit(entry)?;
    }

    info!(
        graffiti = entries.len(),
        output = ?settings.output_dir,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "done"
    );
    Ok(())
}
