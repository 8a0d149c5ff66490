use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Run settings: defaults, then `smyrna.toml` if present, then `SMYRNA_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub template: PathBuf,
    pub output_dir: PathBuf,
    pub promote_late_description: bool,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Config::builder()
            .set_default("template", "fodder/epidoc-template.xml")?
            .set_default("output_dir", "output")?
            .set_default("promote_late_description", false)?
            .add_source(File::with_name("smyrna").required(false))
            .add_source(Environment::with_prefix("SMYRNA").try_parsing(true))
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")
    }
}
