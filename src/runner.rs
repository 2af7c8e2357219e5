//! One validation pass driven by a [`Config`]: load, compile, validate, render.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::report;
use crate::source;
use crate::validation::{ValidationEngine, ValidationOutcome};

/// Result of a single pass
#[derive(Debug)]
pub struct RunReport {
    pub outcome: ValidationOutcome,
    pub rendered: String,
}

/// Run a full pass with a fresh engine and index
pub fn run_from_config(config: &Config) -> Result<RunReport> {
    let (schema_path, data_path) = config.require_paths()?;

    let schema = source::load_schema(schema_path)?;
    let engine = ValidationEngine::new(&schema)
        .with_context(|| format!("Invalid schema: {}", schema_path.display()))?;
    let dataset = source::load_dataset(data_path)?;

    log::info!(
        "Validating {} against {}",
        data_path.display(),
        schema_path.display()
    );

    let outcome = engine.run(&dataset);
    let rendered = report::render(&outcome, config.format)?;
    Ok(RunReport { outcome, rendered })
}

/// Dependency levels of the configured schema, one per line
pub fn describe_order(config: &Config) -> Result<String> {
    let schema_path = config.require_schema()?;
    let schema = source::load_schema(schema_path)?;
    let engine = ValidationEngine::new(&schema)
        .with_context(|| format!("Invalid schema: {}", schema_path.display()))?;
    Ok(report::render_levels(engine.levels()))
}
