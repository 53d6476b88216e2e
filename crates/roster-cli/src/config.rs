//! Pipeline settings file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use roster_model::PipelineSettings;

/// Load settings from a TOML file, or the defaults when no path is given.
///
/// Keys missing from the file keep their default values.
///
/// ```toml
/// auto_promote_threshold = 80
/// chunk_size = 500
/// ```
pub fn load_settings(path: Option<&Path>) -> Result<PipelineSettings> {
    let Some(path) = path else {
        return Ok(PipelineSettings::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read settings file {}", path.display()))?;
    let settings: PipelineSettings = toml::from_str(&contents)
        .with_context(|| format!("parse settings file {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?settings, "loaded pipeline settings");
    Ok(settings)
}
