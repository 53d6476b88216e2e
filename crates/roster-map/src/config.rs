//! Persistence of approved mappings so a recurring export can be re-imported
//! without re-mapping.
//!
//! Stored as pretty JSON:
//!
//! ```json
//! { "table": "workers", "mappings": [...], "saved_at": "...", "version": "1.0" }
//! ```

use std::fs;
use std::path::Path;

use roster_model::ColumnMapping;
use serde::{Deserialize, Serialize};

use crate::error::{MappingError, Result};
use crate::state::MappingSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConfig {
    pub table: String,
    pub mappings: Vec<ColumnMapping>,
    /// RFC 3339 timestamp of the last save.
    #[serde(default)]
    pub saved_at: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl MappingConfig {
    pub fn new(table: impl Into<String>, mappings: Vec<ColumnMapping>) -> Self {
        Self {
            table: table.into(),
            mappings,
            saved_at: None,
            version: default_version(),
        }
    }

    /// Write the config to `path`, stamping `saved_at`.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.saved_at = Some(chrono::Utc::now().to_rfc3339());
        let json = serde_json::to_string_pretty(self).map_err(|source| MappingError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| MappingError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| MappingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), table = %self.table, "saved mapping config");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| MappingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| MappingError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn into_set(self) -> MappingSet {
        MappingSet::new(self.table, self.mappings)
    }
}

impl From<MappingSet> for MappingConfig {
    fn from(set: MappingSet) -> Self {
        let table = set.table().to_string();
        Self::new(table, set.into_mappings())
    }
}
