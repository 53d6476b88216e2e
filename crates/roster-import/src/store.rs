//! Repository contract for canonical records and an in-memory store.
//!
//! The orchestrator talks to every table through [`EntityRepository`], so
//! the real backing service, the JSON snapshot store used by the CLI and
//! test doubles are interchangeable.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use roster_model::{EntityCandidate, RecordId, TargetTableSpec};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::values::{FieldValues, NaturalKey};

/// CRUD access to one table of the canonical store.
pub trait EntityRepository {
    /// Table this repository writes to.
    fn table(&self) -> &str;

    fn find_by_natural_key(&self, key: &NaturalKey) -> Result<Option<RecordId>, StoreError>;

    fn create(&self, values: &FieldValues) -> Result<RecordId, StoreError>;

    /// Overwrite the given fields of an existing record.
    fn update(&self, id: &RecordId, values: &FieldValues) -> Result<(), StoreError>;

    /// Remove a record; used to undo a partially imported record.
    fn delete(&self, id: &RecordId) -> Result<(), StoreError>;

    /// Existing records as resolution candidates (id plus display name).
    fn candidates(&self) -> Result<Vec<EntityCandidate>, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    pub values: FieldValues,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct TableData {
    next_id: u64,
    records: Vec<StoredRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StoreData {
    tables: BTreeMap<String, TableData>,
}

/// Process-local store shared by every [`MemoryRepository`] created from it.
///
/// Snapshots can be loaded from and saved to a JSON file.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    data: Arc<Mutex<StoreData>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no store snapshot, starting empty");
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    operation: "read",
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let data: StoreData = serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            data: Arc::new(Mutex::new(data)),
        })
    }

    /// Save a snapshot, writing to a temporary file first and renaming it
    /// over `path`.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = {
            let data = self.lock()?;
            serde_json::to_string_pretty(&*data).map_err(|source| StoreError::Json {
                path: path.to_path_buf(),
                source,
            })?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                operation: "create directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let temp_path = path.with_extension("json.tmp");
        let io_err = |operation: &'static str| {
            let temp_path = temp_path.clone();
            move |source| StoreError::Io {
                operation,
                path: temp_path,
                source,
            }
        };
        let mut file = File::create(&temp_path).map_err(io_err("create"))?;
        file.write_all(json.as_bytes()).map_err(io_err("write"))?;
        file.sync_all().map_err(io_err("sync"))?;
        fs::rename(&temp_path, path).map_err(|source| StoreError::Io {
            operation: "replace",
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(path = %path.display(), "saved store snapshot");
        Ok(())
    }

    /// Repository over the table described by `spec`.
    ///
    /// Candidates are named by the table's primary name field.
    pub fn repository(&self, spec: &TargetTableSpec) -> MemoryRepository {
        MemoryRepository {
            store: self.clone(),
            table: spec.name.clone(),
            name_field: spec.primary_name_field.clone(),
        }
    }

    /// Every record of `table`, in creation order.
    pub fn records(&self, table: &str) -> Result<Vec<StoredRecord>, StoreError> {
        let data = self.lock()?;
        Ok(data
            .tables
            .get(table)
            .map(|t| t.records.clone())
            .unwrap_or_default())
    }

    pub fn count(&self, table: &str) -> Result<usize, StoreError> {
        let data = self.lock()?;
        Ok(data.tables.get(table).map_or(0, |t| t.records.len()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreData>, StoreError> {
        self.data.lock().map_err(|_| StoreError::Unavailable {
            reason: "store lock poisoned".to_string(),
        })
    }
}

/// [`EntityRepository`] over one table of an [`InMemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryRepository {
    store: InMemoryStore,
    table: String,
    name_field: Option<String>,
}

impl MemoryRepository {
    fn not_found(&self, id: &RecordId) -> StoreError {
        StoreError::NotFound {
            table: self.table.clone(),
            id: id.to_string(),
        }
    }
}

impl EntityRepository for MemoryRepository {
    fn table(&self) -> &str {
        &self.table
    }

    fn find_by_natural_key(&self, key: &NaturalKey) -> Result<Option<RecordId>, StoreError> {
        let data = self.store.lock()?;
        Ok(data.tables.get(&self.table).and_then(|t| {
            t.records
                .iter()
                .find(|record| key.matches(&record.values))
                .map(|record| record.id.clone())
        }))
    }

    fn create(&self, values: &FieldValues) -> Result<RecordId, StoreError> {
        let mut data = self.store.lock()?;
        let table = data.tables.entry(self.table.clone()).or_default();
        table.next_id += 1;
        let id = RecordId::new(format!("{}:{}", self.table, table.next_id));
        table.records.push(StoredRecord {
            id: id.clone(),
            values: values.clone(),
        });
        Ok(id)
    }

    fn update(&self, id: &RecordId, values: &FieldValues) -> Result<(), StoreError> {
        let mut data = self.store.lock()?;
        let record = data
            .tables
            .get_mut(&self.table)
            .and_then(|t| t.records.iter_mut().find(|r| &r.id == id));
        match record {
            Some(record) => {
                record.values.merge(values);
                Ok(())
            }
            None => Err(self.not_found(id)),
        }
    }

    fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        let mut data = self.store.lock()?;
        let table = data.tables.get_mut(&self.table);
        let position = table
            .as_ref()
            .and_then(|t| t.records.iter().position(|r| &r.id == id));
        match (table, position) {
            (Some(table), Some(position)) => {
                table.records.remove(position);
                Ok(())
            }
            _ => Err(self.not_found(id)),
        }
    }

    fn candidates(&self) -> Result<Vec<EntityCandidate>, StoreError> {
        let Some(name_field) = self.name_field.as_deref() else {
            return Ok(Vec::new());
        };
        let data = self.store.lock()?;
        Ok(data
            .tables
            .get(&self.table)
            .map(|t| {
                t.records
                    .iter()
                    .filter_map(|record| {
                        record.values.text(name_field).map(|name| EntityCandidate {
                            id: record.id.clone(),
                            name,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use roster_model::{FieldType, TargetFieldSpec};

    use super::*;
    use crate::values::FieldValue;

    fn employers() -> TargetTableSpec {
        TargetTableSpec {
            name: "employers".to_string(),
            label: String::new(),
            primary_name_field: Some("name".to_string()),
            email_field: None,
            identifier_field: None,
            natural_key: vec!["name".to_string()],
            fields: vec![TargetFieldSpec {
                name: "name".to_string(),
                field_type: FieldType::Text,
                required: true,
                description: String::new(),
                enum_options: None,
            }],
        }
    }

    fn named(name: &str) -> FieldValues {
        [("name".to_string(), FieldValue::Text(name.to_string()))]
            .into_iter()
            .collect()
    }

    #[test]
    fn create_find_update_delete() {
        let store = InMemoryStore::new();
        let repo = store.repository(&employers());

        let id = repo.create(&named("Acme Pty Ltd")).unwrap();
        assert_eq!(id.as_str(), "employers:1");

        let key = NaturalKey::Fields(vec![("name".into(), "ACME PTY LTD".into())]);
        assert_eq!(repo.find_by_natural_key(&key).unwrap(), Some(id.clone()));

        repo.update(&id, &named("Acme Pty Limited")).unwrap();
        assert_eq!(repo.candidates().unwrap()[0].name, "Acme Pty Limited");

        repo.delete(&id).unwrap();
        assert_eq!(store.count("employers").unwrap(), 0);
        assert!(matches!(repo.delete(&id), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let store = InMemoryStore::new();
        let repo = store.repository(&employers());
        let first = repo.create(&named("A")).unwrap();
        repo.delete(&first).unwrap();
        let second = repo.create(&named("B")).unwrap();
        assert_ne!(first, second);
    }
}
