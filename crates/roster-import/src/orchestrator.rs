//! Sequential batch import with per-record failure isolation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use roster_map::EntityResolver;
use roster_model::{RecordId, TargetTableSpec, ValidationResult, is_blank};
use roster_standards::SchemaRegistry;
use serde::Serialize;

use crate::error::{ImportError, RecordError};
use crate::records::ImportRecord;
use crate::store::EntityRepository;
use crate::values::{FieldValue, FieldValues, NaturalKey};

const WORKERS_TABLE: &str = "workers";
const EMPLOYERS_TABLE: &str = "employers";

/// Worker field holding the free-text employer label.
const EMPLOYER_NAME_FIELD: &str = "employer_name";
const JOB_TITLE_FIELD: &str = "job_title";
const START_DATE_FIELD: &str = "start_date";

const PLACEMENT_WORKER: &str = "worker_id";
const PLACEMENT_EMPLOYER: &str = "employer_id";
const PLACEMENT_START: &str = "start_date";
const PLACEMENT_POSITION: &str = "position";
const PLACEMENT_STATUS: &str = "status";
const PLACEMENT_ACTIVE: &str = "Active";

/// Refuse to import when validation found blocking errors.
pub fn ensure_importable(validation: &ValidationResult) -> Result<(), ImportError> {
    if validation.is_valid() {
        Ok(())
    } else {
        Err(ImportError::ValidationFailed {
            errors: validation.error_count(),
            rows: validation.invalid_rows().len(),
        })
    }
}

/// Which canonical table the rows describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    /// Workers, with their employer resolved and a placement linking both.
    Workers,
    /// Employers only.
    Employers,
}

impl ImportKind {
    pub fn table(&self) -> &'static str {
        match self {
            ImportKind::Workers => WORKERS_TABLE,
            ImportKind::Employers => EMPLOYERS_TABLE,
        }
    }
}

/// Shared flag to stop a run between records.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub kind: ImportKind,
    /// Employer for worker rows that carry no employer name.
    pub default_employer: Option<String>,
    /// Placement start date when the row has none.
    pub default_start_date: NaiveDate,
    /// Delete entities created earlier in a record when a later step fails.
    pub compensate: bool,
    pub cancel: Option<CancellationToken>,
}

impl ImportOptions {
    /// Options with today's date as the default placement start.
    pub fn new(kind: ImportKind) -> Self {
        Self {
            kind,
            default_employer: None,
            default_start_date: chrono::Local::now().date_naive(),
            compensate: true,
            cancel: None,
        }
    }

    pub fn with_default_employer(mut self, employer: impl Into<String>) -> Self {
        self.default_employer = Some(employer.into());
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.default_start_date = date;
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

/// Observable run state. A run reports `Idle` first and `Completed` last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportState {
    #[default]
    Idle,
    /// About to write record `index` (1-based) of `total`.
    Processing { index: usize, total: usize },
    /// The run is over; `status` says whether every record was attempted.
    Completed { status: RunStatus },
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every record was attempted.
    Completed,
    /// Stopped by the cancellation token.
    Cancelled,
    /// The store was unreachable before any record succeeded.
    Aborted,
}

/// A record that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub label: String,
    pub message: String,
}

/// Counts and failures of one run.
///
/// `successful + failed + duplicates == attempted` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    successful: usize,
    failed: usize,
    duplicates: usize,
    created_entities: usize,
    unplaced: usize,
    attempted: usize,
    total: usize,
    errors: Vec<RowError>,
    status: RunStatus,
}

impl ImportResult {
    fn new(total: usize) -> Self {
        Self {
            successful: 0,
            failed: 0,
            duplicates: 0,
            created_entities: 0,
            unplaced: 0,
            attempted: 0,
            total,
            errors: Vec::new(),
            status: RunStatus::Completed,
        }
    }

    /// Records newly created.
    pub fn successful(&self) -> usize {
        self.successful
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Records matched to an existing entity and updated.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Parent entities created because a label did not resolve.
    pub fn created_entities(&self) -> usize {
        self.created_entities
    }

    /// Workers imported without a placement because no employer was given.
    pub fn unplaced(&self) -> usize {
        self.unplaced
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// Records handed to the run.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn errors(&self) -> &[RowError] {
        &self.errors
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Imported {}, {} duplicates, {} failed",
            self.successful, self.duplicates, self.failed
        )
    }
}

enum Outcome {
    Created,
    Updated,
}

/// Entities created so far for the current record, undone on failure.
struct Created<'r> {
    entries: Vec<(&'r dyn EntityRepository, RecordId)>,
    parents: usize,
    /// No employer label, so no placement was written.
    unplaced: bool,
}

impl Created<'_> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            parents: 0,
            unplaced: false,
        }
    }
}

/// Writes import records one at a time.
///
/// The orchestrator assumes it is the only writer while a run is in
/// progress: natural-key lookups are not locked, so two concurrent runs
/// against the same store can both create the same entity.
pub struct ImportOrchestrator<'r> {
    workers: &'r dyn EntityRepository,
    employers: &'r dyn EntityRepository,
    placements: &'r dyn EntityRepository,
    worker_spec: TargetTableSpec,
    employer_spec: TargetTableSpec,
    resolver: EntityResolver,
}

impl<'r> ImportOrchestrator<'r> {
    pub fn new(
        registry: &SchemaRegistry,
        workers: &'r dyn EntityRepository,
        employers: &'r dyn EntityRepository,
        placements: &'r dyn EntityRepository,
    ) -> Result<Self, ImportError> {
        Ok(Self {
            workers,
            employers,
            placements,
            worker_spec: registry.table(WORKERS_TABLE)?.clone(),
            employer_spec: registry.table(EMPLOYERS_TABLE)?.clone(),
            resolver: EntityResolver::new(),
        })
    }

    pub fn with_resolver(mut self, resolver: EntityResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn run(&self, records: &[ImportRecord], options: &ImportOptions) -> ImportResult {
        self.run_with_progress(records, options, |_| {})
    }

    /// Import `records` in order, reporting state changes to `on_state`.
    ///
    /// A failing record is recorded and the run moves on. The run stops
    /// early only when cancelled or when the store is unavailable before
    /// any record has succeeded.
    pub fn run_with_progress(
        &self,
        records: &[ImportRecord],
        options: &ImportOptions,
        mut on_state: impl FnMut(&ImportState),
    ) -> ImportResult {
        let span = tracing::info_span!("import", kind = ?options.kind, records = records.len());
        let _guard = span.enter();

        let total = records.len();
        let mut result = ImportResult::new(total);
        on_state(&ImportState::Idle);

        for (index, record) in records.iter().enumerate() {
            if options.is_cancelled() {
                tracing::warn!(attempted = result.attempted, total, "import cancelled");
                result.status = RunStatus::Cancelled;
                break;
            }
            on_state(&ImportState::Processing {
                index: index + 1,
                total,
            });
            result.attempted += 1;

            let mut created = Created::new();
            let outcome = match options.kind {
                ImportKind::Workers => self.import_worker(record, options, &mut created),
                ImportKind::Employers => self.import_employer(record),
            };

            match outcome {
                Ok(outcome) => {
                    match outcome {
                        Outcome::Created => {
                            result.successful += 1;
                            tracing::debug!(row = record.row, "record created");
                        }
                        Outcome::Updated => {
                            result.duplicates += 1;
                            tracing::debug!(row = record.row, "record matched existing entity");
                        }
                    }
                    result.created_entities += created.parents;
                    if created.unplaced {
                        result.unplaced += 1;
                    }
                }
                Err(err) => {
                    tracing::warn!(row = record.row, error = %err, "record failed");
                    if options.compensate {
                        compensate(&created);
                    }
                    let abort = err.is_unavailable() && result.successful + result.duplicates == 0;
                    result.failed += 1;
                    result.errors.push(RowError {
                        row: record.row,
                        label: record.label.clone(),
                        message: err.to_string(),
                    });
                    if abort {
                        tracing::error!(row = record.row, "store unavailable, aborting import");
                        result.status = RunStatus::Aborted;
                        break;
                    }
                }
            }
        }

        on_state(&ImportState::Completed {
            status: result.status,
        });
        tracing::info!(
            successful = result.successful,
            duplicates = result.duplicates,
            failed = result.failed,
            created_entities = result.created_entities,
            unplaced = result.unplaced,
            status = ?result.status,
            "import finished"
        );
        result
    }

    fn import_worker(
        &self,
        record: &ImportRecord,
        options: &ImportOptions,
        created: &mut Created<'r>,
    ) -> Result<Outcome, RecordError> {
        let employer_label = record
            .values
            .text(EMPLOYER_NAME_FIELD)
            .or_else(|| options.default_employer.clone())
            .filter(|label| !is_blank(label));
        let employer_id = match employer_label {
            Some(label) => Some(self.resolve_employer(&label, created)?),
            None => None,
        };

        let keys = natural_keys(&self.worker_spec, &record.values)?;
        let (worker_id, outcome) = self.upsert(self.workers, &keys, &record.values, created)?;

        match employer_id {
            Some(employer_id) => {
                self.upsert_placement(&worker_id, &employer_id, record, options, created)?;
            }
            None => {
                tracing::warn!(
                    row = record.row,
                    worker = %worker_id,
                    "no employer for worker, placement skipped"
                );
                created.unplaced = true;
            }
        }
        Ok(outcome)
    }

    fn import_employer(&self, record: &ImportRecord) -> Result<Outcome, RecordError> {
        let keys = natural_keys(&self.employer_spec, &record.values)?;
        let mut unused = Created::new();
        let (_, outcome) = self.upsert(self.employers, &keys, &record.values, &mut unused)?;
        Ok(outcome)
    }

    fn resolve_employer(
        &self,
        label: &str,
        created: &mut Created<'r>,
    ) -> Result<RecordId, RecordError> {
        let candidates = self.employers.candidates()?;
        let found = self.resolver.resolve(label, &candidates);
        if let Some(candidate) = found.candidate {
            tracing::debug!(
                label,
                employer = %candidate.id,
                tier = found.tier.as_str(),
                "employer resolved"
            );
            return Ok(candidate.id);
        }

        let name_field = self
            .employer_spec
            .primary_name_field
            .as_deref()
            .ok_or_else(|| RecordError::NoNameField {
                table: self.employer_spec.name.clone(),
            })?;
        let mut values = FieldValues::new();
        values.insert(name_field, FieldValue::Text(label.trim().to_string()));
        let id = self.employers.create(&values)?;
        tracing::info!(label, employer = %id, "created employer for unresolved label");
        created.entries.push((self.employers, id.clone()));
        created.parents += 1;
        Ok(id)
    }

    /// Update the first entity matched by `keys`, tried in order, or create one.
    fn upsert(
        &self,
        repo: &'r dyn EntityRepository,
        keys: &[NaturalKey],
        values: &FieldValues,
        created: &mut Created<'r>,
    ) -> Result<(RecordId, Outcome), RecordError> {
        let mut existing = None;
        for key in keys {
            if let Some(id) = repo.find_by_natural_key(key)? {
                tracing::trace!(table = repo.table(), key = %key, id = %id, "natural key matched");
                existing = Some(id);
                break;
            }
        }
        match existing {
            Some(id) => {
                repo.update(&id, values)?;
                Ok((id, Outcome::Updated))
            }
            None => {
                let id = repo.create(values)?;
                created.entries.push((repo, id.clone()));
                Ok((id, Outcome::Created))
            }
        }
    }

    fn upsert_placement(
        &self,
        worker_id: &RecordId,
        employer_id: &RecordId,
        record: &ImportRecord,
        options: &ImportOptions,
        created: &mut Created<'r>,
    ) -> Result<(), RecordError> {
        let key = NaturalKey::Fields(vec![
            (PLACEMENT_WORKER.to_string(), worker_id.to_string()),
            (PLACEMENT_EMPLOYER.to_string(), employer_id.to_string()),
        ]);

        let mut values = FieldValues::new();
        values.insert(PLACEMENT_WORKER, FieldValue::Text(worker_id.to_string()));
        values.insert(PLACEMENT_EMPLOYER, FieldValue::Text(employer_id.to_string()));
        if let Some(start) = record.values.get(START_DATE_FIELD) {
            values.insert(PLACEMENT_START, start.clone());
        }
        if let Some(position) = record.values.get(JOB_TITLE_FIELD) {
            values.insert(PLACEMENT_POSITION, position.clone());
        }

        match self.placements.find_by_natural_key(&key)? {
            Some(id) => self.placements.update(&id, &values)?,
            None => {
                values.insert_if_absent(PLACEMENT_START, FieldValue::Date(options.default_start_date));
                values.insert(PLACEMENT_STATUS, FieldValue::Text(PLACEMENT_ACTIVE.to_string()));
                let id = self.placements.create(&values)?;
                created.entries.push((self.placements, id));
            }
        }
        Ok(())
    }
}

/// Lookup keys for a record, most specific first.
///
/// A record with an identifier is matched on it, then on its name fields
/// against entities stored before any identifier was known. A record
/// without one is matched on every natural-key field.
fn natural_keys(
    spec: &TargetTableSpec,
    values: &FieldValues,
) -> Result<Vec<NaturalKey>, RecordError> {
    let names = name_fields(spec, values);
    let identifier = spec
        .identifier_field
        .as_deref()
        .and_then(|field| values.text(field).map(|value| (field, value)));

    match identifier {
        Some((field, value)) => {
            let mut keys = vec![NaturalKey::Identifier {
                field: field.to_string(),
                value,
            }];
            if let Ok(fields) = names {
                keys.push(NaturalKey::Unidentified {
                    identifier: field.to_string(),
                    fields,
                });
            }
            Ok(keys)
        }
        None => Ok(vec![NaturalKey::Fields(names?)]),
    }
}

fn name_fields(
    spec: &TargetTableSpec,
    values: &FieldValues,
) -> Result<Vec<(String, String)>, RecordError> {
    let mut pairs = Vec::with_capacity(spec.natural_key.len());
    let mut missing = Vec::new();
    for field in &spec.natural_key {
        match values.text(field) {
            Some(value) => pairs.push((field.clone(), value)),
            None => missing.push(field.as_str()),
        }
    }
    if pairs.is_empty() || !missing.is_empty() {
        let fields = if missing.is_empty() {
            spec.identifier_field.clone().unwrap_or_else(|| "natural key".to_string())
        } else {
            missing.join(", ")
        };
        return Err(RecordError::MissingKey { fields });
    }
    Ok(pairs)
}

fn compensate(created: &Created<'_>) {
    for (repo, id) in created.entries.iter().rev() {
        match repo.delete(id) {
            Ok(()) => tracing::debug!(table = repo.table(), id = %id, "rolled back created entity"),
            Err(err) => tracing::warn!(
                table = repo.table(),
                id = %id,
                error = %err,
                "failed to roll back created entity"
            ),
        }
    }
}
