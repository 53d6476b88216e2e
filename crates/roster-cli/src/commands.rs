use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use roster_import::{
    ImportKind, ImportOptions, ImportOrchestrator, ImportResult, ImportState, InMemoryStore,
    Notifier, RunStatus, TracingNotifier, build_records, ensure_importable, save_error_report,
};
use roster_ingest::{IngestOptions, read_table};
use roster_map::{ColumnMappingEngine, MappingConfig, MappingSet, auto_promote};
use roster_model::{
    ColumnMapping, MappingAction, ParsedTable, PipelineSettings, TargetTableSpec,
    ValidationResult,
};
use roster_standards::SchemaRegistry;
use roster_validate::{RowValidator, ValidatorSettings};
use tracing::{debug, info, info_span, warn};

use crate::cli::{ImportArgs, InputArgs, SuggestArgs, ValidateArgs};
use crate::logging::redact_value;
use crate::summary::{print_import, print_mappings, print_tables, print_validation};

/// How a command ended, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Some records failed or the import aborted.
    Failed,
    /// Validation errors kept the import from starting.
    Blocked,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::Failed => 1,
            Outcome::Blocked => 2,
        }
    }
}

/// What `import` did.
#[derive(Debug)]
pub struct ImportReport {
    pub validation: ValidationResult,
    /// `None` when validation blocked the run.
    pub result: Option<ImportResult>,
    pub report: Option<PathBuf>,
}

impl ImportReport {
    pub fn outcome(&self) -> Outcome {
        match &self.result {
            None => Outcome::Blocked,
            Some(result) if result.failed() > 0 || result.status() == RunStatus::Aborted => {
                Outcome::Failed
            }
            Some(_) => Outcome::Success,
        }
    }
}

pub fn run_tables() -> Result<()> {
    let registry = SchemaRegistry::load_default().context("load table catalog")?;
    print_tables(&registry);
    Ok(())
}

pub fn run_suggest(args: &SuggestArgs, settings: &PipelineSettings) -> Result<MappingSet> {
    let registry = SchemaRegistry::load_default().context("load table catalog")?;
    let spec = registry.table(&args.table)?;
    let parsed = read_input(&args.input)?;

    let mappings = ColumnMappingEngine::from_settings(settings).suggest(spec, &parsed);
    let set = MappingSet::new(&spec.name, mappings);
    print_mappings(spec, &set);

    if let Some(out) = &args.out {
        let mut config = MappingConfig::from(set.clone());
        config
            .save(out)
            .with_context(|| format!("save mapping to {}", out.display()))?;
        println!("Mapping saved: {}", out.display());
    }
    Ok(set)
}

pub fn run_validate(args: &ValidateArgs, settings: &PipelineSettings) -> Result<ValidationResult> {
    let registry = SchemaRegistry::load_default().context("load table catalog")?;
    let spec = registry.table(&args.table)?;
    let parsed = read_input(&args.input)?;
    let mappings = resolve_mappings(
        &registry,
        spec,
        &parsed,
        args.mapping.as_deref(),
        args.auto_promote,
        settings,
    )?;

    let validation = validate_with_progress(spec, &parsed, &mappings, settings);
    print_validation(&validation);
    Ok(validation)
}

pub fn run_import(args: &ImportArgs, settings: &PipelineSettings) -> Result<ImportReport> {
    let kind = ImportKind::from(args.kind);
    let span = info_span!("import_command", table = kind.table(), file = %args.input.file.display());
    let _guard = span.enter();

    let registry = SchemaRegistry::load_default().context("load table catalog")?;
    let spec = registry.table(kind.table())?;
    let parsed = read_input(&args.input)?;
    let mappings = resolve_mappings(
        &registry,
        spec,
        &parsed,
        args.mapping.as_deref(),
        args.auto_promote,
        settings,
    )?;

    let validation = validate_with_progress(spec, &parsed, &mappings, settings);
    print_validation(&validation);
    if let Err(err) = ensure_importable(&validation) {
        warn!(error = %err, "import blocked");
        eprintln!("Import blocked: {err}");
        return Ok(ImportReport {
            validation,
            result: None,
            report: None,
        });
    }

    let records = build_records(&parsed, &mappings, spec)?;
    let store = InMemoryStore::load(&args.store)
        .with_context(|| format!("open store {}", args.store.display()))?;
    let workers = store.repository(registry.table("workers")?);
    let employers = store.repository(registry.table("employers")?);
    let placements = store.repository(registry.table("placements")?);
    let orchestrator = ImportOrchestrator::new(&registry, &workers, &employers, &placements)?;

    let mut options = ImportOptions::new(kind);
    options.default_employer = args.default_employer.clone();
    options.compensate = settings.compensate;

    let bar = progress_bar(records.len(), "importing");
    let result = orchestrator.run_with_progress(&records, &options, |state| {
        if let ImportState::Processing { index, .. } = state {
            bar.set_position(*index as u64);
        }
    });
    bar.finish_and_clear();

    store
        .save(&args.store)
        .with_context(|| format!("save store {}", args.store.display()))?;
    TracingNotifier.import_finished(&spec.name, &result);

    for error in result.errors() {
        debug!(row = error.row, label = redact_value(&error.label), message = %error.message, "failed record");
    }
    let report = if result.errors().is_empty() {
        None
    } else {
        let dir = args
            .report_dir
            .clone()
            .unwrap_or_else(|| input_dir(&args.input.file));
        let today = chrono::Local::now().date_naive();
        Some(save_error_report(&dir, today, result.errors())?)
    };

    print_import(&result, report.as_deref());
    Ok(ImportReport {
        validation,
        result: Some(result),
        report,
    })
}

/// Keep only suggestions at or above `threshold`; weaker ones become skips.
pub fn accept_suggestions(mappings: &[ColumnMapping], threshold: u8) -> Vec<ColumnMapping> {
    auto_promote(mappings, threshold)
        .into_iter()
        .map(|mapping| {
            if mapping.action == MappingAction::Map && mapping.confidence < threshold {
                ColumnMapping::skip(&mapping.source_column, &mapping.target_table)
            } else {
                mapping
            }
        })
        .collect()
}

fn read_input(input: &InputArgs) -> Result<ParsedTable> {
    let mut options = IngestOptions::for_path(&input.file);
    if let Some(delimiter) = input.delimiter {
        if !delimiter.is_ascii() {
            bail!("delimiter must be a single ASCII character, got {delimiter:?}");
        }
        options.delimiter = delimiter as u8;
    }
    let parsed = read_table(&input.file, &options)
        .with_context(|| format!("read {}", input.file.display()))?;
    info!(
        file = %input.file.display(),
        columns = parsed.headers().len(),
        rows = parsed.row_count(),
        "loaded input file"
    );
    Ok(parsed)
}

/// Mapping for every column of `parsed`, from a saved file or fresh suggestions.
fn resolve_mappings(
    registry: &SchemaRegistry,
    spec: &TargetTableSpec,
    parsed: &ParsedTable,
    mapping_path: Option<&Path>,
    promote: bool,
    settings: &PipelineSettings,
) -> Result<Vec<ColumnMapping>> {
    let Some(path) = mapping_path else {
        let suggested = ColumnMappingEngine::from_settings(settings).suggest(spec, parsed);
        return Ok(if promote {
            accept_suggestions(&suggested, settings.auto_promote_threshold)
        } else {
            suggested
        });
    };

    let config = MappingConfig::load(path)?;
    if config.table != spec.name {
        bail!(
            "mapping {} is for table {}, not {}",
            path.display(),
            config.table,
            spec.name
        );
    }
    let saved = config.into_set();
    saved.check(registry)?;

    let mappings = parsed
        .headers()
        .iter()
        .map(|header| match saved.get(header) {
            Some(mapping) => mapping.clone(),
            None => {
                warn!(column = %header, "column missing from saved mapping, skipping");
                ColumnMapping::skip(header, &spec.name)
            }
        })
        .collect();
    for mapping in saved.mappings() {
        if !parsed.has_column(&mapping.source_column) {
            warn!(column = %mapping.source_column, "mapped column not in file");
        }
    }
    Ok(mappings)
}

fn validate_with_progress(
    spec: &TargetTableSpec,
    parsed: &ParsedTable,
    mappings: &[ColumnMapping],
    settings: &PipelineSettings,
) -> ValidationResult {
    let validator = RowValidator::with_settings(spec, ValidatorSettings::from(settings));
    let bar = progress_bar(parsed.row_count(), "validating");
    let mut run = validator.run(parsed, mappings);
    for progress in run.by_ref() {
        bar.set_position(progress.processed as u64);
    }
    bar.finish_and_clear();

    let result = run.finish();
    for issue in result.issues() {
        debug!(
            row = issue.row_index,
            column = %issue.column,
            value = redact_value(&issue.raw_value),
            message = %issue.message,
            "validation issue"
        );
    }
    result
}

fn progress_bar(len: usize, message: &'static str) -> ProgressBar {
    if !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{msg:>10} [{bar:40}] {pos}/{len}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_message(message);
    bar
}

fn input_dir(file: &Path) -> PathBuf {
    file.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_suggestions_become_skips() {
        let mappings = vec![
            ColumnMapping::map("First Name", "workers", "first_name", 100),
            ColumnMapping::map("Phone", "workers", "mobile_phone", 70),
            ColumnMapping::map("Mob", "workers", "mobile_phone", 38),
            ColumnMapping::skip("Shoe Size", "workers"),
        ];

        let accepted = accept_suggestions(&mappings, 70);

        assert_eq!(accepted[0], mappings[0]);
        assert_eq!(accepted[1], mappings[1]);
        assert!(accepted[2].is_skip());
        assert!(accepted[3].is_skip());
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Outcome::Success.exit_code(), 0);
        assert_eq!(Outcome::Failed.exit_code(), 1);
        assert_eq!(Outcome::Blocked.exit_code(), 2);
    }

    #[test]
    fn report_dir_defaults_to_input_directory() {
        assert_eq!(input_dir(Path::new("exports/members.csv")), PathBuf::from("exports"));
        assert_eq!(input_dir(Path::new("members.csv")), PathBuf::from("."));
    }
}
