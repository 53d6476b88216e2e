//! Operator feedback after a run.

use crate::orchestrator::{ImportResult, RunStatus};

/// Receives the outcome of an import run.
pub trait Notifier {
    fn import_finished(&self, table: &str, result: &ImportResult);
}

/// Reports through `tracing`; the default when no UI is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn import_finished(&self, table: &str, result: &ImportResult) {
        let message = notification_message(result);
        match result.status() {
            RunStatus::Completed if result.failed() == 0 => {
                tracing::info!(table, "{message}");
            }
            _ => tracing::warn!(table, status = ?result.status(), "{message}"),
        }
    }
}

/// Summary line, plus parent entities created and workers left without a
/// placement when either is non-zero.
pub fn notification_message(result: &ImportResult) -> String {
    let mut message = result.summary_line();
    if result.created_entities() > 0 {
        message.push_str(&format!(" ({} new employers)", result.created_entities()));
    }
    if result.unplaced() > 0 {
        message.push_str(&format!("; {} without employer", result.unplaced()));
    }
    match result.status() {
        RunStatus::Completed => {}
        RunStatus::Cancelled => message.push_str("; cancelled"),
        RunStatus::Aborted => message.push_str("; aborted"),
    }
    message
}
