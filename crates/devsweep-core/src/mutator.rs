//! Guarded device removal
//!
//! Runs the disable-then-delete workflow over a target list, one device at a
//! time. Every row ends in exactly one [`RemovalOutcome`]; a failing device
//! never stops the batch and nothing is retried.
//!
//! ```text
//! Pending -> (Disabling -> Disabled | DisableFailed)? -> Deleting -> Deleted | DeleteFailed
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::traits::DeviceMutation;
use crate::types::DeviceUpdate;

/// Shown in place of a missing display name.
const UNNAMED: &str = "(unnamed)";

/// One row of the removal input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalTarget {
    /// Directory object id. Rows without one are skipped.
    pub id: Option<String>,
    /// Display name, used for reporting only.
    pub display_name: Option<String>,
}

impl RemovalTarget {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            display_name: Some(display_name.into()),
        }
    }

    fn usable_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(UNNAMED)
    }
}

/// Flags controlling a removal run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalOptions {
    /// Report intended actions without calling the directory.
    pub dry_run: bool,
    /// Disable each device before deleting it.
    pub disable_first: bool,
    /// Pause between devices that issued directory calls.
    pub delay: Duration,
}

/// States of the per-device removal machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalState {
    Pending,
    Disabling,
    Disabled,
    DisableFailed,
    Deleting,
    Deleted,
    DeleteFailed,
    /// Row had no device id and never entered the machine.
    Skipped,
    /// Dry run: a disable would have been issued.
    WouldDisable,
    /// Dry run: a delete would have been issued.
    WouldDelete,
}

impl fmt::Display for RemovalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RemovalState::Pending => "Pending",
            RemovalState::Disabling => "Disabling",
            RemovalState::Disabled => "Disabled",
            RemovalState::DisableFailed => "DisableFailed",
            RemovalState::Deleting => "Deleting",
            RemovalState::Deleted => "Deleted",
            RemovalState::DeleteFailed => "DeleteFailed",
            RemovalState::Skipped => "Skipped",
            RemovalState::WouldDisable => "WouldDisable",
            RemovalState::WouldDelete => "WouldDelete",
        };
        f.write_str(label)
    }
}

/// Result for a single target row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalOutcome {
    /// Position in the input (0-based).
    pub index: usize,
    /// Directory object id, if the row had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    pub display_name: Option<String>,
    /// Every state the device passed through, in order.
    pub trail: Vec<RemovalState>,
    /// Error from the disable call, if it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_error: Option<String>,
    /// Error from the delete call, or the skip reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemovalOutcome {
    fn start(index: usize, target: &RemovalTarget, id: Option<&str>) -> Self {
        Self {
            index,
            device_id: id.map(String::from),
            display_name: target.display_name.clone(),
            trail: vec![RemovalState::Pending],
            disable_error: None,
            error: None,
        }
    }

    fn advance(&mut self, state: RemovalState) {
        self.trail.push(state);
    }

    /// Terminal state of the row.
    #[must_use]
    pub fn final_state(&self) -> RemovalState {
        self.trail.last().copied().unwrap_or(RemovalState::Pending)
    }

    /// Returns true if a disable was attempted and failed.
    #[must_use]
    pub fn disable_failed(&self) -> bool {
        self.trail.contains(&RemovalState::DisableFailed)
    }

    /// One-line human-readable report.
    #[must_use]
    pub fn status_line(&self) -> String {
        let name = self.display_name.as_deref().unwrap_or(UNNAMED);
        let id = self.device_id.as_deref().unwrap_or("-");
        let mut line = match self.final_state() {
            RemovalState::Deleted if self.disable_failed() => {
                format!("Deleted (disable failed): {name} ({id})")
            }
            RemovalState::Deleted => format!("Deleted: {name} ({id})"),
            RemovalState::DeleteFailed => format!("DeleteFailed: {name} ({id})"),
            RemovalState::Skipped => format!("Skipped: {name}"),
            RemovalState::WouldDelete if self.trail.contains(&RemovalState::WouldDisable) => {
                format!("[dry-run] would disable and delete: {name} ({id})")
            }
            RemovalState::WouldDelete => format!("[dry-run] would delete: {name} ({id})"),
            other => format!("{other}: {name} ({id})"),
        };
        if let Some(ref err) = self.error {
            line.push_str(&format!(" - {err}"));
        }
        line
    }
}

/// Summary of a completed removal run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalReport {
    pub dry_run: bool,
    pub deleted: usize,
    pub delete_failed: usize,
    pub disable_failed: usize,
    pub skipped: usize,
    /// Dry-run rows that would have been deleted.
    pub planned: usize,
    pub items: Vec<RemovalOutcome>,
    pub duration_ms: u64,
}

impl RemovalReport {
    fn push(&mut self, outcome: RemovalOutcome) {
        if outcome.disable_failed() {
            self.disable_failed += 1;
        }
        match outcome.final_state() {
            RemovalState::Deleted => self.deleted += 1,
            RemovalState::DeleteFailed => self.delete_failed += 1,
            RemovalState::Skipped => self.skipped += 1,
            RemovalState::WouldDelete => self.planned += 1,
            _ => {}
        }
        self.items.push(outcome);
    }

    /// Total rows reported.
    #[must_use]
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Returns true if any directory call failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.delete_failed > 0 || self.disable_failed > 0
    }

    /// Final tally line.
    #[must_use]
    pub fn summary_line(&self) -> String {
        if self.dry_run {
            format!(
                "Dry run complete: {} would be deleted, {} skipped",
                self.planned, self.skipped
            )
        } else {
            format!(
                "Removal complete: {} deleted, {} failed, {} disable failures, {} skipped",
                self.deleted, self.delete_failed, self.disable_failed, self.skipped
            )
        }
    }
}

/// Disable-then-delete executor over a [`DeviceMutation`] directory.
pub struct GuardedRemoval<'a, D: ?Sized> {
    directory: &'a D,
    options: RemovalOptions,
}

impl<'a, D> GuardedRemoval<'a, D>
where
    D: DeviceMutation + ?Sized,
{
    pub fn new(directory: &'a D, options: RemovalOptions) -> Self {
        Self { directory, options }
    }

    /// Processes every target in order and returns the per-row report.
    #[instrument(skip(self, targets), fields(count = targets.len(), dry_run = self.options.dry_run))]
    pub async fn run(&self, targets: &[RemovalTarget]) -> RemovalReport {
        let start = Instant::now();
        let mut report = RemovalReport {
            dry_run: self.options.dry_run,
            items: Vec::with_capacity(targets.len()),
            ..Default::default()
        };

        let mut called_directory = false;
        for (index, target) in targets.iter().enumerate() {
            let Some(id) = target.usable_id() else {
                warn!(row = index, name = target.label(), "Row has no device id, skipping");
                let mut outcome = RemovalOutcome::start(index, target, None);
                outcome.trail = vec![RemovalState::Skipped];
                outcome.error = Some("missing device id".to_string());
                report.push(outcome);
                continue;
            };

            if self.options.dry_run {
                report.push(self.plan(index, target, id));
                continue;
            }

            if called_directory && !self.options.delay.is_zero() {
                tokio::time::sleep(self.options.delay).await;
            }
            called_directory = true;

            report.push(self.remove(index, target, id).await);
        }

        report.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!("{}", report.summary_line());
        report
    }

    fn plan(&self, index: usize, target: &RemovalTarget, id: &str) -> RemovalOutcome {
        let mut outcome = RemovalOutcome::start(index, target, Some(id));
        if self.options.disable_first {
            info!(device = id, name = target.label(), "[dry-run] would disable");
            outcome.advance(RemovalState::WouldDisable);
        }
        info!(device = id, name = target.label(), "[dry-run] would delete");
        outcome.advance(RemovalState::WouldDelete);
        outcome
    }

    async fn remove(&self, index: usize, target: &RemovalTarget, id: &str) -> RemovalOutcome {
        let mut outcome = RemovalOutcome::start(index, target, Some(id));

        if self.options.disable_first {
            outcome.advance(RemovalState::Disabling);
            match self.directory.update_device(id, &DeviceUpdate::disable()).await {
                Ok(()) => {
                    info!(device = id, name = target.label(), "Disabled");
                    outcome.advance(RemovalState::Disabled);
                }
                Err(e) => {
                    warn!(device = id, name = target.label(), error = %e, "Disable failed, deleting anyway");
                    outcome.disable_error = Some(e.to_string());
                    outcome.advance(RemovalState::DisableFailed);
                }
            }
        }

        outcome.advance(RemovalState::Deleting);
        match self.directory.delete_device(id).await {
            Ok(()) => {
                info!(device = id, name = target.label(), "Deleted");
                outcome.advance(RemovalState::Deleted);
            }
            Err(e) => {
                warn!(device = id, name = target.label(), error = %e, "Delete failed");
                outcome.error = Some(e.to_string());
                outcome.advance(RemovalState::DeleteFailed);
            }
        }

        outcome
    }
}
