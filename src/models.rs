//
// models.rs
// bids-batch
//
// Defines the data structures flowing between the roster loader, the conversion
// planner, the executor and the run log.
//

use std::path::PathBuf;

use serde::Serialize;

/// One row of the clinical roster after column selection.
///
/// `code_session1` / `code_session2` are the source identifiers of the two
/// imaging sessions; `included` reflects the follow-up-performed flag column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub code_session1: String,
    pub code_session2: String,
    pub included: bool,
}

impl RosterEntry {
    /// Merged longitudinal participant id: literal concatenation of the two
    /// session codes, in session order, with no normalization.
    pub fn composite_id(&self) -> String {
        format!("{}{}", self.code_session1, self.code_session2)
    }
}

/// One pending invocation of the external converter.
///
/// `participant` and `session` already carry their BIDS prefixes
/// (`sub-<composite>` / `ses-<code>`), so the destination of a job is always
/// `output_root/participant/session` and destinations of distinct jobs are
/// disjoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionJob {
    pub participant: String,
    pub session: String,
    pub source_dir: PathBuf,
    pub output_root: PathBuf,
    pub config: PathBuf,
}

/// Planner verdict for one (roster entry, session slot) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlannedSlot {
    /// Source present, destination absent: the converter must run.
    Convert(ConversionJob),
    /// Destination already materialized by an earlier run; nothing to do.
    AlreadyConverted { participant: String, session: String },
    /// Expected source directory is absent; the slot is dropped.
    MissingSource {
        participant: String,
        session: String,
        source_dir: PathBuf,
    },
}

/// Result of handing one job to the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConversionOutcome {
    Executed,
    /// Converter process ran but reported an abnormal exit. `None` means the
    /// process was terminated without an exit code (e.g. by a signal).
    Failed { status: Option<i32> },
}

/// Per-run counts written as the final run-log record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub executed: usize,
    pub skipped: usize,
    pub missing_source: usize,
    pub failed: usize,
}

impl RunSummary {
    /// Number of slots the planner looked at, whatever their outcome.
    pub fn total(&self) -> usize {
        self.executed + self.skipped + self.missing_source + self.failed
    }
}
