//
// plan.rs
// bids-batch
//
// Turns roster entries into conversion jobs, skipping slots whose source is
// absent or whose destination is already materialized from an earlier run.
//

use std::path::{Path, PathBuf};

use crate::models::{ConversionJob, PlannedSlot, RosterEntry};

/// Paths shared by every job of one run.
#[derive(Debug, Clone)]
pub struct PlanContext {
    /// Directory holding the `sub-<code>` DICOM source folders.
    pub path_in: PathBuf,
    /// BIDS output root.
    pub path_out: PathBuf,
    /// Converter configuration file, passed through unchanged.
    pub config: PathBuf,
}

/// Plan both session slots of every included entry, in roster order.
///
/// Excluded entries contribute nothing. Planning is a pure read of the source
/// and destination trees: running it twice against an unchanged tree yields
/// the identical slot list, and a destination materialized in between turns
/// the corresponding slot into `AlreadyConverted` on the next run.
pub fn plan_roster(entries: &[RosterEntry], ctx: &PlanContext) -> Vec<PlannedSlot> {
    entries
        .iter()
        .filter(|entry| entry.included)
        .flat_map(|entry| plan_entry(entry, ctx))
        .collect()
}

/// Plan the two session slots of a single entry, session 1 first.
pub fn plan_entry(entry: &RosterEntry, ctx: &PlanContext) -> Vec<PlannedSlot> {
    let composite_id = entry.composite_id();
    [&entry.code_session1, &entry.code_session2]
        .into_iter()
        .map(|code| plan_slot(&composite_id, code, ctx))
        .collect()
}

fn plan_slot(composite_id: &str, session_code: &str, ctx: &PlanContext) -> PlannedSlot {
    let participant = format!("sub-{composite_id}");
    let session = format!("ses-{session_code}");

    let source_dir = ctx.path_in.join(format!("sub-{session_code}"));
    if !source_dir.exists() {
        return PlannedSlot::MissingSource {
            participant,
            session,
            source_dir,
        };
    }

    // Idempotence: the destination convention <out>/sub-<composite>/ses-<code>
    // is the marker that this slot was already converted.
    if ctx.path_out.join(&participant).join(&session).exists() {
        return PlannedSlot::AlreadyConverted {
            participant,
            session,
        };
    }

    PlannedSlot::Convert(ConversionJob {
        participant,
        session,
        source_dir,
        output_root: ctx.path_out.clone(),
        config: ctx.config.clone(),
    })
}

/// Marker directory for a completed slot, per the BIDS layout convention.
pub fn destination_marker(path_out: &Path, participant: &str, session: &str) -> PathBuf {
    path_out.join(participant).join(session)
}
