//
// convert.rs
// bids-batch
//
// Invokes the external DICOM-to-BIDS converter for every pending job and
// drives one whole batch: planned slots in, outcome records and a summary out.
//

use std::process::{Command, Stdio};

use anyhow::Result;

use crate::error::BatchError;
use crate::models::{ConversionJob, ConversionOutcome, PlannedSlot, RosterEntry, RunSummary};
use crate::plan::{self, PlanContext};
use crate::runlog::RunLog;

/// External converter binary expected on PATH.
pub const DEFAULT_CONVERTER: &str = "dcm2bids";

/// Probe that the converter can be spawned at all.
///
/// Runs `<converter> --help` with output discarded. Any exit status counts as
/// available; only a spawn failure does not. Called before the job loop so a
/// missing binary is a single fatal error instead of one failure per job.
pub fn ensure_converter_available(converter: &str) -> Result<(), BatchError> {
    Command::new(converter)
        .arg("--help")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|_| ())
        .map_err(|_| BatchError::ExternalToolUnavailable(converter.to_string()))
}

/// Run the converter for one job.
///
/// The five parameters are passed as an argument vector, never through a
/// shell. The converter owns all writes under the output root; success is
/// only ever re-checked through the destination marker on the next run.
pub fn run_job(converter: &str, job: &ConversionJob) -> ConversionOutcome {
    let status = Command::new(converter)
        .arg("-d")
        .arg(&job.source_dir)
        .arg("-p")
        .arg(&job.participant)
        .arg("-s")
        .arg(&job.session)
        .arg("-o")
        .arg(&job.output_root)
        .arg("-c")
        .arg(&job.config)
        .status();

    match status {
        Ok(status) if status.success() => ConversionOutcome::Executed,
        Ok(status) => ConversionOutcome::Failed {
            status: status.code(),
        },
        Err(err) => {
            tracing::error!("Failed to spawn {converter}: {err}");
            ConversionOutcome::Failed { status: None }
        }
    }
}

/// Plan and execute every slot of the roster, sequentially and in roster
/// order. A job failure is recorded and the loop continues; only run-log I/O
/// errors abort the batch.
pub fn run_batch(
    entries: &[RosterEntry],
    ctx: &PlanContext,
    converter: &str,
    log: &mut RunLog,
) -> Result<RunSummary> {
    let included = entries.iter().filter(|e| e.included).count();
    log.record(&format!("Number of subjects: {included}"))?;

    let mut summary = RunSummary::default();
    for slot in plan::plan_roster(entries, ctx) {
        match slot {
            PlannedSlot::Convert(job) => {
                log.record(&format!(
                    "Running {} for {}",
                    converter,
                    job.source_dir.display()
                ))?;
                match run_job(converter, &job) {
                    ConversionOutcome::Executed => summary.executed += 1,
                    ConversionOutcome::Failed { status } => {
                        summary.failed += 1;
                        let status = match status {
                            Some(code) => format!("exit code {code}"),
                            None => "no exit code".to_string(),
                        };
                        log.record(&format!(
                            "ERROR: {} failed for {} {} ({})",
                            converter, job.participant, job.session, status
                        ))?;
                    }
                }
            }
            PlannedSlot::AlreadyConverted {
                participant,
                session,
            } => {
                summary.skipped += 1;
                log.record(&format!(
                    "{participant} {session} already exists in {}",
                    ctx.path_out.display()
                ))?;
            }
            PlannedSlot::MissingSource {
                session,
                source_dir,
                ..
            } => {
                summary.missing_source += 1;
                log.record(&format!(
                    "{session}: source directory {} does not exist",
                    source_dir.display()
                ))?;
            }
        }
    }

    log.summary(&summary)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_reported_as_unavailable() {
        let err = ensure_converter_available("definitely-not-a-converter-binary").unwrap_err();
        assert!(matches!(err, BatchError::ExternalToolUnavailable(name)
            if name == "definitely-not-a-converter-binary"));
    }

    #[cfg(unix)]
    #[test]
    fn present_binary_is_available_regardless_of_exit_status() {
        // `false --help` exits nonzero, but the process completed.
        assert!(ensure_converter_available("false").is_ok());
    }
}
