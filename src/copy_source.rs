//
// copy_source.rs
// bids-batch
//
// Assembles the sourcedata tree by copying per-session DICOM directories out
// of a set of archive directories, then verifies that every roster code was
// materialized.
//

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::models::RosterEntry;
use crate::runlog::RunLog;

/// What the assembly pass did for each session code.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub copied: Vec<String>,
    pub already_present: Vec<String>,
    /// Codes found in no archive and absent from the destination afterwards.
    pub missing: Vec<String>,
}

/// Copy `sub-<code>` directories for every included roster entry into `dest`.
///
/// Archives are searched in the given order and only the first hit is copied;
/// codes already present in `dest` are left untouched, so the pass is
/// idempotent. A final verification records every code that is still missing.
pub fn assemble_sourcedata(
    entries: &[RosterEntry],
    archives: &[PathBuf],
    dest: &Path,
    log: &mut RunLog,
) -> Result<CopyReport> {
    fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create destination {}", dest.display()))?;

    let codes = session_codes(entries);
    log.record(&format!("Number of session codes: {}", codes.len()))?;

    let mut report = CopyReport::default();
    for code in &codes {
        let dest_dir = dest.join(format!("sub-{code}"));
        if dest_dir.is_dir() {
            report.already_present.push(code.clone());
            continue;
        }

        for archive in archives {
            let source_dir = archive.join(format!("sub-{code}"));
            if source_dir.is_dir() {
                log.record(&format!("{code} exists in {}", archive.display()))?;
                copy_tree(&source_dir, &dest_dir)?;
                report.copied.push(code.clone());
                break;
            }
        }
    }

    // Verify that every code ended up in the destination.
    for code in &codes {
        if !dest.join(format!("sub-{code}")).is_dir() {
            log.record(&format!(
                "ERROR: {code} was not copied to {}",
                dest.display()
            ))?;
            report.missing.push(code.clone());
        }
    }

    Ok(report)
}

/// Both session codes of every included entry, deduplicated, roster order.
fn session_codes(entries: &[RosterEntry]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut codes = Vec::new();
    for entry in entries.iter().filter(|e| e.included) {
        for code in [&entry.code_session1, &entry.code_session2] {
            if !code.is_empty() && seen.insert(code.clone()) {
                codes.push(code.clone());
            }
        }
    }
    codes
}

fn copy_tree(source: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.with_context(|| format!("Failed to walk {}", source.display()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .context("Walked entry outside the source tree")?;
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        }
    }
    Ok(())
}
