//
// roster.rs
// bids-batch
//
// Reads the clinical roster (a CSV export of the study spreadsheet) and turns
// it into RosterEntry values, applying the follow-up inclusion rule.
//

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};

use crate::error::BatchError;
use crate::models::RosterEntry;

/// Header names of the roster columns the driver consumes.
///
/// The defaults mirror the study spreadsheet; names are matched exactly,
/// byte for byte, with no normalization (they may contain non-Latin
/// characters).
#[derive(Debug, Clone)]
pub struct RosterColumns {
    /// Follow-up-performed flag column.
    pub flag: String,
    /// Session 1 source code column.
    pub session1: String,
    /// Session 2 source code column.
    pub session2: String,
}

impl Default for RosterColumns {
    fn default() -> Self {
        Self {
            flag: "FUP MR měření B provedeno (ano/ne)".to_string(),
            session1: "MR B1".to_string(),
            session2: "MR B2".to_string(),
        }
    }
}

/// Literal cell value that marks a roster row as included.
pub const DEFAULT_AFFIRMATIVE: &str = "ano";

/// Load the clinical roster.
///
/// The first physical row of the export is a title row; the real headers are
/// on the second row. Rows are returned in roster order with `included` set
/// when the flag cell equals `affirmative` exactly. Any other flag value
/// (including blank) means "excluded" — this is the business rule, not a
/// boolean parse, so unrecognized values are never an error. A row missing
/// either session code is excluded as well since no composite id can be
/// formed for it.
///
/// Fails with `MissingColumn` before returning any entry if a requested
/// column is absent from the header row.
pub fn load_roster(
    path: &Path,
    columns: &RosterColumns,
    affirmative: &str,
) -> Result<Vec<RosterEntry>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open roster file {}", path.display()))?;
    // The title row usually has fewer fields than the table body.
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut records = reader.records();

    // Skip the title row.
    records
        .next()
        .transpose()
        .context("Failed to read roster title row")?
        .with_context(|| format!("Roster file {} is empty", path.display()))?;

    let header = records
        .next()
        .transpose()
        .context("Failed to read roster header row")?
        .with_context(|| format!("Roster file {} has no header row", path.display()))?;

    let flag_idx = column_index(&header, &columns.flag)?;
    let ses1_idx = column_index(&header, &columns.session1)?;
    let ses2_idx = column_index(&header, &columns.session2)?;

    let mut entries = Vec::new();
    for record in records {
        let record = record.context("Failed to read roster row")?;
        let flag = cell(&record, flag_idx);
        let code_session1 = cell(&record, ses1_idx);
        let code_session2 = cell(&record, ses2_idx);

        let included =
            flag == affirmative && !code_session1.is_empty() && !code_session2.is_empty();

        entries.push(RosterEntry {
            code_session1: code_session1.to_string(),
            code_session2: code_session2.to_string(),
            included,
        });
    }

    Ok(entries)
}

/// Load a plain two-column table of session code pairs (headers on the first
/// row, no title row). Used by the roster cross-check.
pub fn load_code_pairs(
    path: &Path,
    session1_column: &str,
    session2_column: &str,
) -> Result<Vec<(String, String)>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open table {}", path.display()))?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let header = reader
        .headers()
        .context("Failed to read table header row")?
        .clone();
    let ses1_idx = column_index(&header, session1_column)?;
    let ses2_idx = column_index(&header, session2_column)?;

    let mut pairs = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read table row")?;
        pairs.push((
            cell(&record, ses1_idx).to_string(),
            cell(&record, ses2_idx).to_string(),
        ));
    }

    Ok(pairs)
}

fn column_index(header: &StringRecord, name: &str) -> Result<usize, BatchError> {
    header
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| BatchError::MissingColumn(name.to_string()))
}

fn cell<'a>(record: &'a StringRecord, idx: usize) -> &'a str {
    record.get(idx).unwrap_or("").trim()
}
