//
// check.rs
// bids-batch
//
// Cross-checks that every session-code pair of a secondary table appears in
// the clinical roster, i.e. that session 1 and session 2 match within
// subjects across the two tables.
//

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;

use crate::roster::{self, RosterColumns};

/// Outcome of one cross-check pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CrossCheckReport {
    /// Number of pairs inspected in the secondary table.
    pub checked: usize,
    /// Pairs whose codes were not both found in the clinical roster.
    pub mismatches: Vec<(String, String)>,
}

impl CrossCheckReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Compare a secondary code-pair table against the clinical roster.
///
/// The clinical roster is filtered by the inclusion flag first; a pair
/// mismatches when either of its codes is absent from the included rows.
pub fn cross_check(
    clinical: &Path,
    secondary: &Path,
    columns: &RosterColumns,
    affirmative: &str,
) -> Result<CrossCheckReport> {
    let entries = roster::load_roster(clinical, columns, affirmative)?;
    let known: HashSet<&str> = entries
        .iter()
        .filter(|e| e.included)
        .flat_map(|e| [e.code_session1.as_str(), e.code_session2.as_str()])
        .collect();

    let pairs = roster::load_code_pairs(secondary, &columns.session1, &columns.session2)?;
    let mut report = CrossCheckReport {
        checked: pairs.len(),
        ..Default::default()
    };
    for (code1, code2) in pairs {
        if !(known.contains(code1.as_str()) && known.contains(code2.as_str())) {
            report.mismatches.push((code1, code2));
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_table(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write table");
        file
    }

    #[test]
    fn reports_pairs_missing_from_the_clinical_roster() {
        let clinical = write_table(
            "Title\nFUP MR měření B provedeno (ano/ne),MR B1,MR B2\nano,1860B,6472B\nne,9999X,9999Y\n",
        );
        let secondary = write_table("MR B1,MR B2\n1860B,6472B\n9999X,9999Y\n1234A,5678B\n");

        let report = cross_check(
            clinical.path(),
            secondary.path(),
            &RosterColumns::default(),
            roster::DEFAULT_AFFIRMATIVE,
        )
        .unwrap();

        assert_eq!(report.checked, 3);
        // The excluded clinical row does not vouch for its codes.
        assert_eq!(
            report.mismatches,
            vec![
                ("9999X".to_string(), "9999Y".to_string()),
                ("1234A".to_string(), "5678B".to_string()),
            ]
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn clean_when_all_pairs_are_present() {
        let clinical = write_table(
            "Title\nFUP MR měření B provedeno (ano/ne),MR B1,MR B2\nano,1860B,6472B\n",
        );
        let secondary = write_table("MR B1,MR B2\n1860B,6472B\n");

        let report = cross_check(
            clinical.path(),
            secondary.path(),
            &RosterColumns::default(),
            roster::DEFAULT_AFFIRMATIVE,
        )
        .unwrap();
        assert!(report.is_clean());
    }
}
