//
// identity.rs
// bids-batch
//
// Extracts participant and session tokens from BIDS-style paths and resolves
// which imaging session a raw token belongs to within a composite
// participant id.
//

use std::fmt;

use serde::Serialize;

use crate::error::BatchError;

/// Logical position of a session within a longitudinal participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionLabel {
    One,
    Two,
}

impl fmt::Display for SessionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionLabel::One => write!(f, "Session 1"),
            SessionLabel::Two => write!(f, "Session 2"),
        }
    }
}

/// Get `participant_id` and `session_id` from a BIDS-compatible filename or
/// file path, e.g. `sub-1860B6472B/ses-6472B/dwi/sub-1860B6472B_ses-6472B_dwi.nii.gz`
/// yields `("sub-1860B6472B", "ses-6472B")`.
///
/// Works both on absolute paths and bare filenames. The first occurrence of
/// each token is taken, up to the next underscore or path separator. A token
/// that is absent, or truncated with no trailing delimiter, yields an empty
/// string for that field rather than an error.
pub fn fetch_participant_and_session(filename_path: &str) -> (String, String) {
    (
        bids_token(filename_path, "sub-"),
        bids_token(filename_path, "ses-"),
    )
}

fn bids_token(haystack: &str, prefix: &str) -> String {
    let Some(start) = haystack.find(prefix) else {
        return String::new();
    };
    let body = &haystack[start + prefix.len()..];
    match body.find(['_', '/']) {
        Some(end) => haystack[start..start + prefix.len() + end].to_string(),
        // No trailing delimiter: the token cannot be bounded reliably.
        None => String::new(),
    }
}

/// Decide whether `session_id` names the first or the second imaging session
/// of `participant_id`.
///
/// The composite participant id is the concatenation of two equal-width
/// session codes, so the raw session token must equal exactly one half of it.
/// Both arguments may carry their BIDS prefixes (`sub-` / `ses-`). A token
/// matching neither half is a data-quality error and is reported as
/// `AmbiguousSession` instead of defaulting to an undefined label.
pub fn session_label(participant_id: &str, session_id: &str) -> Result<SessionLabel, BatchError> {
    let composite = participant_id
        .strip_prefix("sub-")
        .unwrap_or(participant_id);
    let token = session_id.strip_prefix("ses-").unwrap_or(session_id);

    let ambiguous = || BatchError::AmbiguousSession {
        participant: participant_id.to_string(),
        token: token.to_string(),
    };

    // An odd-length or empty composite cannot split into two equal codes.
    if composite.is_empty() || composite.len() % 2 != 0 {
        return Err(ambiguous());
    }

    let (first, second) = composite.split_at(composite.len() / 2);
    if token == first {
        Ok(SessionLabel::One)
    } else if token == second {
        Ok(SessionLabel::Two)
    } else {
        Err(ambiguous())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_participant_and_session_from_filename() {
        let (participant, session) = fetch_participant_and_session("sub-ABCDE_ses-12345_T1w.nii.gz");
        assert_eq!(participant, "sub-ABCDE");
        assert_eq!(session, "ses-12345");
    }

    #[test]
    fn parses_tokens_from_absolute_path() {
        let path = "/data/processed/sub-1860B6472B/ses-6472B/dwi/sub-1860B6472B_ses-6472B_dwi.nii.gz";
        let (participant, session) = fetch_participant_and_session(path);
        assert_eq!(participant, "sub-1860B6472B");
        assert_eq!(session, "ses-6472B");
    }

    #[test]
    fn missing_session_token_yields_empty_string() {
        let (participant, session) = fetch_participant_and_session("sub-ABCDE_T1w.nii.gz");
        assert_eq!(participant, "sub-ABCDE");
        assert_eq!(session, "");
    }

    #[test]
    fn truncated_token_fails_soft() {
        // No delimiter after the session token, so it cannot be bounded.
        let (participant, session) = fetch_participant_and_session("sub-ABCDE_ses-12345");
        assert_eq!(participant, "sub-ABCDE");
        assert_eq!(session, "");
    }

    #[test]
    fn labels_first_and_second_session() {
        assert_eq!(
            session_label("sub-1860B6472B", "ses-1860B").unwrap(),
            SessionLabel::One
        );
        assert_eq!(
            session_label("sub-1860B6472B", "ses-6472B").unwrap(),
            SessionLabel::Two
        );
    }

    #[test]
    fn works_without_bids_prefixes() {
        assert_eq!(
            session_label("1860B6472B", "6472B").unwrap(),
            SessionLabel::Two
        );
    }

    #[test]
    fn unmatched_token_is_ambiguous() {
        let err = session_label("sub-1860B6472B", "ses-9999Z").unwrap_err();
        assert!(matches!(
            err,
            BatchError::AmbiguousSession { ref token, .. } if token == "9999Z"
        ));
    }

    #[test]
    fn odd_length_composite_is_ambiguous() {
        assert!(session_label("sub-1860B6472", "ses-1860B").is_err());
    }

    #[test]
    fn session_labels_display_like_reports() {
        assert_eq!(SessionLabel::One.to_string(), "Session 1");
        assert_eq!(SessionLabel::Two.to_string(), "Session 2");
    }
}
