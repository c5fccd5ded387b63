use thiserror::Error;

/// Domain error taxonomy shared by the roster loader, identity parser and executor.
///
/// `MissingColumn` and `ExternalToolUnavailable` are structural: they abort the
/// run before any job is planned. Per-job failures are represented as
/// `ConversionOutcome` values instead and never abort the batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("column '{0}' not found in the roster header")]
    MissingColumn(String),

    #[error("session token '{token}' matches neither half of participant id '{participant}'")]
    AmbiguousSession { participant: String, token: String },

    #[error("converter '{0}' is not available on PATH")]
    ExternalToolUnavailable(String),
}
