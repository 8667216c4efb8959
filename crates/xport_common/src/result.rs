//! Run-aborting failures of the export pipeline.

/// Result of an operation whose failure ends the current export run.
///
/// Cache lookups and registrations never produce this: duplicates, stale
/// handles and failed named lookups are absorbed where they happen. It is
/// reserved for collaborators that have no fallback left, such as a document
/// that cannot supply a default phase or material.
pub type ExportResult<T> = Result<T, InternalError>;

/// A fault the export run cannot recover from.
///
/// The run is expected to stop and call a full clear on its context before
/// any further run begins.
#[derive(Debug, thiserror::Error)]
#[error("export aborted: {message}")]
pub struct InternalError {
    /// What failed, including the collaborator that failed.
    pub message: String,
}

impl InternalError {
    /// Creates an error from a free-form description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Creates an error attributed to the named document singleton.
    pub fn unresolved(singleton: &str, reason: impl std::fmt::Display) -> Self {
        Self {
            message: format!("cannot resolve {singleton}: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_marks_run_as_aborted() {
        let err = InternalError::new("document closed mid-run");
        assert_eq!(format!("{err}"), "export aborted: document closed mid-run");
    }

    #[test]
    fn unresolved_names_the_singleton() {
        let err = InternalError::unresolved("active_phase", "no phases in document");
        assert_eq!(err.message, "cannot resolve active_phase: no phases in document");
    }

    #[test]
    fn propagates_through_question_mark() {
        fn default_phase(available: bool) -> ExportResult<u32> {
            if !available {
                return Err(InternalError::unresolved("active_phase", "empty phase table"));
            }
            Ok(1)
        }
        fn run(available: bool) -> ExportResult<u32> {
            let phase = default_phase(available)?;
            Ok(phase + 1)
        }
        assert_eq!(run(true).unwrap(), 2);
        assert!(run(false).unwrap_err().message.contains("empty phase table"));
    }
}
