//! Type-validity probing of cached artifact handles.
//!
//! The target writer decides whether a handle still refers to a construct of
//! the expected type. Its check may itself fail; a failed check is reported as
//! [`ProbeOutcome::Unknown`] and treated like an invalid handle by callers.

use xport_common::{ArtifactHandle, TypeTag};

/// Result of asking whether a cached handle is still usable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The handle refers to a construct of the expected type.
    Valid,
    /// The handle refers to a construct of some other type.
    Invalid,
    /// The check could not be performed.
    Unknown,
}

impl ProbeOutcome {
    /// Maps a fallible subtype check onto an outcome. Errors become `Unknown`.
    pub fn from_result<E>(result: Result<bool, E>) -> Self {
        match result {
            Ok(true) => ProbeOutcome::Valid,
            Ok(false) => ProbeOutcome::Invalid,
            Err(_) => ProbeOutcome::Unknown,
        }
    }

    /// An unprobeable handle is as unusable as an invalid one.
    pub fn should_evict(self) -> bool {
        !matches!(self, ProbeOutcome::Valid)
    }
}

/// Checks a cached handle against the type recorded for it.
///
/// `expected` is the discriminator stored in the cache key, or `None` when the
/// key carries no type expectation.
pub trait TypeProbe {
    /// Returns whether `handle` is still a construct of type `expected`.
    fn is_subtype_of(&self, handle: ArtifactHandle, expected: Option<TypeTag>) -> ProbeOutcome;
}

impl<F> TypeProbe for F
where
    F: Fn(ArtifactHandle, Option<TypeTag>) -> ProbeOutcome,
{
    fn is_subtype_of(&self, handle: ArtifactHandle, expected: Option<TypeTag>) -> ProbeOutcome {
        self(handle, expected)
    }
}
