//! Error types for cache operations.

use xport_common::ArtifactHandle;

/// Precondition violations reported synchronously to the registering caller.
///
/// Duplicate keys and unclassifiable discriminators are expected steady-state
/// conditions and never produce a `CacheError`; they surface as
/// [`Registration`](crate::Registration) outcomes instead. The variants here
/// indicate a bug in the producer component.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// The empty handle was offered for registration.
    #[error("cannot register the null handle in {cache}")]
    NullHandle {
        /// Name of the cache that refused the registration.
        cache: &'static str,
    },

    /// A strict cache already maps the key to a different handle.
    #[error("{cache}: key {key} already maps to {existing}, refusing {attempted}")]
    ConflictingHandle {
        /// Name of the cache that refused the registration.
        cache: &'static str,
        /// Debug rendering of the offending key.
        key: String,
        /// The handle already cached for the key.
        existing: ArtifactHandle,
        /// The handle the caller tried to register.
        attempted: ArtifactHandle,
    },

    /// A strict bidirectional cache already maps the handle back to another key.
    #[error("{cache}: {handle} is already mapped to a different key")]
    HandleAlreadyMapped {
        /// Name of the cache that refused the registration.
        cache: &'static str,
        /// The handle that is already in the reverse map.
        handle: ArtifactHandle,
    },
}

/// Failures of the external document-scoped store consulted by resolvers.
///
/// Resolvers absorb these: a failed named lookup is treated as "not found".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store cannot be queried at all (for example, no open document).
    #[error("document store unavailable: {reason}")]
    Unavailable {
        /// Description of why the store is unavailable.
        reason: String,
    },

    /// The store was reachable but the lookup itself failed.
    #[error("lookup of '{name}' failed: {reason}")]
    Lookup {
        /// The name that was looked up.
        name: String,
        /// Description of the failure.
        reason: String,
    },
}
