//! Shared foundational types for the xport export pipeline.
//!
//! This crate provides the opaque identity newtypes that flow between the
//! model-access layer, the derivation layer, and the cross-reference caches,
//! together with case-folded key hashing and the common result type.

#![warn(missing_docs)]

pub mod hash;
pub mod ids;
pub mod result;
pub mod tag;

pub use hash::{eq_fold_case, fold_case_hash, mix};
pub use ids::{ArtifactHandle, DocumentId, EntityId};
pub use result::{ExportResult, InternalError};
pub use tag::TypeTag;
