//! Cross-reference caching for the model-to-document export pipeline.
//!
//! This crate guarantees that identical source entities are translated into
//! target artifacts at most once per export run. It provides composite identity
//! keys, forward and bidirectional caches with stale-handle invalidation,
//! aggregating group caches, memoized document singletons, and the
//! [`ExportContext`] registry that owns them all and resets them between runs.

#![warn(missing_docs)]

pub mod bidi;
pub mod context;
pub mod error;
pub mod grouped;
pub mod key;
pub mod probe;
pub mod resolver;
pub mod simple;

pub use bidi::BidirectionalCache;
pub use context::{CacheStats, ClearMode, ExportContext, Precision, SiteRecord};
pub use error::{CacheError, StoreError};
pub use grouped::{GroupInfo, GroupedCache};
pub use key::{CacheKey, IdentityKey, KeyComponent};
pub use probe::{ProbeOutcome, TypeProbe};
pub use resolver::{LazyResolver, NamedStore, Resolution, Strategy};
pub use simple::{RegisterPolicy, Registration, SimpleCache};
