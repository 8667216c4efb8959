//! Opaque ID newtypes for source entities, produced artifacts, and documents.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Hash`, and `Serialize`/`Deserialize`.
//! Equality is identity equality: two IDs are equal iff they name the same object.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` value.
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Returns the raw `u32` value.
            pub const fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Stable surrogate identifying a source-model entity for the duration of a run.
    EntityId,
    "entity"
);

define_id!(
    /// Opaque reference to a construct written into the target document.
    ///
    /// Handles are produced by the derivation layer. The cache never looks
    /// inside them; staleness is only detectable through a
    /// type-validity probe.
    ArtifactHandle,
    "handle"
);

define_id!(
    /// Identifies the source document an export run reads from.
    DocumentId,
    "document"
);

impl ArtifactHandle {
    /// The empty handle. Never a valid registration target.
    pub const NULL: ArtifactHandle = ArtifactHandle(0);

    /// Returns `true` unless this is [`ArtifactHandle::NULL`].
    pub const fn is_valid(self) -> bool {
        self.0 != Self::NULL.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn id_roundtrip() {
        let id = EntityId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
    }

    #[test]
    fn ids_hash_by_identity() {
        let mut set = HashSet::new();
        set.insert(EntityId::from_raw(1));
        set.insert(EntityId::from_raw(2));
        set.insert(EntityId::from_raw(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn null_handle_is_invalid() {
        assert!(!ArtifactHandle::NULL.is_valid());
        assert!(ArtifactHandle::from_raw(7).is_valid());
    }

    #[test]
    fn display_carries_kind() {
        assert_eq!(EntityId::from_raw(3).to_string(), "entity#3");
        assert_eq!(ArtifactHandle::from_raw(9).to_string(), "handle#9");
        assert_eq!(DocumentId::from_raw(1).to_string(), "document#1");
    }

    #[test]
    fn serde_is_transparent_integer() {
        let h = ArtifactHandle::from_raw(12);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, "12");
        let back: ArtifactHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
