//! Target-type discriminators recorded alongside cached artifacts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An enumerated discriminator naming the target-format type an artifact was
/// produced as.
///
/// The set of tags is owned by the target schema writer; this crate only
/// reserves [`TypeTag::UNKNOWN`] for entities whose target type could not be
/// classified. Tags compare by value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct TypeTag(u32);

impl TypeTag {
    /// Sentinel for an unclassifiable target type.
    pub const UNKNOWN: TypeTag = TypeTag(0);

    /// Creates a tag from its raw schema value.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw schema value.
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    /// Returns `true` if this is the [`TypeTag::UNKNOWN`] sentinel.
    pub const fn is_unknown(self) -> bool {
        self.0 == Self::UNKNOWN.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            f.write_str("tag:unknown")
        } else {
            write!(f, "tag:{}", self.0)
        }
    }
}
