//! Composite identity keys with mixed equality policies.
//!
//! A key bundles an entity identity with optional discriminators. Entity
//! components compare by identity, tag components by value, and text
//! components case-insensitively. Hashing mirrors the same policies so that
//! equal keys always hash identically.

use std::fmt;
use std::hash::{Hash, Hasher};

use xport_common::{eq_fold_case, fold_case_hash, mix, EntityId, TypeTag};

/// Seed for [`IdentityKey::hash_of`].
const HASH_SEED: u64 = 0xcbf2_9ce4_8422_2325;

/// One component of an [`IdentityKey`].
///
/// `None` in a tag or text component is legal and means "no constraint".
#[derive(Clone, Debug)]
pub enum KeyComponent {
    /// A source entity, compared by identity.
    Entity(EntityId),
    /// A target-type discriminator, compared by value.
    Tag(Option<TypeTag>),
    /// A string discriminator, compared case-insensitively.
    Text(Option<String>),
}

impl KeyComponent {
    fn component_hash(&self) -> u64 {
        match self {
            KeyComponent::Entity(id) => u64::from(id.as_raw()),
            KeyComponent::Tag(tag) => tag.map_or(0, |t| u64::from(t.as_raw())),
            KeyComponent::Text(text) => text.as_deref().map_or(0, fold_case_hash),
        }
    }
}

impl PartialEq for KeyComponent {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (KeyComponent::Entity(a), KeyComponent::Entity(b)) => a == b,
            (KeyComponent::Tag(a), KeyComponent::Tag(b)) => a == b,
            (KeyComponent::Text(a), KeyComponent::Text(b)) => match (a, b) {
                (Some(a), Some(b)) => eq_fold_case(a, b),
                (None, None) => true,
                _ => false,
            },
            _ => false,
        }
    }
}

impl Eq for KeyComponent {}

/// An immutable composite key rooted at a source entity.
///
/// ```
/// use xport_cache::IdentityKey;
/// use xport_common::{EntityId, TypeTag};
///
/// let wall = EntityId::from_raw(7);
/// let a = IdentityKey::new(wall).with_tag(TypeTag::from_raw(3)).with_text("NotDefined");
/// let b = IdentityKey::new(wall).with_tag(TypeTag::from_raw(3)).with_text("NOTDEFINED");
/// assert_eq!(a, b);
/// assert_eq!(a.hash_of(), b.hash_of());
/// ```
#[derive(Clone, Debug)]
pub struct IdentityKey {
    root: EntityId,
    rest: Vec<KeyComponent>,
}

impl IdentityKey {
    /// Creates a key whose first component is `entity`.
    pub fn new(entity: EntityId) -> Self {
        Self {
            root: entity,
            rest: Vec::new(),
        }
    }

    /// Appends a further entity component.
    pub fn with_entity(mut self, entity: EntityId) -> Self {
        self.rest.push(KeyComponent::Entity(entity));
        self
    }

    /// Appends a tag component.
    pub fn with_tag(self, tag: TypeTag) -> Self {
        self.with_optional_tag(Some(tag))
    }

    /// Appends a tag component that may be absent.
    pub fn with_optional_tag(mut self, tag: Option<TypeTag>) -> Self {
        self.rest.push(KeyComponent::Tag(tag));
        self
    }

    /// Appends a text component.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_optional_text(Some(text.into()))
    }

    /// Appends a text component that may be absent.
    pub fn with_optional_text(mut self, text: Option<String>) -> Self {
        self.rest.push(KeyComponent::Text(text));
        self
    }

    /// Number of components, including the root entity.
    pub fn arity(&self) -> usize {
        1 + self.rest.len()
    }

    /// Deterministic hash combining every component hash.
    ///
    /// Equal keys always produce equal values. Absent tags and text
    /// contribute `0`.
    pub fn hash_of(&self) -> u64 {
        let root = mix(HASH_SEED, u64::from(self.root.as_raw()));
        self.rest
            .iter()
            .fold(root, |acc, c| mix(acc, c.component_hash()))
    }
}

impl PartialEq for IdentityKey {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.rest == other.rest
    }
}

impl Eq for IdentityKey {}

impl Hash for IdentityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_of());
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.root)?;
        for c in &self.rest {
            f.write_str(", ")?;
            match c {
                KeyComponent::Entity(id) => write!(f, "{id}")?,
                KeyComponent::Tag(Some(tag)) => write!(f, "{tag}")?,
                KeyComponent::Tag(None) | KeyComponent::Text(None) => f.write_str("_")?,
                KeyComponent::Text(Some(text)) => write!(f, "{text:?}")?,
            }
        }
        f.write_str(")")
    }
}

/// A key type usable in the forward caches.
///
/// Every key is rooted at a source entity (which backs `is_registered`) and
/// may carry the target-type discriminator that registration rejection and
/// invalidation probing consult.
pub trait CacheKey: Clone + Eq + Hash + fmt::Debug {
    /// The entity this key was built from.
    fn entity(&self) -> EntityId;

    /// The first target-type discriminator recorded in the key, if any.
    fn discriminator(&self) -> Option<TypeTag>;
}

impl CacheKey for EntityId {
    fn entity(&self) -> EntityId {
        *self
    }

    fn discriminator(&self) -> Option<TypeTag> {
        None
    }
}

impl CacheKey for IdentityKey {
    fn entity(&self) -> EntityId {
        self.root
    }

    fn discriminator(&self) -> Option<TypeTag> {
        self.rest.iter().find_map(|c| match c {
            KeyComponent::Tag(tag) => *tag,
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn entity(raw: u32) -> EntityId {
        EntityId::from_raw(raw)
    }

    fn tag(raw: u32) -> TypeTag {
        TypeTag::from_raw(raw)
    }

    #[test]
    fn case_insensitive_text_equal_and_hash_equal() {
        let a = IdentityKey::new(entity(1)).with_tag(tag(2)).with_text("UserDefined");
        let b = IdentityKey::new(entity(1)).with_tag(tag(2)).with_text("USERDEFINED");
        assert_eq!(a, b);
        assert_eq!(a.hash_of(), b.hash_of());
    }

    #[test]
    fn different_entity_not_equal() {
        let a = IdentityKey::new(entity(1)).with_tag(tag(2));
        let b = IdentityKey::new(entity(2)).with_tag(tag(2));
        assert_ne!(a, b);
    }

    #[test]
    fn different_tag_not_equal() {
        let a = IdentityKey::new(entity(1)).with_tag(tag(2));
        let b = IdentityKey::new(entity(1)).with_tag(tag(3));
        assert_ne!(a, b);
    }

    #[test]
    fn absent_text_only_equals_absent_text() {
        let none = IdentityKey::new(entity(1)).with_optional_text(None);
        let none2 = IdentityKey::new(entity(1)).with_optional_text(None);
        let empty = IdentityKey::new(entity(1)).with_text("");
        assert_eq!(none, none2);
        assert_ne!(none, empty);
    }

    #[test]
    fn absent_components_hash_without_panicking() {
        let k = IdentityKey::new(entity(5))
            .with_optional_tag(None)
            .with_optional_text(None);
        let also = IdentityKey::new(entity(5))
            .with_optional_tag(None)
            .with_optional_text(None);
        assert_eq!(k.hash_of(), also.hash_of());
    }

    #[test]
    fn component_kinds_do_not_cross_compare() {
        let a = IdentityKey::new(entity(1)).with_entity(entity(4));
        let b = IdentityKey::new(entity(1)).with_tag(tag(4));
        assert_ne!(a, b);
    }

    #[test]
    fn arity_matters() {
        let a = IdentityKey::new(entity(1));
        let b = IdentityKey::new(entity(1)).with_optional_tag(None);
        assert_ne!(a, b);
        assert_eq!(b.arity(), 2);
    }

    #[test]
    fn usable_as_hash_map_key() {
        let mut map = HashMap::new();
        map.insert(IdentityKey::new(entity(9)).with_text("Beam"), 1);
        let probe = IdentityKey::new(entity(9)).with_text("bEaM");
        assert_eq!(map.get(&probe), Some(&1));
    }

    #[test]
    fn cache_key_accessors() {
        let k = IdentityKey::new(entity(3)).with_text("x").with_tag(tag(8));
        assert_eq!(k.entity(), entity(3));
        assert_eq!(k.discriminator(), Some(tag(8)));
        assert_eq!(entity(3).entity(), entity(3));
        assert_eq!(entity(3).discriminator(), None);
    }

    #[test]
    fn discriminator_skips_absent_tag() {
        let k = IdentityKey::new(entity(3)).with_optional_tag(None).with_tag(tag(6));
        assert_eq!(k.discriminator(), Some(tag(6)));
    }

    #[test]
    fn display() {
        let k = IdentityKey::new(entity(2)).with_tag(tag(5)).with_text("Wall");
        assert_eq!(k.to_string(), "(entity#2, tag:5, \"Wall\")");
    }
}
