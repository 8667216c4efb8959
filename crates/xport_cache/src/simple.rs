//! Forward cache from a source identity to one produced artifact.
//!
//! Registration is first-write-wins: once a key maps to a handle, later
//! registrations for an equal key are no-ops. Keys whose discriminator is
//! [`TypeTag::UNKNOWN`](xport_common::TypeTag::UNKNOWN) are never cached, since
//! an unclassifiable artifact is of no use to later lookups.

use std::collections::{HashMap, HashSet};

use tracing::trace;
use xport_common::{ArtifactHandle, EntityId};

use crate::error::CacheError;
use crate::key::CacheKey;

/// How a cache reacts to an existing key being registered with a different handle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegisterPolicy {
    /// Keep the first handle and ignore the new one.
    #[default]
    Lenient,
    /// Keep the first handle and report [`CacheError::ConflictingHandle`].
    Strict,
}

/// Outcome of a registration that did not violate a precondition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// The entry was added.
    Inserted,
    /// An equal key was already cached; nothing changed.
    Duplicate,
    /// The key's discriminator is the unknown sentinel; nothing changed.
    Rejected,
}

impl Registration {
    /// Returns `true` if the cache changed.
    pub fn is_inserted(self) -> bool {
        self == Registration::Inserted
    }
}

/// A single forward map from key to artifact handle.
#[derive(Debug)]
pub struct SimpleCache<K: CacheKey> {
    name: &'static str,
    policy: RegisterPolicy,
    entries: HashMap<K, ArtifactHandle>,
    /// Entities that have had at least one key registered.
    registered: HashSet<EntityId>,
}

impl<K: CacheKey> SimpleCache<K> {
    /// Creates an empty lenient cache.
    pub fn new(name: &'static str) -> Self {
        Self::with_policy(name, RegisterPolicy::Lenient)
    }

    /// Creates an empty cache that reports conflicting re-registrations.
    pub fn strict(name: &'static str) -> Self {
        Self::with_policy(name, RegisterPolicy::Strict)
    }

    /// Creates an empty cache with the given registration policy.
    pub fn with_policy(name: &'static str, policy: RegisterPolicy) -> Self {
        Self {
            name,
            policy,
            entries: HashMap::new(),
            registered: HashSet::new(),
        }
    }

    /// The cache's name, used in errors and logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The cache's registration policy.
    pub fn policy(&self) -> RegisterPolicy {
        self.policy
    }

    /// Looks up the handle cached for `key`.
    pub fn find(&self, key: &K) -> Option<ArtifactHandle> {
        self.entries.get(key).copied()
    }

    /// Returns `true` if `key` has a cached handle.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns `true` if any key rooted at `entity` was ever registered since
    /// the last [`clear`](Self::clear), regardless of its other components.
    ///
    /// Removing or invalidating an entry does not unmark its entity.
    pub fn is_registered(&self, entity: EntityId) -> bool {
        self.registered.contains(&entity)
    }

    /// Caches `handle` for `key` unless an equal key is already present or
    /// the key's discriminator is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NullHandle`] for the null handle, and
    /// [`CacheError::ConflictingHandle`] when a strict cache already maps the
    /// key to a different handle.
    pub fn register(&mut self, key: K, handle: ArtifactHandle) -> Result<Registration, CacheError> {
        if let Some(outcome) = self.precheck(&key, handle)? {
            return Ok(outcome);
        }
        self.insert_unchecked(key, handle);
        Ok(Registration::Inserted)
    }

    /// Removes the entry for `key`, returning its handle.
    pub fn remove(&mut self, key: &K) -> Option<ArtifactHandle> {
        self.entries.remove(key)
    }

    /// Removes every entry and every registration mark.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.registered.clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the cached `(key, handle)` pairs.
    pub(crate) fn entries(&self) -> Vec<(K, ArtifactHandle)> {
        self.entries
            .iter()
            .map(|(k, h)| (k.clone(), *h))
            .collect()
    }

    /// Applies the registration rules without mutating anything.
    ///
    /// Returns `Some(outcome)` when registration must be a no-op, `None` when
    /// the entry may be inserted.
    pub(crate) fn precheck(
        &self,
        key: &K,
        handle: ArtifactHandle,
    ) -> Result<Option<Registration>, CacheError> {
        if !handle.is_valid() {
            return Err(CacheError::NullHandle { cache: self.name });
        }
        if key.discriminator().is_some_and(|tag| tag.is_unknown()) {
            trace!(cache = self.name, ?key, "rejected registration with unknown discriminator");
            return Ok(Some(Registration::Rejected));
        }
        match self.entries.get(key) {
            None => Ok(None),
            Some(&existing) if existing == handle => {
                trace!(cache = self.name, ?key, %handle, "duplicate registration");
                Ok(Some(Registration::Duplicate))
            }
            Some(&existing) => match self.policy {
                RegisterPolicy::Lenient => {
                    trace!(
                        cache = self.name,
                        ?key,
                        %existing,
                        attempted = %handle,
                        "ignored re-registration with a different handle"
                    );
                    Ok(Some(Registration::Duplicate))
                }
                RegisterPolicy::Strict => Err(CacheError::ConflictingHandle {
                    cache: self.name,
                    key: format!("{key:?}"),
                    existing,
                    attempted: handle,
                }),
            },
        }
    }

    pub(crate) fn insert_unchecked(&mut self, key: K, handle: ArtifactHandle) {
        self.registered.insert(key.entity());
        self.entries.insert(key, handle);
    }
}
