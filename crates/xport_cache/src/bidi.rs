//! Forward cache paired with a reverse map from handle back to key.
//!
//! Both maps are updated together on registration, and a rejected forward
//! insert never touches the reverse map. [`invalidate`](BidirectionalCache::invalidate)
//! is the exception: it evicts forward entries only and leaves the reverse
//! entries for [`purge_orphaned_reverse`](BidirectionalCache::purge_orphaned_reverse).

use std::collections::HashMap;

use tracing::debug;
use xport_common::{ArtifactHandle, EntityId};

use crate::error::CacheError;
use crate::key::CacheKey;
use crate::probe::TypeProbe;
use crate::simple::{RegisterPolicy, Registration, SimpleCache};

/// A forward cache that can also answer "which key produced this handle?".
#[derive(Debug)]
pub struct BidirectionalCache<K: CacheKey> {
    forward: SimpleCache<K>,
    reverse: HashMap<ArtifactHandle, K>,
}

impl<K: CacheKey> BidirectionalCache<K> {
    /// Creates an empty lenient cache.
    pub fn new(name: &'static str) -> Self {
        Self::with_policy(name, RegisterPolicy::Lenient)
    }

    /// Creates an empty cache that reports conflicting registrations.
    pub fn strict(name: &'static str) -> Self {
        Self::with_policy(name, RegisterPolicy::Strict)
    }

    /// Creates an empty cache with the given registration policy.
    pub fn with_policy(name: &'static str, policy: RegisterPolicy) -> Self {
        Self {
            forward: SimpleCache::with_policy(name, policy),
            reverse: HashMap::new(),
        }
    }

    /// The cache's name, used in errors and logs.
    pub fn name(&self) -> &'static str {
        self.forward.name()
    }

    /// Looks up the handle cached for `key`.
    pub fn find(&self, key: &K) -> Option<ArtifactHandle> {
        self.forward.find(key)
    }

    /// Looks up the key that produced `handle`.
    pub fn find_key_by_handle(&self, handle: ArtifactHandle) -> Option<K> {
        self.reverse.get(&handle).cloned()
    }

    /// See [`SimpleCache::is_registered`].
    pub fn is_registered(&self, entity: EntityId) -> bool {
        self.forward.is_registered(entity)
    }

    /// Caches `handle` for `key` in both directions.
    ///
    /// The forward rules of [`SimpleCache::register`] apply first. A handle
    /// already mapped back to a different live key is refused as well:
    /// silently for a lenient cache, with [`CacheError::HandleAlreadyMapped`]
    /// for a strict one. Reverse entries whose key was evicted by
    /// [`invalidate`](Self::invalidate), or whose key has since been cached
    /// with another handle, do not block a new registration.
    pub fn register(&mut self, key: K, handle: ArtifactHandle) -> Result<Registration, CacheError> {
        if let Some(outcome) = self.forward.precheck(&key, handle)? {
            return Ok(outcome);
        }
        if let Some(owner) = self.reverse.get(&handle) {
            if *owner != key && self.forward.find(owner) == Some(handle) {
                return match self.forward.policy() {
                    RegisterPolicy::Lenient => {
                        debug!(
                            cache = self.name(),
                            %handle,
                            ?key,
                            "handle already owned by another key"
                        );
                        Ok(Registration::Rejected)
                    }
                    RegisterPolicy::Strict => Err(CacheError::HandleAlreadyMapped {
                        cache: self.name(),
                        handle,
                    }),
                };
            }
        }
        self.reverse.insert(handle, key.clone());
        self.forward.insert_unchecked(key, handle);
        Ok(Registration::Inserted)
    }

    /// Removes `key` and its reverse entry.
    pub fn remove(&mut self, key: &K) -> Option<ArtifactHandle> {
        let handle = self.forward.remove(key)?;
        if self.reverse.get(&handle) == Some(key) {
            self.reverse.remove(&handle);
        }
        Some(handle)
    }

    /// Probes every cached entry whose key is in `candidates` and evicts the
    /// forward entry when the probe reports the handle invalid or cannot run.
    ///
    /// Reverse entries are left in place. Returns the number of evictions.
    pub fn invalidate<'a, I, P>(&mut self, candidates: I, probe: &P) -> usize
    where
        K: 'a,
        I: IntoIterator<Item = &'a K>,
        P: TypeProbe + ?Sized,
    {
        let mut evicted = 0;
        for key in candidates {
            let Some(handle) = self.forward.find(key) else {
                continue;
            };
            let outcome = probe.is_subtype_of(handle, key.discriminator());
            if outcome.should_evict() {
                debug!(cache = self.name(), ?key, %handle, ?outcome, "evicting stale handle");
                self.forward.remove(key);
                evicted += 1;
            }
        }
        evicted
    }

    /// Probes every cached entry. See [`invalidate`](Self::invalidate).
    pub fn invalidate_all<P>(&mut self, probe: &P) -> usize
    where
        P: TypeProbe + ?Sized,
    {
        let keys: Vec<K> = self.forward.entries().into_iter().map(|(k, _)| k).collect();
        self.invalidate(keys.iter(), probe)
    }

    /// Drops reverse entries whose key no longer maps forward to the same
    /// handle. Returns how many were dropped.
    pub fn purge_orphaned_reverse(&mut self) -> usize {
        let before = self.reverse.len();
        let forward = &self.forward;
        self.reverse
            .retain(|handle, key| forward.find(key) == Some(*handle));
        before - self.reverse.len()
    }

    /// Removes every entry from both maps and every registration mark.
    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
    }

    /// Number of forward entries.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Number of reverse entries, including orphans left by invalidation.
    pub fn reverse_len(&self) -> usize {
        self.reverse.len()
    }

    /// Returns `true` if the forward map is empty.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
