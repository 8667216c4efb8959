//! Aggregating cache of group records.
//!
//! A group's members may be exported before or after the group itself, so
//! every registration creates the group record on demand and then updates it.
//! Records are never removed individually; only [`GroupedCache::clear`] drops them.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use xport_common::{ArtifactHandle, TypeTag};

use crate::error::CacheError;

/// Accumulated state for one group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupInfo {
    /// The group's own artifact, once produced.
    pub handle: Option<ArtifactHandle>,
    /// The target type the group is exported as, once known.
    pub type_tag: Option<TypeTag>,
    /// Artifacts of the group's members.
    pub members: BTreeSet<ArtifactHandle>,
    /// Whether the group should be written out.
    pub export: bool,
}

impl GroupInfo {
    /// Returns `true` if no member has been registered.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A map from group identity to its [`GroupInfo`].
#[derive(Debug)]
pub struct GroupedCache<G> {
    name: &'static str,
    groups: HashMap<G, GroupInfo>,
}

impl<G: Copy + Eq + Hash + Ord> GroupedCache<G> {
    /// Creates an empty cache.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            groups: HashMap::new(),
        }
    }

    /// The cache's name, used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn get_or_create(&mut self, group: G) -> &mut GroupInfo {
        self.groups.entry(group).or_default()
    }

    fn require_valid(&self, handle: ArtifactHandle) -> Result<ArtifactHandle, CacheError> {
        if handle.is_valid() {
            Ok(handle)
        } else {
            Err(CacheError::NullHandle { cache: self.name })
        }
    }

    /// Sets the group's own handle and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NullHandle`] for the null handle without
    /// creating a record.
    pub fn register_handle(
        &mut self,
        group: G,
        handle: ArtifactHandle,
    ) -> Result<GroupInfo, CacheError> {
        let handle = self.require_valid(handle)?;
        let info = self.get_or_create(group);
        info.handle = Some(handle);
        Ok(info.clone())
    }

    /// Sets the group's target type.
    pub fn register_type(&mut self, group: G, type_tag: TypeTag) {
        self.get_or_create(group).type_tag = Some(type_tag);
    }

    /// Adds one member handle. Adding the same handle twice has no effect.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NullHandle`] for the null handle without
    /// creating a record.
    pub fn register_member(&mut self, group: G, member: ArtifactHandle) -> Result<(), CacheError> {
        let member = self.require_valid(member)?;
        self.get_or_create(group).members.insert(member);
        Ok(())
    }

    /// Adds several member handles at once.
    ///
    /// An empty batch does not create a group record.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NullHandle`] if any handle in the batch is null;
    /// nothing from the batch is added in that case.
    pub fn register_members<I>(&mut self, group: G, members: I) -> Result<(), CacheError>
    where
        I: IntoIterator<Item = ArtifactHandle>,
    {
        let members = members
            .into_iter()
            .map(|member| self.require_valid(member))
            .collect::<Result<BTreeSet<_>, _>>()?;
        if members.is_empty() {
            return Ok(());
        }
        self.get_or_create(group).members.extend(members);
        Ok(())
    }

    /// Marks the group for export.
    pub fn set_export_flag(&mut self, group: G) {
        self.get_or_create(group).export = true;
    }

    /// Returns the export flag; `false` for unknown groups.
    pub fn export_flag(&self, group: G) -> bool {
        self.groups.get(&group).is_some_and(|info| info.export)
    }

    /// Returns `true` if the group has no record or no members.
    pub fn is_group_empty(&self, group: G) -> bool {
        self.groups.get(&group).map_or(true, GroupInfo::is_empty)
    }

    /// Returns a copy of the group's record.
    pub fn info(&self, group: G) -> Option<GroupInfo> {
        self.groups.get(&group).cloned()
    }

    /// The group's own handle, if registered.
    pub fn handle(&self, group: G) -> Option<ArtifactHandle> {
        self.groups.get(&group).and_then(|info| info.handle)
    }

    /// The group's target type, if registered.
    pub fn type_tag(&self, group: G) -> Option<TypeTag> {
        self.groups.get(&group).and_then(|info| info.type_tag)
    }

    /// The group's member handles in ascending order.
    pub fn members(&self, group: G) -> Vec<ArtifactHandle> {
        self.groups
            .get(&group)
            .map(|info| info.members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every known group in ascending order.
    pub fn groups(&self) -> Vec<G> {
        let mut groups: Vec<G> = self.groups.keys().copied().collect();
        groups.sort_unstable();
        groups
    }

    /// Drops every group record.
    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// Number of group records.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if there are no group records.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
