//! The export context: every cross-reference cache of one export session.
//!
//! [`ExportContext`] is created once and passed by reference to every
//! producer component. Each run starts with [`ExportContext::clear`]. A full
//! clear resets everything. A chained clear does the same except that it keeps
//! the site record when the configuration asks to share it with the previous
//! run.

use serde::Serialize;
use tracing::debug;
use xport_common::{ArtifactHandle, DocumentId, EntityId, ExportResult};
use xport_config::{ExportConfig, PrecisionConfig};

use crate::bidi::BidirectionalCache;
use crate::error::CacheError;
use crate::grouped::GroupedCache;
use crate::key::IdentityKey;
use crate::resolver::{LazyResolver, NamedStore};
use crate::simple::SimpleCache;

const ELEMENTS: &str = "elements";
const TYPE_OBJECTS: &str = "type_objects";
const MATERIALS: &str = "materials";
const MATERIAL_LAYER_SETS: &str = "material_layer_sets";
const PRESENTATION_STYLES: &str = "presentation_styles";
const GROUPS: &str = "groups";
const ASSEMBLIES: &str = "assemblies";
const ACTIVE_PHASE: &str = "active_phase";
const DEFAULT_MATERIAL: &str = "default_material";

/// How much state a [`ExportContext::clear`] keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearMode {
    /// Reset everything; used between independent runs.
    Full,
    /// Reset everything except state shared with the previous run.
    Chained,
}

impl From<bool> for ClearMode {
    /// `true` selects [`ClearMode::Full`].
    fn from(full: bool) -> Self {
        if full {
            ClearMode::Full
        } else {
            ClearMode::Chained
        }
    }
}

/// Geometric tolerances in effect for the current run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Precision {
    /// Length tolerance in model units.
    pub length_tolerance: f64,
    /// Angular tolerance in radians.
    pub angle_tolerance: f64,
}

impl From<&PrecisionConfig> for Precision {
    fn from(config: &PrecisionConfig) -> Self {
        Self {
            length_tolerance: config.length_tolerance,
            angle_tolerance: config.angle_tolerance,
        }
    }
}

/// The site exported by a run, optionally inherited by the next chained run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SiteRecord {
    /// The source entity the site was derived from.
    pub site: EntityId,
    /// The site artifact.
    pub handle: ArtifactHandle,
}

/// Entry counts of every cache, for logging and diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of clears performed on the context.
    pub generation: u64,
    /// Forward entries in the element cache.
    pub elements: usize,
    /// Forward entries in the type object cache.
    pub type_objects: usize,
    /// Entries in the material cache.
    pub materials: usize,
    /// Entries in the material layer set cache.
    pub material_layer_sets: usize,
    /// Entries in the presentation style cache.
    pub presentation_styles: usize,
    /// Group records.
    pub groups: usize,
    /// Assembly records.
    pub assemblies: usize,
    /// Whether a site record is held.
    pub has_site: bool,
}

/// Owner of all cross-reference caches and per-run scalar state.
#[derive(Debug)]
pub struct ExportContext {
    config: ExportConfig,
    document: Option<DocumentId>,
    precision: Precision,
    generation: u64,

    project: Option<ArtifactHandle>,
    owner_history: Option<ArtifactHandle>,
    building: Option<ArtifactHandle>,
    site: Option<SiteRecord>,

    elements: Option<BidirectionalCache<IdentityKey>>,
    type_objects: Option<BidirectionalCache<IdentityKey>>,
    materials: Option<SimpleCache<EntityId>>,
    material_layer_sets: Option<SimpleCache<IdentityKey>>,
    presentation_styles: Option<SimpleCache<EntityId>>,
    groups: Option<GroupedCache<EntityId>>,
    assemblies: Option<GroupedCache<EntityId>>,

    active_phase: LazyResolver<EntityId>,
    default_material: LazyResolver<EntityId>,
}

impl ExportContext {
    /// Creates an empty context for the given configuration.
    pub fn new(config: ExportConfig) -> Self {
        let precision = Precision::from(&config.precision);
        Self {
            config,
            document: None,
            precision,
            generation: 0,
            project: None,
            owner_history: None,
            building: None,
            site: None,
            elements: None,
            type_objects: None,
            materials: None,
            material_layer_sets: None,
            presentation_styles: None,
            groups: None,
            assemblies: None,
            active_phase: LazyResolver::new(ACTIVE_PHASE),
            default_material: LazyResolver::new(DEFAULT_MATERIAL),
        }
    }

    /// Resets the context for a new run.
    ///
    /// Every cache is discarded and rebuilt on next access, every resolver
    /// is invalidated, and scalar state returns to its initial value, with
    /// precision re-read from the current configuration. The site record
    /// survives only a [`ClearMode::Chained`] clear with
    /// `run.share_site_with_previous_run` set.
    pub fn clear(&mut self, mode: impl Into<ClearMode>) {
        let mode = mode.into();
        let keep_site = mode == ClearMode::Chained && self.config.run.share_site_with_previous_run;
        let site = if keep_site { self.site.take() } else { None };

        self.document = None;
        self.precision = Precision::from(&self.config.precision);
        self.project = None;
        self.owner_history = None;
        self.building = None;
        self.site = site;

        self.elements = None;
        self.type_objects = None;
        self.materials = None;
        self.material_layer_sets = None;
        self.presentation_styles = None;
        self.groups = None;
        self.assemblies = None;

        self.active_phase.invalidate();
        self.default_material.invalidate();

        self.generation += 1;
        debug!(
            generation = self.generation,
            ?mode,
            site_preserved = self.site.is_some(),
            "cleared export caches"
        );
    }

    /// The active configuration.
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Replaces the configuration. Precision and resolver lookups pick up
    /// the new values at the next [`clear`](Self::clear).
    pub fn set_config(&mut self, config: ExportConfig) {
        self.config = config;
    }

    /// Number of clears performed so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The document being exported, if set for this run.
    pub fn document(&self) -> Option<DocumentId> {
        self.document
    }

    /// Sets the document being exported.
    pub fn set_document(&mut self, document: DocumentId) {
        self.document = Some(document);
    }

    /// Tolerances in effect for this run.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// The project artifact, once written.
    pub fn project(&self) -> Option<ArtifactHandle> {
        self.project
    }

    /// Records the project artifact.
    pub fn set_project(&mut self, handle: ArtifactHandle) -> Result<(), CacheError> {
        self.project = Some(require_valid("project", handle)?);
        Ok(())
    }

    /// The owner history artifact, once written.
    pub fn owner_history(&self) -> Option<ArtifactHandle> {
        self.owner_history
    }

    /// Records the owner history artifact.
    pub fn set_owner_history(&mut self, handle: ArtifactHandle) -> Result<(), CacheError> {
        self.owner_history = Some(require_valid("owner_history", handle)?);
        Ok(())
    }

    /// The building artifact, once written.
    pub fn building(&self) -> Option<ArtifactHandle> {
        self.building
    }

    /// Records the building artifact.
    pub fn set_building(&mut self, handle: ArtifactHandle) -> Result<(), CacheError> {
        self.building = Some(require_valid("building", handle)?);
        Ok(())
    }

    /// The site record, possibly inherited from the previous chained run.
    pub fn site(&self) -> Option<SiteRecord> {
        self.site
    }

    /// Records the site exported by this run.
    pub fn set_site(&mut self, site: EntityId, handle: ArtifactHandle) -> Result<(), CacheError> {
        let handle = require_valid("site", handle)?;
        self.site = Some(SiteRecord { site, handle });
        Ok(())
    }

    /// Element artifacts keyed by `(element, export type)`.
    pub fn elements(&mut self) -> &mut BidirectionalCache<IdentityKey> {
        self.elements
            .get_or_insert_with(|| BidirectionalCache::new(ELEMENTS))
    }

    /// Type object artifacts keyed by `(type element, export type, predefined type)`.
    pub fn type_objects(&mut self) -> &mut BidirectionalCache<IdentityKey> {
        self.type_objects
            .get_or_insert_with(|| BidirectionalCache::strict(TYPE_OBJECTS))
    }

    /// Material artifacts keyed by material.
    pub fn materials(&mut self) -> &mut SimpleCache<EntityId> {
        self.materials
            .get_or_insert_with(|| SimpleCache::new(MATERIALS))
    }

    /// Material layer set artifacts keyed by `(element type, direction, usage)`.
    pub fn material_layer_sets(&mut self) -> &mut SimpleCache<IdentityKey> {
        self.material_layer_sets
            .get_or_insert_with(|| SimpleCache::new(MATERIAL_LAYER_SETS))
    }

    /// Presentation style artifacts keyed by style element.
    pub fn presentation_styles(&mut self) -> &mut SimpleCache<EntityId> {
        self.presentation_styles
            .get_or_insert_with(|| SimpleCache::strict(PRESENTATION_STYLES))
    }

    /// Group records keyed by group element.
    pub fn groups(&mut self) -> &mut GroupedCache<EntityId> {
        self.groups.get_or_insert_with(|| GroupedCache::new(GROUPS))
    }

    /// Assembly records keyed by assembly element.
    pub fn assemblies(&mut self) -> &mut GroupedCache<EntityId> {
        self.assemblies
            .get_or_insert_with(|| GroupedCache::new(ASSEMBLIES))
    }

    /// The phase to export, resolved by `lookup.phase` or the document default.
    pub fn active_phase<S>(&mut self, store: &mut S) -> ExportResult<EntityId>
    where
        S: NamedStore<EntityId> + ?Sized,
    {
        self.active_phase
            .get(self.config.lookup.phase.as_deref(), store)
    }

    /// The fallback material, resolved by `lookup.default_material` or the
    /// document default.
    pub fn default_material<S>(&mut self, store: &mut S) -> ExportResult<EntityId>
    where
        S: NamedStore<EntityId> + ?Sized,
    {
        self.default_material
            .get(self.config.lookup.default_material.as_deref(), store)
    }

    /// Read-only view of the phase resolver.
    pub fn active_phase_resolver(&self) -> &LazyResolver<EntityId> {
        &self.active_phase
    }

    /// Read-only view of the default material resolver.
    pub fn default_material_resolver(&self) -> &LazyResolver<EntityId> {
        &self.default_material
    }

    /// Entry counts of every cache. Caches not yet built count as empty.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            generation: self.generation,
            elements: self.elements.as_ref().map_or(0, BidirectionalCache::len),
            type_objects: self.type_objects.as_ref().map_or(0, BidirectionalCache::len),
            materials: self.materials.as_ref().map_or(0, SimpleCache::len),
            material_layer_sets: self
                .material_layer_sets
                .as_ref()
                .map_or(0, SimpleCache::len),
            presentation_styles: self
                .presentation_styles
                .as_ref()
                .map_or(0, SimpleCache::len),
            groups: self.groups.as_ref().map_or(0, GroupedCache::len),
            assemblies: self.assemblies.as_ref().map_or(0, GroupedCache::len),
            has_site: self.site.is_some(),
        }
    }
}

impl Default for ExportContext {
    fn default() -> Self {
        Self::new(ExportConfig::default())
    }
}

fn require_valid(cache: &'static str, handle: ArtifactHandle) -> Result<ArtifactHandle, CacheError> {
    if handle.is_valid() {
        Ok(handle)
    } else {
        Err(CacheError::NullHandle { cache })
    }
}
