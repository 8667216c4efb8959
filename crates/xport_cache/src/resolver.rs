//! Memoized resolution of shared document singletons.
//!
//! A resolver walks an ordered chain of [`Strategy`] values until one yields
//! a value, then keeps that value until [`LazyResolver::invalidate`] is
//! called. A failing named lookup counts as "not found"; a failing default
//! construction aborts the call and leaves the resolver unresolved.

use std::fmt;

use tracing::{debug, warn};
use xport_common::{ExportResult, InternalError};

use crate::error::StoreError;

/// Document-scoped store a resolver draws its value from.
pub trait NamedStore<T> {
    /// Searches the store for an object called `name`.
    fn find_by_name(&self, name: &str) -> Result<Option<T>, StoreError>;

    /// Returns the store's default object, creating it if necessary.
    fn get_or_create_default(&mut self) -> ExportResult<T>;
}

/// One step of the resolution chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Look the configured name up in the store.
    NamedLookup,
    /// Fetch or construct the document default.
    DocumentDefault,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::NamedLookup => f.write_str("named lookup"),
            Strategy::DocumentDefault => f.write_str("document default"),
        }
    }
}

/// Strategies in the order they are tried.
pub const RESOLUTION_CHAIN: [Strategy; 2] = [Strategy::NamedLookup, Strategy::DocumentDefault];

/// Resolver state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution<T> {
    /// Nothing cached; the next `get` runs the chain.
    Unresolved,
    /// Cached value and the strategy that produced it.
    Resolved(T, Strategy),
}

/// A memoized getter for one shared singleton.
#[derive(Debug)]
pub struct LazyResolver<T> {
    name: &'static str,
    state: Resolution<T>,
}

impl<T: Clone + fmt::Debug> LazyResolver<T> {
    /// Creates an unresolved resolver.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Resolution::Unresolved,
        }
    }

    /// The resolver's name, used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the cached value, resolving it first if needed.
    ///
    /// `lookup_name` is read on every unresolved call, so a changed
    /// configuration takes effect after [`invalidate`](Self::invalidate).
    ///
    /// # Errors
    ///
    /// Propagates the error of [`NamedStore::get_or_create_default`].
    pub fn get<S>(&mut self, lookup_name: Option<&str>, store: &mut S) -> ExportResult<T>
    where
        S: NamedStore<T> + ?Sized,
    {
        if let Resolution::Resolved(value, _) = &self.state {
            return Ok(value.clone());
        }
        for strategy in RESOLUTION_CHAIN {
            if let Some(value) = self.attempt(strategy, lookup_name, store)? {
                debug!(resolver = self.name, %strategy, ?value, "resolved");
                self.state = Resolution::Resolved(value.clone(), strategy);
                return Ok(value);
            }
        }
        Err(InternalError::unresolved(
            self.name,
            "resolution chain exhausted",
        ))
    }

    fn attempt<S>(
        &self,
        strategy: Strategy,
        lookup_name: Option<&str>,
        store: &mut S,
    ) -> ExportResult<Option<T>>
    where
        S: NamedStore<T> + ?Sized,
    {
        match strategy {
            Strategy::NamedLookup => {
                let Some(name) = lookup_name else {
                    return Ok(None);
                };
                match store.find_by_name(name) {
                    Ok(found) => Ok(found),
                    Err(err) => {
                        warn!(resolver = self.name, lookup = name, %err, "named lookup failed, falling back");
                        Ok(None)
                    }
                }
            }
            Strategy::DocumentDefault => store.get_or_create_default().map(Some),
        }
    }

    /// Discards the cached value.
    pub fn invalidate(&mut self) {
        self.state = Resolution::Unresolved;
    }

    /// Returns `true` if a value is cached.
    pub fn is_resolved(&self) -> bool {
        matches!(self.state, Resolution::Resolved(..))
    }

    /// Returns the cached value without resolving.
    pub fn peek(&self) -> Option<T> {
        match &self.state {
            Resolution::Resolved(value, _) => Some(value.clone()),
            Resolution::Unresolved => None,
        }
    }

    /// Returns a copy of the current state.
    pub fn state(&self) -> Resolution<T> {
        self.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;
    use xport_common::EntityId;

    #[derive(Default)]
    struct PhaseStore {
        named: HashMap<String, EntityId>,
        default: Option<EntityId>,
        unavailable: bool,
        lookups: Cell<usize>,
        defaults: usize,
    }

    impl NamedStore<EntityId> for PhaseStore {
        fn find_by_name(&self, name: &str) -> Result<Option<EntityId>, StoreError> {
            self.lookups.set(self.lookups.get() + 1);
            if self.unavailable {
                return Err(StoreError::Unavailable {
                    reason: "no open document".to_string(),
                });
            }
            Ok(self.named.get(name).copied())
        }

        fn get_or_create_default(&mut self) -> ExportResult<EntityId> {
            self.defaults += 1;
            self.default
                .ok_or_else(|| InternalError::new("document has no phases"))
        }
    }

    fn store() -> PhaseStore {
        let mut named = HashMap::new();
        named.insert("Existing".to_string(), EntityId::from_raw(1));
        PhaseStore {
            named,
            default: Some(EntityId::from_raw(99)),
            ..PhaseStore::default()
        }
    }

    #[test]
    fn named_lookup_wins() {
        let mut store = store();
        let mut resolver: LazyResolver<EntityId> = LazyResolver::new("active_phase");
        assert_eq!(resolver.get(Some("Existing"), &mut store).unwrap(), EntityId::from_raw(1));
        assert_eq!(
            resolver.state(),
            Resolution::Resolved(EntityId::from_raw(1), Strategy::NamedLookup)
        );
        assert_eq!(store.defaults, 0);
    }

    #[test]
    fn missing_name_falls_back_to_default() {
        let mut store = store();
        let mut resolver: LazyResolver<EntityId> = LazyResolver::new("active_phase");
        assert_eq!(resolver.get(Some("Demolished"), &mut store).unwrap(), EntityId::from_raw(99));
        assert_eq!(store.lookups.get(), 1);
        assert_eq!(store.defaults, 1);
    }

    #[test]
    fn no_configured_name_skips_lookup() {
        let mut store = store();
        let mut resolver: LazyResolver<EntityId> = LazyResolver::new("active_phase");
        assert_eq!(resolver.get(None, &mut store).unwrap(), EntityId::from_raw(99));
        assert_eq!(store.lookups.get(), 0);
    }

    #[test]
    fn store_failure_is_treated_as_not_found() {
        let mut store = PhaseStore {
            unavailable: true,
            ..store()
        };
        let mut resolver: LazyResolver<EntityId> = LazyResolver::new("active_phase");
        assert_eq!(resolver.get(Some("Existing"), &mut store).unwrap(), EntityId::from_raw(99));
        assert_eq!(
            resolver.state(),
            Resolution::Resolved(EntityId::from_raw(99), Strategy::DocumentDefault)
        );
    }

    #[test]
    fn memoized_until_invalidated() {
        let mut store = store();
        let mut resolver: LazyResolver<EntityId> = LazyResolver::new("active_phase");
        let first = resolver.get(Some("Existing"), &mut store).unwrap();
        let second = resolver.get(Some("Existing"), &mut store).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.lookups.get(), 1);

        resolver.invalidate();
        assert!(!resolver.is_resolved());
        resolver.get(Some("Existing"), &mut store).unwrap();
        assert_eq!(store.lookups.get(), 2);
    }

    #[test]
    fn reresolution_sees_new_name() {
        let mut store = store();
        let mut resolver: LazyResolver<EntityId> = LazyResolver::new("active_phase");
        assert_eq!(resolver.get(Some("Existing"), &mut store).unwrap(), EntityId::from_raw(1));
        // Without invalidation a different name is not consulted.
        assert_eq!(resolver.get(None, &mut store).unwrap(), EntityId::from_raw(1));
        resolver.invalidate();
        assert_eq!(resolver.get(None, &mut store).unwrap(), EntityId::from_raw(99));
    }

    #[test]
    fn default_failure_propagates_and_stays_unresolved() {
        let mut store = PhaseStore {
            default: None,
            ..store()
        };
        let mut resolver: LazyResolver<EntityId> = LazyResolver::new("active_phase");
        let err = resolver.get(Some("Missing"), &mut store).unwrap_err();
        assert!(err.message.contains("no phases"));
        assert!(!resolver.is_resolved());
        assert_eq!(resolver.peek(), None);
    }

    #[test]
    fn peek_does_not_resolve() {
        let mut store = store();
        let mut resolver: LazyResolver<EntityId> = LazyResolver::new("active_phase");
        assert_eq!(resolver.peek(), None);
        resolver.get(None, &mut store).unwrap();
        assert_eq!(resolver.peek(), Some(EntityId::from_raw(99)));
    }
}
