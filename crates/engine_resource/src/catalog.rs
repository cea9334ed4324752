//! Resource catalog — one [`ResourceSet`] per resource type.
//!
//! The catalog routes `add_resource` / `get_resource` calls to the set for
//! the resource's Rust type, creating the set from the type's declared
//! schema on first use. Sets live in a [`DashMap`], whose per-shard
//! reader-writer locks serialise mutation against concurrent queries.

use std::any::{Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::info;

use crate::config::ResourceSetConfig;
use crate::error::SetupError;
use crate::resource::Resource;
use crate::resource_set::ResourceSet;

/// A type-erased [`ResourceSet`] plus the name of its resource type.
struct CatalogEntry {
    type_name: &'static str,
    set: Box<dyn Any + Send + Sync>,
}

impl CatalogEntry {
    fn new<R: Resource>(set: ResourceSet<R>) -> Self {
        Self {
            type_name: R::type_name(),
            set: Box::new(set),
        }
    }

    /// The set stored for `R`. Entries are keyed by `TypeId::of::<R>()`, so
    /// the downcast cannot fail for a correctly keyed entry.
    fn typed_mut<R: Resource>(&mut self) -> &mut ResourceSet<R> {
        match self.set.downcast_mut::<ResourceSet<R>>() {
            Some(set) => set,
            None => unreachable!("catalog entry for {} holds another type", self.type_name),
        }
    }
}

/// Registry of resource sets keyed by resource type.
pub struct ResourceCatalog {
    config: ResourceSetConfig,
    sets: DashMap<TypeId, CatalogEntry>,
}

impl ResourceCatalog {
    /// Create an empty catalog whose sets use `config`.
    #[must_use]
    pub fn new(config: ResourceSetConfig) -> Self {
        Self {
            config,
            sets: DashMap::new(),
        }
    }

    /// The config new sets are created with.
    #[must_use]
    pub fn config(&self) -> &ResourceSetConfig {
        &self.config
    }

    /// Build the set for `R` if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns a [`SetupError`] if `R`'s declared schema is invalid.
    pub fn register<R: Resource>(&self) -> Result<(), SetupError> {
        if let Entry::Vacant(entry) = self.sets.entry(TypeId::of::<R>()) {
            entry.insert(CatalogEntry::new(self.build_set::<R>()?));
        }
        Ok(())
    }

    /// Add `resource` to the set for its type, registering the type first if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns a [`SetupError`] if the type's schema is invalid or the
    /// resource has no identity.
    pub fn add_resource<R: Resource>(&self, resource: R) -> Result<(), SetupError> {
        match self.sets.entry(TypeId::of::<R>()) {
            Entry::Occupied(mut entry) => entry.get_mut().typed_mut::<R>().add(resource),
            Entry::Vacant(entry) => {
                let mut set = self.build_set::<R>()?;
                let added = set.add(resource);
                entry.insert(CatalogEntry::new(set));
                added
            }
        }
    }

    /// Look up a resource of type `R` by identity.
    #[must_use]
    pub fn get_resource<R: Resource>(&self, id: &str) -> Option<Arc<R>> {
        self.with_set::<R, _>(|set| set.get_shared(id)).flatten()
    }

    /// Run `f` against the set for `R` under its read lock.
    ///
    /// Returns `None` if no set exists for `R`. `f` must not mutate this
    /// catalog.
    pub fn with_set<R: Resource, T>(&self, f: impl FnOnce(&ResourceSet<R>) -> T) -> Option<T> {
        let entry = self.sets.get(&TypeId::of::<R>())?;
        entry.set.downcast_ref::<ResourceSet<R>>().map(f)
    }

    /// Returns `true` if a set exists for `R`.
    #[must_use]
    pub fn contains<R: Resource>(&self) -> bool {
        self.sets.contains_key(&TypeId::of::<R>())
    }

    /// Number of registered resource types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns `true` if no resource type is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Names of every registered resource type, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.sets.iter().map(|e| e.type_name).collect();
        names.sort_unstable();
        names
    }

    fn build_set<R: Resource>(&self) -> Result<ResourceSet<R>, SetupError> {
        let set = ResourceSet::<R>::with_config(&self.config)?;
        info!(
            resource_type = R::type_name(),
            scalars = set.registry().scalars().len(),
            intervals = set.registry().intervals().len(),
            "resource type registered"
        );
        Ok(set)
    }
}

impl Default for ResourceCatalog {
    fn default() -> Self {
        Self::new(ResourceSetConfig::default())
    }
}

impl std::fmt::Debug for ResourceCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCatalog")
            .field("config", &self.config)
            .field("types", &self.type_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaBuilder;

    struct Sound {
        id: String,
        volume: f32,
    }

    impl Resource for Sound {
        fn type_name() -> &'static str {
            "Sound"
        }

        fn id(&self) -> &str {
            &self.id
        }

        fn schema(schema: &mut SchemaBuilder<Self>) {
            schema.scalar("volume", |s: &Sound| s.volume);
        }
    }

    struct Broken {
        id: String,
    }

    impl Resource for Broken {
        fn type_name() -> &'static str {
            "Broken"
        }

        fn id(&self) -> &str {
            &self.id
        }

        fn schema(schema: &mut SchemaBuilder<Self>) {
            schema.interval_min("range", |_: &Broken| 0.0_f64);
        }
    }

    fn sound(id: &str, volume: f32) -> Sound {
        Sound {
            id: id.to_string(),
            volume,
        }
    }

    #[test]
    fn test_add_routes_to_type_set() {
        let catalog = ResourceCatalog::default();
        catalog.add_resource(sound("click", 0.5)).unwrap();
        catalog.add_resource(sound("boom", 1.0)).unwrap();

        assert!(catalog.contains::<Sound>());
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get_resource::<Sound>("boom").unwrap().volume, 1.0);
        assert!(catalog.get_resource::<Sound>("missing").is_none());
    }

    #[test]
    fn test_get_from_unregistered_type() {
        let catalog = ResourceCatalog::default();
        assert!(catalog.get_resource::<Sound>("click").is_none());
        assert!(catalog.with_set::<Sound, _>(|set| set.len()).is_none());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_register_is_idempotent() {
        let catalog = ResourceCatalog::default();
        catalog.register::<Sound>().unwrap();
        catalog.add_resource(sound("click", 0.5)).unwrap();
        catalog.register::<Sound>().unwrap();
        assert_eq!(catalog.with_set::<Sound, _>(|set| set.len()), Some(1));
        assert_eq!(catalog.type_names(), vec!["Sound"]);
    }

    #[test]
    fn test_invalid_schema_fails_registration() {
        let catalog = ResourceCatalog::default();
        let err = catalog
            .add_resource(Broken {
                id: "b".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, SetupError::IncompleteInterval { .. }));
        assert!(!catalog.contains::<Broken>());
    }

    #[test]
    fn test_bounded_query_through_catalog() {
        let catalog = ResourceCatalog::default();
        for (i, volume) in [0.1_f32, 0.5, 0.9].into_iter().enumerate() {
            catalog.add_resource(sound(&format!("s{i}"), volume)).unwrap();
        }

        let found = catalog
            .with_set::<Sound, _>(|set| {
                let mut out = [None; 4];
                let n = set.get_after_index_value("volume", 0.2, &mut out, 0);
                out[..n].iter().flatten().map(|s| s.id.clone()).collect::<Vec<_>>()
            })
            .unwrap();
        assert_eq!(found, vec!["s1", "s2"]);
    }

    #[test]
    fn test_concurrent_readers() {
        let catalog = Arc::new(ResourceCatalog::default());
        for i in 0..100 {
            catalog.add_resource(sound(&format!("s{i}"), i as f32)).unwrap();
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let catalog = Arc::clone(&catalog);
                std::thread::spawn(move || {
                    catalog
                        .with_set::<Sound, _>(|set| {
                            let mut out = [None; 16];
                            set.get_before_index_value("volume", 50.0, &mut out, 0)
                        })
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 16);
        }
    }
}
