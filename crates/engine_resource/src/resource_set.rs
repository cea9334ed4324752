//! Per-type resource storage and its indices.
//!
//! A [`ResourceSet`] owns every resource of one type in an append-only
//! arena. The identity map, tag multimap, scalar indices and interval indices
//! all store arena slots. Re-adding an identity points the identity map at
//! the new slot but leaves the old slot in place: tag and index entries made
//! for the replaced resource keep returning it. Resources are expected to be
//! loaded once, so this is a known limitation rather than something `add`
//! tries to repair.
//!
//! ## Bounded queries
//!
//! Every multi-result query writes into a caller-owned buffer and returns the
//! number of entries written, never more than `out.len()`. `offset` is the
//! number of leading matches to skip, so a buffer can page through a large
//! result. To write at a position inside a larger buffer, pass a sub-slice.
//!
//! ## Concurrency
//!
//! There is no interior mutability: `add` takes `&mut self`, every query
//! takes `&self`. Once loading is finished a set can be shared freely
//! between threads for reading.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::config::ResourceSetConfig;
use crate::error::SetupError;
use crate::interval_index::IntervalIndex;
use crate::query::Query;
use crate::registry::IndexRegistry;
use crate::resource::Resource;
use crate::scalar_index::ScalarIndex;

/// All resources of one type, indexed by identity, tag, scalar value and
/// interval.
pub struct ResourceSet<R> {
    registry: IndexRegistry<R>,
    /// Every resource ever added, in insertion order.
    arena: Vec<Arc<R>>,
    ids: HashMap<String, usize>,
    tags: HashMap<String, Vec<usize>>,
    /// Parallel to `registry.scalars()`.
    scalars: Vec<ScalarIndex>,
    /// Parallel to `registry.intervals()`.
    intervals: Vec<IntervalIndex>,
}

impl<R: Resource> ResourceSet<R> {
    /// Build a set for `R` from its declared schema and the default config.
    ///
    /// # Errors
    ///
    /// Returns a [`SetupError`] if the declared schema is invalid.
    pub fn for_type() -> Result<Self, SetupError> {
        Self::with_config(&ResourceSetConfig::default())
    }

    /// Build a set for `R` from its declared schema.
    ///
    /// # Errors
    ///
    /// Returns a [`SetupError`] if the declared schema is invalid.
    pub fn with_config(config: &ResourceSetConfig) -> Result<Self, SetupError> {
        Ok(Self::new(IndexRegistry::for_type()?, config))
    }

    /// Add a resource, registering it under its identity, tags and every
    /// declared index.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::MissingIdentity`] if the identity is empty. The
    /// set is left untouched in that case.
    pub fn add(&mut self, resource: R) -> Result<(), SetupError> {
        self.add_shared(Arc::new(resource))
    }

    /// Like [`ResourceSet::add`], for a resource that is already shared.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::MissingIdentity`] if the identity is empty.
    pub fn add_shared(&mut self, resource: Arc<R>) -> Result<(), SetupError> {
        if resource.id().is_empty() {
            return Err(SetupError::MissingIdentity {
                resource_type: self.registry.resource_type().to_string(),
            });
        }

        let slot = self.arena.len();
        let id = resource.id().to_string();

        for tag in resource.tags() {
            self.tags.entry(tag.clone()).or_default().push(slot);
        }
        for (def, index) in self.registry.scalars().iter().zip(&mut self.scalars) {
            index.insert(def.value(&resource), slot);
        }
        for (def, index) in self.registry.intervals().iter().zip(&mut self.intervals) {
            let (min, max) = def.bounds(&resource);
            if !index.insert(min, max, slot) {
                warn!(
                    resource_type = self.registry.resource_type(),
                    id = %id,
                    interval = def.name(),
                    min,
                    max,
                    "interval is not finite and will never match"
                );
            }
        }

        if self.ids.insert(id.clone(), slot).is_some() {
            debug!(
                resource_type = self.registry.resource_type(),
                id = %id,
                "resource replaced; stale index entries remain"
            );
        } else {
            trace!(resource_type = self.registry.resource_type(), id = %id, "resource added");
        }
        self.arena.push(resource);
        Ok(())
    }
}

impl<R> ResourceSet<R> {
    /// Create an empty set from an already built registry.
    #[must_use]
    pub fn new(registry: IndexRegistry<R>, config: &ResourceSetConfig) -> Self {
        let scalars = registry.scalars().iter().map(|_| ScalarIndex::new()).collect();
        let intervals = registry
            .intervals()
            .iter()
            .map(|_| IntervalIndex::new(config.interval_partitions))
            .collect();
        Self {
            registry,
            arena: Vec::new(),
            ids: HashMap::new(),
            tags: HashMap::new(),
            scalars,
            intervals,
        }
    }

    /// The registry this set was built from.
    #[must_use]
    pub fn registry(&self) -> &IndexRegistry<R> {
        &self.registry
    }

    /// Number of distinct identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if no resource has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// All tags seen so far, in no particular order.
    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.tags.keys().map(String::as_str)
    }

    // -- Point queries --

    /// The resource with identity `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&R> {
        self.ids.get(id).map(|&slot| self.arena[slot].as_ref())
    }

    /// The resource with identity `id`, as a shared handle.
    #[must_use]
    pub fn get_shared(&self, id: &str) -> Option<Arc<R>> {
        self.ids.get(id).map(|&slot| Arc::clone(&self.arena[slot]))
    }

    /// Resources tagged `tag`, in insertion order.
    pub fn get_by_tag<'a>(&'a self, tag: &str, out: &mut [Option<&'a R>], offset: usize) -> usize {
        self.fill(self.tag_slots(tag).iter().copied(), out, offset)
    }

    /// Resources whose scalar index `name` equals `value`, in insertion
    /// order.
    pub fn get_by_index<'a>(
        &'a self,
        name: &str,
        value: f64,
        out: &mut [Option<&'a R>],
        offset: usize,
    ) -> usize {
        match self.scalar_index(name) {
            Some(index) => self.fill(index.bucket(value).iter().copied(), out, offset),
            None => 0,
        }
    }

    // -- Range queries --

    /// Resources whose scalar index `name` is strictly below `value`,
    /// nearest value first.
    pub fn get_before_index_value<'a>(
        &'a self,
        name: &str,
        value: f64,
        out: &mut [Option<&'a R>],
        offset: usize,
    ) -> usize {
        match self.scalar_index(name) {
            Some(index) => self.fill(index.before(value), out, offset),
            None => 0,
        }
    }

    /// Resources whose scalar index `name` is strictly above `value`,
    /// nearest value first.
    pub fn get_after_index_value<'a>(
        &'a self,
        name: &str,
        value: f64,
        out: &mut [Option<&'a R>],
        offset: usize,
    ) -> usize {
        match self.scalar_index(name) {
            Some(index) => self.fill(index.after(value), out, offset),
            None => 0,
        }
    }

    // -- Interval queries --

    /// Resources whose interval `name` contains `point`.
    pub fn get_by_intersect<'a>(
        &'a self,
        name: &str,
        point: f64,
        out: &mut [Option<&'a R>],
        offset: usize,
    ) -> usize {
        match self.interval_index(name) {
            Some(index) => self.fill(index.containing(point), out, offset),
            None => 0,
        }
    }

    /// Resources whose interval `name` overlaps `[min, max]`, touching ends
    /// included.
    pub fn get_by_intersect_range<'a>(
        &'a self,
        name: &str,
        min: f64,
        max: f64,
        out: &mut [Option<&'a R>],
        offset: usize,
    ) -> usize {
        match self.interval_index(name) {
            Some(index) => self.fill(index.overlapping(min, max), out, offset),
            None => 0,
        }
    }

    // -- Query values --

    /// Run `query` into `out` with the bounded contract.
    pub fn fill_query<'a>(&'a self, query: &Query, out: &mut [Option<&'a R>], offset: usize) -> usize {
        match query {
            Query::ById { id } => self.fill(self.ids.get(id.as_str()).copied().into_iter(), out, offset),
            Query::ByTag { tag } => self.get_by_tag(tag, out, offset),
            Query::ByIndex { name, value } => self.get_by_index(name, *value, out, offset),
            Query::BeforeIndex { name, value } => {
                self.get_before_index_value(name, *value, out, offset)
            }
            Query::AfterIndex { name, value } => {
                self.get_after_index_value(name, *value, out, offset)
            }
            Query::IntersectPoint { name, point } => {
                self.get_by_intersect(name, *point, out, offset)
            }
            Query::IntersectRange { name, min, max } => {
                self.get_by_intersect_range(name, *min, *max, out, offset)
            }
        }
    }

    /// Run `query` and collect every match.
    #[must_use]
    pub fn query(&self, query: &Query) -> Vec<&R> {
        let slots: Box<dyn Iterator<Item = usize> + '_> = match query {
            Query::ById { id } => Box::new(self.ids.get(id.as_str()).copied().into_iter()),
            Query::ByTag { tag } => Box::new(self.tag_slots(tag).iter().copied()),
            Query::ByIndex { name, value } => match self.scalar_index(name) {
                Some(index) => Box::new(index.bucket(*value).iter().copied()),
                None => Box::new(std::iter::empty()),
            },
            Query::BeforeIndex { name, value } => match self.scalar_index(name) {
                Some(index) => Box::new(index.before(*value)),
                None => Box::new(std::iter::empty()),
            },
            Query::AfterIndex { name, value } => match self.scalar_index(name) {
                Some(index) => Box::new(index.after(*value)),
                None => Box::new(std::iter::empty()),
            },
            Query::IntersectPoint { name, point } => match self.interval_index(name) {
                Some(index) => Box::new(index.containing(*point)),
                None => Box::new(std::iter::empty()),
            },
            Query::IntersectRange { name, min, max } => match self.interval_index(name) {
                Some(index) => Box::new(index.overlapping(*min, *max)),
                None => Box::new(std::iter::empty()),
            },
        };
        slots.map(|slot| self.arena[slot].as_ref()).collect()
    }

    // -- Internals --

    fn fill<'a>(
        &'a self,
        slots: impl Iterator<Item = usize>,
        out: &mut [Option<&'a R>],
        offset: usize,
    ) -> usize {
        let mut written = 0;
        for (dst, slot) in out.iter_mut().zip(slots.skip(offset)) {
            *dst = Some(self.arena[slot].as_ref());
            written += 1;
        }
        written
    }

    fn tag_slots(&self, tag: &str) -> &[usize] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    fn scalar_index(&self, name: &str) -> Option<&ScalarIndex> {
        let pos = self.registry.scalars().iter().position(|d| d.name() == name)?;
        self.scalars.get(pos)
    }

    fn interval_index(&self, name: &str) -> Option<&IntervalIndex> {
        let pos = self
            .registry
            .intervals()
            .iter()
            .position(|d| d.name() == name)?;
        self.intervals.get(pos)
    }
}

impl<R: Resource> ResourceSet<R> {
    /// Resources currently reachable by identity, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &R> + '_ {
        self.arena
            .iter()
            .enumerate()
            .filter(move |(slot, r)| self.current_slot(r) == Some(*slot))
            .map(|(_, r)| r.as_ref())
    }

    fn current_slot(&self, resource: &R) -> Option<usize> {
        self.ids.get(resource.id()).copied()
    }
}

impl<R> fmt::Debug for ResourceSet<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceSet")
            .field("registry", &self.registry)
            .field("resources", &self.ids.len())
            .field("slots", &self.arena.len())
            .field("tags", &self.tags.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaBuilder;

    #[derive(Debug)]
    struct Spawn {
        id: String,
        tags: Vec<String>,
        weight: f64,
    }

    impl Resource for Spawn {
        fn type_name() -> &'static str {
            "Spawn"
        }

        fn id(&self) -> &str {
            &self.id
        }

        fn tags(&self) -> &[String] {
            &self.tags
        }

        fn schema(schema: &mut SchemaBuilder<Self>) {
            schema
                .scalar("weight", |s: &Spawn| s.weight)
                .interval("band", |s: &Spawn| s.weight - 1.0, |s: &Spawn| s.weight + 1.0);
        }
    }

    fn spawn(id: &str, tags: &[&str], weight: f64) -> Spawn {
        Spawn {
            id: id.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            weight,
        }
    }

    fn ids(found: &[Option<&Spawn>]) -> Vec<String> {
        found.iter().flatten().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn test_add_and_get() {
        let mut set = ResourceSet::<Spawn>::for_type().unwrap();
        set.add(spawn("a", &["x"], 1.0)).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a").unwrap().weight, 1.0);
        assert!(set.get("b").is_none());
        assert_eq!(set.get_shared("a").unwrap().id, "a");
    }

    #[test]
    fn test_missing_identity_leaves_set_untouched() {
        let mut set = ResourceSet::<Spawn>::for_type().unwrap();
        let err = set.add(spawn("", &["x"], 1.0)).unwrap_err();
        assert_eq!(
            err,
            SetupError::MissingIdentity {
                resource_type: "Spawn".into(),
            }
        );
        assert!(set.is_empty());
        let mut out = [None; 4];
        assert_eq!(set.get_by_tag("x", &mut out, 0), 0);
        assert_eq!(set.get_by_index("weight", 1.0, &mut out, 0), 0);
    }

    #[test]
    fn test_replace_keeps_stale_index_entries() {
        let mut set = ResourceSet::<Spawn>::for_type().unwrap();
        set.add(spawn("a", &["old"], 1.0)).unwrap();
        set.add(spawn("a", &["new"], 2.0)).unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a").unwrap().weight, 2.0);
        assert_eq!(set.iter().count(), 1);

        let mut out = [None; 4];
        let n = set.get_by_index("weight", 1.0, &mut out, 0);
        assert_eq!(n, 1);
        assert_eq!(out[0].unwrap().weight, 1.0);
        assert_eq!(set.get_by_tag("old", &mut out, 0), 1);
    }

    #[test]
    fn test_fill_respects_offset_and_capacity() {
        let mut set = ResourceSet::<Spawn>::for_type().unwrap();
        for i in 0..5 {
            set.add(spawn(&format!("s{i}"), &["all"], 1.0)).unwrap();
        }

        let mut out = [None; 2];
        assert_eq!(set.get_by_tag("all", &mut out, 0), 2);
        assert_eq!(ids(&out), vec!["s0", "s1"]);
        assert_eq!(set.get_by_tag("all", &mut out, 2), 2);
        assert_eq!(ids(&out), vec!["s2", "s3"]);

        let mut out = [None; 2];
        assert_eq!(set.get_by_tag("all", &mut out, 4), 1);
        assert_eq!(ids(&out), vec!["s4"]);
        assert_eq!(set.get_by_tag("all", &mut out, 9), 0);
    }

    #[test]
    fn test_write_into_sub_slice() {
        let mut set = ResourceSet::<Spawn>::for_type().unwrap();
        set.add(spawn("a", &["t"], 1.0)).unwrap();
        set.add(spawn("b", &["t"], 2.0)).unwrap();

        let mut out = [None; 4];
        assert_eq!(set.get_by_tag("t", &mut out[3..], 0), 1);
        assert!(out[..3].iter().all(Option::is_none));
        assert_eq!(out[3].unwrap().id, "a");
    }

    #[test]
    fn test_unknown_names_return_nothing() {
        let mut set = ResourceSet::<Spawn>::for_type().unwrap();
        set.add(spawn("a", &["t"], 1.0)).unwrap();

        let mut out = [None; 4];
        assert_eq!(set.get_by_tag("missing", &mut out, 0), 0);
        assert_eq!(set.get_by_index("missing", 1.0, &mut out, 0), 0);
        assert_eq!(set.get_before_index_value("missing", 1.0, &mut out, 0), 0);
        assert_eq!(set.get_after_index_value("missing", 1.0, &mut out, 0), 0);
        assert_eq!(set.get_by_intersect("missing", 1.0, &mut out, 0), 0);
        assert_eq!(set.get_by_intersect_range("missing", 0.0, 2.0, &mut out, 0), 0);
        assert!(out.iter().all(Option::is_none));
    }

    #[test]
    fn test_query_values() {
        let mut set = ResourceSet::<Spawn>::for_type().unwrap();
        set.add(spawn("a", &["t"], 1.0)).unwrap();
        set.add(spawn("b", &[], 5.0)).unwrap();

        let found = set.query(&Query::ById { id: "b".into() });
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "b");

        let found = set.query(&Query::AfterIndex {
            name: "weight".into(),
            value: 1.0,
        });
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "b");

        let found = set.query(&Query::IntersectPoint {
            name: "band".into(),
            point: 1.5,
        });
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "a");

        let mut out = [None; 1];
        let query = Query::IntersectRange {
            name: "band".into(),
            min: 0.0,
            max: 10.0,
        };
        assert_eq!(set.fill_query(&query, &mut out, 1), 1);
        assert_eq!(out[0].unwrap().id, "b");
        assert_eq!(set.fill_query(&Query::ById { id: "a".into() }, &mut out, 1), 0);
    }

    #[test]
    fn test_set_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResourceSet<Spawn>>();
    }
}
