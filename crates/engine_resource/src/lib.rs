//! # engine_resource
//!
//! Typed resource storage for the engine. Resources are identity- and
//! tag-bearing records loaded once and queried many times.
//!
//! This crate provides:
//!
//! - [`Resource`] trait — the contract every stored record satisfies.
//! - [`SchemaBuilder`] — explicit declaration of scalar and interval indices.
//! - [`IndexRegistry`] — the validated index definitions of one type.
//! - [`ResourceSet`] — per-type storage with identity, tag, scalar and
//!   interval lookups into caller-owned buffers.
//! - [`ResourceCatalog`] — one set per resource type.
//! - [`IndexKey`] — the NaN-aware total order used by scalar indices.
//!
//! ## Usage
//!
//! ```rust
//! use engine_resource::{Resource, ResourceCatalog, SchemaBuilder};
//!
//! struct Zone {
//!     id: String,
//!     tags: Vec<String>,
//!     min_level: u32,
//!     max_level: u32,
//! }
//!
//! impl Resource for Zone {
//!     fn type_name() -> &'static str { "Zone" }
//!     fn id(&self) -> &str { &self.id }
//!     fn tags(&self) -> &[String] { &self.tags }
//!
//!     fn schema(schema: &mut SchemaBuilder<Self>) {
//!         schema.interval("level", |z: &Zone| z.min_level, |z: &Zone| z.max_level);
//!     }
//! }
//!
//! let catalog = ResourceCatalog::default();
//! catalog
//!     .add_resource(Zone {
//!         id: "marsh".into(),
//!         tags: vec!["outdoor".into()],
//!         min_level: 2,
//!         max_level: 6,
//!     })
//!     .unwrap();
//!
//! let hits = catalog
//!     .with_set::<Zone, _>(|zones| {
//!         let mut out = [None; 8];
//!         zones.get_by_intersect("level", 4.0, &mut out, 0)
//!     })
//!     .unwrap();
//! assert_eq!(hits, 1);
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod interval_index;
pub mod ordering;
pub mod query;
pub mod registry;
pub mod resource;
pub mod resource_set;
pub mod scalar_index;
pub mod schema;

pub use catalog::ResourceCatalog;
pub use config::ResourceSetConfig;
pub use error::SetupError;
pub use interval_index::{IntervalEntry, IntervalIndex};
pub use ordering::IndexKey;
pub use query::Query;
pub use registry::{IndexRegistry, IntervalDef, ScalarDef};
pub use resource::Resource;
pub use resource_set::ResourceSet;
pub use scalar_index::ScalarIndex;
pub use schema::{Accessor, Bound, FieldDecl, IndexRole, Numeric, SchemaBuilder, ValueType};
