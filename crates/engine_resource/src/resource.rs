//! The [`Resource`] contract.
//!
//! Every record stored in a [`ResourceSet`](crate::ResourceSet) exposes a
//! unique identity and zero or more tags. A type may additionally declare
//! scalar and interval indices through [`Resource::schema`].

use crate::schema::SchemaBuilder;

/// An identity- and tag-bearing record.
///
/// # Examples
///
/// ```rust
/// use engine_resource::{Resource, SchemaBuilder};
///
/// struct Weapon {
///     id: String,
///     tags: Vec<String>,
///     damage: f32,
///     min_range: f32,
///     max_range: f32,
/// }
///
/// impl Resource for Weapon {
///     fn type_name() -> &'static str { "Weapon" }
///     fn id(&self) -> &str { &self.id }
///     fn tags(&self) -> &[String] { &self.tags }
///
///     fn schema(schema: &mut SchemaBuilder<Self>) {
///         schema
///             .scalar("damage", |w: &Weapon| w.damage)
///             .interval("range", |w: &Weapon| w.min_range, |w: &Weapon| w.max_range);
///     }
/// }
/// ```
pub trait Resource: Sized + Send + Sync + 'static {
    /// A human-readable name for this resource type, used in errors and logs.
    fn type_name() -> &'static str;

    /// The identity of this resource, unique within its type.
    fn id(&self) -> &str;

    /// Labels attached to this resource.
    fn tags(&self) -> &[String] {
        &[]
    }

    /// Declare the indices built for this resource type.
    fn schema(_schema: &mut SchemaBuilder<Self>) {}
}
