//! Index registry — the validated set of indices built for one resource type.
//!
//! The registry is built once, before any resource is added, from the
//! declarations collected by a [`SchemaBuilder`]. It is immutable afterwards.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::SetupError;
use crate::resource::Resource;
use crate::schema::{Accessor, Bound, FieldDecl, IndexRole, SchemaBuilder};

/// A named sorted scalar index.
pub struct ScalarDef<R> {
    name: String,
    accessor: Accessor<R>,
}

impl<R> ScalarDef<R> {
    /// The index name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the indexed value from `resource`.
    #[must_use]
    pub fn value(&self, resource: &R) -> f64 {
        (self.accessor)(resource)
    }
}

/// A named interval with both of its bound accessors.
pub struct IntervalDef<R> {
    name: String,
    min: Accessor<R>,
    max: Accessor<R>,
}

impl<R> IntervalDef<R> {
    /// The interval name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read `(min, max)` from `resource`.
    #[must_use]
    pub fn bounds(&self, resource: &R) -> (f64, f64) {
        ((self.min)(resource), (self.max)(resource))
    }
}

/// Validated index definitions for one resource type.
pub struct IndexRegistry<R> {
    resource_type: String,
    scalars: Vec<ScalarDef<R>>,
    intervals: Vec<IntervalDef<R>>,
}

/// An interval seen during the build scan, possibly still missing a bound.
struct PendingInterval<R> {
    name: String,
    min: Option<Accessor<R>>,
    max: Option<Accessor<R>>,
}

impl<R: Resource> IndexRegistry<R> {
    /// Build the registry declared by `R::schema`.
    ///
    /// # Errors
    ///
    /// See [`IndexRegistry::build`].
    pub fn for_type() -> Result<Self, SetupError> {
        let mut schema = SchemaBuilder::new();
        R::schema(&mut schema);
        Self::build(R::type_name(), schema.into_declarations())
    }
}

impl<R> IndexRegistry<R> {
    /// A registry with no indices.
    #[must_use]
    pub fn empty(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            scalars: Vec::new(),
            intervals: Vec::new(),
        }
    }

    /// Validate `decls` and build the registry.
    ///
    /// Scalar and interval names live in separate namespaces.
    ///
    /// # Errors
    ///
    /// - [`SetupError::NonNumericIndexedField`] if a declared value type is
    ///   not numeric.
    /// - [`SetupError::DuplicateIndexName`] if a scalar name, or one bound of
    ///   an interval, is declared twice.
    /// - [`SetupError::IncompleteInterval`] if an interval lacks a bound.
    pub fn build(
        resource_type: impl Into<String>,
        decls: impl IntoIterator<Item = FieldDecl<R>>,
    ) -> Result<Self, SetupError> {
        let resource_type = resource_type.into();
        let mut scalars: Vec<ScalarDef<R>> = Vec::new();
        let mut scalar_names = HashSet::new();
        let mut pending: Vec<PendingInterval<R>> = Vec::new();

        for decl in decls {
            if !decl.value_type.is_numeric() {
                return Err(SetupError::NonNumericIndexedField {
                    resource_type,
                    field: decl.name,
                    value_type: decl.value_type,
                });
            }

            match decl.role {
                IndexRole::Scalar => {
                    if !scalar_names.insert(decl.name.clone()) {
                        return Err(SetupError::DuplicateIndexName {
                            resource_type,
                            name: decl.name,
                        });
                    }
                    scalars.push(ScalarDef {
                        name: decl.name,
                        accessor: decl.accessor,
                    });
                }
                IndexRole::IntervalBound(bound) => {
                    let pos = match pending.iter().position(|p| p.name == decl.name) {
                        Some(pos) => pos,
                        None => {
                            pending.push(PendingInterval {
                                name: decl.name.clone(),
                                min: None,
                                max: None,
                            });
                            pending.len() - 1
                        }
                    };
                    let slot = match bound {
                        Bound::Min => &mut pending[pos].min,
                        Bound::Max => &mut pending[pos].max,
                    };
                    if slot.is_some() {
                        return Err(SetupError::DuplicateIndexName {
                            resource_type,
                            name: decl.name,
                        });
                    }
                    *slot = Some(decl.accessor);
                }
            }
        }

        let mut intervals = Vec::with_capacity(pending.len());
        for interval in pending {
            match (interval.min, interval.max) {
                (Some(min), Some(max)) => intervals.push(IntervalDef {
                    name: interval.name,
                    min,
                    max,
                }),
                (None, _) => {
                    return Err(SetupError::IncompleteInterval {
                        resource_type,
                        name: interval.name,
                        missing: Bound::Min,
                    });
                }
                (_, None) => {
                    return Err(SetupError::IncompleteInterval {
                        resource_type,
                        name: interval.name,
                        missing: Bound::Max,
                    });
                }
            }
        }

        debug!(
            resource_type = %resource_type,
            scalars = scalars.len(),
            intervals = intervals.len(),
            "index registry built"
        );

        Ok(Self {
            resource_type,
            scalars,
            intervals,
        })
    }

    /// The resource type this registry was built for.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// All scalar indices, in declaration order.
    #[must_use]
    pub fn scalars(&self) -> &[ScalarDef<R>] {
        &self.scalars
    }

    /// All intervals, in order of first declaration.
    #[must_use]
    pub fn intervals(&self) -> &[IntervalDef<R>] {
        &self.intervals
    }

    /// Look up a scalar index by name.
    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<&ScalarDef<R>> {
        self.scalars.iter().find(|s| s.name == name)
    }

    /// Look up an interval by name.
    #[must_use]
    pub fn interval(&self, name: &str) -> Option<&IntervalDef<R>> {
        self.intervals.iter().find(|i| i.name == name)
    }
}

impl<R> Clone for IndexRegistry<R> {
    fn clone(&self) -> Self {
        Self {
            resource_type: self.resource_type.clone(),
            scalars: self
                .scalars
                .iter()
                .map(|s| ScalarDef {
                    name: s.name.clone(),
                    accessor: Arc::clone(&s.accessor),
                })
                .collect(),
            intervals: self
                .intervals
                .iter()
                .map(|i| IntervalDef {
                    name: i.name.clone(),
                    min: Arc::clone(&i.min),
                    max: Arc::clone(&i.max),
                })
                .collect(),
        }
    }
}

impl<R> fmt::Debug for IndexRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexRegistry")
            .field("resource_type", &self.resource_type)
            .field("scalars", &self.scalars.iter().map(|s| &s.name).collect::<Vec<_>>())
            .field(
                "intervals",
                &self.intervals.iter().map(|i| &i.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
