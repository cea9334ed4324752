//! Index declarations for a resource type.
//!
//! A resource type describes which of its fields are indexed by filling a
//! [`SchemaBuilder`]. Each declaration pairs a name with an accessor that
//! reads the indexed value as `f64`. Typed helpers ([`SchemaBuilder::scalar`],
//! [`SchemaBuilder::interval`], ...) derive the [`ValueType`] from the closure's
//! return type; [`SchemaBuilder::declare`] accepts declarations produced by
//! an external discovery step (for example a schema file), whose declared
//! type is only checked when the [`IndexRegistry`](crate::IndexRegistry) is
//! built.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Reads an indexed value from a resource.
pub type Accessor<R> = Arc<dyn Fn(&R) -> f64 + Send + Sync>;

/// The declared value type of an indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    String,
    Bytes,
}

impl ValueType {
    /// Returns `true` for the integer and floating point types.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Bool | Self::String | Self::Bytes)
    }

    /// The lowercase schema name of this type (e.g. `"f32"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "string",
            Self::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unrecognised value type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value type '{0}'")]
pub struct UnknownValueType(pub String);

impl FromStr for ValueType {
    type Err = UnknownValueType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "bool" => Self::Bool,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "f32" => Self::F32,
            "f64" => Self::F64,
            "string" => Self::String,
            "bytes" => Self::Bytes,
            other => return Err(UnknownValueType(other.to_string())),
        })
    }
}

/// Which end of an interval a declaration provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    Min,
    Max,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Min => "min",
            Self::Max => "max",
        })
    }
}

/// The index a declaration contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexRole {
    /// A sorted scalar index supporting exact and before/after queries.
    Scalar,
    /// One bound of a named interval.
    IntervalBound(Bound),
}

/// Rust types that can be indexed directly.
pub trait Numeric: Copy {
    /// The schema type corresponding to `Self`.
    const VALUE_TYPE: ValueType;

    /// Widen to the index representation.
    fn to_f64(self) -> f64;
}

macro_rules! impl_numeric {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Numeric for $ty {
                const VALUE_TYPE: ValueType = ValueType::$variant;

                #[allow(clippy::cast_precision_loss, clippy::cast_lossless)]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_numeric! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => I64,
    f32 => F32,
    f64 => F64,
}

/// A single index declaration.
pub struct FieldDecl<R> {
    /// Index name, or interval name for interval bounds.
    pub name: String,
    /// What the declaration contributes to.
    pub role: IndexRole,
    /// Declared type of the underlying field.
    pub value_type: ValueType,
    /// Reads the value from a resource.
    pub accessor: Accessor<R>,
}

impl<R: 'static> FieldDecl<R> {
    /// Create a declaration from its parts.
    pub fn new(
        name: impl Into<String>,
        role: IndexRole,
        value_type: ValueType,
        accessor: impl Fn(&R) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            role,
            value_type,
            accessor: Arc::new(accessor),
        }
    }
}

impl<R> Clone for FieldDecl<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            role: self.role,
            value_type: self.value_type,
            accessor: Arc::clone(&self.accessor),
        }
    }
}

impl<R> fmt::Debug for FieldDecl<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDecl")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("value_type", &self.value_type)
            .finish_non_exhaustive()
    }
}

/// Collects the index declarations of one resource type.
pub struct SchemaBuilder<R> {
    decls: Vec<FieldDecl<R>>,
}

impl<R: 'static> SchemaBuilder<R> {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { decls: Vec::new() }
    }

    /// Declare a sorted scalar index.
    pub fn scalar<T, F>(&mut self, name: impl Into<String>, accessor: F) -> &mut Self
    where
        T: Numeric,
        F: Fn(&R) -> T + Send + Sync + 'static,
    {
        self.typed(name, IndexRole::Scalar, accessor)
    }

    /// Declare the minimum bound of an interval.
    pub fn interval_min<T, F>(&mut self, name: impl Into<String>, accessor: F) -> &mut Self
    where
        T: Numeric,
        F: Fn(&R) -> T + Send + Sync + 'static,
    {
        self.typed(name, IndexRole::IntervalBound(Bound::Min), accessor)
    }

    /// Declare the maximum bound of an interval.
    pub fn interval_max<T, F>(&mut self, name: impl Into<String>, accessor: F) -> &mut Self
    where
        T: Numeric,
        F: Fn(&R) -> T + Send + Sync + 'static,
    {
        self.typed(name, IndexRole::IntervalBound(Bound::Max), accessor)
    }

    /// Declare both bounds of an interval at once.
    pub fn interval<T, Min, Max>(&mut self, name: impl Into<String>, min: Min, max: Max) -> &mut Self
    where
        T: Numeric,
        Min: Fn(&R) -> T + Send + Sync + 'static,
        Max: Fn(&R) -> T + Send + Sync + 'static,
    {
        let name = name.into();
        self.interval_min(name.clone(), min);
        self.interval_max(name, max)
    }

    /// Add an untyped declaration, as produced by external schema discovery.
    pub fn declare(&mut self, decl: FieldDecl<R>) -> &mut Self {
        self.decls.push(decl);
        self
    }

    /// The declarations collected so far, in declaration order.
    #[must_use]
    pub fn declarations(&self) -> &[FieldDecl<R>] {
        &self.decls
    }

    /// Consume the builder, returning its declarations.
    #[must_use]
    pub fn into_declarations(self) -> Vec<FieldDecl<R>> {
        self.decls
    }

    fn typed<T, F>(&mut self, name: impl Into<String>, role: IndexRole, accessor: F) -> &mut Self
    where
        T: Numeric,
        F: Fn(&R) -> T + Send + Sync + 'static,
    {
        self.declare(FieldDecl::new(name, role, T::VALUE_TYPE, move |r: &R| {
            accessor(r).to_f64()
        }))
    }
}

impl<R: 'static> Default for SchemaBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for SchemaBuilder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBuilder")
            .field("decls", &self.decls)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item {
        cost: u32,
        weight: f32,
    }

    #[test]
    fn test_value_type_numeric() {
        assert!(ValueType::F32.is_numeric());
        assert!(ValueType::I64.is_numeric());
        assert!(!ValueType::Bool.is_numeric());
        assert!(!ValueType::String.is_numeric());
        assert!(!ValueType::Bytes.is_numeric());
    }

    #[test]
    fn test_value_type_parse() {
        assert_eq!("u16".parse::<ValueType>(), Ok(ValueType::U16));
        assert_eq!("string".parse::<ValueType>(), Ok(ValueType::String));
        assert_eq!(
            "float".parse::<ValueType>(),
            Err(UnknownValueType("float".into()))
        );
    }

    #[test]
    fn test_value_type_serde_name() {
        let ty: ValueType = serde_json::from_str("\"f64\"").unwrap();
        assert_eq!(ty, ValueType::F64);
        assert_eq!(serde_json::to_string(&ValueType::I8).unwrap(), "\"i8\"");
    }

    #[test]
    fn test_typed_declarations() {
        let mut builder = SchemaBuilder::<Item>::new();
        builder
            .scalar("cost", |i: &Item| i.cost)
            .interval("weight", |i: &Item| i.weight, |i: &Item| i.weight * 2.0);

        let decls = builder.declarations();
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[0].role, IndexRole::Scalar);
        assert_eq!(decls[0].value_type, ValueType::U32);
        assert_eq!(decls[1].role, IndexRole::IntervalBound(Bound::Min));
        assert_eq!(decls[2].role, IndexRole::IntervalBound(Bound::Max));
        assert_eq!(decls[2].value_type, ValueType::F32);

        let item = Item {
            cost: 7,
            weight: 1.5,
        };
        assert_eq!((decls[0].accessor)(&item), 7.0);
        assert_eq!((decls[2].accessor)(&item), 3.0);
    }
}
