//! Setup-time error types.
//!
//! Only registry construction and `add` can fail. Queries never return an
//! error: an unknown tag, index name or value simply matches nothing.

use crate::schema::{Bound, ValueType};

/// Errors raised while building an index registry or loading resources.
///
/// These indicate a broken resource type definition or broken source data
/// and should abort loading.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SetupError {
    /// An index or interval bound was declared on a field that is not numeric.
    #[error("resource type '{resource_type}': indexed field '{field}' has non-numeric type {value_type}")]
    NonNumericIndexedField {
        resource_type: String,
        field: String,
        value_type: ValueType,
    },

    /// The same scalar index name (or interval bound) was declared twice.
    #[error("resource type '{resource_type}': index '{name}' is declared more than once")]
    DuplicateIndexName { resource_type: String, name: String },

    /// An interval was declared with only one of its two bounds.
    #[error("resource type '{resource_type}': interval '{name}' is missing its {missing} bound")]
    IncompleteInterval {
        resource_type: String,
        name: String,
        missing: Bound,
    },

    /// A resource was added with an empty identity.
    #[error("resource type '{resource_type}': resource has no identity")]
    MissingIdentity { resource_type: String },
}

impl SetupError {
    /// The resource type the error was raised for.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        match self {
            Self::NonNumericIndexedField { resource_type, .. }
            | Self::DuplicateIndexName { resource_type, .. }
            | Self::IncompleteInterval { resource_type, .. }
            | Self::MissingIdentity { resource_type } => resource_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_type_and_field() {
        let err = SetupError::IncompleteInterval {
            resource_type: "Zone".into(),
            name: "range".into(),
            missing: Bound::Max,
        };
        let msg = err.to_string();
        assert!(msg.contains("Zone"));
        assert!(msg.contains("range"));
        assert!(msg.contains("max"));

        let err = SetupError::NonNumericIndexedField {
            resource_type: "Item".into(),
            field: "label".into(),
            value_type: ValueType::String,
        };
        let msg = err.to_string();
        assert!(msg.contains("Item"));
        assert!(msg.contains("label"));
        assert!(msg.contains("string"));
    }

    #[test]
    fn test_resource_type_accessor() {
        let err = SetupError::MissingIdentity {
            resource_type: "Item".into(),
        };
        assert_eq!(err.resource_type(), "Item");
    }
}
