//! The fixed query shapes a [`ResourceSet`](crate::ResourceSet) answers.

use serde::{Deserialize, Serialize};

/// One of the supported lookups, as a value.
///
/// Useful when a query arrives as data (a console command, a config file)
/// rather than as a direct method call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Query {
    /// The resource with this identity.
    ById { id: String },
    /// Resources carrying this tag, in insertion order.
    ByTag { tag: String },
    /// Resources whose scalar index `name` equals `value`.
    ByIndex { name: String, value: f64 },
    /// Resources whose scalar index `name` is strictly below `value`.
    BeforeIndex { name: String, value: f64 },
    /// Resources whose scalar index `name` is strictly above `value`.
    AfterIndex { name: String, value: f64 },
    /// Resources whose interval `name` contains `point`.
    IntersectPoint { name: String, point: f64 },
    /// Resources whose interval `name` overlaps `[min, max]`.
    IntersectRange { name: String, min: f64, max: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tagged() {
        let query: Query =
            serde_json::from_str(r#"{"kind": "intersect_range", "name": "range", "min": 0, "max": 3}"#)
                .unwrap();
        assert_eq!(
            query,
            Query::IntersectRange {
                name: "range".into(),
                min: 0.0,
                max: 3.0,
            }
        );

        let query: Query = serde_json::from_str(r#"{"kind": "by_tag", "tag": "boss"}"#).unwrap();
        assert_eq!(query, Query::ByTag { tag: "boss".into() });
    }
}
