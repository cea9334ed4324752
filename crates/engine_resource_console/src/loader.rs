//! JSON schema and resource loading.
//!
//! Resources read from JSON carry arbitrary fields, so their indices cannot
//! be declared in code. A schema file names, per index, the JSON field it
//! reads and that field's declared type; the declarations are validated by
//! [`IndexRegistry::build`] exactly like typed ones.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use engine_resource::{
    Bound, FieldDecl, IndexRegistry, IndexRole, Resource, ResourceSet, ResourceSetConfig,
    SetupError, ValueType,
};

/// A resource loaded from JSON: identity, tags and every other field as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResource {
    pub id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl JsonResource {
    /// Read `field` as a number. Missing and non-numeric values read as NaN.
    #[must_use]
    pub fn number(&self, field: &str) -> f64 {
        self.fields
            .get(field)
            .and_then(Value::as_f64)
            .unwrap_or(f64::NAN)
    }
}

impl Resource for JsonResource {
    fn type_name() -> &'static str {
        "JsonResource"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// A scalar index read from one JSON field.
#[derive(Debug, Clone, Deserialize)]
pub struct ScalarSpec {
    pub name: String,
    /// Source field; defaults to the index name.
    #[serde(default)]
    pub field: Option<String>,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

/// One bound of an interval read from one JSON field.
#[derive(Debug, Clone, Deserialize)]
pub struct BoundSpec {
    pub name: String,
    pub bound: Bound,
    pub field: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

/// Index declarations for a JSON resource file.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaFile {
    pub resource_type: String,
    #[serde(default)]
    pub scalars: Vec<ScalarSpec>,
    #[serde(default)]
    pub intervals: Vec<BoundSpec>,
}

impl SchemaFile {
    /// Parse a schema from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid schema document.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid schema document")
    }

    /// Read and parse a schema file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read schema {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }

    /// The declarations described by this schema, in file order.
    #[must_use]
    pub fn declarations(&self) -> Vec<FieldDecl<JsonResource>> {
        let scalars = self.scalars.iter().map(|spec| {
            let field = spec.field.clone().unwrap_or_else(|| spec.name.clone());
            FieldDecl::new(
                spec.name.clone(),
                IndexRole::Scalar,
                spec.value_type,
                move |r: &JsonResource| r.number(&field),
            )
        });
        let bounds = self.intervals.iter().map(|spec| {
            let field = spec.field.clone();
            FieldDecl::new(
                spec.name.clone(),
                IndexRole::IntervalBound(spec.bound),
                spec.value_type,
                move |r: &JsonResource| r.number(&field),
            )
        });
        scalars.chain(bounds).collect()
    }

    /// Validate the declarations into a registry.
    ///
    /// # Errors
    ///
    /// Returns a [`SetupError`] if the declarations are invalid.
    pub fn registry(&self) -> Result<IndexRegistry<JsonResource>, SetupError> {
        IndexRegistry::build(self.resource_type.clone(), self.declarations())
    }
}

/// Parse a JSON array of resources.
///
/// # Errors
///
/// Returns an error if the text is not an array of resource objects.
pub fn parse_resources(text: &str) -> Result<Vec<JsonResource>> {
    serde_json::from_str(text).context("invalid resource document")
}

/// Build a resource set from a schema and resource files.
///
/// # Errors
///
/// Returns an error if either file cannot be read or parsed, the schema is
/// invalid, or a resource has no identity.
pub fn load_set(
    schema_path: &Path,
    resources_path: &Path,
    config: &ResourceSetConfig,
) -> Result<ResourceSet<JsonResource>> {
    let schema = SchemaFile::load(schema_path)?;
    let text = std::fs::read_to_string(resources_path)
        .with_context(|| format!("failed to read resources {}", resources_path.display()))?;
    let resources =
        parse_resources(&text).with_context(|| format!("in {}", resources_path.display()))?;
    build_set(&schema, resources, config)
}

/// Build a resource set from already parsed inputs.
///
/// # Errors
///
/// Returns an error if the schema is invalid or a resource has no identity.
pub fn build_set(
    schema: &SchemaFile,
    resources: Vec<JsonResource>,
    config: &ResourceSetConfig,
) -> Result<ResourceSet<JsonResource>> {
    let mut set = ResourceSet::new(schema.registry()?, config);
    let count = resources.len();
    for resource in resources {
        set.add(resource)?;
    }
    info!(
        resource_type = %schema.resource_type,
        loaded = count,
        distinct = set.len(),
        "resources loaded"
    );
    Ok(set)
}
