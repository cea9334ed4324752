//! Query subcommands.

use clap::Subcommand;

use engine_resource::Query;

/// The query to run against the loaded set.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Look up one resource by identity
    Get { id: String },

    /// Resources carrying a tag
    Tag { tag: String },

    /// Resources whose scalar index equals a value
    Index {
        name: String,
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },

    /// Resources whose scalar index is strictly below a value
    Before {
        name: String,
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },

    /// Resources whose scalar index is strictly above a value
    After {
        name: String,
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },

    /// Resources whose interval contains a point, or overlaps `[min, max]`
    Intersect {
        name: String,
        #[arg(allow_negative_numbers = true)]
        min: f64,
        #[arg(allow_negative_numbers = true)]
        max: Option<f64>,
    },
}

impl Command {
    /// The [`Query`] this command runs.
    #[must_use]
    pub fn to_query(&self) -> Query {
        match self.clone() {
            Self::Get { id } => Query::ById { id },
            Self::Tag { tag } => Query::ByTag { tag },
            Self::Index { name, value } => Query::ByIndex { name, value },
            Self::Before { name, value } => Query::BeforeIndex { name, value },
            Self::After { name, value } => Query::AfterIndex { name, value },
            Self::Intersect {
                name,
                min,
                max: None,
            } => Query::IntersectPoint { name, point: min },
            Self::Intersect {
                name,
                min,
                max: Some(max),
            } => Query::IntersectRange { name, min, max },
        }
    }
}
