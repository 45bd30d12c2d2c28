// boundary errors; analysis itself never fails
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A descriptor broke the caller contract (empty name, facet that contradicts its type).
    #[error("invalid descriptor '{property}' in schema '{schema}': {reason}")]
    InvalidDescriptor {
        schema: String,
        property: String,
        reason: String,
    },

    #[error("duplicate property '{property}' in schema '{schema}'")]
    DuplicateProperty { schema: String, property: String },

    /// Two entities, or two view models, share a name; names key the pairing.
    #[error("duplicate schema name '{schema}'")]
    DuplicateSchema { schema: String },
    #[error("toon codec error: {0}")]
    Toon(#[from] toon_format::ToonError),
}

impl AnalysisError {
    pub(crate) fn invalid(schema: &str, property: &str, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidDescriptor {
            schema: schema.to_string(),
            property: property.to_string(),
            reason: reason.into(),
        }
    }
}
