//! Static consistency analysis between domain entities and the view models
//! that project them.
//!
//! Descriptors go in, per-pair [`MappingResult`]s and one [`AnalysisSummary`]
//! come out. Nothing here executes mapping code; every verdict is a heuristic
//! over property names, types and facets.

pub mod core;
pub mod mapping;

pub use crate::core::classify::{classify, PropertyMapping};
pub use crate::core::compat::is_compatible;
pub use crate::core::config::{AnalyzerConfig, Registry};
pub use crate::core::error::AnalysisError;
pub use crate::core::state::MappingKind;
pub use crate::core::types::{
    EntitySchema, Primitive, PropertyDescriptor, TypeExpr, ViewModelCategory, ViewModelSchema,
};
pub use crate::mapping::generator::{validate_schemas, AnalysisPlan, SchemaBundle};
pub use crate::mapping::result::MappingResult;
pub use crate::mapping::summary::{AnalysisSummary, Analyzer, PatternNote, SummaryStats};
