/*
Inputs:

    schemas.toon (entities + view models, as handed over by the extractor)

Outputs:

    pairs: (entity, view model), sorted by (entity name, view-model name)

    unpaired view models (their target entity was never supplied)

Responsibilities:

    Reject malformed input up front, including schemas that never get paired

    Resolve each view model's target entity by exact name

    Produce stable, reproducible pair order independent of input order
*/
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::core::error::AnalysisError;
use crate::core::types::{EntitySchema, ViewModelSchema};

/// Extracted schemas, as handed over by the extraction step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaBundle {
    #[serde(default)]
    pub entities: Vec<EntitySchema>,
    #[serde(default)]
    pub view_models: Vec<ViewModelSchema>,
}

impl SchemaBundle {
    pub fn from_toon(text: &str) -> Result<Self, AnalysisError> {
        Ok(toon_format::decode_default(text)?)
    }

    pub fn to_toon(&self) -> Result<String, AnalysisError> {
        Ok(toon_format::encode_default(self)?)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        validate_schemas(&self.entities, &self.view_models)
    }

    pub fn plan(&self) -> AnalysisPlan<'_> {
        AnalysisPlan::build(&self.entities, &self.view_models)
    }
}

/// Validate every schema, paired or not, and reject duplicate schema names.
pub fn validate_schemas(
    entities: &[EntitySchema],
    view_models: &[ViewModelSchema],
) -> Result<(), AnalysisError> {
    let mut seen = HashSet::new();
    for e in entities {
        e.validate()?;
        if !seen.insert(e.name.as_str()) {
            return Err(AnalysisError::DuplicateSchema {
                schema: e.name.clone(),
            });
        }
    }

    //view-model names live in their own namespace
    let mut seen = HashSet::new();
    for vm in view_models {
        vm.validate()?;
        if !seen.insert(vm.name.as_str()) {
            return Err(AnalysisError::DuplicateSchema {
                schema: vm.name.clone(),
            });
        }
    }
    Ok(())
}

/// Which (entity, view model) pairs get analysed, in merge order.
#[derive(Debug, Clone, Default)]
pub struct AnalysisPlan<'a> {
    pub pairs: Vec<(&'a EntitySchema, &'a ViewModelSchema)>,
    pub unpaired: Vec<String>,
}

impl<'a> AnalysisPlan<'a> {
    pub fn build(entities: &'a [EntitySchema], view_models: &'a [ViewModelSchema]) -> Self {
        //first entity wins on duplicate names; validate_schemas rejects them beforehand
        let mut by_name: HashMap<&str, &EntitySchema> = HashMap::new();
        for e in entities {
            by_name.entry(e.name.as_str()).or_insert(e);
        }

        let mut plan = AnalysisPlan::default();
        for vm in view_models {
            match by_name.get(vm.entity.as_str()) {
                Some(&entity) => plan.pairs.push((entity, vm)),
                None => {
                    tracing::warn!(
                        "view model '{}' targets unknown entity '{}', skipping",
                        vm.name,
                        vm.entity
                    );
                    plan.unpaired.push(vm.name.clone());
                }
            }
        }

        plan.pairs
            .sort_by(|(ea, va), (eb, vb)| (&ea.name, &va.name).cmp(&(&eb.name, &vb.name)));
        plan.unpaired.sort();
        plan
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
