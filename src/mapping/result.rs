// per-pair mapping result
use serde::{Deserialize, Serialize};

use crate::core::alias::resolve_alias;
use crate::core::classify::{classify_with, PropertyMapping};
use crate::core::config::Registry;
use crate::core::error::AnalysisError;
use crate::core::flatten::find_flattening_source;
use crate::core::missing::{missing_in_entity, missing_in_view_model};
use crate::core::state::MappingKind;
use crate::core::types::{EntitySchema, ViewModelCategory, ViewModelSchema};

/// Everything learned about one (entity, view model) pair. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingResult {
    pub entity: String,
    pub view_model: String,
    pub category: ViewModelCategory,
    pub mappings: Vec<PropertyMapping>,
    pub matched: Vec<String>,
    pub missing_in_entity: Vec<String>,
    pub missing_in_view_model: Vec<String>,
    pub type_mismatched: Vec<String>,
    pub derived: Vec<String>,
    pub flattened: Vec<String>,
    pub navigation: Vec<String>,
}

impl MappingResult {
    /// Validate both schemas, pair their properties and classify each pair.
    ///
    /// Pairing walks the view model in order: exact name first, then the first entity
    /// value object that flattens into the name, then an alias-reconciled entity name.
    /// The scanners run over the full property lists, not just the paired ones.
    pub fn analyze(
        registry: &Registry,
        entity: &EntitySchema,
        view_model: &ViewModelSchema,
    ) -> Result<MappingResult, AnalysisError> {
        entity.validate()?;
        view_model.validate()?;

        let mut result = MappingResult {
            entity: entity.name.clone(),
            view_model: view_model.name.clone(),
            category: view_model.category,
            mappings: Vec::new(),
            matched: Vec::new(),
            missing_in_entity: missing_in_entity(registry, &entity.properties, &view_model.properties),
            missing_in_view_model: missing_in_view_model(registry, &entity.properties, &view_model.properties),
            type_mismatched: Vec::new(),
            derived: Vec::new(),
            flattened: Vec::new(),
            navigation: Vec::new(),
        };

        for vm_prop in &view_model.properties {
            let counterpart = entity
                .property(&vm_prop.name)
                .or_else(|| {
                    find_flattening_source(registry, &entity.properties, &vm_prop.name).map(|(p, _)| p)
                })
                .or_else(|| {
                    let names = entity.properties.iter().map(|p| p.name.as_str());
                    resolve_alias(registry, &vm_prop.name, names).and_then(|n| entity.property(n))
                });

            let Some(entity_prop) = counterpart else {
                //computed fields usually have nothing to pair with, they are still derived patterns
                if vm_prop.is_computed {
                    result.derived.push(vm_prop.name.clone());
                }
                continue;
            };

            //partition by classification; lists carry the view-model side name
            let m = classify_with(registry, entity_prop, vm_prop);
            let name = m.view_model_property.clone();
            match &m.kind {
                MappingKind::Matched => result.matched.push(name),
                MappingKind::TypeMismatch { .. } => result.type_mismatched.push(name),
                MappingKind::Derived => result.derived.push(name),
                MappingKind::Flattened { .. } => result.flattened.push(name),
                MappingKind::Navigation => result.navigation.push(name),
                MappingKind::MissingInEntity | MappingKind::MissingInViewModel => {}
            }
            result.mappings.push(m);
        }

        Ok(result)
    }

    pub fn violation_count(&self) -> usize {
        self.missing_in_entity.len() + self.missing_in_view_model.len() + self.type_mismatched.len()
    }

    pub fn is_consistent(&self) -> bool {
        self.violation_count() == 0
    }

    //one row per property: classified pairs first, then scanner output
    pub fn rows(&self) -> Vec<(String, MappingKind)> {
        let paired = self
            .mappings
            .iter()
            .map(|m| (m.view_model_property.clone(), m.kind.clone()));
        let missing_entity = self
            .missing_in_entity
            .iter()
            .map(|n| (n.clone(), MappingKind::MissingInEntity));
        let missing_vm = self
            .missing_in_view_model
            .iter()
            .map(|n| (n.clone(), MappingKind::MissingInViewModel));

        paired.chain(missing_entity).chain(missing_vm).collect()
    }

    pub fn mappings_of<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a PropertyMapping> + 'a {
        self.mappings.iter().filter(move |m| m.kind.label() == label)
    }
}
