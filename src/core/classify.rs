// classification logic
use serde::{Deserialize, Serialize};

use crate::core::compat::is_compatible;
use crate::core::config::Registry;
use crate::core::flatten::flattening_fragment;
use crate::core::state::MappingKind;
use crate::core::types::{PropertyDescriptor, TypeExpr};

/// One classified (entity property, view-model property) pair. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMapping {
    pub entity_property: String,
    pub view_model_property: String,
    pub entity_type: TypeExpr,
    pub view_model_type: TypeExpr,
    pub kind: MappingKind,
    pub note: Option<String>,
}

/// Classify against the built-in registry.
pub fn classify(entity_prop: &PropertyDescriptor, vm_prop: &PropertyDescriptor) -> PropertyMapping {
    classify_with(Registry::builtin(), entity_prop, vm_prop)
}

pub fn derived_note(vm_name: &str) -> String {
    format!("derived: '{}' is computed on the view model", vm_name)
}

//Decision order matters, the first rule that fires wins:
// 1. Flattened    entity value object projects into the vm name
// 2. Derived      vm property is computed
// 3. Navigation   either side is a relationship
// 4. TypeMismatch types are not compatible
// 5. Matched
pub fn classify_with(
    registry: &Registry,
    entity_prop: &PropertyDescriptor,
    vm_prop: &PropertyDescriptor,
) -> PropertyMapping {
    let (kind, note) = if let Some(fragment) = flattening_fragment(registry, entity_prop, &vm_prop.name) {
        //fragment only exists for named value-object types
        let value_object = entity_prop.ty.type_name().unwrap_or_default().to_string();
        let note = format!(
            "flattened: {}.{} ({}) projected as '{}'",
            entity_prop.name, fragment, value_object, vm_prop.name
        );
        (
            MappingKind::Flattened {
                value_object,
                fragment: fragment.to_string(),
            },
            note,
        )
    } else if vm_prop.is_computed {
        (MappingKind::Derived, derived_note(&vm_prop.name))
    } else if entity_prop.is_navigation || vm_prop.is_navigation {
        (
            MappingKind::Navigation,
            format!("navigation: '{}' is a relationship property", entity_prop.name),
        )
    } else if !is_compatible(&entity_prop.ty, &vm_prop.ty) {
        (
            MappingKind::TypeMismatch {
                entity_type: entity_prop.ty.clone(),
                view_model_type: vm_prop.ty.clone(),
            },
            format!(
                "type mismatch: entity '{}' is {}, view model '{}' is {}",
                entity_prop.name, entity_prop.ty, vm_prop.name, vm_prop.ty
            ),
        )
    } else {
        (MappingKind::Matched, "matched".to_string())
    };

    PropertyMapping {
        entity_property: entity_prop.name.clone(),
        view_model_property: vm_prop.name.clone(),
        entity_type: entity_prop.ty.clone(),
        view_model_type: vm_prop.ty.clone(),
        kind,
        note: Some(note),
    }
}
