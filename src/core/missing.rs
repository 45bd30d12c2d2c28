// missing-property scanners, one per direction
use std::collections::HashSet;

use crate::core::alias::is_aliased;
use crate::core::config::Registry;
use crate::core::flatten::find_flattening_source;
use crate::core::types::PropertyDescriptor;

/// View-model properties with no justified entity counterpart.
///
/// Skipped: computed properties, flattened value-object fields, alias-reconciled names.
/// Output keeps view-model order and holds no duplicates.
pub fn missing_in_entity(
    registry: &Registry,
    entity_props: &[PropertyDescriptor],
    vm_props: &[PropertyDescriptor],
) -> Vec<String> {
    let entity_names: HashSet<&str> = entity_props.iter().map(|p| p.name.as_str()).collect();
    let mut seen = HashSet::new();

    vm_props
        .iter()
        .filter(|v| !v.is_computed)
        .filter(|v| find_flattening_source(registry, entity_props, &v.name).is_none())
        .filter(|v| !is_aliased(registry, &v.name, entity_names.iter().copied()))
        .filter(|v| !entity_names.contains(v.name.as_str()))
        .filter(|v| seen.insert(v.name.as_str()))
        .map(|v| v.name.clone())
        .collect()
}

/// Entity properties with no justified view-model counterpart.
///
/// Skipped: inherited base-entity fields, navigation properties, alias-reconciled names.
pub fn missing_in_view_model(
    registry: &Registry,
    entity_props: &[PropertyDescriptor],
    vm_props: &[PropertyDescriptor],
) -> Vec<String> {
    let vm_names: HashSet<&str> = vm_props.iter().map(|p| p.name.as_str()).collect();
    let mut seen = HashSet::new();

    entity_props
        .iter()
        .filter(|e| !e.is_inherited)
        .filter(|e| !e.is_navigation)
        .filter(|e| !is_aliased(registry, &e.name, vm_names.iter().copied()))
        .filter(|e| !vm_names.contains(e.name.as_str()))
        .filter(|e| seen.insert(e.name.as_str()))
        .map(|e| e.name.clone())
        .collect()
}
