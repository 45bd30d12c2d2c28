// value-object flattening detector
use crate::core::config::Registry;
use crate::core::types::PropertyDescriptor;

/// First registered fragment of `entity_prop`'s value object contained in `candidate`.
///
/// Containment is a case-sensitive substring check, so `CityName` matches `City`.
/// Unregistered value objects never match.
pub fn flattening_fragment<'r>(
    registry: &'r Registry,
    entity_prop: &PropertyDescriptor,
    candidate: &str,
) -> Option<&'r str> {
    if !entity_prop.is_value_object {
        return None;
    }
    let type_name = entity_prop.ty.type_name()?;
    registry
        .fragments(type_name)?
        .iter()
        .map(String::as_str)
        .find(|fragment| candidate.contains(fragment))
}

pub fn is_flattening(registry: &Registry, entity_prop: &PropertyDescriptor, candidate: &str) -> bool {
    flattening_fragment(registry, entity_prop, candidate).is_some()
}

/// First value-object property on the entity side that flattens into `candidate`.
pub fn find_flattening_source<'a, 'r>(
    registry: &'r Registry,
    entity_props: &'a [PropertyDescriptor],
    candidate: &str,
) -> Option<(&'a PropertyDescriptor, &'r str)> {
    entity_props
        .iter()
        .find_map(|p| flattening_fragment(registry, p, candidate).map(|f| (p, f)))
}
