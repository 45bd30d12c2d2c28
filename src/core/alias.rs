// naming-alias resolver
use crate::core::config::Registry;

/// True when `name` and one of `targets` are reconciled by the alias table, in either
/// direction: `name` is a key and the target one of its aliases, or `name` is an alias
/// and the target its key. Keys, aliases and targets are compared case-insensitively.
pub fn is_aliased<'a, I>(registry: &Registry, name: &str, targets: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    resolve_alias(registry, name, targets).is_some()
}

//returns the matching target name, for pairing
pub fn resolve_alias<'a, I>(registry: &Registry, name: &str, targets: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let aliases = registry.aliases_for(name).unwrap_or_default();
    let canonicals: Vec<&str> = registry.canonicals_for(name).collect();
    if aliases.is_empty() && canonicals.is_empty() {
        return None;
    }

    targets.into_iter().find(|t| {
        aliases.iter().any(|a| a.eq_ignore_ascii_case(t))
            || canonicals.iter().any(|k| k.eq_ignore_ascii_case(t))
    })
}
