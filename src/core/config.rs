// lookup registries + analyzer configuration
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::core::error::AnalysisError;

static BUILTIN: Lazy<Registry> = Lazy::new(|| {
    Registry::empty()
        .with_value_object("Address", ["Street", "City", "State", "ZipCode", "Country"])
        .with_value_object("Money", ["Amount", "Currency"])
        .with_value_object("PhoneNumber", ["CountryCode", "AreaCode", "Number"])
        .with_alias("Id", ["Id"])
        .with_alias("Name", ["Name"])
        .with_alias("Number", ["Number"])
        .with_alias("Code", ["Code"])
});

/// Value-object fragment registry and naming-alias table.
///
/// The built-in tables are created once per process and never mutated; a config can
/// produce an owned copy with extra or replaced entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    /// value-object type name -> ordered constituent field fragments
    pub value_objects: BTreeMap<String, Vec<String>>,
    /// canonical property name -> accepted aliases
    pub aliases: BTreeMap<String, Vec<String>>,
}

impl Registry {
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_value_object<I, S>(mut self, type_name: &str, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_objects
            .insert(type_name.to_string(), fragments.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_alias<I, S>(mut self, canonical: &str, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases
            .insert(canonical.to_string(), aliases.into_iter().map(Into::into).collect());
        self
    }

    //exact, case-sensitive type name
    pub fn fragments(&self, type_name: &str) -> Option<&[String]> {
        self.value_objects.get(type_name).map(Vec::as_slice)
    }

    //canonical keys are matched case-insensitively
    pub fn aliases_for(&self, name: &str) -> Option<&[String]> {
        self.aliases
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
    }

    //reverse lookup: canonical keys listing `alias` among their aliases
    pub fn canonicals_for<'s>(&'s self, alias: &'s str) -> impl Iterator<Item = &'s str> + 's {
        self.aliases
            .iter()
            .filter(move |(_, v)| v.iter().any(|a| a.eq_ignore_ascii_case(alias)))
            .map(|(k, _)| k.as_str())
    }
}

fn default_parallel() -> bool {
    true
}

/// Analyzer settings, usually decoded from a `.toon` file next to the extracted facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Start from empty tables instead of the built-in ones.
    #[serde(default)]
    pub replace_builtin: bool,
    #[serde(default)]
    pub value_objects: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            replace_builtin: false,
            value_objects: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_toon(text: &str) -> Result<Self, AnalysisError> {
        Ok(toon_format::decode_default(text)?)
    }

    //config entries override built-in entries with the same key
    pub fn registry(&self) -> Registry {
        let mut reg = if self.replace_builtin {
            Registry::empty()
        } else {
            Registry::builtin().clone()
        };
        for (k, v) in &self.value_objects {
            reg.value_objects.insert(k.clone(), v.clone());
        }
        for (k, v) in &self.aliases {
            reg.aliases.insert(k.clone(), v.clone());
        }
        reg
    }
}
