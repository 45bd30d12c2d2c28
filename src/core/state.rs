// classification outcomes
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::TypeExpr;

/// How one property relates across an entity/view-model pair.
///
/// The classifier only ever produces the paired variants; `MissingInEntity` and
/// `MissingInViewModel` label scanner output when a result is flattened into rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MappingKind {
    Matched,
    MissingInEntity,
    MissingInViewModel,
    TypeMismatch {
        entity_type: TypeExpr,
        view_model_type: TypeExpr,
    },
    Derived,
    Flattened {
        value_object: String,
        fragment: String,
    },
    Navigation,
}

impl MappingKind {
    pub fn is_violation(&self) -> bool {
        matches!(
            self,
            MappingKind::MissingInEntity | MappingKind::MissingInViewModel | MappingKind::TypeMismatch { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            MappingKind::Matched => "matched",
            MappingKind::MissingInEntity => "missing-in-entity",
            MappingKind::MissingInViewModel => "missing-in-view-model",
            MappingKind::TypeMismatch { .. } => "type-mismatch",
            MappingKind::Derived => "derived",
            MappingKind::Flattened { .. } => "flattened",
            MappingKind::Navigation => "navigation",
        }
    }
}

impl fmt::Display for MappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_and_mismatch_are_violations() {
        let mismatch = MappingKind::TypeMismatch {
            entity_type: TypeExpr::parse("int"),
            view_model_type: TypeExpr::parse("string"),
        };
        assert!(mismatch.is_violation());
        assert!(MappingKind::MissingInEntity.is_violation());
        assert!(MappingKind::MissingInViewModel.is_violation());
        assert!(!MappingKind::Matched.is_violation());
        assert!(!MappingKind::Derived.is_violation());
        assert!(!MappingKind::Navigation.is_violation());
    }
}
