// type compatibility engine
use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::core::types::{Primitive, TypeExpr};

//interchangeable primitive groups; a primitive belongs to exactly one
const PRIMITIVE_GROUPS: &[&[Primitive]] = &[
    &[
        Primitive::Integer,
        Primitive::Long,
        Primitive::Decimal,
        Primitive::Double,
        Primitive::Float,
    ],
    &[Primitive::String, Primitive::Char],
    &[Primitive::Boolean],
    &[Primitive::DateTime, Primitive::DateOnly],
    &[Primitive::Guid],
];

static GROUP_OF: Lazy<HashMap<Primitive, usize>> = Lazy::new(|| {
    PRIMITIVE_GROUPS
        .iter()
        .enumerate()
        .flat_map(|(idx, group)| group.iter().map(move |&p| (p, idx)))
        .collect()
});

/// Why two type expressions were judged compatible (or not).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compatibility {
    Identical,
    NullableEquivalent,
    CollectionElements,
    PrimitiveGroup,
    Incompatible,
}

impl Compatibility {
    pub fn is_compatible(self) -> bool {
        !matches!(self, Compatibility::Incompatible)
    }
}

pub fn is_compatible(a: &TypeExpr, b: &TypeExpr) -> bool {
    compatibility(a, b).is_compatible()
}

/// Symmetric in its reason as well as its verdict: every step looks at both sides.
pub fn compatibility(a: &TypeExpr, b: &TypeExpr) -> Compatibility {
    if a == b {
        return Compatibility::Identical;
    }

    //`T?` against `T`, either side
    if nullable_of(a, b) || nullable_of(b, a) {
        return Compatibility::NullableEquivalent;
    }

    match (a.without_nullable(), b.without_nullable()) {
        (TypeExpr::Collection(x), TypeExpr::Collection(y)) => {
            if is_compatible(x, y) {
                Compatibility::CollectionElements
            } else {
                Compatibility::Incompatible
            }
        }
        (TypeExpr::Collection(_), _) | (_, TypeExpr::Collection(_)) => Compatibility::Incompatible,
        (TypeExpr::Primitive(p), TypeExpr::Primitive(q)) if same_primitive_group(*p, *q) => {
            Compatibility::PrimitiveGroup
        }
        _ => Compatibility::Incompatible,
    }
}

pub fn same_primitive_group(a: Primitive, b: Primitive) -> bool {
    match (GROUP_OF.get(&a), GROUP_OF.get(&b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn nullable_of(wrapped: &TypeExpr, plain: &TypeExpr) -> bool {
    matches!(wrapped, TypeExpr::Nullable(inner) if inner.as_ref() == plain)
}
