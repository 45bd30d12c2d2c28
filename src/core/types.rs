// descriptors, type expressions and the two schema kinds
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::AnalysisError;

/// Primitive tags the compatibility engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Primitive {
    Integer,
    Long,
    Decimal,
    Double,
    Float,
    String,
    Char,
    Boolean,
    DateTime,
    DateOnly,
    Guid,
}

impl Primitive {
    pub const ALL: [Primitive; 11] = [
        Primitive::Integer,
        Primitive::Long,
        Primitive::Decimal,
        Primitive::Double,
        Primitive::Float,
        Primitive::String,
        Primitive::Char,
        Primitive::Boolean,
        Primitive::DateTime,
        Primitive::DateOnly,
        Primitive::Guid,
    ];

    //accepts source spellings (Int32, bool, ...) and the tag names themselves
    pub fn from_name(name: &str) -> Option<Primitive> {
        let p = match name.to_ascii_lowercase().as_str() {
            "int" | "int32" | "int16" | "short" | "byte" | "integer" => Primitive::Integer,
            "long" | "int64" | "long-integer" => Primitive::Long,
            "decimal" => Primitive::Decimal,
            "double" => Primitive::Double,
            "float" | "single" => Primitive::Float,
            "string" => Primitive::String,
            "char" | "character" => Primitive::Char,
            "bool" | "boolean" => Primitive::Boolean,
            "datetime" | "datetimeoffset" | "date-time" => Primitive::DateTime,
            "dateonly" | "date-only" => Primitive::DateOnly,
            "guid" | "uuid" | "unique-identifier" => Primitive::Guid,
            _ => return None,
        };
        Some(p)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Integer => "int",
            Primitive::Long => "long",
            Primitive::Decimal => "decimal",
            Primitive::Double => "double",
            Primitive::Float => "float",
            Primitive::String => "string",
            Primitive::Char => "char",
            Primitive::Boolean => "bool",
            Primitive::DateTime => "DateTime",
            Primitive::DateOnly => "DateOnly",
            Primitive::Guid => "Guid",
        }
    }
}

/// Semantic type of a property, normalised away from any source spelling.
///
/// Serializes as its canonical text (`decimal?`, `List<Guid>`), and parsing is total:
/// anything unrecognised becomes [`TypeExpr::Named`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeExpr {
    Primitive(Primitive),
    Collection(Box<TypeExpr>),
    Nullable(Box<TypeExpr>),
    Named(String),
}

const COLLECTION_WRAPPERS: &[&str] = &[
    "List",
    "IList",
    "ICollection",
    "IEnumerable",
    "IReadOnlyList",
    "IReadOnlyCollection",
    "Collection",
    "HashSet",
    "ISet",
];

impl TypeExpr {
    pub fn parse(raw: &str) -> TypeExpr {
        let s = raw.trim();

        if let Some(inner) = s.strip_suffix('?') {
            return TypeExpr::nullable(TypeExpr::parse(inner));
        }
        if let Some(inner) = s.strip_suffix("[]") {
            return TypeExpr::collection(TypeExpr::parse(inner));
        }

        if let Some((head, args)) = split_generic(s) {
            let head = strip_namespace(head);
            if head == "Nullable" {
                return TypeExpr::nullable(TypeExpr::parse(args));
            }
            if COLLECTION_WRAPPERS.contains(&head) {
                return TypeExpr::collection(TypeExpr::parse(args));
            }
            let args: Vec<String> = split_top_level(args)
                .into_iter()
                .map(|a| TypeExpr::parse(a).to_string())
                .collect();
            return TypeExpr::Named(format!("{}<{}>", head, args.join(", ")));
        }

        let bare = strip_namespace(s);
        match Primitive::from_name(bare) {
            Some(p) => TypeExpr::Primitive(p),
            None => TypeExpr::Named(bare.to_string()),
        }
    }

    pub fn named(name: impl Into<String>) -> TypeExpr {
        TypeExpr::Named(name.into())
    }

    pub fn collection(elem: TypeExpr) -> TypeExpr {
        TypeExpr::Collection(Box::new(elem))
    }

    //nullable markers do not stack: `int??` is still `int?`
    pub fn nullable(inner: TypeExpr) -> TypeExpr {
        match inner {
            TypeExpr::Nullable(_) => inner,
            other => TypeExpr::Nullable(Box::new(other)),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeExpr::Nullable(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.without_nullable(), TypeExpr::Collection(_))
    }

    pub fn without_nullable(&self) -> &TypeExpr {
        match self {
            TypeExpr::Nullable(inner) => inner,
            other => other,
        }
    }

    pub fn element(&self) -> Option<&TypeExpr> {
        match self.without_nullable() {
            TypeExpr::Collection(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self.without_nullable() {
            TypeExpr::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Type name once a nullable marker is removed, if it is a named (non-primitive) type.
    pub fn type_name(&self) -> Option<&str> {
        match self.without_nullable() {
            TypeExpr::Named(n) => Some(n.as_str()),
            _ => None,
        }
    }
}

// `System.Collections.Generic.List` -> `List`, `global::System.Guid` -> `Guid`
fn strip_namespace(s: &str) -> &str {
    s.rsplit(['.', ':']).next().unwrap_or(s).trim()
}

fn split_generic(s: &str) -> Option<(&str, &str)> {
    if !s.ends_with('>') {
        return None;
    }
    let open = s.find('<')?;
    Some((&s[..open], &s[open + 1..s.len() - 1]))
}

fn split_top_level(args: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                out.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(args[start..].trim());
    out
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Primitive(p) => f.write_str(p.keyword()),
            TypeExpr::Collection(elem) => write!(f, "List<{}>", elem),
            TypeExpr::Nullable(inner) => write!(f, "{}?", inner),
            TypeExpr::Named(n) => f.write_str(n),
        }
    }
}

impl From<String> for TypeExpr {
    fn from(s: String) -> Self {
        TypeExpr::parse(&s)
    }
}

impl From<&str> for TypeExpr {
    fn from(s: &str) -> Self {
        TypeExpr::parse(s)
    }
}

impl From<TypeExpr> for String {
    fn from(t: TypeExpr) -> Self {
        t.to_string()
    }
}

/// One property of an entity or a view model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default)]
    pub is_nullable: bool,
    #[serde(default)]
    pub is_collection: bool,
    #[serde(default)]
    pub is_navigation: bool,
    #[serde(default)]
    pub is_value_object: bool,
    #[serde(default)]
    pub is_computed: bool,
    #[serde(default)]
    pub is_flattened: bool,
    #[serde(default)]
    pub is_inherited: bool,
}

impl PropertyDescriptor {
    //nullable/collection facets follow the type; the rest start cleared
    pub fn new(name: impl Into<String>, ty: impl Into<TypeExpr>) -> Self {
        let ty = ty.into();
        Self {
            name: name.into(),
            is_nullable: ty.is_nullable(),
            is_collection: ty.is_collection(),
            ty,
            is_navigation: false,
            is_value_object: false,
            is_computed: false,
            is_flattened: false,
            is_inherited: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    pub fn navigation(mut self) -> Self {
        self.is_navigation = true;
        self
    }

    pub fn value_object(mut self) -> Self {
        self.is_value_object = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.is_computed = true;
        self
    }

    pub fn flattened(mut self) -> Self {
        self.is_flattened = true;
        self
    }

    pub fn inherited(mut self) -> Self {
        self.is_inherited = true;
        self
    }

    pub fn validate(&self, schema: &str) -> Result<(), AnalysisError> {
        if self.name.trim().is_empty() {
            return Err(AnalysisError::invalid(schema, &self.name, "property name is empty"));
        }
        if self.is_collection && !self.ty.is_collection() {
            return Err(AnalysisError::invalid(
                schema,
                &self.name,
                format!("collection facet set on non-collection type '{}'", self.ty),
            ));
        }
        Ok(())
    }
}

/// Reporting-only tag for what a view model is used for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewModelCategory {
    CreationForm,
    UpdateForm,
    DetailView,
    ListRow,
    AnalyticsSummary,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub name: String,
    pub properties: Vec<PropertyDescriptor>,
}

impl EntitySchema {
    pub fn new(name: impl Into<String>, properties: Vec<PropertyDescriptor>) -> Self {
        Self { name: name.into(), properties }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        validate_schema(&self.name, &self.properties)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModelSchema {
    pub name: String,
    /// Name of the entity this view model projects.
    pub entity: String,
    #[serde(default)]
    pub category: ViewModelCategory,
    pub properties: Vec<PropertyDescriptor>,
}

impl ViewModelSchema {
    pub fn new(
        name: impl Into<String>,
        entity: impl Into<String>,
        category: ViewModelCategory,
        properties: Vec<PropertyDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            entity: entity.into(),
            category,
            properties,
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        validate_schema(&self.name, &self.properties)
    }
}

fn validate_schema(schema: &str, properties: &[PropertyDescriptor]) -> Result<(), AnalysisError> {
    if schema.trim().is_empty() {
        return Err(AnalysisError::invalid(schema, "", "schema name is empty"));
    }

    let mut seen = HashSet::new();
    for p in properties {
        p.validate(schema)?;
        if !seen.insert(p.name.as_str()) {
            return Err(AnalysisError::DuplicateProperty {
                schema: schema.to_string(),
                property: p.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strips_namespaces_and_maps_primitives() {
        assert_eq!(TypeExpr::parse("System.Decimal"), TypeExpr::Primitive(Primitive::Decimal));
        assert_eq!(TypeExpr::parse("global::System.Guid"), TypeExpr::Primitive(Primitive::Guid));
        assert_eq!(TypeExpr::parse("Int32"), TypeExpr::Primitive(Primitive::Integer));
        assert_eq!(TypeExpr::parse("Shop.Domain.Money"), TypeExpr::named("Money"));
    }

    #[test]
    fn parse_recognises_nullable_markers() {
        let a = TypeExpr::parse("decimal?");
        let b = TypeExpr::parse("System.Nullable<System.Decimal>");
        assert_eq!(a, b);
        assert!(a.is_nullable());
        assert_eq!(a.as_primitive(), Some(Primitive::Decimal));

        //no double wrapping
        assert_eq!(TypeExpr::parse("Nullable<int?>"), TypeExpr::parse("int?"));
    }

    #[test]
    fn parse_recognises_collection_wrappers() {
        let list = TypeExpr::parse("System.Collections.Generic.List<OrderLine>");
        let arr = TypeExpr::parse("OrderLine[]");
        let coll = TypeExpr::parse("ICollection<Shop.OrderLine>");
        assert_eq!(list, arr);
        assert_eq!(list, coll);
        assert_eq!(list.element(), Some(&TypeExpr::named("OrderLine")));
        assert!(TypeExpr::parse("List<Guid>?").is_collection());
    }

    #[test]
    fn parse_keeps_other_generics_named_and_normalised() {
        let t = TypeExpr::parse("System.Collections.Generic.Dictionary<System.String, System.Int32>");
        assert_eq!(t, TypeExpr::named("Dictionary<string, int>"));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for raw in ["decimal?", "List<Guid>", "List<Money?>?", "Address", "DateTime"] {
            let t = TypeExpr::parse(raw);
            assert_eq!(TypeExpr::parse(&t.to_string()), t, "round trip failed for {raw}");
        }
    }

    #[test]
    fn new_descriptor_derives_nullable_and_collection_facets() {
        let p = PropertyDescriptor::new("Lines", "List<OrderLine>");
        assert!(p.is_collection);
        assert!(!p.is_nullable);

        let q = PropertyDescriptor::new("DueDate", "DateTime?");
        assert!(q.is_nullable);
        assert!(!q.is_collection);
    }

    #[test]
    fn validate_rejects_empty_property_name() {
        let e = EntitySchema::new("Order", vec![PropertyDescriptor::new("", "int")]);
        let err = e.validate().unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidDescriptor { .. }));
    }

    #[test]
    fn validate_rejects_collection_facet_on_scalar() {
        let mut p = PropertyDescriptor::new("Tags", "string");
        p.is_collection = true;
        let e = EntitySchema::new("Order", vec![p]);
        match e.validate().unwrap_err() {
            AnalysisError::InvalidDescriptor { property, .. } => assert_eq!(property, "Tags"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let vm = ViewModelSchema::new(
            "OrderDto",
            "Order",
            ViewModelCategory::DetailView,
            vec![PropertyDescriptor::new("Total", "decimal"), PropertyDescriptor::new("Total", "string")],
        );
        match vm.validate().unwrap_err() {
            AnalysisError::DuplicateProperty { schema, property } => {
                assert_eq!(schema, "OrderDto");
                assert_eq!(property, "Total");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
