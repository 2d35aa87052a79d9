use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::extensions::Extensions;

/// A JSON Schema type keyword value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

/// The `type` field can be a single type or an array of types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(SchemaType),
    Multiple(Vec<SchemaType>),
}

impl TypeSet {
    /// Whether `null` is one of the declared types.
    pub fn includes_null(&self) -> bool {
        match self {
            TypeSet::Single(t) => *t == SchemaType::Null,
            TypeSet::Multiple(types) => types.contains(&SchemaType::Null),
        }
    }

    /// Declared types with `null` removed, in declaration order.
    pub fn non_null(&self) -> Vec<SchemaType> {
        match self {
            TypeSet::Single(SchemaType::Null) => Vec::new(),
            TypeSet::Single(t) => vec![*t],
            TypeSet::Multiple(types) => types
                .iter()
                .copied()
                .filter(|t| *t != SchemaType::Null)
                .collect(),
        }
    }
}

/// A reference or inline schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Schema(Box<Schema>),
}

impl SchemaOrRef {
    /// The inline schema, if this is not a reference.
    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            SchemaOrRef::Schema(s) => Some(s),
            SchemaOrRef::Ref { .. } => None,
        }
    }

    /// An inline schema that only admits `null` (`type: null` or `nullable` with no type).
    pub fn is_null_schema(&self) -> bool {
        match self {
            SchemaOrRef::Schema(s) => {
                matches!(&s.schema_type, Some(t) if t.non_null().is_empty() && t.includes_null())
            }
            SchemaOrRef::Ref { .. } => false,
        }
    }
}

/// Discriminator for polymorphic schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discriminator {
    #[serde(rename = "propertyName")]
    pub property_name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub mapping: IndexMap<String, String>,
}

/// A JSON Schema object, restricted to the keywords resolution looks at.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    // Object properties
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<AdditionalProperties>,

    // Array items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,

    #[serde(rename = "uniqueItems", skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    // Composition
    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaOrRef>,

    #[serde(rename = "oneOf", default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaOrRef>,

    #[serde(rename = "anyOf", default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,

    // An explicitly empty `enum` list is kept distinct from an absent one.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,

    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<serde_json::Value>,

    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(rename = "writeOnly", skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,

    #[serde(flatten, default, skip_serializing_if = "IndexMap::is_empty")]
    pub extensions: Extensions,
}

impl Schema {
    /// `nullable: true`, or `null` among the declared types.
    pub fn is_nullable(&self) -> bool {
        self.nullable.unwrap_or(false)
            || self
                .schema_type
                .as_ref()
                .is_some_and(TypeSet::includes_null)
    }

    /// The composition list of a `oneOf`/`anyOf` node, `oneOf` taking precedence.
    pub fn composition(&self) -> &[SchemaOrRef] {
        if !self.one_of.is_empty() {
            &self.one_of
        } else {
            &self.any_of
        }
    }

    /// The single non-null branch of a composition that only adds nullability,
    /// e.g. `oneOf: [{$ref: Foo}, {type: null}]`.
    pub fn nullable_wrapper(&self) -> Option<&SchemaOrRef> {
        let branches = self.composition();
        if branches.len() < 2 || !branches.iter().any(SchemaOrRef::is_null_schema) {
            return None;
        }
        let mut non_null = branches.iter().filter(|b| !b.is_null_schema());
        match (non_null.next(), non_null.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }
}

/// `additionalProperties` can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<SchemaOrRef>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nullable_type_list() {
        let schema: Schema = serde_yaml_ng::from_str("type: [string, 'null']").unwrap();
        assert!(schema.is_nullable());
        assert_eq!(
            schema.schema_type.unwrap().non_null(),
            vec![SchemaType::String]
        );
    }

    #[test]
    fn keeps_vendor_extensions() {
        let schema: Schema =
            serde_yaml_ng::from_str("type: string\nenum: [a]\nx-extensible-enum: true").unwrap();
        assert_eq!(
            schema.extensions.get("x-extensible-enum"),
            Some(&serde_json::Value::Bool(true))
        );
    }

    #[test]
    fn documentation_keywords_are_not_vendor_extensions() {
        let schema: Schema =
            serde_yaml_ng::from_str("type: string\ntitle: Name\nexample: rex").unwrap();
        assert_eq!(schema.schema_type, Some(TypeSet::Single(SchemaType::String)));
        assert!(crate::parse::extensions::vendor(&schema.extensions).is_empty());
    }

    #[test]
    fn detects_nullable_wrapper() {
        let yaml = r##"
oneOf:
  - $ref: '#/components/schemas/Pet'
  - type: 'null'
"##;
        let schema: Schema = serde_yaml_ng::from_str(yaml).unwrap();
        let inner = schema.nullable_wrapper().expect("should unwrap");
        assert!(matches!(inner, SchemaOrRef::Ref { ref_path } if ref_path.ends_with("/Pet")));
    }

    #[test]
    fn empty_enum_is_distinct_from_absent() {
        let schema: Schema = serde_yaml_ng::from_str("type: string\nenum: []").unwrap();
        assert_eq!(schema.enum_values, Some(vec![]));
        let schema: Schema = serde_yaml_ng::from_str("type: string").unwrap();
        assert_eq!(schema.enum_values, None);
    }
}
