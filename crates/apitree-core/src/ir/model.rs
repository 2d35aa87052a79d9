use indexmap::IndexMap;
use serde::Serialize;

use super::context::NamingContext;

/// Index of a model in [`Models`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ModelId(pub(crate) usize);

impl ModelId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A node reached through a named reference, or defined inline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolved<T> {
    Ref { name: String, value: T },
    Value(T),
}

impl<T> Resolved<T> {
    pub fn value(&self) -> &T {
        match self {
            Resolved::Ref { value, .. } | Resolved::Value(value) => value,
        }
    }

    /// The component name, for references.
    pub fn ref_name(&self) -> Option<&str> {
        match self {
            Resolved::Ref { name, .. } => Some(name),
            Resolved::Value(_) => None,
        }
    }

}

impl<T: Copy> Resolved<T> {
    pub fn id(&self) -> T {
        *self.value()
    }
}

/// Kind of a primitive, used as the carrier type of closed enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Int,
    Double,
    Boolean,
    String,
}

/// A scalar with its (type-checked) default.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "default", rename_all = "snake_case")]
pub enum Primitive {
    Int(Option<i64>),
    Double(Option<f64>),
    Boolean(Option<bool>),
    String(Option<String>),
}

impl Primitive {
    /// Build a primitive of `kind`, keeping `default` only if it type-checks.
    pub fn with_default(kind: PrimitiveKind, default: Option<&serde_json::Value>) -> Self {
        match kind {
            PrimitiveKind::Int => Primitive::Int(default.and_then(integral)),
            PrimitiveKind::Double => Primitive::Double(default.and_then(serde_json::Value::as_f64)),
            PrimitiveKind::Boolean => {
                Primitive::Boolean(default.and_then(serde_json::Value::as_bool))
            }
            PrimitiveKind::String => Primitive::String(
                default.and_then(|v| v.as_str().map(str::to_string)),
            ),
        }
    }

    pub fn has_default(&self) -> bool {
        match self {
            Primitive::Int(d) => d.is_some(),
            Primitive::Double(d) => d.is_some(),
            Primitive::Boolean(d) => d.is_some(),
            Primitive::String(d) => d.is_some(),
        }
    }
}

/// An integer, or a float with no fractional part (`2.0`) that fits in `i64`.
fn integral(value: &serde_json::Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// A homogeneous container; the element carries its own `Resolved` origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "element", rename_all = "snake_case")]
pub enum Collection {
    List(Resolved<ModelId>),
    Set(Resolved<ModelId>),
    /// String-keyed map.
    Map(Resolved<ModelId>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    /// Name as written in the document.
    pub name: String,
    pub model: Resolved<ModelId>,
    /// Must be present in the payload; says nothing about `null`.
    pub required: bool,
    pub nullable: bool,
    pub description: Option<String>,
    pub read_only: bool,
    pub write_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectModel {
    pub context: NamingContext,
    pub description: Option<String>,
    pub properties: Vec<Property>,
    /// `additionalProperties: true` was declared next to the named properties.
    pub additional_properties: bool,
}

impl ObjectModel {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Case {
    pub label: String,
    pub context: NamingContext,
    pub model: Resolved<ModelId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnionModel {
    pub context: NamingContext,
    pub description: Option<String>,
    pub cases: Vec<Case>,
    /// Property used to pick a case while decoding, when declared.
    pub discriminator: Option<String>,
    pub default: Option<String>,
}

/// A decoded enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumValue<'a> {
    /// Index into the declared values.
    Known(usize),
    /// An unknown value of an open enum, kept verbatim.
    Custom(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnumModel {
    Closed {
        context: NamingContext,
        inner: PrimitiveKind,
        values: Vec<String>,
        default: Option<String>,
        description: Option<String>,
    },
    Open {
        context: NamingContext,
        values: Vec<String>,
        default: Option<String>,
        description: Option<String>,
    },
}

impl EnumModel {
    pub fn context(&self) -> &NamingContext {
        match self {
            EnumModel::Closed { context, .. } | EnumModel::Open { context, .. } => context,
        }
    }

    pub fn values(&self) -> &[String] {
        match self {
            EnumModel::Closed { values, .. } | EnumModel::Open { values, .. } => values,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, EnumModel::Open { .. })
    }

    /// Map a raw payload value to a case. Unknown values only decode for open enums.
    pub fn decode<'a>(&self, raw: &'a str) -> Option<EnumValue<'a>> {
        match self.values().iter().position(|v| v == raw) {
            Some(index) => Some(EnumValue::Known(index)),
            None if self.is_open() => Some(EnumValue::Custom(raw)),
            None => None,
        }
    }

    /// The exact raw string a decoded value stands for.
    pub fn encode<'a>(&'a self, value: &EnumValue<'a>) -> Option<&'a str> {
        match value {
            EnumValue::Known(index) => self.values().get(*index).map(String::as_str),
            EnumValue::Custom(raw) if self.is_open() => Some(*raw),
            EnumValue::Custom(_) => None,
        }
    }
}

/// The IR type sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Model {
    Primitive(Primitive),
    Binary,
    FreeFormJson,
    Collection(Collection),
    Object(ObjectModel),
    Union(UnionModel),
    Enum(EnumModel),
}

impl Model {
    /// The naming context of objects, unions and enums; `None` for everything else.
    pub fn context(&self) -> Option<&NamingContext> {
        match self {
            Model::Object(o) => Some(&o.context),
            Model::Union(u) => Some(&u.context),
            Model::Enum(e) => Some(e.context()),
            Model::Primitive(_) | Model::Binary | Model::FreeFormJson | Model::Collection(_) => {
                None
            }
        }
    }
}

/// Arena of every resolved model. Children refer to each other by [`ModelId`],
/// so a referenced component exists exactly once however often it is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Models {
    nodes: Vec<Model>,
    components: IndexMap<String, ModelId>,
    /// Path segments of the route a model was created under (empty for components).
    #[serde(skip)]
    scopes: Vec<Vec<String>>,
}

impl Models {
    pub(crate) fn from_parts(
        nodes: Vec<Model>,
        components: IndexMap<String, ModelId>,
        scopes: Vec<Vec<String>>,
    ) -> Self {
        Self {
            nodes,
            components,
            scopes,
        }
    }

    pub fn get(&self, id: ModelId) -> &Model {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The id a component name resolved to.
    pub fn component(&self, name: &str) -> Option<ModelId> {
        self.components.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModelId, &Model)> {
        self.nodes.iter().enumerate().map(|(i, m)| (ModelId(i), m))
    }

    /// Models that carry a naming context, in traversal order.
    pub fn nameable(&self) -> impl Iterator<Item = (ModelId, &Model, &NamingContext)> {
        self.iter()
            .filter_map(|(id, model)| model.context().map(|ctx| (id, model, ctx)))
    }

    pub(crate) fn scope(&self, id: ModelId) -> &[String] {
        self.scopes.get(id.0).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(values: &[&str]) -> EnumModel {
        EnumModel::Open {
            context: NamingContext::named("Model"),
            values: values.iter().map(|v| v.to_string()).collect(),
            default: None,
            description: None,
        }
    }

    #[test]
    fn closed_enum_rejects_unknown_values() {
        let e = EnumModel::Closed {
            context: NamingContext::named("Status"),
            inner: PrimitiveKind::String,
            values: vec!["a".to_string(), "b".to_string()],
            default: None,
            description: None,
        };
        assert_eq!(e.decode("b"), Some(EnumValue::Known(1)));
        assert_eq!(e.decode("c"), None);
        assert_eq!(e.encode(&EnumValue::Known(0)), Some("a"));
        assert_eq!(e.encode(&EnumValue::Custom("c")), None);
    }

    #[test]
    fn open_enum_keeps_unknown_values_verbatim() {
        let e = open(&["gpt-4o"]);
        let decoded = e.decode("my-Fine_tune:v2").unwrap();
        assert_eq!(decoded, EnumValue::Custom("my-Fine_tune:v2"));
        assert_eq!(e.encode(&decoded), Some("my-Fine_tune:v2"));
    }

    #[test]
    fn defaults_only_survive_when_they_type_check() {
        let json = serde_json::json!(1.5);
        assert_eq!(
            Primitive::with_default(PrimitiveKind::Int, Some(&json)),
            Primitive::Int(None)
        );
        assert_eq!(
            Primitive::with_default(PrimitiveKind::Double, Some(&json)),
            Primitive::Double(Some(1.5))
        );
        let text = serde_json::json!("x");
        assert_eq!(
            Primitive::with_default(PrimitiveKind::Boolean, Some(&text)),
            Primitive::Boolean(None)
        );
    }

    #[test]
    fn integral_floats_are_int_defaults() {
        let two = serde_json::json!(2.0);
        assert_eq!(
            Primitive::with_default(PrimitiveKind::Int, Some(&two)),
            Primitive::Int(Some(2))
        );
        let huge = serde_json::json!(1e300);
        assert_eq!(
            Primitive::with_default(PrimitiveKind::Int, Some(&huge)),
            Primitive::Int(None)
        );
    }
}
