use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;

use crate::config::EnumConfig;
use crate::error::{ErrorReport, ErrorSource, ResolveError};
use crate::ir::{
    Case, Collection, EnumModel, Model, ModelId, Models, NamingContext, ObjectModel, Primitive,
    PrimitiveKind, Property, Resolved, UnionModel,
};
use crate::parse::extensions;
use crate::parse::reference::{Section, escape_token, parse_ref_name};
use crate::parse::schema::{
    AdditionalProperties, Discriminator, Schema, SchemaOrRef, SchemaType, TypeSet,
};

use super::naming::{Site, context_for};

/// Where a schema is being resolved: the naming context it would get, the
/// route path segments it was reached from, and its JSON pointer.
#[derive(Debug, Clone)]
pub struct Position<'p> {
    pub context: NamingContext,
    pub scope: &'p [String],
    pub pointer: String,
}

impl<'p> Position<'p> {
    pub fn new(context: NamingContext, scope: &'p [String], pointer: impl Into<String>) -> Self {
        Self {
            context,
            scope,
            pointer: pointer.into(),
        }
    }

    fn at(&self, pointer: String) -> Self {
        Self {
            context: self.context.clone(),
            scope: self.scope,
            pointer,
        }
    }

    fn nested(&self, context: NamingContext, pointer: String) -> Self {
        Self {
            context,
            scope: self.scope,
            pointer,
        }
    }
}

/// Arena and memo sizes to roll back to when a resolution unit fails.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    slots: usize,
    memo: usize,
}

/// Resolves raw schemas into the model arena.
///
/// Component references are memoized by name: the slot for a component is
/// reserved before its body is walked, so cyclic references land on the same
/// id instead of recursing forever.
pub struct SchemaResolver<'a> {
    schemas: &'a IndexMap<String, SchemaOrRef>,
    config: &'a EnumConfig,
    slots: Vec<Option<Model>>,
    scopes: Vec<Vec<String>>,
    memo: IndexMap<String, ModelId>,
    failed: HashSet<String>,
    /// Component aliases currently being followed, outermost first.
    aliases: Vec<String>,
    /// Unfinished components whose raw bodies are being merged into an `allOf`.
    inheriting: Vec<String>,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(schemas: &'a IndexMap<String, SchemaOrRef>, config: &'a EnumConfig) -> Self {
        Self {
            schemas,
            config,
            slots: Vec::new(),
            scopes: Vec::new(),
            memo: IndexMap::new(),
            failed: HashSet::new(),
            aliases: Vec::new(),
            inheriting: Vec::new(),
        }
    }

    /// Resolve every component schema in document order. Failing components
    /// are rolled back and recorded; the rest are kept.
    pub fn resolve_components(&mut self, report: &mut ErrorReport) {
        let schemas = self.schemas;
        for name in schemas.keys() {
            if self.memo.contains_key(name) {
                continue;
            }
            let checkpoint = self.checkpoint();
            let pointer = Section::Schemas.pointer(name);
            match self.component_id(name, &pointer, &pointer) {
                Ok(id) => log::debug!("resolved component {name} as model {}", id.index()),
                Err(err) => {
                    self.rollback(checkpoint);
                    self.failed.insert(name.clone());
                    report.push(ErrorSource::Component(name.clone()), err);
                }
            }
        }
    }

    /// Resolve a schema node found at `pos`.
    pub fn resolve(
        &mut self,
        node: &SchemaOrRef,
        pos: &Position<'_>,
    ) -> Result<Resolved<ModelId>, ResolveError> {
        let unwrapped = unwrap_transparent(node, &pos.pointer);
        match unwrapped.node {
            SchemaOrRef::Ref { ref_path } => self.resolve_ref(ref_path, &unwrapped.pointer),
            SchemaOrRef::Schema(schema) => {
                let id = self.reserve(pos.scope);
                let model = self.build(schema, &pos.at(unwrapped.pointer))?;
                self.fill(id, model);
                Ok(Resolved::Value(id))
            }
        }
    }

    /// An untyped JSON value, for nodes that declare no schema at all.
    pub fn free_form(&mut self, scope: &[String]) -> Resolved<ModelId> {
        Resolved::Value(self.push(Model::FreeFormJson, scope))
    }

    /// A plain model with no naming context, e.g. a string parameter without a schema.
    pub fn push(&mut self, model: Model, scope: &[String]) -> ModelId {
        let id = self.reserve(scope);
        self.fill(id, model);
        id
    }

    /// A model resolved so far, if its slot has been filled.
    pub fn model(&self, id: ModelId) -> Option<&Model> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            slots: self.slots.len(),
            memo: self.memo.len(),
        }
    }

    /// Drop everything created since `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.slots.truncate(checkpoint.slots);
        self.scopes.truncate(checkpoint.slots);
        self.memo.truncate(checkpoint.memo);
    }

    pub fn finish(self) -> Models {
        let nodes: Vec<Model> = self.slots.into_iter().flatten().collect();
        debug_assert_eq!(nodes.len(), self.scopes.len());
        Models::from_parts(nodes, self.memo, self.scopes)
    }

    fn reserve(&mut self, scope: &[String]) -> ModelId {
        self.slots.push(None);
        self.scopes.push(scope.to_vec());
        ModelId(self.slots.len() - 1)
    }

    fn fill(&mut self, id: ModelId, model: Model) {
        self.slots[id.0] = Some(model);
    }

    fn resolve_ref(&mut self, ref_path: &str, at: &str) -> Result<Resolved<ModelId>, ResolveError> {
        let name = parse_ref_name(ref_path, Section::Schemas, at)?;
        let id = self.component_id(name, ref_path, at)?;
        Ok(Resolved::Ref {
            name: name.to_string(),
            value: id,
        })
    }

    fn component_id(
        &mut self,
        name: &str,
        reference: &str,
        at: &str,
    ) -> Result<ModelId, ResolveError> {
        if let Some(id) = self.memo.get(name) {
            return Ok(*id);
        }
        if self.failed.contains(name) {
            return Err(ResolveError::FailedRef {
                reference: reference.to_string(),
                at: at.to_string(),
            });
        }
        if self.aliases.iter().any(|alias| alias == name) {
            let mut chain = self.aliases.clone();
            chain.push(name.to_string());
            return Err(ResolveError::CircularRef {
                chain: chain.join(" -> "),
                at: at.to_string(),
            });
        }
        let schemas = self.schemas;
        let body = schemas.get(name).ok_or_else(|| ResolveError::UnresolvedRef {
            reference: reference.to_string(),
            at: at.to_string(),
        })?;

        let pointer = Section::Schemas.pointer(name);
        let unwrapped = unwrap_transparent(body, &pointer);
        match unwrapped.node {
            SchemaOrRef::Ref { ref_path } => {
                self.aliases.push(name.to_string());
                let target = self.resolve_ref(ref_path, &unwrapped.pointer);
                self.aliases.pop();
                let id = target?.id();
                self.memo.insert(name.to_string(), id);
                Ok(id)
            }
            SchemaOrRef::Schema(schema) => {
                let id = self.reserve(&[]);
                self.memo.insert(name.to_string(), id);
                let pos = Position::new(NamingContext::named(name), &[], unwrapped.pointer);
                let aliases = std::mem::take(&mut self.aliases);
                let inheriting = std::mem::take(&mut self.inheriting);
                let model = self.build(schema, &pos);
                self.aliases = aliases;
                self.inheriting = inheriting;
                self.fill(id, model?);
                Ok(id)
            }
        }
    }

    /// Classify a schema that is neither a reference nor a transparent wrapper.
    fn build(&mut self, schema: &Schema, pos: &Position<'_>) -> Result<Model, ResolveError> {
        let types = schema
            .schema_type
            .as_ref()
            .map(TypeSet::non_null)
            .unwrap_or_default();
        let single = match types.as_slice() {
            [t] => Some(*t),
            _ => None,
        };

        if !schema.all_of.is_empty() {
            return self.build_all_of(schema, pos);
        }

        if !schema.properties.is_empty()
            || matches!(schema.additional_properties, Some(AdditionalProperties::Bool(_)))
        {
            return self.build_object(schema, pos);
        }

        if single == Some(SchemaType::Array) || (types.is_empty() && schema.items.is_some()) {
            let element = match &schema.items {
                Some(items) => self.resolve(items, &pos.at(format!("{}/items", pos.pointer)))?,
                None => self.free_form(pos.scope),
            };
            return Ok(Model::Collection(if schema.unique_items.unwrap_or(false) {
                Collection::Set(element)
            } else {
                Collection::List(element)
            }));
        }

        if let Some(AdditionalProperties::Schema(value)) = &schema.additional_properties {
            let pointer = format!("{}/additionalProperties", pos.pointer);
            let element = self.resolve(value, &pos.at(pointer))?;
            return Ok(Model::Collection(Collection::Map(element)));
        }

        if let Some(values) = string_or_enum_values(schema) {
            return Ok(Model::Enum(EnumModel::Open {
                context: pos.context.clone(),
                values,
                default: schema.default_value.as_ref().map(render_value),
                description: schema.description.clone(),
            }));
        }

        if !schema.composition().is_empty() {
            return self.build_union(schema, pos);
        }

        if let Some(raw) = enum_source(schema, &self.config.open_extensions) {
            return self.build_enum(schema, &raw, pos);
        }

        if schema.format.as_deref() == Some("binary")
            && matches!(single, None | Some(SchemaType::String))
            && types.len() <= 1
        {
            return Ok(Model::Binary);
        }

        if let Some(kind) = single.and_then(primitive_kind) {
            let primitive = Primitive::with_default(kind, schema.default_value.as_ref());
            if let Some(default) = &schema.default_value
                && !primitive.has_default()
            {
                log::debug!(
                    "dropping default {default} at {}: not a valid {kind:?}",
                    pos.pointer
                );
            }
            return Ok(Model::Primitive(primitive));
        }

        if types.len() > 1 {
            return self.build_type_union(schema, &types, pos);
        }

        Ok(Model::FreeFormJson)
    }

    fn build_object(&mut self, schema: &Schema, pos: &Position<'_>) -> Result<Model, ResolveError> {
        let mut properties = Vec::with_capacity(schema.properties.len());
        for (name, node) in &schema.properties {
            let mut property = self.property(name, node, &pos.pointer, pos)?;
            property.required = schema.required.contains(name);
            properties.push(property);
        }
        Ok(Model::Object(ObjectModel {
            context: pos.context.clone(),
            description: schema.description.clone(),
            properties,
            additional_properties: matches!(
                schema.additional_properties,
                Some(AdditionalProperties::Bool(true))
            ),
        }))
    }

    /// One property of the object whose schema sits at `parent`. Required-ness
    /// is left to the caller.
    fn property(
        &mut self,
        name: &str,
        node: &SchemaOrRef,
        parent: &str,
        pos: &Position<'_>,
    ) -> Result<Property, ResolveError> {
        let context = context_for(Site::Property {
            parent: &pos.context,
            name,
        });
        let pointer = format!("{parent}/properties/{}", escape_token(name));
        let model = self.resolve(node, &pos.nested(context, pointer))?;
        let inline = node.as_schema();
        Ok(Property {
            name: name.to_string(),
            model,
            required: false,
            nullable: nullability(node),
            description: inline.and_then(|s| s.description.clone()),
            read_only: inline.and_then(|s| s.read_only).unwrap_or(false),
            write_only: inline.and_then(|s| s.write_only).unwrap_or(false),
        })
    }

    /// Merge `allOf` branches into one object. Referenced components contribute
    /// their resolved properties, so inherited models keep their ids.
    fn build_all_of(&mut self, schema: &Schema, pos: &Position<'_>) -> Result<Model, ResolveError> {
        if !object_compatible(schema) {
            return Err(ResolveError::SchemaShape {
                reason: "allOf is combined with a non-object keyword".to_string(),
                at: pos.pointer.clone(),
            });
        }
        let mut merged = Merged::default();
        self.merge_all_of(schema, &pos.pointer, pos, &mut merged)?;
        if !merged.shaped {
            return Ok(Model::FreeFormJson);
        }
        let properties = merged
            .properties
            .into_values()
            .map(|mut p| {
                p.required |= merged.required.contains(&p.name);
                p
            })
            .collect();
        Ok(Model::Object(ObjectModel {
            context: pos.context.clone(),
            description: schema.description.clone(),
            properties,
            additional_properties: merged.additional,
        }))
    }

    /// Fold the branches of `schema`, then its own properties, into `merged`.
    /// Later definitions of a property replace earlier ones in place.
    fn merge_all_of(
        &mut self,
        schema: &Schema,
        pointer: &str,
        pos: &Position<'_>,
        merged: &mut Merged,
    ) -> Result<(), ResolveError> {
        for (i, branch) in schema.all_of.iter().enumerate() {
            let at = format!("{pointer}/allOf/{i}");
            match branch {
                SchemaOrRef::Ref { ref_path } => self.merge_component(ref_path, &at, pos, merged)?,
                SchemaOrRef::Schema(inner) if is_annotation(inner) => {}
                SchemaOrRef::Schema(inner) if object_compatible(inner) => {
                    self.merge_all_of(inner, &at, pos, merged)?
                }
                SchemaOrRef::Schema(_) => {
                    return Err(ResolveError::SchemaShape {
                        reason: "allOf branch is not an object".to_string(),
                        at,
                    });
                }
            }
        }

        let declares_object = matches!(
            schema.schema_type,
            Some(TypeSet::Single(SchemaType::Object))
        );
        if declares_object
            || !schema.properties.is_empty()
            || matches!(schema.additional_properties, Some(AdditionalProperties::Bool(_)))
        {
            merged.shaped = true;
        }
        for (name, node) in &schema.properties {
            let property = self.property(name, node, pointer, pos)?;
            merged.insert(property);
        }
        for name in &schema.required {
            if !merged.required.contains(name) {
                merged.required.push(name.clone());
            }
        }
        if matches!(schema.additional_properties, Some(AdditionalProperties::Bool(true))) {
            merged.additional = true;
        }
        Ok(())
    }

    /// Merge the resolved properties of a referenced component.
    fn merge_component(
        &mut self,
        ref_path: &str,
        at: &str,
        pos: &Position<'_>,
        merged: &mut Merged,
    ) -> Result<(), ResolveError> {
        let id = self.resolve_ref(ref_path, at)?.id();
        let (properties, additional) = match self.model(id) {
            Some(Model::Object(object)) => {
                (object.properties.clone(), object.additional_properties)
            }
            Some(Model::FreeFormJson) => return Ok(()),
            Some(_) => {
                return Err(ResolveError::SchemaShape {
                    reason: format!("allOf branch {ref_path} is not an object"),
                    at: at.to_string(),
                });
            }
            None => return self.merge_unfinished(ref_path, at, pos, merged),
        };
        merged.shaped = true;
        merged.additional |= additional;
        for property in properties {
            merged.insert(property);
        }
        Ok(())
    }

    /// A component whose body is still being built (e.g. a base schema with a
    /// property typed as one of its own subtypes) has no model yet, so its raw
    /// body is merged instead.
    fn merge_unfinished(
        &mut self,
        ref_path: &str,
        at: &str,
        pos: &Position<'_>,
        merged: &mut Merged,
    ) -> Result<(), ResolveError> {
        let mut visiting = Vec::new();
        let (name, body) = self.raw_component(ref_path, at.to_string(), &mut visiting)?;
        if self.inheriting.iter().any(|n| n == name) {
            let mut chain = self.inheriting.clone();
            chain.push(name.to_string());
            return Err(ResolveError::CircularRef {
                chain: chain.join(" -> "),
                at: at.to_string(),
            });
        }
        if !object_compatible(body) {
            return Err(ResolveError::SchemaShape {
                reason: format!("allOf branch {ref_path} is not an object"),
                at: at.to_string(),
            });
        }
        self.inheriting.push(name.to_string());
        let result = self.merge_all_of(body, &Section::Schemas.pointer(name), pos, merged);
        self.inheriting.pop();
        result
    }

    /// The raw schema behind a reference, following component aliases. Every
    /// component passed through is pushed onto `visiting`.
    fn raw_component<'s>(
        &self,
        ref_path: &'s str,
        at: String,
        visiting: &mut Vec<&'s str>,
    ) -> Result<(&'s str, &'s Schema), ResolveError>
    where
        'a: 's,
    {
        let schemas: &'a IndexMap<String, SchemaOrRef> = self.schemas;
        let mut ref_path = ref_path;
        let mut at = at;
        loop {
            let name = parse_ref_name(ref_path, Section::Schemas, &at)?;
            if visiting.contains(&name) {
                let mut chain = visiting.clone();
                chain.push(name);
                return Err(ResolveError::CircularRef {
                    chain: chain.join(" -> "),
                    at,
                });
            }
            let body = schemas.get(name).ok_or_else(|| ResolveError::UnresolvedRef {
                reference: ref_path.to_string(),
                at: at.clone(),
            })?;
            visiting.push(name);
            match body {
                SchemaOrRef::Schema(schema) => return Ok((name, &**schema)),
                SchemaOrRef::Ref { ref_path: next } => {
                    at = Section::Schemas.pointer(name);
                    ref_path = next;
                }
            }
        }
    }

    fn build_union(&mut self, schema: &Schema, pos: &Position<'_>) -> Result<Model, ResolveError> {
        let key = if schema.one_of.is_empty() { "anyOf" } else { "oneOf" };
        let discriminator = schema.discriminator.as_ref();
        let mut cases: Vec<Case> = Vec::new();
        for (i, branch) in schema.composition().iter().enumerate() {
            if branch.is_null_schema() {
                continue;
            }
            let n = cases.len() + 1;
            let mut label = case_label(branch, discriminator, n);
            if cases.iter().any(|c| c.label == label) {
                label = format!("{label}{n}");
            }
            let context = context_for(Site::Case {
                parent: &pos.context,
                label: &label,
            });
            let pointer = format!("{}/{key}/{i}", pos.pointer);
            let model = self.resolve(branch, &pos.nested(context.clone(), pointer))?;
            cases.push(Case {
                label,
                context,
                model,
            });
        }
        if cases.is_empty() {
            return Ok(Model::FreeFormJson);
        }
        Ok(Model::Union(UnionModel {
            context: pos.context.clone(),
            description: schema.description.clone(),
            cases,
            discriminator: discriminator.map(|d| d.property_name.clone()),
            default: schema.default_value.as_ref().map(render_value),
        }))
    }

    /// `type: [string, integer]`: one positional case per declared type.
    fn build_type_union(
        &mut self,
        schema: &Schema,
        types: &[SchemaType],
        pos: &Position<'_>,
    ) -> Result<Model, ResolveError> {
        let mut cases = Vec::with_capacity(types.len());
        for (i, t) in types.iter().enumerate() {
            let label = format!("Case{}", i + 1);
            let context = context_for(Site::Case {
                parent: &pos.context,
                label: &label,
            });
            let branch = Schema {
                schema_type: Some(TypeSet::Single(*t)),
                nullable: None,
                ..schema.clone()
            };
            let id = self.reserve(pos.scope);
            let model = self.build(
                &branch,
                &pos.nested(context.clone(), format!("{}/type/{i}", pos.pointer)),
            )?;
            self.fill(id, model);
            cases.push(Case {
                label,
                context,
                model: Resolved::Value(id),
            });
        }
        Ok(Model::Union(UnionModel {
            context: pos.context.clone(),
            description: schema.description.clone(),
            cases,
            discriminator: None,
            default: schema.default_value.as_ref().map(render_value),
        }))
    }

    fn build_enum(
        &self,
        schema: &Schema,
        raw: &[Value],
        pos: &Position<'_>,
    ) -> Result<Model, ResolveError> {
        let shape_error = |reason: &str| ResolveError::SchemaShape {
            reason: reason.to_string(),
            at: pos.pointer.clone(),
        };

        let mut values: Vec<String> = Vec::with_capacity(raw.len());
        let mut inner: Option<PrimitiveKind> = None;
        for value in raw {
            let kind = match value {
                Value::Null => continue,
                Value::String(_) => PrimitiveKind::String,
                Value::Bool(_) => PrimitiveKind::Boolean,
                Value::Number(n) if n.is_f64() => PrimitiveKind::Double,
                Value::Number(_) => PrimitiveKind::Int,
                Value::Array(_) | Value::Object(_) => {
                    return Err(shape_error("enum values must be scalars"));
                }
            };
            inner = match (inner, kind) {
                (None, kind) => Some(kind),
                (Some(a), b) if a == b => Some(a),
                (
                    Some(PrimitiveKind::Int | PrimitiveKind::Double),
                    PrimitiveKind::Int | PrimitiveKind::Double,
                ) => Some(PrimitiveKind::Double),
                _ => return Err(shape_error("enum mixes value types")),
            };
            let rendered = render_value(value);
            if !values.contains(&rendered) {
                values.push(rendered);
            }
        }
        let Some(inner) = inner else {
            return Err(shape_error("enum declares no values"));
        };

        let context = pos.context.clone();
        let description = schema.description.clone();
        let default = schema
            .default_value
            .as_ref()
            .filter(|v| !v.is_null())
            .map(render_value);

        if extensions::flagged(&schema.extensions, &self.config.open_extensions) {
            return Ok(Model::Enum(EnumModel::Open {
                context,
                values,
                default,
                description,
            }));
        }

        let default = match default {
            Some(d) if !values.contains(&d) => {
                log::debug!("dropping default {d} at {}: not an enum value", pos.pointer);
                None
            }
            d => d,
        };
        Ok(Model::Enum(EnumModel::Closed {
            context,
            inner,
            values,
            default,
            description,
        }))
    }
}

#[derive(Default)]
struct Merged {
    properties: IndexMap<String, Property>,
    required: Vec<String>,
    additional: bool,
    /// Some branch declared an object shape.
    shaped: bool,
}

impl Merged {
    /// Replace an earlier definition in place; required-ness accumulates.
    fn insert(&mut self, property: Property) {
        match self.properties.get_mut(&property.name) {
            Some(existing) => {
                let required = existing.required || property.required;
                *existing = Property {
                    required,
                    ..property
                };
            }
            None => {
                self.properties.insert(property.name.clone(), property);
            }
        }
    }
}

/// A node with `allOf` wrappers around one structural branch and nullable
/// `oneOf`/`anyOf` wrappers peeled off.
struct Unwrapped<'s> {
    node: &'s SchemaOrRef,
    pointer: String,
    nullable: bool,
}

fn unwrap_transparent<'s>(node: &'s SchemaOrRef, pointer: &str) -> Unwrapped<'s> {
    let mut node = node;
    let mut pointer = pointer.to_string();
    let mut nullable = false;
    while let SchemaOrRef::Schema(schema) = node {
        nullable |= schema.is_nullable();
        if !schema.properties.is_empty() {
            break;
        }
        if !schema.all_of.is_empty() {
            let Some((index, only)) = sole_structural_branch(schema) else {
                break;
            };
            nullable |= schema
                .all_of
                .iter()
                .filter_map(SchemaOrRef::as_schema)
                .any(Schema::is_nullable);
            pointer = format!("{pointer}/allOf/{index}");
            node = only;
            continue;
        }
        let Some(inner) = schema.nullable_wrapper() else {
            break;
        };
        let key = if schema.one_of.is_empty() { "anyOf" } else { "oneOf" };
        let index = schema
            .composition()
            .iter()
            .position(|b| !b.is_null_schema())
            .unwrap_or(0);
        pointer = format!("{pointer}/{key}/{index}");
        nullable = true;
        node = inner;
    }
    Unwrapped {
        node,
        pointer,
        nullable,
    }
}

/// The one `allOf` branch that is more than an annotation, when the node adds
/// no shape of its own.
fn sole_structural_branch(schema: &Schema) -> Option<(usize, &SchemaOrRef)> {
    if !schema.composition().is_empty()
        || schema.enum_values.is_some()
        || schema.const_value.is_some()
        || schema.items.is_some()
        || schema.additional_properties.is_some()
    {
        return None;
    }
    let mut structural = schema
        .all_of
        .iter()
        .enumerate()
        .filter(|(_, branch)| !branch.as_schema().is_some_and(is_annotation));
    match (structural.next(), structural.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

/// A schema that only describes (description, nullability, vendor keys)
/// without constraining the shape.
fn is_annotation(schema: &Schema) -> bool {
    schema
        .schema_type
        .as_ref()
        .is_none_or(|t| t.non_null().is_empty())
        && schema.properties.is_empty()
        && schema.additional_properties.is_none()
        && schema.items.is_none()
        && schema.all_of.is_empty()
        && schema.composition().is_empty()
        && schema.enum_values.is_none()
        && schema.const_value.is_none()
}

/// Whether a schema can take part in an `allOf` object merge.
fn object_compatible(schema: &Schema) -> bool {
    let types = schema
        .schema_type
        .as_ref()
        .map(TypeSet::non_null)
        .unwrap_or_default();
    matches!(types.as_slice(), [] | [SchemaType::Object])
        && schema.composition().is_empty()
        && schema.enum_values.is_none()
        && schema.const_value.is_none()
        && schema.items.is_none()
        && !matches!(schema.additional_properties, Some(AdditionalProperties::Schema(_)))
}

/// Whether a property or parameter admits `null`, through any of the ways a
/// document can say so.
pub(crate) fn nullability(node: &SchemaOrRef) -> bool {
    let unwrapped = unwrap_transparent(node, "");
    unwrapped.nullable
        || match unwrapped.node {
            SchemaOrRef::Schema(s) => s.enum_values.iter().flatten().any(Value::is_null),
            SchemaOrRef::Ref { .. } => false,
        }
}

/// The values of `enum`, a scalar `const`, or a list-valued open-enum extension.
fn enum_source(schema: &Schema, open_extensions: &[String]) -> Option<Vec<Value>> {
    if let Some(values) = &schema.enum_values {
        return Some(values.clone());
    }
    if let Some(value) = &schema.const_value
        && !value.is_array()
        && !value.is_object()
    {
        return Some(vec![value.clone()]);
    }
    open_extensions
        .iter()
        .find_map(|key| match schema.extensions.get(key) {
            Some(Value::Array(values)) => Some(values.clone()),
            _ => None,
        })
}

/// `anyOf: [{type: string}, {type: string, enum: [...]}]`: known values that
/// still accept any string.
fn string_or_enum_values(schema: &Schema) -> Option<Vec<String>> {
    let [a, b] = schema.any_of.as_slice() else {
        return None;
    };
    let is_string = |s: &Schema| {
        matches!(&s.schema_type, Some(TypeSet::Single(SchemaType::String)))
    };
    let (open, known) = match (a.as_schema()?, b.as_schema()?) {
        (x, y) if x.enum_values.is_none() => (x, y),
        (x, y) => (y, x),
    };
    if !is_string(open) || open.enum_values.is_some() || !is_string(known) {
        return None;
    }
    let values: Vec<String> = known
        .enum_values
        .as_ref()?
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    (!values.is_empty()).then_some(values)
}

fn case_label(branch: &SchemaOrRef, discriminator: Option<&Discriminator>, n: usize) -> String {
    match branch {
        SchemaOrRef::Ref { ref_path } => {
            let name = ref_path.rsplit('/').next().unwrap_or(ref_path);
            discriminator
                .and_then(|d| {
                    d.mapping
                        .iter()
                        .find(|(_, target)| *target == ref_path || *target == name)
                })
                .map(|(key, _)| key.clone())
                .unwrap_or_else(|| name.to_string())
        }
        SchemaOrRef::Schema(schema) => discriminator
            .and_then(|d| schema.properties.get(&d.property_name))
            .and_then(SchemaOrRef::as_schema)
            .and_then(|prop| match (&prop.enum_values, &prop.const_value) {
                (Some(values), _) if values.len() == 1 => values[0].as_str().map(str::to_string),
                (None, Some(value)) => value.as_str().map(str::to_string),
                _ => None,
            })
            .unwrap_or_else(|| format!("Case{n}")),
    }
}

fn primitive_kind(t: SchemaType) -> Option<PrimitiveKind> {
    match t {
        SchemaType::Integer => Some(PrimitiveKind::Int),
        SchemaType::Number => Some(PrimitiveKind::Double),
        SchemaType::Boolean => Some(PrimitiveKind::Boolean),
        SchemaType::String => Some(PrimitiveKind::String),
        SchemaType::Array | SchemaType::Object | SchemaType::Null => None,
    }
}

/// Strings as-is, every other scalar as its JSON text.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
