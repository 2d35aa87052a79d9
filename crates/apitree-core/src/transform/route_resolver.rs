use indexmap::IndexMap;

use crate::config::{NamingConfig, NamingStrategy};
use crate::error::{ErrorReport, ErrorSource, ResolveError};
use crate::ir::{
    Bodies, Body, FormField, HttpMethod, Input, Model, ModelId, Primitive, Resolved, ReturnType,
    Returns, Route, StatusCode, is_json,
};
use crate::parse::components::Components;
use crate::parse::extensions::vendor;
use crate::parse::media_type::MediaType;
use crate::parse::operation::{Operation, PathItem};
use crate::parse::parameter::{Parameter, ParameterLocation, ParameterOrRef};
use crate::parse::reference::{Section, escape_token, parse_ref_name};
use crate::parse::request_body::{RequestBody, RequestBodyOrRef};
use crate::parse::response::{Response, ResponseOrRef};

use super::naming::{Site, context_for, route_to_name};
use super::route_hierarchy::literal_segments;
use super::schema_resolver::{Position, SchemaResolver, nullability};

/// Turns path items into routes, resolving their schemas through the shared
/// [`SchemaResolver`].
pub struct RouteResolver<'r, 'a> {
    schemas: &'r mut SchemaResolver<'a>,
    components: Option<&'a Components>,
    naming: &'r NamingConfig,
}

impl<'r, 'a> RouteResolver<'r, 'a> {
    pub fn new(
        schemas: &'r mut SchemaResolver<'a>,
        components: Option<&'a Components>,
        naming: &'r NamingConfig,
    ) -> Self {
        Self {
            schemas,
            components,
            naming,
        }
    }

    /// Resolve every operation in document order. A route that fails is left
    /// out and recorded in `report`, together with everything it created.
    pub fn resolve_paths(
        &mut self,
        paths: &IndexMap<String, PathItem>,
        report: &mut ErrorReport,
    ) -> Vec<Route> {
        let mut routes = Vec::new();

        for (path, item) in paths {
            macro_rules! add_op {
                ($method:expr, $op:expr) => {
                    if let Some(ref op) = $op {
                        let checkpoint = self.schemas.checkpoint();
                        match self.resolve_route($method, path, item, op) {
                            Ok(route) => routes.push(route),
                            Err(err) => {
                                self.schemas.rollback(checkpoint);
                                report.push(
                                    ErrorSource::Route {
                                        method: $method,
                                        path: path.clone(),
                                    },
                                    err,
                                );
                            }
                        }
                    }
                };
            }

            add_op!(HttpMethod::Get, item.get);
            add_op!(HttpMethod::Post, item.post);
            add_op!(HttpMethod::Put, item.put);
            add_op!(HttpMethod::Delete, item.delete);
            add_op!(HttpMethod::Patch, item.patch);
            add_op!(HttpMethod::Options, item.options);
            add_op!(HttpMethod::Head, item.head);
            add_op!(HttpMethod::Trace, item.trace);
        }

        routes
    }

    /// The name an operation is known by: its `operationId` or one derived
    /// from the route, after aliasing.
    pub fn operation_name(&self, method: HttpMethod, path: &str, op: &Operation) -> String {
        let raw = match (self.naming.operation_naming, &op.operation_id) {
            (NamingStrategy::UseOperationId, Some(id)) => id.clone(),
            _ => route_to_name(method, path),
        };
        self.naming.aliases.get(&raw).cloned().unwrap_or(raw)
    }

    fn resolve_route(
        &mut self,
        method: HttpMethod,
        path: &str,
        item: &PathItem,
        op: &Operation,
    ) -> Result<Route, ResolveError> {
        let operation_id = self.operation_name(method, path, op);
        let scope = literal_segments(path);
        let pointer = format!("#/paths/{}/{}", escape_token(path), method.key());
        log::debug!("resolving {} {path} as {operation_id}", method.as_str());

        let input = self.resolve_inputs(&operation_id, item, op, &scope, &pointer)?;
        let body = match &op.request_body {
            Some(body) => self.resolve_body(&operation_id, body, &scope, &pointer)?,
            None => Bodies::default(),
        };
        let returns = self.resolve_returns(&operation_id, op, &scope, &pointer)?;

        Ok(Route {
            operation_id,
            method,
            path: path.to_string(),
            summary: op.summary.clone(),
            description: op.description.clone(),
            tags: op.tags.clone(),
            deprecated: op.deprecated.unwrap_or(false),
            body,
            input,
            returns,
            extensions: vendor(&op.extensions),
        })
    }

    /// Path-level parameters merged with the operation's own; the operation
    /// wins for the same name and location.
    fn resolve_inputs(
        &mut self,
        operation: &str,
        item: &PathItem,
        op: &Operation,
        scope: &[String],
        pointer: &str,
    ) -> Result<Vec<Input>, ResolveError> {
        let mut merged: IndexMap<(String, ParameterLocation), (&Parameter, String)> =
            IndexMap::new();
        let path_level = item
            .parameters
            .iter()
            .enumerate()
            .map(|(i, p)| (p, format!("{}/parameters/{i}", parent_pointer(pointer))));
        let op_level = op
            .parameters
            .iter()
            .enumerate()
            .map(|(i, p)| (p, format!("{pointer}/parameters/{i}")));
        for (param, at) in path_level.chain(op_level) {
            let param = self.parameter(param, &at)?;
            merged.insert((param.name.clone(), param.location), (param, at));
        }

        let mut inputs = Vec::with_capacity(merged.len());
        for (param, at) in merged.into_values() {
            let context = context_for(Site::Parameter {
                operation,
                name: &param.name,
            });
            let (model, nullable) = match param.value_schema() {
                Some(schema) => {
                    let pos = Position::new(context, scope, format!("{at}/schema"));
                    (self.schemas.resolve(schema, &pos)?, nullability(schema))
                }
                None => {
                    let id = self.schemas.push(Model::Primitive(Primitive::String(None)), scope);
                    (Resolved::Value(id), false)
                }
            };
            inputs.push(Input {
                name: param.name.clone(),
                location: param.location,
                model,
                required: param.required || param.location == ParameterLocation::Path,
                nullable,
                description: param.description.clone(),
                deprecated: param.deprecated.unwrap_or(false),
            });
        }
        Ok(inputs)
    }

    fn resolve_body(
        &mut self,
        operation: &str,
        body: &RequestBodyOrRef,
        scope: &[String],
        pointer: &str,
    ) -> Result<Bodies, ResolveError> {
        let at = format!("{pointer}/requestBody");
        let body = self.request_body(body, &at)?;

        let mut types = IndexMap::with_capacity(body.content.len());
        for (media, media_type) in &body.content {
            let context = context_for(Site::RequestBody { operation });
            let pos = Position::new(
                context,
                scope,
                format!("{at}/content/{}/schema", escape_token(media)),
            );
            let extensions = vendor(&media_type.extensions);
            let essence = media.split(';').next().unwrap_or("").trim();

            let resolved = if is_json(media) {
                Body::Json {
                    model: self.schema_or_free_form(media_type, &pos)?,
                    extensions,
                }
            } else if essence.eq_ignore_ascii_case("application/xml") {
                Body::Xml {
                    model: self.schema_or_free_form(media_type, &pos)?,
                    extensions,
                }
            } else if essence.eq_ignore_ascii_case("application/octet-stream") {
                Body::OctetStream { extensions }
            } else if essence.eq_ignore_ascii_case("multipart/form-data") {
                let model = self.optional_schema(media_type, &pos)?;
                let fields = self.form_fields(model.as_ref(), media_type);
                Body::Multipart {
                    model,
                    fields,
                    extensions,
                }
            } else {
                Body::Other {
                    model: self.optional_schema(media_type, &pos)?,
                    extensions,
                }
            };
            types.insert(media.clone(), resolved);
        }

        Ok(Bodies {
            required: body.required,
            description: body.description.clone(),
            types,
            extensions: vendor(&body.extensions),
        })
    }

    /// The fields of a multipart body are the properties of its object schema.
    fn form_fields(
        &self,
        model: Option<&Resolved<ModelId>>,
        media_type: &MediaType,
    ) -> Vec<FormField> {
        let Some(Model::Object(object)) = model.and_then(|m| self.schemas.model(m.id())) else {
            return Vec::new();
        };
        object
            .properties
            .iter()
            .map(|p| FormField {
                name: p.name.clone(),
                model: p.model.clone(),
                required: p.required,
                content_type: media_type
                    .encoding
                    .get(&p.name)
                    .and_then(|e| e.content_type.clone()),
            })
            .collect()
    }

    fn resolve_returns(
        &mut self,
        operation: &str,
        op: &Operation,
        scope: &[String],
        pointer: &str,
    ) -> Result<Returns, ResolveError> {
        let mut types = IndexMap::with_capacity(op.responses.entries.len());
        for (i, (key, response)) in op.responses.entries.iter().enumerate() {
            let at = format!("{pointer}/responses/{}", escape_token(key));
            let status = StatusCode::parse(key).ok_or_else(|| ResolveError::SchemaShape {
                reason: format!("invalid response status {key}"),
                at: at.clone(),
            })?;
            let response = self.response(response, &at)?;

            let media = response
                .content
                .iter()
                .find(|(media, _)| is_json(media))
                .or_else(|| response.content.first());
            let model = match media {
                Some((media, media_type)) => {
                    let context = context_for(Site::Response {
                        operation,
                        status,
                        primary: i == 0,
                    });
                    let pos = Position::new(
                        context,
                        scope,
                        format!("{at}/content/{}/schema", escape_token(media)),
                    );
                    self.optional_schema(media_type, &pos)?
                }
                None => None,
            };

            types.insert(
                status,
                ReturnType {
                    model,
                    media_type: media.map(|(m, _)| m.clone()),
                    description: Some(response.description.clone()).filter(|d| !d.is_empty()),
                    extensions: vendor(&response.extensions),
                },
            );
        }
        Ok(Returns {
            types,
            extensions: vendor(&op.responses.extensions),
        })
    }

    fn optional_schema(
        &mut self,
        media_type: &MediaType,
        pos: &Position<'_>,
    ) -> Result<Option<Resolved<ModelId>>, ResolveError> {
        media_type
            .schema
            .as_ref()
            .map(|schema| self.schemas.resolve(schema, pos))
            .transpose()
    }

    fn schema_or_free_form(
        &mut self,
        media_type: &MediaType,
        pos: &Position<'_>,
    ) -> Result<Resolved<ModelId>, ResolveError> {
        match &media_type.schema {
            Some(schema) => self.schemas.resolve(schema, pos),
            None => Ok(self.schemas.free_form(pos.scope)),
        }
    }

    fn parameter<'p>(
        &self,
        param: &'p ParameterOrRef,
        at: &str,
    ) -> Result<&'p Parameter, ResolveError>
    where
        'a: 'p,
    {
        let mut current = param;
        let mut seen: Vec<&str> = Vec::new();
        loop {
            match current {
                ParameterOrRef::Parameter(p) => return Ok(p),
                ParameterOrRef::Ref { ref_path } => {
                    let name = parse_ref_name(ref_path, Section::Parameters, at)?;
                    if seen.contains(&name) {
                        return Err(circular(&seen, name, at));
                    }
                    seen.push(name);
                    current = self
                        .components
                        .and_then(|c| c.parameters.get(name))
                        .ok_or_else(|| unresolved(ref_path, at))?;
                }
            }
        }
    }

    fn request_body<'p>(
        &self,
        body: &'p RequestBodyOrRef,
        at: &str,
    ) -> Result<&'p RequestBody, ResolveError>
    where
        'a: 'p,
    {
        let mut current = body;
        let mut seen: Vec<&str> = Vec::new();
        loop {
            match current {
                RequestBodyOrRef::RequestBody(b) => return Ok(b),
                RequestBodyOrRef::Ref { ref_path } => {
                    let name = parse_ref_name(ref_path, Section::RequestBodies, at)?;
                    if seen.contains(&name) {
                        return Err(circular(&seen, name, at));
                    }
                    seen.push(name);
                    current = self
                        .components
                        .and_then(|c| c.request_bodies.get(name))
                        .ok_or_else(|| unresolved(ref_path, at))?;
                }
            }
        }
    }

    fn response<'p>(
        &self,
        response: &'p ResponseOrRef,
        at: &str,
    ) -> Result<&'p Response, ResolveError>
    where
        'a: 'p,
    {
        let mut current = response;
        let mut seen: Vec<&str> = Vec::new();
        loop {
            match current {
                ResponseOrRef::Response(r) => return Ok(r),
                ResponseOrRef::Ref { ref_path } => {
                    let name = parse_ref_name(ref_path, Section::Responses, at)?;
                    if seen.contains(&name) {
                        return Err(circular(&seen, name, at));
                    }
                    seen.push(name);
                    current = self
                        .components
                        .and_then(|c| c.responses.get(name))
                        .ok_or_else(|| unresolved(ref_path, at))?;
                }
            }
        }
    }
}

/// `#/paths/~1pets/get` → `#/paths/~1pets`
fn parent_pointer(pointer: &str) -> &str {
    pointer.rsplit_once('/').map_or(pointer, |(parent, _)| parent)
}

fn unresolved(reference: &str, at: &str) -> ResolveError {
    ResolveError::UnresolvedRef {
        reference: reference.to_string(),
        at: at.to_string(),
    }
}

fn circular(seen: &[&str], name: &str, at: &str) -> ResolveError {
    let mut chain = seen.to_vec();
    chain.push(name);
    ResolveError::CircularRef {
        chain: chain.join(" -> "),
        at: at.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnumConfig;
    use crate::parse::spec::OpenApiSpec;

    struct Outcome {
        routes: Vec<Route>,
        report: ErrorReport,
        models: crate::ir::Models,
    }

    fn resolve(yaml: &str, naming: &NamingConfig) -> Outcome {
        let spec: OpenApiSpec = crate::parse::from_yaml(yaml).unwrap();
        let empty = IndexMap::new();
        let schemas = spec.components.as_ref().map_or(&empty, |c| &c.schemas);
        let enums = EnumConfig::default();
        let mut resolver = SchemaResolver::new(schemas, &enums);
        let mut report = ErrorReport::default();
        resolver.resolve_components(&mut report);
        let routes = RouteResolver::new(&mut resolver, spec.components.as_ref(), naming)
            .resolve_paths(&spec.paths, &mut report);
        Outcome {
            routes,
            report,
            models: resolver.finish(),
        }
    }

    const PETS: &str = r##"
openapi: 3.1.0
info: {title: Pets, version: '1'}
paths:
  /pets/{petId}:
    parameters:
      - name: petId
        in: path
        schema: {type: string}
      - name: verbose
        in: query
        schema: {type: boolean}
    get:
      parameters:
        - $ref: '#/components/parameters/Verbose'
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
        '404':
          description: missing
    delete:
      operationId: removePet
      responses:
        '204':
          description: gone
components:
  parameters:
    Verbose:
      name: verbose
      in: query
      required: true
      schema: {type: [integer, 'null']}
  schemas:
    Pet:
      type: object
      properties:
        name: {type: string}
"##;

    #[test]
    fn merges_path_and_operation_parameters() {
        let resolved = resolve(PETS, &NamingConfig::default());
        assert!(resolved.report.is_empty());
        let get = &resolved.routes[0];
        assert_eq!(get.operation_id, "getPet");
        let names: Vec<_> = get.input.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["petId", "verbose"]);
        assert!(get.input[0].required);
        assert!(get.input[1].required);
        assert!(get.input[1].nullable);
        assert_eq!(
            resolved.models.get(get.input[1].model.id()),
            &Model::Primitive(Primitive::Int(None))
        );
    }

    #[test]
    fn returns_keep_document_order() {
        let resolved = resolve(PETS, &NamingConfig::default());
        let get = &resolved.routes[0];
        let statuses: Vec<_> = get.returns.types.keys().map(ToString::to_string).collect();
        assert_eq!(statuses, vec!["200", "404"]);
        let ok = &get.returns.types[&StatusCode::Code(200)];
        assert_eq!(ok.model.as_ref().and_then(|m| m.ref_name()), Some("Pet"));
        assert_eq!(get.returns.types[&StatusCode::Code(404)].model, None);
        assert_eq!(resolved.routes[1].operation_id, "removePet");
    }

    #[test]
    fn aliases_and_route_based_names() {
        let mut naming = NamingConfig {
            operation_naming: NamingStrategy::UseRouteBased,
            ..Default::default()
        };
        naming
            .aliases
            .insert("deletePet".to_string(), "drop".to_string());
        let resolved = resolve(PETS, &naming);
        assert_eq!(resolved.routes[1].operation_id, "drop");
    }

    #[test]
    fn dangling_reference_excludes_only_that_route() {
        let yaml = r##"
openapi: 3.0.3
info: {title: T, version: '1'}
paths:
  /a:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                type: object
                properties:
                  owner:
                    $ref: '#/components/schemas/Missing'
  /b:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                type: object
                properties:
                  id: {type: string}
"##;
        let resolved = resolve(yaml, &NamingConfig::default());
        assert_eq!(resolved.routes.len(), 1);
        assert_eq!(resolved.routes[0].path, "/b");
        assert_eq!(resolved.models.len(), 2);
        let entry = &resolved.report.entries()[0];
        assert_eq!(
            entry.source,
            ErrorSource::Route {
                method: HttpMethod::Get,
                path: "/a".to_string()
            }
        );
        assert_eq!(
            entry.error.at(),
            "#/paths/~1a/get/responses/200/content/application~1json/schema/properties/owner"
        );
    }

    #[test]
    fn multipart_fields_come_from_the_object_schema() {
        let yaml = r##"
openapi: 3.0.3
info: {title: T, version: '1'}
paths:
  /files:
    post:
      operationId: createFile
      requestBody:
        required: true
        content:
          multipart/form-data:
            schema:
              type: object
              required: [file]
              properties:
                file: {type: string, format: binary}
                purpose: {type: string}
            encoding:
              file:
                contentType: application/pdf
      responses:
        '200':
          description: ok
"##;
        let resolved = resolve(yaml, &NamingConfig::default());
        let body = &resolved.routes[0].body;
        assert!(body.required);
        let Some(Body::Multipart { model, fields, .. }) = body.multipart() else {
            panic!("expected multipart body");
        };
        let object = resolved.models.get(model.as_ref().unwrap().id());
        assert_eq!(
            object.context().map(ToString::to_string),
            Some("createFile.Request".to_string())
        );
        assert_eq!(fields.len(), 2);
        assert!(fields[0].required);
        assert_eq!(fields[0].content_type.as_deref(), Some("application/pdf"));
        assert_eq!(resolved.models.get(fields[0].model.id()), &Model::Binary);
    }
}
