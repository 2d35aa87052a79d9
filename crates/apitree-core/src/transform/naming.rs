//! The naming engine.
//!
//! Resolution asks [`context_for`] for the [`NamingContext`] of every site that
//! may need a type name. Once the model arena is complete, [`assign`] renders
//! all contexts into one flat namespace and settles collisions, so identifiers
//! depend only on document order.

use std::collections::{HashMap, HashSet};

use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};
use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{Casing, NamingConfig};
use crate::error::NamingError;
use crate::ir::{EnumModel, HttpMethod, ModelId, Models, NamingContext, StatusCode};

/// Segment appended to an operation id for its request body.
pub const REQUEST_SEGMENT: &str = "Request";
/// Segment appended to an operation id for its primary response.
pub const RESPONSE_SEGMENT: &str = "Response";
/// Name of the synthetic case of open enums.
pub const CUSTOM_CASE: &str = "Custom";

/// A structural position that may need a name.
#[derive(Debug, Clone, Copy)]
pub enum Site<'a> {
    Component(&'a str),
    Property {
        parent: &'a NamingContext,
        name: &'a str,
    },
    Case {
        parent: &'a NamingContext,
        label: &'a str,
    },
    RequestBody {
        operation: &'a str,
    },
    FormField {
        operation: &'a str,
        field: &'a str,
    },
    Response {
        operation: &'a str,
        status: StatusCode,
        primary: bool,
    },
    Parameter {
        operation: &'a str,
        name: &'a str,
    },
}

/// The naming context of a site.
pub fn context_for(site: Site<'_>) -> NamingContext {
    match site {
        Site::Component(name) => NamingContext::named(name),
        Site::Property { parent, name } => parent.nest(name),
        Site::Case { parent, label } => parent.nest(label),
        Site::RequestBody { operation } => NamingContext::named(operation).nest(REQUEST_SEGMENT),
        Site::FormField { operation, field } => NamingContext::named(operation)
            .nest(REQUEST_SEGMENT)
            .nest(field),
        Site::Response {
            operation,
            primary: true,
            ..
        } => NamingContext::named(operation).nest(RESPONSE_SEGMENT),
        Site::Response {
            operation, status, ..
        } => NamingContext::named(operation).nest(format!("{RESPONSE_SEGMENT}{status}")),
        Site::Parameter { operation, name } => NamingContext::named(operation).nest(name),
    }
}

/// Render a context into its candidate identifier.
pub fn render(context: &NamingContext, config: &NamingConfig) -> String {
    render_segments(&context.segments(), config)
}

fn render_segments(segments: &[&str], config: &NamingConfig) -> String {
    let words: Vec<String> = segments
        .iter()
        .map(|s| sanitize_identifier(s))
        .filter(|s| !s.is_empty())
        .collect();
    if words.is_empty() {
        return finish("Unnamed".to_string(), config);
    }
    finish(apply_casing(&words.join("_"), config.convention), config)
}

fn apply_casing(words: &str, casing: Casing) -> String {
    match casing {
        Casing::Pascal => words.to_pascal_case(),
        Casing::Camel => words.to_lower_camel_case(),
        Casing::Snake => words.to_snake_case(),
        Casing::ScreamingSnake => words.to_shouty_snake_case(),
    }
}

/// Make a cased identifier legal: no leading digit, no reserved word.
fn finish(mut ident: String, config: &NamingConfig) -> String {
    if ident.is_empty() {
        ident = "Unnamed".to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if config.reserved_words.iter().any(|w| *w == ident) {
        ident.push('_');
    }
    ident
}

/// Replace every run of non-alphanumeric characters with a single `_` word break.
fn sanitize_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_was_separator = false;

    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if prev_was_separator && !result.is_empty() {
                result.push('_');
            }
            result.push(ch);
            prev_was_separator = false;
        } else {
            prev_was_separator = true;
        }
    }

    result
}

/// Derive a camelCase operation name from HTTP method + path.
///
/// Examples:
/// - `GET /users` → `listUsers`
/// - `GET /users/{userId}` → `getUser`
/// - `DELETE /users/{userId}` → `deleteUser`
/// - `GET /users/{userId}/messages` → `listUsersMessages`
pub fn route_to_name(method: HttpMethod, path: &str) -> String {
    let mut resource_parts: Vec<&str> = Vec::new();
    let mut ends_with_param = false;

    for seg in path.split('/').filter(|s| !s.is_empty()) {
        if seg.starts_with('{') && seg.ends_with('}') {
            ends_with_param = true;
        } else {
            resource_parts.push(seg);
            ends_with_param = false;
        }
    }

    let prefix = match method {
        HttpMethod::Get if ends_with_param => "get",
        HttpMethod::Get => "list",
        HttpMethod::Post => "create",
        HttpMethod::Put => "update",
        HttpMethod::Delete => "delete",
        HttpMethod::Patch => "patch",
        HttpMethod::Options => "options",
        HttpMethod::Head => "head",
        HttpMethod::Trace => "trace",
    };

    let Some(last) = resource_parts.len().checked_sub(1) else {
        return prefix.to_string();
    };

    // Single-resource ops (ending in a parameter) singularize the last segment.
    let mut name = prefix.to_string();
    for (i, part) in resource_parts.iter().enumerate() {
        let word = if i == last && ends_with_param {
            singularize(part)
        } else {
            part.to_string()
        };
        name.push_str(&word.to_pascal_case());
    }
    name
}

/// Naive singularization: strips trailing 's' if present.
fn singularize(word: &str) -> String {
    if word.ends_with("ies") && word.len() > 3 {
        format!("{}y", &word[..word.len() - 3])
    } else if word.ends_with("ses") || word.ends_with("xes") || word.ends_with("zes") {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// The final name of one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameEntry {
    pub context: NamingContext,
    /// Literal path segments of the route the model was created under.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,
    pub identifier: String,
}

/// Identifiers of every contextful model, keyed by model id in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NameTable {
    entries: IndexMap<ModelId, NameEntry>,
}

impl NameTable {
    pub fn identifier(&self, id: ModelId) -> Option<&str> {
        self.entries.get(&id).map(|e| e.identifier.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModelId, &NameEntry)> {
        self.entries.iter().map(|(id, e)| (*id, e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Candidate<'m> {
    id: ModelId,
    context: &'m NamingContext,
    name: String,
}

/// Give every object, union and enum in `models` a unique identifier.
///
/// Colliding candidates are re-rendered with the last literal path segment of
/// the route they were created under; whatever still collides gets a numeric
/// suffix in traversal order, the first model keeping the bare name.
pub fn assign(models: &Models, config: &NamingConfig) -> Result<NameTable, NamingError> {
    let mut candidates: Vec<Candidate<'_>> = models
        .nameable()
        .map(|(id, _, context)| Candidate {
            id,
            context,
            name: render(context, config),
        })
        .collect();

    let counts = count_names(&candidates);
    for candidate in &mut candidates {
        if counts[candidate.name.as_str()] < 2 {
            continue;
        }
        if let Some(ancestor) = models.scope(candidate.id).last() {
            let mut segments = vec![ancestor.as_str()];
            segments.extend(candidate.context.segments());
            candidate.name = render_segments(&segments, config);
            log::debug!(
                "qualified colliding name for {} as {}",
                candidate.context,
                candidate.name
            );
        }
    }

    let counts = count_names(&candidates);
    let mut taken: HashSet<String> = counts
        .iter()
        .filter(|(_, n)| **n == 1)
        .map(|(name, _)| name.clone())
        .collect();

    let mut entries = IndexMap::with_capacity(candidates.len());
    for candidate in &candidates {
        let collides = counts[&candidate.name] > 1;
        if collides && config.strict {
            return Err(collision(&candidate.name, &candidates));
        }
        let identifier = if !collides || taken.insert(candidate.name.clone()) {
            candidate.name.clone()
        } else {
            let mut suffix = 2u32;
            loop {
                if suffix > config.max_suffix {
                    return Err(collision(&candidate.name, &candidates));
                }
                let attempt = format!("{}{}", candidate.name, suffix);
                if taken.insert(attempt.clone()) {
                    break attempt;
                }
                suffix += 1;
            }
        };
        entries.insert(
            candidate.id,
            NameEntry {
                context: candidate.context.clone(),
                scope: models.scope(candidate.id).to_vec(),
                identifier,
            },
        );
    }

    Ok(NameTable { entries })
}

fn count_names(candidates: &[Candidate<'_>]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for c in candidates {
        *counts.entry(c.name.clone()).or_insert(0) += 1;
    }
    counts
}

fn collision(identifier: &str, candidates: &[Candidate<'_>]) -> NamingError {
    NamingError::Collision {
        identifier: identifier.to_string(),
        contexts: candidates
            .iter()
            .filter(|c| c.name == identifier)
            .map(|c| c.context.to_string())
            .collect(),
    }
}

/// The identifier of one enum case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumCaseName {
    pub identifier: String,
    /// The raw value this case stands for; `None` for the open-enum escape case.
    pub value: Option<String>,
}

/// Case identifiers of an enum, unique within the enum. Open enums end with
/// the escape case that carries unknown values.
pub fn enum_cases(model: &EnumModel, config: &NamingConfig) -> Vec<EnumCaseName> {
    let mut taken = HashSet::new();
    let mut unique = |base: String| -> String {
        if taken.insert(base.clone()) {
            return base;
        }
        let mut n = 2u32;
        loop {
            let attempt = format!("{base}{n}");
            if taken.insert(attempt.clone()) {
                return attempt;
            }
            n += 1;
        }
    };

    let mut cases: Vec<EnumCaseName> = model
        .values()
        .iter()
        .map(|raw| {
            let base = if sanitize_identifier(raw).is_empty() {
                render_segments(&["Empty"], config)
            } else {
                render_segments(&[raw.as_str()], config)
            };
            EnumCaseName {
                identifier: unique(base),
                value: Some(raw.clone()),
            }
        })
        .collect();

    if model.is_open() {
        cases.push(EnumCaseName {
            identifier: unique(render_segments(&[CUSTOM_CASE], config)),
            value: None,
        });
    }
    cases
}
