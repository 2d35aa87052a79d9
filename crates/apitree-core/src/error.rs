use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::ir::HttpMethod;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

/// A failure while resolving one schema, parameter, body or response.
///
/// `at` is the JSON pointer of the node that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolveError {
    #[error("unresolved reference {reference} at {at}")]
    UnresolvedRef { reference: String, at: String },

    #[error("invalid reference format {reference} at {at}")]
    InvalidRefFormat { reference: String, at: String },

    #[error("reference cycle with no named schema ({chain}) at {at}")]
    CircularRef { chain: String, at: String },

    #[error("reference to {reference}, which failed to resolve, at {at}")]
    FailedRef { reference: String, at: String },

    #[error("cannot classify schema at {at}: {reason}")]
    SchemaShape { reason: String, at: String },
}

/// The error taxonomy a [`ResolveError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    Reference,
    SchemaShape,
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::UnresolvedRef { .. }
            | ResolveError::InvalidRefFormat { .. }
            | ResolveError::CircularRef { .. }
            | ResolveError::FailedRef { .. } => ErrorKind::Reference,
            ResolveError::SchemaShape { .. } => ErrorKind::SchemaShape,
        }
    }

    /// Location of the offending node inside the document.
    pub fn at(&self) -> &str {
        match self {
            ResolveError::UnresolvedRef { at, .. }
            | ResolveError::InvalidRefFormat { at, .. }
            | ResolveError::CircularRef { at, .. }
            | ResolveError::FailedRef { at, .. }
            | ResolveError::SchemaShape { at, .. } => at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("identifier {identifier} is ambiguous between: {}", contexts.join(", "))]
    Collision {
        identifier: String,
        contexts: Vec<String>,
    },
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("naming error: {0}")]
    Naming(#[from] NamingError),
}

/// The resolution unit a reported failure belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSource {
    Component(String),
    Route { method: HttpMethod, path: String },
}

impl fmt::Display for ErrorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSource::Component(name) => write!(f, "#/components/schemas/{name}"),
            ErrorSource::Route { method, path } => write!(f, "{} {}", method.as_str(), path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub source: ErrorSource,
    pub error: ResolveError,
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}

/// Failures accumulated while resolving a document. Units listed here were
/// left out of the IR; everything else resolved normally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorReport {
    entries: Vec<ReportEntry>,
}

impl ErrorReport {
    pub fn push(&mut self, source: ErrorSource, error: ResolveError) {
        log::warn!("{source}: {error}");
        self.entries.push(ReportEntry { source, error });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Entries recorded for one route.
    pub fn for_route<'a>(
        &'a self,
        method: HttpMethod,
        path: &'a str,
    ) -> impl Iterator<Item = &'a ReportEntry> + 'a {
        self.entries.iter().filter(move |e| {
            matches!(
                &e.source,
                ErrorSource::Route { method: m, path: p } if *m == method && p == path
            )
        })
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}
