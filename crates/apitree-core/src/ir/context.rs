use std::fmt;

use serde::Serialize;

/// Structural position a nameable model was found at.
///
/// `Named` comes from a component name or an operation id; `Nested` records
/// an anonymous node by its local segment under a parent position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingContext {
    Named(String),
    Nested {
        segment: String,
        parent: Box<NamingContext>,
    },
}

impl NamingContext {
    pub fn named(name: impl Into<String>) -> Self {
        NamingContext::Named(name.into())
    }

    /// A child position under `self`.
    pub fn nest(&self, segment: impl Into<String>) -> Self {
        NamingContext::Nested {
            segment: segment.into(),
            parent: Box::new(self.clone()),
        }
    }

    /// Segments from the outermost ancestor to this position.
    pub fn segments(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut current = self;
        loop {
            match current {
                NamingContext::Named(name) => {
                    out.push(name.as_str());
                    break;
                }
                NamingContext::Nested { segment, parent } => {
                    out.push(segment.as_str());
                    current = parent;
                }
            }
        }
        out.reverse();
        out
    }

    /// The name at the root of the chain.
    pub fn root(&self) -> &str {
        let mut current = self;
        loop {
            match current {
                NamingContext::Named(name) => return name,
                NamingContext::Nested { parent, .. } => current = parent,
            }
        }
    }
}

impl fmt::Display for NamingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments().join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_run_outermost_first() {
        let ctx = NamingContext::named("createFile")
            .nest("Request")
            .nest("metadata");
        assert_eq!(ctx.segments(), vec!["createFile", "Request", "metadata"]);
        assert_eq!(ctx.root(), "createFile");
        assert_eq!(ctx.to_string(), "createFile.Request.metadata");
    }
}
