use serde::Serialize;

use super::route::Route;

/// Top of the API tree: operations at `/` plus the top-level groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Root {
    /// `info.title`, or the configured root name.
    pub name: String,
    pub routes: Vec<Route>,
    pub apis: Vec<Api>,
}

/// A group of operations sharing a literal path segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Api {
    pub name: String,
    pub routes: Vec<Route>,
    pub nested: Vec<Api>,
}

impl Root {
    pub fn api(&self, name: &str) -> Option<&Api> {
        self.apis.iter().find(|a| a.name == name)
    }

    /// Every route in the tree, depth-first in group order.
    pub fn all_routes(&self) -> Vec<&Route> {
        let mut out: Vec<&Route> = self.routes.iter().collect();
        let mut stack: Vec<&Api> = self.apis.iter().rev().collect();
        while let Some(api) = stack.pop() {
            out.extend(api.routes.iter());
            stack.extend(api.nested.iter().rev());
        }
        out
    }
}

impl Api {
    pub fn nested(&self, name: &str) -> Option<&Api> {
        self.nested.iter().find(|a| a.name == name)
    }
}
