use crate::config::RouteConfig;
use crate::ir::{Api, Root, Route};

/// Literal segments of a path, with every `{...}` parameter removed.
///
/// e.g. "/files/{file_id}/content" → ["files", "content"], "/" → []
pub fn literal_segments(path: &str) -> Vec<String> {
    let mut stripped = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        stripped.push_str(&rest[..open]);
        rest = &rest[open + close + 1..];
    }
    stripped.push_str(rest);

    stripped
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fold a flat route list into a tree keyed by literal path segments.
///
/// Groups appear in first-seen order and routes keep their input order
/// within a group.
pub fn build(name: impl Into<String>, routes: Vec<Route>, config: &RouteConfig) -> Root {
    let mut root = Root {
        name: name.into(),
        routes: Vec::new(),
        apis: Vec::new(),
    };

    for route in routes {
        let mut segments = literal_segments(&route.path);
        if segments.len() > config.max_depth {
            log::warn!(
                "{} {} nests deeper than {} groups; attaching it at depth {}",
                route.method.as_str(),
                route.path,
                config.max_depth,
                config.max_depth
            );
            segments.truncate(config.max_depth);
        }

        let Some((first, rest)) = segments.split_first() else {
            root.routes.push(route);
            continue;
        };
        let mut api = find_or_insert(&mut root.apis, first);
        for segment in rest {
            api = find_or_insert(&mut api.nested, segment);
        }
        api.routes.push(route);
    }

    root
}

fn find_or_insert<'t>(apis: &'t mut Vec<Api>, name: &str) -> &'t mut Api {
    let index = match apis.iter().position(|a| a.name == name) {
        Some(index) => index,
        None => {
            apis.push(Api {
                name: name.to_string(),
                routes: Vec::new(),
                nested: Vec::new(),
            });
            apis.len() - 1
        }
    };
    &mut apis[index]
}
