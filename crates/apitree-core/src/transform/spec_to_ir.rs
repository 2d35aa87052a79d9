use indexmap::IndexMap;

use crate::config::IrConfig;
use crate::error::{ErrorReport, TransformError};
use crate::ir::{IrInfo, IrServer, IrSpec};
use crate::parse::spec::OpenApiSpec;

use super::naming;
use super::route_hierarchy;
use super::route_resolver::RouteResolver;
use super::schema_resolver::SchemaResolver;

/// Transform a parsed OpenAPI spec into the IR with default settings.
pub fn transform(spec: &OpenApiSpec) -> Result<IrSpec, TransformError> {
    transform_with_config(spec, &IrConfig::default())
}

/// Transform with explicit settings.
///
/// Resolution failures do not abort: the failing component or route is left
/// out and listed in [`IrSpec::report`]. Only a naming collision that cannot be
/// settled under the configured rules is an error.
pub fn transform_with_config(
    spec: &OpenApiSpec,
    config: &IrConfig,
) -> Result<IrSpec, TransformError> {
    let empty = IndexMap::new();
    let schemas = spec.components.as_ref().map_or(&empty, |c| &c.schemas);
    let mut report = ErrorReport::default();

    // Phase 1: component schemas, in document order
    let mut resolver = SchemaResolver::new(schemas, &config.enums);
    resolver.resolve_components(&mut report);

    // Phase 2: operations, sharing the component memo
    let routes = RouteResolver::new(&mut resolver, spec.components.as_ref(), &config.naming)
        .resolve_paths(&spec.paths, &mut report);
    let models = resolver.finish();

    // Phase 3: identifiers for every contextful model
    let names = naming::assign(&models, &config.naming)?;

    // Phase 4: group routes by path
    let root_name = config
        .routes
        .root_name
        .clone()
        .unwrap_or_else(|| spec.info.title.clone());
    let root = route_hierarchy::build(root_name, routes, &config.routes);

    log::debug!(
        "resolved {} models, {} routes, {} failures",
        models.len(),
        root.all_routes().len(),
        report.len()
    );

    let info = IrInfo {
        title: spec.info.title.clone(),
        description: spec.info.description.clone(),
        version: spec.info.version.clone(),
    };

    let servers = spec
        .servers
        .iter()
        .map(|s| IrServer {
            url: s.url.clone(),
            description: s.description.clone(),
        })
        .collect();

    Ok(IrSpec {
        info,
        servers,
        root,
        models,
        names,
        report,
    })
}
