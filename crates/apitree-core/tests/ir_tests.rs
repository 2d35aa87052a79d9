use apitree_core::config::IrConfig;
use apitree_core::error::{ErrorKind, ErrorSource, NamingError, ResolveError, TransformError};
use apitree_core::ir::{
    Api, Body, Collection, EnumModel, EnumValue, HttpMethod, IrSpec, Model, ObjectModel, Primitive,
    PrimitiveKind, Root, StatusCode,
};
use apitree_core::parse;
use apitree_core::parse::parameter::ParameterLocation;
use apitree_core::transform::{self, naming};

const OPENAI: &str = include_str!("fixtures/openai-subset.yaml");
const COLLISIONS: &str = include_str!("fixtures/collisions.yaml");
const BROKEN: &str = include_str!("fixtures/broken.yaml");
const INHERITANCE: &str = include_str!("fixtures/inheritance.yaml");

fn load(input: &str) -> IrSpec {
    let spec = parse::from_yaml(input).unwrap();
    transform::transform(&spec).unwrap()
}

fn component<'a>(ir: &'a IrSpec, name: &str) -> &'a Model {
    let id = ir
        .models
        .component(name)
        .unwrap_or_else(|| panic!("missing component {name}"));
    ir.models.get(id)
}

fn object<'a>(ir: &'a IrSpec, name: &str) -> &'a ObjectModel {
    match component(ir, name) {
        Model::Object(o) => o,
        other => panic!("{name} is not an object: {other:?}"),
    }
}

fn outline(root: &Root) -> String {
    fn write_group(out: &mut String, group: &Api, depth: usize) {
        let indent = "  ".repeat(depth);
        out.push_str(&format!("{indent}{}/\n", group.name));
        for route in &group.routes {
            out.push_str(&format!("{indent}  {} {}\n", route.method.as_str(), route.path));
        }
        for nested in &group.nested {
            write_group(out, nested, depth + 1);
        }
    }

    let mut out = format!("{}\n", root.name);
    for route in &root.routes {
        out.push_str(&format!("  {} {}\n", route.method.as_str(), route.path));
    }
    for group in &root.apis {
        write_group(&mut out, group, 1);
    }
    out
}

#[test]
fn transform_openai_subset() {
    let ir = load(OPENAI);

    assert_eq!(ir.info.title, "OpenAI");
    assert_eq!(ir.info.version, "2.3.0");
    assert_eq!(ir.servers[0].url, "https://api.openai.com/v1");
    assert!(ir.report.is_empty(), "unexpected failures:\n{}", ir.report);
    assert_eq!(ir.root.all_routes().len(), 5);
}

#[test]
fn routes_group_by_literal_path_segments() {
    let ir = load(OPENAI);
    insta::assert_snapshot!(outline(&ir.root), @r"
    OpenAI
      GET /
      chat/
        completions/
          GET /chat/completions
          POST /chat/completions
      files/
        content/
          GET /files/{file_id}/content
      models/
        GET /models
    ");
}

#[test]
fn root_name_can_be_configured() {
    let spec = parse::from_yaml(OPENAI).unwrap();
    let config = IrConfig::from_yaml("routes:\n  root_name: Client\n").unwrap();
    let ir = transform::transform_with_config(&spec, &config).unwrap();
    assert_eq!(ir.root.name, "Client");
    assert_eq!(ir.root.routes[0].operation_id, "getRoot");
}

#[test]
fn output_is_deterministic() {
    let first = load(OPENAI);
    let second = load(OPENAI);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn references_share_one_model() {
    let ir = load(OPENAI);
    let message = ir.models.component("Message").unwrap();

    let request = object(&ir, "CreateChatCompletionRequest");
    let messages = request.property("messages").unwrap();
    let Model::Collection(Collection::List(element)) = ir.models.get(messages.model.id()) else {
        panic!("messages should be a list");
    };
    assert_eq!(element.ref_name(), Some("Message"));
    assert_eq!(element.id(), message);

    // The recursive `replies` list points back at the same model.
    let replies = object(&ir, "Message").property("replies").unwrap();
    let Model::Collection(Collection::List(element)) = ir.models.get(replies.model.id()) else {
        panic!("replies should be a list");
    };
    assert_eq!(element.id(), message);

    let create = ir
        .root
        .api("chat")
        .and_then(|chat| chat.nested("completions"))
        .map(|completions| &completions.routes[1])
        .unwrap();
    assert_eq!(create.operation_id, "createChatCompletion");
    let Some(Body::Json { model, .. }) = create.body.json() else {
        panic!("expected a JSON body");
    };
    assert_eq!(model.ref_name(), Some("CreateChatCompletionRequest"));
    assert!(create.body.required);
    assert!(create.extensions.contains_key("x-oaiMeta"));
}

#[test]
fn inline_objects_get_distinct_contextual_names() {
    let ir = load(OPENAI);
    let request_metadata = object(&ir, "CreateChatCompletionRequest")
        .property("metadata")
        .unwrap()
        .model
        .id();
    let completion_metadata = object(&ir, "ChatCompletion")
        .property("metadata")
        .unwrap()
        .model
        .id();

    assert_eq!(
        ir.names.identifier(request_metadata),
        Some("CreateChatCompletionRequestMetadata")
    );
    assert_eq!(
        ir.names.identifier(completion_metadata),
        Some("ChatCompletionMetadata")
    );

    let identifiers: Vec<_> = ir.names.iter().map(|(_, e)| e.identifier.as_str()).collect();
    assert_eq!(
        identifiers,
        vec![
            "CreateChatCompletionRequest",
            "CreateChatCompletionRequestModel",
            "Message",
            "MessageRole",
            "CreateChatCompletionRequestMetadata",
            "ChatCompletion",
            "ChatCompletionChoices",
            "ChatCompletionChoicesFinishReason",
            "ChatCompletionMetadata",
            "Model",
            "ModelOwnedBy",
            "ListChatCompletionsMetadata",
            "ListChatCompletionsResponse",
            "ListModelsResponse",
        ]
    );
}

#[test]
fn enums_keep_their_raw_values() {
    let ir = load(OPENAI);

    let role = object(&ir, "Message").property("role").unwrap();
    let Model::Enum(role) = ir.models.get(role.model.id()) else {
        panic!("role should be an enum");
    };
    assert!(matches!(role, EnumModel::Closed { inner: PrimitiveKind::String, .. }));
    assert_eq!(role.decode("assistant"), Some(EnumValue::Known(2)));
    assert_eq!(role.decode("tool"), None);

    let owned_by = object(&ir, "Model").property("owned_by").unwrap();
    let Model::Enum(owned_by) = ir.models.get(owned_by.model.id()) else {
        panic!("owned_by should be an enum");
    };
    assert!(owned_by.is_open());
    let custom = owned_by.decode("my-org").unwrap();
    assert_eq!(owned_by.encode(&custom), Some("my-org"));

    let cases = naming::enum_cases(owned_by, &IrConfig::default().naming);
    let idents: Vec<_> = cases.iter().map(|c| c.identifier.as_str()).collect();
    assert_eq!(idents, vec!["Openai", "System", "Custom"]);

    let model = object(&ir, "CreateChatCompletionRequest")
        .property("model")
        .unwrap();
    assert!(matches!(
        ir.models.get(model.model.id()),
        Model::Enum(EnumModel::Open { values, .. }) if values == &["gpt-4o", "gpt-4o-mini"]
    ));
}

#[test]
fn nullable_and_defaults() {
    let ir = load(OPENAI);
    let temperature = object(&ir, "CreateChatCompletionRequest")
        .property("temperature")
        .unwrap();
    assert!(temperature.nullable);
    assert!(!temperature.required);
    assert_eq!(
        ir.models.get(temperature.model.id()),
        &Model::Primitive(Primitive::Double(Some(1.0)))
    );
}

#[test]
fn inputs_and_returns() {
    let ir = load(OPENAI);
    let download = &ir
        .root
        .api("files")
        .and_then(|files| files.nested("content"))
        .unwrap()
        .routes[0];
    assert_eq!(download.input.len(), 1);
    assert_eq!(download.input[0].location, ParameterLocation::Path);
    assert!(download.input[0].required);

    let (status, ret) = download.returns.success().unwrap();
    assert_eq!(status, StatusCode::Code(200));
    assert_eq!(ret.media_type.as_deref(), Some("application/octet-stream"));
    assert_eq!(
        ret.model.as_ref().map(|m| ir.models.get(m.id())),
        Some(&Model::Binary)
    );

    let root = &ir.root.routes[0];
    assert_eq!(root.returns.types[&StatusCode::Code(200)].model, None);
}

#[test]
fn collisions_escalate_then_suffix() {
    let ir = load(COLLISIONS);
    let identifiers: Vec<_> = ir.names.iter().map(|(_, e)| e.identifier.as_str()).collect();
    assert_eq!(
        identifiers,
        vec![
            "CreateFileRequest",
            "FilesCreateFileRequest",
            "UploadsCreateFileRequest",
            "FilesCreateFileRequest2",
        ]
    );

    let (_, last) = ir.names.iter().last().unwrap();
    assert_eq!(last.scope, vec!["archive", "files"]);
    assert_eq!(last.context.to_string(), "createFile.Request");
}

#[test]
fn strict_naming_rejects_collisions() {
    let spec = parse::from_yaml(COLLISIONS).unwrap();
    let config = IrConfig::from_yaml("naming:\n  strict: true\n").unwrap();
    let err = transform::transform_with_config(&spec, &config).unwrap_err();
    match err {
        TransformError::Naming(NamingError::Collision {
            identifier,
            contexts,
        }) => {
            assert_eq!(identifier, "FilesCreateFileRequest");
            assert_eq!(contexts, vec!["createFile.Request", "createFile.Request"]);
        }
        other => panic!("expected a naming collision, got {other:?}"),
    }
}

#[test]
fn failures_are_isolated() {
    let ir = load(BROKEN);

    let sources: Vec<_> = ir.report.entries().iter().map(|e| e.source.to_string()).collect();
    assert_eq!(
        sources,
        vec![
            "#/components/schemas/Owner",
            "#/components/schemas/LoopA",
            "#/components/schemas/LoopB",
            "POST /pets",
            "GET /owners",
            "GET /loops",
        ]
    );
    assert!(
        ir.report
            .entries()
            .iter()
            .all(|e| e.error.kind() == ErrorKind::Reference)
    );

    let routes = ir.root.all_routes();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].operation_id, "listPets");
    assert_eq!(ir.report.for_route(HttpMethod::Post, "/pets").count(), 1);

    assert!(ir.models.component("Owner").is_none());
    assert!(ir.models.component("LoopA").is_none());
    assert!(ir.models.component("Pet").is_some());
    assert_eq!(ir.models.len(), 9);
}

#[test]
fn reference_errors_carry_locations() {
    let ir = load(BROKEN);
    let entries = ir.report.entries();

    assert_eq!(
        entries[0].error,
        ResolveError::UnresolvedRef {
            reference: "#/components/schemas/Address".to_string(),
            at: "#/components/schemas/Owner/properties/address".to_string(),
        }
    );
    assert!(matches!(
        &entries[1].error,
        ResolveError::CircularRef { chain, .. } if chain == "LoopA -> LoopB -> LoopA"
    ));
    assert_eq!(
        entries[3].error,
        ResolveError::UnresolvedRef {
            reference: "#/components/requestBodies/MissingBody".to_string(),
            at: "#/paths/~1pets/post/requestBody".to_string(),
        }
    );
    assert!(matches!(
        &entries[4],
        e if e.source == ErrorSource::Route { method: HttpMethod::Get, path: "/owners".to_string() }
            && matches!(e.error, ResolveError::FailedRef { .. })
    ));
}

#[test]
fn cycles_resolve_to_shared_ids() {
    let ir = load(BROKEN);
    let tree_id = ir.models.component("Tree").unwrap();
    let forest_id = ir.models.component("Forest").unwrap();

    let tree = object(&ir, "Tree");
    let parent = tree.property("parent").unwrap();
    assert_eq!(parent.model.ref_name(), Some("Forest"));
    assert_eq!(parent.model.id(), forest_id);

    let trees = object(&ir, "Forest").property("trees").unwrap();
    let Model::Collection(Collection::List(element)) = ir.models.get(trees.model.id()) else {
        panic!("trees should be a list");
    };
    assert_eq!(element.id(), tree_id);

    let pet = object(&ir, "Pet");
    let status = pet.property("status").unwrap();
    assert!(status.nullable);
    assert!(pet.property("tag").unwrap().nullable);
    assert!(pet.property("name").unwrap().required);
}

#[test]
fn all_of_inherits_shared_properties() {
    let ir = load(INHERITANCE);

    let node = object(&ir, "Node");
    let names: Vec<_> = node.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["id", "labels", "status", "child"]);
    let required: Vec<_> = node
        .properties
        .iter()
        .filter(|p| p.required)
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(required, vec!["id", "status"]);

    let base_labels = object(&ir, "Base").property("labels").unwrap().model.id();
    assert_eq!(node.property("labels").unwrap().model.id(), base_labels);
    assert_eq!(ir.names.identifier(base_labels), Some("BaseLabels"));

    let status = &node.property("status").unwrap().model;
    assert_eq!(status.ref_name(), Some("Status"));
    assert_eq!(status.id(), ir.models.component("Status").unwrap());
    let child = &node.property("child").unwrap().model;
    assert_eq!(child.ref_name(), Some("Node"));
    assert_eq!(child.id(), ir.models.component("Node").unwrap());

    assert_eq!(component(&ir, "Count"), &Model::Primitive(Primitive::Int(None)));

    let identifiers: Vec<_> = ir.names.iter().map(|(_, e)| e.identifier.as_str()).collect();
    assert_eq!(identifiers, vec!["Status", "Base", "BaseLabels", "Node"]);
}

#[test]
fn all_of_rejects_non_object_and_circular_branches() {
    let ir = load(INHERITANCE);

    let entries: Vec<_> = ir
        .report
        .entries()
        .iter()
        .map(|e| (e.source.to_string(), e.error.kind()))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("#/components/schemas/Shape".to_string(), ErrorKind::SchemaShape),
            ("#/components/schemas/Measure".to_string(), ErrorKind::SchemaShape),
            ("#/components/schemas/Cycle".to_string(), ErrorKind::Reference),
        ]
    );
    assert!(ir.models.component("Shape").is_none());
    assert!(ir.models.component("Measure").is_none());
    assert!(ir.models.component("Cycle").is_none());
    assert_eq!(ir.root.all_routes().len(), 1);
}
