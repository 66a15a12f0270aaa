//! End-to-end engine tests: template -> render -> extract round-trips, the
//! companion-declaration protocol, and the no-overlap guarantee.

use std::path::Path;

use indexmap::indexmap;

use flowsync_core::{Position, PropertyValue, Span};
use flowsync_engine::{NodeKind, NodeRequest, SyncEngine};
use flowsync_workspace::{InMemoryWorkspace, RawConstruct, RawField, Symbol, SymbolKind};

fn sp(sl: u32, sc: u32, el: u32, ec: u32) -> Span {
    Span::new(Position::new(sl, sc), Position::new(el, ec))
}

fn workspace() -> InMemoryWorkspace {
    let mut ws = InMemoryWorkspace::new("/proj");
    ws.add_symbol("main.fl", Symbol::new("backend", SymbolKind::Connection));
    ws
}

/// Template a call, render it, feed the rendered shape back through the
/// analyzer fixture, and re-extract: every non-hidden, modified property
/// must survive the trip.
#[test]
fn call_round_trips_through_source() {
    let engine = SyncEngine::new(workspace());
    let request = NodeRequest::at("main.fl", 6, 0).with_entry("HTTP GET");

    let mut node = engine.get_template(NodeKind::Call, &request).unwrap();
    node.model_mut()
        .update_value("path", PropertyValue::text("/users"))
        .unwrap();

    let edits = engine.to_source_edits(&node, &request).unwrap();
    let rendered = &edits.for_file(Path::new("main.fl")).unwrap()[0].new_text;
    assert_eq!(
        rendered,
        "let result = try backend.get(path = \"/users\");\n"
    );

    // The analyzer's view of the rendered line.
    let mut after = workspace();
    after.add_construct(
        "main.fl",
        RawConstruct {
            kind: NodeKind::Call,
            name: Some("result".into()),
            span: sp(6, 0, 6, 46),
            fields: indexmap! {
                "variable".to_string() => RawField::new("result", sp(6, 4, 6, 10)),
                "connection".to_string() => RawField::new("backend", sp(6, 17, 6, 24)),
                "method".to_string() => RawField::new("get", sp(6, 25, 6, 28)),
                "path".to_string() => RawField::new("\"/users\"", sp(6, 36, 6, 44)),
            },
        },
    );
    let engine_after = SyncEngine::new(after);
    let extracted = engine_after
        .get_from_source(NodeKind::Call, &request)
        .unwrap();

    for property in node.properties().values() {
        if property.hidden || !property.modified || property.value.is_none() {
            continue;
        }
        let found = extracted
            .properties()
            .get(&property.key)
            .unwrap_or_else(|| panic!("property '{}' lost in round-trip", property.key));
        assert_eq!(found.value, property.value, "property '{}'", property.key);
    }
    // Identity is fresh per request: round-tripping never aliases nodes.
    assert_ne!(node, extracted);
}

#[test]
fn connection_round_trips_with_dependents_rebuilt() {
    let engine = SyncEngine::new(workspace());
    let request = NodeRequest::at("main.fl", 0, 0).with_entry("HTTP Client");

    let mut node = engine.get_template(NodeKind::Connection, &request).unwrap();
    node.model_mut()
        .update_value("url", PropertyValue::text("https://api.example.com"))
        .unwrap();
    let edits = engine.to_source_edits(&node, &request).unwrap();
    assert_eq!(
        edits.for_file(Path::new("main.fl")).unwrap()[0].new_text,
        "let client = http.Client(url = \"https://api.example.com\");\n"
    );

    let mut after = InMemoryWorkspace::new("/proj");
    after.add_construct(
        "main.fl",
        RawConstruct {
            kind: NodeKind::Connection,
            name: Some("client".into()),
            span: sp(0, 0, 0, 59),
            fields: indexmap! {
                "variable".to_string() => RawField::new("client", sp(0, 4, 0, 10)),
                "module".to_string() => RawField::new("http.Client", sp(0, 13, 0, 24)),
                "url".to_string() => RawField::new("\"https://api.example.com\"", sp(0, 31, 0, 56)),
            },
        },
    );
    after.add_dependent(
        "main.fl",
        "client",
        flowsync_workspace::Dependent::new("fetchUsers", flowsync_workspace::DependentKind::Function),
    );

    let engine_after = SyncEngine::new(after);
    let extracted = engine_after
        .get_from_source(NodeKind::Connection, &request)
        .unwrap();
    assert_eq!(
        extracted.properties().get("url").unwrap().value,
        Some(PropertyValue::text("https://api.example.com"))
    );
    let dep = extracted.as_dependency().unwrap();
    assert_eq!(dep.dependent_functions().len(), 1);
    assert!(dep.dependent_functions().contains("fetchUsers"));
}

/// The composite agent-call operation: one request, two files, no overlap,
/// and the companion's provider mapping left untouched.
#[test]
fn agent_call_materializes_companion_atomically() {
    let mut ws = InMemoryWorkspace::new("/proj");
    ws.add_file("main.fl");
    let engine = SyncEngine::new(ws);
    let request = NodeRequest::at("main.fl", 8, 0);

    let mut node = engine.get_template(NodeKind::AgentCall, &request).unwrap();
    {
        let model = node.model_mut();
        model
            .update_value("query", PropertyValue::expression("\"plan a trip\""))
            .unwrap();
        model
            .update_value("role", PropertyValue::text("travel planner"))
            .unwrap();
        model
            .update_value("instructions", PropertyValue::text("keep it short"))
            .unwrap();
    }

    let edits = engine.to_source_edits(&node, &request).unwrap();
    assert_eq!(edits.files().len(), 2);
    edits.validate().unwrap();

    let declaration = &edits.for_file(Path::new("/proj/connections.fl")).unwrap()[0].new_text;
    assert_eq!(
        declaration,
        "let assistant = agent(prompt = \"travel planner: keep it short\");\n"
    );
    assert!(!declaration.contains("model ="));

    let call = &edits.for_file(Path::new("main.fl")).unwrap()[0].new_text;
    assert_eq!(call, "let reply = try assistant.run(query = \"plan a trip\");\n");
}

#[test]
fn search_returns_catalog_entries_in_stable_order() {
    let mut ws = InMemoryWorkspace::new("/proj");
    ws.add_file("main.fl");
    let mut catalog = flowsync_engine::Catalog::new();
    catalog.push(flowsync_engine::CatalogEntry::new(
        "CSV Data Loader",
        "Loads rows from a CSV file",
        "DATA_LOADER",
        NodeKind::Call,
    ));
    catalog.push(flowsync_engine::CatalogEntry::new(
        "JSON Data Loader",
        "Loads records from a JSON document",
        "DATA_LOADER",
        NodeKind::Call,
    ));
    let engine = SyncEngine::new(ws).with_catalog(catalog);

    let hits = engine.search(Some("DATA_LOADER"), "csv", None);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "CSV Data Loader");

    assert!(engine.search(Some("DATA_LOADER"), "parquet", None).is_empty());
}

#[test]
fn extraction_at_empty_position_is_malformed_source() {
    let mut ws = InMemoryWorkspace::new("/proj");
    ws.add_file("main.fl");
    let engine = SyncEngine::new(ws);
    let err = engine
        .get_from_source(NodeKind::Call, &NodeRequest::at("main.fl", 99, 0))
        .unwrap_err();
    assert!(matches!(
        err,
        flowsync_engine::SyncError::MalformedSource { .. }
    ));
}
