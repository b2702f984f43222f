use autocapture_storage::*;
use autocapture_types::{ClientMeta, Dimensions, EventPayload, TargetSnapshot};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};

fn payload(event_type: &str) -> EventPayload {
    EventPayload {
        event_type: event_type.into(),
        timestamp: "2024-01-01T00:00:00.000Z".into(),
        target: TargetSnapshot::new("button"),
        meta: ClientMeta {
            timestamp: 1_704_067_200_000,
            timezone: 0,
            url: "https://example.test/".into(),
            user_agent: "test-agent".into(),
            referrer: String::new(),
            screen: Dimensions::new(800, 600),
            window: Dimensions::new(800, 600),
            device_pixel_ratio: 1.0,
            language: "en".into(),
            platform: "test".into(),
            is_mobile: false,
            is_touch: false,
            is_bot: false,
            extra: Map::new(),
        },
        session: "s".into(),
        payload: None,
        extra: Map::new(),
    }
}

// ── Event collection ─────────────────────────────────────────────

#[test]
fn empty_store_has_no_events() {
    let store = MemoryPersistence::new();
    assert!(load_events(&store).unwrap().is_empty());
}

#[test]
fn append_preserves_order() {
    let store = MemoryPersistence::new();
    append_event(&store, &payload("click")).unwrap();
    append_event(&store, &payload("submit")).unwrap();
    let events = load_events(&store).unwrap();
    let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(types, vec!["click", "submit"]);
}

#[test]
fn collection_is_written_as_text() {
    let store = MemoryPersistence::new();
    append_event(&store, &payload("click")).unwrap();
    let raw = store.get_item(EVENTS_KEY).unwrap().unwrap();
    let Value::String(text) = raw else {
        panic!("expected serialized text");
    };
    assert!(text.starts_with('['));
}

#[test]
fn array_valued_collection_is_read_directly() {
    let store = MemoryPersistence::new();
    let stored = serde_json::to_value(vec![payload("change")]).unwrap();
    store.set_item(EVENTS_KEY, stored).unwrap();
    let events = load_events(&store).unwrap();
    assert_eq!(events, vec![payload("change")]);

    append_event(&store, &payload("click")).unwrap();
    assert_eq!(load_events(&store).unwrap().len(), 2);
}

#[test]
fn null_or_blank_collection_is_empty() {
    let store = MemoryPersistence::new();
    store.set_item(EVENTS_KEY, Value::Null).unwrap();
    assert!(load_events(&store).unwrap().is_empty());
    store.set_item(EVENTS_KEY, json!("  ")).unwrap();
    assert!(load_events(&store).unwrap().is_empty());
}

#[test]
fn corrupt_collection_is_rejected_and_not_overwritten() {
    let store = MemoryPersistence::new();
    store.set_item(EVENTS_KEY, json!({"not": "an array"})).unwrap();
    assert!(matches!(
        load_events(&store).unwrap_err(),
        StorageError::Corrupt { .. }
    ));
    assert!(append_event(&store, &payload("click")).is_err());
    assert_eq!(
        store.get_item(EVENTS_KEY).unwrap(),
        Some(json!({"not": "an array"}))
    );
}

#[test]
fn file_backed_collection_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let store = FilePersistence::open(dir.path().join("events.json")).unwrap();
    append_event(&store, &payload("click")).unwrap();
    let reopened = FilePersistence::open(dir.path().join("events.json")).unwrap();
    assert_eq!(load_events(&reopened).unwrap(), vec![payload("click")]);
}

// ── Session ids ──────────────────────────────────────────────────

#[test]
fn supplied_session_wins() {
    let store = MemoryPersistence::new();
    let id = session_id(Some(&store), Some("caller-id")).unwrap();
    assert_eq!(id.as_str(), "caller-id");
    assert!(store.get_item(VISITOR_ID_KEY).unwrap().is_none());
}

#[test]
fn empty_supplied_session_is_ignored() {
    let store = MemoryPersistence::new();
    let id = session_id(Some(&store), Some("")).unwrap();
    assert!(!id.as_str().is_empty());
}

#[test]
fn visitor_id_is_created_once_and_reused() {
    let store = MemoryPersistence::new();
    let first = session_id(Some(&store), None).unwrap();
    let second = session_id(Some(&store), None).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        store.get_item(VISITOR_ID_KEY).unwrap(),
        Some(json!(first.as_str()))
    );
}

#[test]
fn without_persistence_every_call_is_fresh() {
    let a = session_id(None, None).unwrap();
    let b = session_id(None, None).unwrap();
    assert_ne!(a, b);
}
