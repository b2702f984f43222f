use autocapture_core::{prepare_event_payload, store_payload, CaptureError, PrepareOptions};
use autocapture_host::{
    Document, Element, HostEnvironment, Interaction, ManualClock, NodeId, NodeRef,
};
use autocapture_storage::{load_events, MemoryPersistence, Persistence, VISITOR_ID_KEY};
use autocapture_types::Dimensions;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

fn document() -> Document {
    let doc = Document::with_clock(Arc::new(ManualClock::new(1_709_294_400_250)));
    doc.set_environment(HostEnvironment {
        url: "https://shop.test/cart".into(),
        user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)".into(),
        screen: Dimensions::new(390, 844),
        viewport: Dimensions::new(390, 664),
        device_pixel_ratio: 3.0,
        max_touch_points: 5,
        ..Default::default()
    });
    doc
}

fn attrs(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

// ── prepare_event_payload ────────────────────────────────────────

#[test]
fn builds_record_from_element() {
    let doc = document();
    let button = doc.insert(
        Element::new("BUTTON")
            .with_text("Buy")
            .with_attribute("class", "btn primary")
            .with_attribute("id", "buy"),
    );
    let names = attrs(&["text", "className", "id", "href"]);
    let options = PrepareOptions {
        attributes: &names,
        session_id: Some("s-1"),
        ..Default::default()
    };

    let payload =
        prepare_event_payload(&doc, &Interaction::new("click", button), "click", options, None)
            .unwrap();

    assert_eq!(payload.event_type, "click");
    assert_eq!(payload.timestamp, "2024-03-01T12:00:00.250Z");
    assert_eq!(payload.session, "s-1");
    assert_eq!(payload.target.tag_name, "button");
    assert_eq!(payload.target.attribute("text"), Some("Buy"));
    assert_eq!(payload.target.attribute("className"), Some("btn primary"));
    assert_eq!(payload.target.attribute("id"), Some("buy"));
    assert_eq!(payload.target.attribute("href"), None);
    assert!(payload.payload.is_none());
}

#[test]
fn environment_snapshot_is_attached() {
    let doc = document();
    let payload = prepare_event_payload(
        &doc,
        &Interaction::new("load", NodeRef::Window),
        "page-view",
        PrepareOptions::default(),
        None,
    )
    .unwrap();

    assert_eq!(payload.target.tag_name, "window");
    assert_eq!(payload.meta.timestamp, 1_709_294_400_250);
    assert_eq!(payload.meta.url, "https://shop.test/cart");
    assert_eq!(payload.meta.screen, Dimensions::new(390, 844));
    assert!(payload.meta.is_mobile);
    assert!(payload.meta.is_touch);
    assert!(!payload.meta.is_bot);
}

#[test]
fn proxy_target_resolves_to_referenced_element() {
    let doc = document();
    let icon = doc.insert(Element::new("svg").with_attribute("title", "Cart"));
    let proxy = doc.insert(Element::new("use").with_use_element(icon));
    let names = attrs(&["title"]);

    let payload = prepare_event_payload(
        &doc,
        &Interaction::new("click", proxy),
        "click",
        PrepareOptions {
            attributes: &names,
            ..Default::default()
        },
        None,
    )
    .unwrap();
    assert_eq!(payload.target.tag_name, "svg");
    assert_eq!(payload.target.attribute("title"), Some("Cart"));
}

#[test]
fn unknown_target_is_an_error() {
    let doc = document();
    let err = prepare_event_payload(
        &doc,
        &Interaction::new("click", NodeId::from_raw(7)),
        "click",
        PrepareOptions::default(),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, CaptureError::TargetNotFound(_)));
}

#[test]
fn text_is_masked_on_request() {
    let doc = document();
    let input = doc.insert(Element::new("label").with_text("Card 4242"));
    let names = attrs(&["text", "tagName"]);

    let payload = prepare_event_payload(
        &doc,
        &Interaction::new("click", input),
        "click",
        PrepareOptions {
            attributes: &names,
            mask_text_content: true,
            ..Default::default()
        },
        None,
    )
    .unwrap();
    assert_eq!(payload.target.attribute("text"), Some("**** ****"));
    assert_eq!(payload.target.attribute("tagName"), Some("label"));
}

#[test]
fn custom_payload_is_attached_verbatim() {
    let doc = document();
    let custom = json!({"experiment": "b", "flags": [1, 2]});
    let payload = prepare_event_payload(
        &doc,
        &Interaction::new("load", NodeRef::Document),
        "load",
        PrepareOptions {
            custom_payload: Some(&custom),
            ..Default::default()
        },
        None,
    )
    .unwrap();
    assert_eq!(payload.payload, Some(custom));
}

// ── Session ids ──────────────────────────────────────────────────

#[test]
fn visitor_id_is_created_once() {
    let doc = document();
    let store = MemoryPersistence::new();
    let interaction = Interaction::new("load", NodeRef::Window);

    let first =
        prepare_event_payload(&doc, &interaction, "load", PrepareOptions::default(), Some(&store))
            .unwrap();
    let second =
        prepare_event_payload(&doc, &interaction, "load", PrepareOptions::default(), Some(&store))
            .unwrap();

    assert_eq!(first.session, second.session);
    assert_eq!(
        store.get_item(VISITOR_ID_KEY).unwrap(),
        Some(Value::String(first.session.clone()))
    );
}

#[test]
fn without_persistence_each_record_gets_a_fresh_session() {
    let doc = document();
    let interaction = Interaction::new("load", NodeRef::Window);
    let a = prepare_event_payload(&doc, &interaction, "load", PrepareOptions::default(), None)
        .unwrap();
    let b = prepare_event_payload(&doc, &interaction, "load", PrepareOptions::default(), None)
        .unwrap();
    assert_ne!(a.session, b.session);
}

// ── store_payload ────────────────────────────────────────────────

#[test]
fn store_appends_in_order() {
    let doc = document();
    let store = MemoryPersistence::new();
    for label in ["first", "second"] {
        let payload = prepare_event_payload(
            &doc,
            &Interaction::new("load", NodeRef::Window),
            label,
            PrepareOptions::default(),
            Some(&store),
        )
        .unwrap();
        assert!(store_payload(&payload, Some(&store)));
    }

    let types: Vec<_> = load_events(&store)
        .unwrap()
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(types, vec!["first", "second"]);
}

#[test]
fn store_without_backend_fails() {
    let doc = document();
    let payload = prepare_event_payload(
        &doc,
        &Interaction::new("load", NodeRef::Window),
        "load",
        PrepareOptions::default(),
        None,
    )
    .unwrap();
    assert!(!store_payload(&payload, None));
}

#[test]
fn store_on_corrupt_collection_fails() {
    let doc = document();
    let store = MemoryPersistence::new();
    store
        .set_item(autocapture_storage::EVENTS_KEY, json!({"not": "a list"}))
        .unwrap();
    let payload = prepare_event_payload(
        &doc,
        &Interaction::new("load", NodeRef::Window),
        "load",
        PrepareOptions::default(),
        None,
    )
    .unwrap();
    assert!(!store_payload(&payload, Some(&store)));
}
