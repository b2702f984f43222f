use autocapture_core::CaptureEngine;
use autocapture_host::{Document, Interaction, ManualClock, NodeRef};
use autocapture_plugin_sdk::prelude::*;
use autocapture_plugins::*;
use autocapture_storage::MemoryPersistence;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn host() -> (Arc<ManualClock>, Arc<Document>) {
    let clock = Arc::new(ManualClock::new(10_000));
    let document = Arc::new(Document::with_clock(clock.clone()));
    document.update_environment(|env| env.url = "https://shop.test/".into());
    (clock, document)
}

fn started(document: &Arc<Document>, options: CaptureOptions, keys: &[&str]) -> CaptureEngine {
    let mut registry = PluginRegistry::new();
    for key in keys {
        CaptureEngine::use_plugin(&mut registry, builtin(key).unwrap()).unwrap();
    }
    let mut engine = CaptureEngine::with_persistence(
        Arc::clone(document),
        CaptureOptions {
            capture: Vec::new(),
            ..options
        },
        Some(Arc::new(MemoryPersistence::new())),
    )
    .with_registry(registry);
    engine.start();
    engine
}

fn events(engine: &CaptureEngine) -> Vec<EventPayload> {
    engine.get_captured_events().unwrap()
}

fn scroll(y: u32) -> Interaction {
    Interaction::new("scroll", NodeRef::Window)
        .with_detail("scrollY", y)
        .with_detail("innerHeight", 800)
        .with_detail("bodyHeight", 2800)
}

// ── builtin ──────────────────────────────────────────────────────

#[test]
fn every_builtin_key_resolves() {
    for key in BUILTIN_KEYS {
        assert_eq!(builtin(key).unwrap().key(), key);
    }
    assert!(builtin("video").is_none());
}

// ── Scroll ───────────────────────────────────────────────────────

#[test]
fn scroll_records_only_new_depths() {
    let (clock, document) = host();
    let engine = started(&document, CaptureOptions::default(), &[ScrollPlugin::KEY]);

    for y in [1000, 500, 1000, 1500] {
        document.dispatch(&scroll(y));
        clock.advance(ScrollPlugin::DEFAULT_THROTTLE_MS);
    }

    let depths: Vec<_> = events(&engine)
        .iter()
        .map(|e| e.pointer("/scroll/percentage").unwrap())
        .collect();
    assert_eq!(depths, vec![json!(50), json!(75)]);

    let first = &events(&engine)[0];
    assert_eq!(first.event_type, "scroll");
    assert_eq!(first.pointer("/scroll/windowSize"), Some(json!(800.0)));
    assert_eq!(first.target.tag_name, "window");
}

#[test]
fn scroll_is_throttled() {
    let (clock, document) = host();
    let engine = started(&document, CaptureOptions::default(), &[ScrollPlugin::KEY]);

    document.dispatch(&scroll(200));
    clock.advance(50);
    document.dispatch(&scroll(1800));
    assert_eq!(events(&engine).len(), 1);
}

#[test]
fn scroll_throttle_is_configurable() {
    let (clock, document) = host();
    let mut options = CaptureOptions::default();
    options.extra.insert("scroll_throttle_ms".into(), json!(10));
    let engine = started(&document, options, &[ScrollPlugin::KEY]);

    document.dispatch(&scroll(200));
    clock.advance(10);
    document.dispatch(&scroll(1800));
    assert_eq!(events(&engine).len(), 2);
}

#[test]
fn scroll_depth_resets_on_restart() {
    let (clock, document) = host();
    let mut engine = started(&document, CaptureOptions::default(), &[ScrollPlugin::KEY]);
    document.dispatch(&scroll(1000));

    engine.stop();
    engine.start();
    clock.advance(ScrollPlugin::DEFAULT_THROTTLE_MS);
    document.dispatch(&scroll(1000));
    assert_eq!(events(&engine).len(), 2);
}

// ── Page view ────────────────────────────────────────────────────

#[test]
fn page_view_on_load_and_popstate() {
    let (_, document) = host();
    let engine = started(&document, CaptureOptions::default(), &[PageViewPlugin::KEY]);

    document.dispatch(&Interaction::new("load", NodeRef::Window).with_detail("title", "Shop"));
    document.dispatch(
        &Interaction::new("popstate", NodeRef::Window)
            .with_detail("url", "https://shop.test/cart")
            .with_detail("title", "Cart"),
    );

    let pages: Vec<_> = events(&engine).iter().map(|e| e.pointer("/page").unwrap()).collect();
    assert_eq!(
        pages,
        vec![
            json!({"url": "https://shop.test/", "title": "Shop"}),
            json!({"url": "https://shop.test/cart", "title": "Cart"}),
        ]
    );
    assert!(events(&engine).iter().all(|e| e.event_type == "page-view"));
}

// ── Mouse movement ───────────────────────────────────────────────

#[test]
fn mouse_positions_are_sampled() {
    let (clock, document) = host();
    let engine = started(&document, CaptureOptions::default(), &[MouseMovementPlugin::KEY]);
    let moved = |x: i32, y: i32| {
        Interaction::new("mousemove", NodeRef::Document)
            .with_detail("x", x)
            .with_detail("y", y)
    };

    document.dispatch(&moved(10, 20));
    clock.advance(100);
    document.dispatch(&moved(11, 21));
    clock.advance(100);
    document.dispatch(&moved(300, 400));

    let positions: Vec<_> = events(&engine).iter().map(|e| e.pointer("/mouse").unwrap()).collect();
    assert_eq!(positions, vec![json!({"x": 10, "y": 20}), json!({"x": 300, "y": 400})]);
}

#[test]
fn mouse_move_without_coordinates_is_ignored() {
    let (_, document) = host();
    let engine = started(&document, CaptureOptions::default(), &[MouseMovementPlugin::KEY]);

    document.dispatch(&Interaction::new("mousemove", NodeRef::Document));
    assert!(events(&engine).is_empty());
}

// ── Swipe ────────────────────────────────────────────────────────

fn touch(event_type: &str, x: i32, y: i32) -> Interaction {
    Interaction::new(event_type, NodeRef::Document)
        .with_detail("x", x)
        .with_detail("y", y)
}

#[test]
fn swipe_is_recorded_on_touchend() {
    let (_, document) = host();
    let engine = started(&document, CaptureOptions::default(), &[SwipePlugin::KEY]);

    document.dispatch(&touch("touchstart", 300, 200));
    assert!(events(&engine).is_empty());
    document.dispatch(&touch("touchend", 180, 210));

    let captured = events(&engine);
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].event_type, "swipe");
    assert_eq!(
        captured[0].pointer("/swipe"),
        Some(json!({"direction": "left", "distance": 120.0}))
    );
}

#[test]
fn short_touch_is_not_a_swipe() {
    let (_, document) = host();
    let engine = started(&document, CaptureOptions::default(), &[SwipePlugin::KEY]);

    document.dispatch(&touch("touchstart", 100, 100));
    document.dispatch(&touch("touchend", 110, 115));
    document.dispatch(&touch("touchend", 400, 100));
    assert!(events(&engine).is_empty());
}

#[test]
fn all_builtins_together() {
    let (_, document) = host();
    let mut engine = started(&document, CaptureOptions::default(), &BUILTIN_KEYS);
    assert_eq!(engine.registry().len(), 4);
    assert_eq!(engine.active_bindings(), 6);

    engine.stop();
    assert_eq!(document.listener_count(), 0);
}
