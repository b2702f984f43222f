use autocapture_core::{BindingLedger, BindingOwner, EventBinding};
use autocapture_host::{Document, Element, Interaction, Listener, ListenerOptions, NodeId, NodeRef};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn counter() -> (Arc<AtomicUsize>, Listener) {
    let hits = Arc::new(AtomicUsize::new(0));
    let sink = hits.clone();
    let listener: Listener = Arc::new(move |_: &Interaction| {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    (hits, listener)
}

#[test]
fn identical_bindings_are_independent() {
    let doc = Arc::new(Document::new());
    let mut ledger = BindingLedger::new(doc.clone());
    let (hits, listener) = counter();

    let a = ledger
        .bind(EventBinding::new("click", listener.clone()), BindingOwner::Base)
        .unwrap();
    let b = ledger
        .bind(EventBinding::new("click", listener), BindingOwner::Base)
        .unwrap();
    assert_ne!(a, b);
    assert_eq!(ledger.len(), 2);

    doc.dispatch(&Interaction::new("click", NodeRef::Document));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn purge_removes_everything() {
    let doc = Arc::new(Document::new());
    let button = doc.insert(Element::new("button"));
    let mut ledger = BindingLedger::new(doc.clone());
    let (hits, listener) = counter();

    ledger
        .bind(EventBinding::new("click", listener.clone()), BindingOwner::Base)
        .unwrap();
    ledger
        .bind(
            EventBinding::new("click", listener).on(button.into()),
            BindingOwner::Plugin("recorder".into()),
        )
        .unwrap();

    assert_eq!(ledger.purge(), 2);
    assert!(ledger.is_empty());
    assert_eq!(doc.listener_count(), 0);

    doc.dispatch(&Interaction::new("click", button));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(ledger.purge(), 0);
}

#[test]
fn purge_owner_keeps_other_owners() {
    let doc = Arc::new(Document::new());
    let mut ledger = BindingLedger::new(doc.clone());
    let (_, listener) = counter();
    let scroll = BindingOwner::Plugin("scroll".into());

    ledger
        .bind(EventBinding::new("click", listener.clone()), BindingOwner::Base)
        .unwrap();
    ledger
        .bind(EventBinding::new("scroll", listener.clone()).on(NodeRef::Window), scroll.clone())
        .unwrap();
    ledger
        .bind(EventBinding::new("resize", listener).on(NodeRef::Window), scroll.clone())
        .unwrap();

    assert_eq!(ledger.purge_owner(&scroll), 2);
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.active()[0].owner, BindingOwner::Base);
    assert_eq!(doc.listener_count(), 1);
}

#[test]
fn purge_tolerates_self_removed_once_listener() {
    let doc = Arc::new(Document::new());
    let mut ledger = BindingLedger::new(doc.clone());
    let (hits, listener) = counter();
    let once = ListenerOptions {
        once: true,
        ..Default::default()
    };

    ledger
        .bind(
            EventBinding::new("load", listener).on(NodeRef::Window).with_options(once),
            BindingOwner::Base,
        )
        .unwrap();
    doc.dispatch(&Interaction::new("load", NodeRef::Window));
    assert_eq!(doc.listener_count(), 0);

    assert_eq!(ledger.purge(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn binding_unknown_target_fails_without_recording() {
    let doc = Arc::new(Document::new());
    let mut ledger = BindingLedger::new(doc);
    let (_, listener) = counter();
    let result = ledger.bind(
        EventBinding::new("click", listener).on(NodeRef::Element(NodeId::from_raw(9))),
        BindingOwner::Base,
    );
    assert!(result.is_err());
    assert!(ledger.is_empty());
}

#[test]
fn dropping_the_ledger_removes_listeners() {
    let doc = Arc::new(Document::new());
    {
        let mut ledger = BindingLedger::new(doc.clone());
        let (_, listener) = counter();
        ledger
            .bind(EventBinding::new("click", listener), BindingOwner::Base)
            .unwrap();
        assert_eq!(doc.listener_count(), 1);
    }
    assert_eq!(doc.listener_count(), 0);
}

#[test]
fn owner_display() {
    assert_eq!(BindingOwner::Base.to_string(), "base");
    assert_eq!(BindingOwner::Plugin("swipe".into()).to_string(), "plugin:swipe");
}
