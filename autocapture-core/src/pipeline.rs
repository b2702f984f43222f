//! Turns an interaction into an [`EventPayload`] and persists it.

use crate::{CaptureError, CaptureResult};
use autocapture_host::{get_attribute_value, Document, Interaction, NodeRef};
use autocapture_storage::{append_event, load_events, session_id, Persistence};
use autocapture_types::{CaptureOptions, EventPayload, SessionId, TargetSnapshot};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-call inputs of [`prepare_event_payload`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PrepareOptions<'a> {
    /// Attribute names to read from the resolved target.
    pub attributes: &'a [String],
    /// Caller-supplied session id; wins over the stored visitor id.
    pub session_id: Option<&'a str>,
    /// Attached verbatim under `payload`.
    pub custom_payload: Option<&'a Value>,
    pub mask_text_content: bool,
}

/// Builds a record for `interaction`, labelled `event_type`.
///
/// Performs no I/O apart from creating the visitor id on first use.
pub fn prepare_event_payload(
    document: &Document,
    interaction: &Interaction,
    event_type: &str,
    options: PrepareOptions<'_>,
    persistence: Option<&dyn Persistence>,
) -> CaptureResult<EventPayload> {
    let resolved = document
        .resolve(interaction.target)
        .map_err(|_| CaptureError::TargetNotFound(interaction.target))?;
    let target = snapshot_target(document, resolved, options)?;

    let now = document.now_millis();
    let session = session_id(persistence, options.session_id).unwrap_or_else(|e| {
        warn!(error = %e, "visitor id unavailable, using a fresh session id");
        SessionId::generate()
    });

    Ok(EventPayload {
        event_type: event_type.to_string(),
        timestamp: iso_timestamp(now),
        target,
        meta: document.environment().snapshot(now),
        session: session.into_string(),
        payload: options.custom_payload.cloned(),
        extra: Map::new(),
    })
}

fn snapshot_target(
    document: &Document,
    target: NodeRef,
    options: PrepareOptions<'_>,
) -> CaptureResult<TargetSnapshot> {
    let id = match target {
        NodeRef::Window => return Ok(TargetSnapshot::new("window")),
        NodeRef::Document => return Ok(TargetSnapshot::new("document")),
        NodeRef::Element(id) => id,
    };
    let element = document
        .element(id)
        .ok_or(CaptureError::TargetNotFound(target))?;

    let mut snapshot = TargetSnapshot::new(element.tag());
    for name in options.attributes {
        let value = get_attribute_value(&element, name);
        if value.is_empty() {
            continue;
        }
        let value = if options.mask_text_content && name == "text" {
            mask_text(&value)
        } else {
            value
        };
        snapshot.attributes.insert(name.clone(), Value::String(value));
    }
    Ok(snapshot)
}

/// Replaces every non-whitespace character with `*`.
pub fn mask_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_whitespace() { c } else { '*' })
        .collect()
}

/// Formats epoch milliseconds as an RFC 3339 UTC timestamp with millisecond
/// precision, e.g. `2024-03-01T12:00:00.250Z`.
pub fn iso_timestamp(millis: u64) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Appends `payload` to the stored collection. Returns whether it was
/// stored; a missing backend counts as a failed store.
pub fn store_payload(payload: &EventPayload, persistence: Option<&dyn Persistence>) -> bool {
    let Some(persistence) = persistence else {
        debug!(event_type = %payload.event_type, "no persistence backend, record dropped");
        return false;
    };
    match append_event(persistence, payload) {
        Ok(()) => true,
        Err(e) => {
            warn!(event_type = %payload.event_type, error = %e, "failed to store record");
            false
        }
    }
}

/// The engine's configured view of the free functions above.
pub struct PayloadPipeline {
    document: Arc<Document>,
    persistence: Option<Arc<dyn Persistence>>,
    attributes: Vec<String>,
    session_id: Option<String>,
    custom_payload: Option<Value>,
    mask_text_content: bool,
}

impl PayloadPipeline {
    pub fn new(
        document: Arc<Document>,
        persistence: Option<Arc<dyn Persistence>>,
        options: &CaptureOptions,
    ) -> Self {
        Self {
            document,
            persistence,
            attributes: options.attributes.clone(),
            session_id: options.session_id.clone(),
            custom_payload: options.payload.clone(),
            mask_text_content: options.mask_text_content,
        }
    }

    pub fn prepare(&self, interaction: &Interaction, event_type: &str) -> CaptureResult<EventPayload> {
        let options = PrepareOptions {
            attributes: &self.attributes,
            session_id: self.session_id.as_deref(),
            custom_payload: self.custom_payload.as_ref(),
            mask_text_content: self.mask_text_content,
        };
        prepare_event_payload(
            &self.document,
            interaction,
            event_type,
            options,
            self.persistence.as_deref(),
        )
    }

    pub fn store(&self, payload: &EventPayload) -> bool {
        store_payload(payload, self.persistence.as_deref())
    }

    /// Every stored record, oldest first. Empty without a backend.
    pub fn captured_events(&self) -> CaptureResult<Vec<EventPayload>> {
        match &self.persistence {
            Some(persistence) => Ok(load_events(persistence.as_ref())?),
            None => Ok(Vec::new()),
        }
    }

    pub fn persistence(&self) -> Option<&Arc<dyn Persistence>> {
        self.persistence.as_ref()
    }
}
