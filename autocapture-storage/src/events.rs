//! Event collection and visitor-id storage on top of [`Persistence`].

use crate::{Persistence, StorageError, StorageResult};
use autocapture_types::{EventPayload, SessionId};
use serde_json::Value;
use tracing::debug;

/// Key holding the visitor id.
pub const VISITOR_ID_KEY: &str = "autocapture.visitor_id";

/// Key holding the captured event collection.
pub const EVENTS_KEY: &str = "autocapture.events";

/// Reads the raw collection. Text values are decoded as JSON; an absent key
/// or `null` is an empty collection.
fn load_raw(persistence: &dyn Persistence) -> StorageResult<Vec<Value>> {
    let corrupt = |reason: String| StorageError::Corrupt {
        key: EVENTS_KEY.to_string(),
        reason,
    };
    match persistence.get_item(EVENTS_KEY)? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(Vec::new()),
        Some(Value::String(text)) => match serde_json::from_str::<Value>(&text)? {
            Value::Array(items) => Ok(items),
            other => Err(corrupt(format!("expected an array, found {other}"))),
        },
        Some(other) => Err(corrupt(format!("expected an array, found {other}"))),
    }
}

/// Returns every stored event, oldest first.
pub fn load_events(persistence: &dyn Persistence) -> StorageResult<Vec<EventPayload>> {
    load_raw(persistence)?
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(StorageError::from))
        .collect()
}

/// Appends `payload` to the collection (read-modify-write). The collection
/// is written back as serialized text, the way string-only stores hold it.
pub fn append_event(persistence: &dyn Persistence, payload: &EventPayload) -> StorageResult<()> {
    let mut items = load_raw(persistence)?;
    items.push(serde_json::to_value(payload)?);
    let count = items.len();
    persistence.set_item(EVENTS_KEY, Value::String(serde_json::to_string(&items)?))?;
    debug!(event_type = %payload.event_type, stored = count, "event appended");
    Ok(())
}

/// Resolves the session id for a new record.
///
/// A supplied non-empty id always wins. Otherwise the stored visitor id is
/// reused, or created and stored on first use. Without persistence a fresh
/// random id is returned on every call.
pub fn session_id(
    persistence: Option<&dyn Persistence>,
    supplied: Option<&str>,
) -> StorageResult<SessionId> {
    if let Some(id) = supplied.filter(|id| !id.is_empty()) {
        return Ok(SessionId::from_string(id));
    }
    let Some(persistence) = persistence else {
        return Ok(SessionId::generate());
    };

    match persistence.get_item(VISITOR_ID_KEY)? {
        Some(Value::String(id)) if !id.is_empty() => Ok(SessionId::from_string(id)),
        _ => {
            let id = SessionId::generate();
            persistence.set_item(VISITOR_ID_KEY, Value::String(id.to_string()))?;
            debug!(visitor_id = %id, "visitor id created");
            Ok(id)
        }
    }
}
