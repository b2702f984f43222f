//! Scene model and replay driver for the `autocapture-replay` binary.

use anyhow::{bail, Context, Result};
use autocapture_core::CaptureEngine;
use autocapture_host::{Document, Element, HostEnvironment, Interaction, ManualClock, NodeId, NodeRef};
use autocapture_plugin_sdk::PluginRegistry;
use autocapture_types::{CaptureOptions, EventPayload};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A scripted document plus the interactions to play against it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    /// Clock value at the start of the replay, in epoch milliseconds.
    pub start_ms: u64,
    pub environment: Option<HostEnvironment>,
    pub elements: Vec<SceneElement>,
    pub interactions: Vec<SceneInteraction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneElement {
    pub id: u64,
    #[serde(flatten)]
    pub element: Element,
}

/// `"window"`, `"document"` or an element id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SceneTarget {
    Element(u64),
    Named(String),
}

impl SceneTarget {
    fn resolve(&self) -> Result<NodeRef> {
        Ok(match self {
            Self::Element(id) => NodeRef::Element(NodeId::from_raw(*id)),
            Self::Named(name) if name == "window" => NodeRef::Window,
            Self::Named(name) if name == "document" => NodeRef::Document,
            Self::Named(name) => bail!("unknown interaction target '{name}'"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneInteraction {
    /// Offset from `start_ms`.
    pub at_ms: u64,
    #[serde(rename = "type")]
    pub event_type: String,
    pub target: SceneTarget,
    #[serde(default)]
    pub detail: Map<String, Value>,
}

/// Outcome of one replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    pub dispatched: usize,
    pub events: Vec<EventPayload>,
}

pub fn load_scene(path: &Path) -> Result<Scene> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse scene file {}", path.display()))
}

/// Builds the document, runs every interaction in time order through a
/// started engine, stops it and returns the stored records.
pub fn replay(scene: &Scene, options: CaptureOptions) -> Result<ReplayReport> {
    let clock = Arc::new(ManualClock::new(scene.start_ms));
    let document = Arc::new(Document::with_clock(clock.clone()));
    if let Some(environment) = &scene.environment {
        document.set_environment(environment.clone());
    }
    for node in &scene.elements {
        document.insert_with_id(NodeId::from_raw(node.id), node.element.clone());
    }

    let mut registry = PluginRegistry::new();
    for key in &options.plugins {
        match autocapture_plugins::builtin(key) {
            Some(plugin) => CaptureEngine::use_plugin(&mut registry, plugin)?,
            None => warn!(plugin_key = %key, "unknown plugin key, skipped"),
        }
    }

    let mut engine = CaptureEngine::new(Arc::clone(&document), options)
        .context("Failed to create capture engine")?
        .with_registry(registry);
    engine.start();

    let mut interactions: Vec<&SceneInteraction> = scene.interactions.iter().collect();
    interactions.sort_by_key(|i| i.at_ms);

    let mut dispatched = 0;
    for step in interactions {
        clock.set(scene.start_ms.saturating_add(step.at_ms));
        let interaction = Interaction {
            event_type: step.event_type.clone(),
            target: step.target.resolve()?,
            detail: step.detail.clone(),
        };
        let listeners = document.dispatch(&interaction);
        debug!(
            at_ms = step.at_ms,
            event_type = %interaction.event_type,
            node = %interaction.target,
            listeners,
            "dispatched"
        );
        dispatched += 1;
    }

    engine.stop();
    let events = engine.get_captured_events()?;
    info!(dispatched, captured = events.len(), "Replay finished");
    Ok(ReplayReport { dispatched, events })
}

/// One line per record: time, type, target and captured attributes.
pub fn format_event(event: &EventPayload) -> String {
    let attributes = event
        .target
        .attributes
        .iter()
        .map(|(name, value)| match value {
            Value::String(text) => format!("{name}={text:?}"),
            other => format!("{name}={other}"),
        })
        .collect::<Vec<_>>()
        .join(" ");
    let extra = if event.extra.is_empty() {
        String::new()
    } else {
        format!(" {}", Value::Object(event.extra.clone()))
    };
    format!(
        "{} {:<14} <{}> {}{}",
        event.timestamp, event.event_type, event.target.tag_name, attributes, extra
    )
    .trim_end()
    .to_string()
}
