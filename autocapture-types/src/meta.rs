//! Client-environment snapshot attached to every captured record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Width/height pair in CSS pixels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
    /// Handler-merged keys with no typed slot.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dimensions {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            extra: Map::new(),
        }
    }
}

/// Snapshot of the client environment at the moment of capture.
///
/// The mobile/touch/bot flags are derived values, computed by the host
/// layer from the user-agent string and touch capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMeta {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Minutes to add to local time to get UTC (positive west of Greenwich).
    pub timezone: i32,
    pub url: String,
    pub user_agent: String,
    pub referrer: String,
    pub screen: Dimensions,
    pub window: Dimensions,
    pub device_pixel_ratio: f64,
    pub language: String,
    pub platform: String,
    pub is_mobile: bool,
    pub is_touch: bool,
    pub is_bot: bool,
    /// Handler-merged keys with no typed slot.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
