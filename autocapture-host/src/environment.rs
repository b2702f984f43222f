//! Client environment of the host document.

use autocapture_types::{ClientMeta, Dimensions};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::sync::LazyLock;

static MOBILE_UA: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)Android|webOS|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini").ok()
});

static BOT_UA: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)bot|googlebot|crawler|spider|robot|crawling").ok());

/// True when the user agent looks like a phone or tablet.
#[must_use]
pub fn is_mobile_device(user_agent: &str) -> bool {
    MOBILE_UA.as_ref().is_some_and(|re| re.is_match(user_agent))
}

/// True when the user agent looks like a crawler.
#[must_use]
pub fn is_bot(user_agent: &str) -> bool {
    BOT_UA.as_ref().is_some_and(|re| re.is_match(user_agent))
}

/// What the host knows about its client at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostEnvironment {
    pub url: String,
    pub title: String,
    pub user_agent: String,
    pub referrer: String,
    pub screen: Dimensions,
    pub viewport: Dimensions,
    pub device_pixel_ratio: f64,
    pub language: String,
    pub platform: String,
    /// Minutes to add to local time to get UTC.
    pub timezone_offset_minutes: i32,
    pub max_touch_points: u32,
    pub touch_events: bool,
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self {
            url: "about:blank".to_string(),
            title: String::new(),
            user_agent: String::new(),
            referrer: String::new(),
            screen: Dimensions::default(),
            viewport: Dimensions::default(),
            device_pixel_ratio: 1.0,
            language: "en-US".to_string(),
            platform: String::new(),
            timezone_offset_minutes: 0,
            max_touch_points: 0,
            touch_events: false,
        }
    }
}

impl HostEnvironment {
    #[must_use]
    pub fn is_touch(&self) -> bool {
        self.touch_events || self.max_touch_points > 0
    }

    /// Snapshot for a record captured at `timestamp` (epoch millis).
    #[must_use]
    pub fn snapshot(&self, timestamp: u64) -> ClientMeta {
        ClientMeta {
            timestamp,
            timezone: self.timezone_offset_minutes,
            url: self.url.clone(),
            user_agent: self.user_agent.clone(),
            referrer: self.referrer.clone(),
            screen: self.screen.clone(),
            window: self.viewport.clone(),
            device_pixel_ratio: self.device_pixel_ratio,
            language: self.language.clone(),
            platform: self.platform.clone(),
            is_mobile: is_mobile_device(&self.user_agent),
            is_touch: self.is_touch(),
            is_bot: is_bot(&self.user_agent),
            extra: Map::new(),
        }
    }
}
