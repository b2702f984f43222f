//! Swipe gestures.

use autocapture_plugin_sdk::prelude::*;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Dominant axis and sign of a swipe, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SwipeDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a displacement. Returns `None` below `threshold` pixels on
/// the dominant axis.
pub fn classify_swipe(dx: f64, dy: f64, threshold: f64) -> Option<(SwipeDirection, f64)> {
    let (direction, distance) = if dx.abs() >= dy.abs() {
        let direction = if dx < 0.0 { SwipeDirection::Left } else { SwipeDirection::Right };
        (direction, dx.abs())
    } else {
        let direction = if dy < 0.0 { SwipeDirection::Up } else { SwipeDirection::Down };
        (direction, dy.abs())
    };
    (distance >= threshold).then_some((direction, distance))
}

type TouchStart = Arc<Mutex<Option<(f64, f64)>>>;

fn touch_point(interaction: &Interaction) -> Option<(f64, f64)> {
    Some((interaction.detail_f64("x")?, interaction.detail_f64("y")?))
}

/// Records swipes: remembers the `touchstart` point and records on
/// `touchend` when the finger moved at least the threshold
/// (`swipe_threshold_px`, default 30).
#[derive(Debug)]
pub struct SwipePlugin {
    base: PluginBase,
    start: TouchStart,
}

impl SwipePlugin {
    pub const KEY: &'static str = "swipe";
    pub const DEFAULT_THRESHOLD_PX: u64 = 30;

    pub fn new() -> Self {
        Self {
            base: PluginBase::new(Self::KEY),
            start: Arc::default(),
        }
    }
}

impl Default for SwipePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for SwipePlugin {
    fn key(&self) -> &str {
        self.base.key()
    }

    fn on_init(&self, options: &CaptureOptions) {
        self.base.on_init(options);
    }

    fn options(&self) -> Option<CaptureOptions> {
        self.base.options()
    }

    fn bind(&self, options: &CaptureOptions) -> Vec<BindingRequest> {
        let threshold = options
            .extra_u64("swipe_threshold_px")
            .unwrap_or(Self::DEFAULT_THRESHOLD_PX) as f64;

        let start = Arc::clone(&self.start);
        let touch_start = BindingRequest::new(Self::KEY, NodeRef::Document, "touchstart", move |interaction, _| {
            *start.lock().unwrap_or_else(PoisonError::into_inner) = touch_point(interaction);
            HandlerOutcome::Skip
        });

        let start = Arc::clone(&self.start);
        let touch_end = BindingRequest::new(Self::KEY, NodeRef::Document, "touchend", move |interaction, _| {
            let began = start.lock().unwrap_or_else(PoisonError::into_inner).take();
            let (Some((x0, y0)), Some((x1, y1))) = (began, touch_point(interaction)) else {
                return HandlerOutcome::Skip;
            };
            match classify_swipe(x1 - x0, y1 - y0, threshold) {
                Some((direction, distance)) => HandlerOutcome::merge(json!({
                    "swipe": { "direction": direction.as_str(), "distance": distance }
                })),
                None => HandlerOutcome::Skip,
            }
        });

        vec![touch_start, touch_end]
    }

    fn on_stop(&self) {
        self.start
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_axis_wins() {
        assert_eq!(classify_swipe(-120.0, 20.0, 30.0), Some((SwipeDirection::Left, 120.0)));
        assert_eq!(classify_swipe(45.0, -10.0, 30.0), Some((SwipeDirection::Right, 45.0)));
        assert_eq!(classify_swipe(5.0, -80.0, 30.0), Some((SwipeDirection::Up, 80.0)));
        assert_eq!(classify_swipe(0.0, 31.0, 30.0), Some((SwipeDirection::Down, 31.0)));
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(classify_swipe(30.0, 0.0, 30.0).is_some());
        assert!(classify_swipe(29.9, 0.0, 30.0).is_none());
        assert!(classify_swipe(0.0, 0.0, 30.0).is_none());
    }
}
