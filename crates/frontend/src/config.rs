use std::time::Duration;

use trafficflow_shared::geometry::Viewport;

/// Drawing surface size in pixels. The SVG viewBox uses the same numbers, so
/// every geometry computation happens in this space.
pub const SURFACE_WIDTH_PX: f64 = 960.0;
pub const SURFACE_HEIGHT_PX: f64 = 640.0;

/// Margin kept free around the fitted network.
pub const SURFACE_PADDING_PX: f64 = 40.0;

/// Maximum distance (surface pixels) at which a click counts as "on" a road.
pub const CLICK_TOLERANCE_PX: f64 = 12.0;

pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

pub const NOTICE_LIFETIME: Duration = Duration::from_millis(3600);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerConfig {
    pub viewport: Viewport,
    pub click_tolerance_px: f64,
    pub poll_interval: Duration,
    pub notice_lifetime: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(SURFACE_WIDTH_PX, SURFACE_HEIGHT_PX, SURFACE_PADDING_PX),
            click_tolerance_px: CLICK_TOLERANCE_PX,
            poll_interval: POLL_INTERVAL,
            notice_lifetime: NOTICE_LIFETIME,
        }
    }
}
