use trafficflow_shared::geometry::{ScreenPoint, Viewport};

/// DOM id of the element wrapping the network SVG.
pub const NETWORK_CONTAINER_ID: &str = "network-container";

/// Convert container-relative CSS pixels to surface pixels.
///
/// The SVG is laid out with `width:100%; height:auto`, so both axes share the
/// factor `viewport.width / container_w`. Returns `None` for a collapsed
/// container.
pub fn container_to_surface(
    container_x: f64,
    container_y: f64,
    container_w: f64,
    viewport: &Viewport,
) -> Option<ScreenPoint> {
    if container_w <= 0.0 {
        return None;
    }
    let scale = viewport.width / container_w;
    Some(ScreenPoint::new(container_x * scale, container_y * scale))
}

/// Resolve a click in client coordinates against the live container rect.
pub fn click_to_surface(client_x: f64, client_y: f64, viewport: &Viewport) -> Option<ScreenPoint> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(NETWORK_CONTAINER_ID)?;
    let rect = element.get_bounding_client_rect();
    container_to_surface(client_x - rect.left(), client_y - rect.top(), rect.width(), viewport)
}
