use std::collections::HashMap;
use std::fmt::Write as _;

use trafficflow_shared::geometry::{compute_transform, ScreenPoint, Transform, Viewport};
use trafficflow_shared::models::{Node, Snapshot};
use trafficflow_shared::picking::ScreenEdge;

// ---------------------------------------------------------------------------
// Paint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear blend from `self` (t = 0) to `other` (t = 1).
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    pub fn css(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }
}

pub const SLOW_AGENT: Rgb = Rgb::new(239, 68, 68);
pub const FAST_AGENT: Rgb = Rgb::new(34, 197, 94);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadStyle {
    Active,
    Closed,
}

struct RoadPaint {
    stroke: &'static str,
    width: f64,
    glow: &'static str,
    glow_width: f64,
}

const ACTIVE_ROAD: RoadPaint = RoadPaint {
    stroke: "#38bdf8",
    width: 6.0,
    glow: "rgba(56,189,248,0.18)",
    glow_width: 12.0,
};

const CLOSED_ROAD: RoadPaint = RoadPaint {
    stroke: "#f43f5e",
    width: 6.0,
    glow: "rgba(244,63,94,0.45)",
    glow_width: 22.0,
};

fn road_paint(style: RoadStyle) -> &'static RoadPaint {
    match style {
        RoadStyle::Active => &ACTIVE_ROAD,
        RoadStyle::Closed => &CLOSED_ROAD,
    }
}

const AGENT_RADIUS: f64 = 4.5;
const AGENT_GLOW_RADIUS: f64 = 9.0;

/// Agent fill for `velocity`, normalized by the current fastest speed limit.
///
/// The ratio only picks a color; the velocity itself is never clamped.
pub fn speed_color(velocity: f64, normalizer: f64) -> Rgb {
    let ratio = (velocity / normalizer).clamp(0.0, 1.0);
    SLOW_AGENT.lerp(FAST_AGENT, ratio)
}

// ---------------------------------------------------------------------------
// Surfaces
// ---------------------------------------------------------------------------

/// A fixed-size 2D drawing target in surface pixel coordinates.
pub trait Surface {
    fn clear(&mut self);
    fn stroke_road(&mut self, start: ScreenPoint, end: ScreenPoint, style: RoadStyle);
    fn fill_agent(&mut self, center: ScreenPoint, color: Rgb, stuck: bool);
}

/// Surface that accumulates SVG markup, shown through an inline `<svg>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    body: String,
}

impl SvgSurface {
    pub fn new(viewport: &Viewport) -> Self {
        Self {
            width: viewport.width,
            height: viewport.height,
            body: String::with_capacity(16 * 1024),
        }
    }

    /// The complete `<svg>` element. The viewBox equals the surface size so
    /// surface pixels and SVG user units coincide.
    pub fn to_svg(&self) -> String {
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" preserveAspectRatio="xMidYMid meet" style="width:100%;height:auto;display:block;"><rect width="{w}" height="{h}" fill="#0b1220"/>{body}</svg>"##,
            w = self.width,
            h = self.height,
            body = self.body
        )
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self) {
        self.body.clear();
    }

    fn stroke_road(&mut self, start: ScreenPoint, end: ScreenPoint, style: RoadStyle) {
        let paint = road_paint(style);
        let class = match style {
            RoadStyle::Active => "road",
            RoadStyle::Closed => "road road-closed",
        };
        let (x1, y1, x2, y2) = (start.x, start.y, end.x, end.y);
        let _ = write!(
            self.body,
            r#"<g class="{class}"><line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{}" stroke-width="{}" stroke-linecap="round"/><line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{}" stroke-width="{}" stroke-linecap="round"/></g>"#,
            paint.glow, paint.glow_width, paint.stroke, paint.width
        );
    }

    fn fill_agent(&mut self, center: ScreenPoint, color: Rgb, stuck: bool) {
        let (cx, cy) = (center.x, center.y);
        let fill = color.css();
        let _ = write!(
            self.body,
            r#"<circle cx="{cx}" cy="{cy}" r="{AGENT_GLOW_RADIUS}" fill="{fill}" opacity="0.25"/><circle cx="{cx}" cy="{cy}" r="{AGENT_RADIUS}" fill="{fill}"/>"#
        );
        if stuck {
            let ring = AGENT_RADIUS + 2.0;
            let _ = write!(
                self.body,
                r#"<circle class="agent-stuck" cx="{cx}" cy="{cy}" r="{ring}" fill="none" stroke="rgba(15,23,42,0.9)" stroke-width="1.5"/>"#
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Draws snapshots and owns the derived state of the last frame: the transform,
/// the screen-space road cache used for hit-testing, and the speed normalizer.
#[derive(Debug, Clone)]
pub struct Renderer {
    viewport: Viewport,
    transform: Transform,
    edges: Vec<ScreenEdge>,
    speed_normalizer: f64,
}

impl Renderer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            transform: Transform::default(),
            edges: Vec::new(),
            speed_normalizer: 1.0,
        }
    }

    /// Roads exactly as drawn in the last frame.
    pub fn edges(&self) -> &[ScreenEdge] {
        &self.edges
    }

    /// Redraw `surface` from `snapshot`.
    ///
    /// Returns `false` without touching the surface, the transform or the road
    /// cache when the snapshot carries no network or a network without nodes.
    pub fn render<S: Surface>(&mut self, snapshot: &Snapshot, surface: &mut S) -> bool {
        let Some(network) = snapshot.network.as_ref().filter(|n| !n.nodes.is_empty()) else {
            return false;
        };

        self.transform = compute_transform(&network.nodes, &self.viewport, self.transform);
        self.speed_normalizer = network.max_speed_limit().unwrap_or(0.0).max(1.0);

        surface.clear();
        self.edges.clear();

        let nodes: HashMap<&str, &Node> = network.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        for edge in &network.edges {
            let (Some(from), Some(to)) = (nodes.get(edge.from.as_str()), nodes.get(edge.to.as_str()))
            else {
                continue;
            };
            let start = self.transform.project(from.x, from.y);
            let end = self.transform.project(to.x, to.y);
            let style = if snapshot.is_closed(&edge.id) {
                RoadStyle::Closed
            } else {
                RoadStyle::Active
            };
            surface.stroke_road(start, end, style);
            self.edges.push(ScreenEdge {
                id: edge.id.clone(),
                start,
                end,
            });
        }

        for vehicle in &snapshot.vehicles {
            let center = self.transform.project_position(vehicle.coords);
            let color = speed_color(vehicle.velocity, self.speed_normalizer);
            surface.fill_agent(center, color, vehicle.stuck);
        }

        true
    }
}
