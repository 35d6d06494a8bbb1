//! Simulation-space to surface-space mapping.
//!
//! The simulation uses unbounded real coordinates whose extent can change
//! between snapshots. Every render fits the current node bounding box into a
//! fixed-size drawing surface with one uniform scale, so the network keeps its
//! aspect ratio and the minimum-coordinate corner lands on the padding inset.

use crate::models::{Node, Position};

/// Smallest extent used for an axis, so a flat network never divides by zero.
const MIN_SPAN: f64 = 1.0;

/// A point in drawing-surface pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: ScreenPoint) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Fixed pixel size of the drawing surface plus the margin kept free on all sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, padding: f64) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }
}

/// Uniform scale plus offset, recomputed from every snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl Transform {
    pub fn project(&self, x: f64, y: f64) -> ScreenPoint {
        ScreenPoint {
            x: x * self.scale + self.offset_x,
            y: y * self.scale + self.offset_y,
        }
    }

    pub fn project_position(&self, p: Position) -> ScreenPoint {
        self.project(p.x, p.y)
    }
}

/// Axis-aligned bounding box of a node set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn of_nodes(nodes: &[Node]) -> Option<Self> {
        let first = nodes.first()?;
        let init = Bounds {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        Some(nodes.iter().skip(1).fold(init, |b, n| Bounds {
            min_x: b.min_x.min(n.x),
            max_x: b.max_x.max(n.x),
            min_y: b.min_y.min(n.y),
            max_y: b.max_y.max(n.y),
        }))
    }

    pub fn span_x(&self) -> f64 {
        (self.max_x - self.min_x).max(MIN_SPAN)
    }

    pub fn span_y(&self) -> f64 {
        (self.max_y - self.min_y).max(MIN_SPAN)
    }
}

/// Fit `nodes` into `viewport`. An empty node set keeps `previous`.
pub fn compute_transform(nodes: &[Node], viewport: &Viewport, previous: Transform) -> Transform {
    let Some(bounds) = Bounds::of_nodes(nodes) else {
        return previous;
    };

    let usable_w = viewport.width - 2.0 * viewport.padding;
    let usable_h = viewport.height - 2.0 * viewport.padding;
    let scale = (usable_w / bounds.span_x()).min(usable_h / bounds.span_y());

    Transform {
        scale,
        offset_x: viewport.padding - bounds.min_x * scale,
        offset_y: viewport.padding - bounds.min_y * scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, x: f64, y: f64) -> Node {
        Node {
            id: id.to_string(),
            x,
            y,
        }
    }

    fn square_viewport() -> Viewport {
        Viewport::new(400.0, 400.0, 50.0)
    }

    #[test]
    fn test_two_node_road_literal_transform() {
        // spanX = 100, spanY = max(0, 1) = 1
        // scale = min(300 / 100, 300 / 1) = 3
        let nodes = vec![node("A", 0.0, 0.0), node("B", 100.0, 0.0)];
        let t = compute_transform(&nodes, &square_viewport(), Transform::default());
        assert!((t.scale - 3.0).abs() < 1e-12);
        assert!((t.offset_x - 50.0).abs() < 1e-12);
        assert!((t.offset_y - 50.0).abs() < 1e-12);

        let a = t.project(0.0, 0.0);
        let b = t.project(100.0, 0.0);
        assert_eq!(a, ScreenPoint::new(50.0, 50.0));
        assert_eq!(b, ScreenPoint::new(350.0, 50.0));
    }

    #[test]
    fn test_empty_nodes_keep_previous_transform() {
        let previous = Transform {
            scale: 2.5,
            offset_x: -10.0,
            offset_y: 7.0,
        };
        let t = compute_transform(&[], &square_viewport(), previous);
        assert_eq!(t, previous);
    }

    #[test]
    fn test_degenerate_vertical_line_is_finite() {
        let nodes = vec![node("a", 5.0, 0.0), node("b", 5.0, 200.0), node("c", 5.0, 80.0)];
        let t = compute_transform(&nodes, &square_viewport(), Transform::default());
        assert!(t.scale.is_finite() && t.scale > 0.0);
        assert!(t.offset_x.is_finite());
        assert!(t.offset_y.is_finite());
        // Limited by the y-axis: 300 / 200
        assert!((t.scale - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_node_is_finite() {
        let nodes = vec![node("only", -42.0, 17.0)];
        let t = compute_transform(&nodes, &square_viewport(), Transform::default());
        assert!(t.scale.is_finite());
        let p = t.project(-42.0, 17.0);
        assert!((p.x - 50.0).abs() < 1e-9);
        assert!((p.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_keeps_every_node_inside_padding() {
        let viewport = Viewport::new(960.0, 640.0, 40.0);
        let nodes = vec![
            node("a", -350.0, 120.0),
            node("b", 900.0, -75.5),
            node("c", 12.0, 640.0),
            node("d", 410.0, 300.0),
        ];
        let t = compute_transform(&nodes, &viewport, Transform::default());
        let eps = 1e-9;

        let min_corner = t.project(-350.0, -75.5);
        assert!((min_corner.x - viewport.padding).abs() < eps);
        assert!((min_corner.y - viewport.padding).abs() < eps);

        for n in &nodes {
            let p = t.project(n.x, n.y);
            assert!(p.x >= viewport.padding - eps);
            assert!(p.x <= viewport.width - viewport.padding + eps);
            assert!(p.y >= viewport.padding - eps);
            assert!(p.y <= viewport.height - viewport.padding + eps);
        }
    }

    #[test]
    fn test_fit_preserves_aspect_ratio() {
        let viewport = Viewport::new(800.0, 400.0, 0.0);
        // A 100 x 100 square must stay square on a 2:1 surface
        let nodes = vec![node("a", 0.0, 0.0), node("b", 100.0, 100.0)];
        let t = compute_transform(&nodes, &viewport, Transform::default());
        let a = t.project(0.0, 0.0);
        let b = t.project(100.0, 100.0);
        assert!(((b.x - a.x) - (b.y - a.y)).abs() < 1e-9);
        assert!((t.scale - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_follows_shifting_network() {
        let viewport = square_viewport();
        let first = compute_transform(
            &[node("a", 0.0, 0.0), node("b", 100.0, 100.0)],
            &viewport,
            Transform::default(),
        );
        let second = compute_transform(
            &[node("a", 1000.0, 1000.0), node("b", 1200.0, 1200.0)],
            &viewport,
            first,
        );
        assert_ne!(first, second);
        let p = second.project(1000.0, 1000.0);
        assert!((p.x - 50.0).abs() < 1e-9);
        assert!((p.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_screen_point_distance() {
        let a = ScreenPoint::new(0.0, 0.0);
        let b = ScreenPoint::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
    }
}
