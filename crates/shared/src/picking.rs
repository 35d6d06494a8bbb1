use crate::geometry::ScreenPoint;

/// A road as it was last drawn: already-projected endpoints only.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenEdge {
    pub id: String,
    pub start: ScreenPoint,
    pub end: ScreenPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeHit {
    pub id: String,
    pub distance: f64,
}

/// Distance from `p` to the segment `[a, b]`.
///
/// The projection parameter is clamped to `[0, 1]`, so a point beyond an end
/// measures to that endpoint. A zero-length segment uses a squared length of 1,
/// which degrades to plain point-to-point distance.
pub fn distance_to_segment(p: ScreenPoint, a: ScreenPoint, b: ScreenPoint) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        len_sq = 1.0;
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    let foot = ScreenPoint::new(a.x + t * dx, a.y + t * dy);
    p.distance(foot)
}

/// Nearest cached road to `point`, or `None` when the cache is empty.
///
/// Tolerance-agnostic: the caller decides whether the distance is close enough.
/// Ties keep the earlier cache entry.
pub fn find_nearest_edge(point: ScreenPoint, cache: &[ScreenEdge]) -> Option<EdgeHit> {
    let mut best: Option<(&ScreenEdge, f64)> = None;
    for edge in cache {
        let d = distance_to_segment(point, edge.start, edge.end);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((edge, d)),
        }
    }
    best.map(|(edge, distance)| EdgeHit {
        id: edge.id.clone(),
        distance,
    })
}

/// Nearest road within `tolerance` pixels of `point`.
pub fn pick_edge(point: ScreenPoint, cache: &[ScreenEdge], tolerance: f64) -> Option<EdgeHit> {
    find_nearest_edge(point, cache).filter(|hit| hit.distance <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{compute_transform, Transform, Viewport};
    use crate::models::Node;

    fn edge(id: &str, a: (f64, f64), b: (f64, f64)) -> ScreenEdge {
        ScreenEdge {
            id: id.to_string(),
            start: ScreenPoint::new(a.0, a.1),
            end: ScreenPoint::new(b.0, b.1),
        }
    }

    #[test]
    fn test_perpendicular_distance_inside_segment() {
        let d = distance_to_segment(
            ScreenPoint::new(50.0, 10.0),
            ScreenPoint::new(0.0, 0.0),
            ScreenPoint::new(100.0, 0.0),
        );
        assert!((d - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_foot_beyond_end_measures_to_endpoint() {
        // Perpendicular distance to the infinite line would be 3,
        // but the foot lies past B so the answer is |P - B| = 5.
        let a = ScreenPoint::new(0.0, 0.0);
        let b = ScreenPoint::new(100.0, 0.0);
        let p = ScreenPoint::new(104.0, 3.0);
        let d = distance_to_segment(p, a, b);
        assert!((d - 5.0).abs() < 1e-12);
        assert!((d - p.distance(b)).abs() < 1e-12);
    }

    #[test]
    fn test_foot_before_start_measures_to_start() {
        let a = ScreenPoint::new(10.0, 10.0);
        let b = ScreenPoint::new(10.0, 60.0);
        let p = ScreenPoint::new(13.0, 6.0);
        assert!((distance_to_segment(p, a, b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_length_segment_is_point_distance() {
        let a = ScreenPoint::new(20.0, 20.0);
        let p = ScreenPoint::new(23.0, 24.0);
        let d = distance_to_segment(p, a, a);
        assert!(d.is_finite());
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_cache_has_no_match() {
        assert_eq!(find_nearest_edge(ScreenPoint::new(1.0, 1.0), &[]), None);
    }

    #[test]
    fn test_nearest_of_several() {
        let cache = vec![
            edge("north", (0.0, 0.0), (100.0, 0.0)),
            edge("south", (0.0, 100.0), (100.0, 100.0)),
            edge("west", (0.0, 0.0), (0.0, 100.0)),
        ];
        let hit = find_nearest_edge(ScreenPoint::new(50.0, 90.0), &cache).unwrap();
        assert_eq!(hit.id, "south");
        assert!((hit.distance - 10.0).abs() < 1e-12);

        let hit = find_nearest_edge(ScreenPoint::new(4.0, 50.0), &cache).unwrap();
        assert_eq!(hit.id, "west");
    }

    #[test]
    fn test_find_nearest_ignores_tolerance() {
        let cache = vec![edge("far", (0.0, 0.0), (10.0, 0.0))];
        let hit = find_nearest_edge(ScreenPoint::new(5.0, 500.0), &cache).unwrap();
        assert_eq!(hit.id, "far");
        assert!((hit.distance - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_pick_edge_respects_tolerance() {
        let cache = vec![edge("e1", (0.0, 0.0), (100.0, 0.0))];
        assert_eq!(
            pick_edge(ScreenPoint::new(50.0, 11.0), &cache, 12.0).map(|h| h.id),
            Some("e1".to_string())
        );
        assert_eq!(pick_edge(ScreenPoint::new(50.0, 13.0), &cache, 12.0), None);
    }

    #[test]
    fn test_projected_midpoint_hits_its_own_road() {
        let nodes = vec![
            Node { id: "A".to_string(), x: -20.0, y: 35.0 },
            Node { id: "B".to_string(), x: 140.0, y: -60.0 },
            Node { id: "C".to_string(), x: 60.0, y: 200.0 },
        ];
        let viewport = Viewport::new(960.0, 640.0, 40.0);
        let t = compute_transform(&nodes, &viewport, Transform::default());
        let cache = vec![
            ScreenEdge {
                id: "ab".to_string(),
                start: t.project(-20.0, 35.0),
                end: t.project(140.0, -60.0),
            },
            ScreenEdge {
                id: "bc".to_string(),
                start: t.project(140.0, -60.0),
                end: t.project(60.0, 200.0),
            },
        ];
        let mid = t.project((-20.0 + 140.0) / 2.0, (35.0 - 60.0) / 2.0);
        let hit = find_nearest_edge(mid, &cache).unwrap();
        assert_eq!(hit.id, "ab");
        assert!(hit.distance < 1e-9);
    }
}
