//! Planar helpers over closed rings and segments.
//!
//! Rings are taken as `&[Coord]` slices. A ring may or may not repeat its
//! first coordinate at the end; every helper treats it as closed either way.

use geo::Coord;

/// Ring coordinates with consecutive duplicates and the closing point removed
pub fn distinct_vertices(ring: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let mut out: Vec<Coord<f64>> = Vec::with_capacity(ring.len());
    for &c in ring {
        if out.last() != Some(&c) {
            out.push(c);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// Shoelace area; positive for counter-clockwise rings
pub fn signed_area(ring: &[Coord<f64>]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for (i, a) in ring.iter().enumerate() {
        let b = ring[(i + 1) % ring.len()];
        twice += a.x * b.y - b.x * a.y;
    }
    twice / 2.0
}

pub fn perimeter(ring: &[Coord<f64>]) -> f64 {
    if ring.len() < 2 {
        return 0.0;
    }
    (0..ring.len())
        .map(|i| distance(ring[i], ring[(i + 1) % ring.len()]))
        .sum()
}

pub fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// 2D cross product of `a` and `b`
pub fn cross(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Parameter of the projection of `p` onto segment `start..end`, clamped to `[0, 1]`
pub fn project_onto_segment(p: Coord<f64>, start: Coord<f64>, end: Coord<f64>) -> f64 {
    let d = end - start;
    let len2 = d.x * d.x + d.y * d.y;
    if len2 == 0.0 {
        return 0.0;
    }
    let w = p - start;
    ((w.x * d.x + w.y * d.y) / len2).clamp(0.0, 1.0)
}

/// Point at parameter `t` along segment `start..end`
pub fn lerp(start: Coord<f64>, end: Coord<f64>, t: f64) -> Coord<f64> {
    Coord {
        x: start.x + (end.x - start.x) * t,
        y: start.y + (end.y - start.y) * t,
    }
}

pub fn point_segment_distance(p: Coord<f64>, start: Coord<f64>, end: Coord<f64>) -> f64 {
    let t = project_onto_segment(p, start, end);
    distance(p, lerp(start, end, t))
}

/// Parameter along `a` where the open segments `a` and `b` cross, if they do
///
/// Parallel segments never report a crossing here; collinear overlap is
/// picked up through endpoint projections instead.
pub fn crossing_parameter(
    a: (Coord<f64>, Coord<f64>),
    b: (Coord<f64>, Coord<f64>),
) -> Option<f64> {
    let da = a.1 - a.0;
    let db = b.1 - b.0;
    let denom = cross(da, db);
    if denom == 0.0 {
        return None;
    }
    let offset = b.0 - a.0;
    let t = cross(offset, db) / denom;
    let u = cross(offset, da) / denom;
    ((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)).then_some(t)
}

/// Shortest distance between two segments
pub fn segment_distance(a: (Coord<f64>, Coord<f64>), b: (Coord<f64>, Coord<f64>)) -> f64 {
    if crossing_parameter(a, b).is_some() {
        return 0.0;
    }
    point_segment_distance(a.0, b.0, b.1)
        .min(point_segment_distance(a.1, b.0, b.1))
        .min(point_segment_distance(b.0, a.0, a.1))
        .min(point_segment_distance(b.1, a.0, a.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn test_distinct_vertices_drops_closure_and_repeats() {
        let ring = [c(0.0, 0.0), c(0.0, 1.0), c(0.0, 1.0), c(1.0, 1.0), c(0.0, 0.0)];
        assert_eq!(distinct_vertices(&ring), vec![c(0.0, 0.0), c(0.0, 1.0), c(1.0, 1.0)]);
    }

    #[test]
    fn test_signed_area_orientation() {
        let ccw = [c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 1.0)];
        let cw: Vec<_> = ccw.iter().rev().copied().collect();
        assert_eq!(signed_area(&ccw), 1.0);
        assert_eq!(signed_area(&cw), -1.0);
        assert_eq!(perimeter(&ccw), 4.0);
    }

    #[test]
    fn test_crossing_parameter() {
        let t = crossing_parameter((c(0.0, 0.0), c(2.0, 0.0)), (c(1.0, -1.0), c(1.0, 1.0)));
        assert_eq!(t, Some(0.5));
        assert!(crossing_parameter((c(0.0, 0.0), c(1.0, 0.0)), (c(0.0, 1.0), c(1.0, 1.0))).is_none());
    }

    #[test]
    fn test_segment_distance() {
        let d = segment_distance((c(0.0, 0.0), c(1.0, 0.0)), (c(0.5, 2.0), c(0.5, 3.0)));
        assert!((d - 2.0).abs() < 1e-12);
        assert_eq!(segment_distance((c(0.0, 0.0), c(1.0, 1.0)), (c(0.0, 1.0), c(1.0, 0.0))), 0.0);
    }
}
