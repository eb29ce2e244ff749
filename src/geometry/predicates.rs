//! Touch / intersect / containment predicates between multi-polygons
//!
//! All predicates share one fixed absolute tolerance. A point within
//! `epsilon` of a boundary counts as on that boundary, so edges separated
//! by a floating-point gap smaller than `epsilon` are treated as shared.
//!
//! # Algorithm
//! Every boundary edge of A is cut at each place B's boundary meets it
//! (proper crossings and B vertices within `epsilon`). Each resulting
//! piece lies wholly inside, outside, or along the boundary of B, so
//! classifying its midpoint classifies the piece. Pieces along B's
//! boundary are resolved by comparing orientations: the coincident edge
//! of B says which side B's interior is on, and A's edge says the same
//! for A. No distance is involved, so arbitrarily thin parcels resolve
//! the same way as wide ones. Running the same trace from B's side gives
//! enough evidence to decide boundary contact, interior overlap and
//! coverage.

use std::fmt;

use geo::{Coord, MultiPolygon};
use thiserror::Error;

use super::bounds::Bounds;
use super::ring::{
    crossing_parameter, distance, distinct_vertices, lerp, point_segment_distance,
    project_onto_segment, segment_distance, signed_area,
};
use super::validation::{Degeneracy, validate_multipolygon};
use super::wkt::to_wkt;

/// Default boundary tolerance, in coordinate units
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Predicate that was being evaluated when a geometry was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Touches,
    Intersects,
    Within,
    Adjacent,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Touches => "touches",
            Operation::Intersects => "intersects",
            Operation::Within => "within",
            Operation::Adjacent => "adjacent",
        })
    }
}

/// Which operand of a binary predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Left => "left",
            Side::Right => "right",
        })
    }
}

/// A predicate was asked to evaluate a degenerate geometry
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{operation} failed: {side} geometry is degenerate")]
pub struct TopologyError {
    pub operation: Operation,
    pub side: Side,
    #[source]
    pub cause: Degeneracy,
    /// WKT of the left operand
    pub left: String,
    /// WKT of the right operand
    pub right: String,
}

/// Everything the predicates need to know about a pair of geometries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Relation {
    /// Some boundary point of one lies on the boundary of the other
    pub boundaries_meet: bool,
    /// The open interiors overlap
    pub interiors_meet: bool,
    /// Every point of the left operand lies in the right one or on its boundary
    pub left_covered: bool,
    /// Every point of the right operand lies in the left one or on its boundary
    pub right_covered: bool,
}

impl Relation {
    pub fn intersects(&self) -> bool {
        self.boundaries_meet || self.interiors_meet
    }

    pub fn touches(&self) -> bool {
        self.boundaries_meet && !self.interiors_meet
    }

    pub fn is_equal(&self) -> bool {
        self.left_covered && self.right_covered
    }

    /// Left lies inside right and the two are not the same shape
    pub fn left_within(&self) -> bool {
        self.left_covered && !self.right_covered
    }

    /// Right lies inside left and the two are not the same shape
    pub fn right_within(&self) -> bool {
        self.right_covered && !self.left_covered
    }

    /// Parcels are neighbours when they share boundary only, or overlap
    /// partially; pure containment is a data anomaly, not adjacency.
    pub fn is_adjacent(&self) -> bool {
        self.touches() || (self.intersects() && !self.left_within() && !self.right_within())
    }
}

/// Position of a point relative to a geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Inside,
    Boundary,
    Outside,
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    start: Coord<f64>,
    end: Coord<f64>,
    /// Polygon interior lies to the left of `start -> end`
    interior_left: bool,
    /// Index of the owning polygon in the multi-polygon
    polygon: usize,
}

impl Edge {
    fn as_pair(&self) -> (Coord<f64>, Coord<f64>) {
        (self.start, self.end)
    }

    fn bounds(&self) -> Bounds {
        Bounds {
            min_x: self.start.x.min(self.end.x),
            max_x: self.start.x.max(self.end.x),
            min_y: self.start.y.min(self.end.y),
            max_y: self.start.y.max(self.end.y),
        }
    }

    fn passes_near(&self, p: Coord<f64>, epsilon: f64) -> bool {
        point_segment_distance(p, self.start, self.end) <= epsilon
    }

    /// Both interiors lie on the same side of a piece shared with `other`
    fn same_interior_side(&self, other: &Edge) -> Option<bool> {
        let d = self.end - self.start;
        let o = other.end - other.start;
        let dot = d.x * o.x + d.y * o.y;
        if dot == 0.0 {
            return None;
        }
        Some((dot > 0.0) == (self.interior_left == other.interior_left))
    }
}

/// A validated geometry with its edges and bounds extracted
#[derive(Debug, Clone)]
pub struct PreparedBoundary<'a> {
    geometry: &'a MultiPolygon<f64>,
    edges: Vec<Edge>,
    bounds: Bounds,
}

impl<'a> PreparedBoundary<'a> {
    pub fn geometry(&self) -> &'a MultiPolygon<f64> {
        self.geometry
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Classify a point against this geometry
    pub fn locate(&self, p: Coord<f64>, epsilon: f64) -> Location {
        let reach = self.bounds.inflate(epsilon);
        if p.x < reach.min_x || p.x > reach.max_x || p.y < reach.min_y || p.y > reach.max_y {
            return Location::Outside;
        }

        if self
            .edges
            .iter()
            .any(|e| point_segment_distance(p, e.start, e.end) <= epsilon)
        {
            return Location::Boundary;
        }

        // Crossing parity per polygon; edges are grouped by polygon, and the
        // point is inside when any polygon claims it.
        let mut inside = false;
        let mut current = None;
        for e in &self.edges {
            if current != Some(e.polygon) {
                if inside {
                    return Location::Inside;
                }
                current = Some(e.polygon);
            }
            let (a, b) = (e.start, e.end);
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x {
                    inside = !inside;
                }
            }
        }

        if inside {
            Location::Inside
        } else {
            Location::Outside
        }
    }

    /// Does this geometry's interior border the piece `from..to` of `edge`
    /// on the same side as the interior of `edge`'s geometry?
    ///
    /// The piece runs along this boundary. Edges holding both ends of the
    /// piece are its coincident edges; when none do (a grazing contact) any
    /// edge near the midpoint decides.
    fn borders_inward(&self, edge: &Edge, from: Coord<f64>, to: Coord<f64>, epsilon: f64) -> bool {
        let mid = lerp(from, to, 0.5);
        let mut coincident = self
            .edges
            .iter()
            .filter(|o| o.passes_near(from, epsilon) && o.passes_near(to, epsilon))
            .peekable();
        if coincident.peek().is_some() {
            return coincident.any(|o| edge.same_interior_side(o) == Some(true));
        }
        self.edges
            .iter()
            .filter(|o| o.passes_near(mid, epsilon))
            .any(|o| edge.same_interior_side(o) == Some(true))
    }

    /// Walk this boundary against `other` and record what it runs through
    fn trace(&self, other: &PreparedBoundary<'_>, epsilon: f64) -> Trace {
        let mut trace = Trace::default();
        let reach = other.bounds.inflate(epsilon);
        let mut cuts: Vec<f64> = Vec::new();

        for edge in &self.edges {
            if !edge.bounds().intersects(&reach) {
                trace.leaves = true;
                continue;
            }

            cuts.clear();
            cuts.extend([0.0, 1.0]);
            for o in &other.edges {
                if segment_distance(edge.as_pair(), o.as_pair()) > epsilon {
                    continue;
                }
                trace.contact = true;

                for p in [o.start, o.end] {
                    let t = project_onto_segment(p, edge.start, edge.end);
                    if distance(p, lerp(edge.start, edge.end, t)) <= epsilon {
                        cuts.push(t);
                    }
                }
                if let Some(t) = crossing_parameter(edge.as_pair(), o.as_pair()) {
                    cuts.push(t);
                }
            }
            cuts.sort_by(f64::total_cmp);

            let length = distance(edge.start, edge.end);
            for w in cuts.windows(2) {
                let span = (w[1] - w[0]) * length;
                if span <= epsilon {
                    continue;
                }
                let from = lerp(edge.start, edge.end, w[0]);
                let to = lerp(edge.start, edge.end, w[1]);
                match other.locate(lerp(from, to, 0.5), epsilon) {
                    Location::Inside => trace.crosses_interior = true,
                    Location::Outside => trace.leaves = true,
                    Location::Boundary => {
                        if other.borders_inward(edge, from, to, epsilon) {
                            trace.shares_inward = true;
                        } else {
                            trace.shares_outward = true;
                        }
                    }
                }
            }
        }

        trace
    }
}

/// Evidence gathered by walking one boundary against another geometry
#[derive(Debug, Default)]
struct Trace {
    /// Boundaries come within epsilon somewhere
    contact: bool,
    /// A piece of this boundary runs through the other's interior
    crosses_interior: bool,
    /// A piece of this boundary runs outside the other geometry
    leaves: bool,
    /// A shared piece with both interiors on the same side
    shares_inward: bool,
    /// A shared piece with the interiors on opposite sides
    shares_outward: bool,
}

/// Predicate evaluator with a fixed tolerance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Topology {
    epsilon: f64,
}

impl Default for Topology {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl Topology {
    /// Negative or NaN tolerances are clamped to zero
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon: if epsilon > 0.0 { epsilon } else { 0.0 },
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Validate a geometry and extract its edges
    pub fn prepare<'a>(
        &self,
        geometry: &'a MultiPolygon<f64>,
    ) -> Result<PreparedBoundary<'a>, Degeneracy> {
        validate_multipolygon(geometry, self.epsilon)?;

        let mut edges = Vec::new();
        for (p, polygon) in geometry.iter().enumerate() {
            let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
            for (r, ring) in rings.enumerate() {
                let vertices = distinct_vertices(&ring.0);
                let counter_clockwise = signed_area(&vertices) > 0.0;
                // holes keep the polygon interior on their outside
                let interior_left = if r == 0 {
                    counter_clockwise
                } else {
                    !counter_clockwise
                };
                let n = vertices.len();
                edges.extend((0..n).map(|i| Edge {
                    start: vertices[i],
                    end: vertices[(i + 1) % n],
                    interior_left,
                    polygon: p,
                }));
            }
        }

        let bounds = Bounds::of_multipolygon(geometry).ok_or(Degeneracy::Empty)?;
        Ok(PreparedBoundary {
            geometry,
            edges,
            bounds,
        })
    }

    /// Cheap rejection: geometries whose inflated bounds are disjoint
    /// cannot touch or intersect
    pub fn may_interact(&self, a: &PreparedBoundary<'_>, b: &PreparedBoundary<'_>) -> bool {
        a.bounds.inflate(self.epsilon).intersects(&b.bounds)
    }

    /// Relate two already validated geometries with the full boundary trace
    pub fn relate_prepared(&self, a: &PreparedBoundary<'_>, b: &PreparedBoundary<'_>) -> Relation {
        let forward = a.trace(b, self.epsilon);
        let backward = b.trace(a, self.epsilon);

        Relation {
            boundaries_meet: forward.contact || backward.contact,
            interiors_meet: forward.crosses_interior
                || backward.crosses_interior
                || forward.shares_inward
                || backward.shares_inward,
            left_covered: !forward.leaves && !forward.shares_outward && !backward.crosses_interior,
            right_covered: !backward.leaves
                && !backward.shares_outward
                && !forward.crosses_interior,
        }
    }

    /// Validate both operands and relate them
    pub fn relate(
        &self,
        operation: Operation,
        a: &MultiPolygon<f64>,
        b: &MultiPolygon<f64>,
    ) -> Result<Relation, TopologyError> {
        let fail = |side: Side, cause: Degeneracy| TopologyError {
            operation,
            side,
            cause,
            left: to_wkt(a),
            right: to_wkt(b),
        };
        let left = self.prepare(a).map_err(|cause| fail(Side::Left, cause))?;
        let right = self.prepare(b).map_err(|cause| fail(Side::Right, cause))?;
        if !self.may_interact(&left, &right) {
            return Ok(Relation::default());
        }
        Ok(self.relate_prepared(&left, &right))
    }

    /// Shared boundary points and no shared interior points
    pub fn touches(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Result<bool, TopologyError> {
        Ok(self.relate(Operation::Touches, a, b)?.touches())
    }

    /// At least one shared point, boundary or interior
    pub fn intersects(
        &self,
        a: &MultiPolygon<f64>,
        b: &MultiPolygon<f64>,
    ) -> Result<bool, TopologyError> {
        Ok(self.relate(Operation::Intersects, a, b)?.intersects())
    }

    /// `a` lies inside or on the boundary of `b`, and `a != b`
    pub fn within(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Result<bool, TopologyError> {
        Ok(self.relate(Operation::Within, a, b)?.left_within())
    }

    /// `touches(a,b) || (intersects(a,b) && !within(a,b) && !within(b,a))`
    pub fn is_adjacent(
        &self,
        a: &MultiPolygon<f64>,
        b: &MultiPolygon<f64>,
    ) -> Result<bool, TopologyError> {
        Ok(self.relate(Operation::Adjacent, a, b)?.is_adjacent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::parse_multipolygon;

    fn mp(text: &str) -> MultiPolygon<f64> {
        parse_multipolygon(text).unwrap()
    }

    const UNIT: &str = "MULTIPOLYGON(((0 0,0 1,1 1,1 0,0 0)))";

    #[test]
    fn test_disjoint_squares() {
        let topo = Topology::default();
        let a = mp(UNIT);
        let b = mp("MULTIPOLYGON(((5 5,5 6,6 6,6 5,5 5)))");

        assert!(!topo.touches(&a, &b).unwrap());
        assert!(!topo.intersects(&a, &b).unwrap());
        assert!(!topo.within(&a, &b).unwrap());
        assert!(!topo.is_adjacent(&a, &b).unwrap());
    }

    #[test]
    fn test_shared_edge_touches() {
        let topo = Topology::default();
        let a = mp(UNIT);
        let b = mp("MULTIPOLYGON(((1 0,1 1,2 1,2 0,1 0)))");

        assert!(topo.touches(&a, &b).unwrap());
        assert!(topo.touches(&b, &a).unwrap());
        assert!(topo.intersects(&a, &b).unwrap());
        assert!(topo.is_adjacent(&a, &b).unwrap());
    }

    #[test]
    fn test_partial_shared_edge_touches() {
        let a = mp(UNIT);
        let b = mp("MULTIPOLYGON(((1 0.5,2 0.5,2 1.5,1 1.5,1 0.5)))");
        assert!(Topology::default().touches(&a, &b).unwrap());
    }

    #[test]
    fn test_corner_contact_touches() {
        let a = mp(UNIT);
        let b = mp("MULTIPOLYGON(((1 1,1 2,2 2,2 1,1 1)))");
        let relation = Topology::default().relate(Operation::Adjacent, &a, &b).unwrap();

        assert!(relation.touches());
        assert!(relation.is_adjacent());
    }

    #[test]
    fn test_containment_is_not_adjacent() {
        let topo = Topology::default();
        let inner = mp("MULTIPOLYGON(((2 2,2 3,3 3,3 2,2 2)))");
        let outer = mp("MULTIPOLYGON(((0 0,0 10,10 10,10 0,0 0)))");

        assert!(topo.intersects(&inner, &outer).unwrap());
        assert!(!topo.touches(&inner, &outer).unwrap());
        assert!(topo.within(&inner, &outer).unwrap());
        assert!(!topo.within(&outer, &inner).unwrap());
        assert!(!topo.is_adjacent(&inner, &outer).unwrap());
        assert!(!topo.is_adjacent(&outer, &inner).unwrap());
    }

    #[test]
    fn test_thin_strip_along_container_edge_is_within() {
        let topo = Topology::default();
        let outer = mp("MULTIPOLYGON(((0 0,1001 0,1001 0.6,0 0.6,0 0)))");
        for inner in [
            "MULTIPOLYGON(((0 0,1000 0,1000 0.5,0 0.5,0 0)))",
            // clockwise ring, and far thinner than any fixed offset
            "MULTIPOLYGON(((0 0,0 0.000001,1000 0.000001,1000 0,0 0)))",
        ] {
            let inner = mp(inner);
            assert!(topo.within(&inner, &outer).unwrap());
            assert!(!topo.within(&outer, &inner).unwrap());
            assert!(!topo.touches(&inner, &outer).unwrap());
            assert!(!topo.is_adjacent(&inner, &outer).unwrap());
        }
    }

    #[test]
    fn test_thin_strip_outside_shared_edge_touches() {
        let topo = Topology::default();
        let wide = mp("MULTIPOLYGON(((0 0,1000 0,1000 10,0 10,0 0)))");
        let strip = mp("MULTIPOLYGON(((0 0,0 -0.000001,1000 -0.000001,1000 0,0 0)))");

        assert!(topo.touches(&strip, &wide).unwrap());
        assert!(!topo.within(&strip, &wide).unwrap());
        assert!(topo.is_adjacent(&strip, &wide).unwrap());
    }

    #[test]
    fn test_containment_sharing_corner_edges() {
        let topo = Topology::default();
        let inner = mp(UNIT);
        let outer = mp("MULTIPOLYGON(((0 0,0 10,10 10,10 0,0 0)))");

        assert!(topo.within(&inner, &outer).unwrap());
        assert!(!topo.is_adjacent(&inner, &outer).unwrap());
    }

    #[test]
    fn test_partial_overlap_is_adjacent() {
        let topo = Topology::default();
        let a = mp("MULTIPOLYGON(((0 0,0 2,2 2,2 0,0 0)))");
        let b = mp("MULTIPOLYGON(((1 1,1 3,3 3,3 1,1 1)))");
        let relation = topo.relate(Operation::Adjacent, &a, &b).unwrap();

        assert!(relation.interiors_meet);
        assert!(!relation.touches());
        assert!(!relation.left_within());
        assert!(!relation.right_within());
        assert!(relation.is_adjacent());
    }

    #[test]
    fn test_identical_geometries() {
        let topo = Topology::default();
        let a = mp(UNIT);
        // same square, opposite orientation and different start vertex
        let b = mp("MULTIPOLYGON(((1 1,0 1,0 0,1 0,1 1)))");
        let relation = topo.relate(Operation::Adjacent, &a, &b).unwrap();

        assert!(relation.is_equal());
        assert!(!topo.within(&a, &b).unwrap());
        assert!(relation.is_adjacent());
    }

    #[test]
    fn test_parcel_filling_hole_touches() {
        let topo = Topology::default();
        let ring = mp("MULTIPOLYGON(((0 0,0 10,10 10,10 0,0 0),(4 4,4 6,6 6,6 4,4 4)))");
        let plug = mp("MULTIPOLYGON(((4 4,4 6,6 6,6 4,4 4)))");
        let island = mp("MULTIPOLYGON(((4.5 4.5,4.5 5.5,5.5 5.5,5.5 4.5,4.5 4.5)))");

        assert!(topo.touches(&ring, &plug).unwrap());
        assert!(!topo.within(&plug, &ring).unwrap());
        assert!(!topo.intersects(&ring, &island).unwrap());
        assert!(!topo.is_adjacent(&ring, &island).unwrap());
    }

    #[test]
    fn test_gap_below_epsilon_is_shared() {
        let topo = Topology::default();
        let a = mp(UNIT);
        let near = mp("MULTIPOLYGON(((1.0000000000001 0,1.0000000000001 1,2 1,2 0,1.0000000000001 0)))");
        let far = mp("MULTIPOLYGON(((1.000001 0,1.000001 1,2 1,2 0,1.000001 0)))");

        assert!(topo.touches(&a, &near).unwrap());
        assert!(!topo.intersects(&a, &far).unwrap());
        assert!(Topology::new(1e-3).touches(&a, &far).unwrap());
    }

    #[test]
    fn test_multipart_touch_through_second_part() {
        let a = mp("MULTIPOLYGON(((0 0,0 1,1 1,1 0,0 0)),((10 0,10 1,11 1,11 0,10 0)))");
        let b = mp("MULTIPOLYGON(((11 0,11 1,12 1,12 0,11 0)))");
        assert!(Topology::default().is_adjacent(&a, &b).unwrap());
    }

    #[test]
    fn test_degenerate_geometry_is_topology_error() {
        let topo = Topology::default();
        let good = mp(UNIT);
        let bowtie = mp("MULTIPOLYGON(((0 0,1 1,1 0,0 1,0 0)))");

        let err = topo.is_adjacent(&good, &bowtie).unwrap_err();
        assert_eq!(err.operation, Operation::Adjacent);
        assert_eq!(err.side, Side::Right);
        assert!(matches!(err.cause, Degeneracy::SelfIntersection { .. }));
        assert_eq!(err.left, to_wkt(&good));

        let err = topo.touches(&bowtie, &good).unwrap_err();
        assert_eq!(err.operation, Operation::Touches);
        assert_eq!(err.side, Side::Left);
    }

    #[test]
    fn test_locate() {
        let a = mp("MULTIPOLYGON(((0 0,0 10,10 10,10 0,0 0),(4 4,4 6,6 6,6 4,4 4)))");
        let prepared = Topology::default().prepare(&a).unwrap();
        assert!(std::ptr::eq(prepared.geometry(), &a));
        assert_eq!(prepared.bounds().max_x, 10.0);

        assert_eq!(prepared.locate(Coord { x: 1.0, y: 1.0 }, 1e-9), Location::Inside);
        assert_eq!(prepared.locate(Coord { x: 5.0, y: 5.0 }, 1e-9), Location::Outside);
        assert_eq!(prepared.locate(Coord { x: 4.0, y: 5.0 }, 1e-9), Location::Boundary);
        assert_eq!(prepared.locate(Coord { x: 20.0, y: 5.0 }, 1e-9), Location::Outside);
    }

    #[test]
    fn test_locate_in_overlapping_parts() {
        let a = mp("MULTIPOLYGON(((0 0,0 2,2 2,2 0,0 0)),((1 1,1 3,3 3,3 1,1 1)))");
        let prepared = Topology::default().prepare(&a).unwrap();

        assert_eq!(prepared.locate(Coord { x: 1.5, y: 1.5 }, 1e-9), Location::Inside);
        assert_eq!(prepared.locate(Coord { x: 0.5, y: 0.5 }, 1e-9), Location::Inside);
        assert_eq!(prepared.locate(Coord { x: 2.5, y: 2.5 }, 1e-9), Location::Inside);
        assert_eq!(prepared.locate(Coord { x: 2.5, y: 0.5 }, 1e-9), Location::Outside);
    }
}
