//! Degeneracy checks run before any topological predicate
//!
//! Detects the geometry faults that make touch/overlap/containment
//! answers meaningless:
//! - NaN/Inf coordinates
//! - rings with fewer than three distinct vertices
//! - sliver rings that enclose no meaningful area
//! - rings that cross or fold back on themselves
//!
//! Overlap between separate polygons of one multi-polygon is not
//! rejected. Point location treats such parts as a union, but the part
//! boundaries running through the overlap still count as boundary.

use geo::line_intersection::{LineIntersection, line_intersection};
use geo::{Coord, Line, MultiPolygon};
use thiserror::Error;

use super::ring::{distinct_vertices, perimeter, signed_area};

/// Why a geometry cannot take part in predicate evaluation
///
/// Ring 0 is the exterior ring of a polygon, holes follow from 1.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Degeneracy {
    #[error("multipolygon has no polygons")]
    Empty,
    #[error("polygon {polygon} has a non-finite coordinate")]
    NonFiniteCoordinate { polygon: usize },
    #[error("polygon {polygon} ring {ring} has {distinct} distinct vertices, at least 3 required")]
    TooFewVertices {
        polygon: usize,
        ring: usize,
        distinct: usize,
    },
    #[error("polygon {polygon} ring {ring} encloses no area")]
    CollapsedRing { polygon: usize, ring: usize },
    #[error("polygon {polygon} ring {ring} intersects itself near ({x}, {y})")]
    SelfIntersection {
        polygon: usize,
        ring: usize,
        x: f64,
        y: f64,
    },
}

/// Check every ring of a multi-polygon
///
/// `epsilon` scales the collapsed-ring test: a ring whose area is at most
/// `epsilon * perimeter` is treated as a sliver with no interior.
pub fn validate_multipolygon(geometry: &MultiPolygon<f64>, epsilon: f64) -> Result<(), Degeneracy> {
    if geometry.0.is_empty() {
        return Err(Degeneracy::Empty);
    }

    for (p, polygon) in geometry.iter().enumerate() {
        let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
        for (r, ring) in rings.enumerate() {
            if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
                return Err(Degeneracy::NonFiniteCoordinate { polygon: p });
            }
            validate_ring(&ring.0, epsilon).map_err(|fault| fault.locate(p, r))?;
        }
    }

    Ok(())
}

enum RingFault {
    TooFewVertices(usize),
    Collapsed,
    SelfIntersection(Coord<f64>),
}

impl RingFault {
    fn locate(self, polygon: usize, ring: usize) -> Degeneracy {
        match self {
            RingFault::TooFewVertices(distinct) => Degeneracy::TooFewVertices {
                polygon,
                ring,
                distinct,
            },
            RingFault::Collapsed => Degeneracy::CollapsedRing { polygon, ring },
            RingFault::SelfIntersection(at) => Degeneracy::SelfIntersection {
                polygon,
                ring,
                x: at.x,
                y: at.y,
            },
        }
    }
}

fn validate_ring(coords: &[Coord<f64>], epsilon: f64) -> Result<(), RingFault> {
    let vertices = distinct_vertices(coords);
    if vertices.len() < 3 {
        return Err(RingFault::TooFewVertices(vertices.len()));
    }

    if let Some(at) = find_self_intersection(&vertices) {
        return Err(RingFault::SelfIntersection(at));
    }

    if signed_area(&vertices).abs() <= epsilon * perimeter(&vertices) {
        return Err(RingFault::Collapsed);
    }

    Ok(())
}

/// First crossing between two ring edges that should not meet
///
/// Consecutive edges may share their common vertex and nothing else; any
/// other pair of edges must be disjoint.
fn find_self_intersection(vertices: &[Coord<f64>]) -> Option<Coord<f64>> {
    let n = vertices.len();
    let edges: Vec<Line<f64>> = (0..n)
        .map(|i| Line::new(vertices[i], vertices[(i + 1) % n]))
        .collect();

    for i in 0..n {
        for j in (i + 1)..n {
            let consecutive = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(edges[i], edges[j]) {
                None => {}
                Some(LineIntersection::SinglePoint { .. }) if consecutive => {}
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    return Some(intersection);
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    return Some(intersection.start);
                }
            }
        }
    }

    None
}
