pub mod bounds;
pub mod predicates;
pub mod ring;
pub mod validation;
pub mod wkt;

pub use bounds::Bounds;
pub use geo::{Coord, LineString, MultiPolygon, Polygon};
pub use predicates::{
    DEFAULT_EPSILON, Location, Operation, PreparedBoundary, Relation, Side, Topology,
    TopologyError,
};
pub use validation::{Degeneracy, validate_multipolygon};
pub use wkt::{GeometryError, GeometryKind, ParsedGeometry, parse_multipolygon, parse_wkt, to_wkt};
