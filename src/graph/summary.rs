use serde::Serialize;

/// Serializable snapshot of a built graph, keyed by parcel id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSummary {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub parcels: Vec<NeighborList>,
    /// Each adjacent pair once, lower input index first
    pub edges: Vec<(i64, i64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborList {
    pub id: i64,
    pub area: f64,
    pub owner: i64,
    pub neighbors: Vec<i64>,
}
