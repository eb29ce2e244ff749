pub mod adjacency;
pub mod builder;
pub mod summary;

pub use adjacency::{AdjacencyGraph, Neighbors};
pub use builder::{GraphBuilder, GraphError};
pub use summary::{GraphSummary, NeighborList};
