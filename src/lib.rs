//! cadastre-graph - Build parcel adjacency graphs from cadastral tables
//!
//! Rows of a delimited file become [`Parcel`]s with a multi-polygon
//! boundary; every pair of parcels is then tested with an epsilon-based
//! topology check and neighbours are collected in an [`AdjacencyGraph`].
//!
//! ```no_run
//! let outcome = cadastre_graph::load_parcels("parcels.csv")?;
//! let graph = cadastre_graph::build_graph(outcome.parcels)?;
//! println!("{} parcels, {} shared borders", graph.vertex_count(), graph.edge_count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::Path;

pub mod config;
pub mod domain;
pub mod geometry;
pub mod graph;
pub mod importer;
pub mod report;

pub use domain::{Parcel, ParcelError};
pub use graph::{AdjacencyGraph, GraphBuilder, GraphError};
pub use importer::{LoadError, LoadOutcome, ParcelLoader};

/// Load a `;`-separated parcel table, skipping rows that do not validate
pub fn load_parcels(path: impl AsRef<Path>) -> Result<LoadOutcome, LoadError> {
    ParcelLoader::new().load_path(path)
}

/// Build the adjacency graph with default settings
pub fn build_graph(parcels: Vec<Parcel>) -> Result<AdjacencyGraph, GraphError> {
    GraphBuilder::new().build(parcels)
}
