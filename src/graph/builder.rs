use rayon::prelude::*;
use thiserror::Error;

use crate::domain::Parcel;
use crate::geometry::{
    DEFAULT_EPSILON, Operation, PreparedBoundary, Side, Topology, TopologyError, to_wkt,
};
use crate::report::{NoopReporter, Reporter};

use super::AdjacencyGraph;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("cannot build an adjacency graph from an empty parcel list")]
    EmptyParcelList,
    #[error("adjacency build failed on parcels {left_id} and {right_id}")]
    AdjacencyBuild {
        left_id: i64,
        right_id: i64,
        #[source]
        source: TopologyError,
    },
}

/// Builds an [`AdjacencyGraph`] by testing every unordered pair of parcels
///
/// The result does not depend on `parallel` or `bbox_prefilter`; both only
/// change how fast it is produced.
pub struct GraphBuilder<'r> {
    topology: Topology,
    bbox_prefilter: bool,
    parallel: bool,
    reporter: &'r dyn Reporter,
}

impl Default for GraphBuilder<'_> {
    fn default() -> Self {
        Self {
            topology: Topology::new(DEFAULT_EPSILON),
            bbox_prefilter: true,
            parallel: false,
            reporter: &NoopReporter,
        }
    }
}

impl<'r> GraphBuilder<'r> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.topology = Topology::new(epsilon);
        self
    }

    /// Skip pairs whose epsilon-inflated bounds are disjoint
    pub fn bbox_prefilter(mut self, enabled: bool) -> Self {
        self.bbox_prefilter = enabled;
        self
    }

    /// Spread the pair scan over the rayon thread pool
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    pub fn with_reporter(mut self, reporter: &'r dyn Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn build(&self, parcels: Vec<Parcel>) -> Result<AdjacencyGraph, GraphError> {
        if parcels.is_empty() {
            return Err(GraphError::EmptyParcelList);
        }

        let n = parcels.len();
        let pairs_total = (n as u64) * (n as u64 - 1) / 2;
        self.reporter.scan_started(n, pairs_total);

        let rows = if n < 2 {
            Vec::new()
        } else {
            let prepared = self.prepare_all(&parcels)?;
            if self.parallel {
                (0..n)
                    .into_par_iter()
                    .map(|i| self.scan_row(i, &prepared))
                    .collect::<Vec<_>>()
            } else {
                (0..n).map(|i| self.scan_row(i, &prepared)).collect()
            }
        };

        let mut pairs = Vec::new();
        for (i, row) in rows.into_iter().enumerate() {
            for j in row {
                self.reporter.edge_found(parcels[i].id(), parcels[j].id());
                pairs.push((i, j));
            }
        }

        let graph = AdjacencyGraph::from_pairs(parcels, pairs);
        self.reporter.scan_finished(graph.edge_count());
        Ok(graph)
    }

    /// Validate every geometry up front
    ///
    /// A degenerate parcel is charged to the first pair of the scan that
    /// contains it: `(0, k)` for `k > 0`, or `(0, 1)` when it is parcel 0.
    fn prepare_all<'p>(&self, parcels: &'p [Parcel]) -> Result<Vec<PreparedBoundary<'p>>, GraphError> {
        let mut prepared = Vec::with_capacity(parcels.len());
        for (k, parcel) in parcels.iter().enumerate() {
            match self.topology.prepare(parcel.geometry()) {
                Ok(boundary) => prepared.push(boundary),
                Err(cause) => {
                    let (left, right, side) = if k == 0 {
                        (&parcels[0], &parcels[1], Side::Left)
                    } else {
                        (&parcels[0], parcel, Side::Right)
                    };
                    return Err(GraphError::AdjacencyBuild {
                        left_id: left.id(),
                        right_id: right.id(),
                        source: TopologyError {
                            operation: Operation::Adjacent,
                            side,
                            cause,
                            left: to_wkt(left.geometry()),
                            right: to_wkt(right.geometry()),
                        },
                    });
                }
            }
        }
        Ok(prepared)
    }

    /// Indices `j > i` adjacent to parcel `i`, ascending
    fn scan_row(&self, i: usize, prepared: &[PreparedBoundary<'_>]) -> Vec<usize> {
        let left = &prepared[i];
        let found = prepared
            .iter()
            .enumerate()
            .skip(i + 1)
            .filter(|(_, right)| !self.bbox_prefilter || self.topology.may_interact(left, right))
            .filter(|(_, right)| self.topology.relate_prepared(left, right).is_adjacent())
            .map(|(j, _)| j)
            .collect();
        self.reporter.scan_progress((prepared.len() - i - 1) as u64);
        found
    }
}
