//! Progress and diagnostics hooks for loading and graph building
//!
//! The library never prints. Callers that want feedback pass a
//! [`Reporter`] into the loader and the graph builder; every method has a
//! no-op default so implementations only override what they display.

use crate::domain::ParcelError;

pub trait Reporter: Sync {
    /// A data row was dropped; `line` is the 1-based line in the source
    fn row_skipped(&self, _line: usize, _error: &ParcelError) {}

    fn load_finished(&self, _loaded: usize, _skipped: usize) {}

    /// Pairwise scan is about to evaluate `pairs` unordered pairs
    fn scan_started(&self, _parcels: usize, _pairs: u64) {}

    /// Another `pairs` pairs were evaluated (may be called from worker threads)
    fn scan_progress(&self, _pairs: u64) {}

    fn edge_found(&self, _left_id: i64, _right_id: i64) {}

    fn scan_finished(&self, _edges: usize) {}
}

/// Reporter that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records every event for assertions
    #[derive(Debug, Default)]
    pub struct RecordingReporter {
        pub skipped_lines: Mutex<Vec<usize>>,
        pub loaded: Mutex<Option<(usize, usize)>>,
        pub pairs_total: Mutex<u64>,
        pub pairs_done: Mutex<u64>,
        pub edges: Mutex<Vec<(i64, i64)>>,
        pub finished_edges: Mutex<Option<usize>>,
    }

    impl Reporter for RecordingReporter {
        fn row_skipped(&self, line: usize, _error: &ParcelError) {
            self.skipped_lines.lock().unwrap().push(line);
        }

        fn load_finished(&self, loaded: usize, skipped: usize) {
            *self.loaded.lock().unwrap() = Some((loaded, skipped));
        }

        fn scan_started(&self, _parcels: usize, pairs: u64) {
            *self.pairs_total.lock().unwrap() = pairs;
        }

        fn scan_progress(&self, pairs: u64) {
            *self.pairs_done.lock().unwrap() += pairs;
        }

        fn edge_found(&self, left_id: i64, right_id: i64) {
            self.edges.lock().unwrap().push((left_id, right_id));
        }

        fn scan_finished(&self, edges: usize) {
            *self.finished_edges.lock().unwrap() = Some(edges);
        }
    }
}
