use std::collections::{BTreeSet, HashMap, btree_set};
use std::fmt;

use crate::domain::Parcel;

use super::summary::{GraphSummary, NeighborList};

/// Undirected, loop-free adjacency relation over a fixed list of parcels
///
/// Parcels keep their input order and are addressed by that index.
/// Built only by [`GraphBuilder`](super::GraphBuilder) and immutable
/// afterwards.
#[derive(Debug, Clone)]
pub struct AdjacencyGraph {
    parcels: Vec<Parcel>,
    adjacency: Vec<BTreeSet<usize>>,
    by_id: HashMap<i64, Vec<usize>>,
}

impl AdjacencyGraph {
    /// Pairs must satisfy `i < j < parcels.len()`
    pub(crate) fn from_pairs(parcels: Vec<Parcel>, pairs: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut adjacency = vec![BTreeSet::new(); parcels.len()];
        for (i, j) in pairs {
            debug_assert!(i < j && j < parcels.len());
            adjacency[i].insert(j);
            adjacency[j].insert(i);
        }

        let mut by_id: HashMap<i64, Vec<usize>> = HashMap::new();
        for (index, parcel) in parcels.iter().enumerate() {
            by_id.entry(parcel.id()).or_default().push(index);
        }

        Self {
            parcels,
            adjacency,
            by_id,
        }
    }

    pub fn parcels(&self) -> &[Parcel] {
        &self.parcels
    }

    pub fn parcel(&self, index: usize) -> Option<&Parcel> {
        self.parcels.get(index)
    }

    /// Position of `parcel` in the graph
    ///
    /// A reference into [`parcels`](Self::parcels) resolves to itself;
    /// any other value resolves to the first stored parcel with the same id
    /// that compares equal.
    pub fn index_of(&self, parcel: &Parcel) -> Option<usize> {
        let candidates = self.by_id.get(&parcel.id())?;
        candidates
            .iter()
            .copied()
            .find(|&i| std::ptr::eq(&self.parcels[i], parcel))
            .or_else(|| candidates.iter().copied().find(|&i| self.parcels[i] == *parcel))
    }

    /// Parcels adjacent to `parcel`; empty when it has none or is unknown
    pub fn neighbors(&self, parcel: &Parcel) -> Neighbors<'_> {
        let indices = self.index_of(parcel).map(|i| self.adjacency[i].iter());
        Neighbors {
            parcels: &self.parcels,
            indices,
        }
    }

    pub fn neighbor_indices(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency.get(index).into_iter().flatten().copied()
    }

    pub fn are_adjacent(&self, a: &Parcel, b: &Parcel) -> bool {
        match (self.index_of(a), self.index_of(b)) {
            (Some(i), Some(j)) => self.are_adjacent_at(i, j),
            _ => false,
        }
    }

    pub fn are_adjacent_at(&self, i: usize, j: usize) -> bool {
        self.adjacency.get(i).is_some_and(|set| set.contains(&j))
    }

    pub fn vertex_count(&self) -> usize {
        self.parcels.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Every edge once, as `(i, j)` with `i < j`, in ascending order
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(i, set)| set.range(i + 1..).map(move |&j| (i, j)))
    }

    pub fn summary(&self) -> GraphSummary {
        let parcels = self
            .parcels
            .iter()
            .enumerate()
            .map(|(i, parcel)| NeighborList {
                id: parcel.id(),
                area: parcel.area(),
                owner: parcel.owner(),
                neighbors: self.adjacency[i].iter().map(|&j| self.parcels[j].id()).collect(),
            })
            .collect();
        let edges = self
            .edges()
            .map(|(i, j)| (self.parcels[i].id(), self.parcels[j].id()))
            .collect();

        GraphSummary {
            vertex_count: self.vertex_count(),
            edge_count: self.edge_count(),
            parcels,
            edges,
        }
    }
}

impl fmt::Display for AdjacencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (parcel, set) in self.parcels.iter().zip(&self.adjacency) {
            writeln!(
                f,
                "Parcel {} (area: {}, owner: {})",
                parcel.id(),
                parcel.area(),
                parcel.owner()
            )?;
            if !set.is_empty() {
                let ids: Vec<String> = set.iter().map(|&j| self.parcels[j].id().to_string()).collect();
                writeln!(f, "  adjacent to: {}", ids.join(", "))?;
            }
        }
        Ok(())
    }
}

/// Read-only view over one parcel's neighbour set, in input order
#[derive(Debug, Clone)]
pub struct Neighbors<'g> {
    parcels: &'g [Parcel],
    indices: Option<btree_set::Iter<'g, usize>>,
}

impl<'g> Iterator for Neighbors<'g> {
    type Item = &'g Parcel;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.indices.as_mut()?.next()?;
        self.parcels.get(*index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.indices.as_ref().map_or(0, ExactSizeIterator::len);
        (len, Some(len))
    }
}

impl ExactSizeIterator for Neighbors<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn parcel(id: i64, wkt: &str) -> Parcel {
        Parcel::from_fields(&[id.to_string().as_str(), "", "", "4", "1", wkt, "1"]).unwrap()
    }

    fn squares() -> Vec<Parcel> {
        vec![
            parcel(10, "MULTIPOLYGON(((0 0,0 1,1 1,1 0,0 0)))"),
            parcel(20, "MULTIPOLYGON(((1 0,1 1,2 1,2 0,1 0)))"),
            parcel(30, "MULTIPOLYGON(((2 0,2 1,3 1,3 0,2 0)))"),
            parcel(40, "MULTIPOLYGON(((9 9,9 10,10 10,10 9,9 9)))"),
        ]
    }

    fn chain() -> AdjacencyGraph {
        AdjacencyGraph::from_pairs(squares(), [(0, 1), (1, 2)])
    }

    #[test]
    fn test_counts() {
        let graph = chain();
        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edges().collect::<Vec<_>>(), [(0, 1), (1, 2)]);
    }

    #[test]
    fn test_duplicate_pairs_collapse() {
        let graph = AdjacencyGraph::from_pairs(squares(), [(0, 1), (0, 1)]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_neighbors_by_reference_and_by_value() {
        let graph = chain();
        let middle = graph.parcel(1).unwrap();
        let ids: Vec<i64> = graph.neighbors(middle).map(Parcel::id).collect();
        assert_eq!(ids, [10, 30]);
        assert_eq!(graph.neighbors(middle).len(), 2);

        let copy = squares().remove(1);
        assert_eq!(graph.neighbors(&copy).count(), 2);
        assert!(graph.are_adjacent(&copy, graph.parcel(0).unwrap()));
    }

    #[test]
    fn test_unknown_parcel_has_no_neighbors() {
        let graph = chain();
        let stranger = parcel(99, "MULTIPOLYGON(((0 0,0 1,1 1,1 0,0 0)))");
        assert_eq!(graph.neighbors(&stranger).len(), 0);
        assert!(!graph.are_adjacent(&stranger, graph.parcel(0).unwrap()));

        // same id, different content
        let impostor = parcel(10, "MULTIPOLYGON(((5 5,5 6,6 6,6 5,5 5)))");
        assert_eq!(graph.index_of(&impostor), None);
    }

    #[test]
    fn test_isolated_parcel() {
        let graph = chain();
        let lonely = graph.parcel(3).unwrap();
        assert_eq!(graph.neighbors(lonely).count(), 0);
        assert_eq!(graph.neighbor_indices(3).count(), 0);
        assert_eq!(graph.neighbor_indices(42).count(), 0);
    }

    #[test]
    fn test_adjacency_is_symmetric_and_loop_free() {
        let graph = chain();
        for i in 0..graph.vertex_count() {
            assert!(!graph.are_adjacent_at(i, i));
            for j in 0..graph.vertex_count() {
                assert_eq!(graph.are_adjacent_at(i, j), graph.are_adjacent_at(j, i));
            }
        }
        assert!(!graph.are_adjacent_at(0, 17));
    }

    #[test]
    fn test_display() {
        let text = chain().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Parcel 10 (area: 1, owner: 1)");
        assert_eq!(lines[1], "  adjacent to: 20");
        assert_eq!(lines[3], "  adjacent to: 10, 30");
        assert_eq!(lines.last(), Some(&"Parcel 40 (area: 1, owner: 1)"));
    }

    #[test]
    fn test_summary() {
        let summary = chain().summary();
        assert_eq!(summary.vertex_count, 4);
        assert_eq!(summary.edge_count, 2);
        assert_eq!(summary.edges, [(10, 20), (20, 30)]);
        assert_eq!(summary.parcels[1].neighbors, [10, 30]);
        assert!(summary.parcels[3].neighbors.is_empty());
    }
}
