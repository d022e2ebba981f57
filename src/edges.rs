//! Weighted edge lists in the (I, J, P) layout the embedding optimizer reads.

use crate::error::{Error, Result};

#[cfg(feature = "graph")]
use petgraph::graph::DiGraph;

/// Parallel arrays: edge k goes from `i[k]` to `j[k]` with weight `p[k]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgeList {
    /// Source sample indices.
    pub i: Vec<usize>,
    /// Target sample indices.
    pub j: Vec<usize>,
    /// Edge weights.
    pub p: Vec<f64>,
}

impl EdgeList {
    /// Build an edge list, checking the three arrays have equal length.
    pub fn new(i: Vec<usize>, j: Vec<usize>, p: Vec<f64>) -> Result<Self> {
        if i.len() != j.len() || i.len() != p.len() {
            return Err(Error::shape(
                "equal-length I, J and P",
                format!("I={}, J={}, P={}", i.len(), j.len(), p.len()),
            ));
        }
        Ok(Self { i, j, p })
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.i.len()
    }

    /// True when there are no edges.
    pub fn is_empty(&self) -> bool {
        self.i.is_empty()
    }

    /// Iterate `(i, j, p)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.i
            .iter()
            .zip(self.j.iter())
            .zip(self.p.iter())
            .map(|((&i, &j), &p)| (i, j, p))
    }

    /// Sum of all edge weights.
    pub fn total_weight(&self) -> f64 {
        self.p.iter().sum()
    }

    /// Both directions of every edge.
    ///
    /// Returns a new list of twice the length: the original edges in order,
    /// followed by each edge reversed, in the same order. `self` is untouched.
    pub fn symmetrize(&self) -> EdgeList {
        let mut i = Vec::with_capacity(2 * self.len());
        i.extend_from_slice(&self.i);
        i.extend_from_slice(&self.j);

        let mut j = Vec::with_capacity(2 * self.len());
        j.extend_from_slice(&self.j);
        j.extend_from_slice(&self.i);

        let mut p = Vec::with_capacity(2 * self.len());
        p.extend_from_slice(&self.p);
        p.extend_from_slice(&self.p);

        EdgeList { i, j, p }
    }

    /// True when every (i, j, p) has a matching (j, i, p).
    pub fn is_symmetric(&self) -> bool {
        use std::collections::HashMap;

        let mut counts: HashMap<(usize, usize, u64), isize> = HashMap::with_capacity(self.len());
        for (i, j, p) in self.iter() {
            *counts.entry((i, j, p.to_bits())).or_default() += 1;
            *counts.entry((j, i, p.to_bits())).or_default() -= 1;
        }
        counts.values().all(|c| *c == 0)
    }

    /// Check that all endpoints are below `n` and that there are no self-edges.
    pub fn check_indices(&self, n: usize) -> Result<()> {
        for (k, (i, j, _)) in self.iter().enumerate() {
            if i >= n || j >= n {
                return Err(Error::shape(
                    format!("indices below {n}"),
                    format!("edge {k} = ({i}, {j})"),
                ));
            }
            if i == j {
                return Err(Error::invalid("edges", format!("edge {k} is a self-loop on {i}")));
            }
        }
        Ok(())
    }

    /// Directed petgraph graph with one node per sample.
    #[cfg(feature = "graph")]
    pub fn to_digraph(&self, n: usize) -> Result<DiGraph<(), f64>> {
        self.check_indices(n)?;
        let mut graph = DiGraph::<(), f64>::with_capacity(n, self.len());
        let nodes: Vec<_> = (0..n).map(|_| graph.add_node(())).collect();
        for (i, j, p) in self.iter() {
            let _ = graph.add_edge(nodes[i], nodes[j], p);
        }
        Ok(graph)
    }
}
