//! Bandwidth-reducing node renumbering.
//!
//! A variant of reverse Cuthill-McKee: candidates are ranked by their
//! connectivity to already-numbered nodes before their degree, instead of by
//! degree alone. The sparsity widths produced downstream depend on this exact
//! order, so the comparator must not be changed.

use crate::{
  mesh::{adjacent_nodes, node_degree, NodePermutation, MAX_NEIGHBORS},
  NodeIdx,
};

use itertools::Itertools;
use std::cmp::Ordering;
use tracing::debug;

const UNASSIGNED: usize = usize::MAX;

/// One not-yet-numbered neighbor of the node currently being expanded.
struct Candidate {
  node: NodeIdx,
  /// Renumbered indices of the candidate's already-assigned neighbors,
  /// sorted in descending order.
  assigned: Vec<usize>,
  degree: usize,
}

/// The three-key candidate order of the renumbering.
///
/// Primary: descending lexicographic comparison of the assigned-neighbor
/// lists, preferring candidates more strongly connected to already
/// high-numbered nodes. Secondary: ascending degree, preferring nodes with
/// fewer remaining connections. Final: ascending node index, for determinism.
fn candidate_order(a: &Candidate, b: &Candidate) -> Ordering {
  b.assigned
    .cmp(&a.assigned)
    .then(a.degree.cmp(&b.degree))
    .then(a.node.cmp(&b.node))
}

/// Computes the permutation from reference node order to renumbered order.
///
/// Starts at reference node 0 and repeatedly expands the next node in
/// assignment order, appending its unnumbered neighbors sorted by
/// [`candidate_order`].
pub fn renumber_nodes(nx: usize, ny: usize) -> NodePermutation {
  let num_nodes = (nx + 1) * (ny + 1);
  let mut assigned = vec![UNASSIGNED; num_nodes];
  let mut order = Vec::with_capacity(num_nodes);
  assigned[0] = 0;
  order.push(0);

  // scratch buffers reused across the whole traversal
  let mut neighbors = Vec::with_capacity(MAX_NEIGHBORS);
  let mut subneighbors = Vec::with_capacity(MAX_NEIGHBORS);
  let mut candidates: Vec<Candidate> = Vec::with_capacity(MAX_NEIGHBORS);

  let mut next = 1;
  let mut expand = 0;
  while expand < order.len() {
    let node = order[expand];
    expand += 1;

    adjacent_nodes(node, nx, ny, &mut neighbors);
    candidates.clear();
    for &m in neighbors.iter().filter(|&&m| assigned[m] == UNASSIGNED) {
      adjacent_nodes(m, nx, ny, &mut subneighbors);
      let connected: Vec<usize> = subneighbors
        .iter()
        .filter_map(|&q| (assigned[q] != UNASSIGNED).then_some(assigned[q]))
        .sorted_by(|a, b| b.cmp(a))
        .collect();
      candidates.push(Candidate {
        node: m,
        assigned: connected,
        degree: node_degree(m, nx, ny),
      });
    }
    candidates.sort_by(candidate_order);
    for candidate in &candidates {
      assigned[candidate.node] = next;
      next += 1;
      order.push(candidate.node);
    }
  }
  debug_assert_eq!(next, num_nodes);
  debug!(nx, ny, num_nodes, "node renumbering complete");

  NodePermutation::new(assigned)
}

#[cfg(test)]
mod test {
  use super::renumber_nodes;

  #[test]
  fn reference_permutation_3x3() {
    let permutation = renumber_nodes(3, 3);
    let expected = [1, 2, 5, 11, 3, 4, 6, 10, 8, 7, 9, 12, 15, 14, 13, 16]
      .map(|i: usize| i - 1);
    assert_eq!(permutation.as_slice(), &expected[..]);
  }

  #[test]
  fn bijective_for_various_grids() {
    for (nx, ny) in [(1, 1), (1, 4), (4, 1), (5, 3), (6, 6)] {
      let permutation = renumber_nodes(nx, ny);
      let num_nodes = (nx + 1) * (ny + 1);
      assert_eq!(permutation.len(), num_nodes);
      let mut image: Vec<_> = permutation.as_slice().to_vec();
      image.sort_unstable();
      assert!(image.into_iter().eq(0..num_nodes), "not bijective for {nx}x{ny}");
    }
  }
}
