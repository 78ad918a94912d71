//! Structured rectangular grid: node numbering, adjacency and the derived
//! sparsity structure of the global stiffness matrix.
//!
//! Nodes are indexed row-major, left-to-right and bottom-to-top. The node
//! adjacency is algebraic (derived from the extents on demand) and is never
//! materialized as a stored graph.

pub mod renumber;
pub mod sparsity;

use crate::{DofIdx, NodeIdx, DOFS_PER_NODE};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
  #[error("grid must have at least one element per axis, got {nx}x{ny}")]
  Degenerate { nx: usize, ny: usize },
}

/// A structured rectangular mesh of `nx` x `ny` C1 bicubic elements.
#[derive(Debug, Clone)]
pub struct Grid {
  nx: usize,
  ny: usize,
  dx: f64,
  dy: f64,
  x0: f64,
  y0: f64,
  permutation: NodePermutation,
}

// constructors
impl Grid {
  /// Validates the extents and eagerly computes the node renumbering.
  pub fn new(nx: usize, ny: usize, dx: f64, dy: f64, x0: f64, y0: f64) -> Result<Self, GridError> {
    if nx == 0 || ny == 0 {
      return Err(GridError::Degenerate { nx, ny });
    }
    let permutation = renumber::renumber_nodes(nx, ny);
    Ok(Self {
      nx,
      ny,
      dx,
      dy,
      x0,
      y0,
      permutation,
    })
  }

  /// A grid covering the unit square with the origin at (0, 0).
  pub fn new_unit(nx: usize, ny: usize) -> Result<Self, GridError> {
    if nx == 0 || ny == 0 {
      return Err(GridError::Degenerate { nx, ny });
    }
    Self::new(nx, ny, 1.0 / nx as f64, 1.0 / ny as f64, 0.0, 0.0)
  }
}

// getters
impl Grid {
  pub fn nx(&self) -> usize {
    self.nx
  }
  pub fn ny(&self) -> usize {
    self.ny
  }
  pub fn dx(&self) -> f64 {
    self.dx
  }
  pub fn dy(&self) -> f64 {
    self.dy
  }
  pub fn num_elements(&self) -> usize {
    self.nx * self.ny
  }
  pub fn num_nodes(&self) -> usize {
    (self.nx + 1) * (self.ny + 1)
  }
  pub fn permutation(&self) -> &NodePermutation {
    &self.permutation
  }

  /// Physical position of a reference node.
  pub fn node_position(&self, node: NodeIdx) -> (f64, f64) {
    let (row, col) = node_row_col(node, self.nx);
    (self.x0 + col as f64 * self.dx, self.y0 + row as f64 * self.dy)
  }

  /// First global DOF of a node under the renumbering.
  pub fn first_dof(&self, node: NodeIdx) -> DofIdx {
    self.permutation.renumbered(node) * DOFS_PER_NODE
  }
}

/// Bijective map from reference node order to the bandwidth-reducing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePermutation(Vec<NodeIdx>);

impl NodePermutation {
  pub fn new(map: Vec<NodeIdx>) -> Self {
    debug_assert!(is_bijection(&map));
    Self(map)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
  pub fn renumbered(&self, node: NodeIdx) -> NodeIdx {
    self.0[node]
  }
  pub fn as_slice(&self) -> &[NodeIdx] {
    &self.0
  }
}

fn is_bijection(map: &[NodeIdx]) -> bool {
  let mut seen = vec![false; map.len()];
  map.iter().all(|&i| {
    let fresh = i < map.len() && !seen[i];
    if fresh {
      seen[i] = true;
    }
    fresh
  })
}

/// Most neighbors a node can have: 4 edge-sharing + 4 corner-sharing.
pub const MAX_NEIGHBORS: usize = 8;

/// Neighbor offsets (row, col) in counterclockwise order starting at the
/// bottom-left diagonal. Two elements touching only at a corner still count
/// as connected, so the diagonal offsets are included.
const NEIGHBOR_OFFSETS: [(isize, isize); MAX_NEIGHBORS] = [
  (-1, -1),
  (-1, 0),
  (-1, 1),
  (0, 1),
  (1, 1),
  (1, 0),
  (1, -1),
  (0, -1),
];

fn node_row_col(node: NodeIdx, nx: usize) -> (usize, usize) {
  (node / (nx + 1), node % (nx + 1))
}

/// Writes the valid neighbors of `node` into `buf`, clearing it first.
///
/// Offsets leaving the grid are masked out. `buf` is caller-owned scratch so
/// traversals can reuse one allocation; its contents are fully overwritten on
/// every call.
pub fn adjacent_nodes(node: NodeIdx, nx: usize, ny: usize, buf: &mut Vec<NodeIdx>) {
  buf.clear();
  let (row, col) = node_row_col(node, nx);
  for (dr, dc) in NEIGHBOR_OFFSETS {
    let r = row as isize + dr;
    let c = col as isize + dc;
    if r >= 0 && r <= ny as isize && c >= 0 && c <= nx as isize {
      buf.push(r as usize * (nx + 1) + c as usize);
    }
  }
}

/// Neighbor count of a node, without materializing the neighbor list.
pub fn node_degree(node: NodeIdx, nx: usize, ny: usize) -> usize {
  let (row, col) = node_row_col(node, nx);
  let rows = 1 + usize::from(row > 0) + usize::from(row < ny);
  let cols = 1 + usize::from(col > 0) + usize::from(col < nx);
  rows * cols - 1
}
