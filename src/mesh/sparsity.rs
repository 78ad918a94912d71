//! Lower-triangular CSR structure of the global stiffness matrix.

use crate::{
  mesh::{adjacent_nodes, Grid, MAX_NEIGHBORS},
  DofIdx, DOFS_PER_NODE,
};

use itertools::Itertools;
use tracing::debug;

/// Compressed-row sparsity structure of the lower triangle of the symmetric
/// global matrix, with 8 scalar DOFs collocated per node.
///
/// Invariants: column indices are strictly increasing within a row, every
/// entry satisfies `col <= row`, `row_offsets` is non-decreasing with
/// `row_offsets[num_rows]` equal to the number of nonzeros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparsityPattern {
  row_offsets: Vec<usize>,
  col_indices: Vec<DofIdx>,
}

impl SparsityPattern {
  /// Synthesizes the pattern for `grid` under its node renumbering.
  ///
  /// Every node contributes the lower half of its own 8x8 diagonal block.
  /// Every adjacent node pair contributes one full 8x8 cross block, emitted
  /// from the side with the larger first-DOF index: adjacency is symmetric
  /// and each unordered pair is visited from both sides, so the `i > j`
  /// guard keeps the lower triangle and avoids double emission.
  pub fn build(grid: &Grid) -> Self {
    let num_rows = grid.num_nodes() * DOFS_PER_NODE;
    let mut pairs: Vec<(DofIdx, DofIdx)> = Vec::new();
    let mut neighbors = Vec::with_capacity(MAX_NEIGHBORS);

    for node in 0..grid.num_nodes() {
      let i = grid.first_dof(node);
      for row in i..i + DOFS_PER_NODE {
        for col in i..=row {
          pairs.push((row, col));
        }
      }
      adjacent_nodes(node, grid.nx(), grid.ny(), &mut neighbors);
      for &m in &neighbors {
        let j = grid.first_dof(m);
        if i > j {
          for row in i..i + DOFS_PER_NODE {
            for col in j..j + DOFS_PER_NODE {
              pairs.push((row, col));
            }
          }
        }
      }
    }

    pairs.sort_unstable();
    let pairs: Vec<_> = pairs.into_iter().dedup().collect();

    let mut row_offsets = vec![0; num_rows + 1];
    for &(row, _) in &pairs {
      row_offsets[row + 1] += 1;
    }
    for row in 0..num_rows {
      row_offsets[row + 1] += row_offsets[row];
    }
    let col_indices = pairs.into_iter().map(|(_, col)| col).collect();

    let pattern = Self {
      row_offsets,
      col_indices,
    };
    debug!(
      num_rows,
      nnz = pattern.nnz(),
      "sparsity pattern synthesized"
    );
    pattern
  }

  pub fn num_rows(&self) -> usize {
    self.row_offsets.len() - 1
  }
  pub fn nnz(&self) -> usize {
    self.col_indices.len()
  }
  pub fn row_offsets(&self) -> &[usize] {
    &self.row_offsets
  }
  pub fn col_indices(&self) -> &[DofIdx] {
    &self.col_indices
  }

  /// Column indices of one row.
  pub fn row(&self, row: usize) -> &[DofIdx] {
    &self.col_indices[self.row_offsets[row]..self.row_offsets[row + 1]]
  }

  /// Bridges to the `nalgebra-sparse` pattern type (row-major).
  pub fn to_nalgebra(&self) -> nas::pattern::SparsityPattern {
    nas::pattern::SparsityPattern::try_from_offsets_and_indices(
      self.num_rows(),
      self.num_rows(),
      self.row_offsets.clone(),
      self.col_indices.clone(),
    )
    .expect("pattern offsets and indices are well formed")
  }
}

/// Placeholder for the per-element scatter ("stencil") row structure the
/// global assembler will derive from the pattern and the element's node
/// permutations. Carries no behavior yet.
///
/// TODO: flesh out once the assembler's scatter map is specified.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SymbolicRow;

#[cfg(test)]
mod test {
  use super::SparsityPattern;
  use crate::mesh::Grid;

  #[test]
  fn single_element_block_is_dense() {
    // 1x1 grid: all 4 nodes are mutually adjacent, so the 32-DOF lower
    // triangle is completely filled
    let grid = Grid::new_unit(1, 1).unwrap();
    let pattern = SparsityPattern::build(&grid);
    assert_eq!(pattern.num_rows(), 32);
    assert_eq!(pattern.row_offsets().len(), 33);
    assert_eq!(pattern.nnz(), 528);
    for row in 0..32 {
      assert_eq!(pattern.row_offsets()[row], row * (row + 1) / 2);
      let cols: Vec<_> = (0..=row).collect();
      assert_eq!(pattern.row(row), &cols[..]);
    }
    assert_eq!(pattern.row_offsets()[32], 528);
  }

  #[test]
  fn invariants_hold_for_larger_grid() {
    let grid = Grid::new_unit(4, 3).unwrap();
    let pattern = SparsityPattern::build(&grid);
    assert_eq!(pattern.num_rows(), grid.num_nodes() * 8);
    for row in 0..pattern.num_rows() {
      let cols = pattern.row(row);
      assert!(!cols.is_empty(), "row {row} has no diagonal entry");
      assert!(cols.windows(2).all(|w| w[0] < w[1]));
      assert!(cols.iter().all(|&col| col <= row));
      assert_eq!(*cols.last().unwrap(), row);
    }
  }

  #[test]
  fn nonzero_count_matches_adjacency() {
    // per node: 36 lower-triangular diagonal entries; per adjacent pair:
    // one dense 8x8 cross block
    let grid = Grid::new_unit(2, 2).unwrap();
    let pattern = SparsityPattern::build(&grid);
    let num_pairs = 2 * 3 + 3 * 2 + 2 * 2 * 2; // horizontal + vertical + diagonal
    assert_eq!(pattern.nnz(), 9 * 36 + num_pairs * 64);
  }

  #[test]
  fn bridges_to_nalgebra_sparse() {
    let grid = Grid::new_unit(2, 1).unwrap();
    let pattern = SparsityPattern::build(&grid);
    let nas_pattern = pattern.to_nalgebra();
    assert_eq!(nas_pattern.major_dim(), pattern.num_rows());
    assert_eq!(nas_pattern.nnz(), pattern.nnz());
  }
}
