use hermfem::mesh::renumber::renumber_nodes;
use hermfem::mesh::sparsity::SparsityPattern;
use hermfem::mesh::Grid;
use hermfem::DOFS_PER_NODE;

fn init_tracing() {
  let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn reference_renumbering() {
  init_tracing();
  let permutation = renumber_nodes(3, 3);
  let expected = [0, 1, 4, 10, 2, 3, 5, 9, 7, 6, 8, 11, 14, 13, 12, 15];
  assert_eq!(permutation.as_slice(), &expected[..]);
}

#[test]
fn grid_computes_permutation_eagerly() {
  let grid = Grid::new(3, 3, 0.25, 0.25, -1.0, -1.0).unwrap();
  assert_eq!(grid.num_nodes(), 16);
  assert_eq!(grid.num_elements(), 9);
  assert_eq!(grid.permutation().as_slice(), renumber_nodes(3, 3).as_slice());
  // first DOF of reference node 3 (renumbered to 10)
  assert_eq!(grid.first_dof(3), 10 * DOFS_PER_NODE);
}

#[test]
fn renumbering_is_bijective() {
  for (nx, ny) in [(1, 1), (2, 7), (7, 2), (8, 8)] {
    let permutation = renumber_nodes(nx, ny);
    let num_nodes = (nx + 1) * (ny + 1);
    let mut image = permutation.as_slice().to_vec();
    image.sort_unstable();
    assert!(image.into_iter().eq(0..num_nodes), "{nx}x{ny}");
  }
}

#[test]
fn degenerate_grid_is_a_configuration_error() {
  let err = Grid::new(0, 2, 1.0, 1.0, 0.0, 0.0).unwrap_err();
  assert!(err.to_string().contains("at least one element"));
}

#[test]
fn single_element_pattern_is_one_dense_block() {
  init_tracing();
  let grid = Grid::new_unit(1, 1).unwrap();
  let pattern = SparsityPattern::build(&grid);
  assert_eq!(pattern.row_offsets().len(), 33);
  assert_eq!(pattern.nnz(), 528);
  // row r of a dense lower triangle holds the columns 0..=r
  for row in 0..32 {
    assert!(pattern.row(row).iter().copied().eq(0..=row));
  }
}

#[test]
fn cross_blocks_stay_below_the_diagonal() {
  let grid = Grid::new_unit(2, 1).unwrap();
  let pattern = SparsityPattern::build(&grid);
  for row in 0..pattern.num_rows() {
    let cols = pattern.row(row);
    // strictly increasing columns also rule out duplicated emissions
    assert!(cols.windows(2).all(|w| w[0] < w[1]), "row {row}");
    assert!(cols.iter().all(|&col| col <= row), "row {row}");
  }
  // 3x2 nodes: 4 horizontal + 3 vertical + 4 diagonal adjacent pairs
  assert_eq!(pattern.nnz(), 6 * 36 + 11 * 64);
}
