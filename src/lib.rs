extern crate nalgebra as na;
extern crate nalgebra_sparse as nas;

pub mod basis;
pub mod elastic;
pub mod mesh;
pub mod quadrature;

pub type NodeIdx = usize;
pub type DofIdx = usize;

/// Hermite DOFs per node and displacement component: value, dx, dy, dxy.
pub const HERMITE_DOFS: usize = 4;
/// Scalar DOFs collocated at a node (4 Hermite DOFs x 2 displacement components).
pub const DOFS_PER_NODE: usize = 2 * HERMITE_DOFS;
/// Bicubic monomials / cardinal shape functions per element.
pub const NUM_BASIS: usize = 16;
/// Combined (shape function x displacement component) DOFs per element.
pub const ELEM_DOFS: usize = 2 * NUM_BASIS;
/// Independent lower-triangular entries of the symmetric elemental block.
pub const NUM_TRI: usize = ELEM_DOFS * (ELEM_DOFS + 1) / 2;
