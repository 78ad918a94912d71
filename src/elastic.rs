//! Precomputed elemental stiffness operators for 2D linear elasticity.
//!
//! The 32 combined element DOFs interleave displacement components over the
//! 16 scalar shape functions: combined index `i` decodes as shape function
//! `i / 2` and direction `i % 2` (0 = x, 1 = y). The lower triangle of the
//! symmetric 32x32 elemental block is flattened over its (row, col) pairs in
//! column-major order, giving 528 independent entries.

use crate::{
  basis::{monomial_values_at, CardinalBasis, CARDINAL_F64},
  quadrature::QuadRule,
  ELEM_DOFS, NUM_BASIS, NUM_TRI,
};

use once_cell::sync::Lazy;
use thiserror::Error;

/// The two material terms of the elasticity bilinear form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StiffnessKind {
  /// Lambda term: products of the divergence contributions.
  Dilation,
  /// Mu term: contraction of the symmetric gradients.
  Shear,
}

#[derive(Debug, Error)]
pub enum ElasticError {
  #[error("flattened stiffness vector must have {NUM_TRI} entries, got {got}")]
  FlatLength { got: usize },
}

fn decode(combined: usize) -> (usize, usize) {
  (combined / 2, combined % 2)
}

fn flatten_pairs<S, F>(mut f: F) -> na::DVector<S>
where
  S: na::RealField + Copy,
  F: FnMut(usize, usize) -> S,
{
  let mut out = na::DVector::zeros(NUM_TRI);
  let mut k = 0;
  for col in 0..ELEM_DOFS {
    for row in col..ELEM_DOFS {
      out[k] = f(row, col);
      k += 1;
    }
  }
  out
}

/// The 528 dilation integrand values at a point: for each lower-triangular
/// pair, the product of the two own-direction partials.
pub fn flattened_dilation_integrand<S: na::RealField + Copy>(
  basis: &CardinalBasis<S>,
  x: S,
  y: S,
) -> na::DVector<S> {
  let partials = basis.partials_at(x, y);
  flatten_pairs(|row, col| {
    let (rb, rd) = decode(row);
    let (cb, cd) = decode(col);
    partials[(rb, rd)] * partials[(cb, cd)]
  })
}

/// The 528 shear integrand values at a point.
///
/// Same-direction pairs combine as `2 f1 f2 + g1 g2`, where `f` is the
/// partial along the shared displacement direction and `g` the other one;
/// cross-direction pairs reduce to the single swapped-direction product.
pub fn flattened_shear_integrand<S: na::RealField + Copy>(
  basis: &CardinalBasis<S>,
  x: S,
  y: S,
) -> na::DVector<S> {
  let two = na::convert::<f64, S>(2.0);
  let partials = basis.partials_at(x, y);
  flatten_pairs(|row, col| {
    let (rb, rd) = decode(row);
    let (cb, cd) = decode(col);
    if rd == cd {
      let other = 1 - rd;
      two * partials[(rb, rd)] * partials[(cb, cd)] + partials[(rb, other)] * partials[(cb, other)]
    } else {
      partials[(rb, cd)] * partials[(cb, rd)]
    }
  })
}

/// Kahan-compensated summation.
///
/// The unreduced integrands are high-degree polynomial products whose direct
/// working-precision accumulation loses accuracy to cancellation; the
/// operator is therefore accumulated in f64 with compensated sums and
/// truncated to the working scalar once, at the end.
fn compensated_sum(terms: impl Iterator<Item = f64>) -> f64 {
  let mut sum = 0.0;
  let mut compensation = 0.0;
  for term in terms {
    let adjusted = term - compensation;
    let next = sum + adjusted;
    compensation = (next - sum) - adjusted;
    sum = next;
  }
  sum
}

/// Precomputed 528x16 operator taking the monomial coefficients of a scalar
/// material field to the element's lower-triangular stiffness entries.
///
/// Mesh-independent: the same operator serves every element of a uniform
/// structured grid, so it is computed once per kind and working precision.
pub struct ElementalStiffnessMap<S: na::RealField + Copy> {
  kind: StiffnessKind,
  matrix: na::DMatrix<S>,
}

impl<S: na::RealField + Copy> ElementalStiffnessMap<S> {
  /// Evaluates the chosen integrand at all 25 quadrature points, scales by
  /// the weights and contracts with the monomial values at those points.
  pub fn build(kind: StiffnessKind) -> Self {
    let quad = QuadRule::<f64>::reference_square();
    let basis = &*CARDINAL_F64;

    // weighted integrand samples, one column per quadrature point
    let mut weighted = na::DMatrix::zeros(NUM_TRI, quad.npoints());
    for (p, point) in quad.points().column_iter().enumerate() {
      let column = match kind {
        StiffnessKind::Dilation => flattened_dilation_integrand(basis, point[0], point[1]),
        StiffnessKind::Shear => flattened_shear_integrand(basis, point[0], point[1]),
      };
      weighted.column_mut(p).copy_from(&(column * quad.weights()[p]));
    }
    let monomials = monomial_values_at(quad.points());

    let mut matrix = na::DMatrix::zeros(NUM_TRI, NUM_BASIS);
    for r in 0..NUM_TRI {
      for c in 0..NUM_BASIS {
        let dot = compensated_sum(
          weighted
            .row(r)
            .iter()
            .zip(monomials.column(c).iter())
            .map(|(&a, &b)| a * b),
        );
        matrix[(r, c)] = na::convert(dot);
      }
    }
    Self { kind, matrix }
  }

  pub fn kind(&self) -> StiffnessKind {
    self.kind
  }
  pub fn matrix(&self) -> &na::DMatrix<S> {
    &self.matrix
  }

  /// Applies the operator to a 16-coefficient monomial field sample, giving
  /// the element's 528 lower-triangular stiffness entries.
  pub fn apply(&self, field: &na::DVector<S>) -> na::DVector<S> {
    assert_eq!(field.len(), NUM_BASIS);
    &self.matrix * field
  }
}

/// Dilation operator in the default working precision, built once per process.
pub static DILATION_MAP_F64: Lazy<ElementalStiffnessMap<f64>> =
  Lazy::new(|| ElementalStiffnessMap::build(StiffnessKind::Dilation));
/// Shear operator in the default working precision, built once per process.
pub static SHEAR_MAP_F64: Lazy<ElementalStiffnessMap<f64>> =
  Lazy::new(|| ElementalStiffnessMap::build(StiffnessKind::Shear));

/// Expands 528 flattened lower-triangular entries into the full symmetric
/// 32x32 elemental block.
pub fn unflatten<S: na::RealField + Copy>(
  flat: &na::DVector<S>,
) -> Result<na::DMatrix<S>, ElasticError> {
  if flat.len() != NUM_TRI {
    return Err(ElasticError::FlatLength { got: flat.len() });
  }
  let mut mat = na::DMatrix::zeros(ELEM_DOFS, ELEM_DOFS);
  let mut k = 0;
  for col in 0..ELEM_DOFS {
    for row in col..ELEM_DOFS {
      mat[(row, col)] = flat[k];
      mat[(col, row)] = flat[k];
      k += 1;
    }
  }
  Ok(mat)
}

/// Inverse of [`unflatten`]: reads the lower triangle back in column-major
/// order.
pub fn flatten<S: na::RealField + Copy>(mat: &na::DMatrix<S>) -> na::DVector<S> {
  assert_eq!(mat.nrows(), ELEM_DOFS);
  assert_eq!(mat.ncols(), ELEM_DOFS);
  flatten_pairs(|row, col| mat[(row, col)])
}
