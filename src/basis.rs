//! The 16 cardinal C1 (bicubic Hermite) shape functions of the reference
//! square [-1, 1]^2.
//!
//! Shape function i is associated with constraint i: the constraints are
//! ordered corner-major over the corners (-1,-1), (1,-1), (-1,1), (1,1) with
//! value, dx, dy, dxy per corner. Function i evaluates to 1 for its own
//! constraint and to 0 for the 15 others.

use crate::NUM_BASIS;

use once_cell::sync::Lazy;

/// A scaled monomial term `coeff * x^xpow * y^ypow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
  coeff: u32,
  xpow: u32,
  ypow: u32,
}

impl Term {
  pub const fn new(xpow: u32, ypow: u32) -> Self {
    Self { coeff: 1, xpow, ypow }
  }

  pub fn eval<S: na::RealField + Copy>(&self, x: S, y: S) -> S {
    na::convert::<f64, S>(self.coeff as f64) * x.powi(self.xpow as i32) * y.powi(self.ypow as i32)
  }

  /// Closed-form x-partial: `d/dx c x^a y^b = (c a) x^(a-1) y^b`.
  pub fn dx(&self) -> Self {
    if self.xpow == 0 {
      Self { coeff: 0, xpow: 0, ypow: self.ypow }
    } else {
      Self {
        coeff: self.coeff * self.xpow,
        xpow: self.xpow - 1,
        ypow: self.ypow,
      }
    }
  }

  /// Closed-form y-partial.
  pub fn dy(&self) -> Self {
    if self.ypow == 0 {
      Self { coeff: 0, xpow: self.xpow, ypow: 0 }
    } else {
      Self {
        coeff: self.coeff * self.ypow,
        xpow: self.xpow,
        ypow: self.ypow - 1,
      }
    }
  }

  /// Mixed xy-partial.
  pub fn dxy(&self) -> Self {
    self.dx().dy()
  }

  pub fn coeff(&self) -> u32 {
    self.coeff
  }
  pub fn xpow(&self) -> u32 {
    self.xpow
  }
  pub fn ypow(&self) -> u32 {
    self.ypow
  }
}

/// The 16 bicubic monomials `x^a y^b`, `a, b` in 0..=3, in a-major order.
pub fn monomials() -> [Term; NUM_BASIS] {
  std::array::from_fn(|i| Term::new((i / 4) as u32, (i % 4) as u32))
}

/// Reference-square corners in constraint order.
pub const CORNERS: [(f64, f64); 4] = [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)];

/// Value, x-, y- and xy-partials of every monomial at the 4 corners.
///
/// Row j collects the 16 constraint values of monomial j, ordered corner-major
/// with value, dx, dy, dxy per corner. All partials come from the closed-form
/// differentiation rule on [`Term`], not from numerical differencing.
pub fn constraint_matrix<S: na::RealField + Copy>() -> na::DMatrix<S> {
  let mut mat = na::DMatrix::zeros(NUM_BASIS, NUM_BASIS);
  for (j, term) in monomials().iter().enumerate() {
    let partials = [*term, term.dx(), term.dy(), term.dxy()];
    for (c, &(x, y)) in CORNERS.iter().enumerate() {
      let x = na::convert::<f64, S>(x);
      let y = na::convert::<f64, S>(y);
      for (d, p) in partials.iter().enumerate() {
        mat[(j, 4 * c + d)] = p.eval(x, y);
      }
    }
  }
  mat
}

/// The cardinal basis: row i of `coeffs` holds shape function i's coefficients
/// in the monomial basis.
pub struct CardinalBasis<S: na::RealField + Copy> {
  coeffs: na::DMatrix<S>,
}

impl<S: na::RealField + Copy> CardinalBasis<S> {
  /// Inverts the constraint matrix.
  ///
  /// The constraint matrix is invertible whenever the reference element is
  /// nondegenerate, which holds unconditionally for the fixed reference
  /// square, so this constructor has no failure path.
  pub fn new() -> Self {
    let coeffs = constraint_matrix::<S>()
      .try_inverse()
      .expect("constraint matrix of the reference square is invertible");
    Self { coeffs }
  }

  pub fn coeffs(&self) -> &na::DMatrix<S> {
    &self.coeffs
  }

  /// Evaluates shape function `i` at a point.
  pub fn eval(&self, i: usize, x: S, y: S) -> S {
    monomials()
      .iter()
      .enumerate()
      .fold(S::zero(), |acc, (j, term)| {
        acc + self.coeffs[(i, j)] * term.eval(x, y)
      })
  }

  /// (dx, dy) values of all 16 shape functions at a point, as a 16x2 matrix.
  pub fn partials_at(&self, x: S, y: S) -> na::DMatrix<S> {
    let mut mono = na::DMatrix::zeros(NUM_BASIS, 2);
    for (j, term) in monomials().iter().enumerate() {
      mono[(j, 0)] = term.dx().eval(x, y);
      mono[(j, 1)] = term.dy().eval(x, y);
    }
    &self.coeffs * mono
  }
}

impl<S: na::RealField + Copy> Default for CardinalBasis<S> {
  fn default() -> Self {
    Self::new()
  }
}

/// Raw monomial values at the given points (2 x n), as an n x 16 matrix.
///
/// Used to reconstruct a material field from its monomial coefficients at
/// quadrature points, not to evaluate the cardinal functions.
pub fn monomial_values_at<S: na::RealField + Copy>(points: &na::DMatrix<S>) -> na::DMatrix<S> {
  assert_eq!(points.nrows(), 2);
  let mut vals = na::DMatrix::zeros(points.ncols(), NUM_BASIS);
  for (p, point) in points.column_iter().enumerate() {
    for (j, term) in monomials().iter().enumerate() {
      vals[(p, j)] = term.eval(point[0], point[1]);
    }
  }
  vals
}

/// Cardinal basis in the default working precision, built once per process.
pub static CARDINAL_F64: Lazy<CardinalBasis<f64>> = Lazy::new(CardinalBasis::new);

#[cfg(test)]
mod test {
  use super::{constraint_matrix, monomials, CardinalBasis, CORNERS};

  #[test]
  fn differentiation_rule() {
    let term = monomials()[4 * 3 + 2]; // x^3 y^2
    let dx = term.dx();
    assert_eq!((dx.coeff(), dx.xpow(), dx.ypow()), (3, 2, 2));
    let dxy = term.dxy();
    assert_eq!((dxy.coeff(), dxy.xpow(), dxy.ypow()), (6, 2, 1));
    assert_eq!(monomials()[0].dx().eval(0.3, 0.7), 0.0);
  }

  #[test]
  fn basis_is_cardinal() {
    let basis = CardinalBasis::<f64>::new();
    let constraints = constraint_matrix::<f64>();
    // constraint j applied to function i must give the Kronecker delta
    let product = basis.coeffs() * constraints;
    for i in 0..16 {
      for j in 0..16 {
        let expected = if i == j { 1.0 } else { 0.0 };
        assert!(
          (product[(i, j)] - expected).abs() < 1e-12,
          "constraint {j} of function {i}: {}",
          product[(i, j)]
        );
      }
    }
  }

  #[test]
  fn value_functions_interpolate_corners() {
    let basis = CardinalBasis::<f64>::new();
    for (c, &(x, y)) in CORNERS.iter().enumerate() {
      for i in 0..4 {
        let expected = if i == c { 1.0 } else { 0.0 };
        assert!((basis.eval(4 * i, x, y) - expected).abs() < 1e-12);
      }
    }
  }
}
