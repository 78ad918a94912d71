//! Gauss-Legendre quadrature for the reference interval and square.

/// A quadrature rule: one point per column of `points`, one weight each.
pub struct QuadRule<S: na::RealField + Copy> {
  points: na::DMatrix<S>,
  weights: na::DVector<S>,
}

impl<S: na::RealField + Copy> QuadRule<S> {
  /// The 5-point Gauss-Legendre rule on [-1, 1], exact up to degree 9.
  ///
  /// Nodes and weights are the closed-form roots of the degree-5 Legendre
  /// polynomial, so no iterative root finding is involved.
  pub fn gauss_legendre_1d() -> Self {
    let c = |v: f64| na::convert::<f64, S>(v);
    let disc = c(2.0) * (c(10.0) / c(7.0)).sqrt();
    let inner = (c(5.0) - disc).sqrt() / c(3.0);
    let outer = (c(5.0) + disc).sqrt() / c(3.0);
    let w_center = c(128.0) / c(225.0);
    let w_inner = (c(322.0) + c(13.0) * c(70.0).sqrt()) / c(900.0);
    let w_outer = (c(322.0) - c(13.0) * c(70.0).sqrt()) / c(900.0);

    let points = na::DMatrix::from_row_slice(1, 5, &[-outer, -inner, S::zero(), inner, outer]);
    let weights = na::DVector::from_column_slice(&[w_outer, w_inner, w_center, w_inner, w_outer]);
    Self { points, weights }
  }

  /// Tensor product of the 1d rule with itself: 25 points on [-1, 1]^2.
  pub fn reference_square() -> Self {
    let rule1d = Self::gauss_legendre_1d();
    let n = rule1d.npoints();
    let mut points = na::DMatrix::zeros(2, n * n);
    let mut weights = na::DVector::zeros(n * n);
    let mut k = 0;
    for i in 0..n {
      for j in 0..n {
        points[(0, k)] = rule1d.points[(0, i)];
        points[(1, k)] = rule1d.points[(0, j)];
        weights[k] = rule1d.weights[i] * rule1d.weights[j];
        k += 1;
      }
    }
    Self { points, weights }
  }

  pub fn dim(&self) -> usize {
    self.points.nrows()
  }
  pub fn npoints(&self) -> usize {
    self.points.ncols()
  }
  pub fn points(&self) -> &na::DMatrix<S> {
    &self.points
  }
  pub fn weights(&self) -> &na::DVector<S> {
    &self.weights
  }

  /// Integrates `f` over the reference domain of the rule.
  pub fn apply<F>(&self, f: F) -> S
  where
    F: Fn(na::DVectorView<S>) -> S,
  {
    self
      .points
      .column_iter()
      .zip(self.weights.iter())
      .map(|(p, &w)| w * f(p))
      .fold(S::zero(), |acc, v| acc + v)
  }
}

#[cfg(test)]
mod test {
  use super::QuadRule;

  #[test]
  fn weights_sum_to_volume() {
    let rule1d = QuadRule::<f64>::gauss_legendre_1d();
    assert!((rule1d.weights().sum() - 2.0).abs() < 1e-14);

    let rule2d = QuadRule::<f64>::reference_square();
    assert_eq!(rule2d.npoints(), 25);
    assert_eq!(rule2d.dim(), 2);
    assert!((rule2d.weights().sum() - 4.0).abs() < 1e-14);
  }

  #[test]
  fn integrates_even_monomial() {
    let rule1d = QuadRule::<f64>::gauss_legendre_1d();
    let computed = rule1d.apply(|p| p[0].powi(8));
    assert!((computed - 2.0 / 9.0).abs() < 1e-14);
  }
}
