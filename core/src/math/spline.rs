//! Penalized B-spline smoother used for adaptive baseline removal.
//!
//! The curve is a uniform-knot B-spline of fixed degree on `[0, 1]`; its
//! coefficients minimise the weighted squared residual plus a second-order
//! difference penalty. The penalty keeps the system solvable across runs of
//! zero weight, so a masked peak is bridged by the surrounding baseline.

use super::matrix::MatrixHelper;
use crate::prelude::{SweepError, SweepResult};
use ndarray::{s, Array1, Array2, ArrayView1};

pub const SPLINE_DEGREE: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct PenalizedSpline {
    segments: usize,
    coefficients: Array1<f64>,
}

impl PenalizedSpline {
    /// Fits the spline to `(x, y)` with per-sample `weights`.
    ///
    /// `x` must lie in `[0, 1]`. The segment count is reduced when the data
    /// cannot support that many coefficients.
    pub fn fit(
        x: ArrayView1<f64>,
        y: ArrayView1<f64>,
        weights: ArrayView1<f64>,
        segments: usize,
        smoothing: f64,
    ) -> SweepResult<Self> {
        let n = x.len();
        if y.len() != n || weights.len() != n {
            return Err(SweepError::ShapeMismatch {
                context: "spline fit",
                expected: vec![n, n],
                found: vec![y.len(), weights.len()],
            });
        }
        if n <= SPLINE_DEGREE {
            return Err(SweepError::InsufficientData {
                context: "spline fit",
                needed: SPLINE_DEGREE + 1,
                found: n,
            });
        }

        let segments = segments.clamp(1, n - SPLINE_DEGREE);
        let basis = design_matrix(x, segments);
        let (mut normal, rhs) = MatrixHelper::weighted_normal(basis.view(), weights, y);

        let lambda = smoothing.max(0.0) * weights.sum();
        normal.scaled_add(lambda, &difference_penalty(segments + SPLINE_DEGREE));

        let coefficients = MatrixHelper::cholesky_solve(normal.view(), rhs.view())?;
        Ok(Self {
            segments,
            coefficients,
        })
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    pub fn eval(&self, x: f64) -> f64 {
        let (first, values) = basis_functions(x, self.segments);
        values
            .iter()
            .zip(self.coefficients.slice(s![first..first + SPLINE_DEGREE + 1]))
            .map(|(b, c)| b * c)
            .sum()
    }

    pub fn eval_all(&self, x: ArrayView1<f64>) -> Array1<f64> {
        x.mapv(|v| self.eval(v))
    }
}

fn design_matrix(x: ArrayView1<f64>, segments: usize) -> Array2<f64> {
    let mut basis = Array2::<f64>::zeros((x.len(), segments + SPLINE_DEGREE));
    for (row, &value) in x.iter().enumerate() {
        let (first, values) = basis_functions(value, segments);
        for (offset, b) in values.iter().enumerate() {
            basis[[row, first + offset]] = *b;
        }
    }
    basis
}

/// Non-zero basis values at `x` and the index of the first one.
///
/// Knots sit at `(j - degree) / segments`, so the span containing `x` and the
/// left/right knot distances have closed forms.
fn basis_functions(x: f64, segments: usize) -> (usize, [f64; SPLINE_DEGREE + 1]) {
    let h = 1.0 / segments as f64;
    let span = ((x / h).floor().max(0.0) as usize).min(segments - 1);

    let mut values = [0.0; SPLINE_DEGREE + 1];
    let mut left = [0.0; SPLINE_DEGREE + 1];
    let mut right = [0.0; SPLINE_DEGREE + 1];
    values[0] = 1.0;
    for j in 1..=SPLINE_DEGREE {
        left[j] = x - (span as f64 + 1.0 - j as f64) * h;
        right[j] = (span + j) as f64 * h - x;
        let mut saved = 0.0;
        for r in 0..j {
            let temp = values[r] / (right[r + 1] + left[j - r]);
            values[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        values[j] = saved;
    }
    (span, values)
}

fn difference_penalty(size: usize) -> Array2<f64> {
    let mut diff = Array2::<f64>::zeros((size.saturating_sub(2), size));
    for row in 0..size.saturating_sub(2) {
        diff[[row, row]] = 1.0;
        diff[[row, row + 1]] = -2.0;
        diff[[row, row + 2]] = 1.0;
    }
    diff.t().dot(&diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_is_partition_of_unity() {
        for &x in &[0.0, 0.13, 0.5, 0.77, 1.0] {
            let (_, values) = basis_functions(x, 6);
            let total: f64 = values.iter().sum();
            assert!((total - 1.0).abs() < 1e-12, "sum {} at {}", total, x);
        }
    }

    #[test]
    fn spline_reproduces_line_exactly() {
        let x = Array1::linspace(0.0, 1.0, 60);
        let y = x.mapv(|v| 3.0 - 2.0 * v);
        let w = Array1::ones(60);
        let spline = PenalizedSpline::fit(x.view(), y.view(), w.view(), 8, 1e-3).unwrap();
        let fitted = spline.eval_all(x.view());
        for (a, b) in fitted.iter().zip(y.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn zero_weight_gap_is_bridged_by_baseline() {
        let x = Array1::linspace(0.0, 1.0, 80);
        let mut y = x.mapv(|v| 1.0 + v);
        let mut w = Array1::ones(80);
        for i in 35..45 {
            y[i] -= 5.0;
            w[i] = 0.0;
        }
        let spline = PenalizedSpline::fit(x.view(), y.view(), w.view(), 8, 1e-3).unwrap();
        assert!((spline.eval(x[40]) - (1.0 + x[40])).abs() < 1e-6);
    }

    #[test]
    fn segments_shrink_for_short_input() {
        let x = Array1::linspace(0.0, 1.0, 8);
        let y = Array1::zeros(8);
        let w = Array1::ones(8);
        let spline = PenalizedSpline::fit(x.view(), y.view(), w.view(), 20, 1e-3).unwrap();
        assert_eq!(spline.segments(), 3);
    }

    #[test]
    fn short_input_is_rejected() {
        let x = Array1::linspace(0.0, 1.0, 5);
        let y = Array1::zeros(5);
        let err = PenalizedSpline::fit(x.view(), y.view(), y.view(), 4, 1e-3).unwrap_err();
        assert!(matches!(err, SweepError::InsufficientData { .. }));
    }
}
