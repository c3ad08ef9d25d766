use super::matrix::MatrixHelper;
use crate::prelude::{SweepError, SweepResult};
use ndarray::{Array1, Array2, ArrayView1};

/// Polynomial in ascending coefficient order (`c0 + c1 x + c2 x² ...`).
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coefficients: Array1<f64>,
}

impl Polynomial {
    /// Ordinary least-squares fit of the given degree.
    pub fn fit(x: ArrayView1<f64>, y: ArrayView1<f64>, degree: usize) -> SweepResult<Self> {
        if x.len() != y.len() {
            return Err(SweepError::ShapeMismatch {
                context: "polynomial fit",
                expected: vec![x.len()],
                found: vec![y.len()],
            });
        }
        if x.len() <= degree {
            return Err(SweepError::InsufficientData {
                context: "polynomial fit",
                needed: degree + 1,
                found: x.len(),
            });
        }

        let vandermonde = Array2::from_shape_fn((x.len(), degree + 1), |(i, p)| x[i].powi(p as i32));
        let coefficients = MatrixHelper::least_squares(vandermonde.view(), y)?;
        Ok(Self { coefficients })
    }

    pub fn coefficients(&self) -> ArrayView1<'_, f64> {
        self.coefficients.view()
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Horner evaluation.
    pub fn eval(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * x + c)
    }

    pub fn eval_all(&self, x: ArrayView1<f64>) -> Array1<f64> {
        x.mapv(|v| self.eval(v))
    }
}
