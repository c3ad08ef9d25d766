use crate::prelude::{SweepError, SweepResult};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Singular values below this fraction of the largest count as zero.
const RANK_TOLERANCE: f64 = 1e-12;

/// Bridges baseline fits onto nalgebra's dense decompositions.
pub struct MatrixHelper;

impl MatrixHelper {
    /// Least-squares solution of `a x ≈ b` through the SVD.
    pub fn least_squares(a: ArrayView2<f64>, b: ArrayView1<f64>) -> SweepResult<Array1<f64>> {
        let (rows, cols) = a.dim();
        if b.len() != rows {
            return Err(SweepError::ShapeMismatch {
                context: "least squares",
                expected: vec![rows],
                found: vec![b.len()],
            });
        }
        if rows < cols {
            return Err(SweepError::InsufficientData {
                context: "least squares",
                needed: cols,
                found: rows,
            });
        }

        let svd = to_dmatrix(a).svd(true, true);
        let largest = svd.singular_values.max();
        let eps = RANK_TOLERANCE * largest.max(1.0);
        let rank = svd.rank(eps);
        if rank < cols {
            return Err(SweepError::SingularSystem(format!(
                "rank {} below {} columns",
                rank, cols
            )));
        }
        let solution = svd
            .solve(&to_dvector(b), eps)
            .map_err(|err| SweepError::SingularSystem(err.to_string()))?;
        Ok(to_array(&solution))
    }

    /// Solves `a x = b` for symmetric positive-definite `a`.
    pub fn cholesky_solve(a: ArrayView2<f64>, b: ArrayView1<f64>) -> SweepResult<Array1<f64>> {
        let n = a.nrows();
        if a.ncols() != n || b.len() != n {
            return Err(SweepError::ShapeMismatch {
                context: "cholesky",
                expected: vec![n, n],
                found: vec![a.ncols(), b.len()],
            });
        }
        let cholesky = to_dmatrix(a).cholesky().ok_or_else(|| {
            SweepError::SingularSystem("matrix not positive definite".to_string())
        })?;
        Ok(to_array(&cholesky.solve(&to_dvector(b))))
    }

    /// Weighted normal matrix `aᵀ diag(w) a` and right-hand side `aᵀ diag(w) b`.
    pub fn weighted_normal(
        a: ArrayView2<f64>,
        weights: ArrayView1<f64>,
        b: ArrayView1<f64>,
    ) -> (Array2<f64>, Array1<f64>) {
        let weighted = &a * &weights.insert_axis(Axis(1));
        let normal = weighted.t().dot(&a);
        let rhs = weighted.t().dot(&b);
        (normal, rhs)
    }
}

fn to_dmatrix(a: ArrayView2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

fn to_dvector(b: ArrayView1<f64>) -> DVector<f64> {
    DVector::from_iterator(b.len(), b.iter().copied())
}

fn to_array(x: &DVector<f64>) -> Array1<f64> {
    x.iter().copied().collect()
}
