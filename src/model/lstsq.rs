//! Minimum-norm least squares.
//!
//! One-hot blocks next to an intercept make the design matrix rank
//! deficient, so the normal equations have no unique solution. The system is
//! solved through an SVD of the design matrix instead, dropping singular
//! values below `RCOND` times the largest one.

use crate::model::ModelError;
use nalgebra::{DMatrix, DVector, SVD};
use ndarray::{Array1, Array2};

/// Relative cutoff below which singular values are treated as zero.
const RCOND: f64 = 1e-10;

/// Solve `x · w ≈ y` for the minimum-norm least squares `w`.
pub(crate) fn solve_min_norm(x: &Array2<f64>, y: &Array1<f64>) -> Result<Array1<f64>, ModelError> {
    let (n_samples, n_features) = x.dim();
    if n_features == 0 {
        return Ok(Array1::zeros(0));
    }

    let a = DMatrix::from_fn(n_samples, n_features, |i, j| x[[i, j]]);
    let b = DVector::from_iterator(n_samples, y.iter().copied());

    // max_niter = 0 iterates until convergence
    let svd = SVD::try_new(a, true, true, f64::EPSILON, 0)
        .ok_or(ModelError::Solver("SVD did not converge"))?;

    let largest = svd.singular_values.max();
    if largest == 0.0 {
        return Ok(Array1::zeros(n_features));
    }

    let w = svd.solve(&b, largest * RCOND).map_err(ModelError::Solver)?;
    Ok(w.iter().copied().collect())
}
