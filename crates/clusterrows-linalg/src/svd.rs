//! One-sided Jacobi singular value decomposition
//!
//! Factorizes `A` (`m × n`, `m ≥ n`) as `A = U·S·Vᵗ` by repeatedly rotating
//! pairs of columns of a working copy of `A` until every pair is orthogonal:
//!
//! ```text
//! U := A,  V := I
//! repeat
//!     s := 0
//!     for i < j:
//!         r := ⟨Uᵢ,Uⱼ⟩, p := ⟨Uᵢ,Uᵢ⟩, q := ⟨Uⱼ,Uⱼ⟩
//!         θ := ½·atan2(2r, p − q)
//!         rotate columns (i, j) of U and V by θ
//!         s += r²
//! until √s ≤ ε²·‖A‖_F
//! Sᵢ := ‖Uᵢ‖,  U := U·S⁻¹
//! ```
//!
//! The rotations are orthogonal, so `A·V = U·S` holds after every sweep and
//! only the orthogonality of `U` depends on convergence.
//!
//! # Examples
//!
//! ```
//! use clusterrows_linalg::{Matrix, Svd};
//!
//! let a = Matrix::from_rows(&[vec![3.0, 1.0], vec![1.0, 3.0]])?;
//! let svd = Svd::new(&a)?;
//!
//! assert!((svd.determinant() - 8.0).abs() < 1e-6);
//! assert!(svd.reconstruct()?.approx_eq(&a, 1e-6));
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::diagonal::DiagonalMatrix;
use crate::error::{LinalgError, LinalgResult};
use crate::matrix::Matrix;

/// Convergence factor `ε²` applied to the Frobenius norm of the input
pub const SVD_TOLERANCE: f64 = 0.001;

/// Upper bound on full sweeps; only reached for non-finite input
pub const MAX_SWEEPS: usize = 100;

/// Singular value decomposition `A = U·S·Vᵗ`
#[derive(Debug, Clone)]
pub struct Svd {
    u: Matrix,
    s: DiagonalMatrix,
    v: Matrix,
    sweeps: usize,
}

impl Svd {
    /// Decompose `a`
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::DimensionMismatch`] if `a` has more columns than rows.
    pub fn new(a: &Matrix) -> LinalgResult<Self> {
        let (m, n) = (a.rows(), a.cols());
        if m < n {
            return Err(LinalgError::dimension_mismatch(
                "Svd::new",
                vec![n, n],
                vec![m, n],
            ));
        }

        let mut u = a.clone();
        let mut v = Matrix::identity(n);
        let threshold = SVD_TOLERANCE * a.sum_of_squares().sqrt();

        let mut sweeps = 0;
        loop {
            let mut s = 0.0;
            for i in 0..n.saturating_sub(1) {
                for j in (i + 1)..n {
                    let r = u.cols_inner_product(i, j)?;
                    s += r * r;

                    let p = u.cols_inner_product(i, i)?;
                    let q = u.cols_inner_product(j, j)?;
                    let theta = 0.5 * (2.0 * r).atan2(p - q);

                    u.givens_rot_inplace(i, j, theta)?;
                    v.givens_rot_inplace(i, j, theta)?;
                }
            }
            sweeps += 1;

            // A NaN residual never compares as converged; the sweep cap ends it.
            if s.sqrt() <= threshold || sweeps >= MAX_SWEEPS {
                break;
            }
        }

        let s = DiagonalMatrix::from_vec(
            (0..n)
                .map(|i| u.cols_inner_product(i, i).map(f64::sqrt))
                .collect::<LinalgResult<Vec<_>>>()?,
        );
        let u = normalize_columns(u, &s)?;

        Ok(Self { u, s, v, sweeps })
    }

    /// Left factor, same shape as `A`, with unit columns
    pub fn u(&self) -> &Matrix {
        &self.u
    }

    /// Singular values in column order (unsorted)
    pub fn s(&self) -> &DiagonalMatrix {
        &self.s
    }

    /// Right factor, `n × n` orthonormal
    pub fn v(&self) -> &Matrix {
        &self.v
    }

    /// Number of full sweeps performed
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    /// Product of the singular values
    pub fn determinant(&self) -> f64 {
        self.s.determinant()
    }

    /// Inverse of the decomposed square matrix, `V·S⁻¹·Uᵗ`
    ///
    /// # Errors
    ///
    /// [`LinalgError::NotSquare`] if `A` was rectangular, [`LinalgError::Singular`]
    /// if any singular value is below [`crate::SINGULAR_THRESHOLD`].
    pub fn inverse(&self) -> LinalgResult<Matrix> {
        if self.u.rows() != self.u.cols() {
            return Err(LinalgError::not_square(
                "Svd::inverse",
                self.u.rows(),
                self.u.cols(),
            ));
        }
        if self.s.is_singular() {
            return Err(LinalgError::singular("Svd::inverse"));
        }
        self.v.dot_inverse(&self.s)?.dot_transpose(&self.u)
    }

    /// `U·S·Vᵗ`
    pub fn reconstruct(&self) -> LinalgResult<Matrix> {
        self.u.dot_diagonal(&self.s)?.dot_transpose(&self.v)
    }
}

/// `U·S⁻¹`, leaving columns with a zero singular value untouched (they are
/// already zero).
fn normalize_columns(u: Matrix, s: &DiagonalMatrix) -> LinalgResult<Matrix> {
    if s.as_array().iter().all(|&v| v != 0.0) {
        return u.dot_inverse(s);
    }
    let ones = s.as_array().mapv(|v| if v == 0.0 { 1.0 } else { v });
    u.dot_inverse(&DiagonalMatrix::from_vec(ones.to_vec()))
}
