//! Dense row-major matrices of `f64`
//!
//! [`Matrix`] owns an `m × n` buffer with a fixed shape. Element access is
//! bounds-checked and every binary operation validates operand shapes,
//! returning [`LinalgError`] on mismatch.
//!
//! # Examples
//!
//! ```
//! use clusterrows_linalg::{DiagonalMatrix, Matrix};
//!
//! let a = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]])?;
//! let d = DiagonalMatrix::from_vec(vec![2.0, 0.5]);
//!
//! // Scale columns, then undo the scaling
//! let scaled = a.dot_diagonal(&d)?;
//! assert_eq!(scaled.at(1, 0)?, 6.0);
//! assert!(scaled.dot_inverse(&d)?.approx_eq(&a, 1e-12));
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::diagonal::DiagonalMatrix;
use crate::error::{LinalgError, LinalgResult};
use crate::svd::Svd;
use scirs2_core::ndarray_ext::{Array1, Array2, ArrayView1};

/// Dense `m × n` matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Array2<f64>,
}

impl Matrix {
    /// Create a `rows × cols` matrix of zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
        }
    }

    /// Create an `n × n` identity matrix
    pub fn identity(n: usize) -> Self {
        Self {
            data: Array2::eye(n),
        }
    }

    /// Wrap an existing array
    pub fn from_array(data: Array2<f64>) -> Self {
        Self { data }
    }

    /// Create a matrix from a row-major buffer
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::ShapeMismatch`] if `values.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, values: Vec<f64>) -> LinalgResult<Self> {
        let len = values.len();
        let data = Array2::from_shape_vec((rows, cols), values).map_err(|_| {
            LinalgError::ShapeMismatch(format!(
                "buffer of length {} cannot form a {}x{} matrix",
                len, rows, cols
            ))
        })?;
        Ok(Self { data })
    }

    /// Create a matrix from equally sized rows
    pub fn from_rows(rows: &[Vec<f64>]) -> LinalgResult<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(LinalgError::ShapeMismatch(format!(
                "ragged rows: expected {} columns, found a row with {}",
                cols,
                bad.len()
            )));
        }
        let values = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Self::from_vec(rows.len(), cols, values)
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Underlying array
    pub fn as_array(&self) -> &Array2<f64> {
        &self.data
    }

    /// Consume the matrix and return the underlying array
    pub fn into_array(self) -> Array2<f64> {
        self.data
    }

    /// Bounds-checked element read
    pub fn at(&self, row: usize, col: usize) -> LinalgResult<f64> {
        self.check_bounds(row, col)?;
        Ok(self.data[[row, col]])
    }

    /// Bounds-checked mutable element access
    pub fn at_mut(&mut self, row: usize, col: usize) -> LinalgResult<&mut f64> {
        self.check_bounds(row, col)?;
        Ok(&mut self.data[[row, col]])
    }

    /// Set every element to `value`
    pub fn set(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// View of column `col`
    pub fn column(&self, col: usize) -> LinalgResult<ArrayView1<'_, f64>> {
        if col >= self.cols() {
            return Err(LinalgError::out_of_bounds(0, col, self.rows(), self.cols()));
        }
        Ok(self.data.column(col))
    }

    /// Transposed copy
    pub fn transpose(&self) -> Matrix {
        Self {
            data: self.data.t().to_owned(),
        }
    }

    /// Turn a square matrix into the identity
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::NotSquare`] for non-square matrices.
    pub fn set_identity(&mut self) -> LinalgResult<()> {
        if self.rows() != self.cols() {
            return Err(LinalgError::not_square(
                "set_identity",
                self.rows(),
                self.cols(),
            ));
        }
        self.data.fill(0.0);
        for i in 0..self.rows() {
            self.data[[i, i]] = 1.0;
        }
        Ok(())
    }

    /// Matrix product `self · right`
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::DimensionMismatch`] unless `self.cols() == right.rows()`.
    pub fn dot(&self, right: &Matrix) -> LinalgResult<Matrix> {
        if self.cols() != right.rows() {
            return Err(LinalgError::dimension_mismatch(
                "dot",
                vec![self.cols(), right.cols()],
                vec![right.rows(), right.cols()],
            ));
        }
        let (m, inner, n) = (self.rows(), self.cols(), right.cols());
        let mut res = Array2::zeros((m, n));
        for row in 0..m {
            for k in 0..inner {
                let a = self.data[[row, k]];
                if a == 0.0 {
                    continue;
                }
                for col in 0..n {
                    res[[row, col]] += a * right.data[[k, col]];
                }
            }
        }
        Ok(Self { data: res })
    }

    /// `self · D`, i.e. column `j` scaled by `D[j]`
    pub fn dot_diagonal(&self, diag: &DiagonalMatrix) -> LinalgResult<Matrix> {
        self.check_diagonal("dot_diagonal", diag)?;
        let d = diag.as_array();
        let mut res = self.data.clone();
        for (j, mut col) in res.columns_mut().into_iter().enumerate() {
            col.mapv_inplace(|v| v * d[j]);
        }
        Ok(Self { data: res })
    }

    /// `self · D⁻¹`, i.e. column `j` divided by `D[j]`
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::ZeroDivisor`] if any diagonal entry is exactly zero.
    pub fn dot_inverse(&self, diag: &DiagonalMatrix) -> LinalgResult<Matrix> {
        self.check_diagonal("dot_inverse", diag)?;
        let d = diag.as_array();
        if let Some(index) = d.iter().position(|&v| v == 0.0) {
            return Err(LinalgError::zero_divisor("dot_inverse", index));
        }
        let mut res = self.data.clone();
        for (j, mut col) in res.columns_mut().into_iter().enumerate() {
            col.mapv_inplace(|v| v / d[j]);
        }
        Ok(Self { data: res })
    }

    /// `self · rightᵗ`
    pub fn dot_transpose(&self, right: &Matrix) -> LinalgResult<Matrix> {
        if self.cols() != right.cols() {
            return Err(LinalgError::dimension_mismatch(
                "dot_transpose",
                vec![right.rows(), self.cols()],
                vec![right.rows(), right.cols()],
            ));
        }
        let (m, inner, n) = (self.rows(), self.cols(), right.rows());
        let mut res = Array2::zeros((m, n));
        for row in 0..m {
            for col in 0..n {
                let mut sum = 0.0;
                for k in 0..inner {
                    sum += self.data[[row, k]] * right.data[[col, k]];
                }
                res[[row, col]] = sum;
            }
        }
        Ok(Self { data: res })
    }

    /// `selfᵗ · right`
    pub fn transpose_dot(&self, right: &Matrix) -> LinalgResult<Matrix> {
        if self.rows() != right.rows() {
            return Err(LinalgError::dimension_mismatch(
                "transpose_dot",
                vec![self.rows(), right.cols()],
                vec![right.rows(), right.cols()],
            ));
        }
        let (inner, m, n) = (self.rows(), self.cols(), right.cols());
        let mut res = Array2::zeros((m, n));
        for k in 0..inner {
            for row in 0..m {
                let a = self.data[[k, row]];
                if a == 0.0 {
                    continue;
                }
                for col in 0..n {
                    res[[row, col]] += a * right.data[[k, col]];
                }
            }
        }
        Ok(Self { data: res })
    }

    /// Sum of squares of all elements (squared Frobenius norm)
    pub fn sum_of_squares(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum()
    }

    /// Inner product of columns `col1` and `col2`
    pub fn cols_inner_product(&self, col1: usize, col2: usize) -> LinalgResult<f64> {
        let a = self.column(col1)?;
        let b = self.column(col2)?;
        Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
    }

    /// Copy with columns `col1` and `col2` rotated by `theta`
    ///
    /// For every row, `(a, b) = (x[col1], x[col2])` becomes
    /// `(cos θ·a + sin θ·b, −sin θ·a + cos θ·b)`. Other columns are copied.
    pub fn givens_rot(&self, col1: usize, col2: usize, theta: f64) -> LinalgResult<Matrix> {
        let mut res = self.clone();
        res.givens_rot_inplace(col1, col2, theta)?;
        Ok(res)
    }

    /// In-place variant of [`Matrix::givens_rot`]
    pub fn givens_rot_inplace(&mut self, col1: usize, col2: usize, theta: f64) -> LinalgResult<()> {
        let cols = self.cols();
        if col1 >= cols || col2 >= cols {
            return Err(LinalgError::out_of_bounds(
                0,
                col1.max(col2),
                self.rows(),
                cols,
            ));
        }
        let (sin, cos) = theta.sin_cos();
        for row in 0..self.rows() {
            let a = self.data[[row, col1]];
            let b = self.data[[row, col2]];
            self.data[[row, col1]] = cos * a + sin * b;
            self.data[[row, col2]] = cos * b - sin * a;
        }
        Ok(())
    }

    /// Inverse of a square matrix via its SVD: `A⁻¹ = V·S⁻¹·Uᵗ`
    ///
    /// # Errors
    ///
    /// [`LinalgError::NotSquare`] for rectangular input and
    /// [`LinalgError::Singular`] when a singular value is (near) zero.
    pub fn inverse(&self) -> LinalgResult<Matrix> {
        Svd::new(self)?.inverse()
    }

    /// Determinant magnitude of a square matrix via its SVD
    ///
    /// The sign is not tracked; for the positive semi-definite covariance
    /// matrices this is used on, the result is the determinant.
    pub fn determinant(&self) -> LinalgResult<f64> {
        if self.rows() != self.cols() {
            return Err(LinalgError::not_square(
                "determinant",
                self.rows(),
                self.cols(),
            ));
        }
        Ok(Svd::new(self)?.determinant())
    }

    /// Element-wise comparison within `tol`
    pub fn approx_eq(&self, other: &Matrix, tol: f64) -> bool {
        self.data.dim() == other.data.dim()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| (a - b).abs() <= tol)
    }

    /// Column `col` as an owned vector
    pub fn column_vec(&self, col: usize) -> LinalgResult<Array1<f64>> {
        Ok(self.column(col)?.to_owned())
    }

    fn check_bounds(&self, row: usize, col: usize) -> LinalgResult<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(LinalgError::out_of_bounds(
                row,
                col,
                self.rows(),
                self.cols(),
            ));
        }
        Ok(())
    }

    fn check_diagonal(&self, operation: &str, diag: &DiagonalMatrix) -> LinalgResult<()> {
        if self.cols() != diag.len() {
            return Err(LinalgError::dimension_mismatch(
                operation,
                vec![self.cols(), self.cols()],
                vec![diag.len(), diag.len()],
            ));
        }
        Ok(())
    }
}
