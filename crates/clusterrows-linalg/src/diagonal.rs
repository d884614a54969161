//! Diagonal matrices stored as their diagonal only
//!
//! An `n × n` diagonal matrix is represented by its `n` diagonal entries.
//! It is the `S` factor of [`crate::Svd`] and the right operand of
//! [`crate::Matrix::dot_diagonal`] / [`crate::Matrix::dot_inverse`].

use crate::error::{LinalgError, LinalgResult};
use crate::matrix::Matrix;
use scirs2_core::ndarray_ext::{Array1, Array2};

/// Entries with magnitude below this are treated as zero by
/// [`DiagonalMatrix::is_singular`].
pub const SINGULAR_THRESHOLD: f64 = 1e-12;

/// Square diagonal matrix of `f64`
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalMatrix {
    data: Array1<f64>,
}

impl DiagonalMatrix {
    /// Create an `n × n` diagonal matrix of zeros
    pub fn new(size: usize) -> Self {
        Self {
            data: Array1::zeros(size),
        }
    }

    /// Create a diagonal matrix from its diagonal entries
    ///
    /// # Examples
    ///
    /// ```
    /// use clusterrows_linalg::DiagonalMatrix;
    ///
    /// let d = DiagonalMatrix::from_vec(vec![1.0, 0.5, 2.0, 0.25]);
    /// assert_eq!(d.len(), 4);
    /// assert!((d.determinant() - 0.25).abs() < 1e-12);
    /// ```
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self {
            data: Array1::from(values),
        }
    }

    /// Number of diagonal entries
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the matrix is `0 × 0`
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bounds-checked read of diagonal entry `index`
    pub fn at(&self, index: usize) -> LinalgResult<f64> {
        self.check_bounds(index)?;
        Ok(self.data[index])
    }

    /// Bounds-checked mutable access to diagonal entry `index`
    pub fn at_mut(&mut self, index: usize) -> LinalgResult<&mut f64> {
        self.check_bounds(index)?;
        Ok(&mut self.data[index])
    }

    /// Diagonal entries in order
    pub fn as_array(&self) -> &Array1<f64> {
        &self.data
    }

    /// True if any diagonal entry is (numerically) zero
    pub fn is_singular(&self) -> bool {
        self.data.iter().any(|v| v.abs() < SINGULAR_THRESHOLD)
    }

    /// Product of the diagonal entries
    pub fn determinant(&self) -> f64 {
        self.data.iter().product()
    }

    /// Element-wise reciprocal
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::Singular`] if the matrix is singular.
    pub fn inverse(&self) -> LinalgResult<DiagonalMatrix> {
        if self.is_singular() {
            return Err(LinalgError::singular("DiagonalMatrix::inverse"));
        }
        Ok(Self {
            data: self.data.mapv(|v| 1.0 / v),
        })
    }

    /// Expand to a dense `n × n` matrix
    pub fn to_matrix(&self) -> Matrix {
        let n = self.data.len();
        let mut dense = Array2::zeros((n, n));
        for (i, &v) in self.data.iter().enumerate() {
            dense[[i, i]] = v;
        }
        Matrix::from_array(dense)
    }

    fn check_bounds(&self, index: usize) -> LinalgResult<()> {
        if index >= self.data.len() {
            return Err(LinalgError::IndexOutOfBounds {
                index,
                len: self.data.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinant() {
        let d = DiagonalMatrix::from_vec(vec![1.0, 0.5, 2.0, 0.25]);
        assert!((d.determinant() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_is_singular() {
        assert!(DiagonalMatrix::from_vec(vec![1.0, 0.5, 0.0]).is_singular());
        assert!(!DiagonalMatrix::from_vec(vec![1.0, 0.5, 0.75]).is_singular());
        assert!(DiagonalMatrix::from_vec(vec![1.0, 1e-15]).is_singular());
    }

    #[test]
    fn test_bounds_checked_access() {
        let mut d = DiagonalMatrix::new(3);
        *d.at_mut(2).unwrap() = 4.0;
        assert_eq!(d.at(2).unwrap(), 4.0);
        assert_eq!(
            d.at(3),
            Err(LinalgError::IndexOutOfBounds { index: 3, len: 3 })
        );
        assert!(d.at_mut(7).is_err());
    }

    #[test]
    fn test_inverse() {
        let d = DiagonalMatrix::from_vec(vec![2.0, 4.0]);
        let inv = d.inverse().unwrap();
        assert_eq!(inv.as_array().to_vec(), vec![0.5, 0.25]);

        let singular = DiagonalMatrix::from_vec(vec![2.0, 0.0]);
        assert!(matches!(
            singular.inverse(),
            Err(LinalgError::Singular { .. })
        ));
    }

    #[test]
    fn test_to_matrix() {
        let m = DiagonalMatrix::from_vec(vec![1.0, 2.0]).to_matrix();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.at(1, 1).unwrap(), 2.0);
        assert_eq!(m.at(0, 1).unwrap(), 0.0);
    }
}
