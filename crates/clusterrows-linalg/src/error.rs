//! Error types for dense linear-algebra operations
//!
//! Every binary operation validates conformable shapes up front and reports
//! a structured error instead of producing a silently wrong result.

use thiserror::Error;

/// Error type for matrix, diagonal-matrix and SVD operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    /// Operand shapes are not conformable
    #[error("{operation}: dimension mismatch - expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        operation: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Element access outside a matrix
    #[error("element ({row}, {col}) is out of bounds for a {rows}x{cols} matrix")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Element access outside a diagonal matrix or vector
    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Operation needs a square matrix
    #[error("{operation}: matrix must be square, got {rows}x{cols}")]
    NotSquare {
        operation: String,
        rows: usize,
        cols: usize,
    },

    /// Matrix has a (near) zero singular value
    #[error("{operation}: matrix is singular")]
    Singular { operation: String },

    /// Division by an exactly zero diagonal entry
    #[error("{operation}: zero divisor at diagonal index {index}")]
    ZeroDivisor { operation: String, index: usize },

    /// Buffer length does not match the requested shape
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
}

/// Result type for linear-algebra operations
pub type LinalgResult<T> = Result<T, LinalgError>;

impl LinalgError {
    /// Create a dimension mismatch error
    pub fn dimension_mismatch(
        operation: impl Into<String>,
        expected: Vec<usize>,
        actual: Vec<usize>,
    ) -> Self {
        LinalgError::DimensionMismatch {
            operation: operation.into(),
            expected,
            actual,
        }
    }

    /// Create an out-of-bounds element access error
    pub fn out_of_bounds(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        LinalgError::OutOfBounds {
            row,
            col,
            rows,
            cols,
        }
    }

    /// Create a not-square error
    pub fn not_square(operation: impl Into<String>, rows: usize, cols: usize) -> Self {
        LinalgError::NotSquare {
            operation: operation.into(),
            rows,
            cols,
        }
    }

    /// Create a singular matrix error
    pub fn singular(operation: impl Into<String>) -> Self {
        LinalgError::Singular {
            operation: operation.into(),
        }
    }

    /// Create a zero divisor error
    pub fn zero_divisor(operation: impl Into<String>, index: usize) -> Self {
        LinalgError::ZeroDivisor {
            operation: operation.into(),
            index,
        }
    }
}
