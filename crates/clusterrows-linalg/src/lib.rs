//! # clusterrows-linalg
//!
//! Dense linear-algebra primitives used by the ClusterRows Gaussian mixture
//! engine.
//!
//! ## Overview
//!
//! - [`Matrix`] - owned `m × n` row-major matrix with bounds-checked access,
//!   products (`dot`, `dot_transpose`, `transpose_dot`), diagonal scaling
//!   (`dot_diagonal`, `dot_inverse`), Givens rotations and SVD-based inverse
//! - [`DiagonalMatrix`] - `n × n` diagonal matrix stored as its diagonal,
//!   with singularity check and determinant
//! - [`Svd`] - one-sided Jacobi singular value decomposition
//!
//! Shapes are validated on every binary operation; mismatches surface as
//! [`LinalgError`] rather than silently wrong results.
//!
//! ## Quick Start
//!
//! ```
//! use clusterrows_linalg::{Matrix, Svd};
//!
//! // A small covariance matrix
//! let sigma = Matrix::from_rows(&[vec![2.0, 0.3], vec![0.3, 1.0]])?;
//!
//! let svd = Svd::new(&sigma)?;
//! let precision = svd.inverse()?;
//! let det = svd.determinant();
//!
//! assert!(sigma.dot(&precision)?.approx_eq(&Matrix::identity(2), 1e-6));
//! assert!((det - 1.91).abs() < 1e-6);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## SciRS2 Integration
//!
//! Storage uses `scirs2_core::ndarray_ext` arrays. The Jacobi SVD is
//! implemented here; tests cross-check it against `scirs2_linalg::svd`.

#![deny(warnings)]

pub mod diagonal;
pub mod error;
pub mod matrix;
pub mod svd;

#[cfg(test)]
mod property_tests;

// Re-exports
pub use diagonal::{DiagonalMatrix, SINGULAR_THRESHOLD};
pub use error::{LinalgError, LinalgResult};
pub use matrix::Matrix;
pub use svd::{Svd, MAX_SWEEPS, SVD_TOLERANCE};
