//! Covariance representations for a mixture component
//!
//! A component either carries a full `n × n` covariance matrix or only the
//! per-dimension standard deviations of a diagonal one.

use clusterrows_linalg::Matrix;
use scirs2_core::ndarray_ext::Array1;

/// Scale of the identity used to seed a full covariance
pub const FULL_INIT_SCALE: f64 = 5.0;

/// Per-dimension standard deviation used to seed a diagonal covariance
pub const DIAGONAL_INIT_STD: f64 = 1.5;

/// Added to the diagonal of every re-estimated full covariance
pub const COVARIANCE_RIDGE: f64 = 1e-6;

/// Lower bound on every re-estimated diagonal variance
pub const MIN_VARIANCE: f64 = 1e-6;

/// Which covariance structure the components use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CovarianceMode {
    /// Full covariance matrix, inverted through SVD
    Full,
    /// Independent dimensions, one standard deviation each
    #[default]
    Diagonal,
}

impl CovarianceMode {
    /// Short name used in log output
    pub fn name(&self) -> &'static str {
        match self {
            CovarianceMode::Full => "full",
            CovarianceMode::Diagonal => "diagonal",
        }
    }
}

/// Covariance of one component
#[derive(Debug, Clone, PartialEq)]
pub enum Covariance {
    /// `n × n` covariance matrix
    Full(Matrix),
    /// Standard deviation per dimension
    Diagonal(Array1<f64>),
}

impl Covariance {
    /// Starting covariance: `5·I` for full, `1.5` per dimension for diagonal
    pub fn initial(mode: CovarianceMode, dims: usize) -> Self {
        match mode {
            CovarianceMode::Full => {
                let mut sigma = Matrix::identity(dims).into_array();
                sigma.mapv_inplace(|v| v * FULL_INIT_SCALE);
                Covariance::Full(Matrix::from_array(sigma))
            }
            CovarianceMode::Diagonal => {
                Covariance::Diagonal(Array1::from_elem(dims, DIAGONAL_INIT_STD))
            }
        }
    }

    /// Structure of this covariance
    pub fn mode(&self) -> CovarianceMode {
        match self {
            Covariance::Full(_) => CovarianceMode::Full,
            Covariance::Diagonal(_) => CovarianceMode::Diagonal,
        }
    }

    /// Number of dimensions
    pub fn dims(&self) -> usize {
        match self {
            Covariance::Full(sigma) => sigma.cols(),
            Covariance::Diagonal(std_dev) => std_dev.len(),
        }
    }

    /// Variance along `dim`
    ///
    /// # Panics
    ///
    /// Panics if `dim` is out of range.
    pub fn variance(&self, dim: usize) -> f64 {
        match self {
            Covariance::Full(sigma) => sigma.as_array()[[dim, dim]],
            Covariance::Diagonal(std_dev) => std_dev[dim] * std_dev[dim],
        }
    }

    /// Zero every entry, keeping the shape
    pub fn clear(&mut self) {
        match self {
            Covariance::Full(sigma) => sigma.set(0.0),
            Covariance::Diagonal(std_dev) => std_dev.fill(0.0),
        }
    }
}
