//! # ClusterRows
//!
//! Cluster the rows of a numeric table with a Gaussian mixture model.
//!
//! This is the **meta crate**: it re-exports the linear-algebra and mixture
//! crates and adds the table-level entry point used by spreadsheet hosts.
//!
//! ## Quick Start
//!
//! ```
//! use clusterrows::prelude::*;
//!
//! // 20 rows in two well separated groups
//! let data: Vec<f64> = (0..20)
//!     .flat_map(|r| {
//!         let c = if r < 10 { 0.0 } else { 8.0 };
//!         [c + (r % 4) as f64 * 0.2, c + (r % 3) as f64 * 0.2]
//!     })
//!     .collect();
//!
//! let request = ClusterRequest::new(2, 10, 100, false).with_seed(5);
//! let mut labels = vec![0; 20];
//! let mut confidences = vec![0.0; 20];
//! cluster_rows(&data, 20, 2, &request, &mut labels, &mut confidences)?;
//!
//! assert!(labels[..10].iter().all(|&l| l == labels[0]));
//! assert!(labels[10..].iter().all(|&l| l == labels[10]));
//! assert_ne!(labels[0], labels[10]);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Components
//!
//! - [`linalg`] - `Matrix`, `DiagonalMatrix`, one-sided Jacobi `Svd`
//! - [`gmm`] - `Data`, `Cluster`, `Model`, `Gmm`, configuration and
//!   cancellation
//! - [`cluster_rows`] - safe entry point with the small-input rules hosts
//!   rely on
//! - [`ffi::clusterrows_gmm`] - the same entry point over the C ABI
//! - [`ClusterParams`] - range checks for interactively entered settings
//!
//! ## Features
//!
//! - `parallel` (default): train candidate cluster counts concurrently

#![deny(warnings)]

pub mod boundary;
pub mod ffi;
pub mod params;


// Re-export all components
pub use clusterrows_gmm as gmm;
pub use clusterrows_linalg as linalg;

pub use boundary::{cluster_rows, ClusterOutcome, ClusterRequest, MIN_ROWS, NO_LABEL};
pub use ffi::{STATUS_CANCELLED, STATUS_INVALID_INPUT, STATUS_OK, STATUS_TRAINING_FAILED};
pub use params::{ClusterParams, ParamsError};

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! # Example
    //!
    //! ```
    //! use clusterrows::prelude::*;
    //!
    //! let config = GmmConfig::fixed(3).with_covariance(CovarianceMode::Full);
    //! assert_eq!(config.candidates(), vec![3]);
    //! ```

    // Entry point
    pub use crate::boundary::{cluster_rows, ClusterOutcome, ClusterRequest};
    pub use crate::params::ClusterParams;

    // Training
    pub use crate::gmm::{
        ClusterCount, CovarianceMode, Data, Gmm, GmmConfig, GmmError, LogObserver,
        Normalization, SearchReport, StopToken, TrainingObserver,
    };

    // Linear algebra
    pub use crate::linalg::{DiagonalMatrix, Matrix, Svd};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_parallel_feature_reaches_training() {
        assert_eq!(crate::gmm::PARALLEL, cfg!(feature = "parallel"));
    }
}
