//! # clusterrows-gmm
//!
//! Gaussian mixture model clustering of the rows of a numeric matrix,
//! trained by expectation-maximization.
//!
//! ## Overview
//!
//! - [`Data`] - borrowed `m × n` sample matrix with per-column mean and
//!   standard deviation, presented as z-scores by default
//! - [`Cluster`] - one Gaussian component with weight `φ`, mean `μ` and a
//!   full or diagonal covariance `Σ`
//! - [`Model`] - EM with random restarts for a fixed cluster count
//! - [`Gmm`] - trains every candidate cluster count and keeps the best
//!
//! ## Scoring
//!
//! An E-step is scored as `Σ_j −log max_c w[c, j]`, the summed negative log
//! of each sample's strongest responsibility. Lower is better: a score of
//! zero means every sample belongs to exactly one component. The same
//! score ranks epochs within a candidate and candidates within a search.
//!
//! ## Quick Start
//!
//! ```
//! use clusterrows_gmm::{CovarianceMode, Data, Gmm, GmmConfig, Normalization};
//!
//! let values: Vec<f64> = (0..40)
//!     .flat_map(|i| {
//!         let c = if i % 2 == 0 { -5.0 } else { 5.0 };
//!         [c + (i % 5) as f64 * 0.1, c - (i % 3) as f64 * 0.1]
//!     })
//!     .collect();
//! let data = Data::new(&values, 40, 2, Normalization::ZScore)?;
//!
//! let config = GmmConfig::auto()
//!     .with_covariance(CovarianceMode::Diagonal)
//!     .with_seed(1);
//! let mut gmm = Gmm::new(&data, &config)?;
//! let report = gmm.fit()?;
//! assert_eq!(report.candidates.len(), 4);
//!
//! let mut labels = vec![0; 40];
//! let mut confidences = vec![0.0; 40];
//! gmm.get_labels(&mut labels, &mut confidences)?;
//! assert!(confidences.iter().all(|&c| c > 0.0 && c <= 1.0 + 1e-12));
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Features
//!
//! - `parallel` (default) - train candidate cluster counts concurrently via
//!   `scirs2_core::parallel_ops`

#![deny(warnings)]

pub mod cluster;
pub mod config;
pub mod control;
pub mod covariance;
pub mod data;
pub mod error;
pub mod model;
pub mod search;


// Re-exports
pub use cluster::{Cluster, MIN_RESPONSIBILITY};
pub use config::{
    ClusterCount, GmmConfig, AUTO_CLUSTER_RANGE, DEFAULT_EPOCHS, DEFAULT_ITERATIONS,
    DEFAULT_SEED, EPSILON,
};
pub use control::{LogObserver, NoopObserver, StopToken, TrainingObserver};
pub use covariance::{
    Covariance, CovarianceMode, COVARIANCE_RIDGE, DIAGONAL_INIT_STD, FULL_INIT_SCALE,
    MIN_VARIANCE,
};
pub use data::{Data, Normalization};
pub use error::{GmmError, GmmResult};
pub use model::{EmState, EpochOutcome, FitSummary, Model};
pub use search::{CandidateOutcome, Gmm, SearchReport, PARALLEL};
