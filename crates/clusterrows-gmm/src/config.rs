//! Training configuration
//!
//! [`GmmConfig`] gathers every knob of a training run. Start from
//! [`GmmConfig::default`] and adjust with the `with_*` methods:
//!
//! ```
//! use clusterrows_gmm::{ClusterCount, CovarianceMode, GmmConfig};
//!
//! let config = GmmConfig::default()
//!     .with_clusters(ClusterCount::Fixed(3))
//!     .with_covariance(CovarianceMode::Full)
//!     .with_seed(7);
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.candidates(), vec![3]);
//! ```

use crate::control::{NoopObserver, StopToken, TrainingObserver};
use crate::covariance::CovarianceMode;
use crate::data::Normalization;
use crate::error::{GmmError, GmmResult};
use std::fmt;
use std::sync::Arc;

/// Minimum score improvement that keeps an epoch iterating
pub const EPSILON: f64 = 0.001;

/// Cluster counts tried when the count is chosen automatically (inclusive)
pub const AUTO_CLUSTER_RANGE: (usize, usize) = (2, 5);

/// Default number of random restarts
pub const DEFAULT_EPOCHS: usize = 10;

/// Default iteration budget per epoch
pub const DEFAULT_ITERATIONS: usize = 100;

/// Seed used when none is supplied
pub const DEFAULT_SEED: u64 = 0x5EED_C1A5_7E25;

/// How many clusters to fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterCount {
    /// Try every count in the configured range and keep the best scoring
    #[default]
    Auto,
    /// Fit exactly this many clusters
    Fixed(usize),
}

/// Configuration for a training run
#[derive(Clone)]
pub struct GmmConfig {
    /// Fixed cluster count or automatic search
    pub clusters: ClusterCount,
    /// Inclusive range searched by [`ClusterCount::Auto`]
    pub auto_range: (usize, usize),
    /// Random restarts per candidate
    pub epochs: usize,
    /// Maximum EM iterations per epoch
    pub iterations: usize,
    /// Covariance structure of every component
    pub covariance: CovarianceMode,
    /// How the data is presented to the model
    pub normalization: Normalization,
    /// Minimum score improvement that keeps an epoch iterating
    pub tolerance: f64,
    /// Base seed; each (cluster count, epoch) pair derives its own stream
    pub seed: u64,
    /// Cooperative cancellation
    pub stop: StopToken,
    /// Progress events
    pub observer: Arc<dyn TrainingObserver>,
}

impl Default for GmmConfig {
    fn default() -> Self {
        Self {
            clusters: ClusterCount::Auto,
            auto_range: AUTO_CLUSTER_RANGE,
            epochs: DEFAULT_EPOCHS,
            iterations: DEFAULT_ITERATIONS,
            covariance: CovarianceMode::Diagonal,
            normalization: Normalization::ZScore,
            tolerance: EPSILON,
            seed: DEFAULT_SEED,
            stop: StopToken::new(),
            observer: Arc::new(NoopObserver),
        }
    }
}

impl fmt::Debug for GmmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GmmConfig")
            .field("clusters", &self.clusters)
            .field("auto_range", &self.auto_range)
            .field("epochs", &self.epochs)
            .field("iterations", &self.iterations)
            .field("covariance", &self.covariance)
            .field("normalization", &self.normalization)
            .field("tolerance", &self.tolerance)
            .field("seed", &self.seed)
            .field("stop", &self.stop)
            .finish_non_exhaustive()
    }
}

impl GmmConfig {
    /// Configuration fitting exactly `clusters` clusters
    pub fn fixed(clusters: usize) -> Self {
        Self {
            clusters: ClusterCount::Fixed(clusters),
            ..Default::default()
        }
    }

    /// Configuration searching the default automatic range
    pub fn auto() -> Self {
        Self::default()
    }

    pub fn with_clusters(mut self, clusters: ClusterCount) -> Self {
        self.clusters = clusters;
        self
    }

    pub fn with_auto_range(mut self, min: usize, max: usize) -> Self {
        self.auto_range = (min, max);
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_covariance(mut self, covariance: CovarianceMode) -> Self {
        self.covariance = covariance;
        self
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_stop(mut self, stop: StopToken) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn TrainingObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Check that the configuration can drive a training run
    ///
    /// # Errors
    ///
    /// Returns [`GmmError::InvalidConfig`] for a zero cluster count, an empty
    /// or zero-based automatic range, zero epochs or iterations, or a
    /// negative or non-finite tolerance.
    pub fn validate(&self) -> GmmResult<()> {
        if let ClusterCount::Fixed(0) = self.clusters {
            return Err(GmmError::InvalidConfig(
                "cluster count must be at least 1".to_string(),
            ));
        }
        if self.clusters == ClusterCount::Auto {
            let (min, max) = self.auto_range;
            if min == 0 || min > max {
                return Err(GmmError::InvalidConfig(format!(
                    "automatic cluster range {}..={} is empty or starts at zero",
                    min, max
                )));
            }
        }
        if self.epochs == 0 {
            return Err(GmmError::InvalidConfig(
                "epochs must be at least 1".to_string(),
            ));
        }
        if self.iterations == 0 {
            return Err(GmmError::InvalidConfig(
                "iterations must be at least 1".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(GmmError::InvalidConfig(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    /// Cluster counts this configuration trains, in ascending order
    pub fn candidates(&self) -> Vec<usize> {
        match self.clusters {
            ClusterCount::Fixed(k) => vec![k],
            ClusterCount::Auto => (self.auto_range.0..=self.auto_range.1).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GmmConfig::default();
        assert_eq!(config.clusters, ClusterCount::Auto);
        assert_eq!(config.candidates(), vec![2, 3, 4, 5]);
        assert_eq!(config.covariance, CovarianceMode::Diagonal);
        assert_eq!(config.normalization, Normalization::ZScore);
        assert_eq!(config.tolerance, EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = GmmConfig::fixed(4)
            .with_epochs(3)
            .with_iterations(50)
            .with_seed(99)
            .with_normalization(Normalization::Raw);
        assert_eq!(config.candidates(), vec![4]);
        assert_eq!(config.epochs, 3);
        assert_eq!(config.iterations, 50);
        assert_eq!(config.seed, 99);

        let config = GmmConfig::auto().with_auto_range(3, 4);
        assert_eq!(config.candidates(), vec![3, 4]);
    }

    #[test]
    fn test_validate_rejects() {
        assert!(GmmConfig::fixed(0).validate().is_err());
        assert!(GmmConfig::default().with_epochs(0).validate().is_err());
        assert!(GmmConfig::default().with_iterations(0).validate().is_err());
        assert!(GmmConfig::default().with_auto_range(4, 2).validate().is_err());
        assert!(GmmConfig::default().with_auto_range(0, 2).validate().is_err());
        assert!(GmmConfig::default()
            .with_tolerance(f64::NAN)
            .validate()
            .is_err());
        assert!(GmmConfig::default().with_tolerance(-1.0).validate().is_err());

        // A fixed count ignores the automatic range
        assert!(GmmConfig::fixed(2)
            .with_auto_range(4, 2)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_debug_skips_observer() {
        let text = format!("{:?}", GmmConfig::fixed(2));
        assert!(text.contains("Fixed(2)"));
        assert!(!text.contains("observer"));
    }
}
