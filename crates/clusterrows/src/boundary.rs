//! Table-level entry point
//!
//! [`cluster_rows`] takes a flat row-major table and scalar settings and
//! writes one label and one confidence per row. Two common degenerate
//! requests produce fixed output instead of training:
//!
//! | Request                          | Labels | Confidences |
//! |----------------------------------|--------|-------------|
//! | `clusters == 1` (any row count)  | `0`    | `1.0`       |
//! | `clusters != 1`, `rows < 10`     | `-1`   | `0.0`       |
//!
//! Everything else trains a [`Gmm`]. Validation happens before any output
//! is written, so on error the caller's buffers are untouched.

use clusterrows_gmm::{
    ClusterCount, CovarianceMode, Data, Gmm, GmmConfig, GmmError, GmmResult, NoopObserver,
    SearchReport, StopToken, TrainingObserver, DEFAULT_EPOCHS, DEFAULT_ITERATIONS, DEFAULT_SEED,
};
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Fewest rows worth clustering into more than one group
pub const MIN_ROWS: usize = 10;

/// Label written when a row could not be clustered
pub const NO_LABEL: i32 = -1;

/// Settings for one [`cluster_rows`] call
#[derive(Clone)]
pub struct ClusterRequest {
    /// `≤ 0` searches 2..=5 clusters, `1` assigns everything to one cluster,
    /// larger values fit exactly that many
    pub clusters: i32,
    /// Random restarts per candidate
    pub epochs: usize,
    /// EM iterations per restart
    pub iterations: usize,
    /// Full covariance matrices instead of diagonal ones
    pub full_covariance: bool,
    /// Random seed; a time-based seed is used when absent
    pub seed: Option<u64>,
    /// Cooperative cancellation
    pub stop: StopToken,
    /// Progress events
    pub observer: Arc<dyn TrainingObserver>,
}

impl Default for ClusterRequest {
    fn default() -> Self {
        Self {
            clusters: 0,
            epochs: DEFAULT_EPOCHS,
            iterations: DEFAULT_ITERATIONS,
            full_covariance: false,
            seed: None,
            stop: StopToken::new(),
            observer: Arc::new(NoopObserver),
        }
    }
}

impl fmt::Debug for ClusterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterRequest")
            .field("clusters", &self.clusters)
            .field("epochs", &self.epochs)
            .field("iterations", &self.iterations)
            .field("full_covariance", &self.full_covariance)
            .field("seed", &self.seed)
            .field("stop", &self.stop)
            .finish_non_exhaustive()
    }
}

impl ClusterRequest {
    pub fn new(clusters: i32, epochs: usize, iterations: usize, full_covariance: bool) -> Self {
        Self {
            clusters,
            epochs,
            iterations,
            full_covariance,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
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

    /// Training configuration for this request
    ///
    /// Resolves a missing seed from the wall clock.
    pub fn to_config(&self) -> GmmConfig {
        let clusters = match usize::try_from(self.clusters) {
            Ok(k) if k > 0 => ClusterCount::Fixed(k),
            _ => ClusterCount::Auto,
        };
        let covariance = if self.full_covariance {
            CovarianceMode::Full
        } else {
            CovarianceMode::Diagonal
        };
        GmmConfig::default()
            .with_clusters(clusters)
            .with_epochs(self.epochs)
            .with_iterations(self.iterations)
            .with_covariance(covariance)
            .with_seed(self.seed.unwrap_or_else(time_seed))
            .with_stop(self.stop.clone())
            .with_observer(Arc::clone(&self.observer))
    }
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(DEFAULT_SEED)
}

/// What [`cluster_rows`] did
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterOutcome {
    /// One cluster requested: every row labeled `0` with confidence `1.0`
    SingleCluster,
    /// Too few rows: every row labeled `-1` with confidence `0.0`
    InsufficientRows,
    /// A model was trained
    Trained(SearchReport),
}

/// Cluster the rows of `data` (`rows × cols`, row-major)
///
/// Writes the first `rows` entries of `labels` and `confidences`.
///
/// # Errors
///
/// - [`GmmError::InvalidConfig`] if a buffer is too short, `cols` is zero, or
///   the request does not form a valid configuration
/// - [`GmmError::NoUsableModel`] if every candidate cluster count failed
/// - [`GmmError::Cancelled`] if stopped before any model was produced
///
/// # Examples
///
/// ```
/// use clusterrows::{cluster_rows, ClusterOutcome, ClusterRequest};
///
/// let data = [0.0; 12];
/// let mut labels = [7; 4];
/// let mut confidences = [0.5; 4];
///
/// let request = ClusterRequest::new(3, 10, 100, false);
/// let outcome = cluster_rows(&data, 4, 3, &request, &mut labels, &mut confidences)?;
///
/// assert_eq!(outcome, ClusterOutcome::InsufficientRows);
/// assert_eq!(labels, [-1; 4]);
/// assert_eq!(confidences, [0.0; 4]);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cluster_rows(
    data: &[f64],
    rows: usize,
    cols: usize,
    request: &ClusterRequest,
    labels: &mut [i32],
    confidences: &mut [f64],
) -> GmmResult<ClusterOutcome> {
    let len = rows
        .checked_mul(cols)
        .ok_or_else(|| GmmError::InvalidConfig(format!("{} x {} overflows", rows, cols)))?;
    if data.len() < len {
        return Err(GmmError::InvalidConfig(format!(
            "data holds {} values, {} x {} needs {}",
            data.len(),
            rows,
            cols,
            len
        )));
    }
    if labels.len() < rows || confidences.len() < rows {
        return Err(GmmError::InvalidConfig(format!(
            "output buffers hold {} labels and {} confidences, {} rows need both",
            labels.len(),
            confidences.len(),
            rows
        )));
    }
    let labels = &mut labels[..rows];
    let confidences = &mut confidences[..rows];

    if request.clusters == 1 {
        labels.fill(0);
        confidences.fill(1.0);
        return Ok(ClusterOutcome::SingleCluster);
    }
    if rows < MIN_ROWS {
        log::debug!("{} rows is too few to cluster", rows);
        labels.fill(NO_LABEL);
        confidences.fill(0.0);
        return Ok(ClusterOutcome::InsufficientRows);
    }
    if cols == 0 {
        return Err(GmmError::InvalidConfig("data has no columns".to_string()));
    }

    let config = request.to_config();
    let data = Data::new(&data[..len], rows, cols, config.normalization)?;
    let mut gmm = Gmm::new(&data, &config)?;
    let report = gmm.fit()?;
    gmm.get_labels(labels, confidences)?;

    log::debug!(
        "clustered {} rows into {} clusters (score {:.6})",
        rows,
        report.selected_clusters,
        report.score
    );
    Ok(ClusterOutcome::Trained(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_to_config() {
        let config = ClusterRequest::new(0, 5, 20, true).with_seed(3).to_config();
        assert_eq!(config.clusters, ClusterCount::Auto);
        assert_eq!(config.candidates(), vec![2, 3, 4, 5]);
        assert_eq!(config.covariance, CovarianceMode::Full);
        assert_eq!(config.epochs, 5);
        assert_eq!(config.iterations, 20);
        assert_eq!(config.seed, 3);

        let config = ClusterRequest::new(-4, 5, 20, false).to_config();
        assert_eq!(config.clusters, ClusterCount::Auto);
        assert_eq!(config.covariance, CovarianceMode::Diagonal);

        let config = ClusterRequest::new(7, 5, 20, false).to_config();
        assert_eq!(config.candidates(), vec![7]);
    }

    #[test]
    fn test_short_buffers_leave_output_untouched() {
        let data = [1.0; 30];
        let mut labels = [9; 10];
        let mut confidences = [0.5; 9];
        let request = ClusterRequest::new(1, 10, 100, false);

        let result = cluster_rows(&data, 10, 3, &request, &mut labels, &mut confidences);
        assert!(matches!(result, Err(GmmError::InvalidConfig(_))));
        assert_eq!(labels, [9; 10]);

        let mut confidences = [0.5; 10];
        let result = cluster_rows(&data[..29], 10, 3, &request, &mut labels, &mut confidences);
        assert!(result.is_err());
        assert_eq!(confidences, [0.5; 10]);
    }

    #[test]
    fn test_single_cluster_ignores_row_count() {
        let data = [0.0; 6];
        let mut labels = [5; 3];
        let mut confidences = [0.0; 3];
        let request = ClusterRequest::new(1, 10, 100, false);

        let outcome = cluster_rows(&data, 3, 2, &request, &mut labels, &mut confidences).unwrap();
        assert_eq!(outcome, ClusterOutcome::SingleCluster);
        assert_eq!(labels, [0; 3]);
        assert_eq!(confidences, [1.0; 3]);
    }

    #[test]
    fn test_longer_buffers_only_prefix_written() {
        let data = [0.0; 10];
        let mut labels = [5; 8];
        let mut confidences = [0.25; 8];
        let request = ClusterRequest::new(2, 10, 100, false);

        cluster_rows(&data, 5, 2, &request, &mut labels, &mut confidences).unwrap();
        assert_eq!(labels[..5], [-1; 5]);
        assert_eq!(labels[5..], [5; 3]);
        assert_eq!(confidences[5..], [0.25; 3]);
    }

    #[test]
    fn test_invalid_training_config() {
        let data: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let mut labels = [0; 20];
        let mut confidences = [0.0; 20];
        let request = ClusterRequest::new(2, 0, 100, false);

        let result = cluster_rows(&data, 20, 2, &request, &mut labels, &mut confidences);
        assert!(matches!(result, Err(GmmError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_columns() {
        let mut labels = [0; 12];
        let mut confidences = [0.0; 12];
        let request = ClusterRequest::default();
        let result = cluster_rows(&[], 12, 0, &request, &mut labels, &mut confidences);
        assert!(matches!(result, Err(GmmError::InvalidConfig(_))));
    }
}
