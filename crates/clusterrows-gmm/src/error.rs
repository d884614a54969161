//! Error types for mixture-model training

use clusterrows_linalg::LinalgError;
use thiserror::Error;

/// Error type for GMM training and label extraction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GmmError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Insufficient data: {rows} rows cannot form {clusters} clusters")]
    InsufficientData { rows: usize, clusters: usize },

    #[error("Linear algebra error: {0}")]
    Linalg(#[from] LinalgError),

    #[error("Cluster {cluster} lost all of its samples")]
    DegenerateCluster { cluster: usize },

    #[error("Numerical breakdown: {0}")]
    NumericalBreakdown(String),

    #[error("Training was cancelled")]
    Cancelled,

    #[error("Model has not been fitted")]
    NotFitted,

    #[error("No usable model: all {attempted} candidate cluster counts failed")]
    NoUsableModel { attempted: usize },
}

/// Result type for GMM operations
pub type GmmResult<T> = Result<T, GmmError>;

impl GmmError {
    /// True for failures confined to a single epoch, which training skips
    /// over instead of aborting the candidate.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GmmError::Linalg(LinalgError::Singular { .. })
                | GmmError::Linalg(LinalgError::ZeroDivisor { .. })
                | GmmError::DegenerateCluster { .. }
                | GmmError::NumericalBreakdown(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(GmmError::Linalg(LinalgError::singular("Svd::inverse")).is_recoverable());
        assert!(GmmError::DegenerateCluster { cluster: 2 }.is_recoverable());
        assert!(GmmError::NumericalBreakdown("nan".into()).is_recoverable());

        assert!(!GmmError::Cancelled.is_recoverable());
        assert!(!GmmError::InvalidConfig("epochs".into()).is_recoverable());
        assert!(!GmmError::Linalg(LinalgError::not_square("inverse", 2, 3)).is_recoverable());
    }

    #[test]
    fn test_display() {
        let msg = format!("{}", GmmError::NoUsableModel { attempted: 4 });
        assert!(msg.contains("all 4 candidate"));

        let msg = format!(
            "{}",
            GmmError::from(LinalgError::singular("Svd::inverse"))
        );
        assert!(msg.contains("Linear algebra error"));
        assert!(msg.contains("singular"));
    }
}
