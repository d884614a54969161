//! Range checks for user-entered settings
//!
//! Hosts that collect settings interactively validate them with
//! [`ClusterParams::validate`] before calling [`crate::cluster_rows`]. The
//! entry point itself accepts any value that forms a valid training
//! configuration.

use crate::boundary::ClusterRequest;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Accepted cluster counts; `0` requests the automatic search
pub const CLUSTERS_RANGE: RangeInclusive<i32> = 0..=15;

/// Accepted restart counts
pub const EPOCHS_RANGE: RangeInclusive<i32> = 3..=100;

/// Accepted iteration budgets
pub const ITERATIONS_RANGE: RangeInclusive<i32> = 5..=10000;

/// A setting outside its accepted range
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{name} must be in the range [{min}, {max}], got {value}")]
pub struct ParamsError {
    pub name: &'static str,
    pub value: i32,
    pub min: i32,
    pub max: i32,
}

/// Settings as entered by a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterParams {
    pub clusters: i32,
    pub epochs: i32,
    pub iterations: i32,
    pub full_covariance: bool,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            clusters: 0,
            epochs: 10,
            iterations: 100,
            full_covariance: false,
        }
    }
}

impl ClusterParams {
    /// Check every setting against its range, reporting the first violation
    pub fn validate(&self) -> Result<(), ParamsError> {
        check("clusters", self.clusters, CLUSTERS_RANGE)?;
        check("epochs", self.epochs, EPOCHS_RANGE)?;
        check("iterations", self.iterations, ITERATIONS_RANGE)?;
        Ok(())
    }

    /// Validated request for [`crate::cluster_rows`]
    pub fn to_request(&self) -> Result<ClusterRequest, ParamsError> {
        self.validate()?;
        // In range, hence non-negative.
        Ok(ClusterRequest::new(
            self.clusters,
            self.epochs.unsigned_abs() as usize,
            self.iterations.unsigned_abs() as usize,
            self.full_covariance,
        ))
    }
}

fn check(name: &'static str, value: i32, range: RangeInclusive<i32>) -> Result<(), ParamsError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ParamsError {
            name,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}
