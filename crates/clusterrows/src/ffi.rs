//! C ABI for spreadsheet hosts
//!
//! ```c
//! int clusterrows_gmm(const double *data, int rows, int cols, int clusters,
//!                     int epochs, int iterations, int full_covariance,
//!                     int *labels, double *confidences);
//! ```
//!
//! Returns one of the `STATUS_*` codes. Training events go to the `log`
//! facade.

use crate::boundary::{cluster_rows, ClusterRequest};
use clusterrows_gmm::{GmmError, LogObserver};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Labels and confidences were written
pub const STATUS_OK: i32 = 0;

/// A pointer was null, a size was negative or the settings were invalid;
/// nothing was written
pub const STATUS_INVALID_INPUT: i32 = -1;

/// No candidate produced a usable model; nothing was written
pub const STATUS_TRAINING_FAILED: i32 = -2;

/// Training was cancelled before producing a model; nothing was written
pub const STATUS_CANCELLED: i32 = -3;

/// Status code reported for `error`
pub fn status_code(error: &GmmError) -> i32 {
    match error {
        GmmError::InvalidConfig(_) => STATUS_INVALID_INPUT,
        GmmError::Cancelled => STATUS_CANCELLED,
        _ => STATUS_TRAINING_FAILED,
    }
}

/// Cluster `rows × cols` row-major values from `data`
///
/// `clusters ≤ 0` searches 2..=5 clusters; a non-zero `full_covariance`
/// selects full covariance matrices. On [`STATUS_OK`] the first `rows`
/// entries of `labels` and `confidences` hold the result.
///
/// # Safety
///
/// Unless null, `data` must be valid for reading `rows * cols` values and
/// `labels` and `confidences` must be valid for writing `rows` values each.
/// The buffers must not overlap.
#[no_mangle]
pub unsafe extern "C" fn clusterrows_gmm(
    data: *const f64,
    rows: i32,
    cols: i32,
    clusters: i32,
    epochs: i32,
    iterations: i32,
    full_covariance: i32,
    labels: *mut i32,
    confidences: *mut f64,
) -> i32 {
    if data.is_null() || labels.is_null() || confidences.is_null() {
        return STATUS_INVALID_INPUT;
    }
    let (Ok(rows), Ok(cols), Ok(epochs), Ok(iterations)) = (
        usize::try_from(rows),
        usize::try_from(cols),
        usize::try_from(epochs),
        usize::try_from(iterations),
    ) else {
        return STATUS_INVALID_INPUT;
    };
    let Some(len) = rows.checked_mul(cols) else {
        return STATUS_INVALID_INPUT;
    };
    if cols == 0 {
        return STATUS_INVALID_INPUT;
    }

    // SAFETY: non-null and sized per the caller contract above.
    let (data, labels, confidences) = unsafe {
        (
            std::slice::from_raw_parts(data, len),
            std::slice::from_raw_parts_mut(labels, rows),
            std::slice::from_raw_parts_mut(confidences, rows),
        )
    };

    let request = ClusterRequest::new(clusters, epochs, iterations, full_covariance != 0)
        .with_observer(Arc::new(LogObserver));

    let result = catch_unwind(AssertUnwindSafe(|| {
        cluster_rows(data, rows, cols, &request, labels, confidences)
    }));
    match result {
        Ok(Ok(_)) => STATUS_OK,
        Ok(Err(e)) => {
            log::warn!("clusterrows_gmm failed: {}", e);
            status_code(&e)
        }
        Err(_) => {
            log::error!("clusterrows_gmm panicked");
            STATUS_TRAINING_FAILED
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn test_null_pointers() {
        let data = [0.0; 15];
        let mut labels = [7; 5];
        let mut confidences = [0.5; 5];

        let status = unsafe {
            clusterrows_gmm(
                ptr::null(),
                5,
                3,
                3,
                10,
                100,
                0,
                labels.as_mut_ptr(),
                confidences.as_mut_ptr(),
            )
        };
        assert_eq!(status, STATUS_INVALID_INPUT);

        let status = unsafe {
            clusterrows_gmm(
                data.as_ptr(),
                5,
                3,
                3,
                10,
                100,
                0,
                ptr::null_mut(),
                confidences.as_mut_ptr(),
            )
        };
        assert_eq!(status, STATUS_INVALID_INPUT);

        let status = unsafe {
            clusterrows_gmm(
                data.as_ptr(),
                5,
                3,
                3,
                10,
                100,
                0,
                labels.as_mut_ptr(),
                ptr::null_mut(),
            )
        };
        assert_eq!(status, STATUS_INVALID_INPUT);
        assert_eq!(labels, [7; 5]);
        assert_eq!(confidences, [0.5; 5]);
    }

    #[test]
    fn test_negative_sizes() {
        let data = [0.0; 15];
        let mut labels = [7; 5];
        let mut confidences = [0.5; 5];

        for (rows, cols, epochs, iterations) in
            [(-5, 3, 10, 100), (5, -3, 10, 100), (5, 3, -1, 100), (5, 3, 10, -1), (5, 0, 10, 100)]
        {
            let status = unsafe {
                clusterrows_gmm(
                    data.as_ptr(),
                    rows,
                    cols,
                    2,
                    epochs,
                    iterations,
                    0,
                    labels.as_mut_ptr(),
                    confidences.as_mut_ptr(),
                )
            };
            assert_eq!(status, STATUS_INVALID_INPUT);
        }
        assert_eq!(labels, [7; 5]);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(status_code(&GmmError::Cancelled), STATUS_CANCELLED);
        assert_eq!(
            status_code(&GmmError::InvalidConfig("epochs".into())),
            STATUS_INVALID_INPUT
        );
        assert_eq!(
            status_code(&GmmError::NoUsableModel { attempted: 4 }),
            STATUS_TRAINING_FAILED
        );
    }
}
