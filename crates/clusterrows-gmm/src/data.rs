//! Borrowed view over the caller's sample matrix
//!
//! [`Data`] wraps an `m × n` row-major buffer owned by the caller (one row
//! per sample, one column per dimension) and computes per-column mean and
//! standard deviation once, at construction, with Welford's streaming
//! update:
//!
//! ```text
//! meanₖ = meanₖ₋₁ + (x − meanₖ₋₁) / k
//! M₂,ₖ  = M₂,ₖ₋₁ + (x − meanₖ)(x − meanₖ₋₁)
//! std   = √(M₂ / (m − 1))
//! ```
//!
//! Accessors return either the raw values or z-scores `(x − mean) / std`,
//! depending on the [`Normalization`] chosen at construction.

use crate::error::{GmmError, GmmResult};
use scirs2_core::ndarray_ext::{Array1, Array2, ArrayView2};

/// How sample values are presented to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    /// Per-column z-scores `(x − mean) / std`
    #[default]
    ZScore,
    /// Values exactly as supplied
    Raw,
}

/// Read-only sample matrix plus per-column statistics
#[derive(Debug, Clone)]
pub struct Data<'a> {
    values: ArrayView2<'a, f64>,
    mean: Array1<f64>,
    std_dev: Array1<f64>,
    normalization: Normalization,
}

impl<'a> Data<'a> {
    /// Wrap `values` as a `rows × cols` matrix
    ///
    /// # Errors
    ///
    /// Returns [`GmmError::InvalidConfig`] if `values.len() != rows * cols`.
    ///
    /// # Examples
    ///
    /// ```
    /// use clusterrows_gmm::{Data, Normalization};
    ///
    /// let values = [1.0, 10.0, 2.0, 20.0, 3.0, 30.0];
    /// let data = Data::new(&values, 3, 2, Normalization::ZScore)?;
    ///
    /// assert_eq!(data.mean(1), 20.0);
    /// assert_eq!(data.std_dev(1), 10.0);
    /// assert_eq!(data.value(2, 1), 1.0);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn new(
        values: &'a [f64],
        rows: usize,
        cols: usize,
        normalization: Normalization,
    ) -> GmmResult<Self> {
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            GmmError::InvalidConfig(format!("{} x {} overflows", rows, cols))
        })?;
        if values.len() != expected {
            return Err(GmmError::InvalidConfig(format!(
                "data buffer has {} values, expected {} x {} = {}",
                values.len(),
                rows,
                cols,
                expected
            )));
        }
        let values = ArrayView2::from_shape((rows, cols), values)
            .map_err(|e| GmmError::InvalidConfig(e.to_string()))?;

        let (mean, std_dev) = column_statistics(&values);

        Ok(Self {
            values,
            mean,
            std_dev,
            normalization,
        })
    }

    /// Number of samples
    pub fn rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of dimensions
    pub fn cols(&self) -> usize {
        self.values.ncols()
    }

    /// Normalization applied by the accessors
    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Column mean
    pub fn mean(&self, dim: usize) -> f64 {
        self.mean[dim]
    }

    /// Column sample standard deviation (`m − 1` denominator)
    pub fn std_dev(&self, dim: usize) -> f64 {
        self.std_dev[dim]
    }

    /// Unmodified value
    ///
    /// # Panics
    ///
    /// Panics if `sample` or `dim` is out of range.
    pub fn raw(&self, sample: usize, dim: usize) -> f64 {
        self.values[[sample, dim]]
    }

    /// Value as seen by the model
    ///
    /// # Panics
    ///
    /// Panics if `sample` or `dim` is out of range.
    pub fn value(&self, sample: usize, dim: usize) -> f64 {
        self.normalize(dim, self.values[[sample, dim]])
    }

    /// One sample as seen by the model
    ///
    /// # Panics
    ///
    /// Panics if `sample` is out of range.
    pub fn sample(&self, sample: usize) -> Array1<f64> {
        let row = self.values.row(sample);
        Array1::from_iter(row.iter().enumerate().map(|(dim, &x)| self.normalize(dim, x)))
    }

    /// Every sample as seen by the model, `rows × cols`
    pub fn to_array(&self) -> Array2<f64> {
        let mut out = self.values.to_owned();
        if self.normalization == Normalization::ZScore {
            for (dim, mut col) in out.columns_mut().into_iter().enumerate() {
                let (mean, scale) = (self.mean[dim], self.scale(dim));
                col.mapv_inplace(|x| (x - mean) / scale);
            }
        }
        out
    }

    /// Normalize an external raw sample in place
    ///
    /// Entries beyond [`Data::cols`] are left untouched.
    pub fn transform(&self, raw: &mut [f64]) {
        for (dim, x) in raw.iter_mut().enumerate().take(self.cols()) {
            *x = self.normalize(dim, *x);
        }
    }

    fn normalize(&self, dim: usize, x: f64) -> f64 {
        match self.normalization {
            Normalization::ZScore => (x - self.mean[dim]) / self.scale(dim),
            Normalization::Raw => x,
        }
    }

    /// Divisor for z-scores; constant columns only get centered.
    fn scale(&self, dim: usize) -> f64 {
        let s = self.std_dev[dim];
        if s > 0.0 && s.is_finite() {
            s
        } else {
            1.0
        }
    }
}

fn column_statistics(values: &ArrayView2<'_, f64>) -> (Array1<f64>, Array1<f64>) {
    let (rows, cols) = values.dim();
    let mut mean = Array1::zeros(cols);
    let mut std_dev = Array1::zeros(cols);

    for dim in 0..cols {
        let mut m = 0.0;
        let mut m2 = 0.0;
        for (k, &x) in values.column(dim).iter().enumerate() {
            let old = m;
            m += (x - m) / (k + 1) as f64;
            m2 += (x - m) * (x - old);
        }
        mean[dim] = m;
        std_dev[dim] = if rows > 1 {
            (m2 / (rows - 1) as f64).sqrt()
        } else {
            0.0
        };
    }

    (mean, std_dev)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_stats(values: &[f64], rows: usize, cols: usize, dim: usize) -> (f64, f64) {
        let col: Vec<f64> = (0..rows).map(|r| values[r * cols + dim]).collect();
        let mean = col.iter().sum::<f64>() / rows as f64;
        let var = col.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (rows - 1) as f64;
        (mean, var.sqrt())
    }

    #[test]
    fn test_statistics_match_two_pass() {
        let values: Vec<f64> = (0..60)
            .map(|i| ((i * 37) % 17) as f64 * 0.5 + 1e6)
            .collect();
        let data = Data::new(&values, 20, 3, Normalization::ZScore).unwrap();

        for dim in 0..3 {
            let (mean, std) = naive_stats(&values, 20, 3, dim);
            assert!((data.mean(dim) - mean).abs() < 1e-6);
            assert!((data.std_dev(dim) - std).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zscore_accessors() {
        let values = [1.0, 10.0, 2.0, 20.0, 3.0, 30.0];
        let data = Data::new(&values, 3, 2, Normalization::ZScore).unwrap();

        assert_eq!(data.value(0, 0), -1.0);
        assert_eq!(data.value(1, 0), 0.0);
        assert_eq!(data.value(2, 1), 1.0);
        assert_eq!(data.raw(2, 1), 30.0);
        assert_eq!(data.sample(0).to_vec(), vec![-1.0, -1.0]);

        let all = data.to_array();
        assert_eq!(all.dim(), (3, 2));
        assert_eq!(all[[2, 0]], 1.0);
    }

    #[test]
    fn test_raw_mode_passes_values_through() {
        let values = [1.0, 10.0, 2.0, 20.0, 3.0, 30.0];
        let data = Data::new(&values, 3, 2, Normalization::Raw).unwrap();

        assert_eq!(data.normalization(), Normalization::Raw);
        assert_eq!(data.value(2, 1), 30.0);
        assert_eq!(data.sample(1).to_vec(), vec![2.0, 20.0]);
        assert_eq!(data.to_array()[[0, 1]], 10.0);
        // Statistics are still available
        assert_eq!(data.mean(0), 2.0);
    }

    #[test]
    fn test_constant_column_is_centered_only() {
        let values = [5.0, 1.0, 5.0, 2.0, 5.0, 3.0];
        let data = Data::new(&values, 3, 2, Normalization::ZScore).unwrap();

        assert_eq!(data.std_dev(0), 0.0);
        for sample in 0..3 {
            assert_eq!(data.value(sample, 0), 0.0);
        }
    }

    #[test]
    fn test_transform_external_sample() {
        let values = [1.0, 10.0, 2.0, 20.0, 3.0, 30.0];
        let data = Data::new(&values, 3, 2, Normalization::ZScore).unwrap();

        let mut raw = [3.0, 10.0, 99.0];
        data.transform(&mut raw);
        assert_eq!(raw, [1.0, -1.0, 99.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let values = [1.0, 2.0, 3.0];
        assert!(matches!(
            Data::new(&values, 2, 2, Normalization::ZScore),
            Err(GmmError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_single_row() {
        let values = [4.0, 2.0];
        let data = Data::new(&values, 1, 2, Normalization::ZScore).unwrap();
        assert_eq!(data.std_dev(0), 0.0);
        assert_eq!(data.value(0, 1), 0.0);
    }
}
