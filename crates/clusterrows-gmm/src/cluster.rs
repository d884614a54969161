//! A single Gaussian component of the mixture
//!
//! Each [`Cluster`] holds its mixing weight `φ`, mean `μ` and covariance
//! `Σ`. Whenever the parameters change the component refreshes a cached
//! precision matrix `Σ⁻¹` and log normalizing constant, so density
//! evaluation during the E-step costs one quadratic form per sample:
//!
//! ```text
//! log N(x | μ, Σ) = −½·n·log 2π − ½·log|Σ| − ½·(x − μ)ᵗ Σ⁻¹ (x − μ)
//! ```
//!
//! For a diagonal covariance the same expression reduces to a sum of
//! independent one-dimensional terms and no matrix is inverted.

use crate::covariance::{Covariance, CovarianceMode, COVARIANCE_RIDGE, MIN_VARIANCE};
use crate::data::Data;
use crate::error::{GmmError, GmmResult};
use clusterrows_linalg::{Matrix, Svd};
use scirs2_core::ndarray_ext::{Array1, ArrayView1, ArrayView2};
use std::f64::consts::TAU;

/// Total responsibility below which a component is considered empty
pub const MIN_RESPONSIBILITY: f64 = 1e-10;

/// One mixture component
#[derive(Debug, Clone)]
pub struct Cluster {
    id: usize,
    num_clusters: usize,
    phi: f64,
    mu: Array1<f64>,
    covariance: Covariance,
    /// `Σ⁻¹`, present for full covariances once refreshed
    precision: Option<Matrix>,
    /// `−½·n·log 2π − ½·log|Σ|`
    log_norm: f64,
}

impl Cluster {
    /// Component `id` of a `num_clusters` mixture over `dims` dimensions
    ///
    /// Starts with `φ = 1/num_clusters`, a zero mean and the initial
    /// covariance for `mode`.
    pub fn new(
        id: usize,
        num_clusters: usize,
        dims: usize,
        mode: CovarianceMode,
    ) -> GmmResult<Self> {
        if num_clusters == 0 {
            return Err(GmmError::InvalidConfig(
                "a mixture needs at least one component".to_string(),
            ));
        }
        let mut cluster = Self {
            id,
            num_clusters,
            phi: 1.0 / num_clusters as f64,
            mu: Array1::zeros(dims),
            covariance: Covariance::initial(mode, dims),
            precision: None,
            log_norm: f64::NAN,
        };
        cluster.refresh()?;
        Ok(cluster)
    }

    /// Reset to the starting parameters, centered on sample `sample_index`
    pub fn init(&mut self, data: &Data<'_>, sample_index: usize) -> GmmResult<()> {
        if sample_index >= data.rows() {
            return Err(GmmError::InvalidConfig(format!(
                "sample index {} out of range for {} rows",
                sample_index,
                data.rows()
            )));
        }
        if data.cols() != self.dims() {
            return Err(GmmError::InvalidConfig(format!(
                "cluster has {} dimensions, data has {}",
                self.dims(),
                data.cols()
            )));
        }
        self.phi = 1.0 / self.num_clusters as f64;
        self.mu = data.sample(sample_index);
        self.covariance = Covariance::initial(self.covariance.mode(), self.dims());
        self.refresh()
    }

    /// Zero the mean and covariance ahead of re-estimation
    pub fn clear_mu_sigma(&mut self) {
        self.mu.fill(0.0);
        self.covariance.clear();
        self.precision = None;
        self.log_norm = f64::NAN;
    }

    /// Re-estimate `φ`, `μ` and `Σ` from the responsibilities this component
    /// holds for each sample (one entry per row of `samples`)
    ///
    /// # Errors
    ///
    /// - [`GmmError::DegenerateCluster`] if the responsibilities sum to less
    ///   than [`MIN_RESPONSIBILITY`]
    /// - [`GmmError::NumericalBreakdown`] if the new parameters are not finite
    /// - [`GmmError::Linalg`] if the full covariance cannot be inverted
    pub fn reestimate(
        &mut self,
        samples: &ArrayView2<'_, f64>,
        responsibilities: ArrayView1<'_, f64>,
    ) -> GmmResult<()> {
        let (m, n) = samples.dim();
        if responsibilities.len() != m || n != self.dims() {
            return Err(GmmError::InvalidConfig(format!(
                "re-estimation expects {} responsibilities over {} dimensions, got {} over {}",
                m,
                self.dims(),
                responsibilities.len(),
                n
            )));
        }

        self.clear_mu_sigma();

        let total: f64 = responsibilities.sum();
        if total.is_nan() || total < MIN_RESPONSIBILITY {
            return Err(GmmError::DegenerateCluster { cluster: self.id });
        }
        self.phi = total / m as f64;

        for (x, &r) in samples.rows().into_iter().zip(responsibilities.iter()) {
            self.mu.scaled_add(r, &x);
        }
        self.mu.mapv_inplace(|v| v / total);
        if self.mu.iter().any(|v| !v.is_finite()) {
            return Err(GmmError::NumericalBreakdown(format!(
                "cluster {} mean is not finite",
                self.id
            )));
        }

        match &mut self.covariance {
            Covariance::Full(sigma) => {
                // Σ = ZᵗZ / total with rows zⱼ = √rⱼ·(xⱼ − μ)
                let mut z = samples.to_owned();
                for (mut row, &r) in z.rows_mut().into_iter().zip(responsibilities.iter()) {
                    row -= &self.mu;
                    row *= r.max(0.0).sqrt();
                }
                let z = Matrix::from_array(z);
                let mut s = z.transpose_dot(&z)?.into_array();
                s.mapv_inplace(|v| v / total);
                for i in 0..n {
                    s[[i, i]] += COVARIANCE_RIDGE;
                }
                *sigma = Matrix::from_array(s);
            }
            Covariance::Diagonal(std_dev) => {
                for (dim, sd) in std_dev.iter_mut().enumerate() {
                    let mean = self.mu[dim];
                    let var = samples
                        .column(dim)
                        .iter()
                        .zip(responsibilities.iter())
                        .map(|(&x, &r)| r * (x - mean) * (x - mean))
                        .sum::<f64>()
                        / total;
                    *sd = var.max(MIN_VARIANCE).sqrt();
                }
            }
        }

        self.refresh()
    }

    /// Recompute the cached precision and log normalizer from `Σ`
    fn refresh(&mut self) -> GmmResult<()> {
        let n = self.dims() as f64;
        let log_det = match &self.covariance {
            Covariance::Full(sigma) => {
                let svd = Svd::new(sigma)?;
                let precision = svd.inverse()?;
                let log_det: f64 = svd.s().as_array().iter().map(|s| s.ln()).sum();
                self.precision = Some(precision);
                log_det
            }
            Covariance::Diagonal(std_dev) => {
                self.precision = None;
                if std_dev.iter().any(|&s| !(s > 0.0 && s.is_finite())) {
                    return Err(GmmError::NumericalBreakdown(format!(
                        "cluster {} has a non-positive standard deviation",
                        self.id
                    )));
                }
                2.0 * std_dev.iter().map(|s| s.ln()).sum::<f64>()
            }
        };

        let log_norm = -0.5 * n * TAU.ln() - 0.5 * log_det;
        if !log_norm.is_finite() {
            return Err(GmmError::NumericalBreakdown(format!(
                "cluster {} normalizing constant is not finite",
                self.id
            )));
        }
        self.log_norm = log_norm;
        Ok(())
    }

    /// `log N(x | μ, Σ)`
    ///
    /// `x` must have [`Cluster::dims`] entries.
    pub fn log_density(&self, x: ArrayView1<'_, f64>) -> f64 {
        let d = &x - &self.mu;
        let quad = match (&self.covariance, &self.precision) {
            (Covariance::Full(_), Some(precision)) => d.dot(&precision.as_array().dot(&d)),
            (Covariance::Full(_), None) => return f64::NAN,
            (Covariance::Diagonal(std_dev), _) => d
                .iter()
                .zip(std_dev.iter())
                .map(|(v, s)| (v / s) * (v / s))
                .sum(),
        };
        self.log_norm - 0.5 * quad.max(0.0)
    }

    /// `N(x | μ, Σ)`, reported as `0.0` when the exponent underflows
    pub fn density(&self, x: ArrayView1<'_, f64>) -> f64 {
        let p = self.log_density(x).exp();
        if p.is_nan() {
            0.0
        } else {
            p
        }
    }

    /// `log(φ·N(x | μ, Σ))`
    pub fn log_sample_probability(&self, x: ArrayView1<'_, f64>) -> f64 {
        self.phi.ln() + self.log_density(x)
    }

    /// Unnormalized responsibility `φ·N(x | μ, Σ)`
    pub fn sample_probability(&self, x: ArrayView1<'_, f64>) -> f64 {
        self.phi * self.density(x)
    }

    /// Index of this component in its mixture
    pub fn id(&self) -> usize {
        self.id
    }

    /// Number of dimensions
    pub fn dims(&self) -> usize {
        self.mu.len()
    }

    /// Mixing weight
    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Mean
    pub fn mu(&self) -> &Array1<f64> {
        &self.mu
    }

    /// Covariance
    pub fn covariance(&self) -> &Covariance {
        &self.covariance
    }
}
