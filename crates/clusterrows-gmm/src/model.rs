//! EM training for a fixed number of clusters
//!
//! A [`Model`] trains a `k`-component mixture with several random restarts
//! ("epochs") and keeps the responsibilities of the best one.
//!
//! # Algorithm
//!
//! Each epoch:
//! 1. Shuffle the sample indices and center component `c` on sample `perm[c]`
//! 2. E-step: `w[c, j] = φ_c·N(x_j | μ_c, Σ_c) / Σ_c' φ_c'·N(x_j | μ_c', Σ_c')`,
//!    scored as `Σ_j −log max_c w[c, j]` (lower is better)
//! 3. If the score improved by more than the tolerance, snapshot `w` and
//!    run the M-step; otherwise the epoch has converged
//! 4. Stop after the iteration budget
//!
//! The candidate keeps the epoch with the lowest final score. Epochs that
//! fail numerically (singular covariance, empty component) are logged and
//! skipped.
//!
//! Every epoch draws from its own generator seeded by
//! `(config.seed, k, epoch)`, so results do not depend on the order in
//! which epochs or candidates run.

use crate::cluster::Cluster;
use crate::config::GmmConfig;
use crate::data::Data;
use crate::error::{GmmError, GmmResult};
use scirs2_core::ndarray_ext::{Array2, ArrayView2};
use scirs2_core::random::{Rng, SeedableRng, StdRng};

/// Working state of one EM run
#[derive(Debug, Clone)]
pub struct EmState<'v> {
    samples: ArrayView2<'v, f64>,
    clusters: Vec<Cluster>,
    /// `k × m` responsibilities
    weights: Array2<f64>,
}

impl<'v> EmState<'v> {
    /// State for `num_clusters` components over `samples` (`m × n`)
    pub fn new(
        samples: ArrayView2<'v, f64>,
        num_clusters: usize,
        config: &GmmConfig,
    ) -> GmmResult<Self> {
        let (m, n) = samples.dim();
        if num_clusters == 0 || num_clusters > m {
            return Err(GmmError::InsufficientData {
                rows: m,
                clusters: num_clusters,
            });
        }
        let clusters = (0..num_clusters)
            .map(|id| Cluster::new(id, num_clusters, n, config.covariance))
            .collect::<GmmResult<Vec<_>>>()?;

        Ok(Self {
            samples,
            clusters,
            weights: Array2::zeros((num_clusters, m)),
        })
    }

    /// Center every component on a distinct, randomly chosen sample
    pub fn initialize<R: Rng + ?Sized>(&mut self, data: &Data<'_>, rng: &mut R) -> GmmResult<()> {
        let perm = shuffled_indices(self.samples.nrows(), rng);
        for (cluster, &index) in self.clusters.iter_mut().zip(perm.iter()) {
            cluster.init(data, index)?;
        }
        Ok(())
    }

    /// Recompute responsibilities and return the score
    ///
    /// Each column of [`EmState::weights`] sums to one afterwards. A sample
    /// no component can explain gets uniform responsibilities.
    ///
    /// # Errors
    ///
    /// Returns [`GmmError::NumericalBreakdown`] if the score is not finite.
    pub fn e_step(&mut self) -> GmmResult<f64> {
        let k = self.clusters.len();
        let uniform = 1.0 / k as f64;
        let mut log_p = vec![0.0; k];
        let mut score = 0.0;

        for (j, x) in self.samples.rows().into_iter().enumerate() {
            let mut max = f64::NEG_INFINITY;
            for (c, cluster) in self.clusters.iter().enumerate() {
                let l = cluster.log_sample_probability(x);
                log_p[c] = l;
                if l > max {
                    max = l;
                }
            }

            let mut column = self.weights.column_mut(j);
            if max.is_finite() {
                // Scaling by exp(−max) keeps the largest term at 1.
                let mut total = 0.0;
                for (w, &l) in column.iter_mut().zip(log_p.iter()) {
                    let p = (l - max).exp();
                    *w = if p.is_nan() { 0.0 } else { p };
                    total += *w;
                }
                column.mapv_inplace(|w| w / total);
            } else {
                column.fill(uniform);
            }

            let best = column.iter().copied().fold(0.0, f64::max);
            score -= best.ln();
        }

        if !score.is_finite() {
            return Err(GmmError::NumericalBreakdown(format!(
                "E-step score is {}",
                score
            )));
        }
        Ok(score)
    }

    /// Re-estimate every component from the current responsibilities
    pub fn m_step(&mut self) -> GmmResult<()> {
        for (cluster, row) in self.clusters.iter_mut().zip(self.weights.rows()) {
            cluster.reestimate(&self.samples, row)?;
        }
        Ok(())
    }

    /// `k × m` responsibilities from the last E-step
    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    /// Components
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }
}

/// Fisher-Yates permutation of `0..n`
fn shuffled_indices<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.random_range(0..=i);
        indices.swap(i, j);
    }
    indices
}

/// Seed for one epoch of one candidate (splitmix64 finalizer)
fn epoch_seed(seed: u64, clusters: usize, epoch: usize) -> u64 {
    let mut z = seed
        ^ (clusters as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (epoch as u64).wrapping_mul(0xD1B5_4A32_D192_ED03);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Result of one epoch
#[derive(Debug, Clone)]
pub struct EpochOutcome {
    /// Epoch index
    pub epoch: usize,
    /// Score of the snapshotted E-step
    pub score: f64,
    /// E-steps performed
    pub iterations: usize,
    /// False if the iteration budget or a stop request ended the epoch
    pub converged: bool,
    /// Responsibilities at the snapshot, `k × m`
    pub weights: Array2<f64>,
}

/// Summary of a completed [`Model::fit`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSummary {
    /// Number of clusters
    pub clusters: usize,
    /// Best epoch score
    pub score: f64,
    /// Epoch that produced it
    pub best_epoch: usize,
    /// E-steps performed across all epochs
    pub iterations: usize,
    /// Epochs abandoned after a numerical failure
    pub failed_epochs: usize,
}

/// Mixture model with a fixed number of clusters
#[derive(Debug, Clone)]
pub struct Model<'d, 'a> {
    data: &'d Data<'a>,
    config: &'d GmmConfig,
    samples: Array2<f64>,
    num_clusters: usize,
    best: Option<EpochOutcome>,
}

impl<'d, 'a> Model<'d, 'a> {
    /// Untrained model with `num_clusters` components over `data`
    ///
    /// # Errors
    ///
    /// Returns [`GmmError::InsufficientData`] if `num_clusters` is zero or
    /// exceeds the number of rows.
    pub fn new(data: &'d Data<'a>, config: &'d GmmConfig, num_clusters: usize) -> GmmResult<Self> {
        if num_clusters == 0 || num_clusters > data.rows() {
            return Err(GmmError::InsufficientData {
                rows: data.rows(),
                clusters: num_clusters,
            });
        }
        Ok(Self {
            data,
            config,
            samples: data.to_array(),
            num_clusters,
            best: None,
        })
    }

    /// Run a single EM restart
    ///
    /// # Errors
    ///
    /// Numerical failures are returned as-is (see
    /// [`GmmError::is_recoverable`]). [`GmmError::Cancelled`] is returned if
    /// a stop request arrives before the first E-step completes.
    pub fn run_epoch(&self, epoch: usize) -> GmmResult<EpochOutcome> {
        let k = self.num_clusters;
        let mut rng = StdRng::seed_from_u64(epoch_seed(self.config.seed, k, epoch));
        let mut state = EmState::new(self.samples.view(), k, self.config)?;
        state.initialize(self.data, &mut rng)?;

        let mut best_score = f64::INFINITY;
        let mut snapshot = None;
        let mut iterations = 0;
        let mut converged = false;

        for iteration in 0..self.config.iterations {
            if self.config.stop.should_stop() {
                break;
            }
            let score = state.e_step()?;
            iterations += 1;
            self.config.observer.on_iteration(k, epoch, iteration, score);

            if best_score - score > self.config.tolerance {
                best_score = score;
                snapshot = Some(state.weights().clone());
            } else {
                converged = true;
                break;
            }
            state.m_step()?;
        }

        let weights = snapshot.ok_or(GmmError::Cancelled)?;
        Ok(EpochOutcome {
            epoch,
            score: best_score,
            iterations,
            converged,
            weights,
        })
    }

    /// Train every epoch and keep the best
    ///
    /// Ties keep the earlier epoch. A stop request ends training after the
    /// current epoch and keeps what was found.
    ///
    /// # Errors
    ///
    /// - [`GmmError::Cancelled`] if stopped before any epoch produced a model
    /// - the last numerical error if every epoch failed
    /// - any non-recoverable error immediately
    pub fn fit(&mut self) -> GmmResult<FitSummary> {
        let k = self.num_clusters;
        let config = self.config;
        let observer = &config.observer;
        observer.on_candidate_start(k);

        let mut total_iterations = 0;
        let mut failed_epochs = 0;
        let mut last_error = None;

        for epoch in 0..config.epochs {
            if config.stop.should_stop() {
                break;
            }
            match self.run_epoch(epoch) {
                Ok(outcome) => {
                    total_iterations += outcome.iterations;
                    let improved = self
                        .best
                        .as_ref()
                        .map_or(true, |best| outcome.score < best.score);
                    observer.on_epoch_end(k, epoch, outcome.score, improved);
                    if improved {
                        self.best = Some(outcome);
                    }
                }
                Err(GmmError::Cancelled) => break,
                Err(e) if e.is_recoverable() => {
                    observer.on_epoch_failed(k, epoch, &e);
                    failed_epochs += 1;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        match &self.best {
            Some(best) => Ok(FitSummary {
                clusters: k,
                score: best.score,
                best_epoch: best.epoch,
                iterations: total_iterations,
                failed_epochs,
            }),
            None => Err(last_error.unwrap_or(GmmError::Cancelled)),
        }
    }

    /// Number of clusters
    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    /// Best score, once fitted
    pub fn score(&self) -> Option<f64> {
        self.best.as_ref().map(|b| b.score)
    }

    /// Best epoch, once fitted
    pub fn best_epoch(&self) -> Option<&EpochOutcome> {
        self.best.as_ref()
    }

    /// Responsibilities of the best epoch, `k × m`
    pub fn weights(&self) -> Option<&Array2<f64>> {
        self.best.as_ref().map(|b| &b.weights)
    }

    /// Most likely cluster per sample and its normalized responsibility
    ///
    /// Ties go to the lowest cluster index.
    pub fn labels(&self) -> GmmResult<(Vec<usize>, Vec<f64>)> {
        let weights = self.weights().ok_or(GmmError::NotFitted)?;
        let m = weights.ncols();
        let mut labels = Vec::with_capacity(m);
        let mut confidences = Vec::with_capacity(m);

        for column in weights.columns() {
            let mut label = 0;
            let mut best = f64::NEG_INFINITY;
            let mut total = 0.0;
            for (c, &w) in column.iter().enumerate() {
                total += w;
                if w > best {
                    best = w;
                    label = c;
                }
            }
            labels.push(label);
            confidences.push(if total > 0.0 { best / total } else { 0.0 });
        }
        Ok((labels, confidences))
    }

    /// Write labels and confidences into caller buffers of length `rows`
    pub fn fill_labels(&self, labels: &mut [i32], confidences: &mut [f64]) -> GmmResult<()> {
        let rows = self.data.rows();
        if labels.len() != rows || confidences.len() != rows {
            return Err(GmmError::InvalidConfig(format!(
                "label buffers hold {} and {} entries, expected {}",
                labels.len(),
                confidences.len(),
                rows
            )));
        }
        let (found, conf) = self.labels()?;
        for (dst, &src) in labels.iter_mut().zip(found.iter()) {
            *dst = i32::try_from(src).map_err(|_| {
                GmmError::InvalidConfig(format!("label {} does not fit in i32", src))
            })?;
        }
        confidences.copy_from_slice(&conf);
        Ok(())
    }
}
