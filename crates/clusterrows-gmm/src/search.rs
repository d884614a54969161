//! Cluster-count selection
//!
//! [`Gmm`] trains one [`Model`] per candidate cluster count and keeps the
//! one with the lowest score. With a fixed count there is a single
//! candidate; automatic mode tries every count in
//! [`GmmConfig::auto_range`](crate::GmmConfig::auto_range).
//!
//! With the `parallel` feature candidates train concurrently. Each epoch is
//! seeded independently of scheduling, so the selected model is the same
//! either way.

use crate::config::GmmConfig;
use crate::data::Data;
use crate::error::{GmmError, GmmResult};
use crate::model::{FitSummary, Model};

/// Result of training one candidate cluster count
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateOutcome {
    /// Cluster count
    pub clusters: usize,
    /// Best score, if training produced a model
    pub score: Option<f64>,
    /// Epoch that produced the best score
    pub best_epoch: Option<usize>,
    /// E-steps performed
    pub iterations: usize,
    /// Why the candidate failed
    pub error: Option<String>,
}

/// Result of a [`Gmm::fit`]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    /// Chosen cluster count
    pub selected_clusters: usize,
    /// Score of the chosen model
    pub score: f64,
    /// Every candidate in ascending cluster-count order
    pub candidates: Vec<CandidateOutcome>,
}

impl SearchReport {
    /// `(clusters, score)` for every candidate that produced a model
    pub fn scores(&self) -> Vec<(usize, f64)> {
        self.candidates
            .iter()
            .filter_map(|c| c.score.map(|s| (c.clusters, s)))
            .collect()
    }

    /// Candidates that failed
    pub fn failures(&self) -> impl Iterator<Item = &CandidateOutcome> {
        self.candidates.iter().filter(|c| c.error.is_some())
    }
}

/// Whether this build trains candidates concurrently
pub const PARALLEL: bool = cfg!(feature = "parallel");

type Trained<'d, 'a> = GmmResult<(Model<'d, 'a>, FitSummary)>;

/// Mixture model with automatic or fixed cluster count
///
/// # Examples
///
/// ```
/// use clusterrows_gmm::{Data, Gmm, GmmConfig, Normalization};
///
/// // Two well separated groups of six samples
/// let mut values = Vec::new();
/// for i in 0..12 {
///     let center = if i < 6 { 0.0 } else { 20.0 };
///     values.push(center + (i % 3) as f64 * 0.1);
///     values.push(center - (i % 2) as f64 * 0.1);
/// }
/// let data = Data::new(&values, 12, 2, Normalization::ZScore)?;
/// let config = GmmConfig::fixed(2);
///
/// let mut gmm = Gmm::new(&data, &config)?;
/// let report = gmm.fit()?;
/// assert_eq!(report.selected_clusters, 2);
///
/// let mut labels = vec![0; 12];
/// let mut confidences = vec![0.0; 12];
/// gmm.get_labels(&mut labels, &mut confidences)?;
/// assert_ne!(labels[0], labels[11]);
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct Gmm<'d, 'a> {
    data: &'d Data<'a>,
    config: &'d GmmConfig,
    best: Option<Model<'d, 'a>>,
    report: Option<SearchReport>,
}

impl<'d, 'a> Gmm<'d, 'a> {
    /// Bind a configuration to a data set
    ///
    /// # Errors
    ///
    /// Returns [`GmmError::InvalidConfig`] if the configuration is invalid or
    /// its normalization differs from the one `data` was built with.
    pub fn new(data: &'d Data<'a>, config: &'d GmmConfig) -> GmmResult<Self> {
        config.validate()?;
        if data.normalization() != config.normalization {
            return Err(GmmError::InvalidConfig(format!(
                "data uses {:?} normalization, configuration asks for {:?}",
                data.normalization(),
                config.normalization
            )));
        }
        Ok(Self {
            data,
            config,
            best: None,
            report: None,
        })
    }

    /// Candidate cluster counts, in ascending order
    pub fn candidates(&self) -> Vec<usize> {
        self.config.candidates()
    }

    /// Train every candidate and keep the lowest scoring model
    ///
    /// Ties go to the smaller cluster count.
    ///
    /// # Errors
    ///
    /// - [`GmmError::Cancelled`] if stopped before any candidate produced a model
    /// - [`GmmError::NoUsableModel`] if every candidate failed
    pub fn fit(&mut self) -> GmmResult<SearchReport> {
        let candidates = self.candidates();
        log::debug!(
            "fitting {} x {} samples, candidates {:?}, {} covariance",
            self.data.rows(),
            self.data.cols(),
            candidates,
            self.config.covariance.name()
        );

        let results = self.train_candidates(&candidates);

        let mut outcomes = Vec::with_capacity(results.len());
        let mut best: Option<(Model<'d, 'a>, FitSummary)> = None;
        for (clusters, result) in candidates.iter().copied().zip(results) {
            match result {
                Ok((model, summary)) => {
                    self.config
                        .observer
                        .on_candidate_end(clusters, Ok(summary.score));
                    outcomes.push(CandidateOutcome {
                        clusters,
                        score: Some(summary.score),
                        best_epoch: Some(summary.best_epoch),
                        iterations: summary.iterations,
                        error: None,
                    });
                    let better = best
                        .as_ref()
                        .map_or(true, |(_, current)| summary.score < current.score);
                    if better {
                        best = Some((model, summary));
                    }
                }
                Err(e) => {
                    self.config.observer.on_candidate_end(clusters, Err(&e));
                    outcomes.push(CandidateOutcome {
                        clusters,
                        score: None,
                        best_epoch: None,
                        iterations: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let (model, summary) = match best {
            Some(found) => found,
            None if self.config.stop.should_stop() => return Err(GmmError::Cancelled),
            None => {
                return Err(GmmError::NoUsableModel {
                    attempted: candidates.len(),
                })
            }
        };

        self.config
            .observer
            .on_selected(summary.clusters, summary.score);
        let report = SearchReport {
            selected_clusters: summary.clusters,
            score: summary.score,
            candidates: outcomes,
        };
        self.best = Some(model);
        self.report = Some(report.clone());
        Ok(report)
    }

    fn train_candidate(&self, clusters: usize) -> Trained<'d, 'a> {
        let mut model = Model::new(self.data, self.config, clusters)?;
        let summary = model.fit()?;
        Ok((model, summary))
    }

    #[cfg(feature = "parallel")]
    fn train_candidates(&self, candidates: &[usize]) -> Vec<Trained<'d, 'a>> {
        use scirs2_core::parallel_ops::*;

        candidates
            .par_iter()
            .map(|&clusters| self.train_candidate(clusters))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn train_candidates(&self, candidates: &[usize]) -> Vec<Trained<'d, 'a>> {
        let mut results = Vec::with_capacity(candidates.len());
        for &clusters in candidates {
            if self.config.stop.should_stop() {
                results.push(Err(GmmError::Cancelled));
                continue;
            }
            results.push(self.train_candidate(clusters));
        }
        results
    }

    /// Labels and confidences of the selected model
    ///
    /// Both buffers must hold one entry per sample.
    pub fn get_labels(&self, labels: &mut [i32], confidences: &mut [f64]) -> GmmResult<()> {
        self.best
            .as_ref()
            .ok_or(GmmError::NotFitted)?
            .fill_labels(labels, confidences)
    }

    /// The selected model, once fitted
    pub fn best_model(&self) -> Option<&Model<'d, 'a>> {
        self.best.as_ref()
    }

    /// Report of the last successful [`Gmm::fit`]
    pub fn report(&self) -> Option<&SearchReport> {
        self.report.as_ref()
    }
}
