//! Binary classifiers over the delta feature matrix.
//!
//! Any type implementing [`BinaryClassifier`] can be evaluated. Two
//! implementations ship with the crate, both with class-imbalance weighting:
//!
//! - [`WeightedLogistic`]: L2-penalised logistic regression fitted by Newton
//!   iterations (IRLS) with per-sample weights.
//! - [`WeightedNeighbours`]: k-nearest neighbours with class-weighted votes.
//!
//! Both standardise columns internally. The deltas arrive in mixed physical
//! units (daltons next to charge steps) and the raw values are what the
//! dataset stores; scaling is purely a fitting concern.

use crate::labels::Label;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use ndarray_linalg::SolveC;
use ndarray_linalg::error::LinalgError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("The classifier must be fitted before it can predict.")]
    NotFitted,
    #[error("Cannot fit a classifier on an empty training set.")]
    EmptyTrainingSet,
    #[error("Feature matrix has {features} rows but {labels} labels were supplied.")]
    LengthMismatch { features: usize, labels: usize },
    #[error("Expected {expected} feature values per variant, found {found}.")]
    WidthMismatch { expected: usize, found: usize },
    #[error("A linear system solve failed. The penalized Hessian may be singular. Error: {0}")]
    LinearSystemSolveFailed(#[from] LinalgError),
    #[error("Model fitting produced non-finite coefficients.")]
    NonFinite,
}

/// How training samples are weighted by class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ClassWeight {
    /// Class `c` gets weight `n / (2 * n_c)`, so each class contributes equally.
    #[default]
    Balanced,
    /// Every sample has weight 1.
    Uniform,
}

impl ClassWeight {
    /// Per-class weights indexed by [`Label::index`]. An absent class gets 0.
    pub fn per_class(self, labels: &[Label]) -> [f64; 2] {
        match self {
            ClassWeight::Uniform => [1.0, 1.0],
            ClassWeight::Balanced => {
                let mut counts = [0usize; 2];
                for label in labels {
                    counts[label.index()] += 1;
                }
                let n = labels.len() as f64;
                counts.map(|count| {
                    if count == 0 {
                        0.0
                    } else {
                        n / (2.0 * count as f64)
                    }
                })
            }
        }
    }
}

/// The contract every classifier satisfies: `fit(X, y)` then `predict(x)`.
pub trait BinaryClassifier: Send {
    fn fit(&mut self, features: ArrayView2<f64>, labels: &[Label]) -> Result<(), ModelError>;

    fn predict(&self, row: ArrayView1<f64>) -> Result<Label, ModelError>;

    /// Estimated probability of the pathogenic class, if the model has one.
    fn pathogenic_score(&self, row: ArrayView1<f64>) -> Option<f64>;

    fn predict_all(&self, features: ArrayView2<f64>) -> Result<Vec<Label>, ModelError> {
        features
            .axis_iter(Axis(0))
            .map(|row| self.predict(row))
            .collect()
    }
}

fn check_training_shape(features: &ArrayView2<f64>, labels: &[Label]) -> Result<(), ModelError> {
    if features.nrows() != labels.len() {
        return Err(ModelError::LengthMismatch {
            features: features.nrows(),
            labels: labels.len(),
        });
    }
    if labels.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }
    Ok(())
}

/// If every label is identical, returns it.
fn sole_label(labels: &[Label]) -> Option<Label> {
    let first = *labels.first()?;
    labels.iter().all(|&l| l == first).then_some(first)
}

/// Column centring and scaling learned from a training matrix.
#[derive(Debug, Clone)]
struct Standardizer {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl Standardizer {
    fn fit(features: &ArrayView2<f64>) -> Self {
        let n = features.nrows() as f64;
        let mean = features.sum_axis(Axis(0)) / n;
        let scale = features
            .axis_iter(Axis(1))
            .zip(mean.iter())
            .map(|(column, &mu)| {
                let variance = column.iter().map(|&v| (v - mu).powi(2)).sum::<f64>() / n;
                let sd = variance.sqrt();
                // Constant columns pass through centred but unscaled.
                if sd > 1e-12 { sd } else { 1.0 }
            })
            .collect();
        Self { mean, scale }
    }

    fn width(&self) -> usize {
        self.mean.len()
    }

    fn check_width(&self, found: usize) -> Result<(), ModelError> {
        if found != self.width() {
            return Err(ModelError::WidthMismatch {
                expected: self.width(),
                found,
            });
        }
        Ok(())
    }

    fn transform_row(&self, row: ArrayView1<f64>) -> Array1<f64> {
        (&row - &self.mean) / &self.scale
    }

    fn transform(&self, features: &ArrayView2<f64>) -> Array2<f64> {
        (features - &self.mean) / &self.scale
    }
}

fn sigmoid(eta: f64) -> f64 {
    if eta >= 0.0 {
        1.0 / (1.0 + (-eta).exp())
    } else {
        let e = eta.exp();
        e / (1.0 + e)
    }
}

#[derive(Debug, Clone)]
enum LogisticFit {
    Constant(Label),
    Linear {
        scaler: Standardizer,
        /// Intercept first, then one coefficient per standardised column.
        coefficients: Array1<f64>,
    },
}

/// L2-penalised, class-weighted logistic regression.
#[derive(Debug, Clone)]
pub struct WeightedLogistic {
    class_weight: ClassWeight,
    ridge: f64,
    max_iterations: usize,
    tolerance: f64,
    fitted: Option<LogisticFit>,
}

impl WeightedLogistic {
    pub fn new(
        class_weight: ClassWeight,
        ridge: f64,
        max_iterations: usize,
        tolerance: f64,
    ) -> Self {
        Self {
            class_weight,
            ridge,
            max_iterations,
            tolerance,
            fitted: None,
        }
    }

    fn newton_fit(
        &self,
        design: &Array2<f64>,
        y: &Array1<f64>,
        weights: &Array1<f64>,
    ) -> Result<Array1<f64>, ModelError> {
        let p = design.ncols();
        let mut beta = Array1::<f64>::zeros(p);
        let mut converged = false;

        for iteration in 0..self.max_iterations {
            let mu = design.dot(&beta).mapv(sigmoid);
            let working = weights * &mu.mapv(|m| m * (1.0 - m));

            let mut gradient = design.t().dot(&(weights * &(y - &mu)));
            let mut hessian = design.t().dot(&(design * &working.view().insert_axis(Axis(1))));
            for j in 1..p {
                gradient[j] -= self.ridge * beta[j];
                hessian[[j, j]] += self.ridge;
            }
            // Keeps the intercept row solvable when fitted probabilities saturate.
            hessian[[0, 0]] += 1e-10;

            // Separable folds drive the fitted probabilities to 0 or 1; once the
            // system degenerates the last finite iterate already separates them.
            let step = match hessian.solvec(&gradient) {
                Ok(step) => step,
                Err(err) if iteration > 0 => {
                    log::warn!("Stopping IRLS at iteration {iteration}: {err}");
                    break;
                }
                Err(err) => return Err(err.into()),
            };
            let candidate = &beta + &step;
            if !candidate.iter().all(|b| b.is_finite()) {
                if iteration == 0 {
                    return Err(ModelError::NonFinite);
                }
                log::warn!("Stopping IRLS at iteration {iteration}: step left the finite range");
                break;
            }
            beta = candidate;

            let max_step = step.iter().fold(0.0_f64, |acc, s| acc.max(s.abs()));
            log::trace!("IRLS iteration {iteration}: max step {max_step:.3e}");
            if max_step < self.tolerance {
                converged = true;
                break;
            }
        }

        if !converged {
            log::warn!(
                "Logistic fit did not converge within {} iterations",
                self.max_iterations
            );
        }
        Ok(beta)
    }
}

impl BinaryClassifier for WeightedLogistic {
    fn fit(&mut self, features: ArrayView2<f64>, labels: &[Label]) -> Result<(), ModelError> {
        check_training_shape(&features, labels)?;
        if let Some(label) = sole_label(labels) {
            log::debug!("Training set holds only {label} records; fitting a constant model");
            self.fitted = Some(LogisticFit::Constant(label));
            return Ok(());
        }

        let scaler = Standardizer::fit(&features);
        let standardized = scaler.transform(&features);
        let n = standardized.nrows();
        let mut design = Array2::<f64>::ones((n, standardized.ncols() + 1));
        design.slice_mut(ndarray::s![.., 1..]).assign(&standardized);

        let class_weights = self.class_weight.per_class(labels);
        let weights: Array1<f64> = labels.iter().map(|l| class_weights[l.index()]).collect();
        let y: Array1<f64> = labels.iter().map(|l| f64::from(l.class())).collect();

        let coefficients = self.newton_fit(&design, &y, &weights)?;
        self.fitted = Some(LogisticFit::Linear {
            scaler,
            coefficients,
        });
        Ok(())
    }

    fn predict(&self, row: ArrayView1<f64>) -> Result<Label, ModelError> {
        match self.fitted.as_ref().ok_or(ModelError::NotFitted)? {
            LogisticFit::Constant(label) => Ok(*label),
            LogisticFit::Linear { scaler, .. } => {
                scaler.check_width(row.len())?;
                let score = self.pathogenic_score(row).ok_or(ModelError::NotFitted)?;
                Ok(if score >= 0.5 {
                    Label::Pathogenic
                } else {
                    Label::Benign
                })
            }
        }
    }

    fn pathogenic_score(&self, row: ArrayView1<f64>) -> Option<f64> {
        match self.fitted.as_ref()? {
            LogisticFit::Constant(label) => Some(f64::from(label.class())),
            LogisticFit::Linear {
                scaler,
                coefficients,
            } => {
                if row.len() != scaler.width() {
                    return None;
                }
                let z = scaler.transform_row(row);
                let eta = coefficients[0] + coefficients.slice(ndarray::s![1..]).dot(&z);
                Some(sigmoid(eta))
            }
        }
    }
}

#[derive(Debug, Clone)]
struct NeighbourFit {
    scaler: Standardizer,
    points: Array2<f64>,
    labels: Vec<Label>,
    class_weights: [f64; 2],
}

/// k-nearest neighbours with class-weighted votes on standardised columns.
#[derive(Debug, Clone)]
pub struct WeightedNeighbours {
    class_weight: ClassWeight,
    k: usize,
    fitted: Option<NeighbourFit>,
}

impl WeightedNeighbours {
    pub fn new(class_weight: ClassWeight, k: usize) -> Self {
        Self {
            class_weight,
            k: k.max(1),
            fitted: None,
        }
    }

    /// Weighted votes per class for one row, plus the label of the closest point.
    fn votes(&self, row: ArrayView1<f64>) -> Result<([f64; 2], Label), ModelError> {
        let fit = self.fitted.as_ref().ok_or(ModelError::NotFitted)?;
        fit.scaler.check_width(row.len())?;
        let z = fit.scaler.transform_row(row);

        let mut distances: Vec<(f64, usize)> = fit
            .points
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(idx, point)| {
                let d = (&point - &z).mapv(|v| v * v).sum();
                (d, idx)
            })
            .collect();
        // Ties resolve towards the earlier training row.
        distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut votes = [0.0; 2];
        for &(_, idx) in distances.iter().take(self.k) {
            let label = fit.labels[idx];
            votes[label.index()] += fit.class_weights[label.index()];
        }
        Ok((votes, fit.labels[distances[0].1]))
    }
}

impl BinaryClassifier for WeightedNeighbours {
    fn fit(&mut self, features: ArrayView2<f64>, labels: &[Label]) -> Result<(), ModelError> {
        check_training_shape(&features, labels)?;
        let scaler = Standardizer::fit(&features);
        let points = scaler.transform(&features);
        self.fitted = Some(NeighbourFit {
            scaler,
            points,
            labels: labels.to_vec(),
            class_weights: self.class_weight.per_class(labels),
        });
        Ok(())
    }

    fn predict(&self, row: ArrayView1<f64>) -> Result<Label, ModelError> {
        let (votes, nearest) = self.votes(row)?;
        let benign = votes[Label::Benign.index()];
        let pathogenic = votes[Label::Pathogenic.index()];
        Ok(if (pathogenic - benign).abs() <= 1e-12 {
            nearest
        } else if pathogenic > benign {
            Label::Pathogenic
        } else {
            Label::Benign
        })
    }

    fn pathogenic_score(&self, row: ArrayView1<f64>) -> Option<f64> {
        let (votes, _) = self.votes(row).ok()?;
        let total = votes[0] + votes[1];
        (total > 0.0).then(|| votes[Label::Pathogenic.index()] / total)
    }
}

/// Configured classifier, dispatching to one of the shipped implementations.
#[derive(Debug, Clone)]
pub enum Classifier {
    Logistic(WeightedLogistic),
    Neighbours(WeightedNeighbours),
}

impl Classifier {
    pub fn name(&self) -> &'static str {
        match self {
            Classifier::Logistic(_) => "weighted logistic regression",
            Classifier::Neighbours(_) => "weighted k-nearest neighbours",
        }
    }
}

impl BinaryClassifier for Classifier {
    fn fit(&mut self, features: ArrayView2<f64>, labels: &[Label]) -> Result<(), ModelError> {
        match self {
            Classifier::Logistic(model) => model.fit(features, labels),
            Classifier::Neighbours(model) => model.fit(features, labels),
        }
    }

    fn predict(&self, row: ArrayView1<f64>) -> Result<Label, ModelError> {
        match self {
            Classifier::Logistic(model) => model.predict(row),
            Classifier::Neighbours(model) => model.predict(row),
        }
    }

    fn pathogenic_score(&self, row: ArrayView1<f64>) -> Option<f64> {
        match self {
            Classifier::Logistic(model) => model.pathogenic_score(row),
            Classifier::Neighbours(model) => model.pathogenic_score(row),
        }
    }
}
