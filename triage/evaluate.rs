//! # Training and evaluation
//!
//! Two validation protocols are supported:
//!
//! - Stratified hold-out: a seeded, class-preserving train/test split, one fit,
//!   and a per-class report on the test partition.
//! - Leave-one-out: `N` independent fits on `N - 1` records each, every fit
//!   predicting the record it left out. With tens of records this is the
//!   protocol of record; a 30% hold-out of eleven variants is four predictions.
//!
//! Both refuse to run on a dataset with a single label. Folds of leave-one-out
//! are independent and may run on rayon workers; the accuracy is only computed
//! after every fold has returned, so results do not depend on scheduling.

use crate::config::{Protocol, RunConfig};
use crate::dataset::Dataset;
use crate::features::FeatureSet;
use crate::labels::Label;
use crate::model::{BinaryClassifier, Classifier, ModelError};
use ndarray::ArrayView1;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("The dataset is empty; no variant survived parsing and feature derivation.")]
    EmptyDataset,
    #[error(
        "The dataset only contains {present} variants. Both benign and pathogenic examples are required: re-run feature derivation with the benign augmentation step enabled."
    )]
    InsufficientClassDiversity { present: Label },
    #[error(
        "A test fraction of {test_fraction} leaves no test variants among {records} records once every class keeps a training example. Use leave-one-out for datasets this small."
    )]
    EmptyTestPartition { records: usize, test_fraction: f64 },
    #[error("Classifier failure: {0}")]
    Model(#[from] ModelError),
}

/// Refuses datasets that are empty or hold a single label.
pub fn ensure_class_diversity(dataset: &Dataset) -> Result<(), EvaluationError> {
    match dataset.class_counts().present().as_slice() {
        [] => Err(EvaluationError::EmptyDataset),
        [only] => Err(EvaluationError::InsufficientClassDiversity { present: *only }),
        _ => Ok(()),
    }
}

/// Indices into the dataset, each partition in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// How many records of each class go to the test partition.
fn test_allocation(counts: [usize; 2], test_fraction: f64) -> [usize; 2] {
    let n: usize = counts.iter().sum();
    if n < 2 {
        return [0, 0];
    }
    let n_test = ((test_fraction * n as f64).ceil() as usize).clamp(1, n - 1);

    let shares = counts.map(|count| count as f64 * n_test as f64 / n as f64);
    let mut alloc = shares.map(|share| share.floor() as usize);

    // Hand the remaining slots to the largest fractional parts; ties go to the
    // larger class, then to the lower label.
    let mut order = [0usize, 1];
    order.sort_by(|&a, &b| {
        let frac_a = shares[a] - shares[a].floor();
        let frac_b = shares[b] - shares[b].floor();
        frac_b
            .total_cmp(&frac_a)
            .then(counts[b].cmp(&counts[a]))
            .then(a.cmp(&b))
    });
    let mut remaining = n_test - alloc.iter().sum::<usize>();
    for &class in order.iter().cycle().take(2 * remaining) {
        if remaining == 0 {
            break;
        }
        if alloc[class] < counts[class] {
            alloc[class] += 1;
            remaining -= 1;
        }
    }

    // Each class keeps at least one training record.
    for class in 0..2 {
        alloc[class] = alloc[class].min(counts[class].saturating_sub(1));
    }

    // A class whose proportional share rounds to one or more is represented.
    for class in 0..2 {
        let expected = (counts[class] as f64 * test_fraction).round() as usize;
        if alloc[class] == 0 && expected >= 1 && counts[class] >= 2 {
            alloc[class] = 1;
            let other = 1 - class;
            if alloc[other] > 1 {
                alloc[other] -= 1;
            }
        }
    }
    alloc
}

/// Seeded stratified split preserving class proportions in both partitions.
pub fn stratified_split(labels: &[Label], test_fraction: f64, seed: u64) -> Split {
    let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    for (idx, label) in labels.iter().enumerate() {
        by_class[label.index()].push(idx);
    }
    let alloc = test_allocation([by_class[0].len(), by_class[1].len()], test_fraction);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::with_capacity(alloc[0] + alloc[1]);
    for (members, &take) in by_class.iter_mut().zip(alloc.iter()) {
        members.shuffle(&mut rng);
        test.extend_from_slice(&members[..take]);
        train.extend_from_slice(&members[take..]);
    }
    train.sort_unstable();
    test.sort_unstable();
    Split { train, test }
}

/// Truth (rows) against prediction (columns), indexed by [`Label::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn get(&self, truth: Label, predicted: Label) -> usize {
        self.counts[truth.index()][predicted.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub label: Label,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AveragedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
    /// One entry per label observed in either truth or prediction, ascending.
    pub per_class: Vec<ClassMetrics>,
    pub macro_avg: AveragedMetrics,
    pub weighted_avg: AveragedMetrics,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn support_weighted(per_class: &[ClassMetrics], value: impl Fn(&ClassMetrics) -> f64) -> f64 {
    let total: usize = per_class.iter().map(|m| m.support).sum();
    if total == 0 {
        return 0.0;
    }
    per_class
        .iter()
        .map(|m| value(m) * m.support as f64)
        .sum::<f64>()
        / total as f64
}

/// Accuracy and per-class precision, recall and F1.
///
/// Only labels that appear in `truth` or `predicted` are reported, so a tiny
/// test partition missing a class yields a shorter report rather than a
/// division by zero. Undefined ratios are reported as 0.
pub fn classification_metrics(truth: &[Label], predicted: &[Label]) -> ClassificationMetrics {
    debug_assert_eq!(truth.len(), predicted.len());
    let mut confusion = ConfusionMatrix::default();
    for (&t, &p) in truth.iter().zip(predicted) {
        confusion.counts[t.index()][p.index()] += 1;
    }

    let observed: BTreeSet<Label> = truth.iter().chain(predicted).copied().collect();
    let per_class: Vec<ClassMetrics> = observed
        .into_iter()
        .map(|label| {
            let true_positive = confusion.get(label, label);
            let predicted_count: usize = Label::ALL.iter().map(|&t| confusion.get(t, label)).sum();
            let support: usize = Label::ALL.iter().map(|&p| confusion.get(label, p)).sum();
            let precision = ratio(true_positive, predicted_count);
            let recall = ratio(true_positive, support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassMetrics {
                label,
                precision,
                recall,
                f1,
                support,
            }
        })
        .collect();

    let classes = per_class.len().max(1) as f64;
    let macro_avg = AveragedMetrics {
        precision: per_class.iter().map(|m| m.precision).sum::<f64>() / classes,
        recall: per_class.iter().map(|m| m.recall).sum::<f64>() / classes,
        f1: per_class.iter().map(|m| m.f1).sum::<f64>() / classes,
    };
    let weighted_avg = AveragedMetrics {
        precision: support_weighted(&per_class, |m| m.precision),
        recall: support_weighted(&per_class, |m| m.recall),
        f1: support_weighted(&per_class, |m| m.f1),
    };

    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    ClassificationMetrics {
        accuracy: ratio(correct, truth.len()),
        confusion,
        per_class,
        macro_avg,
        weighted_avg,
    }
}

#[derive(Debug, Clone)]
pub struct HoldoutOutcome {
    pub split: Split,
    pub truth: Vec<Label>,
    pub predictions: Vec<Label>,
    pub metrics: ClassificationMetrics,
}

/// Fits on the stratified training partition and scores the test partition.
pub fn holdout<C, F>(
    dataset: &Dataset,
    make_classifier: F,
    test_fraction: f64,
    seed: u64,
) -> Result<HoldoutOutcome, EvaluationError>
where
    C: BinaryClassifier,
    F: Fn() -> C,
{
    ensure_class_diversity(dataset)?;
    let split = stratified_split(&dataset.labels(), test_fraction, seed);
    log::info!(
        "Stratified hold-out: {} training / {} test variants (seed {seed})",
        split.train.len(),
        split.test.len()
    );
    if split.test.is_empty() {
        return Err(EvaluationError::EmptyTestPartition {
            records: dataset.len(),
            test_fraction,
        });
    }

    let (train_x, train_y) = dataset.select(&split.train);
    let (test_x, truth) = dataset.select(&split.test);

    let mut model = make_classifier();
    model.fit(train_x.view(), &train_y)?;
    let predictions = model.predict_all(test_x.view())?;
    let metrics = classification_metrics(&truth, &predictions);

    Ok(HoldoutOutcome {
        split,
        truth,
        predictions,
        metrics,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaveOneOutOutcome {
    /// Prediction for each record from the fit that excluded it, in dataset order.
    pub predictions: Vec<Label>,
    pub correct: usize,
    pub accuracy: f64,
}

impl LeaveOneOutOutcome {
    pub fn folds(&self) -> usize {
        self.predictions.len()
    }
}

/// One fresh classifier per record, each trained on every other record.
pub fn leave_one_out<C, F>(
    dataset: &Dataset,
    make_classifier: F,
    parallel: bool,
) -> Result<LeaveOneOutOutcome, EvaluationError>
where
    C: BinaryClassifier,
    F: Fn() -> C + Sync,
{
    ensure_class_diversity(dataset)?;
    let n = dataset.len();
    log::info!(
        "Leave-one-out cross-validation over {n} variants ({})",
        if parallel { "parallel folds" } else { "sequential folds" }
    );

    let fold = |held_out: usize| -> Result<Label, ModelError> {
        let train: Vec<usize> = (0..n).filter(|&idx| idx != held_out).collect();
        let (train_x, train_y) = dataset.select(&train);
        let mut model = make_classifier();
        model.fit(train_x.view(), &train_y)?;
        let row = &dataset.rows()[held_out];
        let predicted = model.predict(ArrayView1::from(row.features.as_slice()))?;
        log::debug!(
            "Fold {held_out}: {} {} is {}, predicted {predicted}",
            row.gene,
            row.mutation,
            row.label
        );
        Ok(predicted)
    };

    let predictions: Vec<Label> = if parallel {
        (0..n).into_par_iter().map(fold).collect::<Result<_, _>>()?
    } else {
        (0..n).map(fold).collect::<Result<_, _>>()?
    };

    let correct = predictions
        .iter()
        .zip(dataset.rows())
        .filter(|(predicted, row)| **predicted == row.label)
        .count();
    Ok(LeaveOneOutOutcome {
        accuracy: correct as f64 / n as f64,
        correct,
        predictions,
    })
}

/// Result of whichever protocol the configuration selected.
#[derive(Debug, Clone)]
pub enum EvaluationOutcome {
    Holdout(HoldoutOutcome),
    LeaveOneOut(LeaveOneOutOutcome),
}

/// A live prediction for one variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: Label,
    pub pathogenic_score: Option<f64>,
}

/// A classifier fitted on the whole dataset, for inference only.
#[derive(Debug, Clone)]
pub struct TrainedClassifier {
    classifier: Classifier,
    feature_set: FeatureSet,
}

impl TrainedClassifier {
    pub fn feature_set(&self) -> FeatureSet {
        self.feature_set
    }

    pub fn name(&self) -> &'static str {
        self.classifier.name()
    }

    pub fn predict_one(&self, features: &[f64]) -> Result<Prediction, ModelError> {
        if features.len() != self.feature_set.width() {
            return Err(ModelError::WidthMismatch {
                expected: self.feature_set.width(),
                found: features.len(),
            });
        }
        let row = ArrayView1::from(features);
        Ok(Prediction {
            label: self.classifier.predict(row)?,
            pathogenic_score: self.classifier.pathogenic_score(row),
        })
    }
}

/// Runs the configured protocol and fits the inference model.
pub struct Trainer<'a> {
    dataset: &'a Dataset,
    config: &'a RunConfig,
}

impl<'a> Trainer<'a> {
    /// Fails unless the dataset holds both labels.
    pub fn new(dataset: &'a Dataset, config: &'a RunConfig) -> Result<Self, EvaluationError> {
        ensure_class_diversity(dataset)?;
        Ok(Self { dataset, config })
    }

    pub fn evaluate(&self) -> Result<EvaluationOutcome, EvaluationError> {
        let make = || self.config.classifier.build();
        match self.config.protocol {
            Protocol::Holdout => holdout(
                self.dataset,
                make,
                self.config.test_fraction,
                self.config.seed,
            )
            .map(EvaluationOutcome::Holdout),
            Protocol::LeaveOneOut => {
                leave_one_out(self.dataset, make, self.config.parallel_folds)
                    .map(EvaluationOutcome::LeaveOneOut)
            }
        }
    }

    /// Fits on every record; nothing is held out.
    pub fn fit_full(&self) -> Result<TrainedClassifier, EvaluationError> {
        let mut classifier = self.config.classifier.build();
        let features = self.dataset.feature_matrix();
        classifier.fit(features.view(), &self.dataset.labels())?;
        log::info!(
            "Fitted {} on all {} variants",
            classifier.name(),
            self.dataset.len()
        );
        Ok(TrainedClassifier {
            classifier,
            feature_set: self.dataset.feature_set(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DropCounts, LabeledVariant};
    use approx::assert_abs_diff_eq;
    use ndarray::ArrayView2;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn labels(benign: usize, pathogenic: usize) -> Vec<Label> {
        let mut out = vec![Label::Benign; benign];
        out.extend(vec![Label::Pathogenic; pathogenic]);
        out
    }

    fn dataset_from(points: &[(f64, Label)]) -> Dataset {
        let rows = points
            .iter()
            .enumerate()
            .map(|(idx, &(value, label))| LabeledVariant {
                gene: "G".into(),
                mutation: format!("A{}T", idx + 1),
                features: vec![value, -value],
                label,
            })
            .collect();
        Dataset::from_rows(FeatureSet::Basic, rows, DropCounts::default())
    }

    /// Predicts the training majority; counts its fits and predictions.
    struct Majority {
        fits: Arc<AtomicUsize>,
        predictions: Arc<AtomicUsize>,
        answer: Option<Label>,
    }

    impl BinaryClassifier for Majority {
        fn fit(&mut self, features: ArrayView2<f64>, labels: &[Label]) -> Result<(), ModelError> {
            assert_eq!(features.nrows(), labels.len());
            self.fits.fetch_add(1, Ordering::SeqCst);
            let pathogenic = labels.iter().filter(|&&l| l == Label::Pathogenic).count();
            self.answer = Some(if 2 * pathogenic > labels.len() {
                Label::Pathogenic
            } else {
                Label::Benign
            });
            Ok(())
        }

        fn predict(&self, row: ArrayView1<f64>) -> Result<Label, ModelError> {
            assert!(!row.is_empty());
            self.predictions.fetch_add(1, Ordering::SeqCst);
            self.answer.ok_or(ModelError::NotFitted)
        }

        fn pathogenic_score(&self, row: ArrayView1<f64>) -> Option<f64> {
            self.answer.filter(|_| !row.is_empty()).map(|l| f64::from(l.class()))
        }
    }

    #[test]
    fn eight_to_three_split_keeps_both_classes_in_test() {
        let labels = labels(8, 3);
        for seed in 0..50 {
            let split = stratified_split(&labels, 0.3, seed);
            assert_eq!(split.train.len() + split.test.len(), 11);
            assert_eq!(split.test.len(), 4);
            let test_pathogenic = split
                .test
                .iter()
                .filter(|&&idx| labels[idx] == Label::Pathogenic)
                .count();
            assert_eq!(test_pathogenic, 1);
            assert_eq!(split.test.len() - test_pathogenic, 3);
        }
    }

    #[test]
    fn split_is_reproducible_for_a_seed() {
        let labels = labels(20, 7);
        assert_eq!(
            stratified_split(&labels, 0.3, 42),
            stratified_split(&labels, 0.3, 42)
        );
    }

    #[test]
    fn split_partitions_every_index_once() {
        let labels = labels(13, 9);
        let split = stratified_split(&labels, 0.3, 42);
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..labels.len()).collect::<Vec<_>>());
        assert!(split.train.windows(2).all(|w| w[0] < w[1]));
        assert!(split.test.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn allocation_never_empties_a_class_from_training() {
        assert_eq!(test_allocation([10, 1], 0.3), [4, 0]);
        assert_eq!(test_allocation([2, 2], 0.9), [1, 1]);
        assert_eq!(test_allocation([8, 3], 0.3), [3, 1]);
        assert_eq!(test_allocation([50, 50], 0.3), [15, 15]);
    }

    #[test]
    fn metrics_restrict_to_observed_labels() {
        let truth = vec![Label::Benign, Label::Benign, Label::Benign];
        let predicted = vec![Label::Benign, Label::Benign, Label::Benign];
        let metrics = classification_metrics(&truth, &predicted);
        assert_eq!(metrics.per_class.len(), 1);
        assert_eq!(metrics.per_class[0].label, Label::Benign);
        assert_abs_diff_eq!(metrics.accuracy, 1.0);
        assert_abs_diff_eq!(metrics.per_class[0].f1, 1.0);
    }

    #[test]
    fn metrics_cover_the_union_of_truth_and_prediction() {
        let truth = vec![Label::Benign, Label::Benign, Label::Pathogenic, Label::Benign];
        let predicted = vec![
            Label::Benign,
            Label::Pathogenic,
            Label::Pathogenic,
            Label::Benign,
        ];
        let metrics = classification_metrics(&truth, &predicted);
        assert_abs_diff_eq!(metrics.accuracy, 0.75);
        assert_eq!(metrics.confusion.get(Label::Benign, Label::Pathogenic), 1);
        assert_eq!(metrics.confusion.get(Label::Pathogenic, Label::Pathogenic), 1);

        let benign = &metrics.per_class[0];
        assert_abs_diff_eq!(benign.precision, 1.0);
        assert_abs_diff_eq!(benign.recall, 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(benign.f1, 0.8, epsilon = 1e-12);
        assert_eq!(benign.support, 3);

        let pathogenic = &metrics.per_class[1];
        assert_abs_diff_eq!(pathogenic.precision, 0.5);
        assert_abs_diff_eq!(pathogenic.recall, 1.0);
        assert_eq!(pathogenic.support, 1);

        assert_abs_diff_eq!(metrics.macro_avg.precision, 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(
            metrics.weighted_avg.recall,
            (2.0 / 3.0 * 3.0 + 1.0) / 4.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn predicted_only_label_gets_zero_recall_row() {
        let truth = vec![Label::Benign, Label::Benign];
        let predicted = vec![Label::Benign, Label::Pathogenic];
        let metrics = classification_metrics(&truth, &predicted);
        assert_eq!(metrics.per_class.len(), 2);
        let pathogenic = &metrics.per_class[1];
        assert_eq!(pathogenic.support, 0);
        assert_abs_diff_eq!(pathogenic.precision, 0.0);
        assert_abs_diff_eq!(pathogenic.recall, 0.0);
        assert_abs_diff_eq!(pathogenic.f1, 0.0);
    }

    #[test]
    fn single_class_datasets_are_refused() {
        let dataset = dataset_from(&[(1.0, Label::Pathogenic), (2.0, Label::Pathogenic)]);
        let config = RunConfig::default();
        match Trainer::new(&dataset, &config) {
            Err(EvaluationError::InsufficientClassDiversity { present }) => {
                assert_eq!(present, Label::Pathogenic)
            }
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("single-class dataset was accepted"),
        }
        let message = EvaluationError::InsufficientClassDiversity {
            present: Label::Pathogenic,
        }
        .to_string();
        assert!(message.contains("augmentation"));

        let empty = dataset_from(&[]);
        assert!(matches!(
            ensure_class_diversity(&empty),
            Err(EvaluationError::EmptyDataset)
        ));
    }

    fn counting_loo(parallel: bool) {
        let points: Vec<(f64, Label)> = (0..11)
            .map(|i| {
                let label = if i < 8 { Label::Benign } else { Label::Pathogenic };
                (i as f64, label)
            })
            .collect();
        let dataset = dataset_from(&points);
        let fits = Arc::new(AtomicUsize::new(0));
        let predictions = Arc::new(AtomicUsize::new(0));

        let outcome = leave_one_out(
            &dataset,
            || Majority {
                fits: Arc::clone(&fits),
                predictions: Arc::clone(&predictions),
                answer: None,
            },
            parallel,
        )
        .unwrap();

        assert_eq!(fits.load(Ordering::SeqCst), 11);
        assert_eq!(predictions.load(Ordering::SeqCst), 11);
        assert_eq!(outcome.folds(), 11);
        // Majority is always benign, so exactly the eight benign folds are right.
        assert_eq!(outcome.correct, 8);
        assert_eq!(outcome.accuracy, 8.0 / 11.0);
    }

    #[test]
    fn leave_one_out_runs_exactly_n_folds_sequentially() {
        counting_loo(false);
    }

    #[test]
    fn leave_one_out_runs_exactly_n_folds_in_parallel() {
        counting_loo(true);
    }

    #[test]
    fn parallel_and_sequential_folds_agree() {
        let points: Vec<(f64, Label)> = (0..14)
            .map(|i| {
                let label = if i % 3 == 0 { Label::Pathogenic } else { Label::Benign };
                (i as f64 * 1.7 - 6.0, label)
            })
            .collect();
        let dataset = dataset_from(&points);
        let config = RunConfig::default();
        let sequential = leave_one_out(&dataset, || config.classifier.build(), false).unwrap();
        let parallel = leave_one_out(&dataset, || config.classifier.build(), true).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn holdout_reports_on_the_test_partition() {
        let points: Vec<(f64, Label)> = (0..11)
            .map(|i| {
                if i < 8 {
                    (i as f64 * 0.1, Label::Benign)
                } else {
                    (10.0 + i as f64, Label::Pathogenic)
                }
            })
            .collect();
        let dataset = dataset_from(&points);
        let config = RunConfig {
            protocol: Protocol::Holdout,
            ..RunConfig::default()
        };
        let trainer = Trainer::new(&dataset, &config).unwrap();
        let outcome = match trainer.evaluate().unwrap() {
            EvaluationOutcome::Holdout(outcome) => outcome,
            other => panic!("expected hold-out outcome, got {other:?}"),
        };
        assert_eq!(outcome.truth.len(), 4);
        assert_eq!(outcome.predictions, outcome.truth);
        assert_abs_diff_eq!(outcome.metrics.accuracy, 1.0);
        assert_eq!(outcome.metrics.per_class.len(), 2);
    }

    #[test]
    fn full_fit_predicts_single_vectors() {
        let points: Vec<(f64, Label)> = (0..10)
            .map(|i| {
                if i < 6 {
                    (i as f64 * 0.1, Label::Benign)
                } else {
                    (10.0 + i as f64, Label::Pathogenic)
                }
            })
            .collect();
        let dataset = dataset_from(&points);
        let config = RunConfig::default();
        let trained = Trainer::new(&dataset, &config).unwrap().fit_full().unwrap();
        assert_eq!(trained.feature_set(), FeatureSet::Basic);

        let prediction = trained.predict_one(&[18.0, -18.0]).unwrap();
        assert_eq!(prediction.label, Label::Pathogenic);
        assert!(prediction.pathogenic_score.unwrap() > 0.5);

        assert!(matches!(
            trained.predict_one(&[1.0, 2.0, 3.0]),
            Err(ModelError::WidthMismatch {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn unpenalised_logistic_completes_leave_one_out_on_separable_data() {
        // Second column is unrelated noise so the unpenalised system is not rank deficient.
        let rows = (0..8)
            .map(|i| (i, Label::Benign))
            .chain((108..111).map(|i| (i, Label::Pathogenic)))
            .enumerate()
            .map(|(idx, (value, label))| LabeledVariant {
                gene: "G".into(),
                mutation: format!("A{}T", idx + 1),
                features: vec![f64::from(value), f64::from(value % 3)],
                label,
            })
            .collect();
        let dataset = Dataset::from_rows(FeatureSet::Basic, rows, DropCounts::default());
        let mut config = RunConfig::default();
        config.classifier.ridge = 0.0;
        config.validate().unwrap();

        let outcome = match Trainer::new(&dataset, &config).unwrap().evaluate().unwrap() {
            EvaluationOutcome::LeaveOneOut(outcome) => outcome,
            other => panic!("expected leave-one-out outcome, got {other:?}"),
        };
        assert_eq!(outcome.folds(), 11);
        assert_eq!(outcome.correct, 11);
    }

    #[test]
    fn holdout_without_room_for_a_test_partition_is_refused() {
        let dataset = dataset_from(&[(0.0, Label::Benign), (5.0, Label::Pathogenic)]);
        let config = RunConfig {
            protocol: Protocol::Holdout,
            ..RunConfig::default()
        };
        let trainer = Trainer::new(&dataset, &config).unwrap();
        match trainer.evaluate() {
            Err(EvaluationError::EmptyTestPartition { records, .. }) => assert_eq!(records, 2),
            other => panic!("expected an empty test partition error, got {other:?}"),
        }

        // Leave-one-out still works on the same two records.
        let loo = leave_one_out(&dataset, || config.classifier.build(), false).unwrap();
        assert_eq!(loo.folds(), 2);
    }
}
