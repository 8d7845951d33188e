//! Human-readable summaries. Every function returns the text; the binary
//! decides where it goes.

use crate::dataset::Dataset;
use crate::evaluate::{
    AveragedMetrics, ClassificationMetrics, EvaluationOutcome, HoldoutOutcome,
    LeaveOneOutOutcome, Prediction,
};
use crate::labels::Label;
use itertools::Itertools;
use std::fmt::Write;

const RULE_WIDTH: usize = 30;

fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// Size, class balance and drop counts of a built dataset.
pub fn dataset_summary(dataset: &Dataset) -> String {
    let counts = dataset.class_counts();
    let dropped = dataset.dropped();
    let mut out = String::new();
    let _ = writeln!(out, "Dataset size: {} variants", dataset.len());
    let _ = writeln!(
        out,
        "Class balance: {} {}, {} {}",
        counts.get(Label::Benign),
        Label::Benign,
        counts.get(Label::Pathogenic),
        Label::Pathogenic
    );
    let _ = writeln!(out, "Feature set: {}", dataset.feature_set());
    if dropped.total() > 0 {
        let _ = writeln!(
            out,
            "Dropped: {} unparseable, {} with unknown residues",
            dropped.unparseable, dropped.unknown_residue
        );
    }
    out
}

/// The first `limit` rows of the derived feature table.
pub fn feature_preview(dataset: &Dataset, limit: usize) -> String {
    let columns = dataset.feature_set().column_names();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:<10} {} {:>5}",
        "Gene",
        "Mutation",
        columns.iter().map(|c| format!("{c:>12}")).join(" "),
        "Class"
    );
    for row in dataset.rows().iter().take(limit) {
        let _ = writeln!(
            out,
            "{:<10} {:<10} {} {:>5}",
            row.gene,
            row.mutation,
            row.features.iter().map(|v| format!("{v:>12.3}")).join(" "),
            row.label.class()
        );
    }
    out
}

fn metrics_table(metrics: &ClassificationMetrics) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>9} {:>9} {:>9} {:>9}",
        "", "precision", "recall", "f1-score", "support"
    );
    for class in &metrics.per_class {
        let _ = writeln!(
            out,
            "{:<12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            class.label.to_string(),
            class.precision,
            class.recall,
            class.f1,
            class.support
        );
    }
    let support: usize = metrics.per_class.iter().map(|c| c.support).sum();
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<12} {:>9} {:>9} {:>9.2} {:>9}",
        "accuracy", "", "", metrics.accuracy, support
    );
    let average_row = |name: &str, avg: &AveragedMetrics| {
        format!(
            "{:<12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            name, avg.precision, avg.recall, avg.f1, support
        )
    };
    let _ = writeln!(out, "{}", average_row("macro avg", &metrics.macro_avg));
    let _ = writeln!(out, "{}", average_row("weighted avg", &metrics.weighted_avg));
    out
}

fn confusion_table(metrics: &ClassificationMetrics) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {}",
        "truth \\ predicted",
        Label::ALL.iter().map(|l| format!("{:>10}", l.to_string())).join(" ")
    );
    for truth in Label::ALL {
        let _ = writeln!(
            out,
            "{:<20} {}",
            truth.to_string(),
            Label::ALL
                .iter()
                .map(|&predicted| format!("{:>10}", metrics.confusion.get(truth, predicted)))
                .join(" ")
        );
    }
    out
}

pub fn holdout_report(outcome: &HoldoutOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(
        out,
        "Stratified hold-out: {} train / {} test",
        outcome.split.train.len(),
        outcome.split.test.len()
    );
    let _ = writeln!(out, "Accuracy: {:.2}%", outcome.metrics.accuracy * 100.0);
    let _ = writeln!(out, "{}", rule());
    out.push_str(&metrics_table(&outcome.metrics));
    let _ = writeln!(out, "{}", rule());
    out.push_str(&confusion_table(&outcome.metrics));
    out
}

pub fn leave_one_out_report(outcome: &LeaveOneOutOutcome, dataset: &Dataset) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(
        out,
        "Leave-one-out: {}/{} folds correct",
        outcome.correct,
        outcome.folds()
    );
    let _ = writeln!(out, "Accuracy: {:.2}%", outcome.accuracy * 100.0);
    let missed = dataset
        .rows()
        .iter()
        .zip(&outcome.predictions)
        .filter(|(row, predicted)| row.label != **predicted)
        .map(|(row, _)| format!("{} {}", row.gene, row.mutation))
        .collect::<Vec<_>>();
    if !missed.is_empty() {
        let _ = writeln!(out, "Misclassified: {}", missed.join(", "));
    }
    if dataset.len() < 50 {
        let _ = writeln!(
            out,
            "Note: with only {} variants each fold carries {:.1}% of the accuracy.",
            dataset.len(),
            100.0 / dataset.len() as f64
        );
    }
    let _ = writeln!(out, "{}", rule());
    out
}

pub fn evaluation_report(outcome: &EvaluationOutcome, dataset: &Dataset) -> String {
    match outcome {
        EvaluationOutcome::Holdout(holdout) => holdout_report(holdout),
        EvaluationOutcome::LeaveOneOut(loo) => leave_one_out_report(loo, dataset),
    }
}

/// One line for a live prediction, e.g. `R34H -> Pathogenic (score 0.812)`.
pub fn prediction_line(subject: &str, prediction: &Prediction) -> String {
    match prediction.pathogenic_score {
        Some(score) => format!("{subject} -> {} (score {score:.3})", prediction.label),
        None => format!("{subject} -> {}", prediction.label),
    }
}
