//! Assembly of the labeled feature dataset.
//!
//! Primary records and a fixed augmentation set are concatenated, each record is
//! parsed and turned into deltas, and the label is assigned from the free-text
//! classification. Records that cannot be parsed or that name a non-standard
//! residue are dropped and counted; they never abort the build.

use crate::data::VariantRecord;
use crate::features::{self, FeatureError, FeatureSet};
use crate::labels::Label;
use crate::notation::{NotationError, Substitution};
use crate::residues::PropertyTable;
use ndarray::Array2;

/// A hard-coded benign substitution used to augment pathogenic-only sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedRecord {
    pub gene: &'static str,
    pub protein_change: &'static str,
}

/// Common neutral polymorphisms across mitochondrial complex I and ATP synthase
/// genes. Guarantees at least one benign example when the primary table only
/// lists disease variants.
pub const MITOCHONDRIAL_BENIGN_SEEDS: &[SeedRecord] = &[
    seed("MT-ND1", "A12T"),
    seed("MT-ND4", "P25L"),
    seed("MT-ND6", "I166V"),
    seed("MT-ND1", "T12A"),
    seed("MT-ND5", "L124F"),
    seed("MT-ND4", "I165T"),
    seed("MT-ND2", "V12I"),
    seed("MT-ATP6", "T33A"),
];

pub const fn seed(gene: &'static str, protein_change: &'static str) -> SeedRecord {
    SeedRecord {
        gene,
        protein_change,
    }
}

/// Expands seed entries into full records classified as `Benign`.
pub fn seed_records(seeds: &[SeedRecord]) -> Vec<VariantRecord> {
    seeds
        .iter()
        .map(|seed| VariantRecord {
            gene: seed.gene.to_string(),
            protein_change: seed.protein_change.to_string(),
            classification: "Benign".to_string(),
        })
        .collect()
}

/// One retained record.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledVariant {
    pub gene: String,
    pub mutation: String,
    pub features: Vec<f64>,
    pub label: Label,
}

/// Bookkeeping for records that were excluded from the dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropCounts {
    pub unparseable: usize,
    pub unknown_residue: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.unparseable + self.unknown_residue
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub benign: usize,
    pub pathogenic: usize,
}

impl ClassCounts {
    pub fn get(&self, label: Label) -> usize {
        match label {
            Label::Benign => self.benign,
            Label::Pathogenic => self.pathogenic,
        }
    }

    pub fn total(&self) -> usize {
        self.benign + self.pathogenic
    }

    /// Labels with at least one record, in ascending class order.
    pub fn present(&self) -> Vec<Label> {
        Label::ALL
            .into_iter()
            .filter(|&label| self.get(label) > 0)
            .collect()
    }
}

/// Ordered `(features, label)` rows sharing one feature layout. Read-only once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    feature_set: FeatureSet,
    rows: Vec<LabeledVariant>,
    dropped: DropCounts,
}

impl Dataset {
    /// Wraps pre-derived rows. Each row must carry `feature_set.width()` values.
    pub fn from_rows(
        feature_set: FeatureSet,
        rows: Vec<LabeledVariant>,
        dropped: DropCounts,
    ) -> Self {
        debug_assert!(rows.iter().all(|row| row.features.len() == feature_set.width()));
        Self {
            feature_set,
            rows,
            dropped,
        }
    }

    pub fn feature_set(&self) -> FeatureSet {
        self.feature_set
    }

    pub fn rows(&self) -> &[LabeledVariant] {
        &self.rows
    }

    pub fn dropped(&self) -> DropCounts {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn class_counts(&self) -> ClassCounts {
        let mut counts = ClassCounts::default();
        for row in &self.rows {
            match row.label {
                Label::Benign => counts.benign += 1,
                Label::Pathogenic => counts.pathogenic += 1,
            }
        }
        counts
    }

    pub fn labels(&self) -> Vec<Label> {
        self.rows.iter().map(|row| row.label).collect()
    }

    /// Feature matrix, shape `[len, feature_set.width()]`.
    pub fn feature_matrix(&self) -> Array2<f64> {
        self.select(&(0..self.len()).collect::<Vec<_>>()).0
    }

    /// Feature rows and labels for the given indices, in the order given.
    pub fn select(&self, indices: &[usize]) -> (Array2<f64>, Vec<Label>) {
        let width = self.feature_set.width();
        let mut matrix = Array2::zeros((indices.len(), width));
        let mut labels = Vec::with_capacity(indices.len());
        for (out_row, &idx) in indices.iter().enumerate() {
            let row = &self.rows[idx];
            for (col, &value) in row.features.iter().enumerate() {
                matrix[[out_row, col]] = value;
            }
            labels.push(row.label);
        }
        (matrix, labels)
    }
}

enum Rejection {
    Unparseable(NotationError),
    UnknownResidue(FeatureError),
}

/// Turns raw records into a [`Dataset`].
#[derive(Debug, Clone, Copy)]
pub struct DatasetBuilder {
    table: PropertyTable,
    feature_set: FeatureSet,
}

impl DatasetBuilder {
    pub fn new(feature_set: FeatureSet) -> Self {
        Self {
            table: PropertyTable::standard(),
            feature_set,
        }
    }

    /// Concatenates `primary` then `augmentation`, preserving order, and keeps
    /// every record that parses and resolves against the property table.
    pub fn build(&self, primary: &[VariantRecord], augmentation: &[VariantRecord]) -> Dataset {
        let mut rows = Vec::with_capacity(primary.len() + augmentation.len());
        let mut dropped = DropCounts::default();

        for record in primary.iter().chain(augmentation) {
            match self.derive_row(record) {
                Ok(row) => rows.push(row),
                Err(Rejection::Unparseable(err)) => {
                    log::debug!("Dropping {} record: {err}", record.gene);
                    dropped.unparseable += 1;
                }
                Err(Rejection::UnknownResidue(err)) => {
                    log::debug!(
                        "Dropping {} {}: {err}",
                        record.gene,
                        record.protein_change.trim()
                    );
                    dropped.unknown_residue += 1;
                }
            }
        }

        log::info!(
            "Built dataset with {} variants ({} {} features); dropped {} unparseable and {} with unknown residues",
            rows.len(),
            self.feature_set,
            self.feature_set.width(),
            dropped.unparseable,
            dropped.unknown_residue
        );

        Dataset::from_rows(self.feature_set, rows, dropped)
    }

    fn derive_row(&self, record: &VariantRecord) -> Result<LabeledVariant, Rejection> {
        let change = record.protein_change.trim();
        let label = Label::from_classification(&record.classification);

        let substitution = Substitution::parse(change).map_err(Rejection::Unparseable)?;
        if substitution.is_synonymous() {
            log::debug!("Keeping silent change {} {substitution} with a zero delta", record.gene);
        }
        let delta =
            features::derive(&substitution, &self.table).map_err(Rejection::UnknownResidue)?;

        Ok(LabeledVariant {
            gene: record.gene.clone(),
            mutation: change.to_string(),
            features: delta.project(self.feature_set),
            label,
        })
    }
}
