//! # Tabular input and output
//!
//! Two flat tables cross the crate boundary:
//!
//! - The primary variant table, with at least the columns `Gene`,
//!   `Protein_Change` and `Classification`. Individual cells may be missing or
//!   malformed; such rows are kept here as empty strings and dropped later by
//!   the dataset builder. Only a missing file or a missing column is fatal.
//! - The derived feature table (`Gene, Mutation, Delta_Hydro, Delta_MW,
//!   [Delta_Charge], Class`), written after feature derivation and read back by
//!   the training stage. Unlike the primary table it is machine-written, so any
//!   malformed row is reported as an error.
//!
//! Files ending in `.tsv` are tab-separated; everything else is read as CSV.

use crate::dataset::{Dataset, DropCounts, LabeledVariant};
use crate::features::FeatureSet;
use crate::labels::Label;
use csv::{ByteRecord, ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// One row of the primary table, as read. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    pub gene: String,
    pub protein_change: String,
    pub classification: String,
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Could not find input file '{}'. Create it first or check the path.", .path.display())]
    MissingInputSource { path: PathBuf },
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Error from the underlying CSV reader/writer: {0}")]
    CsvError(#[from] csv::Error),
    #[error(
        "The required column '{0}' was not found in the input file. Please check spelling and case."
    )]
    ColumnNotFound(String),
    #[error("Feature table row {line} is invalid: {message}")]
    InvalidFeatureRow { line: usize, message: String },
}

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

fn open_source(path: &Path) -> Result<File, DataError> {
    File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => DataError::MissingInputSource {
            path: path.to_path_buf(),
        },
        _ => DataError::IoError(err),
    })
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize, DataError> {
    headers
        .iter()
        .position(|header| header.trim() == name)
        .ok_or_else(|| DataError::ColumnNotFound(name.to_string()))
}

fn optional_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|header| header.trim() == name)
}

/// Reads the primary variant table.
pub fn read_variant_records(path: &Path) -> Result<Vec<VariantRecord>, DataError> {
    let file = open_source(path)?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let gene_idx = column_index(&headers, "Gene")?;
    let change_idx = column_index(&headers, "Protein_Change")?;
    let class_idx = column_index(&headers, "Classification")?;

    // Byte records so that a stray non-UTF-8 cell only spoils its own row.
    let cell = |record: &ByteRecord, idx: usize| -> String {
        record
            .get(idx)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default()
    };

    let mut records = Vec::new();
    let mut raw = ByteRecord::new();
    while reader.read_byte_record(&mut raw)? {
        records.push(VariantRecord {
            gene: cell(&raw, gene_idx),
            protein_change: cell(&raw, change_idx),
            classification: cell(&raw, class_idx),
        });
    }

    log::info!("Loaded {} variants from {}", records.len(), path.display());
    Ok(records)
}

/// Writes the derived feature table, replacing `path` atomically.
///
/// Rows are staged in an anonymous temporary file beside `path`; a failed write
/// leaves any existing table untouched.
pub fn write_feature_table(dataset: &Dataset, path: &Path) -> Result<(), DataError> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let staged = NamedTempFile::new_in(parent)?;
    write_rows(dataset, staged.as_file(), delimiter_for(path))?;
    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}

fn write_rows(dataset: &Dataset, sink: impl io::Write, delimiter: u8) -> Result<(), DataError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(sink);

    let mut header = vec!["Gene", "Mutation"];
    header.extend_from_slice(dataset.feature_set().column_names());
    header.push("Class");
    writer.write_record(&header)?;

    let mut buffers: Vec<ryu::Buffer> = (0..dataset.feature_set().width())
        .map(|_| ryu::Buffer::new())
        .collect();
    for row in dataset.rows() {
        let class = row.label.class().to_string();
        let mut fields: Vec<&str> = vec![row.gene.as_str(), row.mutation.as_str()];
        for (buffer, &value) in buffers.iter_mut().zip(&row.features) {
            fields.push(buffer.format(value));
        }
        fields.push(&class);
        writer.write_record(&fields)?;
    }

    writer.flush()?;
    Ok(())
}

/// Reads a derived feature table back into a [`Dataset`].
///
/// With `requested = None` the layout is inferred: a `Delta_Charge` column
/// selects [`FeatureSet::Extended`]. Asking for `Basic` on an extended table
/// ignores the charge column; asking for `Extended` on a basic table fails.
pub fn read_feature_table(
    path: &Path,
    requested: Option<FeatureSet>,
) -> Result<Dataset, DataError> {
    let file = open_source(path)?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .from_reader(file);
    let headers = reader.headers()?.clone();

    let has_charge = optional_column(&headers, "Delta_Charge").is_some();
    let feature_set = match requested {
        Some(set) => set,
        None if has_charge => FeatureSet::Extended,
        None => FeatureSet::Basic,
    };
    let feature_columns = feature_set
        .column_names()
        .iter()
        .map(|name| column_index(&headers, name))
        .collect::<Result<Vec<_>, _>>()?;
    let class_idx = column_index(&headers, "Class")?;
    let gene_idx = optional_column(&headers, "Gene");
    let mutation_idx = optional_column(&headers, "Mutation");

    let mut rows = Vec::new();
    for (offset, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = offset + 2;
        let record = result?;
        let text = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string()
        };

        let mut features = Vec::with_capacity(feature_columns.len());
        for (&idx, name) in feature_columns.iter().zip(feature_set.column_names()) {
            let raw = record.get(idx).unwrap_or_default().trim();
            let value: f64 = raw.parse().map_err(|_| DataError::InvalidFeatureRow {
                line,
                message: format!("column '{name}' holds non-numeric value '{raw}'"),
            })?;
            if !value.is_finite() {
                return Err(DataError::InvalidFeatureRow {
                    line,
                    message: format!("column '{name}' holds non-finite value '{raw}'"),
                });
            }
            features.push(value);
        }

        let class_text = record.get(class_idx).unwrap_or_default().trim();
        let label = class_text
            .parse::<u8>()
            .ok()
            .and_then(Label::from_class)
            .ok_or_else(|| DataError::InvalidFeatureRow {
                line,
                message: format!("column 'Class' must be 0 or 1, found '{class_text}'"),
            })?;

        rows.push(LabeledVariant {
            gene: text(gene_idx),
            mutation: text(mutation_idx),
            features,
            label,
        });
    }

    log::info!(
        "Loaded {} feature rows ({} features) from {}",
        rows.len(),
        feature_set,
        path.display()
    );
    Ok(Dataset::from_rows(feature_set, rows, DropCounts::default()))
}
