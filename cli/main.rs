#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]

use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use missense::config::{ClassifierKind, ConfigError, Protocol, RunConfig};
use missense::data::{read_feature_table, read_variant_records, write_feature_table};
use missense::dataset::{Dataset, DatasetBuilder, MITOCHONDRIAL_BENIGN_SEEDS, seed_records};
use missense::evaluate::{TrainedClassifier, Trainer};
use missense::features::{FeatureSet, derive};
use missense::notation::Substitution;
use missense::report;
use missense::residues::PropertyTable;

/// Substitution used for the live prediction after an evaluation (Arg -> His).
const LIVE_TEST_MUTATION: &str = "R34H";

/// Rows of the derived table echoed after feature derivation.
const PREVIEW_ROWS: usize = 5;

#[derive(Args)]
struct ConfigArgs {
    /// TOML run configuration; flags below override its values
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Validation protocol
    #[arg(long, value_enum)]
    protocol: Option<Protocol>,

    /// Fraction of variants held out by the stratified split
    #[arg(long, value_name = "F")]
    test_fraction: Option<f64>,

    /// Seed for the stratified shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Classifier implementation
    #[arg(long, value_enum)]
    classifier: Option<ClassifierKind>,

    /// Feature set; a derived table is read with this layout instead of its own
    #[arg(long, value_enum)]
    feature_set: Option<FeatureSet>,

    /// Run leave-one-out folds on a single thread
    #[arg(long)]
    sequential: bool,
}

impl ConfigArgs {
    fn resolve(&self) -> Result<RunConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        if let Some(protocol) = self.protocol {
            config.protocol = protocol;
        }
        if let Some(fraction) = self.test_fraction {
            config.test_fraction = fraction;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(kind) = self.classifier {
            config.classifier.kind = kind;
        }
        if let Some(feature_set) = self.feature_set {
            config.feature_set = feature_set;
        }
        if self.sequential {
            config.parallel_folds = false;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Args)]
struct FeaturesArgs {
    /// Primary variant table with Gene, Protein_Change and Classification columns
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Where to write the derived feature table
    #[arg(long, default_value = "lhon_features.csv")]
    output: PathBuf,

    #[arg(long, value_enum, default_value_t = FeatureSet::Extended)]
    feature_set: FeatureSet,

    /// Skip the benign mitochondrial seed records
    #[arg(long)]
    no_augment: bool,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Derived feature table written by `missense features`
    #[arg(value_name = "FEATURES")]
    features: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args)]
struct PredictArgs {
    /// Derived feature table to fit on
    #[arg(value_name = "FEATURES")]
    features: PathBuf,

    /// Substitution to classify, e.g. R34H
    #[arg(long, conflicts_with = "deltas", required_unless_present = "deltas")]
    mutation: Option<String>,

    /// Precomputed property deltas, comma separated
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    deltas: Option<Vec<f64>>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args)]
struct RunArgs {
    /// Primary variant table with Gene, Protein_Change and Classification columns
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Skip the benign mitochondrial seed records
    #[arg(long)]
    no_augment: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser)]
#[command(
    name = "missense",
    about = "Physicochemical triage of missense variants",
    long_about = "Derives amino-acid property deltas from single-residue substitutions and \
                 trains a class-weighted classifier that separates pathogenic from benign \
                 variants on small labeled sets."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, augment and derive the feature table
    #[command(about = "Derive property deltas (outputs: lhon_features.csv)")]
    Features(FeaturesArgs),

    /// Validate a classifier on a derived feature table
    #[command(about = "Evaluate with hold-out or leave-one-out validation")]
    Evaluate(EvaluateArgs),

    /// Classify one substitution or delta vector
    #[command(about = "Predict Benign or Pathogenic for a single variant")]
    Predict(PredictArgs),

    /// Derive and evaluate in memory
    #[command(about = "End-to-end pipeline without intermediate files")]
    Run(RunArgs),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = match Cli::parse().command {
        Some(Commands::Features(args)) => run_features(args),
        Some(Commands::Evaluate(args)) => run_evaluate(args),
        Some(Commands::Predict(args)) => run_predict(args),
        Some(Commands::Run(args)) => run_pipeline(args),
        None => Cli::command()
            .print_help()
            .map(|()| println!())
            .map_err(Into::into),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn build_dataset(
    input: &Path,
    feature_set: FeatureSet,
    augment: bool,
) -> Result<Dataset, Box<dyn std::error::Error>> {
    println!("Loading variants from: {}", input.display());
    let primary = read_variant_records(input)?;
    let augmentation = if augment {
        seed_records(MITOCHONDRIAL_BENIGN_SEEDS)
    } else {
        println!("Benign augmentation disabled via --no-augment.");
        Vec::new()
    };
    println!(
        "Read {} primary records, {} augmentation records",
        primary.len(),
        augmentation.len()
    );
    Ok(DatasetBuilder::new(feature_set).build(&primary, &augmentation))
}

fn run_features(args: FeaturesArgs) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = build_dataset(&args.input, args.feature_set, !args.no_augment)?;
    print!("{}", report::dataset_summary(&dataset));
    write_feature_table(&dataset, &args.output)?;
    println!("Feature table written to: {}", args.output.display());
    print!("{}", report::feature_preview(&dataset, PREVIEW_ROWS));
    Ok(())
}

fn live_prediction(trained: &TrainedClassifier) -> Result<String, Box<dyn std::error::Error>> {
    let substitution: Substitution = LIVE_TEST_MUTATION.parse()?;
    let delta = derive(&substitution, &PropertyTable::standard())?;
    let prediction = trained.predict_one(&delta.project(trained.feature_set()))?;
    Ok(report::prediction_line(
        &format!("Live test (Arg -> His) {substitution}"),
        &prediction,
    ))
}

fn evaluate_dataset(
    dataset: &Dataset,
    config: &RunConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", report::dataset_summary(dataset));
    let trainer = Trainer::new(dataset, config)?;
    let outcome = trainer.evaluate()?;
    print!("{}", report::evaluation_report(&outcome, dataset));

    let trained = trainer.fit_full()?;
    println!("Classifier: {}", trained.name());
    println!("{}", live_prediction(&trained)?);
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.config.resolve()?;
    println!("Loading feature table from: {}", args.features.display());
    let dataset = read_feature_table(&args.features, args.config.feature_set)?;
    evaluate_dataset(&dataset, &config)
}

fn run_predict(args: PredictArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.config.resolve()?;
    let dataset = read_feature_table(&args.features, args.config.feature_set)?;
    let trained = Trainer::new(&dataset, &config)?.fit_full()?;

    let (subject, features) = match (&args.mutation, &args.deltas) {
        (Some(text), _) => {
            let substitution = Substitution::parse(text)?;
            let delta = derive(&substitution, &PropertyTable::standard())?;
            (
                substitution.to_string(),
                delta.project(trained.feature_set()),
            )
        }
        (None, Some(deltas)) => (
            deltas
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(","),
            deltas.clone(),
        ),
        (None, None) => return Err("either --mutation or --deltas is required".into()),
    };

    let prediction = trained.predict_one(&features)?;
    println!("{}", report::prediction_line(&subject, &prediction));
    println!("Classifier: {}", trained.name());
    Ok(())
}

fn run_pipeline(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.config.resolve()?;
    let dataset = build_dataset(&args.input, config.feature_set, !args.no_augment)?;
    evaluate_dataset(&dataset, &config)
}
