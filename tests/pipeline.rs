use std::fs;

use approx::assert_abs_diff_eq;
use tempfile::tempdir;

use missense::config::{Protocol, RunConfig};
use missense::data::{DataError, read_feature_table, read_variant_records, write_feature_table};
use missense::dataset::{DatasetBuilder, DropCounts, MITOCHONDRIAL_BENIGN_SEEDS, seed_records};
use missense::evaluate::{EvaluationError, EvaluationOutcome, Trainer};
use missense::features::{FeatureSet, derive};
use missense::labels::Label;
use missense::notation::Substitution;
use missense::residues::PropertyTable;

const LHON_TABLE: &str = "\
Gene,Protein_Change,Classification,Notes
MT-ND4,R340H,Pathogenic,G11778A
MT-ND1,A52T,Likely pathogenic,G3460A
MT-ND6,M64V,Pathogenic (confirmed),T14484C
MT-ND4,V75fs,Pathogenic,frameshift
MT-ND5,,Uncertain significance,
MT-ND2,B12Z,Pathogenic,ambiguous residue
";

#[test]
fn derived_table_survives_a_disk_round_trip() {
    let tmp = tempdir().expect("temporary directory");
    let input = tmp.path().join("lhon.csv");
    fs::write(&input, LHON_TABLE).expect("write primary table");

    let primary = read_variant_records(&input).expect("read primary table");
    assert_eq!(primary.len(), 6);

    let dataset = DatasetBuilder::new(FeatureSet::Extended)
        .build(&primary, &seed_records(MITOCHONDRIAL_BENIGN_SEEDS));
    assert_eq!(dataset.len(), 11);
    assert_eq!(
        dataset.dropped(),
        DropCounts {
            unparseable: 2,
            unknown_residue: 1
        }
    );
    assert_eq!(dataset.class_counts().get(Label::Pathogenic), 3);
    assert_eq!(dataset.class_counts().get(Label::Benign), 8);

    let output = tmp.path().join("lhon_features.csv");
    write_feature_table(&dataset, &output).expect("write feature table");
    let header = fs::read_to_string(&output)
        .expect("read feature table")
        .lines()
        .next()
        .map(str::to_owned)
        .expect("header line");
    assert_eq!(header, "Gene,Mutation,Delta_Hydro,Delta_MW,Delta_Charge,Class");

    let reloaded = read_feature_table(&output, None).expect("reload feature table");
    assert_eq!(reloaded.feature_set(), FeatureSet::Extended);
    assert_eq!(reloaded.rows(), dataset.rows());

    let basic = read_feature_table(&output, Some(FeatureSet::Basic)).expect("basic view");
    assert_eq!(basic.rows()[0].features, dataset.rows()[0].features[..2].to_vec());
}

#[test]
fn missing_primary_table_is_fatal() {
    let tmp = tempdir().expect("temporary directory");
    let missing = tmp.path().join("absent.csv");
    match read_variant_records(&missing) {
        Err(DataError::MissingInputSource { path }) => assert_eq!(path, missing),
        other => panic!("expected a missing-input error, got {other:?}"),
    }
}

#[test]
fn evaluation_without_augmentation_is_refused() {
    let tmp = tempdir().expect("temporary directory");
    let input = tmp.path().join("lhon.csv");
    fs::write(&input, LHON_TABLE).expect("write primary table");
    let primary = read_variant_records(&input).expect("read primary table");

    let dataset = DatasetBuilder::new(FeatureSet::Extended).build(&primary, &[]);
    assert_eq!(dataset.class_counts().present(), vec![Label::Pathogenic]);

    let config = RunConfig::default();
    assert!(matches!(
        Trainer::new(&dataset, &config),
        Err(EvaluationError::InsufficientClassDiversity {
            present: Label::Pathogenic
        })
    ));
}

#[test]
fn both_protocols_run_on_the_augmented_lhon_set() {
    let tmp = tempdir().expect("temporary directory");
    let input = tmp.path().join("lhon.csv");
    fs::write(&input, LHON_TABLE).expect("write primary table");
    let primary = read_variant_records(&input).expect("read primary table");
    let dataset = DatasetBuilder::new(FeatureSet::Extended)
        .build(&primary, &seed_records(MITOCHONDRIAL_BENIGN_SEEDS));

    let loo_config = RunConfig::default();
    let loo = Trainer::new(&dataset, &loo_config)
        .expect("two classes")
        .evaluate()
        .expect("leave-one-out");
    match &loo {
        EvaluationOutcome::LeaveOneOut(outcome) => {
            assert_eq!(outcome.folds(), 11);
            assert_abs_diff_eq!(outcome.accuracy, outcome.correct as f64 / 11.0);
        }
        other => panic!("expected leave-one-out, got {other:?}"),
    }

    let holdout_config = RunConfig {
        protocol: Protocol::Holdout,
        ..RunConfig::default()
    };
    let holdout = Trainer::new(&dataset, &holdout_config)
        .expect("two classes")
        .evaluate()
        .expect("hold-out");
    match &holdout {
        EvaluationOutcome::Holdout(outcome) => {
            assert_eq!(outcome.split.test.len(), 4);
            assert!(outcome.truth.contains(&Label::Pathogenic));
            assert!(outcome.truth.contains(&Label::Benign));
            assert!((0.0..=1.0).contains(&outcome.metrics.accuracy));
        }
        other => panic!("expected hold-out, got {other:?}"),
    }
}

#[test]
fn live_prediction_uses_the_table_feature_width() {
    let tmp = tempdir().expect("temporary directory");
    let input = tmp.path().join("lhon.csv");
    fs::write(&input, LHON_TABLE).expect("write primary table");
    let primary = read_variant_records(&input).expect("read primary table");

    for feature_set in [FeatureSet::Basic, FeatureSet::Extended] {
        let dataset = DatasetBuilder::new(feature_set)
            .build(&primary, &seed_records(MITOCHONDRIAL_BENIGN_SEEDS));
        let config = RunConfig::default();
        let trained = Trainer::new(&dataset, &config)
            .expect("two classes")
            .fit_full()
            .expect("full fit");

        let substitution: Substitution = "R34H".parse().expect("valid notation");
        let delta = derive(&substitution, &PropertyTable::standard()).expect("known residues");
        let features = delta.project(feature_set);
        assert_eq!(features.len(), feature_set.width());
        assert_abs_diff_eq!(features[0], 1.3, epsilon = 1e-9);
        assert_abs_diff_eq!(features[1], -19.0, epsilon = 1e-9);

        let prediction = trained.predict_one(&features).expect("prediction");
        let score = prediction.pathogenic_score.expect("logistic score");
        assert!((0.0..=1.0).contains(&score));
        assert_eq!(prediction.label == Label::Pathogenic, score >= 0.5);
    }
}
