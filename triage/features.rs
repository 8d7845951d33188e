//! Mapping from a parsed substitution to a numeric delta vector.
//!
//! Every delta is `property(mutant) - property(reference)` in raw physical
//! units. Nothing is normalised here, so direction is preserved: a
//! hydrophobic-to-polar swap and its reverse produce opposite signals.

use crate::notation::Substitution;
use crate::residues::PropertyTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeatureError {
    #[error("Residue code '{0}' is not one of the twenty standard amino acids")]
    UnknownResidue(char),
}

/// Which delta columns a pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureSet {
    /// Hydrophobicity and molecular weight deltas.
    Basic,
    /// Basic deltas plus the charge delta.
    #[default]
    Extended,
}

impl FeatureSet {
    pub fn width(self) -> usize {
        self.column_names().len()
    }

    /// Column names in the derived feature table, in vector order.
    pub fn column_names(self) -> &'static [&'static str] {
        match self {
            FeatureSet::Basic => &["Delta_Hydro", "Delta_MW"],
            FeatureSet::Extended => &["Delta_Hydro", "Delta_MW", "Delta_Charge"],
        }
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureSet::Basic => write!(f, "basic"),
            FeatureSet::Extended => write!(f, "extended"),
        }
    }
}

/// All three deltas for one substitution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidueDelta {
    pub hydrophobicity: f64,
    pub molecular_weight: f64,
    pub charge: f64,
}

impl ResidueDelta {
    /// Projects onto the columns of `feature_set`, in table order.
    pub fn project(&self, feature_set: FeatureSet) -> Vec<f64> {
        match feature_set {
            FeatureSet::Basic => vec![self.hydrophobicity, self.molecular_weight],
            FeatureSet::Extended => vec![self.hydrophobicity, self.molecular_weight, self.charge],
        }
    }
}

impl Neg for ResidueDelta {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            hydrophobicity: -self.hydrophobicity,
            molecular_weight: -self.molecular_weight,
            charge: -self.charge,
        }
    }
}

/// Looks up both residues and returns mutant-minus-reference deltas.
pub fn derive(
    substitution: &Substitution,
    table: &PropertyTable,
) -> Result<ResidueDelta, FeatureError> {
    let reference = table
        .lookup(substitution.reference)
        .ok_or(FeatureError::UnknownResidue(substitution.reference))?;
    let mutant = table
        .lookup(substitution.mutant)
        .ok_or(FeatureError::UnknownResidue(substitution.mutant))?;

    Ok(ResidueDelta {
        hydrophobicity: mutant.hydrophobicity - reference.hydrophobicity,
        molecular_weight: mutant.molecular_weight - reference.molecular_weight,
        charge: mutant.charge - reference.charge,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sub(text: &str) -> Substitution {
        Substitution::parse(text).unwrap()
    }

    #[test]
    fn arginine_to_histidine_deltas() {
        let delta = derive(&sub("R34H"), &PropertyTable::standard()).unwrap();
        assert_abs_diff_eq!(delta.hydrophobicity, 1.3, epsilon = 1e-9);
        assert_abs_diff_eq!(delta.molecular_weight, -19.0, epsilon = 1e-9);
        assert_abs_diff_eq!(delta.charge, -0.5, epsilon = 1e-9);
    }

    #[test]
    fn swapping_residues_negates_every_component() {
        let table = PropertyTable::standard();
        let codes: Vec<char> = table.codes().collect();
        for &from in &codes {
            for &to in &codes {
                let forward = derive(&sub(&format!("{from}1{to}")), &table).unwrap();
                let backward = derive(&sub(&format!("{to}1{from}")), &table).unwrap();
                let negated = -backward;
                assert_abs_diff_eq!(forward.hydrophobicity, negated.hydrophobicity, epsilon = 1e-9);
                assert_abs_diff_eq!(
                    forward.molecular_weight,
                    negated.molecular_weight,
                    epsilon = 1e-9
                );
                assert_abs_diff_eq!(forward.charge, negated.charge, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn position_does_not_affect_features() {
        let table = PropertyTable::standard();
        let near = derive(&sub("A1T"), &table).unwrap();
        let far = derive(&sub("A9999T"), &table).unwrap();
        assert_eq!(near, far);
    }

    #[test]
    fn unknown_residues_are_unresolvable() {
        let table = PropertyTable::standard();
        assert_eq!(
            derive(&sub("X12A"), &table),
            Err(FeatureError::UnknownResidue('X'))
        );
        assert_eq!(
            derive(&sub("A12B"), &table),
            Err(FeatureError::UnknownResidue('B'))
        );
    }

    #[test]
    fn projection_follows_column_order() {
        let delta = ResidueDelta {
            hydrophobicity: 1.0,
            molecular_weight: 2.0,
            charge: 3.0,
        };
        assert_eq!(delta.project(FeatureSet::Basic), vec![1.0, 2.0]);
        assert_eq!(delta.project(FeatureSet::Extended), vec![1.0, 2.0, 3.0]);
        assert_eq!(FeatureSet::Basic.width(), 2);
        assert_eq!(FeatureSet::Extended.width(), 3);
    }
}
