//! Physicochemical properties of the twenty standard amino acids.
//!
//! Hydrophobicity follows the Kyte-Doolittle (1982) hydropathy scale, molecular
//! weights are free amino-acid masses in daltons, and charge is a coarse
//! side-chain charge at physiological pH. Histidine carries +0.5 to reflect its
//! partial protonation; the literal constant is kept as published.

/// One row of the property table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AminoAcidProperties {
    pub code: char,
    pub hydrophobicity: f64,
    pub molecular_weight: f64,
    pub charge: f64,
}

const fn residue(
    code: char,
    hydrophobicity: f64,
    molecular_weight: f64,
    charge: f64,
) -> AminoAcidProperties {
    AminoAcidProperties {
        code,
        hydrophobicity,
        molecular_weight,
        charge,
    }
}

/// Standard residues in alphabetical order of their one-letter code.
const STANDARD_RESIDUES: [AminoAcidProperties; 20] = [
    residue('A', 1.8, 89.1, 0.0),
    residue('C', 2.5, 121.2, 0.0),
    residue('D', -3.5, 133.1, -1.0),
    residue('E', -3.5, 147.1, -1.0),
    residue('F', 2.8, 165.2, 0.0),
    residue('G', -0.4, 75.1, 0.0),
    residue('H', -3.2, 155.2, 0.5),
    residue('I', 4.5, 131.2, 0.0),
    residue('K', -3.9, 146.2, 1.0),
    residue('L', 3.8, 131.2, 0.0),
    residue('M', 1.9, 149.2, 0.0),
    residue('N', -3.5, 132.1, 0.0),
    residue('P', -1.6, 115.1, 0.0),
    residue('Q', -3.5, 146.2, 0.0),
    residue('R', -4.5, 174.2, 1.0),
    residue('S', -0.8, 105.1, 0.0),
    residue('T', -0.7, 119.1, 0.0),
    residue('V', 4.2, 117.1, 0.0),
    residue('W', -0.9, 204.2, 0.0),
    residue('Y', -1.3, 181.2, 0.0),
];

/// Map a one-letter code to its slot in `STANDARD_RESIDUES`.
fn residue_index(code: char) -> Option<usize> {
    match code {
        'A' => Some(0),
        'C' => Some(1),
        'D' => Some(2),
        'E' => Some(3),
        'F' => Some(4),
        'G' => Some(5),
        'H' => Some(6),
        'I' => Some(7),
        'K' => Some(8),
        'L' => Some(9),
        'M' => Some(10),
        'N' => Some(11),
        'P' => Some(12),
        'Q' => Some(13),
        'R' => Some(14),
        'S' => Some(15),
        'T' => Some(16),
        'V' => Some(17),
        'W' => Some(18),
        'Y' => Some(19),
        _ => None,
    }
}

/// Constant lookup table over the canonical residues.
///
/// A code outside the canonical set is a miss (`None`), never a panic. Callers
/// are expected to drop the affected record.
#[derive(Debug, Clone, Copy)]
pub struct PropertyTable {
    rows: &'static [AminoAcidProperties; 20],
}

impl PropertyTable {
    pub const fn standard() -> Self {
        Self {
            rows: &STANDARD_RESIDUES,
        }
    }

    pub fn lookup(&self, code: char) -> Option<&AminoAcidProperties> {
        residue_index(code).map(|idx| &self.rows[idx])
    }

    pub fn codes(&self) -> impl Iterator<Item = char> + '_ {
        self.rows.iter().map(|row| row.code)
    }
}

impl Default for PropertyTable {
    fn default() -> Self {
        Self::standard()
    }
}
