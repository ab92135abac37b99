//! Prescription line classification
//!
//! A line is administered in the clinic when it mentions one of the drugs
//! below (case-insensitive substring); everything else is a home
//! prescription.

use crate::models::{PrescriptionKind, PrescriptionLine};

pub const IN_CLINIC_DRUGS: &[&str] = &[
    "lignocaine",
    "lidocaine",
    "articaine",
    "adrenaline",
    "epinephrine",
    "chlorhexidine",
    "calcium hydroxide",
    "formocresol",
    "zinc oxide eugenol",
    "fluoride varnish",
    "povidone iodine",
    "hydrogen peroxide",
    "sodium hypochlorite",
    "edta",
    "mta",
    "glass ionomer",
];

pub fn classify_line(line: &str) -> PrescriptionKind {
    let lower = line.to_lowercase();
    if IN_CLINIC_DRUGS.iter().any(|drug| lower.contains(drug)) {
        PrescriptionKind::InClinic
    } else {
        PrescriptionKind::Home
    }
}

/// Split free text into classified lines, skipping blank ones
pub fn classify(prescription: &str) -> Vec<PrescriptionLine> {
    prescription
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| PrescriptionLine {
            text: line.to_string(),
            kind: classify_line(line),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let lines = classify("Lignocaine 2% local infiltration\n\n  Amoxicillin 500mg TDS x 5 days\nChlorhexidine rinse");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].kind, PrescriptionKind::InClinic);
        assert_eq!(lines[1].kind, PrescriptionKind::Home);
        assert_eq!(lines[1].text, "Amoxicillin 500mg TDS x 5 days");
        assert_eq!(lines[2].kind, PrescriptionKind::InClinic);
    }

    #[test]
    fn test_substring_match_is_case_insensitive() {
        assert_eq!(classify_line("LIDOCAINE"), PrescriptionKind::InClinic);
        assert_eq!(classify_line("Paracetamol 650"), PrescriptionKind::Home);
        assert!(classify("   \n").is_empty());
    }
}
