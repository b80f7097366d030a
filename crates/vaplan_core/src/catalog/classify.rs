//! Withdrawal case classification
//!
//! Withdrawal-rate cases carry no structured option or guarantee-phase field;
//! the carrier data encodes both in free-text notes. The `CaseClassifier`
//! trait isolates that decision so a structured source can replace the note
//! heuristic without touching extraction.

use super::payload::RawCase;

/// Decides which income options a case belongs to and which guarantee phase
/// its rates describe
pub trait CaseClassifier {
    /// Option numbers the case applies to (empty when it names none)
    fn option_numbers(&self, case: &RawCase) -> Vec<u32>;

    /// Rates paid from the account value (MAWP / MAWA)
    fn is_primary(&self, case: &RawCase) -> bool;

    /// Rates the insurer keeps paying after depletion (PIP)
    fn is_secondary(&self, case: &RawCase) -> bool;
}

/// Classifies cases from their `notes` text
#[derive(Debug, Clone, Copy, Default)]
pub struct NoteClassifier;

const PRIMARY_MARKERS: [&str; 2] = ["MAWA", "MAWP"];
const SECONDARY_MARKERS: [&str; 2] = ["PIP", "Insurer Pays"];

impl CaseClassifier for NoteClassifier {
    fn option_numbers(&self, case: &RawCase) -> Vec<u32> {
        option_numbers_in(case.notes())
    }

    fn is_primary(&self, case: &RawCase) -> bool {
        let notes = case.notes();
        PRIMARY_MARKERS.iter().any(|m| notes.contains(m))
    }

    fn is_secondary(&self, case: &RawCase) -> bool {
        let notes = case.notes();
        SECONDARY_MARKERS.iter().any(|m| notes.contains(m))
    }
}

/// Every distinct "Option N" mentioned in `text`, in order of appearance.
///
/// Matching is case-insensitive, "option" must start a word and be followed
/// by whitespace and then the full digit run, so "Option 1" never matches
/// "Option 10". "Income Option N" matches through its "Option N" suffix.
pub fn option_numbers_in(text: &str) -> Vec<u32> {
    const WORD: &str = "option";

    // ASCII lowercasing keeps byte offsets aligned with the input
    let lower = text.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(pos) = lower[cursor..].find(WORD) {
        let start = cursor + pos;
        cursor = start + WORD.len();

        if start > 0 && bytes[start - 1].is_ascii_alphanumeric() {
            continue;
        }

        let rest = &lower[cursor..];
        let trimmed = rest.trim_start();
        if trimmed.len() == rest.len() {
            continue;
        }

        let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(n) = digits.parse::<u32>()
            && !found.contains(&n)
        {
            found.push(n);
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case_with_notes(notes: &str) -> RawCase {
        RawCase {
            case_type: Some("A".to_string()),
            notes: Some(notes.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_option_numbers() {
        assert_eq!(option_numbers_in("MAWP Option 1"), vec![1]);
        assert_eq!(option_numbers_in("Income Option 2 - PIP"), vec![2]);
        assert_eq!(option_numbers_in("income option  3"), vec![3]);
        assert_eq!(option_numbers_in("Option 10"), vec![10]);
        assert_eq!(option_numbers_in("Option 1 and Option 2, Option 1"), vec![1, 2]);
    }

    #[test]
    fn test_option_numbers_rejects_non_matches() {
        assert!(option_numbers_in("Optional step-up").is_empty());
        assert!(option_numbers_in("Adoption 3").is_empty());
        assert!(option_numbers_in("Option1").is_empty());
        assert!(option_numbers_in("").is_empty());
    }

    #[test]
    fn test_note_classifier_phases() {
        let classifier = NoteClassifier;
        let mawp = case_with_notes("MAWP Option 1 ages 65-69");
        let mawa = case_with_notes("MAWA lifetime");
        let pip = case_with_notes("PIP Option 1");
        let insurer = case_with_notes("Insurer Pays phase");
        let plain = case_with_notes("Withdrawal percentage");

        assert!(classifier.is_primary(&mawp) && !classifier.is_secondary(&mawp));
        assert!(classifier.is_primary(&mawa));
        assert!(classifier.is_secondary(&pip) && !classifier.is_primary(&pip));
        assert!(classifier.is_secondary(&insurer));
        assert!(!classifier.is_primary(&plain) && !classifier.is_secondary(&plain));
        assert_eq!(classifier.option_numbers(&pip), vec![1]);
    }
}
