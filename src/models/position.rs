// src/models/position.rs

//! Finishing position codes.

use serde::{Deserialize, Serialize};

/// Classified finishing position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishPosition {
    /// Completed the course in this place
    Placed(u32),
    /// Did not finish normally (UR, PU, F, ...)
    Abnormal(String),
    /// Neither numeric nor a configured code
    Unknown(String),
}

/// The set of abnormal-finish codes the site uses.
///
/// The vocabulary has changed over time, so it is configuration rather than
/// an enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionCodes {
    #[serde(default = "default_abnormal_codes")]
    pub abnormal: Vec<String>,
}

fn default_abnormal_codes() -> Vec<String> {
    ["UR", "PU", "F", "RO", "RR", "VOI", "BD", "SU", "REF", "DSQ"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for PositionCodes {
    fn default() -> Self {
        Self {
            abnormal: default_abnormal_codes(),
        }
    }
}

impl PositionCodes {
    /// Classify a position code as rendered on the page.
    pub fn classify(&self, code: &str) -> FinishPosition {
        let code = code.trim();
        if let Ok(place) = code.parse::<u32>() {
            if place > 0 {
                return FinishPosition::Placed(place);
            }
        }
        if self.abnormal.iter().any(|c| c.eq_ignore_ascii_case(code)) {
            FinishPosition::Abnormal(code.to_string())
        } else {
            FinishPosition::Unknown(code.to_string())
        }
    }

    /// Whether `code` is a valid position code.
    pub fn is_known(&self, code: &str) -> bool {
        !matches!(self.classify(code), FinishPosition::Unknown(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_numeric() {
        let codes = PositionCodes::default();
        assert_eq!(codes.classify("3"), FinishPosition::Placed(3));
        assert_eq!(codes.classify(" 12 "), FinishPosition::Placed(12));
    }

    #[test]
    fn test_classify_abnormal() {
        let codes = PositionCodes::default();
        assert_eq!(codes.classify("PU"), FinishPosition::Abnormal("PU".into()));
        assert_eq!(codes.classify("voi"), FinishPosition::Abnormal("voi".into()));
    }

    #[test]
    fn test_classify_unknown() {
        let codes = PositionCodes::default();
        assert_eq!(codes.classify("0"), FinishPosition::Unknown("0".into()));
        assert!(!codes.is_known("XX"));
    }

    #[test]
    fn test_codes_are_extensible() {
        let codes = PositionCodes {
            abnormal: vec!["LFT".into()],
        };
        assert!(codes.is_known("LFT"));
        assert!(!codes.is_known("UR"));
    }
}
