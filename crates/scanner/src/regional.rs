//! Pluggable regional PII detection.
//!
//! A [`RegionalPiiDetector`] scans free text for region-specific
//! identifiers. Matches flagged `critical` carry a block recommendation
//! that the pre-check surfaces before the policy engine runs.

use regex::Regex;

use crate::error::ScanError;
use crate::scanner::Span;

/// A regional PII hit.
#[derive(Debug, Clone)]
pub struct RegionalPiiMatch {
    /// Identifier kind (e.g. `"aadhaar"`).
    pub kind: String,
    /// Byte span of the match.
    pub span: Span,
    /// Whether this kind carries a block recommendation.
    pub critical: bool,
}

/// Detector for one region's identifier formats.
pub trait RegionalPiiDetector: Send + Sync {
    /// ISO-style region code (e.g. `"IN"`).
    fn region(&self) -> &'static str;

    /// Scan `text` for regional identifiers.
    fn detect(&self, text: &str) -> Vec<RegionalPiiMatch>;

    /// Whether any match recommends blocking the request.
    fn block_recommended(&self, text: &str) -> bool {
        self.detect(text).iter().any(|m| m.critical)
    }
}

struct RegionalPattern {
    kind: &'static str,
    regex: Regex,
    critical: bool,
}

/// Detector for Indian identifiers: Aadhaar, PAN, UPI handles, IFSC codes
/// and bank account numbers. Aadhaar and PAN are critical.
pub struct IndiaPiiDetector {
    patterns: Vec<RegionalPattern>,
}

impl IndiaPiiDetector {
    /// Compile the detector. Construction errors are startup failures.
    pub fn new() -> Result<Self, ScanError> {
        let specs: [(&'static str, &'static str, bool); 4] = [
            // Aadhaar never starts with 0 or 1.
            ("aadhaar", r"\b[2-9]\d{3}[ -]?\d{4}[ -]?\d{4}\b", true),
            ("pan", r"\b[A-Z]{5}\d{4}[A-Z]\b", true),
            (
                "upi",
                r"\b[\w.]+@(upi|ybl|okaxis|oksbi|okicici|okhdfcbank|paytm|apl)\b",
                false,
            ),
            ("ifsc", r"\b[A-Z]{4}0[A-Z0-9]{6}\b", false),
        ];
        let patterns = specs
            .into_iter()
            .map(|(kind, src, critical)| {
                Regex::new(src)
                    .map(|regex| RegionalPattern {
                        kind,
                        regex,
                        critical,
                    })
                    .map_err(|e| ScanError::InvalidPattern {
                        id: format!("pii-in-{kind}"),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }
}

impl RegionalPiiDetector for IndiaPiiDetector {
    fn region(&self) -> &'static str {
        "IN"
    }

    fn detect(&self, text: &str) -> Vec<RegionalPiiMatch> {
        let mut matches = Vec::new();
        for p in &self.patterns {
            for m in p.regex.find_iter(text) {
                matches.push(RegionalPiiMatch {
                    kind: p.kind.to_owned(),
                    span: Span {
                        start: m.start(),
                        end: m.end(),
                    },
                    critical: p.critical,
                });
            }
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> IndiaPiiDetector {
        IndiaPiiDetector::new().expect("regional patterns should compile")
    }

    #[test]
    fn region_code() {
        assert_eq!(detector().region(), "IN");
    }

    #[test]
    fn aadhaar_detected_and_critical() {
        let d = detector();
        let matches = d.detect("my aadhaar is 2345 6789 0123");
        assert!(matches.iter().any(|m| m.kind == "aadhaar" && m.critical));
        assert!(d.block_recommended("my aadhaar is 2345 6789 0123"));
    }

    #[test]
    fn pan_detected_and_critical() {
        let d = detector();
        assert!(d.block_recommended("PAN: ABCDE1234F"));
    }

    #[test]
    fn upi_detected_not_critical() {
        let d = detector();
        let matches = d.detect("pay me at someone@ybl");
        assert!(matches.iter().any(|m| m.kind == "upi" && !m.critical));
        assert!(!d.block_recommended("pay me at someone@ybl"));
    }

    #[test]
    fn ifsc_detected() {
        let d = detector();
        let matches = d.detect("transfer via SBIN0001234");
        assert!(matches.iter().any(|m| m.kind == "ifsc"));
    }

    #[test]
    fn clean_text_no_matches() {
        let d = detector();
        assert!(d.detect("hello there, nothing sensitive here").is_empty());
        assert!(!d.block_recommended("hello there"));
    }
}
