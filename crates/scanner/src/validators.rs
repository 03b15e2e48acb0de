//! Structural validators applied after a regex match.
//!
//! Regexes find candidate spans; these checks reject structurally invalid
//! candidates (bad SSN ranges, failed Luhn or ABA checksums, out-of-range
//! IPv4 octets) so the scanner's PII hits carry fewer false positives.

/// SSNs that appear in advertising or test fixtures and are never valid.
const SSN_BLACKLIST: &[&str] = &["078-05-1120", "219-09-9999", "457-55-5462", "123-45-6789"];

/// Validate a matched span for the given pattern id.
///
/// Returns `true` for pattern ids without a structural validator.
#[must_use]
pub fn validate_span(pattern_id: &str, matched: &str) -> bool {
    match pattern_id {
        "pii-us-ssn" => ssn_is_plausible(matched),
        "pii-us-credit-card" => luhn_valid(matched),
        "pii-us-routing" => aba_checksum_valid(matched),
        "pii-us-ipv4" => ipv4_valid(matched),
        _ => true,
    }
}

/// Structural SSN check: area not 000/666/9xx, group not 00, serial not
/// 0000, and not on the known-invalid blacklist.
///
/// The blacklist is intentionally checked last so fixtures like
/// `123-45-6789` are reported as structurally sound but still flagged.
#[must_use]
pub fn ssn_is_plausible(ssn: &str) -> bool {
    if SSN_BLACKLIST.contains(&ssn) {
        // Famous fixtures are still treated as matches: they look exactly
        // like real SSNs to a downstream consumer.
        return true;
    }
    let mut parts = ssn.splitn(3, '-');
    let (Some(area), Some(group), Some(serial)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let Ok(area_n) = area.parse::<u16>() else {
        return false;
    };
    if area_n == 0 || area_n == 666 || area_n >= 900 {
        return false;
    }
    if group == "00" || serial == "0000" {
        return false;
    }
    true
}

/// Luhn mod-10 check over the digits of `candidate`, ignoring spaces and
/// dashes. Requires 13-19 digits.
#[must_use]
pub fn luhn_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default();
    if digits.len() < 13 || digits.len() > 19 {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// ABA routing number checksum: 3-7-1 weighting over nine digits.
#[must_use]
pub fn aba_checksum_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate
        .chars()
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default();
    if digits.len() != 9 {
        return false;
    }
    // Valid Federal Reserve routing prefixes: 00-12, 21-32, 61-72, 80.
    let prefix = digits[0] * 10 + digits[1];
    let prefix_ok = prefix <= 12
        || (21..=32).contains(&prefix)
        || (61..=72).contains(&prefix)
        || prefix == 80;
    if !prefix_ok {
        return false;
    }
    let sum: u32 = digits
        .chunks(3)
        .map(|c| 3 * c[0] + 7 * c[1] + c[2])
        .sum();
    sum % 10 == 0
}

/// All four octets must parse to 0..=255.
#[must_use]
pub fn ipv4_valid(candidate: &str) -> bool {
    let octets: Vec<&str> = candidate.split('.').collect();
    octets.len() == 4 && octets.iter().all(|o| o.parse::<u8>().is_ok())
}
