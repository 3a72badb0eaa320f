//! Strict numeric-literal grammar.
//!
//! A string matches when the whole input is
//!
//! ```text
//! [+-]? DIGIT+ ('.' DIGIT+)? ([eE] [+-]? DIGIT+)?
//! ```
//!
//! No surrounding whitespace, no empty string, no hex or special values.

/// Check whether `s` is a numeric literal that must be kept verbatim.
///
/// # Examples
///
/// ```
/// use pbix::normalize::is_numeric_literal;
///
/// assert!(is_numeric_literal("007"));
/// assert!(is_numeric_literal("-1.5e+10"));
/// assert!(!is_numeric_literal(" 1"));
/// assert!(!is_numeric_literal(""));
/// ```
pub fn is_numeric_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let int_digits = count_digits(&bytes[pos..]);
    if int_digits == 0 {
        return false;
    }
    pos += int_digits;

    if bytes.get(pos) == Some(&b'.') {
        let frac_digits = count_digits(&bytes[pos + 1..]);
        if frac_digits == 0 {
            return false;
        }
        pos += 1 + frac_digits;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        let exp_digits = count_digits(&bytes[pos..]);
        if exp_digits == 0 {
            return false;
        }
        pos += exp_digits;
    }

    pos == bytes.len()
}

#[inline]
fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_integers() {
        for s in ["0", "7", "007", "-12", "+12", "123456789012345678901234567890"] {
            assert!(is_numeric_literal(s), "{s:?} should be numeric");
        }
    }

    #[test]
    fn test_accepts_fractions_and_exponents() {
        for s in ["1.28", "-0.5", "1e5", "1E5", "2.5e-3", "-1.5e+10"] {
            assert!(is_numeric_literal(s), "{s:?} should be numeric");
        }
    }

    #[test]
    fn test_rejects_non_literals() {
        for s in [
            "", " ", " 1", "1 ", "-", "+", "1.", ".5", "1e", "1e+", "0x10", "NaN",
            "Infinity", "1,000", "--1", "1.2.3", "١٢",
        ] {
            assert!(!is_numeric_literal(s), "{s:?} should not be numeric");
        }
    }
}
