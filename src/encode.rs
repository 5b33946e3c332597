//! Status token encoding
//!
//! Laser heads report status in two shapes: a single decimal digit
//! (Coherent `?STA`) or an LED bitmask read back as a decimal integer
//! (Cobolt `leds?`). Transition tables are keyed by canonical string
//! tokens, so this module provides the conversions between raw device
//! output, canonical tokens, and the grouped shorthand used to declare
//! per-model tables: inclusive digit ranges and don't-care bit patterns.

use crate::error::{LaunchError, LaunchResult};
use crate::table::StatusToken;

/// Expand a don't-care bit pattern into every concrete bit string it
/// matches.
///
/// The pattern is a string over `{'0', '1', 'x'}`, most-significant bit
/// first. Each `'x'` doubles the result set, so a pattern with `k`
/// don't-care positions expands to `2^k` strings, all the length of the
/// pattern.
///
/// ```
/// use laser_launch::encode::expand_dont_care;
///
/// let tokens = expand_dont_care("0x11").unwrap();
/// assert_eq!(tokens, vec!["0011".to_string(), "0111".to_string()]);
/// ```
pub fn expand_dont_care(pattern: &str) -> LaunchResult<Vec<String>> {
    let mut result = vec![String::with_capacity(pattern.len())];

    for ch in pattern.chars() {
        match ch {
            '0' | '1' => {
                for bits in &mut result {
                    bits.push(ch);
                }
            }
            'x' => {
                let mut doubled = Vec::with_capacity(result.len() * 2);
                for bits in result {
                    let mut with_one = bits.clone();
                    let mut with_zero = bits;
                    with_zero.push('0');
                    with_one.push('1');
                    doubled.push(with_zero);
                    doubled.push(with_one);
                }
                result = doubled;
            }
            found => {
                return Err(LaunchError::Pattern {
                    pattern: pattern.to_string(),
                    found,
                })
            }
        }
    }

    result.sort();
    Ok(result)
}

/// String tokens for an inclusive integer range.
///
/// Used to group simple single-digit status domains, e.g. Sapphire
/// statuses 1-4 all warming up.
pub fn tokens_from_range(lo: u32, hi: u32) -> Vec<String> {
    (lo..=hi).map(|n| n.to_string()).collect()
}

/// Per-model conversion between raw device status output and canonical
/// [`StatusToken`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEncoding {
    /// Status register is a single decimal digit in an inclusive range.
    Digit {
        /// Lowest status the device can report.
        lo: u32,
        /// Highest status the device can report.
        hi: u32,
    },
    /// Status is an LED bitmask reported as a decimal integer,
    /// canonicalized to a zero-padded binary string of `width` bits.
    Bits {
        /// Number of status bits.
        width: u32,
    },
}

impl StatusEncoding {
    /// Every raw token the device can legally report, in the form it
    /// arrives on the wire. Handed to `serial_check` as the acceptable
    /// candidates for the status query.
    pub fn candidates(&self) -> Vec<String> {
        match self {
            Self::Digit { lo, hi } => tokens_from_range(*lo, *hi),
            Self::Bits { width } => tokens_from_range(0, (1 << width) - 1),
        }
    }

    /// Convert a raw matched token into the canonical table key.
    ///
    /// Returns `None` when the raw token does not parse under this
    /// encoding; the engine treats that as a failed status read.
    pub fn canonicalize(&self, raw: &str) -> Option<StatusToken> {
        match self {
            Self::Digit { .. } => Some(StatusToken::new(raw)),
            Self::Bits { width } => {
                let value: u32 = raw.trim().parse().ok()?;
                let width = *width as usize;
                Some(StatusToken::new(format!("{value:0width$b}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_example_pattern() {
        assert_eq!(expand_dont_care("0x11").unwrap(), vec!["0011", "0111"]);
    }

    #[test]
    fn test_expand_no_dont_cares_is_identity() {
        assert_eq!(expand_dont_care("1010").unwrap(), vec!["1010"]);
    }

    #[test]
    fn test_expand_counts_and_lengths() {
        for (pattern, x_count) in [("10xx", 2), ("0xxx", 3), ("xxxx", 4), ("x", 1)] {
            let tokens = expand_dont_care(pattern).unwrap();
            assert_eq!(tokens.len(), 1 << x_count, "pattern {pattern}");

            let mut unique = tokens.clone();
            unique.dedup();
            assert_eq!(unique.len(), tokens.len(), "pattern {pattern}");

            for token in &tokens {
                assert_eq!(token.len(), pattern.len(), "pattern {pattern}");
                for (got, want) in token.chars().zip(pattern.chars()) {
                    if want != 'x' {
                        assert_eq!(got, want, "pattern {pattern}, token {token}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_expand_rejects_other_characters() {
        assert!(matches!(
            expand_dont_care("1z0x"),
            Err(LaunchError::Pattern { found: 'z', .. })
        ));
    }

    #[test]
    fn test_tokens_from_range_inclusive() {
        assert_eq!(tokens_from_range(1, 4), vec!["1", "2", "3", "4"]);
        assert_eq!(tokens_from_range(5, 5), vec!["5"]);
    }

    #[test]
    fn test_digit_encoding_is_identity() {
        let encoding = StatusEncoding::Digit { lo: 1, hi: 6 };
        assert_eq!(encoding.candidates(), vec!["1", "2", "3", "4", "5", "6"]);
        assert_eq!(encoding.canonicalize("5"), Some(StatusToken::new("5")));
    }

    #[test]
    fn test_bits_encoding_zero_pads() {
        let encoding = StatusEncoding::Bits { width: 4 };
        assert_eq!(encoding.candidates().len(), 16);
        assert_eq!(encoding.canonicalize("10"), Some(StatusToken::new("1010")));
        assert_eq!(encoding.canonicalize("2"), Some(StatusToken::new("0010")));
        assert_eq!(encoding.canonicalize("15"), Some(StatusToken::new("1111")));
        assert_eq!(encoding.canonicalize("junk"), None);
    }
}
