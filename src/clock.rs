//! # Coarse-fine clock encoding
//!
//! Spacecraft clocks (SCLK) and data validity times (DVT) are transmitted as a
//! pair of tick counters: a coarse count of seconds-like ticks and a fine
//! count of subticks. On the ground the pair is carried as a single 64-bit
//! "exact" integer, with the coarse ticks in the high bits and the fine ticks
//! in the low bits.
//!
//! [`CoarseFineEncoding`] holds the mission-configured bit widths and display
//! separators for one such clock, and provides the pure conversions between
//! the exact integer, the [`ClockValue`] pair, the floating-point
//! seconds-and-subseconds view, and the mission display string.
//!
//! ```rust
//! use sclkscet::clock::CoarseFineEncoding;
//!
//! let sclk = CoarseFineEncoding::new(32, 16);
//! let exact = sclk.pack(1000, 4096);
//! assert_eq!(exact, 65_540_096);
//! assert_eq!(sclk.to_float(exact), 1000.0625);
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::sclkscet_errors::{ConfigurationError, FormatError, SclkScetError};

/// An unpacked coarse/fine tick pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockValue {
    pub coarse: u64,
    pub fine: u64,
}

impl ClockValue {
    pub fn new(coarse: u64, fine: u64) -> Self {
        ClockValue { coarse, fine }
    }
}

/// Mission-configured layout of a coarse-fine clock.
///
/// The bit widths and separators are read once from mission configuration and
/// treated as immutable for the process lifetime. `fine_modulus` is the number
/// of fine ticks per coarse tick used when parsing display strings; it
/// defaults to `2^fine_bits` but some missions run the fine counter on a
/// non-power-of-two modulus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoarseFineEncoding {
    pub coarse_bits: u32,
    pub fine_bits: u32,
    pub fine_modulus: u64,
    /// Separator for the `coarse<sep>fine` integer-subticks display format.
    pub ticks_sep: char,
    /// Separator for the `coarse<sep>fraction` fractional display format.
    pub fractional_sep: char,
    /// Display clock strings in the fractional format instead of ticks.
    pub use_fractional_format: bool,
}

impl CoarseFineEncoding {
    /// Build an encoding with the given bit widths and the canonical display
    /// conventions (`-` ticks separator, `.` fractional separator, ticks
    /// display format, power-of-two fine modulus).
    pub fn new(coarse_bits: u32, fine_bits: u32) -> Self {
        CoarseFineEncoding {
            coarse_bits,
            fine_bits,
            fine_modulus: 1u64.checked_shl(fine_bits).unwrap_or(0),
            ticks_sep: '-',
            fractional_sep: '.',
            use_fractional_format: false,
        }
    }

    /// Check the encoding for widths a 64-bit exact value cannot carry.
    pub fn validate(&self) -> Result<(), SclkScetError> {
        if self.fine_bits >= 64 || self.coarse_bits + self.fine_bits > 64 {
            return Err(ConfigurationError::InvalidConfiguration(format!(
                "coarse/fine bit widths {}+{} exceed 64 bits",
                self.coarse_bits, self.fine_bits
            ))
            .into());
        }
        if self.fine_modulus == 0 {
            return Err(
                ConfigurationError::InvalidConfiguration("fine_modulus must be non-zero".into())
                    .into(),
            );
        }
        Ok(())
    }

    fn fine_mask(&self) -> u64 {
        1u64.checked_shl(self.fine_bits)
            .map(|v| v - 1)
            .unwrap_or(u64::MAX)
    }

    /// Combine a coarse/fine tick pair into the 64-bit exact representation.
    pub fn pack(&self, coarse: u64, fine: u64) -> u64 {
        (coarse << self.fine_bits) | (fine & self.fine_mask())
    }

    /// Split a 64-bit exact representation back into its coarse/fine pair.
    pub fn unpack(&self, exact: u64) -> ClockValue {
        ClockValue {
            coarse: exact >> self.fine_bits,
            fine: exact & self.fine_mask(),
        }
    }

    /// Only the coarse ticks of an exact value, discarding the subticks.
    pub fn seconds_only(&self, exact: u64) -> u64 {
        exact >> self.fine_bits
    }

    /// Floating-point seconds-and-subseconds view of an exact value.
    pub fn to_float(&self, exact: u64) -> f64 {
        let value = self.unpack(exact);
        value.coarse as f64 + value.fine as f64 / 2f64.powi(self.fine_bits as i32)
    }

    /// Largest exact value the configured widths can represent.
    pub fn max_value(&self) -> u64 {
        let total = self.coarse_bits + self.fine_bits;
        if total >= 64 {
            u64::MAX
        } else {
            (1u64 << total) - 1
        }
    }

    /// Number of digits needed to display the fine field, based on the
    /// maximum fine tick count.
    fn fine_digits(&self) -> usize {
        (1u128 << self.fine_bits).to_string().len()
    }

    /// Given a string representation of a clock as ticks-subticks,
    /// seconds.subseconds or just ticks, convert it into the 64-bit exact
    /// representation.
    ///
    /// Arguments
    /// ---------
    /// * `clock`: the clock string, of the form `<coarse>`,
    ///   `<coarse><ticks_sep><fine>` or `<coarse><fractional_sep><fraction>`.
    ///
    /// Return
    /// ------
    /// * The exact value, or [`FormatError::InvalidClockString`] when the
    ///   string does not conform to the configured format.
    pub fn parse(&self, clock: &str) -> Result<u64, SclkScetError> {
        let pattern = format!(
            "^[0-9]+(?:[{}{}][0-9]+)?$",
            regex::escape(&self.fractional_sep.to_string()),
            regex::escape(&self.ticks_sep.to_string()),
        );
        let regex = Regex::new(&pattern)
            .map_err(|_| FormatError::InvalidClockString(clock.to_string()))?;
        if !regex.is_match(clock) {
            return Err(FormatError::InvalidClockString(clock.to_string()).into());
        }

        let bad = || FormatError::InvalidClockString(clock.to_string());

        let (coarse, fine) = if let Some((head, fraction)) = clock.split_once(self.fractional_sep) {
            let coarse: u64 = head.parse().map_err(|_| bad())?;
            let digits: u64 = fraction.parse().map_err(|_| bad())?;
            let fraction = digits as f64 / 10f64.powi(fraction.len() as i32);
            (coarse, (fraction * self.fine_modulus as f64).round() as u64)
        } else if let Some((head, ticks)) = clock.split_once(self.ticks_sep) {
            let coarse: u64 = head.parse().map_err(|_| bad())?;
            let fine: u64 = ticks.parse().map_err(|_| bad())?;
            (coarse, fine)
        } else {
            (clock.parse().map_err(|_| bad())?, 0)
        };

        Ok(coarse * self.fine_modulus + fine)
    }

    /// Convert an exact value to the mission display string, either
    /// `coarse<ticks_sep>fine` with the fine field zero-padded, or
    /// `coarse<fractional_sep>fraction` when the fractional format is
    /// configured.
    pub fn format(&self, exact: u64) -> String {
        let value = self.unpack(exact);
        let digits = self.fine_digits();

        if self.use_fractional_format {
            let rounded = format!("{:.5}", self.to_float(exact));
            let mut fraction = rounded
                .split_once('.')
                .map(|(_, f)| f.to_string())
                .unwrap_or_default();
            while fraction.len() < digits {
                fraction.push('0');
            }
            format!("{}{}{}", value.coarse, self.fractional_sep, fraction)
        } else {
            format!(
                "{}{}{:0width$}",
                value.coarse,
                self.ticks_sep,
                value.fine,
                width = digits
            )
        }
    }
}

#[cfg(test)]
mod clock_test {
    use super::*;

    #[test]
    fn test_pack_example() {
        let sclk = CoarseFineEncoding::new(32, 16);
        let exact = sclk.pack(1000, 4096);
        assert_eq!(exact, 1000 * 65_536 + 4096);
        assert_eq!(exact, 65_540_096);
        assert_eq!(sclk.to_float(exact), 1000.0625);
    }

    #[test]
    fn test_unpack_round_trip() {
        let sclk = CoarseFineEncoding::new(32, 16);
        for coarse in [0u64, 1, 999, 65_535, 4_294_967_295] {
            for fine in [0u64, 1, 4096, 65_535] {
                let value = sclk.unpack(sclk.pack(coarse, fine));
                assert_eq!(value, ClockValue::new(coarse, fine));
            }
        }
    }

    #[test]
    fn test_seconds_only() {
        let sclk = CoarseFineEncoding::new(32, 16);
        assert_eq!(sclk.seconds_only(65_540_096), 1000);
    }

    #[test]
    fn test_parse_ticks() {
        let sclk = CoarseFineEncoding::new(32, 16);
        assert_eq!(sclk.parse("1000-4096").unwrap(), 65_540_096);
        assert_eq!(sclk.parse("1000-04096").unwrap(), 65_540_096);
        assert_eq!(sclk.parse("1000").unwrap(), 65_536_000);
    }

    #[test]
    fn test_parse_fractional() {
        let sclk = CoarseFineEncoding::new(32, 16);
        assert_eq!(sclk.parse("1000.0625").unwrap(), 65_540_096);
        assert_eq!(sclk.parse("0.5").unwrap(), 32_768);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let sclk = CoarseFineEncoding::new(32, 16);
        for bad in ["", "abc", "10:20", "1000-", "-5", "1.2.3"] {
            assert!(
                matches!(
                    sclk.parse(bad),
                    Err(SclkScetError::Format(FormatError::InvalidClockString(_)))
                ),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn test_format_ticks() {
        let sclk = CoarseFineEncoding::new(32, 16);
        assert_eq!(sclk.format(65_540_096), "1000-04096");
    }

    #[test]
    fn test_format_fractional() {
        let mut sclk = CoarseFineEncoding::new(32, 16);
        sclk.use_fractional_format = true;
        assert_eq!(sclk.format(65_540_096), "1000.06250");
    }

    #[test]
    fn test_max_value() {
        assert_eq!(CoarseFineEncoding::new(16, 16).max_value(), u32::MAX as u64);
        assert_eq!(CoarseFineEncoding::new(32, 32).max_value(), u64::MAX);
    }

    #[test]
    fn test_validate_rejects_oversize() {
        assert!(CoarseFineEncoding::new(40, 32).validate().is_err());
        assert!(CoarseFineEncoding::new(32, 16).validate().is_ok());
    }
}
