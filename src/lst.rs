//! # Local solar time
//!
//! Conversion between earth time (SCET) and the mission "local solar time"
//! string, `SOL-<sol>M<HH:MM:SS.fff>`. The sol number counts local solar days
//! from a mission-defined earth epoch; the time of day runs on local seconds,
//! derived from earth seconds through a fixed conversion factor.
//!
//! An earth time before the local epoch produces the sentinel
//! `SOL-0000M00:00:00.000` rather than a negative sol number. Downstream
//! display consumers rely on that sentinel, so it is part of the contract
//! here, not an error.

use regex::Regex;

use crate::config::SclkScetConfig;
use crate::constants::{EpochMillis, MS_PER_SECOND, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
use crate::sclkscet_errors::{ConfigurationError, FormatError, SclkScetError};
use crate::time_format::{format_hms, parse_time_string};

/// Earth-time to local-solar-time converter for one mission configuration.
///
/// Built once from [`SclkScetConfig`]; the LST validation regex is compiled at
/// construction and reused for every parse.
#[derive(Debug, Clone)]
pub struct LstConverter {
    prefix: String,
    precision: u32,
    conversion_factor: f64,
    sol_length_ms: f64,
    epoch_scet_ms: f64,
    pattern: Regex,
}

impl LstConverter {
    /// Build the converter, validating the local-time configuration.
    ///
    /// Return
    /// ------
    /// * The converter, or a [`ConfigurationError`] when the conversion
    ///   factor or sol length is not positive, or the configured epoch SCET
    ///   does not parse.
    pub fn from_config(config: &SclkScetConfig) -> Result<Self, SclkScetError> {
        if !(config.lst_conversion_factor > 0.0) {
            return Err(ConfigurationError::InvalidConfiguration(
                "lst_conversion_factor must be positive".to_string(),
            )
            .into());
        }
        if !(config.sol_length_ms > 0.0) {
            return Err(ConfigurationError::InvalidConfiguration(
                "sol_length_ms must be positive".to_string(),
            )
            .into());
        }

        let epoch_scet_ms = parse_time_string(&config.lst_epoch_scet).map_err(|_| {
            ConfigurationError::InvalidConfiguration(format!(
                "lst_epoch_scet '{}' is not a valid time string",
                config.lst_epoch_scet
            ))
        })? as f64;

        let pattern = Regex::new(&format!(
            r"(?i)^{}[- ](?P<sol>\d{{1,5}})[ mM](?P<hours>\d{{2}}):(?P<minutes>\d{{2}}):(?P<seconds>\d{{2}}\.?\d{{0,6}})$",
            regex::escape(&config.lst_prefix)
        ))
        .map_err(|_| {
            ConfigurationError::InvalidConfiguration("lst_prefix is not usable".to_string())
        })?;

        Ok(LstConverter {
            prefix: config.lst_prefix.clone(),
            precision: config.lst_precision,
            conversion_factor: config.lst_conversion_factor,
            sol_length_ms: config.sol_length_ms,
            epoch_scet_ms,
            pattern,
        })
    }

    /// Earth time of local sol 0, milliseconds since the Unix epoch.
    pub fn epoch_scet_ms(&self) -> f64 {
        self.epoch_scet_ms
    }

    /// Convert an earth time to the local solar time string.
    ///
    /// Arguments
    /// ---------
    /// * `scet_ms`: earth time in milliseconds since the Unix epoch.
    ///
    /// Return
    /// ------
    /// * `{prefix}-{sol:04}M{HH:MM:SS.fff}` with the configured subsecond
    ///   precision. A time before the local epoch yields the zero sentinel
    ///   instead of a negative sol.
    pub fn scet_to_lst(&self, scet_ms: EpochMillis) -> String {
        let local_ms = (scet_ms - self.epoch_scet_ms) * self.conversion_factor;

        let sol = (local_ms / self.sol_length_ms).floor();
        let remainder_ms = (local_ms - sol * self.sol_length_ms).floor();

        if sol < 0.0 {
            if self.precision == 0 {
                return format!("{}-0000M00:00:00", self.prefix);
            }
            return format!(
                "{}-0000M00:00:00.{}",
                self.prefix,
                "0".repeat(self.precision as usize)
            );
        }

        format!(
            "{}-{:04}M{}",
            self.prefix,
            sol as u64,
            format_hms(remainder_ms / MS_PER_SECOND, self.precision)
        )
    }

    /// Convert a local solar time string back to earth time.
    ///
    /// Arguments
    /// ---------
    /// * `lst`: a string of the shape `{prefix}-{sol}M{HH:MM:SS[.ffffff]}`.
    ///   The prefix match is case-insensitive and the sol separators may be
    ///   spaces.
    ///
    /// Return
    /// ------
    /// * Earth time in milliseconds since the Unix epoch, or
    ///   [`FormatError::InvalidLstString`] when the string does not match.
    pub fn lst_to_scet(&self, lst: &str) -> Result<EpochMillis, SclkScetError> {
        let bad = || FormatError::InvalidLstString(lst.to_string());

        let caps = self.pattern.captures(lst.trim()).ok_or_else(bad)?;

        let sol: f64 = caps["sol"].parse().map_err(|_| bad())?;
        let hours: f64 = caps["hours"].parse().map_err(|_| bad())?;
        let minutes: f64 = caps["minutes"].parse().map_err(|_| bad())?;
        let seconds: f64 = caps["seconds"].parse().map_err(|_| bad())?;

        let local_seconds = hours * SECONDS_PER_HOUR + minutes * SECONDS_PER_MINUTE + seconds;
        let local_ms = self.sol_length_ms * sol + local_seconds * MS_PER_SECOND;
        let earth_ms = local_ms / self.conversion_factor;

        Ok(self.epoch_scet_ms + earth_ms)
    }
}

#[cfg(test)]
mod lst_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    // 2012-001T00:00:00.000 as milliseconds since the Unix epoch
    const EPOCH_MS: f64 = 1_325_376_000_000.0;

    fn converter(factor: f64) -> LstConverter {
        let config = SclkScetConfig {
            lst_epoch_scet: "2012-001T00:00:00.000".to_string(),
            lst_conversion_factor: factor,
            ..Default::default()
        };
        LstConverter::from_config(&config).unwrap()
    }

    #[test]
    fn test_scet_to_lst() {
        let lst = converter(1.0);
        assert_eq!(lst.scet_to_lst(EPOCH_MS), "SOL-0000M00:00:00.000");
        assert_eq!(lst.scet_to_lst(EPOCH_MS + 3_661_250.0), "SOL-0000M01:01:01.250");
        assert_eq!(
            lst.scet_to_lst(EPOCH_MS + 86_400_000.0 + 3_723_500.0),
            "SOL-0001M01:02:03.500"
        );
    }

    #[test]
    fn test_negative_sol_sentinel() {
        let lst = converter(1.0);
        assert_eq!(lst.scet_to_lst(EPOCH_MS - 1.0), "SOL-0000M00:00:00.000");
        assert_eq!(lst.scet_to_lst(0.0), "SOL-0000M00:00:00.000");
    }

    #[test]
    fn test_conversion_factor_scales_local_time() {
        let lst = converter(0.5);
        // two earth days shrink to one local day
        assert_eq!(
            lst.scet_to_lst(EPOCH_MS + 2.0 * 86_400_000.0),
            "SOL-0001M00:00:00.000"
        );
    }

    #[test]
    fn test_lst_to_scet() {
        let lst = converter(1.0);
        let ms = lst.lst_to_scet("SOL-0001M01:02:03.500").unwrap();
        assert_abs_diff_eq!(ms, EPOCH_MS + 90_123_500.0, epsilon = 1e-3);
    }

    #[test]
    fn test_lst_to_scet_accepts_loose_shapes() {
        let lst = converter(1.0);
        let reference = lst.lst_to_scet("SOL-0012M01:02:03").unwrap();
        assert_abs_diff_eq!(lst.lst_to_scet("sol-0012m01:02:03").unwrap(), reference);
        assert_abs_diff_eq!(lst.lst_to_scet("SOL 12 01:02:03").unwrap(), reference);
    }

    #[test]
    fn test_lst_round_trip() {
        let lst = converter(0.5);
        let scet_ms = EPOCH_MS + 123_456_789.0;
        let recovered = lst.lst_to_scet(&lst.scet_to_lst(scet_ms)).unwrap();
        // precision is limited by the formatted subsecond digits
        assert_abs_diff_eq!(recovered, scet_ms, epsilon = 2.0);
    }

    #[test]
    fn test_invalid_lst_rejected() {
        let lst = converter(1.0);
        for bad in ["SOL-1", "MARS-0001M01:02:03", "SOL-0001T01:02:03", "01:02:03"] {
            assert!(
                matches!(
                    lst.lst_to_scet(bad),
                    Err(SclkScetError::Format(FormatError::InvalidLstString(_)))
                ),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn test_bad_configuration_rejected() {
        let config = SclkScetConfig {
            lst_conversion_factor: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            LstConverter::from_config(&config),
            Err(SclkScetError::Configuration(ConfigurationError::InvalidConfiguration(_)))
        ));

        let config = SclkScetConfig {
            lst_epoch_scet: "whenever".to_string(),
            ..Default::default()
        };
        assert!(LstConverter::from_config(&config).is_err());
    }
}
