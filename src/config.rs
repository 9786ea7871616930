//! # Mission time configuration
//!
//! This module defines [`SclkScetConfig`], the bundle of mission-specific time
//! constants consumed by the rest of the library. The values mirror what the
//! ground-data-system configuration supplies at startup: the clock bit
//! layouts, the SCET display conventions, the local-solar-time parameters and
//! the location of the correlation file.
//!
//! The configuration is read once, externally supplied, and treated as
//! immutable for the process lifetime. [`crate::sclkscet::SclkScetConverter`]
//! validates it eagerly at construction so that conversion calls only fail for
//! data or input reasons.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::clock::CoarseFineEncoding;
use crate::sclkscet_errors::{ConfigurationError, SclkScetError};

/// Mission time constants.
///
/// # Fields
///
/// * `sclk`, `dvt` - bit layouts and display conventions of the two
///   coarse-fine clocks carried in telemetry
/// * `use_doy_format`, `scet_precision` - SCET string output conventions
/// * `lst_prefix`, `lst_precision`, `lst_conversion_factor`, `sol_length_ms`,
///   `lst_epoch_scet` - local solar time parameters
/// * `gds_directory`, `mission`, `spacecraft_id` - used to locate the default
///   correlation file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SclkScetConfig {
    pub sclk: CoarseFineEncoding,
    pub dvt: CoarseFineEncoding,

    /// Emit SCET strings in DOY format (`YYYY-DDD`) instead of ISO.
    pub use_doy_format: bool,
    /// Subsecond digits in formatted SCET strings.
    pub scet_precision: u32,

    /// Prefix of the local solar time string, e.g. `SOL`.
    pub lst_prefix: String,
    /// Subsecond digits in formatted LST strings.
    pub lst_precision: u32,
    /// Earth seconds to local seconds multiplier.
    pub lst_conversion_factor: f64,
    /// Length of the local solar day in milliseconds.
    pub sol_length_ms: f64,
    /// SCET of local sol 0, as an ISO or DOY time string.
    pub lst_epoch_scet: String,

    /// Root of the ground-data-system configuration tree. When absent, the
    /// `CHILL_GDS` environment variable is consulted instead.
    pub gds_directory: Option<Utf8PathBuf>,
    /// Mission identifier used in the default correlation file path.
    pub mission: String,
    /// Spacecraft ID used in the default correlation file name.
    pub spacecraft_id: u32,
}

impl Default for SclkScetConfig {
    fn default() -> Self {
        SclkScetConfig {
            sclk: CoarseFineEncoding::new(32, 16),
            dvt: CoarseFineEncoding::new(32, 16),
            use_doy_format: true,
            scet_precision: 3,
            lst_prefix: "SOL".to_string(),
            lst_precision: 3,
            lst_conversion_factor: 1.0,
            sol_length_ms: 86_400_000.0,
            lst_epoch_scet: "1970-001T00:00:00.000".to_string(),
            gds_directory: None,
            mission: "generic".to_string(),
            spacecraft_id: 0,
        }
    }
}

impl SclkScetConfig {
    /// Path of the mission correlation file,
    /// `<gds>/config/<mission>/sclkscet.<scid>`.
    ///
    /// Return
    /// ------
    /// * The path built from `gds_directory` (or the `CHILL_GDS` environment
    ///   variable when unset), or a
    ///   [`ConfigurationError::InvalidConfiguration`] when neither is
    ///   available.
    pub fn correlation_file_path(&self) -> Result<Utf8PathBuf, SclkScetError> {
        let root = match &self.gds_directory {
            Some(path) => path.clone(),
            None => std::env::var("CHILL_GDS").map(Utf8PathBuf::from).map_err(|_| {
                ConfigurationError::InvalidConfiguration(
                    "gds_directory is unset and CHILL_GDS is not defined".to_string(),
                )
            })?,
        };

        Ok(root
            .join("config")
            .join(&self.mission)
            .join(format!("sclkscet.{}", self.spacecraft_id)))
    }

    /// Same as [`correlation_file_path`](Self::correlation_file_path) but with
    /// an explicit root, ignoring `gds_directory` and the environment.
    pub fn correlation_file_path_in(&self, root: &Utf8Path) -> Utf8PathBuf {
        root.join("config")
            .join(&self.mission)
            .join(format!("sclkscet.{}", self.spacecraft_id))
    }
}

#[cfg(test)]
mod config_test {
    use super::*;

    #[test]
    fn test_default_path_from_directory() {
        let config = SclkScetConfig {
            gds_directory: Some(Utf8PathBuf::from("/gds")),
            mission: "msl".to_string(),
            spacecraft_id: 76,
            ..Default::default()
        };
        assert_eq!(
            config.correlation_file_path().unwrap(),
            Utf8PathBuf::from("/gds/config/msl/sclkscet.76")
        );
    }

    #[test]
    fn test_explicit_root_path() {
        let config = SclkScetConfig {
            mission: "msl".to_string(),
            spacecraft_id: 76,
            ..Default::default()
        };
        assert_eq!(
            config.correlation_file_path_in(Utf8Path::new("/opt/ampcs")),
            Utf8PathBuf::from("/opt/ampcs/config/msl/sclkscet.76")
        );
    }
}
