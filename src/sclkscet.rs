//! # SclkScet: correlation table, clocks, and local solar time
//!
//! This module defines the [`SclkScetConverter`](crate::sclkscet::SclkScetConverter)
//! struct, the central façade that wires together:
//!
//! 1. **Mission configuration** ([`SclkScetConfig`](crate::config::SclkScetConfig))
//!    - clock bit layouts, display conventions, local solar time parameters.
//! 2. **Correlation table access** - lazy, cached handle over the mission
//!    sclkscet file ([`CorrelationTable`](crate::correlation::CorrelationTable)).
//! 3. **Time-base conversions** - SCLK ⇄ SCET via the correlation table, and
//!    SCET ⇄ LST via the configured local-time scale.
//!
//! The design emphasizes *lazy initialization* and *idempotent caching*:
//! - The correlation file is parsed on first use via
//!   [`OnceCell`](once_cell::sync::OnceCell), then reused. A failed parse is
//!   surfaced to the caller and retried only on the next explicit access.
//! - The configuration is validated eagerly at construction, so conversion
//!   calls only fail for data or input reasons.
//!
//! The converter is an explicit service object: construct it once at
//! application startup and pass it by reference to every caller. The table
//! snapshot is immutable, so all conversions take `&self` and are safe to call
//! concurrently without locking.
//!
//! ## Typical usage
//!
//! ```rust,no_run
//! use sclkscet::config::SclkScetConfig;
//! use sclkscet::sclkscet::SclkScetConverter;
//!
//! let converter =
//!     SclkScetConverter::new(SclkScetConfig::default(), "/gds/config/msl/sclkscet.76").unwrap();
//!
//! // On-demand: the correlation file is parsed only once and cached
//! let scet = converter.sclk_to_scet(397_540_000.0).unwrap();
//! let lst = converter.scet_to_lst(scet);
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use once_cell::sync::OnceCell;

use crate::clock::CoarseFineEncoding;
use crate::config::SclkScetConfig;
use crate::constants::{SclkSeconds, UnixSeconds, MS_PER_SECOND};
use crate::correlation::CorrelationTable;
use crate::lst::LstConverter;
use crate::sclkscet_errors::SclkScetError;
use crate::time_format::format_scet;

/// SCLK/SCET/LST conversion service for one mission.
#[derive(Debug)]
pub struct SclkScetConverter {
    config: SclkScetConfig,
    file: Utf8PathBuf,
    lst: LstConverter,
    table: OnceCell<CorrelationTable>,
}

impl SclkScetConverter {
    /// Construct a converter over an explicit correlation file.
    ///
    /// The configuration is validated here (clock bit widths, local-time
    /// constants, epoch string); the correlation file itself is **not** read
    /// yet. It is lazily parsed the first time a conversion or
    /// [`table`](Self::table) access needs it.
    ///
    /// Arguments
    /// -----------------
    /// * `config`: the mission time configuration.
    /// * `file`: path of the sclkscet correlation file.
    ///
    /// Return
    /// ----------
    /// * A new converter, or a [`SclkScetError`] when the configuration is
    ///   unusable.
    pub fn new(
        config: SclkScetConfig,
        file: impl Into<Utf8PathBuf>,
    ) -> Result<Self, SclkScetError> {
        config.sclk.validate()?;
        config.dvt.validate()?;
        let lst = LstConverter::from_config(&config)?;

        Ok(SclkScetConverter {
            config,
            file: file.into(),
            lst,
            table: OnceCell::new(),
        })
    }

    /// Construct a converter over the default mission correlation file,
    /// `<gds>/config/<mission>/sclkscet.<scid>`.
    ///
    /// See also
    /// ------------
    /// * [`SclkScetConfig::correlation_file_path`] – Default path resolution.
    pub fn from_config(config: SclkScetConfig) -> Result<Self, SclkScetError> {
        let file = config.correlation_file_path()?;
        Self::new(config, file)
    }

    /// Get the lazily-parsed correlation table.
    ///
    /// If this is the first call, the file is parsed and cached in an internal
    /// [`OnceCell`]. Subsequent calls return the same reference. A parse
    /// failure leaves the cache unpopulated, so the next call retries.
    ///
    /// Return
    /// ----------
    /// * `&CorrelationTable` on success, or the parse
    ///   [`SclkScetError`] otherwise.
    ///
    /// See also
    /// ------------
    /// * [`OnceCell::get_or_try_init`] – Lazy initialization helper.
    pub fn table(&self) -> Result<&CorrelationTable, SclkScetError> {
        self.table
            .get_or_try_init(|| CorrelationTable::from_file(&self.file))
    }

    /// Drop the cached table so the next access re-reads the file.
    pub fn invalidate(&mut self) {
        self.table.take();
    }

    /// The mission configuration this converter was built with.
    pub fn config(&self) -> &SclkScetConfig {
        &self.config
    }

    /// The correlation file path this converter reads from.
    pub fn correlation_file(&self) -> &Utf8Path {
        &self.file
    }

    /// The SCLK bit layout and display conventions.
    pub fn sclk_encoding(&self) -> &CoarseFineEncoding {
        &self.config.sclk
    }

    /// The DVT bit layout and display conventions.
    pub fn dvt_encoding(&self) -> &CoarseFineEncoding {
        &self.config.dvt
    }

    /// Convert a spacecraft clock reading into earth time.
    ///
    /// Arguments
    /// -----------------
    /// * `sclk`: J2000-based spacecraft clock seconds.
    ///
    /// Return
    /// ----------
    /// * Earth time in seconds since the Unix epoch.
    pub fn sclk_to_scet(&self, sclk: SclkSeconds) -> Result<UnixSeconds, SclkScetError> {
        self.table()?.sclk_to_scet(sclk)
    }

    /// Convert an earth time into a spacecraft clock reading.
    ///
    /// Arguments
    /// -----------------
    /// * `scet`: earth time in seconds since the Unix epoch.
    ///
    /// Return
    /// ----------
    /// * J2000-based spacecraft clock seconds, or an
    ///   [`OutOfRangeError`](crate::sclkscet_errors::OutOfRangeError) when the
    ///   input precedes the sclk zero epoch.
    pub fn scet_to_sclk(&self, scet: UnixSeconds) -> Result<SclkSeconds, SclkScetError> {
        self.table()?.scet_to_sclk(scet)
    }

    /// Convert a spacecraft clock reading into a formatted SCET string, using
    /// the configured DOY/ISO convention and subsecond precision.
    pub fn sclk_to_scet_string(&self, sclk: SclkSeconds) -> Result<String, SclkScetError> {
        let scet = self.sclk_to_scet(sclk)?;
        Ok(format_scet(
            (scet * MS_PER_SECOND).round() as i64,
            self.config.use_doy_format,
            self.config.scet_precision,
        ))
    }

    /// Convert an earth time to the local solar time string.
    ///
    /// A time before the local epoch yields the `{prefix}-0000M00:00:00.000`
    /// sentinel rather than a negative sol number.
    pub fn scet_to_lst(&self, scet: UnixSeconds) -> String {
        self.lst.scet_to_lst(scet * MS_PER_SECOND)
    }

    /// Convert a local solar time string back to earth time, in seconds since
    /// the Unix epoch.
    pub fn lst_to_scet(&self, lst: &str) -> Result<UnixSeconds, SclkScetError> {
        Ok(self.lst.lst_to_scet(lst)? / MS_PER_SECOND)
    }

    /// Convert a spacecraft clock reading to the local solar time string.
    pub fn sclk_to_lst(&self, sclk: SclkSeconds) -> Result<String, SclkScetError> {
        Ok(self.scet_to_lst(self.sclk_to_scet(sclk)?))
    }

    /// Convert a local solar time string to a spacecraft clock reading.
    pub fn lst_to_sclk(&self, lst: &str) -> Result<SclkSeconds, SclkScetError> {
        self.scet_to_sclk(self.lst_to_scet(lst)?)
    }

    /// Drift correction of the correlation entry governing the given clock
    /// value.
    pub fn dut(&self, sclk: SclkSeconds) -> Result<f64, SclkScetError> {
        self.table()?.dut(sclk)
    }

    /// Leap seconds accumulated between sclk zero and the given clock value,
    /// derived from the drift column of the correlation file.
    pub fn leap_seconds(&self, sclk: SclkSeconds) -> Result<f64, SclkScetError> {
        Ok(self.dut(sclk)? - self.dut(0.0)?)
    }

    /// Parse a SCLK display string into its 64-bit exact representation.
    pub fn parse_sclk(&self, sclk: &str) -> Result<u64, SclkScetError> {
        self.config.sclk.parse(sclk)
    }

    /// Format a 64-bit exact SCLK into the mission display string.
    pub fn format_sclk(&self, exact: u64) -> String {
        self.config.sclk.format(exact)
    }

    /// Parse a DVT display string into its 64-bit exact representation.
    pub fn parse_dvt(&self, dvt: &str) -> Result<u64, SclkScetError> {
        self.config.dvt.parse(dvt)
    }

    /// Format a 64-bit exact DVT into the mission display string.
    pub fn format_dvt(&self, exact: u64) -> String {
        self.config.dvt.format(exact)
    }
}

#[cfg(test)]
mod sclkscet_test {
    use super::*;
    use crate::sclkscet_errors::ConfigurationError;

    fn config() -> SclkScetConfig {
        SclkScetConfig {
            lst_epoch_scet: "2012-001T00:00:00.000".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_table_parse_failure_surfaces_lazily() {
        let converter = SclkScetConverter::new(config(), "/nonexistent/sclkscet.0").unwrap();
        assert!(matches!(
            converter.sclk_to_scet(0.0),
            Err(SclkScetError::Configuration(ConfigurationError::FileNotFound(_)))
        ));
    }

    #[test]
    fn test_bad_configuration_rejected_eagerly() {
        let bad = SclkScetConfig {
            lst_conversion_factor: 0.0,
            ..config()
        };
        assert!(SclkScetConverter::new(bad, "/tmp/sclkscet.0").is_err());
    }

    #[test]
    fn test_lst_paths_do_not_need_the_table() {
        let converter = SclkScetConverter::new(config(), "/nonexistent/sclkscet.0").unwrap();
        assert_eq!(converter.scet_to_lst(0.0), "SOL-0000M00:00:00.000");
        assert!(converter.lst_to_scet("SOL-0000M00:00:10.000").is_ok());
    }

    #[test]
    fn test_clock_helpers_use_configured_encodings() {
        let converter = SclkScetConverter::new(config(), "/nonexistent/sclkscet.0").unwrap();
        assert_eq!(converter.parse_sclk("1000-4096").unwrap(), 65_540_096);
        assert_eq!(converter.format_sclk(65_540_096), "1000-04096");
        assert_eq!(converter.parse_dvt("1-0").unwrap(), 65_536);
    }
}
