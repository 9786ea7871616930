//! # SCLK/SCET correlation table
//!
//! This module owns the parsed representation of a mission sclkscet file and
//! the interpolation arithmetic built on top of it:
//!
//! 1. **Loading** ([`CorrelationTable::from_file`] /
//!    [`CorrelationTable::from_text`]) - each data row carries a spacecraft
//!    clock value, an earth time, a drift correction and a clock rate. Header
//!    lines of the form `KEY=VALUE;` are collected as metadata; any other
//!    non-matching line is ignored.
//! 2. **Lookup** ([`CorrelationTable::entry_for_sclk`] /
//!    [`CorrelationTable::entry_for_scet`]) - a backward scan locating the
//!    entry whose interval contains a given clock or earth time.
//! 3. **Conversion** ([`CorrelationTable::sclk_to_scet`] /
//!    [`CorrelationTable::scet_to_sclk`]) - piecewise-linear interpolation
//!    between adjacent entries, with linear extrapolation beyond the first and
//!    last entries using the entry clock rate.
//!
//! The table is immutable once built, so every lookup and conversion is a pure
//! function over the snapshot and safe to call concurrently without locking.
//!
//! ## File format
//!
//! ```text
//! CCSD3ZF0000100000001NJPL3KS0L015$$MARK$$;
//! MISSION_NAME=MSL;
//! SPACECRAFT_ID=76;
//! CCSD3RE00000$$MARK$$NJPL3IF0M01300000001;
//! 0000000000.000 2000-001T11:58:55.816 64.184 1.00000000
//! 0031536000.000 2000-366T11:58:55.816 65.184 1.00000000
//! ```
//!
//! The four leading columns of a data row are significant; trailing
//! annotation columns are ignored.

use std::collections::HashMap;
use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{EpochMillis, SclkSeconds, UnixSeconds, J2000_UNIX_SECONDS, MS_PER_SECOND};
use crate::sclkscet_errors::{ConfigurationError, OutOfRangeError, SclkScetError};
use crate::time_format::{j2000_to_unix, parse_time_string};

/// A valid data row: decimal sclk, DOY earth time with milliseconds, decimal
/// drift, decimal rate. Anything after the rate column is ignored.
static ROW_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(\d*\.\d*)\s+(\d{4}-\d{3}T\d{2}:\d{2}:\d{2}\.\d{3})\s+(\d{2}\.\d{3})\s+(\d*\.\d*)",
    )
    .unwrap()
});

/// One row of the correlation table.
///
/// All clock values are seconds in the J2000-based time base of the file; the
/// earth time is carried both as the raw file text and as milliseconds since
/// the Unix epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationEntry {
    /// Spacecraft clock at the correlation point, J2000-based seconds.
    pub sclk: SclkSeconds,
    /// Earth time text as read from the file.
    pub scet: String,
    /// Earth time in milliseconds since the Unix epoch.
    pub scet_ms: i64,
    /// Accumulated clock drift/leap correction at this point, seconds.
    pub dut: f64,
    /// Earth seconds elapsed per spacecraft clock second, valid from this
    /// entry until the next one (or beyond the table ends).
    pub sclk_rate: f64,
    /// This is the first parsed row; backward extrapolation starts here.
    pub is_first: bool,
    /// This is the last parsed row; forward extrapolation starts here.
    pub is_last: bool,
}

impl fmt::Display for CorrelationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SCLK: {} SCET: {} DUT: {} RATE: {} FIRST: {} LAST: {}",
            self.sclk, self.scet, self.dut, self.sclk_rate, self.is_first, self.is_last
        )
    }
}

/// An ordered, immutable-after-construction correlation table.
#[derive(Debug, Clone)]
pub struct CorrelationTable {
    entries: Vec<CorrelationEntry>,
    metadata: HashMap<String, String>,
    source: Utf8PathBuf,
}

impl CorrelationTable {
    /// Parse a correlation file from disk.
    ///
    /// Arguments
    /// ---------
    /// * `path`: filesystem path of the sclkscet file.
    ///
    /// Return
    /// ------
    /// * The parsed table, or a [`ConfigurationError`] when the file does not
    ///   exist, cannot be read, contains no valid rows, or carries degenerate
    ///   or out-of-order rows.
    pub fn from_file(path: &Utf8Path) -> Result<Self, SclkScetError> {
        if !path.is_file() {
            return Err(ConfigurationError::FileNotFound(path.to_owned()).into());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::UnreadableFile {
                path: path.to_owned(),
                reason: e.to_string(),
            }
        })?;

        Self::from_text(&content, path.to_owned())
    }

    /// Parse correlation rows from in-memory text.
    ///
    /// Arguments
    /// ---------
    /// * `text`: the file content.
    /// * `source`: a label used in diagnostics, normally the file path.
    ///
    /// Return
    /// ------
    /// * The parsed table, under the same contract as
    ///   [`from_file`](Self::from_file).
    pub fn from_text(text: &str, source: impl Into<Utf8PathBuf>) -> Result<Self, SclkScetError> {
        let source = source.into();
        let mut entries: Vec<CorrelationEntry> = Vec::new();
        let mut metadata = HashMap::new();

        for (index, line) in text.lines().enumerate() {
            if let Some(caps) = ROW_REGEX.captures(line) {
                let number = |column: usize| -> Result<f64, SclkScetError> {
                    caps[column].parse().map_err(|_| {
                        ConfigurationError::MalformedRow {
                            line: index + 1,
                            value: caps[column].to_string(),
                        }
                        .into()
                    })
                };

                let scet = caps[2].to_string();
                let scet_ms = parse_time_string(&scet).map_err(|_| {
                    ConfigurationError::MalformedRow {
                        line: index + 1,
                        value: scet.clone(),
                    }
                })?;

                entries.push(CorrelationEntry {
                    sclk: number(1)?,
                    scet,
                    scet_ms,
                    dut: number(3)?,
                    sclk_rate: number(4)?,
                    is_first: false,
                    is_last: false,
                });
            } else if let Some(pair) = line.trim().strip_suffix(';') {
                if let Some((key, value)) = pair.split_once('=') {
                    metadata.insert(key.to_string(), value.to_string());
                }
            }
        }

        if entries.is_empty() {
            return Err(ConfigurationError::EmptyTable(source).into());
        }

        for (previous, current) in entries.iter().tuple_windows() {
            if current.sclk == previous.sclk || current.scet_ms == previous.scet_ms {
                return Err(ConfigurationError::DegenerateInterval(previous.sclk).into());
            }
            if current.sclk < previous.sclk || current.scet_ms < previous.scet_ms {
                return Err(ConfigurationError::UnorderedTable(current.sclk).into());
            }
        }

        if let Some(first) = entries.first_mut() {
            first.is_first = true;
        }
        if let Some(last) = entries.last_mut() {
            last.is_last = true;
        }

        debug!("loaded {} correlation entries from {}", entries.len(), source);

        Ok(CorrelationTable {
            entries,
            metadata,
            source,
        })
    }

    /// The parsed rows, ordered by ascending sclk.
    pub fn entries(&self) -> &[CorrelationEntry] {
        &self.entries
    }

    /// Metadata collected from the `KEY=VALUE;` header block of the file.
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// One metadata value by tag.
    pub fn metadata_value(&self, tag: &str) -> Option<&str> {
        self.metadata.get(tag).map(String::as_str)
    }

    /// The path (or label) the table was parsed from.
    pub fn source(&self) -> &Utf8Path {
        &self.source
    }

    fn index_for_sclk(&self, sclk: SclkSeconds) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        Some(
            self.entries
                .iter()
                .rposition(|entry| sclk >= entry.sclk)
                .unwrap_or(0),
        )
    }

    fn index_for_scet(&self, scet_ms: EpochMillis) -> Option<usize> {
        if self.entries.is_empty() || scet_ms / MS_PER_SECOND < J2000_UNIX_SECONDS {
            return None;
        }
        Some(
            self.entries
                .iter()
                .rposition(|entry| scet_ms >= entry.scet_ms as f64)
                .unwrap_or(0),
        )
    }

    /// Find the entry whose interval contains the given spacecraft clock
    /// value.
    ///
    /// The scan runs from the most recent entry backward and returns the first
    /// entry with `entry.sclk <= sclk`; exact equality binds to that entry. A
    /// value below the first entry (including a negative value) returns the
    /// first entry so that backward extrapolation applies.
    pub fn entry_for_sclk(&self, sclk: SclkSeconds) -> Option<&CorrelationEntry> {
        self.index_for_sclk(sclk).map(|index| &self.entries[index])
    }

    /// Find the entry whose interval contains the given earth time.
    ///
    /// Same backward scan as [`entry_for_sclk`](Self::entry_for_sclk), over
    /// the entry earth times. An earth time before the sclk zero epoch
    /// (J2000) returns `None`; a time after that epoch but before the first
    /// entry returns the first entry.
    pub fn entry_for_scet(&self, scet_ms: EpochMillis) -> Option<&CorrelationEntry> {
        self.index_for_scet(scet_ms).map(|index| &self.entries[index])
    }

    /// Convert a spacecraft clock reading into earth time.
    ///
    /// Arguments
    /// ---------
    /// * `sclk`: J2000-based spacecraft clock seconds.
    ///
    /// Return
    /// ------
    /// * Earth time in seconds since the Unix epoch. Values outside the table
    ///   coverage extrapolate linearly with the clock rate of the first or
    ///   last entry; interior values interpolate between the two surrounding
    ///   entries.
    pub fn sclk_to_scet(&self, sclk: SclkSeconds) -> Result<UnixSeconds, SclkScetError> {
        let index = self
            .index_for_sclk(sclk)
            .ok_or(OutOfRangeError::SclkNotCovered(sclk))?;
        let entry = &self.entries[index];

        let sclk_ms = j2000_to_unix(sclk) * MS_PER_SECOND;
        let sclk0_ms = j2000_to_unix(entry.sclk) * MS_PER_SECOND;
        let scet0_ms = entry.scet_ms as f64;

        let scet_ms = if (entry.is_first && sclk < entry.sclk) || entry.is_last {
            scet0_ms + (sclk_ms - sclk0_ms) * entry.sclk_rate
        } else {
            let next = &self.entries[index + 1];
            let sclk1_ms = j2000_to_unix(next.sclk) * MS_PER_SECOND;
            if sclk1_ms == sclk0_ms {
                return Err(ConfigurationError::DegenerateInterval(entry.sclk).into());
            }
            let fraction = (sclk_ms - sclk0_ms) / (sclk1_ms - sclk0_ms);
            scet0_ms + (next.scet_ms as f64 - scet0_ms) * fraction
        };

        Ok(scet_ms / MS_PER_SECOND)
    }

    /// Convert an earth time into a spacecraft clock reading.
    ///
    /// Arguments
    /// ---------
    /// * `scet`: earth time in seconds since the Unix epoch.
    ///
    /// Return
    /// ------
    /// * J2000-based spacecraft clock seconds, or
    ///   [`OutOfRangeError::ScetBeforeEpoch`] when the input precedes the sclk
    ///   zero epoch.
    pub fn scet_to_sclk(&self, scet: UnixSeconds) -> Result<SclkSeconds, SclkScetError> {
        let scet_ms = scet * MS_PER_SECOND;
        let index = self
            .index_for_scet(scet_ms)
            .ok_or(OutOfRangeError::ScetBeforeEpoch(scet))?;
        let entry = &self.entries[index];

        let scet0_ms = entry.scet_ms as f64;
        let sclk0_ms = entry.sclk * MS_PER_SECOND;

        let sclk_ms = if (entry.is_first && scet0_ms > scet_ms) || entry.is_last {
            if entry.sclk_rate == 0.0 {
                return Err(ConfigurationError::ZeroClockRate(entry.sclk).into());
            }
            sclk0_ms + (scet_ms - scet0_ms) / entry.sclk_rate
        } else {
            let next = &self.entries[index + 1];
            let scet1_ms = next.scet_ms as f64;
            if scet1_ms == scet0_ms {
                return Err(ConfigurationError::DegenerateInterval(entry.sclk).into());
            }
            let sclk1_ms = next.sclk * MS_PER_SECOND;
            sclk0_ms + (sclk1_ms - sclk0_ms) * ((scet_ms - scet0_ms) / (scet1_ms - scet0_ms))
        };

        Ok(sclk_ms / MS_PER_SECOND)
    }

    /// Drift correction of the entry governing the given clock value.
    pub fn dut(&self, sclk: SclkSeconds) -> Result<f64, SclkScetError> {
        self.entry_for_sclk(sclk)
            .map(|entry| entry.dut)
            .ok_or_else(|| OutOfRangeError::SclkNotCovered(sclk).into())
    }
}
