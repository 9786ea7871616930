//! # Constants and type definitions for sclkscet
//!
//! This module centralizes the **epoch constants**, **unit conversions**, and
//! **common type aliases** used throughout the `sclkscet` library.
//!
//! ## Overview
//!
//! - The J2000 reference epoch that anchors the spacecraft clock time base
//! - Second/millisecond conversion factors
//! - Type aliases that make conversion signatures self-describing
//!
//! These definitions are used by all main modules, including the correlation
//! table, the clock encoding, and the local solar time conversions.

// -------------------------------------------------------------------------------------------------
// Epoch constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// Seconds since the Unix epoch for the J2000 reference epoch
/// (2000-001T11:58:55.816 UTC), the zero point of the spacecraft clock
/// time base used by correlation files.
pub const J2000_UNIX_SECONDS: f64 = 946_727_935.816;

/// Number of seconds in a minute
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Number of seconds in an hour
pub const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Number of seconds in an earth day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of milliseconds in an earth day
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Milliseconds per second
pub const MS_PER_SECOND: f64 = 1_000.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Spacecraft clock value in seconds, counted in the J2000-based time base
/// of the correlation table
pub type SclkSeconds = f64;
/// Earth time in seconds since the Unix epoch
pub type UnixSeconds = f64;
/// Earth time in milliseconds since the Unix epoch
pub type EpochMillis = f64;
/// A local solar day number counted from the mission local epoch
pub type Sol = u64;
