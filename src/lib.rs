pub mod clock;
pub mod config;
pub mod constants;
pub mod correlation;
pub mod lst;
pub mod sclkscet;
pub mod sclkscet_errors;
pub mod time_format;
