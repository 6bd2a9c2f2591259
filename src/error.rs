//! Error Types
//!
//! The timing and judgment core never fails at run time: degenerate numbers
//! are clamped and unknown chords are skipped. Errors only surface at the
//! edge, where charts and configuration are parsed from text.

use alloc::string::String;
use thiserror::Error;

/// Errors raised while turning text into a chart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    /// The progression contained no chord names at all.
    #[error("Chord progression is empty")]
    Empty,

    /// A `name:beats` entry carried a beat count that is not a number.
    #[error("Invalid beat count '{value}' for chord '{chord}'")]
    InvalidBeats { chord: String, value: String },

    /// An entry had a beat count but no chord name (e.g. `":4"`).
    #[error("Missing chord name in entry {index}")]
    MissingChord { index: usize },
}

/// Errors raised while loading engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A course name did not match any course in the library.
    #[error("Unknown course: {0}")]
    UnknownCourse(String),

    /// Scoring tiers must award strictly more points for better timing.
    #[error("Scoring tiers must be strictly decreasing: perfect={perfect}, great={great}, ok={ok}")]
    NonMonotonicScoring { perfect: u32, great: u32, ok: u32 },

    /// The chart could not be parsed.
    #[error(transparent)]
    Chart(#[from] ChartError),

    /// JSON decoding failed.
    #[cfg(feature = "alloc")]
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_chart_error_messages() {
        let err = ChartError::InvalidBeats {
            chord: "G".into(),
            value: "x".into(),
        };
        assert_eq!(err.to_string(), "Invalid beat count 'x' for chord 'G'");
        assert_eq!(ChartError::Empty.to_string(), "Chord progression is empty");
    }

    #[test]
    fn test_config_error_wraps_chart_error() {
        let err: ConfigError = ChartError::MissingChord { index: 2 }.into();
        assert_eq!(err.to_string(), "Missing chord name in entry 2");
    }
}
