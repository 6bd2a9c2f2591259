//! Charts
//!
//! A chart is an ordered list of [`ScoreStep`]s. A step's `beats` is the gap
//! before the *next* step is scheduled, not how long its own chord rings.
//! The engine loops the chart indefinitely.

use crate::error::ChartError;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Shortest allowed gap between chord changes, in beats.
pub const MIN_STEP_BEATS: f64 = 0.5;
/// Longest allowed gap between chord changes, in beats.
pub const MAX_STEP_BEATS: f64 = 16.0;
/// Gap used when a step does not say.
pub const DEFAULT_STEP_BEATS: f64 = 2.0;

/// Clamp a beat gap into the playable range. Non-finite values fall back to
/// the default gap.
pub fn clamp_beats(beats: f64) -> f64 {
    if beats.is_finite() {
        beats.clamp(MIN_STEP_BEATS, MAX_STEP_BEATS)
    } else {
        DEFAULT_STEP_BEATS
    }
}

/// One chord change in a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "wasm", derive(tsify::Tsify))]
#[cfg_attr(feature = "wasm", tsify(into_wasm_abi, from_wasm_abi))]
pub struct ScoreStep {
    pub chord: String,
    #[serde(default = "default_beats")]
    pub beats: f64,
}

fn default_beats() -> f64 {
    DEFAULT_STEP_BEATS
}

impl ScoreStep {
    pub fn new(chord: impl Into<String>, beats: f64) -> Self {
        Self {
            chord: chord.into(),
            beats,
        }
    }

    /// Beat gap after clamping
    pub fn gap_beats(&self) -> f64 {
        clamp_beats(self.beats)
    }
}

/// An ordered, looping sequence of chord changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chart {
    steps: Vec<ScoreStep>,
}

impl Chart {
    pub fn new(steps: Vec<ScoreStep>) -> Self {
        Self { steps }
    }

    /// Parse a comma-separated progression such as `"C, G:4, Am, F:1.5"`.
    ///
    /// Each entry is `chord[:beats]`; missing beats default to
    /// [`DEFAULT_STEP_BEATS`] and every gap is clamped to
    /// [`MIN_STEP_BEATS`]..=[`MAX_STEP_BEATS`]. Empty entries are skipped.
    pub fn parse(progression: &str) -> Result<Self, ChartError> {
        let mut steps = Vec::new();

        for (index, entry) in progression.split(',').enumerate() {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            let (chord, beats) = match entry.split_once(':') {
                Some((chord, beats)) => {
                    let chord = chord.trim();
                    let beats = beats.trim();
                    if chord.is_empty() {
                        return Err(ChartError::MissingChord { index });
                    }
                    let value: f64 = beats.parse().map_err(|_| ChartError::InvalidBeats {
                        chord: chord.to_string(),
                        value: beats.to_string(),
                    })?;
                    (chord, clamp_beats(value))
                }
                None => (entry, DEFAULT_STEP_BEATS),
            };

            steps.push(ScoreStep::new(chord, beats));
        }

        if steps.is_empty() {
            return Err(ChartError::Empty);
        }

        Ok(Self { steps })
    }

    /// Step at a looping index. `None` only for an empty chart.
    pub fn step(&self, index: usize) -> Option<&ScoreStep> {
        if self.steps.is_empty() {
            None
        } else {
            self.steps.get(index % self.steps.len())
        }
    }

    pub fn steps(&self) -> &[ScoreStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Beats spanned by one pass through the chart
    pub fn total_beats(&self) -> f64 {
        self.steps.iter().map(ScoreStep::gap_beats).sum()
    }
}

impl From<Vec<ScoreStep>> for Chart {
    fn from(steps: Vec<ScoreStep>) -> Self {
        Self::new(steps)
    }
}
