//! Pitch Estimation Boundary
//!
//! The tuner gate in front of the game asks a [`PitchEstimator`] for the
//! fundamental of a microphone buffer and compares it against the open
//! strings. Only the contract lives here; estimators are supplied by the host.

use crate::chord::{Lane, LANE_COUNT};
use serde::Serialize;

/// Lowest fundamental an estimator should report, in Hz.
pub const MIN_PLAUSIBLE_HZ: f32 = 50.0;
/// Highest fundamental an estimator should report, in Hz.
pub const MAX_PLAUSIBLE_HZ: f32 = 2000.0;

/// Estimates the fundamental frequency of a mono time-domain buffer.
pub trait PitchEstimator {
    /// `None` when the signal is too quiet or no period correlates strongly
    /// enough; otherwise a frequency within
    /// [`MIN_PLAUSIBLE_HZ`]..=[`MAX_PLAUSIBLE_HZ`].
    fn estimate(&mut self, buffer: &[f32], sample_rate: f32) -> Option<f32>;
}

impl<F> PitchEstimator for F
where
    F: FnMut(&[f32], f32) -> Option<f32>,
{
    fn estimate(&mut self, buffer: &[f32], sample_rate: f32) -> Option<f32> {
        self(buffer, sample_rate)
    }
}

/// Root-mean-square level of a buffer, the usual silence gate.
pub fn rms(buffer: &[f32]) -> f32 {
    if buffer.is_empty() {
        return 0.0;
    }
    let sum: f32 = buffer.iter().map(|s| s * s).sum();
    libm::sqrtf(sum / buffer.len() as f32)
}

/// Distance from `target_hz` in cents; positive means sharp.
pub fn cents_offset(freq_hz: f32, target_hz: f32) -> f32 {
    1200.0 * libm::log2f(freq_hz / target_hz)
}

/// One open string to tune.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TuningTarget {
    pub lane: Lane,
    /// Scientific pitch name
    pub note: &'static str,
    pub freq_hz: f32,
}

impl TuningTarget {
    /// Whether `freq_hz` is within `tolerance_cents` of this string.
    pub fn is_in_tune(&self, freq_hz: f32, tolerance_cents: f32) -> bool {
        libm::fabsf(cents_offset(freq_hz, self.freq_hz)) <= tolerance_cents
    }
}

/// Re-entrant GCEA tuning.
pub const STANDARD_TUNING: [TuningTarget; LANE_COUNT] = [
    TuningTarget {
        lane: Lane::G,
        note: "G4",
        freq_hz: 392.00,
    },
    TuningTarget {
        lane: Lane::C,
        note: "C4",
        freq_hz: 261.63,
    },
    TuningTarget {
        lane: Lane::E,
        note: "E4",
        freq_hz: 329.63,
    },
    TuningTarget {
        lane: Lane::A,
        note: "A4",
        freq_hz: 440.00,
    },
];

/// The string whose open pitch is nearest to `freq_hz`.
pub fn nearest_string(freq_hz: f32) -> &'static TuningTarget {
    let mut best = &STANDARD_TUNING[0];
    for target in &STANDARD_TUNING[1..] {
        if libm::fabsf(cents_offset(freq_hz, target.freq_hz))
            < libm::fabsf(cents_offset(freq_hz, best.freq_hz))
        {
            best = target;
        }
    }
    best
}
