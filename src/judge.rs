//! Judgment & Scoring
//!
//! A strum is judged by how far the song clock was from the nearest pending
//! chord event's target time, as a fraction of the hit window:
//!
//! | tier    | `|Δt| / window` |
//! |---------|-----------------|
//! | PERFECT | ≤ 0.45          |
//! | GREAT   | ≤ 0.85          |
//! | OK      | ≤ 1.00          |
//! | MISS    | otherwise       |
//!
//! Shrinking the window tightens every tier proportionally.

use crate::config::ScoringConfig;
use serde::{Deserialize, Serialize};

/// Fraction of the hit window that still counts as PERFECT.
pub const PERFECT_RATIO: f64 = 0.45;
/// Fraction of the hit window that still counts as GREAT.
pub const GREAT_RATIO: f64 = 0.85;

/// Quality of a single judged strum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Judgment {
    // Declared worst-to-best so `Ord` ranks quality.
    Miss,
    Ok,
    Great,
    Perfect,
}

impl Judgment {
    pub fn is_hit(self) -> bool {
        self != Judgment::Miss
    }

    /// Floating text shown for this verdict.
    pub fn label(self) -> &'static str {
        match self {
            Judgment::Perfect => "PERFECT✨",
            Judgment::Great => "GREAT!",
            Judgment::Ok => "OK",
            Judgment::Miss => "MISS…",
        }
    }
}

/// Judge a timing error against a hit window half-width.
pub fn judge(delta_ms: f64, hit_window_ms: f64) -> Judgment {
    let ad = libm::fabs(delta_ms);
    if ad <= hit_window_ms * PERFECT_RATIO {
        Judgment::Perfect
    } else if ad <= hit_window_ms * GREAT_RATIO {
        Judgment::Great
    } else if ad <= hit_window_ms {
        Judgment::Ok
    } else {
        Judgment::Miss
    }
}

/// Running score and combo.
///
/// `combo` is always the length of the trailing run of non-MISS verdicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub score: u64,
    pub combo: u32,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a verdict and return the points it earned.
    ///
    /// The multiplier uses the combo length including this hit.
    pub fn record(&mut self, judgment: Judgment, scoring: &ScoringConfig) -> u32 {
        if judgment.is_hit() {
            self.combo += 1;
            let points = scoring.points(judgment, self.combo);
            self.score += points as u64;
            points
        } else {
            self.combo = 0;
            0
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
