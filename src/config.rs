//! Engine Configuration
//!
//! [`EngineConfig`] mirrors the options a host passes to `reset`. Every field
//! is optional; [`EngineConfig::timing`] clamps what was given into a
//! [`Timing`] the engine can run on without further checks.

use crate::chart::Chart;
use crate::error::ConfigError;
use crate::judge::Judgment;
use serde::{Deserialize, Serialize};

#[cfg(feature = "alloc")]
use alloc::string::String;

pub const DEFAULT_BPM: u32 = 90;
pub const MIN_BPM: u32 = 60;
pub const MAX_BPM: u32 = 200;

pub const DEFAULT_FLOW_SPEED: f64 = 1.0;
pub const MIN_FLOW_SPEED: f64 = 0.7;
pub const MAX_FLOW_SPEED: f64 = 1.8;

pub const DEFAULT_HIT_WINDOW_MS: f64 = 140.0;
pub const MIN_HIT_WINDOW_MS: f64 = 60.0;
pub const MAX_HIT_WINDOW_MS: f64 = 280.0;

/// How far ahead of its target beat a chord event is spawned.
pub const DEFAULT_SPAWN_AHEAD_BEATS: f64 = 3.0;
pub const MIN_SPAWN_AHEAD_BEATS: f64 = 1.0;
pub const MAX_SPAWN_AHEAD_BEATS: f64 = 8.0;

/// Options accepted by `Engine::reset`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Beats per minute, clamped to 60..=200 and truncated to an integer
    pub bpm: Option<f64>,
    /// Visual travel speed multiplier, clamped to 0.7..=1.8
    pub flow_speed: Option<f64>,
    /// Judgment window half-width in ms, clamped to 60..=280 and truncated
    pub hit_window_ms: Option<f64>,
    /// Look-ahead in beats, clamped to 1..=8
    pub spawn_ahead_beats: Option<f64>,
    /// Chart to play; empty means "ask the renderer for its default"
    pub score_data: Chart,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bpm(mut self, bpm: f64) -> Self {
        self.bpm = Some(bpm);
        self
    }

    pub fn with_flow_speed(mut self, flow_speed: f64) -> Self {
        self.flow_speed = Some(flow_speed);
        self
    }

    pub fn with_hit_window_ms(mut self, hit_window_ms: f64) -> Self {
        self.hit_window_ms = Some(hit_window_ms);
        self
    }

    pub fn with_spawn_ahead_beats(mut self, beats: f64) -> Self {
        self.spawn_ahead_beats = Some(beats);
        self
    }

    pub fn with_chart(mut self, chart: impl Into<Chart>) -> Self {
        self.score_data = chart.into();
        self
    }

    /// Clamp the options into run-ready timing values.
    pub fn timing(&self) -> Timing {
        let bpm = clamp_or(self.bpm.map(libm::trunc), DEFAULT_BPM as f64, MIN_BPM as f64, MAX_BPM as f64);
        let flow_speed = clamp_or(self.flow_speed, DEFAULT_FLOW_SPEED, MIN_FLOW_SPEED, MAX_FLOW_SPEED);
        let hit_window_ms = clamp_or(
            self.hit_window_ms.map(libm::trunc),
            DEFAULT_HIT_WINDOW_MS,
            MIN_HIT_WINDOW_MS,
            MAX_HIT_WINDOW_MS,
        );
        let spawn_ahead_beats = clamp_or(
            self.spawn_ahead_beats,
            DEFAULT_SPAWN_AHEAD_BEATS,
            MIN_SPAWN_AHEAD_BEATS,
            MAX_SPAWN_AHEAD_BEATS,
        );

        Timing {
            bpm: bpm as u32,
            beat_ms: 60_000.0 / bpm,
            flow_speed,
            hit_window_ms,
            spawn_ahead_beats,
        }
    }

    /// Serialize to JSON string
    #[cfg(feature = "alloc")]
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON string
    #[cfg(feature = "alloc")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn clamp_or(value: Option<f64>, default: f64, min: f64, max: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(min, max),
        _ => default,
    }
}

/// Timing values fixed for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    pub bpm: u32,
    pub beat_ms: f64,
    pub flow_speed: f64,
    pub hit_window_ms: f64,
    pub spawn_ahead_beats: f64,
}

impl Timing {
    /// Time a token spends on screen between spawn and the hit line.
    ///
    /// Independent of the judgment window: `flow_speed` only changes how fast
    /// tokens appear to move.
    pub fn travel_ms(&self) -> f64 {
        (self.beat_ms * self.spawn_ahead_beats) / self.flow_speed
    }

    pub fn beat_at(&self, song_pos_ms: f64) -> f64 {
        song_pos_ms / self.beat_ms
    }
}

impl Default for Timing {
    fn default() -> Self {
        EngineConfig::default().timing()
    }
}

/// Points per tier and the combo multiplier.
///
/// Missing JSON keys take their default, so adapters may send only the
/// tier points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringConfig {
    pub perfect: u32,
    pub great: u32,
    pub ok: u32,
    /// Combo length per multiplier step
    pub combo_step: u32,
    /// Multiplier added per completed step
    pub combo_bonus: f64,
}

impl ScoringConfig {
    /// Reject tables where a better tier would not earn strictly more.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.perfect > self.great && self.great > self.ok && self.ok > 0 {
            Ok(())
        } else {
            Err(ConfigError::NonMonotonicScoring {
                perfect: self.perfect,
                great: self.great,
                ok: self.ok,
            })
        }
    }

    pub fn base_points(&self, judgment: Judgment) -> u32 {
        match judgment {
            Judgment::Perfect => self.perfect,
            Judgment::Great => self.great,
            Judgment::Ok => self.ok,
            Judgment::Miss => 0,
        }
    }

    /// `1 + floor(combo / step) * bonus`
    pub fn multiplier(&self, combo: u32) -> f64 {
        let step = self.combo_step.max(1);
        1.0 + libm::floor(combo as f64 / step as f64) * self.combo_bonus.max(0.0)
    }

    /// Points for a verdict at the given combo length, rounded.
    pub fn points(&self, judgment: Judgment, combo: u32) -> u32 {
        libm::round(self.base_points(judgment) as f64 * self.multiplier(combo)) as u32
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            perfect: 300,
            great: 200,
            ok: 120,
            combo_step: 10,
            combo_bonus: 0.2,
        }
    }
}

/// Hit-line geometry in renderer pixels. Tokens travel toward decreasing x.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    pub hit_x: f64,
    /// Distance from the hit line within which a token counts as ready
    pub ready_tolerance: f64,
    /// Overshoot after which an unhit token is marked missed
    pub miss_overshoot: f64,
    /// Overshoot after which a resolved token is released
    pub remove_overshoot: f64,
}

impl Geometry {
    pub fn with_hit_x(hit_x: f64) -> Self {
        Self {
            hit_x,
            ..Self::default()
        }
    }

    pub fn is_ready(&self, x: f64) -> bool {
        libm::fabs(x - self.hit_x) <= self.ready_tolerance
    }

    pub fn is_missed(&self, x: f64) -> bool {
        x < self.hit_x - self.miss_overshoot
    }

    pub fn is_gone(&self, x: f64) -> bool {
        x < self.hit_x - self.remove_overshoot
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            hit_x: 0.0,
            ready_tolerance: 10.0,
            miss_overshoot: 120.0,
            remove_overshoot: 170.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_timing() {
        let timing = EngineConfig::default().timing();
        assert_eq!(timing.bpm, 90);
        assert_relative_eq!(timing.beat_ms, 60_000.0 / 90.0);
        assert_eq!(timing.flow_speed, 1.0);
        assert_eq!(timing.hit_window_ms, 140.0);
        assert_eq!(timing.spawn_ahead_beats, 3.0);
    }

    #[test]
    fn test_timing_clamps() {
        let timing = EngineConfig::new()
            .with_bpm(500.0)
            .with_flow_speed(0.1)
            .with_hit_window_ms(10.0)
            .timing();
        assert_eq!(timing.bpm, 200);
        assert_eq!(timing.flow_speed, MIN_FLOW_SPEED);
        assert_eq!(timing.hit_window_ms, MIN_HIT_WINDOW_MS);

        let timing = EngineConfig::new()
            .with_bpm(f64::NAN)
            .with_hit_window_ms(150.9)
            .timing();
        assert_eq!(timing.bpm, DEFAULT_BPM);
        assert_eq!(timing.hit_window_ms, 150.0);
    }

    #[test]
    fn test_travel_ms() {
        let timing = EngineConfig::new().with_bpm(120.0).timing();
        assert_relative_eq!(timing.travel_ms(), 1500.0);

        let faster = EngineConfig::new().with_bpm(120.0).with_flow_speed(1.5).timing();
        assert_relative_eq!(faster.travel_ms(), 1000.0);
        // Flow speed never changes the judgment window
        assert_eq!(faster.hit_window_ms, timing.hit_window_ms);
    }

    #[test]
    fn test_scoring_multiplier() {
        let scoring = ScoringConfig::default();
        assert_relative_eq!(scoring.multiplier(0), 1.0);
        assert_relative_eq!(scoring.multiplier(9), 1.0);
        assert_relative_eq!(scoring.multiplier(10), 1.2);
        assert_relative_eq!(scoring.multiplier(25), 1.4);
        assert_eq!(scoring.points(Judgment::Perfect, 1), 300);
        assert_eq!(scoring.points(Judgment::Ok, 10), 144);
        assert_eq!(scoring.points(Judgment::Miss, 50), 0);
    }

    #[test]
    fn test_scoring_validation() {
        assert!(ScoringConfig::default().validate().is_ok());
        let flat = ScoringConfig {
            great: 300,
            ..ScoringConfig::default()
        };
        assert!(matches!(
            flat.validate(),
            Err(ConfigError::NonMonotonicScoring { .. })
        ));
    }

    #[test]
    fn test_geometry() {
        let geometry = Geometry::with_hit_x(100.0);
        assert!(geometry.is_ready(95.0));
        assert!(!geometry.is_ready(111.0));
        assert!(!geometry.is_missed(-19.0));
        assert!(geometry.is_missed(-21.0));
        assert!(geometry.is_gone(-71.0));
    }

    #[test]
    fn test_config_json() {
        let json = r#"{"bpm": 120, "flowSpeed": 1.2, "scoreData": [{"chord": "C", "beats": 2}, {"chord": "G"}]}"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.bpm, Some(120.0));
        assert_eq!(config.flow_speed, Some(1.2));
        assert_eq!(config.hit_window_ms, None);
        assert_eq!(config.score_data.len(), 2);
        assert_eq!(config.score_data.steps()[1].beats, 2.0);

        let back = EngineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);

        assert!(matches!(
            EngineConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_partial_scoring_json() {
        let scoring: ScoringConfig =
            serde_json::from_str(r#"{"perfect": 500, "great": 250, "ok": 100}"#).unwrap();
        assert_eq!(scoring.perfect, 500);
        assert_eq!(scoring.ok, 100);
        assert_eq!(scoring.combo_step, 10);
        assert_relative_eq!(scoring.combo_bonus, 0.2);
        assert!(scoring.validate().is_ok());
    }
}
