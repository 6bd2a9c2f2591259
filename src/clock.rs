//! Song Clock & Spawn Scheduler
//!
//! The song clock is a millisecond counter advanced by the real time between
//! animation frames. It only moves forward, and only while the frame loop is
//! active. The scheduler walks the chart in beat units, emitting each step
//! `spawn_ahead_beats` before it has to be played so its tokens have time to
//! travel to the hit line.

use crate::chart::Chart;
use crate::config::Timing;
use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Monotonic song position driven by frame timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SongClock {
    pos_ms: f64,
    baseline: Option<f64>,
}

impl SongClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current song position in ms
    pub fn pos_ms(&self) -> f64 {
        self.pos_ms
    }

    /// Advance to a frame timestamp and return the elapsed delta.
    ///
    /// The first frame after [`SongClock::rebase`] only establishes the
    /// baseline. Timestamps that go backwards advance nothing.
    pub fn advance(&mut self, timestamp_ms: f64) -> f64 {
        if !timestamp_ms.is_finite() {
            return 0.0;
        }

        let dt = match self.baseline {
            Some(last) => timestamp_ms - last,
            None => 0.0,
        };
        self.baseline = Some(timestamp_ms);

        if dt < 0.0 {
            tracing::warn!(dt, "frame timestamp went backwards, clamping delta to 0");
            return 0.0;
        }

        self.pos_ms += dt;
        dt
    }

    /// Forget the last frame timestamp so the next frame starts a fresh delta.
    pub fn rebase(&mut self) {
        self.baseline = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A chart step whose spawn time has come.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueStep {
    /// Absolute (non-wrapping) step index
    pub step_idx: usize,
    pub chord: String,
    /// Beat at which the chord should be struck
    pub target_beat: f64,
    pub target_time_ms: f64,
}

/// Beat-driven look-ahead scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnScheduler {
    next_spawn_beat: f64,
    step_idx: usize,
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_spawn_beat(&self) -> f64 {
        self.next_spawn_beat
    }

    pub fn step_idx(&self) -> usize {
        self.step_idx
    }

    /// Emit every step whose spawn beat is within the look-ahead of
    /// `current_beat`, advancing the schedule past them.
    pub fn poll(&mut self, chart: &Chart, timing: &Timing, current_beat: f64) -> Vec<DueStep> {
        let mut due = Vec::new();

        while self.next_spawn_beat <= current_beat + timing.spawn_ahead_beats {
            let Some(step) = chart.step(self.step_idx) else {
                break;
            };

            let target_beat = self.next_spawn_beat + timing.spawn_ahead_beats;
            due.push(DueStep {
                step_idx: self.step_idx,
                chord: step.chord.clone(),
                target_beat,
                target_time_ms: target_beat * timing.beat_ms,
            });

            self.step_idx += 1;
            self.next_spawn_beat += step.gap_beats();
        }

        due
    }

    /// Chord of the next step that has not been scheduled yet.
    pub fn upcoming<'a>(&self, chart: &'a Chart) -> Option<&'a str> {
        chart.step(self.step_idx).map(|s| s.chord.as_str())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ScoreStep;
    use crate::config::EngineConfig;
    use alloc::vec;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn two_step_chart() -> Chart {
        Chart::new(vec![ScoreStep::new("C", 2.0), ScoreStep::new("G", 2.0)])
    }

    #[test]
    fn test_clock_first_frame_sets_baseline() {
        let mut clock = SongClock::new();
        assert_eq!(clock.advance(1000.0), 0.0);
        assert_eq!(clock.advance(1016.0), 16.0);
        assert_eq!(clock.pos_ms(), 16.0);
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut clock = SongClock::new();
        clock.advance(100.0);
        clock.advance(200.0);
        assert_eq!(clock.advance(150.0), 0.0);
        assert_eq!(clock.pos_ms(), 100.0);
        assert_eq!(clock.advance(f64::NAN), 0.0);
        assert_eq!(clock.pos_ms(), 100.0);
    }

    #[test]
    fn test_clock_rebase_skips_gap() {
        let mut clock = SongClock::new();
        clock.advance(0.0);
        clock.advance(500.0);
        clock.rebase();
        // A long pause in wall time does not reach the song clock
        assert_eq!(clock.advance(60_000.0), 0.0);
        assert_eq!(clock.advance(60_010.0), 10.0);
        assert_eq!(clock.pos_ms(), 510.0);
    }

    #[test]
    fn test_scheduler_first_poll() {
        // bpm 120 => 500 ms per beat, 3 beats look-ahead
        let timing = EngineConfig::new().with_bpm(120.0).timing();
        let chart = two_step_chart();
        let mut scheduler = SpawnScheduler::new();

        let due = scheduler.poll(&chart, &timing, 0.0);
        // Beats 0 and 2 are within 0 + 3
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].chord, "C");
        assert_relative_eq!(due[0].target_time_ms, 1500.0);
        assert_eq!(due[1].chord, "G");
        assert_relative_eq!(due[1].target_time_ms, 2500.0);
        assert_eq!(scheduler.step_idx(), 2);
        assert_relative_eq!(scheduler.next_spawn_beat(), 4.0);
        assert_eq!(scheduler.upcoming(&chart), Some("C"));
    }

    #[test]
    fn test_scheduler_loops_chart() {
        let timing = EngineConfig::new().with_bpm(120.0).timing();
        let chart = two_step_chart();
        let mut scheduler = SpawnScheduler::new();

        let due = scheduler.poll(&chart, &timing, 5.0);
        let chords: Vec<&str> = due.iter().map(|d| d.chord.as_str()).collect();
        assert_eq!(chords, vec!["C", "G", "C", "G", "C"]);
        assert!(scheduler.poll(&chart, &timing, 5.0).is_empty());
    }

    #[test]
    fn test_scheduler_empty_chart() {
        let timing = Timing::default();
        let mut scheduler = SpawnScheduler::new();
        assert!(scheduler.poll(&Chart::default(), &timing, 100.0).is_empty());
        assert_eq!(scheduler.step_idx(), 0);
    }

    proptest! {
        #[test]
        fn prop_schedule_is_deterministic(
            bpm in 60.0f64..200.0,
            beats in proptest::collection::vec(0.1f64..20.0, 1..6),
            frames in proptest::collection::vec(1.0f64..40.0, 1..200),
        ) {
            let timing = EngineConfig::new().with_bpm(bpm).timing();
            let chart = Chart::new(
                beats.iter().enumerate().map(|(i, &b)| ScoreStep::new(alloc::format!("X{}", i), b)).collect(),
            );

            let run = || {
                let mut clock = SongClock::new();
                let mut scheduler = SpawnScheduler::new();
                let mut out = Vec::new();
                let mut ts = 0.0;
                for dt in &frames {
                    ts += dt;
                    clock.advance(ts);
                    for d in scheduler.poll(&chart, &timing, timing.beat_at(clock.pos_ms())) {
                        out.push((d.chord, d.target_time_ms));
                    }
                }
                out
            };

            let first = run();
            prop_assert!(!first.is_empty());
            prop_assert_eq!(first, run());
        }

        #[test]
        fn prop_poll_catches_up(bpm in 60.0f64..200.0, beat in 0.0f64..64.0) {
            let timing = EngineConfig::new().with_bpm(bpm).timing();
            let chart = two_step_chart();
            let mut scheduler = SpawnScheduler::new();
            let due = scheduler.poll(&chart, &timing, beat);
            prop_assert!(scheduler.next_spawn_beat() > beat + timing.spawn_ahead_beats);
            for pair in due.windows(2) {
                prop_assert!(pair[1].target_time_ms > pair[0].target_time_ms);
            }
        }
    }
}
