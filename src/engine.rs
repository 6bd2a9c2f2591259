//! Rhythm Engine
//!
//! [`Engine`] owns the song clock, the spawn schedule, every live token and
//! chord event, and the score. It is driven from outside by two entry points:
//! [`Engine::tick`] once per animation frame and [`Engine::handle_input`]
//! whenever the player acts. Both run to completion on the caller's thread
//! and report everything visible through the [`Renderer`].
//!
//! Within one tick the order is fixed:
//!
//! 1. advance the clock and spawn every chart step that has come due
//! 2. move, render and reclassify every live token (ready, missed, gone)
//! 3. expire pending events that slipped past their hit window
//! 4. report whether any token is ready
//! 5. drop resolved events that have long scrolled away
//!
//! so a token spawned this frame is positioned in the same frame.

use crate::chart::Chart;
use crate::clock::{DueStep, SongClock, SpawnScheduler};
use crate::config::{EngineConfig, Geometry, ScoringConfig, Timing};
use crate::judge::{judge, Judgment, ScoreBoard};
use crate::renderer::{HudState, Renderer, SpawnRequest};
use crate::token::{ChordEvent, EventId, Resolution, Token, TokenId};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// Resolved events are kept this many hit windows past their target.
pub const RETAIN_WINDOWS: f64 = 4.0;

/// Where the engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    /// After construction or reset; the clock is at zero
    #[default]
    Idle,
    Running,
    /// Clock frozen; resumes where it stopped
    Paused,
}

/// Player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "type")]
#[cfg_attr(feature = "wasm", derive(tsify::Tsify))]
#[cfg_attr(feature = "wasm", tsify(into_wasm_abi, from_wasm_abi))]
pub enum Action {
    Start,
    PauseToggle,
    Strum,
}

/// What a strum did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum StrumOutcome {
    /// Not running, or paused
    Ignored,
    /// Nothing left to hit
    NoTarget,
    /// Nearest event was outside the window; it stays pending
    Miss { event: EventId, delta_ms: f64 },
    Hit {
        event: EventId,
        judgment: Judgment,
        delta_ms: f64,
        points: u32,
    },
}

impl StrumOutcome {
    pub fn judgment(&self) -> Option<Judgment> {
        match self {
            StrumOutcome::Hit { judgment, .. } => Some(*judgment),
            StrumOutcome::Miss { .. } => Some(Judgment::Miss),
            _ => None,
        }
    }

    pub fn points(&self) -> Option<u32> {
        match self {
            StrumOutcome::Hit { points, .. } => Some(*points),
            _ => None,
        }
    }
}

/// Serializable view of the engine's internals, for debugging overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub run_state: RunState,
    pub song_pos_ms: f64,
    pub bpm: u32,
    pub flow_speed: f64,
    pub hit_window_ms: f64,
    pub beat_ms: f64,
    pub score: u64,
    pub combo: u32,
    pub step_idx: usize,
    pub next_spawn_beat: f64,
    pub spawn_ahead_beats: f64,
    pub tokens_count: usize,
    pub events_count: usize,
}

/// The timing and judgment core.
pub struct Engine<R: Renderer> {
    renderer: R,
    timing: Timing,
    scoring: ScoringConfig,
    geometry: Geometry,
    chart: Chart,
    clock: SongClock,
    scheduler: SpawnScheduler,
    board: ScoreBoard,
    state: RunState,
    /// Whether the host should keep delivering frames
    frame_loop: bool,
    tokens: SlotMap<TokenId, Token<R::Handle>>,
    /// Live token ids in spawn order
    order: Vec<TokenId>,
    events: Vec<ChordEvent>,
    next_event_id: u64,
    now_ready: bool,
}

impl<R: Renderer> Engine<R> {
    /// Create an idle engine with default timing and the renderer's chart.
    ///
    /// No callbacks fire until the first [`Engine::reset`].
    pub fn new(renderer: R) -> Self {
        let geometry = renderer.geometry();
        let scoring = checked_scoring(renderer.scoring());
        let chart = renderer.default_chart();

        Self {
            renderer,
            timing: Timing::default(),
            scoring,
            geometry,
            chart,
            clock: SongClock::new(),
            scheduler: SpawnScheduler::new(),
            board: ScoreBoard::new(),
            state: RunState::Idle,
            frame_loop: false,
            tokens: SlotMap::with_key(),
            order: Vec::new(),
            events: Vec::new(),
            next_event_id: 1,
            now_ready: false,
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Return to `Idle` with a fresh configuration. Legal from any state.
    ///
    /// Every live token is handed to [`Renderer::remove_token`] before the
    /// engine forgets it.
    pub fn reset(&mut self, config: &EngineConfig) {
        self.frame_loop = false;
        self.state = RunState::Idle;
        self.board.reset();

        self.timing = config.timing();
        self.geometry = self.renderer.geometry();
        self.scoring = checked_scoring(self.renderer.scoring());

        self.chart = if config.score_data.is_empty() {
            tracing::warn!("empty chart, using the renderer's default");
            self.renderer.default_chart()
        } else {
            config.score_data.clone()
        };
        if self.chart.is_empty() {
            tracing::warn!("no chart and no default chart, nothing will spawn");
        }

        self.scheduler.reset();
        self.events.clear();
        self.next_event_id = 1;

        for id in self.order.drain(..) {
            if let Some(token) = self.tokens.remove(id) {
                self.renderer.remove_token(&token);
            }
        }
        self.tokens.clear();

        self.clock.reset();
        self.now_ready = false;

        tracing::debug!(
            bpm = self.timing.bpm,
            hit_window_ms = self.timing.hit_window_ms,
            steps = self.chart.len(),
            "engine reset"
        );

        self.emit_hud();
        self.renderer.on_run(false);
        self.emit_next_chord();
        self.renderer.on_float("READY!");
    }

    /// Start the run. No-op unless idle.
    pub fn start(&mut self) {
        if self.state != RunState::Idle {
            return;
        }
        self.state = RunState::Running;
        self.clock.rebase();
        self.frame_loop = true;
        tracing::debug!("engine started");

        self.emit_hud();
        self.renderer.on_run(true);
        self.renderer.on_float("START!");
    }

    /// Flip between running and paused. No-op while idle.
    ///
    /// Resuming forgets the last frame timestamp, so the wall time spent
    /// paused never reaches the song clock. The first frame after a resume
    /// only re-establishes the baseline: the interval between the resume and
    /// that frame is not counted, which leaves the song clock up to one
    /// frame behind wall time for the rest of the run.
    pub fn toggle_pause(&mut self) {
        match self.state {
            RunState::Idle => return,
            RunState::Running => {
                self.state = RunState::Paused;
                self.frame_loop = false;
            }
            RunState::Paused => {
                self.state = RunState::Running;
                self.clock.rebase();
                self.frame_loop = true;
            }
        }
        tracing::debug!(state = ?self.state, "pause toggled");

        self.emit_hud();
        self.renderer.on_run(self.state == RunState::Running);
    }

    /// Dispatch one input action. Only `Strum` has an outcome.
    pub fn handle_input(&mut self, action: Action) -> Option<StrumOutcome> {
        match action {
            Action::Start => {
                self.start();
                None
            }
            Action::PauseToggle => {
                self.toggle_pause();
                None
            }
            Action::Strum => Some(self.strum()),
        }
    }

    /// Judge a strum against the pending event nearest in time.
    ///
    /// An out-of-window strum is a MISS that resets the combo but leaves the
    /// event pending, so the player can still hit it.
    pub fn strum(&mut self) -> StrumOutcome {
        self.renderer.on_flash_pads();

        if self.state != RunState::Running {
            self.renderer.on_float("STRUM");
            return StrumOutcome::Ignored;
        }

        let pos = self.clock.pos_ms();
        let Some(idx) = self.nearest_pending(pos) else {
            self.renderer.on_float("STRUM");
            return StrumOutcome::NoTarget;
        };

        let event_id = self.events[idx].id;
        let delta_ms = self.events[idx].delta_ms(pos);
        let judgment = judge(delta_ms, self.timing.hit_window_ms);

        if !judgment.is_hit() {
            self.board.record(judgment, &self.scoring);
            self.renderer.on_float(judgment.label());
            self.emit_hud();
            tracing::debug!(event = event_id.0, delta_ms, "strum missed");
            return StrumOutcome::Miss {
                event: event_id,
                delta_ms,
            };
        }

        let event = &mut self.events[idx];
        event.resolution = Resolution::Hit { judgment };
        for &id in &event.tokens {
            if let Some(token) = self.tokens.get_mut(id) {
                // Already shown as missed
                if token.hit {
                    continue;
                }
                token.hit = true;
                token.ready = false;
                self.renderer.on_token_hit(token);
            }
        }

        let points = self.board.record(judgment, &self.scoring);
        self.renderer.on_float(judgment.label());
        self.emit_hud();
        self.emit_next_chord();
        tracing::debug!(event = event_id.0, delta_ms, ?judgment, points, "strum hit");

        StrumOutcome::Hit {
            event: event_id,
            judgment,
            delta_ms,
            points,
        }
    }

    // =========================================================================
    // Frame loop
    // =========================================================================

    /// Advance one animation frame to `timestamp_ms`.
    ///
    /// Returns whether the host should request another frame. Frames
    /// delivered while idle or paused do nothing.
    pub fn tick(&mut self, timestamp_ms: f64) -> bool {
        if !self.frame_loop || self.state != RunState::Running {
            return false;
        }

        self.clock.advance(timestamp_ms);
        let pos = self.clock.pos_ms();

        let due = self
            .scheduler
            .poll(&self.chart, &self.timing, self.timing.beat_at(pos));
        for step in &due {
            self.spawn_event(step);
            let next = self
                .chart
                .step(step.step_idx + 1)
                .map_or("-", |s| s.chord.as_str());
            self.renderer.on_next_chord(next);
        }

        self.now_ready = self.update_tokens(pos);
        self.expire_events(pos);
        self.renderer.on_now_ready(self.now_ready);
        self.compact_events(pos);

        tracing::trace!(
            pos,
            spawned = due.len(),
            tokens = self.tokens.len(),
            events = self.events.len(),
            "tick"
        );
        true
    }

    fn spawn_event(&mut self, step: &DueStep) {
        let Some(def) = self.renderer.chord_def(&step.chord) else {
            tracing::warn!(chord = %step.chord, step = step.step_idx, "unknown chord, skipping step");
            return;
        };

        let id = EventId(self.next_event_id);
        self.next_event_id += 1;
        let travel_ms = self.timing.travel_ms();
        let pos = self.clock.pos_ms();
        let mut event = ChordEvent::new(id, step.chord.clone(), step.target_time_ms);

        for (lane, fret, finger) in def.fretted() {
            let request = SpawnRequest {
                lane_index: lane.index(),
                lane,
                fret,
                finger,
                chord: &step.chord,
                chord_event_id: id,
                target_time_ms: step.target_time_ms,
                travel_ms,
            };
            let Some(spawned) = self.renderer.spawn_token(&request) else {
                continue;
            };

            let mut token = Token {
                lane,
                fret,
                finger,
                chord_event_id: id,
                target_time_ms: step.target_time_ms,
                travel_ms,
                anchors: spawned.anchors,
                hit: false,
                ready: false,
                x: 0.0,
                handle: spawned.handle,
            };
            token.x = token.position_at(pos);

            let token_id = self.tokens.insert(token);
            self.order.push(token_id);
            event.tokens.push(token_id);
        }

        tracing::debug!(
            event = id.0,
            chord = %step.chord,
            target_time_ms = step.target_time_ms,
            tokens = event.tokens.len(),
            "chord event spawned"
        );
        self.events.push(event);
    }

    /// Position every live token and reclassify it. Returns whether any
    /// unresolved token sits on the hit line.
    fn update_tokens(&mut self, pos: f64) -> bool {
        let geometry = self.geometry;
        let renderer = &mut self.renderer;
        let tokens = &mut self.tokens;
        let mut any_ready = false;

        self.order.retain(|&id| {
            let Some(token) = tokens.get_mut(id) else {
                return false;
            };
            if !renderer.is_token_alive(token) {
                tokens.remove(id);
                return false;
            }

            let x = token.position_at(pos);
            token.x = x;
            renderer.render_token(token, x);

            if !token.hit && geometry.is_ready(x) {
                any_ready = true;
                if !token.ready {
                    token.ready = true;
                    renderer.on_token_ready(token, true);
                }
            } else if token.ready {
                token.ready = false;
                renderer.on_token_ready(token, false);
            }

            if !token.hit && geometry.is_missed(x) {
                token.hit = true;
                token.ready = false;
                renderer.on_token_miss(token);
            }

            if token.hit && geometry.is_gone(x) {
                renderer.remove_token(token);
                tokens.remove(id);
                return false;
            }

            true
        });

        any_ready
    }

    /// Resolve pending events that are later than the hit window as misses.
    fn expire_events(&mut self, pos: f64) {
        let window = self.timing.hit_window_ms;
        let mut expired = 0;

        for event in self.events.iter_mut().filter(|e| e.is_pending()) {
            if event.delta_ms(pos) > window {
                event.resolution = Resolution::Missed;
                expired += 1;
                tracing::trace!(event = event.id.0, "chord event expired");
            }
        }

        for _ in 0..expired {
            self.board.record(Judgment::Miss, &self.scoring);
            self.renderer.on_float(Judgment::Miss.label());
        }
        if expired > 0 {
            self.emit_hud();
        }
    }

    fn compact_events(&mut self, pos: f64) {
        let horizon = self.timing.hit_window_ms * RETAIN_WINDOWS;
        let tokens = &self.tokens;
        self.events.retain(|event| {
            event.is_pending()
                || event.delta_ms(pos) <= horizon
                || event.tokens.iter().any(|&id| tokens.contains_key(id))
        });
    }

    fn nearest_pending(&self, pos: f64) -> Option<usize> {
        self.events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_pending())
            .min_by(|(_, a), (_, b)| {
                libm::fabs(a.delta_ms(pos)).total_cmp(&libm::fabs(b.delta_ms(pos)))
            })
            .map(|(i, _)| i)
    }

    fn emit_hud(&mut self) {
        let hud = self.hud();
        self.renderer.on_hud(&hud);
    }

    fn emit_next_chord(&mut self) {
        let next = self.scheduler.upcoming(&self.chart).unwrap_or("-");
        self.renderer.on_next_chord(next);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn song_pos_ms(&self) -> f64 {
        self.clock.pos_ms()
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    /// True while running or paused, as the HUD reports it.
    pub fn is_running(&self) -> bool {
        self.state != RunState::Idle
    }

    pub fn is_paused(&self) -> bool {
        self.state == RunState::Paused
    }

    pub fn bpm(&self) -> u32 {
        self.timing.bpm
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn score(&self) -> u64 {
        self.board.score
    }

    pub fn combo(&self) -> u32 {
        self.board.combo
    }

    /// Whether any unresolved token was on the hit line last frame.
    pub fn now_ready(&self) -> bool {
        self.now_ready
    }

    pub fn hud(&self) -> HudState {
        HudState {
            score: self.board.score,
            combo: self.board.combo,
            bpm: self.timing.bpm,
            running: self.is_running(),
            paused: self.is_paused(),
        }
    }

    /// Live tokens in spawn order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token<R::Handle>> + '_ {
        self.order.iter().filter_map(|&id| self.tokens.get(id))
    }

    pub fn token(&self, id: TokenId) -> Option<&Token<R::Handle>> {
        self.tokens.get(id)
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Chord events not yet compacted away, oldest first.
    pub fn events(&self) -> &[ChordEvent] {
        &self.events
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            run_state: self.state,
            song_pos_ms: self.clock.pos_ms(),
            bpm: self.timing.bpm,
            flow_speed: self.timing.flow_speed,
            hit_window_ms: self.timing.hit_window_ms,
            beat_ms: self.timing.beat_ms,
            score: self.board.score,
            combo: self.board.combo,
            step_idx: self.scheduler.step_idx(),
            next_spawn_beat: self.scheduler.next_spawn_beat(),
            spawn_ahead_beats: self.timing.spawn_ahead_beats,
            tokens_count: self.tokens.len(),
            events_count: self.events.len(),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }
}

fn checked_scoring(scoring: ScoringConfig) -> ScoringConfig {
    match scoring.validate() {
        Ok(()) => scoring,
        Err(err) => {
            tracing::warn!(%err, "renderer scoring rejected, using defaults");
            ScoringConfig::default()
        }
    }
}
