//! Renderer Adapter
//!
//! The engine never draws. Everything visible goes through a [`Renderer`],
//! whose methods all default to no-ops so an adapter only implements what it
//! displays. The engine calls the renderer synchronously from `tick`,
//! `strum`, and the state transitions; nothing is queued.

use crate::chart::Chart;
use crate::chord::{ChordDef, Finger, Lane};
use crate::config::{Geometry, ScoringConfig};
use crate::token::{EventId, Token, TokenAnchors};
use serde::{Deserialize, Serialize};

/// Everything a renderer needs to place a new token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnRequest<'a> {
    pub lane_index: usize,
    pub lane: Lane,
    pub fret: u8,
    pub finger: Option<Finger>,
    pub chord: &'a str,
    pub chord_event_id: EventId,
    pub target_time_ms: f64,
    pub travel_ms: f64,
}

/// A renderer's answer to a spawn request.
#[derive(Debug, Clone, PartialEq)]
pub struct Spawned<H> {
    pub anchors: TokenAnchors,
    pub handle: H,
}

impl<H> Spawned<H> {
    pub fn new(anchors: TokenAnchors, handle: H) -> Self {
        Self { anchors, handle }
    }
}

/// Heads-up display values, pushed whenever any of them changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "wasm", derive(tsify::Tsify))]
#[cfg_attr(feature = "wasm", tsify(into_wasm_abi, from_wasm_abi))]
pub struct HudState {
    pub score: u64,
    pub combo: u32,
    pub bpm: u32,
    pub running: bool,
    pub paused: bool,
}

/// Callbacks from the engine to whatever displays the game.
///
/// `Handle` is the renderer's own per-token value (a DOM node, a sprite id,
/// `()`), returned from [`Renderer::spawn_token`] and handed back inside
/// every [`Token`].
#[allow(unused_variables)]
pub trait Renderer {
    type Handle;

    /// Fingering for a chord name; `None` skips the chart step.
    fn chord_def(&self, chord: &str) -> Option<ChordDef> {
        None
    }

    /// Chart used when `reset` is given an empty one.
    fn default_chart(&self) -> Chart {
        Chart::default()
    }

    /// Hit line and margins, read once per `reset`.
    fn geometry(&self) -> Geometry {
        Geometry::default()
    }

    /// Point table, read once per `reset`.
    fn scoring(&self) -> ScoringConfig {
        ScoringConfig::default()
    }

    /// Create the visual for a token; `None` leaves it out of the run, and
    /// the engine never calls `remove_token` for it.
    fn spawn_token(&mut self, request: &SpawnRequest<'_>) -> Option<Spawned<Self::Handle>> {
        None
    }

    /// Called every tick for every live token.
    fn render_token(&mut self, token: &Token<Self::Handle>, x: f64) {}

    fn on_token_ready(&mut self, token: &Token<Self::Handle>, ready: bool) {}

    /// A strum resolved the token's event. Tokens already reported through
    /// `on_token_miss` are not reported again, even when a wide hit window
    /// still lets their event be hit.
    fn on_token_hit(&mut self, token: &Token<Self::Handle>) {}

    /// The token scrolled past the miss margin unhit. At most once per token.
    fn on_token_miss(&mut self, token: &Token<Self::Handle>) {}

    /// Release the visual; the token is gone from the engine afterwards.
    fn remove_token(&mut self, token: &Token<Self::Handle>) {}

    /// Tokens reported dead are dropped from the engine without `remove_token`.
    fn is_token_alive(&self, token: &Token<Self::Handle>) -> bool {
        true
    }

    fn on_hud(&mut self, hud: &HudState) {}

    fn on_run(&mut self, running: bool) {}

    fn on_float(&mut self, text: &str) {}

    fn on_next_chord(&mut self, chord: &str) {}

    fn on_flash_pads(&mut self) {}

    /// Whether any token is ready this frame, sent once per tick.
    fn on_now_ready(&mut self, any_ready: bool) {}
}

/// A renderer that draws nothing and accepts every chord in a book.
///
/// Useful for headless simulation and benchmarks: tokens travel from
/// `start_x` to the hit line with a fret offset proportional to fret
/// distance from the chord's lowest fret.
#[derive(Debug, Clone)]
pub struct HeadlessRenderer {
    pub book: crate::chord::ChordBook,
    pub default_chart: Chart,
    pub geometry: Geometry,
    pub start_x: f64,
    pub fret_spacing: f64,
}

impl HeadlessRenderer {
    pub fn new(book: crate::chord::ChordBook) -> Self {
        Self {
            book,
            default_chart: Chart::default(),
            geometry: Geometry::default(),
            start_x: 900.0,
            fret_spacing: 40.0,
        }
    }

    pub fn with_default_chart(mut self, chart: Chart) -> Self {
        self.default_chart = chart;
        self
    }

    /// Anchors for a fret: the spawn point sits further right for higher frets.
    pub fn anchors_for(&self, fret: u8, reference_fret: u8) -> TokenAnchors {
        let offset = (fret as f64 - reference_fret as f64) * self.fret_spacing;
        TokenAnchors::new(self.start_x, self.geometry.hit_x).with_fret_offset(offset)
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new(crate::chord::ChordBook::standard())
    }
}

impl Renderer for HeadlessRenderer {
    type Handle = ();

    fn chord_def(&self, chord: &str) -> Option<ChordDef> {
        self.book.get(chord).cloned()
    }

    fn default_chart(&self) -> Chart {
        self.default_chart.clone()
    }

    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn spawn_token(&mut self, request: &SpawnRequest<'_>) -> Option<Spawned<()>> {
        let reference = self
            .book
            .get(request.chord)
            .and_then(|def| def.frets.iter().copied().filter(|&f| f > 0).min())
            .unwrap_or(request.fret);
        Some(Spawned::new(self.anchors_for(request.fret, reference), ()))
    }
}
