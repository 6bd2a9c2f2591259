//! Chord Events & Tokens
//!
//! A [`ChordEvent`] is one scheduled moment to strum a chord. It owns one
//! [`Token`] per fretted string. Every token of an event shares the event's
//! target time and travel time, so although tokens start at different
//! offsets (to show fret distance) they all reach the hit line together.
//!
//! # Position model
//!
//! ```text
//! p      = 1 - (target_time - now) / travel
//! x_base = start_x + p * (target_x - start_x)
//! x      = x_base + (1 - p) * fret_offset
//! ```
//!
//! At `p = 1` the offset term vanishes and `x = target_x` for every token.
//! `p` keeps growing past 1, carrying unhit tokens beyond the hit line.

use crate::chord::{Finger, Lane};
use crate::judge::Judgment;
use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

slotmap::new_key_type! {
    /// Key of a live token in the engine's token arena
    pub struct TokenId;
}

/// Unique, increasing chord event id (starts at 1 after every reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

/// Interpolation anchors chosen by the renderer when it spawns a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAnchors {
    /// Position at spawn, before the fret offset
    pub start_x: f64,
    /// Position on the hit line
    pub target_x: f64,
    /// Extra offset at spawn that decays to zero on arrival
    pub fret_offset: f64,
}

impl TokenAnchors {
    pub fn new(start_x: f64, target_x: f64) -> Self {
        Self {
            start_x,
            target_x,
            fret_offset: 0.0,
        }
    }

    pub fn with_fret_offset(mut self, fret_offset: f64) -> Self {
        self.fret_offset = fret_offset;
        self
    }

    /// Anchors from loosely typed renderer output. Both ends are required;
    /// a missing or non-finite fret offset counts as none.
    pub fn from_parts(
        start_x: Option<f64>,
        target_x: Option<f64>,
        fret_offset: Option<f64>,
    ) -> Option<Self> {
        let start_x = start_x.filter(|x| x.is_finite())?;
        let target_x = target_x.filter(|x| x.is_finite())?;
        let fret_offset = fret_offset.filter(|x| x.is_finite()).unwrap_or(0.0);
        Some(Self::new(start_x, target_x).with_fret_offset(fret_offset))
    }

    /// Interpolated position at progress `p`.
    pub fn position(&self, p: f64) -> f64 {
        let x_base = self.start_x + p * (self.target_x - self.start_x);
        x_base + (1.0 - p) * self.fret_offset
    }
}

/// Progress along the travel path: 0 at spawn, 1 on the hit line.
pub fn progress(target_time_ms: f64, travel_ms: f64, song_pos_ms: f64) -> f64 {
    if travel_ms <= 0.0 {
        return 1.0;
    }
    1.0 - (target_time_ms - song_pos_ms) / travel_ms
}

/// One finger placement travelling toward the hit line.
///
/// Fields are engine-owned; renderers only ever see `&Token`. The `handle`
/// is whatever the renderer returned from `spawn_token`, kept here so it can
/// find its visual again.
#[derive(Debug, Clone)]
pub struct Token<H> {
    pub(crate) lane: Lane,
    pub(crate) fret: u8,
    pub(crate) finger: Option<Finger>,
    pub(crate) chord_event_id: EventId,
    pub(crate) target_time_ms: f64,
    pub(crate) travel_ms: f64,
    pub(crate) anchors: TokenAnchors,
    pub(crate) hit: bool,
    pub(crate) ready: bool,
    pub(crate) x: f64,
    pub(crate) handle: H,
}

impl<H> Token<H> {
    pub fn lane(&self) -> Lane {
        self.lane
    }

    pub fn fret(&self) -> u8 {
        self.fret
    }

    pub fn finger(&self) -> Option<Finger> {
        self.finger
    }

    pub fn chord_event_id(&self) -> EventId {
        self.chord_event_id
    }

    pub fn target_time_ms(&self) -> f64 {
        self.target_time_ms
    }

    pub fn travel_ms(&self) -> f64 {
        self.travel_ms
    }

    pub fn anchors(&self) -> &TokenAnchors {
        &self.anchors
    }

    /// Resolved, either by a strum or by scrolling past the miss margin.
    pub fn is_hit(&self) -> bool {
        self.hit
    }

    /// Within the ready tolerance of the hit line and unresolved.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Position computed on the last tick
    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn progress(&self, song_pos_ms: f64) -> f64 {
        progress(self.target_time_ms, self.travel_ms, song_pos_ms)
    }

    pub fn position_at(&self, song_pos_ms: f64) -> f64 {
        self.anchors.position(self.progress(song_pos_ms))
    }
}

/// How a chord event ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Resolution {
    Pending,
    Hit { judgment: Judgment },
    /// Passed its hit window without a successful strum
    Missed,
}

/// A scheduled chord strum and the tokens it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordEvent {
    pub(crate) id: EventId,
    pub(crate) chord: String,
    pub(crate) target_time_ms: f64,
    pub(crate) resolution: Resolution,
    #[serde(skip)]
    pub(crate) tokens: Vec<TokenId>,
}

impl ChordEvent {
    pub(crate) fn new(id: EventId, chord: String, target_time_ms: f64) -> Self {
        Self {
            id,
            chord,
            target_time_ms,
            resolution: Resolution::Pending,
            tokens: Vec::new(),
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn chord(&self) -> &str {
        &self.chord
    }

    pub fn target_time_ms(&self) -> f64 {
        self.target_time_ms
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn is_pending(&self) -> bool {
        self.resolution == Resolution::Pending
    }

    pub fn is_hit(&self) -> bool {
        matches!(self.resolution, Resolution::Hit { .. })
    }

    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    /// Signed timing error of a strum at `song_pos_ms` (positive = late).
    pub fn delta_ms(&self, song_pos_ms: f64) -> f64 {
        song_pos_ms - self.target_time_ms
    }
}
