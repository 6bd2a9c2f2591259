//! Render Event Bridge
//!
//! [`EventRecorder`] is a [`Renderer`] that turns every engine callback into
//! a serializable [`RenderEvent`]. Hosts that poll once per animation frame
//! (or tests) drain the log instead of implementing the callbacks.

use crate::chart::Chart;
use crate::chord::{ChordBook, ChordDef, Lane};
use crate::config::{Geometry, ScoringConfig};
use crate::renderer::{HeadlessRenderer, HudState, Renderer, SpawnRequest, Spawned};
use crate::token::{EventId, Token};
use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Handle the recorder assigns to each spawned token.
pub type TokenSerial = u32;

// =============================================================================
// Render Events
// =============================================================================

/// One renderer callback, as data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum RenderEvent {
    Spawn {
        token: TokenSerial,
        lane: Lane,
        fret: u8,
        chord: String,
        event_id: EventId,
        target_time_ms: f64,
    },
    Render {
        token: TokenSerial,
        x: f64,
    },
    Ready {
        token: TokenSerial,
        ready: bool,
    },
    Hit {
        token: TokenSerial,
    },
    Miss {
        token: TokenSerial,
    },
    Remove {
        token: TokenSerial,
    },
    Hud(HudState),
    Run {
        running: bool,
    },
    Float {
        text: String,
    },
    NextChord {
        chord: String,
    },
    FlashPads,
    NowReady {
        ready: bool,
    },
}

// =============================================================================
// Event Recorder
// =============================================================================

/// Configuration for the recorder
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Record a `Render` event per token per tick (default: false)
    pub record_renders: bool,
    /// Maximum events kept before the oldest are dropped (default: 10000)
    pub max_pending_events: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            record_renders: false,
            max_pending_events: 10_000,
        }
    }
}

/// Records engine callbacks for later inspection.
#[derive(Debug)]
pub struct EventRecorder {
    layout: HeadlessRenderer,
    scoring: ScoringConfig,
    config: RecorderConfig,
    events: Vec<RenderEvent>,
    next_serial: TokenSerial,
    live: BTreeSet<TokenSerial>,
    dead: BTreeSet<TokenSerial>,
    refuse_spawns: bool,
}

impl EventRecorder {
    /// Create a recorder over the standard chord book
    pub fn new() -> Self {
        Self::with_book(ChordBook::standard())
    }

    pub fn with_book(book: ChordBook) -> Self {
        Self {
            layout: HeadlessRenderer::new(book),
            scoring: ScoringConfig::default(),
            config: RecorderConfig::default(),
            events: Vec::new(),
            next_serial: 1,
            live: BTreeSet::new(),
            dead: BTreeSet::new(),
            refuse_spawns: false,
        }
    }

    pub fn with_config(mut self, config: RecorderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_default_chart(mut self, chart: Chart) -> Self {
        self.layout.default_chart = chart;
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.layout.geometry = geometry;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    /// Make `spawn_token` decline every request.
    pub fn refuse_spawns(&mut self, refuse: bool) {
        self.refuse_spawns = refuse;
    }

    /// Report a token as dead from the next `is_token_alive` query on.
    pub fn kill(&mut self, token: TokenSerial) {
        self.dead.insert(token);
    }

    /// Tokens spawned and not yet removed
    pub fn live_tokens(&self) -> usize {
        self.live.len()
    }

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<RenderEvent> {
        core::mem::take(&mut self.events)
    }

    /// Peek at pending events without draining
    pub fn events(&self) -> &[RenderEvent] {
        &self.events
    }

    /// Texts of every `Float` event, in order
    pub fn floats(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Float { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The most recent HUD update
    pub fn last_hud(&self) -> Option<&HudState> {
        self.events.iter().rev().find_map(|e| match e {
            RenderEvent::Hud(hud) => Some(hud),
            _ => None,
        })
    }

    pub fn count(&self, pred: impl Fn(&RenderEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    fn push(&mut self, event: RenderEvent) {
        self.events.push(event);
        if self.events.len() > self.config.max_pending_events {
            let excess = self.events.len() - self.config.max_pending_events;
            self.events.drain(..excess);
        }
    }
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for EventRecorder {
    type Handle = TokenSerial;

    fn chord_def(&self, chord: &str) -> Option<ChordDef> {
        self.layout.chord_def(chord)
    }

    fn default_chart(&self) -> Chart {
        self.layout.default_chart()
    }

    fn geometry(&self) -> Geometry {
        self.layout.geometry()
    }

    fn scoring(&self) -> ScoringConfig {
        self.scoring
    }

    fn spawn_token(&mut self, request: &SpawnRequest<'_>) -> Option<Spawned<TokenSerial>> {
        if self.refuse_spawns {
            return None;
        }
        let anchors = self.layout.spawn_token(request)?.anchors;
        let serial = self.next_serial;
        self.next_serial += 1;
        self.live.insert(serial);
        self.push(RenderEvent::Spawn {
            token: serial,
            lane: request.lane,
            fret: request.fret,
            chord: request.chord.to_string(),
            event_id: request.chord_event_id,
            target_time_ms: request.target_time_ms,
        });
        Some(Spawned::new(anchors, serial))
    }

    fn render_token(&mut self, token: &Token<TokenSerial>, x: f64) {
        if self.config.record_renders {
            self.push(RenderEvent::Render {
                token: *token.handle(),
                x,
            });
        }
    }

    fn on_token_ready(&mut self, token: &Token<TokenSerial>, ready: bool) {
        self.push(RenderEvent::Ready {
            token: *token.handle(),
            ready,
        });
    }

    fn on_token_hit(&mut self, token: &Token<TokenSerial>) {
        self.push(RenderEvent::Hit {
            token: *token.handle(),
        });
    }

    fn on_token_miss(&mut self, token: &Token<TokenSerial>) {
        self.push(RenderEvent::Miss {
            token: *token.handle(),
        });
    }

    fn remove_token(&mut self, token: &Token<TokenSerial>) {
        self.live.remove(token.handle());
        self.push(RenderEvent::Remove {
            token: *token.handle(),
        });
    }

    fn is_token_alive(&self, token: &Token<TokenSerial>) -> bool {
        !self.dead.contains(token.handle())
    }

    fn on_hud(&mut self, hud: &HudState) {
        self.push(RenderEvent::Hud(*hud));
    }

    fn on_run(&mut self, running: bool) {
        self.push(RenderEvent::Run { running });
    }

    fn on_float(&mut self, text: &str) {
        self.push(RenderEvent::Float {
            text: text.to_string(),
        });
    }

    fn on_next_chord(&mut self, chord: &str) {
        self.push(RenderEvent::NextChord {
            chord: chord.to_string(),
        });
    }

    fn on_flash_pads(&mut self) {
        self.push(RenderEvent::FlashPads);
    }

    fn on_now_ready(&mut self, any_ready: bool) {
        self.push(RenderEvent::NowReady { ready: any_ready });
    }
}
