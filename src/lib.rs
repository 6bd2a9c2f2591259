//! # Ukeflow: Rhythm Timing & Judgment Engine
//!
//! `ukeflow` is the core of a scrolling ukulele chord practice game. It
//! advances a song clock once per animation frame, spawns chord events from a
//! looping chart a few beats ahead of time, moves their finger tokens toward
//! a hit line, and judges the player's strums against each event's target
//! time. It never draws: everything visible goes through a [`Renderer`].
//!
//! ## Architecture
//!
//! - **Charts & Chords** - [`Chart`] steps, [`ChordBook`] shapes, named [`courses`]
//! - **Timing** - [`SongClock`] and the beat-driven [`SpawnScheduler`]
//! - **Judgment** - [`judge`] tiers and the combo-aware [`ScoreBoard`]
//! - **Engine** - the [`Engine`] state machine (`Idle`, `Running`, `Paused`)
//! - **Renderers** - [`HeadlessRenderer`], the recording [`EventRecorder`],
//!   and the JavaScript adapter behind the `wasm` feature
//!
//! ## Quick Start
//!
//! ```rust
//! use ukeflow::prelude::*;
//!
//! let mut engine = Engine::new(EventRecorder::new());
//! let chart = Chart::parse("C:2, G:2").unwrap();
//! engine.reset(&EngineConfig::new().with_bpm(120.0).with_chart(chart));
//! engine.handle_input(Action::Start);
//!
//! // Frames from the host's animation loop
//! engine.tick(0.0);
//! engine.tick(1500.0);
//!
//! // The first C lands at (0 + 3 beats) * 500 ms
//! let outcome = engine.handle_input(Action::Strum);
//! assert_eq!(outcome.and_then(|o| o.judgment()), Some(Judgment::Perfect));
//! assert_eq!(engine.score(), 300);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod chart;
pub mod chord;
pub mod clock;
pub mod config;
pub mod courses;
pub mod engine;
pub mod error;
pub mod judge;
pub mod observer;
pub mod pitch;
pub mod renderer;
pub mod token;

#[cfg(feature = "wasm")]
pub mod wasm;

/// Prelude module for convenient imports
pub mod prelude {
    // Charts & Chords
    pub use crate::chart::{Chart, ScoreStep};
    pub use crate::chord::{ChordBook, ChordDef, Finger, Lane};
    pub use crate::courses::{Course, CourseInfo, CourseLibrary};

    // Configuration
    pub use crate::config::{EngineConfig, Geometry, ScoringConfig, Timing};

    // Timing & Judgment
    pub use crate::clock::{SongClock, SpawnScheduler};
    pub use crate::judge::{judge, Judgment, ScoreBoard};

    // Engine
    pub use crate::engine::{Action, Engine, EngineSnapshot, RunState, StrumOutcome};
    pub use crate::token::{ChordEvent, EventId, Resolution, Token, TokenAnchors, TokenId};

    // Rendering
    pub use crate::observer::{EventRecorder, RecorderConfig, RenderEvent};
    pub use crate::renderer::{HeadlessRenderer, HudState, Renderer, SpawnRequest, Spawned};

    // Tuning
    pub use crate::pitch::{cents_offset, PitchEstimator, STANDARD_TUNING};

    // Errors
    pub use crate::error::{ChartError, ConfigError};
}

// Re-export key types at crate root for convenience
pub use prelude::*;
