//! Renderer backed by a JavaScript adapter object
//!
//! Every adapter method is optional. A missing method, a non-function
//! property, or a thrown exception all behave like the trait's default.
//! `getScoring()` may return a partial `{perfect, great, ok, comboStep,
//! comboBonus}` table; absent keys keep their defaults.

use crate::chart::{Chart, ScoreStep};
use crate::chord::{ChordDef, Finger, LANE_COUNT};
use crate::config::{Geometry, ScoringConfig};
use crate::renderer::{HudState, Renderer, SpawnRequest, Spawned};
use crate::token::{Token, TokenAnchors};
use alloc::string::String;
use alloc::vec::Vec;
use js_sys::{Function, Reflect};
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Chord shape as adapters write it: `{frets: [0,0,0,3], fingers: ["","","","3"]}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JsChordDef {
    frets: Vec<Option<f64>>,
    fingers: Vec<Option<String>>,
}

impl JsChordDef {
    fn into_def(self) -> ChordDef {
        let mut frets = [0u8; LANE_COUNT];
        let mut fingers = [None; LANE_COUNT];
        for (lane, fret) in self.frets.iter().take(LANE_COUNT).enumerate() {
            frets[lane] = match fret {
                Some(f) if f.is_finite() && *f > 0.0 => *f as u8,
                _ => 0,
            };
        }
        for (lane, finger) in self.fingers.iter().take(LANE_COUNT).enumerate() {
            fingers[lane] = finger.as_deref().and_then(Finger::from_label);
        }
        ChordDef::new(frets, fingers)
    }
}

pub(crate) struct JsRenderer {
    adapter: JsValue,
}

impl JsRenderer {
    pub(crate) fn new(adapter: JsValue) -> Self {
        Self { adapter }
    }

    fn method(&self, name: &str) -> Option<Function> {
        Reflect::get(&self.adapter, &JsValue::from_str(name))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }

    fn call(&self, name: &str, args: &[&JsValue]) -> Option<JsValue> {
        let f = self.method(name)?;
        let result = match args {
            [] => f.call0(&self.adapter),
            [a] => f.call1(&self.adapter, a),
            [a, b] => f.call2(&self.adapter, a, b),
            _ => return None,
        };
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(method = name, error = ?err, "adapter method threw");
                None
            }
        }
    }

    fn number(value: &JsValue, key: &str) -> Option<f64> {
        Reflect::get(value, &JsValue::from_str(key)).ok()?.as_f64()
    }

    /// Mirror engine-owned fields onto the handle so adapters can read them.
    fn sync<'a>(token: &'a Token<JsValue>) -> &'a JsValue {
        let handle = token.handle();
        let fields = [
            ("laneIndex", JsValue::from(token.lane().index() as u32)),
            ("targetTimeMs", JsValue::from(token.target_time_ms())),
            ("travelMs", JsValue::from(token.travel_ms())),
            ("hit", JsValue::from(token.is_hit())),
            ("ready", JsValue::from(token.is_ready())),
        ];
        for (key, value) in fields {
            let _ = Reflect::set(handle, &JsValue::from_str(key), &value);
        }
        handle
    }
}

impl Renderer for JsRenderer {
    type Handle = JsValue;

    fn chord_def(&self, chord: &str) -> Option<ChordDef> {
        let value = self.call("getChordDef", &[&JsValue::from_str(chord)])?;
        if value.is_null() || value.is_undefined() {
            return None;
        }
        match serde_wasm_bindgen::from_value::<JsChordDef>(value) {
            Ok(def) => Some(def.into_def()),
            Err(err) => {
                tracing::warn!(chord, %err, "malformed chord definition");
                None
            }
        }
    }

    fn default_chart(&self) -> Chart {
        let Some(value) = self.call("getDefaultScoreData", &[]) else {
            return Chart::default();
        };
        serde_wasm_bindgen::from_value::<Vec<ScoreStep>>(value)
            .map(Chart::from)
            .unwrap_or_else(|err| {
                tracing::warn!(%err, "malformed default score data");
                Chart::default()
            })
    }

    fn geometry(&self) -> Geometry {
        Self::number(&self.adapter, "HIT_X")
            .map(Geometry::with_hit_x)
            .unwrap_or_default()
    }

    fn scoring(&self) -> ScoringConfig {
        let Some(value) = self.call("getScoring", &[]) else {
            return ScoringConfig::default();
        };
        if value.is_null() || value.is_undefined() {
            return ScoringConfig::default();
        }
        serde_wasm_bindgen::from_value(value).unwrap_or_else(|err| {
            tracing::warn!(%err, "malformed scoring table");
            ScoringConfig::default()
        })
    }

    fn spawn_token(&mut self, request: &SpawnRequest<'_>) -> Option<Spawned<JsValue>> {
        let arg = serde_wasm_bindgen::to_value(request).ok()?;
        let handle = self.call("spawnToken", &[&arg])?;
        if !handle.is_truthy() {
            return None;
        }

        let anchors = TokenAnchors::from_parts(
            Self::number(&handle, "startX"),
            Self::number(&handle, "targetX"),
            Self::number(&handle, "fretOffset"),
        );
        match anchors {
            Some(anchors) => Some(Spawned::new(anchors, handle)),
            None => {
                // The engine never tracks this handle, so release it now
                tracing::warn!(chord = request.chord, "spawned token lacks startX/targetX");
                self.call("removeToken", &[&handle]);
                None
            }
        }
    }

    fn render_token(&mut self, token: &Token<JsValue>, x: f64) {
        self.call("renderToken", &[Self::sync(token), &JsValue::from(x)]);
    }

    fn on_token_ready(&mut self, token: &Token<JsValue>, ready: bool) {
        self.call("onTokenReady", &[Self::sync(token), &JsValue::from(ready)]);
    }

    fn on_token_hit(&mut self, token: &Token<JsValue>) {
        self.call("onTokenHit", &[Self::sync(token)]);
    }

    fn on_token_miss(&mut self, token: &Token<JsValue>) {
        self.call("onTokenMiss", &[Self::sync(token)]);
    }

    fn remove_token(&mut self, token: &Token<JsValue>) {
        self.call("removeToken", &[token.handle()]);
    }

    fn is_token_alive(&self, token: &Token<JsValue>) -> bool {
        self.call("isTokenAlive", &[token.handle()])
            .map_or(true, |alive| alive.is_truthy())
    }

    fn on_hud(&mut self, hud: &HudState) {
        if let Ok(value) = serde_wasm_bindgen::to_value(hud) {
            self.call("onHUD", &[&value]);
        }
    }

    fn on_run(&mut self, running: bool) {
        self.call("onRun", &[&JsValue::from(running)]);
    }

    fn on_float(&mut self, text: &str) {
        self.call("onFloat", &[&JsValue::from_str(text)]);
    }

    fn on_next_chord(&mut self, chord: &str) {
        self.call("onNextChord", &[&JsValue::from_str(chord)]);
    }

    fn on_flash_pads(&mut self) {
        self.call("onFlashPads", &[]);
    }

    fn on_now_ready(&mut self, any_ready: bool) {
        self.call("onNowReady", &[&JsValue::from(any_ready)]);
    }
}
