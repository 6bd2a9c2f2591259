//! UkeflowEngine - Main WASM interface for the rhythm engine

use super::adapter::JsRenderer;
use super::error::UkeflowError;
use crate::config::EngineConfig;
use crate::courses::CourseLibrary;
use crate::engine::{Action, Engine};
use crate::renderer::HudState;
use alloc::string::ToString;
use wasm_bindgen::prelude::*;

/// Main WASM interface for the rhythm engine
#[wasm_bindgen]
pub struct UkeflowEngine {
    engine: Engine<JsRenderer>,
    courses: CourseLibrary,
}

#[wasm_bindgen]
impl UkeflowEngine {
    /// Create an engine that draws through `adapter`
    #[wasm_bindgen(constructor)]
    pub fn new(adapter: JsValue) -> Result<UkeflowEngine, JsValue> {
        // Initialize panic hook for better error messages
        console_error_panic_hook::set_once();

        if !adapter.is_object() {
            return Err(UkeflowError::from("Engine adapter is required.").into_js());
        }

        Ok(Self {
            engine: Engine::new(JsRenderer::new(adapter)),
            courses: CourseLibrary::standard(),
        })
    }

    // =========================================================================
    // Run Control
    // =========================================================================

    /// Reset with `{bpm, flowSpeed, hitWindowMs, scoreData}`; every key optional
    pub fn reset(&mut self, settings: JsValue) -> Result<(), JsValue> {
        let config: EngineConfig = if settings.is_null() || settings.is_undefined() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(settings)
                .map_err(|e| UkeflowError::from(e).into_js())?
        };
        self.engine.reset(&config);
        Ok(())
    }

    /// Reset onto a named course or a custom list such as `"C,G:4,Am,F"`
    pub fn reset_course(&mut self, course: &str, settings: JsValue) -> Result<(), JsValue> {
        let chart = self
            .courses
            .resolve(course)
            .map_err(|e| UkeflowError::from(e).into_js())?;
        let config: EngineConfig = if settings.is_null() || settings.is_undefined() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(settings)
                .map_err(|e| UkeflowError::from(e).into_js())?
        };
        self.engine.reset(&config.with_chart(chart));
        Ok(())
    }

    pub fn start(&mut self) {
        self.engine.start();
    }

    #[wasm_bindgen(js_name = togglePause)]
    pub fn toggle_pause(&mut self) {
        self.engine.toggle_pause();
    }

    /// Feed `{type: "START" | "PAUSE_TOGGLE" | "STRUM"}`; returns the strum
    /// outcome, or `null` for other actions and unrecognized input
    #[wasm_bindgen(js_name = handleInput)]
    pub fn handle_input(&mut self, action: JsValue) -> Result<JsValue, JsValue> {
        let action: Action = match serde_wasm_bindgen::from_value(action) {
            Ok(action) => action,
            Err(err) => {
                tracing::debug!(%err, "ignoring unrecognized input");
                return Ok(JsValue::NULL);
            }
        };

        match self.engine.handle_input(action) {
            Some(outcome) => serde_wasm_bindgen::to_value(&outcome)
                .map_err(|e| JsValue::from_str(&e.to_string())),
            None => Ok(JsValue::NULL),
        }
    }

    /// Advance one animation frame; returns whether to request another
    pub fn tick(&mut self, timestamp_ms: f64) -> bool {
        self.engine.tick(timestamp_ms)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[wasm_bindgen(js_name = getSongPosMs)]
    pub fn song_pos_ms(&self) -> f64 {
        self.engine.song_pos_ms()
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    #[wasm_bindgen(js_name = isPaused)]
    pub fn is_paused(&self) -> bool {
        self.engine.is_paused()
    }

    #[wasm_bindgen(js_name = getBpm)]
    pub fn bpm(&self) -> u32 {
        self.engine.bpm()
    }

    pub fn hud(&self) -> HudState {
        self.engine.hud()
    }

    /// Internal counters for debugging overlays
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.engine.snapshot())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    // =========================================================================
    // Course Catalog
    // =========================================================================

    /// List the built-in courses
    pub fn get_courses(&self) -> Result<JsValue, JsValue> {
        let infos: alloc::vec::Vec<_> = self.courses.list().collect();
        serde_wasm_bindgen::to_value(&infos).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Resolve a course name or custom progression into score data
    pub fn resolve_course(&self, course: &str) -> Result<JsValue, JsValue> {
        let chart = self
            .courses
            .resolve(course)
            .map_err(|e| UkeflowError::from(e).into_js())?;
        serde_wasm_bindgen::to_value(&chart).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
