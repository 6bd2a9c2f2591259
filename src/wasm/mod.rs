//! WASM bindings for Ukeflow
//!
//! This module provides the JavaScript-facing API for running the engine in
//! a browser. The page supplies an adapter object whose methods draw the
//! game; the engine calls them from `tick` and `handleInput`.

mod adapter;
mod engine;
mod error;

pub use engine::UkeflowEngine;
pub use error::UkeflowError;

// Re-export wasm_bindgen for convenience
pub use wasm_bindgen::prelude::*;
