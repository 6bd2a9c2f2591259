//! Error types for WASM bindings

use crate::error::{ChartError, ConfigError};
use alloc::string::{String, ToString};
use wasm_bindgen::prelude::*;

/// Error type for WASM bindings
#[wasm_bindgen]
#[derive(Debug)]
pub struct UkeflowError {
    message: String,
}

#[wasm_bindgen]
impl UkeflowError {
    /// Get the error message
    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }
}

impl From<ConfigError> for UkeflowError {
    fn from(e: ConfigError) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

impl From<ChartError> for UkeflowError {
    fn from(e: ChartError) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

impl From<serde_wasm_bindgen::Error> for UkeflowError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

impl From<&str> for UkeflowError {
    fn from(message: &str) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl UkeflowError {
    /// Convert to JsValue for use as error return
    pub fn into_js(self) -> JsValue {
        JsValue::from_str(&self.message)
    }
}
