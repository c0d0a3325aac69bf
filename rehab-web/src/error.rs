//! Error types for session setup and the JS boundary
//!
//! Frame processing never fails; anything that goes wrong there becomes a
//! feedback event instead. These errors only come out of configuration,
//! exercise selection and malformed input from JavaScript.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum RehabError {
    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    #[error("No exercise selected")]
    NoExerciseSelected,

    #[error("Invalid landmark data length: {actual} (expected {expected})")]
    InvalidFrameLength { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RehabError>;

impl From<RehabError> for JsValue {
    fn from(err: RehabError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
