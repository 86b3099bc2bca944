use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum FxError {
    #[error("invalid config json: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid config value `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("element `#{0}` not found")]
    MissingElement(String),

    #[error("{0} not supported")]
    Unsupported(&'static str),

    #[error("shader error: {0}")]
    Shader(String),

    #[error("js error: {0}")]
    Js(String),
}

impl FxError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        FxError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// Wraps a thrown JS value, keeping whatever text it carries.
    pub fn from_js(value: JsValue) -> Self {
        let text = value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}"));
        FxError::Js(text)
    }
}

impl From<FxError> for JsValue {
    fn from(err: FxError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FxError>;
