// ABOUTME: Error types for template parsing and rendering operations
// ABOUTME: Defines specific error types for field lookup, helpers, and the env-only grammar

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template syntax error: {0}")]
    SyntaxError(String),

    #[error("missing template field: {0}")]
    MissingField(String),

    #[error("invalid template function: {0}")]
    InvalidFunction(String),

    #[error("template function {function}: {reason}")]
    FunctionError { function: String, reason: String },

    #[error("template render error: {0}")]
    RenderError(String),

    #[error("expected {{{{ .Env.VAR_NAME }}}} only (no plain-text or other interpolation)")]
    ExpectedSingleEnv,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
