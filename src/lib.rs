// ABOUTME: Template expansion library for slipway release pipelines
// ABOUTME: Exports the field-set builder, template engine, helpers, and errors

pub mod context;
pub mod engine;
pub mod error;
pub mod helpers;
pub mod template;

// Re-export commonly used types
pub use context::{Artifact, BuildOptions, GitInfo, ReleaseContext, Semver};
pub use engine::TemplateEngine;
pub use error::{Result, TemplateError};
pub use template::{Fields, Template};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
