pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::Cli;

pub use crate::adapters::{GeminiClient, LocalStorage};
pub use crate::config::GeneratorConfig;
pub use crate::core::{
    pipeline::CodegenPipeline,
    suggestions::{suggest_prompt, EXAMPLE_PROMPTS},
    templating::template_prompts,
};
pub use crate::domain::model::{ApiKey, Category, RunResult};
pub use crate::utils::error::{GenerationError, GeneratorError, Result};
