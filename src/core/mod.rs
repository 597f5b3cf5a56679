pub mod pipeline;
pub mod suggestions;
pub mod templating;

pub use crate::domain::model::{Artifact, Category, Generation, RunResult, TemplatedPrompt};
pub use crate::domain::ports::{ConfigProvider, GenerationClient, Storage};
pub use crate::utils::error::Result;
