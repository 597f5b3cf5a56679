use crate::config::toml_config::TomlConfig;
use crate::config::GeneratorConfig;
use crate::domain::model::ApiKey;
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "crew-pilot")]
#[command(about = "Generate frontend, backend and test code for a project prompt with Gemini")]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Generate the three source files for a project prompt
    Generate {
        /// Project description; required unless --suggest is given
        #[arg(required_unless_present = "suggest")]
        prompt: Option<String>,

        /// Use a random example prompt
        #[arg(long, conflicts_with = "prompt")]
        suggest: bool,

        /// Print the run result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a random example prompt
    Suggest,
}

#[derive(Debug, Clone, Args)]
pub struct GlobalOptions {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of the generative language API
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Model id used for generateContent
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Directory the generated files are written to
    #[arg(long, global = true)]
    pub output_dir: Option<String>,

    /// Send the three requests concurrently
    #[arg(long, global = true)]
    pub parallel: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalOptions {
    /// 預設值 → TOML 檔 → 命令列，後者覆蓋前者
    pub fn resolve(&self) -> Result<GeneratorConfig> {
        let mut config = GeneratorConfig::default();

        if let Some(path) = &self.config {
            tracing::info!("📁 Loading configuration from: {}", path);
            let toml = TomlConfig::from_file(path)?;
            config.apply_toml(&toml);
        }

        if let Some(key) = self.api_key.as_deref().and_then(ApiKey::new) {
            config.api_key = Some(key);
        }
        if let Some(endpoint) = &self.endpoint {
            config.api_endpoint = endpoint.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if self.parallel {
            config.parallel = true;
        }

        Ok(config)
    }
}
