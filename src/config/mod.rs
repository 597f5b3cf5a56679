#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::model::ApiKey;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_API_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_OUTPUT_DIR: &str = "generated project";

/// 合併預設值、TOML 檔與命令列後的最終設定
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_endpoint: String,
    pub model: String,
    pub api_key: Option<ApiKey>,
    pub output_dir: String,
    pub parallel: bool,
    pub timeout_seconds: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            parallel: false,
            timeout_seconds: None,
        }
    }
}

impl GeneratorConfig {
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = ApiKey::new(key);
        self
    }

    /// 套用 TOML 檔中有設定的欄位
    pub fn apply_toml(&mut self, config: &TomlConfig) {
        let api = &config.api;
        if let Some(endpoint) = &api.endpoint {
            self.api_endpoint = endpoint.clone();
        }
        if let Some(model) = &api.model {
            self.model = model.clone();
        }
        if let Some(key) = config.api_key() {
            self.api_key = Some(key);
        }
        if let Some(timeout) = api.timeout_seconds {
            self.timeout_seconds = Some(timeout);
        }
        if let Some(directory) = &config.output.directory {
            self.output_dir = directory.clone();
        }
        if let Some(parallel) = config.dispatch.parallel {
            self.parallel = parallel;
        }
    }
}

impl ConfigProvider for GeneratorConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    fn parallel_dispatch(&self) -> bool {
        self.parallel
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for GeneratorConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.endpoint", &self.api_endpoint)?;
        validation::validate_model_id("api.model", &self.model)?;
        validation::validate_path("output.directory", &self.output_dir)?;
        if let Some(timeout) = self.timeout_seconds {
            validation::validate_positive_number("api.timeout_seconds", timeout, 1)?;
        }
        // 缺少 API key 不是設定錯誤，由 pipeline 回報
        Ok(())
    }
}
