use crate::core::templating::template_prompts;
use crate::domain::model::{
    render_generation, ApiKey, Artifact, Category, Generation, RunResult, TemplatedPrompt,
};
use crate::domain::ports::{ConfigProvider, GenerationClient, Storage};
use crate::utils::error::Result;
use std::time::Instant;

pub const COMPLETION_MESSAGE: &str = "🎉 All source code has been generated.";
pub const MISSING_KEY_MESSAGE: &str = "Please provide a valid Gemini API Key.";

/// 一個提示 → 三次 API 呼叫 → 三個輸出檔
pub struct CodegenPipeline<S: Storage, G: GenerationClient, C: ConfigProvider> {
    storage: S,
    client: G,
    config: C,
}

impl<S: Storage, G: GenerationClient, C: ConfigProvider> CodegenPipeline<S, G, C> {
    pub fn new(storage: S, client: G, config: C) -> Self {
        Self {
            storage,
            client,
            config,
        }
    }

    /// 執行一次完整流程。
    ///
    /// 沒有 API key 時直接回傳提示訊息，不呼叫 API 也不寫檔。單一類別的 API
    /// 失敗不會中斷流程，錯誤訊息會成為該類別的內容；寫檔失敗則直接回傳錯誤。
    pub async fn generate(&self, prompt: &str) -> Result<RunResult> {
        let Some(api_key) = self.config.api_key() else {
            tracing::info!("🔑 No Gemini API key configured, nothing was generated");
            return Ok(RunResult {
                summary: MISSING_KEY_MESSAGE.to_string(),
                artifacts: None,
                output_dir: None,
            });
        };

        let started = Instant::now();
        tracing::info!(
            "🚀 Generating project code ({} chars prompt)",
            prompt.chars().count()
        );

        let prompts = template_prompts(prompt);
        let generations = self.dispatch(api_key, &prompts).await;
        let artifacts = self.persist(generations).await?;

        let failed = artifacts.iter().filter(|a| !a.is_success()).count();
        tracing::info!(
            "🏁 Generation finished in {:?} ({} of {} categories failed)",
            started.elapsed(),
            failed,
            artifacts.len()
        );

        Ok(RunResult {
            summary: COMPLETION_MESSAGE.to_string(),
            artifacts: Some(artifacts),
            output_dir: Some(self.storage.base_path().display().to_string()),
        })
    }

    async fn dispatch(
        &self,
        api_key: &ApiKey,
        prompts: &[TemplatedPrompt; 3],
    ) -> Vec<(Category, Generation)> {
        if self.config.parallel_dispatch() {
            tracing::debug!("Dispatching {} requests concurrently", prompts.len());
            let [frontend, backend, testing] = prompts;
            let (frontend, backend, testing) = tokio::join!(
                self.request(api_key, frontend),
                self.request(api_key, backend),
                self.request(api_key, testing),
            );
            vec![frontend, backend, testing]
        } else {
            let mut generations = Vec::with_capacity(prompts.len());
            for templated in prompts {
                generations.push(self.request(api_key, templated).await);
            }
            generations
        }
    }

    async fn request(&self, api_key: &ApiKey, templated: &TemplatedPrompt) -> (Category, Generation) {
        tracing::debug!("📡 Requesting {} code", templated.category);

        let generation = self.client.generate_content(api_key, &templated.text).await;
        match &generation {
            Ok(text) => tracing::info!(
                "✅ {} code generated ({} chars)",
                templated.category,
                text.chars().count()
            ),
            Err(e) => tracing::warn!("⚠️ {} generation failed: {}", templated.category, e),
        }

        (templated.category, generation)
    }

    async fn persist(&self, generations: Vec<(Category, Generation)>) -> Result<Vec<Artifact>> {
        let output_dir = self.storage.base_path();
        let mut artifacts = Vec::with_capacity(generations.len());

        // 依 frontend、backend、testing 順序寫入，失敗的結果也照樣寫入
        for (category, generation) in generations {
            let content = render_generation(&generation);
            self.storage
                .write_file(category.file_name(), content.as_bytes())
                .await?;

            artifacts.push(Artifact {
                category,
                path: output_dir.join(category.file_name()),
                generation,
            });
        }

        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::utils::error::{GenerationError, GeneratorError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        base_path: PathBuf,
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        writes: Arc<Mutex<Vec<String>>>,
        fail_on: Option<&'static str>,
    }

    impl Default for MockStorage {
        fn default() -> Self {
            Self::at("out")
        }
    }

    impl MockStorage {
        fn at(base_path: &str) -> Self {
            Self {
                base_path: PathBuf::from(base_path),
                files: Arc::default(),
                writes: Arc::default(),
                fail_on: None,
            }
        }

        fn failing_on(path: &'static str) -> Self {
            Self {
                fail_on: Some(path),
                ..Self::default()
            }
        }

        async fn get_file(&self, path: &str) -> Option<String> {
            let files = self.files.lock().await;
            files
                .get(path)
                .map(|data| String::from_utf8_lossy(data).into_owned())
        }
    }

    impl Storage for MockStorage {
        fn base_path(&self) -> &Path {
            &self.base_path
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            if self.fail_on == Some(path) {
                return Err(GeneratorError::IoError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.writes.lock().await.push(path.to_string());
            self.files.lock().await.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    /// 固定回傳內容的用戶端，可指定某個類別失敗
    #[derive(Default)]
    struct StubClient {
        calls: AtomicUsize,
        prompts: std::sync::Mutex<Vec<String>>,
        fail: Option<Category>,
        reply: &'static str,
    }

    impl StubClient {
        fn replying(reply: &'static str) -> Self {
            Self {
                reply,
                ..Self::default()
            }
        }

        fn failing(category: Category, reply: &'static str) -> Self {
            Self {
                fail: Some(category),
                reply,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl GenerationClient for StubClient {
        async fn generate_content(&self, api_key: &ApiKey, prompt: &str) -> Generation {
            assert_eq!(api_key.expose(), "test-key");
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());

            match self.fail {
                Some(category) if prompt.starts_with(category.instruction()) => {
                    Err(GenerationError::Status {
                        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                        message: Some("model overloaded".to_string()),
                    })
                }
                _ => Ok(self.reply.to_string()),
            }
        }
    }

    /// 收集目前執行緒上的 tracing 輸出
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn start() -> (Self, tracing::subscriber::DefaultGuard) {
            let logs = Self::default();
            let writer = logs.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_writer(move || writer.clone())
                .with_ansi(false)
                .with_max_level(tracing::Level::DEBUG)
                .finish();
            (logs, tracing::subscriber::set_default(subscriber))
        }

        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn config_with_key() -> GeneratorConfig {
        GeneratorConfig::default().with_api_key("test-key")
    }

    #[tokio::test]
    async fn test_missing_key_short_circuits() {
        let storage = MockStorage::default();
        let pipeline = CodegenPipeline::new(
            storage.clone(),
            StubClient::replying("X"),
            GeneratorConfig::default(),
        );

        let result = pipeline.generate("build a todo app").await.unwrap();

        assert_eq!(result.summary, MISSING_KEY_MESSAGE);
        assert!(result.artifacts.is_none());
        assert!(result.output_dir.is_none());
        assert_eq!(pipeline.client.calls.load(Ordering::SeqCst), 0);
        assert!(storage.files.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_all_categories_generated_and_written() {
        let storage = MockStorage::default();
        let pipeline = CodegenPipeline::new(storage.clone(), StubClient::replying("X"), config_with_key());

        let result = pipeline.generate("build a todo app").await.unwrap();

        assert_eq!(pipeline.client.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            result.into_tuple(),
            (
                COMPLETION_MESSAGE.to_string(),
                Some("X".to_string()),
                Some("X".to_string()),
                Some("X".to_string()),
                Some("out".to_string()),
            )
        );
        for category in Category::ALL {
            assert_eq!(storage.get_file(category.file_name()).await.as_deref(), Some("X"));
        }
    }

    #[tokio::test]
    async fn test_sequential_order_of_calls_and_writes() {
        let storage = MockStorage::default();
        let pipeline = CodegenPipeline::new(storage.clone(), StubClient::replying("X"), config_with_key());

        pipeline.generate("a wiki").await.unwrap();

        let prompts = pipeline.client.prompts.lock().unwrap().clone();
        let expected: Vec<String> = Category::ALL
            .iter()
            .map(|c| format!("{}a wiki", c.instruction()))
            .collect();
        assert_eq!(prompts, expected);

        let writes = storage.writes.lock().await.clone();
        assert_eq!(
            writes,
            vec!["frontend_app.jsx", "backend_main.py", "test_backend.py"]
        );
    }

    #[tokio::test]
    async fn test_backend_failure_does_not_block_other_stages() {
        let storage = MockStorage::default();
        let pipeline = CodegenPipeline::new(
            storage.clone(),
            StubClient::failing(Category::Backend, "ok"),
            config_with_key(),
        );

        let result = pipeline.generate("build a todo app").await.unwrap();

        assert_eq!(pipeline.client.calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.failed_categories(), vec![Category::Backend]);
        assert_eq!(result.text(Category::Frontend).as_deref(), Some("ok"));
        assert_eq!(result.text(Category::Testing).as_deref(), Some("ok"));

        let backend = result.text(Category::Backend).unwrap();
        assert!(backend.starts_with("Error during API request:"));
        assert!(backend.contains("model overloaded"));

        // 錯誤訊息也會寫入檔案
        assert_eq!(storage.get_file("backend_main.py").await, Some(backend));
        assert_eq!(storage.get_file("frontend_app.jsx").await.as_deref(), Some("ok"));
        assert_eq!(storage.get_file("test_backend.py").await.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_write_failure_propagates() {
        let storage = MockStorage::failing_on("backend_main.py");
        let pipeline = CodegenPipeline::new(storage.clone(), StubClient::replying("X"), config_with_key());

        let err = pipeline.generate("build a todo app").await.unwrap_err();

        assert!(matches!(err, GeneratorError::IoError(_)));
        // 所有 API 呼叫都已完成，只寫入了第一個檔案
        assert_eq!(pipeline.client.calls.load(Ordering::SeqCst), 3);
        assert_eq!(storage.writes.lock().await.clone(), vec!["frontend_app.jsx"]);
    }

    #[tokio::test]
    async fn test_parallel_dispatch_same_result_shape() {
        let storage = MockStorage::default();
        let config = GeneratorConfig {
            parallel: true,
            ..config_with_key()
        };
        let pipeline = CodegenPipeline::new(
            storage.clone(),
            StubClient::failing(Category::Testing, "Y"),
            config,
        );

        let result = pipeline.generate("a game").await.unwrap();

        assert_eq!(pipeline.client.calls.load(Ordering::SeqCst), 3);
        let categories: Vec<Category> = result
            .artifacts
            .as_ref()
            .unwrap()
            .iter()
            .map(|a| a.category)
            .collect();
        assert_eq!(categories, Category::ALL.to_vec());
        assert_eq!(result.failed_categories(), vec![Category::Testing]);
        assert_eq!(
            storage.writes.lock().await.clone(),
            vec!["frontend_app.jsx", "backend_main.py", "test_backend.py"]
        );
    }

    #[tokio::test]
    async fn test_artifact_paths_under_output_dir() {
        let pipeline = CodegenPipeline::new(MockStorage::default(), StubClient::replying("X"), config_with_key());

        let result = pipeline.generate("x").await.unwrap();
        let artifact = result.artifact(Category::Testing).unwrap();

        assert_eq!(artifact.path, Path::new("out").join("test_backend.py"));
    }

    #[tokio::test]
    async fn test_output_location_comes_from_storage() {
        let storage = MockStorage::at("written-here");
        let config = GeneratorConfig {
            output_dir: "configured-elsewhere".to_string(),
            ..config_with_key()
        };
        let pipeline = CodegenPipeline::new(storage.clone(), StubClient::replying("X"), config);

        let result = pipeline.generate("x").await.unwrap();

        assert_eq!(result.output_dir.as_deref(), Some("written-here"));
        for artifact in result.artifacts.as_ref().unwrap() {
            assert_eq!(
                artifact.path,
                Path::new("written-here").join(artifact.category.file_name())
            );
            assert!(storage.get_file(artifact.category.file_name()).await.is_some());
        }
    }

    #[tokio::test]
    async fn test_missing_key_logged_at_info() {
        let (logs, _guard) = CapturedLogs::start();
        let pipeline = CodegenPipeline::new(
            MockStorage::default(),
            StubClient::replying("X"),
            GeneratorConfig::default(),
        );

        pipeline.generate("build a todo app").await.unwrap();

        let output = logs.contents();
        let line = output
            .lines()
            .find(|l| l.contains("No Gemini API key configured"))
            .unwrap();
        assert!(line.contains("INFO"));
        assert!(!output.contains("WARN"));
    }

    #[tokio::test]
    async fn test_logged_sizes_count_chars() {
        let (logs, _guard) = CapturedLogs::start();
        let pipeline = CodegenPipeline::new(MockStorage::default(), StubClient::replying("日本語"), config_with_key());

        // 5 個字元、6 個位元組
        pipeline.generate("héllo").await.unwrap();

        let output = logs.contents();
        assert!(output.contains("(5 chars prompt)"));
        assert!(output.contains("code generated (3 chars)"));
        assert!(!output.contains("(9 chars)"));
    }
}
