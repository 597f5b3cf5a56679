use crate::utils::error::{GenerationError, GENERATION_ERROR_PREFIX};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// 產生的程式碼類別；順序即呼叫與寫檔順序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Frontend,
    Backend,
    Testing,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Frontend, Category::Backend, Category::Testing];

    /// 包在使用者提示前面的固定指示文字
    pub fn instruction(self) -> &'static str {
        match self {
            Category::Frontend => {
                "Generate complete React frontend code for the following project. \
                 Include main App component and basic UI: "
            }
            Category::Backend => {
                "Generate complete FastAPI backend for the following project. \
                 Include main.py, with endpoints and basic logic: "
            }
            Category::Testing => "Generate pytest tests for the backend of this project: ",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Category::Frontend => "frontend_app.jsx",
            Category::Backend => "backend_main.py",
            Category::Testing => "test_backend.py",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Frontend => "Frontend Code",
            Category::Backend => "Backend Code",
            Category::Testing => "Testing Code",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Frontend => "frontend",
            Category::Backend => "backend",
            Category::Testing => "testing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatedPrompt {
    pub category: Category,
    pub text: String,
}

/// API key；空字串視為未設定
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// 單一類別的產生結果：成功的文字或失敗原因
pub type Generation = std::result::Result<String, GenerationError>;

/// 將產生結果轉成要顯示與寫檔的文字；失敗時保留錯誤訊息
pub fn render_generation(generation: &Generation) -> String {
    match generation {
        Ok(text) => text.clone(),
        Err(e) => format!("{}{}", GENERATION_ERROR_PREFIX, e),
    }
}

#[derive(Debug)]
pub struct Artifact {
    pub category: Category,
    pub path: PathBuf,
    pub generation: Generation,
}

impl Artifact {
    pub fn content(&self) -> String {
        render_generation(&self.generation)
    }

    pub fn is_success(&self) -> bool {
        self.generation.is_ok()
    }
}

/// 一次 pipeline 執行的結果
#[derive(Debug)]
pub struct RunResult {
    pub summary: String,
    /// 缺少 API key 而提前結束時為 `None`
    pub artifacts: Option<Vec<Artifact>>,
    pub output_dir: Option<String>,
}

impl RunResult {
    pub fn artifact(&self, category: Category) -> Option<&Artifact> {
        self.artifacts
            .as_ref()?
            .iter()
            .find(|a| a.category == category)
    }

    pub fn text(&self, category: Category) -> Option<String> {
        self.artifact(category).map(Artifact::content)
    }

    pub fn failed_categories(&self) -> Vec<Category> {
        self.artifacts
            .iter()
            .flatten()
            .filter(|a| !a.is_success())
            .map(|a| a.category)
            .collect()
    }

    /// (summary, frontend, backend, testing, output dir)
    pub fn into_tuple(
        self,
    ) -> (
        String,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
    ) {
        let frontend = self.text(Category::Frontend);
        let backend = self.text(Category::Backend);
        let testing = self.text(Category::Testing);
        (self.summary, frontend, backend, testing, self.output_dir)
    }
}
