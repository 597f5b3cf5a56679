use crate::domain::model::{ApiKey, Generation};
use crate::domain::ports::{ConfigProvider, GenerationClient};
use crate::utils::error::{GenerationError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

/// `generateContent` 請求內容
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest<'a> {
    pub contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    pub parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
pub struct Part<'a> {
    pub text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    pub fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<u16>,
    pub message: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

impl GenerateContentResponse {
    /// 取出 `candidates[0].content.parts[0].text`
    pub fn into_first_text(self) -> Generation {
        let missing_reason = self.missing_reason();
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or(GenerationError::MissingText {
                reason: missing_reason,
            })
    }

    fn missing_reason(&self) -> Option<String> {
        if let Some(message) = self.error.as_ref().and_then(|e| e.message.clone()) {
            return Some(message);
        }
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Some(format!("prompt blocked: {}", reason));
        }
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.clone())
            .map(|reason| format!("finish reason: {}", reason))
    }
}

/// Gemini generative language API 用戶端
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_endpoint: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_endpoint: api_endpoint.into(),
            model: model.into(),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_endpoint: config.api_endpoint().to_string(),
            model: config.model().to_string(),
        })
    }

    /// `<endpoint>/models/<model>:generateContent?key=<key>`
    pub fn request_url(&self, api_key: &ApiKey) -> std::result::Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!(
            "{}/models/{}:generateContent",
            self.api_endpoint.trim_end_matches('/'),
            self.model
        ))?;
        url.query_pairs_mut().append_pair("key", api_key.expose());
        Ok(url)
    }

    fn status_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|envelope| envelope.error.message)
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate_content(&self, api_key: &ApiKey, prompt: &str) -> Generation {
        let url = self.request_url(api_key)?;
        tracing::debug!(
            "📡 POST {}/models/{}:generateContent?key=***",
            self.api_endpoint.trim_end_matches('/'),
            self.model
        );

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("📡 API response status: {}", status);

        let body = response.text().await?;

        if !status.is_success() {
            return Err(GenerationError::Status {
                status,
                message: Self::status_message(&body),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        parsed.into_first_text()
    }
}
