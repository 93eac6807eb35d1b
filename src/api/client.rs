use crate::gender::Gender;
use crate::models::{ChatMessage, ChatReply, Lesson, ReviewStats, VocabularyItem};
use reqwest::StatusCode;
use serde::Serialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_USER: &str = "local";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("lesson not found")]
    LessonNotFound,
    #[error("speech synthesis failed with status {0}")]
    TtsRequestFailed(StatusCode),
}

/// Thin client over the learning backend. All learner state lives behind
/// these endpoints; the client never computes scheduling itself.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    user_id: String,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    message: &'a str,
    conversation_history: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    lesson_id: Option<&'a str>,
}

#[derive(Serialize)]
struct TtsBody<'a> {
    text: &'a str,
    language: &'a str,
    gender: Gender,
}

#[derive(Serialize)]
struct QualityBody {
    quality: u8,
}

impl ApiClient {
    /// Base URL and learner id come from the environment so the same binary
    /// can point at a local or hosted backend.
    pub fn from_env() -> ApiClient {
        let base_url =
            std::env::var("ULPAN_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let user_id = std::env::var("ULPAN_USER").unwrap_or_else(|_| DEFAULT_USER.to_string());
        ApiClient::new(&base_url, &user_id)
    }

    pub fn new(base_url: &str, user_id: &str) -> ApiClient {
        ApiClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_lesson(&self, id: &str) -> Result<Lesson, ApiError> {
        let response = self
            .http
            .get(self.endpoint(&format!("/api/interactive-lessons/{}", id)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::LessonNotFound);
        }
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    pub async fn chat(
        &self,
        message: &str,
        history: &[ChatMessage],
        lesson_id: Option<&str>,
    ) -> Result<ChatReply, ApiError> {
        let response = self
            .http
            .post(self.endpoint("/api/chat/"))
            .json(&ChatBody {
                message,
                conversation_history: history,
                lesson_id,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    /// Synthesize speech for already-resolved text. The caller handles the
    /// local-synthesis fallback on `TtsRequestFailed`.
    pub async fn synthesize(
        &self,
        text: &str,
        language: &str,
        gender: Gender,
    ) -> Result<Vec<u8>, ApiError> {
        let response = self
            .http
            .post(self.endpoint("/api/tts/"))
            .json(&TtsBody {
                text,
                language,
                gender,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::TtsRequestFailed(response.status()));
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Fetch pre-recorded audio from a full URL supplied by authored content.
    pub async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn stats(&self) -> Result<ReviewStats, ApiError> {
        let response = self
            .http
            .get(self.endpoint("/api/vocabulary/stats"))
            .query(&[("user_id", self.user_id.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    pub async fn review_queue(&self, limit: usize) -> Result<Vec<VocabularyItem>, ApiError> {
        let response = self
            .http
            .get(self.endpoint("/api/vocabulary/review"))
            .query(&[
                ("user_id", self.user_id.as_str()),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    /// Post a recall rating. The response body is unused; only the status
    /// matters.
    pub async fn submit_quality(&self, word_id: &str, quality: u8) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.endpoint(&format!("/api/vocabulary/review/{}", word_id)))
            .json(&QualityBody { quality })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(())
    }
}
