use dotenv::dotenv;
use reqwest::{Client, StatusCode};
use std::env;
use std::error::Error;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::endpoints::{
    GeminiAvailableModel, GenerateContentRequest, GenerateContentResponse, Provider,
    DEFAULT_API_BASE, DEFAULT_MODEL, GEMINI_MODELS,
};

#[derive(Debug)]
pub enum ApiConnectionError {
    MissingApiKey(String),
    NetworkError(reqwest::Error),
    SerializationError(serde_json::Error),
    ApiError {
        status: StatusCode,
        error_body: String,
    },
}

impl ApiConnectionError {
    /// Quota exhaustion is expected under load; callers log it at a lower severity.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ApiConnectionError::ApiError { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS
            }
            ApiConnectionError::NetworkError(err) => {
                err.status() == Some(StatusCode::TOO_MANY_REQUESTS)
            }
            _ => false,
        }
    }

    pub fn empty_content(what: &str) -> Self {
        ApiConnectionError::ApiError {
            status: StatusCode::NO_CONTENT,
            error_body: format!("API returned empty content for {}", what),
        }
    }

    pub fn is_empty_content(&self) -> bool {
        matches!(
            self,
            ApiConnectionError::ApiError { status, .. } if *status == StatusCode::NO_CONTENT
        )
    }
}

impl fmt::Display for ApiConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiConnectionError::MissingApiKey(key_name) => {
                write!(f, "API key not found in environment: {}", key_name)
            }
            ApiConnectionError::NetworkError(err) => write!(f, "Network error: {}", err),
            ApiConnectionError::SerializationError(err) => {
                write!(f, "Serialization error: {}", err)
            }
            ApiConnectionError::ApiError { status, error_body } => {
                write!(f, "API error {}: {}", status, error_body)
            }
        }
    }
}

impl Error for ApiConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiConnectionError::NetworkError(err) => Some(err),
            ApiConnectionError::SerializationError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiConnectionError {
    fn from(err: reqwest::Error) -> Self {
        ApiConnectionError::NetworkError(err)
    }
}

impl From<serde_json::Error> for ApiConnectionError {
    fn from(err: serde_json::Error) -> Self {
        ApiConnectionError::SerializationError(err)
    }
}

impl Provider {
    pub fn gemini(api_key_env_var_name: &str) -> Result<Self, ApiConnectionError> {
        Self::gemini_with(
            api_key_env_var_name,
            DEFAULT_MODEL,
            DEFAULT_API_BASE,
            Duration::from_secs(60),
        )
    }

    pub fn gemini_with(
        api_key_env_var_name: &str,
        model: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ApiConnectionError> {
        dotenv().ok();
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::Gemini {
            api_key_env_var: api_key_env_var_name.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn get_available_models(&self) -> Vec<GeminiAvailableModel> {
        match self {
            Provider::Gemini { .. } => GEMINI_MODELS.to_vec(),
        }
    }

    pub fn model_name(&self) -> &str {
        match self {
            Provider::Gemini { model, .. } => model,
        }
    }

    /// Models missing from the known list are assumed to support the search tool.
    pub fn supports_search_grounding(&self) -> bool {
        self.get_available_models()
            .iter()
            .find(|m| m.model_name == self.model_name())
            .map_or(true, |m| m.supports_search_grounding)
    }

    pub async fn call_generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiConnectionError> {
        match self {
            Provider::Gemini {
                api_key_env_var,
                model,
                base_url,
                client,
            } => {
                dotenv().ok();
                let actual_api_key = env::var(api_key_env_var)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| ApiConnectionError::MissingApiKey(api_key_env_var.clone()))?;

                let url = format!("{}/v1beta/models/{}:generateContent", base_url, model);
                debug!(model = %model, contents = request.contents.len(), "calling generateContent");

                let response = client
                    .post(&url)
                    .header("x-goog-api-key", actual_api_key)
                    .header("Content-Type", "application/json")
                    .json(request)
                    .send()
                    .await?;

                if response.status().is_success() {
                    let body = response.text().await?;
                    let parsed = serde_json::from_str::<GenerateContentResponse>(&body)?;
                    Ok(parsed)
                } else {
                    let status = response.status();
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error body".to_string());
                    Err(ApiConnectionError::ApiError { status, error_body })
                }
            }
        }
    }
}

/// Strips a surrounding markdown code fence (```json ... ``` or ``` ... ```).
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    if !trimmed.ends_with("```") {
        return trimmed;
    }
    if let Some(inner) = trimmed.strip_prefix("```json") {
        inner.trim_end_matches("```").trim()
    } else if let Some(inner) = trimmed.strip_prefix("```") {
        inner.trim_end_matches("```").trim()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[1,2]\n```"), "[1,2]");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn rate_limit_sniff_only_matches_429() {
        let limited = ApiConnectionError::ApiError {
            status: StatusCode::TOO_MANY_REQUESTS,
            error_body: "quota".to_string(),
        };
        let other = ApiConnectionError::ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error_body: "boom".to_string(),
        };
        assert!(limited.is_rate_limited());
        assert!(!other.is_rate_limited());
        assert!(!ApiConnectionError::MissingApiKey("X".to_string()).is_rate_limited());
    }

    #[test]
    fn search_grounding_follows_model_list() {
        let lite = Provider::gemini_with("K", "gemini-2.0-flash-lite", DEFAULT_API_BASE, Duration::from_secs(1))
            .unwrap();
        let unknown = Provider::gemini_with("K", "gemini-9-ultra", DEFAULT_API_BASE, Duration::from_secs(1))
            .unwrap();
        assert!(!lite.supports_search_grounding());
        assert!(unknown.supports_search_grounding());
        assert!(Provider::gemini("K").unwrap().supports_search_grounding());
    }
}
