use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Mutex;

use super::AiGateway;
use crate::api_connection::ApiConnectionError;
use crate::model::{ChatTurn, RawRecipe};

#[derive(Debug, Default)]
pub struct ScriptedGateway {
    recipes: Option<Vec<RawRecipe>>,
    regenerated: Option<RawRecipe>,
    video_url: Option<String>,
    chat_reply: Option<String>,
    comment_reply: Option<String>,
    tip: Option<String>,
    rate_limited: bool,
    /// Operation names in call order.
    calls: Mutex<Vec<String>>,
    /// History length seen by each `chat` call.
    chat_history_lens: Mutex<Vec<usize>>,
}

impl ScriptedGateway {
    /// A gateway with nothing scripted: every call fails.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn with_recipes(mut self, recipes: Vec<RawRecipe>) -> Self {
        self.recipes = Some(recipes);
        self
    }

    pub fn with_regenerated(mut self, recipe: RawRecipe) -> Self {
        self.regenerated = Some(recipe);
        self
    }

    pub fn with_video_url(mut self, url: &str) -> Self {
        self.video_url = Some(url.to_string());
        self
    }

    pub fn with_chat_reply(mut self, reply: &str) -> Self {
        self.chat_reply = Some(reply.to_string());
        self
    }

    pub fn with_comment_reply(mut self, reply: &str) -> Self {
        self.comment_reply = Some(reply.to_string());
        self
    }

    pub fn with_tip(mut self, tip: &str) -> Self {
        self.tip = Some(tip.to_string());
        self
    }

    /// Unscripted operations fail with HTTP 429 instead of 503.
    pub fn rate_limited(mut self) -> Self {
        self.rate_limited = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn chat_history_lens(&self) -> Vec<usize> {
        self.chat_history_lens
            .lock()
            .map(|lens| lens.clone())
            .unwrap_or_default()
    }

    fn record(&self, operation: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(operation.to_string());
        }
    }

    fn unavailable(&self, operation: &str) -> ApiConnectionError {
        let status = if self.rate_limited {
            StatusCode::TOO_MANY_REQUESTS
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        ApiConnectionError::ApiError {
            status,
            error_body: format!("no scripted response for {}", operation),
        }
    }

    fn answer<T: Clone>(&self, operation: &str, slot: &Option<T>) -> Result<T, ApiConnectionError> {
        self.record(operation);
        slot.clone().ok_or_else(|| self.unavailable(operation))
    }
}

#[async_trait]
impl AiGateway for ScriptedGateway {
    async fn generate_recipes(&self, _prompt: &str) -> Result<Vec<RawRecipe>, ApiConnectionError> {
        self.answer("generate_recipes", &self.recipes)
    }

    async fn regenerate_recipe(
        &self,
        _original_title: &str,
        _missing_ingredients: &str,
    ) -> Result<RawRecipe, ApiConnectionError> {
        self.answer("regenerate_recipe", &self.regenerated)
    }

    async fn find_video_url(&self, _recipe_title: &str) -> Option<String> {
        self.record("find_video_url");
        self.video_url.clone()
    }

    async fn chat(&self, history: &[ChatTurn], _message: &str) -> Result<String, ApiConnectionError> {
        if let Ok(mut lens) = self.chat_history_lens.lock() {
            lens.push(history.len());
        }
        self.answer("chat", &self.chat_reply)
    }

    async fn comment_reply(
        &self,
        _recipe_title: &str,
        _comment: &str,
        _author: &str,
    ) -> Result<String, ApiConnectionError> {
        self.answer("comment_reply", &self.comment_reply)
    }

    async fn daily_tip(&self) -> Result<String, ApiConnectionError> {
        self.answer("daily_tip", &self.tip)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unscripted_calls_fail_and_are_recorded() {
        let gateway = ScriptedGateway::offline();
        assert!(gateway.daily_tip().await.is_err());
        assert_eq!(gateway.find_video_url("Soup").await, None);
        assert_eq!(gateway.calls(), vec!["daily_tip", "find_video_url"]);
    }

    #[tokio::test]
    async fn rate_limited_failures_report_429() {
        let gateway = ScriptedGateway::offline().rate_limited();
        let err = gateway.generate_recipes("eggs").await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn scripted_answers_are_returned() {
        let gateway = ScriptedGateway::offline().with_tip("Salt your pasta water.");
        assert_eq!(gateway.daily_tip().await.unwrap(), "Salt your pasta water.");
    }
}
