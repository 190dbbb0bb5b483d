mod gemini;
mod scripted;

pub use gemini::{recipe_schema, GeminiGateway};
pub use scripted::ScriptedGateway;

use async_trait::async_trait;
use tracing::{error, warn};

use crate::api_connection::ApiConnectionError;
use crate::model::{ChatTurn, RawRecipe};

/// Operations the session needs from the generator.
///
/// Implementations are stateless across calls: conversation history is
/// replayed by the caller on every `chat` turn.
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Structured generation of a batch of recipes (three are requested).
    async fn generate_recipes(&self, prompt: &str) -> Result<Vec<RawRecipe>, ApiConnectionError>;

    /// Single recipe reworked around the ingredients the user doesn't have.
    async fn regenerate_recipe(
        &self,
        original_title: &str,
        missing_ingredients: &str,
    ) -> Result<RawRecipe, ApiConnectionError>;

    /// Best-effort video lookup. Failures are reported as `None`.
    async fn find_video_url(&self, recipe_title: &str) -> Option<String>;

    async fn chat(&self, history: &[ChatTurn], message: &str) -> Result<String, ApiConnectionError>;

    async fn comment_reply(
        &self,
        recipe_title: &str,
        comment: &str,
        author: &str,
    ) -> Result<String, ApiConnectionError>;

    async fn daily_tip(&self) -> Result<String, ApiConnectionError>;

    fn name(&self) -> &str;
}

/// Logs a failure that the caller is about to paper over with canned content.
/// Quota exhaustion is routine and logs at `warn`; anything else at `error`.
pub fn log_failure(operation: &str, err: &ApiConnectionError) {
    if err.is_rate_limited() {
        warn!(operation, "generator quota exceeded, using fallback");
    } else {
        error!(operation, error = %err, "generator call failed, using fallback");
    }
}
