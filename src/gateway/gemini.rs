use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, error};

use super::AiGateway;
use crate::api_connection::endpoints::{
    Content, GenerateContentRequest, GenerationConfig, Schema, Tool,
};
use crate::api_connection::{strip_code_fence, ApiConnectionError, Provider};
use crate::media::{first_youtube_link, is_youtube_url};
use crate::model::{ChatRole, ChatTurn, RawRecipe};
use crate::prompt;

fn enum_of(values: &[&str], description: &str) -> Schema {
    let mut schema = Schema::of_type("STRING").described(description);
    schema.r#enum = Some(values.iter().map(|v| v.to_string()).collect());
    schema
}

fn string_list(description: &str) -> Schema {
    let mut schema = Schema::of_type("ARRAY").described(description);
    schema.items = Some(Box::new(Schema::of_type("STRING")));
    schema
}

/// Object schema for a single generated recipe.
pub fn recipe_schema() -> Schema {
    let mut properties = BTreeMap::new();
    properties.insert(
        "title".to_string(),
        Schema::of_type("STRING").described("Name of the recipe"),
    );
    properties.insert(
        "description".to_string(),
        Schema::of_type("STRING").described("Short, appetising description of the dish"),
    );
    properties.insert(
        "imagePromptEn".to_string(),
        Schema::of_type("STRING").described(
            "A detailed visual description of the dish in English, suitable for an AI image generator.",
        ),
    );
    properties.insert(
        "ingredients".to_string(),
        string_list("Ingredient list including quantities"),
    );
    properties.insert(
        "instructions".to_string(),
        string_list("Preparation steps, one step per item"),
    );
    properties.insert(
        "prepTime".to_string(),
        Schema::of_type("STRING").described("Preparation time"),
    );
    properties.insert(
        "difficulty".to_string(),
        enum_of(&["easy", "medium", "hard"], "Difficulty level"),
    );
    properties.insert(
        "mealSize".to_string(),
        enum_of(&["small", "large", "snack"], "Size of the meal"),
    );
    properties.insert(
        "healthTag".to_string(),
        enum_of(&["healthy", "indulgent", "balanced"], "Is this healthy or indulgent?"),
    );
    properties.insert(
        "kidFriendly".to_string(),
        Schema::of_type("BOOLEAN").described("Suitable for kids?"),
    );
    properties.insert(
        "isVegan".to_string(),
        Schema::of_type("BOOLEAN").described("Is the dish vegan?"),
    );
    properties.insert(
        "isVegetarian".to_string(),
        Schema::of_type("BOOLEAN").described("Is the dish vegetarian?"),
    );
    properties.insert(
        "matchScore".to_string(),
        Schema::of_type("INTEGER").described("Match score from 0 to 100"),
    );
    properties.insert("calories".to_string(), Schema::of_type("INTEGER"));
    properties.insert("tags".to_string(), string_list("Short tags"));

    let required = [
        "title",
        "description",
        "imagePromptEn",
        "ingredients",
        "instructions",
        "prepTime",
        "difficulty",
        "mealSize",
        "healthTag",
        "kidFriendly",
        "isVegan",
        "isVegetarian",
        "matchScore",
    ];

    let mut schema = Schema::of_type("OBJECT");
    schema.properties = Some(properties);
    schema.required = Some(required.iter().map(|r| r.to_string()).collect());
    schema
}

fn recipe_list_schema() -> Schema {
    let mut schema = Schema::of_type("ARRAY");
    schema.items = Some(Box::new(recipe_schema()));
    schema
}

fn json_config(schema: Schema) -> GenerationConfig {
    GenerationConfig {
        response_mime_type: Some("application/json".to_string()),
        response_schema: Some(schema),
        ..Default::default()
    }
}

/// Gateway backed by the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiGateway {
    provider: Provider,
}

impl GeminiGateway {
    pub fn new(provider: Provider) -> Self {
        GeminiGateway { provider }
    }

    async fn generate_text(
        &self,
        request: GenerateContentRequest,
        what: &str,
    ) -> Result<String, ApiConnectionError> {
        let response = self.provider.call_generate_content(&request).await?;
        let text = response
            .text()
            .ok_or_else(|| ApiConnectionError::empty_content(what))?;
        debug!(what, raw = %text, "model response");
        Ok(text)
    }

    async fn generate_json<T: serde::de::DeserializeOwned>(
        &self,
        request: GenerateContentRequest,
        what: &str,
    ) -> Result<T, ApiConnectionError> {
        let text = self.generate_text(request, what).await?;
        let content = strip_code_fence(&text);
        if content.is_empty() {
            return Err(ApiConnectionError::empty_content(what));
        }
        serde_json::from_str(content).map_err(|e| {
            debug!(what, error = %e, content, "failed to deserialize model output");
            ApiConnectionError::SerializationError(e)
        })
    }
}

#[async_trait]
impl AiGateway for GeminiGateway {
    async fn generate_recipes(&self, prompt_text: &str) -> Result<Vec<RawRecipe>, ApiConnectionError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt_text)],
            system_instruction: Some(Content::system(prompt::RECIPE_CHEF_INSTRUCTION)),
            generation_config: Some(json_config(recipe_list_schema())),
            tools: Vec::new(),
        };
        let mut recipes: Vec<RawRecipe> = self.generate_json(request, "recipe search").await?;
        recipes.truncate(prompt::RECIPES_PER_SEARCH);
        Ok(recipes)
    }

    async fn regenerate_recipe(
        &self,
        original_title: &str,
        missing_ingredients: &str,
    ) -> Result<RawRecipe, ApiConnectionError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt::regenerate_prompt(
                original_title,
                missing_ingredients,
            ))],
            system_instruction: Some(Content::system(prompt::SUBSTITUTION_CHEF_INSTRUCTION)),
            generation_config: Some(json_config(recipe_schema())),
            tools: Vec::new(),
        };
        self.generate_json(request, "recipe regeneration").await
    }

    async fn find_video_url(&self, recipe_title: &str) -> Option<String> {
        if !self.provider.supports_search_grounding() {
            debug!(model = self.provider.model_name(), "model has no search tool, skipping video lookup");
            return None;
        }
        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt::video_prompt(recipe_title))],
            tools: vec![Tool::google_search()],
            ..Default::default()
        };

        let response = match self.provider.call_generate_content(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!(recipe = recipe_title, error = %e, "video lookup failed");
                return None;
            }
        };

        if let Some(uri) = response
            .grounding_uris()
            .into_iter()
            .find(|uri| is_youtube_url(uri))
        {
            return Some(uri);
        }

        response.text().and_then(|text| first_youtube_link(&text))
    }

    async fn chat(&self, history: &[ChatTurn], message: &str) -> Result<String, ApiConnectionError> {
        // The API rejects a conversation that opens with a model turn.
        let mut contents: Vec<Content> = history
            .iter()
            .skip_while(|turn| turn.role == ChatRole::Model)
            .map(|turn| Content::with_role(turn.role.as_str(), turn.text.as_str()))
            .collect();
        contents.push(Content::user(message));

        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::system(prompt::CHAT_PERSONA_INSTRUCTION)),
            ..Default::default()
        };
        self.generate_text(request, "chat").await
    }

    async fn comment_reply(
        &self,
        recipe_title: &str,
        comment: &str,
        author: &str,
    ) -> Result<String, ApiConnectionError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt::comment_reply_prompt(
                recipe_title,
                comment,
                author,
            ))],
            ..Default::default()
        };
        self.generate_text(request, "comment reply").await
    }

    async fn daily_tip(&self) -> Result<String, ApiConnectionError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt::daily_tip_prompt())],
            ..Default::default()
        };
        self.generate_text(request, "daily tip").await
    }

    fn name(&self) -> &str {
        self.provider.model_name()
    }
}
