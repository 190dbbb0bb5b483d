use std::sync::Arc;

use tracing::{debug, info};

use crate::conversation::ChatLog;
use crate::error::SessionError;
use crate::fallback::{random_tip, COMMENT_REPLY_EMPTY, COMMENT_REPLY_FALLBACK, DAILY_TIP_EMPTY};
use crate::gateway::{log_failure, AiGateway};
use crate::media::{video_search_url, ImageSize};
use crate::model::{ChatTurn, Comment, Preferences, Recipe};
use crate::request::{RequestKey, RequestStatus, RequestTracker};
use crate::store::RecipeStore;
use crate::threads::{derive_threads, MessageThread};
use crate::view::{View, ViewController};

pub struct Session {
    gateway: Arc<dyn AiGateway>,
    store: RecipeStore,
    views: ViewController,
    chat: ChatLog,
    requests: RequestTracker,
    ingredients: Vec<String>,
    preferences: Preferences,
    daily_tip: Option<String>,
    has_notification: bool,
}

impl Session {
    pub fn new(gateway: Arc<dyn AiGateway>, image_size: ImageSize) -> Self {
        Session {
            gateway,
            store: RecipeStore::new(image_size),
            views: ViewController::new(),
            chat: ChatLog::new(),
            requests: RequestTracker::new(),
            ingredients: Vec::new(),
            preferences: Preferences::default(),
            daily_tip: None,
            has_notification: false,
        }
    }

    pub fn gateway_name(&self) -> &str {
        self.gateway.name()
    }

    pub fn view(&self) -> &View {
        self.views.current()
    }

    pub fn results(&self) -> &[Recipe] {
        self.store.results()
    }

    pub fn favorites(&self) -> &[Recipe] {
        self.store.favorites()
    }

    pub fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.store.get(id)
    }

    /// The recipe the detail view shows, resolved by id on every read.
    pub fn active_recipe(&self) -> Option<&Recipe> {
        self.views
            .active_recipe_id()
            .and_then(|id| self.store.get(id))
    }

    pub fn chat_turns(&self) -> &[ChatTurn] {
        self.chat.turns()
    }

    pub fn request_status(&self, key: &RequestKey) -> RequestStatus {
        self.requests.status(key)
    }

    pub fn has_notification(&self) -> bool {
        self.has_notification
    }

    pub fn daily_tip(&self) -> Option<&str> {
        self.daily_tip.as_deref()
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.preferences
    }

    /// Adds a trimmed ingredient. Single characters and duplicates are refused.
    pub fn add_ingredient(&mut self, input: &str) -> bool {
        let ingredient = input.trim();
        if ingredient.chars().count() <= 1 || self.ingredients.iter().any(|i| i == ingredient) {
            return false;
        }
        self.ingredients.push(ingredient.to_string());
        true
    }

    pub fn remove_ingredient(&mut self, ingredient: &str) -> bool {
        let before = self.ingredients.len();
        self.ingredients.retain(|i| i != ingredient);
        self.ingredients.len() != before
    }

    /// Resets the ingredient list and preferences. Results stay on screen.
    pub fn clear_all(&mut self) {
        self.ingredients.clear();
        self.preferences.clear();
    }

    fn begin(&mut self, key: &RequestKey) -> Result<(), SessionError> {
        if self.requests.begin(key.clone()) {
            Ok(())
        } else {
            Err(SessionError::AlreadyPending(key.clone()))
        }
    }

    /// Replaces the results with a fresh batch for the current ingredients and preferences.
    pub async fn search(&mut self) -> Result<&[Recipe], SessionError> {
        let key = RequestKey::Search;
        self.begin(&key)?;
        info!(ingredients = ?self.ingredients, "searching recipes");
        self.store
            .search(self.gateway.as_ref(), &self.ingredients, &self.preferences)
            .await;
        self.requests.succeed(key);
        let store = &self.store;
        self.requests.forget_recipes(|id| store.get(id).is_some());
        Ok(self.store.results())
    }

    pub fn open_recipe(&mut self, id: &str) -> Result<&Recipe, SessionError> {
        if !self.store.select(id) {
            return Err(SessionError::RecipeNotFound(id.to_string()));
        }
        self.views.open_recipe(id);
        self.store
            .get(id)
            .ok_or_else(|| SessionError::RecipeNotFound(id.to_string()))
    }

    pub fn navigate(&mut self, view: View) -> Result<(), SessionError> {
        match view {
            View::RecipeDetail { recipe_id } => {
                self.open_recipe(&recipe_id)?;
            }
            other => {
                if other == View::Messages {
                    self.has_notification = false;
                }
                self.store.clear_active();
                self.views.navigate(other);
            }
        }
        Ok(())
    }

    pub fn back(&mut self) -> &View {
        self.views.back(&self.store);
        self.store.clear_active();
        self.views.current()
    }

    /// Returns the new favorite membership of `id`.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<bool, SessionError> {
        let now_favorite = self
            .store
            .toggle_favorite(id)
            .ok_or_else(|| SessionError::RecipeNotFound(id.to_string()))?;
        info!(recipe = id, favorite = now_favorite, "favorite toggled");
        Ok(now_favorite)
    }

    pub fn update_recipe(&mut self, updated: Recipe) -> Result<(), SessionError> {
        if self.store.get(&updated.id).is_none() {
            return Err(SessionError::RecipeNotFound(updated.id));
        }
        self.store.update_recipe(updated);
        Ok(())
    }

    /// Swaps a recipe for a version without `missing_ingredients`.
    ///
    /// The new record takes the old one's place everywhere it was held, and
    /// the detail view follows it. On failure nothing changes and the error's
    /// `user_message()` is the notice to show.
    pub async fn regenerate(
        &mut self,
        recipe_id: &str,
        missing_ingredients: &str,
    ) -> Result<Recipe, SessionError> {
        let key = RequestKey::Regenerate(recipe_id.to_string());
        self.begin(&key)?;
        match self
            .store
            .regenerate(self.gateway.as_ref(), recipe_id, missing_ingredients)
            .await
        {
            Ok(recipe) => {
                self.requests.succeed(key);
                if self.views.active_recipe_id() == Some(recipe_id) {
                    self.views.open_recipe(&recipe.id);
                }
                Ok(recipe)
            }
            Err(e) => {
                self.requests.fail(key, e.user_message());
                Err(e)
            }
        }
    }

    /// Returns the recipe's video link, looking one up on first use.
    ///
    /// When the lookup finds nothing the link is a YouTube search for the title.
    pub async fn find_video(&mut self, recipe_id: &str) -> Result<String, SessionError> {
        let recipe = self
            .store
            .get(recipe_id)
            .ok_or_else(|| SessionError::RecipeNotFound(recipe_id.to_string()))?;
        if let Some(url) = &recipe.video_url {
            return Ok(url.clone());
        }
        let title = recipe.title.clone();

        let key = RequestKey::Video(recipe_id.to_string());
        self.begin(&key)?;
        let url = match self.gateway.find_video_url(&title).await {
            Some(url) => url,
            None => {
                debug!(recipe = recipe_id, "no video found, using search link");
                video_search_url(&title)
            }
        };
        self.store.set_video_url(recipe_id, &url)?;
        self.requests.succeed(key);
        Ok(url)
    }

    /// Appends a comment to every copy of the recipe. An assistant comment
    /// raises the notification unless the Messages view is already open.
    pub fn add_comment(&mut self, recipe_id: &str, comment: Comment) -> Result<(), SessionError> {
        let from_assistant = comment.is_assistant();
        self.store.add_comment(recipe_id, comment)?;
        if from_assistant && !self.views.is_messages_open() {
            self.has_notification = true;
        }
        Ok(())
    }

    /// Posts a user comment and the assistant's reply to it. Returns the reply.
    pub async fn submit_comment(
        &mut self,
        recipe_id: &str,
        author: &str,
        text: &str,
    ) -> Result<Comment, SessionError> {
        let (author, text) = (author.trim(), text.trim());
        if author.is_empty() {
            return Err(SessionError::EmptyInput("author"));
        }
        if text.is_empty() {
            return Err(SessionError::EmptyInput("comment"));
        }
        let title = self
            .store
            .get(recipe_id)
            .map(|r| r.title.clone())
            .ok_or_else(|| SessionError::RecipeNotFound(recipe_id.to_string()))?;

        let key = RequestKey::CommentReply(recipe_id.to_string());
        self.begin(&key)?;

        let question = Comment::user(author, text);
        let question_id = question.id.clone();
        if let Err(e) = self.add_comment(recipe_id, question) {
            self.requests.fail(key, e.to_string());
            return Err(e);
        }

        let reply_text = match self.gateway.comment_reply(&title, text, author).await {
            Ok(reply) => reply,
            Err(e) if e.is_empty_content() => COMMENT_REPLY_EMPTY.to_string(),
            Err(e) => {
                log_failure("comment_reply", &e);
                COMMENT_REPLY_FALLBACK.to_string()
            }
        };

        let reply = Comment::assistant(&reply_text).reply_to(&question_id);
        self.add_comment(recipe_id, reply.clone())?;
        self.requests.succeed(key);
        Ok(reply)
    }

    pub fn delete_comment(&mut self, recipe_id: &str, comment_id: &str) -> Result<(), SessionError> {
        self.store.delete_comment(recipe_id, comment_id)
    }

    /// Assistant replies across favorites and results, newest first.
    pub fn message_threads(&self) -> Vec<MessageThread> {
        derive_threads(self.store.all_known())
    }

    /// Fetches the tip of the day and raises the notification.
    pub async fn load_daily_tip(&mut self) -> Result<&str, SessionError> {
        let key = RequestKey::DailyTip;
        self.begin(&key)?;
        let tip = match self.gateway.daily_tip().await {
            Ok(tip) => tip,
            Err(e) if e.is_empty_content() => DAILY_TIP_EMPTY.to_string(),
            Err(e) => {
                log_failure("daily_tip", &e);
                random_tip().to_string()
            }
        };
        self.requests.succeed(key);
        self.has_notification = true;
        let tip = self.daily_tip.insert(tip);
        Ok(tip.as_str())
    }

    /// Sends a chat message. `Ok(None)` means blank input was ignored.
    pub async fn chat(&mut self, text: &str) -> Result<Option<&ChatTurn>, SessionError> {
        let key = RequestKey::Chat;
        self.begin(&key)?;
        let sent = self.chat.send(self.gateway.as_ref(), text).await.is_some();
        self.requests.succeed(key);
        Ok(if sent { self.chat.last() } else { None })
    }
}
