use std::collections::HashSet;

use tracing::{error, info, warn};

use crate::error::SessionError;
use crate::fallback::fallback_recipes;
use crate::gateway::{log_failure, AiGateway};
use crate::media::{image_url, ImageSize};
use crate::model::{next_id, Comment, Preferences, RawRecipe, Recipe};
use crate::prompt::search_prompt;

// results, favorites and active may hold copies of the same recipe; mutations apply to all of them by id.
#[derive(Debug, Default)]
pub struct RecipeStore {
    results: Vec<Recipe>,
    favorites: Vec<Recipe>,
    active: Option<Recipe>,
    image_size: ImageSize,
}

impl RecipeStore {
    pub fn new(image_size: ImageSize) -> Self {
        RecipeStore {
            image_size,
            ..Default::default()
        }
    }

    pub fn results(&self) -> &[Recipe] {
        &self.results
    }

    pub fn favorites(&self) -> &[Recipe] {
        &self.favorites
    }

    pub fn active(&self) -> Option<&Recipe> {
        self.active.as_ref()
    }

    pub fn in_results(&self, id: &str) -> bool {
        self.results.iter().any(|r| r.id == id)
    }

    pub fn in_favorites(&self, id: &str) -> bool {
        self.favorites.iter().any(|r| r.id == id)
    }

    /// Resolves an id against the active slot, then results, then favorites.
    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.active
            .as_ref()
            .filter(|r| r.id == id)
            .or_else(|| self.results.iter().find(|r| r.id == id))
            .or_else(|| self.favorites.iter().find(|r| r.id == id))
    }

    /// Favorites first, then results that aren't favorites.
    pub fn all_known(&self) -> Vec<&Recipe> {
        self.favorites
            .iter()
            .chain(self.results.iter().filter(|r| !self.in_favorites(&r.id)))
            .collect()
    }

    /// Opens `id` in the active slot. Returns `false` for unknown ids.
    pub fn select(&mut self, id: &str) -> bool {
        match self.get(id).cloned() {
            Some(recipe) => {
                self.active = Some(recipe);
                true
            }
            None => false,
        }
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Drops the current results. Favorites are kept.
    pub fn clear_results(&mut self) {
        self.results.clear();
    }

    fn materialize(&self, raws: Vec<RawRecipe>, prefix: &str) -> Vec<Recipe> {
        raws.into_iter()
            .enumerate()
            .map(|(index, raw)| {
                let mut recipe = Recipe::from_raw(raw, next_id(prefix), None);
                recipe.image_url = Some(image_url(
                    recipe.image_description(),
                    self.image_size,
                    index as u64,
                ));
                recipe
            })
            .collect()
    }

    /// Results that match a saved favorite by title are replaced by the saved record.
    /// Each favorite stands in for at most one result so ids stay unique.
    fn reconcile_with_favorites(&self, batch: Vec<Recipe>) -> Vec<Recipe> {
        let mut used: HashSet<&str> = HashSet::new();
        batch
            .into_iter()
            .map(|recipe| {
                match self
                    .favorites
                    .iter()
                    .find(|saved| saved.title == recipe.title && !used.contains(saved.id.as_str()))
                {
                    Some(saved) => {
                        used.insert(saved.id.as_str());
                        saved.clone()
                    }
                    None => recipe,
                }
            })
            .collect()
    }

    /// Generates a new batch of results.
    ///
    /// Never fails: a gateway error, or an empty answer, yields the canned
    /// fallback batch. An empty ingredient list clears the results without
    /// calling the gateway.
    pub async fn search(
        &mut self,
        gateway: &dyn AiGateway,
        ingredients: &[String],
        preferences: &Preferences,
    ) -> Vec<Recipe> {
        self.results.clear();
        if ingredients.is_empty() {
            return Vec::new();
        }

        let prompt = search_prompt(ingredients, preferences);
        let batch = match gateway.generate_recipes(&prompt).await {
            Ok(raws) if !raws.is_empty() => {
                info!(count = raws.len(), "generated recipes");
                self.materialize(raws, "gen")
            }
            Ok(_) => {
                warn!("generator returned no recipes, using fallback");
                self.materialize(fallback_recipes(), "fallback")
            }
            Err(e) => {
                log_failure("generate_recipes", &e);
                self.materialize(fallback_recipes(), "fallback")
            }
        };

        self.results = self.reconcile_with_favorites(batch);
        self.results.clone()
    }

    fn for_each_copy(&mut self, id: &str, mut apply: impl FnMut(&mut Recipe)) -> bool {
        let mut found = false;
        for recipe in self
            .results
            .iter_mut()
            .chain(self.favorites.iter_mut())
            .chain(self.active.iter_mut())
            .filter(|r| r.id == id)
        {
            apply(recipe);
            found = true;
        }
        found
    }

    /// Flips favorite membership. Returns the new membership, or `None` for unknown ids.
    pub fn toggle_favorite(&mut self, id: &str) -> Option<bool> {
        let now_favorite = if self.in_favorites(id) {
            self.favorites.retain(|r| r.id != id);
            false
        } else {
            let found = self
                .results
                .iter()
                .find(|r| r.id == id)
                .or_else(|| self.active.as_ref().filter(|r| r.id == id))
                .cloned()?;
            self.favorites.push(Recipe {
                is_favorite: true,
                ..found
            });
            true
        };

        self.for_each_copy(id, |r| r.is_favorite = now_favorite);
        Some(now_favorite)
    }

    /// Replaces every copy carrying `updated.id`. The favorites copy stays a favorite.
    pub fn update_recipe(&mut self, updated: Recipe) {
        self.replace(&updated.id.clone(), updated);
    }

    /// Puts `replacement` wherever `old_id` is held, keeping favorite membership.
    pub fn replace(&mut self, old_id: &str, mut replacement: Recipe) {
        replacement.is_favorite = self.in_favorites(old_id);
        self.for_each_copy(old_id, |r| *r = replacement.clone());
    }

    /// Reworks a recipe without the listed ingredients. Comments survive the new id.
    ///
    /// Unlike `search` there is no fallback: on failure the original is left as is.
    pub async fn regenerate(
        &mut self,
        gateway: &dyn AiGateway,
        recipe_id: &str,
        missing_ingredients: &str,
    ) -> Result<Recipe, SessionError> {
        let missing = missing_ingredients.trim();
        if missing.is_empty() {
            return Err(SessionError::EmptyInput("missing ingredients"));
        }
        let original = self
            .get(recipe_id)
            .cloned()
            .ok_or_else(|| SessionError::RecipeNotFound(recipe_id.to_string()))?;

        let raw = gateway
            .regenerate_recipe(&original.title, missing)
            .await
            .map_err(|e| {
                error!(recipe = recipe_id, error = %e, "regeneration failed");
                SessionError::Regeneration(e)
            })?;

        let seed = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let mut regenerated = Recipe::from_raw(raw, next_id("mod"), None);
        regenerated.image_url = Some(image_url(
            regenerated.image_description(),
            self.image_size,
            seed,
        ));
        regenerated.comments = original.comments.clone();

        info!(old = recipe_id, new = %regenerated.id, "recipe regenerated");
        self.replace(recipe_id, regenerated.clone());
        regenerated.is_favorite = self.in_favorites(&regenerated.id);
        Ok(regenerated)
    }

    pub fn add_comment(&mut self, recipe_id: &str, comment: Comment) -> Result<(), SessionError> {
        if self.for_each_copy(recipe_id, |r| r.comments.push(comment.clone())) {
            Ok(())
        } else {
            Err(SessionError::RecipeNotFound(recipe_id.to_string()))
        }
    }

    pub fn delete_comment(&mut self, recipe_id: &str, comment_id: &str) -> Result<(), SessionError> {
        let mut removed = false;
        let found = self.for_each_copy(recipe_id, |r| {
            let before = r.comments.len();
            r.comments.retain(|c| c.id != comment_id);
            removed |= r.comments.len() != before;
        });
        match (found, removed) {
            (false, _) => Err(SessionError::RecipeNotFound(recipe_id.to_string())),
            (true, false) => Err(SessionError::CommentNotFound {
                recipe_id: recipe_id.to_string(),
                comment_id: comment_id.to_string(),
            }),
            (true, true) => Ok(()),
        }
    }

    pub fn set_video_url(&mut self, recipe_id: &str, url: &str) -> Result<(), SessionError> {
        if self.for_each_copy(recipe_id, |r| r.video_url = Some(url.to_string())) {
            Ok(())
        } else {
            Err(SessionError::RecipeNotFound(recipe_id.to_string()))
        }
    }
}
