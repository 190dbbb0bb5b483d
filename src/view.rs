use serde::Serialize;

use crate::store::RecipeStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    #[default]
    Home,
    RecipeDetail {
        recipe_id: String,
    },
    Favorites,
    About,
    Messages,
    Converter,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::RecipeDetail { .. } => "recipe",
            View::Favorites => "favorites",
            View::About => "about",
            View::Messages => "messages",
            View::Converter => "converter",
        }
    }
}

#[derive(Debug, Default)]
pub struct ViewController {
    current: View,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &View {
        &self.current
    }

    pub fn is_messages_open(&self) -> bool {
        self.current == View::Messages
    }

    /// Id of the recipe on screen, if the detail view is open.
    pub fn active_recipe_id(&self) -> Option<&str> {
        match &self.current {
            View::RecipeDetail { recipe_id } => Some(recipe_id),
            _ => None,
        }
    }

    pub fn navigate(&mut self, view: View) {
        self.current = view;
    }

    pub fn open_recipe(&mut self, recipe_id: &str) {
        self.current = View::RecipeDetail {
            recipe_id: recipe_id.to_string(),
        };
    }

    /// Leaving a recipe that only lives in favorites returns to Favorites; everything else goes Home.
    pub fn back(&mut self, store: &RecipeStore) -> &View {
        self.current = match &self.current {
            View::RecipeDetail { recipe_id }
                if !store.in_results(recipe_id) && store.in_favorites(recipe_id) =>
            {
                View::Favorites
            }
            _ => View::Home,
        };
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_home() {
        assert_eq!(ViewController::new().current(), &View::Home);
    }

    #[test]
    fn back_from_unknown_recipe_goes_home() {
        let store = RecipeStore::default();
        let mut views = ViewController::new();
        views.open_recipe("gen_1_0");
        assert_eq!(views.back(&store), &View::Home);
    }

    #[test]
    fn detail_view_exposes_its_recipe_id() {
        let mut views = ViewController::new();
        views.open_recipe("gen_1_0");
        assert_eq!(views.active_recipe_id(), Some("gen_1_0"));
        views.navigate(View::About);
        assert_eq!(views.active_recipe_id(), None);
    }
}
