use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Display-name marker that identifies the assistant persona.
pub const ASSISTANT_MARKER: &str = "Shefi";
/// Author name attached to assistant-written comment replies.
pub const ASSISTANT_AUTHOR: &str = "Shefi 👨‍🍳";

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// `<prefix>_<unix millis>_<sequence>`; the sequence keeps ids unique within one millisecond.
pub fn next_id(prefix: &str) -> String {
    let seq = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), seq)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSize {
    Small,
    Large,
    Snack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthTag {
    Healthy,
    Indulgent,
    Balanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dietary {
    Meat,
    Dairy,
    Pareve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cuisine {
    Italian,
    Asian,
    Israeli,
    Moroccan,
    French,
    Mexican,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CookingMethod {
    Baking,
    Cooking,
    Frying,
    NoCook,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseType {
    Starter,
    Main,
    Dessert,
}

macro_rules! display_as_label {
    ($ty:ty { $($variant:ident => $label:expr),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let label = match self {
                    $(Self::$variant => $label,)+
                };
                f.write_str(label)
            }
        }
    };
}

display_as_label!(Difficulty { Easy => "easy", Medium => "medium", Hard => "hard" });
display_as_label!(MealSize { Small => "small meal", Large => "large meal", Snack => "snack" });
display_as_label!(HealthTag { Healthy => "healthy", Indulgent => "indulgent", Balanced => "balanced" });
display_as_label!(Dietary { Meat => "meat", Dairy => "dairy", Pareve => "pareve" });
display_as_label!(Cuisine {
    Italian => "Italian",
    Asian => "Asian",
    Israeli => "Israeli",
    Moroccan => "Moroccan",
    French => "French",
    Mexican => "Mexican",
    Other => "other",
});
display_as_label!(CookingMethod { Baking => "baking", Cooking => "cooking", Frying => "frying", NoCook => "no cooking" });
display_as_label!(CourseType { Starter => "starter", Main => "main course", Dessert => "dessert" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentRole {
    User,
    Assistant,
}

impl CommentRole {
    /// Classifies records that carry only a display name.
    pub fn from_author(author: &str) -> Self {
        if author.contains(ASSISTANT_MARKER) {
            CommentRole::Assistant
        } else {
            CommentRole::User
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub role: CommentRole,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<String>,
}

impl Comment {
    /// For records that arrive without a role; the author name decides it.
    pub fn new(author: &str, text: &str) -> Self {
        Self::with_role(author, CommentRole::from_author(author), text)
    }

    pub fn user(author: &str, text: &str) -> Self {
        Self::with_role(author, CommentRole::User, text)
    }

    pub fn assistant(text: &str) -> Self {
        Self::with_role(ASSISTANT_AUTHOR, CommentRole::Assistant, text)
    }

    fn with_role(author: &str, role: CommentRole, text: &str) -> Self {
        Comment {
            id: next_id("c"),
            author: author.to_string(),
            role,
            text: text.to_string(),
            created_at: Utc::now(),
            in_reply_to: None,
        }
    }

    pub fn reply_to(mut self, comment_id: &str) -> Self {
        self.in_reply_to = Some(comment_id.to_string());
        self
    }

    pub fn is_assistant(&self) -> bool {
        self.role == CommentRole::Assistant
    }
}

/// A recipe exactly as the generator returns it, before ids and media are attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecipe {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image_prompt_en: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time: String,
    pub difficulty: Difficulty,
    pub meal_size: MealSize,
    pub health_tag: HealthTag,
    pub kid_friendly: bool,
    pub is_vegan: bool,
    pub is_vegetarian: bool,
    pub match_score: i64,
    #[serde(default)]
    pub calories: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_prompt_en: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time: String,
    pub difficulty: Difficulty,
    pub meal_size: MealSize,
    pub health_tag: HealthTag,
    pub kid_friendly: bool,
    pub is_vegan: bool,
    pub is_vegetarian: bool,
    pub match_score: u8,
    pub calories: Option<u32>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub is_favorite: bool,
    pub comments: Vec<Comment>,
}

impl Recipe {
    /// Attaches identity to a generated recipe. Match scores outside 0..=100 are clamped.
    pub fn from_raw(raw: RawRecipe, id: String, image_url: Option<String>) -> Self {
        Recipe {
            id,
            title: raw.title,
            description: raw.description,
            image_prompt_en: raw.image_prompt_en,
            ingredients: raw.ingredients,
            instructions: raw.instructions,
            prep_time: raw.prep_time,
            difficulty: raw.difficulty,
            meal_size: raw.meal_size,
            health_tag: raw.health_tag,
            kid_friendly: raw.kid_friendly,
            is_vegan: raw.is_vegan,
            is_vegetarian: raw.is_vegetarian,
            match_score: raw.match_score.clamp(0, 100) as u8,
            calories: raw.calories,
            tags: raw.tags,
            image_url,
            video_url: None,
            is_favorite: false,
            comments: Vec::new(),
        }
    }

    pub fn image_description(&self) -> &str {
        if self.image_prompt_en.trim().is_empty() {
            &self.title
        } else {
            &self.image_prompt_en
        }
    }
}

/// Search constraints. `None` means "no constraint"; booleans only constrain when `Some(true)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub difficulty: Option<Difficulty>,
    pub meal_size: Option<MealSize>,
    pub vegetarian: Option<bool>,
    pub vegan: Option<bool>,
    pub kid_friendly: Option<bool>,
    pub healthy: Option<bool>,
    pub dietary: Option<Dietary>,
    pub cuisine: Option<Cuisine>,
    pub custom_cuisine: Option<String>,
    pub method: Option<CookingMethod>,
    pub course: Option<CourseType>,
    pub refinement: Option<String>,
}

fn toggle<T: PartialEq>(slot: &mut Option<T>, value: T) {
    if slot.as_ref() == Some(&value) {
        *slot = None;
    } else {
        *slot = Some(value);
    }
}

fn non_blank(text: &Option<String>) -> Option<&str> {
    text.as_deref().map(str::trim).filter(|t| !t.is_empty())
}

impl Preferences {
    pub fn toggle_difficulty(&mut self, value: Difficulty) {
        toggle(&mut self.difficulty, value);
    }

    pub fn toggle_meal_size(&mut self, value: MealSize) {
        toggle(&mut self.meal_size, value);
    }

    pub fn toggle_dietary(&mut self, value: Dietary) {
        toggle(&mut self.dietary, value);
    }

    pub fn toggle_cuisine(&mut self, value: Cuisine) {
        toggle(&mut self.cuisine, value);
    }

    pub fn toggle_method(&mut self, value: CookingMethod) {
        toggle(&mut self.method, value);
    }

    pub fn toggle_course(&mut self, value: CourseType) {
        toggle(&mut self.course, value);
    }

    pub fn toggle_vegetarian(&mut self) {
        toggle(&mut self.vegetarian, true);
    }

    pub fn toggle_vegan(&mut self) {
        toggle(&mut self.vegan, true);
    }

    pub fn toggle_kid_friendly(&mut self) {
        toggle(&mut self.kid_friendly, true);
    }

    pub fn toggle_healthy(&mut self) {
        toggle(&mut self.healthy, true);
    }

    /// The cuisine label that should reach the prompt, if any.
    /// Free text wins over `Other`; `Other` on its own says nothing.
    pub fn effective_cuisine(&self) -> Option<String> {
        match self.cuisine? {
            Cuisine::Other => non_blank(&self.custom_cuisine).map(str::to_string),
            cuisine => Some(cuisine.to_string()),
        }
    }

    pub fn refinement_note(&self) -> Option<&str> {
        non_blank(&self.refinement)
    }

    pub fn is_empty(&self) -> bool {
        self.difficulty.is_none()
            && self.meal_size.is_none()
            && self.vegetarian != Some(true)
            && self.vegan != Some(true)
            && self.kid_friendly != Some(true)
            && self.healthy != Some(true)
            && self.dietary.is_none()
            && self.cuisine.is_none()
            && non_blank(&self.custom_cuisine).is_none()
            && self.method.is_none()
            && self.course.is_none()
            && non_blank(&self.refinement).is_none()
    }

    pub fn clear(&mut self) {
        *self = Preferences::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(role: ChatRole, text: &str) -> Self {
        ChatTurn {
            id: next_id("msg"),
            role,
            text: text.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_within_a_millisecond() {
        let a = next_id("gen");
        let b = next_id("gen");
        assert_ne!(a, b);
        assert!(a.starts_with("gen_"));
    }

    #[test]
    fn author_marker_selects_assistant_role() {
        assert_eq!(CommentRole::from_author(ASSISTANT_AUTHOR), CommentRole::Assistant);
        assert_eq!(CommentRole::from_author("Dana"), CommentRole::User);
    }

    #[test]
    fn typed_constructors_ignore_the_author_name() {
        let fan = Comment::user("Shefira", "Loved it");
        assert_eq!(fan.role, CommentRole::User);
        assert!(!fan.is_assistant());
        let reply = Comment::assistant("Thanks!");
        assert!(reply.is_assistant());
        assert_eq!(reply.author, ASSISTANT_AUTHOR);
    }

    #[test]
    fn custom_cuisine_supersedes_other() {
        let mut prefs = Preferences {
            cuisine: Some(Cuisine::Other),
            custom_cuisine: Some("Georgian".to_string()),
            ..Default::default()
        };
        assert_eq!(prefs.effective_cuisine().as_deref(), Some("Georgian"));

        prefs.custom_cuisine = Some("   ".to_string());
        assert_eq!(prefs.effective_cuisine(), None);

        prefs.cuisine = Some(Cuisine::Moroccan);
        prefs.custom_cuisine = Some("Georgian".to_string());
        assert_eq!(prefs.effective_cuisine().as_deref(), Some("Moroccan"));
    }

    #[test]
    fn toggling_twice_clears_the_preference() {
        let mut prefs = Preferences::default();
        prefs.toggle_difficulty(Difficulty::Hard);
        prefs.toggle_vegan();
        assert!(!prefs.is_empty());

        prefs.toggle_difficulty(Difficulty::Hard);
        prefs.toggle_vegan();
        assert!(prefs.is_empty());
    }

    #[test]
    fn raw_recipe_deserializes_from_wire_names() {
        let raw: RawRecipe = serde_json::from_str(
            r#"{
                "title": "Shakshuka",
                "description": "Eggs in tomato sauce",
                "imagePromptEn": "shakshuka in a pan",
                "ingredients": ["eggs", "tomatoes"],
                "instructions": ["cook"],
                "prepTime": "20 minutes",
                "difficulty": "easy",
                "mealSize": "large",
                "healthTag": "balanced",
                "kidFriendly": true,
                "isVegan": false,
                "isVegetarian": true,
                "matchScore": 140
            }"#,
        )
        .unwrap();
        let recipe = Recipe::from_raw(raw, "gen_1_0".to_string(), None);
        assert_eq!(recipe.match_score, 100);
        assert_eq!(recipe.calories, None);
        assert!(recipe.tags.is_empty());
        assert!(!recipe.is_favorite);
    }
}
