use crate::model::Preferences;

pub const RECIPE_CHEF_INSTRUCTION: &str = "You are an expert Israeli chef. You only provide real recipes, \
classic or popular dishes that actually exist online. Do not invent dishes. \
Keep every recipe fully kosher (no mixing of meat and dairy, no shellfish and so on).";

pub const SUBSTITUTION_CHEF_INSTRUCTION: &str = "You are a creative chef who finds solutions for missing ingredients. \
Make sure the new recipe stays fully kosher and is based on real culinary knowledge.";

pub const CHAT_PERSONA_INSTRUCTION: &str = "Your name is Shefi. You are a friendly personal cooking assistant from Israel. \
All of your recommendations and recipes are kosher only and based on real culinary knowledge. \
You answer questions about cooking, unit conversions, ingredient substitutions and kitchen tips. \
Always answer at eye level, in a pleasant and relaxed way.";

pub const RECIPES_PER_SEARCH: usize = 3;

/// Bullet list of the active constraints, one `- label: value` line each.
pub fn preference_lines(prefs: &Preferences) -> String {
    let mut lines = String::new();
    let mut push = |label: &str, value: &str| {
        lines.push_str(&format!("- {}: {}\n", label, value));
    };

    if let Some(difficulty) = prefs.difficulty {
        push("Difficulty", &difficulty.to_string());
    }
    if let Some(meal_size) = prefs.meal_size {
        push("Meal size", &meal_size.to_string());
    }
    if prefs.vegetarian == Some(true) {
        push("Vegetarian", "yes");
    }
    if prefs.vegan == Some(true) {
        push("Vegan", "yes");
    }
    if prefs.kid_friendly == Some(true) {
        push("Kid friendly", "yes");
    }
    if prefs.healthy == Some(true) {
        push("Healthy", "yes");
    }
    if let Some(dietary) = prefs.dietary {
        push("Kashrut type", &dietary.to_string());
    }
    if let Some(cuisine) = prefs.effective_cuisine() {
        push("Cuisine style", &cuisine);
    }
    if let Some(method) = prefs.method {
        push("Preparation method", &method.to_string());
    }
    if let Some(course) = prefs.course {
        push("Course", &format!("{} (required)", course));
    }
    if let Some(note) = prefs.refinement_note() {
        push("Special requests from the user", note);
    }

    lines
}

pub fn search_prompt(ingredients: &[String], prefs: &Preferences) -> String {
    format!(
        "I am looking for {} real, well-known recipes from the internet based on the following ingredients: {}.\n\
Very important:\n\
1. The recipes must be fully kosher.\n\
2. The recipes must exist in reality (not invented).\n\
3. You don't have to use every ingredient! Only use the ones that fit a sensible, tasty recipe.\n\
User preferences:\n{}",
        RECIPES_PER_SEARCH,
        ingredients.join(", "),
        preference_lines(prefs)
    )
}

pub fn regenerate_prompt(original_title: &str, missing_ingredients: &str) -> String {
    format!(
        "The user wants to make the real dish \"{}\" but is missing the following ingredients: \"{}\". \
Please create a new, corrected version of the recipe without the missing ingredients \
(find kosher substitutes or adapt the recipe). Keep the dish as authentic as possible.",
        original_title, missing_ingredients
    )
}

pub fn video_prompt(recipe_title: &str) -> String {
    format!(
        "Find a youtube video link that shows how to cook: {}. Return ONLY the URL.",
        recipe_title
    )
}

pub fn comment_reply_prompt(recipe_title: &str, comment: &str, author: &str) -> String {
    format!(
        "The user named \"{}\" commented on the recipe \"{}\": \"{}\".\n\
Write a short, friendly, slightly humorous and personal reply as \"Shefi\" (a virtual chef). Don't be too formal.",
        author, recipe_title, comment
    )
}

pub fn daily_tip_prompt() -> &'static str {
    "Give me a short, general and very useful \"daily tip\" for the kitchen.\n\
The tip must be:\n\
1. Fully kosher (no mention of mixing meat and dairy).\n\
2. General (technique, storage, cleaning or improving flavour in general).\n\
3. Not a specific recipe.\n\
Write it directly, without an introduction. Two sentences at most. Be friendly."
}
