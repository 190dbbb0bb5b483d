use rand::seq::SliceRandom;

use crate::model::{Difficulty, HealthTag, MealSize, RawRecipe};

pub const COMMENT_REPLY_FALLBACK: &str = "Glad you liked it! Bon appétit 👨‍🍳";
pub const COMMENT_REPLY_EMPTY: &str = "Thanks for the comment! Enjoy your meal!";
pub const CHAT_FALLBACK: &str =
    "Oops, I'm a bit tired right now (the system is busy or the connection dropped). Try again in a minute?";
pub const DAILY_TIP_EMPTY: &str =
    "Daily tip: a pinch of salt in your coffee brings out the flavour and cuts the bitterness!";
pub const WELCOME_MESSAGE: &str = "Hi there! I'm Shefi 👨‍🍳. How can I help you in the kitchen today?";

pub const DAILY_TIPS: &[&str] = &[
    "Daily tip: a sharp knife is the safest knife in the kitchen!",
    "Daily tip: roll a lemon on the counter before squeezing to get more juice out of it.",
    "Daily tip: add oil to pasta water only once it has come to the boil.",
    "Daily tip: chill onions in the fridge before cutting them to avoid tears.",
    "Daily tip: for a perfect hard-boiled egg, start it in cold water and bring it to the boil.",
    "Daily tip: keep spices in a dark, cool place so they hold their flavour.",
    "Daily tip: scrub a cutting board with lemon and coarse salt to lift stubborn smells.",
    "Daily tip: a dip in ice-cold water brings wilted herbs back to life.",
    "Daily tip: don't crowd the pan when frying, so the food gets a proper sear.",
    "Daily tip: a pinch of salt in your coffee brings out the flavour and cuts the bitterness!",
];

/// One tip drawn uniformly at random.
pub fn random_tip() -> &'static str {
    DAILY_TIPS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(DAILY_TIP_EMPTY)
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The three pre-authored recipes used when generation fails.
pub fn fallback_recipes() -> Vec<RawRecipe> {
    vec![
        RawRecipe {
            title: "Hearty Vegetable Omelette (backup recipe)".to_string(),
            description: "When Shefi is busy, a good omelette with whatever vegetables are in the fridge never lets you down.".to_string(),
            image_prompt_en: "Delicious vegetable omelet with fresh herbs, israeli breakfast style".to_string(),
            ingredients: owned(&["eggs", "onion", "fresh herbs", "salt", "pepper", "oil for frying"]),
            instructions: owned(&[
                "Chop the onion and vegetables.",
                "Whisk the eggs with the seasoning.",
                "Fry the onion until golden.",
                "Pour in the egg mixture and fry to your liking.",
            ]),
            prep_time: "10 minutes".to_string(),
            difficulty: Difficulty::Easy,
            meal_size: MealSize::Small,
            health_tag: HealthTag::Balanced,
            kid_friendly: true,
            is_vegan: false,
            is_vegetarian: true,
            match_score: 100,
            calories: None,
            tags: owned(&["breakfast", "quick", "classic"]),
        },
        RawRecipe {
            title: "Pasta in Tomato Sauce (backup recipe)".to_string(),
            description: "A classic that always works. Simple, tasty and comforting.".to_string(),
            image_prompt_en: "Classic pasta with tomato sauce and fresh basil".to_string(),
            ingredients: owned(&["pasta", "tomato paste / crushed tomatoes", "garlic", "olive oil", "basil"]),
            instructions: owned(&[
                "Cook the pasta according to the packet instructions.",
                "In a separate pot, fry the garlic in olive oil.",
                "Add the tomatoes and seasoning and simmer for about 10 minutes.",
                "Toss the sauce with the pasta and serve.",
            ]),
            prep_time: "15 minutes".to_string(),
            difficulty: Difficulty::Easy,
            meal_size: MealSize::Large,
            health_tag: HealthTag::Indulgent,
            kid_friendly: true,
            is_vegan: true,
            is_vegetarian: true,
            match_score: 95,
            calories: None,
            tags: owned(&["Italian", "kids", "lunch"]),
        },
        RawRecipe {
            title: "Finely Chopped Vegetable Salad (backup recipe)".to_string(),
            description: "As Israeli as it gets. A healthy, refreshing salad that goes with any meal.".to_string(),
            image_prompt_en: "Fresh chopped israeli salad with cucumber tomato and onion".to_string(),
            ingredients: owned(&["cucumber", "tomato", "onion", "bell pepper", "parsley", "olive oil", "lemon"]),
            instructions: owned(&[
                "Dice all the vegetables small.",
                "Mix in a large bowl.",
                "Dress with olive oil, lemon, salt and pepper just before serving.",
            ]),
            prep_time: "10 minutes".to_string(),
            difficulty: Difficulty::Easy,
            meal_size: MealSize::Snack,
            health_tag: HealthTag::Healthy,
            kid_friendly: true,
            is_vegan: true,
            is_vegetarian: true,
            match_score: 90,
            calories: None,
            tags: owned(&["healthy", "salad", "side dish"]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn there_are_three_fallback_recipes() {
        let recipes = fallback_recipes();
        assert_eq!(recipes.len(), 3);
        assert!(recipes.iter().all(|r| !r.image_prompt_en.is_empty()));
    }

    #[test]
    fn random_tip_comes_from_the_list() {
        assert!(DAILY_TIPS.len() >= 9);
        for _ in 0..20 {
            assert!(DAILY_TIPS.contains(&random_tip()));
        }
    }
}
