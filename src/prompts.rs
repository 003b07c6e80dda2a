//! Prompt templates sent to the text-generation service.

use crate::structures::{CandidateScore, MealType};
use indexmap::IndexSet;

/// Ranking prompt: one line per candidate, essential fields only.
pub fn render_rank_prompt(
    candidates: &[CandidateScore<'_>],
    user_ingredients: &IndexSet<String>,
    meal_type: MealType,
    cuisine: &str,
    max_time: u32,
) -> String {
    let have = user_ingredients.iter().map(String::as_str).collect::<Vec<_>>().join(", ");

    let lines = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let ingredients = c.recipe.ingredients.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
            format!(
                "{}. {} | {} | {}min | {}",
                i + 1,
                c.recipe.name,
                ingredients,
                c.recipe.cooking_time,
                c.recipe.cuisine
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Pick the best {cuisine} {meal} recipe for a cook with: {have}. Time limit {max_time}min.
Candidates (name | ingredients | time | cuisine):
{lines}
Choose ONLY from the candidates. Reply with JSON only: {{"recipe_name": "<exact candidate name>", "reason": "<one or two sentences>"}}"#,
        cuisine = cuisine,
        meal = meal_type.as_str().to_lowercase(),
        have = have,
        max_time = max_time,
        lines = lines
    )
}

/// Generation prompt asking for `count` distinct recipes as a JSON array.
pub fn render_generate_prompt(
    user_ingredients: &IndexSet<String>,
    meal_type: MealType,
    cuisine: &str,
    max_time: u32,
    count: usize,
) -> String {
    let have = user_ingredients.iter().map(String::as_str).collect::<Vec<_>>().join(", ");

    format!(
        r#"Generate {count} DIFFERENT {cuisine} {meal} recipes using these ingredients: {have}.
Cooking time: {max_time} minutes maximum per recipe.

Requirements:
1. Each recipe is completely different from the others
2. Each uses MOST of the given ingredients
3. Each fits within the time limit
4. Each is a valid {cuisine} {meal_type} dish

Respond ONLY with a JSON array (no markdown, no extra text) of objects shaped like:
{{"recipe_name": "Name", "ingredients": "ingredient1 ingredient2", "cooking_time": 25, "meal_type": "{meal_type}", "cuisine": "{cuisine}", "instructions": "Step 1. Step 2.", "reason": "Why this recipe works"}}"#,
        count = count,
        cuisine = cuisine,
        meal = meal_type.as_str().to_lowercase(),
        meal_type = meal_type,
        have = have,
        max_time = max_time
    )
}
