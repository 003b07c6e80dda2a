//! Recipes invented by the AI service when the dataset has nothing suitable.

use crate::config::{GENERATE_MAX_OUTPUT_TOKENS, MAX_GENERATED_RECIPES};
use crate::llm::{extract_json, LlmError, LlmProvider};
use crate::prompts::render_generate_prompt;
use crate::ranker::DEFAULT_REASON;
use crate::structures::MealType;
use crate::video::recipe_search_url;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct GeneratedRecipe {
    pub recipe_name: String,
    pub ingredients: String,
    pub cooking_time: u32,
    pub meal_type: String,
    pub cuisine: String,
    pub instructions: String,
    pub reason: String,
    pub video_url: String,
}

/// Loose shape of one array entry; models sometimes quote numbers.
#[derive(Debug, Deserialize)]
struct RawGenerated {
    recipe_name: Option<String>,
    ingredients: Option<Value>,
    cooking_time: Option<Value>,
    #[serde(default)]
    meal_type: Option<String>,
    #[serde(default)]
    cuisine: Option<String>,
    instructions: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

fn minutes(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.split_whitespace().next()?.parse().ok(),
        _ => None,
    }
}

fn ingredient_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn convert(raw: RawGenerated, meal_type: MealType, cuisine: &str) -> Option<GeneratedRecipe> {
    let recipe_name = non_blank(raw.recipe_name)?;
    Some(GeneratedRecipe {
        video_url: recipe_search_url(&recipe_name),
        ingredients: raw.ingredients.as_ref().and_then(ingredient_text)?,
        cooking_time: raw.cooking_time.as_ref().and_then(minutes)?,
        instructions: non_blank(raw.instructions)?,
        meal_type: non_blank(raw.meal_type).unwrap_or_else(|| meal_type.to_string()),
        cuisine: non_blank(raw.cuisine).unwrap_or_else(|| cuisine.to_string()),
        reason: non_blank(raw.reason).unwrap_or_else(|| DEFAULT_REASON.to_string()),
        recipe_name,
    })
}

/// Parses a JSON array of generated recipes. Entries missing a required
/// field are dropped; no usable entry is a parse error.
pub fn parse_generated(reply: &str, meal_type: MealType, cuisine: &str) -> Result<Vec<GeneratedRecipe>, LlmError> {
    let json = extract_json(reply, '[', ']')
        .or_else(|| extract_json(reply, '{', '}'))
        .ok_or_else(|| LlmError::ParseError("no JSON in reply".to_string()))?;

    let value: Value = serde_json::from_str(json).map_err(|e| LlmError::ParseError(e.to_string()))?;
    let entries = match value {
        Value::Array(entries) => entries,
        single @ Value::Object(_) => vec![single],
        _ => return Err(LlmError::ParseError("expected a JSON array".to_string())),
    };

    let total = entries.len();
    let recipes: Vec<GeneratedRecipe> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<RawGenerated>(entry).ok())
        .filter_map(|raw| convert(raw, meal_type, cuisine))
        .collect();

    if recipes.len() < total {
        warn!("Dropped {} incomplete generated recipes", total - recipes.len());
    }
    if recipes.is_empty() {
        return Err(LlmError::ParseError("no complete recipes in reply".to_string()));
    }
    Ok(recipes)
}

/// Asks the provider for `count` (clamped to 1..=5) new recipes.
pub async fn generate_recipes(
    provider: &dyn LlmProvider,
    user_ingredients: &IndexSet<String>,
    meal_type: MealType,
    cuisine: &str,
    max_time: u32,
    count: usize,
    timeout: Duration,
) -> Result<Vec<GeneratedRecipe>, LlmError> {
    let count = count.clamp(1, MAX_GENERATED_RECIPES);
    let prompt = render_generate_prompt(user_ingredients, meal_type, cuisine, max_time, count);
    debug!("Generate prompt ({} chars)", prompt.len());

    let reply = tokio::time::timeout(timeout, provider.complete(&prompt, GENERATE_MAX_OUTPUT_TOKENS))
        .await
        .unwrap_or(Err(LlmError::Timeout(timeout.as_secs())))?;

    let mut recipes = parse_generated(&reply, meal_type, cuisine)?;
    recipes.truncate(count);
    info!("🤖 Generated {} recipes with {}", recipes.len(), provider.model_name());
    Ok(recipes)
}
