use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Meal slot a recipe is meant for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" | "snacks" => Ok(MealType::Snack),
            other => Err(format!("unknown meal type '{}'", other)),
        }
    }
}

/// A dataset recipe. Ingredients are canonical names in dataset order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recipe {
    pub name: String,
    pub ingredients: IndexSet<String>,
    pub cooking_time: u32,
    pub meal_type: MealType,
    pub cuisine: String,
    pub instructions: String,
}

/// One recommendation request as the user typed it.
#[derive(Clone, Debug)]
pub struct UserQuery {
    /// Raw comma/newline separated ingredient text.
    pub ingredients: String,
    pub max_time: u32,
    pub meal_type: MealType,
    pub cuisine: String,
}

impl UserQuery {
    pub fn new(ingredients: impl Into<String>, max_time: u32, meal_type: MealType, cuisine: impl Into<String>) -> Self {
        Self {
            ingredients: ingredients.into(),
            max_time,
            meal_type,
            cuisine: cuisine.into(),
        }
    }
}

/// A recipe that survived filtering, with its ingredient coverage.
#[derive(Clone, Debug, Serialize)]
pub struct CandidateScore<'a> {
    pub recipe: &'a Recipe,
    pub overlap_ratio: f64,
    /// Number of recipe ingredients the user has.
    pub matched: usize,
}

/// Why the ranker did not use the AI's pick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// AI ranking switched off by configuration.
    Disabled,
    ServiceError,
    Timeout,
    Unparseable,
    /// The AI named a recipe that was not among the candidates.
    Hallucinated,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FallbackReason::Disabled => "AI ranking disabled",
            FallbackReason::ServiceError => "AI service error",
            FallbackReason::Timeout => "AI service timed out",
            FallbackReason::Unparseable => "AI response could not be parsed",
            FallbackReason::Hallucinated => "AI picked a recipe outside the candidates",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum RankSource {
    Ai,
    Fallback(FallbackReason),
}

/// Final answer for one request.
#[derive(Clone, Debug, Serialize)]
pub struct Recommendation {
    pub recipe: Recipe,
    pub overlap_ratio: f64,
    pub explanation: String,
    pub source: RankSource,
    pub video_url: String,
    pub cuisine_url: String,
}
