use crate::config::{DEFAULT_OVERLAP_THRESHOLD, DEFAULT_TOP_N};
use crate::error::RecommendError;
use crate::structures::{CandidateScore, MealType, Recipe};
use indexmap::IndexSet;
use std::cmp::Ordering;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct FilterOptions {
    /// Minimum share of a recipe's ingredients the user must have.
    pub threshold: f64,
    pub top_n: usize,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_OVERLAP_THRESHOLD,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Hard constraints plus the user's canonical ingredients.
#[derive(Clone, Debug)]
pub struct FilterCriteria<'q> {
    pub ingredients: &'q IndexSet<String>,
    pub max_time: u32,
    pub meal_type: MealType,
    pub cuisine: &'q str,
}

/// Fraction of `recipe` ingredients present in `user`. Zero for an empty recipe.
pub fn overlap_ratio(user: &IndexSet<String>, recipe: &IndexSet<String>) -> f64 {
    matched_count(user, recipe) as f64 / recipe.len().max(1) as f64
}

fn matched_count(user: &IndexSet<String>, recipe: &IndexSet<String>) -> usize {
    recipe.iter().filter(|ing| user.contains(*ing)).count()
}

#[derive(Default, Debug)]
struct Rejections {
    time: usize,
    meal_type: usize,
    cuisine: usize,
    overlap: usize,
}

/// Returns the best `top_n` candidates by overlap ratio, ties in dataset
/// order. An empty result is reported as `NoCandidates`.
pub fn filter_candidates<'a>(
    recipes: &'a [Recipe],
    criteria: &FilterCriteria<'_>,
    options: &FilterOptions,
) -> Result<Vec<CandidateScore<'a>>, RecommendError> {
    let mut rejections = Rejections::default();
    let mut candidates = Vec::new();
    let cuisine = criteria.cuisine.trim().to_lowercase();

    for recipe in recipes {
        // Cheap comparisons first; the intersection only runs for survivors.
        if recipe.cooking_time > criteria.max_time {
            rejections.time += 1;
            continue;
        }
        if recipe.meal_type != criteria.meal_type {
            rejections.meal_type += 1;
            continue;
        }
        if recipe.cuisine.to_lowercase() != cuisine {
            rejections.cuisine += 1;
            continue;
        }

        let matched = matched_count(criteria.ingredients, &recipe.ingredients);
        let ratio = matched as f64 / recipe.ingredients.len().max(1) as f64;
        if recipe.ingredients.is_empty() || ratio < options.threshold {
            rejections.overlap += 1;
            continue;
        }

        candidates.push(CandidateScore {
            recipe,
            overlap_ratio: ratio,
            matched,
        });
    }

    debug!(
        "Filter: {} candidates, rejected time={} meal_type={} cuisine={} overlap={}",
        candidates.len(),
        rejections.time,
        rejections.meal_type,
        rejections.cuisine,
        rejections.overlap
    );

    if candidates.is_empty() {
        return Err(RecommendError::NoCandidates {
            rejected_time: rejections.time,
            rejected_meal_type: rejections.meal_type,
            rejected_cuisine: rejections.cuisine,
            rejected_overlap: rejections.overlap,
        });
    }

    // sort_by is stable, so equal ratios keep dataset order.
    candidates.sort_by(|a, b| {
        b.overlap_ratio
            .partial_cmp(&a.overlap_ratio)
            .unwrap_or(Ordering::Equal)
    });
    candidates.truncate(options.top_n.max(1));

    Ok(candidates)
}
