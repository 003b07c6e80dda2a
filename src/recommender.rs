use crate::aliases::AliasTable;
use crate::error::RecommendError;
use crate::filter::{filter_candidates, FilterCriteria, FilterOptions};
use crate::normalization::normalize_ingredients_traced;
use crate::ranker::Ranker;
use crate::structures::{CandidateScore, Recipe, Recommendation, UserQuery};
use crate::video::{cuisine_search_url, recipe_search_url};
use indexmap::IndexSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Normalized query plus its ranked candidates.
#[derive(Debug)]
pub struct CandidateReport<'a> {
    pub ingredients: IndexSet<String>,
    pub candidates: Vec<CandidateScore<'a>>,
}

/// The full request pipeline. Holds only read-only shared state, so one
/// instance can serve concurrent sessions without locking.
#[derive(Debug, Clone)]
pub struct Recommender {
    recipes: Arc<[Recipe]>,
    aliases: Arc<AliasTable>,
    ranker: Ranker,
    options: FilterOptions,
}

impl Recommender {
    pub fn new(recipes: Vec<Recipe>, aliases: AliasTable, ranker: Ranker, options: FilterOptions) -> Self {
        Self {
            recipes: recipes.into(),
            aliases: Arc::new(aliases),
            ranker,
            options,
        }
    }

    /// Normalize and filter without calling the AI service.
    pub fn candidates(&self, query: &UserQuery) -> Result<CandidateReport<'_>, RecommendError> {
        let (ingredients, traces) = normalize_ingredients_traced(&query.ingredients, &self.aliases);
        for trace in traces.iter().filter(|t| t.alias_applied.is_some()) {
            debug!("Normalized '{}' -> '{}'", trace.raw.trim(), trace.normalized);
        }

        let criteria = FilterCriteria {
            ingredients: &ingredients,
            max_time: query.max_time,
            meal_type: query.meal_type,
            cuisine: &query.cuisine,
        };
        let candidates = filter_candidates(&self.recipes, &criteria, &self.options)?;

        Ok(CandidateReport {
            ingredients,
            candidates,
        })
    }

    pub async fn recommend(&self, query: &UserQuery) -> Result<Recommendation, RecommendError> {
        let started = Instant::now();
        let report = self.candidates(query)?;
        info!(
            "🔍 {} candidates for {} {} within {}min",
            report.candidates.len(),
            query.cuisine,
            query.meal_type,
            query.max_time
        );

        let ranked = self
            .ranker
            .rank(&report.candidates, &report.ingredients, query)
            .await
            .ok_or(RecommendError::NoCandidates {
                rejected_time: 0,
                rejected_meal_type: 0,
                rejected_cuisine: 0,
                rejected_overlap: 0,
            })?;

        let recipe = ranked.candidate.recipe.clone();
        let recommendation = Recommendation {
            video_url: recipe_search_url(&recipe.name),
            cuisine_url: cuisine_search_url(&recipe.cuisine),
            overlap_ratio: ranked.candidate.overlap_ratio,
            explanation: ranked.explanation,
            source: ranked.source,
            recipe,
        };

        debug!(
            "Recommended '{}' in {:.1}ms",
            recommendation.recipe.name,
            started.elapsed().as_secs_f64() * 1000.0
        );
        Ok(recommendation)
    }
}
