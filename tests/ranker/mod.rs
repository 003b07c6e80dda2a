use cookmatch::config::AiConfig;
use cookmatch::llm::{FakeProvider, LlmError};
use cookmatch::ranker::*;
use cookmatch::structures::{FallbackReason, RankSource};
use cookmatch::{CandidateScore, MealType, Recipe, UserQuery};
use indexmap::IndexSet;
use std::sync::Arc;
use std::time::Duration;

fn recipe(name: &str, ingredients: &[&str], time: u32) -> Recipe {
    Recipe {
        name: name.to_string(),
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        cooking_time: time,
        meal_type: MealType::Lunch,
        cuisine: "Indian".to_string(),
        instructions: String::new(),
    }
}

fn fixtures() -> Vec<Recipe> {
    vec![
        recipe("Tomato Rice", &["rice", "tomato", "onion", "spices"], 20),
        recipe("Onion Rice", &["rice", "onion", "oil", "spices", "salt"], 20),
    ]
}

fn candidates(recipes: &[Recipe]) -> Vec<CandidateScore<'_>> {
    vec![
        CandidateScore {
            recipe: &recipes[0],
            overlap_ratio: 0.75,
            matched: 3,
        },
        CandidateScore {
            recipe: &recipes[1],
            overlap_ratio: 0.6,
            matched: 3,
        },
    ]
}

fn query() -> UserQuery {
    UserQuery::new("rice, tomato, onion, oil", 30, MealType::Lunch, "Indian")
}

fn user() -> IndexSet<String> {
    ["rice", "tomato", "onion", "oil"].iter().map(|s| s.to_string()).collect()
}

fn config() -> AiConfig {
    AiConfig {
        timeout_secs: 1,
        ..AiConfig::default()
    }
}

#[tokio::test]
async fn test_ai_pick_is_used() {
    let recipes = fixtures();
    let provider = Arc::new(FakeProvider::always(
        r#"{"recipe_name": "Onion Rice", "reason": "Uses your oil too."}"#,
    ));
    let ranker = Ranker::new(provider.clone(), &config());

    let ranked = ranker.rank(&candidates(&recipes), &user(), &query()).await.unwrap();
    assert_eq!(ranked.candidate.recipe.name, "Onion Rice");
    assert_eq!(ranked.explanation, "Uses your oil too.");
    assert_eq!(ranked.source, RankSource::Ai);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_name_match_ignores_case_and_spacing() {
    let recipes = fixtures();
    let provider = Arc::new(FakeProvider::always(
        "```json\n{\"recipe_name\": \"  onion   RICE \"}\n```",
    ));
    let ranker = Ranker::new(provider, &config());

    let ranked = ranker.rank(&candidates(&recipes), &user(), &query()).await.unwrap();
    assert_eq!(ranked.candidate.recipe.name, "Onion Rice");
    assert_eq!(ranked.explanation, DEFAULT_REASON);
}

#[tokio::test]
async fn test_hallucinated_name_falls_back_without_retry() {
    let recipes = fixtures();
    let provider = Arc::new(FakeProvider::always(
        r#"{"recipe_name": "Chicken Tikka", "reason": "Delicious."}"#,
    ));
    let ranker = Ranker::new(provider.clone(), &config());

    let ranked = ranker.rank(&candidates(&recipes), &user(), &query()).await.unwrap();
    assert_eq!(ranked.candidate.recipe.name, "Tomato Rice");
    assert_eq!(ranked.source, RankSource::Fallback(FallbackReason::Hallucinated));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_unparseable_reply_falls_back() {
    let recipes = fixtures();
    let provider = Arc::new(FakeProvider::always("I think Onion Rice is great!"));
    let ranker = Ranker::new(provider.clone(), &config());

    let ranked = ranker.rank(&candidates(&recipes), &user(), &query()).await.unwrap();
    assert_eq!(ranked.candidate.recipe.name, "Tomato Rice");
    assert_eq!(ranked.source, RankSource::Fallback(FallbackReason::Unparseable));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_transient_error_retried_once() {
    let recipes = fixtures();
    let provider = Arc::new(FakeProvider::always(r#"{"recipe_name": "Onion Rice", "reason": "ok"}"#));
    provider.push_result(Err(LlmError::RateLimited("quota".to_string())));
    let ranker = Ranker::new(provider.clone(), &config());

    let ranked = ranker.rank(&candidates(&recipes), &user(), &query()).await.unwrap();
    assert_eq!(ranked.source, RankSource::Ai);
    assert_eq!(ranked.candidate.recipe.name, "Onion Rice");
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_retry_is_bounded() {
    let recipes = fixtures();
    let provider = Arc::new(FakeProvider::new());
    for _ in 0..5 {
        provider.push_result(Err(LlmError::RequestFailed("connection reset".to_string())));
    }
    let ranker = Ranker::new(provider.clone(), &config());

    let ranked = ranker.rank(&candidates(&recipes), &user(), &query()).await.unwrap();
    assert_eq!(ranked.candidate.recipe.name, "Tomato Rice");
    assert_eq!(ranked.source, RankSource::Fallback(FallbackReason::ServiceError));
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_permanent_error_not_retried() {
    let recipes = fixtures();
    let provider = Arc::new(FakeProvider::failing(LlmError::ApiError {
        status: 403,
        message: "API key invalid".to_string(),
    }));
    let ranker = Ranker::new(provider.clone(), &config());

    let ranked = ranker.rank(&candidates(&recipes), &user(), &query()).await.unwrap();
    assert_eq!(ranked.source, RankSource::Fallback(FallbackReason::ServiceError));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_service_times_out() {
    let recipes = fixtures();
    let provider = Arc::new(
        FakeProvider::always(r#"{"recipe_name": "Onion Rice"}"#).with_delay(Duration::from_secs(60)),
    );
    let ranker = Ranker::new(provider.clone(), &config());

    let ranked = ranker.rank(&candidates(&recipes), &user(), &query()).await.unwrap();
    assert_eq!(ranked.candidate.recipe.name, "Tomato Rice");
    assert_eq!(ranked.source, RankSource::Fallback(FallbackReason::Timeout));
    // Deadline already spent, so no second attempt
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hung_service_bounded_by_one_timeout() {
    let recipes = fixtures();
    let config = AiConfig::default();
    let provider = Arc::new(
        FakeProvider::always(r#"{"recipe_name": "Onion Rice"}"#).with_delay(Duration::from_secs(60)),
    );
    let ranker = Ranker::new(provider.clone(), &config);

    let started = tokio::time::Instant::now();
    let ranked = ranker.rank(&candidates(&recipes), &user(), &query()).await.unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed <= config.timeout(), "took {:?}", elapsed);
    assert_eq!(ranked.source, RankSource::Fallback(FallbackReason::Timeout));
}

#[tokio::test(start_paused = true)]
async fn test_retry_shares_the_remaining_deadline() {
    let recipes = fixtures();
    let config = AiConfig::default();
    let provider = Arc::new(
        FakeProvider::always(r#"{"recipe_name": "Onion Rice"}"#).with_delay(Duration::from_secs(8)),
    );
    provider.push_result(Err(LlmError::RateLimited("quota".to_string())));
    let ranker = Ranker::new(provider.clone(), &config);

    let started = tokio::time::Instant::now();
    let ranked = ranker.rank(&candidates(&recipes), &user(), &query()).await.unwrap();

    // 8s for the rate-limited reply leaves 4s, less than the second reply needs
    assert!(started.elapsed() <= config.timeout());
    assert_eq!(ranked.source, RankSource::Fallback(FallbackReason::Timeout));
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_disabled_ranker_takes_top_candidate() {
    let recipes = fixtures();
    let ranked = Ranker::disabled()
        .rank(&candidates(&recipes), &user(), &query())
        .await
        .unwrap();
    assert_eq!(ranked.candidate.recipe.name, "Tomato Rice");
    assert_eq!(ranked.source, RankSource::Fallback(FallbackReason::Disabled));
    assert!(ranked.explanation.contains("75% match"));
    assert!(ranked.explanation.contains("20 minutes"));
}

#[tokio::test]
async fn test_empty_candidates_never_call_service() {
    let provider = Arc::new(FakeProvider::always("{}"));
    let ranker = Ranker::new(provider.clone(), &config());
    assert!(ranker.rank(&[], &user(), &query()).await.is_none());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_prompt_names_every_candidate() {
    let recipes = fixtures();
    let provider = Arc::new(FakeProvider::always(r#"{"recipe_name": "Tomato Rice"}"#));
    let ranker = Ranker::new(provider.clone(), &config());
    ranker.rank(&candidates(&recipes), &user(), &query()).await.unwrap();

    let prompt = &provider.prompts()[0];
    assert!(prompt.contains("Tomato Rice | rice, tomato, onion, spices | 20min | Indian"));
    assert!(prompt.contains("Onion Rice"));
    assert!(prompt.contains("rice, tomato, onion, oil"));
}

#[test]
fn test_parse_choice_rejects_missing_name() {
    let recipes = fixtures();
    let err = parse_choice(r#"{"reason": "tasty"}"#, &candidates(&recipes)).unwrap_err();
    assert!(matches!(err, ChoiceError::Unparseable(_)));
}
