use crate::config::AiConfig;
use crate::llm::{extract_json, LlmError, LlmProvider};
use crate::normalization::clean_token;
use crate::prompts::render_rank_prompt;
use crate::structures::{CandidateScore, FallbackReason, RankSource, UserQuery};
use indexmap::IndexSet;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_REASON: &str = "Perfect match for your ingredients and time!";

#[derive(Debug, Deserialize)]
struct RankReply {
    #[serde(default)]
    recipe_name: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceError {
    Unparseable(String),
    /// The named recipe was not among the candidates.
    Hallucinated(String),
}

/// The ranker's pick among the filtered candidates.
#[derive(Debug, Clone)]
pub struct Ranked<'a> {
    pub candidate: CandidateScore<'a>,
    pub explanation: String,
    pub source: RankSource,
}

/// Reads `{"recipe_name": ..., "reason": ...}` from a model reply and maps
/// the name back onto one of `candidates` (case and spacing ignored).
pub fn parse_choice(reply: &str, candidates: &[CandidateScore<'_>]) -> Result<(usize, String), ChoiceError> {
    let json = extract_json(reply, '{', '}')
        .ok_or_else(|| ChoiceError::Unparseable("no JSON object in reply".to_string()))?;
    let parsed: RankReply = serde_json::from_str(json).map_err(|e| ChoiceError::Unparseable(e.to_string()))?;

    let name = parsed
        .recipe_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ChoiceError::Unparseable("missing recipe_name".to_string()))?;

    let wanted = clean_token(&name);
    let index = candidates
        .iter()
        .position(|c| clean_token(&c.recipe.name) == wanted)
        .ok_or(ChoiceError::Hallucinated(name))?;

    let reason = parsed
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_REASON.to_string());

    Ok((index, reason))
}

/// Templated explanation for the deterministic pick.
pub fn fallback_explanation(candidate: &CandidateScore<'_>) -> String {
    format!(
        "{} uses {} of its {} ingredients you already have ({:.0}% match) and is ready in {} minutes.",
        candidate.recipe.name,
        candidate.matched,
        candidate.recipe.ingredients.len(),
        candidate.overlap_ratio * 100.0,
        candidate.recipe.cooking_time
    )
}

/// Asks the AI service to choose among filtered candidates, falling back to
/// the top-ranked candidate whenever the service fails or answers outside
/// the list.
#[derive(Debug, Clone)]
pub struct Ranker {
    provider: Option<Arc<dyn LlmProvider>>,
    timeout: Duration,
    retry: bool,
    max_output_tokens: u32,
}

impl Ranker {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &AiConfig) -> Self {
        Self {
            provider: Some(provider),
            timeout: config.timeout(),
            retry: config.retry,
            max_output_tokens: config.max_output_tokens,
        }
    }

    /// A ranker that never calls out and always takes the top candidate.
    pub fn disabled() -> Self {
        Self {
            provider: None,
            timeout: AiConfig::default().timeout(),
            retry: false,
            max_output_tokens: 0,
        }
    }

    fn fallback<'a>(candidates: &[CandidateScore<'a>], reason: FallbackReason) -> Option<Ranked<'a>> {
        let top = candidates.first()?.clone();
        if reason != FallbackReason::Disabled {
            warn!("⚠️  Falling back to top candidate '{}': {}", top.recipe.name, reason);
        }
        Some(Ranked {
            explanation: fallback_explanation(&top),
            candidate: top,
            source: RankSource::Fallback(reason),
        })
    }

    /// Returns `None` only for an empty candidate list, in which case the
    /// service is not called.
    pub async fn rank<'a>(
        &self,
        candidates: &[CandidateScore<'a>],
        user_ingredients: &IndexSet<String>,
        query: &UserQuery,
    ) -> Option<Ranked<'a>> {
        if candidates.is_empty() {
            return None;
        }
        let provider = match &self.provider {
            Some(provider) => provider,
            None => return Self::fallback(candidates, FallbackReason::Disabled),
        };

        let prompt = render_rank_prompt(
            candidates,
            user_ingredients,
            query.meal_type,
            &query.cuisine,
            query.max_time,
        );
        debug!("Rank prompt ({} chars):\n{}", prompt.len(), prompt);

        let attempts = if self.retry { 2 } else { 1 };
        let mut reason = FallbackReason::ServiceError;
        // One deadline for every attempt, retry included.
        let deadline = Instant::now() + self.timeout;

        for attempt in 1..=attempts {
            let outcome = tokio::time::timeout_at(deadline, provider.complete(&prompt, self.max_output_tokens))
                .await
                .unwrap_or(Err(LlmError::Timeout(self.timeout.as_secs())));

            let reply = match outcome {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(
                        "AI ranking attempt {}/{} via {} failed: {}",
                        attempt,
                        attempts,
                        provider.provider_name(),
                        e
                    );
                    reason = match e {
                        LlmError::Timeout(_) => FallbackReason::Timeout,
                        _ => FallbackReason::ServiceError,
                    };
                    if e.is_transient() && Instant::now() < deadline {
                        continue;
                    }
                    break;
                }
            };

            match parse_choice(&reply, candidates) {
                Ok((index, explanation)) => {
                    let candidate = candidates[index].clone();
                    info!("🤖 {} picked '{}'", provider.model_name(), candidate.recipe.name);
                    return Some(Ranked {
                        candidate,
                        explanation,
                        source: RankSource::Ai,
                    });
                }
                Err(ChoiceError::Unparseable(detail)) => {
                    warn!("AI reply could not be parsed: {}", detail);
                    debug!("Unparseable reply: {}", reply);
                    reason = FallbackReason::Unparseable;
                }
                Err(ChoiceError::Hallucinated(name)) => {
                    warn!("AI picked '{}', which was not a candidate", name);
                    reason = FallbackReason::Hallucinated;
                }
            }
            break;
        }

        Self::fallback(candidates, reason)
    }
}
