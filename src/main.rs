use clap::{Args, Parser, Subcommand};
use cookmatch::config::{self, AppConfig};
use cookmatch::dataset::load_recipes;
use cookmatch::filter::FilterOptions;
use cookmatch::generate::{generate_recipes, GeneratedRecipe};
use cookmatch::llm::{GeminiProvider, LlmProvider};
use cookmatch::normalization::normalize_ingredients;
use cookmatch::ranker::Ranker;
use cookmatch::structures::{CandidateScore, RankSource};
use cookmatch::{MealType, Recommendation, Recommender, RecommendError, StartupError, UserQuery};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cookmatch")]
#[command(about = "Recommend a recipe from the ingredients you have")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML config file (defaults to $COOKMATCH_CONFIG when set)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Recipe dataset CSV
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Alias table TOML replacing the built-in one
    #[arg(long, global = true)]
    aliases: Option<PathBuf>,

    /// Minimum ingredient overlap (0.0-1.0)
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Number of candidates sent to the AI ranker
    #[arg(long, global = true)]
    top_n: Option<usize>,

    /// Gemini model name, or "auto" to discover one
    #[arg(long, global = true)]
    model: Option<String>,

    /// AI request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true, default_value = "false")]
    json: bool,

    /// Debug logging
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter the dataset and let the AI pick the best match
    Recommend {
        #[command(flatten)]
        query: QueryArgs,

        /// Skip the AI service and take the top-ranked candidate
        #[arg(long, default_value = "false")]
        no_ai: bool,
    },
    /// Show the ranked candidates without calling the AI service
    Candidates {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Ask the AI service to invent new recipes
    Generate {
        #[command(flatten)]
        query: QueryArgs,

        /// How many recipes to generate (1-5)
        #[arg(short = 'n', long, default_value = "3")]
        count: usize,
    },
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Ingredients, comma or newline separated
    #[arg(short, long)]
    ingredients: String,

    /// Time available in minutes
    #[arg(short = 't', long)]
    max_time: u32,

    #[arg(short, long, value_enum)]
    meal_type: MealType,

    #[arg(short, long)]
    cuisine: String,
}

impl QueryArgs {
    fn to_query(&self) -> UserQuery {
        UserQuery::new(self.ingredients.clone(), self.max_time, self.meal_type, self.cuisine.trim())
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,cookmatch={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// File config overlaid with command-line flags.
fn load_config(cli: &Cli) -> Result<AppConfig, StartupError> {
    let mut config = AppConfig::resolve(cli.config.as_deref())?;

    if let Some(dataset) = &cli.dataset {
        config.dataset = dataset.clone();
    }
    if let Some(aliases) = &cli.aliases {
        config.aliases = Some(aliases.clone());
    }
    if let Some(threshold) = cli.threshold {
        config.filter.threshold = threshold;
    }
    if let Some(top_n) = cli.top_n {
        config.filter.top_n = top_n;
    }
    if let Some(model) = &cli.model {
        config.ai.model = model.clone();
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.ai.timeout_secs = timeout_secs;
    }
    config.validate()?;
    Ok(config)
}

fn gemini_provider(config: &AppConfig) -> Result<Arc<dyn LlmProvider>, StartupError> {
    let api_key = config::api_key_from_env()?;
    let provider = GeminiProvider::new(api_key, &config.ai)?;
    info!("🤖 AI ranking via Gemini ({})", provider.model_name());
    Ok(Arc::new(provider))
}

fn build_recommender(config: &AppConfig, use_ai: bool) -> Result<Recommender, StartupError> {
    let aliases = config.alias_table()?;
    let recipes = load_recipes(&config.dataset, &aliases)?;

    let ranker = if use_ai {
        Ranker::new(gemini_provider(config)?, &config.ai)
    } else {
        info!("📦 AI ranking disabled, using deterministic pick");
        Ranker::disabled()
    };

    let options = FilterOptions {
        threshold: config.filter.threshold,
        top_n: config.filter.top_n,
    };
    Ok(Recommender::new(recipes, aliases, ranker, options))
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => error!("Failed to serialize output: {}", e),
    }
}

fn print_no_match(err: &RecommendError, json: bool) {
    if json {
        print_json(&serde_json::json!({ "error": "no_candidates", "message": err.to_string() }));
    } else {
        println!("No match. {}", err);
    }
}

fn print_recommendation(rec: &Recommendation) {
    let recipe = &rec.recipe;
    println!("🍽️  {} ({} · {} · {} min)", recipe.name, recipe.cuisine, recipe.meal_type, recipe.cooking_time);
    println!("    Ingredient match: {:.0}%", rec.overlap_ratio * 100.0);
    println!();
    println!("{}", rec.explanation);
    if let RankSource::Fallback(reason) = &rec.source {
        println!("    (picked without AI: {})", reason);
    }
    println!();
    println!("Ingredients: {}", recipe.ingredients.iter().cloned().collect::<Vec<_>>().join(", "));
    if !recipe.instructions.is_empty() {
        println!("Instructions: {}", recipe.instructions);
    }
    println!();
    println!("▶ Watch: {}", rec.video_url);
    println!("▶ More {} recipes: {}", recipe.cuisine, rec.cuisine_url);
}

fn print_candidates(candidates: &[CandidateScore<'_>]) {
    for (i, c) in candidates.iter().enumerate() {
        println!(
            "{}. {} - {:.0}% match ({}/{}), {} min",
            i + 1,
            c.recipe.name,
            c.overlap_ratio * 100.0,
            c.matched,
            c.recipe.ingredients.len(),
            c.recipe.cooking_time
        );
    }
}

fn print_generated(recipes: &[GeneratedRecipe]) {
    for (i, r) in recipes.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("✨ {} ({} · {} · {} min)", r.recipe_name, r.cuisine, r.meal_type, r.cooking_time);
        println!("    {}", r.reason);
        println!("Ingredients: {}", r.ingredients);
        println!("Instructions: {}", r.instructions);
        println!("▶ Watch: {}", r.video_url);
    }
}

async fn run(cli: Cli) -> Result<ExitCode, StartupError> {
    let config = load_config(&cli)?;

    match &cli.command {
        Command::Recommend { query, no_ai } => {
            let recommender = build_recommender(&config, config.ai.enabled && !no_ai)?;
            match recommender.recommend(&query.to_query()).await {
                Ok(rec) => {
                    if cli.json {
                        print_json(&rec);
                    } else {
                        print_recommendation(&rec);
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    print_no_match(&e, cli.json);
                    Ok(ExitCode::from(2))
                }
            }
        }
        Command::Candidates { query } => {
            let recommender = build_recommender(&config, false)?;
            match recommender.candidates(&query.to_query()) {
                Ok(report) => {
                    if cli.json {
                        print_json(&report.candidates);
                    } else {
                        print_candidates(&report.candidates);
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    print_no_match(&e, cli.json);
                    Ok(ExitCode::from(2))
                }
            }
        }
        Command::Generate { query, count } => {
            config.require_ai("Recipe generation")?;
            let aliases = config.alias_table()?;
            let provider = gemini_provider(&config)?;
            let ingredients = normalize_ingredients(&query.ingredients, &aliases);

            match generate_recipes(
                provider.as_ref(),
                &ingredients,
                query.meal_type,
                query.cuisine.trim(),
                query.max_time,
                *count,
                config.ai.timeout(),
            )
            .await
            {
                Ok(recipes) => {
                    if cli.json {
                        print_json(&recipes);
                    } else {
                        print_generated(&recipes);
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    error!("Recipe generation failed: {}", e);
                    if cli.json {
                        print_json(&serde_json::json!({ "error": "generation_failed", "message": e.to_string() }));
                    } else {
                        println!("Could not generate recipes right now: {}", e);
                    }
                    Ok(ExitCode::from(2))
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("❌ {}", e);
            ExitCode::from(1)
        }
    }
}
