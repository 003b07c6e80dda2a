pub mod aliases;
pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod generate;
pub mod llm;
pub mod normalization;
pub mod prompts;
pub mod ranker;
pub mod recommender;
pub mod structures;
pub mod video;

pub use aliases::AliasTable;
pub use error::{ConfigError, DatasetError, RecommendError, StartupError};
pub use recommender::Recommender;
pub use structures::{CandidateScore, MealType, Recipe, Recommendation, UserQuery};
