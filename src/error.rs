use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration problems. Always fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Recipe dataset could not be loaded. Always fatal.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Dataset header is missing column '{0}'")]
    MissingColumn(String),

    #[error("Failed to read dataset header: {0}")]
    Header(#[source] csv::Error),

    #[error("Dataset contains no usable recipes")]
    Empty,
}

/// Per-request outcome the user has to act on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    #[error("No recipe matches: {rejected_time} too slow, {rejected_meal_type} wrong meal type, {rejected_cuisine} wrong cuisine, {rejected_overlap} missing too many ingredients. Try relaxing your constraints.")]
    NoCandidates {
        rejected_time: usize,
        rejected_meal_type: usize,
        rejected_cuisine: usize,
        rejected_overlap: usize,
    },
}

/// Anything that stops the process before a request can run.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("AI provider setup failed: {0}")]
    Provider(#[from] crate::llm::LlmError),
}
