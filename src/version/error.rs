use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Shared state lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum MatcherError {
    #[error("Matcher tool {0} not found on PATH")]
    ToolNotFound(String),

    #[error("Failed to run matcher: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("No matching package: {diagnostic}")]
    NoMatch { diagnostic: String },

    #[error("Matcher timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
}
