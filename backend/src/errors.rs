use thiserror::Error;

/// Failure of a video search call. Every variant is fatal for the request;
/// nothing is retried and no partial result is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("YouTube API key is not configured")]
    MissingApiKey,
    #[error("YouTube search API error: {0}")]
    SearchStage(String),
    #[error("YouTube video API error: {0}")]
    DetailsStage(String),
}

impl SearchError {
    pub fn stage(&self) -> &'static str {
        match self {
            SearchError::MissingApiKey => "configuration",
            SearchError::SearchStage(_) => "search",
            SearchError::DetailsStage(_) => "details",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Session {0} not found")]
    NotFound(String),
}
