use crate::services::session_service::SessionBoard;
use crate::services::video_search_service::{MergePolicy, VideoSearchService, DEFAULT_MAX_RESULTS};
use crate::services::youtube_service::YouTubeClient;
use crate::AppState;
use anyhow::{anyhow, Context, Result};
use env_logger::Builder;
use log::{info, warn, LevelFilter};
use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";
const MAX_YOUTUBE_RESULTS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub youtube_api_key: Option<String>,
    pub youtube_api_base_url: String,
    pub max_results: u32,
    pub merge_policy: MergePolicy,
    pub http_timeout: Duration,
    pub cors_allowed_origin: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let youtube_api_base_url = var("YOUTUBE_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_YOUTUBE_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let parsed_base = Url::parse(&youtube_api_base_url)
            .with_context(|| format!("YOUTUBE_API_BASE_URL is not a valid URL: {youtube_api_base_url}"))?;
        if !matches!(parsed_base.scheme(), "http" | "https") {
            return Err(anyhow!(
                "YOUTUBE_API_BASE_URL must start with http:// or https://"
            ));
        }

        let max_results = match var("YOUTUBE_MAX_RESULTS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("invalid integer in YOUTUBE_MAX_RESULTS: {raw}"))?,
            None => DEFAULT_MAX_RESULTS,
        };
        if !(1..=MAX_YOUTUBE_RESULTS).contains(&max_results) {
            return Err(anyhow!(
                "YOUTUBE_MAX_RESULTS must be between 1 and {MAX_YOUTUBE_RESULTS}"
            ));
        }

        let merge_policy = match var("VIDEO_MERGE_POLICY") {
            Some(raw) => MergePolicy::from_str(&raw).map_err(|e| anyhow!("VIDEO_MERGE_POLICY: {e}"))?,
            None => MergePolicy::default(),
        };

        let http_timeout_secs = match var("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("invalid integer in HTTP_TIMEOUT_SECS: {raw}"))?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Settings {
            youtube_api_key: var("YOUTUBE_API_KEY"),
            youtube_api_base_url,
            max_results,
            merge_policy,
            http_timeout: Duration::from_secs(http_timeout_secs),
            cors_allowed_origin: var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|| DEFAULT_CORS_ALLOWED_ORIGIN.to_string()),
        })
    }
}

pub fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Starting Rocket backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

pub fn create_app_state(settings: &Settings) -> Result<AppState> {
    if settings.youtube_api_key.is_none() {
        warn!("YOUTUBE_API_KEY is not set; video searches will fail until it is configured.");
    }

    let http_client = reqwest::Client::builder()
        .timeout(settings.http_timeout)
        .build()
        .context("failed to build YouTube http client")?;

    let youtube = YouTubeClient::new(
        http_client,
        settings.youtube_api_base_url.clone(),
        settings.youtube_api_key.clone(),
    );
    info!(
        "Using YouTube API at {} (max {} results, {:?} merge)",
        settings.youtube_api_base_url, settings.max_results, settings.merge_policy
    );

    Ok(AppState {
        videos: VideoSearchService::new(
            Arc::new(youtube),
            settings.max_results,
            settings.merge_policy,
        ),
        sessions: SessionBoard::new(),
    })
}

pub fn create_cors(settings: &Settings) -> Result<rocket_cors::Cors> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::some_exact(&[settings
            .cors_allowed_origin
            .as_str()]))
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Delete, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&["Accept", "Content-Type"]))
        .to_cors()
        .map_err(|e| anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}
