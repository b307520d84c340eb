use crate::errors::SearchError;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

/// One ordered hit of the keyword search stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchItem {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub thumbnail_url: String,
}

/// Technical metadata of the details stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailItem {
    pub video_id: String,
    pub duration: String, // ISO8601, e.g. PT1H2M3S
}

/// Upstream video API, split into its two stages.
///
/// Implementations must check for credentials before touching the network.
#[rocket::async_trait]
pub trait VideoSource: Send + Sync {
    async fn search(&self, term: &str, max_results: u32) -> Result<Vec<SearchItem>, SearchError>;

    async fn details(&self, video_ids: &[String]) -> Result<Vec<DetailItem>, SearchError>;
}

#[derive(Debug, Default, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchListItem>,
}

// Hit fields are required: a malformed hit fails the whole search stage.
#[derive(Debug, Deserialize)]
struct SearchListItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    channel_title: String,
    thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    medium: Thumbnail,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoListItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VideoListItem {
    id: String,
    content_details: ContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentDetails {
    duration: Option<String>,
}

impl From<SearchListItem> for SearchItem {
    fn from(item: SearchListItem) -> Self {
        SearchItem {
            video_id: item.id.video_id,
            title: item.snippet.title,
            channel_title: item.snippet.channel_title,
            thumbnail_url: item.snippet.thumbnails.medium.url,
        }
    }
}

impl From<VideoListItem> for DetailItem {
    fn from(item: VideoListItem) -> Self {
        DetailItem {
            video_id: item.id,
            duration: item
                .content_details
                .duration
                .filter(|duration| !duration.is_empty())
                .unwrap_or_else(|| crate::utils::ZERO_DURATION.to_string()),
        }
    }
}

/// YouTube Data API v3 client.
///
/// Documentation: https://developers.google.com/youtube/v3/docs
pub struct YouTubeClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl YouTubeClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn api_key(&self) -> Result<&str, SearchError> {
        self.api_key.as_deref().ok_or(SearchError::MissingApiKey)
    }

    async fn get_json<T>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        stage_error: fn(String) -> SearchError,
    ) -> Result<T, SearchError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let api_key = self.api_key()?;
        let url = format!("{}/{endpoint}", self.base_url);
        debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", api_key)])
            .send()
            .await
            .map_err(|e| stage_error(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(stage_error(status.to_string()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| stage_error(format!("invalid response body: {}", e.without_url())))
    }
}

#[rocket::async_trait]
impl VideoSource for YouTubeClient {
    async fn search(&self, term: &str, max_results: u32) -> Result<Vec<SearchItem>, SearchError> {
        let max_results = max_results.to_string();
        let response: SearchListResponse = self
            .get_json(
                "search",
                &[
                    ("part", "snippet"),
                    ("maxResults", max_results.as_str()),
                    ("q", term),
                    ("type", "video"),
                ],
                SearchError::SearchStage,
            )
            .await?;

        Ok(response.items.into_iter().map(SearchItem::from).collect())
    }

    async fn details(&self, video_ids: &[String]) -> Result<Vec<DetailItem>, SearchError> {
        let ids = video_ids.join(",");
        let response: VideoListResponse = self
            .get_json(
                "videos",
                &[("part", "contentDetails"), ("id", ids.as_str())],
                SearchError::DetailsStage,
            )
            .await?;

        Ok(response.items.into_iter().map(DetailItem::from).collect())
    }
}
