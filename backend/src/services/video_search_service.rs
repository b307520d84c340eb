use crate::errors::SearchError;
use crate::models::VideoDescriptor;
use crate::services::youtube_service::{DetailItem, SearchItem, VideoSource};
use crate::utils::{format_iso8601_duration, normalize_search_term, ZERO_DURATION};
use log::{error, info};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// How search hits are paired with detail records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Pair by array index, as the details endpoint is assumed to preserve order.
    #[default]
    ByPosition,
    /// Pair by video id; hits without a matching record get the zero duration.
    ById,
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "position" | "by_position" => Ok(MergePolicy::ByPosition),
            "id" | "by_id" => Ok(MergePolicy::ById),
            other => Err(format!("unknown merge policy '{other}'")),
        }
    }
}

type CachedVideos = Arc<OnceCell<Vec<VideoDescriptor>>>;

pub struct VideoSearchService {
    source: Arc<dyn VideoSource>,
    max_results: u32,
    merge_policy: MergePolicy,
    cache: RwLock<HashMap<String, CachedVideos>>,
}

impl VideoSearchService {
    pub fn new(source: Arc<dyn VideoSource>, max_results: u32, merge_policy: MergePolicy) -> Self {
        Self {
            source,
            max_results,
            merge_policy,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Search for playable meditation videos, memoized per normalized term.
    ///
    /// Concurrent callers for the same term share one upstream fetch. Failed
    /// fetches are not cached.
    pub async fn search(&self, raw_term: Option<&str>) -> Result<Vec<VideoDescriptor>, SearchError> {
        let term = normalize_search_term(raw_term);
        let cell = self.cell_for(&term).await;

        if let Some(videos) = cell.get() {
            info!("Cache hit for '{term}' ({} videos)", videos.len());
            return Ok(videos.clone());
        }

        match cell.get_or_try_init(|| self.fetch(&term)).await {
            Ok(videos) => Ok(videos.clone()),
            Err(e) => {
                error!("Video search for '{term}' failed at {} stage: {e}", e.stage());
                self.evict_failed(&term, &cell).await;
                Err(e)
            }
        }
    }

    /// Drop the entry for `term` if it is still this empty cell.
    async fn evict_failed(&self, term: &str, cell: &CachedVideos) {
        let mut cache = self.cache.write().await;
        if let Some(current) = cache.get(term) {
            if Arc::ptr_eq(current, cell) && !current.initialized() {
                cache.remove(term);
            }
        }
    }

    async fn cell_for(&self, term: &str) -> CachedVideos {
        if let Some(cell) = self.cache.read().await.get(term) {
            return cell.clone();
        }

        self.cache
            .write()
            .await
            .entry(term.to_string())
            .or_default()
            .clone()
    }

    async fn fetch(&self, term: &str) -> Result<Vec<VideoDescriptor>, SearchError> {
        info!("Searching YouTube for '{term}'");
        let items = self.source.search(term, self.max_results).await?;

        if items.is_empty() {
            info!("No videos found for '{term}'");
            return Ok(Vec::new());
        }

        let video_ids: Vec<String> = items.iter().map(|item| item.video_id.clone()).collect();
        let details = self.source.details(&video_ids).await?;

        if details.len() != items.len() {
            info!(
                "Details returned {} of {} videos for '{term}'",
                details.len(),
                items.len()
            );
        }

        let videos = merge_results(items, &details, self.merge_policy);
        info!("Found {} videos for '{term}'", videos.len());
        Ok(videos)
    }
}

/// Combine search hits with detail records. Output order and length follow
/// `items`.
pub fn merge_results(
    items: Vec<SearchItem>,
    details: &[DetailItem],
    policy: MergePolicy,
) -> Vec<VideoDescriptor> {
    let by_id: HashMap<&str, &DetailItem> = match policy {
        MergePolicy::ById => details
            .iter()
            .map(|detail| (detail.video_id.as_str(), detail))
            .collect(),
        MergePolicy::ByPosition => HashMap::new(),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let detail = match policy {
                MergePolicy::ByPosition => details.get(index),
                MergePolicy::ById => by_id.get(item.video_id.as_str()).copied(),
            };
            let duration = detail
                .map(|detail| detail.duration.as_str())
                .unwrap_or(ZERO_DURATION);

            VideoDescriptor {
                video_id: item.video_id,
                title: item.title,
                thumbnail_url: item.thumbnail_url,
                channel_name: item.channel_title,
                duration: format_iso8601_duration(duration),
            }
        })
        .collect()
}
