#[macro_use]
extern crate rocket;

mod api;
mod config;
mod errors;
mod models;
mod services;
mod utils;

use crate::api::{delete_session, list_sessions, schedule_session, search_videos, start_session};
use crate::config::{create_app_state, create_cors, init_logger, load_environment, Settings};
use crate::services::session_service::SessionBoard;
use crate::services::video_search_service::VideoSearchService;
use anyhow::anyhow;
use log::error;
use rocket::{Build, Rocket};

pub struct AppState {
    pub videos: VideoSearchService,
    pub sessions: SessionBoard,
}

#[get("/health")]
fn health() -> &'static str {
    "ok"
}

pub fn build_rocket(state: AppState, cors: rocket_cors::Cors) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .mount("/", routes![health])
        .mount("/search", routes![search_videos])
        .mount(
            "/sessions",
            routes![list_sessions, schedule_session, delete_session, start_session],
        )
        .attach(cors)
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    load_environment();
    init_logger();

    let settings = Settings::from_env()?;
    let state = create_app_state(&settings)?;
    let cors = create_cors(&settings)?;

    if let Err(e) = build_rocket(state, cors).launch().await {
        error!("Rocket failed: {e}");
        return Err(anyhow!("rocket server failed to launch"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SearchError;
    use crate::services::video_search_service::MergePolicy;
    use crate::services::youtube_service::{DetailItem, SearchItem, VideoSource};
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct StaticSource {
        result: Result<Vec<SearchItem>, SearchError>,
    }

    #[rocket::async_trait]
    impl VideoSource for StaticSource {
        async fn search(&self, _term: &str, _max: u32) -> Result<Vec<SearchItem>, SearchError> {
            self.result.clone()
        }

        async fn details(&self, video_ids: &[String]) -> Result<Vec<DetailItem>, SearchError> {
            Ok(video_ids
                .iter()
                .map(|id| DetailItem {
                    video_id: id.clone(),
                    duration: "PT12M34S".to_string(),
                })
                .collect())
        }
    }

    async fn client_with(settings: Settings, source: Option<Arc<dyn VideoSource>>) -> Client {
        let mut state = create_app_state(&settings).expect("state should build");
        if let Some(source) = source {
            state.videos =
                VideoSearchService::new(source, settings.max_results, MergePolicy::ByPosition);
        }
        let cors = create_cors(&settings).expect("cors should build");
        Client::tracked(build_rocket(state, cors))
            .await
            .expect("valid rocket instance")
    }

    fn settings(api_key: Option<&str>) -> Settings {
        let mut settings = Settings::from_lookup(|_| None).expect("default settings");
        settings.youtube_api_key = api_key.map(String::from);
        // Nothing listens here.
        settings.youtube_api_base_url = "http://127.0.0.1:9".to_string();
        settings
    }

    #[tokio::test]
    async fn search_returns_videos_envelope() {
        let source = StaticSource {
            result: Ok(vec![SearchItem {
                video_id: "abc".to_string(),
                title: "Guided Calm".to_string(),
                channel_title: "Calm".to_string(),
                thumbnail_url: "https://i.ytimg.com/vi/abc/mqdefault.jpg".to_string(),
            }]),
        };
        let client = client_with(settings(Some("key")), Some(Arc::new(source))).await;

        let response = client.get("/search?q=guided%20calm").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let body: Value = response.into_json().await.expect("json body");
        assert_eq!(
            body,
            json!({
                "videos": [{
                    "videoId": "abc",
                    "title": "Guided Calm",
                    "thumbnailUrl": "https://i.ytimg.com/vi/abc/mqdefault.jpg",
                    "channelName": "Calm",
                    "duration": "12:34"
                }]
            })
        );
    }

    #[tokio::test]
    async fn search_without_query_succeeds() {
        let source = StaticSource { result: Ok(vec![]) };
        let client = client_with(settings(Some("key")), Some(Arc::new(source))).await;

        let response = client.get("/search").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.expect("json body");
        assert_eq!(body, json!({ "videos": [] }));
    }

    #[tokio::test]
    async fn upstream_failure_maps_to_500() {
        let source = StaticSource {
            result: Err(SearchError::SearchStage("403 Forbidden".to_string())),
        };
        let client = client_with(settings(Some("key")), Some(Arc::new(source))).await;

        let response = client.get("/search?q=sleep").dispatch().await;
        assert_eq!(response.status(), Status::InternalServerError);
        assert_eq!(response.content_type(), Some(ContentType::JSON));

        let body: Value = response.into_json().await.expect("json body");
        assert_eq!(
            body["error"],
            "Failed to fetch meditation videos: YouTube search API error: 403 Forbidden"
        );
    }

    #[tokio::test]
    async fn missing_api_key_maps_to_500() {
        let client = client_with(settings(None), None).await;

        let response = client.get("/search?q=sleep").dispatch().await;
        assert_eq!(response.status(), Status::InternalServerError);

        let body: Value = response.into_json().await.expect("json body");
        assert_eq!(
            body["error"],
            "Failed to fetch meditation videos: YouTube API key is not configured"
        );
    }

    #[tokio::test]
    async fn session_lifecycle_over_http() {
        let client = client_with(settings(None), None).await;
        let tomorrow = chrono::Local::now().date_naive() + chrono::Duration::days(1);

        let response = client
            .post("/sessions")
            .header(ContentType::JSON)
            .body(
                json!({
                    "sessionName": "Evening Relaxation",
                    "date": tomorrow.to_string(),
                    "time": "20:00",
                    "duration": "20",
                    "notes": "Deep relaxation",
                    "videoId": "aEqNQn3xHWo"
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Created);
        let session: Value = response.into_json().await.expect("json body");
        let id = session["id"].as_str().expect("session id").to_string();

        let listed: Value = client
            .get("/sessions")
            .dispatch()
            .await
            .into_json()
            .await
            .expect("json body");
        assert_eq!(listed.as_array().map(Vec::len), Some(1));

        let start = client.post(format!("/sessions/{id}/start")).dispatch().await;
        assert_eq!(start.status(), Status::Ok);
        let start: Value = start.into_json().await.expect("json body");
        assert_eq!(start["mode"], "video");
        assert_eq!(start["videoId"], "aEqNQn3xHWo");

        let deleted = client.delete(format!("/sessions/{id}")).dispatch().await;
        assert_eq!(deleted.status(), Status::NoContent);

        let missing = client.delete(format!("/sessions/{id}")).dispatch().await;
        assert_eq!(missing.status(), Status::NotFound);
    }

    #[tokio::test]
    async fn invalid_session_is_rejected() {
        let client = client_with(settings(None), None).await;

        let response = client
            .post("/sessions")
            .header(ContentType::JSON)
            .body(
                json!({
                    "sessionName": "Zz",
                    "date": "2099-01-01",
                    "time": "07:30",
                    "duration": "15"
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = response.into_json().await.expect("json body");
        assert_eq!(body["error"], "Session name must be at least 3 characters.");
    }

    #[tokio::test]
    async fn health_is_ok() {
        let client = client_with(settings(None), None).await;
        let response = client.get("/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.as_deref(), Some("ok"));
    }
}
