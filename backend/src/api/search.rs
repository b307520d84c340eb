use crate::models::{ApiError, SearchResponse};
use crate::AppState;
use log::error;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, State};

#[get("/?<q>")]
pub async fn search_videos(
    q: Option<String>,
    state: &State<AppState>,
) -> Result<Json<SearchResponse>, ApiError> {
    match state.videos.search(q.as_deref()).await {
        Ok(videos) => Ok(Json(SearchResponse { videos })),
        Err(e) => {
            error!("Search error: {e}");
            Err(ApiError::new(
                Status::InternalServerError,
                format!("Failed to fetch meditation videos: {e}"),
            ))
        }
    }
}
