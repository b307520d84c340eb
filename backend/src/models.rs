use chrono::NaiveDate;
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::serde::{Deserialize, Serialize};
use rocket::{response, Response};
use std::io::Cursor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDescriptor {
    pub video_id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub channel_name: String,
    pub duration: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub videos: Vec<VideoDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeditationSession {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub time: String,
    pub duration: String, // in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSessionRequest {
    pub session_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub duration: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SessionStart {
    #[serde(rename_all = "camelCase")]
    Video {
        session_id: String,
        video_id: String,
        title: String,
        duration: String,
        embed_url: String,
    },
    #[serde(rename_all = "camelCase")]
    Timer {
        session_id: String,
        title: String,
        duration_minutes: u32,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: Status,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: Status, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
            },
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let json = serde_json::to_string(&self.body).map_err(|_| Status::InternalServerError)?;
        Response::build()
            .status(self.status)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}
