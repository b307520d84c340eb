use crate::errors::SessionError;
use crate::models::{ApiError, MeditationSession, ScheduleSessionRequest, SessionStart};
use crate::AppState;
use chrono::Local;
use rocket::http::Status;
use rocket::response::status::{Created, NoContent};
use rocket::serde::json::Json;
use rocket::{delete, get, post, State};

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        let status = match e {
            SessionError::InvalidRequest(_) => Status::BadRequest,
            SessionError::NotFound(_) => Status::NotFound,
        };
        ApiError::new(status, e.to_string())
    }
}

#[get("/")]
pub fn list_sessions(state: &State<AppState>) -> Json<Vec<MeditationSession>> {
    Json(state.sessions.list())
}

#[post("/", data = "<request>")]
pub fn schedule_session(
    request: Json<ScheduleSessionRequest>,
    state: &State<AppState>,
) -> Result<Created<Json<MeditationSession>>, ApiError> {
    let today = Local::now().date_naive();
    let session = state.sessions.schedule(request.into_inner(), today)?;
    let location = format!("/sessions/{}", session.id);

    Ok(Created::new(location).body(Json(session)))
}

#[delete("/<id>")]
pub fn delete_session(id: &str, state: &State<AppState>) -> Result<NoContent, ApiError> {
    state.sessions.remove(id)?;
    Ok(NoContent)
}

#[post("/<id>/start")]
pub fn start_session(id: &str, state: &State<AppState>) -> Result<Json<SessionStart>, ApiError> {
    Ok(Json(state.sessions.start(id)?))
}
