use crate::errors::SessionError;
use crate::models::{MeditationSession, ScheduleSessionRequest, SessionStart};
use crate::utils::youtube_embed_url;
use chrono::{NaiveDate, NaiveTime, Utc};
use log::info;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub const SESSION_DURATIONS: [&str; 7] = ["5", "10", "15", "20", "30", "45", "60"];
const MIN_NAME_CHARS: usize = 3;

/// Scheduled sessions, held in process memory only.
pub struct SessionBoard {
    sessions: Arc<Mutex<Vec<MeditationSession>>>,
    sequence: AtomicU64,
}

impl Default for SessionBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBoard {
    pub fn new() -> Self {
        SessionBoard {
            sessions: Arc::new(Mutex::new(Vec::new())),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn schedule(
        &self,
        request: ScheduleSessionRequest,
        today: NaiveDate,
    ) -> Result<MeditationSession, SessionError> {
        let time = validate_request(&request, today)?;

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let session = MeditationSession {
            id: format!("{}-{}", Utc::now().timestamp_millis(), sequence),
            name: request.session_name.trim().to_string(),
            date: request.date,
            time: time.format("%H:%M").to_string(),
            duration: request.duration,
            notes: non_empty(request.notes),
            video_id: non_empty(request.video_id),
        };

        self.lock().push(session.clone());
        info!(
            "Scheduled session '{}' ({}) on {} at {}",
            session.name, session.id, session.date, session.time
        );

        Ok(session)
    }

    /// Sessions ordered by date and time; ties keep insertion order.
    pub fn list(&self) -> Vec<MeditationSession> {
        // Times are stored zero-padded as HH:MM, so they sort lexically.
        let mut sessions = self.lock().clone();
        sessions.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));
        sessions
    }

    pub fn remove(&self, id: &str) -> Result<(), SessionError> {
        let mut sessions = self.lock();
        let pos = sessions
            .iter()
            .position(|session| session.id == id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        let removed = sessions.remove(pos);
        info!("Removed session '{}' ({})", removed.name, removed.id);
        Ok(())
    }

    pub fn start(&self, id: &str) -> Result<SessionStart, SessionError> {
        let session = self
            .lock()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        let start = match session.video_id {
            Some(video_id) => SessionStart::Video {
                embed_url: youtube_embed_url(&video_id, true),
                session_id: session.id,
                video_id,
                title: session.name,
                duration: session.duration,
            },
            None => SessionStart::Timer {
                duration_minutes: session.duration.parse().unwrap_or(0),
                session_id: session.id,
                title: session.name,
            },
        };
        info!("Starting session {id}");

        Ok(start)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<MeditationSession>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn validate_request(
    request: &ScheduleSessionRequest,
    today: NaiveDate,
) -> Result<NaiveTime, SessionError> {
    if request.session_name.trim().chars().count() < MIN_NAME_CHARS {
        return Err(SessionError::InvalidRequest(format!(
            "Session name must be at least {MIN_NAME_CHARS} characters."
        )));
    }
    if request.date < today {
        return Err(SessionError::InvalidRequest(
            "Session date cannot be in the past.".to_string(),
        ));
    }
    let time = NaiveTime::parse_from_str(&request.time, "%H:%M").map_err(|_| {
        SessionError::InvalidRequest("Please select a time (HH:MM).".to_string())
    })?;
    if !SESSION_DURATIONS.contains(&request.duration.as_str()) {
        return Err(SessionError::InvalidRequest(format!(
            "Duration must be one of {} minutes.",
            SESSION_DURATIONS.join(", ")
        )));
    }
    Ok(time)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
