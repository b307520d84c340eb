pub mod session_service;
pub mod video_search_service;
pub mod youtube_service;
