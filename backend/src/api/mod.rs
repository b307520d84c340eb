pub mod search;
pub mod sessions;

pub use search::*;
pub use sessions::*;
