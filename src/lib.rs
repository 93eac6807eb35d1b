pub mod api;
pub mod audio;
pub mod db;
pub mod exercise;
pub mod gender;
pub mod lessons;
pub mod logger;
pub mod models;
pub mod net_worker;
pub mod review;
pub mod session;
pub mod ui;
pub mod utils;

// Re-exports for convenience
pub use api::{ApiClient, ApiError};
pub use audio::{AudioPlayer, PlaybackSink};
pub use gender::{Gender, GenderedText, resolve};
pub use models::{ApiRequest, ApiResponse, AppState, Exercise, Lesson};
pub use review::{Quality, ReviewSession};
pub use session::{LessonSession, handle_chat_input};
