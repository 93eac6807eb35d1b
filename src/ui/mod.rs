pub mod layout;

mod chat;
mod exercise;
mod menu;
mod review;
mod summary;

pub use exercise::{draw_lesson, draw_quit_confirmation};
pub use menu::{draw_lesson_missing, draw_menu};
pub use review::draw_review;
pub use summary::draw_summary;
