//! Ratatui front-end: the order of service and the song list side by side,
//! the viewer panel underneath, and modal forms for text entry.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
