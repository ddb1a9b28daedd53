//! Ratatui front-end: the record table, the add/edit dialog, and the
//! terminal loop that drives them.

mod app;
mod dialog;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
