//! Core library surface for the Coffee Catalog TUI application.
//!
//! The `bin` target only wires these pieces together: load the config, start
//! logging, open the store, and hand it to the Ratatui event loop.
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod ui;

pub use config::Config;

/// Persistence entry points: the store abstraction and its SQLite backing.
pub use db::{CoffeeStore, SqliteStore};

pub use models::{CoffeeDraft, CoffeeInput, CoffeeRecord, FormError, RecordGrid};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
