//! zhelezo - workout program parser and Telegram training log
//!
//! Turns free-text programs ("Жим лёжа — 4х10") into days, exercises and
//! per-set rep targets, and compares every recorded weight with the last one.

pub mod bot;
pub mod config;
pub mod db;
pub mod error;
pub mod parser;
pub mod progress;
pub mod training;

pub use db::Database;
pub use parser::ParsedExercise;
