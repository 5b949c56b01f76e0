//! CLI command implementations.

mod chat;
mod config;
mod doctor;
mod ingest;
mod notes;
mod quiz;

pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use notes::run_notes;
pub use quiz::run_quiz;
