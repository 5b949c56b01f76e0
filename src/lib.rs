//! Pensum - Lecture Material Study Assistant
//!
//! A CLI tool that turns lecture material into study notes, tutoring chats,
//! and practice quizzes.
//!
//! The name "Pensum" comes from the Norwegian word for "course syllabus."
//!
//! # Overview
//!
//! Pensum allows you to:
//! - Ingest lecture material from a document, a video link, or raw text
//! - Generate structured study notes from the material
//! - Chat with a tutor grounded in a server-side knowledge store
//! - Generate practice quizzes with mechanically separable answers
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt template management
//! - `material` - Ingested material representation and kind detection
//! - `transcript` - Video transcript extraction with strategy fallback
//! - `normalize` - Per-kind normalization into bounded prompt text
//! - `store` - Knowledge store lifecycle over the external search capability
//! - `conversation` - Ordered, windowed conversation state
//! - `session` - Per-session context holding material, store, conversation
//! - `study` - Note, tutoring, and quiz generation
//!
//! # Example
//!
//! ```rust,no_run
//! use pensum::config::Settings;
//! use pensum::material::IngestedMaterial;
//! use pensum::normalize::Normalizer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let material = IngestedMaterial::text("Lecture on derivatives...")?;
//!
//!     let normalizer = Normalizer::new(&settings);
//!     let normalized = normalizer.normalize(&material).await?;
//!     println!("{} chars of prompt context", normalized.text.len());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod material;
pub mod normalize;
pub mod openai;
pub mod session;
pub mod store;
pub mod study;
pub mod transcript;

pub use error::{PensumError, Result};
