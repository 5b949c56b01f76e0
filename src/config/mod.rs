//! Configuration module for Pensum.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{NotesPrompts, Prompts, QuizPrompts, TutorPrompts, ANSWER_MARKER};
pub use settings::{
    ChatSettings, DocumentSettings, GeneralSettings, GenerationSettings, KnowledgeStoreSettings,
    PromptSettings, Settings, TranscriptSettings,
};
