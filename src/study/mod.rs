//! Study artifact generation: notes, tutoring turns, and quizzes.

mod notes;
pub mod quiz;
mod tutor;

pub use notes::NoteGenerator;
pub use quiz::{split_quiz, QuizDifficulty, QuizGenerator, QuizItem, QuizKind};
pub use tutor::TutorSession;

use crate::error::{PensumError, Result};
use async_openai::types::{ChatCompletionRequestMessage, CreateChatCompletionRequestArgs};

/// One chat-completions call returning the model's text.
///
/// Failures (including timeouts from the bounded HTTP client) surface as
/// [`PensumError::Generation`] so callers can offer a manual retry.
pub(crate) async fn complete(
    client: &async_openai::Client<async_openai::config::OpenAIConfig>,
    model: &str,
    messages: Vec<ChatCompletionRequestMessage>,
    temperature: f32,
    max_tokens: Option<u32>,
) -> Result<String> {
    let mut builder = CreateChatCompletionRequestArgs::default();
    builder
        .model(model)
        .messages(messages)
        .temperature(temperature);
    if let Some(max) = max_tokens {
        builder.max_tokens(max);
    }

    let request = builder
        .build()
        .map_err(|e| PensumError::Generation(format!("Failed to build request: {}", e)))?;

    let response = client
        .chat()
        .create(request)
        .await
        .map_err(|e| PensumError::Generation(format!("model call failed: {}", e)))?;

    let answer = response
        .choices
        .first()
        .and_then(|c| c.message.content.as_ref())
        .ok_or_else(|| PensumError::Generation("empty response from model".to_string()))?
        .clone();

    if answer.trim().is_empty() {
        return Err(PensumError::Generation(
            "empty response from model".to_string(),
        ));
    }

    Ok(answer)
}
