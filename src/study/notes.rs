//! Study note generation.

use super::complete;
use crate::config::{Prompts, Settings};
use crate::error::{PensumError, Result};
use crate::normalize::NormalizedText;
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Generates structured study notes from normalized material.
pub struct NoteGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    prompts: Prompts,
}

impl NoteGenerator {
    pub fn new(settings: &Settings, prompts: Prompts) -> Self {
        Self {
            client: create_client(),
            model: settings.generation.model.clone(),
            temperature: settings.generation.notes_temperature,
            max_tokens: settings.generation.max_output_tokens,
            prompts,
        }
    }

    /// Generate notes for the material. The normalized text is the only
    /// material-derived content that enters the prompt.
    #[instrument(skip(self, normalized), fields(chars = normalized.text.len()))]
    pub async fn generate(&self, normalized: &NormalizedText) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("material".to_string(), normalized.text.clone());
        let user_prompt = self
            .prompts
            .render_with_custom(&self.prompts.notes.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.notes.system.clone())
                .build()
                .map_err(|e| PensumError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| PensumError::Generation(e.to_string()))?
                .into(),
        ];

        let notes = complete(
            &self.client,
            &self.model,
            messages,
            self.temperature,
            Some(self.max_tokens),
        )
        .await?;

        info!(chars = notes.len(), "Generated study notes");
        Ok(notes)
    }
}
