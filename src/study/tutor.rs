//! Tutoring chat turns.

use super::complete;
use crate::config::{Prompts, Settings};
use crate::conversation::Role;
use crate::error::{PensumError, Result};
use crate::normalize::NormalizedText;
use crate::openai::create_client;
use crate::session::SessionContext;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Drives tutoring turns against the session's conversation state.
///
/// The material context is injected once, on the first turn of the
/// conversation; later turns rely on the windowed history and the
/// knowledge-store grounding named in the system prompt.
pub struct TutorSession {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    history_window: usize,
    prompts: Prompts,
    material_text: String,
    store_id: Option<String>,
}

impl TutorSession {
    pub fn new(
        settings: &Settings,
        prompts: Prompts,
        normalized: &NormalizedText,
        store_id: Option<String>,
    ) -> Self {
        Self {
            client: create_client(),
            model: settings.chat.model.clone(),
            temperature: settings.chat.temperature,
            history_window: settings.chat.history_window,
            prompts,
            material_text: normalized.text.clone(),
            store_id,
        }
    }

    /// Run one tutoring turn.
    ///
    /// The user and assistant turns are appended to the conversation only
    /// after the model answers; a failed call leaves the state exactly as
    /// it was before the turn.
    #[instrument(skip(self, session, user_input))]
    pub async fn send(&self, session: &mut SessionContext, user_input: &str) -> Result<String> {
        let messages = self.build_messages(session, user_input)?;
        debug!(messages = messages.len(), "Sending tutoring turn");

        let answer = complete(&self.client, &self.model, messages, self.temperature, None).await?;

        session.conversation.push(Role::User, user_input);
        session.conversation.push(Role::Assistant, answer.clone());
        Ok(answer)
    }

    fn build_messages(
        &self,
        session: &SessionContext,
        user_input: &str,
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut system = self.prompts.tutor.system.clone();
        if let Some(store_id) = &self.store_id {
            let mut vars = HashMap::new();
            vars.insert("store_id".to_string(), store_id.clone());
            system.push_str("\n\n");
            system.push_str(
                &self
                    .prompts
                    .render_with_custom(&self.prompts.tutor.grounding, &vars),
            );
        }

        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| PensumError::Generation(e.to_string()))?
                .into(),
        ];

        // One-time material injection on the first turn only.
        if session.conversation.is_empty() {
            let mut vars = HashMap::new();
            vars.insert("material".to_string(), self.material_text.clone());
            let context = self
                .prompts
                .render_with_custom(&self.prompts.tutor.first_turn_context, &vars);
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(context)
                    .build()
                    .map_err(|e| PensumError::Generation(e.to_string()))?
                    .into(),
            );
        }

        for turn in session.conversation.window(self.history_window) {
            let message: ChatCompletionRequestMessage = match turn.role {
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| PensumError::Generation(e.to_string()))?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| PensumError::Generation(e.to_string()))?
                    .into(),
            };
            messages.push(message);
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_input)
                .build()
                .map_err(|e| PensumError::Generation(e.to_string()))?
                .into(),
        );

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    fn tutor(store_id: Option<String>) -> TutorSession {
        TutorSession::new(
            &Settings::default(),
            Prompts::default(),
            &NormalizedText::new("Lecture on derivatives..."),
            store_id,
        )
    }

    #[test]
    fn test_first_turn_injects_material_once() {
        let session = SessionContext::new();
        let messages = tutor(None).build_messages(&session, "What is a derivative?").unwrap();
        // system + material context + user turn
        assert_eq!(messages.len(), 3);
    }

    #[test]
    fn test_later_turns_skip_material_context() {
        let mut session = SessionContext::new();
        session.conversation.push(Role::User, "What is a derivative?");
        session
            .conversation
            .push(Role::Assistant, "The instantaneous rate of change.");

        let messages = tutor(None).build_messages(&session, "Give an example").unwrap();
        // system + 2 history turns + user turn, no material injection
        assert_eq!(messages.len(), 4);
    }

    #[test]
    fn test_history_is_windowed() {
        let mut session = SessionContext::new();
        for i in 0..30 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            session.conversation.push(role, format!("turn {}", i));
        }

        let messages = tutor(None).build_messages(&session, "next").unwrap();
        // system + 10 windowed turns + user turn
        assert_eq!(messages.len(), 12);
    }

    #[test]
    fn test_store_grounding_named_in_system() {
        let session = SessionContext::new();
        let messages = tutor(Some("vs_123".to_string()))
            .build_messages(&session, "hello")
            .unwrap();
        let system_text = format!("{:?}", messages[0]);
        assert!(system_text.contains("vs_123"));
    }
}
