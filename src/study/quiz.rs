//! Quiz generation and answer-marker parsing.
//!
//! Generated quiz text follows a line-oriented convention: question
//! blocks separated by blank lines, each ending with a single
//! `//ANSWER:` line. The parser here splits that text mechanically and
//! degrades gracefully when the model breaks the convention.

use super::complete;
use crate::config::{Prompts, Settings, ANSWER_MARKER};
use crate::error::{PensumError, Result};
use crate::normalize::NormalizedText;
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Requested question kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizKind {
    MultipleChoice,
    ShortAnswer,
    Essay,
    Mixed,
}

impl QuizKind {
    /// Default question count for this kind.
    pub fn default_count(&self) -> usize {
        match self {
            QuizKind::Essay => 3,
            _ => 5,
        }
    }
}

impl std::str::FromStr for QuizKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "multiple-choice" | "mc" => Ok(QuizKind::MultipleChoice),
            "short-answer" | "short" => Ok(QuizKind::ShortAnswer),
            "essay" => Ok(QuizKind::Essay),
            "mixed" => Ok(QuizKind::Mixed),
            _ => Err(format!(
                "unknown quiz kind '{}' (expected multiple-choice, short-answer, essay, or mixed)",
                s
            )),
        }
    }
}

impl std::fmt::Display for QuizKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizKind::MultipleChoice => write!(f, "multiple choice"),
            QuizKind::ShortAnswer => write!(f, "short answer"),
            QuizKind::Essay => write!(f, "essay"),
            QuizKind::Mixed => write!(f, "mixed"),
        }
    }
}

/// Requested difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizDifficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl std::str::FromStr for QuizDifficulty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(QuizDifficulty::Easy),
            "normal" | "medium" => Ok(QuizDifficulty::Normal),
            "hard" => Ok(QuizDifficulty::Hard),
            _ => Err(format!(
                "unknown difficulty '{}' (expected easy, normal, or hard)",
                s
            )),
        }
    }
}

impl std::fmt::Display for QuizDifficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizDifficulty::Easy => write!(f, "easy"),
            QuizDifficulty::Normal => write!(f, "normal"),
            QuizDifficulty::Hard => write!(f, "hard"),
        }
    }
}

/// One parsed quiz question. `answer` is `None` when the block violated
/// the marker convention and was kept whole instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizItem {
    pub question: String,
    pub answer: Option<String>,
}

/// Generates quiz text from normalized material.
pub struct QuizGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    prompts: Prompts,
}

impl QuizGenerator {
    pub fn new(settings: &Settings, prompts: Prompts) -> Self {
        Self {
            client: create_client(),
            model: settings.generation.model.clone(),
            temperature: settings.generation.quiz_temperature,
            max_tokens: settings.generation.max_output_tokens,
            prompts,
        }
    }

    /// Generate raw quiz text. Callers split it with [`split_quiz`].
    #[instrument(skip(self, normalized), fields(kind = %kind, difficulty = %difficulty))]
    pub async fn generate(
        &self,
        normalized: &NormalizedText,
        kind: QuizKind,
        difficulty: QuizDifficulty,
        count: usize,
    ) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("material".to_string(), normalized.text.clone());
        vars.insert("kind".to_string(), kind.to_string());
        vars.insert("difficulty".to_string(), difficulty.to_string());
        vars.insert("count".to_string(), count.to_string());
        let user_prompt = self.prompts.render_with_custom(&self.prompts.quiz.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.quiz.system.clone())
                .build()
                .map_err(|e| PensumError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| PensumError::Generation(e.to_string()))?
                .into(),
        ];

        let quiz = complete(
            &self.client,
            &self.model,
            messages,
            self.temperature,
            Some(self.max_tokens),
        )
        .await?;

        info!(chars = quiz.len(), "Generated quiz");
        Ok(quiz)
    }
}

/// Split quiz text into (question, answer) items.
///
/// Line-oriented grammar: blocks are separated by blank lines; a block
/// with exactly one line starting with [`ANSWER_MARKER`] yields a
/// (question, answer) pair, the answer being the remainder of that line.
/// A block with zero or multiple marker lines degrades to one unanswered
/// question holding the whole block. Never fails.
pub fn split_quiz(text: &str) -> Vec<QuizItem> {
    text.split("\n\n")
        .flat_map(|chunk| split_blocks(chunk))
        .filter_map(parse_block)
        .collect()
}

/// Further split a chunk on lines that are blank after trimming (covers
/// "\n \n" style separators that a plain "\n\n" split misses).
fn split_blocks(chunk: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    for line in chunk.split_inclusive('\n') {
        if line.trim().is_empty() {
            if pos > start {
                blocks.push(&chunk[start..pos]);
            }
            start = pos + line.len();
        }
        pos += line.len();
    }
    if start < chunk.len() {
        blocks.push(&chunk[start..]);
    }
    blocks
}

fn parse_block(block: &str) -> Option<QuizItem> {
    let block = block.trim_end_matches('\n');
    if block.trim().is_empty() {
        return None;
    }

    let marker_lines: Vec<&str> = block
        .lines()
        .filter(|l| l.trim_start().starts_with(ANSWER_MARKER))
        .collect();

    if marker_lines.len() != 1 {
        // Convention violated: keep the whole block as an unanswered
        // question rather than guessing.
        return Some(QuizItem {
            question: block.trim().to_string(),
            answer: None,
        });
    }

    let marker_line = marker_lines[0];
    let answer = marker_line
        .trim_start()
        .split_once(ANSWER_MARKER)
        .map(|(_, rest)| rest.trim().to_string())
        .unwrap_or_default();

    let question = block
        .lines()
        .filter(|l| !l.trim_start().starts_with(ANSWER_MARKER))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    Some(QuizItem {
        question,
        answer: Some(answer),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_question_split() {
        let items = split_quiz("Q: 2+2=?\nA) 3 B) 4\n//ANSWER: B");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].question, "Q: 2+2=?\nA) 3 B) 4");
        assert_eq!(items[0].answer.as_deref(), Some("B"));
    }

    #[test]
    fn test_pair_count_matches_marker_count() {
        let text = "Q1: What is a limit?\n//ANSWER: The value a function approaches\n\nQ2: 2+2=?\nA) 3 B) 4\n//ANSWER: B\n\nQ3: State the chain rule.\n//ANSWER: (f(g(x)))' = f'(g(x))g'(x)";
        let items = split_quiz(text);
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.answer.is_some()));
    }

    #[test]
    fn test_zero_markers_degrades_to_unanswered() {
        let items = split_quiz("Q: What is a derivative?");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].question, "Q: What is a derivative?");
        assert!(items[0].answer.is_none());
    }

    #[test]
    fn test_multiple_markers_degrades_to_unanswered() {
        let block = "Q: pick one\n//ANSWER: A\n//ANSWER: B";
        let items = split_quiz(block);
        assert_eq!(items.len(), 1);
        assert!(items[0].answer.is_none());
        assert_eq!(items[0].question, block);
    }

    #[test]
    fn test_blank_ish_separators() {
        let text = "Q1\n//ANSWER: yes\n   \nQ2\n//ANSWER: no";
        let items = split_quiz(text);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].answer.as_deref(), Some("no"));
    }

    #[test]
    fn test_empty_input() {
        assert!(split_quiz("").is_empty());
        assert!(split_quiz("\n\n\n").is_empty());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("mc".parse::<QuizKind>().unwrap(), QuizKind::MultipleChoice);
        assert_eq!("essay".parse::<QuizKind>().unwrap().default_count(), 3);
        assert!("pop-quiz".parse::<QuizKind>().is_err());
        assert_eq!(
            "medium".parse::<QuizDifficulty>().unwrap(),
            QuizDifficulty::Normal
        );
    }
}
