//! Prompt templates for Pensum.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Literal token separating a quiz question from its answer.
///
/// The quiz prompt instructs the model to emit this exactly once per
/// question, on its own trailing line, so the display layer can split
/// mechanically.
pub const ANSWER_MARKER: &str = "//ANSWER:";

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub notes: NotesPrompts,
    pub tutor: TutorPrompts,
    pub quiz: QuizPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}


/// Prompts for study note generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesPrompts {
    pub system: String,
    pub user: String,
}

impl Default for NotesPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a teaching assistant who turns lecture material into study notes.

Produce notes with exactly this structure:

1. Lecture Overview
   - One-line summary of the topic
   - The core questions or goals the lecture addresses

2. Key Concepts
   - Concept: definition + the points that matter
   - One entry per concept, as many as the material needs

3. Examples and Applications
   - Representative examples or cases from the material
   - How a student would use this in practice

4. Review Checklist
   - 3 to 5 self-test questions for revision

Keep the notes tight - one to two pages of text, no padding."#
                .to_string(),

            user: r#"The following is lecture material supplied by a student.
Write study notes covering this material.

{{material}}"#
                .to_string(),
        }
    }
}

/// Prompts for the tutoring chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorPrompts {
    pub system: String,
    /// Grounding line appended to the system prompt when a knowledge
    /// store backs the session. `{{store_id}}` is substituted.
    pub grounding: String,
    /// One-time material context injected on the first turn only.
    pub first_turn_context: String,
}

impl Default for TutorPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a study tutor helping a student work through lecture material they uploaded.

Guidelines:
- Answer from the uploaded material wherever possible, and say so when it does not cover the question
- Explain step by step; prefer a worked example over an abstract restatement
- Ask a clarifying question when the student's intent is unclear
- Remember earlier turns in this conversation for follow-ups"#
                .to_string(),

            grounding: "The student's material is indexed in knowledge store {{store_id}}. Ground your answers in that uploaded material.".to_string(),

            first_turn_context: r#"Course material for this session:

{{material}}"#
                .to_string(),
        }
    }
}

/// Prompts for quiz generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizPrompts {
    pub system: String,
    pub user: String,
}

impl Default for QuizPrompts {
    fn default() -> Self {
        Self {
            system: r#"You write practice quizzes from lecture material.

Output format rules:
- Write each question as its own block, blocks separated by one blank line
- For multiple choice, include four options labeled A) to D)
- End every question block with a single line of the form:
  //ANSWER: <the answer>
- The //ANSWER: line appears exactly once per question, as the last line of its block
- Keep question wording short and unambiguous
- Plain text only, no markdown tables"#
                .to_string(),

            user: r#"Create {{count}} {{kind}} questions from the lecture material below.
Difficulty: {{difficulty}}

--- Lecture material ---
{{material}}
------------------------"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        // Store custom variables
        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            // Load note prompts if file exists
            let notes_path = custom_path.join("notes.toml");
            if notes_path.exists() {
                let content = std::fs::read_to_string(&notes_path)?;
                prompts.notes = toml::from_str(&content)?;
            }

            // Load tutor prompts if file exists
            let tutor_path = custom_path.join("tutor.toml");
            if tutor_path.exists() {
                let content = std::fs::read_to_string(&tutor_path)?;
                prompts.tutor = toml::from_str(&content)?;
            }

            // Load quiz prompts if file exists
            let quiz_path = custom_path.join("quiz.toml");
            if quiz_path.exists() {
                let content = std::fs::read_to_string(&quiz_path)?;
                prompts.quiz = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        // Start with custom variables, then override with provided vars
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
