//! Quiz generation command.

use super::ingest::{ingest_input, require_api_key};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::error::{PensumError, Result};
use crate::normalize::Normalizer;
use crate::study::{split_quiz, QuizDifficulty, QuizGenerator, QuizKind};

/// Run the quiz command: ingest, normalize, generate, split, display.
#[allow(clippy::too_many_arguments)]
pub async fn run_quiz(
    input: &str,
    text: bool,
    kind: &str,
    difficulty: &str,
    count: Option<usize>,
    no_answers: bool,
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    require_api_key()?;

    let kind: QuizKind = kind.parse().map_err(PensumError::InvalidInput)?;
    let difficulty: QuizDifficulty = difficulty.parse().map_err(PensumError::InvalidInput)?;
    let count = count.unwrap_or_else(|| kind.default_count());

    let material = ingest_input(input, text)?;
    Output::info(&format!(
        "Studying {} ({})",
        material.display_name(),
        material.kind
    ));

    let normalizer = Normalizer::new(&settings);
    let spinner = Output::spinner("Preparing material...");
    let normalized = normalizer.normalize(&material).await;
    spinner.finish_and_clear();
    let normalized = normalized?;

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let generator = QuizGenerator::new(&settings, prompts);

    let spinner = Output::spinner(&format!(
        "Generating {} {} questions ({})...",
        count, kind, difficulty
    ));
    let quiz_text = generator.generate(&normalized, kind, difficulty, count).await;
    spinner.finish_and_clear();
    let quiz_text = quiz_text?;

    let items = split_quiz(&quiz_text);

    Output::header("Practice Quiz");
    for (i, item) in items.iter().enumerate() {
        println!("\n{}. {}", i + 1, item.question);
    }

    if !no_answers {
        Output::header("Answer Key");
        for (i, item) in items.iter().enumerate() {
            match &item.answer {
                Some(answer) => println!("{}. {}", i + 1, answer),
                None => println!("{}. (no answer provided)", i + 1),
            }
        }
    }

    if let Some(path) = output {
        std::fs::write(&path, &quiz_text)?;
        Output::success(&format!("Quiz written to {}", path));
    }

    Ok(())
}
