//! Study note generation command.

use super::ingest::{ingest_input, require_api_key};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::normalize::Normalizer;
use crate::study::NoteGenerator;

/// Run the notes command: ingest, normalize, generate, display/export.
pub async fn run_notes(
    input: &str,
    text: bool,
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    require_api_key()?;

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
    let generator = NoteGenerator::new(&settings, prompts);

    let spinner = Output::spinner("Generating study notes...");
    let notes = generator.generate(&normalized).await;
    spinner.finish_and_clear();
    let notes = notes?;

    Output::header("Study Notes");
    println!("{}", notes);

    if let Some(path) = output {
        std::fs::write(&path, &notes)?;
        Output::success(&format!("Notes written to {}", path));
    }

    Ok(())
}
