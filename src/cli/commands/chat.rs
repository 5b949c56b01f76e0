//! Interactive tutoring chat command.

use super::ingest::{ingest_input, require_api_key};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::normalize::Normalizer;
use crate::session::SessionContext;
use crate::store::{OpenAISearchIndex, StoreManager};
use crate::study::TutorSession;
use console::style;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::debug;

/// Run the chat command: ingest, normalize, index, then tutor interactively.
pub async fn run_chat(input: &str, text: bool, settings: Settings) -> Result<()> {
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

    let mut session = SessionContext::new();
    session.set_material(material);

    let manager = StoreManager::new(
        Arc::new(OpenAISearchIndex::new()),
        settings.knowledge_store.clone(),
    );
    let spinner = Output::spinner("Indexing material into knowledge store...");
    let store_id = manager.ensure_store(&mut session, &normalized).await;
    spinner.finish_and_clear();
    let store_id = store_id?;
    debug!(store_id = %store_id, "Chat session grounded");

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let tutor = TutorSession::new(&settings, prompts, &normalized, Some(store_id));

    println!("\n{}", style("Pensum Tutor").bold().cyan());
    println!(
        "{}\n",
        style("Ask about your material, or 'exit' to quit. Use 'clear' to reset the conversation.")
            .dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            Output::info("Good luck with the exam!");
            break;
        }

        if line.eq_ignore_ascii_case("clear") {
            session.conversation.reset();
            Output::info("Conversation cleared.");
            continue;
        }

        match tutor.send(&mut session, line).await {
            Ok(answer) => {
                println!("\n{} {}\n", style("Tutor:").cyan().bold(), answer);
            }
            Err(e) => {
                // The failed turn was not recorded; retyping retries it.
                Output::error(&format!("{}", e));
                Output::info("That turn was not saved. Ask again to retry.");
            }
        }
    }

    Ok(())
}
