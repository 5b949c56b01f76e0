//! CLI module for Pensum.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Pensum - Lecture Material Study Assistant
///
/// Turn lecture material (a document, a video link, or raw text) into study
/// notes, a tutoring chat, and practice quizzes.
/// The name "Pensum" comes from the Norwegian word for "course syllabus."
#[derive(Parser, Debug)]
#[command(name = "pensum")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate study notes from lecture material
    Notes {
        /// A document path, a video link, or raw text with --text ('-' reads stdin)
        input: String,

        /// Treat the input as raw lecture text instead of a path or link
        #[arg(long)]
        text: bool,

        /// Write the notes to a file instead of only printing them
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Chat with a tutor grounded in the ingested material
    Chat {
        /// A document path, a video link, or raw text with --text ('-' reads stdin)
        input: String,

        /// Treat the input as raw lecture text instead of a path or link
        #[arg(long)]
        text: bool,
    },

    /// Generate a practice quiz from lecture material
    Quiz {
        /// A document path, a video link, or raw text with --text ('-' reads stdin)
        input: String,

        /// Treat the input as raw lecture text instead of a path or link
        #[arg(long)]
        text: bool,

        /// Question kind: multiple-choice, short-answer, essay, mixed
        #[arg(short, long, default_value = "mixed")]
        kind: String,

        /// Difficulty: easy, normal, hard
        #[arg(short, long, default_value = "normal")]
        difficulty: String,

        /// Number of questions (defaults per kind)
        #[arg(long)]
        count: Option<usize>,

        /// Skip the answer key at the end of the output
        #[arg(long)]
        no_answers: bool,

        /// Write the raw quiz text to a file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check configuration and environment requirements
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "generation.model")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
