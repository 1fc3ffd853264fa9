use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Two-phase Telegram autoposter: generate a draft, review it, publish it.
#[derive(Debug, Parser)]
#[command(name = "autoposter", version)]
pub struct Cli {
    /// Config file (default: autoposter.toml in the working directory, if present).
    #[arg(long, global = true, env = "AUTOPOSTER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Phase 1: turn the next unused idea into a pending draft.
    Generate,
    /// Phase 2: publish the pending draft.
    Publish {
        /// Publish even when AUTOPUBLISH_ENABLED is off.
        #[arg(long)]
        force: bool,
    },
    /// Generate and publish in one go.
    Full,
    #[command(subcommand)]
    Ideas(IdeasCommand),
    #[command(subcommand)]
    Draft(DraftCommand),
    #[command(subcommand)]
    Face(FaceCommand),
    #[command(subcommand)]
    Prompts(PromptsCommand),
    #[command(subcommand)]
    Context(ContextCommand),
}

#[derive(Debug, Subcommand)]
pub enum IdeasCommand {
    List,
    Add { text: String },
}

#[derive(Debug, Subcommand)]
pub enum DraftCommand {
    /// Print the last draft record.
    Show,
    /// Replace the pending draft's text.
    Edit {
        #[arg(long)]
        text_file: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
pub enum FaceCommand {
    /// Store the expert face used for face embedding and swaps.
    Set { image: PathBuf },
}

#[derive(Debug, Subcommand)]
pub enum PromptsCommand {
    /// Set or replace the prompt overrides. Omitted flags keep their current value.
    Set {
        #[arg(long)]
        system_file: Option<PathBuf>,
        /// Image prompt template; `{idea}` is replaced by the topic.
        #[arg(long)]
        image_template: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ContextCommand {
    /// Attach a plain-text document to every text prompt.
    Set { file: PathBuf },
    Clear,
}
