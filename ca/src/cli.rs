//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ca - drive the coding agent tool runtime from the command line
#[derive(Parser)]
#[command(
    name = "ca",
    about = "Tool-execution runtime for an autonomous coding agent",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to: ~/.local/share/codeagent/logs/codeagent.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, help = "Log level (trace, debug, info, warn, error)")]
    pub log_level: Option<String>,

    /// Working directory the tools start in
    #[arg(short = 'C', long, global = true, help = "Working directory the tools start in")]
    pub cwd: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// List the available tools
    Tools,

    /// Print JSON tool definitions
    Schema {
        /// Only this tool
        tool: Option<String>,
    },

    /// Run a single tool call and print its result envelope
    Exec {
        /// Tool name, e.g. Read or Bash
        tool: String,

        /// Tool input as a JSON object
        #[arg(short, long, default_value = "{}")]
        input: String,

        /// Also print the system hint afterwards
        #[arg(long)]
        hint: bool,
    },

    /// Run a JSONL script of tool calls against one runtime
    Run {
        /// File with one {"tool": ..., "input": {...}} object per line
        #[arg(value_name = "FILE")]
        script: PathBuf,

        /// Print the system hint after the last call
        #[arg(long)]
        hint: bool,
    },
}
