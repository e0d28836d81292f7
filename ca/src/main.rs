//! ca - command-line driver for the codeagent tool runtime

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result, eyre};
use serde_json::Value;
use tracing::{debug, info};

use codeagent::cli::{Cli, Command};
use codeagent::config::Config;
use codeagent::tools::{ToolCall, ToolContext, ToolRegistry};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("codeagent")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(log_dir.join("codeagent.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let registry = ToolRegistry::standard();

    match cli.command {
        Command::Tools => cmd_tools(&registry),
        Command::Schema { tool } => cmd_schema(&registry, tool.as_deref()),
        Command::Exec { tool, input, hint } => {
            let ctx = build_context(cli.cwd, config)?;
            let result = cmd_exec(&registry, &ctx, &tool, &input, hint).await;
            ctx.state.shutdown().await;
            result
        }
        Command::Run { script, hint } => {
            let ctx = build_context(cli.cwd, config)?;
            let result = cmd_run(&registry, &ctx, &script, hint).await;
            ctx.state.shutdown().await;
            result
        }
    }
}

/// Tool context rooted at --cwd, then the configured working directory, then the process cwd
fn build_context(cli_cwd: Option<PathBuf>, config: Config) -> Result<ToolContext> {
    let cwd = match cli_cwd.or_else(|| config.working_directory.clone()) {
        Some(dir) => fs::canonicalize(&dir).context(format!("Invalid working directory {}", dir.display()))?,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    info!(cwd = %cwd.display(), "Starting tool runtime");
    Ok(ToolContext::with_config(cwd, config))
}

/// List tool names and descriptions
fn cmd_tools(registry: &ToolRegistry) -> Result<()> {
    for def in registry.definitions() {
        println!("{}", def.name.bold().cyan());
        println!("    {}", def.description);
    }
    Ok(())
}

/// Print JSON tool definitions
fn cmd_schema(registry: &ToolRegistry, tool: Option<&str>) -> Result<()> {
    let defs = registry.definitions();
    let json = match tool {
        Some(name) => {
            let def = defs
                .into_iter()
                .find(|d| d.name == name)
                .ok_or_else(|| eyre!("Unknown tool: {}", name))?;
            serde_json::to_string_pretty(&def)?
        }
        None => serde_json::to_string_pretty(&defs)?,
    };
    println!("{}", json);
    Ok(())
}

/// Run one tool call and print the envelope
async fn cmd_exec(registry: &ToolRegistry, ctx: &ToolContext, tool: &str, input: &str, hint: bool) -> Result<()> {
    let input: Value = serde_json::from_str(input).context("Invalid --input JSON")?;
    debug!(%tool, "cmd_exec: called");

    let result = registry.execute(tool, input, ctx).await;
    println!("{}", serde_json::to_string_pretty(&result.to_value())?);

    if hint {
        println!();
        println!("{}", ctx.state.system_hint().await);
    }
    Ok(())
}

/// Run a JSONL script of tool calls; blank lines and `#` comments are skipped
async fn cmd_run(registry: &ToolRegistry, ctx: &ToolContext, script: &Path, hint: bool) -> Result<()> {
    let content = fs::read_to_string(script).context(format!("Failed to read script {}", script.display()))?;

    let calls = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .map(|(i, line)| {
            serde_json::from_str::<ToolCall>(line).context(format!("Invalid tool call on line {}", i + 1))
        })
        .collect::<Result<Vec<_>>>()?;
    info!(count = calls.len(), script = %script.display(), "Running script");

    let mut failed = 0;
    for call in &calls {
        let result = registry.execute_call(call, ctx).await;
        if !result.success {
            failed += 1;
        }
        println!("{}", serde_json::to_string(&result.to_value())?);
    }

    let summary = format!("{} call(s), {} failed", calls.len(), failed);
    if failed == 0 {
        eprintln!("{}", summary.green());
    } else {
        eprintln!("{}", summary.yellow());
    }

    if hint {
        println!();
        println!("{}", ctx.state.system_hint().await);
    }
    Ok(())
}
