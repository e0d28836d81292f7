//! Read tool - file contents with line numbers, plus image/PDF/notebook handling

use std::path::Path;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::tools::params::{optional_usize, required_str};
use crate::tools::{Tool, ToolContext, ToolError, notebook, replace};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Read a file's contents with line numbers
pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &'static str {
        "Read"
    }

    fn description(&self) -> &'static str {
        "Read a file. Text is returned with 1-indexed line numbers, up to 2000 lines by default; \
         use offset (lines to skip) and limit for large files. Images and PDFs return metadata; \
         Jupyter notebooks are rendered cell by cell with their outputs."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to read"
                },
                "offset": {
                    "type": "integer",
                    "description": "Number of lines to skip before reading (default: 0)"
                },
                "limit": {
                    "type": "integer",
                    "description": "Max lines to read (default: 2000)"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let raw = required_str(input, "file_path")?;
        let offset = optional_usize(input, "offset")?.unwrap_or(0);
        let limit = optional_usize(input, "limit")?.unwrap_or(ctx.config.limits.read_default_limit);
        debug!(%raw, offset, limit, "ReadFileTool::run: called");

        let (path, metadata) = ctx.existing_file(raw).await?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            ext if IMAGE_EXTENSIONS.contains(&ext) => Ok(json!({
                "file_path": path,
                "file_type": "image",
                "format": ext.to_ascii_uppercase(),
                "size_bytes": metadata.len(),
                "note": "Image file detected. Full visual analysis requires multimodal LLM support.",
            })),
            "pdf" => Ok(json!({
                "file_path": path,
                "file_type": "pdf",
                "size_bytes": metadata.len(),
                "note": "PDF file detected. Text extraction is not supported.",
            })),
            "ipynb" => {
                let nb = notebook::load(&path).await?;
                let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                let (content, total_cells) = notebook::render(&name, &nb);
                Ok(json!({
                    "file_path": path,
                    "file_type": "jupyter_notebook",
                    "total_cells": total_cells,
                    "content": content,
                }))
            }
            _ => numbered_lines(&path, offset, limit, ctx.config.limits.read_max_line_chars).await,
        }
    }
}

async fn numbered_lines(path: &Path, offset: usize, limit: usize, max_line_chars: usize) -> Result<Value, ToolError> {
    let content = replace::read_text(path).await?;

    let lines: Vec<&str> = content.lines().collect();
    let total_lines = lines.len();
    let selected: Vec<String> = lines
        .iter()
        .enumerate()
        .skip(offset)
        .take(limit)
        .map(|(i, line)| format!("{:6}|{}", i + 1, clip_line(line, max_line_chars)))
        .collect();

    let showing = format!("{}-{}", offset + 1, offset + selected.len());
    let content = if selected.is_empty() {
        "File is empty.".to_string()
    } else {
        selected.join("\n")
    };

    Ok(json!({
        "file_path": path,
        "total_lines": total_lines,
        "showing_lines": showing,
        "content": content,
    }))
}

fn clip_line(line: &str, max_chars: usize) -> String {
    match line.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}... (line truncated)", &line[..cut]),
        None => line.to_string(),
    }
}
