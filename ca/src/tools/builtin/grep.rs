//! Grep tool - regex search over files using the ripgrep libraries

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};
use grep_searcher::{Searcher, SearcherBuilder, Sink, SinkMatch};
use regex::RegexBuilder;
use serde_json::{Value, json};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::tools::params::{optional_bool, optional_str, optional_usize, required_str};
use crate::tools::{Tool, ToolContext, ToolError};

const NO_MATCHES: &str = "No matches found.";

/// File extensions searched for each `type` filter
fn type_extensions(file_type: &str) -> Option<&'static [&'static str]> {
    let exts: &'static [&'static str] = match file_type {
        "py" | "python" => &["py", "pyi"],
        "js" | "javascript" => &["js", "jsx", "mjs", "cjs"],
        "ts" | "typescript" => &["ts", "tsx"],
        "java" => &["java"],
        "go" => &["go"],
        "rust" => &["rs"],
        "cpp" => &["cpp", "cc", "cxx", "hpp", "hh", "hxx"],
        "c" => &["c", "h"],
        "ruby" => &["rb"],
        "php" => &["php"],
        "html" => &["html", "htm"],
        "css" => &["css"],
        "json" => &["json"],
        "yaml" => &["yaml", "yml"],
        "md" | "markdown" => &["md", "markdown"],
        "txt" => &["txt"],
        _ => return None,
    };
    Some(exts)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Content,
    FilesWithMatches,
    Count,
}

impl OutputMode {
    fn parse(s: &str) -> Result<Self, ToolError> {
        match s {
            "content" => Ok(Self::Content),
            "files_with_matches" => Ok(Self::FilesWithMatches),
            "count" => Ok(Self::Count),
            other => Err(ToolError::InvalidArgument(format!(
                "Invalid output_mode: {} (expected content, files_with_matches or count)",
                other
            ))),
        }
    }
}

/// Which files under the search root are eligible
struct FileFilter {
    glob: Option<glob::Pattern>,
    glob_matches_name: bool,
    extensions: Option<&'static [&'static str]>,
}

impl FileFilter {
    fn accepts(&self, root: &Path, path: &Path) -> bool {
        if let Some(exts) = self.extensions {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
            if !exts.contains(&ext) {
                return false;
            }
        }
        let Some(pattern) = &self.glob else {
            return true;
        };
        let relative = path.strip_prefix(root).unwrap_or(path);
        if pattern.matches_path(relative) {
            return true;
        }
        self.glob_matches_name && path.file_name().is_some_and(|name| pattern.matches_path(Path::new(name)))
    }
}

/// Matched line numbers and match count for one file
struct LineCollector<'m> {
    matcher: &'m RegexMatcher,
    lines: Vec<u64>,
    matches: usize,
}

impl Sink for LineCollector<'_> {
    type Error = io::Error;

    fn matched(&mut self, _searcher: &Searcher, mat: &SinkMatch<'_>) -> Result<bool, io::Error> {
        let first = mat.line_number().unwrap_or(1);
        let span = mat.lines().count().max(1) as u64;
        self.lines.extend(first..first + span);

        let matcher = self.matcher;
        let mut found = 0;
        matcher
            .find_iter(mat.bytes(), |_| {
                found += 1;
                true
            })
            .map_err(|e| io::Error::other(e.to_string()))?;
        self.matches += found.max(1);
        Ok(true)
    }
}

/// Merge context windows around matched lines into ascending, disjoint blocks
///
/// Blocks are inclusive `(start, end)` pairs clamped to `1..=total_lines`.
/// Overlapping or touching windows collapse into one block.
pub fn context_windows(matched: &[u64], before: u64, after: u64, total_lines: u64) -> Vec<(u64, u64)> {
    let mut lines: Vec<u64> = matched.iter().copied().filter(|&n| n >= 1 && n <= total_lines).collect();
    lines.sort_unstable();
    lines.dedup();

    let mut blocks: Vec<(u64, u64)> = Vec::new();
    for line in lines {
        let start = line.saturating_sub(before).max(1);
        let end = line.saturating_add(after).min(total_lines);
        match blocks.last_mut() {
            Some(last) if start <= last.1 + 1 => last.1 = last.1.max(end),
            _ => blocks.push((start, end)),
        }
    }
    blocks
}

/// Search file contents with a regular expression
pub struct GrepTool;

#[async_trait]
impl Tool for GrepTool {
    fn name(&self) -> &'static str {
        "Grep"
    }

    fn description(&self) -> &'static str {
        "Search file contents with a regular expression. Filter files with glob or type. \
         output_mode: files_with_matches (default) lists files, count gives per-file match counts, \
         content shows matching lines with optional context (-A, -B, -C) and line numbers (-n)."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Regular expression to search for"
                },
                "path": {
                    "type": "string",
                    "description": "File or directory to search (default: current directory)"
                },
                "glob": {
                    "type": "string",
                    "description": "Glob filter for files, e.g. '*.rs' or 'src/**/*.py'"
                },
                "type": {
                    "type": "string",
                    "description": "File type filter: py, js, ts, java, go, rust, cpp, c, ruby, php, html, css, json, yaml, md, txt"
                },
                "output_mode": {
                    "type": "string",
                    "enum": ["content", "files_with_matches", "count"],
                    "description": "Output format (default: files_with_matches)"
                },
                "-i": { "type": "boolean", "description": "Case insensitive search" },
                "multiline": { "type": "boolean", "description": "Let . match newlines and patterns span lines" },
                "-A": { "type": "integer", "description": "Lines of context after each match (content mode)" },
                "-B": { "type": "integer", "description": "Lines of context before each match (content mode)" },
                "-C": { "type": "integer", "description": "Lines of context around each match (content mode)" },
                "-n": { "type": "boolean", "description": "Show line numbers (content mode)" },
                "head_limit": { "type": "integer", "description": "Limit output to the first N entries (0 for no limit)" }
            },
            "required": ["pattern"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let pattern = required_str(input, "pattern")?;
        let mode = OutputMode::parse(optional_str(input, "output_mode")?.unwrap_or("files_with_matches"))?;
        let case_insensitive = optional_bool(input, "-i", false)?;
        let multiline = optional_bool(input, "multiline", false)?;
        let line_numbers = optional_bool(input, "-n", false)?;
        // 0 means no limit
        let head_limit = optional_usize(input, "head_limit")?.filter(|&n| n > 0);
        let (before, after) = match optional_usize(input, "-C")? {
            Some(c) => (c, c),
            None => (
                optional_usize(input, "-B")?.unwrap_or(0),
                optional_usize(input, "-A")?.unwrap_or(0),
            ),
        };

        // Checked up front so the error quotes the pattern as given
        RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .multi_line(multiline)
            .dot_matches_new_line(multiline)
            .build()
            .map_err(|e| ToolError::InvalidRegex(e.to_string()))?;
        let matcher = RegexMatcherBuilder::new()
            .case_insensitive(case_insensitive)
            .multi_line(multiline)
            .dot_matches_new_line(multiline)
            .build(pattern)
            .map_err(|e| ToolError::InvalidRegex(e.to_string()))?;

        let extensions = match optional_str(input, "type")? {
            Some(t) => Some(type_extensions(t).ok_or_else(|| ToolError::InvalidArgument(format!("Unknown file type: {}", t)))?),
            None => None,
        };
        let glob_filter = optional_str(input, "glob")?;
        let filter = FileFilter {
            glob: glob_filter
                .map(glob::Pattern::new)
                .transpose()
                .map_err(|e| ToolError::InvalidGlob(e.to_string()))?,
            glob_matches_name: glob_filter.is_some_and(|g| !g.contains('/')),
            extensions,
        };
        debug!(%pattern, ?mode, case_insensitive, multiline, before, after, "GrepTool::run: called");

        let root = ctx.resolve_path(optional_str(input, "path")?.unwrap_or(".")).await;
        let files = collect_files(&root, &filter)?;
        debug!(root = %root.display(), files = files.len(), "GrepTool::run: files to search");

        let mut searcher = SearcherBuilder::new().line_number(true).multi_line(multiline).build();
        let mut files_searched = 0usize;
        let mut entries: Vec<String> = Vec::new();
        let mut shown_matches: Vec<bool> = Vec::new();

        for path in &files {
            let Ok(bytes) = std::fs::read(path) else {
                debug!(path = %path.display(), "GrepTool::run: unreadable, skipping");
                continue;
            };
            let Ok(text) = std::str::from_utf8(&bytes) else {
                debug!(path = %path.display(), "GrepTool::run: not UTF-8, skipping");
                continue;
            };
            files_searched += 1;

            let mut collector = LineCollector {
                matcher: &matcher,
                lines: Vec::new(),
                matches: 0,
            };
            if let Err(e) = searcher.search_slice(&matcher, text.as_bytes(), &mut collector) {
                debug!(path = %path.display(), %e, "GrepTool::run: search failed, skipping");
                continue;
            }
            if collector.lines.is_empty() {
                continue;
            }

            match mode {
                OutputMode::FilesWithMatches => {
                    entries.push(path.display().to_string());
                    shown_matches.push(true);
                }
                OutputMode::Count => {
                    entries.push(format!("{}:{}", path.display(), collector.matches));
                    shown_matches.push(true);
                }
                OutputMode::Content => {
                    for (line, is_match) in render_content(path, text, &collector.lines, before, after, line_numbers) {
                        entries.push(line);
                        shown_matches.push(is_match);
                    }
                }
            }
        }

        if let Some(limit) = head_limit {
            entries.truncate(limit);
            shown_matches.truncate(limit);
        }

        let matches = match mode {
            OutputMode::Content => shown_matches.iter().filter(|&&m| m).count(),
            OutputMode::FilesWithMatches => entries.len(),
            OutputMode::Count => entries
                .iter()
                .filter_map(|e| e.rsplit_once(':').and_then(|(_, n)| n.parse::<usize>().ok()))
                .sum(),
        };
        let output = if matches == 0 { NO_MATCHES.to_string() } else { entries.join("\n") };
        debug!(matches, files_searched, "GrepTool::run: done");

        Ok(json!({
            "pattern": pattern,
            "output": output,
            "matches": matches,
            "files_searched": files_searched,
        }))
    }
}

/// Candidate files in sorted path order, skipping hidden entries
fn collect_files(root: &Path, filter: &FileFilter) -> Result<Vec<PathBuf>, ToolError> {
    let metadata = std::fs::metadata(root).map_err(|_| ToolError::PathNotFound { path: root.to_path_buf() })?;
    if metadata.is_file() {
        let parent = root.parent().unwrap_or(root);
        return Ok(if filter.accepts(parent, root) { vec![root.to_path_buf()] } else { Vec::new() });
    }

    let is_hidden = |entry: &DirEntry| entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.');
    Ok(WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| filter.accepts(root, p))
        .collect())
}

/// Header plus context blocks for one file; each line is tagged with whether it matched
fn render_content(
    path: &Path,
    text: &str,
    matched: &[u64],
    before: usize,
    after: usize,
    line_numbers: bool,
) -> Vec<(String, bool)> {
    let lines: Vec<&str> = text.lines().collect();
    let blocks = context_windows(matched, before as u64, after as u64, lines.len() as u64);

    let mut out = vec![(path.display().to_string(), false)];
    for (i, (start, end)) in blocks.into_iter().enumerate() {
        if i > 0 {
            out.push(("--".to_string(), false));
        }
        for n in start..=end {
            let is_match = matched.binary_search(&n).is_ok();
            let content = lines[(n - 1) as usize];
            let rendered = match (line_numbers, is_match) {
                (true, true) => format!("{}:{}", n, content),
                (true, false) => format!("{}-{}", n, content),
                (false, _) => content.to_string(),
            };
            out.push((rendered, is_match));
        }
    }
    out
}
