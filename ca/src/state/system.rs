//! SystemState - mutable state shared by every tool call in one agent run

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::todo::{Todo, TodoStatus};
use crate::config::Config;
use crate::shell::ShellSession;
use crate::tools::TIMESTAMP_FORMAT;

/// Per-run state: working directory, call counters, todos and shell sessions
pub struct SystemState {
    current_directory: Mutex<PathBuf>,
    tool_call_counts: Mutex<BTreeMap<String, u64>>,
    todos: Mutex<Vec<Todo>>,
    shell_sessions: Mutex<HashMap<String, Arc<Mutex<ShellSession>>>>,
    shell_program: PathBuf,
    kill_grace: Duration,
    repeat_warning_threshold: u64,
}

impl SystemState {
    pub fn new(current_directory: PathBuf, config: &Config) -> Self {
        debug!(cwd = %current_directory.display(), "SystemState::new: called");
        Self {
            current_directory: Mutex::new(current_directory),
            tool_call_counts: Mutex::new(BTreeMap::new()),
            todos: Mutex::new(Vec::new()),
            shell_sessions: Mutex::new(HashMap::new()),
            shell_program: config.shell.program.clone(),
            kill_grace: Duration::from_millis(config.shell.kill_grace_ms),
            repeat_warning_threshold: config.hint.repeat_warning_threshold,
        }
    }

    /// Count one invocation of `tool` and return its call number (1-based)
    pub async fn record_call(&self, tool: &str) -> u64 {
        let mut counts = self.tool_call_counts.lock().await;
        let count = counts.entry(tool.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub async fn call_count(&self, tool: &str) -> u64 {
        self.tool_call_counts.lock().await.get(tool).copied().unwrap_or(0)
    }

    pub async fn current_directory(&self) -> PathBuf {
        self.current_directory.lock().await.clone()
    }

    pub async fn set_current_directory(&self, dir: impl AsRef<Path>) {
        let dir = dir.as_ref().to_path_buf();
        debug!(cwd = %dir.display(), "SystemState::set_current_directory: called");
        *self.current_directory.lock().await = dir;
    }

    pub async fn todos(&self) -> Vec<Todo> {
        self.todos.lock().await.clone()
    }

    /// Replace the whole todo list
    pub async fn replace_todos(&self, todos: Vec<Todo>) {
        debug!(count = todos.len(), "SystemState::replace_todos: called");
        *self.todos.lock().await = todos;
    }

    /// Session for `id`, created in the current directory on first use
    pub async fn session(&self, id: &str) -> Arc<Mutex<ShellSession>> {
        let mut sessions = self.shell_sessions.lock().await;
        if let Some(session) = sessions.get(id) {
            return session.clone();
        }

        let cwd = self.current_directory().await;
        info!(session = %id, cwd = %cwd.display(), "Creating shell session");
        let session = Arc::new(Mutex::new(ShellSession::new(
            id,
            &self.shell_program,
            cwd,
            self.kill_grace,
        )));
        sessions.insert(id.to_string(), session.clone());
        session
    }

    /// Remove a session from the map, handing it to the caller
    pub async fn remove_session(&self, id: &str) -> Option<Arc<Mutex<ShellSession>>> {
        self.shell_sessions.lock().await.remove(id)
    }

    pub async fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.shell_sessions.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Tear down every live shell; called at the end of a run
    pub async fn shutdown(&self) {
        let sessions: Vec<_> = self.shell_sessions.lock().await.drain().collect();
        info!(count = sessions.len(), "Shutting down shell sessions");
        for (id, session) in sessions {
            debug!(session = %id, "SystemState::shutdown: terminating");
            session.lock().await.terminate().await;
        }
    }

    /// Text block describing the current state, appended to the LLM context each turn
    pub async fn system_hint(&self) -> String {
        let mut parts = vec![
            "# System State".to_string(),
            format!("Current Time: {}", Local::now().format(TIMESTAMP_FORMAT)),
            format!("Working Directory: {}", self.current_directory().await.display()),
            format!("Platform: {} ({})", std::env::consts::OS, std::env::consts::ARCH),
            format!("Runtime: {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            format!("Shell: {}", self.shell_program.display()),
        ];

        let counts = self.tool_call_counts.lock().await.clone();
        if !counts.is_empty() {
            parts.push(String::new());
            parts.push("# Tool Call Statistics".to_string());
            for (tool, count) in &counts {
                parts.push(format!("- {}: {} calls", tool, count));
                if *count >= self.repeat_warning_threshold {
                    parts.push(format!(
                        "  Tool '{}' has been called {} times. Consider alternative approaches.",
                        tool, count
                    ));
                }
            }
        }

        let todos = self.todos().await;
        if !todos.is_empty() {
            parts.push(String::new());
            parts.push("# Current TODO List".to_string());
            parts.extend(todos.iter().map(Todo::hint_line));
        }

        parts.join("\n")
    }

    /// Counts of todos per status: (pending, in_progress, completed)
    pub async fn todo_counts(&self) -> (usize, usize, usize) {
        let todos = self.todos.lock().await;
        let count = |status: TodoStatus| todos.iter().filter(|t| t.status == status).count();
        (
            count(TodoStatus::Pending),
            count(TodoStatus::InProgress),
            count(TodoStatus::Completed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn state(dir: &Path) -> SystemState {
        SystemState::new(dir.to_path_buf(), &Config::default())
    }

    #[tokio::test]
    async fn test_record_call_is_monotonic_per_tool() {
        let temp = tempdir().unwrap();
        let state = state(temp.path());

        assert_eq!(state.record_call("Read").await, 1);
        assert_eq!(state.record_call("Read").await, 2);
        assert_eq!(state.record_call("Bash").await, 1);
        assert_eq!(state.record_call("Read").await, 3);
        assert_eq!(state.call_count("Read").await, 3);
        assert_eq!(state.call_count("Grep").await, 0);
    }

    #[tokio::test]
    async fn test_hint_minimal() {
        let temp = tempdir().unwrap();
        let state = state(temp.path());

        let hint = state.system_hint().await;

        assert!(hint.starts_with("# System State\nCurrent Time: "));
        assert!(hint.contains(&format!("Working Directory: {}", temp.path().display())));
        assert!(hint.contains("Shell: /bin/bash"));
        assert!(!hint.contains("# Tool Call Statistics"));
        assert!(!hint.contains("# Current TODO List"));
    }

    #[tokio::test]
    async fn test_hint_statistics_and_warning() {
        let temp = tempdir().unwrap();
        let state = state(temp.path());
        for _ in 0..3 {
            state.record_call("Grep").await;
        }
        state.record_call("Bash").await;

        let hint = state.system_hint().await;

        let bash = hint.find("- Bash: 1 calls").unwrap();
        let grep = hint.find("- Grep: 3 calls").unwrap();
        assert!(bash < grep);
        assert!(hint.contains("Tool 'Grep' has been called 3 times. Consider alternative approaches."));
        assert!(!hint.contains("Tool 'Bash' has been called"));
    }

    #[tokio::test]
    async fn test_hint_todos() {
        let temp = tempdir().unwrap();
        let state = state(temp.path());
        state
            .replace_todos(vec![
                Todo {
                    id: "1".into(),
                    content: "plan".into(),
                    status: TodoStatus::Completed,
                },
                Todo {
                    id: "2".into(),
                    content: "build".into(),
                    status: TodoStatus::Pending,
                },
            ])
            .await;

        let hint = state.system_hint().await;

        assert!(hint.contains("# Current TODO List\n[x] [1] plan (completed)\n[ ] [2] build (pending)"));
        assert_eq!(state.todo_counts().await, (1, 0, 1));
    }

    #[tokio::test]
    async fn test_sessions_are_reused_and_removed() {
        let temp = tempdir().unwrap();
        let state = state(temp.path());

        let a = state.session("default").await;
        let b = state.session("default").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(state.session_ids().await, vec!["default".to_string()]);

        assert!(state.remove_session("default").await.is_some());
        assert!(state.remove_session("default").await.is_none());
        assert!(state.session_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_new_session_starts_in_current_directory() {
        let temp = tempdir().unwrap();
        let state = state(temp.path());
        let sub = temp.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        state.set_current_directory(&sub).await;

        let session = state.session("other").await;
        assert_eq!(session.lock().await.cwd(), sub.as_path());
        state.shutdown().await;
    }
}
