//! Built-in tools available to the agent

mod bash;
mod bash_output;
mod edit_file;
mod exit_plan_mode;
mod glob;
mod grep;
mod kill_bash;
mod list_directory;
mod multi_edit;
mod notebook_edit;
mod read_file;
mod todo;
mod write_file;

pub use bash::BashTool;
pub use bash_output::BashOutputTool;
pub use edit_file::EditFileTool;
pub use exit_plan_mode::ExitPlanModeTool;
pub use glob::GlobTool;
pub use grep::GrepTool;
pub use kill_bash::KillBashTool;
pub use list_directory::ListDirectoryTool;
pub use multi_edit::MultiEditTool;
pub use notebook_edit::NotebookEditTool;
pub use read_file::ReadFileTool;
pub use todo::TodoWriteTool;
pub use write_file::WriteFileTool;
