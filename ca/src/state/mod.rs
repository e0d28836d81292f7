//! Session state shared across tool calls

mod system;
mod todo;

pub use system::SystemState;
pub use todo::{Todo, TodoStatus};
