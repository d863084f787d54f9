pub mod args;
pub mod definitions;
pub mod dispatcher;

pub use args::{decode_arguments, DecodeError, SqlArguments};
pub use definitions::{format_tools_for_llm, EXECUTE_SQL_TOOL};
pub use dispatcher::{ToolDispatcher, ToolExecution, ToolResult};
