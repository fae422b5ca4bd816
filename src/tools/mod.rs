//! Agent-callable tools
//!
//! ## Architecture
//!
//! ```text
//! ToolRegistry (one per server)
//!   ├── assistant: save_note, search_notes, manage_todos
//!   ├── support:   search_knowledge_base, create_ticket, check_order, log_conversation
//!   ├── prep:      save_briefing, list_briefings
//!   └── builtin:   Bash, Read (bare names)
//! ```
//!
//! Server tools are exposed to the agent client as `mcp__{server}__{tool}`.

mod assistant;
mod builtin;
mod prep;
mod registry;
mod support;
mod types;

pub use assistant::{assistant_tools, ASSISTANT_SERVER};
pub use builtin::{builtin_tools, BashTool, ReadTool, MAX_OUTPUT_SIZE, MAX_READ_LINES};
pub use prep::{prep_tools, PREP_SERVER};
pub use registry::ToolRegistry;
pub use support::{support_tools, SUPPORT_SERVER};
pub use types::{input_schema, ArgSpec, ContentPart, Tool, ToolCallArgs, ToolDefinition, ToolResult};
