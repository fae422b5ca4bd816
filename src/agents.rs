//! Agent presets
//!
//! Each preset pairs an immutable [`AgentSessionConfig`] with the persona
//! the terminal bridge renders. Configs are built once per catalog and
//! shared by every session opened on them.

use crate::config::StorageConfig;
use crate::hooks::{HookPoint, SafetyGate, ShellDisabled};
use crate::session::{AgentSessionConfig, PermissionMode, SubagentDefinition, DELEGATE_TOOL};
use crate::store::ToolStore;
use crate::tools::{assistant_tools, builtin_tools, prep_tools, support_tools};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Model alias every preset runs on
pub const PRESET_MODEL: &str = "haiku";

/// Agent ids served over the socket bridge
pub const WEB_AGENTS: &[&str] = &["customer_support", "meeting_prep", "retail_analyzer"];

/// Default agent for the terminal bridge
pub const DEFAULT_CHAT_AGENT: &str = "research_assistant";

/// Terminal presentation of an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    /// Lines printed between the `=` rules when the loop starts
    pub banner: Vec<String>,
    /// Lines printed after the banner (sample questions and hints)
    pub hints: Vec<String>,
    pub prompt_label: String,
    /// Prefix for assistant text
    pub glyph: String,
    pub farewell: String,
    /// Print a notice when a turn ends on a rate limit
    pub rate_limit_notice: bool,
}

impl Persona {
    pub fn new(glyph: &str, prompt_label: &str, farewell: &str) -> Self {
        Self {
            banner: Vec::new(),
            hints: Vec::new(),
            prompt_label: prompt_label.to_string(),
            glyph: glyph.to_string(),
            farewell: farewell.to_string(),
            rate_limit_notice: false,
        }
    }

    pub fn banner(mut self, lines: &[&str]) -> Self {
        self.banner = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn hints(mut self, lines: &[&str]) -> Self {
        self.hints = lines.iter().map(|l| l.to_string()).collect();
        self
    }
}

/// A named agent: its session config and terminal persona
#[derive(Debug, Clone)]
pub struct AgentPreset {
    pub id: String,
    pub config: Arc<AgentSessionConfig>,
    pub persona: Persona,
}

/// Agent id -> preset
#[derive(Debug, Clone, Default)]
pub struct AgentCatalog {
    agents: BTreeMap<String, AgentPreset>,
}

impl AgentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every preset
    pub fn standard(store: &ToolStore, storage: &StorageConfig) -> Self {
        let workdir = PathBuf::from(".");
        let mut catalog = Self::new();
        catalog
            .insert(assistant(store, &workdir))
            .insert(research_assistant(store, &workdir))
            .insert(customer_support(store, &workdir))
            .insert(meeting_prep(store, &workdir))
            .insert(retail_analyzer(&storage.sample_data_dir, &workdir));
        catalog
    }

    /// The presets exposed over the socket bridge
    pub fn web(store: &ToolStore, storage: &StorageConfig) -> Self {
        let mut standard = Self::standard(store, storage);
        standard.agents.retain(|id, _| WEB_AGENTS.contains(&id.as_str()));
        standard
    }

    pub fn insert(&mut self, preset: AgentPreset) -> &mut Self {
        self.agents.insert(preset.id.clone(), preset);
        self
    }

    pub fn get(&self, id: &str) -> Option<&AgentPreset> {
        self.agents.get(id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.agents.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

const FILE_TOOLS: &[&str] = &["Read", "Write", "Edit", "Bash", "Glob", "Grep"];
const WEB_TOOLS: &[&str] = &["WebSearch", "WebFetch"];

const ASSISTANT_PROMPT: &str = "You are a personal assistant with access to custom tools:

CUSTOM TOOLS (use these when relevant):
- save_note: Save notes with titles, content, and tags
- search_notes: Search through saved notes by keyword
- manage_todos: Manage a to-do list (add / complete / list)

BUILT-IN TOOLS:
- Read: Read files
- Bash: Run shell commands

GUIDELINES:
- Be concise and action-oriented
- Use custom tools for note and to-do management
- Use built-in tools for file reads and commands
- Format output for terminal readability
";

/// Notes and todos plus the built-in shell and file tools
pub fn assistant(store: &ToolStore, workdir: &Path) -> AgentPreset {
    let config = AgentSessionConfig::builder()
        .system_prompt(ASSISTANT_PROMPT)
        .model(PRESET_MODEL)
        .allow_tools(FILE_TOOLS.iter().chain(WEB_TOOLS).copied())
        .mcp_server_allowed(assistant_tools(store))
        .mcp_server(builtin_tools(workdir))
        .permission_mode(PermissionMode::AcceptEdits)
        .build();

    AgentPreset {
        id: "assistant".to_string(),
        config: Arc::new(config),
        persona: Persona::new("🤖", "📝 You: ", "👋 Goodbye!").banner(&[
            "🤖 Personal Assistant (with custom tools)",
            "Commands: type naturally, 'quit' to exit",
        ]),
    }
}

const RESEARCH_PROMPT: &str = "You are a personal assistant with three specialist subagents:

1. **researcher**: for deep research and summaries
2. **writer**: for drafting documents, emails, and content
3. **analyst**: for data analysis, code, and technical tasks

You also have direct access to:
- Note management (save_note, search_notes)
- To-do list (manage_todos)
- File reads and shell commands

GUIDELINES:
- For complex research, delegate to the researcher subagent
- For polished writing tasks, delegate to the writer subagent
- For technical/data tasks, delegate to the analyst subagent
- Handle simple requests (notes, todos, quick lookups) yourself
- After a subagent returns results, offer to save them as a note
";

fn subagents() -> [(&'static str, SubagentDefinition); 3] {
    [
        (
            "researcher",
            SubagentDefinition::new(
                "Deep research specialist. Use when the user wants in-depth research \
                 on a topic, comparison of multiple sources, or comprehensive summaries.",
                "You are a research specialist. When given a topic:\n\
                 1. Search for multiple authoritative sources\n\
                 2. Read and analyze the most relevant material\n\
                 3. Synthesize findings into a clear, structured summary\n\
                 4. Include key facts, dates, and data points\n\
                 5. Note any conflicting information between sources\n\
                 Be thorough but concise. Cite your sources.",
            )
            .with_tools(["WebSearch", "WebFetch", "Read", "Glob"]),
        ),
        (
            "writer",
            SubagentDefinition::new(
                "Writing specialist. Use for drafting emails, documents, blog posts, \
                 reports, or any creative/professional writing task.",
                "You are a skilled writer. When given a writing task:\n\
                 1. Understand the audience and purpose\n\
                 2. Create well-structured, polished content\n\
                 3. Use appropriate tone (formal, casual, technical, etc.)\n\
                 4. Save the output as a file when appropriate\n\
                 Be creative yet professional.",
            )
            .with_tools(["Read", "Write", "Edit", "Glob"]),
        ),
        (
            "analyst",
            SubagentDefinition::new(
                "Data and code analyst. Use for analyzing files, processing data, \
                 running calculations, debugging code, or technical tasks.",
                "You are a data and code analyst. You can:\n\
                 1. Read and analyze any file type\n\
                 2. Run shell commands for data processing\n\
                 3. Write and execute scripts\n\
                 4. Debug and fix code\n\
                 Be precise and show your work.",
            )
            .with_tools(["Read", "Write", "Edit", "Bash", "Glob", "Grep"]),
        ),
    ]
}

/// Assistant tools, three delegate-able specialists and the shell safety gate
pub fn research_assistant(store: &ToolStore, workdir: &Path) -> AgentPreset {
    let mut builder = AgentSessionConfig::builder()
        .system_prompt(RESEARCH_PROMPT)
        .model(PRESET_MODEL)
        .allow_tools(FILE_TOOLS.iter().chain(WEB_TOOLS).copied())
        .allow_tools([DELEGATE_TOOL])
        .mcp_server_allowed(assistant_tools(store))
        .mcp_server(builtin_tools(workdir))
        .permission_mode(PermissionMode::AcceptEdits)
        .hook(HookPoint::PreToolUse, SafetyGate::new());
    for (name, definition) in subagents() {
        builder = builder.agent(name, definition);
    }

    AgentPreset {
        id: "research_assistant".to_string(),
        config: Arc::new(builder.build()),
        persona: Persona::new("🤖", "📝 You: ", "👋 Goodbye!").banner(&[
            "🤖 Personal Assistant (with subagents)",
            "Specialists: researcher, writer, analyst",
            "Type 'quit' to exit",
        ]),
    }
}

const SUPPORT_PROMPT: &str = "You are a friendly, professional customer support agent for an online retail store.

YOUR TOOLS:
- search_knowledge_base: ALWAYS search this first before answering ANY question about policies, products, shipping, returns, or accounts. Search with simple keywords like \"shipping\", \"return\", \"password\", \"warranty\", etc.
- check_order: Look up order status when a customer asks about their order
- create_ticket: Escalate to a human agent when you cannot resolve the issue
- log_conversation: Log a summary when the conversation ends

CRITICAL RULES:
1. NEVER say \"I don't have that information\" without searching the knowledge base first
2. Always search with SHORT keywords, not long sentences. Example: search \"shipping\" not \"do you offer free shipping options\"
3. If one search doesn't find results, try different keywords
4. Give specific, accurate answers based ONLY on the knowledge base; never guess or make up policies
5. Be empathetic with frustrated customers
6. Offer additional help before ending the conversation
7. When a customer says goodbye, log the conversation summary

ESCALATION RULES (create a ticket):
- Billing disputes or refund issues over £50
- Account security concerns
- Technical issues you cannot troubleshoot
- Complaints requesting a manager
- Any issue not covered in the knowledge base after multiple searches

SAMPLE ORDER NUMBERS FOR TESTING: ORD-001, ORD-002, ORD-003
";

/// Knowledge base, orders, tickets and conversation log; no shell
pub fn customer_support(store: &ToolStore, workdir: &Path) -> AgentPreset {
    let config = AgentSessionConfig::builder()
        .system_prompt(SUPPORT_PROMPT)
        .model(PRESET_MODEL)
        .allow_tools(["Read", "Glob", "Grep"])
        .mcp_server_allowed(support_tools(store))
        .mcp_server(builtin_tools(workdir))
        .permission_mode(PermissionMode::AcceptEdits)
        .hook(HookPoint::PreToolUse, ShellDisabled::for_support_agent())
        .build();

    AgentPreset {
        id: "customer_support".to_string(),
        config: Arc::new(config),
        persona: Persona::new("💬", "🧑 Customer: ", "👋 Thank you for contacting us!")
            .banner(&[
                "🏪 Customer Support Agent",
                "Powered by Claude AI",
                "Type 'quit' to exit",
            ])
            .hints(&[
                "Test orders: ORD-001, ORD-002, ORD-003",
                "Ask about: returns, shipping, account help, products",
            ]),
    }
}

const MEETING_PREP_PROMPT: &str = "You are a meeting preparation assistant. Research companies and generate briefing documents.

When asked to prepare a briefing:
1. Gather what you know about the company (use SHORT search queries like \"Spotify company overview 2026\" when search is available)
2. Consider recent news and the leadership team
3. Generate a structured briefing with: Company Overview, Key People, Recent News, Products, Financials, Competitors, Talking Points, Questions to Ask
4. Save the briefing using save_briefing
5. Use list_briefings when asked about past briefings

IMPORTANT:
- Use SHORT search queries (2-4 words), not long sentences
- Do only 1 search maximum, then write the briefing combining search results with your existing knowledge
- Be thorough but concise; briefings should be a 2-minute read
- If search is slow or unavailable, use your existing knowledge and note what may need verification
";

/// Briefing save/list tools
pub fn meeting_prep(store: &ToolStore, workdir: &Path) -> AgentPreset {
    let config = AgentSessionConfig::builder()
        .system_prompt(MEETING_PREP_PROMPT)
        .model(PRESET_MODEL)
        .allow_tools(["Read", "Glob", "Grep", "Write"].iter().chain(WEB_TOOLS).copied())
        .mcp_server_allowed(prep_tools(store))
        .mcp_server(builtin_tools(workdir))
        .permission_mode(PermissionMode::AcceptEdits)
        .build();

    let mut persona = Persona::new("📋", "👤 You: ", "👋 Good luck in your meeting!")
        .banner(&["📋 Meeting Prep Assistant", "Powered by Claude AI", "Type 'quit' to exit"])
        .hints(&[
            "Examples:",
            "• Prepare a briefing for a meeting with Stripe",
            "• Research Anthropic, I'm meeting their sales team",
            "• Show my past briefings",
        ]);
    persona.rate_limit_notice = true;

    AgentPreset {
        id: "meeting_prep".to_string(),
        config: Arc::new(config),
        persona,
    }
}

fn retail_prompt(data_dir: &Path) -> String {
    let dir = data_dir.display();
    format!(
        "You are a retail business data analyst.

DATA FILES (use these exact paths with Bash + Python):
- {dir}/sales_2026.csv: Sales transactions (date, product, category, quantity, unit_price, total, customer_type, payment_method)
- {dir}/inventory.csv: Stock levels (product, category, in_stock, reorder_level, cost_price, retail_price, supplier)
- {dir}/customers.csv: Customer data (name, type, total_spent, orders_count, loyalty_points, city)

HOW TO ANALYZE:
- ALWAYS use Bash to run Python pandas commands to read and analyze data
- Do everything in a single python3 -c command, for example:
  python3 -c \"import pandas as pd; df = pd.read_csv('{dir}/sales_2026.csv'); print('Total Revenue: £' + str(round(df['total'].sum(), 2)))\"
- NEVER just read the file; always calculate with pandas
- Give specific numbers, percentages, and rankings
- Flag problems (low stock items where in_stock < reorder_level)
- Compare metrics when possible
- Suggest actionable business decisions
- Keep responses concise and focused on insights
"
    )
}

/// Shell-driven analysis over the sample CSV files
pub fn retail_analyzer(sample_data_dir: &Path, workdir: &Path) -> AgentPreset {
    let config = AgentSessionConfig::builder()
        .system_prompt(retail_prompt(sample_data_dir))
        .model(PRESET_MODEL)
        .allow_tools(["Read", "Bash", "Glob", "Grep", "Write"])
        .mcp_server(builtin_tools(workdir))
        .permission_mode(PermissionMode::AcceptEdits)
        .build();

    AgentPreset {
        id: "retail_analyzer".to_string(),
        config: Arc::new(config),
        persona: Persona::new("📊", "👤 You: ", "👋 Goodbye!")
            .banner(&["📊 Retail Data Analyzer", "Powered by Claude AI", "Type 'quit' to exit"])
            .hints(&[
                "Try asking:",
                "• What's my total revenue this year?",
                "• Which products are low on stock?",
                "• Who are my top 3 customers?",
                "• Show me sales breakdown by category",
                "• What are my profit margins per product?",
            ]),
    }
}
