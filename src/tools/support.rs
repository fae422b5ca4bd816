//! Customer-support tools: knowledge base, tickets, orders, conversation log

use super::types::{ArgSpec, Tool, ToolCallArgs, ToolResult};
use super::ToolRegistry;
use crate::error::Result;
use crate::store::{ConversationLog, KnowledgeBase, NewTicket, OrderBook, TicketStore, ToolStore};
use async_trait::async_trait;
use std::sync::Arc;

/// Server name for the support tool set
pub const SUPPORT_SERVER: &str = "support";

/// `support` registry: search_knowledge_base, create_ticket, check_order, log_conversation
pub fn support_tools(store: &ToolStore) -> ToolRegistry {
    ToolRegistry::new(SUPPORT_SERVER)
        .with_tool(Arc::new(SearchKnowledgeBaseTool {
            knowledge: store.knowledge.clone(),
        }))
        .with_tool(Arc::new(CreateTicketTool {
            tickets: store.tickets.clone(),
        }))
        .with_tool(Arc::new(CheckOrderTool {
            orders: store.orders.clone(),
        }))
        .with_tool(Arc::new(LogConversationTool {
            log: store.conversations.clone(),
        }))
}

pub struct SearchKnowledgeBaseTool {
    knowledge: Arc<KnowledgeBase>,
}

#[async_trait]
impl Tool for SearchKnowledgeBaseTool {
    fn name(&self) -> &str {
        "search_knowledge_base"
    }

    fn description(&self) -> &str {
        "Search the company knowledge base for answers to customer questions"
    }

    fn args(&self) -> Vec<ArgSpec> {
        vec![ArgSpec::required("query", "Short keywords, e.g. \"shipping\"")]
    }

    async fn call(&self, args: &ToolCallArgs) -> Result<ToolResult> {
        let answer = self.knowledge.answer(args.require("query")?).await?;
        Ok(ToolResult::text(answer))
    }
}

pub struct CreateTicketTool {
    tickets: Arc<TicketStore>,
}

#[async_trait]
impl Tool for CreateTicketTool {
    fn name(&self) -> &str {
        "create_ticket"
    }

    fn description(&self) -> &str {
        "Create a support ticket when issue cannot be resolved automatically"
    }

    fn args(&self) -> Vec<ArgSpec> {
        vec![
            ArgSpec::required("customer_name", "Customer's name"),
            ArgSpec::required("issue_summary", "One-paragraph summary of the issue"),
            ArgSpec::optional("priority", "low, medium or high (default medium)"),
            ArgSpec::optional("category", "Issue category (default general)"),
        ]
    }

    async fn call(&self, args: &ToolCallArgs) -> Result<ToolResult> {
        let ticket = self
            .tickets
            .create(NewTicket {
                customer_name: args.require("customer_name")?.to_string(),
                issue_summary: args.require("issue_summary")?.to_string(),
                priority: args.get("priority").map(str::to_string),
                category: args.get("category").map(str::to_string),
            })
            .await?;

        Ok(ToolResult::text(format!(
            "Ticket created successfully!\n  Ticket ID: {}\n  Priority: {}\n  Category: {}\nA human agent will follow up within 24 hours.",
            ticket.ticket_id, ticket.priority, ticket.category
        )))
    }
}

pub struct CheckOrderTool {
    orders: Arc<OrderBook>,
}

#[async_trait]
impl Tool for CheckOrderTool {
    fn name(&self) -> &str {
        "check_order"
    }

    fn description(&self) -> &str {
        "Look up an order by order number"
    }

    fn args(&self) -> Vec<ArgSpec> {
        vec![ArgSpec::required("order_number", "Order number, e.g. ORD-001")]
    }

    async fn call(&self, args: &ToolCallArgs) -> Result<ToolResult> {
        let number = args.require("order_number")?;
        let Some(order) = self.orders.lookup(number) else {
            return Ok(ToolResult::text(format!(
                "Order {} not found. Please check the order number and try again.",
                number
            )));
        };

        Ok(ToolResult::text(format!(
            "Order: {}\n  Status: {}\n  Items: {}\n  Order Date: {}\n  Tracking: {}",
            order.number, order.status, order.items, order.date, order.tracking
        )))
    }
}

pub struct LogConversationTool {
    log: Arc<ConversationLog>,
}

#[async_trait]
impl Tool for LogConversationTool {
    fn name(&self) -> &str {
        "log_conversation"
    }

    fn description(&self) -> &str {
        "Log the conversation summary for quality and training purposes"
    }

    fn args(&self) -> Vec<ArgSpec> {
        vec![
            ArgSpec::required("summary", "What the customer needed and the outcome"),
            ArgSpec::optional("resolved", "yes or no (default yes)"),
            ArgSpec::optional("category", "Conversation category (default general)"),
        ]
    }

    async fn call(&self, args: &ToolCallArgs) -> Result<ToolResult> {
        self.log
            .append(
                args.require("summary")?,
                args.get("resolved"),
                args.get("category"),
            )
            .await?;
        Ok(ToolResult::text("Conversation logged."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;

    async fn setup() -> (tempfile::TempDir, ToolStore, ToolRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::rooted_at(dir.path());
        std::fs::create_dir_all(&config.knowledge_base_dir).unwrap();
        std::fs::write(
            config.knowledge_base_dir.join("returns.md"),
            "# Returns\nItems can be returned within 30 days.",
        )
        .unwrap();
        let store = ToolStore::open(&config).await.unwrap();
        let reg = support_tools(&store);
        (dir, store, reg)
    }

    #[tokio::test]
    async fn test_check_order() {
        let (_dir, _store, reg) = setup().await;
        let found = reg
            .execute("check_order", &ToolCallArgs::new().with("order_number", "ord-001"))
            .await
            .text_content();
        assert_eq!(
            found,
            "Order: ORD-001\n  Status: Delivered\n  Items: Blue Jacket (M)\n  Order Date: 2026-02-20\n  Tracking: RM12345678GB"
        );

        let missing = reg
            .execute("check_order", &ToolCallArgs::new().with("order_number", "ord-404"))
            .await
            .text_content();
        assert_eq!(
            missing,
            "Order ord-404 not found. Please check the order number and try again."
        );
    }

    #[tokio::test]
    async fn test_create_ticket_reply() {
        let (_dir, store, reg) = setup().await;
        let reply = reg
            .execute(
                "create_ticket",
                &ToolCallArgs::new()
                    .with("customer_name", "Dana")
                    .with("issue_summary", "Charged twice")
                    .with("priority", "high"),
            )
            .await
            .text_content();

        assert!(reply.starts_with("Ticket created successfully!\n  Ticket ID: TKT-"));
        assert!(reply.contains("\n  Priority: high\n  Category: general\n"));
        assert!(reply.ends_with("A human agent will follow up within 24 hours."));

        let id = reply.lines().nth(1).unwrap().trim_start_matches("  Ticket ID: ");
        let ticket = store.tickets.get(id).await.unwrap();
        assert_eq!(ticket.customer_name, "Dana");
        assert_eq!(ticket.status, "open");
    }

    #[tokio::test]
    async fn test_knowledge_base_and_log() {
        let (_dir, store, reg) = setup().await;
        let answer = reg
            .execute(
                "search_knowledge_base",
                &ToolCallArgs::new().with("query", "return policy"),
            )
            .await
            .text_content();
        assert!(answer.starts_with("**returns**\n"));

        let logged = reg
            .execute(
                "log_conversation",
                &ToolCallArgs::new().with("summary", "Explained returns"),
            )
            .await
            .text_content();
        assert_eq!(logged, "Conversation logged.");
        assert_eq!(store.conversations.entries().await.unwrap().len(), 1);
    }
}
