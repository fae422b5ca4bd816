//! Tool store integration tests
//!
//! Drives the assistant and support tool servers through their registries
//! against stores rooted in a temporary directory.

use a3s_bridge::config::StorageConfig;
use a3s_bridge::store::ToolStore;
use a3s_bridge::tools::{assistant_tools, support_tools, ToolCallArgs, ToolRegistry};
use std::collections::BTreeSet;
use tempfile::TempDir;

async fn stores(dir: &TempDir) -> (StorageConfig, ToolStore) {
    let storage = StorageConfig::rooted_at(dir.path());
    let store = ToolStore::open(&storage).await.unwrap();
    (storage, store)
}

async fn todo(registry: &ToolRegistry, action: &str, item: Option<&str>) -> String {
    let mut args = ToolCallArgs::new().with("action", action);
    if let Some(item) = item {
        args = args.with("item", item);
    }
    registry.execute("manage_todos", &args).await.text_content()
}

// ─── Todos ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_add_then_list_shows_new_item_unchecked_last() {
    let dir = TempDir::new().unwrap();
    let (_, store) = stores(&dir).await;
    let tools = assistant_tools(&store);

    assert_eq!(todo(&tools, "list", None).await, "No to-do items yet!");

    for (n, task) in ["Buy milk", "Call the bank", "Book dentist"].into_iter().enumerate() {
        assert_eq!(todo(&tools, "add", Some(task)).await, format!("Added: {}", task));
        let listing = todo(&tools, "list", None).await;
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), n + 1);
        assert_eq!(*lines.last().unwrap(), format!("  ⬜ {}. {}", n + 1, task));
    }
}

#[tokio::test]
async fn test_complete_touches_only_the_indexed_item() {
    let dir = TempDir::new().unwrap();
    let (_, store) = stores(&dir).await;
    let tools = assistant_tools(&store);
    for task in ["a", "b", "c", "d"] {
        todo(&tools, "add", Some(task)).await;
    }

    assert_eq!(todo(&tools, "complete", Some("3")).await, "Completed: c");

    let items = store.todos.list().await.unwrap();
    let done: Vec<bool> = items.iter().map(|t| t.done).collect();
    assert_eq!(done, vec![false, false, true, false]);
    assert_eq!(
        todo(&tools, "list", None).await,
        "  ⬜ 1. a\n  ⬜ 2. b\n  ✅ 3. c\n  ⬜ 4. d"
    );
}

#[tokio::test]
async fn test_invalid_complete_leaves_storage_unchanged() {
    let dir = TempDir::new().unwrap();
    let (storage, store) = stores(&dir).await;
    let tools = assistant_tools(&store);
    todo(&tools, "add", Some("only")).await;
    let before = tokio::fs::read_to_string(storage.todos_file()).await.unwrap();

    assert_eq!(todo(&tools, "complete", Some("0")).await, "Invalid item number.");
    assert_eq!(todo(&tools, "complete", Some("2")).await, "Invalid item number.");
    assert_eq!(todo(&tools, "complete", Some("first")).await, "Please provide a number.");
    assert_eq!(todo(&tools, "complete", None).await, "Please provide a number.");

    let after = tokio::fs::read_to_string(storage.todos_file()).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_todos_survive_reopen_in_order() {
    let dir = TempDir::new().unwrap();
    let (storage, store) = stores(&dir).await;
    for task in ["one", "two", "three", "four", "five"] {
        store.todos.add(task).await.unwrap();
    }
    store.todos.complete("2").await.unwrap();
    store.todos.complete("5").await.unwrap();
    let written = store.todos.list().await.unwrap();

    let reopened = ToolStore::open(&storage).await.unwrap();
    let read = reopened.todos.list().await.unwrap();
    assert_eq!(read, written);
}

#[tokio::test]
async fn test_complete_by_stable_id() {
    let dir = TempDir::new().unwrap();
    let (_, store) = stores(&dir).await;
    store.todos.add("first").await.unwrap();
    let second = store.todos.add("second").await.unwrap();

    let tools = assistant_tools(&store);
    assert_eq!(todo(&tools, "complete", Some(second.id.as_str())).await, "Completed: second");
}

#[tokio::test]
async fn test_concurrent_writes_keep_every_entry() {
    let dir = TempDir::new().unwrap();
    let (storage, store) = stores(&dir).await;
    let todos = store.todos.clone();
    let log = store.conversations.clone();

    let adds = (0..24).map(|i| {
        let todos = todos.clone();
        async move { todos.add(&format!("parallel {}", i)).await.map(|_| ()) }
    });
    let appends = (0..6).map(|i| {
        let log = log.clone();
        async move {
            log.append(&format!("chat {}", i), None, None)
                .await
                .map(|_| ())
        }
    });
    let (added, appended) = tokio::join!(
        futures::future::join_all(adds),
        futures::future::join_all(appends)
    );
    assert!(added.iter().chain(appended.iter()).all(|r| r.is_ok()));

    let raw = tokio::fs::read_to_string(storage.todos_file()).await.unwrap();
    let items: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(items.len(), 24);

    let raw = tokio::fs::read_to_string(storage.conversation_log())
        .await
        .unwrap();
    let entries: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(entries.len(), 6);
    assert!(entries.iter().all(|e| e["resolved"] == "yes"));
}

// ─── Knowledge base ──────────────────────────────────────────────

async fn seed_kb(storage: &StorageConfig) {
    let kb = &storage.knowledge_base_dir;
    tokio::fs::create_dir_all(kb).await.unwrap();
    tokio::fs::write(
        kb.join("shipping.md"),
        "# Shipping\n\nStandard delivery takes 3-5 working days.\nFree shipping over £50.\n",
    )
    .await
    .unwrap();
    tokio::fs::write(
        kb.join("returns.md"),
        "# Returns\n\nYou can return any item within 30 days.\nRefunds take 5 days.\n",
    )
    .await
    .unwrap();
    tokio::fs::write(
        kb.join("account.md"),
        "# Account\n\nReset your password from the login page.\n",
    )
    .await
    .unwrap();
}

async fn kb_search(tools: &ToolRegistry, query: &str) -> String {
    tools
        .execute("search_knowledge_base", &ToolCallArgs::new().with("query", query))
        .await
        .text_content()
}

fn matched_docs(reply: &str) -> BTreeSet<String> {
    reply
        .split("\n\n---\n\n")
        .filter_map(|part| part.lines().next())
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_kb_search_is_order_independent() {
    let dir = TempDir::new().unwrap();
    let (storage, store) = stores(&dir).await;
    seed_kb(&storage).await;
    let tools = support_tools(&store);

    let forward = kb_search(&tools, "return shipping").await;
    let backward = kb_search(&tools, "shipping return").await;
    assert_eq!(matched_docs(&forward), matched_docs(&backward));
    assert_eq!(
        matched_docs(&forward),
        ["**returns**", "**shipping**"]
            .iter()
            .map(|s| s.to_string())
            .collect::<BTreeSet<_>>()
    );

    let password = kb_search(&tools, "PASSWORD").await;
    assert!(password.starts_with("**account**\n"));
    assert!(password.contains("Reset your password"));
}

#[tokio::test]
async fn test_kb_no_match_suggests_escalation() {
    let dir = TempDir::new().unwrap();
    let (storage, store) = stores(&dir).await;
    seed_kb(&storage).await;

    let reply = kb_search(&support_tools(&store), "cryptocurrency").await;
    assert_eq!(
        reply,
        "No relevant information found in knowledge base. This may need to be escalated to a human agent."
    );
}

// ─── Tickets & orders ────────────────────────────────────────────

#[tokio::test]
async fn test_ticket_ids_and_status() {
    let dir = TempDir::new().unwrap();
    let (storage, store) = stores(&dir).await;
    let tools = support_tools(&store);

    let args = ToolCallArgs::new()
        .with("customer_name", "Ada")
        .with("issue_summary", "Refund of £80 disputed");
    let reply = tools.execute("create_ticket", &args).await.text_content();
    assert!(reply.starts_with("Ticket created successfully!"));

    let id = reply
        .lines()
        .find_map(|l| l.trim().strip_prefix("Ticket ID: "))
        .unwrap()
        .to_string();
    assert!(id.starts_with("TKT-"));
    assert_eq!(id.len(), 4 + 14);
    assert!(id[4..].chars().all(|c| c.is_ascii_digit()));

    let ticket = store.tickets.get(&id).await.unwrap();
    assert_eq!(ticket.status, "open");
    assert_eq!(ticket.priority, "medium");
    assert_eq!(ticket.category, "general");

    let on_disk: serde_json::Value = serde_json::from_str(
        &tokio::fs::read_to_string(storage.tickets_dir().join(format!("{}.json", id)))
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(on_disk["ticket_id"], id.as_str());
    assert_eq!(on_disk["status"], "open");
}

#[tokio::test]
async fn test_check_order_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    let (_, store) = stores(&dir).await;
    let tools = support_tools(&store);

    let reply = tools
        .execute("check_order", &ToolCallArgs::new().with("order_number", "ord-002"))
        .await
        .text_content();
    assert!(reply.contains("In Transit"));
    assert!(reply.contains("RM87654321GB"));

    let missing = tools
        .execute("check_order", &ToolCallArgs::new().with("order_number", "ORD-999"))
        .await
        .text_content();
    assert_eq!(
        missing,
        "Order ORD-999 not found. Please check the order number and try again."
    );
}
