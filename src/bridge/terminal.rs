//! Terminal bridge
//!
//! Line-oriented chat loop over any async reader/writer pair.

use crate::agents::Persona;
use crate::error::Result;
use crate::session::{AgentSession, ResultSubtype, SessionEvent};
use futures::StreamExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_stream::wrappers::LinesStream;

/// Inputs that end the loop, compared case-insensitively
pub const QUIT_TOKENS: &[&str] = &["quit", "exit", "q"];

const RULE_WIDTH: usize = 50;

pub fn is_quit(input: &str) -> bool {
    let input = input.trim();
    QUIT_TOKENS.iter().any(|t| input.eq_ignore_ascii_case(t))
}

/// Terminal rendering of one session
pub struct TerminalBridge<'a, W> {
    persona: &'a Persona,
    out: W,
}

impl<'a, W> TerminalBridge<'a, W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(persona: &'a Persona, out: W) -> Self {
        Self { persona, out }
    }

    /// Run the loop until a quit token or end of input
    pub async fn run<R>(&mut self, session: &mut AgentSession, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin + Send,
    {
        self.banner().await?;
        let mut lines = LinesStream::new(input.lines());

        loop {
            self.write(&format!("\n{}", self.persona.prompt_label)).await?;
            let Some(line) = lines.next().await else {
                self.write("\n").await?;
                break;
            };
            let line = line?;
            let turn = line.trim();

            if is_quit(turn) {
                self.write(&format!("{}\n", self.persona.farewell)).await?;
                break;
            }
            if turn.is_empty() {
                continue;
            }

            session.send(turn).await?;
            self.render_turn(session).await?;
        }

        tracing::debug!(session_id = %session.id(), "Terminal loop ended");
        Ok(())
    }

    async fn banner(&mut self) -> Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        let mut text = format!("{}\n", rule);
        for line in &self.persona.banner {
            text.push_str(&format!("  {}\n", line));
        }
        text.push_str(&format!("{}\n", rule));
        if !self.persona.hints.is_empty() {
            text.push('\n');
            for hint in &self.persona.hints {
                text.push_str(&format!("  {}\n", hint));
            }
        }
        self.write(&text).await
    }

    async fn render_turn(&mut self, session: &mut AgentSession) -> Result<()> {
        let mut said_something = false;
        let events = session.events();
        futures::pin_mut!(events);

        while let Some(event) = events.next().await {
            let text = match event {
                Ok(SessionEvent::Assistant { text }) => {
                    said_something = true;
                    format!("\n{} {}\n", self.persona.glyph, text)
                }
                Ok(SessionEvent::ToolUse { name, .. }) => format!("  🔧 {}\n", name),
                Ok(SessionEvent::Delegate { agent }) => {
                    format!("\n  🧠 Delegating to: {}\n", agent)
                }
                Ok(SessionEvent::Result {
                    subtype: ResultSubtype::Error,
                    error,
                }) => format!("\n❌ Error: {}\n", error.unwrap_or_default()),
                Ok(SessionEvent::Result {
                    subtype: ResultSubtype::RateLimited,
                    ..
                }) if self.persona.rate_limit_notice => {
                    if said_something {
                        "\n⚠️  Rate limit reached, but response was captured above.\n".to_string()
                    } else {
                        "\n⚠️  Rate limit reached. Wait 60 seconds and try again.\n".to_string()
                    }
                }
                Ok(SessionEvent::Result { .. }) => continue,
                Err(e) => format!("\n❌ Error: {}\n", e),
            };
            self.write(&text).await?;
        }
        Ok(())
    }

    async fn write(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ScriptStep, ScriptedClient};
    use crate::session::AgentSessionConfig;
    use serde_json::json;
    use std::sync::Arc;

    fn persona() -> Persona {
        Persona {
            banner: vec!["🤖 Test Assistant".into()],
            hints: vec![],
            prompt_label: "📝 You: ".into(),
            glyph: "🤖".into(),
            farewell: "👋 Goodbye!".into(),
            rate_limit_notice: true,
        }
    }

    async fn run(client: &ScriptedClient, input: &str) -> String {
        let config = Arc::new(AgentSessionConfig::builder().model("haiku").build());
        let mut session = AgentSession::open(client, config).await.unwrap();
        let persona = persona();
        let mut out = Vec::new();
        TerminalBridge::new(&persona, &mut out)
            .run(&mut session, input.as_bytes())
            .await
            .unwrap();
        session.close().await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_quit_tokens() {
        assert!(is_quit("quit"));
        assert!(is_quit("EXIT"));
        assert!(is_quit(" Q "));
        assert!(!is_quit("quitting"));
        assert!(!is_quit(""));
    }

    #[tokio::test]
    async fn test_blank_lines_skipped_and_quit_prints_farewell() {
        let client = ScriptedClient::echo();
        let output = run(&client, "\n   \nhello\nQuit\nnever sent\n").await;

        assert_eq!(client.prompts().await, vec!["hello".to_string()]);
        assert!(output.starts_with(&"=".repeat(RULE_WIDTH)));
        assert!(output.contains("  🤖 Test Assistant\n"));
        assert!(output.contains("\n🤖 You said: hello\n"));
        assert!(output.ends_with("👋 Goodbye!\n"));
    }

    #[tokio::test]
    async fn test_renders_tools_delegation_and_errors() {
        let client = ScriptedClient::new();
        client
            .push_turn(vec![
                ScriptStep::tool_call("Bash", json!({"command": "ls"})),
                ScriptStep::tool_call("Task", json!({"subagent_type": "writer"})),
                ScriptStep::Message(crate::session::ClientMessage::error("overloaded")),
            ])
            .await;
        client.push_turn(vec![ScriptStep::Fault("socket closed".into())]).await;

        let output = run(&client, "first\nsecond\n").await;
        assert!(output.contains("  🔧 Bash\n"));
        assert!(output.contains("\n  🧠 Delegating to: writer\n"));
        assert!(output.contains("\n❌ Error: overloaded\n"));
        assert!(output.contains("\n❌ Error: Agent client error: socket closed\n"));
        assert_eq!(client.prompts().await.len(), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_notice() {
        let client = ScriptedClient::new();
        client
            .push_turn(vec![ScriptStep::text("Partial briefing"), ScriptStep::RateLimit])
            .await;
        client.push_turn(vec![ScriptStep::RateLimit]).await;

        let output = run(&client, "one\ntwo\n").await;
        assert!(output.contains("Rate limit reached, but response was captured above."));
        assert!(output.contains("Rate limit reached. Wait 60 seconds and try again."));
        assert!(!output.contains("❌"));
    }
}
