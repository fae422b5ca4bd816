//! Local stand-ins for the agent client's built-in `Bash` and `Read` tools
//!
//! These are addressed by bare name and are what the safety hooks gate.

use super::types::{ArgSpec, Tool, ToolCallArgs, ToolResult};
use super::ToolRegistry;
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

/// Maximum output size in bytes before truncation
pub const MAX_OUTPUT_SIZE: usize = 100 * 1024;

/// Maximum lines returned by `Read`
pub const MAX_READ_LINES: usize = 2000;

/// Default shell timeout
const DEFAULT_BASH_TIMEOUT: Duration = Duration::from_secs(120);

/// Built-in registry with `Bash` and `Read`, running in `workdir`
pub fn builtin_tools(workdir: impl Into<PathBuf>) -> ToolRegistry {
    let workdir = workdir.into();
    ToolRegistry::builtin()
        .with_tool(Arc::new(BashTool::new(workdir.clone())))
        .with_tool(Arc::new(ReadTool::new(workdir)))
}

pub struct BashTool {
    workdir: PathBuf,
    timeout: Duration,
}

impl BashTool {
    pub fn new(workdir: PathBuf) -> Self {
        Self {
            workdir,
            timeout: DEFAULT_BASH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Tool for BashTool {
    fn name(&self) -> &str {
        "Bash"
    }

    fn description(&self) -> &str {
        "Run a shell command and return its combined output"
    }

    fn args(&self) -> Vec<ArgSpec> {
        vec![ArgSpec::required("command", "Command line passed to sh -c")]
    }

    async fn call(&self, args: &ToolCallArgs) -> Result<ToolResult> {
        let command = args.require("command")?;
        tracing::debug!(command = %command, "Running shell command");

        let child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                return Ok(ToolResult::error(format!(
                    "[Command timed out after {}s]",
                    self.timeout.as_secs()
                )))
            }
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&stderr);
        }
        let text = truncate_bytes(text, MAX_OUTPUT_SIZE);

        let exit_code = output.status.code().unwrap_or(-1);
        if exit_code == 0 {
            Ok(ToolResult::text(text))
        } else {
            Ok(ToolResult::error(format!("{}\n[exit code: {}]", text, exit_code)))
        }
    }
}

pub struct ReadTool {
    workdir: PathBuf,
}

impl ReadTool {
    pub fn new(workdir: PathBuf) -> Self {
        Self { workdir }
    }
}

#[async_trait]
impl Tool for ReadTool {
    fn name(&self) -> &str {
        "Read"
    }

    fn description(&self) -> &str {
        "Read a text file"
    }

    fn args(&self) -> Vec<ArgSpec> {
        vec![ArgSpec::required("file_path", "Absolute path or path relative to the working directory")]
    }

    async fn call(&self, args: &ToolCallArgs) -> Result<ToolResult> {
        let file_path = args.require("file_path")?;
        let path = self.workdir.join(file_path);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BridgeError::NotFound(format!("File not found: {}", file_path)))
            }
            Err(e) => return Err(e.into()),
        };

        let lines: Vec<&str> = content.lines().collect();
        let mut text = lines
            .iter()
            .take(MAX_READ_LINES)
            .copied()
            .collect::<Vec<_>>()
            .join("\n");
        if lines.len() > MAX_READ_LINES {
            text.push_str(&format!(
                "\n\n[Truncated: showing {} of {} lines]",
                MAX_READ_LINES,
                lines.len()
            ));
        }
        Ok(ToolResult::text(text))
    }
}

fn truncate_bytes(mut text: String, max: usize) -> String {
    if text.len() <= max {
        return text;
    }
    let mut cut = max;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    text.push_str("\n\n[Output truncated]");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bash_success_and_failure() {
        let dir = tempfile::tempdir().unwrap();
        let reg = builtin_tools(dir.path());

        let ok = reg
            .execute("Bash", &ToolCallArgs::new().with("command", "echo hello"))
            .await;
        assert!(!ok.is_error);
        assert_eq!(ok.text_content().trim(), "hello");

        let failed = reg
            .execute("Bash", &ToolCallArgs::new().with("command", "echo oops >&2; exit 3"))
            .await;
        assert!(failed.is_error);
        assert!(failed.text_content().contains("oops"));
        assert!(failed.text_content().ends_with("[exit code: 3]"));
    }

    #[tokio::test]
    async fn test_bash_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let tool = BashTool::new(dir.path().to_path_buf()).with_timeout(Duration::from_millis(100));
        let result = tool
            .call(&ToolCallArgs::new().with("command", "sleep 5"))
            .await
            .unwrap();
        assert!(result.is_error);
        assert!(result.text_content().contains("timed out"));
    }

    #[tokio::test]
    async fn test_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "one\ntwo").unwrap();
        let reg = builtin_tools(dir.path());

        let read = reg
            .execute("Read", &ToolCallArgs::new().with("file_path", "a.txt"))
            .await;
        assert_eq!(read.text_content(), "one\ntwo");

        let missing = reg
            .execute("Read", &ToolCallArgs::new().with("file_path", "b.txt"))
            .await;
        assert_eq!(missing.text_content(), "File not found: b.txt");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let text = "é".repeat(10);
        let out = truncate_bytes(text, 5);
        assert!(out.starts_with("éé"));
        assert!(out.ends_with("[Output truncated]"));
    }
}
