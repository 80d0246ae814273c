//! MCP stdio server implementing JSON-RPC 2.0 over stdin/stdout.
//!
//! Exposes the rule platform's projects and rules as native tools via the
//! MCP (Model Context Protocol), backed by the entity coordinator so
//! repeated lookups within one session stay off the network.
//!
//! Protocol: newline-delimited JSON-RPC 2.0 on stdin/stdout.
//! Logging goes to stderr (stdout is reserved for protocol messages).

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::domain::models::{Project, Rule, RuleSlot};
use crate::domain::ports::EntityClient;
use crate::services::EntityCoordinator;

/// MCP stdio server that exposes project and rule lookups as native tools.
pub struct StdioServer<C: EntityClient + 'static> {
    coordinator: Arc<EntityCoordinator<C>>,
}

impl<C: EntityClient + 'static> StdioServer<C> {
    /// Create a server around an injected coordinator.
    pub fn new(coordinator: Arc<EntityCoordinator<C>>) -> Self {
        Self { coordinator }
    }

    /// Run the stdio server loop, reading JSON-RPC from stdin and writing
    /// responses to stdout.
    pub async fn run(&self) -> anyhow::Result<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let reader = BufReader::new(stdin);
        let mut lines = reader.lines();

        tracing::info!("rulebridge stdio server started");

        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            let response = self.handle_message(&line).await;
            if response.is_empty() {
                continue;
            }
            let mut response_bytes = response.into_bytes();
            response_bytes.push(b'\n');
            stdout.write_all(&response_bytes).await?;
            stdout.flush().await?;
        }

        tracing::info!("rulebridge stdio server stopped");
        Ok(())
    }

    async fn handle_message(&self, line: &str) -> String {
        let request: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                return error_response(
                    serde_json::Value::Null,
                    -32700,
                    &format!("Parse error: {}", e),
                );
            }
        };

        let id = request.get("id").cloned().unwrap_or(serde_json::Value::Null);
        let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("");
        let params = request
            .get("params")
            .cloned()
            .unwrap_or(serde_json::json!({}));

        match method {
            "initialize" => handle_initialize(id),
            "tools/list" => handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, &params).await,
            // Client notification — no response expected.
            "notifications/initialized" => String::new(),
            _ => error_response(id, -32601, &format!("Method not found: {}", method)),
        }
    }

    async fn handle_tools_call(&self, id: serde_json::Value, params: &serde_json::Value) -> String {
        let tool_name = params.get("name").and_then(|n| n.as_str()).unwrap_or("");
        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or(serde_json::json!({}));

        let result = match tool_name {
            "get_project" => self.tool_get_project(&arguments).await,
            "get_rule" => self.tool_get_rule(&arguments).await,
            "list_own_rules" => self.tool_list_own_rules().await,
            "update_rule" => self.tool_update_rule(&arguments).await,
            _ => Err(format!("Unknown tool: {}", tool_name)),
        };

        // A coordinator failure becomes the tool's textual result rather
        // than a protocol-level error, so one bad id does not end the
        // session.
        match result {
            Ok(content) => {
                let result = serde_json::json!({
                    "content": [{
                        "type": "text",
                        "text": content
                    }]
                });
                success_response(id, result)
            }
            Err(error) => {
                let result = serde_json::json!({
                    "content": [{
                        "type": "text",
                        "text": error
                    }],
                    "isError": true
                });
                success_response(id, result)
            }
        }
    }

    // ========================================================================
    // Tools
    // ========================================================================

    async fn tool_get_project(&self, args: &serde_json::Value) -> Result<String, String> {
        let id = args
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or("Missing required field: id")?;

        let project = self
            .coordinator
            .get_project(id)
            .await
            .map_err(|e| e.to_string())?;
        Ok(format_project(&project))
    }

    async fn tool_get_rule(&self, args: &serde_json::Value) -> Result<String, String> {
        let id = args
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or("Missing required field: id")?;

        let rule = self
            .coordinator
            .get_rule(id)
            .await
            .map_err(|e| e.to_string())?;
        Ok(format_rule(&rule))
    }

    async fn tool_list_own_rules(&self) -> Result<String, String> {
        let page = self
            .coordinator
            .get_owned_rules()
            .await
            .map_err(|e| e.to_string())?;

        if page.items.is_empty() {
            return Ok("You have no rules yet.".to_string());
        }

        let mut out = format!("Your rules ({} total):\n", page.total);
        for rule in &page.items {
            out.push_str(&format!(
                "- {} ({}): {}\n",
                rule.title, rule.id, rule.description
            ));
        }
        if page.has_next {
            out.push_str("(more rules exist beyond this page)\n");
        }
        Ok(out)
    }

    async fn tool_update_rule(&self, args: &serde_json::Value) -> Result<String, String> {
        let id = args
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or("Missing required field: id")?;
        let content = args
            .get("content")
            .and_then(|v| v.as_str())
            .ok_or("Missing required field: content")?;

        self.coordinator
            .update_rule(id, content)
            .await
            .map_err(|e| e.to_string())?;
        Ok(format!("Updated rule {}", id))
    }
}

fn handle_initialize(id: serde_json::Value) -> String {
    let result = serde_json::json!({
        "protocolVersion": "2024-11-05",
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": "rulebridge",
            "version": env!("CARGO_PKG_VERSION")
        }
    });
    success_response(id, result)
}

fn handle_tools_list(id: serde_json::Value) -> String {
    let tools = serde_json::json!({
        "tools": [
            {
                "name": "get_project",
                "description": "Get a shared project by id, including its ordered list of rules. Embedded rules are shown inline; project-level aliases override rule titles for display. Results are cached for the session, so repeated lookups are free.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "description": "Project id" }
                    },
                    "required": ["id"]
                }
            },
            {
                "name": "get_rule",
                "description": "Get a single rule by id: title, description, file-glob scope, and full content body. Results are cached for the session.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "description": "Rule id" }
                    },
                    "required": ["id"]
                }
            },
            {
                "name": "list_own_rules",
                "description": "List the rules owned by the current credential. Always fetched fresh from the platform, never served from cache.",
                "inputSchema": {
                    "type": "object",
                    "properties": {}
                }
            },
            {
                "name": "update_rule",
                "description": "Replace a rule's content body wholesale. Pass the complete desired content — partial text would overwrite and drop the rest of the rule body.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "description": "Rule id to update" },
                        "content": { "type": "string", "description": "Complete new content body for the rule" }
                    },
                    "required": ["id", "content"]
                }
            }
        ]
    });
    success_response(id, tools)
}

fn success_response(id: serde_json::Value, result: serde_json::Value) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
    .to_string()
}

fn error_response(id: serde_json::Value, code: i64, message: &str) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message
        }
    })
    .to_string()
}

/// Render a rule as human-readable tool output.
fn format_rule(rule: &Rule) -> String {
    let scope = rule.globs.as_deref().unwrap_or("all files");
    format!(
        "# {} ({})\nScope: {}\nPrivate: {}\n\n{}\n\n{}",
        rule.title, rule.id, scope, rule.private, rule.description, rule.content
    )
}

/// Render a project and its rule list, honoring per-project aliases.
fn format_project(project: &Project) -> String {
    let mut out = format!("# Project {}\n{}\n\nRules:\n", project.id, project.description);
    for entry in &project.rules {
        match &entry.rule {
            RuleSlot::Embedded(rule) => {
                let name = entry.display_name().unwrap_or(&rule.title);
                out.push_str(&format!("- {} ({}): {}\n", name, rule.id, rule.description));
            }
            RuleSlot::Reference(rule_id) => match entry.display_name() {
                Some(alias) => out.push_str(&format!("- {} ({})\n", alias, rule_id)),
                None => out.push_str(&format!("- {}\n", rule_id)),
            },
        }
    }
    out
}
