//! The structured command produced by resolution.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool identifier for memory-domain commands.
pub const TOOL_MEMORY: &str = "memory";

/// Tool identifier for dashboard navigation commands.
pub const TOOL_UI: &str = "ui";

/// Tool identifier for payment commands.
pub const TOOL_STRIPE: &str = "stripe";

/// Tool identifier carried by the stub command of a failed resolution.
pub const TOOL_UNKNOWN: &str = "unknown";

/// Arguments extracted from free text, keyed by argument name.
pub type CommandArgs = serde_json::Map<String, Value>;

/// A confidence-scored command derived from one piece of free text.
///
/// `confidence` is a heuristic weight reflecting how specific the matching
/// rule was. It is not a probability and is never renormalised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommand {
    /// Tool the command is dispatched to (e.g., "memory", "ui").
    pub tool: String,

    /// Action within the tool (e.g., "search", "open-dashboard").
    pub action: String,

    /// Extracted arguments. Required arguments may be absent.
    #[serde(default)]
    pub args: CommandArgs,

    /// Rule specificity in `[0, 1]`.
    pub confidence: f32,

    /// The text exactly as the caller supplied it.
    pub original_input: String,
}

impl ParsedCommand {
    /// Create a command, clamping confidence into `[0, 1]`.
    pub fn new(
        tool: impl Into<String>,
        action: impl Into<String>,
        args: CommandArgs,
        confidence: f32,
        original_input: impl Into<String>,
    ) -> Self {
        Self {
            tool: tool.into(),
            action: action.into(),
            args,
            confidence: confidence.clamp(0.0, 1.0),
            original_input: original_input.into(),
        }
    }

    /// Stub command reported when nothing could be resolved.
    pub fn unresolved(original_input: impl Into<String>) -> Self {
        Self::new(
            TOOL_UNKNOWN,
            TOOL_UNKNOWN,
            CommandArgs::new(),
            0.0,
            original_input,
        )
    }

    /// Whether this is the stub of a failed resolution.
    pub fn is_unresolved(&self) -> bool {
        self.tool == TOOL_UNKNOWN
    }

    /// Get an argument by name.
    pub fn arg(&self, key: &str) -> Option<&Value> {
        self.args.get(key)
    }

    /// Get a string argument by name.
    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }

    /// Check whether an argument is present.
    pub fn has_arg(&self, key: &str) -> bool {
        self.args.contains_key(key)
    }

    /// Return a copy with one argument set.
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// `tool.action`, used in logs and diagnostics.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.tool, self.action)
    }
}

impl std::fmt::Display for ParsedCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{} ({:.2})", self.tool, self.action, self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_confidence_clamped() {
        let cmd = ParsedCommand::new("memory", "search", CommandArgs::new(), 1.7, "x");
        assert_eq!(cmd.confidence, 1.0);
        let cmd = ParsedCommand::new("memory", "search", CommandArgs::new(), -0.2, "x");
        assert_eq!(cmd.confidence, 0.0);
    }

    #[test]
    fn test_unresolved_stub() {
        let cmd = ParsedCommand::unresolved("??");
        assert!(cmd.is_unresolved());
        assert_eq!(cmd.tool, "unknown");
        assert_eq!(cmd.confidence, 0.0);
        assert_eq!(cmd.original_input, "??");
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn test_args_accessors() {
        let cmd = ParsedCommand::new("memory", "delete", CommandArgs::new(), 0.6, "delete it")
            .with_arg("id", "abc123");
        assert!(cmd.has_arg("id"));
        assert_eq!(cmd.arg_str("id"), Some("abc123"));
        assert_eq!(cmd.arg("id"), Some(&json!("abc123")));
        assert_eq!(cmd.qualified_name(), "memory.delete");
        assert_eq!(cmd.to_string(), "memory.delete (0.60)");
    }

    #[test]
    fn test_serialization_shape() {
        let cmd = ParsedCommand::new("ui", "open-dashboard", CommandArgs::new(), 0.95, "open dashboard");
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["tool"], json!("ui"));
        assert_eq!(value["original_input"], json!("open dashboard"));
    }
}
