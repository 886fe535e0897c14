use async_trait::async_trait;
use mnemo_core::{CommandArgs, UiView};
use serde_json::{json, Value};

use crate::dispatch::ToolHandler;
use crate::error::{OrchestratorError, Result};

/// A navigation action understood by the UI domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Open(UiView),
}

impl UiAction {
    /// Parse `open-<view>`, or `open`/`navigate` with a `view` argument.
    pub fn parse(action: &str, args: &CommandArgs) -> Result<Self> {
        let slug = match action.strip_prefix("open-") {
            Some(slug) => Some(slug),
            None if matches!(action, "open" | "navigate") => {
                args.get("view").and_then(Value::as_str)
            }
            None => None,
        };
        slug.and_then(UiView::from_slug)
            .map(Self::Open)
            .ok_or_else(|| OrchestratorError::InvalidArguments(format!("Unknown UI action: {action}")))
    }

    pub fn view(&self) -> UiView {
        match self {
            Self::Open(view) => *view,
        }
    }
}

/// UI-domain handler producing dashboard navigation links.
#[derive(Debug, Clone)]
pub struct UiConnector {
    app_url: String,
}

impl UiConnector {
    pub fn new(app_url: impl Into<String>) -> Self {
        Self {
            app_url: app_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, view: UiView) -> String {
        format!("{}{}", self.app_url, view.path())
    }
}

#[async_trait]
impl ToolHandler for UiConnector {
    async fn handle(&self, action: &str, args: &CommandArgs) -> Result<Value> {
        let view = UiAction::parse(action, args)?.view();
        Ok(json!({
            "action": action,
            "view": view.slug(),
            "url": self.url_for(view),
        }))
    }
}
