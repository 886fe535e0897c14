//! Dashboard views reachable through the UI domain.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static VIEW_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(dashboard|settings|preferences|api[\s-]?keys|keys|analytics|profile|account|billing|docs|documentation)\b")
        .expect("Invalid view regex")
});

/// A named view of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UiView {
    Dashboard,
    Settings,
    ApiKeys,
    Analytics,
    Profile,
    Billing,
    Docs,
}

impl UiView {
    /// All views, in detection order.
    pub const ALL: [UiView; 7] = [
        Self::Dashboard,
        Self::Settings,
        Self::ApiKeys,
        Self::Analytics,
        Self::Profile,
        Self::Billing,
        Self::Docs,
    ];

    /// Slug used in action names (`open-<slug>`).
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Settings => "settings",
            Self::ApiKeys => "api-keys",
            Self::Analytics => "analytics",
            Self::Profile => "profile",
            Self::Billing => "billing",
            Self::Docs => "docs",
        }
    }

    /// Path of the view relative to the dashboard base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Dashboard => "/dashboard",
            Self::Settings => "/dashboard/settings",
            Self::ApiKeys => "/dashboard/api-keys",
            Self::Analytics => "/dashboard/analytics",
            Self::Profile => "/dashboard/profile",
            Self::Billing => "/dashboard/billing",
            Self::Docs => "/docs",
        }
    }

    /// Look a view up by its slug.
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.slug() == slug)
    }

    /// Find the first view named in free text.
    pub fn detect(text: &str) -> Option<Self> {
        let found = VIEW_REGEX.captures(text)?.get(1)?.as_str().to_lowercase();
        match found.as_str() {
            "dashboard" => Some(Self::Dashboard),
            "settings" | "preferences" => Some(Self::Settings),
            "analytics" => Some(Self::Analytics),
            "profile" | "account" => Some(Self::Profile),
            "billing" => Some(Self::Billing),
            "docs" | "documentation" => Some(Self::Docs),
            other if other.ends_with("keys") => Some(Self::ApiKeys),
            _ => None,
        }
    }
}

impl std::fmt::Display for UiView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}
