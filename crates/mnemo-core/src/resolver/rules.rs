//! Per-domain action rules.
//!
//! Rules run on the text with quoted segments blanked out, so words inside a
//! quoted title never select an action. Within a domain the first matching
//! rule wins; each branch assigns a fixed confidence.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Value};

use crate::command::CommandArgs;
use crate::view::UiView;

use super::extract;
use super::Normalized;

/// Polite or conversational lead-in allowed before a leading verb.
const LEAD_IN: &str =
    r"^\s*(?:(?:please|pls|can|could|would|will|you|i|want|need|to|help|me|let's|lets|just|now)\s+)*";

static SEARCH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i){LEAD_IN}(search(?:\s+for)?|find|look\s+(?:for|up)|lookup|recall|retrieve|query)\b"
    ))
    .expect("Invalid search regex")
});

static CREATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i){LEAD_IN}(create|add|save|store|remember|memorize|record|note(?:\s+down)?|write(?:\s+down)?|jot(?:\s+down)?|(?:don'?t|do\s+not)\s+forget)\b"
    ))
    .expect("Invalid create regex")
});

static TOPIC_CREATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(create|add|new|make|start)\b").expect("Invalid topic regex"));

static TOPIC_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btopic\b\s*(?:called|named|for|:)?\s*(.*)$").expect("Invalid topic name regex")
});

static STATS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(stats|statistics|how\s+many|count)\b").expect("Invalid stats regex")
});

static LIST_VERB_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(list|show|display|view|get|open|browse|see)\b").expect("Invalid list regex")
});

static LIST_QUALIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(recent|latest|all|my)\s+(memories|notes)\b").expect("Invalid list qualifier regex")
});

static DELETE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(delete|remove|forget|erase|discard|trash)\b").expect("Invalid delete regex")
});

static UPDATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(update|edit|change|modify|rename|amend)\b").expect("Invalid update regex")
});

static UI_VERB_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(open|show|display|go\s+to|navigate\s+to|take\s+me\s+to|view|launch|bring\s+up)\b")
        .expect("Invalid ui verb regex")
});

static REFUND_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\brefund\b").expect("Invalid refund regex"));

static CHARGE_VERB_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(charge|bill)\b").expect("Invalid charge regex"));

static CHARGE_CREATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(create|new|make)\s+(?:a\s+)?(?:charge|payment)\b").expect("Invalid charge create regex")
});

static BALANCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bbalance\b").expect("Invalid balance regex"));

static INVOICE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\binvoices?\b").expect("Invalid invoice regex"));

static SUBSCRIPTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsubscriptions?\b").expect("Invalid subscription regex"));

const SEARCH_FILLERS: &[&str] = &[
    "for", "about", "my", "me", "memories", "memory", "notes", "note", "regarding", "related", "to",
    "on", "any", "all", "everything", "anything", "with", "of",
];

const CREATE_FILLERS: &[&str] = &["a", "an", "new", "memory", "note", "that", "to", "this"];

const TOPIC_FILLERS: &[&str] = &["called", "named", "for", "about"];

/// Outcome of a matching rule.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Resolution {
    pub action: String,
    pub args: CommandArgs,
    pub confidence: f32,
}

impl Resolution {
    fn new(action: impl Into<String>, args: CommandArgs, confidence: f32) -> Self {
        Self {
            action: action.into(),
            args,
            confidence,
        }
    }
}

/// Memory-domain rules: search, topics, create, stats, list, delete, update,
/// then a search over the whole text.
pub(crate) fn memory(input: &Normalized<'_>, default_limit: u64) -> Resolution {
    // A `/search`-style command prefix reads as the bare verb.
    let text = input.original.trim_start_matches('/').trim_start();
    let quotes = extract::quoted_segments(text);
    let unquoted = extract::strip_quoted(text);

    if let Some(found) = SEARCH_REGEX.find(&unquoted) {
        return memory_search(&quotes, &unquoted, &unquoted[found.end()..], default_limit);
    }

    if input.has_token("topic") || input.has_token("topics") {
        return memory_topic(&quotes, &unquoted);
    }

    if let Some(found) = CREATE_REGEX.find(&unquoted) {
        return memory_create(&quotes, &unquoted, &unquoted[found.end()..]);
    }

    if STATS_REGEX.is_match(&unquoted) {
        return Resolution::new("stats", CommandArgs::new(), 0.9);
    }

    let names_memories = ["memories", "memory", "notes"]
        .iter()
        .any(|noun| input.has_token(noun));
    let starts_with_list = input.tokens.first().is_some_and(|t| t == "list");
    if starts_with_list
        || (names_memories && LIST_VERB_REGEX.is_match(&unquoted))
        || LIST_QUALIFIER_REGEX.is_match(&unquoted)
    {
        return memory_list(&unquoted);
    }

    if DELETE_REGEX.is_match(&unquoted) {
        let mut args = CommandArgs::new();
        return match extract::record_id(&unquoted) {
            Some(id) => {
                args.insert("id".into(), json!(id));
                Resolution::new("delete", args, 0.9)
            }
            None => Resolution::new("delete", args, 0.6),
        };
    }

    if let Some(found) = UPDATE_REGEX.captures(&unquoted) {
        let renaming = found
            .get(1)
            .is_some_and(|m| m.as_str().eq_ignore_ascii_case("rename"));
        return memory_update(&quotes, &unquoted, renaming);
    }

    // Memory noun without a recognised verb: treat the whole text as a query.
    let mut args = CommandArgs::new();
    let query = extract::trim_fillers(&extract::strip_limit(text), &[]);
    if !query.is_empty() {
        args.insert("query".into(), json!(query));
    }
    args.insert(
        "limit".into(),
        json!(extract::limit(text).unwrap_or(default_limit)),
    );
    Resolution::new("search", args, 0.75)
}

fn memory_search(quotes: &[String], unquoted: &str, rest: &str, default_limit: u64) -> Resolution {
    let mut args = CommandArgs::new();

    let (query, confidence) = match quotes.first() {
        Some(quoted) => (Some(quoted.clone()), 0.95),
        None => {
            let cleaned = extract::strip_tags(&extract::strip_type_phrase(&extract::strip_limit(rest)));
            let query = extract::trim_fillers(&cleaned, SEARCH_FILLERS);
            let tags = extract::tags(rest);
            if !query.is_empty() {
                (Some(query), 0.9)
            } else if !tags.is_empty() {
                // Tag-only search: the tags double as the query.
                (Some(tags.join(" ")), 0.8)
            } else {
                (None, 0.6)
            }
        }
    };

    if let Some(query) = query {
        args.insert("query".into(), json!(query));
    }
    args.insert(
        "limit".into(),
        json!(extract::limit(unquoted).unwrap_or(default_limit)),
    );
    insert_filters(&mut args, unquoted);
    Resolution::new("search", args, confidence)
}

fn memory_topic(quotes: &[String], unquoted: &str) -> Resolution {
    let mut args = CommandArgs::new();

    if !TOPIC_CREATE_REGEX.is_match(unquoted) {
        return Resolution::new("list-topics", args, 0.85);
    }

    let name = quotes.first().cloned().or_else(|| {
        TOPIC_NAME_REGEX
            .captures(unquoted)
            .and_then(|cap| cap.get(1))
            .map(|m| extract::trim_fillers(m.as_str(), TOPIC_FILLERS))
            .filter(|n| !n.is_empty())
    });

    match name {
        Some(name) => {
            args.insert("name".into(), json!(name));
            if let Some(description) = quotes.get(1) {
                args.insert("description".into(), json!(description));
            }
            Resolution::new("create-topic", args, 0.9)
        }
        None => Resolution::new("create-topic", args, 0.6),
    }
}

fn memory_create(quotes: &[String], unquoted: &str, rest: &str) -> Resolution {
    let mut args = CommandArgs::new();

    let confidence = match quotes {
        [title, content, ..] => {
            args.insert("title".into(), json!(title));
            args.insert("content".into(), json!(content));
            0.95
        }
        [content] => {
            args.insert("title".into(), json!(extract::derive_title(content)));
            args.insert("content".into(), json!(content));
            0.9
        }
        [] => {
            let cleaned = extract::strip_tags(&extract::strip_type_phrase(rest));
            let content = extract::trim_fillers(&cleaned, CREATE_FILLERS);
            if content.is_empty() {
                0.6
            } else {
                args.insert("title".into(), json!(extract::derive_title(&content)));
                args.insert("content".into(), json!(content));
                0.8
            }
        }
    };

    insert_filters(&mut args, unquoted);
    Resolution::new("create", args, confidence)
}

fn memory_list(unquoted: &str) -> Resolution {
    let mut args = CommandArgs::new();
    if let Some(limit) = extract::limit(unquoted) {
        args.insert("limit".into(), json!(limit));
    }
    insert_filters(&mut args, unquoted);
    Resolution::new("list", args, 0.9)
}

fn memory_update(quotes: &[String], unquoted: &str, renaming: bool) -> Resolution {
    let mut args = CommandArgs::new();

    match quotes {
        [title, content, ..] => {
            args.insert("title".into(), json!(title));
            args.insert("content".into(), json!(content));
        }
        [single] if renaming => {
            args.insert("title".into(), json!(single));
        }
        [single] => {
            args.insert("content".into(), json!(single));
        }
        [] => {}
    }
    insert_filters(&mut args, unquoted);

    match extract::record_id(unquoted) {
        Some(id) => {
            args.insert("id".into(), json!(id));
            Resolution::new("update", args, 0.85)
        }
        None => Resolution::new("update", args, 0.6),
    }
}

/// Memory type and tag filters shared by several memory actions.
fn insert_filters(args: &mut CommandArgs, text: &str) {
    if let Some(memory_type) = extract::memory_type(text) {
        args.insert("type".into(), json!(memory_type));
    }
    let tags = extract::tags(text);
    if !tags.is_empty() {
        args.insert("tags".into(), Value::from(tags));
    }
}

/// Whether the input expresses navigation intent (a UI verb plus a view).
pub(crate) fn ui_intent(input: &Normalized<'_>) -> Option<UiView> {
    if !UI_VERB_REGEX.is_match(&input.lower) {
        return None;
    }
    UiView::detect(&input.lower)
}

/// UI-domain rule: `open-<view>`.
pub(crate) fn ui(view: UiView) -> Resolution {
    let mut args = CommandArgs::new();
    args.insert("view".into(), json!(view.slug()));
    Resolution::new(format!("open-{}", view.slug()), args, 0.95)
}

/// Payment-domain rules: refund, charge, balance, invoices, subscriptions,
/// then a payment listing.
pub(crate) fn payment(input: &Normalized<'_>) -> Resolution {
    let text = input.original;
    let mut args = CommandArgs::new();

    if let Some(customer) = extract::customer_id(text) {
        args.insert("customer".into(), json!(customer));
    }

    if REFUND_REGEX.is_match(text) {
        if let Some((amount, currency)) = extract::amount(text) {
            args.insert("amount".into(), json!(amount));
            args.insert("currency".into(), json!(currency));
        }
        return match extract::payment_id(text) {
            Some(id) => {
                args.insert("charge_id".into(), json!(id));
                Resolution::new("refund", args, 0.9)
            }
            None => Resolution::new("refund", args, 0.6),
        };
    }

    let amount = extract::amount(text);
    if CHARGE_CREATE_REGEX.is_match(text) || (amount.is_some() && CHARGE_VERB_REGEX.is_match(text)) {
        return match amount {
            Some((amount, currency)) => {
                args.insert("amount".into(), json!(amount));
                args.insert("currency".into(), json!(currency));
                Resolution::new("create-charge", args, 0.85)
            }
            None => Resolution::new("create-charge", args, 0.6),
        };
    }

    if BALANCE_REGEX.is_match(text) {
        return Resolution::new("get-balance", args, 0.85);
    }

    if let Some(limit) = extract::limit(text) {
        args.insert("limit".into(), json!(limit));
    }

    if INVOICE_REGEX.is_match(text) {
        return Resolution::new("list-invoices", args, 0.8);
    }

    if SUBSCRIPTION_REGEX.is_match(text) {
        return Resolution::new("list-subscriptions", args, 0.8);
    }

    Resolution::new("list-payments", args, 0.75)
}
