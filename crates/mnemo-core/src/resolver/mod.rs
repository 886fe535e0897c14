//! Command resolver: free text to a confidence-scored command.
//!
//! # Algorithm
//!
//! 1. **Normalize** - lowercase, trim and split into tokens. Normalized text
//!    is used only for matching; arguments are extracted from the original.
//! 2. **Classify** - fixed precedence: memory, UI, payment.
//! 3. **Select an action** - ordered rule list within the category, each
//!    branch carrying a fixed confidence (see [`rules`]).
//! 4. **Fallback** - text that matched no category becomes a
//!    `memory.search` over the whole text, unless it is too short, looks
//!    like a question or starts with a `/` command prefix.
//!
//! A missing required argument never fails resolution. The action is kept
//! with a lower confidence and the handler rejects it later.

pub mod extract;
mod rules;

use serde_json::json;
use tracing::debug;

use crate::command::{CommandArgs, ParsedCommand, TOOL_MEMORY, TOOL_STRIPE, TOOL_UI};
use crate::error::{ResolutionError, Result};

/// Default `limit` attached to search commands.
pub const DEFAULT_SEARCH_LIMIT: u64 = 10;

/// Confidence of the whole-text search fallback.
pub const FALLBACK_CONFIDENCE: f32 = 0.7;

/// Inputs shorter than this are never accepted by the fallback.
const MIN_FALLBACK_CHARS: usize = 3;

/// Nouns that always select the memory domain.
const MEMORY_NOUNS: &[&str] = &[
    "memory", "memories", "note", "notes", "topic", "topics", "remember", "recall", "stats",
    "statistics",
];

/// Verbs that select the memory domain unless another domain is named.
const MEMORY_VERBS: &[&str] = &[
    "search", "find", "create", "save", "store", "list", "delete", "remove", "update", "edit",
    "forget",
];

const PAYMENT_WORDS: &[&str] = &[
    "stripe", "payment", "payments", "charge", "charges", "refund", "refunds", "invoice", "invoices",
    "subscription", "subscriptions", "payout", "payouts",
];

const QUESTION_WORDS: &[&str] = &[
    "what", "why", "how", "when", "where", "who", "which", "whose", "is", "are", "can", "could",
    "does", "do", "did", "will", "would", "should",
];

/// Domain an input was classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Memory,
    Ui,
    Payment,
}

/// Lowercased, tokenized view of an input used for matching only.
#[derive(Debug)]
pub(crate) struct Normalized<'a> {
    pub original: &'a str,
    pub lower: String,
    pub tokens: Vec<String>,
}

impl<'a> Normalized<'a> {
    fn new(original: &'a str) -> Self {
        let lower = original.trim().to_lowercase();
        let tokens = lower
            .split_whitespace()
            .map(|t| {
                t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                    .to_string()
            })
            .filter(|t| !t.is_empty())
            .collect();
        Self {
            original: original.trim(),
            lower,
            tokens,
        }
    }

    pub fn has_token(&self, word: &str) -> bool {
        self.tokens.iter().any(|t| t == word)
    }

    fn has_any(&self, words: &[&str]) -> bool {
        self.tokens.iter().any(|t| words.contains(&t.as_str()))
    }

    fn looks_like_question(&self) -> bool {
        self.lower.ends_with('?')
            || self
                .tokens
                .first()
                .is_some_and(|t| QUESTION_WORDS.contains(&t.as_str()))
    }
}

/// Stateless resolver turning free text into a [`ParsedCommand`].
#[derive(Debug, Clone)]
pub struct CommandResolver {
    default_limit: u64,
}

impl Default for CommandResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandResolver {
    /// Create a resolver with the default search limit.
    pub fn new() -> Self {
        Self {
            default_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Set the `limit` attached to searches that name none.
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    /// Resolve free text into a command.
    ///
    /// # Errors
    /// Returns [`ResolutionError`] when no category matches and the fallback
    /// rejects the text.
    pub fn resolve(&self, text: &str) -> Result<ParsedCommand> {
        let input = Normalized::new(text);
        if input.tokens.is_empty() {
            return Err(ResolutionError::unresolvable(text));
        }

        let (tool, resolution) = match classify(&input) {
            Some(Category::Memory) => (TOOL_MEMORY, rules::memory(&input, self.default_limit)),
            Some(Category::Ui) => match rules::ui_intent(&input) {
                Some(view) => (TOOL_UI, rules::ui(view)),
                None => return Err(ResolutionError::unresolvable(text)),
            },
            Some(Category::Payment) => (TOOL_STRIPE, rules::payment(&input)),
            None => return self.fallback(&input, text),
        };

        let command = ParsedCommand::new(
            tool,
            resolution.action,
            resolution.args,
            resolution.confidence,
            text,
        );
        debug!(command = %command, "Resolved command");
        Ok(command)
    }

    /// Classify text without extracting arguments.
    pub fn classify(&self, text: &str) -> Option<Category> {
        classify(&Normalized::new(text))
    }

    fn fallback(&self, input: &Normalized<'_>, text: &str) -> Result<ParsedCommand> {
        let too_short = input.original.chars().count() < MIN_FALLBACK_CHARS;
        let command_prefix = input.original.starts_with('/');

        if too_short || command_prefix || input.looks_like_question() {
            debug!(
                too_short,
                command_prefix,
                input_len = text.len(),
                "Fallback rejected input"
            );
            return Err(ResolutionError::unresolvable(text));
        }

        let mut args = CommandArgs::new();
        args.insert("query".into(), json!(input.original));
        args.insert("limit".into(), json!(self.default_limit));
        Ok(ParsedCommand::new(
            TOOL_MEMORY,
            "search",
            args,
            FALLBACK_CONFIDENCE,
            text,
        ))
    }
}

/// Category precedence: memory, UI, payment.
fn classify(input: &Normalized<'_>) -> Option<Category> {
    let ui_intent = rules::ui_intent(input).is_some();
    let names_payment = input.has_any(PAYMENT_WORDS);

    if input.has_any(MEMORY_NOUNS)
        || (input.has_any(MEMORY_VERBS) && !ui_intent && !names_payment)
    {
        return Some(Category::Memory);
    }
    if ui_intent {
        return Some(Category::Ui);
    }
    if names_payment {
        return Some(Category::Payment);
    }
    None
}

/// Resolve text with a default [`CommandResolver`].
pub fn resolve(text: &str) -> Result<ParsedCommand> {
    CommandResolver::default().resolve(text)
}
