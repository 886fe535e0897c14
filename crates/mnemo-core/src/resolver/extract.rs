//! Argument extractors.
//!
//! Each extractor is a pure function over the original text: it never
//! mutates its input and returns the same answer for the same text.

use std::sync::LazyLock;

use regex::Regex;

/// Double quotes, curly quotes, or single quotes opened at a word start
/// (so apostrophes in "don't" or "Mike's" are not treated as quotes).
static QUOTED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"\n]+)"|“([^”\n]+)”|(?:^|\s)'([^'\n]+)'"#).expect("Invalid quoted regex")
});

static LIMIT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:limit(?:\s+to)?|top|first|max|last)\s+(\d{1,4})\b").expect("Invalid limit regex")
});

static TYPE_PHRASE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btype\s*[:=]?\s*(context|project|knowledge|reference|personal|workflow)\b")
        .expect("Invalid type regex")
});

static TYPE_NOUN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(context|project|knowledge|reference|personal|workflow)\s+(?:memory|memories|notes?)\b")
        .expect("Invalid type noun regex")
});

static HASHTAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)#([A-Za-z][\w-]*)").expect("Invalid hashtag regex"));

static TAG_LIST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btag(?:s|ged)?\s*(?:[:=]|with|as)\s*([\w-]+(?:\s*,\s*[\w-]+)*)")
        .expect("Invalid tag list regex")
});

static UUID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\b")
        .expect("Invalid uuid regex")
});

static EXPLICIT_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bid(?:\s*[:=#]\s*|\s+)([A-Za-z0-9][A-Za-z0-9_-]*)").expect("Invalid id regex")
});

static HEX_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b[0-9a-f]{6,}\b").expect("Invalid hex id regex"));

static PAYMENT_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b((?:ch|pi|py|re|in)_[A-Za-z0-9]+)\b").expect("Invalid payment id regex")
});

static CUSTOMER_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(cus_[A-Za-z0-9]+)\b").expect("Invalid customer regex"));

static DOLLAR_AMOUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\s?(\d+(?:\.\d{1,2})?)").expect("Invalid dollar amount regex")
});

static WORD_AMOUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d{1,2})?)\s*(usd|eur|gbp|dollars?|euros?|pounds?)\b")
        .expect("Invalid amount regex")
});

static CURRENCY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(usd|eur|gbp)\b").expect("Invalid currency regex"));

/// Quoted segments in order of appearance.
pub fn quoted_segments(text: &str) -> Vec<String> {
    QUOTED_REGEX
        .captures_iter(text)
        .filter_map(|cap| cap.get(1).or_else(|| cap.get(2)).or_else(|| cap.get(3)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// The text with every quoted segment replaced by a space.
pub fn strip_quoted(text: &str) -> String {
    QUOTED_REGEX.replace_all(text, " ").to_string()
}

/// Explicit numeric qualifier (`limit 5`, `top 3`).
pub fn limit(text: &str) -> Option<u64> {
    LIMIT_REGEX
        .captures(text)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .filter(|n| *n > 0)
}

/// The text with numeric qualifiers removed.
pub fn strip_limit(text: &str) -> String {
    LIMIT_REGEX.replace_all(text, " ").to_string()
}

/// Memory type from the vocabulary, either `type: x` or `x memories`.
pub fn memory_type(text: &str) -> Option<String> {
    TYPE_PHRASE_REGEX
        .captures(text)
        .or_else(|| TYPE_NOUN_REGEX.captures(text))
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_lowercase())
}

/// The text with `type: x` phrases and `x memories` qualifiers removed.
pub fn strip_type_phrase(text: &str) -> String {
    let without_phrase = TYPE_PHRASE_REGEX.replace_all(text, " ");
    TYPE_NOUN_REGEX.replace_all(&without_phrase, " ").to_string()
}

/// Tags from `#hashtags` and `tags: a, b` lists, deduplicated in order.
pub fn tags(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let hashtags = HASHTAG_REGEX
        .captures_iter(text)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_lowercase()));
    let listed = TAG_LIST_REGEX
        .captures_iter(text)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .flat_map(|list| {
            list.split(',')
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
        });

    for tag in hashtags.chain(listed) {
        if !found.contains(&tag) {
            found.push(tag);
        }
    }
    found
}

/// The text with hashtags and tag lists removed.
pub fn strip_tags(text: &str) -> String {
    let without_lists = TAG_LIST_REGEX.replace_all(text, " ");
    HASHTAG_REGEX.replace_all(&without_lists, " ").to_string()
}

/// Identifier-shaped token: UUID, then `id: x`, then a hex run with a digit.
pub fn record_id(text: &str) -> Option<String> {
    if let Some(m) = UUID_REGEX.find(text) {
        return Some(m.as_str().to_lowercase());
    }
    if let Some(id) = EXPLICIT_ID_REGEX
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
    {
        return Some(id);
    }
    HEX_ID_REGEX
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|candidate| candidate.chars().any(|c| c.is_ascii_digit()))
        .map(str::to_lowercase)
}

/// Stripe object id (`ch_…`, `pi_…`, `re_…`).
pub fn payment_id(text: &str) -> Option<String> {
    PAYMENT_ID_REGEX
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Stripe customer id (`cus_…`).
pub fn customer_id(text: &str) -> Option<String> {
    CUSTOMER_ID_REGEX
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Monetary amount and its currency (defaults to usd).
pub fn amount(text: &str) -> Option<(f64, String)> {
    if let Some(value) = DOLLAR_AMOUNT_REGEX
        .captures(text)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
    {
        let currency = CURRENCY_REGEX
            .captures(text)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_lowercase())
            .unwrap_or_else(|| "usd".to_string());
        return Some((value, currency));
    }

    let cap = WORD_AMOUNT_REGEX.captures(text)?;
    let value = cap.get(1)?.as_str().parse::<f64>().ok()?;
    let unit = cap.get(2)?.as_str().to_lowercase();
    let currency = match unit.as_str() {
        u if u.starts_with("dollar") => "usd",
        u if u.starts_with("euro") => "eur",
        u if u.starts_with("pound") => "gbp",
        u => u,
    };
    Some((value, currency.to_string()))
}

/// Short title derived from free-form content: at most eight words or
/// roughly fifty characters, whichever comes first.
pub fn derive_title(content: &str) -> String {
    let mut title = String::new();
    for word in content.split_whitespace().take(8) {
        if !title.is_empty() && title.len() + word.len() + 1 > 50 {
            break;
        }
        if !title.is_empty() {
            title.push(' ');
        }
        title.push_str(word);
    }
    title
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?'))
        .to_string()
}

/// Drop leading filler words (case-insensitive) and surrounding punctuation.
pub fn trim_fillers(text: &str, fillers: &[&str]) -> String {
    let mut words: Vec<&str> = text.split_whitespace().collect();
    while let Some(first) = words.first() {
        let bare = first
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if bare.is_empty() || fillers.contains(&bare.as_str()) {
            words.remove(0);
        } else {
            break;
        }
    }
    words
        .join(" ")
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | '?' | '!' | ':' | '-' | ','))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_segments() {
        let text = r#"create memory "Launch Plan" "Ship v2 by Friday""#;
        assert_eq!(quoted_segments(text), vec!["Launch Plan", "Ship v2 by Friday"]);
        assert_eq!(quoted_segments("save “curly title” now"), vec!["curly title"]);
        assert_eq!(quoted_segments("remember 'single quoted'"), vec!["single quoted"]);
    }

    #[test]
    fn test_apostrophes_are_not_quotes() {
        assert!(quoted_segments("don't forget Mike's birthday").is_empty());
    }

    #[test]
    fn test_strip_quoted() {
        let stripped = strip_quoted(r#"create memory "Search tips" "find things""#);
        assert!(!stripped.contains("Search"));
        assert!(stripped.starts_with("create memory"));
    }

    #[test]
    fn test_limit() {
        assert_eq!(limit("search rust limit 5"), Some(5));
        assert_eq!(limit("show top 3 memories"), Some(3));
        assert_eq!(limit("list memories"), None);
        assert_eq!(limit("limit 0"), None);
        assert_eq!(strip_limit("rust limit 5").trim(), "rust");
    }

    #[test]
    fn test_memory_type() {
        assert_eq!(memory_type("list project memories"), Some("project".into()));
        assert_eq!(memory_type("search docs type: Knowledge"), Some("knowledge".into()));
        assert_eq!(memory_type("search project plans"), None);
    }

    #[test]
    fn test_tags() {
        assert_eq!(tags("remember this #Work #ideas #work"), vec!["work", "ideas"]);
        assert_eq!(tags("save note tags: alpha, beta"), vec!["alpha", "beta"]);
        assert!(tags("nothing here").is_empty());
        assert!(!strip_tags("note #tag body").contains("#tag"));
    }

    #[test]
    fn test_record_id() {
        assert_eq!(
            record_id("delete 3F2504E0-4F89-11D3-9A0C-0305E82C3301 please"),
            Some("3f2504e0-4f89-11d3-9a0c-0305e82c3301".into())
        );
        assert_eq!(record_id("remove memory id: mem_42"), Some("mem_42".into()));
        assert_eq!(record_id("delete memory abc123"), Some("abc123".into()));
        // pure-letter hex words are ordinary English
        assert_eq!(record_id("delete the decade facade"), None);
        assert_eq!(record_id("delete that memory"), None);
    }

    #[test]
    fn test_payment_ids() {
        assert_eq!(payment_id("refund ch_3MmlLrLkdIwHu7ix"), Some("ch_3MmlLrLkdIwHu7ix".into()));
        assert_eq!(customer_id("charge cus_ABC123 $20"), Some("cus_ABC123".into()));
        assert_eq!(payment_id("refund my last order"), None);
    }

    #[test]
    fn test_amount() {
        assert_eq!(amount("charge $20 to cus_1"), Some((20.0, "usd".into())));
        assert_eq!(amount("charge $12.50 eur"), Some((12.5, "eur".into())));
        assert_eq!(amount("bill 15 euros"), Some((15.0, "eur".into())));
        assert_eq!(amount("list charges"), None);
    }

    #[test]
    fn test_derive_title() {
        assert_eq!(derive_title("buy milk and eggs."), "buy milk and eggs");
        let long = "one two three four five six seven eight nine ten";
        assert_eq!(derive_title(long), "one two three four five six seven eight");
    }

    #[test]
    fn test_trim_fillers() {
        let fillers = ["for", "my", "memories"];
        assert_eq!(trim_fillers("for my memories about rust?", &fillers), "about rust");
        assert_eq!(trim_fillers("  for  ", &fillers), "");
    }
}
