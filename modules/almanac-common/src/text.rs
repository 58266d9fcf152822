use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Full month names for display labels.
pub const MONTHS_FULL: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Lowercase month names for date-phrase parsing.
pub const MONTHS_LOWER: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// Soft character budget for item summaries.
pub const SUMMARY_MAX: usize = 560;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static PARENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\(.*?\)\s*").unwrap());

static KNOWN_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:birthday of|birth of|death of|event:|launch of|founding of|start of|independence of|assassination of|treaty of|victory:|swearing-in/election of|major event:)\s+",
    )
    .unwrap()
});

/// Zero-padded ISO date string from calendar parts.
pub fn to_iso(year: i32, month: u32, day: u32) -> String {
    format!("{year:04}-{month:02}-{day:02}")
}

/// Normalize text for fuzzy matching: lowercase, punctuation to
/// spaces, whitespace collapsed.
pub fn norm(s: &str) -> String {
    let lowered = s.to_lowercase();
    let replaced: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove HTML tags, keeping text content.
pub fn strip_html(s: &str) -> String {
    TAG_RE.replace_all(s, "").trim().to_string()
}

/// Remove parenthetical segments.
pub fn strip_parens(s: &str) -> String {
    PARENS_RE.replace_all(s, " ").trim().to_string()
}

/// Remove rewritten-title prefixes like "Birthday of" or "Event:".
/// Repeat-safe: strips stacked prefixes until none remain.
pub fn strip_known_prefixes(s: &str) -> String {
    let mut out = strip_parens(s);
    loop {
        let stripped = KNOWN_PREFIX_RE.replace(&out, "").trim().to_string();
        if stripped == out {
            return out;
        }
        out = stripped;
    }
}

fn tokens(s: &str) -> HashSet<String> {
    norm(s)
        .split(' ')
        .filter(|t| t.len() > 2)
        .map(str::to_string)
        .collect()
}

/// Token Jaccard similarity, ignoring tokens of two characters or
/// fewer.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let ta = tokens(a);
    let tb = tokens(b);
    let inter = ta.intersection(&tb).count();
    let union = ta.len() + tb.len() - inter;
    if union == 0 {
        return 0.0;
    }
    inter as f64 / union as f64
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    idx = idx.min(s.len());
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Trim text to the soft summary budget, preferring a sentence break.
pub fn trim_summary(text: &str) -> String {
    trim_summary_to(text, SUMMARY_MAX)
}

/// Trim text to `max` characters with a soft sentence break. Falls
/// back to a hard cut when no break lands late enough to keep a
/// meaningful prefix.
pub fn trim_summary_to(text: &str, max: usize) -> String {
    let clean = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if clean.len() <= max {
        return clean;
    }

    let near_end = &clean[..floor_char_boundary(&clean, max.saturating_sub(30))];
    let mid = &clean[..floor_char_boundary(&clean, max * 7 / 10)];
    let soft = near_end.rfind(". ").or_else(|| mid.rfind(". "));

    match soft {
        Some(idx) if idx > 80 => clean[..=idx].to_string(),
        _ => clean[..floor_char_boundary(&clean, max)].to_string(),
    }
}
