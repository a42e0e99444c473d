use std::sync::OnceLock;

use regex::Regex;

pub const EMPTY_SUMMARY: &str = "No description provided";

// ASCII word boundaries: a letter like `ñ` does not glue onto a filler word.
const FILLER_PATTERN: &str = r"(?i)(?-u:\b)(?:very|really|quite|just|please|kindly)(?-u:\b)";
const MAX_WORDS: usize = 25;
const TRUNCATED_WORDS: usize = 20;
const MIN_WORDS: usize = 5;
const ELLIPSIS: &str = "...";

fn filler_words() -> &'static Regex {
    static FILLER: OnceLock<Regex> = OnceLock::new();
    FILLER.get_or_init(|| Regex::new(FILLER_PATTERN).expect("filler pattern compiles"))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Span from the start up to and including the first `.`, `!` or `?`.
///
/// Text that opens with a terminator has no leading sentence.
fn first_sentence(text: &str) -> Option<&str> {
    let end = text.find(['.', '!', '?'])?;
    if end == 0 {
        return None;
    }
    Some(text[..=end].trim())
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Produce a short, capitalised summary of a complaint description.
///
/// Filler words are dropped and only the first sentence is kept. Long results are cut to twenty
/// words; results under five words fall back to the raw description (up to twenty-five words),
/// discarding the filler removal and sentence isolation.
pub fn summarize(description: &str) -> String {
    if description.trim().is_empty() {
        return EMPTY_SUMMARY.to_string();
    }

    let normalized = collapse_whitespace(description);
    let without_filler = filler_words().replace_all(&normalized, "");
    let mut text = collapse_whitespace(&without_filler);

    if let Some(sentence) = first_sentence(&text) {
        text = sentence.to_string();
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > MAX_WORDS {
        text = format!("{}{ELLIPSIS}", words[..TRUNCATED_WORDS].join(" "));
    } else if words.len() < MIN_WORDS {
        let original: Vec<&str> = description.split_whitespace().collect();
        let kept = original.len().min(MAX_WORDS);
        text = original[..kept].join(" ");
        if original.len() > MAX_WORDS {
            text.push_str(ELLIPSIS);
        }
    }

    capitalize_first(&text)
}
