//! Token-level text helpers shared by the miner, the recognizer and the
//! feature extractor.
//!
//! Tokenization proper belongs to the caller; [`tokenize`] is a minimal
//! word/punctuation splitter good enough for tests and plain-text corpora.

/// Closed-class English words that may sit inside a longform without
/// contributing a letter to the shortform ("Department *of* Energy").
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "from", "in", "into", "of", "on", "or", "the",
    "to", "via", "with", "without",
];

/// Tokens that end a candidate longform window.
const SEPARATORS: &[&str] = &["(", ")", "[", "]", "{", "}", ";", ":", ",", ".", "!", "?"];

/// Tokens that may close a parenthesized shortform: `(ER)`, `(ER;`, `(ER,`.
const PATTERN_CLOSERS: &[&str] = &[")", ";", ","];

pub fn is_stop_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    STOP_WORDS.binary_search(&lower.as_str()).is_ok()
}

pub fn is_separator(token: &str) -> bool {
    SEPARATORS.contains(&token)
}

/// A token with at least one letter or digit.
pub fn is_word(token: &str) -> bool {
    token.chars().any(char::is_alphanumeric)
}

/// Split text into word tokens and single-character punctuation tokens.
///
/// Hyphens and apostrophes inside a word stay part of it, so `IL-6` and
/// `Toll-like` survive as one token.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if c.is_alphanumeric() || ((c == '-' || c == '\'') && !current.is_empty()) {
            current.push(c);
            continue;
        }
        if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        if !c.is_whitespace() {
            tokens.push(c.to_string());
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Case-fold, replace every non-alphanumeric character with a space and
/// collapse whitespace. `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    // Fold first: some lowercase mappings emit combining marks.
    let folded: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let mut out = String::with_capacity(folded.len());
    for word in folded.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Tokens within `radius` positions of `offset`, clamped to the sequence.
///
/// An offset past the end has no context and yields an empty slice.
pub fn context_window(tokens: &[String], offset: usize, radius: usize) -> &[String] {
    if offset >= tokens.len() {
        return &[];
    }
    let start = offset.saturating_sub(radius);
    let end = offset.saturating_add(radius).saturating_add(1).min(tokens.len());
    &tokens[start..end]
}

/// Offsets of every token equal to `shortform`.
pub fn find_occurrences(tokens: &[String], shortform: &str) -> Vec<usize> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.as_str() == shortform)
        .map(|(i, _)| i)
        .collect()
}

/// Offsets where `shortform` appears as a defining pattern, i.e. wrapped as
/// `( SF )` right after its would-be longform.
pub fn defining_pattern_offsets(tokens: &[String], shortform: &str) -> Vec<usize> {
    find_occurrences(tokens, shortform)
        .into_iter()
        .filter(|&i| {
            i >= 2
                && tokens[i - 1] == "("
                && tokens
                    .get(i + 1)
                    .map(|t| PATTERN_CLOSERS.contains(&t.as_str()))
                    .unwrap_or(false)
        })
        .collect()
}

/// Start of the candidate window preceding the `(` at `paren`: at most
/// `max_tokens` word tokens, stopping early at the first separator.
pub fn candidate_window_start(tokens: &[String], paren: usize, max_tokens: usize) -> usize {
    let mut start = paren;
    let mut taken = 0;
    while start > 0 && taken < max_tokens {
        let token = &tokens[start - 1];
        if is_separator(token) {
            break;
        }
        start -= 1;
        if is_word(token) {
            taken += 1;
        }
    }
    // A window never begins with punctuation.
    while start < paren && !is_word(&tokens[start]) {
        start += 1;
    }
    start
}
