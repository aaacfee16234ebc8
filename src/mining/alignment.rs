use crate::document::text::{is_stop_word, is_word};

/// Upper bound on search steps for one occurrence. Windows are capped at
/// `2 * len + K` words, so this is only hit by pathological shortforms.
const MAX_STEPS: usize = 20_000;

/// Align the shortform `letters` right-to-left against the words of a
/// candidate window, returning the index of the leftmost word of the
/// aligned span.
///
/// Each non-stop word in the span consumes its initial letter and may also
/// consume further letters that appear in order later in the same word
/// (`deoxyribonucleic` covers both `d` and `n` of `DNA`). Stop words and
/// punctuation may be skipped without consuming. The leftmost word always
/// consumes. Returns `None` when no alignment exists.
pub fn align(letters: &[char], window: &[String]) -> Option<usize> {
    if letters.is_empty() || window.is_empty() {
        return None;
    }
    let words: Vec<Vec<char>> = window
        .iter()
        .map(|w| w.chars().flat_map(char::to_lowercase).collect())
        .collect();
    let skippable: Vec<bool> = window
        .iter()
        .map(|w| !is_word(w) || is_stop_word(w))
        .collect();

    let mut steps = 0;
    search(letters, &words, &skippable, letters.len(), words.len(), &mut steps)
}

/// `remaining`: letters[..remaining] still unmatched.
/// `end`: words[..end] still available.
fn search(
    letters: &[char],
    words: &[Vec<char>],
    skippable: &[bool],
    remaining: usize,
    end: usize,
    steps: &mut usize,
) -> Option<usize> {
    *steps += 1;
    if end == 0 || *steps > MAX_STEPS {
        return None;
    }
    let i = end - 1;
    let word = &words[i];
    let last = remaining - 1;

    if let Some(&initial) = word.first() {
        // Fewest letters first: j == last consumes a single letter.
        for j in (0..=last).rev() {
            if initial != letters[j] || !is_subsequence(&letters[j + 1..=last], &word[1..]) {
                continue;
            }
            if j == 0 {
                return Some(i);
            }
            if let Some(start) = search(letters, words, skippable, j, i, steps) {
                return Some(start);
            }
        }
    }

    if skippable[i] {
        return search(letters, words, skippable, remaining, i, steps);
    }
    None
}

fn is_subsequence(needle: &[char], haystack: &[char]) -> bool {
    let mut hay = haystack.iter();
    needle.iter().all(|n| hay.any(|h| h == n))
}
