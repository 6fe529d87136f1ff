// Text Normalization Service
// Optional pre-step before encoding: lowercase, strip non-letters,
// remove stop words, reduce surviving tokens to their lemma.

use regex::Regex;
use std::collections::HashSet;

/// Fixed English stop-word set, frozen at compile time.
static STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and",
    "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "did", "do", "does", "doing", "down",
    "during", "each", "few", "for", "from", "further", "had", "has", "have",
    "having", "he", "her", "here", "hers", "herself", "him", "himself", "his",
    "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on",
    "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over",
    "own", "same", "she", "should", "so", "some", "such", "than", "that", "the",
    "their", "theirs", "them", "themselves", "then", "there", "these", "they",
    "this", "those", "through", "to", "too", "under", "until", "up", "very",
    "was", "we", "were", "what", "when", "where", "which", "while", "who",
    "whom", "why", "will", "with", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Irregular noun plurals not covered by the suffix rules.
static IRREGULAR_LEMMAS: &[(&str, &str)] = &[
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("people", "person"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
];

/// Reduce a lowercase token to its dictionary lemma (noun inflections only).
pub fn lemmatize(token: &str) -> String {
    for (plural, lemma) in IRREGULAR_LEMMAS {
        if token == *plural {
            return (*lemma).to_string();
        }
    }

    let n = token.len();
    if n > 4 && token.ends_with("ies") {
        return format!("{}y", &token[..n - 3]);
    }
    if n > 4 && (token.ends_with("sses") || token.ends_with("xes") || token.ends_with("zzes")
        || token.ends_with("ches") || token.ends_with("shes"))
    {
        return token[..n - 2].to_string();
    }
    if n > 3
        && token.ends_with('s')
        && !token.ends_with("ss")
        && !token.ends_with("us")
        && !token.ends_with("is")
    {
        return token[..n - 1].to_string();
    }

    token.to_string()
}

/// Normalize raw text: lowercase, replace every non-letter with a space,
/// drop stop words, lemmatize the rest, rejoin with single spaces.
///
/// Pure function of the input; an empty result is valid and means the
/// message had no usable words.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let letters_only = Regex::new(r"[^A-Za-z]").unwrap();
    let cleaned = letters_only.replace_all(text, " ").to_lowercase();

    let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();

    cleaned
        .split_whitespace()
        .filter(|token| !stop_words.contains(token))
        .map(lemmatize)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_stays_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_non_letters_become_spaces() {
        assert_eq!(normalize("win $1000 today!!!"), "win today");
    }

    #[test]
    fn test_lowercases_and_drops_stop_words() {
        assert_eq!(normalize("You have WON the prize"), "won prize");
    }

    #[test]
    fn test_lemmatizes_plurals() {
        assert_eq!(normalize("prizes winners"), "prize winner");
        assert_eq!(lemmatize("ladies"), "lady");
        assert_eq!(lemmatize("boxes"), "box");
        assert_eq!(lemmatize("children"), "child");
    }

    #[test]
    fn test_short_and_protected_suffixes_untouched() {
        assert_eq!(lemmatize("is"), "is");
        assert_eq!(lemmatize("class"), "class");
        assert_eq!(lemmatize("bonus"), "bonus");
        assert_eq!(lemmatize("basis"), "basis");
    }

    #[test]
    fn test_all_stop_words_yields_empty() {
        assert_eq!(normalize("you are the only one for me"), "one");
        assert_eq!(normalize("to be or not to be"), "");
    }
}
