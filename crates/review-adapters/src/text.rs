//! Utilidades de texto: normalización y stopwords.
use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Stopwords en inglés (lista corta, sin dependencias externas).
pub static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are", "as", "at", "be",
        "because", "been", "before", "being", "below", "between", "both", "but", "by", "can", "did", "do", "does",
        "doing", "down", "during", "each", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her",
        "here", "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself",
        "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or",
        "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should", "so", "some", "such", "than",
        "that", "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those",
        "through", "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
        "while", "who", "whom", "why", "will", "with", "you", "your", "yours", "yourself", "yourselves",
    ].into_iter()
     .collect()
});

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Tokens separados por espacios.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

pub fn remove_nonascii(text: &str) -> String {
    text.chars().filter(char::is_ascii).collect()
}

/// Reemplaza puntuación (y `_`) por espacios.
pub fn remove_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect()
}

pub fn remove_stopwords(text: &str) -> String {
    tokens(text).filter(|t| !is_stopword(&t.to_lowercase())).collect::<Vec<_>>().join(" ")
}

pub fn remove_short(text: &str, min_len: usize) -> String {
    tokens(text).filter(|t| t.chars().count() >= min_len).collect::<Vec<_>>().join(" ")
}

/// Colapsa espacios repetidos.
pub fn squash(text: &str) -> String {
    tokens(text).collect::<Vec<_>>().join(" ")
}
