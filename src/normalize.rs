use unicode_normalization::UnicodeNormalization;

/// Normalize a certificate name for comparison.
///
/// NFKC-folds the input, lowercases it, and collapses separator characters
/// into single spaces, so "B-VCA", "b vca" and "ＢＶＣＡ" compare equal-ish.
/// Returns an empty string for inputs with no comparable tokens.
pub fn normalize_name(raw: &str) -> String {
    let folded: String = raw.nfkc().collect::<String>().to_lowercase();
    folded
        .split(|c: char| {
            c.is_whitespace() || matches!(c, '-' | '_' | '.' | '/' | '(' | ')' | ',')
        })
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Substring containment in either direction between two normalized names.
///
/// This is the equivalence rule the catalog uses for alias matching. It is
/// deliberately loose; a short alias can match inside an unrelated longer
/// name, so aliases in the catalog are kept specific enough to avoid that.
pub fn names_overlap(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}
