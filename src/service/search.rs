use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Characters of `letters` that occur in `phrase`. Case-sensitive.
pub fn search_letters(phrase: &str, letters: &str) -> BTreeSet<char> {
    let wanted: BTreeSet<char> = letters.chars().collect();
    phrase.chars().filter(|c| wanted.contains(c)).collect()
}

/// Render a result set in sorted set-literal form: `{'a', 'b'}`, or `set()` when empty.
pub fn format_results(found: &BTreeSet<char>) -> String {
    if found.is_empty() {
        return "set()".to_string();
    }
    let mut out = String::from("{");
    for (i, c) in found.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "'{}'", c.escape_default());
    }
    out.push('}');
    out
}
