//! Word statistics reported after a revision.

/// Counts whitespace-separated words.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Share of word positions that differ between `original` and `polished`,
/// as a rounded percentage of the original word count capped at 100.
///
/// Words are compared position by position across the longer of the two
/// texts. An empty original yields 0.
#[must_use]
pub fn improvement_percent(original: &str, polished: &str) -> usize {
    let original_words: Vec<&str> = original.split_whitespace().collect();
    let polished_words: Vec<&str> = polished.split_whitespace().collect();
    let total = original_words.len();
    let positions = total.max(polished_words.len());

    let changed = (0..positions)
        .filter(|&position| original_words.get(position) != polished_words.get(position))
        .count();

    let doubled_total = total.saturating_mul(2);
    changed
        .saturating_mul(200)
        .saturating_add(total)
        .checked_div(doubled_total)
        .map_or(0, |percent| percent.min(100))
}
