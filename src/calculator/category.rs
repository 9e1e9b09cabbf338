/// Entries shorter than this are matched literally only.
const MIN_STEM_CHARS: usize = 3;

/// Case-insensitive check of `category` against a blocked list.
///
/// An entry blocks the category when the category contains it, or when a
/// word of the category starts with the entry's stem (the entry minus its
/// last character), so "игры" also blocks "Игровая консоль".
pub fn is_category_blocked<S: AsRef<str>>(category: &str, blocked: &[S]) -> bool {
    let category = category.trim().to_lowercase();
    if category.is_empty() {
        return false;
    }
    blocked
        .iter()
        .map(|entry| entry.as_ref().trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .any(|entry| category.contains(&entry) || matches_stem(&category, &entry))
}

fn matches_stem(category: &str, entry: &str) -> bool {
    let chars = entry.chars().count();
    if chars <= MIN_STEM_CHARS {
        return false;
    }
    let stem: String = entry.chars().take(chars - 1).collect();
    category
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word.starts_with(&stem))
}
