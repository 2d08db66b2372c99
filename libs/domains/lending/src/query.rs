use crate::models::{Item, SearchQuery};

/// Filter `catalog` by text, category and owner, keeping catalog order.
///
/// Text matches case-insensitively against name or description; blank text
/// matches every item.
pub fn search<'a, I>(catalog: I, query: &SearchQuery) -> Vec<Item>
where
    I: IntoIterator<Item = &'a Item>,
{
    let needle = query.text.trim().to_lowercase();

    catalog
        .into_iter()
        .filter(|item| matches_text(item, &needle))
        .filter(|item| query.category.matches(item.category))
        .filter(|item| query.exclude_owner != Some(item.owner_id))
        .cloned()
        .collect()
}

fn matches_text(item: &Item, needle: &str) -> bool {
    needle.is_empty()
        || item.name.to_lowercase().contains(needle)
        || item.description.to_lowercase().contains(needle)
}
