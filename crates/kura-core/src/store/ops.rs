//! Non-destructive list transformations. Each returns a fresh list that the
//! caller hands straight to the store.

use tracing::warn;

/// Entries addressed by a string id.
pub trait Identified {
    fn id(&self) -> &str;
}

pub fn appended<T: Clone>(items: &[T], item: T) -> Vec<T> {
    let mut next = Vec::with_capacity(items.len() + 1);
    next.extend_from_slice(items);
    next.push(item);
    next
}

/// Replace the entry whose id matches. When nothing matches the result equals
/// the input.
pub fn updated_by_id<T, F>(items: &[T], id: &str, update: F) -> Vec<T>
where
    T: Identified + Clone,
    F: Fn(&T) -> T,
{
    items
        .iter()
        .map(|item| if item.id() == id { update(item) } else { item.clone() })
        .collect()
}

/// Drop every entry whose id matches.
pub fn removed_by_id<T: Identified + Clone>(items: &[T], id: &str) -> Vec<T> {
    items.iter().filter(|item| item.id() != id).cloned().collect()
}

/// Positional update for entries without an id. Out of range is a no-op.
pub fn updated_at<T, F>(items: &[T], index: usize, update: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> T,
{
    items
        .iter()
        .enumerate()
        .map(|(i, item)| if i == index { update(item) } else { item.clone() })
        .collect()
}

pub fn removed_at<T: Clone>(items: &[T], index: usize) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, item)| item.clone())
        .collect()
}

/// Every entry needs an id. Colliding ids are tolerated: the list is kept
/// as stored and the collision is only logged.
pub fn check_ids<T: Identified>(items: &[T]) -> Result<(), String> {
    let mut seen = std::collections::HashSet::with_capacity(items.len());
    for item in items {
        let id = item.id();
        if id.is_empty() {
            return Err("entry with empty id".to_string());
        }
        if !seen.insert(id) {
            warn!(id, "Duplicate id in stored list");
        }
    }
    Ok(())
}
