//! Watermark filter

use lookout_core::domain::item::Item;
use lookout_core::domain::watermark::Watermark;

/// Items newer than the watermark, and where the watermark moves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// New items, ascending by id, one per id
    pub items: Vec<Item>,
    /// `max(watermark, highest new id)`
    pub next_watermark: Watermark,
}

/// Keeps only items with an id strictly greater than `watermark`
///
/// Filtering is idempotent: running the same candidates again against the
/// returned `next_watermark` yields nothing.
pub fn filter_new_items(
    watermark: Watermark,
    candidates: impl IntoIterator<Item = Item>,
) -> FilterOutcome {
    let mut items: Vec<Item> = candidates
        .into_iter()
        .filter(|item| watermark.admits(item.id))
        .collect();

    items.sort_by_key(|item| item.id);
    items.dedup_by_key(|item| item.id);

    let next_watermark = items
        .last()
        .map_or(watermark, |newest| watermark.advance_to(newest.id));

    FilterOutcome {
        items,
        next_watermark,
    }
}
