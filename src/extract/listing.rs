// src/extract/listing.rs

//! Listing page extraction.

use crate::dom::Page;
use crate::models::CompiledSelectors;
use crate::utils::resolve;

/// One race of the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Position on the page, 0 = first shown
    pub index: usize,
    /// Absolute URL of the full result, when the item links to one
    pub url: Option<String>,
}

/// Races of a listing page in page order (most recent first on the site).
///
/// Items marked as empty results are excluded by the item selector. The
/// result link of an item is the first anchor whose text contains `label`.
pub fn extract_listing(page: &Page, s: &CompiledSelectors, label: &str) -> Vec<ListingEntry> {
    let list = page.find_one(None, &s.time_list);
    let Some(list) = list else {
        log::warn!("No race list found on {}", page.url());
        return Vec::new();
    };

    list.find_many(&s.time_item)
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let url = item
                .find_many(&s.result_link)
                .into_iter()
                .find(|a| a.text().contains(label))
                .and_then(|a| a.attr("href"))
                .map(str::trim)
                .filter(|href| !href.is_empty())
                .and_then(|href| resolve(page.url(), href));
            ListingEntry { index, url }
        })
        .collect()
}
