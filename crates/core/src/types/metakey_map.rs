//! Product title to metakey mapping (tab 3).

use std::collections::HashMap;

/// Mapping from product title to the ordered metakeys that should be set
/// on that product.
///
/// Built from the fourth spreadsheet tab: each row's title cell may hold
/// several comma-separated titles, all of which receive the row's metakey.
/// Rows append in order; a title appearing on several rows accumulates
/// keys rather than overwriting.
#[derive(Debug, Clone, Default)]
pub struct MetakeyMap {
    entries: HashMap<String, Vec<String>>,
}

impl MetakeyMap {
    /// Build the map from `(product_title, metakey)` row pairs.
    ///
    /// Rows without a title are ignored. Titles are split on commas and
    /// trimmed before insertion.
    #[must_use]
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (Option<String>, Option<String>)>,
    {
        let mut map = Self::default();
        for (title, metakey) in rows {
            let Some(title) = title else { continue };
            let Some(metakey) = metakey else { continue };
            for part in title.split(',') {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }
                map.entries
                    .entry(part.to_string())
                    .or_default()
                    .push(metakey.clone());
            }
        }
        map
    }

    /// Metakeys for an exact product title, in row order.
    #[must_use]
    pub fn keys_for(&self, title: &str) -> &[String] {
        self.entries.get(title).map_or(&[], Vec::as_slice)
    }

    /// Number of distinct titles in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no titles at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
