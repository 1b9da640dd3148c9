//! Tag name → assets carrying it.

use rustc_hash::FxHashMap;

use super::asset::Asset;

/// Indices into the resolved asset list, grouped by tag in catalog order.
#[derive(Debug, Default)]
pub struct TagIndex {
    by_tag: FxHashMap<String, Vec<usize>>,
}

impl TagIndex {
    pub fn build(assets: &[Asset]) -> Self {
        let mut by_tag: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        for (index, asset) in assets.iter().enumerate() {
            for tag in &asset.tags {
                let entries = by_tag.entry(tag.clone()).or_default();
                // A record listing the same tag twice still counts once
                if entries.last() != Some(&index) {
                    entries.push(index);
                }
            }
        }
        Self { by_tag }
    }

    /// Assets carrying `tag`, in catalog order.
    pub fn get(&self, tag: &str) -> &[usize] {
        self.by_tag.get(tag).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}
