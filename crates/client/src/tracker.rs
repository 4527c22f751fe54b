//! Client-side accumulation of unsaved remark edits for the displayed page.

use review_common::{CatalogProduct, RemarkEdit, RemarkSet, RemarkTag};
use std::collections::HashMap;

/// The edited flag/remark state of one product.
///
/// `is_flagged` is always `!remarks.is_empty()`; the fields are private so
/// that the relation cannot be broken from outside.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingEdit {
    is_flagged: bool,
    remarks: RemarkSet,
}

impl PendingEdit {
    fn from_remarks(remarks: RemarkSet) -> Self {
        Self {
            is_flagged: !remarks.is_empty(),
            remarks,
        }
    }

    pub fn is_flagged(&self) -> bool {
        self.is_flagged
    }

    pub fn remarks(&self) -> &RemarkSet {
        &self.remarks
    }

    pub fn has(&self, tag: RemarkTag) -> bool {
        self.remarks.contains(tag)
    }
}

#[derive(Debug, Default)]
pub struct RemarkTracker {
    edits: HashMap<i64, PendingEdit>,
    dirty: bool,
}

impl RemarkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all tracked state with what the server returned for `products`.
    /// Remarks stored against an unflagged product are stale and not carried over.
    pub fn seed(&mut self, products: &[CatalogProduct]) {
        self.edits = products
            .iter()
            .map(|product| {
                let remarks = if product.is_flagged {
                    RemarkSet::from_storage(product.remarks.as_deref())
                } else {
                    RemarkSet::new()
                };
                (product.product_id, PendingEdit::from_remarks(remarks))
            })
            .collect();
        self.dirty = false;
    }

    /// Sets or clears one tag and recomputes the product's flag.
    ///
    /// Only products from the last `seed` can be edited; any other id is
    /// ignored and yields `None`.
    pub fn toggle(
        &mut self,
        product_id: i64,
        tag: RemarkTag,
        checked: bool,
    ) -> Option<&PendingEdit> {
        let entry = self.edits.get_mut(&product_id)?;
        let mut remarks = std::mem::take(&mut entry.remarks);
        if checked {
            remarks.insert(tag);
        } else {
            remarks.remove(tag);
        }
        *entry = PendingEdit::from_remarks(remarks);
        self.dirty = true;
        Some(entry)
    }

    /// Flips a tag the way a checkbox click does.
    pub fn flip(&mut self, product_id: i64, tag: RemarkTag) -> Option<&PendingEdit> {
        let checked = !self.edits.get(&product_id)?.has(tag);
        self.toggle(product_id, tag, checked)
    }

    pub fn is_tracked(&self, product_id: i64) -> bool {
        self.edits.contains_key(&product_id)
    }

    pub fn get(&self, product_id: i64) -> PendingEdit {
        self.edits.get(&product_id).cloned().unwrap_or_default()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Flagged entries only, ordered by product id. Unflagged entries have nothing to persist.
    pub fn commit_selection(&self) -> Vec<RemarkEdit> {
        let mut selection: Vec<RemarkEdit> = self
            .edits
            .iter()
            .filter(|(_, edit)| edit.is_flagged)
            .map(|(product_id, edit)| RemarkEdit {
                product_id: *product_id,
                is_flagged: edit.is_flagged,
                remarks: edit.remarks.to_strings(),
            })
            .collect();
        selection.sort_by_key(|edit| edit.product_id);
        selection
    }
}
