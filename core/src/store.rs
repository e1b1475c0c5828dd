use crate::{reorder, DragEvent, MergedEntry, Pointer, PostId, StoreError};
use std::collections::HashSet;

/// The manual overrides for the current query, in stored order.
///
/// Stored order matters: the merge applies pointers in this order. No two
/// pointers share a post id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerStore {
    pointers: Vec<Pointer>,
}

impl PointerStore {
    pub fn new(pointers: Vec<Pointer>) -> Self {
        let mut store = Self::default();
        store.replace_all(pointers);
        store
    }

    pub fn as_slice(&self) -> &[Pointer] { &self.pointers }
    pub fn len(&self) -> usize { self.pointers.len() }
    pub fn is_empty(&self) -> bool { self.pointers.is_empty() }
    pub fn contains(&self, id: PostId) -> bool { self.pointers.iter().any(|p| p.id == id) }
    pub fn ids(&self) -> HashSet<PostId> { self.pointers.iter().map(|p| p.id).collect() }

    /// Pin `id` just past the end of a merged view of length `merged_len`.
    pub fn add(&mut self, id: PostId, merged_len: usize) -> Result<Pointer, StoreError> {
        if self.contains(id) {
            return Err(StoreError::AlreadyPinned(id));
        }
        let pointer = Pointer::new(id, merged_len + 1);
        self.pointers.push(pointer);
        tracing::debug!(id, position = pointer.position, "pointer added");
        Ok(pointer)
    }

    /// Remove an exact pointer. Remaining positions are left as they are.
    pub fn remove(&mut self, pointer: &Pointer) -> bool {
        let before = self.pointers.len();
        self.pointers.retain(|p| p != pointer);
        before != self.pointers.len()
    }

    pub fn remove_id(&mut self, id: PostId) -> Option<Pointer> {
        let idx = self.pointers.iter().position(|p| p.id == id)?;
        let removed = self.pointers.remove(idx);
        tracing::debug!(id, position = removed.position, "pointer removed");
        Some(removed)
    }

    /// Bulk replace. A repeated id keeps its first occurrence.
    pub fn replace_all(&mut self, pointers: Vec<Pointer>) {
        let mut seen = HashSet::new();
        self.pointers = pointers
            .into_iter()
            .filter(|p| {
                let fresh = seen.insert(p.id);
                if !fresh {
                    tracing::warn!(id = p.id, "dropping duplicate pointer");
                }
                fresh
            })
            .collect();
    }

    /// Apply a completed drag on `merged`. Returns false when the event was ignored.
    pub fn apply_reorder(&mut self, merged: &[MergedEntry], event: &DragEvent) -> bool {
        match reorder(merged, event) {
            Some(pointers) => {
                tracing::info!(
                    from = event.source_index,
                    to = ?event.destination_index,
                    id = event.draggable_id,
                    pointers = pointers.len(),
                    "pointers reordered"
                );
                self.pointers = pointers;
                true
            }
            None => false,
        }
    }
}
