use crate::model::de;
use crate::{MergedEntry, Pointer, PostId};
use serde::{Deserialize, Serialize};

/// A completed drag reported by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEvent {
    pub source_index: usize,
    /// `None` when the item was dropped outside the list.
    #[serde(default)]
    pub destination_index: Option<usize>,
    #[serde(deserialize_with = "de::id")]
    pub draggable_id: PostId,
}

impl DragEvent {
    pub fn new(source_index: usize, destination_index: Option<usize>, draggable_id: PostId) -> Self {
        Self { source_index, destination_index, draggable_id }
    }
}

/// Recompute pointers after moving one entry of the displayed sequence.
///
/// Every entry that was already pinned, plus the dragged one, becomes a pointer
/// at its index in the moved sequence. Returns `None` for a cancelled drop, an
/// out-of-range index, or an event whose dragged id no longer sits at
/// `source_index`; callers keep their pointers unchanged in that case.
pub fn reorder(merged: &[MergedEntry], event: &DragEvent) -> Option<Vec<Pointer>> {
    let destination = event.destination_index?;
    if event.source_index >= merged.len() || destination >= merged.len() {
        tracing::debug!(source = event.source_index, destination, len = merged.len(), "drag out of bounds, ignoring");
        return None;
    }
    if merged[event.source_index].id() != event.draggable_id {
        tracing::debug!(source = event.source_index, draggable_id = event.draggable_id, "drag does not match displayed entry, ignoring");
        return None;
    }

    let mut items: Vec<&MergedEntry> = merged.iter().collect();
    let moved = items.remove(event.source_index);
    items.insert(destination, moved);

    let pointers = items
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.is_pinned() || entry.id() == event.draggable_id)
        .map(|(index, entry)| Pointer::new(entry.id(), index + 1))
        .collect();
    Some(pointers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{merge, Post};
    use std::collections::HashMap;

    fn defaults() -> Vec<Post> { vec![Post::new(1, "A"), Post::new(2, "B"), Post::new(3, "C")] }

    #[test]
    fn dragging_a_pointer_renumbers_it() {
        let merged = merge(&defaults(), &[Pointer::new(3, 1)], &HashMap::new());
        let pointers = reorder(&merged, &DragEvent::new(0, Some(2), 3)).unwrap();
        assert_eq!(pointers, vec![Pointer::new(3, 3)]);

        let remerged = merge(&defaults(), &pointers, &HashMap::new());
        let ids: Vec<_> = remerged.iter().map(MergedEntry::id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn dragging_a_default_pins_only_that_entry() {
        let merged = merge(&defaults(), &[], &HashMap::new());
        let pointers = reorder(&merged, &DragEvent::new(2, Some(0), 3)).unwrap();
        assert_eq!(pointers, vec![Pointer::new(3, 1)]);
    }

    #[test]
    fn shifted_defaults_stay_unpinned() {
        let merged = merge(&defaults(), &[Pointer::new(9, 3)], &HashMap::new());
        // [1, 2, 9, 3] -> drag 1 to the end -> [2, 9, 3, 1]
        let pointers = reorder(&merged, &DragEvent::new(0, Some(3), 1)).unwrap();
        assert_eq!(pointers, vec![Pointer::new(9, 2), Pointer::new(1, 4)]);
    }

    #[test]
    fn cancelled_and_malformed_drops_are_ignored() {
        let merged = merge(&defaults(), &[], &HashMap::new());
        assert_eq!(reorder(&merged, &DragEvent::new(0, None, 1)), None);
        assert_eq!(reorder(&merged, &DragEvent::new(5, Some(0), 1)), None);
        assert_eq!(reorder(&merged, &DragEvent::new(0, Some(3), 1)), None);
        assert_eq!(reorder(&merged, &DragEvent::new(0, Some(1), 2)), None);
    }

    #[test]
    fn decodes_presentation_event() {
        let event: DragEvent = serde_json::from_str(r#"{"source_index": 1, "destination_index": null, "draggable_id": "4"}"#).unwrap();
        assert_eq!(event, DragEvent::new(1, None, 4));
    }
}
