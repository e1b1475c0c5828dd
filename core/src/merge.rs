use crate::{Pointer, Post, PostId};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// How pinned entries relate to the default results they were merged into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinOrigin {
    /// Also present in the default results, moved to a new spot.
    ReorderedDefault,
    /// Added by hand from the candidate search.
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MergedEntry {
    Default { post: Post },
    /// `post` is `None` when the pinned post has not been fetched in this session.
    Pinned { pointer: Pointer, post: Option<Post>, origin: PinOrigin },
}

impl MergedEntry {
    pub fn id(&self) -> PostId {
        match self {
            Self::Default { post } => post.id,
            Self::Pinned { pointer, .. } => pointer.id,
        }
    }

    pub fn is_pinned(&self) -> bool { matches!(self, Self::Pinned { .. }) }

    pub fn post(&self) -> Option<&Post> {
        match self {
            Self::Default { post } => Some(post),
            Self::Pinned { post, .. } => post.as_ref(),
        }
    }
}

/// The order in which pointers are applied during a merge.
///
/// Insertion happens against the sequence as it stands after every earlier
/// pointer, so the two orders can disagree when stored order and position
/// order diverge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerOrder {
    #[default]
    Stored,
    ByPosition,
}

impl PointerOrder {
    pub fn arrange<'a>(&self, pointers: &'a [Pointer]) -> Cow<'a, [Pointer]> {
        match self {
            Self::Stored => Cow::Borrowed(pointers),
            Self::ByPosition => {
                let mut sorted = pointers.to_vec();
                sorted.sort_by_key(|p| p.position);
                Cow::Owned(sorted)
            }
        }
    }
}

impl FromStr for PointerOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stored" => Ok(Self::Stored),
            "position" | "by-position" | "by_position" => Ok(Self::ByPosition),
            other => Err(format!("unknown pointer order '{other}', expected 'stored' or 'position'")),
        }
    }
}

/// Merge default results with pointers, applying pointers in stored order.
pub fn merge(defaults: &[Post], pointers: &[Pointer], known: &HashMap<PostId, Post>) -> Vec<MergedEntry> {
    merge_with(PointerOrder::Stored, defaults, pointers, known)
}

/// Merge default results with pointers.
///
/// Every default entry sharing an id with a pointer is evicted first. Pointers
/// are then inserted one by one at `position - 1` of the working sequence,
/// clamped to its length. Pinned posts resolve through `known` first, then
/// through `defaults`.
pub fn merge_with(
    order: PointerOrder,
    defaults: &[Post],
    pointers: &[Pointer],
    known: &HashMap<PostId, Post>,
) -> Vec<MergedEntry> {
    let defaults_by_id: HashMap<PostId, &Post> = defaults.iter().map(|p| (p.id, p)).collect();
    let pinned: HashSet<PostId> = pointers.iter().map(|p| p.id).collect();
    // Evicting up front keeps a later duplicate from shifting an earlier insertion.
    let mut merged: Vec<MergedEntry> = defaults
        .iter()
        .filter(|post| !pinned.contains(&post.id))
        .cloned()
        .map(|post| MergedEntry::Default { post })
        .collect();

    for pointer in order.arrange(pointers).iter() {
        let default = defaults_by_id.get(&pointer.id).copied();
        let post = known.get(&pointer.id).or(default).cloned();
        let origin = if default.is_some() { PinOrigin::ReorderedDefault } else { PinOrigin::Custom };

        let at = pointer.position.saturating_sub(1).min(merged.len());
        merged.insert(at, MergedEntry::Pinned { pointer: *pointer, post, origin });
    }

    merged
}
