use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub type PostId = u64;

/// A read-only record as returned by the preview and search endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(alias = "ID", deserialize_with = "de::id")]
    pub id: PostId,
    #[serde(alias = "post_title", default)]
    pub title: String,
    /// Remaining display attributes, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Post {
    pub fn new(id: PostId, title: impl Into<String>) -> Self {
        Self { id, title: title.into(), extra: Map::new() }
    }
}

/// Pins post `id` at the 1-based `position` of the merged sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pointer {
    #[serde(alias = "ID", deserialize_with = "de::id")]
    pub id: PostId,
    #[serde(alias = "order", deserialize_with = "de::position")]
    pub position: usize,
}

impl Pointer {
    pub fn new(id: PostId, position: usize) -> Self { Self { id, position } }
}

pub(crate) mod de {
    use super::*;
    use serde::de::Error;

    // The host emits ids and positions both as numbers and as numeric strings.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s.trim().parse().map_err(D::Error::custom),
        }
    }

    pub fn position<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
        let raw = id(deserializer)?;
        if raw == 0 {
            return Err(D::Error::custom("pointer position must be at least 1"));
        }
        usize::try_from(raw).map_err(D::Error::custom)
    }
}
