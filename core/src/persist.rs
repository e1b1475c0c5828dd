use crate::{Pointer, Post, PostId, PersistError};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// What the hosting page hands a session once at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bootstrap {
    #[serde(default, deserialize_with = "null_as_default")]
    pub pointers: Vec<Pointer>,
    #[serde(default, deserialize_with = "posts_map")]
    pub posts: HashMap<PostId, Post>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
}

/// The pointer list handed to the external save step, as a bare `[{id, position}]` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavePayload(pub Vec<Pointer>);

impl From<&[Pointer]> for SavePayload {
    fn from(pointers: &[Pointer]) -> Self { Self(pointers.to_vec()) }
}

pub fn load_bootstrap(path: &Path) -> Result<Bootstrap, PersistError> {
    read_json(path)
}

pub fn load_payload(path: &Path) -> Result<SavePayload, PersistError> {
    read_json(path)
}

pub fn save_payload(path: &Path, payload: &SavePayload) -> Result<(), PersistError> {
    let io_err = |source| PersistError::Io { path: path.to_path_buf(), source };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    serde_json::to_writer_pretty(&mut out, payload)
        .map_err(|source| PersistError::Json { path: path.to_path_buf(), source })?;
    out.flush().map_err(io_err)?;
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let f = File::open(path).map_err(|source| PersistError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_reader(BufReader::new(f)).map_err(|source| PersistError::Json { path: path.to_path_buf(), source })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// An empty map arrives from the host as `[]`. Entries are keyed by their own ids.
fn posts_map<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HashMap<PostId, Post>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Posts {
        Map(HashMap<String, Post>),
        List(Vec<Post>),
    }

    Ok(match Option::<Posts>::deserialize(deserializer)? {
        Some(Posts::Map(map)) => map.into_values().map(|p| (p.id, p)).collect(),
        Some(Posts::List(list)) => list.into_iter().map(|p| (p.id, p)).collect(),
        None => HashMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_host_bootstrap() {
        let raw = r#"{
            "pointers": [{"ID": 4, "order": "1"}, {"ID": "9", "order": 3}],
            "posts": {"4": {"ID": 4, "post_title": "Pinned"}},
            "title": "winter boots"
        }"#;
        let boot: Bootstrap = serde_json::from_str(raw).unwrap();
        assert_eq!(boot.pointers, vec![Pointer::new(4, 1), Pointer::new(9, 3)]);
        assert_eq!(boot.posts[&4].title, "Pinned");
        assert_eq!(boot.title, "winter boots");
    }

    #[test]
    fn empty_host_values_decode_to_defaults() {
        let boot: Bootstrap = serde_json::from_str(r#"{"pointers": null, "posts": [], "title": null}"#).unwrap();
        assert_eq!(boot, Bootstrap::default());
    }

    #[test]
    fn payload_is_a_bare_array() {
        let payload = SavePayload(vec![Pointer::new(3, 3)]);
        assert_eq!(serde_json::to_string(&payload).unwrap(), r#"[{"id":3,"position":3}]"#);
    }
}
