use std::path::{Path, PathBuf};

/// Scene/camera/version info pulled from a glTF document, used to
/// repopulate the dynamic settings-panel dropdowns after a load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSummary {
    pub version: String,
    pub scenes: Vec<String>,
    pub cameras: Vec<String>,
}

/// Ordered map of selectable model keys to their glTF paths.
pub struct ModelIndex {
    entries: Vec<(String, PathBuf)>,
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read glTF at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse glTF JSON at {path}: {source}")]
    ParseGltf {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed glb container at {path}: {reason}")]
    MalformedGlb { path: String, reason: String },
    #[error("failed to scan model directory {path}: {source}")]
    Scan {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ModelIndex {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn from_entries(entries: Vec<(String, PathBuf)>) -> Self {
        Self { entries }
    }

    /// Build an index from the `.gltf`/`.glb` files directly inside
    /// `dir`, keyed by file stem and sorted for a stable dropdown order.
    pub fn from_directory(dir: &Path) -> Result<Self, AssetError> {
        let mut entries: Vec<(String, PathBuf)> = Vec::new();
        let read_dir = std::fs::read_dir(dir).map_err(|source| AssetError::Scan {
            path: dir.display().to_string(),
            source,
        })?;
        for entry in read_dir {
            let entry = entry.map_err(|source| AssetError::Scan {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            let is_gltf = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("gltf") || ext.eq_ignore_ascii_case("glb"))
                .unwrap_or(false);
            if !is_gltf {
                continue;
            }
            let key = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("model")
                .to_string();
            entries.push((key, path));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(Self { entries })
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn first_key(&self) -> Option<&str> {
        self.entries.first().map(|(key, _)| key.as_str())
    }

    pub fn path_for(&self, key: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, path)| path.as_path())
    }

    /// Register or replace a model under `key`.
    pub fn insert(&mut self, key: String, path: PathBuf) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|(entry_key, _)| *entry_key == key)
        {
            existing.1 = path;
        } else {
            self.entries.push((key, path));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ModelIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract version, scene names and camera names from a glTF document
/// without loading any geometry. Accepts both `.gltf` JSON and `.glb`
/// containers (chunk 0 must be JSON per the glTF 2.0 spec).
pub fn probe_model(path: &Path) -> Result<ModelSummary, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let json_bytes = if bytes.starts_with(b"glTF") {
        glb_json_chunk(path, &bytes)?
    } else {
        bytes.as_slice()
    };
    let document: serde_json::Value =
        serde_json::from_slice(json_bytes).map_err(|source| AssetError::ParseGltf {
            path: path.display().to_string(),
            source,
        })?;

    let version = document
        .get("asset")
        .and_then(|asset| asset.get("version"))
        .and_then(|version| version.as_str())
        .unwrap_or("unknown")
        .to_string();
    let scenes = named_list(&document, "scenes", "Scene");
    let cameras = named_list(&document, "cameras", "Camera");

    Ok(ModelSummary {
        version,
        scenes,
        cameras,
    })
}

fn named_list(document: &serde_json::Value, field: &str, fallback: &str) -> Vec<String> {
    document
        .get(field)
        .and_then(|value| value.as_array())
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    item.get("name")
                        .and_then(|name| name.as_str())
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("{} {}", fallback, index))
                })
                .collect()
        })
        .unwrap_or_default()
}

// Binary glTF layout: 12-byte header (magic, version, total length),
// then chunks of (length, type, payload). Chunk 0 carries the JSON.
fn glb_json_chunk<'a>(path: &Path, bytes: &'a [u8]) -> Result<&'a [u8], AssetError> {
    let malformed = |reason: &str| AssetError::MalformedGlb {
        path: path.display().to_string(),
        reason: reason.to_string(),
    };
    if bytes.len() < 20 {
        return Err(malformed("shorter than header + first chunk header"));
    }
    let chunk_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;
    let chunk_type = &bytes[16..20];
    if chunk_type != b"JSON" {
        return Err(malformed("first chunk is not JSON"));
    }
    let payload = bytes
        .get(20..20 + chunk_len)
        .ok_or_else(|| malformed("JSON chunk length exceeds file size"))?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scenes": [ { "name": "Hall" }, {} ],
        "cameras": [
            { "name": "Orbit", "type": "perspective" },
            { "type": "orthographic" }
        ]
    }"#;

    fn temp_file(tag: &str, extension: &str, bytes: &[u8]) -> PathBuf {
        let mut path = std::env::temp_dir();
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!(
            "gltfview_{}_{}_{}.{}",
            tag,
            std::process::id(),
            nonce,
            extension
        ));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn glb_bytes(json: &str) -> Vec<u8> {
        let payload = json.as_bytes();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"glTF");
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&((20 + payload.len()) as u32).to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(b"JSON");
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_probe_gltf_json_names_and_fallbacks() {
        let path = temp_file("probe", "gltf", SAMPLE_GLTF.as_bytes());
        let summary = probe_model(&path).unwrap();
        assert_eq!(summary.version, "2.0");
        assert_eq!(summary.scenes, vec!["Hall".to_string(), "Scene 1".to_string()]);
        assert_eq!(
            summary.cameras,
            vec!["Orbit".to_string(), "Camera 1".to_string()]
        );
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_probe_glb_container() {
        let path = temp_file("glb", "glb", &glb_bytes(SAMPLE_GLTF));
        let summary = probe_model(&path).unwrap();
        assert_eq!(summary.version, "2.0");
        assert_eq!(summary.scenes.len(), 2);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_probe_glb_rejects_non_json_first_chunk() {
        let mut bytes = glb_bytes(SAMPLE_GLTF);
        bytes[16..20].copy_from_slice(b"BIN\0");
        let path = temp_file("badglb", "glb", &bytes);
        let err = probe_model(&path).unwrap_err();
        assert!(matches!(err, AssetError::MalformedGlb { .. }));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_probe_without_scenes_or_cameras_is_empty() {
        let path = temp_file("bare", "gltf", br#"{ "asset": { "version": "2.0" } }"#);
        let summary = probe_model(&path).unwrap();
        assert!(summary.scenes.is_empty());
        assert!(summary.cameras.is_empty());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_index_from_directory_sorts_and_filters() {
        let mut dir = std::env::temp_dir();
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        dir.push(format!("gltfview_index_{}_{}", std::process::id(), nonce));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("Zebra.gltf"), SAMPLE_GLTF).unwrap();
        std::fs::write(dir.join("Avocado.glb"), glb_bytes(SAMPLE_GLTF)).unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let index = ModelIndex::from_directory(&dir).unwrap();
        assert_eq!(index.keys(), vec!["Avocado".to_string(), "Zebra".to_string()]);
        assert_eq!(index.first_key(), Some("Avocado"));
        assert!(index.path_for("Zebra").is_some());
        assert!(index.path_for("notes").is_none());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut index = ModelIndex::new();
        index.insert("Box".to_string(), PathBuf::from("a/Box.gltf"));
        index.insert("Box".to_string(), PathBuf::from("b/Box.gltf"));
        assert_eq!(index.keys(), vec!["Box".to_string()]);
        assert_eq!(index.path_for("Box"), Some(Path::new("b/Box.gltf")));
    }
}
