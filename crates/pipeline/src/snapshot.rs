use crate::city::Tile;
use crate::error::{CityError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

/// Metadata persisted next to the tiles of one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub id: String,
    pub created_at_unix_ms: u64,
    /// Where the analyzed tree came from (repository URL or local path)
    pub source: String,
    pub label: String,
    pub file_count: usize,
}

/// On-disk layout: `{ "meta": ..., "data": [...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub meta: SnapshotMeta,
    pub data: Vec<Tile>,
}

#[derive(Deserialize)]
struct MetaOnly {
    meta: SnapshotMeta,
}

/// Directory of immutable snapshots, one `<id>.json` each
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `tiles`; an empty label falls back to `source`
    pub async fn save(&self, source: &str, label: Option<&str>, tiles: &[Tile]) -> Result<SnapshotMeta> {
        fs::create_dir_all(&self.dir).await?;

        let created_at_unix_ms = current_unix_ms();
        let mut id = created_at_unix_ms.to_string();
        let mut suffix = 1;
        while fs::try_exists(self.path_for(&id)).await? {
            id = format!("{created_at_unix_ms}-{suffix}");
            suffix += 1;
        }

        let label = label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(source)
            .to_string();
        let snapshot = Snapshot {
            meta: SnapshotMeta {
                id: id.clone(),
                created_at_unix_ms,
                source: source.to_string(),
                label,
                file_count: tiles.len(),
            },
            data: tiles.to_vec(),
        };

        let path = self.path_for(&id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(&snapshot)?).await?;
        fs::rename(&tmp, &path).await?;
        log::info!("Snapshot saved at {}", path.display());
        Ok(snapshot.meta)
    }

    /// Metadata of every readable snapshot, newest first
    pub async fn list(&self) -> Result<Vec<SnapshotMeta>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut metas = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = fs::read(&path)
                .await
                .map_err(CityError::from)
                .and_then(|bytes| Ok(serde_json::from_slice::<MetaOnly>(&bytes)?));
            match parsed {
                Ok(MetaOnly { meta }) => metas.push(meta),
                Err(e) => log::warn!("Failed to load snapshot {}: {e}", path.display()),
            }
        }

        metas.sort_by(|a, b| {
            b.created_at_unix_ms
                .cmp(&a.created_at_unix_ms)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(metas)
    }

    /// `Ok(None)` when no snapshot has this id
    pub async fn load(&self, id: &str) -> Result<Option<Snapshot>> {
        validate_id(id)?;
        match fs::read(self.path_for(id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

fn validate_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CityError::InvalidSnapshotId(id.to_string()))
    }
}

fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|dur| u64::try_from(dur.as_millis()).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn tile(name: &str) -> Tile {
        Tile {
            name: name.to_string(),
            x: 0.0,
            y: 0.0,
            w: 1.0,
            d: 1.0,
            h: 2.0,
            color: "#00ffcc".to_string(),
            size: 3,
        }
    }

    #[tokio::test]
    async fn save_then_load_roundtrip() {
        let temp = tempdir().unwrap();
        let store = SnapshotStore::new(temp.path().join("snapshots"));

        let meta = store
            .save("https://example.com/repo", Some("  "), &[tile("a.rs"), tile("b.rs")])
            .await
            .unwrap();
        assert_eq!(meta.label, "https://example.com/repo");
        assert_eq!(meta.file_count, 2);

        let loaded = store.load(&meta.id).await.unwrap().unwrap();
        assert_eq!(loaded.meta, meta);
        assert_eq!(loaded.data, vec![tile("a.rs"), tile("b.rs")]);
    }

    #[tokio::test]
    async fn ids_are_unique_and_list_is_newest_first() {
        let temp = tempdir().unwrap();
        let store = SnapshotStore::new(temp.path());

        let first = store.save("repo", Some("one"), &[]).await.unwrap();
        let second = store.save("repo", Some("two"), &[]).await.unwrap();
        assert_ne!(first.id, second.id);

        std::fs::write(temp.path().join("broken.json"), b"{not json").unwrap();
        let listed = store.list().await.unwrap();
        let labels: Vec<&str> = listed.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["two", "one"]);
    }

    #[tokio::test]
    async fn missing_and_invalid_ids() {
        let temp = tempdir().unwrap();
        let store = SnapshotStore::new(temp.path());
        assert!(store.load("12345").await.unwrap().is_none());
        assert!(matches!(
            store.load("../etc/passwd").await,
            Err(CityError::InvalidSnapshotId(_))
        ));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_a_missing_directory_is_empty() {
        let temp = tempdir().unwrap();
        let store = SnapshotStore::new(temp.path().join("nope"));
        assert!(store.list().await.unwrap().is_empty());
    }
}
