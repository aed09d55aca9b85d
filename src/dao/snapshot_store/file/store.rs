use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use futures::future::BoxFuture;
use tokio::fs;

use crate::dao::{
    models::{ContestEntity, SaveListItemEntity},
    snapshot_store::SnapshotStore,
    storage::StorageResult,
};

use super::error::{FileDaoError, FileResult};

const EXTENSION: &str = "json";

/// Stores each snapshot as a pretty-printed JSON file inside one directory.
#[derive(Clone)]
pub struct FileSnapshotStore {
    dir: Arc<PathBuf>,
}

impl FileSnapshotStore {
    /// Open (creating if needed) the save directory.
    pub async fn open(dir: impl Into<PathBuf>) -> FileResult<Self> {
        let store = Self {
            dir: Arc::new(dir.into()),
        };
        store.ensure_directory().await?;
        Ok(store)
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    async fn ensure_directory(&self) -> FileResult<()> {
        let dir = self.dir.as_ref().clone();
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| FileDaoError::Directory {
                path: dir.clone(),
                source,
            })?;
        let metadata = fs::metadata(&dir)
            .await
            .map_err(|source| FileDaoError::Directory {
                path: dir.clone(),
                source,
            })?;
        if metadata.permissions().readonly() {
            return Err(FileDaoError::Directory {
                path: dir,
                source: std::io::Error::new(ErrorKind::PermissionDenied, "directory is read-only"),
            });
        }
        Ok(())
    }

    /// Resolve a snapshot name to its file, refusing anything that is not a bare name.
    fn path_for(&self, name: &str) -> FileResult<PathBuf> {
        let stem = name.strip_suffix(".json").unwrap_or(name);
        let valid = !stem.is_empty()
            && !stem.starts_with('.')
            && stem
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(FileDaoError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(self.dir.join(format!("{stem}.{EXTENSION}")))
    }

    async fn write_snapshot(&self, name: &str, snapshot: &ContestEntity) -> FileResult<()> {
        let path = self.path_for(name)?;
        let body = serde_json::to_vec_pretty(snapshot).map_err(|source| FileDaoError::Encode {
            name: name.to_string(),
            source,
        })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .await
            .map_err(|source| FileDaoError::Write {
                path: tmp.clone(),
                source,
            })?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|source| FileDaoError::Write {
                path: path.clone(),
                source,
            })
    }

    async fn read_snapshot(&self, name: &str) -> FileResult<Option<ContestEntity>> {
        let path = self.path_for(name)?;
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(FileDaoError::Read { path, source }),
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|source| FileDaoError::Decode {
                name: name.to_string(),
                source,
            })
    }

    async fn list_snapshots(&self) -> FileResult<Vec<SaveListItemEntity>> {
        let dir = self.dir.as_ref().clone();
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|source| FileDaoError::Read {
                path: dir.clone(),
                source,
            })?;

        let mut saves = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| FileDaoError::Read {
                path: dir.clone(),
                source,
            })?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let metadata = entry
                .metadata()
                .await
                .map_err(|source| FileDaoError::Read {
                    path: path.clone(),
                    source,
                })?;
            let saved_at = metadata
                .modified()
                .map_err(|source| FileDaoError::Read {
                    path: path.clone(),
                    source,
                })?;
            saves.push(SaveListItemEntity {
                name: name.to_string(),
                saved_at,
            });
        }

        saves.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then_with(|| b.name.cmp(&a.name)));
        Ok(saves)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&self, name: String, snapshot: ContestEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .write_snapshot(&name, &snapshot)
                .await
                .map_err(Into::into)
        })
    }

    fn load(&self, name: String) -> BoxFuture<'static, StorageResult<Option<ContestEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.read_snapshot(&name).await.map_err(Into::into) })
    }

    fn list(&self) -> BoxFuture<'static, StorageResult<Vec<SaveListItemEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_snapshots().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let dir = store.dir.as_ref().clone();
            let metadata = fs::metadata(&dir)
                .await
                .map_err(|source| FileDaoError::Directory {
                    path: dir.clone(),
                    source,
                })?;
            if metadata.is_dir() {
                Ok(())
            } else {
                Err(FileDaoError::Directory {
                    path: dir,
                    source: std::io::Error::new(ErrorKind::NotADirectory, "not a directory"),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_directory().await.map_err(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{models::RoundEntity, storage::StorageError};
    use uuid::Uuid;

    async fn temp_store() -> FileSnapshotStore {
        let dir = std::env::temp_dir().join(format!("trivia-hub-{}", Uuid::new_v4()));
        FileSnapshotStore::open(dir).await.unwrap()
    }

    fn snapshot(current_round: usize) -> ContestEntity {
        ContestEntity {
            team_name: "Team".into(),
            current_round,
            n_teams: Some(12),
            n_visual: None,
            rounds: vec![RoundEntity {
                number: 1,
                speed: false,
                announced: true,
                announced_score: 40,
                announced_place: 3,
                show_name: String::new(),
                show_host: String::new(),
                discrepancy_text: String::new(),
                standings: Vec::new(),
                questions: Vec::new(),
                answers: Vec::new(),
            }],
        }
    }

    #[tokio::test]
    async fn saved_snapshot_loads_back() {
        let store = temp_store().await;
        store.save("Rd01_test".into(), snapshot(1)).await.unwrap();

        let loaded = store.load("Rd01_test".into()).await.unwrap();
        assert_eq!(loaded, Some(snapshot(1)));
        assert!(store.load("Rd02_missing".into()).await.unwrap().is_none());

        let saves = store.list().await.unwrap();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].name, "Rd01_test");
        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn path_like_names_are_refused() {
        let store = temp_store().await;
        for name in ["../escape", "", ".hidden", "a/b"] {
            let err = store.save(name.into(), snapshot(1)).await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidName { .. }), "{name}");
        }
        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn unreadable_snapshot_is_reported_as_corrupt() {
        let store = temp_store().await;
        std::fs::write(store.dir().join("broken.json"), b"{ not json").unwrap();
        let err = store.load("broken".into()).await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { ref name, .. } if name == "broken"));
        assert!(store.health_check().await.is_ok());
        let _ = std::fs::remove_dir_all(store.dir());
    }
}
