use super::documents::{Post, Profile, ProfileFields, User};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot {path} is not valid: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Collections {
    #[serde(default)]
    profiles: Vec<Profile>,
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    posts: Vec<Post>,
}

/// Document counts reported by the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub profiles: usize,
    pub users: usize,
    pub posts: usize,
}

/// Profile, user and post collections.
///
/// Every operation touches a single document (or one collection in the case
/// of post deletion) under one lock acquisition. Concurrent writers to the same
/// profile are last-write-wins. When a snapshot path is configured, each
/// mutation rewrites the snapshot before returning; if that write fails the
/// touched collection is put back as it was and the error is returned.
#[derive(Debug)]
pub struct DocumentStore {
    data: RwLock<Collections>,
    snapshot: Option<PathBuf>,
}

impl DocumentStore {
    /// Purely in-memory store
    pub fn in_memory() -> Self {
        Self {
            data: RwLock::new(Collections::default()),
            snapshot: None,
        }
    }

    /// Open a store backed by a JSON snapshot, loading it if present
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let data = if path.exists() {
            let raw = std::fs::read(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            let data: Collections =
                serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
                    path: path.clone(),
                    source,
                })?;
            info!(
                path = %path.display(),
                profiles = data.profiles.len(),
                users = data.users.len(),
                "Loaded document snapshot"
            );
            data
        } else {
            Collections::default()
        };

        Ok(Self {
            data: RwLock::new(data),
            snapshot: Some(path),
        })
    }

    // ---- profiles ----

    pub async fn find_profile_by_user(&self, user: Uuid) -> Option<Profile> {
        let data = self.data.read().await;
        data.profiles.iter().find(|p| p.user == user).cloned()
    }

    pub async fn list_profiles(&self) -> Vec<Profile> {
        self.data.read().await.profiles.clone()
    }

    /// Replace the scalar fields of the user's profile, creating it if absent
    pub async fn upsert_profile(&self, user: Uuid, fields: ProfileFields) -> StoreResult<Profile> {
        let mut data = self.data.write().await;
        let previous = data.profiles.clone();
        let profile = match data.profiles.iter().position(|p| p.user == user) {
            Some(idx) => {
                let existing = &mut data.profiles[idx];
                existing.apply(fields);
                existing.clone()
            }
            None => {
                let created = Profile::new(user, fields);
                debug!(profile_id = %created.id, user_id = %user, "Creating profile");
                data.profiles.push(created.clone());
                created
            }
        };
        self.persist_or_restore(&mut data, |c| &mut c.profiles, previous)?;
        Ok(profile)
    }

    /// Edit the user's profile in place. `None` when the user has no profile.
    pub async fn update_profile<F>(&self, user: Uuid, edit: F) -> StoreResult<Option<Profile>>
    where
        F: FnOnce(&mut Profile),
    {
        let mut data = self.data.write().await;
        let Some(idx) = data.profiles.iter().position(|p| p.user == user) else {
            return Ok(None);
        };
        let previous = data.profiles.clone();
        edit(&mut data.profiles[idx]);
        let updated = data.profiles[idx].clone();
        self.persist_or_restore(&mut data, |c| &mut c.profiles, previous)?;
        Ok(Some(updated))
    }

    pub async fn delete_profile_by_user(&self, user: Uuid) -> StoreResult<bool> {
        let mut data = self.data.write().await;
        let previous = data.profiles.clone();
        data.profiles.retain(|p| p.user != user);
        let removed = data.profiles.len() != previous.len();
        if removed {
            self.persist_or_restore(&mut data, |c| &mut c.profiles, previous)?;
        }
        Ok(removed)
    }

    // ---- users ----

    pub async fn find_user(&self, id: Uuid) -> Option<User> {
        let data = self.data.read().await;
        data.users.iter().find(|u| u.id == id).cloned()
    }

    /// Look up several users in one lock acquisition
    pub async fn find_users(&self, ids: &[Uuid]) -> Vec<Option<User>> {
        let data = self.data.read().await;
        ids.iter()
            .map(|id| data.users.iter().find(|u| u.id == *id).cloned())
            .collect()
    }

    pub async fn insert_user(&self, user: User) -> StoreResult<()> {
        let mut data = self.data.write().await;
        let previous = data.users.clone();
        data.users.retain(|u| u.id != user.id);
        data.users.push(user);
        self.persist_or_restore(&mut data, |c| &mut c.users, previous)
    }

    pub async fn set_user_avatar(&self, id: Uuid, avatar: String) -> StoreResult<bool> {
        let mut data = self.data.write().await;
        let Some(idx) = data.users.iter().position(|u| u.id == id) else {
            return Ok(false);
        };
        let previous = data.users.clone();
        data.users[idx].avatar = avatar;
        self.persist_or_restore(&mut data, |c| &mut c.users, previous)?;
        Ok(true)
    }

    pub async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut data = self.data.write().await;
        let previous = data.users.clone();
        data.users.retain(|u| u.id != id);
        let removed = data.users.len() != previous.len();
        if removed {
            self.persist_or_restore(&mut data, |c| &mut c.users, previous)?;
        }
        Ok(removed)
    }

    // ---- posts ----

    pub async fn insert_post(&self, post: Post) -> StoreResult<()> {
        let mut data = self.data.write().await;
        let previous = data.posts.clone();
        data.posts.push(post);
        self.persist_or_restore(&mut data, |c| &mut c.posts, previous)
    }

    pub async fn delete_posts_by_user(&self, user: Uuid) -> StoreResult<usize> {
        let mut data = self.data.write().await;
        let previous = data.posts.clone();
        data.posts.retain(|p| p.user != user);
        let removed = previous.len() - data.posts.len();
        if removed > 0 {
            self.persist_or_restore(&mut data, |c| &mut c.posts, previous)?;
        }
        Ok(removed)
    }

    pub async fn stats(&self) -> StoreStats {
        let data = self.data.read().await;
        StoreStats {
            profiles: data.profiles.len(),
            users: data.users.len(),
            posts: data.posts.len(),
        }
    }

    /// Write the snapshot now (no-op for in-memory stores)
    pub async fn flush(&self) -> StoreResult<()> {
        let data = self.data.read().await;
        self.persist(&data)
    }

    /// Persist, or put the selected collection back to `previous` on failure
    fn persist_or_restore<T>(
        &self,
        data: &mut Collections,
        collection: impl FnOnce(&mut Collections) -> &mut Vec<T>,
        previous: Vec<T>,
    ) -> StoreResult<()> {
        match self.persist(data) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(error = %err, "Snapshot write failed, rolling back");
                *collection(data) = previous;
                Err(err)
            }
        }
    }

    fn persist(&self, data: &Collections) -> StoreResult<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        write_snapshot(path, data)
    }
}

/// Write to a sibling temp file and rename over the target
fn write_snapshot(path: &Path, data: &Collections) -> StoreResult<()> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let bytes = serde_json::to_vec_pretty(data).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, bytes).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(status: &str) -> ProfileFields {
        ProfileFields {
            status: status.to_string(),
            skills: vec!["rust".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn upsert_twice_keeps_one_profile() {
        let store = DocumentStore::in_memory();
        let user = Uuid::new_v4();

        let first = store.upsert_profile(user, fields("Junior")).await.unwrap();
        let second = store.upsert_profile(user, fields("Senior")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.status, "Senior");
        assert_eq!(store.list_profiles().await.len(), 1);
    }

    #[tokio::test]
    async fn update_profile_without_profile_is_none() {
        let store = DocumentStore::in_memory();
        let result = store
            .update_profile(Uuid::new_v4(), |p| p.status.clear())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_posts_only_touches_the_owner() {
        let store = DocumentStore::in_memory();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        store.insert_post(Post::new(owner, "a")).await.unwrap();
        store.insert_post(Post::new(owner, "b")).await.unwrap();
        store.insert_post(Post::new(other, "c")).await.unwrap();

        assert_eq!(store.delete_posts_by_user(owner).await.unwrap(), 2);
        assert_eq!(store.stats().await.posts, 1);
    }

    #[tokio::test]
    async fn set_avatar_on_unknown_user_is_false() {
        let store = DocumentStore::in_memory();
        let updated = store
            .set_user_avatar(Uuid::new_v4(), "https://x".to_string())
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let user = User::new("Ada", "ada@example.com");

        {
            let store = DocumentStore::open(&path).unwrap();
            store.insert_user(user.clone()).await.unwrap();
            store.upsert_profile(user.id, fields("Developer")).await.unwrap();
        }

        let reopened = DocumentStore::open(&path).unwrap();
        assert_eq!(reopened.find_user(user.id).await, Some(user.clone()));
        let profile = reopened.find_profile_by_user(user.id).await.unwrap();
        assert_eq!(profile.status, "Developer");
    }

    #[tokio::test]
    async fn failed_snapshot_write_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = DocumentStore::open(&path).unwrap();
        let user = User::new("Ada", "ada@example.com");
        store.insert_user(user.clone()).await.unwrap();
        store.upsert_profile(user.id, fields("Junior")).await.unwrap();

        // a directory at the snapshot path makes the final rename fail
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(store.upsert_profile(user.id, fields("Senior")).await.is_err());
        assert!(
            store
                .update_profile(user.id, |p| p.skills.clear())
                .await
                .is_err()
        );
        assert!(
            store
                .set_user_avatar(user.id, "https://x.io".to_string())
                .await
                .is_err()
        );
        assert!(store.upsert_profile(Uuid::new_v4(), fields("New")).await.is_err());
        assert!(store.delete_user(user.id).await.is_err());

        let profile = store.find_profile_by_user(user.id).await.unwrap();
        assert_eq!(profile.status, "Junior");
        assert_eq!(profile.skills, ["rust"]);
        assert_eq!(store.find_user(user.id).await, Some(user));
        assert_eq!(store.stats().await.profiles, 1);
    }

    #[test]
    fn corrupt_snapshot_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let err = DocumentStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
