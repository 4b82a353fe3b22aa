use crate::models::Credentials;
use std::{collections::BTreeMap, path::PathBuf};
use tokio::fs;
use tracing::{error, warn};

pub const USERNAME_KEY: &str = "attendance_user";
pub const PASSWORD_KEY: &str = "attendance_pass";

type Entries = BTreeMap<String, String>;

// Storage problems never surface as errors: a failed read is "nothing
// stored", a failed write is logged and dropped.
pub struct CredentialStore {
    backend: Backend,
}

enum Backend {
    File(PathBuf),
    #[cfg(test)]
    Memory(std::sync::Mutex<Entries>),
}

impl CredentialStore {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::File(path.into()),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(std::sync::Mutex::new(Entries::new())),
        }
    }

    pub async fn load(&self) -> Option<Credentials> {
        let entries = self.read_entries().await?;
        let credentials = Credentials::new(
            entries.get(USERNAME_KEY)?.clone(),
            entries.get(PASSWORD_KEY)?.clone(),
        );
        credentials.is_complete().then_some(credentials)
    }

    pub async fn save(&self, username: &str, password: &str) {
        let mut entries = self.read_entries().await.unwrap_or_default();
        entries.insert(USERNAME_KEY.to_string(), username.to_string());
        entries.insert(PASSWORD_KEY.to_string(), password.to_string());
        self.write_entries(entries).await;
    }

    pub async fn clear(&self) {
        let Some(mut entries) = self.read_entries().await else {
            self.remove_all().await;
            return;
        };
        let removed_user = entries.remove(USERNAME_KEY).is_some();
        let removed_pass = entries.remove(PASSWORD_KEY).is_some();
        if removed_user || removed_pass {
            self.write_entries(entries).await;
        }
    }

    async fn read_entries(&self) -> Option<Entries> {
        match &self.backend {
            #[cfg(test)]
            Backend::Memory(entries) => entries.lock().ok().map(|guard| guard.clone()),
            Backend::File(path) => match fs::read(path).await {
                Ok(bytes) => match serde_json::from_slice(&bytes) {
                    Ok(entries) => Some(entries),
                    Err(err) => {
                        error!("failed to parse credential file: {err}");
                        None
                    }
                },
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
                Err(err) => {
                    error!("failed to read credential file: {err}");
                    None
                }
            },
        }
    }

    async fn write_entries(&self, entries: Entries) {
        match &self.backend {
            #[cfg(test)]
            Backend::Memory(slot) => {
                if let Ok(mut guard) = slot.lock() {
                    *guard = entries;
                }
            }
            Backend::File(path) => {
                let payload = match serde_json::to_vec_pretty(&entries) {
                    Ok(payload) => payload,
                    Err(err) => {
                        warn!("failed to encode credentials: {err}");
                        return;
                    }
                };
                if let Err(err) = fs::write(path, payload).await {
                    warn!("failed to write credential file: {err}");
                }
            }
        }
    }

    // Unreadable contents cannot be edited key by key, so the whole file goes.
    async fn remove_all(&self) {
        match &self.backend {
            #[cfg(test)]
            Backend::Memory(slot) => {
                if let Ok(mut guard) = slot.lock() {
                    guard.clear();
                }
            }
            Backend::File(path) => match fs::remove_file(path).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => warn!("failed to remove credential file: {err}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn temp_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("attendance_creds_{name}_{}_{nanos}.json", std::process::id()));
        path
    }

    async fn write_raw(path: &Path, body: &str) {
        fs::write(path, body).await.unwrap();
    }

    #[tokio::test]
    async fn saved_credentials_load_back() {
        let path = temp_path("roundtrip");
        let store = CredentialStore::file(&path);
        assert_eq!(store.load().await, None);

        store.save("21691A0501", "s3cret").await;
        assert_eq!(
            store.load().await,
            Some(Credentials::new("21691A0501", "s3cret"))
        );

        let reopened = CredentialStore::file(&path);
        assert!(reopened.load().await.is_some());
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let store = CredentialStore::in_memory();
        store.save("user", "pass").await;
        store.clear().await;
        assert_eq!(store.load().await, None);
        store.clear().await;
        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn clear_on_missing_file_does_not_create_it() {
        let path = temp_path("missing");
        let store = CredentialStore::file(&path);
        store.clear().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn partial_pair_is_absent() {
        let path = temp_path("partial");
        write_raw(&path, r#"{"attendance_user": "only-user"}"#).await;
        assert_eq!(CredentialStore::file(&path).load().await, None);

        write_raw(&path, r#"{"attendance_user": "user", "attendance_pass": ""}"#).await;
        assert_eq!(CredentialStore::file(&path).load().await, None);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_absent_and_is_replaced_on_save() {
        let path = temp_path("corrupt");
        write_raw(&path, "{not json").await;
        let store = CredentialStore::file(&path);
        assert_eq!(store.load().await, None);

        store.save("user", "pass").await;
        assert_eq!(store.load().await, Some(Credentials::new("user", "pass")));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn clear_removes_unreadable_file() {
        let path = temp_path("unreadable");
        write_raw(
            &path,
            r#"{"attendance_user": "user", "attendance_pass": "pass""#,
        )
        .await;
        let store = CredentialStore::file(&path);
        assert_eq!(store.load().await, None);

        store.clear().await;
        assert!(!path.exists());
        store.clear().await;
        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn unwritable_location_is_absorbed() {
        let mut path = temp_path("nodir");
        path.push("nested/creds.json");
        let store = CredentialStore::file(&path);
        store.save("user", "pass").await;
        assert_eq!(store.load().await, None);
    }
}
