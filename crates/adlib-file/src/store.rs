//! JSON credential files.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, instrument};

use adlib_core::Result;
use adlib_core::credential::CredentialRecord;
use adlib_core::error::StoreError;
use adlib_core::store::CredentialStore;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Whether this tool may write the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreMode {
    ReadWrite,
    /// Owned by another tool; loaded but never modified.
    ReadOnly,
}

/// A credential record stored as one JSON file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
    mode: StoreMode,
}

fn io_error(path: &Path, err: std::io::Error) -> adlib_core::Error {
    StoreError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
    .into()
}

impl FileCredentialStore {
    /// This tool's own store.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: StoreMode::ReadWrite,
        }
    }

    /// The store maintained by `meta-auth`.
    pub fn shared(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: StoreMode::ReadOnly,
        }
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn ensure_writable(&self) -> Result<()> {
        match self.mode {
            StoreMode::ReadWrite => Ok(()),
            StoreMode::ReadOnly => Err(StoreError::ReadOnly {
                path: self.path.clone(),
            }
            .into()),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Option<CredentialRecord>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("credential file not found");
                return Ok(None);
            }
            Err(err) => return Err(io_error(&self.path, err)),
        };

        let record: CredentialRecord =
            serde_json::from_str(&json).map_err(|e| StoreError::Malformed {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        if record.is_empty() {
            return Ok(None);
        }
        Ok(Some(record))
    }

    #[instrument(skip(self, record), fields(path = %self.path.display()))]
    fn save(&self, record: &CredentialRecord) -> Result<()> {
        self.ensure_writable()?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| io_error(&lock_path, e))?;
        lock_file
            .lock_exclusive()
            .map_err(|e| io_error(&lock_path, e))?;

        let json = serde_json::to_string_pretty(record).map_err(|e| StoreError::Malformed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let temp_path = self.path.with_extension("tmp");
        let written = write_private(&temp_path, json.as_bytes())
            .and_then(|_| fs::rename(&temp_path, &self.path));
        let unlocked = lock_file.unlock();

        written.map_err(|e| io_error(&self.path, e))?;
        unlocked.map_err(|e| io_error(&lock_path, e))?;

        debug!("credential saved");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn clear(&self) -> Result<()> {
        self.ensure_writable()?;

        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("credential removed");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&self.path, err)),
        }
    }

    fn is_writable(&self) -> bool {
        self.mode == StoreMode::ReadWrite
    }
}

/// Write `bytes` to a file readable only by the owner (Unix).
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;

    #[cfg(unix)]
    {
        let mut perms = file.metadata()?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use adlib_core::credential::Identity;
    use adlib_core::types::AccessToken;
    use chrono::DateTime;
    use tempfile::TempDir;

    fn record(token: &str) -> CredentialRecord {
        CredentialRecord::new(
            AccessToken::new(token),
            Some(Identity {
                id: "42".to_string(),
                name: "Alice".to_string(),
            }),
            DateTime::from_timestamp(1_765_000_000, 0),
        )
    }

    #[test]
    fn missing_file_loads_none() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::local(dir.path().join("config.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_creates_directories_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meta-ad-library").join("config.json");
        let store = FileCredentialStore::local(&path);

        store.save(&record("tok-1")).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
        assert_eq!(store.load().unwrap(), Some(record("tok-1")));
    }

    #[test]
    fn save_overwrites_wholesale() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::local(dir.path().join("config.json"));

        store.save(&record("tok-1")).unwrap();
        let bare = CredentialRecord::new(AccessToken::new("tok-2"), None, None);
        store.save(&bare).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token.as_str(), "tok-2");
        assert_eq!(loaded.user_id, None);
        assert_eq!(loaded.token_expires_at, None);
    }

    #[test]
    fn empty_token_loads_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"access_token":""}"#).unwrap();
        assert!(FileCredentialStore::local(&path).load().unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        let err = FileCredentialStore::local(&path).load().unwrap_err();
        assert!(matches!(
            err,
            adlib_core::Error::Store(StoreError::Malformed { .. })
        ));
    }

    #[test]
    fn clear_removes_and_tolerates_missing() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::local(dir.path().join("config.json"));
        store.save(&record("tok")).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn shared_store_is_read_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"access_token":"shared-tok","user_name":"Bob","token_expires_at":1765000000}"#,
        )
        .unwrap();

        let store = FileCredentialStore::shared(&path);
        assert!(!store.is_writable());
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token.as_str(), "shared-tok");
        assert_eq!(loaded.user_name.as_deref(), Some("Bob"));

        assert!(matches!(
            store.save(&record("x")).unwrap_err(),
            adlib_core::Error::Store(StoreError::ReadOnly { .. })
        ));
        assert!(store.clear().is_err());
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        FileCredentialStore::local(&path).save(&record("tok")).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
