//! Credential stores on disk.

use chrono::{DateTime, Utc};

use adlib_core::CredentialResolver;
use adlib_file::FileCredentialStore;

use crate::config::ConfigPaths;

/// The local store, and the shared one maintained by `meta-auth`.
#[derive(Debug, Clone)]
pub struct Stores {
    pub local: FileCredentialStore,
    pub shared: FileCredentialStore,
}

impl Stores {
    pub fn open(paths: &ConfigPaths) -> Self {
        Self {
            local: FileCredentialStore::local(&paths.local),
            shared: FileCredentialStore::shared(&paths.shared),
        }
    }

    /// Resolution over both stores, behind an optional `META_TOKEN`.
    pub fn resolver<'a>(
        &'a self,
        env_token: Option<&'a str>,
        now: DateTime<Utc>,
    ) -> CredentialResolver<'a> {
        CredentialResolver::new(&self.local, &self.shared)
            .with_env_token(env_token)
            .at(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adlib_core::{CredentialStore, TokenSource};
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &std::path::Path, json: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, json).unwrap();
    }

    #[test]
    fn shared_file_used_when_local_missing() {
        let dir = TempDir::new().unwrap();
        let paths = ConfigPaths::under(dir.path());
        write(
            &paths.shared,
            r#"{"access_token":"shared-tok","user_name":"Bob"}"#,
        );

        let stores = Stores::open(&paths);
        let resolved = stores.resolver(None, Utc::now()).resolve().unwrap();
        assert_eq!(resolved.source, TokenSource::Shared);
        assert_eq!(resolved.token.as_str(), "shared-tok");
    }

    #[test]
    fn local_file_shadows_shared() {
        let dir = TempDir::new().unwrap();
        let paths = ConfigPaths::under(dir.path());
        write(&paths.local, r#"{"access_token":"local-tok"}"#);
        write(&paths.shared, r#"{"access_token":"shared-tok"}"#);

        let stores = Stores::open(&paths);
        let resolved = stores.resolver(None, Utc::now()).resolve().unwrap();
        assert_eq!(resolved.source, TokenSource::Local);

        let resolved = stores
            .resolver(Some("env-tok"), Utc::now())
            .resolve()
            .unwrap();
        assert_eq!(resolved.source, TokenSource::Environment);
    }

    #[test]
    fn shared_store_never_written() {
        let dir = TempDir::new().unwrap();
        let stores = Stores::open(&ConfigPaths::under(dir.path()));
        assert!(stores.local.is_writable());
        assert!(!stores.shared.is_writable());
    }
}
