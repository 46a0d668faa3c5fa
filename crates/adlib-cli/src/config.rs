//! Config file locations and environment snapshot.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use directories::BaseDirs;

use adlib_core::AppCredentials;
use adlib_core::error::{StoreError, ValidationError};

/// This tool's own config directory name.
const LOCAL_DIR: &str = "meta-ad-library";
/// Directory owned by `meta-auth`; read, never written.
const SHARED_DIR: &str = "meta-auth";
const CONFIG_FILE: &str = "config.json";

/// Where the two credential files live.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub local: PathBuf,
    pub shared: PathBuf,
}

impl ConfigPaths {
    /// Resolve under the platform's user config directory.
    pub fn discover() -> Result<Self> {
        let dirs = BaseDirs::new().ok_or(StoreError::NoConfigDir)?;
        Ok(Self::under(dirs.config_dir()))
    }

    pub fn under(config_dir: &Path) -> Self {
        Self {
            local: config_dir.join(LOCAL_DIR).join(CONFIG_FILE),
            shared: config_dir.join(SHARED_DIR).join(CONFIG_FILE),
        }
    }
}

/// Environment variables read once at startup. Empty values count as unset.
#[derive(Clone, Default)]
pub struct Environment {
    pub token: Option<String>,
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
}

impl Environment {
    pub fn capture() -> Self {
        Self {
            token: var("META_TOKEN"),
            app_id: var("META_APP_ID"),
            app_secret: var("META_APP_SECRET"),
        }
    }

    /// App credentials, required.
    pub fn app_credentials(&self) -> Result<AppCredentials, ValidationError> {
        AppCredentials::from_env_values(self.app_id.as_deref(), self.app_secret.as_deref())
    }

    /// App credentials, if both are set.
    pub fn optional_app_credentials(&self) -> Option<AppCredentials> {
        AppCredentials::available(self.app_id.as_deref(), self.app_secret.as_deref())
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("app_id", &self.app_id)
            .field("app_secret", &self.app_secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_under_config_dir() {
        let paths = ConfigPaths::under(Path::new("/home/alice/.config"));
        assert_eq!(
            paths.local,
            PathBuf::from("/home/alice/.config/meta-ad-library/config.json")
        );
        assert_eq!(
            paths.shared,
            PathBuf::from("/home/alice/.config/meta-auth/config.json")
        );
    }

    #[test]
    fn missing_app_secret_named() {
        let env = Environment {
            app_id: Some("123".to_string()),
            ..Environment::default()
        };
        let err = env.app_credentials().unwrap_err();
        assert_eq!(
            err.to_string(),
            "META_APP_SECRET not set: export META_APP_SECRET=<your_app_secret>"
        );
        assert!(env.optional_app_credentials().is_none());
    }

    #[test]
    fn debug_hides_secrets() {
        let env = Environment {
            token: Some("EAABsecret".to_string()),
            app_id: Some("123".to_string()),
            app_secret: Some("s3cr3t".to_string()),
        };
        let debug = format!("{env:?}");
        assert!(debug.contains("123"));
        assert!(!debug.contains("EAABsecret"));
        assert!(!debug.contains("s3cr3t"));
    }

    #[test]
    fn missing_config_dir_is_a_store_error() {
        let err = anyhow::Error::from(StoreError::NoConfigDir);
        assert!(err.downcast_ref::<StoreError>().is_some());
        assert_eq!(err.to_string(), "could not determine config directory");
    }
}
