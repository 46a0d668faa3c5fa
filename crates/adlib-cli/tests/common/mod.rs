use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use wiremock::MockServer;

/// An isolated home directory and a mock Graph API to point the binary at.
pub struct Harness {
    pub home: TempDir,
    pub server: MockServer,
}

impl Harness {
    pub async fn start() -> Self {
        Self {
            home: TempDir::new().unwrap(),
            server: MockServer::start().await,
        }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.home.path().join("config")
    }

    /// The binary's own credential file.
    pub fn local_config(&self) -> PathBuf {
        self.config_dir().join("meta-ad-library").join("config.json")
    }

    pub fn shared_config(&self) -> PathBuf {
        self.config_dir().join("meta-auth").join("config.json")
    }

    pub fn graph_url(&self) -> String {
        format!("{}/v23.0", self.server.uri())
    }

    /// Run the CLI with no credentials in the environment.
    pub async fn run(&self, args: &[&str]) -> Output {
        self.run_with_env(args, &[]).await
    }

    pub async fn run_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_meta-adlib"));
        cmd.args(args)
            .arg("--graph-url")
            .arg(self.graph_url())
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.config_dir())
            .env_remove("META_TOKEN")
            .env_remove("META_APP_ID")
            .env_remove("META_APP_SECRET")
            .env_remove("META_GRAPH_URL")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        for (key, value) in env {
            cmd.env(key, value);
        }

        tokio::task::spawn_blocking(move || cmd.output().expect("failed to execute CLI"))
            .await
            .unwrap()
    }
}

pub fn write(path: &Path, json: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, json).unwrap();
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
