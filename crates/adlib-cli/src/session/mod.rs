//! Per-invocation context: output mode, Graph API base, environment and stores.

mod storage;

use anyhow::{Context as _, Result};
use chrono::Utc;

use adlib_core::{GraphUrl, Resolved};
use adlib_file::FileCredentialStore;
use adlib_graph::{GraphClient, TokenLifecycle};

use crate::cli::Cli;
use crate::config::{ConfigPaths, Environment};
use crate::output::{self, OutputMode};

pub use storage::Stores;

/// Everything a command needs, captured once at startup.
#[derive(Debug)]
pub struct Context {
    pub output: OutputMode,
    pub graph_url: GraphUrl,
    pub env: Environment,
    pub paths: ConfigPaths,
}

impl Context {
    pub fn new(cli: &Cli) -> Result<Self> {
        let graph_url = GraphUrl::new(&cli.graph_url).context("invalid --graph-url")?;

        Ok(Self {
            output: OutputMode::detect(cli.json, cli.pretty),
            graph_url,
            env: Environment::capture(),
            paths: ConfigPaths::discover()?,
        })
    }

    pub fn stores(&self) -> Stores {
        Stores::open(&self.paths)
    }

    /// This tool's own, writable credential store.
    pub fn local_store(&self) -> FileCredentialStore {
        self.stores().local
    }

    /// Resolve the access token, printing any expiry warnings.
    pub fn resolve(&self) -> Result<Resolved> {
        let resolved = self
            .stores()
            .resolver(self.env.token.as_deref(), Utc::now())
            .resolve()?;

        for warning in &resolved.warnings {
            output::warn(&warning.to_string());
        }
        Ok(resolved)
    }

    /// An API client for the resolved token.
    pub fn client(&self) -> Result<GraphClient> {
        let resolved = self.resolve()?;
        tracing::debug!(source = %resolved.source, "using token");
        Ok(GraphClient::new(self.graph_url.clone(), resolved.token)?)
    }

    pub fn lifecycle(&self) -> Result<TokenLifecycle> {
        Ok(TokenLifecycle::new(self.graph_url.clone())?)
    }
}
