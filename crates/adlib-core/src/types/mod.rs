//! Validated newtypes shared across the workspace.

mod graph_url;
mod token;

pub use graph_url::{DEFAULT_GRAPH_URL, GraphUrl};
pub use token::{AccessToken, AppCredentials};
