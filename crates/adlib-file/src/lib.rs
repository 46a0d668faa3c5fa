//! adlib-file - Filesystem-backed credential stores.

mod store;

pub use store::FileCredentialStore;
