//! Credential store trait.

use std::path::Path;

use crate::Result;
use crate::credential::CredentialRecord;

/// A place a [`CredentialRecord`] is persisted.
pub trait CredentialStore {
    /// Location of the backing record, for diagnostics.
    fn path(&self) -> &Path;

    /// Load the stored record.
    ///
    /// A missing record and a record with an empty token both load as `None`.
    fn load(&self) -> Result<Option<CredentialRecord>>;

    /// Replace the stored record wholesale.
    fn save(&self, record: &CredentialRecord) -> Result<()>;

    /// Remove the stored record. Clearing an absent record succeeds.
    fn clear(&self) -> Result<()>;

    /// Whether `save` and `clear` are permitted.
    fn is_writable(&self) -> bool {
        true
    }
}
