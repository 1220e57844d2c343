//! Read-only collaborator snapshots: scheme configuration and wallet.

mod configuration;
mod credentials;
mod snapshot;

pub use configuration::{
    credential_type_id, AttributeType, CredentialType, IrmaConfiguration, PORTRAIT_PHOTO_HINT,
};
pub use credentials::{Credential, CredentialAttribute, Credentials, RawCredential};
pub use snapshot::{Snapshot, SnapshotError, SnapshotStore};
