pub mod credentials;

pub use credentials::{CredentialStore, FileCredentialStore, hash_password, verify_password};
