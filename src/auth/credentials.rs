//! Per-user credential files.
//!
//! Each user is one JSON document at `<users_dir>/<username>.json` holding a
//! bcrypt `hashed_password` (`$2a$`, `$2b$` or `$2y$`).

use crate::records::validate_scope;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

pub use bcrypt::DEFAULT_COST;

pub trait CredentialStore: Send + Sync {
    /// `true` only when the user exists and the password matches. Missing
    /// users, unreadable files and malformed hashes all yield `false`.
    fn verify<'a>(
        &'a self,
        username: &'a str,
        password: &'a str,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserFile {
    #[serde(default)]
    username: Option<String>,
    hashed_password: String,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

pub struct FileCredentialStore {
    users_dir: PathBuf,
    cost: u32,
}

impl FileCredentialStore {
    pub fn new(users_dir: impl Into<PathBuf>) -> Self {
        Self {
            users_dir: users_dir.into(),
            cost: DEFAULT_COST,
        }
    }

    /// bcrypt work factor for users created by this store.
    #[must_use]
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    pub fn users_dir(&self) -> &Path {
        &self.users_dir
    }

    fn user_path(&self, username: &str) -> Option<PathBuf> {
        validate_scope(username).ok()?;
        Some(self.users_dir.join(format!("{username}.json")))
    }

    async fn verify_inner(&self, username: &str, password: &str) -> Result<bool> {
        let Some(path) = self.user_path(username) else {
            bail!("invalid username");
        };
        let contents = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read user file {}", path.display()))?;
        let user: UserFile = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse user file {}", path.display()))?;
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || verify_password(&password, &user.hashed_password))
            .await
            .context("Password check task failed")?
    }

    /// Create a user file. Refuses to overwrite an existing user.
    pub async fn create_user(&self, username: &str, password: &str) -> Result<PathBuf> {
        let Some(path) = self.user_path(username) else {
            bail!("Invalid username '{username}'. Use letters, numbers, '-', '_', '.' or '@'");
        };
        if password.is_empty() {
            bail!("Password cannot be empty");
        }
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            bail!("User '{username}' already exists");
        }

        tokio::fs::create_dir_all(&self.users_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create users directory: {}",
                    self.users_dir.display()
                )
            })?;

        let cost = self.cost;
        let owned = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || hash_password(&owned, cost))
            .await
            .context("Password hashing task failed")??;

        let user = UserFile {
            username: Some(username.to_string()),
            hashed_password,
            extra: serde_json::Map::new(),
        };
        let json = serde_json::to_string_pretty(&user)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write user file {}", path.display()))?;

        tracing::info!(username, "Created user");
        Ok(path)
    }
}

impl CredentialStore for FileCredentialStore {
    fn verify<'a>(
        &'a self,
        username: &'a str,
        password: &'a str,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move {
            match self.verify_inner(username, password).await {
                Ok(true) => true,
                Ok(false) => {
                    tracing::warn!(username, "Password mismatch");
                    false
                }
                Err(e) => {
                    tracing::warn!(username, "Credential check failed: {e:#}");
                    false
                }
            }
        })
    }
}

pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost).context("Failed to hash password")
}

/// Check `password` against a stored bcrypt hash. Anything bcrypt cannot
/// parse is an error.
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    bcrypt::verify(password, stored).context("unrecognized password hash format")
}
