//! # Secret Stores
//!
//! The database location and any credentials embedded in it are resolved from an
//! external secret store keyed by a configured secret identifier. Secrets are never
//! hard-coded and never logged.

use crate::errors::PromptError;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use tracing::info;

/// The connection secret for the indexed database.
#[derive(Clone, Deserialize)]
pub struct DatabaseSecret {
    pub db_url: String,
}

impl fmt::Debug for DatabaseSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSecret")
            .field("db_url", &"<redacted>")
            .finish()
    }
}

impl DatabaseSecret {
    fn from_json(secret_id: &str, raw: &str) -> Result<Self, PromptError> {
        let secret: DatabaseSecret = serde_json::from_str(raw).map_err(|e| {
            PromptError::InvalidSecret(format!("secret '{secret_id}' is not valid JSON: {e}"))
        })?;
        if secret.db_url.trim().is_empty() {
            return Err(PromptError::InvalidSecret(format!(
                "secret '{secret_id}' has an empty db_url"
            )));
        }
        Ok(secret)
    }
}

/// A source of database secrets.
#[async_trait]
pub trait SecretStore: Send + Sync + fmt::Debug {
    async fn get_database_secret(&self, secret_id: &str) -> Result<DatabaseSecret, PromptError>;
}

fn require_secret_id(secret_id: &str) -> Result<(), PromptError> {
    if secret_id.trim().is_empty() {
        return Err(PromptError::MissingConfiguration(
            "secret name is empty".to_string(),
        ));
    }
    Ok(())
}

/// Reads secrets from environment variables.
///
/// The secret `prod/text-to-sql-db` is read from `PROD_TEXT_TO_SQL_DB`; its value is
/// the secret JSON.
#[derive(Debug, Default, Clone)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn env_var_name(secret_id: &str) -> String {
        secret_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn get_database_secret(&self, secret_id: &str) -> Result<DatabaseSecret, PromptError> {
        require_secret_id(secret_id)?;
        let var = Self::env_var_name(secret_id);
        let raw = std::env::var(&var)
            .map_err(|_| PromptError::SecretNotFound(format!("{secret_id} (env {var})")))?;
        info!("Resolved database secret '{secret_id}' from environment.");
        DatabaseSecret::from_json(secret_id, &raw)
    }
}

/// Reads secrets from `<dir>/<secret_id>.json`.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    dir: PathBuf,
}

impl FileSecretStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get_database_secret(&self, secret_id: &str) -> Result<DatabaseSecret, PromptError> {
        require_secret_id(secret_id)?;
        let path = self.dir.join(format!("{secret_id}.json"));
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PromptError::SecretNotFound(format!("{}: {e}", path.display())))?;
        info!("Resolved database secret '{secret_id}' from file store.");
        DatabaseSecret::from_json(secret_id, &raw)
    }
}

/// A fixed secret, for deployments that configure the database path directly.
#[derive(Clone)]
pub struct StaticSecretStore {
    secret: DatabaseSecret,
}

impl fmt::Debug for StaticSecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSecretStore").finish_non_exhaustive()
    }
}

impl StaticSecretStore {
    pub fn new(db_url: impl Into<String>) -> Self {
        Self {
            secret: DatabaseSecret {
                db_url: db_url.into(),
            },
        }
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn get_database_secret(&self, secret_id: &str) -> Result<DatabaseSecret, PromptError> {
        require_secret_id(secret_id)?;
        Ok(self.secret.clone())
    }
}
