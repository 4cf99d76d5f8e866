use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory and an initial `config.json` holding `backend_url` and `anon_key`
/// along with default settings.
///
/// # Errors
/// - Returns an error if the URL is not an http(s) URL, the key is empty, or any file operation
///   fails.
pub async fn init(home: &Path, backend_url: &str, anon_key: &str) -> Result<Out<()>> {
    let config = Config::create(home, backend_url, anon_key)
        .await
        .context("Unable to create the home directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the pocketbook config at {}",
        config.config_path().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_writes_config() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("pb");
        let out = init(&home, "https://example.supabase.co", "key").await.unwrap();
        assert!(out.message().contains("config.json"));
        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.anon_key(), "key");
    }

    #[tokio::test]
    async fn test_init_rejects_bad_url() {
        let dir = TempDir::new().unwrap();
        let err = init(dir.path(), "ftp://example.com", "key")
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}
