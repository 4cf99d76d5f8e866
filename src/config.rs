//! Configuration file handling for pocketbook.
//!
//! The configuration file is stored at `$POCKETBOOK_HOME/config.json` and holds the address of
//! the hosted backend, the key used to talk to it, and the defaults used when filling in a new
//! transaction.

use crate::error::Res;
use crate::model::{Currency, BANK};
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

const APP_NAME: &str = "pocketbook";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";

/// Overrides `backend_url` from the config file when set.
pub const ENV_BACKEND_URL: &str = "POCKETBOOK_BACKEND_URL";

/// Overrides `anon_key` from the config file when set.
pub const ENV_ANON_KEY: &str = "POCKETBOOK_ANON_KEY";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$POCKETBOOK_HOME` and from there it loads `$POCKETBOOK_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    backend_url: Url,
}

impl Config {
    /// Creates the home directory and an initial `config.json` in it.
    ///
    /// # Arguments
    /// - `dir` - The directory that will hold the configuration, e.g. `$HOME/pocketbook`
    /// - `backend_url` - The base URL of the hosted backend, e.g. `https://abc.supabase.co`
    /// - `anon_key` - The public API key sent with every request
    ///
    /// # Errors
    /// - Returns an error if the URL or key is unusable or if any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        backend_url: &str,
        anon_key: &str,
    ) -> Res<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the pocketbook home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);

        let config_file = ConfigFile {
            backend_url: backend_url.to_string(),
            anon_key: anon_key.to_string(),
            ..ConfigFile::default()
        };
        let config = Self::resolve(root, config_path, config_file, |_| None)?;
        config.config_file.save(&config.config_path).await?;
        Ok(config)
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load the config file
    /// - apply `POCKETBOOK_BACKEND_URL` and `POCKETBOOK_ANON_KEY` overrides
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The pocketbook home directory is missing, run 'pocketbook init'")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        Self::resolve(root, config_path, config_file, |key| {
            std::env::var(key).ok()
        })
    }

    /// Applies overrides found through `env` and checks that the backend settings are usable.
    fn resolve(
        root: PathBuf,
        config_path: PathBuf,
        mut config_file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Res<Self> {
        if let Some(url) = env(ENV_BACKEND_URL).filter(|s| !s.is_empty()) {
            debug!("Using backend URL from {ENV_BACKEND_URL}");
            config_file.backend_url = url;
        }
        if let Some(key) = env(ENV_ANON_KEY).filter(|s| !s.is_empty()) {
            debug!("Using anon key from {ENV_ANON_KEY}");
            config_file.anon_key = key;
        }

        if config_file.backend_url.trim().is_empty() || config_file.anon_key.trim().is_empty() {
            bail!(
                "Missing backend URL or anon key. Set them in '{}' or through {} and {}",
                config_path.display(),
                ENV_BACKEND_URL,
                ENV_ANON_KEY
            )
        }
        let backend_url = parse_backend_url(&config_file.backend_url)?;

        Ok(Self {
            root,
            config_path,
            config_file,
            backend_url,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The backend base URL. Always ends with `/` so that relative paths can be joined onto it.
    pub fn backend_url(&self) -> &Url {
        &self.backend_url
    }

    pub fn anon_key(&self) -> &str {
        &self.config_file.anon_key
    }

    /// A user session token. When absent requests are authorized with the anon key.
    pub fn access_token(&self) -> Option<&str> {
        self.config_file.access_token.as_deref()
    }

    pub fn default_currency(&self) -> Currency {
        self.config_file.default_currency
    }

    pub fn default_account(&self) -> &str {
        &self.config_file.default_account
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "pocketbook",
///   "config_version": 1,
///   "backend_url": "https://abcdefghijkl.supabase.co",
///   "anon_key": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
///   "default_currency": "CLP",
///   "default_account": "bank"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "pocketbook"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the hosted backend
    backend_url: String,

    /// Public API key sent in the `apikey` header
    anon_key: String,

    /// Optional user session token sent as the bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,

    /// Currency preselected for new transactions
    #[serde(default)]
    default_currency: Currency,

    /// Account preselected for new transactions
    #[serde(default = "default_account")]
    default_account: String,
}

fn default_account() -> String {
    BANK.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backend_url: String::new(),
            anon_key: String::new(),
            access_token: None,
            default_currency: Currency::default(),
            default_account: default_account(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or is not a pocketbook config.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

/// Parses the backend base URL, making sure its path ends with `/`.
fn parse_backend_url(s: &str) -> Res<Url> {
    let mut url = Url::parse(s.trim()).with_context(|| format!("Invalid backend URL '{s}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("The backend URL must use http or https, got '{}'", url.scheme())
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const URL: &str = "https://abcdefghijkl.supabase.co";

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("pocketbook_home");

        let created = Config::create(&home, URL, "anon-123").await.unwrap();
        assert!(created.config_path().is_file());
        assert_eq!(created.backend_url().as_str(), "https://abcdefghijkl.supabase.co/");

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.anon_key(), "anon-123");
        assert_eq!(loaded.default_currency(), Currency::Clp);
        assert_eq!(loaded.default_account(), "bank");
        assert_eq!(loaded.access_token(), None);
    }

    #[tokio::test]
    async fn test_config_create_rejects_missing_key() {
        let dir = TempDir::new().unwrap();
        let err = Config::create(dir.path(), URL, "").await.unwrap_err();
        assert!(err.to_string().contains("Missing backend URL or anon key"));
    }

    #[tokio::test]
    async fn test_config_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("The config file is missing"));
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1,
            "backend_url": "https://example.com",
            "anon_key": "k"
        }"#;
        utils::write(&path, json).await.unwrap();
        let err = ConfigFile::load(&path).await.unwrap_err();
        assert!(err.to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_minimal_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let json = r#"{
            "app_name": "pocketbook",
            "config_version": 1,
            "backend_url": "https://example.com",
            "anon_key": "k"
        }"#;
        utils::write(&path, json).await.unwrap();
        let file = ConfigFile::load(&path).await.unwrap();
        assert_eq!(file.default_currency, Currency::Clp);
        assert_eq!(file.default_account, "bank");
    }

    #[test]
    fn test_resolve_applies_env_overrides() {
        let file = ConfigFile::default();
        let config = Config::resolve(
            PathBuf::from("/tmp/x"),
            PathBuf::from("/tmp/x/config.json"),
            file,
            |key| match key {
                ENV_BACKEND_URL => Some("http://localhost:54321".to_string()),
                ENV_ANON_KEY => Some("from-env".to_string()),
                _ => None,
            },
        )
        .unwrap();
        assert_eq!(config.backend_url().as_str(), "http://localhost:54321/");
        assert_eq!(config.anon_key(), "from-env");
    }

    #[test]
    fn test_resolve_ignores_empty_env() {
        let file = ConfigFile {
            backend_url: URL.to_string(),
            anon_key: "file-key".to_string(),
            ..ConfigFile::default()
        };
        let config = Config::resolve(
            PathBuf::from("/tmp/x"),
            PathBuf::from("/tmp/x/config.json"),
            file,
            |_| Some(String::new()),
        )
        .unwrap();
        assert_eq!(config.anon_key(), "file-key");
    }

    #[test]
    fn test_parse_backend_url() {
        assert_eq!(
            parse_backend_url("https://example.com/api").unwrap().as_str(),
            "https://example.com/api/"
        );
        assert!(parse_backend_url("not a url").is_err());
        assert!(parse_backend_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_config_file_serialization_omits_access_token() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("access_token"));
    }
}
