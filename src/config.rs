//! Application-level configuration loading: listener, storage backend and upstream providers.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MCDB_CONFIG_PATH";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerSettings,
    /// Catalog persistence settings.
    pub storage: StorageSettings,
    /// IGDB gateway settings.
    pub igdb: IgdbSettings,
    /// MobyGames gateway settings.
    pub moby: MobySettings,
    /// Rolling JSON log file settings.
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// HTTP listener settings.
pub struct ServerSettings {
    /// TCP port bound on all interfaces.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Log file written next to the console output.
pub struct LoggingSettings {
    /// Directory receiving the log files. Blank disables file logging.
    pub directory: String,
    /// File name prefix; files are named `<prefix>.<date>.log`.
    pub file_prefix: String,
    /// Number of rotated files kept on disk.
    pub max_files: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: "logs".into(),
            file_prefix: "mcdb".into(),
            max_files: 5,
        }
    }
}

impl LoggingSettings {
    /// Directory for the JSON log files; `None` disables file logging.
    pub fn directory(&self) -> Option<&Path> {
        non_blank(Some(self.directory.as_str())).map(Path::new)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Catalog store implementation selected at startup.
pub enum StorageBackend {
    /// MongoDB document store, supervised in the background.
    #[default]
    Mongo,
    /// Process-local store; contents are lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Catalog persistence settings.
pub struct StorageSettings {
    /// Which store implementation to run.
    pub backend: StorageBackend,
    /// Connection settings used by the MongoDB backend.
    pub mongo: MongoSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// MongoDB connection settings: either a full URI or its individual parts.
pub struct MongoSettings {
    /// Complete connection string; takes precedence over the other fields.
    pub uri: Option<String>,
    pub host: String,
    pub port: u16,
    /// Authenticates against `database` when set together with `password`.
    pub user: Option<String>,
    pub password: Option<String>,
    /// Database holding the `games`, `platforms` and `gamegenres` collections.
    pub database: String,
}

impl Default for MongoSettings {
    fn default() -> Self {
        Self {
            uri: None,
            host: "localhost".into(),
            port: 27017,
            user: None,
            password: None,
            database: "mcdb".into(),
        }
    }
}

impl MongoSettings {
    /// Connection string used to reach the server. Credentials never appear in it; they are
    /// handed to the driver separately (see [`MongoSettings::user`]).
    pub fn connection_uri(&self) -> String {
        if let Some(uri) = non_blank(self.uri.as_deref()) {
            return uri.to_owned();
        }
        format!("mongodb://{}:{}/{}", self.host, self.port, self.database)
    }

    /// User name to authenticate with, when one is configured.
    pub fn user(&self) -> Option<&str> {
        non_blank(self.user.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Outbound HTTP policy for one upstream provider.
pub struct UpstreamSettings {
    /// Budget for establishing the TCP and TLS connection.
    pub connect_timeout_ms: u64,
    /// Budget for a whole request, body included.
    pub request_timeout_ms: u64,
    /// Extra attempts for idempotent calls; zero disables retries.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on every further attempt.
    pub retry_base_delay_ms: u64,
    /// Upper bound for the doubled retry delay.
    pub retry_max_delay_ms: u64,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 3_000,
            request_timeout_ms: 10_000,
            max_retries: 2,
            retry_base_delay_ms: 200,
            retry_max_delay_ms: 2_000,
        }
    }
}

impl UpstreamSettings {
    /// [`connect_timeout_ms`](Self::connect_timeout_ms) as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// IGDB gateway settings. The provider is disabled unless both credentials are set.
pub struct IgdbSettings {
    /// API root, e.g. `https://api.igdb.com/v4`.
    pub base_url: String,
    pub client_id: Option<String>,
    pub access_token: Option<String>,
    pub upstream: UpstreamSettings,
}

impl Default for IgdbSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.igdb.com/v4".into(),
            client_id: None,
            access_token: None,
            upstream: UpstreamSettings::default(),
        }
    }
}

impl IgdbSettings {
    /// `(client_id, access_token)` when both are configured and non-blank.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let client_id = non_blank(self.client_id.as_deref())?;
        let token = non_blank(self.access_token.as_deref())?;
        Some((client_id, token))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// MobyGames gateway settings. The provider is disabled without an API key.
pub struct MobySettings {
    pub base_url: String,
    /// Sent as the `api_key` query parameter.
    pub api_key: Option<String>,
    pub upstream: UpstreamSettings,
}

impl Default for MobySettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.mobygames.com/v1".into(),
            api_key: None,
            upstream: UpstreamSettings::default(),
        }
    }
}

impl MobySettings {
    /// The API key unless missing or blank.
    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults, then apply
    /// environment overrides.
    pub fn load() -> Self {
        let mut config = Self::from_file();
        config.apply_env_overrides(|key| env::var(key).ok());
        config
    }

    fn from_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded configuration file");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Overlay values read through `lookup` (normally the process environment).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_lookup = |key: &str| lookup(key);
        let lookup = |key: &str| raw_lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(raw) = lookup("PORT").or_else(|| lookup("SERVER_PORT")) {
            match raw.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(err) => warn!(value = %raw, error = %err, "ignoring invalid port override"),
            }
        }

        if let Some(raw) = lookup("STORAGE_BACKEND") {
            match raw.parse::<StorageBackend>() {
                Ok(backend) => self.storage.backend = backend,
                Err(err) => warn!(value = %raw, error = %err, "ignoring invalid storage backend"),
            }
        }

        if let Some(directory) = raw_lookup("LOG_DIR") {
            self.logging.directory = directory;
        }

        if let Some(uri) = lookup("MONGO_URI") {
            self.storage.mongo.uri = Some(uri);
        }
        if let Some(database) = lookup("MONGO_DB") {
            self.storage.mongo.database = database;
        }

        if let Some(base_url) = lookup("IGDB_BASE_URL") {
            self.igdb.base_url = base_url;
        }
        if let Some(client_id) = lookup("IGDB_CLIENT_ID") {
            self.igdb.client_id = Some(client_id);
        }
        if let Some(token) = lookup("IGDB_ACCESS_TOKEN") {
            self.igdb.access_token = Some(token);
        }

        if let Some(base_url) = lookup("MOBY_BASE_URL") {
            self.moby.base_url = base_url;
        }
        if let Some(api_key) = lookup("MOBY_API_KEY") {
            self.moby.api_key = Some(api_key);
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_sections() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "server": { "port": 9000 }, "moby": { "apiKey": "secret" } }"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.backend, StorageBackend::Mongo);
        assert_eq!(config.moby.api_key(), Some("secret"));
        assert_eq!(config.moby.base_url, "https://api.mobygames.com/v1");
        assert_eq!(config.igdb.upstream.max_retries, 2);
        assert!(config.igdb.credentials().is_none());
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(lookup_from(&[
            ("SERVER_PORT", "3000"),
            ("STORAGE_BACKEND", "memory"),
            ("MONGO_URI", "mongodb://db:27017"),
            ("MONGO_DB", "games"),
            ("IGDB_CLIENT_ID", "client"),
            ("IGDB_ACCESS_TOKEN", "token"),
            ("MOBY_BASE_URL", "http://localhost:9999"),
        ]));

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.mongo.connection_uri(), "mongodb://db:27017");
        assert_eq!(config.storage.mongo.database, "games");
        assert_eq!(config.igdb.credentials(), Some(("client", "token")));
        assert_eq!(config.moby.base_url, "http://localhost:9999");
    }

    #[test]
    fn blank_log_dir_disables_file_logging() {
        let mut config = AppConfig::default();
        assert_eq!(config.logging.directory(), Some(Path::new("logs")));

        config.apply_env_overrides(lookup_from(&[("LOG_DIR", "")]));
        assert!(config.logging.directory().is_none());
    }

    #[test]
    fn port_prefers_port_over_server_port() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(lookup_from(&[("PORT", "4000"), ("SERVER_PORT", "5000")]));
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(lookup_from(&[
            ("PORT", "not-a-port"),
            ("STORAGE_BACKEND", "couch"),
            ("MOBY_API_KEY", "   "),
        ]));

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Mongo);
        assert!(config.moby.api_key().is_none());
    }

    #[test]
    fn mongo_uri_is_built_from_parts_without_credentials() {
        let mut settings = MongoSettings::default();
        assert_eq!(settings.connection_uri(), "mongodb://localhost:27017/mcdb");

        settings.user = Some("admin".into());
        settings.password = Some("p@ss:word".into());
        settings.host = "db.local".into();
        assert_eq!(settings.connection_uri(), "mongodb://db.local:27017/mcdb");
        assert_eq!(settings.user(), Some("admin"));
    }
}
