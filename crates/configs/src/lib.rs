use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// `compact` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 5000, worker_threads: Some(4), log_format: default_log_format() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: String::new(), token_ttl_secs: default_token_ttl() }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaBackend {
    /// Files on local disk, served by the HTTP server.
    Local,
    /// Remote object store reached over HTTP.
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_media_backend")]
    pub backend: MediaBackend,
    #[serde(default = "default_media_root")]
    pub root_dir: String,
    #[serde(default = "default_media_public_path")]
    pub public_path: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_media_folder")]
    pub folder: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            backend: default_media_backend(),
            root_dir: default_media_root(),
            public_path: default_media_public_path(),
            endpoint: String::new(),
            api_key: String::new(),
            folder: default_media_folder(),
            max_upload_bytes: default_max_upload_bytes(),
            timeout_secs: default_http_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    #[serde(default = "default_lookup_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_photo_max_width")]
    pub photo_max_width: u32,
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            endpoint: default_lookup_endpoint(),
            api_key: String::new(),
            photo_max_width: default_photo_max_width(),
            timeout_secs: default_http_timeout(),
        }
    }
}

fn default_log_format() -> String { "compact".into() }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_token_ttl() -> u64 { 3600 }
fn default_media_backend() -> MediaBackend { MediaBackend::Local }
fn default_media_root() -> String { "uploads/images".into() }
fn default_media_public_path() -> String { "/uploads/images".into() }
fn default_media_folder() -> String { "placeshare".into() }
fn default_max_upload_bytes() -> usize { 500_000 }
fn default_http_timeout() -> u64 { 10 }
fn default_lookup_endpoint() -> String { "https://maps.googleapis.com/maps/api/place".into() }
fn default_photo_max_width() -> u32 { 800 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`); a missing file falls back to
    /// defaults so that env-only deployments still work.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.auth.normalize_from_env();
        self.auth.validate()?;
        self.media.normalize_from_env();
        self.media.validate()?;
        self.lookup.normalize_from_env();
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

fn fill_from_env(slot: &mut String, var: &str) {
    if slot.trim().is_empty() {
        if let Ok(v) = std::env::var(var) {
            *slot = v;
        }
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        fill_from_env(&mut self.url, "DATABASE_URL");
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        fill_from_env(&mut self.jwt_secret, "JWT_SECRET");
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow!("auth.jwt_secret is empty; set it in config.toml or JWT_SECRET"));
        }
        if self.token_ttl_secs == 0 {
            return Err(anyhow!("auth.token_ttl_secs must be positive"));
        }
        Ok(())
    }
}

impl MediaConfig {
    pub fn normalize_from_env(&mut self) {
        fill_from_env(&mut self.api_key, "MEDIA_API_KEY");
        fill_from_env(&mut self.endpoint, "MEDIA_ENDPOINT");
        while self.public_path.len() > 1 && self.public_path.ends_with('/') {
            self.public_path.pop();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(anyhow!("media.max_upload_bytes must be positive"));
        }
        match self.backend {
            MediaBackend::Local => {
                if self.root_dir.trim().is_empty() {
                    return Err(anyhow!("media.root_dir is required for the local backend"));
                }
                if !self.public_path.starts_with('/') {
                    return Err(anyhow!("media.public_path must start with '/'"));
                }
            }
            MediaBackend::Http => {
                let lower = self.endpoint.to_lowercase();
                if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                    return Err(anyhow!("media.endpoint must be an http(s) URL for the http backend"));
                }
            }
        }
        Ok(())
    }
}

impl LookupConfig {
    pub fn normalize_from_env(&mut self) {
        fill_from_env(&mut self.api_key, "GOOGLE_API_KEY");
        while self.endpoint.ends_with('/') {
            self.endpoint.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[server]
host = "0.0.0.0"
port = 5000

[database]
url = "postgres://u:p@localhost:5432/places"

[auth]
jwt_secret = "s3cret"

[media]
backend = "http"
endpoint = "https://media.example.com/v1/"
api_key = "k"
public_path = "/ignored/"
"#;

    #[test]
    fn parses_and_validates_sample() {
        let mut cfg = load_from_str(SAMPLE).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.auth.token_ttl_secs, 3600);
        assert_eq!(cfg.media.backend, MediaBackend::Http);
        assert_eq!(cfg.media.max_upload_bytes, 500_000);
        assert_eq!(cfg.media.public_path, "/ignored");
        assert_eq!(cfg.lookup.photo_max_width, 800);
    }

    #[test]
    fn rejects_non_postgres_url() {
        let db = DatabaseConfig { url: "mysql://x".into(), min_connections: 1, max_connections: 2, connect_timeout_secs: 1, acquire_timeout_secs: 1, ..Default::default() };
        assert!(db.validate().is_err());
    }

    #[test]
    fn http_backend_requires_endpoint() {
        let media = MediaConfig { backend: MediaBackend::Http, endpoint: String::new(), ..Default::default() };
        assert!(media.validate().is_err());
        assert!(MediaConfig::default().validate().is_ok());
    }

    #[test]
    fn auth_requires_secret() {
        let auth = AuthConfig { jwt_secret: " ".into(), token_ttl_secs: 3600 };
        assert!(auth.validate().is_err());
    }
}
