/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Origin the share URLs of published documents point at
    /// (default: `http://localhost:5173`).
    pub frontend_origin: String,
    /// Directory uploads are written to (default: `./media`).
    pub media_root: String,
    /// Base URL uploaded files are served from
    /// (default: `http://localhost:3000/media`).
    pub media_base_url: String,
    /// Whether the asset purge job runs (default: `true`).
    pub purge_enabled: bool,
    /// Maximum assets processed per purge tick (default: `50`).
    pub purge_batch_size: u32,
    /// Seconds between purge ticks (default: `1800`, i.e. 30 minutes).
    pub purge_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                       |
    /// |------------------------|-------------------------------|
    /// | `HOST`                 | `0.0.0.0`                     |
    /// | `PORT`                 | `3000`                        |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`       |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                          |
    /// | `FRONTEND_ORIGIN`      | `http://localhost:5173`       |
    /// | `MEDIA_ROOT`           | `./media`                     |
    /// | `MEDIA_BASE_URL`       | `http://localhost:3000/media` |
    /// | `PURGE_ENABLED`        | `true`                        |
    /// | `PURGE_BATCH_SIZE`     | `50`                          |
    /// | `PURGE_INTERVAL_SECS`  | `1800`                        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let frontend_origin = std::env::var("FRONTEND_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .trim_end_matches('/')
            .to_string();

        let media_root = std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "./media".into());

        let media_base_url = std::env::var("MEDIA_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/media".into())
            .trim_end_matches('/')
            .to_string();

        let purge_enabled: bool = std::env::var("PURGE_ENABLED")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("PURGE_ENABLED must be true or false");

        let purge_batch_size: u32 = std::env::var("PURGE_BATCH_SIZE")
            .unwrap_or_else(|_| "50".into())
            .parse()
            .expect("PURGE_BATCH_SIZE must be a valid u32");

        let purge_interval_secs: u64 = std::env::var("PURGE_INTERVAL_SECS")
            .unwrap_or_else(|_| "1800".into())
            .parse()
            .expect("PURGE_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            frontend_origin,
            media_root,
            media_base_url,
            purge_enabled,
            purge_batch_size,
            purge_interval_secs,
        }
    }
}
