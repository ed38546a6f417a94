use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. Values that
/// operators tune at runtime (output URL, enhancement model, ...) live in
/// the `settings` table instead.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// SQLite connection string.
    pub database_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `300`).
    pub request_timeout_secs: u64,
    /// Upper bound on waiting for one ComfyUI prompt (default: `900`).
    pub generation_timeout_secs: u64,
    /// Timeout of a single queue-depth probe (default: `10`).
    pub queue_probe_timeout_secs: u64,
    /// Timeout of a single Ollama request (default: `180`).
    pub ollama_timeout_secs: u64,
    /// Directory holding workflow JSON files.
    pub workflows_dir: PathBuf,
    /// Directory generated images are written to and served from.
    pub outputs_dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
#[error("{var} must be a valid {expected}, got '{value}'")]
pub struct ConfigError {
    pub var: &'static str,
    pub expected: &'static str,
    pub value: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                              |
    /// |------------------------------|--------------------------------------|
    /// | `HOST`                       | `0.0.0.0`                            |
    /// | `PORT`                       | `8000`                               |
    /// | `DATABASE_URL`               | `sqlite://data/genimage.db?mode=rwc` |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`              |
    /// | `REQUEST_TIMEOUT_SECS`       | `300`                                |
    /// | `COMFYUI_GENERATION_TIMEOUT` | `900`                                |
    /// | `QUEUE_PROBE_TIMEOUT_SECS`   | `10`                                 |
    /// | `OLLAMA_TIMEOUT_SECS`        | `180`                                |
    /// | `WORKFLOWS_DIR`              | `workflows`                          |
    /// | `OUTPUTS_DIR`                | `outputs`                            |
    pub fn from_env() -> Result<Self, ConfigError> {
        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if let Some(bad) = cors_origins
            .iter()
            .find(|o| o.parse::<axum::http::HeaderValue>().is_err())
        {
            return Err(ConfigError {
                var: "CORS_ORIGINS",
                expected: "list of origins",
                value: bad.clone(),
            });
        }

        Ok(Self {
            host: env_or("HOST", "0.0.0.0"),
            port: parse_env("PORT", "8000", "u16")?,
            database_url: env_or("DATABASE_URL", "sqlite://data/genimage.db?mode=rwc"),
            cors_origins,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", "300", "u64")?,
            generation_timeout_secs: parse_env("COMFYUI_GENERATION_TIMEOUT", "900", "u64")?,
            queue_probe_timeout_secs: parse_env("QUEUE_PROBE_TIMEOUT_SECS", "10", "u64")?,
            ollama_timeout_secs: parse_env("OLLAMA_TIMEOUT_SECS", "180", "u64")?,
            workflows_dir: PathBuf::from(env_or("WORKFLOWS_DIR", "workflows")),
            outputs_dir: PathBuf::from(env_or("OUTPUTS_DIR", "outputs")),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn queue_probe_timeout(&self) -> Duration {
        Duration::from_secs(self.queue_probe_timeout_secs)
    }

    pub fn ollama_timeout(&self) -> Duration {
        Duration::from_secs(self.ollama_timeout_secs)
    }
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.into())
}

fn parse_env<T: FromStr>(
    var: &'static str,
    default: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let value = env_or(var, default);
    value.trim().parse().map_err(|_| ConfigError {
        var,
        expected,
        value,
    })
}
