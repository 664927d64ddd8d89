use anyhow::{Context, Result};
use dotenvy::dotenv;

/// Uploads above this size are rejected (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls"];

#[derive(Debug, Clone)]
pub struct Config {
    pub max_upload_bytes: u64,
    pub allowed_extensions: Vec<String>,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the environment, reading `.env` first.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(raw) = lookup("SALES_INSIGHTS_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("SALES_INSIGHTS_MAX_UPLOAD_BYTES is not a byte count: {raw}"))?;
        }

        if let Some(raw) = lookup("SALES_INSIGHTS_ALLOWED_EXTENSIONS") {
            let extensions: Vec<String> = raw
                .split(',')
                .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect();
            if extensions.is_empty() {
                anyhow::bail!("SALES_INSIGHTS_ALLOWED_EXTENSIONS lists no extensions");
            }
            config.allowed_extensions = extensions;
        }

        if let Some(raw) = lookup("SALES_INSIGHTS_LOG") {
            config.log_filter = raw;
        }

        Ok(config)
    }
}
