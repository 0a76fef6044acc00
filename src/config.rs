use serde::Deserialize;

/// Which `RecordStore` backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub store: StoreBackend,
    pub database_url: String,
    /// Base of the client share link: `{public_base_url}?token=...`.
    pub public_base_url: String,
    /// Notified when a project is created.
    pub creation_webhook_url: Option<String>,
    /// Notified when a recording is approved or overridden.
    pub decision_webhook_url: Option<String>,
    /// When set, webhook bodies are signed with HMAC-SHA256.
    pub webhook_secret: Option<String>,
    pub webhook_timeout_secs: u64,
    pub zoom_api_base_url: String,
    /// Live meeting lookup is used only when this is set.
    pub zoom_access_token: Option<String>,
    /// Reject direct override submission; require the preview step first.
    pub require_override_preview: bool,
    /// Key for signing override drafts between preview and confirm. A random
    /// per-process key is used when unset, so drafts do not survive a restart.
    pub draft_secret: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8501,
            store: StoreBackend::Postgres,
            database_url: "postgres://localhost/intake".into(),
            public_base_url: "http://localhost:8501".into(),
            creation_webhook_url: None,
            decision_webhook_url: None,
            webhook_secret: None,
            webhook_timeout_secs: 10,
            zoom_api_base_url: "https://api.zoom.us/v2".into(),
            zoom_access_token: None,
            require_override_preview: false,
            draft_secret: None,
        }
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let defaults = Config::default();

    let store = match std::env::var("INTAKE_STORE")
        .unwrap_or_else(|_| "postgres".into())
        .to_lowercase()
        .as_str()
    {
        "postgres" | "pg" => StoreBackend::Postgres,
        "memory" | "mem" => StoreBackend::Memory,
        other => anyhow::bail!("INTAKE_STORE must be 'postgres' or 'memory', got '{}'", other),
    };

    Ok(Config {
        port: std::env::var("INTAKE_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port),
        store,
        database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
        public_base_url: std::env::var("INTAKE_PUBLIC_BASE_URL")
            .unwrap_or(defaults.public_base_url),
        creation_webhook_url: non_empty_var("INTAKE_CREATION_WEBHOOK_URL"),
        decision_webhook_url: non_empty_var("INTAKE_DECISION_WEBHOOK_URL"),
        webhook_secret: non_empty_var("INTAKE_WEBHOOK_SECRET"),
        webhook_timeout_secs: std::env::var("INTAKE_WEBHOOK_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.webhook_timeout_secs),
        zoom_api_base_url: std::env::var("ZOOM_API_BASE_URL")
            .unwrap_or(defaults.zoom_api_base_url),
        zoom_access_token: non_empty_var("ZOOM_ACCESS_TOKEN"),
        require_override_preview: std::env::var("INTAKE_REQUIRE_OVERRIDE_PREVIEW")
            .map(|v| parse_flag(&v))
            .unwrap_or(defaults.require_override_preview),
        draft_secret: non_empty_var("INTAKE_DRAFT_SECRET"),
    })
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.webhook_timeout_secs, 10);
        assert_eq!(cfg.public_base_url, "http://localhost:8501");
        assert!(cfg.creation_webhook_url.is_none());
        assert!(!cfg.require_override_preview);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" YES "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
