//! Server configuration, loaded from environment variables at startup.

use std::time::Duration;

/// Runtime configuration for chatrelay-server.
///
/// Every field has a default so the server starts without any environment
/// variables set; only the upstream API key is needed for `/api/chat/` to
/// produce replies.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// SQLite database URL (default: `"sqlite://chatrelay.db"`).
    /// The file is created on first start.
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated CORS origin allow-list. `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_docs: bool,

    /// Remove LaTeX `\boxed{..}` wrappers from upstream replies.
    pub strip_boxed: bool,

    /// bcrypt work factor for new password hashes.
    pub bcrypt_cost: u32,

    /// Upstream chat-completion settings.
    pub upstream: UpstreamConfig,
}

/// Settings for the OpenAI-compatible chat-completion provider.
#[derive(Clone)]
pub struct UpstreamConfig {
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    /// Bearer token sent as `Authorization`.
    pub api_key: String,
    /// Model identifier forwarded in every request.
    pub model: String,
    /// Sent as `X-Title` for provider-side attribution.
    pub app_title: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("model", &self.model)
            .field("app_title", &self.app_title)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        Self {
            bind_address: env_or("CHATRELAY_BIND", "0.0.0.0:8000"),
            database_url: env_or("CHATRELAY_DATABASE_URL", "sqlite://chatrelay.db"),
            log_level: env_or("CHATRELAY_LOG", "info"),
            log_json: parse_flag(lookup("CHATRELAY_LOG_JSON"), false),
            cors_allowed_origins: lookup("CHATRELAY_CORS_ORIGINS").filter(|v| !v.trim().is_empty()),
            enable_docs: parse_flag(lookup("CHATRELAY_ENABLE_DOCS"), true),
            strip_boxed: parse_flag(lookup("CHATRELAY_STRIP_BOXED"), true),
            bcrypt_cost: parse_or(lookup("CHATRELAY_BCRYPT_COST"), bcrypt::DEFAULT_COST),
            upstream: UpstreamConfig {
                base_url: env_or("CHATRELAY_UPSTREAM_URL", "https://openrouter.ai/api/v1"),
                api_key: env_or("OPENROUTER_API_KEY", ""),
                model: env_or("CHATRELAY_UPSTREAM_MODEL", "openai/gpt-3.5-turbo"),
                app_title: env_or("CHATRELAY_APP_TITLE", "Chat Relay"),
                timeout: Duration::from_secs(parse_or(
                    lookup("CHATRELAY_UPSTREAM_TIMEOUT_SECS"),
                    60,
                )),
            },
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_flag(value: Option<String>, default: bool) -> bool {
    match value {
        Some(v) => v == "1" || v.eq_ignore_ascii_case("true"),
        None => default,
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config_from(&[]);
        assert_eq!(cfg.bind_address, "0.0.0.0:8000");
        assert_eq!(cfg.database_url, "sqlite://chatrelay.db");
        assert!(!cfg.log_json);
        assert!(cfg.enable_docs);
        assert!(cfg.strip_boxed);
        assert_eq!(cfg.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(cfg.cors_allowed_origins.is_none());
        assert_eq!(cfg.upstream.model, "openai/gpt-3.5-turbo");
        assert_eq!(cfg.upstream.timeout, Duration::from_secs(60));
        assert!(cfg.upstream.api_key.is_empty());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = config_from(&[
            ("CHATRELAY_BIND", "127.0.0.1:9000"),
            ("CHATRELAY_LOG_JSON", "TRUE"),
            ("CHATRELAY_STRIP_BOXED", "0"),
            ("CHATRELAY_BCRYPT_COST", "4"),
            ("CHATRELAY_UPSTREAM_TIMEOUT_SECS", "5"),
            ("OPENROUTER_API_KEY", "sk-test"),
        ]);
        assert_eq!(cfg.bind_address, "127.0.0.1:9000");
        assert!(cfg.log_json);
        assert!(!cfg.strip_boxed);
        assert_eq!(cfg.bcrypt_cost, 4);
        assert_eq!(cfg.upstream.timeout, Duration::from_secs(5));
        assert_eq!(cfg.upstream.api_key, "sk-test");
    }

    #[test]
    fn unparsable_numbers_fall_back() {
        let cfg = config_from(&[("CHATRELAY_BCRYPT_COST", "high")]);
        assert_eq!(cfg.bcrypt_cost, bcrypt::DEFAULT_COST);
    }

    #[test]
    fn blank_cors_list_means_any_origin() {
        let cfg = config_from(&[("CHATRELAY_CORS_ORIGINS", "  ")]);
        assert!(cfg.cors_allowed_origins.is_none());
    }

    #[test]
    fn debug_output_hides_api_key() {
        let cfg = config_from(&[("OPENROUTER_API_KEY", "sk-secret")]);
        let rendered = format!("{:?}", cfg.upstream);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
