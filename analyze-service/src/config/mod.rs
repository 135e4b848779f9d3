use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    pub common: core_config::Config,
    pub openai: OpenAiConfig,
    pub cors: CorsConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Inference credential. Loaded once at startup and held in state; no
    /// request path calls the inference service.
    pub api_key: Option<Secret<String>>,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl AnalyzeConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        Ok(AnalyzeConfig {
            common: common_config,
            openai: OpenAiConfig {
                api_key: optional_env("OPENAI_API_KEY").map(Secret::new),
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(optional_env("CORS_ALLOWED_ORIGINS").as_deref()),
            },
            observability: ObservabilityConfig {
                log_level: optional_env("LOG_LEVEL")
                    .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
                otlp_endpoint: optional_env("OTLP_ENDPOINT"),
            },
        })
    }

    pub fn has_openai_credential(&self) -> bool {
        self.openai.api_key.is_some()
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Split a comma-separated origin list. `*` anywhere in it means any origin.
fn parse_origins(raw: Option<&str>) -> Vec<String> {
    let origins: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|o| o == "*") {
        Vec::new()
    } else {
        origins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn unset_origins_allow_any() {
        assert!(parse_origins(None).is_empty());
    }

    #[test]
    fn wildcard_origin_allows_any() {
        assert!(parse_origins(Some("https://a.example, *")).is_empty());
    }

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_origins(Some(" https://a.example ,,https://b.example")),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn api_key_is_redacted_in_debug_output() {
        let config = OpenAiConfig {
            api_key: Some(Secret::new("sk-test".to_string())),
        };

        assert!(!format!("{:?}", config).contains("sk-test"));
        assert_eq!(
            config.api_key.as_ref().map(|k| k.expose_secret().as_str()),
            Some("sk-test")
        );
    }
}
