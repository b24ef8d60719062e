use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// Encoded-length ceiling for drawing payloads (5 MiB of base64 text).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Transport limit for request bodies; above the image ceiling so oversized
/// images reach the validator and get its error message.
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 8 * 1024 * 1024;

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1";
pub const DEFAULT_GATEWAY_MODEL: &str = "google/gemini-2.5-flash";

#[derive(Debug, Clone, Deserialize)]
pub struct InsightConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub records: RecordStoreConfig,
    pub gateway: GatewayConfig,
    pub limits: LimitsConfig,
    pub cors: CorsSettings,
}

/// Hosted database used as identity provider and authorization oracle.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordStoreConfig {
    pub url: String,
    pub anon_key: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    /// Missing key is not a startup failure; each analysis request reports it.
    pub api_key: Option<Secret<String>>,
    pub model: String,
    /// Ask for schema-constrained JSON on behavior analysis.
    pub structured_output: bool,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    pub max_image_bytes: usize,
    pub body_limit_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    pub allowed_headers: Vec<String>,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_headers: service_core::middleware::cors::DEFAULT_ALLOWED_HEADERS
                .iter()
                .map(|h| h.to_string())
                .collect(),
        }
    }
}

impl InsightConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let structured_output = get_env("MODEL_GATEWAY_STRUCTURED_OUTPUT", Some("true"), is_prod)?;
        let timeout = match env::var("MODEL_GATEWAY_TIMEOUT_SECS") {
            Ok(secs) => Some(Duration::from_secs(parse_number(
                "MODEL_GATEWAY_TIMEOUT_SECS",
                &secs,
            )?)),
            Err(_) => None,
        };

        let allowed_headers = env::var("CORS_ALLOWED_HEADERS")
            .map(|raw| split_list(&raw))
            .unwrap_or_else(|_| CorsSettings::default().allowed_headers);

        Ok(InsightConfig {
            common: common_config,
            records: RecordStoreConfig {
                url: get_env("RECORD_STORE_URL", None, is_prod)?,
                anon_key: Secret::new(get_env("RECORD_STORE_ANON_KEY", None, is_prod)?),
            },
            gateway: GatewayConfig {
                base_url: get_env("MODEL_GATEWAY_URL", Some(DEFAULT_GATEWAY_URL), is_prod)?,
                api_key: env::var("MODEL_GATEWAY_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty())
                    .map(Secret::new),
                model: get_env("MODEL_GATEWAY_MODEL", Some(DEFAULT_GATEWAY_MODEL), is_prod)?,
                structured_output: parse_flag("MODEL_GATEWAY_STRUCTURED_OUTPUT", &structured_output)?,
                timeout,
            },
            limits: LimitsConfig {
                max_image_bytes: parse_number(
                    "INSIGHT_MAX_IMAGE_BYTES",
                    &get_env(
                        "INSIGHT_MAX_IMAGE_BYTES",
                        Some(&DEFAULT_MAX_IMAGE_BYTES.to_string()),
                        is_prod,
                    )?,
                )?,
                body_limit_bytes: parse_number(
                    "INSIGHT_BODY_LIMIT_BYTES",
                    &get_env(
                        "INSIGHT_BODY_LIMIT_BYTES",
                        Some(&DEFAULT_BODY_LIMIT_BYTES.to_string()),
                        is_prod,
                    )?,
                )?,
            },
            cors: CorsSettings { allowed_headers },
        })
    }

    /// Whether the gateway secret is present.
    pub fn gateway_configured(&self) -> bool {
        self.gateway.api_key.is_some()
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, AppError> {
    raw.trim().parse().map_err(|_| {
        AppError::ConfigError(anyhow::anyhow!("{} must be a number, got '{}'", key, raw))
    })
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be a boolean, got '{}'",
            key,
            raw
        ))),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
