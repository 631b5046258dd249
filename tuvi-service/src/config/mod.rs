use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Gemini REST endpoint used when `GEMINI_API_BASE` is not set.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const DEFAULT_TEXT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct TuviConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub google: GoogleConfig,
    pub models: ModelConfig,
    pub provider: ProviderConfig,
    pub storage: StorageConfig,
    /// OTLP collector for span export; logging only when unset.
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub api_key: String,
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Vision-capable model used for both readings and chart analysis.
    pub text_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Upper bound for a single generation call, including network time.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory where uploaded chart images are staged while a request runs.
    pub upload_dir: PathBuf,
    /// Directory served at `/` (index.html and assets).
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TuviConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        Self::from_lookup(common, |key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// `load` passes the process environment; tests pass a map.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()) == "prod";
        let get = |key: &str, default: Option<&str>| get_env(&lookup, key, default, is_prod);

        Ok(TuviConfig {
            common,
            google: GoogleConfig {
                api_key: get("GEMINI_API_KEY", None)?,
                api_base: get("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE))?,
            },
            models: ModelConfig {
                text_model: get("GEMINI_MODEL", Some(DEFAULT_TEXT_MODEL))?,
            },
            provider: ProviderConfig {
                timeout_secs: get("GENAI_TIMEOUT_SECS", Some(&DEFAULT_TIMEOUT_SECS.to_string()))?
                    .parse()
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
            storage: StorageConfig {
                upload_dir: get("UPLOAD_DIR", Some("uploads"))?.into(),
                static_dir: get("STATIC_DIR", Some("public"))?.into(),
                max_upload_bytes: get(
                    "MAX_UPLOAD_BYTES",
                    Some(&DEFAULT_MAX_UPLOAD_BYTES.to_string()),
                )?
                .parse()
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            },
            otlp_endpoint: lookup("OTLP_ENDPOINT").filter(|v| !v.is_empty()),
        })
    }
}

fn get_env<F>(lookup: &F, key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => match default {
            Some(def) => Ok(def.to_string()),
            None if is_prod => Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is required in production but not set",
                key
            ))),
            None => {
                tracing::warn!(key, "Not set; using an empty value outside production");
                Ok(String::new())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_api_key_is_set() {
        let config =
            TuviConfig::from_lookup(core_config::Config::default(), lookup(&[("GEMINI_API_KEY", "k")]))
                .unwrap();

        assert_eq!(config.google.api_key, "k");
        assert_eq!(config.google.api_base, DEFAULT_GEMINI_API_BASE);
        assert_eq!(config.models.text_model, "gemini-1.5-flash");
        assert_eq!(config.provider.timeout(), Duration::from_secs(120));
        assert_eq!(config.storage.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.storage.static_dir, PathBuf::from("public"));
        assert_eq!(config.storage.max_upload_bytes, 10 * 1024 * 1024);
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn missing_api_key_is_empty_outside_production() {
        let config = TuviConfig::from_lookup(core_config::Config::default(), lookup(&[])).unwrap();

        assert!(config.google.api_key.is_empty());
        assert_eq!(config.models.text_model, "gemini-1.5-flash");
    }

    #[test]
    fn missing_api_key_is_a_config_error_in_production() {
        let result = TuviConfig::from_lookup(
            core_config::Config::default(),
            lookup(&[("ENVIRONMENT", "prod")]),
        );

        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn production_keeps_defaults_for_optional_keys() {
        let config = TuviConfig::from_lookup(
            core_config::Config::default(),
            lookup(&[("ENVIRONMENT", "prod"), ("GEMINI_API_KEY", "k")]),
        )
        .unwrap();

        assert_eq!(config.google.api_base, DEFAULT_GEMINI_API_BASE);
        assert_eq!(config.storage.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn unparseable_numbers_fall_back_to_defaults() {
        let config = TuviConfig::from_lookup(
            core_config::Config::default(),
            lookup(&[
                ("GEMINI_API_KEY", "k"),
                ("GENAI_TIMEOUT_SECS", "soon"),
                ("MAX_UPLOAD_BYTES", "lots"),
                ("UPLOAD_DIR", "/tmp/tuvi"),
            ]),
        )
        .unwrap();

        assert_eq!(config.provider.timeout_secs, 120);
        assert_eq!(config.storage.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.storage.upload_dir, PathBuf::from("/tmp/tuvi"));
    }
}
