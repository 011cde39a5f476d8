//! Layered bot configuration.
//!
//! Sources, later ones winning: built-in defaults, a TOML file
//! (`vermeer.toml` in the working directory unless a path is given),
//! `VERMEER_*` environment variables with `__` between nesting levels
//! (`VERMEER_TELEGRAM__TOKEN`), and finally the legacy variables
//! `TELEGRAM_BOT_TOKEN`, `TXT2IMG_ENDPOINT` and `PROMPT_GENERATOR_ENDPOINT`.

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vermeer_cache::CacheConfig;
use vermeer_core::LogFormat;
use vermeer_error::{ConfigError, ConfigErrorKind};
use vermeer_models::{ExpanderConfig, GenerationConfig};
use vermeer_rate_limit::RateLimitConfig;
use vermeer_social::telegram::TelegramConfig;
use vermeer_template::TemplateConfig;

/// Prefix of structured environment overrides.
pub const ENV_PREFIX: &str = "VERMEER";

/// Legacy variable names and the settings they override.
pub const LEGACY_VARIABLES: [(&str, &str); 3] = [
    ("TELEGRAM_BOT_TOKEN", "telegram.token"),
    ("TXT2IMG_ENDPOINT", "generation.endpoint"),
    ("PROMPT_GENERATOR_ENDPOINT", "expander.endpoint"),
];

/// Complete bot configuration.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct BotConfig {
    /// Telegram connection
    telegram: TelegramConfig,
    /// Image backend
    generation: GenerationConfig,
    /// Prompt expansion backend
    expander: ExpanderConfig,
    /// Image cache
    cache: CacheConfig,
    /// Chat throttling
    rate_limit: RateLimitConfig,
    /// Template overrides
    templates: TemplateConfig,
    /// Default tracing directive when `RUST_LOG` is unset
    log_level: String,
    /// Log line format
    log_format: LogFormat,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig::default(),
            generation: GenerationConfig::default(),
            expander: ExpanderConfig::default(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            templates: TemplateConfig::default(),
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl BotConfig {
    /// Load from the file at `path` (or `vermeer.toml` if present) and the
    /// process environment.
    ///
    /// The result is not validated, so command-line overrides can still be
    /// applied; call [`validate`](Self::validate) before use.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or does not deserialize.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(path, None, |name| std::env::var(name).ok())
    }

    /// Load with explicit environment sources.
    ///
    /// `env` replaces the process environment for `VERMEER_*` lookups when
    /// given; `legacy` resolves the legacy variable names.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_from(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
        legacy: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::with_name("vermeer").format(FileFormat::Toml).required(false),
        };

        let mut builder = Config::builder().add_source(file).add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        for (variable, key) in LEGACY_VARIABLES {
            builder = builder
                .set_override_option(key, legacy(variable))
                .map_err(|e| ConfigError::new(ConfigErrorKind::Load(e.to_string())))?;
        }

        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Load(e.to_string())))?
            .try_deserialize()
            .map_err(|e| {
                ConfigError::new(ConfigErrorKind::Invalid {
                    key: "config".to_string(),
                    reason: e.to_string(),
                })
            })?;

        debug!(config = ?config, "Configuration loaded");
        Ok(config)
    }

    /// Switch to dry-run mode: chat operations are only logged.
    pub fn dry_run(self) -> Self {
        let telegram = self.telegram.clone().with_disabled(true);
        self.with_telegram(telegram)
    }

    /// Check settings that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing outside dry-run mode or the
    /// chat rate is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.token().is_empty() && !*self.telegram.disabled() {
            return Err(ConfigError::new(ConfigErrorKind::Missing(
                "telegram.token".to_string(),
            )));
        }
        if *self.rate_limit.period_ms() == 0 {
            return Err(ConfigError::new(ConfigErrorKind::Invalid {
                key: "rate_limit.period_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            }));
        }
        if *self.generation.max_batch_count() == 0 {
            return Err(ConfigError::new(ConfigErrorKind::Invalid {
                key: "generation.max_batch_count".to_string(),
                reason: "must be greater than zero".to_string(),
            }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn no_legacy(_: &str) -> Option<String> {
        None
    }

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_need_a_token() {
        let config = BotConfig::load_from(Some(toml_file("").path()), env(&[]), no_legacy).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err.kind, ConfigErrorKind::Missing(ref key) if key == "telegram.token"));
    }

    #[test]
    fn test_disabled_mode_needs_no_token() {
        let file = toml_file("[telegram]\ndisabled = true\n");
        let config = BotConfig::load_from(Some(file.path()), env(&[]), no_legacy).unwrap();
        config.validate().unwrap();
        assert!(*config.telegram().disabled());
        assert_eq!(config.log_level(), "info");
        assert_eq!(*config.rate_limit().period_ms(), 500);
        assert_eq!(
            config.generation().endpoint(),
            "http://127.0.0.1:7860/sdapi/v1/txt2img"
        );
    }

    #[test]
    fn test_dry_run_override_skips_token_check() {
        let config = BotConfig::load_from(Some(toml_file("").path()), env(&[]), no_legacy)
            .unwrap()
            .dry_run();
        assert!(*config.telegram().disabled());
        config.validate().unwrap();
    }

    #[test]
    fn test_file_values_are_read() {
        let file = toml_file(
            r#"
log_level = "debug"
log_format = "json"

[telegram]
token = "from-file"
poll_timeout_secs = 5

[expander]
endpoint = "http://localhost:5000/generate"
top_k = 40

[cache]
directory = "/tmp/vermeer-cache"
"#,
        );
        let config = BotConfig::load_from(Some(file.path()), env(&[]), no_legacy).unwrap();

        assert_eq!(config.telegram().token(), "from-file");
        assert_eq!(*config.telegram().poll_timeout_secs(), 5);
        assert_eq!(*config.telegram().request_timeout_secs(), 30);
        assert_eq!(
            config.expander().endpoint().as_deref(),
            Some("http://localhost:5000/generate")
        );
        assert_eq!(*config.expander().top_k(), 40);
        assert_eq!(*config.expander().temperature(), 0.9);
        assert_eq!(config.cache().directory(), Path::new("/tmp/vermeer-cache"));
        assert_eq!(config.log_level(), "debug");
        assert_eq!(*config.log_format(), LogFormat::Json);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = toml_file("[telegram]\ntoken = \"from-file\"\n");
        let config = BotConfig::load_from(
            Some(file.path()),
            env(&[
                ("VERMEER_TELEGRAM__TOKEN", "from-env"),
                ("VERMEER_RATE_LIMIT__PERIOD_MS", "250"),
            ]),
            no_legacy,
        )
        .unwrap();

        assert_eq!(config.telegram().token(), "from-env");
        assert_eq!(*config.rate_limit().period_ms(), 250);
    }

    #[test]
    fn test_legacy_variables_win() {
        let file = toml_file("[telegram]\ntoken = \"from-file\"\n");
        let config = BotConfig::load_from(
            Some(file.path()),
            env(&[("VERMEER_TELEGRAM__TOKEN", "from-env")]),
            |name| match name {
                "TELEGRAM_BOT_TOKEN" => Some("legacy-token".to_string()),
                "TXT2IMG_ENDPOINT" => Some("http://gpu:7860/sdapi/v1/txt2img".to_string()),
                "PROMPT_GENERATOR_ENDPOINT" => Some("http://gpu:5000".to_string()),
                _ => None,
            },
        )
        .unwrap();

        assert_eq!(config.telegram().token(), "legacy-token");
        assert_eq!(
            config.generation().endpoint(),
            "http://gpu:7860/sdapi/v1/txt2img"
        );
        assert_eq!(config.expander().endpoint().as_deref(), Some("http://gpu:5000"));
    }

    #[test]
    fn test_zero_rate_is_rejected() {
        let file = toml_file("[telegram]\ndisabled = true\n[rate_limit]\nperiod_ms = 0\n");
        let config = BotConfig::load_from(Some(file.path()), env(&[]), no_legacy).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err.kind, ConfigErrorKind::Invalid { ref key, .. } if key == "rate_limit.period_ms"));
    }

    #[test]
    fn test_batch_limit_is_configurable() {
        let file = toml_file("[telegram]\ndisabled = true\n");
        let config = BotConfig::load_from(Some(file.path()), env(&[]), no_legacy).unwrap();
        assert_eq!(*config.generation().max_batch_count(), 100);

        let file = toml_file("[telegram]\ndisabled = true\n[generation]\nmax_batch_count = 8\n");
        let config = BotConfig::load_from(Some(file.path()), env(&[]), no_legacy).unwrap();
        assert_eq!(*config.generation().max_batch_count(), 8);

        let file = toml_file("[telegram]\ndisabled = true\n[generation]\nmax_batch_count = 0\n");
        let config = BotConfig::load_from(Some(file.path()), env(&[]), no_legacy).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err.kind, ConfigErrorKind::Invalid { ref key, .. } if key == "generation.max_batch_count"));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let err = BotConfig::load_from(
            Some(Path::new("/nonexistent/vermeer.toml")),
            env(&[]),
            no_legacy,
        )
        .unwrap_err();
        assert!(matches!(err.kind, ConfigErrorKind::Load(_)));
    }
}
