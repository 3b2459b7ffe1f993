use crate::prompts::TruncationPolicy;
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Gemini REST base URL.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 60;

/// Per-field bound applied to access and error logs before interpolation.
pub const DEFAULT_REPORT_LOG_MAX_CHARS: usize = 15_000;

/// Upper bound on inbound request bodies (4 MiB), checked before JSON parsing.
const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct LogReportConfig {
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub limits: LimitSettings,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    /// Upstream credential. `None` keeps the service up but every report request fails with 500.
    pub api_key: Option<Secret<String>>,
    pub api_base: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct LimitSettings {
    pub truncation: TruncationPolicy,
    pub max_body_bytes: usize,
}

impl LogReportConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let timeout_secs = match optional_env("GEMINI_TIMEOUT_SECS") {
            Some(raw) => parse_positive("GEMINI_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_GEMINI_TIMEOUT_SECS,
        };

        let explain_max_chars = optional_env("EXPLAIN_LOG_MAX_CHARS")
            .map(|raw| parse_positive("EXPLAIN_LOG_MAX_CHARS", &raw))
            .transpose()?;

        let report_max_chars = match optional_env("REPORT_LOG_MAX_CHARS") {
            Some(raw) => parse_positive("REPORT_LOG_MAX_CHARS", &raw)?,
            None => DEFAULT_REPORT_LOG_MAX_CHARS,
        };

        let max_body_bytes = match optional_env("MAX_BODY_BYTES") {
            Some(raw) => parse_positive("MAX_BODY_BYTES", &raw)?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(LogReportConfig {
            common,
            gemini: GeminiSettings {
                api_key: optional_env("GEMINI_API_KEY").map(Secret::new),
                api_base: get_env("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
                model: get_env("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                timeout: Duration::from_secs(timeout_secs),
            },
            limits: LimitSettings {
                truncation: TruncationPolicy {
                    explain_max_chars,
                    report_max_chars: Some(report_max_chars),
                },
                max_body_bytes,
            },
        })
    }
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            truncation: TruncationPolicy::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Unset and empty are the same thing: an empty key is as useless as a missing one.
fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn get_env(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!(
            "{} must be a positive integer, got {:?}: {}",
            key,
            raw,
            e
        ))
    })
}

/// Like [`parse_number`], but zero is also a `ConfigError`.
fn parse_positive<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr + Default + PartialEq,
    T::Err: std::fmt::Display,
{
    let value: T = parse_number(key, raw)?;
    if value == T::default() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be at least 1, got {:?}",
            key,
            raw
        )));
    }
    Ok(value)
}
