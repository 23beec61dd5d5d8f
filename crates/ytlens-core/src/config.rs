use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_ALLOWED_ORIGINS: &str = "https://withanalytics.vercel.app,http://localhost:3000";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let openai_api_key = require("OPENAI_API_KEY")?;

    let env = parse_environment(&or_default("YTLENS_ENV", "development"))?;

    let bind_addr = or_default("YTLENS_BIND_ADDR", "0.0.0.0:8000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("YTLENS_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("YTLENS_LOG_LEVEL", "info");

    let openai_base_url = or_default("YTLENS_OPENAI_BASE_URL", "https://api.openai.com/v1")
        .trim_end_matches('/')
        .to_string();
    let comment_model = or_default("YTLENS_COMMENT_MODEL", "gpt-4-turbo-preview");
    let chart_model = or_default("YTLENS_CHART_MODEL", "gpt-4");

    let request_timeout_secs = or_default("YTLENS_REQUEST_TIMEOUT_SECS", "60")
        .parse::<u64>()
        .map_err(|e| invalid("YTLENS_REQUEST_TIMEOUT_SECS", e.to_string()))?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "YTLENS_REQUEST_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let allowed_origins = parse_origins(&or_default(
        "YTLENS_ALLOWED_ORIGINS",
        DEFAULT_ALLOWED_ORIGINS,
    ));

    let sampling_seed = match lookup("YTLENS_SAMPLING_SEED") {
        Ok(raw) if !raw.trim().is_empty() => Some(
            raw.trim()
                .parse::<u64>()
                .map_err(|e| invalid("YTLENS_SAMPLING_SEED", e.to_string()))?,
        ),
        _ => None,
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        openai_api_key,
        openai_base_url,
        comment_model,
        chart_model,
        request_timeout_secs,
        allowed_origins,
        sampling_seed,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "YTLENS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
