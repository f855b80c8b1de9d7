/// 환경 변수 기반 설정
// region:    --- Imports
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Config Error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("필수 환경 변수가 없습니다: {0}")]
    MissingEnvVar(String),
    #[error("환경 변수 {var} 값이 잘못되었습니다: {reason}")]
    InvalidEnvValue { var: String, reason: String },
}
// endregion: --- Config Error

// region:    --- Config
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub bind_addr: String,
    pub database_max_connections: u32,
    pub cache_ttl: Duration,
    pub reconcile_interval: Duration,
}

impl Config {
    /// .env 파일을 먼저 읽고 환경 변수에서 설정 생성
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        Ok(Self {
            database_url,
            redis_url: lookup("REDIS_URL").filter(|url| !url.is_empty()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            cache_ttl: Duration::from_secs(parse_or(&lookup, "CACHE_TTL_SECS", 300)?),
            reconcile_interval: Duration::from_secs(parse_or(
                &lookup,
                "RECONCILE_INTERVAL_SECS",
                60,
            )?),
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvValue {
            var: var.to_string(),
            reason: e.to_string(),
        }),
    }
}
// endregion: --- Config

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_missing() {
        let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db")]))
            .unwrap();

        assert_eq!(config.database_url, "postgres://db");
        assert!(config.redis_url.is_none());
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.reconcile_interval, Duration::from_secs(60));
    }

    #[test]
    fn missing_database_url_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(var)) if var == "DATABASE_URL"));
    }

    #[test]
    fn invalid_number_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("CACHE_TTL_SECS", "soon"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnvValue { var, .. }) if var == "CACHE_TTL_SECS"
        ));
    }
}
