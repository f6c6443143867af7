use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "database.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_POOL_SIZE: u32 = 4;
pub const DEFAULT_LOG_FILTER: &str = "info,medisample=debug";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// What happens to samples that still reference a diagnosis being deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagnosisDeletePolicy {
    /// Delete the diagnosis and leave referencing samples dangling.
    #[default]
    Orphan,
    /// Delete referencing samples along with the diagnosis.
    Cascade,
    /// Refuse the deletion while any sample references the diagnosis.
    Restrict,
}

impl DiagnosisDeletePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Orphan => "orphan",
            Self::Cascade => "cascade",
            Self::Restrict => "restrict",
        }
    }
}

impl fmt::Display for DiagnosisDeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagnosisDeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "orphan" => Ok(Self::Orphan),
            "cascade" => Ok(Self::Cascade),
            "restrict" => Ok(Self::Restrict),
            other => Err(format!("expected orphan, cascade or restrict, got {other:?}")),
        }
    }
}

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub pool_size: u32,
    pub diagnosis_delete_policy: DiagnosisDeletePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from an arbitrary variable source; unset variables
    /// fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = parse_var(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR)?;

        let pool_size: u32 = parse_var(&lookup, "DB_POOL_SIZE", &DEFAULT_POOL_SIZE.to_string())?;
        if pool_size == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_POOL_SIZE",
                value: pool_size.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let diagnosis_delete_policy = parse_var(
            &lookup,
            "DIAGNOSIS_DELETE_POLICY",
            DiagnosisDeletePolicy::default().as_str(),
        )?;

        Ok(Self {
            database_url,
            bind_addr,
            pool_size,
            diagnosis_delete_policy,
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let value = lookup(var).unwrap_or_else(|| default.to_string());
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.database_url, "database.db");
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.diagnosis_delete_policy, DiagnosisDeletePolicy::Orphan);
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "/tmp/lab.db"),
            ("BIND_ADDR", "0.0.0.0:9000"),
            ("DB_POOL_SIZE", "8"),
            ("DIAGNOSIS_DELETE_POLICY", "Restrict"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "/tmp/lab.db");
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.diagnosis_delete_policy, DiagnosisDeletePolicy::Restrict);
    }

    #[test]
    fn rejects_bad_bind_addr() {
        let err = Config::from_lookup(lookup_from(&[("BIND_ADDR", "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "BIND_ADDR", .. }));
    }

    #[test]
    fn rejects_zero_pool_size() {
        let err = Config::from_lookup(lookup_from(&[("DB_POOL_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "DB_POOL_SIZE", .. }));
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = Config::from_lookup(lookup_from(&[("DIAGNOSIS_DELETE_POLICY", "nuke")]))
            .unwrap_err();
        assert!(err.to_string().contains("DIAGNOSIS_DELETE_POLICY"));
    }

    #[test]
    fn policy_round_trips_through_display() {
        for policy in [
            DiagnosisDeletePolicy::Orphan,
            DiagnosisDeletePolicy::Cascade,
            DiagnosisDeletePolicy::Restrict,
        ] {
            assert_eq!(policy.to_string().parse::<DiagnosisDeletePolicy>(), Ok(policy));
        }
    }
}
