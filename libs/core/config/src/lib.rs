pub mod tracing;

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Deployment environment, selected with `APP_ENV`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        let value = env_or_default("APP_ENV", "development");
        if value.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Read a variable, falling back to `default` when it is unset
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a variable with [`FromStr`], using `default` when it is unset.
///
/// A value that is set but unparsable is an error rather than a silent
/// fallback.
pub fn env_parse_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Parse a boolean flag. Accepts `true/false`, `1/0`, `yes/no` and `on/off`.
pub fn env_flag_or(key: &str, default: bool) -> Result<bool, ConfigError> {
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::ParseError {
            key: key.to_string(),
            details: format!("'{}' is not a boolean", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(env.is_development());
            assert!(!env.is_production());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        for value in ["production", "PRODUCTION", "Production"] {
            temp_env::with_var("APP_ENV", Some(value), || {
                assert_eq!(Environment::from_env(), Environment::Production);
            });
        }
    }

    #[test]
    fn test_environment_unknown_defaults_to_development() {
        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert_eq!(Environment::from_env(), Environment::Development);
        });
    }

    #[test]
    fn test_env_or_default() {
        temp_env::with_var("LENDIT_TEST_VAR", Some("set"), || {
            assert_eq!(env_or_default("LENDIT_TEST_VAR", "fallback"), "set");
        });
        temp_env::with_var_unset("LENDIT_TEST_VAR", || {
            assert_eq!(env_or_default("LENDIT_TEST_VAR", "fallback"), "fallback");
        });
    }

    #[test]
    fn test_env_parse_or_uses_default_when_unset() {
        temp_env::with_var_unset("LENDIT_NUMBER", || {
            assert_eq!(env_parse_or("LENDIT_NUMBER", 7_i32).unwrap(), 7);
        });
    }

    #[test]
    fn test_env_parse_or_parses_and_trims() {
        temp_env::with_var("LENDIT_NUMBER", Some(" 42 "), || {
            assert_eq!(env_parse_or("LENDIT_NUMBER", 7_i32).unwrap(), 42);
        });
    }

    #[test]
    fn test_env_parse_or_rejects_garbage() {
        temp_env::with_var("LENDIT_NUMBER", Some("forty-two"), || {
            let err = env_parse_or("LENDIT_NUMBER", 7_i32).unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { ref key, .. } if key == "LENDIT_NUMBER"));
        });
    }

    #[test]
    fn test_env_flag_or_accepts_common_spellings() {
        for (raw, expected) in [("true", true), ("1", true), ("YES", true), ("off", false), ("0", false)] {
            temp_env::with_var("LENDIT_FLAG", Some(raw), || {
                assert_eq!(env_flag_or("LENDIT_FLAG", !expected).unwrap(), expected);
            });
        }
    }

    #[test]
    fn test_env_flag_or_rejects_unknown() {
        temp_env::with_var("LENDIT_FLAG", Some("maybe"), || {
            assert!(env_flag_or("LENDIT_FLAG", true).is_err());
        });
    }
}
