//! Configuration loading and representation.
//!
//! Settings come from the environment:
//!
//! | Variable | Values | Default |
//! |---|---|---|
//! | `HOOKLINE_STRICT_REGISTRATION` | `true`/`false`/`1`/`0` | `false` |
//! | `HOOKLINE_FAILURE_POLICY` | `fail_fast`/`log_and_continue` | `fail_fast` |
//! | `HOOKLINE_DEFAULT_GROUP` | any non-blank name | `User` |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hookline_auth::{DEFAULT_GROUP, GroupName};
use hookline_events::{FailurePolicy, RegistryOptions};

pub const STRICT_REGISTRATION_VAR: &str = "HOOKLINE_STRICT_REGISTRATION";
pub const FAILURE_POLICY_VAR: &str = "HOOKLINE_FAILURE_POLICY";
pub const DEFAULT_GROUP_VAR: &str = "HOOKLINE_DEFAULT_GROUP";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid value `{value}` ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Process configuration for the signal layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HooklineConfig {
    pub strict_registration: bool,
    pub failure_policy: FailurePolicy,
    pub default_group: GroupName,
}

impl Default for HooklineConfig {
    fn default() -> Self {
        Self {
            strict_registration: false,
            failure_policy: FailurePolicy::FailFast,
            default_group: DEFAULT_GROUP,
        }
    }
}

impl HooklineConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load through an arbitrary variable lookup (unset → `None`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(STRICT_REGISTRATION_VAR) {
            config.strict_registration = parse_bool(STRICT_REGISTRATION_VAR, &raw)?;
        }

        if let Some(raw) = lookup(FAILURE_POLICY_VAR) {
            config.failure_policy = match raw.trim().to_ascii_lowercase().as_str() {
                "fail_fast" => FailurePolicy::FailFast,
                "log_and_continue" => FailurePolicy::LogAndContinue,
                _ => {
                    return Err(ConfigError::invalid(
                        FAILURE_POLICY_VAR,
                        &raw,
                        "expected fail_fast or log_and_continue",
                    ));
                }
            };
        }

        if let Some(raw) = lookup(DEFAULT_GROUP_VAR) {
            config.default_group = GroupName::parse(raw.clone())
                .map_err(|e| ConfigError::invalid(DEFAULT_GROUP_VAR, &raw, e.to_string()))?;
        }

        Ok(config)
    }

    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            strict: self.strict_registration,
        }
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(var, raw, "expected a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<HooklineConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HooklineConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config, HooklineConfig::default());
        assert!(!config.registry_options().strict);
        assert_eq!(config.default_group.as_str(), "User");
    }

    #[test]
    fn reads_every_variable() {
        let config = load(&[
            (STRICT_REGISTRATION_VAR, "TRUE"),
            (FAILURE_POLICY_VAR, "log_and_continue"),
            (DEFAULT_GROUP_VAR, "Members"),
        ])
        .unwrap();

        assert!(config.strict_registration);
        assert_eq!(config.failure_policy, FailurePolicy::LogAndContinue);
        assert_eq!(config.default_group.as_str(), "Members");
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = load(&[(FAILURE_POLICY_VAR, "retry")]).unwrap_err();
        assert!(err.to_string().starts_with(FAILURE_POLICY_VAR));

        let err = load(&[(STRICT_REGISTRATION_VAR, "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == STRICT_REGISTRATION_VAR));

        assert!(load(&[(DEFAULT_GROUP_VAR, "  ")]).is_err());
    }

    #[test]
    fn deserializes_with_defaults_for_missing_fields() {
        let config: HooklineConfig =
            serde_json::from_str(r#"{"failure_policy":"log_and_continue"}"#).unwrap();
        assert_eq!(config.failure_policy, FailurePolicy::LogAndContinue);
        assert_eq!(config.default_group, DEFAULT_GROUP);
    }
}
