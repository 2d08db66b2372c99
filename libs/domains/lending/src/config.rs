use core_config::{env_flag_or, env_parse_or, ConfigError, FromEnv};

/// Constants for trust scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustPolicy {
    /// Score with no history
    pub base: i32,
    /// Subtracted per late return as borrower
    pub late_return_penalty: u32,
    /// Added per on-time return as lender
    pub on_time_lend_bonus: u32,
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self {
            base: 100,
            late_return_penalty: 5,
            on_time_lend_bonus: 1,
        }
    }
}

impl FromEnv for TrustPolicy {
    /// Reads from environment variables:
    /// - LENDIT_TRUST_BASE: defaults to 100
    /// - LENDIT_LATE_PENALTY: defaults to 5
    /// - LENDIT_ON_TIME_BONUS: defaults to 1
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            base: env_parse_or("LENDIT_TRUST_BASE", defaults.base)?,
            late_return_penalty: env_parse_or("LENDIT_LATE_PENALTY", defaults.late_return_penalty)?,
            on_time_lend_bonus: env_parse_or("LENDIT_ON_TIME_BONUS", defaults.on_time_lend_bonus)?,
        })
    }
}

/// Policy knobs for the lending core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LendingPolicy {
    pub trust: TrustPolicy,
    /// Whether a declined borrower may request the same item again
    pub allow_rerequest_after_reject: bool,
    /// How many available items the dashboard features
    pub featured_limit: usize,
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self {
            trust: TrustPolicy::default(),
            allow_rerequest_after_reject: true,
            featured_limit: 6,
        }
    }
}

impl FromEnv for LendingPolicy {
    /// Reads the trust policy plus:
    /// - LENDIT_ALLOW_REREQUEST_AFTER_REJECT: defaults to true
    /// - LENDIT_FEATURED_LIMIT: defaults to 6
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            trust: TrustPolicy::from_env()?,
            allow_rerequest_after_reject: env_flag_or(
                "LENDIT_ALLOW_REREQUEST_AFTER_REJECT",
                defaults.allow_rerequest_after_reject,
            )?,
            featured_limit: env_parse_or("LENDIT_FEATURED_LIMIT", defaults.featured_limit)?,
        })
    }
}
