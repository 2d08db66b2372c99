use core_config::FromEnv;
use domain_lending::LendingPolicy;

pub use core_config::Environment;

/// Demo configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub policy: LendingPolicy,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            environment: Environment::from_env(),
            policy: LendingPolicy::from_env()?,
        })
    }
}
