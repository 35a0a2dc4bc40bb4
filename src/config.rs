use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use derive_getters::Getters;

use crate::app::{InvestedAmountPolicy, utils::expand_path};

pub const DEFAULT_DATABASE: &str = "portfolio.db";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime settings, read from the environment (and `.env`) and then
/// overridden by command-line flags.
#[derive(Clone, Debug, Getters)]
pub struct Config {
    database_path: PathBuf,
    invested_policy: InvestedAmountPolicy,
    log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let database = env::var("PSX_DATABASE").unwrap_or_else(|_| DEFAULT_DATABASE.to_string());
        let invested_policy = match env::var("PSX_INVESTED_POLICY") {
            Ok(policy) => policy
                .parse::<InvestedAmountPolicy>()
                .with_context(|| format!("Invalid PSX_INVESTED_POLICY '{}'", policy))?,
            Err(_) => InvestedAmountPolicy::default(),
        };
        let log_filter = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            database_path: expand_path(&database)?,
            invested_policy,
            log_filter,
        })
    }

    pub fn with_database(self, database: Option<&str>) -> Result<Self> {
        match database {
            Some(database) => Ok(Self {
                database_path: expand_path(database)?,
                ..self
            }),
            None => Ok(self),
        }
    }

    pub fn with_policy(self, policy: Option<InvestedAmountPolicy>) -> Self {
        Self {
            invested_policy: policy.unwrap_or(self.invested_policy),
            ..self
        }
    }
}
