use anyhow::Context;
use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::{debug, info};

pub struct Config {
    pub inactivity_timeout: Duration,
    pub save_delay: Duration,
    pub workspace: Option<PathBuf>,
    pub roster_seed: Option<u64>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self {
            inactivity_timeout: Duration::from_millis(try_load("ATTENDANCED_INACTIVITY_MS", "60000")?),
            save_delay: Duration::from_millis(try_load("ATTENDANCED_SAVE_DELAY_MS", "1500")?),
            workspace: var("ATTENDANCED_WORKSPACE").map(PathBuf::from),
            roster_seed: var("ATTENDANCED_ROSTER_SEED")
                .map(|v| parse("ATTENDANCED_ROSTER_SEED", &v))
                .transpose()?,
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse<T: FromStr>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("invalid {key} value: {raw:?}"))
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    match var(key) {
        Some(raw) => {
            debug!("{key}={raw}");
            parse(key, &raw)
        }
        None => {
            info!("{key} not set, using default: {default}");
            parse(key, default)
        }
    }
}
