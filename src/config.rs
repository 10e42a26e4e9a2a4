use std::env;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::id::IdStrategy;

/// Settings for a [`Registry`](crate::Registry).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// How poset handles are drawn.
    pub handles: IdStrategy,
    /// Largest handle the registry may hand out.
    pub max_handle: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { handles: IdStrategy::default(), max_handle: u64::MAX }
    }
}

impl RegistryConfig {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("invalid registry config")
    }

    /// Reads `POSET_HANDLES` (`random` or `sequential`) and `POSET_SEED`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::var("POSET_HANDLES").ok(), env::var("POSET_SEED").ok())
    }

    fn from_vars(handles: Option<String>, seed: Option<String>) -> Result<Self> {
        let seed = seed
            .map(|s| s.trim().parse::<u64>().with_context(|| format!("POSET_SEED={s:?}")))
            .transpose()?;
        let handles = match handles.as_deref().map(str::trim) {
            None | Some("random") => IdStrategy::Random { seed },
            Some("sequential") => IdStrategy::Sequential,
            Some(other) => bail!("POSET_HANDLES must be random or sequential, got {other:?}"),
        };
        Ok(Self { handles, ..Self::default() })
    }
}
