//! CLI settings: a TOML file, falling back to the environment

use anyhow::Context;
use msm_repository::RepositoryConfig;
use msm_sync::SyncConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the CLI needs to reach the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) repository: RepositoryConfig,
    pub(crate) sync: SyncConfig,
}

impl Settings {
    /// Read `path` if given, else the `MSM_*` environment variables
    pub(crate) fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                Self::parse(&raw).with_context(|| format!("parsing {}", path.display()))
            }
            None => Ok(Self {
                repository: RepositoryConfig::from_env()?,
                sync: SyncConfig::from_env()?,
            }),
        }
    }

    pub(crate) fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub(crate) fn with_api_url(mut self, url: Option<&String>) -> Self {
        if let Some(url) = url {
            self.repository = self.repository.with_api_url(url.clone());
        }
        self
    }
}
