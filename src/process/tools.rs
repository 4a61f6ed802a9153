use std::path::PathBuf;

use crate::config::Config;
use crate::core::constants::tools;
use crate::core::error::{FeedexError, Result};

/// Resolved locations of the probe tools for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub curl: PathBuf,
    pub wget: PathBuf,
}

impl ToolPaths {
    pub fn new<C: Into<PathBuf>, W: Into<PathBuf>>(curl: C, wget: W) -> Self {
        Self {
            curl: curl.into(),
            wget: wget.into(),
        }
    }

    /// Locate curl and wget, preferring paths set in the configuration.
    ///
    /// Every missing requirement is reported at once so the user can fix
    /// them in one go.
    pub fn locate(config: &Config) -> Result<Self> {
        let mut missing = Vec::new();

        let curl = Self::find(tools::CURL, config.curl_path.as_deref(), &mut missing);
        let wget = Self::find(tools::WGET, config.wget_path.as_deref(), &mut missing);

        match (curl, wget) {
            (Some(curl), Some(wget)) => {
                log::debug!(
                    "Using curl at {} and wget at {}",
                    curl.display(),
                    wget.display()
                );
                Ok(Self { curl, wget })
            }
            _ => Err(FeedexError::MissingTool(missing)),
        }
    }

    fn find(tool: &str, configured: Option<&str>, missing: &mut Vec<String>) -> Option<PathBuf> {
        let found = match configured {
            Some(path) => which::which(path).ok(),
            None => which::which(tool).ok(),
        };

        if found.is_none() {
            let description = tools::REQUIREMENTS
                .iter()
                .find(|(name, _)| *name == tool)
                .map(|(_, description)| *description)
                .unwrap_or(tool);
            missing.push(format!("{tool} - {description}"));
        }
        found
    }
}
