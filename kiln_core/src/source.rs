//! Where firing profiles come from.

use std::path::{Path, PathBuf};

use eyre::WrapErr;
use kiln_config::ProfileFallback;

use crate::error::{KilnError, Result};
use crate::profile::Profile;

/// Produces a validated profile once, before a run.
pub trait ProfileSource {
    fn load(&self) -> Result<Profile>;
}

impl ProfileSource for Profile {
    fn load(&self) -> Result<Profile> {
        Ok(self.clone())
    }
}

/// Loads a `.json`, `.toml` or `.csv` profile document from disk.
///
/// Read and parse failures follow the configured `ProfileFallback`. A
/// document that parses but describes an invalid profile is always an
/// error: running something other than what the file says is worse than
/// not running.
#[derive(Debug, Clone)]
pub struct FileProfileSource {
    path: PathBuf,
    fallback: ProfileFallback,
}

impl FileProfileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fallback: ProfileFallback::Strict,
        }
    }

    pub fn with_fallback(mut self, fallback: ProfileFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileSource for FileProfileSource {
    fn load(&self) -> Result<Profile> {
        let doc = match kiln_config::load_profile(&self.path) {
            Ok(doc) => doc,
            Err(e) if self.fallback == ProfileFallback::Empty => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "profile unavailable, using empty profile"
                );
                return Ok(Profile::empty());
            }
            Err(e) => {
                return Err(eyre::Report::new(KilnError::Config(format!("{e:#}"))));
            }
        };
        if doc.is_empty() {
            tracing::warn!(path = %self.path.display(), "profile document has no phases");
        }
        let profile = Profile::try_from(&doc)
            .map_err(|e| eyre::Report::new(KilnError::Profile(e)))
            .wrap_err_with(|| format!("loading profile {}", self.path.display()))?;
        tracing::debug!(
            path = %self.path.display(),
            entries = doc.len(),
            phases = profile.len(),
            "profile loaded"
        );
        Ok(profile)
    }
}
