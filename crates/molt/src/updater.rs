use std::path::{Path, PathBuf};

use log::{info, warn};
use molt_apply::{BsdiffPatcher, InstallPlan};

use crate::config::UpdateConfig;
use crate::error::UpdateError;
use crate::manifest::{self, VersionInfo};
use crate::transport;

const USER_AGENT: &str = concat!("molt/", env!("CARGO_PKG_VERSION"));

/// How an update cycle ended when nothing went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The manifest advertises the version already running.
    UpToDate,
    /// A binary patch was applied against the current image.
    UpdatedViaPatch,
    /// The full gzipped image was downloaded and installed.
    UpdatedViaFull,
}

impl UpdateOutcome {
    /// Whether the executable on disk changed; callers typically restart
    /// when this is true.
    #[must_use]
    pub fn updated(self) -> bool {
        !matches!(self, Self::UpToDate)
    }
}

/// Drives one update cycle: manifest check, patch attempt, full-binary
/// fallback.
///
/// Every step blocks the calling thread; there is no internal concurrency
/// and no cancellation. A caller wanting a deadline wraps the whole
/// [`apply`](Self::apply) call. At most one cycle should run per
/// installation at a time — two processes racing to replace the same binary
/// is a caller-level hazard.
pub struct Updater {
    config: UpdateConfig,
    client: reqwest::blocking::Client,
    latest: Option<VersionInfo>,
}

impl Updater {
    /// # Errors
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(config: UpdateConfig) -> Result<Self, UpdateError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(UpdateError::Client)?;

        Ok(Self {
            config,
            client,
            latest: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &UpdateConfig {
        &self.config
    }

    /// The most recent manifest response seen by this updater, if any.
    #[must_use]
    pub fn latest_info(&self) -> Option<&VersionInfo> {
        self.latest.as_ref()
    }

    /// Fetch the manifest without applying anything.
    ///
    /// # Errors
    /// Returns an error when the manifest cannot be fetched, decoded, or
    /// fails digest validation.
    pub fn fetch_info(&mut self) -> Result<&VersionInfo, UpdateError> {
        let info = manifest::fetch_version_info(&self.client, &self.config)?;
        Ok(self.latest.insert(info))
    }

    /// Run one full update cycle.
    ///
    /// Checks the manifest, returns [`UpdateOutcome::UpToDate`] when the
    /// advertised version equals the running one, and otherwise tries the
    /// binary patch endpoint before falling back to the full gzipped image.
    /// Patch-path failures of any kind only demote to the fallback; the
    /// error surfaced on a failed cycle is the full-binary path's.
    ///
    /// # Errors
    /// Returns an error when the manifest fetch fails, the install location
    /// is not writable, or the full-binary path fails after the patch path
    /// already has. The executable on disk is never left partially written.
    pub fn apply(&mut self) -> Result<UpdateOutcome, UpdateError> {
        let info = manifest::fetch_version_info(&self.client, &self.config)?;
        self.latest = Some(info.clone());

        if info.version == self.config.current_version {
            info!("no new version available");
            return Ok(UpdateOutcome::UpToDate);
        }

        let target = self.install_target()?;

        // Prove the install can happen before transferring any payload.
        InstallPlan::new(&target, info.sha256).check_permissions()?;

        let diff_url = self.config.diff_url(&info.version);
        info!("fetching binary patch from {diff_url}");
        match self.apply_patch(&diff_url, &target, &info) {
            Ok(()) => {
                info!(
                    "updated {} -> {} via binary patch",
                    self.config.current_version, info.version
                );
                return Ok(UpdateOutcome::UpdatedViaPatch);
            }
            Err(error) => {
                warn!("binary patch failed, falling back to full binary: {error}");
            }
        }

        let binary_url = self.config.binary_url(&info.version);
        info!("fetching full binary from {binary_url}");
        self.apply_full(&binary_url, &target, &info)?;
        info!(
            "updated {} -> {} via full binary",
            self.config.current_version, info.version
        );
        Ok(UpdateOutcome::UpdatedViaFull)
    }

    fn apply_patch(
        &self,
        url: &str,
        target: &Path,
        info: &VersionInfo,
    ) -> Result<(), UpdateError> {
        let payload = transport::fetch(&self.client, url)?;
        InstallPlan::new(target, info.sha256)
            .with_patcher(Box::new(BsdiffPatcher))
            .apply(payload)?;
        Ok(())
    }

    fn apply_full(
        &self,
        url: &str,
        target: &Path,
        info: &VersionInfo,
    ) -> Result<(), UpdateError> {
        let payload = transport::fetch(&self.client, url)?;
        let image = transport::gzip_reader(payload)?;
        InstallPlan::new(target, info.sha256).apply(image)?;
        Ok(())
    }

    fn install_target(&self) -> Result<PathBuf, UpdateError> {
        match &self.config.target {
            Some(path) => Ok(path.clone()),
            None => std::env::current_exe().map_err(|error| {
                molt_apply::ApplyError::Io {
                    context: "resolve current executable",
                    source: error,
                }
                .into()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UpdateOutcome;

    #[test]
    fn only_up_to_date_reports_unchanged() {
        assert!(!UpdateOutcome::UpToDate.updated());
        assert!(UpdateOutcome::UpdatedViaPatch.updated());
        assert!(UpdateOutcome::UpdatedViaFull.updated());
    }
}
