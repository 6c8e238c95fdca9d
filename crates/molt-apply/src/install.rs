use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::ApplyError;
use crate::patcher::Patcher;

/// A single staged installation of a new executable image.
///
/// The plan carries the install target and the digest the new image must
/// hash to. Without a patcher, [`apply`](Self::apply) treats the payload as
/// the complete image; with one, the payload is a patch applied against the
/// bytes currently on disk at the target.
///
/// Staging happens in a temporary file in the target's directory so the
/// final step is a same-filesystem rename. The previous image is moved
/// aside before that rename and moved back if anything fails, so the target
/// is always either the original or the complete verified new image.
pub struct InstallPlan {
    target: PathBuf,
    expected_sha256: [u8; 32],
    patcher: Option<Box<dyn Patcher>>,
}

impl InstallPlan {
    #[must_use]
    pub fn new(target: impl Into<PathBuf>, expected_sha256: [u8; 32]) -> Self {
        Self {
            target: target.into(),
            expected_sha256,
            patcher: None,
        }
    }

    /// Switch the plan to diff mode: the payload fed to [`apply`](Self::apply)
    /// becomes a patch against the current target image.
    #[must_use]
    pub fn with_patcher(mut self, patcher: Box<dyn Patcher>) -> Self {
        self.patcher = Some(patcher);
        self
    }

    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Prove a staging file can be created next to the target.
    ///
    /// Meant to run before any payload bytes are transferred, so an
    /// installation that was never going to succeed does not waste a
    /// download.
    ///
    /// # Errors
    /// Returns [`ApplyError::Permission`] when the target's directory refuses
    /// a new writable file.
    pub fn check_permissions(&self) -> Result<(), ApplyError> {
        let dir = self.staging_dir();
        NamedTempFile::new_in(dir)
            .map_err(|error| ApplyError::permission(dir.to_path_buf(), error))?;
        Ok(())
    }

    /// Stage, verify, and install the payload.
    ///
    /// # Errors
    /// Returns an error when staging fails, the staged image does not hash to
    /// the expected digest, or the final swap fails. In every case the target
    /// still holds the image it held before the call; the one exception is
    /// [`ApplyError::Rollback`], reported when the swap failed *and* the
    /// previous image could not be moved back.
    pub fn apply<R: Read>(&self, payload: R) -> Result<(), ApplyError> {
        let mut staging = NamedTempFile::new_in(self.staging_dir())
            .map_err(|error| ApplyError::io("create staging file", error))?;
        debug!("staging new image at {}", staging.path().display());

        match &self.patcher {
            None => stage_full(payload, staging.as_file_mut())?,
            Some(patcher) => self.stage_patched(payload, patcher.as_ref(), staging.as_file_mut())?,
        }

        staging
            .as_file()
            .sync_all()
            .map_err(|error| ApplyError::io("flush staged image", error))?;

        let actual = sha256_file(staging.path())?;
        if actual != self.expected_sha256 {
            return Err(ApplyError::HashMismatch {
                expected: hex(&self.expected_sha256),
                actual: hex(&actual),
            });
        }
        info!("staged image checksum verified");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(staging.path(), fs::Permissions::from_mode(0o755))
                .map_err(|error| ApplyError::io("mark staged image executable", error))?;
        }

        self.install(staging)
    }

    fn stage_patched<R: Read>(
        &self,
        mut payload: R,
        patcher: &dyn Patcher,
        staging: &mut fs::File,
    ) -> Result<(), ApplyError> {
        let old = fs::read(&self.target)
            .map_err(|error| ApplyError::io("read current image", error))?;
        patcher.patch(&old, &mut payload, staging)?;
        Ok(())
    }

    /// Swap the verified staged image into place.
    fn install(&self, staged: NamedTempFile) -> Result<(), ApplyError> {
        if is_current_exe(&self.target) {
            debug!("target is the running executable, replacing in place");
            self_replace::self_replace(staged.path())
                .map_err(|error| ApplyError::io("replace running executable", error))?;
            return Ok(());
        }

        let backup = backup_path(&self.target);
        let had_previous = self.target.exists();
        if had_previous {
            fs::rename(&self.target, &backup)
                .map_err(|error| ApplyError::io("move previous image aside", error))?;
        }

        match staged.persist(&self.target) {
            Ok(_) => {
                if had_previous {
                    let _ = fs::remove_file(&backup);
                }
                debug!("new image installed at {}", self.target.display());
                Ok(())
            }
            Err(persist_error) => {
                let install_error = ApplyError::io("install new image", persist_error.error);
                if had_previous {
                    if let Err(source) = fs::rename(&backup, &self.target) {
                        return Err(ApplyError::Rollback { backup, source });
                    }
                    warn!("install failed, previous image restored");
                }
                Err(install_error)
            }
        }
    }

    fn staging_dir(&self) -> &Path {
        match self.target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

fn stage_full<R: Read>(mut payload: R, staging: &mut fs::File) -> Result<(), ApplyError> {
    std::io::copy(&mut payload, staging)
        .map_err(|error| ApplyError::io("write staged image", error))?;
    Ok(())
}

fn backup_path(target: &Path) -> PathBuf {
    let mut backup = target.to_path_buf();
    backup.set_file_name(format!(
        "{}.old",
        target.file_name().unwrap_or_default().to_string_lossy()
    ));
    backup
}

fn is_current_exe(target: &Path) -> bool {
    let Ok(exe) = std::env::current_exe() else {
        return false;
    };
    let (Ok(target), Ok(exe)) = (target.canonicalize(), exe.canonicalize()) else {
        return false;
    };
    target == exe
}

fn sha256_file(path: &Path) -> Result<[u8; 32], ApplyError> {
    let mut file =
        fs::File::open(path).map_err(|error| ApplyError::io("open staged image", error))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];

    loop {
        let read = file
            .read(&mut buffer)
            .map_err(|error| ApplyError::io("read staged image", error))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hasher.finalize().into())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
