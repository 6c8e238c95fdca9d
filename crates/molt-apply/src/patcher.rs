use std::io::{Read, Write};

use qbsdiff::Bspatch;

use crate::error::PatchError;

/// Produces a new executable image from the current one plus a patch stream.
///
/// The patch wire format is owned by whatever serves the patch artifacts;
/// implementations only need to turn `(old image, patch bytes)` into the new
/// image. [`InstallPlan`](crate::InstallPlan) verifies the result against the
/// expected digest afterwards, so a patcher does not need to do its own
/// integrity checking.
pub trait Patcher: Send + Sync {
    /// Apply `patch` against `old`, writing the new image to `out`.
    ///
    /// # Errors
    /// Returns an error when the patch stream cannot be read or is rejected
    /// by the format decoder.
    fn patch(
        &self,
        old: &[u8],
        patch: &mut dyn Read,
        out: &mut dyn Write,
    ) -> Result<(), PatchError>;
}

/// [`Patcher`] for bsdiff 4.x patches, the format served by diff endpoints.
///
/// The patch stream and the rebuilt image are both held in memory during
/// application: patches are small by construction, and the image is bounded
/// by the executable's own size.
pub struct BsdiffPatcher;

impl Patcher for BsdiffPatcher {
    fn patch(
        &self,
        old: &[u8],
        patch: &mut dyn Read,
        out: &mut dyn Write,
    ) -> Result<(), PatchError> {
        let mut raw = Vec::new();
        patch
            .read_to_end(&mut raw)
            .map_err(|error| PatchError::new("read patch stream", error))?;

        let decoder =
            Bspatch::new(&raw).map_err(|error| PatchError::new("parse patch header", error))?;

        let mut image = Vec::new();
        decoder
            .apply(old, std::io::Cursor::new(&mut image))
            .map_err(|error| PatchError::new("apply patch", error))?;

        out.write_all(&image)
            .map_err(|error| PatchError::new("write patched image", error))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use qbsdiff::Bsdiff;

    use super::{BsdiffPatcher, Patcher};

    #[test]
    fn bsdiff_patch_reproduces_target_bytes() {
        let old = b"the quick brown fox jumps over the lazy dog".to_vec();
        let new = b"the quick brown fox vaults over the lazy dog".to_vec();

        let mut patch = Vec::new();
        Bsdiff::new(&old, &new)
            .compare(std::io::Cursor::new(&mut patch))
            .expect("patch generation should succeed");

        let mut out = Vec::new();
        BsdiffPatcher
            .patch(&old, &mut patch.as_slice(), &mut out)
            .expect("patch application should succeed");

        assert_eq!(out, new);
    }

    #[test]
    fn garbage_patch_stream_is_rejected() {
        let mut out = Vec::new();
        let result =
            BsdiffPatcher.patch(b"old image", &mut &b"definitely not bsdiff"[..], &mut out);

        assert!(result.is_err());
    }
}
