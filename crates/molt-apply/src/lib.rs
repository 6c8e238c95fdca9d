//! Staging, verification, and atomic installation of executable images.
//!
//! This crate is the mechanism underneath the update protocol in `molt`:
//! - Stage an incoming byte stream (a whole image, or a binary patch applied
//!   against the current image) into a temporary file next to the target.
//! - Verify the staged image against an expected SHA-256 digest.
//! - Swap it into place atomically, restoring the previous image if the
//!   installation fails partway.
//!
//! The target executable is never observable in a half-written state: every
//! exit path leaves either the original bytes or the complete verified new
//! image on disk.

mod error;
mod install;
mod patcher;

pub use error::{ApplyError, PatchError};
pub use install::InstallPlan;
pub use patcher::{BsdiffPatcher, Patcher};

/// Size in bytes of the SHA-256 digest every staged image is verified against.
pub const DIGEST_LEN: usize = 32;
