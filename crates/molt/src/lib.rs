//! In-place self-update protocol for deployed executables.
//!
//! A binary embedding this crate can discover, fetch, and install a newer
//! version of itself against a static file server:
//! - A small JSON manifest names the latest version and its SHA-256 digest.
//! - A binary patch against the running version is tried first to save
//!   bandwidth; a gzipped full image is the fallback.
//! - Staging, digest verification, and the atomic swap live in `molt-apply`.
//!
//! The whole cycle is synchronous and blocking. Run [`Updater::apply`] from
//! a dedicated background thread on whatever schedule suits the caller; the
//! library owns no timers, threads, or logger.
//!
//! ```no_run
//! use molt::{UpdateConfig, Updater};
//!
//! fn check_for_updates() -> Result<(), molt::UpdateError> {
//!     let config = UpdateConfig::new("1.4.0", "https://updates.example.com/", "myapp");
//!     let mut updater = Updater::new(config)?;
//!     let outcome = updater.apply()?;
//!     if outcome.updated() {
//!         log::info!("restart to pick up the new version");
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod manifest;
mod platform;
mod transport;
mod updater;

pub use config::UpdateConfig;
pub use error::UpdateError;
pub use manifest::VersionInfo;
pub use molt_apply::{ApplyError, BsdiffPatcher, InstallPlan, Patcher};
pub use platform::platform_tag;
pub use updater::{UpdateOutcome, Updater};
