use std::path::PathBuf;

use crate::platform::platform_tag;

/// Everything an [`Updater`](crate::Updater) needs to locate and install
/// updates for one binary.
///
/// Endpoint URLs are built by plain concatenation, so the base URLs must end
/// with `/`. All three bases may point at the same host.
///
/// `current_version` is an opaque identifier compared to the manifest's
/// version by exact string equality only. A manifest advertising *any* other
/// string triggers an update attempt, including one that looks older —
/// republishing an old manifest is how an operator rolls the fleet back.
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    /// Version identifier of the running binary.
    pub current_version: String,
    /// Base URL for version manifests.
    pub manifest_base_url: String,
    /// Base URL for gzipped full-binary downloads.
    pub bin_base_url: String,
    /// Base URL for binary patch downloads.
    pub diff_base_url: String,
    /// Name of the managed command, the first path segment on every endpoint.
    pub command_name: String,
    /// Platform tag selecting the artifact variant. Defaults to
    /// [`platform_tag`] for the host.
    pub platform: String,
    /// Where to install the new image. `None` means the currently running
    /// executable; embedders updating a sibling binary (and tests) point
    /// this elsewhere.
    pub target: Option<PathBuf>,
}

impl UpdateConfig {
    /// Configuration with all three endpoints under one base URL, the common
    /// single-host layout.
    #[must_use]
    pub fn new(
        current_version: impl Into<String>,
        base_url: impl Into<String>,
        command_name: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            current_version: current_version.into(),
            manifest_base_url: base_url.clone(),
            bin_base_url: base_url.clone(),
            diff_base_url: base_url,
            command_name: command_name.into(),
            platform: platform_tag(),
            target: None,
        }
    }

    pub(crate) fn manifest_url(&self) -> String {
        format!(
            "{}{}/{}.json",
            self.manifest_base_url, self.command_name, self.platform
        )
    }

    pub(crate) fn diff_url(&self, new_version: &str) -> String {
        format!(
            "{}{}/{}/{}/{}",
            self.diff_base_url, self.command_name, self.current_version, new_version, self.platform
        )
    }

    pub(crate) fn binary_url(&self, new_version: &str) -> String {
        format!(
            "{}{}/{}/{}.gz",
            self.bin_base_url, self.command_name, new_version, self.platform
        )
    }
}

#[cfg(test)]
mod tests {
    use super::UpdateConfig;

    fn config() -> UpdateConfig {
        let mut config = UpdateConfig::new("1", "https://updates.example.com/", "hk");
        config.platform = "linux-amd64".to_string();
        config
    }

    #[test]
    fn manifest_url_appends_command_platform_and_extension() {
        assert_eq!(
            config().manifest_url(),
            "https://updates.example.com/hk/linux-amd64.json"
        );
    }

    #[test]
    fn diff_url_spans_current_and_new_version() {
        assert_eq!(
            config().diff_url("2"),
            "https://updates.example.com/hk/1/2/linux-amd64"
        );
    }

    #[test]
    fn binary_url_names_the_gzipped_artifact() {
        assert_eq!(
            config().binary_url("2"),
            "https://updates.example.com/hk/2/linux-amd64.gz"
        );
    }

    #[test]
    fn bases_concatenate_without_inserting_separators() {
        let mut config = config();
        config.manifest_base_url = "https://updates.example.com/channel-".to_string();

        assert_eq!(
            config.manifest_url(),
            "https://updates.example.com/channel-hk/linux-amd64.json"
        );
    }
}
