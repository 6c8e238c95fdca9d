/// Tag identifying the host OS and CPU architecture, e.g. `linux-amd64`.
///
/// Update endpoints key their artifacts by this tag. The identifiers follow
/// the vocabulary release tooling conventionally publishes under (`darwin`
/// rather than `macos`, `amd64` rather than `x86_64`); anything unrecognized
/// passes through as the standard library reports it.
///
/// Computed from the host environment; callers capture it once at startup in
/// their [`UpdateConfig`](crate::UpdateConfig) rather than re-deriving it.
#[must_use]
pub fn platform_tag() -> String {
    format!("{}-{}", os_identifier(), arch_identifier())
}

fn os_identifier() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn arch_identifier() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::platform_tag;

    #[test]
    fn tag_is_os_dash_arch() {
        let tag = platform_tag();
        let (os, arch) = tag
            .split_once('-')
            .expect("tag should contain a separator");

        assert!(!os.is_empty());
        assert!(!arch.is_empty());
    }

    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    #[test]
    fn linux_amd64_uses_release_vocabulary() {
        assert_eq!(platform_tag(), "linux-amd64");
    }

    #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
    #[test]
    fn darwin_arm64_uses_release_vocabulary() {
        assert_eq!(platform_tag(), "darwin-arm64");
    }
}
