// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

pub const BUILD_INFO: BuildInfo = BuildInfo {
    date: env!("BUILD_DATE"),
    git_sha: env!("GIT_SHA"),
    profile: env!("PROFILE"),
    version: env!("VERSION"),
};

#[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct BuildInfo {
    pub date: &'static str,
    pub git_sha: &'static str,
    pub profile: &'static str,
    pub version: &'static str,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Version:\t{}\nBuild Date:\t{}\nGit SHA:\t{}\nProfile:\t{}",
            self.version, self.date, self.git_sha, self.profile
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_labels() {
        let info = BuildInfo {
            date: "2026-01-01T00:00:00Z",
            git_sha: "0a1b2c3",
            profile: "debug",
            version: "0.1.0",
        };

        let s = info.to_string();
        assert!(s.contains("Version:\t0.1.0"));
        assert!(s.contains("Build Date:\t2026-01-01T00:00:00Z"));
        assert!(s.contains("Git SHA:\t0a1b2c3"));
        assert!(s.contains("Profile:\tdebug"));
    }

    #[test]
    fn test_build_info_is_populated() {
        assert!(!BUILD_INFO.version.is_empty());
        assert!(!BUILD_INFO.profile.is_empty());
    }
}
