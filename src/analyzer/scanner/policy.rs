use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::SkeletonError;

/// How the scanner treats symbolic links
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymlinkPolicy {
    /// Abort the scan on the first symlink
    #[default]
    Forbid,
    /// Traverse symlinks, visiting each real path once
    Follow,
    /// Leave symlinked entries out
    Skip,
}

impl SymlinkPolicy {
    pub const ALL: [SymlinkPolicy; 3] = [Self::Forbid, Self::Follow, Self::Skip];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forbid => "forbid",
            Self::Follow => "follow",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for SymlinkPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SymlinkPolicy {
    type Err = SkeletonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| {
                SkeletonError::Config(format!(
                    "Invalid symlink policy '{}'. Valid values: forbid, follow, skip",
                    s
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("forbid".parse::<SymlinkPolicy>().unwrap(), SymlinkPolicy::Forbid);
        assert_eq!("FOLLOW".parse::<SymlinkPolicy>().unwrap(), SymlinkPolicy::Follow);
        assert_eq!(" skip ".parse::<SymlinkPolicy>().unwrap(), SymlinkPolicy::Skip);

        let err = "allow".parse::<SymlinkPolicy>().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_default_is_forbid() {
        assert_eq!(SymlinkPolicy::default(), SymlinkPolicy::Forbid);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&SymlinkPolicy::Follow).unwrap(), "\"follow\"");
        let parsed: SymlinkPolicy = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(parsed, SymlinkPolicy::Skip);
    }
}
