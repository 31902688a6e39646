use serde::{Deserialize, Serialize};

use super::error::SkeletonError;

/// Granularity at which structural detail is retained.
///
/// Variants are declared coarse to fine, so the derived ordering reads
/// `Packages < Modules < Classes < Functions`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionLevel {
    /// Package directories with module/symbol counts only
    Packages,
    /// Modules with their top-level symbols, class members collapsed to counts
    #[default]
    Modules,
    /// Classes with members, functions without signatures
    Classes,
    /// Everything the extractor reports, including signatures and docstrings
    Functions,
}

impl ResolutionLevel {
    /// All levels, coarse to fine
    pub const ALL: [ResolutionLevel; 4] = [
        ResolutionLevel::Packages,
        ResolutionLevel::Modules,
        ResolutionLevel::Classes,
        ResolutionLevel::Functions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionLevel::Packages => "packages",
            ResolutionLevel::Modules => "modules",
            ResolutionLevel::Classes => "classes",
            ResolutionLevel::Functions => "functions",
        }
    }

    /// Whether module entries survive at this level
    pub fn retains_modules(&self) -> bool {
        *self >= ResolutionLevel::Modules
    }

    /// Whether class members survive at this level
    pub fn retains_members(&self) -> bool {
        *self >= ResolutionLevel::Classes
    }

    /// Whether function signatures and docstrings survive at this level
    pub fn retains_signatures(&self) -> bool {
        *self >= ResolutionLevel::Functions
    }
}

impl std::fmt::Display for ResolutionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResolutionLevel {
    type Err = SkeletonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "packages" => Ok(ResolutionLevel::Packages),
            "modules" => Ok(ResolutionLevel::Modules),
            "classes" => Ok(ResolutionLevel::Classes),
            "functions" => Ok(ResolutionLevel::Functions),
            _ => Err(SkeletonError::InvalidLevel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(ResolutionLevel::Packages < ResolutionLevel::Modules);
        assert!(ResolutionLevel::Modules < ResolutionLevel::Classes);
        assert!(ResolutionLevel::Classes < ResolutionLevel::Functions);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(
            "modules".parse::<ResolutionLevel>().unwrap(),
            ResolutionLevel::Modules
        );
        assert_eq!(
            "Functions".parse::<ResolutionLevel>().unwrap(),
            ResolutionLevel::Functions
        );
        for level in ResolutionLevel::ALL {
            assert_eq!(level.as_str().parse::<ResolutionLevel>().unwrap(), level);
        }
    }

    #[test]
    fn test_invalid_level_is_configuration_error() {
        let err = "files".parse::<ResolutionLevel>().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("files"));
    }

    #[test]
    fn test_retention_flags() {
        assert!(!ResolutionLevel::Packages.retains_modules());
        assert!(ResolutionLevel::Modules.retains_modules());
        assert!(!ResolutionLevel::Modules.retains_members());
        assert!(ResolutionLevel::Classes.retains_members());
        assert!(!ResolutionLevel::Classes.retains_signatures());
        assert!(ResolutionLevel::Functions.retains_signatures());
    }
}
