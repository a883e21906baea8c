//! Platforms and deployment targets.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Architectures forced on targets for platforms older than the
/// `armv7`-only toolchains.
pub const LEGACY_ARCHS: &str = "armv6 armv7";

/// Error parsing a deployment target.
#[derive(Debug, Error)]
#[error("invalid deployment target `{0}`: expected up to three numeric components, e.g. `8.0`")]
pub struct InvalidDeploymentTarget(String);

/// A platform family a target can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFamily {
    Ios,
    Osx,
    Tvos,
    Watchos,
}

impl PlatformFamily {
    /// Build setting carrying the deployment target for this family.
    pub fn deployment_target_key(&self) -> &'static str {
        match self {
            PlatformFamily::Ios => "IPHONEOS_DEPLOYMENT_TARGET",
            PlatformFamily::Osx => "MACOSX_DEPLOYMENT_TARGET",
            PlatformFamily::Tvos => "TVOS_DEPLOYMENT_TARGET",
            PlatformFamily::Watchos => "WATCHOS_DEPLOYMENT_TARGET",
        }
    }

    /// SDK the family builds against.
    pub fn sdk_root(&self) -> &'static str {
        match self {
            PlatformFamily::Ios => "iphoneos",
            PlatformFamily::Osx => "macosx",
            PlatformFamily::Tvos => "appletvos",
            PlatformFamily::Watchos => "watchos",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformFamily::Ios => "ios",
            PlatformFamily::Osx => "osx",
            PlatformFamily::Tvos => "tvos",
            PlatformFamily::Watchos => "watchos",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A minimum OS version such as `8.0`.
///
/// Compared numerically, so `8.0 < 10.0` and `8 == 8.0.0`. Displays the way
/// it was written.
#[derive(Debug, Clone)]
pub struct DeploymentTarget {
    version: Version,
    raw: String,
}

impl DeploymentTarget {
    /// The normalized three-component version.
    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for DeploymentTarget {
    type Err = InvalidDeploymentTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let parts: Vec<&str> = raw.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(InvalidDeploymentTarget(s.to_string()));
        }

        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| InvalidDeploymentTarget(s.to_string()))?;
        }

        Ok(DeploymentTarget {
            version: Version::new(numbers[0], numbers[1], numbers[2]),
            raw: raw.to_string(),
        })
    }
}

impl PartialEq for DeploymentTarget {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for DeploymentTarget {}

impl Hash for DeploymentTarget {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.version.hash(state)
    }
}

impl PartialOrd for DeploymentTarget {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DeploymentTarget {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version)
    }
}

impl fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for DeploymentTarget {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DeploymentTarget {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Platform a target is built for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Platform {
    pub family: PlatformFamily,
    pub deployment_target: DeploymentTarget,
}

impl Platform {
    pub fn new(
        family: PlatformFamily,
        deployment_target: &str,
    ) -> Result<Self, InvalidDeploymentTarget> {
        Ok(Platform {
            family,
            deployment_target: deployment_target.parse()?,
        })
    }

    /// Whether targets for this platform must pin the legacy architecture
    /// list ([`LEGACY_ARCHS`]). True for iOS below 4.3.
    pub fn requires_legacy_archs(&self) -> bool {
        self.family == PlatformFamily::Ios && *self.deployment_target.version() < Version::new(4, 3, 0)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.deployment_target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> DeploymentTarget {
        s.parse().unwrap()
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(dt("8.0") < dt("10.0"));
        assert!(dt("9.0") < dt("9.0.1"));
        assert_eq!(dt("8"), dt("8.0.0"));
        assert_eq!(dt("8.0").to_string(), "8.0");
    }

    #[test]
    fn test_invalid_deployment_target() {
        assert!("".parse::<DeploymentTarget>().is_err());
        assert!("eight".parse::<DeploymentTarget>().is_err());
        assert!("1.2.3.4".parse::<DeploymentTarget>().is_err());
    }

    #[test]
    fn test_legacy_archs_rule() {
        assert!(Platform::new(PlatformFamily::Ios, "4.0").unwrap().requires_legacy_archs());
        assert!(!Platform::new(PlatformFamily::Ios, "4.3").unwrap().requires_legacy_archs());
        assert!(!Platform::new(PlatformFamily::Osx, "10.6").unwrap().requires_legacy_archs());
    }

    #[test]
    fn test_platform_deserialize() {
        let platform: Platform =
            toml::from_str("family = \"tvos\"\ndeployment-target = \"9.2\"\n").unwrap();
        assert_eq!(platform.family, PlatformFamily::Tvos);
        assert_eq!(platform.deployment_target, dt("9.2"));
        assert_eq!(platform.family.deployment_target_key(), "TVOS_DEPLOYMENT_TARGET");
    }
}
