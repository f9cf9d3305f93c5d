//! Parsing of the composite interpreter identifier left behind by `uv`.
//!
//! Managed interpreters live under a directory named
//! `implementation-version[-local]-system-machine-libc`, e.g.
//! `cpython-3.12.4-linux-x86_64-gnu`. The identifier is the only source of
//! platform information for an environment, so the shape is checked up front
//! instead of being sliced blindly.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Substring marking a free-threaded (no GIL) build in the version segment.
pub const FREE_THREADED_MARKER: &str = "freethreaded";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FullVersionError {
    #[error("full version `{value}` has {found} segments, expected 5 or 6")]
    SegmentCount { value: String, found: usize },
    #[error("full version `{value}` has an empty segment")]
    EmptySegment { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullVersion {
    raw: String,
    implementation: String,
    version_segment: String,
    system: String,
    machine: String,
    libc: String,
}

impl FullVersion {
    pub fn parse(value: &str) -> Result<Self, FullVersionError> {
        let segments: Vec<&str> = value.split('-').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(FullVersionError::EmptySegment {
                value: value.to_string(),
            });
        }
        let (version_segment, system) = match segments.len() {
            5 => (segments[1].to_string(), segments[2]),
            6 => (format!("{}-{}", segments[1], segments[2]), segments[3]),
            found => {
                return Err(FullVersionError::SegmentCount {
                    value: value.to_string(),
                    found,
                })
            }
        };
        let count = segments.len();
        Ok(Self {
            raw: value.to_string(),
            implementation: segments[0].to_string(),
            version_segment,
            system: system.to_string(),
            machine: segments[count - 2].to_string(),
            libc: segments[count - 1].to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Interpreter implementation name, e.g. `cpython` or `pypy`.
    pub fn implementation(&self) -> &str {
        &self.implementation
    }

    /// Python version, including a local qualifier when one is present.
    pub fn version_segment(&self) -> &str {
        &self.version_segment
    }

    pub fn is_free_threaded(&self) -> bool {
        self.version_segment.contains(FREE_THREADED_MARKER)
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn machine(&self) -> &str {
        &self.machine
    }

    pub fn libc(&self) -> &str {
        &self.libc
    }
}

impl FromStr for FullVersion {
    type Err = FullVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FullVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for FullVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_identifier() {
        let version = FullVersion::parse("cpython-3.12.4-linux-x86_64-gnu").expect("parse");
        assert_eq!(version.implementation(), "cpython");
        assert_eq!(version.version_segment(), "3.12.4");
        assert_eq!(version.system(), "linux");
        assert_eq!(version.machine(), "x86_64");
        assert_eq!(version.libc(), "gnu");
        assert!(!version.is_free_threaded());
        assert_eq!(version.to_string(), "cpython-3.12.4-linux-x86_64-gnu");
    }

    #[test]
    fn free_threaded_marker_lives_in_version_segment() {
        let version =
            FullVersion::parse("cpython-3.13.0+freethreaded-macos-aarch64-none").expect("parse");
        assert_eq!(version.version_segment(), "3.13.0+freethreaded");
        assert_eq!(version.system(), "macos");
        assert_eq!(version.machine(), "aarch64");
        assert_eq!(version.libc(), "none");
        assert!(version.is_free_threaded());
    }

    #[test]
    fn separate_local_segment_folds_into_version() {
        let version =
            FullVersion::parse("cpython-3.13.0-freethreaded-linux-x86_64-musl").expect("parse");
        assert_eq!(version.implementation(), "cpython");
        assert_eq!(version.version_segment(), "3.13.0-freethreaded");
        assert_eq!(version.system(), "linux");
        assert_eq!(version.machine(), "x86_64");
        assert_eq!(version.libc(), "musl");
        assert!(version.is_free_threaded());
    }

    #[test]
    fn fields_recover_every_segment() {
        let cases = [
            ("pypy", "3.10.14", "windows", "x86_64", "none"),
            ("cpython", "3.8.20", "linux", "armv7", "gnueabihf"),
            ("graalpy", "3.11.0", "macos", "aarch64", "none"),
        ];
        for (implementation, version, system, machine, libc) in cases {
            let raw = format!("{implementation}-{version}-{system}-{machine}-{libc}");
            let parsed = FullVersion::parse(&raw).expect("parse");
            assert_eq!(
                (
                    parsed.implementation(),
                    parsed.version_segment(),
                    parsed.system(),
                    parsed.machine(),
                    parsed.libc()
                ),
                (implementation, version, system, machine, libc)
            );
        }
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert_eq!(
            FullVersion::parse("python3.12"),
            Err(FullVersionError::SegmentCount {
                value: "python3.12".to_string(),
                found: 1
            })
        );
        assert!(matches!(
            FullVersion::parse("cpython-3.12-linux-gnu"),
            Err(FullVersionError::SegmentCount { found: 4, .. })
        ));
        assert!(matches!(
            FullVersion::parse("a-b-c-d-e-f-g"),
            Err(FullVersionError::SegmentCount { found: 7, .. })
        ));
        assert!(matches!(
            FullVersion::parse("cpython--linux-x86_64-gnu"),
            Err(FullVersionError::EmptySegment { .. })
        ));
    }
}
