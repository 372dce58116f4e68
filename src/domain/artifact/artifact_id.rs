//! Artifact identifier value object

use std::fmt;
use std::str::FromStr;

use crate::domain::error::InvalidArtifactIdError;

/// Opaque name of one recorded artifact.
///
/// The identifier doubles as the payload file name inside the recordings
/// directory, so it must be a single path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactId(String);

impl ArtifactId {
    /// Validate and wrap an identifier
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidArtifactIdError> {
        let id = id.into();

        let valid = !id.trim().is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\', '\0']);

        if valid {
            Ok(Self(id))
        } else {
            Err(InvalidArtifactIdError { input: id })
        }
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ArtifactId {
    type Err = InvalidArtifactIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArtifactId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
