//! Audio format value object

use std::fmt;
use std::path::Path;

use super::ArtifactId;

/// Container formats produced by the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioFormat {
    /// Uncompressed PCM (older devices)
    Wav,
    /// AAC in an MPEG-4 container
    #[default]
    M4a,
}

impl AudioFormat {
    /// All formats the recordings directory may contain
    pub const ALL: [AudioFormat; 2] = [AudioFormat::Wav, AudioFormat::M4a];

    /// Get the MIME type string sent in the upload part header
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::M4a => "audio/m4a",
        }
    }

    /// Get the file extension
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::M4a => "m4a",
        }
    }

    /// Detect the format from a file name.
    /// Anything that is not `.wav` is treated as M4A.
    pub fn from_file_name(name: &str) -> Self {
        if name.ends_with(".wav") {
            Self::Wav
        } else {
            Self::M4a
        }
    }

    /// Detect the format of an artifact
    pub fn of(id: &ArtifactId) -> Self {
        Self::from_file_name(id.as_str())
    }

    /// Check whether a path looks like a recording this crate syncs
    pub fn is_recording(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| Self::ALL.iter().any(|f| f.extension() == ext))
            .unwrap_or(false)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime_type())
    }
}
