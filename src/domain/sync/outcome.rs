//! Classified result of one upload attempt

/// Reason reported when the transport gives up after its hard timeout
pub const TIMEOUT_REASON: &str = "timeout";

/// Result of a single upload call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Server answered 200 or 201
    Success,
    /// Server answered with any other status
    ServerRejected { status: u16, body: String },
    /// No usable response (timeout, connection failure, bad request setup)
    TransportFailure(String),
}

impl UploadOutcome {
    /// Transport failure caused by the hard timeout
    pub fn timeout() -> Self {
        Self::TransportFailure(TIMEOUT_REASON.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Message stored as the record's last error, `None` on success
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Self::Success => None,
            Self::ServerRejected { status, .. } => Some(format!("Server error: {}", status)),
            Self::TransportFailure(reason) => Some(format!("Upload error: {}", reason)),
        }
    }
}
