use thiserror::Error;

/// Top-level error type for the `pansync-xapi` crate.
///
/// Covers every failure mode of the XML API surface: key generation,
/// transport, device-reported errors, and commit job tracking.
/// `pansync-core` wraps these with reconciliation-phase context.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Key generation failed (wrong credentials, account locked, etc.)
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Device ──────────────────────────────────────────────────────
    /// Error reported by the device in a `<response status="error">`
    /// envelope. The message is passed on verbatim.
    #[error("device returned an error: {message}")]
    Device {
        message: String,
        code: Option<String>,
    },

    /// Response body could not be parsed as an API envelope.
    #[error("malformed API response: {0}")]
    MalformedResponse(String),

    // ── Commit jobs ─────────────────────────────────────────────────
    /// A synchronous commit was requested but the job never reached a
    /// terminal state within the polling ceiling.
    #[error("commit job {job_id} did not finish within {timeout_secs}s")]
    CommitTimeout { job_id: String, timeout_secs: u64 },
}

impl Error {
    /// Build a device error from a message and optional API error code.
    pub fn device(message: impl Into<String>, code: Option<String>) -> Self {
        Self::Device {
            message: message.into(),
            code,
        }
    }

    /// Returns `true` if this is a transient error worth retrying
    /// in a higher-level orchestrator. The client itself never retries.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// The device-reported API error code, if there was one.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Device { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
