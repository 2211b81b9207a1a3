//! CLI error types with miette diagnostics.
//!
//! Classifies engine and session failures into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use pansync_core::{CoreError, SessionError};

/// Exit codes reported to the shell.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to device at {url}")]
    #[diagnostic(
        code(pansync::connection_failed),
        help(
            "Check that the management interface is reachable and HTTPS is enabled.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS negotiation failed: {message}")]
    #[diagnostic(
        code(pansync::tls_error),
        help(
            "Firewall management interfaces usually ship self-signed certificates.\n\
             Use --insecure (-k) to accept one, or set ca_cert in the config file."
        )
    )]
    Tls { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(pansync::auth_failed),
        help(
            "Check the username and password, or supply a pre-generated API key\n\
             via --api-key / PANSYNC_API_KEY."
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials available")]
    #[diagnostic(
        code(pansync::no_credentials),
        help(
            "Set PANSYNC_PASSWORD or PANSYNC_API_KEY, add api_key to the config\n\
             file, or run interactively to be prompted."
        )
    )]
    NoCredentials,

    // ── Usage ────────────────────────────────────────────────────────
    #[error("No device specified")]
    #[diagnostic(
        code(pansync::no_device),
        help(
            "Pass --device (-d), set PANSYNC_DEVICE, or put device = \"...\" in\n\
             {path}"
        )
    )]
    NoDevice { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(pansync::validation))]
    Validation { field: String, reason: String },

    // ── Device ───────────────────────────────────────────────────────
    #[error("Device error: {message}")]
    #[diagnostic(code(pansync::device_error))]
    Device { message: String },

    #[error("Commit failed: {message}")]
    #[diagnostic(
        code(pansync::commit_failed),
        help(
            "The candidate configuration still holds the staged changes.\n\
             Inspect the job log on the device, then re-run `pansync commit`."
        )
    )]
    CommitFailed { message: String },

    // ── Configuration / IO ───────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(pansync::config))]
    Config(Box<figment::Error>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoDevice { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::AuthFailed { .. } | Self::NoCredentials => exit_code::AUTH,
            Self::ConnectionFailed { .. } | Self::Tls { .. } => exit_code::CONNECTION,
            _ => exit_code::GENERAL,
        }
    }

    /// Classify a session-layer failure, tagging device errors with the
    /// phase that hit them.
    pub(crate) fn from_session(err: SessionError, context: &str) -> Self {
        match err {
            SessionError::Authentication { message } => Self::AuthFailed { message },
            SessionError::Tls(message) => Self::Tls { message },
            SessionError::Transport(e) => Self::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "(unknown)".to_string(), ToString::to_string),
                source: Box::new(e),
            },
            SessionError::InvalidUrl(e) => Self::Validation {
                field: "device".into(),
                reason: e.to_string(),
            },
            SessionError::Device { message, code } => Self::Device {
                message: match code {
                    Some(code) => format!("{context}: {message} (code {code})"),
                    None => format!("{context}: {message}"),
                },
            },
            other => Self::Device {
                message: format!("{context}: {other}"),
            },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidName {
                field,
                value,
                reason,
            } => Self::Validation {
                field: field.into(),
                reason: format!("{value:?} {reason}"),
            },

            CoreError::ProbeFailed { xpath, source } => {
                Self::from_session(source, &format!("probe at {xpath}"))
            }

            CoreError::MutationFailed {
                kind,
                xpath,
                source,
            } => Self::from_session(source, &format!("{kind} mutation at {xpath}")),

            // A commit that the device itself rejected keeps its own
            // bucket; transport-level causes keep theirs.
            CoreError::CommitFailed { source } => match source {
                SessionError::Device { message, .. } => Self::CommitFailed { message },
                SessionError::CommitTimeout { .. } => Self::CommitFailed {
                    message: source.to_string(),
                },
                other => Self::from_session(other, "commit"),
            },
        }
    }
}
