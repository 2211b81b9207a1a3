//! Command dispatch: resolves device and credentials, connects, and
//! routes subcommands to their handlers.

pub mod interface;
pub mod profile;
pub mod vr;

use std::time::Duration;

use url::Url;

use pansync_core::commit::COMMIT_POLL_INTERVAL;
use pansync_core::xpath::Xpath;
use pansync_core::{CoreError, Outcome, ReconcileRequest, Reconciler};
use pansync_xapi::{TlsMode, TransportConfig, XapiClient};

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Dispatch a parsed command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Interface(args) => interface::handle(args, global).await,
        Command::Vr(args) => vr::handle(args, global).await,
        Command::Profile(args) => profile::handle(args, global).await,
        Command::Commit => commit(global).await,
        // Completions are handled before dispatch
        Command::Completions(_) => unreachable!(),
    }
}

// ── Session setup ────────────────────────────────────────────────────

/// Establish an authenticated session from the global flags and the
/// config file.
pub(crate) async fn connect(global: &GlobalOpts) -> Result<XapiClient, CliError> {
    let cfg = config::load_config_or_default();

    let device = global
        .device
        .clone()
        .or_else(|| cfg.device.clone())
        .ok_or_else(|| CliError::NoDevice {
            path: config::config_path().display().to_string(),
        })?;
    let url = device_url(&device)?;

    let credentials = config::resolve_credentials(global, &cfg)?;

    let timeout = Duration::from_secs(global.timeout.unwrap_or(cfg.timeout));
    let tls = if global.insecure || cfg.insecure {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ca) = cfg.ca_cert {
        TlsMode::CustomCa(ca)
    } else {
        TlsMode::System
    };
    let transport = TransportConfig { tls, timeout };

    tracing::debug!(%url, "connecting");
    XapiClient::connect(&url, &transport, credentials)
        .await
        .map_err(|e| CliError::from_session(e, "connect"))
}

/// Normalize the device argument into a base URL; bare hosts get https.
fn device_url(device: &str) -> Result<Url, CliError> {
    let with_scheme = if device.contains("://") {
        device.to_string()
    } else {
        format!("https://{device}")
    };
    with_scheme.parse().map_err(|_| CliError::Validation {
        field: "device".into(),
        reason: format!("not a valid URL: {with_scheme}"),
    })
}

// ── Shared handler plumbing ──────────────────────────────────────────

/// Run one reconciliation pass and print its outcome.
pub(crate) async fn run_reconcile(
    request: ReconcileRequest,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = connect(global).await?;
    let reconciler = Reconciler::new(client, !global.no_commit);
    let outcome = reconciler.run(&request).await?;
    output::print_outcome(&outcome, &global.output, global.quiet);
    Ok(())
}

/// Fetch a resource subtree and print it.
pub(crate) async fn show(label: &str, xpath: &Xpath, global: &GlobalOpts) -> Result<(), CliError> {
    let client = connect(global).await?;
    let body = client
        .get_config(xpath.as_str())
        .await
        .map_err(|e| CliError::from_session(e, "read"))?;
    output::print_resource(label, &body, &global.output, global.quiet);
    Ok(())
}

/// Explicit commit of whatever is pending in the candidate configuration.
async fn commit(global: &GlobalOpts) -> Result<(), CliError> {
    let client = connect(global).await?;
    let job = client
        .commit(true, COMMIT_POLL_INTERVAL)
        .await
        .map_err(|source| CoreError::CommitFailed { source })?;
    let outcome = match job {
        Some(id) => Outcome {
            changed: true,
            message: format!("commit finished (job {id})"),
        },
        None => Outcome {
            changed: false,
            message: "no changes to commit".to_string(),
        },
    };
    output::print_outcome(&outcome, &global.output, global.quiet);
    Ok(())
}
