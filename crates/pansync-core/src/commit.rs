// Commit coordination.
//
// A commit fires only after a pass that mutated something, and only
// when the caller asked for one. Never speculatively.

use std::time::Duration;

use tracing::info;

use crate::error::CoreError;
use crate::session::DeviceSession;

/// Interval between job polls during a synchronous commit.
pub const COMMIT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Commit iff `changed && commit`. Returns whether a commit was issued.
///
/// The commit is synchronous: the session returns once the commit job
/// reaches a terminal state. Failures are [`CoreError::CommitFailed`],
/// distinct from mutation failures since the mutations themselves have
/// already been accepted by the device.
pub async fn commit_if_needed<S: DeviceSession>(
    session: &S,
    changed: bool,
    commit: bool,
) -> Result<bool, CoreError> {
    if !(changed && commit) {
        return Ok(false);
    }
    info!("committing candidate configuration");
    session
        .commit(true, COMMIT_POLL_INTERVAL)
        .await
        .map_err(|source| CoreError::CommitFailed { source })?;
    Ok(true)
}
