// pansync-core: Idempotent reconciliation of device network configuration.
//
// Declarative resource specs in, probe → plan → apply → commit out.
// `pansync-xapi` supplies the concrete device session.

pub mod commit;
pub mod error;
pub mod fragment;
pub mod probe;
pub mod reconcile;
pub mod resource;
pub mod session;
pub mod xpath;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use reconcile::{
    Decision, Operation, Outcome, ReconcileRequest, Reconciler, ResourceKind, Step, StepAction,
};
pub use resource::{InterfaceSpec, MgmtProfileSpec, ServiceFlags, StaticRouteSpec};
pub use session::DeviceSession;

/// Session-level error type, re-exported for engine consumers.
pub use pansync_xapi::Error as SessionError;
