// Reconciliation engine.
//
// One table-driven engine for every resource kind: probe the resource
// path, plan the steps (pure), execute them strictly in order, then
// commit when something changed and the caller asked for it.

use serde::Serialize;
use strum::{Display, EnumString};
use tracing::{debug, info};

use crate::commit::commit_if_needed;
use crate::error::CoreError;
use crate::fragment;
use crate::probe;
use crate::resource::{InterfaceSpec, MgmtProfileSpec, StaticRouteSpec};
use crate::session::DeviceSession;
use crate::xpath::{self, Xpath};

/// Operation requested for a resource, with the caller-facing tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum Operation {
    #[strum(serialize = "add")]
    Create,
    #[strum(serialize = "del")]
    Delete,
    #[strum(serialize = "addstatic")]
    CreateStatic,
}

/// Resource kinds the engine reconciles or touches as a side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ResourceKind {
    Interface,
    VirtualRouter,
    StaticRoute,
    MgmtProfile,
    ZoneMembership,
    VrInterfaceMembership,
}

/// One reconciliation request: an operation applied to one resource.
#[derive(Debug, Clone)]
pub enum ReconcileRequest {
    Interface { op: Operation, spec: InterfaceSpec },
    VirtualRouter { op: Operation, name: String },
    StaticRoute { op: Operation, spec: StaticRouteSpec },
    MgmtProfile { op: Operation, spec: MgmtProfileSpec },
}

impl ReconcileRequest {
    /// The kind this request reconciles.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Interface { .. } => ResourceKind::Interface,
            Self::VirtualRouter { .. } => ResourceKind::VirtualRouter,
            Self::StaticRoute { .. } => ResourceKind::StaticRoute,
            Self::MgmtProfile { .. } => ResourceKind::MgmtProfile,
        }
    }

    /// The path probed for existence. For static routes this is the
    /// parent virtual router: the insert is gated on the parent.
    pub fn probe_xpath(&self) -> Xpath {
        match self {
            Self::Interface { spec, .. } => xpath::ethernet_interface(&spec.name),
            Self::VirtualRouter { name, .. } => xpath::virtual_router(name),
            Self::StaticRoute { spec, .. } => xpath::virtual_router(&spec.virtual_router),
            Self::MgmtProfile { spec, .. } => xpath::mgmt_profile(&spec.name),
        }
    }

    /// Validate every identifier this request embeds in a path.
    fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Interface { spec, .. } => {
                xpath::validate_name("interface name", &spec.name)?;
                xpath::validate_name("zone name", &spec.zone)?;
                xpath::validate_name("virtual router name", &spec.virtual_router)?;
            }
            Self::VirtualRouter { name, .. } => {
                xpath::validate_name("virtual router name", name)?;
            }
            Self::StaticRoute { spec, .. } => {
                xpath::validate_name("virtual router name", &spec.virtual_router)?;
                xpath::validate_name("route name", &spec.name)?;
            }
            Self::MgmtProfile { spec, .. } => {
                xpath::validate_name("profile name", &spec.name)?;
            }
        }
        Ok(())
    }
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub changed: bool,
    pub message: String,
}

/// What `plan` decided for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Nothing to do; carries the explanation for the caller.
    Unchanged { message: String },
    /// Steps to execute, and the message reported once they succeed.
    Apply { steps: Vec<Step>, message: String },
}

impl Decision {
    fn unchanged(message: impl Into<String>) -> Self {
        Self::Unchanged {
            message: message.into(),
        }
    }

    fn apply(steps: Vec<Step>, message: impl Into<String>) -> Self {
        Self::Apply {
            steps,
            message: message.into(),
        }
    }
}

/// One mutation against the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub kind: ResourceKind,
    pub xpath: Xpath,
    pub action: StepAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// `edit`: create the node or replace it wholesale.
    Replace(String),
    /// `set`: insert into the node, leaving siblings alone.
    MergeInsert(String),
    /// Remove the node.
    Delete,
}

/// Decide what to do for `request` given the probed existence of its
/// probe path. Pure: no device access, no side effects.
pub fn plan(request: &ReconcileRequest, exists: bool) -> Decision {
    match request {
        ReconcileRequest::Interface { op, spec } => plan_interface(*op, spec, exists),
        ReconcileRequest::VirtualRouter { op, name } => plan_virtual_router(*op, name, exists),
        ReconcileRequest::StaticRoute { op, spec } => plan_static_route(*op, spec, exists),
        ReconcileRequest::MgmtProfile { op, spec } => plan_mgmt_profile(*op, spec, exists),
    }
}

fn plan_interface(op: Operation, spec: &InterfaceSpec, exists: bool) -> Decision {
    match op {
        Operation::Create => {
            if exists {
                return Decision::unchanged("interface exists, not changed");
            }
            let entry = match fragment::interface_entry(spec) {
                Ok(entry) => entry,
                Err(e) => return Decision::unchanged(e.to_string()),
            };
            // The membership inserts ride on `set` idempotence: re-adding
            // an existing member is a no-op on the device.
            let steps = vec![
                Step {
                    kind: ResourceKind::Interface,
                    xpath: xpath::ethernet_interface(&spec.name),
                    action: StepAction::Replace(entry),
                },
                Step {
                    kind: ResourceKind::ZoneMembership,
                    xpath: xpath::zone_layer3_members(&spec.zone),
                    action: StepAction::MergeInsert(fragment::member(&spec.name)),
                },
                Step {
                    kind: ResourceKind::VrInterfaceMembership,
                    xpath: xpath::vr_member_interfaces(&spec.virtual_router),
                    action: StepAction::MergeInsert(fragment::member(&spec.name)),
                },
            ];
            Decision::apply(steps, format!("interface '{}' created", spec.name))
        }
        Operation::Delete | Operation::CreateStatic => {
            Decision::unchanged("Operation not clear, use add")
        }
    }
}

fn plan_virtual_router(op: Operation, name: &str, exists: bool) -> Decision {
    match op {
        Operation::Create => {
            if exists {
                return Decision::unchanged("VR exists, not changed");
            }
            let step = Step {
                kind: ResourceKind::VirtualRouter,
                xpath: xpath::virtual_router(name),
                action: StepAction::Replace(fragment::vr_entry(name)),
            };
            Decision::apply(vec![step], format!("virtual router '{name}' created"))
        }
        Operation::Delete => {
            if !exists {
                return Decision::unchanged("VR does not exist, not changed");
            }
            let step = Step {
                kind: ResourceKind::VirtualRouter,
                xpath: xpath::virtual_router(name),
                action: StepAction::Delete,
            };
            Decision::apply(vec![step], format!("virtual router '{name}' deleted"))
        }
        Operation::CreateStatic => Decision::unchanged("Operation not clear, use add or del"),
    }
}

fn plan_static_route(op: Operation, spec: &StaticRouteSpec, exists: bool) -> Decision {
    match op {
        Operation::CreateStatic => {
            // `exists` refers to the parent virtual router here.
            if !exists {
                return Decision::unchanged("VR does not exist, not changed");
            }
            let entry = match fragment::static_route_entry(spec) {
                Ok(entry) => entry,
                Err(e) => return Decision::unchanged(e.to_string()),
            };
            let step = Step {
                kind: ResourceKind::StaticRoute,
                xpath: xpath::static_routes(&spec.virtual_router),
                action: StepAction::MergeInsert(entry),
            };
            Decision::apply(
                vec![step],
                format!(
                    "static route '{}' added to virtual router '{}'",
                    spec.name, spec.virtual_router
                ),
            )
        }
        Operation::Create | Operation::Delete => {
            Decision::unchanged("Operation not clear, use addstatic")
        }
    }
}

fn plan_mgmt_profile(op: Operation, spec: &MgmtProfileSpec, exists: bool) -> Decision {
    match op {
        Operation::Create => {
            if exists {
                return Decision::unchanged("interface management profile exists, not changed");
            }
            let step = Step {
                kind: ResourceKind::MgmtProfile,
                xpath: xpath::mgmt_profile(&spec.name),
                action: StepAction::Replace(fragment::mgmt_profile_entry(spec)),
            };
            Decision::apply(
                vec![step],
                format!("management profile '{}' created", spec.name),
            )
        }
        Operation::Delete => {
            if !exists {
                return Decision::unchanged(
                    "interface management profile does not exist, not changed",
                );
            }
            let step = Step {
                kind: ResourceKind::MgmtProfile,
                xpath: xpath::mgmt_profile(&spec.name),
                action: StepAction::Delete,
            };
            Decision::apply(
                vec![step],
                format!("management profile '{}' deleted", spec.name),
            )
        }
        Operation::CreateStatic => Decision::unchanged("Operation not clear, use add or del"),
    }
}

/// Drives one reconciliation pass against a device session.
pub struct Reconciler<S> {
    session: S,
    commit: bool,
}

impl<S: DeviceSession> Reconciler<S> {
    /// `commit` controls whether a pass that mutated anything also
    /// commits the candidate configuration.
    pub fn new(session: S, commit: bool) -> Self {
        Self { session, commit }
    }

    /// Borrow the underlying session.
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Run one probe → plan → apply → commit pass.
    ///
    /// Caller-input problems come back as unchanged outcomes; device
    /// failures come back as errors, with no rollback of steps already
    /// applied.
    pub async fn run(&self, request: &ReconcileRequest) -> Result<Outcome, CoreError> {
        request.validate()?;

        let probe_path = request.probe_xpath();
        let exists = probe::probe(&self.session, &probe_path).await?;

        match plan(request, exists) {
            Decision::Unchanged { message } => {
                info!(kind = %request.kind(), %message, "no change");
                Ok(Outcome {
                    changed: false,
                    message,
                })
            }
            Decision::Apply { steps, message } => {
                for step in &steps {
                    self.execute(step).await?;
                }
                commit_if_needed(&self.session, true, self.commit).await?;
                info!(kind = %request.kind(), %message, "applied");
                Ok(Outcome {
                    changed: true,
                    message,
                })
            }
        }
    }

    async fn execute(&self, step: &Step) -> Result<(), CoreError> {
        debug!(kind = %step.kind, xpath = %step.xpath, "executing step");
        let result = match &step.action {
            StepAction::Replace(element) => {
                self.session.create_or_replace(&step.xpath, element).await
            }
            StepAction::MergeInsert(element) => self.session.merge_insert(&step.xpath, element).await,
            StepAction::Delete => self.session.delete(&step.xpath).await,
        };
        result.map_err(|source| CoreError::MutationFailed {
            kind: step.kind,
            xpath: step.xpath.to_string(),
            source,
        })
    }
}
