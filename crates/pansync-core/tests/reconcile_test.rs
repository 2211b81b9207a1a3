#![allow(clippy::unwrap_used)]
// Engine tests against a scripted device session.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use pretty_assertions::assert_eq;

use pansync_core::reconcile::{Operation, ReconcileRequest, Reconciler, ResourceKind};
use pansync_core::resource::{InterfaceSpec, MgmtProfileSpec, ServiceFlags, StaticRouteSpec};
use pansync_core::xpath::Xpath;
use pansync_core::{CoreError, DeviceSession, SessionError};

// ── Scripted session double ─────────────────────────────────────────

/// What the double records for each device call.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Read(String),
    Replace { xpath: String, element: String },
    MergeInsert { xpath: String, element: String },
    Delete(String),
    Commit { sync: bool },
}

/// Canned read bodies keyed by xpath, optional failure injection, and a
/// full call log.
#[derive(Default)]
struct ScriptedSession {
    reads: HashMap<String, String>,
    fail_read_at: Option<String>,
    fail_mutation_at: Option<String>,
    fail_commit: bool,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedSession {
    fn new() -> Self {
        Self::default()
    }

    /// Script an existing resource: reads at `xpath` return an entry body.
    fn with_existing(mut self, xpath: &Xpath) -> Self {
        self.reads
            .insert(xpath.to_string(), r#"<entry name="scripted"/>"#.to_string());
        self
    }

    fn failing_read_at(mut self, xpath: &Xpath) -> Self {
        self.fail_read_at = Some(xpath.to_string());
        self
    }

    fn failing_mutation_at(mut self, xpath: &Xpath) -> Self {
        self.fail_mutation_at = Some(xpath.to_string());
        self
    }

    fn failing_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn device_error() -> SessionError {
        SessionError::device("Validation Error: object in use", Some("12".to_string()))
    }

    fn mutation_result(&self, xpath: &Xpath) -> Result<(), SessionError> {
        match &self.fail_mutation_at {
            Some(fail) if fail == xpath.as_str() => Err(Self::device_error()),
            _ => Ok(()),
        }
    }
}

impl DeviceSession for ScriptedSession {
    async fn read(&self, xpath: &Xpath) -> Result<String, SessionError> {
        self.record(Call::Read(xpath.to_string()));
        if self.fail_read_at.as_deref() == Some(xpath.as_str()) {
            return Err(Self::device_error());
        }
        Ok(self.reads.get(xpath.as_str()).cloned().unwrap_or_default())
    }

    async fn create_or_replace(&self, xpath: &Xpath, element: &str) -> Result<(), SessionError> {
        self.record(Call::Replace {
            xpath: xpath.to_string(),
            element: element.to_string(),
        });
        self.mutation_result(xpath)
    }

    async fn merge_insert(&self, xpath: &Xpath, element: &str) -> Result<(), SessionError> {
        self.record(Call::MergeInsert {
            xpath: xpath.to_string(),
            element: element.to_string(),
        });
        self.mutation_result(xpath)
    }

    async fn delete(&self, xpath: &Xpath) -> Result<(), SessionError> {
        self.record(Call::Delete(xpath.to_string()));
        self.mutation_result(xpath)
    }

    async fn commit(&self, sync: bool, _poll_interval: Duration) -> Result<(), SessionError> {
        self.record(Call::Commit { sync });
        if self.fail_commit {
            return Err(Self::device_error());
        }
        Ok(())
    }
}

// ── Request builders ────────────────────────────────────────────────

fn vr_request(op: Operation) -> ReconcileRequest {
    ReconcileRequest::VirtualRouter {
        op,
        name: "vr-edge".to_string(),
    }
}

fn interface_request(mode: &str, address: Option<&str>) -> ReconcileRequest {
    ReconcileRequest::Interface {
        op: Operation::Create,
        spec: InterfaceSpec {
            name: "ethernet1/5".to_string(),
            mode: mode.to_string(),
            address: address.map(str::to_string),
            virtual_router: "default".to_string(),
            zone: "untrust".to_string(),
            create_default_route: true,
        },
    }
}

fn route_request(next_hop_kind: &str) -> ReconcileRequest {
    ReconcileRequest::StaticRoute {
        op: Operation::CreateStatic,
        spec: StaticRouteSpec {
            virtual_router: "vr-edge".to_string(),
            name: "default-route".to_string(),
            destination: "0.0.0.0/0".to_string(),
            next_hop: "10.0.0.254".to_string(),
            next_hop_kind: next_hop_kind.to_string(),
        },
    }
}

fn profile_request(op: Operation) -> ReconcileRequest {
    ReconcileRequest::MgmtProfile {
        op,
        spec: MgmtProfileSpec {
            name: "mgmt-restricted".to_string(),
            services: ServiceFlags {
                https: true,
                ssh: true,
                ping: true,
                ..ServiceFlags::default()
            },
            permitted_ips: vec!["10.0.0.5".to_string(), "10.0.0.6".to_string()],
        },
    }
}

const VR_XPATH: &str =
    "/config/devices/entry[@name='localhost.localdomain']/network/virtual-router/entry[@name='vr-edge']";
const IF_XPATH: &str =
    "/config/devices/entry[@name='localhost.localdomain']/network/interface/ethernet/entry[@name='ethernet1/5']";

// ── Virtual router lifecycle ────────────────────────────────────────

#[tokio::test]
async fn test_vr_add_creates_and_commits() {
    let reconciler = Reconciler::new(ScriptedSession::new(), true);

    let outcome = reconciler.run(&vr_request(Operation::Create)).await.unwrap();

    assert!(outcome.changed);
    assert_eq!(outcome.message, "virtual router 'vr-edge' created");
    assert_eq!(
        reconciler.session().calls(),
        vec![
            Call::Read(VR_XPATH.to_string()),
            Call::Replace {
                xpath: VR_XPATH.to_string(),
                element: r#"<entry name="vr-edge"></entry>"#.to_string(),
            },
            Call::Commit { sync: true },
        ]
    );
}

#[tokio::test]
async fn test_vr_add_when_present_is_noop() {
    let session = ScriptedSession::new().with_existing(&pansync_core::xpath::virtual_router("vr-edge"));
    let reconciler = Reconciler::new(session, true);

    let outcome = reconciler.run(&vr_request(Operation::Create)).await.unwrap();

    assert!(!outcome.changed);
    assert_eq!(outcome.message, "VR exists, not changed");
    // Probe only: no mutation, no commit.
    assert_eq!(
        reconciler.session().calls(),
        vec![Call::Read(VR_XPATH.to_string())]
    );
}

#[tokio::test]
async fn test_vr_del_when_absent_is_noop() {
    let reconciler = Reconciler::new(ScriptedSession::new(), true);

    let outcome = reconciler.run(&vr_request(Operation::Delete)).await.unwrap();

    assert!(!outcome.changed);
    assert_eq!(outcome.message, "VR does not exist, not changed");
    assert_eq!(
        reconciler.session().calls(),
        vec![Call::Read(VR_XPATH.to_string())]
    );
}

#[tokio::test]
async fn test_vr_del_deletes_and_commits() {
    let session = ScriptedSession::new().with_existing(&pansync_core::xpath::virtual_router("vr-edge"));
    let reconciler = Reconciler::new(session, true);

    let outcome = reconciler.run(&vr_request(Operation::Delete)).await.unwrap();

    assert!(outcome.changed);
    assert_eq!(outcome.message, "virtual router 'vr-edge' deleted");
    assert_eq!(
        reconciler.session().calls(),
        vec![
            Call::Read(VR_XPATH.to_string()),
            Call::Delete(VR_XPATH.to_string()),
            Call::Commit { sync: true },
        ]
    );
}

#[tokio::test]
async fn test_no_commit_flag_suppresses_commit() {
    let reconciler = Reconciler::new(ScriptedSession::new(), false);

    let outcome = reconciler.run(&vr_request(Operation::Create)).await.unwrap();

    assert!(outcome.changed);
    let calls = reconciler.session().calls();
    assert!(
        !calls.iter().any(|c| matches!(c, Call::Commit { .. })),
        "commit issued despite commit=false: {calls:?}"
    );
}

// ── Interface creation ──────────────────────────────────────────────

#[tokio::test]
async fn test_interface_add_issues_side_channel_inserts() {
    let reconciler = Reconciler::new(ScriptedSession::new(), true);

    let outcome = reconciler
        .run(&interface_request("dhcp", None))
        .await
        .unwrap();

    assert!(outcome.changed);
    assert_eq!(outcome.message, "interface 'ethernet1/5' created");
    assert_eq!(
        reconciler.session().calls(),
        vec![
            Call::Read(IF_XPATH.to_string()),
            Call::Replace {
                xpath: IF_XPATH.to_string(),
                element: r#"<entry name="ethernet1/5"><layer3><dhcp-client><create-default-route>yes</create-default-route></dhcp-client></layer3></entry>"#.to_string(),
            },
            Call::MergeInsert {
                xpath: "/config/devices/entry[@name='localhost.localdomain']/vsys/entry/zone/entry[@name='untrust']/network/layer3".to_string(),
                element: "<member>ethernet1/5</member>".to_string(),
            },
            Call::MergeInsert {
                xpath: "/config/devices/entry[@name='localhost.localdomain']/network/virtual-router/entry[@name='default']/interface".to_string(),
                element: "<member>ethernet1/5</member>".to_string(),
            },
            Call::Commit { sync: true },
        ]
    );
}

#[tokio::test]
async fn test_interface_add_when_present_is_noop() {
    let session =
        ScriptedSession::new().with_existing(&pansync_core::xpath::ethernet_interface("ethernet1/5"));
    let reconciler = Reconciler::new(session, true);

    let outcome = reconciler
        .run(&interface_request("dhcp", None))
        .await
        .unwrap();

    assert!(!outcome.changed);
    assert_eq!(outcome.message, "interface exists, not changed");
    assert_eq!(
        reconciler.session().calls(),
        vec![Call::Read(IF_XPATH.to_string())]
    );
}

#[tokio::test]
async fn test_interface_unknown_mode_is_benign() {
    let reconciler = Reconciler::new(ScriptedSession::new(), true);

    let outcome = reconciler
        .run(&interface_request("bridged", None))
        .await
        .unwrap();

    assert!(!outcome.changed);
    assert_eq!(
        outcome.message,
        "invalid interface mode \"bridged\", use dhcp or static"
    );
    // Probed, but no mutation was attempted.
    assert_eq!(
        reconciler.session().calls(),
        vec![Call::Read(IF_XPATH.to_string())]
    );
}

#[tokio::test]
async fn test_interface_static_without_address_is_benign() {
    let reconciler = Reconciler::new(ScriptedSession::new(), true);

    let outcome = reconciler
        .run(&interface_request("static", None))
        .await
        .unwrap();

    assert!(!outcome.changed);
    assert_eq!(
        outcome.message,
        "interface mode \"static\" requires an address"
    );
    assert_eq!(
        reconciler.session().calls(),
        vec![Call::Read(IF_XPATH.to_string())]
    );
}

// ── Static routes ───────────────────────────────────────────────────

#[tokio::test]
async fn test_static_route_requires_parent_vr() {
    let reconciler = Reconciler::new(ScriptedSession::new(), true);

    let outcome = reconciler.run(&route_request("ip")).await.unwrap();

    assert!(!outcome.changed);
    assert_eq!(outcome.message, "VR does not exist, not changed");
    assert_eq!(
        reconciler.session().calls(),
        vec![Call::Read(VR_XPATH.to_string())]
    );
}

#[tokio::test]
async fn test_static_route_inserts_under_parent() {
    let session = ScriptedSession::new().with_existing(&pansync_core::xpath::virtual_router("vr-edge"));
    let reconciler = Reconciler::new(session, true);

    let outcome = reconciler.run(&route_request("ip")).await.unwrap();

    assert!(outcome.changed);
    assert_eq!(
        outcome.message,
        "static route 'default-route' added to virtual router 'vr-edge'"
    );
    assert_eq!(
        reconciler.session().calls(),
        vec![
            Call::Read(VR_XPATH.to_string()),
            Call::MergeInsert {
                xpath: format!("{VR_XPATH}/routing-table/ip/static-route"),
                element: r#"<entry name="default-route"><destination>0.0.0.0/0</destination><nexthop><ip-address>10.0.0.254</ip-address></nexthop></entry>"#.to_string(),
            },
            Call::Commit { sync: true },
        ]
    );
}

#[tokio::test]
async fn test_static_route_unknown_next_hop_kind_is_benign() {
    let session = ScriptedSession::new().with_existing(&pansync_core::xpath::virtual_router("vr-edge"));
    let reconciler = Reconciler::new(session, true);

    let outcome = reconciler.run(&route_request("gateway")).await.unwrap();

    assert!(!outcome.changed);
    assert_eq!(
        outcome.message,
        "invalid next hop type \"gateway\", use ip or next-vr"
    );
    assert_eq!(
        reconciler.session().calls(),
        vec![Call::Read(VR_XPATH.to_string())]
    );
}

// ── Management profiles ─────────────────────────────────────────────

#[tokio::test]
async fn test_profile_add_renders_full_fragment() {
    let reconciler = Reconciler::new(ScriptedSession::new(), true);

    let outcome = reconciler
        .run(&profile_request(Operation::Create))
        .await
        .unwrap();

    assert!(outcome.changed);
    assert_eq!(outcome.message, "management profile 'mgmt-restricted' created");

    let calls = reconciler.session().calls();
    let Call::Replace { xpath, element } = &calls[1] else {
        panic!("expected a replace step, got: {calls:?}");
    };
    assert_eq!(
        xpath,
        "/config/devices/entry[@name='localhost.localdomain']/network/profiles/interface-management-profile/entry[@name='mgmt-restricted']"
    );
    assert_eq!(
        element,
        r#"<entry name="mgmt-restricted"><permitted-ip><entry name="10.0.0.5"/><entry name="10.0.0.6"/></permitted-ip><http>no</http><https>yes</https><http-ocsp>no</http-ocsp><ssh>yes</ssh><snmp>no</snmp><userid-service>no</userid-service><userid-syslog-listener-ssl>no</userid-syslog-listener-ssl><userid-syslog-listener-udp>no</userid-syslog-listener-udp><ping>yes</ping><response-pages>no</response-pages><telnet>no</telnet></entry>"#
    );
}

#[tokio::test]
async fn test_profile_del_when_absent_is_noop() {
    let reconciler = Reconciler::new(ScriptedSession::new(), true);

    let outcome = reconciler
        .run(&profile_request(Operation::Delete))
        .await
        .unwrap();

    assert!(!outcome.changed);
    assert_eq!(
        outcome.message,
        "interface management profile does not exist, not changed"
    );
}

// ── Failure propagation ─────────────────────────────────────────────

#[tokio::test]
async fn test_mutation_failure_aborts_remaining_steps_and_commit() {
    let zone_xpath = pansync_core::xpath::zone_layer3_members("untrust");
    let session = ScriptedSession::new().failing_mutation_at(&zone_xpath);
    let reconciler = Reconciler::new(session, true);

    let err = reconciler
        .run(&interface_request("dhcp", None))
        .await
        .unwrap_err();

    match err {
        CoreError::MutationFailed { kind, xpath, source } => {
            assert_eq!(kind, ResourceKind::ZoneMembership);
            assert_eq!(xpath, zone_xpath.to_string());
            assert!(
                source.to_string().contains("Validation Error"),
                "device message lost: {source}"
            );
        }
        other => panic!("expected MutationFailed, got: {other:?}"),
    }

    // The interface edit went through, the failing zone insert was
    // recorded, and nothing ran after it.
    let calls = reconciler.session().calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(calls[1], Call::Replace { .. }));
    assert!(matches!(calls[2], Call::MergeInsert { .. }));
}

#[tokio::test]
async fn test_probe_failure_is_fatal() {
    let vr_xpath = pansync_core::xpath::virtual_router("vr-edge");
    let session = ScriptedSession::new().failing_read_at(&vr_xpath);
    let reconciler = Reconciler::new(session, true);

    let err = reconciler
        .run(&vr_request(Operation::Create))
        .await
        .unwrap_err();

    assert!(
        matches!(err, CoreError::ProbeFailed { .. }),
        "got: {err:?}"
    );
    assert_eq!(reconciler.session().calls().len(), 1);
}

#[tokio::test]
async fn test_commit_failure_is_distinct_from_mutation_failure() {
    let session = ScriptedSession::new().failing_commit();
    let reconciler = Reconciler::new(session, true);

    let err = reconciler
        .run(&vr_request(Operation::Create))
        .await
        .unwrap_err();

    assert!(
        matches!(err, CoreError::CommitFailed { .. }),
        "got: {err:?}"
    );
    // The mutation itself was accepted before the commit failed.
    let calls = reconciler.session().calls();
    assert!(matches!(calls[1], Call::Replace { .. }));
}

#[tokio::test]
async fn test_invalid_name_is_rejected_before_any_device_call() {
    let reconciler = Reconciler::new(ScriptedSession::new(), true);

    let request = ReconcileRequest::VirtualRouter {
        op: Operation::Create,
        name: "vr'; injected".to_string(),
    };
    let err = reconciler.run(&request).await.unwrap_err();

    assert!(
        matches!(err, CoreError::InvalidName { .. }),
        "got: {err:?}"
    );
    assert_eq!(reconciler.session().calls(), Vec::new());
}

// ── Idempotence ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_second_add_pass_reports_unchanged() {
    // First pass against an empty device mutates; a pass against a
    // device that already has the router does not.
    let first = Reconciler::new(ScriptedSession::new(), true);
    let outcome = first.run(&vr_request(Operation::Create)).await.unwrap();
    assert!(outcome.changed);

    let second = Reconciler::new(
        ScriptedSession::new().with_existing(&pansync_core::xpath::virtual_router("vr-edge")),
        true,
    );
    let outcome = second.run(&vr_request(Operation::Create)).await.unwrap();
    assert!(!outcome.changed);
    assert_eq!(
        second.session().calls(),
        vec![Call::Read(VR_XPATH.to_string())]
    );
}
