// Declarative resource descriptors.
//
// One descriptor per reconciliation request, built fresh from caller
// input and dropped after the pass. Mode and next-hop fields carry the
// caller's raw tokens; the fragment renderer validates them so that bad
// tokens surface as unchanged outcomes, not errors.

/// Desired state of a layer3 ethernet interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSpec {
    /// Interface name, e.g. `ethernet1/5`.
    pub name: String,
    /// Addressing mode token: `dhcp` or `static`.
    pub mode: String,
    /// CIDR address, required for `static` mode.
    pub address: Option<String>,
    /// Virtual router that takes the interface as a member.
    pub virtual_router: String,
    /// Security zone whose layer3 member list takes the interface.
    pub zone: String,
    /// For `dhcp` mode, whether the DHCP lease installs a default route.
    pub create_default_route: bool,
}

/// Desired state of a static route inside a virtual router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticRouteSpec {
    /// Parent virtual router, which must already exist.
    pub virtual_router: String,
    /// Route entry name.
    pub name: String,
    /// Destination prefix in CIDR form.
    pub destination: String,
    /// Next hop value: an IP address or a virtual router name.
    pub next_hop: String,
    /// Next hop kind token: `ip` or `next-vr`.
    pub next_hop_kind: String,
}

/// Desired state of an interface management profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MgmtProfileSpec {
    pub name: String,
    pub services: ServiceFlags,
    /// Source addresses allowed to reach the enabled services. Order is
    /// preserved; an empty list means no restriction.
    pub permitted_ips: Vec<String>,
}

/// Management services toggled by a profile.
///
/// Field order matches the element order the device schema expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceFlags {
    pub http: bool,
    pub https: bool,
    pub http_ocsp: bool,
    pub ssh: bool,
    pub snmp: bool,
    pub userid_service: bool,
    pub userid_syslog_listener_ssl: bool,
    pub userid_syslog_listener_udp: bool,
    pub ping: bool,
    pub response_pages: bool,
    pub telnet: bool,
}
