// XML fragment rendering.
//
// Builds the element bodies handed to edit/set calls. Rendering is pure
// and deterministic: the same descriptor always yields the same bytes.
// Text and attribute values are escaped by the writer; identifier
// validation happens earlier, in `xpath`.

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use thiserror::Error;

use crate::resource::{InterfaceSpec, MgmtProfileSpec, StaticRouteSpec};

/// Caller-input problems detected at render time.
///
/// These are benign: the engine turns them into unchanged outcomes
/// instead of failing the invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("invalid interface mode {0:?}, use dhcp or static")]
    UnsupportedMode(String),
    #[error("invalid next hop type {0:?}, use ip or next-vr")]
    UnsupportedNextHop(String),
    #[error("interface mode \"static\" requires an address")]
    MissingStaticAddress,
}

/// Render the `<entry>` element for a layer3 ethernet interface.
pub fn interface_entry(spec: &InterfaceSpec) -> Result<String, RenderError> {
    let mut w = ElementWriter::new();
    w.open_entry(&spec.name);
    w.open("layer3");
    match spec.mode.as_str() {
        "dhcp" => {
            w.open("dhcp-client");
            w.leaf("create-default-route", yes_no(spec.create_default_route));
            w.close("dhcp-client");
        }
        "static" => {
            let address = spec
                .address
                .as_deref()
                .filter(|a| !a.is_empty())
                .ok_or(RenderError::MissingStaticAddress)?;
            w.open("ip");
            w.empty_entry(address);
            w.close("ip");
        }
        other => return Err(RenderError::UnsupportedMode(other.to_string())),
    }
    w.close("layer3");
    w.close("entry");
    Ok(w.finish())
}

/// Render the empty named `<entry>` that creates a virtual router.
pub fn vr_entry(name: &str) -> String {
    let mut w = ElementWriter::new();
    w.open_entry(name);
    w.close("entry");
    w.finish()
}

/// Render a static route `<entry>` for merge-insertion under a virtual
/// router's static route table.
pub fn static_route_entry(spec: &StaticRouteSpec) -> Result<String, RenderError> {
    let next_hop_tag = match spec.next_hop_kind.as_str() {
        "ip" => "ip-address",
        "next-vr" => "next-vr",
        other => return Err(RenderError::UnsupportedNextHop(other.to_string())),
    };
    let mut w = ElementWriter::new();
    w.open_entry(&spec.name);
    w.leaf("destination", &spec.destination);
    w.open("nexthop");
    w.leaf(next_hop_tag, &spec.next_hop);
    w.close("nexthop");
    w.close("entry");
    Ok(w.finish())
}

/// Render the `<entry>` element for an interface management profile.
///
/// The permitted-ip list is omitted entirely when empty; the device
/// reads a missing list as "no source restriction". Service elements
/// are always emitted, in schema order.
pub fn mgmt_profile_entry(spec: &MgmtProfileSpec) -> String {
    let mut w = ElementWriter::new();
    w.open_entry(&spec.name);
    if !spec.permitted_ips.is_empty() {
        w.open("permitted-ip");
        for ip in &spec.permitted_ips {
            w.empty_entry(ip);
        }
        w.close("permitted-ip");
    }
    let s = &spec.services;
    for (tag, enabled) in [
        ("http", s.http),
        ("https", s.https),
        ("http-ocsp", s.http_ocsp),
        ("ssh", s.ssh),
        ("snmp", s.snmp),
        ("userid-service", s.userid_service),
        ("userid-syslog-listener-ssl", s.userid_syslog_listener_ssl),
        ("userid-syslog-listener-udp", s.userid_syslog_listener_udp),
        ("ping", s.ping),
        ("response-pages", s.response_pages),
        ("telnet", s.telnet),
    ] {
        w.leaf(tag, yes_no(enabled));
    }
    w.close("entry");
    w.finish()
}

/// Render a `<member>` link element.
pub fn member(name: &str) -> String {
    let mut w = ElementWriter::new();
    w.leaf("member", name);
    w.finish()
}

/// The device accepts exactly the literal tokens `yes` and `no`.
fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Element writer over an in-memory buffer. Writes to a `Vec` cannot
/// fail, so the per-event results are unwrapped here in one place.
struct ElementWriter {
    inner: Writer<Vec<u8>>,
}

impl ElementWriter {
    fn new() -> Self {
        Self {
            inner: Writer::new(Vec::new()),
        }
    }

    fn open(&mut self, tag: &str) {
        self.write(Event::Start(BytesStart::new(tag)));
    }

    fn close(&mut self, tag: &str) {
        self.write(Event::End(BytesEnd::new(tag)));
    }

    /// `<entry name="...">`
    fn open_entry(&mut self, name: &str) {
        let mut start = BytesStart::new("entry");
        start.push_attribute(("name", name));
        self.write(Event::Start(start));
    }

    /// `<entry name="..."/>`
    fn empty_entry(&mut self, name: &str) {
        let mut start = BytesStart::new("entry");
        start.push_attribute(("name", name));
        self.write(Event::Empty(start));
    }

    /// `<tag>text</tag>`
    fn leaf(&mut self, tag: &str, text: &str) {
        self.open(tag);
        self.write(Event::Text(BytesText::new(text)));
        self.close(tag);
    }

    fn write(&mut self, event: Event<'_>) {
        self.inner
            .write_event(event)
            .expect("writing to an in-memory buffer cannot fail");
    }

    fn finish(self) -> String {
        String::from_utf8(self.inner.into_inner()).expect("writer output is valid UTF-8")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::resource::ServiceFlags;

    fn dhcp_interface() -> InterfaceSpec {
        InterfaceSpec {
            name: "ethernet1/1".to_string(),
            mode: "dhcp".to_string(),
            address: None,
            virtual_router: "default".to_string(),
            zone: "untrust".to_string(),
            create_default_route: true,
        }
    }

    #[test]
    fn dhcp_interface_fragment() {
        assert_snapshot!(
            interface_entry(&dhcp_interface()).unwrap(),
            @r#"<entry name="ethernet1/1"><layer3><dhcp-client><create-default-route>yes</create-default-route></dhcp-client></layer3></entry>"#
        );
    }

    #[test]
    fn dhcp_interface_without_default_route() {
        let mut spec = dhcp_interface();
        spec.create_default_route = false;
        assert_snapshot!(
            interface_entry(&spec).unwrap(),
            @r#"<entry name="ethernet1/1"><layer3><dhcp-client><create-default-route>no</create-default-route></dhcp-client></layer3></entry>"#
        );
    }

    #[test]
    fn static_interface_fragment() {
        let mut spec = dhcp_interface();
        spec.mode = "static".to_string();
        spec.address = Some("10.0.0.1/24".to_string());
        assert_snapshot!(
            interface_entry(&spec).unwrap(),
            @r#"<entry name="ethernet1/1"><layer3><ip><entry name="10.0.0.1/24"/></ip></layer3></entry>"#
        );
    }

    #[test]
    fn static_interface_without_address_is_rejected() {
        let mut spec = dhcp_interface();
        spec.mode = "static".to_string();
        assert_eq!(
            interface_entry(&spec).unwrap_err(),
            RenderError::MissingStaticAddress
        );
    }

    #[test]
    fn unknown_interface_mode_is_rejected() {
        let mut spec = dhcp_interface();
        spec.mode = "bridged".to_string();
        let err = interface_entry(&spec).unwrap_err();
        assert_eq!(err, RenderError::UnsupportedMode("bridged".to_string()));
        assert_eq!(
            err.to_string(),
            "invalid interface mode \"bridged\", use dhcp or static"
        );
    }

    #[test]
    fn vr_fragment_is_an_empty_named_entry() {
        assert_snapshot!(vr_entry("vr-edge"), @r#"<entry name="vr-edge"></entry>"#);
    }

    #[test]
    fn static_route_fragment_with_ip_next_hop() {
        let spec = StaticRouteSpec {
            virtual_router: "vr-edge".to_string(),
            name: "default-route".to_string(),
            destination: "0.0.0.0/0".to_string(),
            next_hop: "10.0.0.254".to_string(),
            next_hop_kind: "ip".to_string(),
        };
        assert_snapshot!(
            static_route_entry(&spec).unwrap(),
            @r#"<entry name="default-route"><destination>0.0.0.0/0</destination><nexthop><ip-address>10.0.0.254</ip-address></nexthop></entry>"#
        );
    }

    #[test]
    fn static_route_fragment_with_next_vr() {
        let spec = StaticRouteSpec {
            virtual_router: "vr-edge".to_string(),
            name: "to-core".to_string(),
            destination: "172.16.0.0/12".to_string(),
            next_hop: "vr-core".to_string(),
            next_hop_kind: "next-vr".to_string(),
        };
        assert_snapshot!(
            static_route_entry(&spec).unwrap(),
            @r#"<entry name="to-core"><destination>172.16.0.0/12</destination><nexthop><next-vr>vr-core</next-vr></nexthop></entry>"#
        );
    }

    #[test]
    fn unknown_next_hop_kind_is_rejected() {
        let spec = StaticRouteSpec {
            virtual_router: "vr-edge".to_string(),
            name: "r1".to_string(),
            destination: "0.0.0.0/0".to_string(),
            next_hop: "10.0.0.1".to_string(),
            next_hop_kind: "gateway".to_string(),
        };
        assert_eq!(
            static_route_entry(&spec).unwrap_err(),
            RenderError::UnsupportedNextHop("gateway".to_string())
        );
    }

    #[test]
    fn mgmt_profile_fragment_with_permitted_ips() {
        let spec = MgmtProfileSpec {
            name: "mgmt-restricted".to_string(),
            services: ServiceFlags {
                https: true,
                ssh: true,
                ping: true,
                ..ServiceFlags::default()
            },
            permitted_ips: vec!["10.0.0.5".to_string(), "10.0.0.6".to_string()],
        };
        assert_snapshot!(
            mgmt_profile_entry(&spec),
            @r#"<entry name="mgmt-restricted"><permitted-ip><entry name="10.0.0.5"/><entry name="10.0.0.6"/></permitted-ip><http>no</http><https>yes</https><http-ocsp>no</http-ocsp><ssh>yes</ssh><snmp>no</snmp><userid-service>no</userid-service><userid-syslog-listener-ssl>no</userid-syslog-listener-ssl><userid-syslog-listener-udp>no</userid-syslog-listener-udp><ping>yes</ping><response-pages>no</response-pages><telnet>no</telnet></entry>"#
        );
    }

    #[test]
    fn mgmt_profile_omits_empty_permitted_ip_list() {
        let spec = MgmtProfileSpec {
            name: "mgmt-open".to_string(),
            services: ServiceFlags::default(),
            permitted_ips: Vec::new(),
        };
        let xml = mgmt_profile_entry(&spec);
        assert!(!xml.contains("permitted-ip"), "got: {xml}");
        assert!(xml.starts_with(r#"<entry name="mgmt-open"><http>no</http>"#));
    }

    #[test]
    fn member_fragment() {
        assert_snapshot!(member("ethernet1/5"), @"<member>ethernet1/5</member>");
    }

    #[test]
    fn rendering_is_deterministic() {
        let spec = dhcp_interface();
        assert_eq!(
            interface_entry(&spec).unwrap(),
            interface_entry(&spec).unwrap()
        );
    }
}
