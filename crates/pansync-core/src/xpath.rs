// XPath construction for the device configuration tree.
//
// All paths live under the single-vsys device entry. Identifiers are
// validated rather than quoted: a name that would need escaping inside
// an XPath predicate is refused before any device call, while fragment
// content is escaped separately by the XML writer.

use std::fmt;

use crate::error::CoreError;

/// Configuration root of a single-vsys device.
pub const CONFIG_ROOT: &str = "/config/devices/entry[@name='localhost.localdomain']";

/// An absolute XPath into the device configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Xpath(String);

impl Xpath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Xpath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reject identifiers that cannot be embedded safely in a predicate or
/// an XML attribute: empty names, XML metacharacters, control characters.
pub fn validate_name(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.is_empty() {
        return Err(CoreError::InvalidName {
            field,
            value: value.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    if let Some(c) = value
        .chars()
        .find(|c| matches!(c, '\'' | '"' | '<' | '>' | '&') || c.is_control())
    {
        return Err(CoreError::InvalidName {
            field,
            value: value.to_string(),
            reason: format!("contains forbidden character {c:?}"),
        });
    }
    Ok(())
}

// ── Resource paths ──────────────────────────────────────────────────

/// `<entry>` of a layer3 ethernet interface.
pub fn ethernet_interface(name: &str) -> Xpath {
    Xpath(format!(
        "{CONFIG_ROOT}/network/interface/ethernet/entry[@name='{name}']"
    ))
}

/// `<entry>` of a virtual router.
pub fn virtual_router(name: &str) -> Xpath {
    Xpath(format!(
        "{CONFIG_ROOT}/network/virtual-router/entry[@name='{name}']"
    ))
}

/// Static route table of a virtual router; route entries are merged in
/// under this node.
pub fn static_routes(vr: &str) -> Xpath {
    Xpath(format!(
        "{CONFIG_ROOT}/network/virtual-router/entry[@name='{vr}']/routing-table/ip/static-route"
    ))
}

/// `<entry>` of an interface management profile.
pub fn mgmt_profile(name: &str) -> Xpath {
    Xpath(format!(
        "{CONFIG_ROOT}/network/profiles/interface-management-profile/entry[@name='{name}']"
    ))
}

// ── Membership link paths ───────────────────────────────────────────

/// Layer3 member list of a security zone. The vsys entry carries no name
/// predicate: on a single-vsys device there is exactly one.
pub fn zone_layer3_members(zone: &str) -> Xpath {
    Xpath(format!(
        "{CONFIG_ROOT}/vsys/entry/zone/entry[@name='{zone}']/network/layer3"
    ))
}

/// Interface member list of a virtual router.
pub fn vr_member_interfaces(vr: &str) -> Xpath {
    Xpath(format!(
        "{CONFIG_ROOT}/network/virtual-router/entry[@name='{vr}']/interface"
    ))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn interface_path() {
        assert_eq!(
            ethernet_interface("ethernet1/5").as_str(),
            "/config/devices/entry[@name='localhost.localdomain']/network/interface/ethernet/entry[@name='ethernet1/5']"
        );
    }

    #[test]
    fn virtual_router_paths() {
        assert_eq!(
            virtual_router("vr-edge").as_str(),
            "/config/devices/entry[@name='localhost.localdomain']/network/virtual-router/entry[@name='vr-edge']"
        );
        assert_eq!(
            static_routes("vr-edge").as_str(),
            "/config/devices/entry[@name='localhost.localdomain']/network/virtual-router/entry[@name='vr-edge']/routing-table/ip/static-route"
        );
        assert_eq!(
            vr_member_interfaces("vr-edge").as_str(),
            "/config/devices/entry[@name='localhost.localdomain']/network/virtual-router/entry[@name='vr-edge']/interface"
        );
    }

    #[test]
    fn profile_and_zone_paths() {
        assert_eq!(
            mgmt_profile("mgmt-https").as_str(),
            "/config/devices/entry[@name='localhost.localdomain']/network/profiles/interface-management-profile/entry[@name='mgmt-https']"
        );
        assert_eq!(
            zone_layer3_members("untrust").as_str(),
            "/config/devices/entry[@name='localhost.localdomain']/vsys/entry/zone/entry[@name='untrust']/network/layer3"
        );
    }

    #[test]
    fn names_with_metacharacters_are_rejected() {
        for bad in ["", "vr'edge", "a\"b", "x<y", "x>y", "a&b", "a\nb"] {
            assert!(
                validate_name("virtual router name", bad).is_err(),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn ordinary_names_pass() {
        for good in ["ethernet1/5", "vr-edge", "default", "zone_3", "mgmt.web"] {
            validate_name("name", good).unwrap_or_else(|e| panic!("rejected {good:?}: {e}"));
        }
    }
}
