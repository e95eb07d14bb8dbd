//! The five manageable resource kinds.
//!
//! Each kind is a unit struct implementing [`reconcile::ResourceKind`]:
//! a static schema in application order, identity validation, the
//! permanence predicate where it applies, and the normalizer that maps raw
//! device state into canonical attributes. All device-dialect quirks
//! (inverted booleans, list joining, nested address objects) live here so
//! the engine stays kind-agnostic.

pub mod interface;
pub mod ipinterface;
pub mod switchport;
pub mod vlan;
pub mod vxlan;

use reconcile::{AttrValue, Error, ResourceKind, Result};
use regex::Regex;
use std::sync::LazyLock;

pub use interface::InterfaceKind;
pub use ipinterface::IpInterfaceKind;
pub use switchport::SwitchportKind;
pub use vlan::VlanKind;
pub use vxlan::VxlanKind;

/// All kinds, in a stable display order.
pub static KINDS: [&dyn ResourceKind; 5] = [
    &InterfaceKind,
    &VlanKind,
    &SwitchportKind,
    &VxlanKind,
    &IpInterfaceKind,
];

/// Look a kind up by its wire name.
pub fn by_name(name: &str) -> Option<&'static dyn ResourceKind> {
    KINDS.iter().copied().find(|kind| kind.name() == name)
}

static INTERFACE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9/.-]*$").expect("valid regex"));

/// Shared identity check for kinds keyed by interface name
/// (`Ethernet3/1`, `Port-Channel10`, `Vlan100`).
pub(crate) fn validate_interface_name(kind: &str, identity: &str) -> Result<()> {
    if INTERFACE_NAME.is_match(identity) {
        Ok(())
    } else {
        Err(Error::schema(format!(
            "'{identity}' is not a valid interface name for kind '{kind}'"
        )))
    }
}

/// Shared range check for VLAN-id attribute values.
pub(crate) fn vlan_id_in_range(value: &AttrValue) -> std::result::Result<(), String> {
    match value.as_int() {
        Some(1..=4094) => Ok(()),
        _ => Err("VLAN id must be in 1-4094".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_resolves_all_kinds() {
        for name in ["interface", "vlan", "switchport", "vxlan", "ipinterface"] {
            assert!(by_name(name).is_some(), "missing kind: {name}");
        }
        assert!(by_name("bgp").is_none());
    }

    #[test]
    fn test_interface_name_syntax() {
        assert!(validate_interface_name("interface", "Ethernet3/1").is_ok());
        assert!(validate_interface_name("interface", "Port-Channel10").is_ok());
        assert!(validate_interface_name("interface", "Loopback0").is_ok());
        assert!(validate_interface_name("interface", "").is_err());
        assert!(validate_interface_name("interface", "1Eth").is_err());
        assert!(validate_interface_name("interface", "Eth 1").is_err());
    }

    #[test]
    fn test_vlan_id_range() {
        assert!(vlan_id_in_range(&AttrValue::Int(1)).is_ok());
        assert!(vlan_id_in_range(&AttrValue::Int(4094)).is_ok());
        assert!(vlan_id_in_range(&AttrValue::Int(0)).is_err());
        assert!(vlan_id_in_range(&AttrValue::Int(4095)).is_err());
        assert!(vlan_id_in_range(&AttrValue::Str("10".into())).is_err());
    }
}
