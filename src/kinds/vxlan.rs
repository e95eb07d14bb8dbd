//! VXLAN tunnel interfaces (`Vxlan1`).

use reconcile::{AttrDef, AttrValue, Error, RawState, ResourceInstance, ResourceKind, Result, ValueType};
use regex::Regex;
use serde_json::Value;
use std::net::Ipv4Addr;
use std::sync::LazyLock;

/// Flood/learning traffic defaults to this UDP port on most devices.
const DEFAULT_UDP_PORT: i64 = 4789;

static VXLAN_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Vxlan\d+$").expect("valid regex"));

fn check_multicast_group(value: &AttrValue) -> std::result::Result<(), String> {
    let Some(group) = value.as_str() else {
        return Err("must be an IPv4 multicast group address".to_string());
    };
    // Empty clears the group.
    if group.is_empty() {
        return Ok(());
    }
    match group.parse::<Ipv4Addr>() {
        Ok(addr) if addr.is_multicast() => Ok(()),
        _ => Err("must be an IPv4 multicast group address".to_string()),
    }
}

fn check_udp_port(value: &AttrValue) -> std::result::Result<(), String> {
    match value.as_int() {
        Some(1024..=65535) => Ok(()),
        _ => Err("UDP port must be in 1024-65535".to_string()),
    }
}

static SCHEMA: &[AttrDef] = &[
    AttrDef::new("source_interface", ValueType::Str),
    AttrDef::new("multicast_group", ValueType::Str).with_validate(check_multicast_group),
    AttrDef::new("udp_port", ValueType::Int).with_validate(check_udp_port),
];

pub struct VxlanKind;

impl ResourceKind for VxlanKind {
    fn name(&self) -> &'static str {
        "vxlan"
    }

    fn schema(&self) -> &'static [AttrDef] {
        SCHEMA
    }

    fn validate_identity(&self, identity: &str) -> Result<()> {
        if VXLAN_NAME.is_match(identity) {
            Ok(())
        } else {
            Err(Error::schema(format!(
                "'{identity}' is not a Vxlan interface name"
            )))
        }
    }

    fn normalize(&self, raw: Option<&RawState>, identity: &str) -> Result<ResourceInstance> {
        let Some(raw) = raw else {
            return Ok(ResourceInstance::absent(identity));
        };
        let object = raw
            .as_object()
            .ok_or_else(|| Error::malformed(identity, "expected vxlan object"))?;
        let source_interface = object
            .get("source_interface")
            .and_then(Value::as_str)
            .unwrap_or("");
        let multicast_group = object
            .get("multicast_group")
            .and_then(Value::as_str)
            .unwrap_or("");
        let udp_port = object
            .get("udp_port")
            .and_then(Value::as_i64)
            .unwrap_or(DEFAULT_UDP_PORT);
        Ok(ResourceInstance::present(identity)
            .with_attr("source_interface", Some(source_interface.into()))
            .with_attr("multicast_group", Some(multicast_group.into()))
            .with_attr("udp_port", Some(udp_port.into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::{MemoryGateway, ReconcileOptions, reconcile};
    use serde_json::json;

    #[test]
    fn test_identity_syntax() {
        let kind = VxlanKind;
        assert!(kind.validate_identity("Vxlan1").is_ok());
        assert!(kind.validate_identity("Vxlan10").is_ok());
        assert!(kind.validate_identity("vxlan1").is_err());
        assert!(kind.validate_identity("Ethernet1").is_err());
    }

    #[test]
    fn test_multicast_group_validation() {
        let def = VxlanKind.attr("multicast_group").unwrap();
        assert!(def.check(&"239.10.10.10".into()).is_ok());
        assert!(def.check(&"".into()).is_ok());
        assert!(def.check(&"10.0.0.1".into()).is_err());
        assert!(def.check(&"not-an-ip".into()).is_err());
    }

    #[test]
    fn test_udp_port_validation() {
        let def = VxlanKind.attr("udp_port").unwrap();
        assert!(def.check(&AttrValue::Int(4789)).is_ok());
        assert!(def.check(&AttrValue::Int(80)).is_err());
        assert!(def.check(&AttrValue::Int(70000)).is_err());
    }

    #[test]
    fn test_normalize_defaults_udp_port() {
        let inst = VxlanKind.normalize(Some(&json!({})), "Vxlan1").unwrap();
        assert_eq!(inst.attr("udp_port"), Some(&AttrValue::Int(4789)));
        assert_eq!(inst.attr("source_interface"), Some(&AttrValue::Str(String::new())));
    }

    #[test]
    fn test_create_and_configure_tunnel() {
        let gateway = MemoryGateway::new();
        let desired = ResourceInstance::present("Vxlan1")
            .with_attr("source_interface", Some("Loopback0".into()))
            .with_attr("multicast_group", Some("239.10.10.10".into()));
        let report = reconcile(&VxlanKind, &gateway, &desired, &ReconcileOptions::default()).unwrap();
        assert!(report.created);
        assert_eq!(
            report.final_instance.attr("source_interface"),
            Some(&AttrValue::Str("Loopback0".into()))
        );
        assert_eq!(report.final_instance.attr("udp_port"), Some(&AttrValue::Int(4789)));
    }
}
