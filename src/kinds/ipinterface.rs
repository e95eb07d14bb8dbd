//! IPv4 settings of a routed interface, keyed by interface name.
//!
//! Devices report the address either flat (`"address": "10.0.0.1/24"`) or
//! nested under `interfaceAddress.primaryIp`; both shapes normalize to the
//! canonical `a.b.c.d/len` string.

use reconcile::{AttrDef, AttrValue, Error, RawState, ResourceInstance, ResourceKind, Result, ValueType};
use serde_json::Value;
use std::net::Ipv4Addr;

const DEFAULT_MTU: i64 = 1500;

fn check_address(value: &AttrValue) -> std::result::Result<(), String> {
    let Some(address) = value.as_str() else {
        return Err("must be an address in a.b.c.d/len form".to_string());
    };
    let valid = address.split_once('/').is_some_and(|(ip, len)| {
        ip.parse::<Ipv4Addr>().is_ok() && matches!(len.parse::<u8>(), Ok(1..=32))
    });
    if valid {
        Ok(())
    } else {
        Err("must be an address in a.b.c.d/len form".to_string())
    }
}

fn check_mtu(value: &AttrValue) -> std::result::Result<(), String> {
    match value.as_int() {
        Some(68..=9214) => Ok(()),
        _ => Err("MTU must be in 68-9214".to_string()),
    }
}

static SCHEMA: &[AttrDef] = &[
    AttrDef::new("address", ValueType::Str).with_validate(check_address),
    AttrDef::new("mtu", ValueType::Int).with_validate(check_mtu),
];

pub struct IpInterfaceKind;

fn nested_address(object: &serde_json::Map<String, Value>) -> Option<String> {
    let primary = object.get("interfaceAddress")?.get("primaryIp")?;
    let ip = primary.get("address")?.as_str()?;
    let mask_len = primary.get("maskLen")?.as_i64()?;
    Some(format!("{ip}/{mask_len}"))
}

impl ResourceKind for IpInterfaceKind {
    fn name(&self) -> &'static str {
        "ipinterface"
    }

    fn schema(&self) -> &'static [AttrDef] {
        SCHEMA
    }

    fn validate_identity(&self, identity: &str) -> Result<()> {
        super::validate_interface_name(self.name(), identity)
    }

    fn normalize(&self, raw: Option<&RawState>, identity: &str) -> Result<ResourceInstance> {
        let Some(raw) = raw else {
            return Ok(ResourceInstance::absent(identity));
        };
        let object = raw
            .as_object()
            .ok_or_else(|| Error::malformed(identity, "expected ip interface object"))?;
        let address = object
            .get("address")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| nested_address(object))
            .unwrap_or_default();
        let mtu = object.get("mtu").and_then(Value::as_i64).unwrap_or(DEFAULT_MTU);
        Ok(ResourceInstance::present(identity)
            .with_attr("address", Some(address.into()))
            .with_attr("mtu", Some(mtu.into())))
    }
}
