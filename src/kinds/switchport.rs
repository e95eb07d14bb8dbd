//! Layer-2 switchport settings, keyed by interface name.
//!
//! `mode` is first in the schema on purpose: devices reject a VLAN
//! assignment until the port is in the matching mode, and the engine
//! applies attributes in schema order.

use reconcile::{AttrDef, AttrValue, Error, RawState, ResourceInstance, ResourceKind, Result, ValueType};
use serde_json::Value;

fn check_mode(value: &AttrValue) -> std::result::Result<(), String> {
    match value.as_str() {
        Some("access" | "trunk") => Ok(()),
        _ => Err("must be one of: access, trunk".to_string()),
    }
}

fn check_vlan_list(value: &AttrValue) -> std::result::Result<(), String> {
    let Some(list) = value.as_str() else {
        return Err("must be a VLAN range list like '1,10-20'".to_string());
    };
    if list.is_empty()
        || !list
            .chars()
            .all(|c| c.is_ascii_digit() || c == ',' || c == '-')
    {
        return Err("must be a VLAN range list like '1,10-20'".to_string());
    }
    Ok(())
}

static SCHEMA: &[AttrDef] = &[
    AttrDef::new("mode", ValueType::Str).with_validate(check_mode),
    AttrDef::new("access_vlan", ValueType::Int).with_validate(super::vlan_id_in_range),
    AttrDef::new("trunk_native_vlan", ValueType::Int).with_validate(super::vlan_id_in_range),
    AttrDef::new("trunk_allowed_vlans", ValueType::Str).with_validate(check_vlan_list),
];

pub struct SwitchportKind;

impl ResourceKind for SwitchportKind {
    fn name(&self) -> &'static str {
        "switchport"
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
            .ok_or_else(|| Error::malformed(identity, "expected switchport object"))?;
        let mode = object.get("mode").and_then(Value::as_str).unwrap_or("access");
        let access_vlan = object.get("access_vlan").and_then(Value::as_i64).unwrap_or(1);
        let native_vlan = object
            .get("trunk_native_vlan")
            .and_then(Value::as_i64)
            .unwrap_or(1);
        let allowed = object
            .get("trunk_allowed_vlans")
            .and_then(Value::as_str)
            .unwrap_or("1-4094");
        Ok(ResourceInstance::present(identity)
            .with_attr("mode", Some(mode.into()))
            .with_attr("access_vlan", Some(access_vlan.into()))
            .with_attr("trunk_native_vlan", Some(native_vlan.into()))
            .with_attr("trunk_allowed_vlans", Some(allowed.into())))
    }
}
