//! VLANs, keyed by VLAN id.
//!
//! The canonical `enable` attribute maps onto the device `status` field
//! (`active`/`suspend`), and `trunk_groups` is the comma-joined form of
//! the list the device reports. An unnamed VLAN defaults to the
//! zero-padded `VLANnnnn` convention.

use reconcile::{AttrDef, AttrValue, Error, RawState, ResourceInstance, ResourceKind, Result, ValueType};
use serde_json::Value;

fn check_name(value: &AttrValue) -> std::result::Result<(), String> {
    match value.as_str() {
        Some(name) if !name.is_empty() && !name.contains(char::is_whitespace) => Ok(()),
        _ => Err("VLAN name must be non-empty and contain no whitespace".to_string()),
    }
}

fn status_from_enable(value: &AttrValue) -> AttrValue {
    match value.as_bool() {
        Some(true) => AttrValue::Str("active".into()),
        Some(false) => AttrValue::Str("suspend".into()),
        None => value.clone(),
    }
}

static SCHEMA: &[AttrDef] = &[
    AttrDef::new("name", ValueType::Str).with_validate(check_name),
    AttrDef::new("enable", ValueType::Bool)
        .with_device_field("status")
        .with_encode(status_from_enable),
    AttrDef::new("trunk_groups", ValueType::Str),
];

pub struct VlanKind;

impl VlanKind {
    fn parse_id(identity: &str) -> Option<u16> {
        identity
            .parse::<u16>()
            .ok()
            .filter(|id| (1..=4094).contains(id))
    }
}

impl ResourceKind for VlanKind {
    fn name(&self) -> &'static str {
        "vlan"
    }

    fn schema(&self) -> &'static [AttrDef] {
        SCHEMA
    }

    fn validate_identity(&self, identity: &str) -> Result<()> {
        Self::parse_id(identity)
            .map(|_| ())
            .ok_or_else(|| Error::schema(format!("'{identity}' is not a VLAN id in 1-4094")))
    }

    fn normalize(&self, raw: Option<&RawState>, identity: &str) -> Result<ResourceInstance> {
        let Some(raw) = raw else {
            return Ok(ResourceInstance::absent(identity));
        };
        let object = raw
            .as_object()
            .ok_or_else(|| Error::malformed(identity, "expected vlan object"))?;
        let id = Self::parse_id(identity)
            .ok_or_else(|| Error::malformed(identity, "identity is not a VLAN id"))?;
        let name = object
            .get("name")
            .and_then(Value::as_str)
            .map_or_else(|| format!("VLAN{id:04}"), str::to_string);
        let enable = match object.get("status").and_then(Value::as_str) {
            Some("suspend") => false,
            // "active" and anything unreported count as enabled.
            _ => true,
        };
        let trunk_groups = match object.get("trunk_groups") {
            Some(Value::Array(groups)) => groups
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(","),
            Some(Value::String(groups)) => groups.clone(),
            _ => String::new(),
        };
        Ok(ResourceInstance::present(identity)
            .with_attr("name", Some(name.into()))
            .with_attr("enable", Some(enable.into()))
            .with_attr("trunk_groups", Some(trunk_groups.into())))
    }
}
