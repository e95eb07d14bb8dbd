//! Physical and virtual interfaces.
//!
//! The canonical `enable` attribute inverts the device-level `shutdown`
//! flag. Physical and management-class members (reserved name prefixes)
//! are permanent: they can never be created or deleted, only reconfigured
//! or reset to defaults.

use reconcile::{AttrDef, AttrValue, Error, RawState, ResourceInstance, ResourceKind, Result, ValueType};
use serde_json::Value;

/// Reserved prefixes for members that physically exist on the chassis.
const PERMANENT_PREFIXES: &[&str] = &["Ethernet", "Management", "Ma"];

fn invert_bool(value: &AttrValue) -> AttrValue {
    match value {
        AttrValue::Bool(b) => AttrValue::Bool(!b),
        other => other.clone(),
    }
}

static SCHEMA: &[AttrDef] = &[
    AttrDef::new("description", ValueType::Str),
    AttrDef::new("enable", ValueType::Bool)
        .with_device_field("shutdown")
        .with_encode(invert_bool),
    AttrDef::new("sflow", ValueType::Bool),
];

pub struct InterfaceKind;

impl ResourceKind for InterfaceKind {
    fn name(&self) -> &'static str {
        "interface"
    }

    fn schema(&self) -> &'static [AttrDef] {
        SCHEMA
    }

    fn validate_identity(&self, identity: &str) -> Result<()> {
        super::validate_interface_name(self.name(), identity)
    }

    fn is_permanent(&self, identity: &str) -> bool {
        PERMANENT_PREFIXES
            .iter()
            .any(|prefix| identity.starts_with(prefix))
    }

    fn normalize(&self, raw: Option<&RawState>, identity: &str) -> Result<ResourceInstance> {
        let Some(raw) = raw else {
            return Ok(ResourceInstance::absent(identity));
        };
        let object = raw
            .as_object()
            .ok_or_else(|| Error::malformed(identity, "expected interface object"))?;
        let description = object
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("");
        let shutdown = object
            .get("shutdown")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let sflow = object.get("sflow").and_then(Value::as_bool).unwrap_or(true);
        Ok(ResourceInstance::present(identity)
            .with_attr("description", Some(description.into()))
            .with_attr("enable", Some((!shutdown).into()))
            .with_attr("sflow", Some(sflow.into())))
    }
}
