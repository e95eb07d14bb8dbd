//! Shared test fixtures: a small synthetic resource kind exercising every
//! schema feature (ordering, device-field renames, encode transforms,
//! validators, permanence).

use crate::error::{Error, Result};
use crate::gateway::RawState;
use crate::schema::{AttrDef, ResourceKind};
use crate::types::{AttrValue, ResourceInstance, ValueType};
use serde_json::Value;

fn check_mode(value: &AttrValue) -> std::result::Result<(), String> {
    match value.as_str() {
        Some("auto" | "manual") => Ok(()),
        _ => Err("must be one of: auto, manual".to_string()),
    }
}

fn check_speed(value: &AttrValue) -> std::result::Result<(), String> {
    match value.as_int() {
        Some(10..=400_000) => Ok(()),
        _ => Err("must be in 10-400000".to_string()),
    }
}

fn invert_bool(value: &AttrValue) -> AttrValue {
    match value {
        AttrValue::Bool(b) => AttrValue::Bool(!b),
        other => other.clone(),
    }
}

// `mode` first: the diff must apply it before `speed`.
static SCHEMA: &[AttrDef] = &[
    AttrDef::new("mode", ValueType::Str).with_validate(check_mode),
    AttrDef::new("speed", ValueType::Int)
        .with_validate(check_speed)
        .required(),
    AttrDef::new("enable", ValueType::Bool)
        .with_device_field("shutdown")
        .with_encode(invert_bool),
];

/// Synthetic "port" kind; identities starting with `Fixed` are permanent.
pub(crate) struct PortKind;

impl ResourceKind for PortKind {
    fn name(&self) -> &'static str {
        "port"
    }

    fn schema(&self) -> &'static [AttrDef] {
        SCHEMA
    }

    fn validate_identity(&self, identity: &str) -> Result<()> {
        if identity.is_empty() {
            return Err(Error::schema("port identity must not be empty"));
        }
        Ok(())
    }

    fn is_permanent(&self, identity: &str) -> bool {
        identity.starts_with("Fixed")
    }

    fn normalize(&self, raw: Option<&RawState>, identity: &str) -> Result<ResourceInstance> {
        let Some(raw) = raw else {
            return Ok(ResourceInstance::absent(identity));
        };
        let object = raw
            .as_object()
            .ok_or_else(|| Error::malformed(identity, "expected object"))?;
        let mode = object
            .get("mode")
            .and_then(Value::as_str)
            .unwrap_or("auto");
        let speed = object.get("speed").and_then(Value::as_i64).unwrap_or(1000);
        let shutdown = object
            .get("shutdown")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Ok(ResourceInstance::present(identity)
            .with_attr("mode", Some(mode.into()))
            .with_attr("speed", Some(speed.into()))
            .with_attr("enable", Some((!shutdown).into())))
    }
}
