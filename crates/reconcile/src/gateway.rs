//! Device gateway abstraction and an in-memory reference implementation.
//!
//! The gateway is the engine's only I/O boundary. Real transports
//! (HTTP-API sessions, CLI scrapers) live outside this crate; the engine
//! treats whatever it is handed as exclusively owned for the duration of
//! one reconciliation call.

use crate::error::{Error, Result};
use crate::types::{AttrValue, GatewayOp};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

/// Raw per-resource state as the device reports it, before normalization.
pub type RawState = Value;

/// Remote command API for one device.
///
/// All methods are blocking and issued strictly sequentially by the
/// executor. Implementations use interior mutability so a shared reference
/// can be threaded through every call.
pub trait DeviceGateway: Send + Sync {
    /// Read one resource's raw state. Side-effect-free; `None` means the
    /// resource does not exist.
    fn fetch(&self, kind: &str, identity: &str) -> Result<Option<RawState>>;

    /// Create an empty/default resource. Not assumed idempotent; callers
    /// must check presence first.
    fn create(&self, kind: &str, identity: &str) -> Result<RawState>;

    /// Remove a resource.
    fn delete(&self, kind: &str, identity: &str) -> Result<()>;

    /// Write one device-level field, or reset it to the device default when
    /// `reset` is true (in which case `value` is `None`).
    fn set_attribute(
        &self,
        kind: &str,
        identity: &str,
        field: &str,
        value: Option<&AttrValue>,
        reset: bool,
    ) -> Result<()>;
}

/// One call a [`MemoryGateway`] received, for assertions on mutation
/// ordering and dry-run behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Fetch {
        kind: String,
        identity: String,
    },
    Create {
        kind: String,
        identity: String,
    },
    Delete {
        kind: String,
        identity: String,
    },
    Set {
        kind: String,
        identity: String,
        field: String,
        value: Option<AttrValue>,
        reset: bool,
    },
}

impl GatewayCall {
    /// Whether this call mutates device state.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Fetch { .. })
    }
}

#[derive(Default)]
struct MemoryState {
    /// kind -> identity -> raw object
    tables: BTreeMap<String, BTreeMap<String, Map<String, Value>>>,
    calls: Vec<GatewayCall>,
    rejected_fields: BTreeSet<String>,
    unavailable: bool,
}

/// In-memory reference gateway.
///
/// Backs the engine's tests and any caller that wants to exercise a plan
/// without a device: it keeps per-kind resource tables, records every call
/// it receives, and can be scripted to reject specific fields or to become
/// unreachable.
#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate one resource with raw state. Non-object values seed an
    /// empty resource.
    pub fn seed(&self, kind: &str, identity: &str, raw: RawState) {
        let object = match raw {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let mut state = self.state.lock().unwrap();
        state
            .tables
            .entry(kind.to_string())
            .or_default()
            .insert(identity.to_string(), object);
    }

    /// Script the device to reject every write to `field`.
    pub fn reject_field(&self, field: &str) {
        self.state
            .lock()
            .unwrap()
            .rejected_fields
            .insert(field.to_string());
    }

    /// Script the device to fail every call with `Unavailable`.
    pub fn set_unavailable(&self) {
        self.state.lock().unwrap().unavailable = true;
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of mutating calls received so far.
    pub fn mutation_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| call.is_mutation())
            .count()
    }

    fn check_available(state: &MemoryState) -> Result<()> {
        if state.unavailable {
            return Err(Error::unavailable("simulated connection failure"));
        }
        Ok(())
    }
}

impl DeviceGateway for MemoryGateway {
    fn fetch(&self, kind: &str, identity: &str) -> Result<Option<RawState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GatewayCall::Fetch {
            kind: kind.to_string(),
            identity: identity.to_string(),
        });
        Self::check_available(&state)?;
        Ok(state
            .tables
            .get(kind)
            .and_then(|table| table.get(identity))
            .map(|object| Value::Object(object.clone())))
    }

    fn create(&self, kind: &str, identity: &str) -> Result<RawState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GatewayCall::Create {
            kind: kind.to_string(),
            identity: identity.to_string(),
        });
        Self::check_available(&state)?;
        let table = state.tables.entry(kind.to_string()).or_default();
        if table.contains_key(identity) {
            return Err(Error::rejected(
                GatewayOp::Create,
                identity,
                "already exists",
            ));
        }
        table.insert(identity.to_string(), Map::new());
        Ok(Value::Object(Map::new()))
    }

    fn delete(&self, kind: &str, identity: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GatewayCall::Delete {
            kind: kind.to_string(),
            identity: identity.to_string(),
        });
        Self::check_available(&state)?;
        let removed = state
            .tables
            .get_mut(kind)
            .and_then(|table| table.remove(identity));
        if removed.is_none() {
            return Err(Error::rejected(GatewayOp::Delete, identity, "not found"));
        }
        Ok(())
    }

    fn set_attribute(
        &self,
        kind: &str,
        identity: &str,
        field: &str,
        value: Option<&AttrValue>,
        reset: bool,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GatewayCall::Set {
            kind: kind.to_string(),
            identity: identity.to_string(),
            field: field.to_string(),
            value: value.cloned(),
            reset,
        });
        Self::check_available(&state)?;
        let operation = if reset { GatewayOp::Reset } else { GatewayOp::Set };
        if state.rejected_fields.contains(field) {
            return Err(Error::rejected(
                operation,
                identity,
                format!("field '{field}' refused by device"),
            ));
        }
        let object = state
            .tables
            .get_mut(kind)
            .and_then(|table| table.get_mut(identity))
            .ok_or_else(|| Error::rejected(operation, identity, "not found"))?;
        if reset {
            // Device default = field absent; normalizers fill defaults.
            object.remove(field);
        } else if let Some(value) = value {
            object.insert(field.to_string(), value.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fetch_absent_and_seeded() {
        let gateway = MemoryGateway::new();
        assert!(gateway.fetch("vlan", "10").unwrap().is_none());

        gateway.seed("vlan", "10", json!({"name": "prod"}));
        let raw = gateway.fetch("vlan", "10").unwrap().unwrap();
        assert_eq!(raw["name"], "prod");
    }

    #[test]
    fn test_create_is_not_idempotent() {
        let gateway = MemoryGateway::new();
        gateway.create("vlan", "10").unwrap();
        let err = gateway.create("vlan", "10").unwrap_err();
        assert!(err.is_rejection());
    }

    #[test]
    fn test_set_and_reset_round_trip() {
        let gateway = MemoryGateway::new();
        gateway.create("vlan", "10").unwrap();
        gateway
            .set_attribute("vlan", "10", "name", Some(&"prod".into()), false)
            .unwrap();
        let raw = gateway.fetch("vlan", "10").unwrap().unwrap();
        assert_eq!(raw["name"], "prod");

        gateway
            .set_attribute("vlan", "10", "name", None, true)
            .unwrap();
        let raw = gateway.fetch("vlan", "10").unwrap().unwrap();
        assert!(raw.get("name").is_none());
    }

    #[test]
    fn test_delete_missing_is_rejected() {
        let gateway = MemoryGateway::new();
        assert!(gateway.delete("vlan", "10").unwrap_err().is_rejection());
    }

    #[test]
    fn test_unavailable_is_fatal() {
        let gateway = MemoryGateway::new();
        gateway.set_unavailable();
        let err = gateway.fetch("vlan", "10").unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_mutation_count_ignores_fetch() {
        let gateway = MemoryGateway::new();
        gateway.fetch("vlan", "10").unwrap();
        gateway.create("vlan", "10").unwrap();
        gateway
            .set_attribute("vlan", "10", "name", Some(&"prod".into()), false)
            .unwrap();
        assert_eq!(gateway.mutation_count(), 2);
        assert_eq!(gateway.calls().len(), 3);
    }
}
