//! Canonical data model for resource reconciliation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Expected type of an attribute value, declared per attribute in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Boolean flag
    Bool,
    /// Signed integer
    Int,
    /// Free-form string
    Str,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Str => write!(f, "str"),
        }
    }
}

/// A concrete attribute value.
///
/// Serialized untagged, so JSON/TOML booleans, integers and strings map
/// directly onto the matching variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl AttrValue {
    /// The [`ValueType`] this value belongs to.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Str(_) => ValueType::Str,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Convert a raw JSON scalar into an [`AttrValue`], if it is one.
    ///
    /// Objects, arrays, floats and nulls return `None`; normalizers that
    /// need those shapes handle them explicitly.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n.as_i64().map(Self::Int),
            serde_json::Value::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&AttrValue> for serde_json::Value {
    fn from(value: &AttrValue) -> Self {
        match value {
            AttrValue::Bool(b) => Self::Bool(*b),
            AttrValue::Int(i) => Self::Number((*i).into()),
            AttrValue::Str(s) => Self::String(s.clone()),
        }
    }
}

/// Whether a resource exists on the device (or should, for a desired
/// instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Present,
    Absent,
}

/// Attribute map of an instance: name to value, where `None` is the NULL
/// value ("no preference" in a desired instance).
pub type AttrMap = BTreeMap<String, Option<AttrValue>>;

/// Canonical snapshot of one resource, observed or desired.
///
/// `identity` uniquely identifies the resource within its kind (interface
/// name, VLAN id) and is never empty. `attributes` only carries names
/// declared in the kind's schema; the planner rejects anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInstance {
    pub identity: String,
    pub presence: Presence,
    #[serde(default)]
    pub attributes: AttrMap,
}

impl ResourceInstance {
    /// A present instance with no attributes yet.
    pub fn present(identity: &str) -> Self {
        Self {
            identity: identity.to_string(),
            presence: Presence::Present,
            attributes: AttrMap::new(),
        }
    }

    /// An absent instance (the resource does not exist on the device).
    pub fn absent(identity: &str) -> Self {
        Self {
            identity: identity.to_string(),
            presence: Presence::Absent,
            attributes: AttrMap::new(),
        }
    }

    /// Builder-style attribute insertion.
    pub fn with_attr(mut self, name: &str, value: Option<AttrValue>) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    pub fn is_present(&self) -> bool {
        self.presence == Presence::Present
    }

    /// Look up a concrete attribute value, flattening NULL to `None`.
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name).and_then(Option::as_ref)
    }
}

/// Options controlling one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReconcileOptions {
    /// If true, a NULL desired value means "reset this attribute to the
    /// device default"; if false it means "leave the attribute untouched".
    pub null_as_default: bool,
    /// Compute and report the plan's effect without issuing mutating
    /// gateway calls.
    pub dry_run: bool,
}

/// Which gateway operation a recorded failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayOp {
    Create,
    Delete,
    Set,
    Reset,
}

impl fmt::Display for GatewayOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Delete => write!(f, "delete"),
            Self::Set => write!(f, "set"),
            Self::Reset => write!(f, "reset"),
        }
    }
}

/// A plan action the device rejected.
///
/// Rejections do not abort execution; they are collected so callers can
/// detect partial application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub operation: GatewayOp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    pub message: String,
}

/// Outcome of one reconciliation pass. Immutable after construction.
///
/// `changed_attributes` records every attribute the engine attempted
/// (NULL value = reset to default); `failures` records the subset the
/// device rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub changed: bool,
    pub created: bool,
    pub removed: bool,
    pub changed_attributes: AttrMap,
    pub failures: Vec<Failure>,
    pub final_instance: ResourceInstance,
}

impl ReconcileReport {
    /// True when no gateway call was rejected.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// True when the pass had nothing to do.
    pub fn is_noop(&self) -> bool {
        !self.changed && !self.created && !self.removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_value_untagged_serde() {
        let v: AttrValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, AttrValue::Bool(true));
        let v: AttrValue = serde_json::from_str("42").unwrap();
        assert_eq!(v, AttrValue::Int(42));
        let v: AttrValue = serde_json::from_str("\"trunk\"").unwrap();
        assert_eq!(v, AttrValue::Str("trunk".to_string()));
    }

    #[test]
    fn test_attr_value_from_json() {
        use serde_json::json;
        assert_eq!(AttrValue::from_json(&json!(false)), Some(AttrValue::Bool(false)));
        assert_eq!(AttrValue::from_json(&json!(9214)), Some(AttrValue::Int(9214)));
        assert_eq!(AttrValue::from_json(&json!(null)), None);
        assert_eq!(AttrValue::from_json(&json!([1, 2])), None);
    }

    #[test]
    fn test_instance_attr_flattens_null() {
        let inst = ResourceInstance::present("Eth1")
            .with_attr("description", None)
            .with_attr("enable", Some(true.into()));
        assert_eq!(inst.attr("description"), None);
        assert_eq!(inst.attr("enable"), Some(&AttrValue::Bool(true)));
        assert_eq!(inst.attr("missing"), None);
    }

    #[test]
    fn test_report_success() {
        let report = ReconcileReport {
            changed: false,
            created: false,
            removed: false,
            changed_attributes: AttrMap::new(),
            failures: Vec::new(),
            final_instance: ResourceInstance::absent("Vlan10"),
        };
        assert!(report.is_success());
        assert!(report.is_noop());
    }
}
