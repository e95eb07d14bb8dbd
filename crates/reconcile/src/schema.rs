//! Resource schemas and the kind plug-in trait.
//!
//! A [`ResourceKind`] bundles everything the engine needs to reconcile one
//! kind of resource: a static attribute schema (declared in application
//! order), identity validation, a permanence predicate, and the normalizer
//! that maps raw device state into the canonical instance record. The
//! engine's planner and executor only ever talk to this trait.

use crate::error::{Error, Result};
use crate::gateway::RawState;
use crate::types::{AttrValue, ResourceInstance, ValueType};

/// Maps a canonical attribute value to the device-level value the gateway
/// receives (e.g. canonical `enable: true` to device `shutdown: false`).
pub type EncodeFn = fn(&AttrValue) -> AttrValue;

/// Kind-specific validation predicate for a concrete desired value.
/// Returns a human-readable reason on rejection.
pub type ValidateFn = fn(&AttrValue) -> std::result::Result<(), String>;

/// Static definition of one schema attribute.
///
/// Schemas are declared as `static` slices; the slice order is the order
/// attributes are applied in (a device may reject `access_vlan` until
/// `mode` is set, so `mode` comes first in the switchport schema).
#[derive(Clone, Copy)]
pub struct AttrDef {
    /// Canonical attribute name.
    pub name: &'static str,
    /// Expected value type; a desired value of another type is a schema
    /// violation.
    pub ty: ValueType,
    /// Whether NULL is a legal "no preference" input for this attribute.
    pub nullable: bool,
    /// Field name the gateway writes. Defaults to the canonical name.
    pub device_field: &'static str,
    /// Optional canonical-to-device value transform.
    pub encode: Option<EncodeFn>,
    /// Optional range/format check for concrete desired values.
    pub validate: Option<ValidateFn>,
}

impl AttrDef {
    pub const fn new(name: &'static str, ty: ValueType) -> Self {
        Self {
            name,
            ty,
            nullable: true,
            device_field: name,
            encode: None,
            validate: None,
        }
    }

    /// Rename the device-level field this attribute writes.
    pub const fn with_device_field(mut self, field: &'static str) -> Self {
        self.device_field = field;
        self
    }

    pub const fn with_encode(mut self, encode: EncodeFn) -> Self {
        self.encode = Some(encode);
        self
    }

    pub const fn with_validate(mut self, validate: ValidateFn) -> Self {
        self.validate = Some(validate);
        self
    }

    /// Mark NULL as illegal for this attribute.
    pub const fn required(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// The device-level value for a canonical value.
    pub fn encoded(&self, value: &AttrValue) -> AttrValue {
        match self.encode {
            Some(encode) => encode(value),
            None => value.clone(),
        }
    }

    /// Type-check and validate a concrete desired value.
    pub fn check(&self, value: &AttrValue) -> Result<()> {
        if value.value_type() != self.ty {
            return Err(Error::schema(format!(
                "attribute '{}' expects {}, got {}",
                self.name,
                self.ty,
                value.value_type()
            )));
        }
        if let Some(validate) = self.validate {
            validate(value)
                .map_err(|reason| Error::schema(format!("attribute '{}': {reason}", self.name)))?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for AttrDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttrDef")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("nullable", &self.nullable)
            .field("device_field", &self.device_field)
            .field("encode", &self.encode.is_some())
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

/// One manageable resource kind.
///
/// Implementations are unit structs holding no state; all kind knowledge
/// lives in the schema and these methods.
pub trait ResourceKind: Send + Sync {
    /// Kind name as used on the gateway wire (e.g. `"vlan"`).
    fn name(&self) -> &'static str;

    /// Attribute schema in application order.
    fn schema(&self) -> &'static [AttrDef];

    /// Validate an identity string for this kind (interface name syntax,
    /// VLAN id range).
    fn validate_identity(&self, identity: &str) -> Result<()>;

    /// Whether this member is physically fixed and can never be created or
    /// deleted, only reconfigured or reset to defaults.
    fn is_permanent(&self, _identity: &str) -> bool {
        false
    }

    /// Map raw device state into the canonical instance record.
    ///
    /// `None` raw state normalizes to an absent instance. Field renames and
    /// value transforms (inverted booleans, list joining) are confined
    /// here; normalizers also fill device defaults for fields missing from
    /// the raw state, so a freshly created or fully reset resource
    /// normalizes to its documented defaults.
    fn normalize(&self, raw: Option<&RawState>, identity: &str) -> Result<ResourceInstance>;

    /// Look up an attribute definition by canonical name.
    fn attr(&self, name: &str) -> Option<&'static AttrDef> {
        self.schema().iter().find(|def| def.name == name)
    }
}
