//! Building the desired instance from CLI flags or a spec file.
//!
//! Flag values are parsed against the schema's declared attribute types,
//! so `--set enable=true` becomes a boolean and `--set access_vlan=100`
//! an integer. Spec files are TOML or JSON by extension; `unset` lists
//! attributes whose desired value is NULL (reset to default when
//! `--null-as-default` is on, otherwise left untouched).

use anyhow::{Context, Result, bail};
use reconcile::{AttrValue, ResourceInstance, ResourceKind, ValueType};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Desired-state spec file.
///
/// ```toml
/// kind = "vlan"
/// id = "10"
///
/// [attributes]
/// name = "prod"
/// enable = true
/// ```
#[derive(Debug, Deserialize)]
pub struct SpecFile {
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub absent: bool,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttrValue>,
    #[serde(default)]
    pub unset: Vec<String>,
}

impl SpecFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("could not read spec file {}", path.display()))?;
        let spec = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON spec {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("invalid TOML spec {}", path.display()))?,
        };
        Ok(spec)
    }

    /// Turn the file into a desired instance. Schema membership and value
    /// validity are the planner's job; nothing is filtered here.
    pub fn to_instance(&self) -> ResourceInstance {
        let mut instance = if self.absent {
            ResourceInstance::absent(&self.id)
        } else {
            ResourceInstance::present(&self.id)
        };
        for (name, value) in &self.attributes {
            instance
                .attributes
                .insert(name.clone(), Some(value.clone()));
        }
        for name in &self.unset {
            instance.attributes.insert(name.clone(), None);
        }
        instance
    }
}

/// Build a desired instance from `--set`/`--unset`/`--absent` flags.
pub fn from_flags(
    kind: &dyn ResourceKind,
    identity: &str,
    sets: &[String],
    unsets: &[String],
    absent: bool,
) -> Result<ResourceInstance> {
    let mut instance = if absent {
        ResourceInstance::absent(identity)
    } else {
        ResourceInstance::present(identity)
    };
    for assignment in sets {
        let (name, value) = parse_assignment(kind, assignment)?;
        instance.attributes.insert(name, Some(value));
    }
    for name in unsets {
        instance.attributes.insert(name.clone(), None);
    }
    Ok(instance)
}

/// Parse one `name=value` assignment against the schema's declared type.
fn parse_assignment(kind: &dyn ResourceKind, assignment: &str) -> Result<(String, AttrValue)> {
    let Some((name, raw)) = assignment.split_once('=') else {
        bail!("expected name=value, got '{assignment}'");
    };
    let def = kind.attr(name).with_context(|| {
        format!("unknown attribute '{name}' for kind '{}'", kind.name())
    })?;
    let value = match def.ty {
        ValueType::Bool => match raw {
            "true" | "on" | "yes" => AttrValue::Bool(true),
            "false" | "off" | "no" => AttrValue::Bool(false),
            _ => bail!("attribute '{name}' expects a boolean, got '{raw}'"),
        },
        ValueType::Int => AttrValue::Int(
            raw.parse()
                .with_context(|| format!("attribute '{name}' expects an integer, got '{raw}'"))?,
        ),
        ValueType::Str => AttrValue::Str(raw.to_string()),
    };
    Ok((name.to_string(), value))
}
