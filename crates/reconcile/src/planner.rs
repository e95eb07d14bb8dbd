//! Pure reconciliation planner.
//!
//! [`plan`] is the decision core of the engine: given a desired and an
//! observed instance it returns the ordered list of actions that converges
//! the device, without performing any I/O. Determinism matters here —
//! candidate changes are emitted in schema order, never in diff-discovery
//! order.

use crate::error::{Error, Result};
use crate::schema::ResourceKind;
use crate::types::{AttrValue, Presence, ReconcileOptions, ResourceInstance};
use serde::Serialize;

/// One step of a reconciliation plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Create the resource (empty/default; attributes follow as `Set`s).
    Create,
    /// Apply a concrete canonical value to one attribute.
    Set { name: String, value: AttrValue },
    /// Reset one attribute to its device default.
    Reset { name: String },
    /// Remove the resource.
    Delete,
    /// Reset every attribute to its device default, substituted for
    /// `Delete` on permanent resources.
    ResetAll { names: Vec<String> },
}

/// Ordered action list for one reconciliation pass.
///
/// Contains at most one terminal action (`Create`, `Delete` or `ResetAll`)
/// plus zero or more `Set`/`Reset` actions; `Set`/`Reset` never precede the
/// `Create` they depend on.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Plan {
    pub actions: Vec<Action>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Whether this plan creates the resource. Attribute changes applied
    /// right after a creation are folded into `created` in the report, not
    /// counted as changes.
    pub fn creates(&self) -> bool {
        self.actions.contains(&Action::Create)
    }
}

/// Validate a desired instance against its kind's schema.
///
/// Runs before any gateway call: unknown attribute names, values of the
/// wrong type, values failing the attribute's validator, NULL for a
/// non-nullable attribute, and malformed identities are all rejected here.
pub fn validate_desired(kind: &dyn ResourceKind, desired: &ResourceInstance) -> Result<()> {
    kind.validate_identity(&desired.identity)?;
    for (name, value) in &desired.attributes {
        let def = kind.attr(name).ok_or_else(|| {
            Error::schema(format!(
                "unknown attribute '{name}' for kind '{}'",
                kind.name()
            ))
        })?;
        match value {
            Some(value) => def.check(value)?,
            None if def.nullable => {}
            None => {
                return Err(Error::schema(format!(
                    "attribute '{name}' requires a value"
                )));
            }
        }
    }
    Ok(())
}

/// Decide what must change to converge `observed` onto `desired`.
///
/// Pure and deterministic. The attribute diff is a pair-set difference: a
/// (name, value) pair already present verbatim in the observed instance
/// emits nothing. A NULL desired value is never equal to a concrete
/// observed value, so with `null_as_default` off such attributes are left
/// untouched, and with it on they reset to the device default.
pub fn plan(
    kind: &dyn ResourceKind,
    desired: &ResourceInstance,
    observed: &ResourceInstance,
    options: &ReconcileOptions,
) -> Result<Plan> {
    validate_desired(kind, desired)?;

    let mut actions = Vec::new();
    match desired.presence {
        Presence::Present => {
            let creating = observed.presence == Presence::Absent;
            if creating && !kind.is_permanent(&desired.identity) {
                actions.push(Action::Create);
            }
            // Permanent members always exist on a real device; if one shows
            // up absent the diff simply runs against empty attributes.
            for def in kind.schema() {
                let Some(desired_value) = desired.attributes.get(def.name) else {
                    continue;
                };
                let observed_value = if creating {
                    &None
                } else {
                    observed.attributes.get(def.name).unwrap_or(&None)
                };
                if desired_value == observed_value {
                    continue;
                }
                match desired_value {
                    Some(value) => actions.push(Action::Set {
                        name: def.name.to_string(),
                        value: value.clone(),
                    }),
                    None if options.null_as_default => actions.push(Action::Reset {
                        name: def.name.to_string(),
                    }),
                    None => {}
                }
            }
        }
        Presence::Absent => match observed.presence {
            Presence::Absent => {}
            Presence::Present if kind.is_permanent(&desired.identity) => {
                actions.push(Action::ResetAll {
                    names: kind
                        .schema()
                        .iter()
                        .map(|def| def.name.to_string())
                        .collect(),
                });
            }
            Presence::Present => actions.push(Action::Delete),
        },
    }
    Ok(Plan { actions })
}
