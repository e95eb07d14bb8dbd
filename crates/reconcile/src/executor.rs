//! Plan execution against a device gateway.
//!
//! The executor walks a plan strictly sequentially. In dry-run mode every
//! mutating call is skipped but its effect on the report is recorded
//! exactly as if it had succeeded. Outside dry-run, a device rejection is
//! recorded and execution continues with the remaining actions — best
//! effort, no rollback. Either way the executor finishes with one fetch to
//! report the final instance.

use crate::error::{Error, Result};
use crate::gateway::DeviceGateway;
use crate::planner::{self, Action, Plan};
use crate::schema::{AttrDef, ResourceKind};
use crate::types::{
    AttrMap, Failure, GatewayOp, ReconcileOptions, ReconcileReport, ResourceInstance,
};

/// Fetch and normalize one resource without planning anything.
pub fn observe(
    kind: &dyn ResourceKind,
    gateway: &dyn DeviceGateway,
    identity: &str,
) -> Result<ResourceInstance> {
    kind.validate_identity(identity)?;
    let raw = gateway.fetch(kind.name(), identity)?;
    kind.normalize(raw.as_ref(), identity)
}

/// Full reconciliation pass: validate, fetch, normalize, plan, execute.
///
/// Schema violations surface before any gateway call is made.
pub fn reconcile(
    kind: &dyn ResourceKind,
    gateway: &dyn DeviceGateway,
    desired: &ResourceInstance,
    options: &ReconcileOptions,
) -> Result<ReconcileReport> {
    planner::validate_desired(kind, desired)?;
    let observed = observe(kind, gateway, &desired.identity)?;
    let plan = planner::plan(kind, desired, &observed, options)?;
    execute(kind, &desired.identity, &plan, gateway, options)
}

/// Execute a plan and report what was attempted versus what succeeded.
pub fn execute(
    kind: &dyn ResourceKind,
    identity: &str,
    plan: &Plan,
    gateway: &dyn DeviceGateway,
    options: &ReconcileOptions,
) -> Result<ReconcileReport> {
    // Attribute changes pushed right after a creation are part of the
    // creation itself and are not reported as changed attributes.
    let masked = plan.creates();

    let mut created = false;
    let mut removed = false;
    let mut changed_attributes = AttrMap::new();
    let mut failures = Vec::new();

    for action in &plan.actions {
        match action {
            Action::Create => {
                created = true;
                if !options.dry_run {
                    if let Err(err) = gateway.create(kind.name(), identity) {
                        note_failure(&mut failures, err, GatewayOp::Create, None)?;
                    }
                }
            }
            Action::Set { name, value } => {
                let def = lookup(kind, name)?;
                if !masked {
                    changed_attributes.insert(name.clone(), Some(value.clone()));
                }
                if !options.dry_run {
                    let device_value = def.encoded(value);
                    if let Err(err) = gateway.set_attribute(
                        kind.name(),
                        identity,
                        def.device_field,
                        Some(&device_value),
                        false,
                    ) {
                        note_failure(&mut failures, err, GatewayOp::Set, Some(name))?;
                    }
                }
            }
            Action::Reset { name } => {
                let def = lookup(kind, name)?;
                if !masked {
                    changed_attributes.insert(name.clone(), None);
                }
                if !options.dry_run {
                    if let Err(err) =
                        gateway.set_attribute(kind.name(), identity, def.device_field, None, true)
                    {
                        note_failure(&mut failures, err, GatewayOp::Reset, Some(name))?;
                    }
                }
            }
            Action::Delete => {
                removed = true;
                if !options.dry_run {
                    if let Err(err) = gateway.delete(kind.name(), identity) {
                        note_failure(&mut failures, err, GatewayOp::Delete, None)?;
                    }
                }
            }
            Action::ResetAll { names } => {
                for name in names {
                    let def = lookup(kind, name)?;
                    changed_attributes.insert(name.clone(), None);
                    if !options.dry_run {
                        if let Err(err) = gateway.set_attribute(
                            kind.name(),
                            identity,
                            def.device_field,
                            None,
                            true,
                        ) {
                            note_failure(&mut failures, err, GatewayOp::Reset, Some(name))?;
                        }
                    }
                }
            }
        }
    }

    // One post-state fetch, always: in dry-run it returns the unchanged
    // pre-action state.
    let raw = gateway.fetch(kind.name(), identity)?;
    let final_instance = kind.normalize(raw.as_ref(), identity)?;

    Ok(ReconcileReport {
        changed: !changed_attributes.is_empty(),
        created,
        removed,
        changed_attributes,
        failures,
        final_instance,
    })
}

fn lookup(kind: &dyn ResourceKind, name: &str) -> Result<&'static AttrDef> {
    kind.attr(name).ok_or_else(|| {
        Error::schema(format!(
            "plan references unknown attribute '{name}' for kind '{}'",
            kind.name()
        ))
    })
}

/// Record a rejection and continue, or propagate anything fatal.
fn note_failure(
    failures: &mut Vec<Failure>,
    err: Error,
    operation: GatewayOp,
    attribute: Option<&str>,
) -> Result<()> {
    if err.is_fatal() {
        return Err(err);
    }
    failures.push(Failure {
        operation,
        attribute: attribute.map(str::to_string),
        message: err.to_string(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayCall, MemoryGateway};
    use crate::types::{AttrValue, Presence};
    use serde_json::json;

    fn desired_port(mode: &str, enable: bool) -> ResourceInstance {
        ResourceInstance::present("Port1")
            .with_attr("mode", Some(mode.into()))
            .with_attr("enable", Some(enable.into()))
    }

    #[test]
    fn test_create_masks_changed_attributes() {
        let gateway = MemoryGateway::new();
        let desired = desired_port("manual", true);
        let report = reconcile(
            &crate::testkit::PortKind,
            &gateway,
            &desired,
            &ReconcileOptions::default(),
        )
        .unwrap();

        assert!(report.created);
        assert!(!report.changed);
        assert!(report.changed_attributes.is_empty());
        assert!(report.is_success());
        // The attributes were still pushed to the device.
        assert_eq!(report.final_instance.attr("mode"), Some(&AttrValue::Str("manual".into())));
    }

    #[test]
    fn test_encode_and_device_field_reach_the_wire() {
        let gateway = MemoryGateway::new();
        let desired = ResourceInstance::present("Port1").with_attr("enable", Some(false.into()));
        gateway.seed("port", "Port1", json!({}));
        reconcile(
            &crate::testkit::PortKind,
            &gateway,
            &desired,
            &ReconcileOptions::default(),
        )
        .unwrap();

        // Canonical `enable: false` arrives as device `shutdown: true`.
        assert!(gateway.calls().iter().any(|call| matches!(
            call,
            GatewayCall::Set { field, value: Some(AttrValue::Bool(true)), reset: false, .. }
                if field == "shutdown"
        )));
    }

    #[test]
    fn test_modify_reports_changed_attributes() {
        let gateway = MemoryGateway::new();
        gateway.seed("port", "Port1", json!({"mode": "auto"}));
        let desired = ResourceInstance::present("Port1").with_attr("mode", Some("manual".into()));
        let report = reconcile(
            &crate::testkit::PortKind,
            &gateway,
            &desired,
            &ReconcileOptions::default(),
        )
        .unwrap();

        assert!(report.changed);
        assert!(!report.created);
        assert_eq!(
            report.changed_attributes.get("mode"),
            Some(&Some(AttrValue::Str("manual".into())))
        );
    }

    #[test]
    fn test_delete_reports_removed() {
        let gateway = MemoryGateway::new();
        gateway.seed("port", "Port1", json!({}));
        let desired = ResourceInstance::absent("Port1");
        let report = reconcile(
            &crate::testkit::PortKind,
            &gateway,
            &desired,
            &ReconcileOptions::default(),
        )
        .unwrap();

        assert!(report.removed);
        assert!(!report.changed);
        assert_eq!(report.final_instance.presence, Presence::Absent);
    }

    #[test]
    fn test_permanent_absent_resets_all_attributes() {
        let gateway = MemoryGateway::new();
        gateway.seed("port", "Fixed1", json!({"mode": "manual", "speed": 40000}));
        let desired = ResourceInstance::absent("Fixed1");
        let report = reconcile(
            &crate::testkit::PortKind,
            &gateway,
            &desired,
            &ReconcileOptions::default(),
        )
        .unwrap();

        assert!(!report.removed);
        assert!(report.changed);
        assert_eq!(report.changed_attributes.len(), 3);
        assert!(report.changed_attributes.values().all(Option::is_none));
        // No delete call ever reached the gateway.
        assert!(!gateway
            .calls()
            .iter()
            .any(|call| matches!(call, GatewayCall::Delete { .. })));
        // The resource normalizes back to its defaults.
        assert_eq!(report.final_instance.attr("mode"), Some(&AttrValue::Str("auto".into())));
        assert_eq!(report.final_instance.attr("speed"), Some(&AttrValue::Int(1000)));
    }

    #[test]
    fn test_dry_run_predicts_without_mutating() {
        let seed = json!({"mode": "auto", "speed": 1000});
        let desired = desired_port("manual", false);

        let wet = MemoryGateway::new();
        wet.seed("port", "Port1", seed.clone());
        let wet_report = reconcile(
            &crate::testkit::PortKind,
            &wet,
            &desired,
            &ReconcileOptions::default(),
        )
        .unwrap();

        let dry = MemoryGateway::new();
        dry.seed("port", "Port1", seed);
        let observed = observe(&crate::testkit::PortKind, &dry, "Port1").unwrap();
        let dry_report = reconcile(
            &crate::testkit::PortKind,
            &dry,
            &desired,
            &ReconcileOptions {
                dry_run: true,
                ..Default::default()
            },
        )
        .unwrap();

        // Structurally identical prediction.
        assert_eq!(dry_report.changed, wet_report.changed);
        assert_eq!(dry_report.created, wet_report.created);
        assert_eq!(dry_report.removed, wet_report.removed);
        assert_eq!(dry_report.changed_attributes, wet_report.changed_attributes);
        // Zero mutations, and the final instance is the pre-action state.
        assert_eq!(dry.mutation_count(), 0);
        assert_eq!(dry_report.final_instance, observed);
    }

    #[test]
    fn test_rejection_is_recorded_and_execution_continues() {
        let gateway = MemoryGateway::new();
        gateway.seed("port", "Port1", json!({"mode": "auto", "shutdown": true}));
        gateway.reject_field("mode");
        let desired = desired_port("manual", true);
        let report = reconcile(
            &crate::testkit::PortKind,
            &gateway,
            &desired,
            &ReconcileOptions::default(),
        )
        .unwrap();

        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].operation, GatewayOp::Set);
        assert_eq!(report.failures[0].attribute.as_deref(), Some("mode"));
        // Both attempts are reported; the later one still went through.
        assert_eq!(report.changed_attributes.len(), 2);
        assert_eq!(report.final_instance.attr("enable"), Some(&AttrValue::Bool(true)));
        assert_eq!(report.final_instance.attr("mode"), Some(&AttrValue::Str("auto".into())));
    }

    #[test]
    fn test_unavailable_gateway_is_fatal() {
        let gateway = MemoryGateway::new();
        gateway.set_unavailable();
        let desired = desired_port("manual", true);
        let err = reconcile(
            &crate::testkit::PortKind,
            &gateway,
            &desired,
            &ReconcileOptions::default(),
        )
        .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_schema_violation_precedes_gateway_calls() {
        let gateway = MemoryGateway::new();
        let desired = ResourceInstance::present("Port1").with_attr("bogus", Some(1.into()));
        let err = reconcile(
            &crate::testkit::PortKind,
            &gateway,
            &desired,
            &ReconcileOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn test_idempotence_after_successful_apply() {
        let gateway = MemoryGateway::new();
        let desired = desired_port("manual", true);
        reconcile(
            &crate::testkit::PortKind,
            &gateway,
            &desired,
            &ReconcileOptions::default(),
        )
        .unwrap();

        let observed = observe(&crate::testkit::PortKind, &gateway, "Port1").unwrap();
        let second = planner::plan(
            &crate::testkit::PortKind,
            &desired,
            &observed,
            &ReconcileOptions::default(),
        )
        .unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn test_final_fetch_happens_even_for_empty_plan() {
        let gateway = MemoryGateway::new();
        gateway.seed("port", "Port1", json!({"mode": "auto"}));
        let desired = ResourceInstance::present("Port1").with_attr("mode", Some("auto".into()));
        let report = reconcile(
            &crate::testkit::PortKind,
            &gateway,
            &desired,
            &ReconcileOptions::default(),
        )
        .unwrap();
        assert!(report.is_noop());
        // One fetch for observe, one post-state fetch.
        assert_eq!(gateway.calls().len(), 2);
        assert_eq!(gateway.mutation_count(), 0);
    }
}
