//! `wirestate apply` - the full reconciliation pass.
//!
//! Validates the desired input, observes the device, shows the plan,
//! confirms (unless `--yes` or `--dry-run`), executes, and renders the
//! report. A report containing device rejections maps to a non-zero exit
//! code after rendering.

use anyhow::{Context, Result, bail};
use dialoguer::Confirm;
use reconcile::{
    ReconcileOptions, ReconcileReport, ResourceKind, execute, observe, plan, validate_desired,
};

use crate::cli::ApplyArgs;
use crate::desired::{self, SpecFile};
use crate::device::{self, SnapshotDevice};
use crate::kinds;
use crate::ui;

pub fn run(args: &ApplyArgs, device_flag: Option<&str>) -> Result<()> {
    let (kind, desired) = build_desired(args)?;
    let options = ReconcileOptions {
        null_as_default: args.null_as_default,
        dry_run: args.dry_run,
    };

    // Schema violations surface before the device is even opened.
    validate_desired(kind, &desired)?;

    let path = device::resolve_path(device_flag)?;
    log::info!("using device snapshot {}", path.display());
    let gateway = SnapshotDevice::open(&path)?;

    let observed = observe(kind, &gateway, &desired.identity)?;
    let plan = plan(kind, &desired, &observed, &options)?;

    if !args.json {
        ui::header(&format!("{} {}", kind.name(), desired.identity));
        if plan.is_empty() {
            ui::success("already converged, nothing to do");
        } else {
            for action in &plan.actions {
                println!("  {}", ui::action_line(action));
            }
            println!();
        }
    }

    if !plan.is_empty() && !args.dry_run && !args.yes {
        let confirmed = Confirm::new()
            .with_prompt("Apply these changes?")
            .default(false)
            .interact()?;
        if !confirmed {
            ui::warn("aborted, device untouched");
            return Ok(());
        }
    }

    // An empty plan still executes: the trailing fetch reports final state.
    let report = execute(kind, &desired.identity, &plan, &gateway, &options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_report(&report, args.dry_run);
    }

    if !report.is_success() {
        bail!(
            "{} plan action(s) rejected by the device",
            report.failures.len()
        );
    }
    Ok(())
}

/// Resolve the kind and desired instance from flags or a spec file.
fn build_desired(args: &ApplyArgs) -> Result<(&'static dyn ResourceKind, reconcile::ResourceInstance)> {
    if let Some(path) = &args.file {
        let spec = SpecFile::load(path)?;
        let kind = kinds::by_name(&spec.kind)
            .with_context(|| format!("unknown kind '{}'; see `wirestate kinds`", spec.kind))?;
        return Ok((kind, spec.to_instance()));
    }
    let kind_name = args.kind.as_deref().context("--kind is required")?;
    let id = args.id.as_deref().context("--id is required")?;
    let kind = kinds::by_name(kind_name)
        .with_context(|| format!("unknown kind '{kind_name}'; see `wirestate kinds`"))?;
    let desired = desired::from_flags(kind, id, &args.set, &args.unset, args.absent)?;
    Ok((kind, desired))
}

fn render_report(report: &ReconcileReport, dry_run: bool) {
    if dry_run {
        ui::info("dry run: no changes were made");
    }
    if report.created {
        ui::success("resource created");
    }
    if report.removed {
        ui::success("resource removed");
    }
    for (name, value) in &report.changed_attributes {
        ui::kv(name, &ui::display_value(value.as_ref()));
    }
    for failure in &report.failures {
        let target = failure.attribute.as_deref().unwrap_or("resource");
        ui::error(&format!("{} {target}: {}", failure.operation, failure.message));
    }
}
