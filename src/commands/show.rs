//! `wirestate show` - fetch and normalize one resource.

use anyhow::{Context, Result};
use reconcile::observe;

use crate::cli::ShowArgs;
use crate::device::{self, SnapshotDevice};
use crate::kinds;
use crate::ui;

pub fn run(args: &ShowArgs, device_flag: Option<&str>) -> Result<()> {
    let kind = kinds::by_name(&args.kind)
        .with_context(|| format!("unknown kind '{}'; see `wirestate kinds`", args.kind))?;
    let path = device::resolve_path(device_flag)?;
    let gateway = SnapshotDevice::open(&path)?;

    let instance = observe(kind, &gateway, &args.id)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&instance)?);
        return Ok(());
    }

    ui::header(&format!("{} {}", args.kind, args.id));
    if !instance.is_present() {
        ui::warn("resource is absent");
        return Ok(());
    }
    for def in kind.schema() {
        ui::kv(def.name, &ui::display_value(instance.attr(def.name)));
    }
    Ok(())
}
