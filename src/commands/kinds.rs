//! `wirestate kinds` - list resource kinds and their schemas.

use anyhow::Result;

use crate::kinds::KINDS;
use crate::ui;

pub fn run() -> Result<()> {
    for kind in KINDS {
        ui::header(kind.name());
        for def in kind.schema() {
            let mut notes = vec![def.ty.to_string()];
            if def.device_field != def.name {
                notes.push(format!("device field: {}", def.device_field));
            }
            if !def.nullable {
                notes.push("required".to_string());
            }
            ui::kv(def.name, &notes.join(", "));
        }
    }
    println!();
    ui::dim("attributes are applied in the order listed");
    Ok(())
}
