//! Snapshot-backed device simulator.
//!
//! Implements the engine's `DeviceGateway` against per-kind resource
//! tables held in a JSON snapshot file, standing in for a real device's
//! running configuration. Every mutation is written back to disk, so
//! consecutive invocations see each other's changes the way they would on
//! real hardware.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reconcile::{AttrValue, DeviceGateway, Error, GatewayOp, RawState};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// On-disk snapshot: per-kind tables of raw resource objects.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    tables: BTreeMap<String, BTreeMap<String, Map<String, Value>>>,
}

/// Gateway backed by a snapshot file (or purely in-memory for tests).
pub struct SnapshotDevice {
    path: Option<PathBuf>,
    state: Mutex<Snapshot>,
}

impl SnapshotDevice {
    /// Open a snapshot file, creating an empty device if it does not exist
    /// yet.
    pub fn open(path: &Path) -> Result<Self> {
        let snapshot = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("could not read device snapshot {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("invalid device snapshot {}", path.display()))?
        } else {
            log::info!("no snapshot at {}, starting empty device", path.display());
            Snapshot::default()
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            state: Mutex::new(snapshot),
        })
    }

    /// A device that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Mutex::new(Snapshot::default()),
        }
    }

    /// Where the snapshot lives, if file-backed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn persist(&self, snapshot: &mut Snapshot) -> reconcile::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        snapshot.saved_at = Some(Utc::now());
        let content = serde_json::to_string_pretty(snapshot)
            .map_err(|err| Error::unavailable(format!("snapshot serialization failed: {err}")))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| Error::unavailable(format!("snapshot write failed: {err}")))?;
        }
        fs::write(path, content)
            .map_err(|err| Error::unavailable(format!("snapshot write failed: {err}")))
    }
}

impl DeviceGateway for SnapshotDevice {
    fn fetch(&self, kind: &str, identity: &str) -> reconcile::Result<Option<RawState>> {
        let snapshot = self.state.lock().unwrap();
        Ok(snapshot
            .tables
            .get(kind)
            .and_then(|table| table.get(identity))
            .map(|object| Value::Object(object.clone())))
    }

    fn create(&self, kind: &str, identity: &str) -> reconcile::Result<RawState> {
        log::debug!("create {kind} {identity}");
        let mut snapshot = self.state.lock().unwrap();
        let table = snapshot.tables.entry(kind.to_string()).or_default();
        if table.contains_key(identity) {
            return Err(Error::rejected(
                GatewayOp::Create,
                identity,
                "already exists",
            ));
        }
        table.insert(identity.to_string(), Map::new());
        self.persist(&mut snapshot)?;
        Ok(Value::Object(Map::new()))
    }

    fn delete(&self, kind: &str, identity: &str) -> reconcile::Result<()> {
        log::debug!("delete {kind} {identity}");
        let mut snapshot = self.state.lock().unwrap();
        let removed = snapshot
            .tables
            .get_mut(kind)
            .and_then(|table| table.remove(identity));
        if removed.is_none() {
            return Err(Error::rejected(GatewayOp::Delete, identity, "not found"));
        }
        self.persist(&mut snapshot)
    }

    fn set_attribute(
        &self,
        kind: &str,
        identity: &str,
        field: &str,
        value: Option<&AttrValue>,
        reset: bool,
    ) -> reconcile::Result<()> {
        log::debug!("set {kind} {identity} {field} reset={reset}");
        let mut snapshot = self.state.lock().unwrap();
        let operation = if reset { GatewayOp::Reset } else { GatewayOp::Set };
        let object = snapshot
            .tables
            .get_mut(kind)
            .and_then(|table| table.get_mut(identity))
            .ok_or_else(|| Error::rejected(operation, identity, "not found"))?;
        if reset {
            object.remove(field);
        } else if let Some(value) = value {
            object.insert(field.to_string(), value.into());
        }
        self.persist(&mut snapshot)
    }
}

/// Resolve the device snapshot path: explicit flag/env value (with `~`
/// expansion) or the default under the user config directory.
pub fn resolve_path(flag: Option<&str>) -> Result<PathBuf> {
    if let Some(raw) = flag {
        return Ok(PathBuf::from(shellexpand::tilde(raw).into_owned()));
    }
    let config = dirs::config_dir().context("could not determine config directory")?;
    Ok(config.join("wirestate").join("device.json"))
}
