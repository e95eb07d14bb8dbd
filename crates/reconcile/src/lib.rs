//! # Reconcile
//!
//! A generic engine for reconciling one network-device resource against a
//! declared desired state.
//!
//! The engine is split along a strict boundary:
//!
//! - **Planning** ([`plan`]) is pure: given a desired and an observed
//!   [`ResourceInstance`], it decides which attributes must be created,
//!   changed, reset to their device defaults, or deleted, and returns an
//!   ordered [`Plan`]. No I/O happens here.
//! - **Execution** ([`execute`]) walks a plan and issues the corresponding
//!   [`DeviceGateway`] calls, honoring dry-run (predict, don't mutate) and
//!   accumulating a [`ReconcileReport`].
//!
//! Resource kinds plug in through the [`ResourceKind`] trait: a static
//! attribute schema, an identity validator, a permanence predicate for
//! members that can never be created or deleted, and a normalizer that maps
//! raw device state into the canonical instance record. The engine itself
//! knows nothing about interfaces or VLANs.
//!
//! ## Example
//!
//! ```ignore
//! use reconcile::{reconcile, MemoryGateway, Presence, ReconcileOptions, ResourceInstance};
//!
//! let gateway = MemoryGateway::new();
//! let desired = ResourceInstance::present("Eth1")
//!     .with_attr("description", Some("uplink".into()));
//!
//! let report = reconcile(&MyKind, &gateway, &desired, &ReconcileOptions::default())?;
//! assert!(report.created);
//! ```

pub mod error;
pub mod executor;
pub mod gateway;
pub mod planner;
pub mod schema;
pub mod types;

#[cfg(test)]
pub(crate) mod testkit;

// Re-export main types at crate root
pub use error::{Error, Result};
pub use executor::{execute, observe, reconcile};
pub use gateway::{DeviceGateway, GatewayCall, MemoryGateway, RawState};
pub use planner::{plan, validate_desired, Action, Plan};
pub use schema::{AttrDef, EncodeFn, ResourceKind, ValidateFn};
pub use types::{
    AttrMap, AttrValue, Failure, GatewayOp, Presence, ReconcileOptions, ReconcileReport,
    ResourceInstance, ValueType,
};
