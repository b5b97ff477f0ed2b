// Copyright (c) 2025 - Cowboy AI, Inc.
//! Conch Domain Models
//!
//! Records returned by and sent to the Conch API. Identifiers are backend
//! assigned UUIDs; human-facing names (product alias, device serial, asset
//! tag) are resolved to those UUIDs by [`crate::reconcile::resolver`].
//!
//! # Value Objects with Invariants
//!
//! - [`RuRange`] - 1-based rack-unit range `[start, start + size)`
//!
//! # Records
//!
//! - [`Rack`], [`RackLayoutSlot`], [`RackAssignment`] - rack contents
//! - [`HardwareProduct`] - product catalogue entries
//! - [`Device`] - physical devices
//! - [`Datacenter`], [`DatacenterRoom`] - sites

pub mod device;
pub mod hardware;
pub mod rack;
pub mod site;

pub use device::Device;
pub use hardware::HardwareProduct;
pub use rack::{
    AssignmentUpdate, NewLayoutSlot, Rack, RackAssignment, RackAssignments, RackLayout,
    RackLayoutSlot, RackUnitError, RuRange,
};
pub use site::{Datacenter, DatacenterRoom};
