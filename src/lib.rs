//! Client library for the Conch datacenter inventory API
//!
//! This crate wraps the Conch REST API (racks, layouts, assignments,
//! hardware products, devices, datacenters) and provides the rack
//! reconciliation logic that replaces a rack's layout or device assignments
//! with a desired state read from a JSON document.

pub mod api;
pub mod client;
pub mod config;
pub mod domain;
pub mod errors;
pub mod reconcile;
pub mod render;

// Re-export commonly used types
pub use api::ConchApi;
pub use client::ConchClient;
pub use config::{ConchConfig, ConfigFile};
pub use errors::{ConchError, ConchResult, ReconcilePhase, ResourceKind};
pub use reconcile::{export_assignments, export_layout, import_assignments, import_layout};
