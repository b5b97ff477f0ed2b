// Copyright (c) 2025 - Cowboy AI, Inc.

//! Rack Reconciliation
//!
//! Resolves a desired-state description of a rack against Conch:
//!
//! ```text
//! raw JSON ──decode──> desired entries ──resolve──> UUIDs ──apply──> Conch
//!                                                                 │
//!              final state <──────────── re-fetch ────────────────┘
//! ```
//!
//! Decoding and resolution fail before any mutating call. Once mutation
//! starts, failures carry enough context to repair by hand; nothing is
//! retried or rolled back. Calls are issued one at a time.

pub mod assignment;
pub mod codec;
pub mod layout;
pub mod resolver;

use uuid::Uuid;

use crate::api::ConchApi;
use crate::domain::{HardwareProduct, RackAssignments, RackLayout};
use crate::errors::ConchResult;

pub use assignment::AssignmentReconciler;
pub use codec::{AssignmentDesiredEntry, RackLayoutDesiredEntry};
pub use layout::{LayoutDiff, LayoutPlan, LayoutReconciler};
pub use resolver::{DeviceRef, IdentifierResolver, LookupField, ProductRef};

/// Decode, resolve and replace a rack's layout; returns the final layout
pub async fn import_layout(
    api: &dyn ConchApi,
    rack_id: Uuid,
    raw: &[u8],
    overwrite: bool,
) -> ConchResult<RackLayout> {
    let entries = codec::decode_layout(raw)?;
    LayoutReconciler::new(api)
        .import(rack_id, &entries, overwrite)
        .await
}

/// Decode and plan a layout import without mutating anything
pub async fn plan_layout_import(
    api: &dyn ConchApi,
    rack_id: Uuid,
    raw: &[u8],
    overwrite: bool,
) -> ConchResult<LayoutPlan> {
    let entries = codec::decode_layout(raw)?;
    LayoutReconciler::new(api)
        .plan(rack_id, &entries, overwrite)
        .await
}

/// Encode a fetched layout as an import document
///
/// `products` supplies names to substitute for product UUIDs; pass an empty
/// slice to export raw ids.
pub fn export_layout(layout: &RackLayout, products: &[HardwareProduct]) -> ConchResult<Vec<u8>> {
    codec::encode_layout(&codec::layout_entries(layout, products))
}

/// Decode, resolve and replace a rack's assignments; returns the final set
pub async fn import_assignments(
    api: &dyn ConchApi,
    rack_id: Uuid,
    raw: &[u8],
) -> ConchResult<RackAssignments> {
    let entries = codec::decode_assignments(raw)?;
    AssignmentReconciler::new(api).import(rack_id, &entries).await
}

/// Encode fetched assignments as an import document
pub fn export_assignments(assignments: &RackAssignments) -> ConchResult<Vec<u8>> {
    codec::encode_assignments(&codec::assignment_entries(assignments))
}
