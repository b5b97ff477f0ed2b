// Copyright (c) 2025 - Cowboy AI, Inc.
//! Import/Export Codec
//!
//! Desired-state documents are JSON arrays. Order is preserved and becomes
//! the creation order in the reconcilers.
//!
//! Layout entries carry `ru_start` and exactly one product reference:
//!
//! ```json
//! [
//!   { "ru_start": 1,  "product_alias": "SW-24" },
//!   { "ru_start": 10, "product_id": "0f6c5d8e-1c1b-4f2e-9d55-3ad3e1e0c001" }
//! ]
//! ```
//!
//! Assignment entries carry `rack_unit_start` and exactly one device reference:
//!
//! ```json
//! [
//!   { "rack_unit_start": 1, "device_asset_tag": "AT-0001" },
//!   { "rack_unit_start": 3, "device_id": "0f6c5d8e-1c1b-4f2e-9d55-3ad3e1e0d001" }
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::resolver::{DeviceRef, ProductRef};
use crate::domain::{HardwareProduct, RackAssignments, RackLayout};
use crate::errors::{ConchError, ConchResult};

/// A desired layout slot, not yet resolved to a product UUID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RackLayoutDesiredEntry {
    pub rack_unit_start: u32,
    pub product: ProductRef,
}

/// A desired device assignment, not yet resolved to a device UUID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDesiredEntry {
    pub rack_unit_start: u32,
    pub device: DeviceRef,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutEntryWire {
    ru_start: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    product_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    product_sku: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct AssignmentEntryWire {
    rack_unit_start: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    device_asset_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    device_serial_number: Option<String>,
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

fn rack_unit(raw: i64, index: usize, field: &str) -> ConchResult<u32> {
    u32::try_from(raw)
        .ok()
        .filter(|ru| *ru >= 1)
        .ok_or_else(|| {
            ConchError::MalformedInput(format!(
                "entry {}: {} must be a positive integer, got {}",
                index, field, raw
            ))
        })
}

fn parse_uuid(raw: &str, index: usize, field: &str) -> ConchResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        ConchError::MalformedInput(format!("entry {}: {} is not a UUID: {}", index, field, raw))
    })
}

/// Decode a layout document
pub fn decode_layout(raw: &[u8]) -> ConchResult<Vec<RackLayoutDesiredEntry>> {
    let wire: Vec<LayoutEntryWire> = serde_json::from_slice(raw)
        .map_err(|e| ConchError::MalformedInput(format!("invalid layout document: {}", e)))?;

    wire.into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let rack_unit_start = rack_unit(entry.ru_start, index, "ru_start")?;

            let mut refs = Vec::new();
            if let Some(id) = present(entry.product_id) {
                refs.push(ProductRef::Id(parse_uuid(&id, index, "product_id")?));
            }
            if let Some(name) = present(entry.product_name) {
                refs.push(ProductRef::Name(name));
            }
            if let Some(alias) = present(entry.product_alias) {
                refs.push(ProductRef::Alias(alias));
            }
            if let Some(sku) = present(entry.product_sku) {
                refs.push(ProductRef::Sku(sku));
            }

            let product = single(refs, || {
                format!(
                    "entry {} (ru_start {}): exactly one of product_id, product_name, \
                     product_alias or product_sku is required",
                    index, rack_unit_start
                )
            })?;

            Ok(RackLayoutDesiredEntry {
                rack_unit_start,
                product,
            })
        })
        .collect()
}

/// Decode an assignment document
pub fn decode_assignments(raw: &[u8]) -> ConchResult<Vec<AssignmentDesiredEntry>> {
    let wire: Vec<AssignmentEntryWire> = serde_json::from_slice(raw)
        .map_err(|e| ConchError::MalformedInput(format!("invalid assignment document: {}", e)))?;

    wire.into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let rack_unit_start = rack_unit(entry.rack_unit_start, index, "rack_unit_start")?;

            let mut refs = Vec::new();
            if let Some(id) = present(entry.device_id) {
                refs.push(DeviceRef::Id(parse_uuid(&id, index, "device_id")?));
            }
            if let Some(tag) = present(entry.device_asset_tag) {
                refs.push(DeviceRef::AssetTag(tag));
            }
            if let Some(serial) = present(entry.device_serial_number) {
                refs.push(DeviceRef::Serial(serial));
            }

            let device = single(refs, || {
                format!(
                    "entry {} (rack_unit_start {}): exactly one of device_id, \
                     device_asset_tag or device_serial_number is required",
                    index, rack_unit_start
                )
            })?;

            Ok(AssignmentDesiredEntry {
                rack_unit_start,
                device,
            })
        })
        .collect()
}

fn single<T>(mut refs: Vec<T>, message: impl FnOnce() -> String) -> ConchResult<T> {
    if refs.len() == 1 {
        if let Some(only) = refs.pop() {
            return Ok(only);
        }
    }
    Err(ConchError::MalformedInput(message()))
}

fn layout_wire(entry: &RackLayoutDesiredEntry) -> LayoutEntryWire {
    let mut wire = LayoutEntryWire {
        ru_start: i64::from(entry.rack_unit_start),
        ..Default::default()
    };
    match &entry.product {
        ProductRef::Id(id) => wire.product_id = Some(id.to_string()),
        ProductRef::Name(v) => wire.product_name = Some(v.clone()),
        ProductRef::Alias(v) => wire.product_alias = Some(v.clone()),
        ProductRef::Sku(v) => wire.product_sku = Some(v.clone()),
    }
    wire
}

fn assignment_wire(entry: &AssignmentDesiredEntry) -> AssignmentEntryWire {
    let mut wire = AssignmentEntryWire {
        rack_unit_start: i64::from(entry.rack_unit_start),
        ..Default::default()
    };
    match &entry.device {
        DeviceRef::Id(id) => wire.device_id = Some(id.to_string()),
        DeviceRef::AssetTag(v) => wire.device_asset_tag = Some(v.clone()),
        DeviceRef::Serial(v) => wire.device_serial_number = Some(v.clone()),
    }
    wire
}

/// Encode desired layout entries, preserving order
pub fn encode_layout(entries: &[RackLayoutDesiredEntry]) -> ConchResult<Vec<u8>> {
    let wire: Vec<_> = entries.iter().map(layout_wire).collect();
    Ok(serde_json::to_vec_pretty(&wire)?)
}

/// Encode desired assignment entries, preserving order
pub fn encode_assignments(entries: &[AssignmentDesiredEntry]) -> ConchResult<Vec<u8>> {
    let wire: Vec<_> = entries.iter().map(assignment_wire).collect();
    Ok(serde_json::to_vec_pretty(&wire)?)
}

/// Desired entries reproducing a fetched layout
///
/// Product UUIDs are replaced by the product name when `products` knows it.
/// Entries are ordered by ascending rack unit.
pub fn layout_entries(
    layout: &RackLayout,
    products: &[HardwareProduct],
) -> Vec<RackLayoutDesiredEntry> {
    let names: HashMap<Uuid, &str> = products
        .iter()
        .map(|p| (p.id, p.name.as_str()))
        .collect();

    let mut slots: Vec<_> = layout.slots().iter().collect();
    slots.sort_by_key(|slot| (slot.rack_unit_start, slot.hardware_product_id));

    slots
        .into_iter()
        .map(|slot| RackLayoutDesiredEntry {
            rack_unit_start: slot.rack_unit_start,
            product: match names.get(&slot.hardware_product_id) {
                Some(name) if !name.is_empty() => ProductRef::Name(name.to_string()),
                _ => ProductRef::Id(slot.hardware_product_id),
            },
        })
        .collect()
}

/// Desired entries reproducing fetched assignments
///
/// Prefers the asset tag, then the device id, then the serial number.
/// Rack units with no device are skipped.
pub fn assignment_entries(assignments: &RackAssignments) -> Vec<AssignmentDesiredEntry> {
    let mut rows: Vec<_> = assignments.assignments().iter().collect();
    rows.sort_by_key(|row| row.rack_unit_start);

    rows.into_iter()
        .filter_map(|row| {
            let device = match (
                row.device_asset_tag.as_ref().filter(|t| !t.is_empty()),
                row.device_id,
                row.device_serial_number.as_ref().filter(|s| !s.is_empty()),
            ) {
                (Some(tag), _, _) => DeviceRef::AssetTag(tag.clone()),
                (None, Some(id), _) => DeviceRef::Id(id),
                (None, None, Some(serial)) => DeviceRef::Serial(serial.clone()),
                (None, None, None) => return None,
            };
            Some(AssignmentDesiredEntry {
                rack_unit_start: row.rack_unit_start,
                device,
            })
        })
        .collect()
}
