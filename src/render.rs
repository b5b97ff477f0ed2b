// Copyright (c) 2025 - Cowboy AI, Inc.
//! Output rendering for the command line
//!
//! JSON output is the records as Conch returns them. Text output is a
//! borderless table.

use serde::Serialize;
use std::collections::HashMap;
use tabled::settings::{Padding, Style};
use tabled::{Table, Tabled};
use uuid::Uuid;

use crate::domain::{
    Datacenter, DatacenterRoom, Device, HardwareProduct, Rack, RackAssignments, RackLayout,
};
use crate::errors::ConchResult;
use crate::reconcile::{LayoutDiff, LayoutPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Text,
}

fn table<T: Tabled>(rows: impl IntoIterator<Item = T>) -> String {
    Table::new(rows)
        .with(Style::empty())
        .with(Padding::new(0, 1, 0, 0))
        .to_string()
}

fn json<T: Serialize + ?Sized>(value: &T) -> ConchResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_string()
}

#[derive(Tabled)]
struct LayoutRow {
    #[tabled(rename = "RU")]
    ru: String,
    #[tabled(rename = "SIZE")]
    size: u32,
    #[tabled(rename = "PRODUCT")]
    product: String,
    #[tabled(rename = "SLOT ID")]
    slot_id: Uuid,
}

/// Render a layout; `products` supplies names for product ids
pub fn layout(
    layout: &RackLayout,
    products: &[HardwareProduct],
    format: OutputFormat,
) -> ConchResult<String> {
    if format == OutputFormat::Json {
        return json(layout);
    }

    let names: HashMap<Uuid, &str> = products.iter().map(|p| (p.id, p.alias.as_str())).collect();
    let rows = layout.slots().iter().map(|slot| LayoutRow {
        ru: slot
            .range()
            .map(|r| r.to_string())
            .unwrap_or_else(|| slot.rack_unit_start.to_string()),
        size: slot.rack_unit_size,
        product: names
            .get(&slot.hardware_product_id)
            .map(|n| n.to_string())
            .unwrap_or_else(|| slot.hardware_product_id.to_string()),
        slot_id: slot.id,
    });
    Ok(table(rows))
}

#[derive(Tabled)]
struct AssignmentRow {
    #[tabled(rename = "RU")]
    ru: u32,
    #[tabled(rename = "SIZE")]
    size: u32,
    #[tabled(rename = "PRODUCT")]
    product: String,
    #[tabled(rename = "DEVICE")]
    device: String,
    #[tabled(rename = "SERIAL")]
    serial: String,
    #[tabled(rename = "ASSET TAG")]
    asset_tag: String,
}

pub fn assignments(assignments: &RackAssignments, format: OutputFormat) -> ConchResult<String> {
    if format == OutputFormat::Json {
        return json(assignments);
    }

    let rows = assignments.assignments().iter().map(|a| AssignmentRow {
        ru: a.rack_unit_start,
        size: a.rack_unit_size,
        product: or_dash(a.hardware_product_name.as_deref()),
        device: a
            .device_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string()),
        serial: or_dash(a.device_serial_number.as_deref()),
        asset_tag: or_dash(a.device_asset_tag.as_deref()),
    });
    Ok(table(rows))
}

#[derive(Serialize)]
struct PlanView<'a> {
    #[serde(flatten)]
    plan: &'a LayoutPlan,
    diff: LayoutDiff,
}

/// Render a layout plan as the list of calls it will make
pub fn plan(plan: &LayoutPlan, format: OutputFormat) -> ConchResult<String> {
    let diff = plan.diff();
    if format == OutputFormat::Json {
        return json(&PlanView { plan, diff });
    }

    let mut out = String::new();
    out.push_str(&format!(
        "rack {}: {} unchanged, {} removed, {} added\n",
        plan.rack_id,
        diff.unchanged.len(),
        diff.removed.len(),
        diff.added.len()
    ));
    for slot in &plan.deletes {
        out.push_str(&format!(
            "DELETE /layout/{}  (rack unit {})\n",
            slot.id, slot.rack_unit_start
        ));
    }
    for planned in &plan.creates {
        out.push_str(&format!(
            "POST   /layout  rack unit {} -> {} ({})\n",
            planned.slot.rack_unit_start, planned.slot.hardware_product_id, planned.reference
        ));
    }
    Ok(out)
}

pub fn rack(rack: &Rack, format: OutputFormat) -> ConchResult<String> {
    if format == OutputFormat::Json {
        return json(rack);
    }
    Ok(format!(
        "id:        {}\nname:      {}\nroom:      {}\nphase:     {}\nserial:    {}\nasset tag: {}\n",
        rack.id,
        rack.name,
        rack.datacenter_room_id,
        or_dash(rack.phase.as_deref()),
        or_dash(rack.serial_number.as_deref()),
        or_dash(rack.asset_tag.as_deref()),
    ))
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: Uuid,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "ALIAS")]
    alias: String,
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "RU")]
    rack_unit_size: u32,
}

pub fn hardware_products(products: &[HardwareProduct], format: OutputFormat) -> ConchResult<String> {
    if format == OutputFormat::Json {
        return json(products);
    }
    Ok(table(products.iter().map(|p| ProductRow {
        id: p.id,
        name: p.name.clone(),
        alias: p.alias.clone(),
        sku: or_dash(p.sku.as_deref()),
        rack_unit_size: p.rack_unit_size,
    })))
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: Uuid,
    #[tabled(rename = "SERIAL")]
    serial: String,
    #[tabled(rename = "ASSET TAG")]
    asset_tag: String,
    #[tabled(rename = "HEALTH")]
    health: String,
    #[tabled(rename = "PHASE")]
    phase: String,
}

pub fn device(device: &Device, format: OutputFormat) -> ConchResult<String> {
    if format == OutputFormat::Json {
        return json(device);
    }
    Ok(table([DeviceRow {
        id: device.id,
        serial: device.serial_number.clone(),
        asset_tag: or_dash(device.asset_tag.as_deref()),
        health: or_dash(device.health.as_deref()),
        phase: or_dash(device.phase.as_deref()),
    }]))
}

#[derive(Tabled)]
struct DatacenterRow {
    #[tabled(rename = "ID")]
    id: Uuid,
    #[tabled(rename = "VENDOR")]
    vendor: String,
    #[tabled(rename = "REGION")]
    region: String,
    #[tabled(rename = "LOCATION")]
    location: String,
}

pub fn datacenters(datacenters: &[Datacenter], format: OutputFormat) -> ConchResult<String> {
    if format == OutputFormat::Json {
        return json(datacenters);
    }
    Ok(table(datacenters.iter().map(|dc| DatacenterRow {
        id: dc.id,
        vendor: dc.vendor.clone(),
        region: dc.region.clone(),
        location: dc.location.clone(),
    })))
}

#[derive(Tabled)]
struct RoomRow {
    #[tabled(rename = "ID")]
    id: Uuid,
    #[tabled(rename = "ALIAS")]
    alias: String,
    #[tabled(rename = "AZ")]
    az: String,
    #[tabled(rename = "DATACENTER")]
    datacenter_id: Uuid,
}

pub fn rooms(rooms: &[DatacenterRoom], format: OutputFormat) -> ConchResult<String> {
    if format == OutputFormat::Json {
        return json(rooms);
    }
    Ok(table(rooms.iter().map(|room| RoomRow {
        id: room.id,
        alias: room.alias.clone(),
        az: room.az.clone(),
        datacenter_id: room.datacenter_id,
    })))
}
