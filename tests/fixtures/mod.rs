// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for conch
//!
//! Deterministic catalogue data and an in-memory [`RecordingApi`] that
//! behaves like a small Conch server and records every call, so tests can
//! assert call counts and order.
//!
//! # Design Principles
//! - All ids are fixed constants
//! - The fake enforces what the server enforces (unknown products, rack-unit
//!   overlap) and nothing else
//! - Failures are injected per call index, never at random

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

use conch::domain::{
    AssignmentUpdate, Datacenter, DatacenterRoom, Device, HardwareProduct, NewLayoutSlot, Rack,
    RackAssignment, RackAssignments, RackLayout, RackLayoutSlot, RuRange,
};
use conch::{ConchApi, ConchError, ConchResult};

pub const RACK_ID: &str = "01934f4a-7000-7000-8000-000000007000";
pub const ROOM_ID: &str = "01934f4a-7100-7000-8000-000000007100";

pub const PRODUCT_A: &str = "01934f4a-a000-7000-8000-00000000a000";
pub const PRODUCT_B: &str = "01934f4a-b000-7000-8000-00000000b000";
pub const PRODUCT_C: &str = "01934f4a-c000-7000-8000-00000000c000";

pub const DEVICE_1: &str = "01934f4a-d001-7000-8000-00000000d001";
pub const DEVICE_2: &str = "01934f4a-d002-7000-8000-00000000d002";

/// Parse a fixed UUID from a constant string
pub fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("Invalid UUID in test fixture")
}

pub fn rack_id() -> Uuid {
    parse_uuid(RACK_ID)
}

pub fn product_a() -> Uuid {
    parse_uuid(PRODUCT_A)
}

pub fn product_b() -> Uuid {
    parse_uuid(PRODUCT_B)
}

pub fn product_c() -> Uuid {
    parse_uuid(PRODUCT_C)
}

fn product(id: &str, name: &str, alias: &str, sku: &str, size: u32) -> HardwareProduct {
    HardwareProduct {
        id: parse_uuid(id),
        name: name.to_string(),
        alias: alias.to_string(),
        sku: Some(sku.to_string()),
        prefix: None,
        hardware_vendor_id: None,
        rack_unit_size: size,
        created: None,
        updated: None,
    }
}

/// Product catalogue: A is a 1U switch, B a 2U server, C a 4U storage node
pub fn catalogue() -> Vec<HardwareProduct> {
    vec![
        product(PRODUCT_A, "Switch 24 Port", "SW-24", "600-0001", 1),
        product(PRODUCT_B, "Compute 2U", "CMP-2U", "600-0002", 2),
        product(PRODUCT_C, "Storage 4U", "STR-4U", "600-0003", 4),
    ]
}

pub fn devices() -> Vec<Device> {
    vec![
        Device {
            id: parse_uuid(DEVICE_1),
            serial_number: "SN0001".to_string(),
            asset_tag: Some("AT-0001".to_string()),
            hardware_product_id: product_b(),
            health: Some("pass".to_string()),
            phase: Some("integration".to_string()),
            build_id: None,
            last_seen: None,
            created: None,
            updated: None,
        },
        Device {
            id: parse_uuid(DEVICE_2),
            serial_number: "SN0002".to_string(),
            asset_tag: None,
            hardware_product_id: product_a(),
            health: None,
            phase: None,
            build_id: None,
            last_seen: None,
            created: None,
            updated: None,
        },
    ]
}

/// Every call the fake received, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetLayout(Uuid),
    DeleteSlot(Uuid),
    CreateSlot(NewLayoutSlot),
    GetProduct(String),
    GetDevice(String),
    GetAssignments(Uuid),
    ReplaceAssignments(Uuid, Vec<AssignmentUpdate>),
    Other(&'static str),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::DeleteSlot(_) | Call::CreateSlot(_) | Call::ReplaceAssignments(..)
        )
    }
}

#[derive(Debug, Default)]
struct State {
    slots: Vec<RackLayoutSlot>,
    assignments: Vec<RackAssignment>,
    calls: Vec<Call>,
    next_slot: u128,
    fail_delete_at: Option<usize>,
    fail_create_at: Option<usize>,
    fail_assignments_with: Option<u16>,
    fail_layout_fetch_at: Option<usize>,
    fail_assignments_fetch_at: Option<usize>,
    layout_fetches: usize,
    assignments_fetches: usize,
    deletes: usize,
    creates: usize,
}

/// In-memory Conch with a call log
pub struct RecordingApi {
    products: Vec<HardwareProduct>,
    devices: Vec<Device>,
    state: Mutex<State>,
}

fn http(method: &str, path: String, status: u16, body: &str) -> ConchError {
    ConchError::Http {
        method: method.to_string(),
        path,
        status,
        body: body.to_string(),
    }
}

impl RecordingApi {
    pub fn new() -> Self {
        Self {
            products: catalogue(),
            devices: devices(),
            state: Mutex::new(State::default()),
        }
    }

    /// Seed the rack with slots at `(rack_unit_start, product)`; not recorded
    pub fn with_layout(self, slots: &[(u32, Uuid)]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for (start, product) in slots {
                let size = self.size_of(*product);
                state.next_slot += 1;
                let id = Uuid::from_u128(0x5107_0000 + state.next_slot);
                state.slots.push(RackLayoutSlot {
                    id,
                    rack_id: rack_id(),
                    hardware_product_id: *product,
                    rack_unit_start: *start,
                    rack_unit_size: size,
                    sku: None,
                    created: None,
                    updated: None,
                });
            }
        }
        self
    }

    /// Make the n-th (0-based) DELETE fail with 500
    pub fn fail_delete_at(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_delete_at = Some(n);
        self
    }

    /// Make the n-th (0-based) POST /layout fail with 500
    pub fn fail_create_at(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_create_at = Some(n);
        self
    }

    /// Make POST /rack/{id}/assignment fail with the given status
    pub fn fail_assignments_with(self, status: u16) -> Self {
        self.state.lock().unwrap().fail_assignments_with = Some(status);
        self
    }

    /// Make the n-th (0-based) GET /rack/{id}/layout fail in transport
    pub fn fail_layout_fetch_at(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_layout_fetch_at = Some(n);
        self
    }

    /// Make the n-th (0-based) GET /rack/{id}/assignment fail in transport
    pub fn fail_assignments_fetch_at(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_assignments_fetch_at = Some(n);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutations(&self) -> usize {
        self.calls().iter().filter(|c| c.is_mutation()).count()
    }

    pub fn product_lookups(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::GetProduct(_)))
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Current `(rack_unit_start, product)` pairs, sorted
    pub fn pairs(&self) -> Vec<(u32, Uuid)> {
        let state = self.state.lock().unwrap();
        let mut pairs: Vec<_> = state
            .slots
            .iter()
            .map(|s| (s.rack_unit_start, s.hardware_product_id))
            .collect();
        pairs.sort();
        pairs
    }

    fn size_of(&self, product: Uuid) -> u32 {
        self.products
            .iter()
            .find(|p| p.id == product)
            .map(|p| p.rack_unit_size)
            .unwrap_or(1)
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl ConchApi for RecordingApi {
    async fn rack_layout(&self, rack_id: Uuid) -> ConchResult<RackLayout> {
        self.record(Call::GetLayout(rack_id));
        let mut state = self.state.lock().unwrap();
        let n = state.layout_fetches;
        state.layout_fetches += 1;
        if state.fail_layout_fetch_at == Some(n) {
            return Err(ConchError::Transport(format!(
                "GET /rack/{}/layout: timed out",
                rack_id
            )));
        }
        Ok(RackLayout(
            state
                .slots
                .iter()
                .filter(|s| s.rack_id == rack_id)
                .cloned()
                .collect(),
        ))
    }

    async fn delete_layout_slot(&self, slot_id: Uuid) -> ConchResult<()> {
        self.record(Call::DeleteSlot(slot_id));
        let mut state = self.state.lock().unwrap();
        let n = state.deletes;
        state.deletes += 1;
        if state.fail_delete_at == Some(n) {
            return Err(http("DELETE", format!("/layout/{}", slot_id), 500, "boom"));
        }
        let before = state.slots.len();
        state.slots.retain(|s| s.id != slot_id);
        if state.slots.len() == before {
            return Err(http("DELETE", format!("/layout/{}", slot_id), 404, "not found"));
        }
        Ok(())
    }

    async fn create_layout_slot(&self, slot: &NewLayoutSlot) -> ConchResult<RackLayoutSlot> {
        self.record(Call::CreateSlot(slot.clone()));
        let path = "/layout".to_string();
        let size = match self.products.iter().find(|p| p.id == slot.hardware_product_id) {
            Some(product) => product.rack_unit_size,
            None => return Err(http("POST", path, 409, "unknown hardware product")),
        };

        let mut state = self.state.lock().unwrap();
        let n = state.creates;
        state.creates += 1;
        if state.fail_create_at == Some(n) {
            return Err(http("POST", path, 500, "boom"));
        }

        let range = RuRange::new(slot.rack_unit_start, size)
            .map_err(|e| http("POST", path.clone(), 400, &e.to_string()))?;
        let overlaps = state
            .slots
            .iter()
            .filter(|s| s.rack_id == slot.rack_id)
            .filter_map(|s| s.range())
            .any(|r| r.overlaps(&range));
        if overlaps {
            return Err(http("POST", path, 409, "rack unit overlap"));
        }

        state.next_slot += 1;
        let created = RackLayoutSlot {
            id: Uuid::from_u128(0x5107_0000 + state.next_slot),
            rack_id: slot.rack_id,
            hardware_product_id: slot.hardware_product_id,
            rack_unit_start: slot.rack_unit_start,
            rack_unit_size: size,
            sku: None,
            created: None,
            updated: None,
        };
        state.slots.push(created.clone());
        Ok(created)
    }

    async fn hardware_product(&self, key: &str) -> ConchResult<HardwareProduct> {
        self.record(Call::GetProduct(key.to_string()));
        self.products
            .iter()
            .find(|p| {
                p.id.to_string() == key
                    || p.name == key
                    || p.alias == key
                    || p.sku.as_deref() == Some(key)
            })
            .cloned()
            .ok_or_else(|| http("GET", format!("/hardware_product/{}", key), 404, "not found"))
    }

    async fn device(&self, key: &str) -> ConchResult<Device> {
        self.record(Call::GetDevice(key.to_string()));
        self.devices
            .iter()
            .find(|d| {
                d.id.to_string() == key
                    || d.serial_number == key
                    || d.asset_tag.as_deref() == Some(key)
            })
            .cloned()
            .ok_or_else(|| http("GET", format!("/device/{}", key), 404, "not found"))
    }

    async fn rack_assignments(&self, rack_id: Uuid) -> ConchResult<RackAssignments> {
        self.record(Call::GetAssignments(rack_id));
        let mut state = self.state.lock().unwrap();
        let n = state.assignments_fetches;
        state.assignments_fetches += 1;
        if state.fail_assignments_fetch_at == Some(n) {
            return Err(ConchError::Transport(format!(
                "GET /rack/{}/assignment: timed out",
                rack_id
            )));
        }
        Ok(RackAssignments(state.assignments.clone()))
    }

    async fn replace_rack_assignments(
        &self,
        rack_id: Uuid,
        assignments: &[AssignmentUpdate],
    ) -> ConchResult<()> {
        self.record(Call::ReplaceAssignments(rack_id, assignments.to_vec()));
        let path = format!("/rack/{}/assignment", rack_id);

        let mut rows = Vec::with_capacity(assignments.len());
        for update in assignments {
            let device = self
                .devices
                .iter()
                .find(|d| d.id == update.device_id)
                .ok_or_else(|| http("POST", path.clone(), 409, "unknown device"))?;
            let product = self
                .products
                .iter()
                .find(|p| p.id == device.hardware_product_id);
            rows.push(RackAssignment {
                device_id: Some(device.id),
                device_serial_number: Some(device.serial_number.clone()),
                device_asset_tag: device.asset_tag.clone(),
                hardware_product_name: product.map(|p| p.name.clone()),
                sku: product.and_then(|p| p.sku.clone()),
                rack_unit_start: update.rack_unit_start,
                rack_unit_size: product.map(|p| p.rack_unit_size).unwrap_or(1),
            });
        }

        let mut state = self.state.lock().unwrap();
        if let Some(status) = state.fail_assignments_with {
            // Partial application the client cannot observe
            if let Some(first) = rows.into_iter().next() {
                state.assignments = vec![first];
            }
            return Err(http("POST", path, status, "internal error"));
        }
        state.assignments = rows;
        Ok(())
    }

    async fn rack(&self, rack_id: Uuid) -> ConchResult<Rack> {
        self.record(Call::Other("rack"));
        Ok(Rack {
            id: rack_id,
            name: "A01".to_string(),
            datacenter_room_id: parse_uuid(ROOM_ID),
            rack_role_id: None,
            serial_number: None,
            asset_tag: None,
            phase: Some("integration".to_string()),
            build_id: None,
            created: None,
            updated: None,
        })
    }

    async fn hardware_products(&self) -> ConchResult<Vec<HardwareProduct>> {
        self.record(Call::Other("hardware_products"));
        Ok(self.products.clone())
    }

    async fn datacenters(&self) -> ConchResult<Vec<Datacenter>> {
        self.record(Call::Other("datacenters"));
        Ok(Vec::new())
    }

    async fn rooms(&self) -> ConchResult<Vec<DatacenterRoom>> {
        self.record(Call::Other("rooms"));
        Ok(Vec::new())
    }

    async fn health(&self) -> ConchResult<()> {
        self.record(Call::Other("health"));
        Ok(())
    }
}
