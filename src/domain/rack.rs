// Copyright (c) 2025 - Cowboy AI, Inc.
//! Racks, layout slots and device assignments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Rack unit validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RackUnitError {
    #[error("Rack unit start must be at least 1: {0}")]
    InvalidStart(u32),

    #[error("Rack unit size must be at least 1: {0}")]
    InvalidSize(u32),
}

/// Contiguous run of rack units occupied by one slot or device
///
/// Covers `[start, start + size)`. Rack units are 1-based.
///
/// # Examples
///
/// ```rust
/// use conch::domain::RuRange;
///
/// let a = RuRange::new(1, 2).unwrap();
/// let b = RuRange::new(2, 1).unwrap();
/// assert!(a.overlaps(&b));
/// assert_eq!(a.end(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuRange {
    start: u32,
    size: u32,
}

impl RuRange {
    /// Create a range with validation
    ///
    /// # Invariants
    /// - start ≥ 1
    /// - size ≥ 1
    pub fn new(start: u32, size: u32) -> Result<Self, RackUnitError> {
        if start == 0 {
            return Err(RackUnitError::InvalidStart(start));
        }
        if size == 0 {
            return Err(RackUnitError::InvalidSize(size));
        }
        Ok(Self { start, size })
    }

    /// First occupied rack unit
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Number of occupied rack units
    pub fn size(&self) -> u32 {
        self.size
    }

    /// First rack unit past the range
    pub fn end(&self) -> u32 {
        self.start.saturating_add(self.size)
    }

    /// True when the two ranges share at least one rack unit
    pub fn overlaps(&self, other: &RuRange) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

impl fmt::Display for RuRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.size == 1 {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end() - 1)
        }
    }
}

/// Rack record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rack {
    pub id: Uuid,
    pub name: String,
    pub datacenter_room_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rack_role_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

/// One rack-unit range occupied by a hardware product within one rack
///
/// Slots are never edited in place. A changed layout is always a delete of
/// the old slot followed by a create of the new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackLayoutSlot {
    pub id: Uuid,
    pub rack_id: Uuid,
    pub hardware_product_id: Uuid,
    pub rack_unit_start: u32,
    pub rack_unit_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl RackLayoutSlot {
    /// Occupied range, if the record carries sane unit numbers
    pub fn range(&self) -> Option<RuRange> {
        RuRange::new(self.rack_unit_start, self.rack_unit_size).ok()
    }
}

/// Body of `POST /layout`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLayoutSlot {
    pub rack_id: Uuid,
    pub hardware_product_id: Uuid,
    pub rack_unit_start: u32,
}

/// A rack's layout slots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RackLayout(pub Vec<RackLayoutSlot>);

impl RackLayout {
    /// Sort for display: descending rack-unit start, ties broken by slot id
    pub fn sort_for_display(&mut self) {
        self.0.sort_by(|a, b| {
            b.rack_unit_start
                .cmp(&a.rack_unit_start)
                .then_with(|| a.id.to_string().cmp(&b.id.to_string()))
        });
    }

    /// Consume and return a display-sorted layout
    pub fn into_display_order(mut self) -> Self {
        self.sort_for_display();
        self
    }

    pub fn slots(&self) -> &[RackLayoutSlot] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(rack_unit_start, hardware_product_id)` pairs, sorted by start
    pub fn pairs(&self) -> Vec<(u32, Uuid)> {
        let mut pairs: Vec<_> = self
            .0
            .iter()
            .map(|slot| (slot.rack_unit_start, slot.hardware_product_id))
            .collect();
        pairs.sort();
        pairs
    }

    /// Every pair of slots whose rack-unit ranges overlap
    ///
    /// Informational only. Conch enforces non-overlap itself and the
    /// reconcilers never block submission on this.
    pub fn overlaps(&self) -> Vec<(&RackLayoutSlot, &RackLayoutSlot)> {
        let mut found = Vec::new();
        for (i, a) in self.0.iter().enumerate() {
            for b in &self.0[i + 1..] {
                if let (Some(ra), Some(rb)) = (a.range(), b.range()) {
                    if ra.overlaps(&rb) {
                        found.push((a, b));
                    }
                }
            }
        }
        found
    }
}

/// One device occupying one or more rack units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackAssignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_asset_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub rack_unit_start: u32,
    #[serde(default)]
    pub rack_unit_size: u32,
}

/// One entry of the `POST /rack/{id}/assignment` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentUpdate {
    pub device_id: Uuid,
    pub rack_unit_start: u32,
}

/// A rack's device assignments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RackAssignments(pub Vec<RackAssignment>);

impl RackAssignments {
    /// Sort for display: descending rack-unit start
    pub fn sort_for_display(&mut self) {
        self.0.sort_by(|a, b| {
            b.rack_unit_start
                .cmp(&a.rack_unit_start)
                .then_with(|| a.device_id.cmp(&b.device_id))
        });
    }

    pub fn into_display_order(mut self) -> Self {
        self.sort_for_display();
        self
    }

    pub fn assignments(&self) -> &[RackAssignment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
