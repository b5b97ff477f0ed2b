// Copyright (c) 2025 - Cowboy AI, Inc.
//! Layout Reconciler
//!
//! Replaces a rack's entire hardware layout with a desired one. The work is
//! split the same way as a pure projection and its executor:
//!
//! ```text
//! plan()                                apply()
//! ──────                                ───────
//! GET  /rack/{id}/layout                DELETE /layout/{slot}  × current
//! overwrite check                       POST   /layout         × desired
//! resolve every product reference       GET    /rack/{id}/layout
//! plan_layout() (pure)
//! ```
//!
//! Everything in `plan()` is read-only; the first mutating call happens in
//! `apply()`.
//!
//! # Non-atomicity
//!
//! Conch has no multi-row update for layouts, so `apply()` is a sequence of
//! independent calls with no rollback. If a delete fails, some old slots are
//! still present. If a create fails, every old slot is already gone and only
//! the creates before it exist. Either way the failure is reported as
//! [`ConchError::RemoteCall`] naming the phase, the failing step and how many
//! steps completed, and the caller has to re-run or repair the rack by hand.
//! A failure of the final re-fetch, after every mutation succeeded, is
//! [`ConchError::VerifyFailed`].

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::codec::RackLayoutDesiredEntry;
use super::resolver::{IdentifierResolver, ProductRef};
use crate::api::ConchApi;
use crate::domain::{NewLayoutSlot, RackLayout, RackLayoutSlot};
use crate::errors::{ConchError, ConchResult, ReconcilePhase};

/// A desired entry with its product resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSlot {
    pub rack_unit_start: u32,
    pub hardware_product_id: Uuid,
    /// Reference the product was resolved from, for error attribution
    pub reference: ProductRef,
}

/// A slot to create, in creation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedSlot {
    pub slot: NewLayoutSlot,
    pub reference: ProductRef,
}

/// Calls `apply()` will issue, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutPlan {
    pub rack_id: Uuid,
    pub deletes: Vec<RackLayoutSlot>,
    pub creates: Vec<PlannedSlot>,
}

/// Summary of how the desired layout differs from the current one
///
/// Pairs are `(rack_unit_start, hardware_product_id)`. Unchanged slots are
/// still deleted and recreated by `apply()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LayoutDiff {
    pub unchanged: Vec<(u32, Uuid)>,
    pub removed: Vec<(u32, Uuid)>,
    pub added: Vec<(u32, Uuid)>,
}

impl LayoutDiff {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

impl LayoutPlan {
    /// Total number of mutating calls
    pub fn mutations(&self) -> usize {
        self.deletes.len() + self.creates.len()
    }

    /// Compare current and desired `(start, product)` pairs
    pub fn diff(&self) -> LayoutDiff {
        let mut current: Vec<_> = self
            .deletes
            .iter()
            .map(|s| (s.rack_unit_start, s.hardware_product_id))
            .collect();
        let mut desired: Vec<_> = self
            .creates
            .iter()
            .map(|p| (p.slot.rack_unit_start, p.slot.hardware_product_id))
            .collect();
        current.sort();
        desired.sort();

        let mut diff = LayoutDiff::default();
        for pair in &desired {
            if let Some(pos) = current.iter().position(|c| c == pair) {
                current.remove(pos);
                diff.unchanged.push(*pair);
            } else {
                diff.added.push(*pair);
            }
        }
        diff.removed = current;
        diff
    }
}

/// Pure planning step: delete every current slot, then create every
/// desired slot in input order
pub fn plan_layout(rack_id: Uuid, current: &RackLayout, desired: &[ResolvedSlot]) -> LayoutPlan {
    LayoutPlan {
        rack_id,
        deletes: current.slots().to_vec(),
        creates: desired
            .iter()
            .map(|entry| PlannedSlot {
                slot: NewLayoutSlot {
                    rack_id,
                    hardware_product_id: entry.hardware_product_id,
                    rack_unit_start: entry.rack_unit_start,
                },
                reference: entry.reference.clone(),
            })
            .collect(),
    }
}

/// Drives layout replacement for one rack at a time
pub struct LayoutReconciler<'a> {
    api: &'a dyn ConchApi,
}

impl<'a> LayoutReconciler<'a> {
    pub fn new(api: &'a dyn ConchApi) -> Self {
        Self { api }
    }

    /// Read-only phase: fetch, check overwrite, resolve, plan
    ///
    /// Fails with [`ConchError::ExistingLayout`] when the rack has slots and
    /// `overwrite` is false, and with [`ConchError::NotFound`] when any
    /// product reference does not resolve. No mutating call is issued.
    pub async fn plan(
        &self,
        rack_id: Uuid,
        entries: &[RackLayoutDesiredEntry],
        overwrite: bool,
    ) -> ConchResult<LayoutPlan> {
        let current = self.api.rack_layout(rack_id).await?;
        if !current.is_empty() && !overwrite {
            return Err(ConchError::ExistingLayout {
                rack_id,
                slots: current.len(),
            });
        }

        let resolved = self.resolve(entries).await?;
        Ok(plan_layout(rack_id, &current, &resolved))
    }

    /// Resolve every entry with a fresh per-call cache
    pub async fn resolve(
        &self,
        entries: &[RackLayoutDesiredEntry],
    ) -> ConchResult<Vec<ResolvedSlot>> {
        let mut resolver = IdentifierResolver::new(self.api);
        let mut resolved = Vec::with_capacity(entries.len());

        for entry in entries {
            let hardware_product_id = resolver.resolve_product(&entry.product).await?;
            resolved.push(ResolvedSlot {
                rack_unit_start: entry.rack_unit_start,
                hardware_product_id,
                reference: entry.product.clone(),
            });
        }

        debug!(
            "Resolved {} layout entries with {} lookups",
            resolved.len(),
            resolver.lookups()
        );
        Ok(resolved)
    }

    /// Destructive phase: delete all, create all, re-fetch
    ///
    /// Not atomic; see the module documentation.
    pub async fn apply(&self, plan: LayoutPlan) -> ConchResult<RackLayout> {
        let rack_id = plan.rack_id;
        info!(
            "Replacing layout of rack {}: {} deletes, {} creates",
            rack_id,
            plan.deletes.len(),
            plan.creates.len()
        );

        let total = plan.deletes.len();
        for (completed, slot) in plan.deletes.iter().enumerate() {
            if let Err(e) = self.api.delete_layout_slot(slot.id).await {
                warn!(
                    "Layout delete failed for rack {} after {} of {} deletes",
                    rack_id, completed, total
                );
                return Err(ConchError::RemoteCall {
                    phase: ReconcilePhase::Delete,
                    step: format!("slot {} at rack unit {}", slot.id, slot.rack_unit_start),
                    completed,
                    total,
                    source: Box::new(e),
                });
            }
            debug!("Deleted slot {} at rack unit {}", slot.id, slot.rack_unit_start);
        }

        let total = plan.creates.len();
        for (completed, planned) in plan.creates.iter().enumerate() {
            match self.api.create_layout_slot(&planned.slot).await {
                Ok(created) => debug!(
                    "Created slot {} at rack unit {}",
                    created.id, created.rack_unit_start
                ),
                Err(e) => {
                    warn!(
                        "Layout create failed for rack {} after {} of {} creates; \
                         the previous layout is already deleted",
                        rack_id, completed, total
                    );
                    return Err(ConchError::RemoteCall {
                        phase: ReconcilePhase::Create,
                        step: format!(
                            "rack unit {} ({})",
                            planned.slot.rack_unit_start, planned.reference
                        ),
                        completed,
                        total,
                        source: Box::new(e),
                    });
                }
            }
        }

        let layout = match self.api.rack_layout(rack_id).await {
            Ok(layout) => layout,
            Err(e) => {
                warn!(
                    "Layout of rack {} was replaced but could not be re-fetched",
                    rack_id
                );
                return Err(ConchError::VerifyFailed {
                    rack_id,
                    mutations: plan.mutations(),
                    source: Box::new(e),
                });
            }
        };
        info!("Rack {} now has {} layout slots", rack_id, layout.len());
        Ok(layout.into_display_order())
    }

    /// Plan then apply
    pub async fn import(
        &self,
        rack_id: Uuid,
        entries: &[RackLayoutDesiredEntry],
        overwrite: bool,
    ) -> ConchResult<RackLayout> {
        let plan = self.plan(rack_id, entries, overwrite).await?;
        self.apply(plan).await
    }
}
