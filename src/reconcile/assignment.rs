// Copyright (c) 2025 - Cowboy AI, Inc.
//! Assignment Reconciler
//!
//! Replaces a rack's device-to-rack-unit assignments. Unlike layouts the
//! replacement is a single `POST /rack/{id}/assignment` carrying the full
//! desired set, but the client still cannot tell a fully applied update from
//! a partially applied one. Any failure of that call is reported as
//! [`ConchError::AssignmentUpdateFailed`] and is never retried; the caller
//! re-fetches with [`ConchApi::rack_assignments`] to see what happened.

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::codec::AssignmentDesiredEntry;
use super::resolver::IdentifierResolver;
use crate::api::ConchApi;
use crate::domain::{AssignmentUpdate, RackAssignments};
use crate::errors::{ConchError, ConchResult};

pub struct AssignmentReconciler<'a> {
    api: &'a dyn ConchApi,
}

impl<'a> AssignmentReconciler<'a> {
    pub fn new(api: &'a dyn ConchApi) -> Self {
        Self { api }
    }

    /// Resolve every device reference with a fresh per-call cache
    pub async fn resolve(
        &self,
        entries: &[AssignmentDesiredEntry],
    ) -> ConchResult<Vec<AssignmentUpdate>> {
        let mut resolver = IdentifierResolver::new(self.api);
        let mut updates = Vec::with_capacity(entries.len());

        for entry in entries {
            let device_id = resolver.resolve_device(&entry.device).await?;
            updates.push(AssignmentUpdate {
                device_id,
                rack_unit_start: entry.rack_unit_start,
            });
        }

        debug!(
            "Resolved {} assignment entries with {} lookups",
            updates.len(),
            resolver.lookups()
        );
        Ok(updates)
    }

    /// Resolve, replace, re-fetch
    pub async fn import(
        &self,
        rack_id: Uuid,
        entries: &[AssignmentDesiredEntry],
    ) -> ConchResult<RackAssignments> {
        let updates = self.resolve(entries).await?;

        info!(
            "Replacing assignments of rack {} with {} entries",
            rack_id,
            updates.len()
        );
        if let Err(e) = self.api.replace_rack_assignments(rack_id, &updates).await {
            warn!("Assignment update for rack {} failed: {}", rack_id, e);
            return Err(ConchError::AssignmentUpdateFailed {
                rack_id,
                source: Box::new(e),
            });
        }

        let assignments = match self.api.rack_assignments(rack_id).await {
            Ok(assignments) => assignments,
            Err(e) => {
                warn!(
                    "Assignments of rack {} were replaced but could not be re-fetched",
                    rack_id
                );
                return Err(ConchError::VerifyFailed {
                    rack_id,
                    mutations: 1,
                    source: Box::new(e),
                });
            }
        };
        Ok(assignments.into_display_order())
    }
}
