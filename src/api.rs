// Copyright (c) 2025 - Cowboy AI, Inc.
//! Conch API surface consumed by the reconcilers
//!
//! [`ConchApi`] is the seam between the reconciliation core and the HTTP
//! transport. [`ConchClient`] implements it against a live server; tests
//! implement it in memory.
//!
//! | Operation                   | Call                              |
//! |-----------------------------|-----------------------------------|
//! | `rack_layout`               | `GET /rack/{id}/layout`           |
//! | `delete_layout_slot`        | `DELETE /layout/{slot_id}` (204)  |
//! | `create_layout_slot`        | `POST /layout`                    |
//! | `hardware_product`          | `GET /hardware_product/{key}`     |
//! | `device`                    | `GET /device/{key}`               |
//! | `rack_assignments`          | `GET /rack/{id}/assignment`       |
//! | `replace_rack_assignments`  | `POST /rack/{id}/assignment`      |

use async_trait::async_trait;
use reqwest::StatusCode;
use uuid::Uuid;

use crate::client::ConchClient;
use crate::domain::{
    AssignmentUpdate, Datacenter, DatacenterRoom, Device, HardwareProduct, NewLayoutSlot, Rack,
    RackAssignments, RackLayout, RackLayoutSlot,
};
use crate::errors::{ConchError, ConchResult};

/// Conch API operations
#[async_trait]
pub trait ConchApi: Send + Sync {
    /// Current layout slots of a rack
    async fn rack_layout(&self, rack_id: Uuid) -> ConchResult<RackLayout>;

    /// Delete one layout slot
    async fn delete_layout_slot(&self, slot_id: Uuid) -> ConchResult<()>;

    /// Create one layout slot
    async fn create_layout_slot(&self, slot: &NewLayoutSlot) -> ConchResult<RackLayoutSlot>;

    /// Fetch a hardware product by id, name, alias or SKU
    async fn hardware_product(&self, key: &str) -> ConchResult<HardwareProduct>;

    /// Fetch a device by id, serial number or asset tag
    async fn device(&self, key: &str) -> ConchResult<Device>;

    /// Current device assignments of a rack
    async fn rack_assignments(&self, rack_id: Uuid) -> ConchResult<RackAssignments>;

    /// Replace a rack's device assignments in one call
    async fn replace_rack_assignments(
        &self,
        rack_id: Uuid,
        assignments: &[AssignmentUpdate],
    ) -> ConchResult<()>;

    /// Fetch one rack
    async fn rack(&self, rack_id: Uuid) -> ConchResult<Rack>;

    /// List every hardware product
    async fn hardware_products(&self) -> ConchResult<Vec<HardwareProduct>>;

    /// List every datacenter
    async fn datacenters(&self) -> ConchResult<Vec<Datacenter>>;

    /// List every datacenter room
    async fn rooms(&self) -> ConchResult<Vec<DatacenterRoom>>;

    /// Verify the API is reachable
    async fn health(&self) -> ConchResult<()>;
}

#[derive(serde::Deserialize)]
struct Ping {
    status: String,
}

#[async_trait]
impl ConchApi for ConchClient {
    async fn rack_layout(&self, rack_id: Uuid) -> ConchResult<RackLayout> {
        self.path()
            .segment("rack")
            .segment(rack_id)
            .segment("layout")
            .get()
            .await
    }

    async fn delete_layout_slot(&self, slot_id: Uuid) -> ConchResult<()> {
        let request = self.path().segment("layout").segment(slot_id);
        let path = request.path();
        let status = request.delete().await?;
        if status != StatusCode::NO_CONTENT {
            return Err(ConchError::Http {
                method: "DELETE".to_string(),
                path,
                status: status.as_u16(),
                body: "expected 204 No Content".to_string(),
            });
        }
        Ok(())
    }

    async fn create_layout_slot(&self, slot: &NewLayoutSlot) -> ConchResult<RackLayoutSlot> {
        self.path().segment("layout").post(slot).await
    }

    async fn hardware_product(&self, key: &str) -> ConchResult<HardwareProduct> {
        self.path().segment("hardware_product").segment(key).get().await
    }

    async fn device(&self, key: &str) -> ConchResult<Device> {
        self.path().segment("device").segment(key).get().await
    }

    async fn rack_assignments(&self, rack_id: Uuid) -> ConchResult<RackAssignments> {
        self.path()
            .segment("rack")
            .segment(rack_id)
            .segment("assignment")
            .get()
            .await
    }

    async fn replace_rack_assignments(
        &self,
        rack_id: Uuid,
        assignments: &[AssignmentUpdate],
    ) -> ConchResult<()> {
        self.path()
            .segment("rack")
            .segment(rack_id)
            .segment("assignment")
            .post_no_content(assignments)
            .await
    }

    async fn rack(&self, rack_id: Uuid) -> ConchResult<Rack> {
        self.path().segment("rack").segment(rack_id).get().await
    }

    async fn hardware_products(&self) -> ConchResult<Vec<HardwareProduct>> {
        self.path().segment("hardware_product").get().await
    }

    async fn datacenters(&self) -> ConchResult<Vec<Datacenter>> {
        self.path().segment("dc").get().await
    }

    async fn rooms(&self) -> ConchResult<Vec<DatacenterRoom>> {
        self.path().segment("room").get().await
    }

    async fn health(&self) -> ConchResult<()> {
        let ping: Ping = self.path().segment("ping").get().await?;
        if ping.status == "ok" {
            Ok(())
        } else {
            Err(ConchError::Transport(format!(
                "Conch health check returned status: {}",
                ping.status
            )))
        }
    }
}
