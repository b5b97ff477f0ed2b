// Copyright (c) 2025 - Cowboy AI, Inc.
//! Identifier Resolver
//!
//! Maps a human-facing identifier for a hardware product or device to its
//! backend UUID. Every reference is tagged with the field it names, so each
//! resolution is exactly one lookup with one acceptance rule:
//!
//! | Reference             | Network call                  | Accepted when             |
//! |-----------------------|-------------------------------|---------------------------|
//! | `ProductRef::Id`      | none                          | always                    |
//! | `ProductRef::Name`    | `GET /hardware_product/{v}`   | `product.name == v`       |
//! | `ProductRef::Alias`   | `GET /hardware_product/{v}`   | `product.alias == v`      |
//! | `ProductRef::Sku`     | `GET /hardware_product/{v}`   | `product.sku == v`        |
//! | `DeviceRef::Id`       | none                          | always                    |
//! | `DeviceRef::Serial`   | `GET /device/{v}`             | `device.serial_number == v` |
//! | `DeviceRef::AssetTag` | `GET /device/{v}`             | `device.asset_tag == v`   |
//!
//! A record that comes back but does not carry the value in the tagged field
//! is treated as not found; the resolver never falls through to another
//! field. The error names the record that answered so the caller can switch
//! to an explicit id.
//!
//! Successful resolutions are cached for the lifetime of one
//! [`IdentifierResolver`]. Reconcilers build a fresh resolver for every
//! top-level call so a name deleted and recreated between runs is never
//! served stale.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;
use uuid::Uuid;

use crate::api::ConchApi;
use crate::errors::{ConchError, ConchResult, ResourceKind};

/// Field an identifier was supplied in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupField {
    Id,
    Name,
    Alias,
    Sku,
    Serial,
    AssetTag,
}

impl fmt::Display for LookupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LookupField::Id => "id",
            LookupField::Name => "name",
            LookupField::Alias => "alias",
            LookupField::Sku => "sku",
            LookupField::Serial => "serial",
            LookupField::AssetTag => "asset tag",
        };
        f.write_str(label)
    }
}

/// Reference to a hardware product
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductRef {
    Id(Uuid),
    Name(String),
    Alias(String),
    Sku(String),
}

impl ProductRef {
    pub fn field(&self) -> LookupField {
        match self {
            ProductRef::Id(_) => LookupField::Id,
            ProductRef::Name(_) => LookupField::Name,
            ProductRef::Alias(_) => LookupField::Alias,
            ProductRef::Sku(_) => LookupField::Sku,
        }
    }

    /// Raw identifier string as supplied
    pub fn value(&self) -> String {
        match self {
            ProductRef::Id(id) => id.to_string(),
            ProductRef::Name(v) | ProductRef::Alias(v) | ProductRef::Sku(v) => v.clone(),
        }
    }
}

impl fmt::Display for ProductRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field(), self.value())
    }
}

/// Reference to a device
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceRef {
    Id(Uuid),
    Serial(String),
    AssetTag(String),
}

impl DeviceRef {
    pub fn field(&self) -> LookupField {
        match self {
            DeviceRef::Id(_) => LookupField::Id,
            DeviceRef::Serial(_) => LookupField::Serial,
            DeviceRef::AssetTag(_) => LookupField::AssetTag,
        }
    }

    pub fn value(&self) -> String {
        match self {
            DeviceRef::Id(id) => id.to_string(),
            DeviceRef::Serial(v) | DeviceRef::AssetTag(v) => v.clone(),
        }
    }
}

impl fmt::Display for DeviceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field(), self.value())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    kind: ResourceKind,
    field: LookupField,
    value: String,
}

/// Per-call identifier resolver with a memoizing cache
pub struct IdentifierResolver<'a> {
    api: &'a dyn ConchApi,
    cache: HashMap<CacheKey, Uuid>,
    lookups: usize,
}

impl<'a> IdentifierResolver<'a> {
    /// Create a resolver with an empty cache
    pub fn new(api: &'a dyn ConchApi) -> Self {
        Self {
            api,
            cache: HashMap::new(),
            lookups: 0,
        }
    }

    /// Number of network lookups issued so far
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    /// Number of cached resolutions
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Resolve a hardware product reference to its UUID
    pub async fn resolve_product(&mut self, reference: &ProductRef) -> ConchResult<Uuid> {
        let value = match reference {
            ProductRef::Id(id) => return Ok(*id),
            ProductRef::Name(v) | ProductRef::Alias(v) | ProductRef::Sku(v) => v,
        };

        let key = CacheKey {
            kind: ResourceKind::HardwareProduct,
            field: reference.field(),
            value: value.clone(),
        };
        if let Some(id) = self.cache.get(&key) {
            debug!("Resolved {} from cache", reference);
            return Ok(*id);
        }

        self.lookups += 1;
        let product = match self.api.hardware_product(value).await {
            Ok(product) => product,
            Err(e) if e.is_not_found_status() => return Err(not_found(&key)),
            Err(e) => return Err(e),
        };

        let matches = match reference {
            ProductRef::Name(v) => &product.name == v,
            ProductRef::Alias(v) => &product.alias == v,
            ProductRef::Sku(v) => product.sku.as_deref() == Some(v.as_str()),
            ProductRef::Id(_) => true,
        };
        if !matches {
            debug!(
                "Lookup for {} returned product {} without a matching {}",
                reference, product.id, key.field
            );
            return Err(collision(
                &key,
                format!(
                    "product {} (name {:?}, alias {:?}); use product_id to select a product",
                    product.id, product.name, product.alias
                ),
            ));
        }

        debug!("Resolved {} to {}", reference, product.id);
        self.cache.insert(key, product.id);
        Ok(product.id)
    }

    /// Resolve a device reference to its UUID
    pub async fn resolve_device(&mut self, reference: &DeviceRef) -> ConchResult<Uuid> {
        let value = match reference {
            DeviceRef::Id(id) => return Ok(*id),
            DeviceRef::Serial(v) | DeviceRef::AssetTag(v) => v,
        };

        let key = CacheKey {
            kind: ResourceKind::Device,
            field: reference.field(),
            value: value.clone(),
        };
        if let Some(id) = self.cache.get(&key) {
            debug!("Resolved {} from cache", reference);
            return Ok(*id);
        }

        self.lookups += 1;
        let device = match self.api.device(value).await {
            Ok(device) => device,
            Err(e) if e.is_not_found_status() => return Err(not_found(&key)),
            Err(e) => return Err(e),
        };

        let matches = match reference {
            DeviceRef::Serial(v) => &device.serial_number == v,
            DeviceRef::AssetTag(v) => device.asset_tag.as_deref() == Some(v.as_str()),
            DeviceRef::Id(_) => true,
        };
        if !matches {
            debug!(
                "Lookup for {} returned device {} without a matching {}",
                reference, device.id, key.field
            );
            return Err(collision(
                &key,
                format!(
                    "device {} (serial {:?}); use device_id to select a device",
                    device.id, device.serial_number
                ),
            ));
        }

        debug!("Resolved {} to {}", reference, device.id);
        self.cache.insert(key, device.id);
        Ok(device.id)
    }
}

fn not_found(key: &CacheKey) -> ConchError {
    ConchError::NotFound {
        kind: key.kind,
        identifier: format!("{} {}", key.field, key.value),
    }
}

/// Not found, naming the record the shared lookup endpoint answered with
fn collision(key: &CacheKey, answered: String) -> ConchError {
    ConchError::NotFound {
        kind: key.kind,
        identifier: format!(
            "{} {}; lookup matched {} on another field",
            key.field, key.value, answered
        ),
    }
}
