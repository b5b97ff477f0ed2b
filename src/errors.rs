// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for Conch API and reconciliation operations

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Kind of resource an identifier refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// Hardware product (name, alias, SKU or id)
    HardwareProduct,
    /// Device (id, serial number or asset tag)
    Device,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::HardwareProduct => write!(f, "hardware product"),
            ResourceKind::Device => write!(f, "device"),
        }
    }
}

/// Mutation phase of a layout reconciliation
///
/// Tells the operator what state a rack is likely left in after a failure:
/// a failure in `Delete` leaves some old slots behind, a failure in `Create`
/// means every old slot is gone and only part of the new layout exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePhase {
    /// Removing the rack's existing layout slots
    Delete,
    /// Creating the desired layout slots
    Create,
}

impl fmt::Display for ReconcilePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcilePhase::Delete => write!(f, "delete"),
            ReconcilePhase::Create => write!(f, "create"),
        }
    }
}

/// Errors that can occur talking to Conch or reconciling rack state
#[derive(Debug, Error)]
pub enum ConchError {
    /// An identifier could not be resolved to a UUID
    #[error("{kind} not found: {identifier}")]
    NotFound {
        kind: ResourceKind,
        identifier: String,
    },

    /// A desired-state document failed to parse or is missing required fields
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Overwrite was not requested but the rack already has a layout
    #[error("Rack {rack_id} already has {slots} layout slot(s); pass overwrite to replace them")]
    ExistingLayout { rack_id: Uuid, slots: usize },

    /// A mutating call failed part-way through a layout reconciliation
    #[error(
        "Remote call failed during {phase} phase at {step} ({completed} of {total} completed); \
         rack is partially reconciled: {source}"
    )]
    RemoteCall {
        phase: ReconcilePhase,
        step: String,
        completed: usize,
        total: usize,
        #[source]
        source: Box<ConchError>,
    },

    /// The single assignment replace call failed; final state is unknown
    #[error(
        "Assignment update for rack {rack_id} failed, final state unknown; \
         re-fetch the rack assignments to inspect: {source}"
    )]
    AssignmentUpdateFailed {
        rack_id: Uuid,
        #[source]
        source: Box<ConchError>,
    },

    /// Every mutating call succeeded but reading back the result failed
    #[error(
        "All {mutations} mutating call(s) for rack {rack_id} succeeded but the \
         final re-fetch failed; the update is applied, re-fetch to inspect: {source}"
    )]
    VerifyFailed {
        rack_id: Uuid,
        mutations: usize,
        #[source]
        source: Box<ConchError>,
    },

    /// API returned an error status
    #[error("{method} {path} returned {status}: {body}")]
    Http {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    /// Request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Local I/O error (reading documents, config files)
    #[error("I/O error: {0}")]
    Io(String),
}

impl ConchError {
    /// True when the API answered 404
    pub fn is_not_found_status(&self) -> bool {
        matches!(self, ConchError::Http { status: 404, .. })
    }

    /// True for errors raised before any mutating call was issued
    pub fn is_pre_mutation(&self) -> bool {
        matches!(
            self,
            ConchError::NotFound { .. }
                | ConchError::MalformedInput(_)
                | ConchError::ExistingLayout { .. }
        )
    }
}

/// Result type for Conch operations
pub type ConchResult<T> = Result<T, ConchError>;

impl From<serde_json::Error> for ConchError {
    fn from(err: serde_json::Error) -> Self {
        ConchError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for ConchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ConchError::Decode(err.to_string())
        } else {
            ConchError::Transport(err.to_string())
        }
    }
}

impl From<std::io::Error> for ConchError {
    fn from(err: std::io::Error) -> Self {
        ConchError::Io(err.to_string())
    }
}
