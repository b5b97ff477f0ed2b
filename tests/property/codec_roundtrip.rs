// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Import/Export Codec

use conch::reconcile::codec::{
    decode_assignments, decode_layout, encode_assignments, encode_layout,
    AssignmentDesiredEntry, RackLayoutDesiredEntry,
};
use conch::reconcile::{DeviceRef, ProductRef};
use proptest::prelude::*;
use uuid::Uuid;

// ============================================================================
// Strategies
// ============================================================================

fn label() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 ._-]{0,15}[A-Za-z0-9]"
}

fn product_ref() -> impl Strategy<Value = ProductRef> {
    prop_oneof![
        any::<u128>().prop_map(|n| ProductRef::Id(Uuid::from_u128(n))),
        label().prop_map(ProductRef::Name),
        label().prop_map(ProductRef::Alias),
        label().prop_map(ProductRef::Sku),
    ]
}

fn device_ref() -> impl Strategy<Value = DeviceRef> {
    prop_oneof![
        any::<u128>().prop_map(|n| DeviceRef::Id(Uuid::from_u128(n))),
        label().prop_map(DeviceRef::Serial),
        label().prop_map(DeviceRef::AssetTag),
    ]
}

fn layout_entries() -> impl Strategy<Value = Vec<RackLayoutDesiredEntry>> {
    prop::collection::vec(
        (1u32..=52, product_ref()).prop_map(|(rack_unit_start, product)| {
            RackLayoutDesiredEntry {
                rack_unit_start,
                product,
            }
        }),
        0..30,
    )
}

fn assignment_entries() -> impl Strategy<Value = Vec<AssignmentDesiredEntry>> {
    prop::collection::vec(
        (1u32..=52, device_ref()).prop_map(|(rack_unit_start, device)| AssignmentDesiredEntry {
            rack_unit_start,
            device,
        }),
        0..30,
    )
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: decoding an encoded layout reproduces it, order included
    #[test]
    fn prop_layout_round_trip(entries in layout_entries()) {
        let raw = encode_layout(&entries).unwrap();
        let decoded = decode_layout(&raw).unwrap();
        prop_assert_eq!(decoded, entries);
    }

    /// Property: decoding encoded assignments reproduces them
    #[test]
    fn prop_assignment_round_trip(entries in assignment_entries()) {
        let raw = encode_assignments(&entries).unwrap();
        let decoded = decode_assignments(&raw).unwrap();
        prop_assert_eq!(decoded, entries);
    }

    /// Property: every encoded layout entry names exactly one product field
    #[test]
    fn prop_layout_entries_have_one_reference(entries in layout_entries()) {
        let raw = encode_layout(&entries).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        for entry in value.as_array().unwrap() {
            let object = entry.as_object().unwrap();
            prop_assert!(object.contains_key("ru_start"));
            prop_assert_eq!(object.len(), 2);
        }
    }

    /// Property: arbitrary bytes never panic the decoder
    #[test]
    fn prop_decode_never_panics(raw in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode_layout(&raw);
        let _ = decode_assignments(&raw);
    }
}
