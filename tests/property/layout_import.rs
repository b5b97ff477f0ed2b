// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Layout Import
//!
//! For any non-overlapping desired layout, importing it leaves the rack with
//! exactly the desired `(rack_unit_start, product)` pairs, whatever the
//! input order and whatever the rack held before.

use conch::reconcile::{self, codec, ProductRef, RackLayoutDesiredEntry};
use proptest::prelude::*;
use uuid::Uuid;

use crate::fixtures::{catalogue, RecordingApi};

/// A product reference in any of its four forms
fn reference(product: usize, form: usize) -> ProductRef {
    let product = &catalogue()[product];
    match form {
        0 => ProductRef::Id(product.id),
        1 => ProductRef::Name(product.name.clone()),
        2 => ProductRef::Alias(product.alias.clone()),
        _ => ProductRef::Sku(product.sku.clone().unwrap_or_default()),
    }
}

/// Non-overlapping layouts, stacked bottom-up with random gaps, then shuffled
fn desired_layout() -> impl Strategy<Value = Vec<(RackLayoutDesiredEntry, Uuid)>> {
    prop::collection::vec((0u32..3, 0usize..3, 0usize..4), 0..12)
        .prop_map(|specs| {
            let products = catalogue();
            let mut next = 1u32;
            specs
                .into_iter()
                .map(|(gap, product, form)| {
                    let start = next + gap;
                    next = start + products[product].rack_unit_size;
                    (
                        RackLayoutDesiredEntry {
                            rack_unit_start: start,
                            product: reference(product, form),
                        },
                        products[product].id,
                    )
                })
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

fn expected_pairs(desired: &[(RackLayoutDesiredEntry, Uuid)]) -> Vec<(u32, Uuid)> {
    let mut pairs: Vec<_> = desired
        .iter()
        .map(|(entry, id)| (entry.rack_unit_start, *id))
        .collect();
    pairs.sort();
    pairs
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: import then get yields exactly the desired pairs
    #[test]
    fn prop_import_matches_desired(
        desired in desired_layout(),
        existing in desired_layout(),
    ) {
        let seed: Vec<_> = existing
            .iter()
            .map(|(entry, id)| (entry.rack_unit_start, *id))
            .collect();
        let api = RecordingApi::new().with_layout(&seed);
        let entries: Vec<_> = desired.iter().map(|(entry, _)| entry.clone()).collect();
        let raw = codec::encode_layout(&entries).unwrap();

        let layout = tokio_test::block_on(
            reconcile::import_layout(&api, crate::fixtures::rack_id(), &raw, true),
        )
        .unwrap();

        prop_assert_eq!(layout.pairs(), expected_pairs(&desired));
        prop_assert_eq!(api.pairs(), expected_pairs(&desired));
    }

    /// Property: importing the same layout twice gives the same pairs
    #[test]
    fn prop_import_is_idempotent(desired in desired_layout()) {
        let api = RecordingApi::new();
        let entries: Vec<_> = desired.iter().map(|(entry, _)| entry.clone()).collect();
        let raw = codec::encode_layout(&entries).unwrap();
        let rack_id = crate::fixtures::rack_id();

        let first = tokio_test::block_on(reconcile::import_layout(&api, rack_id, &raw, true))
            .unwrap();
        let second = tokio_test::block_on(reconcile::import_layout(&api, rack_id, &raw, true))
            .unwrap();

        prop_assert_eq!(first.pairs(), second.pairs());
    }

    /// Property: each distinct human reference is looked up once per import
    #[test]
    fn prop_one_lookup_per_distinct_reference(desired in desired_layout()) {
        let api = RecordingApi::new();
        let entries: Vec<_> = desired.iter().map(|(entry, _)| entry.clone()).collect();
        let raw = codec::encode_layout(&entries).unwrap();

        tokio_test::block_on(
            reconcile::import_layout(&api, crate::fixtures::rack_id(), &raw, true),
        )
        .unwrap();

        let mut distinct: Vec<_> = entries
            .iter()
            .filter(|e| !matches!(e.product, ProductRef::Id(_)))
            .map(|e| e.product.to_string())
            .collect();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(api.product_lookups(), distinct.len());
    }
}

proptest! {
    /// Property: the pure plan deletes every current slot and creates every
    /// desired slot in input order
    #[test]
    fn prop_plan_covers_current_and_desired(
        desired in desired_layout(),
        existing in desired_layout(),
    ) {
        use conch::domain::{RackLayout, RackLayoutSlot};
        use conch::reconcile::layout::{plan_layout, ResolvedSlot};

        let rack_id = crate::fixtures::rack_id();
        let current = RackLayout(
            existing
                .iter()
                .enumerate()
                .map(|(n, (entry, id))| RackLayoutSlot {
                    id: Uuid::from_u128(n as u128 + 1),
                    rack_id,
                    hardware_product_id: *id,
                    rack_unit_start: entry.rack_unit_start,
                    rack_unit_size: 1,
                    sku: None,
                    created: None,
                    updated: None,
                })
                .collect(),
        );
        let resolved: Vec<_> = desired
            .iter()
            .map(|(entry, id)| ResolvedSlot {
                rack_unit_start: entry.rack_unit_start,
                hardware_product_id: *id,
                reference: entry.product.clone(),
            })
            .collect();

        let plan = plan_layout(rack_id, &current, &resolved);

        prop_assert_eq!(plan.deletes.len(), current.len());
        prop_assert_eq!(plan.mutations(), current.len() + resolved.len());
        let order: Vec<_> = plan.creates.iter().map(|p| p.slot.rack_unit_start).collect();
        let expected: Vec<_> = resolved.iter().map(|r| r.rack_unit_start).collect();
        prop_assert_eq!(order, expected);
    }
}
