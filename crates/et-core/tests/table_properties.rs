//! Property-based tests for table building and view invariants.

use et_common::{ObservationId, ObservationValue};
use et_core::table::{merge_rows, SourceRow};
use et_core::{
    Axes, Category, CodedTable, Dimension, Error, FixedAssignments, IndexTable, PivotField,
    StatusFlags, TableBuilder, ViewEngine,
};
use et_math::RadixCodec;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;

fn dimension(id: &str, codes: impl IntoIterator<Item = String>) -> Dimension {
    Dimension::new(
        id,
        id,
        codes
            .into_iter()
            .map(|code| Category {
                label: code.clone(),
                code,
            })
            .collect(),
    )
}

/// `sex × time × geo` cube shape plus one optional cell value per id.
fn cube_strategy() -> impl Strategy<Value = (Vec<usize>, Vec<Option<u8>>)> {
    (1usize..=3, 1usize..=4, 1usize..=4).prop_flat_map(|(sex, time, geo)| {
        let cells = sex * time * geo;
        (
            Just(vec![sex, time, geo]),
            prop::collection::vec(prop::option::of(0u8..50), cells),
        )
    })
}

fn build(sizes: &[usize], cells: &[Option<u8>]) -> (Vec<Dimension>, CodedTable, IndexTable) {
    let dims = vec![
        dimension("sex", (0..sizes[0]).map(|i| format!("S{i}"))),
        dimension("time", (0..sizes[1]).map(|i| format!("{}", 2000 + i))),
        dimension("geo", (0..sizes[2]).map(|i| format!("G{i}"))),
    ];
    let values: HashMap<ObservationId, Option<ObservationValue>> = cells
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| {
            cell.map(|v| (ObservationId(i as u64), Some(ObservationValue::Number(f64::from(v)))))
        })
        .collect();
    let (coded, indexed) = TableBuilder::new(&dims, sizes, ObservationValue::text("-"))
        .expect("builder")
        .build(&values, None)
        .expect("build");
    (dims, coded, indexed)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn coded_and_indexed_tables_stay_aligned((sizes, cells) in cube_strategy()) {
        let (dims, coded, indexed) = build(&sizes, &cells);
        let codec = RadixCodec::new(&sizes).expect("codec");
        let present = cells.iter().filter(|c| c.is_some()).count();

        prop_assert_eq!(coded.len(), indexed.len());
        prop_assert_eq!(coded.len(), present);
        prop_assert!(coded.len() as u64 <= codec.cardinality());

        for (c, i) in coded.rows().iter().zip(indexed.rows()) {
            prop_assert_eq!(c.observation, i.observation);
            prop_assert_eq!(&c.value, &i.value);
            prop_assert_eq!(codec.encode(&i.keys).expect("in range"), i.observation.0);
            for ((code, &coord), dim) in c.keys.iter().zip(&i.keys).zip(&dims) {
                prop_assert_eq!(dim.code(coord), Some(code.as_str()));
            }
        }

        let ids: Vec<u64> = coded.rows().iter().map(|r| r.observation.0).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        prop_assert_eq!(ids, sorted);
    }

    #[test]
    fn merged_status_is_union_of_flags(
        flags in prop::collection::vec("[a-z]{0,3}", 1..6),
        value in prop::option::of(0u8..10),
    ) {
        let rows = flags.iter().enumerate().map(|(i, f)| SourceRow {
            observation: ObservationId(10 - i as u64),
            coords: vec![1, 2],
            status: StatusFlags::parse(f),
            value: value.map(|v| ObservationValue::Number(f64::from(v))),
        });
        let merged = merge_rows(rows).expect("same value merges");
        prop_assert_eq!(merged.len(), 1);

        let expected: BTreeSet<char> = flags.iter().flat_map(|f| f.chars()).collect();
        let actual: BTreeSet<char> = merged[0].status.chars().collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(merged[0].observation, ObservationId(11 - flags.len() as u64));
    }

    #[test]
    fn differing_values_at_one_coordinate_conflict(a in 0u8..10, b in 10u8..20) {
        let rows = [a, b].into_iter().enumerate().map(|(i, v)| SourceRow {
            observation: ObservationId(i as u64),
            coords: vec![0, 0],
            status: StatusFlags::default(),
            value: Some(ObservationValue::Number(f64::from(v))),
        });
        let is_conflict = matches!(merge_rows(rows), Err(Error::ConflictingObservation { .. }));
        prop_assert!(is_conflict);
    }

    #[test]
    fn pivot_is_ambiguous_exactly_when_a_cell_is_shared((sizes, cells) in cube_strategy()) {
        let (_, coded, _) = build(&sizes, &cells);
        let mut per_cell: HashMap<(&str, &str), usize> = HashMap::new();
        for row in coded.rows() {
            *per_cell.entry((row.keys[2].as_str(), row.keys[1].as_str())).or_default() += 1;
        }
        let shared = per_cell.values().any(|&n| n > 1);

        let result = ViewEngine::new(&coded, Axes::default()).pivot(&FixedAssignments::new(), PivotField::Value);
        match result {
            Err(Error::AmbiguousPivot { .. }) => prop_assert!(shared),
            Ok(pivot) => {
                prop_assert!(!shared);
                let filled: usize = pivot.cells.iter().map(Vec::len).sum();
                prop_assert_eq!(pivot.rows.len() * pivot.columns.len(), filled);
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }

    #[test]
    fn latest_period_is_latest_meeting_fill_level(
        (sizes, cells) in cube_strategy(),
        fill_level in 0.0f64..=1.0,
    ) {
        let (_, coded, _) = build(&sizes, &cells);
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for row in coded.rows() {
            *counts.entry(row.keys[1].as_str()).or_default() += 1;
        }
        let max = counts.values().copied().max().unwrap_or(0);

        let latest = ViewEngine::new(&coded, Axes::default())
            .latest_period_at_fill_level(fill_level, &FixedAssignments::new())
            .expect("valid level");

        match latest.as_deref() {
            None => {
                let none_qualify = counts.values().all(|&n| (n as f64) / (max as f64) < fill_level);
                prop_assert!(max == 0 || none_qualify);
            }
            Some(period) => {
                prop_assert!(counts[period] as f64 / max as f64 >= fill_level);
                let later = counts.range::<str, _>((Bound::Excluded(period), Bound::Unbounded));
                for (_, &n) in later {
                    prop_assert!((n as f64) / (max as f64) < fill_level);
                }
            }
        }

        // At level zero every period qualifies, so the answer is the last one.
        let at_zero = ViewEngine::new(&coded, Axes::default())
            .latest_period_at_fill_level(0.0, &FixedAssignments::new())
            .expect("valid level");
        prop_assert_eq!(at_zero.as_deref(), counts.keys().next_back().copied());
    }
}
