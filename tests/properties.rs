//! Property tests over randomly generated record sets: filter pass-through,
//! name search, null handling and top-N selection.

use std::collections::BTreeSet;

use ctscan_dashboard::data::filter::{self, FilterSet};
use ctscan_dashboard::data::model::{CellValue, Record, RecordSet};
use ctscan_dashboard::report::{
    build_report, catalog, ReportDefinition, ReportKind, ReportOutput, ReportWarning, SummaryTable,
};
use proptest::prelude::*;

const CASES: u32 = 128;

const COLUMNS: [&str; 8] = [
    "NAME",
    "Gender",
    "Age Group",
    "Month",
    "bil_ctscan",
    "kodsebabkeluar",
    "admitward",
    "PDx",
];

const GENDERS: [&str; 2] = ["M", "F"];
const AGE_GROUPS: [&str; 3] = ["Paediatric", "Adult", "Elderly"];
const STATUSES: [&str; 3] = ["ADMIT", "HOME", "AOR"];
const WARDS: [&str; 4] = ["Ward 1", "Ward 2", "ICU", "CCU"];
const DIAGNOSES: [&str; 6] = ["Stroke", "Fall", "Trauma", "Renal colic", "Headache", "Seizure"];

fn arb_choice(values: &'static [&'static str]) -> impl Strategy<Value = CellValue> {
    prop_oneof![
        1 => Just(CellValue::Null),
        4 => prop::sample::select(values).prop_map(CellValue::from),
    ]
}

fn arb_name() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        1 => Just(CellValue::Null),
        4 => "[A-Za-z]{1,8}( [A-Za-z]{1,8}){0,2}".prop_map(CellValue::String),
    ]
}

/// Months as the loader can hand them over: whole numbers, floats or text.
fn arb_month() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::Null),
        (1i64..=12).prop_map(CellValue::Integer),
        (1i64..=12).prop_map(|m| CellValue::Float(m as f64)),
        (1i64..=12).prop_map(|m| CellValue::String(m.to_string())),
    ]
}

/// Scan counts mix integers with the occasional fractional cell.
fn arb_scan_count() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::Null),
        (0i64..6).prop_map(CellValue::Integer),
        (0i64..6).prop_map(|n| CellValue::Float(n as f64 + 0.5)),
    ]
}

fn arb_record() -> impl Strategy<Value = Record> {
    (
        arb_name(),
        arb_choice(&GENDERS),
        arb_choice(&AGE_GROUPS),
        arb_month(),
        arb_scan_count(),
        arb_choice(&STATUSES),
        arb_choice(&WARDS),
        arb_choice(&DIAGNOSES),
    )
        .prop_map(|(name, gender, age, month, scans, status, ward, pdx)| {
            vec![name, gender, age, month, scans, status, ward, pdx]
        })
}

fn arb_records() -> impl Strategy<Value = RecordSet> {
    prop::collection::vec(arb_record(), 0..60).prop_map(|rows| {
        RecordSet::new(COLUMNS.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    })
}

fn arb_selection(values: &'static [&'static str]) -> impl Strategy<Value = BTreeSet<CellValue>> {
    prop::collection::btree_set(prop::sample::select(values).prop_map(CellValue::from), 0..=values.len())
}

fn arb_filters() -> impl Strategy<Value = FilterSet> {
    (
        prop_oneof![Just(String::new()), "[a-zA-Z]{1,3}"],
        arb_selection(&GENDERS),
        arb_selection(&AGE_GROUPS),
        prop::collection::btree_set(1i64..=12, 0..4),
    )
        .prop_map(|(name_search, gender, age_group, month)| FilterSet {
            name_search,
            gender,
            age_group,
            month,
        })
}

fn definition(id: &str, top_n: usize) -> ReportDefinition {
    catalog(top_n).into_iter().find(|d| d.id == id).unwrap()
}

fn run_table(records: &RecordSet, def: &ReportDefinition) -> Result<SummaryTable, ReportWarning> {
    build_report(records, records, def).map(|out| match out {
        ReportOutput::Table(t) => t,
        other => panic!("{}: expected a table, got {other:?}", def.id),
    })
}

fn column<'a>(records: &'a RecordSet, record: &'a Record, name: &str) -> &'a CellValue {
    records.value(record, name).unwrap()
}

fn rows_with_status<'a>(records: &'a RecordSet, status: &str) -> Vec<&'a Record> {
    let wanted = CellValue::from(status);
    records
        .records()
        .iter()
        .filter(|rec| *column(records, rec, "kodsebabkeluar") == wanted)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: CASES,
        .. ProptestConfig::default()
    })]

    #[test]
    fn empty_filters_pass_every_record(records in arb_records()) {
        let filtered = filter::apply(&records, &FilterSet::default()).unwrap();
        prop_assert_eq!(&filtered, &records);
        let indices = filter::filtered_indices(&records, &FilterSet::default()).unwrap();
        prop_assert_eq!(indices, (0..records.len()).collect::<Vec<_>>());
    }

    #[test]
    fn name_search_keeps_exactly_the_matching_names(records in arb_records(), needle in "[a-zA-Z]{1,3}") {
        let filters = FilterSet { name_search: needle.clone(), ..FilterSet::default() };
        let kept: BTreeSet<usize> = filter::filtered_indices(&records, &filters).unwrap().into_iter().collect();
        let needle = needle.to_lowercase();
        for (i, rec) in records.records().iter().enumerate() {
            let matches = match column(&records, rec, "NAME") {
                CellValue::Null => false,
                name => name.to_string().to_lowercase().contains(&needle),
            };
            prop_assert_eq!(kept.contains(&i), matches, "record {} {:?}", i, rec);
        }
    }

    #[test]
    fn filters_are_a_conjunction_in_input_order(records in arb_records(), filters in arb_filters()) {
        let indices = filter::filtered_indices(&records, &filters).unwrap();
        prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));

        let needle = filters.name_search.to_lowercase();
        let expected: Vec<usize> = records
            .records()
            .iter()
            .enumerate()
            .filter(|(_, rec)| {
                let name = column(&records, rec, "NAME");
                let gender = column(&records, rec, "Gender");
                let age = column(&records, rec, "Age Group");
                let month = column(&records, rec, "Month").as_i64();
                (needle.is_empty() || (!name.is_null() && name.to_string().to_lowercase().contains(&needle)))
                    && (filters.gender.is_empty() || filters.gender.contains(gender))
                    && (filters.age_group.is_empty() || filters.age_group.contains(age))
                    && (filters.month.is_empty() || month.is_some_and(|m| filters.month.contains(&m)))
            })
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(&indices, &expected);

        let filtered = filter::apply(&records, &filters).unwrap();
        prop_assert_eq!(filtered.len(), expected.len());
    }

    #[test]
    fn unknown_policy_conserves_prefiltered_rows(records in arb_records()) {
        let admitted = rows_with_status(&records, "ADMIT");
        let with_unknown = run_table(&records, &definition("admit_ward_with_unknown", 3));
        let dropped = run_table(&records, &definition("admit_ward", 3));

        if admitted.is_empty() {
            let empty = matches!(with_unknown, Err(ReportWarning::EmptyResult { .. }));
            prop_assert!(empty);
            let empty = matches!(dropped, Err(ReportWarning::EmptyResult { .. }));
            prop_assert!(empty);
        } else {
            let with_unknown = with_unknown.unwrap();
            prop_assert_eq!(with_unknown.total(), admitted.len() as u64);

            let unrecorded = admitted
                .iter()
                .filter(|rec| column(&records, rec, "admitward").is_null())
                .count() as u64;
            prop_assert_eq!(with_unknown.count_of(&"Unknown".into()).unwrap_or(0), unrecorded);
            prop_assert_eq!(dropped.unwrap().total(), admitted.len() as u64 - unrecorded);
        }
    }

    #[test]
    fn top_n_is_the_largest_categories(records in arb_records(), top_n in 1usize..6) {
        let top_def = definition("top_diagnoses_discharged", top_n);
        let mut full_def = top_def.clone();
        if let ReportKind::GroupCount(spec) = &mut full_def.kind {
            spec.limit = None;
        }

        let (top, full) = match (run_table(&records, &top_def), run_table(&records, &full_def)) {
            (Ok(top), Ok(full)) => (top, full),
            (Err(a), Err(b)) => {
                prop_assert_eq!(a, b);
                prop_assert!(rows_with_status(&records, "HOME").is_empty());
                return Ok(());
            }
            other => panic!("top-N and full table disagree: {other:?}"),
        };

        prop_assert!(top.len() <= top_n);
        prop_assert_eq!(top.len(), full.len().min(top_n));
        prop_assert_eq!(&top.rows[..], &full.rows[..top.len()]);
        prop_assert!(top.rows.windows(2).all(|w| w[0].count >= w[1].count));

        let smallest_kept = top.rows.iter().map(|r| r.count).min().unwrap_or(0);
        for row in &full.rows {
            if top.count_of(&row.category).is_none() {
                prop_assert!(row.count <= smallest_kept, "{:?} outranks the kept rows", row.category);
            }
        }
    }

    #[test]
    fn scan_counts_sort_ascending_by_value(records in arb_records()) {
        let table = run_table(&records, &definition("scans_per_visit", 3)).unwrap();
        let values: Vec<f64> = table.rows.iter().map(|r| r.category.as_f64().unwrap()).collect();
        prop_assert!(values.windows(2).all(|w| w[0] < w[1]), "{:?}", values);

        let non_null = records
            .column_values("bil_ctscan")
            .unwrap()
            .filter(|v| !v.is_null())
            .count() as u64;
        prop_assert_eq!(table.total(), non_null);
    }
}
