//! Aggregation layer: report definitions and the engine that evaluates them.
//!
//! ```text
//!   loaded RecordSet ─┐
//!                     ├─► build_report(def) ─► ReportOutput (metric | SummaryTable)
//! filtered RecordSet ─┘                     └► ReportWarning (report skipped)
//! ```

pub mod catalog;

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::data::model::{CellValue, RecordSet};

pub use catalog::catalog;

// ---------------------------------------------------------------------------
// Report definitions
// ---------------------------------------------------------------------------

/// Which record set a report reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordScope {
    /// Records left after the user's filters.
    Filtered,
    /// Everything that was loaded, ignoring the filters.
    Loaded,
}

/// Keep only rows whose `column` equals the literal `equals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreFilter {
    pub column: &'static str,
    pub equals: &'static str,
}

/// What happens to null cells of the grouped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullPolicy {
    Drop,
    /// Counted under the literal category `Unknown`.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Highest count first; ties keep first-appearance order.
    CountDescending,
    CategoryAscending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpec {
    pub column: &'static str,
    pub pre_filter: Option<PreFilter>,
    pub nulls: NullPolicy,
    pub order: SortOrder,
    /// Keep only the first `n` rows after sorting.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportKind {
    /// Number of non-null cells in a column.
    NonNullCount { column: &'static str },
    /// Sum of the numeric cells of a column, truncated to an integer.
    Sum { column: &'static str },
    /// Stack several wide columns into one and count distinct non-null values.
    Melt { columns: Vec<&'static str> },
    GroupCount(GroupSpec),
}

/// One chart/table pair (or headline metric) of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDefinition {
    pub id: &'static str,
    pub title: String,
    /// Header of the category column in the rendered table.
    pub category_label: &'static str,
    pub scope: RecordScope,
    pub kind: ReportKind,
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub category: CellValue,
    pub count: u64,
}

/// Ordered (category, count) pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryTable {
    pub category_label: String,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn count_of(&self, category: &CellValue) -> Option<u64> {
        self.rows
            .iter()
            .find(|r| r.category == *category)
            .map(|r| r.count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutput {
    Metric(i64),
    Table(SummaryTable),
}

/// A report that could not be produced. Only that report is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportWarning {
    #[error("Column '{column}' not found in the dataset!")]
    MissingColumn { column: String },
    #[error("None of the columns {} were found in the dataset.", .columns.join(", "))]
    NoColumns { columns: Vec<String> },
    #[error("No data found for '{column}' where '{filter_column}' = '{value}'.")]
    EmptyResult {
        column: String,
        filter_column: String,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    pub id: &'static str,
    pub title: String,
    pub result: Result<ReportOutput, ReportWarning>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Evaluate every definition; a warning on one never stops the rest.
pub fn build_reports(
    loaded: &RecordSet,
    filtered: &RecordSet,
    defs: &[ReportDefinition],
) -> Vec<ReportOutcome> {
    defs.iter()
        .map(|def| {
            let result = build_report(loaded, filtered, def);
            if let Err(warning) = &result {
                log::warn!("Report '{}' skipped: {warning}", def.id);
            }
            ReportOutcome {
                id: def.id,
                title: def.title.clone(),
                result,
            }
        })
        .collect()
}

pub fn build_report(
    loaded: &RecordSet,
    filtered: &RecordSet,
    def: &ReportDefinition,
) -> Result<ReportOutput, ReportWarning> {
    let records = match def.scope {
        RecordScope::Filtered => filtered,
        RecordScope::Loaded => loaded,
    };

    match &def.kind {
        ReportKind::NonNullCount { column } => {
            let count = column_cells(records, column)?.filter(|v| !v.is_null()).count();
            Ok(ReportOutput::Metric(i64::try_from(count).unwrap_or(i64::MAX)))
        }
        ReportKind::Sum { column } => {
            let sum: f64 = column_cells(records, column)?
                .filter_map(CellValue::as_f64)
                .sum();
            Ok(ReportOutput::Metric(sum.trunc() as i64))
        }
        ReportKind::Melt { columns } => melt_count(records, columns, def.category_label).map(ReportOutput::Table),
        ReportKind::GroupCount(spec) => group_count(records, spec, def.category_label).map(ReportOutput::Table),
    }
}

fn column_cells<'a>(
    records: &'a RecordSet,
    column: &str,
) -> Result<impl Iterator<Item = &'a CellValue>, ReportWarning> {
    records
        .column_values(column)
        .map_err(|e| ReportWarning::MissingColumn { column: e.0 })
}

/// Wide-to-long: every existing source column contributes one value per
/// non-null cell, then values are counted.
fn melt_count(
    records: &RecordSet,
    columns: &[&'static str],
    label: &str,
) -> Result<SummaryTable, ReportWarning> {
    let indices: Vec<usize> = columns
        .iter()
        .filter_map(|c| records.column_index(c).ok())
        .collect();
    if indices.is_empty() {
        return Err(ReportWarning::NoColumns {
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
    }

    let long = indices.iter().flat_map(move |&idx| {
        records
            .records()
            .iter()
            .filter_map(move |rec| rec.get(idx))
            .filter(|v| !v.is_null())
    });

    let mut rows = count_values(long);
    sort_rows(&mut rows, SortOrder::CountDescending);
    Ok(SummaryTable {
        category_label: label.to_string(),
        rows,
    })
}

fn group_count(records: &RecordSet, spec: &GroupSpec, label: &str) -> Result<SummaryTable, ReportWarning> {
    let missing = |column: &str| ReportWarning::MissingColumn {
        column: column.to_string(),
    };
    let target = records.column_index(spec.column).map_err(|_| missing(spec.column))?;

    let filter = match spec.pre_filter {
        Some(pf) => {
            let idx = records.column_index(pf.column).map_err(|_| missing(pf.column))?;
            Some((idx, CellValue::from(pf.equals)))
        }
        None => None,
    };

    let selected: Vec<&CellValue> = records
        .records()
        .iter()
        .filter(|rec| match &filter {
            Some((idx, wanted)) => rec.get(*idx) == Some(wanted),
            None => true,
        })
        .filter_map(|rec| rec.get(target))
        .collect();

    if let (Some(pf), true) = (spec.pre_filter, selected.is_empty()) {
        return Err(ReportWarning::EmptyResult {
            column: spec.column.to_string(),
            filter_column: pf.column.to_string(),
            value: pf.equals.to_string(),
        });
    }

    let unknown = CellValue::from("Unknown");
    let values = selected.into_iter().filter_map(|v| match (v.is_null(), spec.nulls) {
        (false, _) => Some(v),
        (true, NullPolicy::Unknown) => Some(&unknown),
        (true, NullPolicy::Drop) => None,
    });

    let mut rows = count_values(values);
    sort_rows(&mut rows, spec.order);
    if let Some(n) = spec.limit {
        rows.truncate(n);
    }
    Ok(SummaryTable {
        category_label: label.to_string(),
        rows,
    })
}

/// Single pass: one slot per distinct value, in first-appearance order.
fn count_values<'a>(values: impl Iterator<Item = &'a CellValue>) -> Vec<SummaryRow> {
    let mut slots: HashMap<&CellValue, usize> = HashMap::new();
    let mut rows: Vec<SummaryRow> = Vec::new();
    for value in values {
        match slots.get(value) {
            Some(&slot) => rows[slot].count += 1,
            None => {
                slots.insert(value, rows.len());
                rows.push(SummaryRow {
                    category: value.clone(),
                    count: 1,
                });
            }
        }
    }
    rows
}

fn sort_rows(rows: &mut [SummaryRow], order: SortOrder) {
    // Both sorts are stable.
    match order {
        SortOrder::CountDescending => rows.sort_by(|a, b| b.count.cmp(&a.count)),
        SortOrder::CategoryAscending => rows.sort_by(|a, b| a.category.cmp(&b.category)),
    }
}

/// `12345` → `"12,345"`.
pub fn format_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
