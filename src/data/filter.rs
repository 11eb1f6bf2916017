use std::collections::BTreeSet;

use super::model::{CellValue, ColumnNotFound, Field, Record, RecordSet};

// ---------------------------------------------------------------------------
// Filter predicates: name search plus three multi-selects
// ---------------------------------------------------------------------------

/// The user's current filter choices.
///
/// An empty selection set means "no filter" for that column (show all), the
/// same as having every option selected. An empty `name_search` matches
/// every record, including ones without a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub name_search: String,
    pub gender: BTreeSet<CellValue>,
    pub age_group: BTreeSet<CellValue>,
    /// Month numbers; cells are coerced to integers before comparison.
    pub month: BTreeSet<i64>,
}

impl FilterSet {
    /// Everything selected: the default state after a file is loaded.
    pub fn all(records: &RecordSet) -> Result<Self, ColumnNotFound> {
        Ok(Self {
            name_search: String::new(),
            gender: records.options(Field::Gender.header())?,
            age_group: records.options(Field::AgeGroup.header())?,
            month: records.month_options()?,
        })
    }

    /// Whether every predicate is pass-through.
    pub fn is_unrestricted(&self) -> bool {
        self.name_search.is_empty()
            && self.gender.is_empty()
            && self.age_group.is_empty()
            && self.month.is_empty()
    }
}

/// One active predicate, resolved against a concrete column index.
enum Predicate<'a> {
    NameContains { col: usize, needle: String },
    OneOf { col: usize, selected: &'a BTreeSet<CellValue> },
    MonthIn { col: usize, selected: &'a BTreeSet<i64> },
}

impl Predicate<'_> {
    fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::NameContains { col, needle } => record
                .get(*col)
                .and_then(CellValue::search_text)
                .is_some_and(|text| text.to_lowercase().contains(needle.as_str())),
            Predicate::OneOf { col, selected } => {
                record.get(*col).is_some_and(|v| selected.contains(v))
            }
            Predicate::MonthIn { col, selected } => record
                .get(*col)
                .and_then(CellValue::as_i64)
                .is_some_and(|m| selected.contains(&m)),
        }
    }
}

/// Columns are only looked up for predicates that actually restrict.
fn active_predicates<'a>(
    records: &RecordSet,
    filters: &'a FilterSet,
) -> Result<Vec<Predicate<'a>>, ColumnNotFound> {
    let mut preds = Vec::new();
    if !filters.name_search.is_empty() {
        preds.push(Predicate::NameContains {
            col: records.column_index(Field::Name.header())?,
            needle: filters.name_search.to_lowercase(),
        });
    }
    if !filters.gender.is_empty() {
        preds.push(Predicate::OneOf {
            col: records.column_index(Field::Gender.header())?,
            selected: &filters.gender,
        });
    }
    if !filters.age_group.is_empty() {
        preds.push(Predicate::OneOf {
            col: records.column_index(Field::AgeGroup.header())?,
            selected: &filters.age_group,
        });
    }
    if !filters.month.is_empty() {
        preds.push(Predicate::MonthIn {
            col: records.column_index(Field::Month.header())?,
            selected: &filters.month,
        });
    }
    Ok(preds)
}

/// Return indices of records that pass all active filters, in input order.
pub fn filtered_indices(records: &RecordSet, filters: &FilterSet) -> Result<Vec<usize>, ColumnNotFound> {
    let preds = active_predicates(records, filters)?;
    Ok(records
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| preds.iter().all(|p| p.matches(rec)))
        .map(|(i, _)| i)
        .collect())
}

/// The filtered view as its own [`RecordSet`].
pub fn apply(records: &RecordSet, filters: &FilterSet) -> Result<RecordSet, ColumnNotFound> {
    if filters.is_unrestricted() {
        return Ok(records.clone());
    }
    let indices = filtered_indices(records, filters)?;
    Ok(records.select(&indices))
}
