use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the working sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value as produced by the spreadsheet reader.
/// Used as a `BTreeSet` / `HashMap` key downstream so it must be `Ord + Hash`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    /// Null first, then numbers by value, then strings. An integer and a float
    /// of equal value order integer first so the ordering stays total.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        use CellValue::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Less,
            (_, Null) => Ordering::Greater,
            (String(a), String(b)) => a.cmp(b),
            (String(_), _) => Ordering::Greater,
            (_, String(_)) => Ordering::Less,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Integer(a), Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Float(a), Integer(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{v:.0}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::String(s) => serializer.serialize_str(s),
            CellValue::Integer(i) => serializer.serialize_i64(*i),
            CellValue::Float(v) => serializer.serialize_f64(*v),
            CellValue::Null => serializer.serialize_none(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view of the cell. Strings are parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            CellValue::Null => None,
        }
    }

    /// Integer view of the cell; fractional values are truncated toward zero.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::String(s) => match s.trim().parse::<i64>() {
                Ok(i) => Some(i),
                Err(_) => self.as_f64().map(|v| v.trunc() as i64),
            },
            _ => self.as_f64().map(|v| v.trunc() as i64),
        }
    }

    /// Text used by free-text search. `None` for null cells.
    pub fn search_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            other => Some(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Field – the known columns of the working sheet
// ---------------------------------------------------------------------------

/// Header names the dashboard knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Gender,
    AgeGroup,
    Month,
    Name,
    CtScanProcedure,
    ScanCount,
    /// One of the `CTx1` .. `CTx8` columns, holding its header.
    CtType(&'static str),
    DischargeCode,
    AdmitWard,
    PrimaryDiagnosis,
    Specialty,
}

impl Field {
    pub const CT_TYPES: [Field; 8] = [
        Field::CtType("CTx1"),
        Field::CtType("CTx2"),
        Field::CtType("CTx3"),
        Field::CtType("CTx4"),
        Field::CtType("CTx5"),
        Field::CtType("CTx6"),
        Field::CtType("CTx7"),
        Field::CtType("CTx8"),
    ];

    /// Columns the filter panel cannot work without.
    pub const REQUIRED: [Field; 4] = [Field::Gender, Field::AgeGroup, Field::Month, Field::Name];

    pub fn header(self) -> &'static str {
        match self {
            Field::Gender => "Gender",
            Field::AgeGroup => "Age Group",
            Field::Month => "Month",
            Field::Name => "NAME",
            Field::CtScanProcedure => "CTscanProsedure",
            Field::ScanCount => "bil_ctscan",
            Field::CtType(header) => header,
            Field::DischargeCode => "kodsebabkeluar",
            Field::AdmitWard => "admitward",
            Field::PrimaryDiagnosis => "PDx",
            Field::Specialty => "specialty",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A lookup asked for a column the loaded sheet does not have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("column '{0}' not found")]
pub struct ColumnNotFound(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordSetError {
    #[error("record {row} has {found} cells but there are {expected} columns")]
    Ragged {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
}

// ---------------------------------------------------------------------------
// RecordSet – the complete loaded table
// ---------------------------------------------------------------------------

/// One row of the working sheet, one cell per column of its [`RecordSet`].
pub type Record = Vec<CellValue>;

/// The loaded table: ordered columns plus records of equal width.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Result<Self, RecordSetError> {
        let mut index = HashMap::with_capacity(columns.len());
        for (i, col) in columns.iter().enumerate() {
            if index.insert(col.clone(), i).is_some() {
                return Err(RecordSetError::DuplicateColumn(col.clone()));
            }
        }
        if let Some((row, rec)) = records
            .iter()
            .enumerate()
            .find(|(_, rec)| rec.len() != columns.len())
        {
            return Err(RecordSetError::Ragged {
                row,
                found: rec.len(),
                expected: columns.len(),
            });
        }
        Ok(RecordSet {
            columns,
            index,
            records,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column_index(&self, name: &str) -> Result<usize, ColumnNotFound> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ColumnNotFound(name.to_string()))
    }

    /// Cell of `record` under column `name`.
    pub fn value<'a>(&self, record: &'a Record, name: &str) -> Result<&'a CellValue, ColumnNotFound> {
        let idx = self.column_index(name)?;
        record
            .get(idx)
            .ok_or_else(|| ColumnNotFound(name.to_string()))
    }

    /// Iterate over one column top to bottom.
    pub fn column_values(&self, name: &str) -> Result<impl Iterator<Item = &CellValue>, ColumnNotFound> {
        let idx = self.column_index(name)?;
        Ok(self.records.iter().filter_map(move |rec| rec.get(idx)))
    }

    /// New set holding the records at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> RecordSet {
        RecordSet {
            columns: self.columns.clone(),
            index: self.index.clone(),
            records: indices
                .iter()
                .filter_map(|&i| self.records.get(i).cloned())
                .collect(),
        }
    }

    /// Sorted distinct non-null values of a column.
    pub fn options(&self, name: &str) -> Result<BTreeSet<CellValue>, ColumnNotFound> {
        Ok(self
            .column_values(name)?
            .filter(|v| !v.is_null())
            .cloned()
            .collect())
    }

    /// Sorted distinct month numbers; null and non-numeric cells are dropped.
    pub fn month_options(&self) -> Result<BTreeSet<i64>, ColumnNotFound> {
        Ok(self
            .column_values(Field::Month.header())?
            .filter_map(CellValue::as_i64)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RecordSet {
        RecordSet::new(
            vec!["Gender".into(), "Month".into()],
            vec![
                vec!["F".into(), CellValue::Integer(2)],
                vec![CellValue::Null, CellValue::String("3".into())],
                vec!["M".into(), CellValue::Float(2.0)],
                vec!["F".into(), CellValue::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = RecordSet::new(vec!["a".into(), "b".into()], vec![vec![CellValue::Null]]).unwrap_err();
        assert_eq!(
            err,
            RecordSetError::Ragged {
                row: 0,
                found: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let err = RecordSet::new(vec!["a".into(), "a".into()], vec![]).unwrap_err();
        assert_eq!(err, RecordSetError::DuplicateColumn("a".into()));
    }

    #[test]
    fn unknown_column_fails_fast() {
        let rs = sample();
        assert_eq!(rs.column_index("PDx"), Err(ColumnNotFound("PDx".into())));
        assert!(rs.options("PDx").is_err());
    }

    #[test]
    fn options_drop_nulls_and_sort() {
        let rs = sample();
        let opts: Vec<_> = rs.options("Gender").unwrap().into_iter().collect();
        assert_eq!(opts, vec![CellValue::from("F"), CellValue::from("M")]);
    }

    #[test]
    fn month_options_coerce_to_integer() {
        let rs = sample();
        let months: Vec<_> = rs.month_options().unwrap().into_iter().collect();
        assert_eq!(months, vec![2, 3]);
    }

    #[test]
    fn integer_coercion() {
        assert_eq!(CellValue::Float(4.9).as_i64(), Some(4));
        assert_eq!(CellValue::String(" 7 ".into()).as_i64(), Some(7));
        assert_eq!(CellValue::String("7.0".into()).as_i64(), Some(7));
        assert_eq!(CellValue::String("July".into()).as_i64(), None);
        assert_eq!(CellValue::Null.as_i64(), None);
    }

    #[test]
    fn ordering_puts_null_first_and_strings_last() {
        let mut vals = vec![
            CellValue::from("b"),
            CellValue::Float(1.5),
            CellValue::Null,
            CellValue::Integer(3),
            CellValue::from("a"),
        ];
        vals.sort();
        assert_eq!(
            vals,
            vec![
                CellValue::Null,
                CellValue::Float(1.5),
                CellValue::Integer(3),
                CellValue::from("a"),
                CellValue::from("b"),
            ]
        );
    }

    #[test]
    fn numbers_order_by_value_across_kinds() {
        let mut vals = vec![
            CellValue::Integer(2),
            CellValue::Float(2.0),
            CellValue::Float(-0.5),
            CellValue::Integer(1),
            CellValue::Float(1.5),
        ];
        vals.sort();
        assert_eq!(
            vals,
            vec![
                CellValue::Float(-0.5),
                CellValue::Integer(1),
                CellValue::Float(1.5),
                CellValue::Integer(2),
                CellValue::Float(2.0),
            ]
        );
        assert_ne!(CellValue::Integer(2).cmp(&CellValue::Float(2.0)), std::cmp::Ordering::Equal);
        assert!(CellValue::Float(f64::INFINITY) < CellValue::from("0"));
    }

    #[test]
    fn display_hides_integral_fraction() {
        assert_eq!(CellValue::Float(3.0).to_string(), "3");
        assert_eq!(CellValue::Float(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Null.to_string(), "<null>");
    }

    #[test]
    fn field_headers() {
        let ct: Vec<_> = Field::CT_TYPES.iter().map(|f| f.header()).collect();
        assert_eq!(ct, ["CTx1", "CTx2", "CTx3", "CTx4", "CTx5", "CTx6", "CTx7", "CTx8"]);
        assert_eq!(Field::AgeGroup.header(), "Age Group");
        assert_eq!(Field::ScanCount.to_string(), "bil_ctscan");
    }
}
