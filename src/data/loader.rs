use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use thiserror::Error;

use super::model::{CellValue, Field, Record, RecordSet, RecordSetError};
use crate::config::LoadOptions;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Anything that stops a file from becoming a [`RecordSet`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("failed to open workbook: {0}")]
    Open(#[source] calamine::Error),
    #[error("sheet '{sheet}' not found (available: {})", .available.join(", "))]
    SheetNotFound { sheet: String, available: Vec<String> },
    #[error("failed to read sheet '{sheet}': {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: calamine::Error,
    },
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("the sheet has no header row")]
    EmptySheet,
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("malformed table: {0}")]
    Shape(#[from] RecordSetError),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the working sheet from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – the sheet named in `options`
/// * `.csv` – header row followed by data rows
///
/// Only the first `options.max_columns` columns and `options.max_rows` data
/// rows are kept.
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<RecordSet, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (headers, records) = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path, options)?,
        "csv" => read_csv(path, options)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    let records = RecordSet::new(unique_headers(headers), records)?;
    check_required(&records)?;
    log::info!(
        "Loaded {} records with {} columns from {}",
        records.len(),
        records.columns().len(),
        path.display()
    );
    Ok(records)
}

fn check_required(records: &RecordSet) -> Result<(), LoadError> {
    let missing: Vec<String> = Field::REQUIRED
        .iter()
        .map(|f| f.header())
        .filter(|h| !records.has_column(h))
        .map(str::to_string)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoadError::MissingColumns(missing))
    }
}

/// Blank headers become `Unnamed: <i>`, repeats get a `.1`, `.2`… suffix.
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for (i, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            name.trim().to_string()
        };
        let mut candidate = base.clone();
        let mut n = 1;
        while out.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        out.push(candidate);
    }
    out
}

fn log_truncation(kept: usize, total: usize) {
    if total > kept {
        log::warn!("Row cap reached: kept {kept} of {total} data rows");
    }
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

fn read_workbook(path: &Path, options: &LoadOptions) -> Result<(Vec<String>, Vec<Record>), LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(LoadError::Open)?;

    let available = workbook.sheet_names();
    if !available.iter().any(|s| *s == options.sheet_name) {
        return Err(LoadError::SheetNotFound {
            sheet: options.sheet_name.clone(),
            available,
        });
    }

    let range = workbook
        .worksheet_range(&options.sheet_name)
        .map_err(|source| LoadError::Sheet {
            sheet: options.sheet_name.clone(),
            source,
        })?;

    read_range(&range, options)
}

/// Turn a sheet range into headers and records.  Positions are absolute so
/// the column cap counts from column A even when the used range starts later.
fn read_range(range: &Range<Data>, options: &LoadOptions) -> Result<(Vec<String>, Vec<Record>), LoadError> {
    let (Some((header_row, start_col)), Some((end_row, end_col))) = (range.start(), range.end()) else {
        return Err(LoadError::EmptySheet);
    };

    let col_limit = u32::try_from(options.max_columns).unwrap_or(u32::MAX);
    let last_col = end_col.min(col_limit.saturating_sub(1));
    if start_col > last_col || col_limit == 0 {
        return Err(LoadError::EmptySheet);
    }
    let cols: Vec<u32> = (start_col..=last_col).collect();

    let headers: Vec<String> = cols
        .iter()
        .map(|&c| match range.get_value((header_row, c)).map(to_cell_value) {
            Some(CellValue::Null) | None => String::new(),
            Some(v) => v.to_string(),
        })
        .collect();

    let total = usize::try_from(end_row - header_row).unwrap_or(usize::MAX);
    let records: Vec<Record> = (header_row + 1..=end_row)
        .take(options.max_rows)
        .map(|r| {
            cols.iter()
                .map(|&c| range.get_value((r, c)).map_or(CellValue::Null, to_cell_value))
                .collect()
        })
        .collect();
    log_truncation(records.len(), total);

    Ok((headers, records))
}

fn to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => float_cell(*f),
        Data::String(s) => text_cell(s),
        Data::Bool(b) => CellValue::String(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => CellValue::String(ndt.to_string()),
            None => float_cell(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => text_cell(s),
    }
}

/// Spreadsheets store every number as a float; whole ones become integers.
fn float_cell(f: f64) -> CellValue {
    if f.is_nan() {
        CellValue::Null
    } else if f.fract() == 0.0 && f.abs() < 9.0e15 {
        CellValue::Integer(f as i64)
    } else {
        CellValue::Float(f)
    }
}

fn text_cell(s: &str) -> CellValue {
    if s.is_empty() {
        CellValue::Null
    } else {
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Short lines are padded with nulls, long ones cut to the column cap.
fn read_csv(path: &Path, options: &LoadOptions) -> Result<(Vec<String>, Vec<Record>), LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .take(options.max_columns)
        .map(|h| h.to_string())
        .collect();
    if headers.is_empty() {
        return Err(LoadError::EmptySheet);
    }

    let mut records = Vec::new();
    let mut total = 0;
    for result in reader.records() {
        let row = result?;
        total += 1;
        if records.len() >= options.max_rows {
            continue;
        }
        let mut record: Record = row
            .iter()
            .take(headers.len())
            .map(guess_cell_type)
            .collect();
        record.resize(headers.len(), CellValue::Null);
        records.push(record);
    }
    log_truncation(records.len(), total);

    Ok((headers, records))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return float_cell(f);
    }
    CellValue::String(s.to_string())
}
