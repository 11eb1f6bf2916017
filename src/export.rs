use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::data::model::{CellValue, RecordSet};
use crate::report::{ReportOutcome, ReportOutput};

/// Write records to CSV with a header row. Null cells are written empty.
pub fn write_records_csv(path: &Path, records: &RecordSet) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(records.columns()).context("writing CSV header")?;
    for (i, record) in records.records().iter().enumerate() {
        writer
            .write_record(record.iter().map(|v| match v {
                CellValue::Null => String::new(),
                other => other.to_string(),
            }))
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn outcome_json(outcome: &ReportOutcome) -> Value {
    match &outcome.result {
        Ok(ReportOutput::Metric(value)) => json!({
            "id": outcome.id,
            "title": &outcome.title,
            "value": value,
        }),
        Ok(ReportOutput::Table(table)) => json!({
            "id": outcome.id,
            "title": &outcome.title,
            "table": table,
        }),
        Err(warning) => json!({
            "id": outcome.id,
            "title": &outcome.title,
            "warning": warning.to_string(),
        }),
    }
}

/// Write the computed reports as a JSON array.
pub fn write_summaries_json(path: &Path, outcomes: &[ReportOutcome]) -> Result<()> {
    let doc = Value::Array(outcomes.iter().map(outcome_json).collect());
    let text = serde_json::to_string_pretty(&doc).context("serializing reports")?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
