mod shape;
mod sheets;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

pub use shape::{field_rows, rows, Row, Tabular};
pub use sheets::{write_rows, SheetTarget};

/// The format to produce output in.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[clap(rename_all = "snake_case")]
pub enum Format {
    /// Nested JSON, the default. Summaries can carry the projects they cover.
    Json,
    /// Flat CSV rows.
    Csv,
    /// Flat rows written into a Google Sheets range.
    Gsheet,
}
impl Format {
    /// Whether this format takes flat rows rather than nested data.
    pub fn is_tabular(self) -> bool {
        matches!(self, Self::Csv | Self::Gsheet)
    }
}

/// Records shaped for a particular format.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Structured(Value),
    Rows(Vec<Row>),
}

/// Shapes the given records for the given format.
pub fn render<T: Serialize + Tabular>(items: &[T], format: Format) -> Result<Rendered> {
    if format.is_tabular() {
        Ok(Rendered::Rows(rows(items)))
    } else {
        Ok(Rendered::Structured(
            serde_json::to_value(items).with_context(|| "failed to serialize output")?,
        ))
    }
}

/// Shapes a single record of no fixed shape: as-is for JSON, or one row per field otherwise.
pub fn render_value(value: Value, format: Format) -> Rendered {
    if format.is_tabular() {
        Rendered::Rows(field_rows(&value))
    } else {
        Rendered::Structured(value)
    }
}

/// Writes JSON to the given writer, followed by a newline.
pub fn write_json(value: &Value, mut writer: impl Write) -> Result<()> {
    serde_json::to_writer(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Writes rows as CSV. Rows don't need to be the same length.
pub fn write_csv(rows: &[Row], writer: impl Write) -> Result<()> {
    let mut csv = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    for row in rows {
        csv.write_record(row.iter().map(cell_text))?;
    }
    csv.flush()?;
    Ok(())
}

/// The text of a single cell: strings unquoted, nulls blank, everything else as JSON.
fn cell_text(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
