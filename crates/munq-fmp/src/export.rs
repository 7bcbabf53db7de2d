use crate::error::{Error, Result};
use crate::schema::Table;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde_json::{Number, Value};

pub const DEFAULT_FILE_NAME: &str = "stock_data.csv";

/// Serializes `table` as CSV text: a header line from the table's columns,
/// then one line per row. Fields are neither quoted nor escaped, and lines are
/// joined by `\n` with no trailing terminator.
///
/// Returns `None` for an empty table; there is nothing worth a file.
pub fn csv_text(table: &Table) -> Result<Option<String>> {
    if table.is_empty() {
        return Ok(None);
    }

    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(table.columns())?;
    for row in table.rows() {
        // project onto the header so every line carries the same field count
        wtr.write_record(
            table
                .columns()
                .iter()
                .map(|column| row.get(column).map(field).unwrap_or_default()),
        )?;
    }

    let bytes = wtr.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    let mut text = String::from_utf8(bytes)?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(Some(text))
}

/// Text form of one cell.
pub fn field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number(n),
        nested => nested.to_string(),
    }
}

// Whole floats print without a fractional part (`722.00` -> `722`, `4.8638E7` -> `48638000`).
fn number(n: &Number) -> String {
    if !n.is_f64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
