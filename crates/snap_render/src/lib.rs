use std::fmt::Write as _;
use std::io;

use serde_json::{Map as JsonMap, Value as JsonValue};
use snap_core::core_api::{Cell, CoreError, CoreErrorCode, ReportTable};

pub const DEFAULT_PREVIEW_ROWS: usize = 200;
const DEFAULT_MAX_COLUMN_WIDTH: usize = 48;
const COLUMN_GAP: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    /// Array of row objects keyed by column name, in column order.
    #[default]
    RowsV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRenderOptions {
    pub limit: Option<usize>,
    pub max_column_width: usize,
}

impl Default for TextRenderOptions {
    fn default() -> Self {
        Self {
            limit: Some(DEFAULT_PREVIEW_ROWS),
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
        }
    }
}

/// Cell text as it appears in CSV and text output: integers without a
/// decimal point, percentages with exactly two decimals, unknowns blank.
pub fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => s.clone(),
        Cell::Int(v) => v.to_string(),
        Cell::Percent(v) => format!("{v:.2}"),
        Cell::Empty => String::new(),
    }
}

pub fn write_csv<W: io::Write>(table: &ReportTable, writer: W) -> Result<(), CoreError> {
    let mut out = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    out.write_record(&table.columns).map_err(csv_error)?;
    for row in &table.rows {
        out.write_record(row.iter().map(format_cell))
            .map_err(csv_error)?;
    }
    out.flush().map_err(|e| {
        CoreError::new(
            CoreErrorCode::Io,
            format!("failed to flush CSV output: {e}"),
        )
    })
}

pub fn render_csv(table: &ReportTable) -> Result<String, CoreError> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    String::from_utf8(buf).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Io,
            format!("CSV output is not valid UTF-8: {e}"),
        )
    })
}

pub fn render_json(table: &ReportTable, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::RowsV1 => JsonValue::Array(
            table
                .rows
                .iter()
                .map(|row| JsonValue::Object(row_to_json(&table.columns, row)))
                .collect(),
        ),
    }
}

fn row_to_json(columns: &[String], row: &[Cell]) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    for (column, cell) in columns.iter().zip(row) {
        let value = match cell {
            Cell::Text(s) => JsonValue::String(s.clone()),
            Cell::Int(v) => JsonValue::from(*v),
            Cell::Percent(v) => JsonValue::from(*v),
            Cell::Empty => JsonValue::Null,
        };
        out.insert(column.clone(), value);
    }
    out
}

/// Fixed-width preview of the first rows of a table.
pub fn render_text_table(table: &ReportTable, options: TextRenderOptions) -> String {
    let shown = options
        .limit
        .map_or(table.len(), |limit| limit.min(table.len()));
    let rows: Vec<Vec<String>> = table.rows[..shown]
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| fit_column(&format_cell(cell), options.max_column_width))
                .collect()
        })
        .collect();
    let header: Vec<String> = table
        .columns
        .iter()
        .map(|c| fit_column(c, options.max_column_width))
        .collect();

    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|v| v.chars().count())
                .fold(h.chars().count(), usize::max)
        })
        .collect();

    let mut out = String::new();
    write_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_line(&mut out, &rule, &widths);
    for row in &rows {
        write_line(&mut out, row, &widths);
    }
    writeln!(out).expect("writing to String cannot fail");
    writeln!(out, "Previewing {} of {} rows.", shown, table.len())
        .expect("writing to String cannot fail");
    out
}

fn write_line(out: &mut String, values: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (value, width) in values.iter().zip(widths) {
        write!(line, "{:<w$}", value, w = width + COLUMN_GAP)
            .expect("writing to String cannot fail");
    }
    writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
}

fn fit_column(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }

    let mut out = String::with_capacity(width);
    for ch in value.chars().take(width - 3) {
        out.push(ch);
    }
    out.push_str("...");
    out
}

fn csv_error(e: csv::Error) -> CoreError {
    CoreError::new(
        CoreErrorCode::Io,
        format!("failed to write CSV record: {e}"),
    )
}

#[cfg(test)]
mod tests {
    use snap_core::core_api::Cell;

    use super::{fit_column, format_cell};

    #[test]
    fn formats_cells_for_tabular_output() {
        assert_eq!(format_cell(&Cell::Int(1200)), "1200");
        assert_eq!(format_cell(&Cell::Percent(30.0)), "30.00");
        assert_eq!(format_cell(&Cell::Percent(33.33)), "33.33");
        assert_eq!(format_cell(&Cell::Empty), "");
        assert_eq!(format_cell(&Cell::Text("Hulk".to_string())), "Hulk");
    }

    #[test]
    fn fit_column_truncates_with_ellipsis() {
        assert_eq!(fit_column("IronMan_01|IronMan_02", 10), "IronMan...");
        assert_eq!(fit_column("Hulk", 10), "Hulk");
        assert_eq!(fit_column("Hulk", 2), "Hu");
    }
}
