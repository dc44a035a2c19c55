//! Delimited text rendering.

use super::{OutputRow, RenderOptions, COLUMNS};

/// UTF-8 byte-order mark.
pub const BYTE_ORDER_MARK: char = '\u{feff}';

/// MIME type of CSV output.
pub const CSV_MIME_TYPE: &str = "text/csv";

/// Render rows as CSV text.
///
/// Fields are quoted only when they contain a comma, a quote or a line break.
pub fn to_csv(rows: &[OutputRow], options: &RenderOptions) -> String {
    let mut output = String::new();
    let terminator = options.line_terminator.as_str();

    if options.byte_order_mark {
        output.push(BYTE_ORDER_MARK);
    }

    if options.include_header {
        write_record(&mut output, COLUMNS.iter().copied(), terminator);
    }

    for row in rows {
        let cells = row.cells();
        write_record(&mut output, cells.iter().map(String::as_str), terminator);
    }

    output
}

fn write_record<'a>(output: &mut String, fields: impl Iterator<Item = &'a str>, terminator: &str) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            output.push(',');
        }
        if field.contains([',', '"', '\r', '\n']) {
            output.push('"');
            output.push_str(&field.replace('"', "\"\""));
            output.push('"');
        } else {
            output.push_str(field);
        }
    }
    output.push_str(terminator);
}
