//! Rendering module for turning extractions into export formats.

mod csv;
mod json;
mod options;
mod result;
mod table;

pub use csv::{to_csv, BYTE_ORDER_MARK, CSV_MIME_TYPE};
pub use json::{to_json, JsonFormat, JSON_MIME_TYPE};
pub use options::{LineTerminator, RenderOptions};
pub use result::{ExportResult, ExtractionStats};
pub use table::{serialize, strip_commas, ElementRow, OutputRow, COLUMNS};
