/*!
 * CSV audit report of a run.
 */

use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::info;

use super::TextItem;
use crate::errors::PipelineError;
use crate::sanitizer::strip_invalid_chars;

/// Fixed column order
pub const REPORT_HEADERS: [&str; 4] = ["layer", "location", "original_text", "translated_text"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write one row per processed item after a UTF-8 byte order mark.
///
/// Items that were never dispatched are left out. Returns the number of
/// data rows written.
pub fn write_report(path: &Path, items: &[TextItem]) -> Result<usize, PipelineError> {
    let report_error = |reason: String| PipelineError::Report {
        path: path.to_path_buf(),
        reason,
    };

    let mut file = File::create(path).map_err(|e| report_error(e.to_string()))?;
    file.write_all(UTF8_BOM).map_err(|e| report_error(e.to_string()))?;

    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(REPORT_HEADERS)
        .map_err(|e| report_error(e.to_string()))?;

    let mut rows = 0;
    for item in items {
        let Some(translated) = &item.translated_text else {
            continue;
        };
        writer
            .write_record([
                strip_invalid_chars(&item.layer),
                strip_invalid_chars(&item.location),
                strip_invalid_chars(&item.original_text),
                strip_invalid_chars(translated),
            ])
            .map_err(|e| report_error(e.to_string()))?;
        rows += 1;
    }
    writer.flush().map_err(|e| report_error(e.to_string()))?;

    info!("Report written to {} ({} rows)", path.display(), rows);
    Ok(rows)
}
