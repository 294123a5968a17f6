use crate::core::Record;
use crate::utils::error::{EtlError, Result};
use std::path::Path;

pub const TITLE_COLUMN: &str = "Article Title";
pub const ABSTRACT_COLUMN: &str = "Abstract";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 讀取輸入檔並轉成文獻清單
pub fn load_records_from_path(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| EtlError::LoadError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    load_records(&data).map_err(|e| match e {
        EtlError::CsvError(csv_err) => EtlError::LoadError {
            path: path.display().to_string(),
            message: csv_err.to_string(),
        },
        EtlError::LoadError { message, .. } => EtlError::LoadError {
            path: path.display().to_string(),
            message,
        },
        other => other,
    })
}

/// Parses CSV bytes into records, keeping row order.
///
/// A leading UTF-8 byte-order mark is ignored. Both required columns are
/// checked before any row is read, so a bad header never yields records.
pub fn load_records(data: &[u8]) -> Result<Vec<Record>> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(EtlError::LoadError {
            path: "<input>".to_string(),
            message: "no header row".to_string(),
        });
    }
    let find = |name: &str| headers.iter().position(|h| h.trim() == name);

    let title_idx = find(TITLE_COLUMN);
    let abstract_idx = find(ABSTRACT_COLUMN);

    let (title_idx, abstract_idx) = match (title_idx, abstract_idx) {
        (Some(t), Some(a)) => (t, a),
        (t, a) => {
            let mut missing = Vec::new();
            if t.is_none() {
                missing.push(TITLE_COLUMN.to_string());
            }
            if a.is_none() {
                missing.push(ABSTRACT_COLUMN.to_string());
            }
            return Err(EtlError::SchemaError { missing });
        }
    };

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        // 缺值一律視為空字串
        let title = row.get(title_idx).unwrap_or_default();
        let abstract_text = row.get(abstract_idx).unwrap_or_default();
        records.push(Record::new(title, abstract_text));
    }

    tracing::debug!("Loaded {} records from input", records.len());
    Ok(records)
}
