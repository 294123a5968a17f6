use crate::core::{FrequencyTable, Storage};
use crate::utils::error::{EtlError, Result};

/// 將一個類別的頻率表轉成 CSV，第一列為標頭
pub fn render_table(table: &FrequencyTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([table.category.label_column(), "Count"])?;
    for (label, count) in &table.rows {
        let count = count.to_string();
        writer.write_record([label.as_str(), count.as_str()])?;
    }
    writer.into_inner().map_err(|e| EtlError::IoError(e.into_error()))
}

/// Writes one artifact per table under its fixed file name and returns the names written.
pub async fn write_tables<S: Storage>(storage: &S, tables: &[FrequencyTable]) -> Result<Vec<String>> {
    let mut written = Vec::with_capacity(tables.len());

    for table in tables {
        let file_name = table.category.file_name();
        let data = render_table(table)?;

        tracing::debug!("Writing {} ({} rows)", file_name, table.rows.len());
        storage
            .write_file(file_name, &data)
            .await
            .map_err(|e| match e {
                EtlError::PersistError { .. } => e,
                other => EtlError::PersistError {
                    path: file_name.to_string(),
                    message: other.to_string(),
                },
            })?;

        written.push(file_name.to_string());
    }

    Ok(written)
}
