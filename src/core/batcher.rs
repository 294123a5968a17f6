use crate::core::Record;
use crate::utils::error::{EtlError, Result};

pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Splits records into contiguous windows of `batch_size`; the last one may be shorter.
pub fn make_batches(records: &[Record], batch_size: usize) -> Result<Vec<&[Record]>> {
    if batch_size == 0 {
        return Err(EtlError::InvalidConfigValueError {
            field: "batch_size".to_string(),
            value: batch_size.to_string(),
            reason: "Value must be at least 1".to_string(),
        });
    }
    Ok(records.chunks(batch_size).collect())
}

pub fn batch_count(record_count: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    record_count.div_ceil(batch_size)
}
