use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use std::fs;
use std::path::Path;

/// 將輸出檔寫入本機目錄
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);
        let persist_error = |e: std::io::Error| EtlError::PersistError {
            path: full_path.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(persist_error)?;
        }

        fs::write(&full_path, data).map_err(persist_error)?;
        Ok(())
    }
}
