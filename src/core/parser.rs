use crate::core::ExtractionResult;
use crate::utils::error::{EtlError, Result};

/// Decodes a raw service response into the three entity lists.
///
/// The text must be a single JSON object. Missing or `null` fields become empty
/// lists and unknown fields are ignored, but any list element that is not a
/// string rejects the whole response.
pub fn parse_response(text: &str) -> Result<ExtractionResult> {
    let value: serde_json::Value =
        serde_json::from_str(text.trim()).map_err(|e| EtlError::ParseFailed {
            message: e.to_string(),
        })?;

    if !value.is_object() {
        return Err(EtlError::ParseFailed {
            message: "expected a JSON object".to_string(),
        });
    }

    serde_json::from_value(value).map_err(|e| EtlError::ParseFailed {
        message: e.to_string(),
    })
}
