//! Text codec for the durable save format.
//!
//! Pure transformations: `encode` normalizes a copy of the record first so
//! logically equal states always produce identical text; `decode` parses
//! without side effects and never yields a partially populated record.
//! Structural validation lives in [`validator`] and is applied by callers
//! after a successful decode.

pub mod validator;

use crate::core::types::SCHEMA_VERSION;
use crate::core::{Result, SaveError};
use crate::model::SaveRecord;

pub fn encode(record: &SaveRecord) -> Result<String> {
    let mut normalized = record.clone();
    normalized.normalize();
    serde_json::to_string_pretty(&normalized)
        .map_err(|e| SaveError::Malformed(format!("Failed to encode save record: {}", e)))
}

pub fn decode(text: &str) -> Result<SaveRecord> {
    let record: SaveRecord = serde_json::from_str(text)
        .map_err(|e| SaveError::Malformed(format!("Failed to decode save record: {}", e)))?;
    if record.schema_version > SCHEMA_VERSION {
        return Err(SaveError::Malformed(format!(
            "Save schema version {} is newer than supported version {}",
            record.schema_version, SCHEMA_VERSION
        )));
    }
    Ok(record)
}
