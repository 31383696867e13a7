//! Byte codec for [`AssetRecord`].
//!
//! Records are stored as compact JSON with the field order of the struct
//! definition, so equal records always encode to identical bytes. Decoding is
//! strict: every field must be present with the right type and no unknown
//! fields are accepted.

use crate::error::CodecError;
use crate::record::AssetRecord;

/// Encode a record for storage.
pub fn encode(record: &AssetRecord) -> Result<Vec<u8>, CodecError> {
    if let Some(field) = record.non_finite_field() {
        return Err(CodecError::NonFinite(field));
    }
    serde_json::to_vec(record).map_err(|e| CodecError::Malformed(e.to_string()))
}

/// Decode stored bytes into a record.
pub fn decode(bytes: &[u8]) -> Result<AssetRecord, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::Malformed(e.to_string()))
}
