//! Encryption boundary for sensitive attendance fields.
//!
//! Storage code never touches key material: it receives a [`FieldCipher`]
//! and talks to it through [`Codec`], one implementation per field type.

mod cipher;

pub use cipher::FieldCipher;

use chrono::NaiveDateTime;
use derive_more::Display;

use crate::model::attendance::AttendanceStatus;

#[derive(Debug, Display)]
pub enum CryptoError {
    #[display(fmt = "invalid key material")]
    InvalidKey,
    #[display(fmt = "encryption failed")]
    Encrypt,
    #[display(fmt = "decryption failed")]
    Decrypt,
    #[display(fmt = "malformed ciphertext: {}", _0)]
    Malformed(String),
    #[display(fmt = "decrypted value is not valid: {}", _0)]
    InvalidValue(String),
}

impl std::error::Error for CryptoError {}

/// Two-way text codec for a single field type.
pub trait Codec<T> {
    fn encode(&self, value: &T) -> Result<String, CryptoError>;
    fn decode(&self, raw: &str) -> Result<T, CryptoError>;
}

/// Every codec the attendance table needs.
pub trait AttendanceCodec: Codec<String> + Codec<NaiveDateTime> + Codec<AttendanceStatus> {}

impl<C> AttendanceCodec for C where C: Codec<String> + Codec<NaiveDateTime> + Codec<AttendanceStatus> {}

/// Encodes an optional field; `None` stays `None`.
pub fn encode_opt<T, C: Codec<T>>(codec: &C, value: Option<&T>) -> Result<Option<String>, CryptoError> {
    value.map(|v| codec.encode(v)).transpose()
}

/// Decodes an optional column; an absent value decodes to `None`.
pub fn decode_opt<T, C: Codec<T>>(codec: &C, raw: Option<&str>) -> Result<Option<T>, CryptoError> {
    raw.map(|r| codec.decode(r)).transpose()
}
