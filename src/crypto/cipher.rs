use aes_gcm::aead::{Aead, KeyInit, OsRng, rand_core::RngCore};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use chrono::NaiveDateTime;
use sha2::{Digest, Sha256};

use super::{Codec, CryptoError};
use crate::model::attendance::AttendanceStatus;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// AES-256-GCM cipher for single column values.
///
/// Output is base64 of `nonce || ciphertext || tag`, with a fresh random
/// nonce per call, so equal plaintexts never produce equal ciphertexts.
#[derive(Clone)]
pub struct FieldCipher {
    cipher: Aes256Gcm,
}

impl FieldCipher {
    /// Derives the 256-bit key from the configured secret.
    pub fn new(secret: &str) -> Result<Self, CryptoError> {
        let key = Sha256::digest(secret.as_bytes());
        let cipher = Aes256Gcm::new_from_slice(key.as_slice()).map_err(|_| CryptoError::InvalidKey)?;
        Ok(Self { cipher })
    }

    pub fn encrypt(&self, plain: &str) -> Result<String, CryptoError> {
        let mut iv = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut iv);

        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&iv), plain.as_bytes())
            .map_err(|_| CryptoError::Encrypt)?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&iv);
        out.extend_from_slice(&sealed);
        Ok(B64.encode(out))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String, CryptoError> {
        let bytes = B64
            .decode(encoded.trim())
            .map_err(|e| CryptoError::Malformed(e.to_string()))?;

        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::Malformed("ciphertext too short".to_string()));
        }

        let (iv, sealed) = bytes.split_at(NONCE_LEN);
        let plain = self
            .cipher
            .decrypt(Nonce::from_slice(iv), sealed)
            .map_err(|_| CryptoError::Decrypt)?;

        String::from_utf8(plain).map_err(|e| CryptoError::InvalidValue(e.to_string()))
    }
}

impl Codec<String> for FieldCipher {
    fn encode(&self, value: &String) -> Result<String, CryptoError> {
        self.encrypt(value)
    }

    fn decode(&self, raw: &str) -> Result<String, CryptoError> {
        self.decrypt(raw)
    }
}

impl Codec<NaiveDateTime> for FieldCipher {
    fn encode(&self, value: &NaiveDateTime) -> Result<String, CryptoError> {
        self.encrypt(&value.format(DATE_FORMAT).to_string())
    }

    fn decode(&self, raw: &str) -> Result<NaiveDateTime, CryptoError> {
        let plain = self.decrypt(raw)?;
        NaiveDateTime::parse_from_str(&plain, DATE_FORMAT)
            .map_err(|e| CryptoError::InvalidValue(format!("{plain}: {e}")))
    }
}

impl Codec<AttendanceStatus> for FieldCipher {
    fn encode(&self, value: &AttendanceStatus) -> Result<String, CryptoError> {
        self.encrypt(value.as_ref())
    }

    fn decode(&self, raw: &str) -> Result<AttendanceStatus, CryptoError> {
        let plain = self.decrypt(raw)?;
        plain
            .parse()
            .map_err(|_| CryptoError::InvalidValue(plain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{decode_opt, encode_opt};
    use chrono::NaiveDate;

    fn cipher() -> FieldCipher {
        FieldCipher::new("unit-test-secret").unwrap()
    }

    #[test]
    fn test_text_round_trip() {
        let c = cipher();
        let notes = "Izin ke dokter gigi".to_string();
        let sealed = c.encode(&notes).unwrap();
        assert_ne!(sealed, notes);
        let opened: String = c.decode(&sealed).unwrap();
        assert_eq!(opened, notes);
    }

    #[test]
    fn test_date_round_trip_keeps_fraction() {
        let c = cipher();
        let at = NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_milli_opt(8, 15, 42, 250)
            .unwrap();
        let sealed = c.encode(&at).unwrap();
        let opened: NaiveDateTime = c.decode(&sealed).unwrap();
        assert_eq!(opened, at);
    }

    #[test]
    fn test_status_round_trip() {
        let c = cipher();
        for status in [
            AttendanceStatus::Present,
            AttendanceStatus::Permit,
            AttendanceStatus::Leave,
            AttendanceStatus::Sick,
        ] {
            let sealed = c.encode(&status).unwrap();
            let opened: AttendanceStatus = c.decode(&sealed).unwrap();
            assert_eq!(opened, status);
        }
    }

    #[test]
    fn test_nonce_is_random() {
        let c = cipher();
        let a = c.encrypt("PRESENT").unwrap();
        let b = c.encrypt("PRESENT").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_absent_field_decodes_to_none() {
        let c = cipher();
        let decoded = decode_opt::<String, _>(&c, None).unwrap();
        assert!(decoded.is_none());
        let encoded = encode_opt::<String, _>(&c, None).unwrap();
        assert!(encoded.is_none());
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = cipher().encrypt("secret note").unwrap();
        let other = FieldCipher::new("another-secret").unwrap();
        assert!(matches!(other.decrypt(&sealed), Err(CryptoError::Decrypt)));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(cipher().decrypt("not base64 !!"), Err(CryptoError::Malformed(_))));
        assert!(matches!(cipher().decrypt("AAAA"), Err(CryptoError::Malformed(_))));
    }
}
