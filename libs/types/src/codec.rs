//! Canonical record encoding
//!
//! Records are stored as JSON objects built field by field through serde, with
//! an extra `kind` member naming the record type. Object members are emitted in
//! sorted order, so equal records always encode to identical bytes and the two
//! will replicas can be compared byte for byte.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::errors::CodecError;
use crate::records::Record;

/// Name of the discriminator member added to every encoded record.
pub const KIND_FIELD: &str = "kind";

/// Encode a record into its canonical bytes.
pub fn encode<R: Record>(record: &R) -> Result<Vec<u8>, CodecError> {
    let mut value = serde_json::to_value(record).map_err(|e| CodecError::Encode {
        reason: e.to_string(),
    })?;

    let Value::Object(map) = &mut value else {
        return Err(CodecError::Encode {
            reason: format!("{} record did not serialize to an object", R::KIND),
        });
    };
    map.insert(
        KIND_FIELD.to_string(),
        Value::String(R::KIND.as_str().to_string()),
    );

    serde_json::to_vec(&value).map_err(|e| CodecError::Encode {
        reason: e.to_string(),
    })
}

/// Decode bytes into a record of kind `R`.
///
/// Fails with `WrongKind` when the bytes hold a valid record of another kind,
/// and with `Malformed` when they are not a record at all.
pub fn decode<R: Record>(bytes: &[u8]) -> Result<R, CodecError> {
    let mut value: Value = serde_json::from_slice(bytes).map_err(CodecError::malformed)?;

    let map = value.as_object_mut().ok_or_else(|| CodecError::Malformed {
        reason: "record is not a JSON object".to_string(),
    })?;

    let kind = map.remove(KIND_FIELD).ok_or(CodecError::MissingKind)?;
    match kind.as_str() {
        Some(found) if found == R::KIND.as_str() => {}
        Some(found) => {
            return Err(CodecError::WrongKind {
                expected: R::KIND,
                found: found.to_string(),
            })
        }
        None => {
            return Err(CodecError::WrongKind {
                expected: R::KIND,
                found: kind.to_string(),
            })
        }
    }

    serde_json::from_value(value).map_err(CodecError::malformed)
}

/// SHA-256 fingerprint of stored bytes.
pub fn document_digest(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Account, WillDocument};

    #[test]
    fn test_will_encoding_contains_all_fields() {
        let doc = WillDocument::new("will-1", "public note", "secret note");
        let bytes = encode(&doc).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["kind"], "will");
        assert_eq!(value["id"], "will-1");
        assert_eq!(value["visibleinfo"], "public note");
        assert_eq!(value["hiddeninfo"], "secret note");
        assert_eq!(value["islocked"], true);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let doc = WillDocument::new("will-1", "v", "h");
        assert_eq!(encode(&doc).unwrap(), encode(&doc.clone()).unwrap());
    }

    #[test]
    fn test_decode_account_from_will_bytes_is_wrong_kind() {
        let bytes = encode(&WillDocument::new("will-1", "v", "h")).unwrap();
        let err = decode::<Account>(&bytes).unwrap_err();
        assert_eq!(
            err,
            CodecError::WrongKind {
                expected: crate::records::RecordKind::Account,
                found: "will".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_arbitrary_bytes_is_malformed() {
        let err = decode::<Account>(b"seed-value").unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));
    }

    #[test]
    fn test_decode_non_object_is_malformed() {
        let err = decode::<WillDocument>(b"[1,2,3]").unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));
    }

    #[test]
    fn test_decode_untagged_object_is_missing_kind() {
        let raw = br#"{"name":"alice","password":"pw","propertyid":"p","info":"i"}"#;
        assert_eq!(decode::<Account>(raw).unwrap_err(), CodecError::MissingKind);
    }

    #[test]
    fn test_decode_missing_field_is_malformed() {
        let raw = br#"{"kind":"will","id":"will-1","visibleinfo":"v","islocked":true}"#;
        let err = decode::<WillDocument>(raw).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));
    }

    #[test]
    fn test_digest_differs_on_lock_state() {
        let mut doc = WillDocument::new("will-1", "v", "h");
        let locked = document_digest(&encode(&doc).unwrap());
        doc.unlock();
        let unlocked = document_digest(&encode(&doc).unwrap());
        assert_ne!(locked, unlocked);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::records::{Account, WillDocument};
    use proptest::prelude::*;

    /// Strings biased towards characters that broke hand-built JSON.
    fn field_text() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            "[\"\\\\{}:, a-z]{0,24}",
            any::<String>(),
        ]
    }

    proptest! {
        #[test]
        fn fuzz_account_round_trip(
            name in field_text(),
            password in field_text(),
            property_id in field_text(),
            info in field_text(),
        ) {
            let acc = Account::new(name, password, property_id, info);
            let decoded: Account = decode(&encode(&acc).unwrap()).unwrap();
            prop_assert_eq!(decoded, acc);
        }

        #[test]
        fn fuzz_will_round_trip(
            id in field_text(),
            visible in field_text(),
            hidden in field_text(),
            locked in any::<bool>(),
        ) {
            let mut doc = WillDocument::new(id, visible, hidden);
            doc.is_locked = locked;
            let decoded: WillDocument = decode(&encode(&doc).unwrap()).unwrap();
            prop_assert_eq!(decoded, doc);
        }
    }
}
