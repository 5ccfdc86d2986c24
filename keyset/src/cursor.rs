//! Cursor codec.
//!
//! A cursor is the opaque string form of a [`SortKey`] for one sort field. The
//! layout is private to this module and may change between releases; only
//! `decode(encode(k)) == k` within one build is guaranteed.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Deserialize;

use crate::field::SortField;
use crate::sort::SortKey;
use crate::{Error, Id, Result};

#[derive(Deserialize)]
struct Envelope {
    f: String,
    v: String,
    i: Id,
}

/// Encodes the position `key` of a row sorted by `field`.
pub fn encode<F: SortField>(field: F, key: &SortKey) -> String {
    debug_assert_eq!(key.value.kind(), field.kind());

    let envelope = serde_json::json!({
        "f": field.name(),
        "v": key.value.encode(),
        "i": key.id,
    });
    URL_SAFE_NO_PAD.encode(envelope.to_string())
}

/// Decodes a cursor produced by [`encode`] for the same `field`.
pub fn decode<F: SortField>(field: F, token: &str) -> Result<SortKey> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|e| Error::invalid_cursor(format!("not base64: {e}")))?;
    let envelope: Envelope = serde_json::from_slice(&bytes)
        .map_err(|e| Error::invalid_cursor(format!("malformed payload: {e}")))?;

    if envelope.f != field.name() {
        return Err(Error::invalid_cursor(format!(
            "issued for sort field `{}`, not `{}`",
            envelope.f,
            field.name()
        )));
    }

    Ok(SortKey {
        value: field.kind().decode(&envelope.v)?,
        id: envelope.i,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentSortField, UserSortField};
    use crate::sort::SortValue;
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;

    fn roundtrip<F: SortField>(field: F, key: SortKey) {
        let token = encode(field, &key);
        assert_eq!(decode(field, &token).unwrap(), key);
    }

    #[test]
    fn test_roundtrip_every_kind() {
        let ts = Utc.timestamp_opt(1_705_314_600, 987_000_000).unwrap();

        roundtrip(ContentSortField::CreatedAt, SortKey::new(ts, 1));
        roundtrip(ContentSortField::WatcherCount, SortKey::new(-42i64, 2));
        roundtrip(ContentSortField::Rate, SortKey::new(4.7, 3));
        roundtrip(UserSortField::IsLocked, SortKey::new(true, 4));
        roundtrip(UserSortField::Role, SortKey::new("ADMIN", 5));
        roundtrip(UserSortField::Name, SortKey::new("Zoë \"quoted\" / ü", 6));
    }

    #[test]
    fn test_roundtrip_five_digit_and_negative_years() {
        let far = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
        let bce = Utc.with_ymd_and_hms(-1, 6, 1, 12, 0, 0).unwrap();

        roundtrip(ContentSortField::CreatedAt, SortKey::new(far, 1));
        roundtrip(ContentSortField::CreatedAt, SortKey::new(bce, 2));
    }

    #[test]
    fn test_token_is_url_safe() {
        let token = encode(UserSortField::Name, &SortKey::new("a?b&c=d/e+f", u64::MAX));
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_malformed_tokens_are_invalid_cursor() {
        for token in ["", "!!!", "bm90IGpzb24", "e30"] {
            let err = decode(ContentSortField::CreatedAt, token).unwrap_err();
            assert!(err.is_invalid_cursor(), "token {token:?} gave {err}");
        }
    }

    #[test]
    fn test_cursor_for_other_field_is_rejected() {
        let token = encode(ContentSortField::WatcherCount, &SortKey::new(3i64, 9));
        let err = decode(ContentSortField::CreatedAt, &token).unwrap_err();
        assert!(err.is_invalid_cursor());
    }

    #[test]
    fn test_value_of_wrong_kind_is_rejected() {
        // Same field name, but the value does not parse as that field's kind.
        let forged = URL_SAFE_NO_PAD.encode(r#"{"f":"watcherCount","v":"many","i":1}"#);
        let err = decode(ContentSortField::WatcherCount, &forged).unwrap_err();
        assert!(err.is_invalid_cursor());
    }

    proptest! {
        #[test]
        fn prop_integer_roundtrip(v in any::<i64>(), id in any::<u64>()) {
            let key = SortKey::new(v, id);
            prop_assert_eq!(decode(ContentSortField::WatcherCount, &encode(ContentSortField::WatcherCount, &key)).unwrap(), key);
        }

        #[test]
        fn prop_float_roundtrip(v in any::<f64>().prop_filter("NaN sign is not preserved", |v| !v.is_nan()), id in any::<u64>()) {
            let key = SortKey::new(v, id);
            let back = decode(ContentSortField::Rate, &encode(ContentSortField::Rate, &key)).unwrap();
            match (&back.value, &key.value) {
                (SortValue::Float(a), SortValue::Float(b)) => prop_assert_eq!(a.to_bits(), b.to_bits()),
                _ => prop_assert!(false, "kind changed"),
            }
            prop_assert_eq!(back.id, id);
        }

        #[test]
        fn prop_timestamp_roundtrip(
            secs in DateTime::<Utc>::MIN_UTC.timestamp()..=DateTime::<Utc>::MAX_UTC.timestamp(),
            nanos in 0u32..1_000_000_000,
            id in any::<u64>(),
        ) {
            let ts = DateTime::from_timestamp(secs, nanos).unwrap();
            let key = SortKey::new(ts, id);
            prop_assert_eq!(decode(ContentSortField::CreatedAt, &encode(ContentSortField::CreatedAt, &key)).unwrap(), key);
        }

        #[test]
        fn prop_text_roundtrip(v in any::<String>(), id in any::<u64>()) {
            let key = SortKey::new(v, id);
            prop_assert_eq!(decode(UserSortField::Email, &encode(UserSortField::Email, &key)).unwrap(), key);
        }

        #[test]
        fn prop_bool_roundtrip(v in any::<bool>(), id in any::<u64>()) {
            let key = SortKey::new(v, id);
            prop_assert_eq!(decode(UserSortField::IsLocked, &encode(UserSortField::IsLocked, &key)).unwrap(), key);
        }
    }
}
