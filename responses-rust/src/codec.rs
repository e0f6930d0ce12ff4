//! Shared wire encoding.
//!
//! Every field of a wire type follows one of two disciplines, declared once
//! on the field and honoured by both directions:
//!
//! - required-nullable: `#[serde(with = "crate::codec::nullable")]`. The key
//!   is always written (as `null` when unset) and must be present on decode.
//! - optional-omit: `#[serde(default, skip_serializing_if = "Option::is_none")]`.
//!   The key is left out when unset.
use crate::{AnyValue, ResponsesError, ResponsesResult};
use serde::{de::DeserializeOwned, Serialize};

/// Serializes a value into JSON bytes.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> ResponsesResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(ResponsesError::encode)
}

pub fn encode_to_string<T: Serialize + ?Sized>(value: &T) -> ResponsesResult<String> {
    serde_json::to_string(value).map_err(ResponsesError::encode)
}

pub fn encode_to_value<T: Serialize + ?Sized>(value: &T) -> ResponsesResult<AnyValue> {
    serde_json::to_value(value).map_err(ResponsesError::encode)
}

/// Deserializes JSON bytes into a wire type.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> ResponsesResult<T> {
    serde_json::from_slice(bytes).map_err(ResponsesError::decode)
}

pub fn decode_str<T: DeserializeOwned>(text: &str) -> ResponsesResult<T> {
    serde_json::from_str(text).map_err(ResponsesError::decode)
}

pub fn decode_value<T: DeserializeOwned>(value: AnyValue) -> ResponsesResult<T> {
    serde_json::from_value(value).map_err(ResponsesError::decode)
}

/// Required-nullable field discipline.
///
/// serde treats a missing `Option` field as `None` unless a custom
/// deserializer is attached, so going through `with` is what makes an absent
/// key a decode error.
pub mod nullable {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_some(value),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer)
    }
}

/// Timestamps as integer seconds since the Unix epoch. Decoding also accepts
/// fractional seconds, which are truncated.
pub mod epoch_seconds {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use serde_json::Number;

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(seconds: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(*seconds)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let number = Number::deserialize(deserializer)?;
        seconds_from(&number)
            .ok_or_else(|| D::Error::custom(format!("invalid epoch timestamp: {number}")))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn seconds_from(number: &Number) -> Option<i64> {
        number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|value| value.is_finite())
                .map(|value| value.trunc() as i64)
        })
    }

    /// Required-nullable timestamp.
    pub mod nullable {
        use super::seconds_from;
        use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
        use serde_json::Number;

        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(
            seconds: &Option<i64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match seconds {
                Some(seconds) => serializer.serialize_some(seconds),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<i64>, D::Error> {
            match Option::<Number>::deserialize(deserializer)? {
                Some(number) => seconds_from(&number)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid epoch timestamp: {number}"))),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        #[serde(with = "nullable")]
        reason: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
        #[serde(with = "epoch_seconds")]
        at: i64,
    }

    #[test]
    fn nullable_field_must_be_present() {
        let err = decode_value::<Sample>(json!({ "at": 1 })).expect_err("missing key");
        assert!(matches!(err, ResponsesError::Decode(_)));

        let sample: Sample = decode_value(json!({ "reason": null, "at": 1 })).unwrap();
        assert_eq!(sample.reason, None);
        assert_eq!(sample.note, None);
    }

    #[test]
    fn nullable_field_encodes_null_and_optional_field_is_omitted() {
        let sample = Sample {
            reason: None,
            note: None,
            at: 7,
        };
        let value = encode_to_value(&sample).unwrap();
        assert_eq!(value, json!({ "reason": null, "at": 7 }));
    }

    #[test]
    fn epoch_seconds_accepts_fractional_input() {
        let sample: Sample = decode_value(json!({ "reason": "x", "at": 1_700_000_000.75 })).unwrap();
        assert_eq!(sample.at, 1_700_000_000);
        assert_eq!(encode_to_value(&sample).unwrap()["at"], json!(1_700_000_000));
    }
}
