//! # Label Records
//!
//! The wire shape of a label (`com.atproto.label.defs#label`) and its
//! structural validation.
//!
//! A label arrives in one of two encodings:
//! - JSON from `queryLabels`, where `sig` is `{"$bytes": "<base64>"}`
//! - DAG-CBOR from `subscribeLabels`, where `sig` is a byte string
//!
//! Both decode into the same [`Label`]. Keys outside the protocol schema are
//! kept in `overflow` so a failed signature can be attributed to them.

use super::errors::LabelValidationError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Maximum length of a label value, in bytes.
pub const MAX_VALUE_LEN: usize = 128;

/// A label as received from a labeler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Label schema version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ver: Option<i64>,
    /// DID of the issuer.
    pub src: String,
    /// Subject of the label.
    pub uri: String,
    /// Specific version of the subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    /// The label value.
    pub val: String,
    /// Whether this label negates an earlier one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neg: Option<bool>,
    /// Creation timestamp.
    pub cts: String,
    /// Expiry timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<String>,
    /// Signature over the canonical signable payload.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "sig_bytes::deserialize",
        serialize_with = "sig_bytes::serialize"
    )]
    pub sig: Option<Vec<u8>>,
    /// Keys not defined by the label schema.
    #[serde(flatten)]
    pub overflow: IndexMap<String, ciborium::Value>,
}

impl Label {
    /// Decode a JSON label record and validate its structure.
    pub fn from_json(value: serde_json::Value) -> Result<Self, LabelValidationError> {
        let label: Label = serde_json::from_value(value)
            .map_err(|e| LabelValidationError::Malformed(e.to_string()))?;
        validate_label(&label)?;
        Ok(label)
    }

    /// Names of the non-standard fields present on this label, in the order
    /// they arrived.
    pub fn overflow_fields(&self) -> Vec<String> {
        self.overflow.keys().cloned().collect()
    }
}

/// Check a decoded label against the label schema.
///
/// Only the shape is checked. Signature validity is a separate concern.
pub fn validate_label(label: &Label) -> Result<(), LabelValidationError> {
    if !is_did(&label.src) {
        return Err(LabelValidationError::field("src", "not a DID"));
    }
    if !has_uri_scheme(&label.uri) {
        return Err(LabelValidationError::field("uri", "not a URI"));
    }
    if label.val.is_empty() {
        return Err(LabelValidationError::field("val", "empty"));
    }
    if label.val.len() > MAX_VALUE_LEN {
        return Err(LabelValidationError::field(
            "val",
            format!("longer than {} bytes", MAX_VALUE_LEN),
        ));
    }
    check_datetime("cts", &label.cts)?;
    if let Some(exp) = &label.exp {
        check_datetime("exp", exp)?;
    }
    if let Some(cid) = &label.cid {
        if cid.is_empty() || !cid.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(LabelValidationError::field("cid", "not a CID string"));
        }
    }
    if matches!(&label.sig, Some(sig) if sig.is_empty()) {
        return Err(LabelValidationError::field("sig", "empty byte string"));
    }
    Ok(())
}

fn is_did(value: &str) -> bool {
    let mut parts = value.splitn(3, ':');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some("did"), Some(method), Some(id))
            if !method.is_empty()
                && method.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
                && !id.is_empty()
    )
}

fn has_uri_scheme(value: &str) -> bool {
    let Some((scheme, rest)) = value.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.is_empty()
}

fn check_datetime(field: &'static str, value: &str) -> Result<(), LabelValidationError> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|e| LabelValidationError::field(field, e.to_string()))
}

mod sig_bytes {
    use base64::alphabet;
    use base64::engine::general_purpose::{GeneralPurpose, NO_PAD};
    use base64::engine::DecodePaddingMode;
    use base64::Engine;
    use serde::de::{self, MapAccess, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    /// `$bytes` is unpadded standard base64, but padded input is tolerated.
    const BYTES_ENGINE: GeneralPurpose = GeneralPurpose::new(
        &alphabet::STANDARD,
        NO_PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
    );

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SigVisitor)
    }

    pub fn serialize<S>(sig: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match sig {
            Some(bytes) => serializer.serialize_bytes(bytes),
            None => serializer.serialize_none(),
        }
    }

    struct SigVisitor;

    impl<'de> Visitor<'de> for SigVisitor {
        type Value = Option<Vec<u8>>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a byte string or a {{\"$bytes\": <base64>}} object")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }

        fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
            Ok(Some(v.to_vec()))
        }

        fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut encoded: Option<String> = None;
            while let Some(key) = map.next_key::<String>()? {
                if key == "$bytes" {
                    encoded = Some(map.next_value()?);
                } else {
                    map.next_value::<de::IgnoredAny>()?;
                }
            }
            let encoded = encoded.ok_or_else(|| de::Error::missing_field("$bytes"))?;
            BYTES_ENGINE
                .decode(encoded.as_bytes())
                .map(Some)
                .map_err(|e| de::Error::custom(format!("invalid base64 in $bytes: {}", e)))
        }
    }
}
