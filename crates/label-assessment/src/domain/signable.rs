//! # Canonical Signable Reducer
//!
//! Reduces a [`Label`] to exactly the fields its signature covers and encodes
//! them deterministically.
//!
//! ## Signing convention
//!
//! - `src`, `uri`, `val`, `cts` are always present
//! - `ver`, `cid`, `neg`, `exp` are present only if the source label had them
//! - `sig` and every overflow key are never included
//!
//! An omitted optional field and an encoded `null` produce different bytes,
//! so each optional is set or left out individually.
//!
//! The encoding is DAG-CBOR: a definite-length map with keys ordered by
//! length, then bytewise, and minimally encoded integers.

use super::errors::VerificationError;
use super::label::Label;
use ciborium::Value;

/// The subset of a label covered by its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignableLabel {
    pub src: String,
    pub uri: String,
    pub val: String,
    pub cts: String,
    pub ver: Option<i64>,
    pub cid: Option<String>,
    pub neg: Option<bool>,
    pub exp: Option<String>,
}

/// Extract the signable fields of a label.
pub fn reduce(label: &Label) -> SignableLabel {
    let mut signable = SignableLabel {
        src: label.src.clone(),
        uri: label.uri.clone(),
        val: label.val.clone(),
        cts: label.cts.clone(),
        ver: None,
        cid: None,
        neg: None,
        exp: None,
    };
    if let Some(ver) = label.ver {
        signable.ver = Some(ver);
    }
    if let Some(cid) = &label.cid {
        signable.cid = Some(cid.clone());
    }
    if let Some(neg) = label.neg {
        signable.neg = Some(neg);
    }
    if let Some(exp) = &label.exp {
        signable.exp = Some(exp.clone());
    }
    signable
}

impl SignableLabel {
    /// The canonical map: present fields only, keys in DAG-CBOR order.
    pub fn canonical_value(&self) -> Value {
        let mut entries: Vec<(&'static str, Value)> = vec![
            ("src", Value::Text(self.src.clone())),
            ("uri", Value::Text(self.uri.clone())),
            ("val", Value::Text(self.val.clone())),
            ("cts", Value::Text(self.cts.clone())),
        ];
        if let Some(ver) = self.ver {
            entries.push(("ver", Value::Integer(ver.into())));
        }
        if let Some(cid) = &self.cid {
            entries.push(("cid", Value::Text(cid.clone())));
        }
        if let Some(neg) = self.neg {
            entries.push(("neg", Value::Bool(neg)));
        }
        if let Some(exp) = &self.exp {
            entries.push(("exp", Value::Text(exp.clone())));
        }

        entries.sort_by(|(a, _), (b, _)| {
            a.len()
                .cmp(&b.len())
                .then_with(|| a.as_bytes().cmp(b.as_bytes()))
        });

        Value::Map(
            entries
                .into_iter()
                .map(|(key, value)| (Value::Text(key.to_string()), value))
                .collect(),
        )
    }

    /// DAG-CBOR bytes of the canonical map.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, VerificationError> {
        let mut encoded = Vec::new();
        ciborium::ser::into_writer(&self.canonical_value(), &mut encoded)
            .map_err(|e| VerificationError::Encoding(e.to_string()))?;
        Ok(encoded)
    }
}
