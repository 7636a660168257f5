//! # Label Signature Verification
//!
//! Pure verification of a label signature against a labeler's `did:key`.
//!
//! ## Key material
//!
//! `did:key:z<base58btc(multicodec || sec1 key)>`, where the multicodec is
//! `secp256k1-pub` (`0xe7`) or `p256-pub` (`0x1200`). A bare multibase string
//! without the `did:key:` prefix is accepted too.
//!
//! ## Security Notes
//!
//! - Signatures are 64-byte compact `r || s` over SHA-256 of the canonical bytes
//! - **Malleability**: high-S signatures are reported as not verifying, on both curves
//! - No network access and no shared state

use super::errors::VerificationError;
use super::signable::SignableLabel;
use k256::ecdsa::signature::Verifier as _;

const DID_KEY_PREFIX: &str = "did:key:";
const BASE58BTC_PREFIX: char = 'z';

/// Unsigned-varint multicodec prefix for a compressed secp256k1 public key.
const SECP256K1_CODEC: [u8; 2] = [0xe7, 0x01];
/// Unsigned-varint multicodec prefix for a compressed P-256 public key.
const P256_CODEC: [u8; 2] = [0x80, 0x24];

/// Length of a compact ECDSA signature.
pub const SIGNATURE_LEN: usize = 64;

/// A parsed labeler verification key.
#[derive(Debug, Clone)]
pub enum ValidationKey {
    Secp256k1(k256::ecdsa::VerifyingKey),
    P256(p256::ecdsa::VerifyingKey),
}

impl ValidationKey {
    /// Parse a `did:key` (or bare multibase) string.
    pub fn parse(key: &str) -> Result<Self, VerificationError> {
        let multibase = key.strip_prefix(DID_KEY_PREFIX).unwrap_or(key);
        let encoded = multibase.strip_prefix(BASE58BTC_PREFIX).ok_or_else(|| {
            VerificationError::InvalidKey(format!("{} is not base58btc multibase", key))
        })?;
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| VerificationError::InvalidKey(e.to_string()))?;

        if bytes.len() < 2 {
            return Err(VerificationError::InvalidKey("key is too short".into()));
        }
        let (codec, sec1) = bytes.split_at(2);
        match [codec[0], codec[1]] {
            SECP256K1_CODEC => k256::ecdsa::VerifyingKey::from_sec1_bytes(sec1)
                .map(Self::Secp256k1)
                .map_err(|e| VerificationError::InvalidKey(e.to_string())),
            P256_CODEC => p256::ecdsa::VerifyingKey::from_sec1_bytes(sec1)
                .map(Self::P256)
                .map_err(|e| VerificationError::InvalidKey(e.to_string())),
            other => Err(VerificationError::UnsupportedKeyType(u16::from_be_bytes(
                other,
            ))),
        }
    }

    /// Check a compact signature over `message`.
    ///
    /// `Ok(false)` means the signature is well-formed but does not verify.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, VerificationError> {
        if signature.len() != SIGNATURE_LEN {
            return Err(VerificationError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_LEN,
                signature.len()
            )));
        }
        match self {
            ValidationKey::Secp256k1(key) => {
                let sig = k256::ecdsa::Signature::from_slice(signature)
                    .map_err(|e| VerificationError::InvalidSignature(e.to_string()))?;
                if sig.normalize_s().is_some() {
                    return Ok(false);
                }
                Ok(key.verify(message, &sig).is_ok())
            }
            ValidationKey::P256(key) => {
                let sig = p256::ecdsa::Signature::from_slice(signature)
                    .map_err(|e| VerificationError::InvalidSignature(e.to_string()))?;
                if sig.normalize_s().is_some() {
                    return Ok(false);
                }
                Ok(key.verify(message, &sig).is_ok())
            }
        }
    }
}

/// Canonicalize `signable` and verify `signature` with the key named by `key`.
pub fn verify_label_signature(
    signable: &SignableLabel,
    signature: &[u8],
    key: &str,
) -> Result<bool, VerificationError> {
    let key = ValidationKey::parse(key)?;
    let message = signable.canonical_bytes()?;
    key.verify(&message, signature)
}

// =============================================================================
// TEST HELPERS
// =============================================================================
