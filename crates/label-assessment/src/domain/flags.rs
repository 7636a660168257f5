//! # Diagnostic Flags
//!
//! The vocabulary of non-fatal findings. A flag's `Display` output is its
//! description; assessments tally flags by description.

use std::fmt;

/// A named, countable diagnostic finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flag {
    /// The label carried no signature.
    NoSignature,

    /// A signature was present but no validation key was available.
    SkippedValidation,

    /// The signature verified but the value is outside the policy set.
    UnregisteredValue(String),

    /// The signature did not verify. `overflow` lists non-standard field
    /// names found on the label, in arrival order.
    InvalidSignature { overflow: Vec<String> },

    /// Encoding or verification raised an error.
    VerificationCrashed(String),

    /// A streamed frame failed envelope validation.
    InvalidMessage(String),

    /// The stream died after at least one label was counted.
    StreamFailed(String),
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flag::NoSignature => write!(f, "Label used no signature"),
            Flag::SkippedValidation => write!(f, "Skipped label signature validation"),
            Flag::UnregisteredValue(val) => {
                write!(f, "Label assigned an unregistered value {}", val)
            }
            Flag::InvalidSignature { overflow } if overflow.is_empty() => {
                write!(f, "Invalid signature on label with only standard fields")
            }
            Flag::InvalidSignature { overflow } => write!(
                f,
                "Invalid signature on label with non-standard fields [{}]",
                overflow.join(", ")
            ),
            Flag::VerificationCrashed(cause) => {
                write!(f, "Label crashed signature validation: {}", cause)
            }
            Flag::InvalidMessage(cause) => {
                write!(f, "Message failed XRPC LabelMessage validation: {}", cause)
            }
            Flag::StreamFailed(cause) => {
                write!(f, "The message iterator stopped with a fatal error: {}", cause)
            }
        }
    }
}
