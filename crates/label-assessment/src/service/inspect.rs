//! Per-label signature and policy inspection shared by both pipelines.

use crate::domain::assessment::Assessment;
use crate::domain::entities::PolicySet;
use crate::domain::flags::Flag;
use crate::domain::label::Label;
use crate::domain::signable::reduce;
use crate::domain::signature::verify_label_signature;
use tracing::debug;

/// How a label without a signature is treated.
///
/// The two pipelines differ here: a query always reports the missing
/// signature, a subscription only when it has a key to check against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnsignedLabelPolicy {
    /// Flag every unsigned label.
    AlwaysFlag,
    /// Flag unsigned labels only when a validation key is configured;
    /// otherwise the label is not counted.
    FlagWithKey,
}

/// Checks labels against an optional key and policy set.
pub(crate) struct LabelInspector<'a> {
    key: Option<&'a str>,
    policies: Option<&'a PolicySet>,
    unsigned: UnsignedLabelPolicy,
}

impl<'a> LabelInspector<'a> {
    pub(crate) fn new(
        key: Option<&'a str>,
        policies: Option<&'a PolicySet>,
        unsigned: UnsignedLabelPolicy,
    ) -> Self {
        Self {
            key,
            policies,
            unsigned,
        }
    }

    /// Record the outcome of one structurally valid label.
    pub(crate) fn inspect(&self, label: &Label, assessment: &mut Assessment) {
        match (&label.sig, self.key) {
            (Some(sig), Some(key)) => self.verify(label, sig, key, assessment),
            (Some(_), None) => assessment.add_flag(Flag::SkippedValidation),
            (None, key) => match self.unsigned {
                UnsignedLabelPolicy::AlwaysFlag => assessment.add_flag(Flag::NoSignature),
                UnsignedLabelPolicy::FlagWithKey if key.is_some() => {
                    assessment.add_flag(Flag::NoSignature)
                }
                UnsignedLabelPolicy::FlagWithKey => {
                    debug!(uri = %label.uri, "Unsigned label ignored without a key");
                }
            },
        }
    }

    fn verify(&self, label: &Label, sig: &[u8], key: &str, assessment: &mut Assessment) {
        let signable = reduce(label);
        match verify_label_signature(&signable, sig, key) {
            Ok(true) => match self.policies {
                Some(policies) if !policies.contains(&label.val) => {
                    debug!(val = %label.val, "Label value not registered");
                    assessment.add_flag(Flag::UnregisteredValue(label.val.clone()));
                }
                _ => assessment.add_passed(),
            },
            Ok(false) => {
                debug!(uri = %label.uri, "Label signature did not verify");
                assessment.add_flag(Flag::InvalidSignature {
                    overflow: label.overflow_fields(),
                });
            }
            Err(e) => {
                debug!(error = %e, "Label signature check failed");
                assessment.add_flag(Flag::VerificationCrashed(e.to_string()));
            }
        }
    }
}
