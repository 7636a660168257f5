//! Command-line arguments and their normalizers.

use clap::Parser;
use label_assessment::{PolicySet, ValidationKey};
use reqwest::Url;

/// AT Protocol Labeler Diagnostics
#[derive(Parser, Debug)]
#[command(name = "labeler-diagnostics", version)]
#[command(about = "Checks a labeler's signatures and policies over queryLabels and subscribeLabels")]
#[command(after_help = "Environment:\n  \
    USER_AGENT                   default for --agent\n  \
    ATPROTO_PDS                  default for --pds\n  \
    LABELER_RESULT_TIMEOUT_SECS  deadline per transport (default 15)\n  \
    RUST_LOG                     log filter (default warn)")]
pub struct Args {
    /// The user-agent string to use when connecting to the labeler
    #[arg(long)]
    pub agent: Option<String>,

    /// The target number of labels to validate
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub depth: u64,

    /// The labeler's service endpoint URL
    #[arg(long, value_parser = normalize_url)]
    pub endpoint: Url,

    /// The labeler's validation key (did:key or multibase)
    #[arg(long, value_parser = normalize_key)]
    pub key: Option<String>,

    /// The labeler's DID, used to look up its label policies
    #[arg(long, value_parser = normalize_did)]
    pub did: Option<String>,

    /// The PDS hosting the labeler's service record
    #[arg(long, value_parser = normalize_url)]
    pub pds: Option<Url>,

    /// Registered label values, comma separated. Skips the policy lookup.
    #[arg(long, value_delimiter = ',')]
    pub labels: Option<Vec<String>>,

    /// Do not test queryLabels
    #[arg(long)]
    pub skip_query: bool,

    /// Do not test subscribeLabels
    #[arg(long)]
    pub skip_subscribe: bool,

    /// Log engine activity at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The explicit policy set, if `--labels` was given.
    pub fn policy_set(&self) -> Option<PolicySet> {
        self.labels.as_ref().map(|labels| {
            labels
                .iter()
                .map(|label| label.trim())
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}

/// Accept only http and https URLs.
pub fn normalize_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|_| "Not a valid URL".to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err("URL must use HTTP/HTTPS".to_string()),
    }
}

/// Lower-case a DID and check its syntax.
pub fn normalize_did(raw: &str) -> Result<String, String> {
    let did = raw.to_lowercase();
    let rest = did
        .strip_prefix("did:")
        .ok_or_else(|| "DID requires \"did:\" prefix".to_string())?;
    let (method, id) = rest
        .split_once(':')
        .ok_or_else(|| "DID requires prefix, method, and method-specific content".to_string())?;

    if method.is_empty() || !method.chars().all(|c| c.is_ascii_lowercase()) {
        return Err("DID method must be lower-case letters".to_string());
    }
    if id.is_empty() || id.ends_with(':') || id.ends_with('%') {
        return Err("DID can not end with \":\" or \"%\"".to_string());
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ':' | '%' | '-'))
    {
        return Err("Disallowed characters in DID".to_string());
    }
    if did.len() > 2048 {
        return Err("DID is too long (2048 chars max)".to_string());
    }
    Ok(did)
}

/// Turn a validation key into `did:key` form.
///
/// `did:` values are taken as given; anything else must be a multibase key
/// the engine can verify with.
pub fn normalize_key(raw: &str) -> Result<String, String> {
    if raw.starts_with("did:") {
        return Ok(raw.to_string());
    }
    ValidationKey::parse(raw)
        .map(|_| format!("did:key:{}", raw))
        .map_err(|_| "Not a valid validation key".to_string())
}
