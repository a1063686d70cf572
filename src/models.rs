//! Data Models Module
//!
//! This module defines the flat record row produced from a DMARC aggregate
//! report and the closed enumerations its categorical fields draw from. Each
//! enumeration resolves source codes through an explicit match table with an
//! `Unknown` fallback; nothing here ever fails on unrecognized input.
use serde::{Deserialize, Serialize};
use std::fmt;

/// One flattened row per `<record>` element, carrying the enclosing report's
/// metadata and published policy alongside the per-record evaluation. Rows from
/// the same report share identical report-level and policy fields; only the
/// per-record fields vary. Field names serialize to the camelCase keys the
/// ingestion endpoint indexes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmarcRecordRow {
    pub report_metadata_report_id: String,
    pub report_metadata_org_name: String,
    pub report_metadata_date_range_begin: i64,
    pub report_metadata_date_range_end: i64,
    pub report_metadata_error: String,

    pub policy_published_domain: String,
    #[serde(rename = "policyPublishedADKIM")]
    pub policy_published_adkim: AlignmentType,
    #[serde(rename = "policyPublishedASPF")]
    pub policy_published_aspf: AlignmentType,
    #[serde(rename = "policyPublishedP")]
    pub policy_published_p: DispositionType,
    #[serde(rename = "policyPublishedSP")]
    pub policy_published_sp: DispositionType,
    pub policy_published_pct: i64,

    #[serde(rename = "recordRowSourceIP")]
    pub record_row_source_ip: String,
    pub record_row_count: i64,
    #[serde(rename = "recordRowPolicyEvaluatedDKIM")]
    pub record_row_policy_evaluated_dkim: DmarcResultType,
    #[serde(rename = "recordRowPolicyEvaluatedSPF")]
    pub record_row_policy_evaluated_spf: DmarcResultType,
    pub record_row_policy_evaluated_disposition: DispositionType,
    /// `None` when the report carries no override reason at all; a present but
    /// unrecognized reason code maps to `Some(Unknown)` instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_row_policy_evaluated_reason_type: Option<PolicyOverrideType>,
    pub record_identifiers_envelope_to: String,
    pub record_identifiers_header_from: String,
}

/// DKIM/SPF alignment mode published in the DMARC policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentType {
    Relaxed,
    Strict,
    Unknown,
}

/// Disposition a receiver applied or would apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispositionType {
    None,
    Quarantine,
    Reject,
    Unknown,
}

/// Aggregate DKIM/SPF evaluation verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DmarcResultType {
    Pass,
    Fail,
    Unknown,
}

/// Reason a receiver overrode the published disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyOverrideType {
    Forwarded,
    SampledOut,
    TrustedForwarder,
    MailingList,
    LocalPolicy,
    Other,
    Unknown,
}

impl AlignmentType {
    /// Maps the schema's one-letter alignment code.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "r" => AlignmentType::Relaxed,
            "s" => AlignmentType::Strict,
            _ => AlignmentType::Unknown,
        }
    }
}

impl DispositionType {
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "none" => DispositionType::None,
            "quarantine" => DispositionType::Quarantine,
            "reject" => DispositionType::Reject,
            _ => DispositionType::Unknown,
        }
    }
}

impl DmarcResultType {
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "pass" => DmarcResultType::Pass,
            "fail" => DmarcResultType::Fail,
            _ => DmarcResultType::Unknown,
        }
    }
}

impl PolicyOverrideType {
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "forwarded" => PolicyOverrideType::Forwarded,
            "sampled_out" => PolicyOverrideType::SampledOut,
            "trusted_forwarder" => PolicyOverrideType::TrustedForwarder,
            "mailing_list" => PolicyOverrideType::MailingList,
            "local_policy" => PolicyOverrideType::LocalPolicy,
            "other" => PolicyOverrideType::Other,
            _ => PolicyOverrideType::Unknown,
        }
    }
}

impl fmt::Display for AlignmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentType::Relaxed => write!(f, "relaxed"),
            AlignmentType::Strict => write!(f, "strict"),
            AlignmentType::Unknown => write!(f, "unknown"),
        }
    }
}

impl fmt::Display for DispositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispositionType::None => write!(f, "none"),
            DispositionType::Quarantine => write!(f, "quarantine"),
            DispositionType::Reject => write!(f, "reject"),
            DispositionType::Unknown => write!(f, "unknown"),
        }
    }
}

impl fmt::Display for DmarcResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DmarcResultType::Pass => write!(f, "pass"),
            DmarcResultType::Fail => write!(f, "fail"),
            DmarcResultType::Unknown => write!(f, "unknown"),
        }
    }
}

impl fmt::Display for PolicyOverrideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyOverrideType::Forwarded => write!(f, "forwarded"),
            PolicyOverrideType::SampledOut => write!(f, "sampled_out"),
            PolicyOverrideType::TrustedForwarder => write!(f, "trusted_forwarder"),
            PolicyOverrideType::MailingList => write!(f, "mailing_list"),
            PolicyOverrideType::LocalPolicy => write!(f, "local_policy"),
            PolicyOverrideType::Other => write!(f, "other"),
            PolicyOverrideType::Unknown => write!(f, "unknown"),
        }
    }
}
