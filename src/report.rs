//! Report Row Extractor Module
//!
//! This module walks the parsed report tree and produces one flat
//! [`DmarcRecordRow`] per `<record>` element. It is the only consumer of the
//! untyped tree: required sections are validated here, numbers and strings are
//! coerced here, and enumeration codes are resolved here.

use crate::error::{RelayError, Result};
use crate::models::{AlignmentType, DispositionType, DmarcRecordRow, DmarcResultType, PolicyOverrideType};
use crate::xml_tree::XmlValue;

/// Extracts record rows from a parsed DMARC aggregate report.
///
/// The `feedback`, `report_metadata`, `policy_published` and `record` sections
/// must all be present; anything else is best-effort. A lone `<record>`
/// normalizes to a one-row result, and output order follows document order.
///
/// # Errors
///
/// Returns `RelayError::InvalidReport` naming the first missing section.
pub fn extract_rows(tree: &XmlValue) -> Result<Vec<DmarcRecordRow>> {
    let feedback = tree
        .child("feedback")
        .ok_or(RelayError::InvalidReport("feedback"))?;
    let metadata = feedback
        .child("report_metadata")
        .ok_or(RelayError::InvalidReport("report_metadata"))?;
    let policy = feedback
        .child("policy_published")
        .ok_or(RelayError::InvalidReport("policy_published"))?;
    let records = feedback
        .child("record")
        .ok_or(RelayError::InvalidReport("record"))?;

    // Report IDs are indexed with underscores; only the first hyphen is
    // rewritten, matching the sink's established field values.
    let report_id = metadata.text_of("report_id").replacen('-', "_", 1);
    let org_name = metadata.text_of("org_name").to_string();
    let date_range = metadata.child("date_range");
    let date_begin = date_range.map_or(0, |r| r.int_of("begin"));
    let date_end = date_range.map_or(0, |r| r.int_of("end"));
    let error = metadata
        .child("error")
        .map(|subtree| serde_json::to_string(subtree).unwrap_or_default())
        .unwrap_or_default();

    let policy_domain = policy.text_of("domain").to_string();
    let policy_adkim = AlignmentType::from_code(policy.text_of("adkim"));
    let policy_aspf = AlignmentType::from_code(policy.text_of("aspf"));
    let policy_p = DispositionType::from_code(policy.text_of("p"));
    let policy_sp = DispositionType::from_code(policy.text_of("sp"));
    let policy_pct = policy.int_of("pct");

    let mut rows = Vec::with_capacity(records.as_list().len());
    for record in records.as_list() {
        let row = record.child("row");
        let evaluated = row.and_then(|r| r.child("policy_evaluated"));
        let identifiers = record.child("identifiers");

        rows.push(DmarcRecordRow {
            report_metadata_report_id: report_id.clone(),
            report_metadata_org_name: org_name.clone(),
            report_metadata_date_range_begin: date_begin,
            report_metadata_date_range_end: date_end,
            report_metadata_error: error.clone(),

            policy_published_domain: policy_domain.clone(),
            policy_published_adkim: policy_adkim,
            policy_published_aspf: policy_aspf,
            policy_published_p: policy_p,
            policy_published_sp: policy_sp,
            policy_published_pct: policy_pct,

            record_row_source_ip: row.map_or("", |r| r.text_of("source_ip")).to_string(),
            record_row_count: row.map_or(0, |r| r.int_of("count")),
            record_row_policy_evaluated_dkim: DmarcResultType::from_code(
                evaluated.map_or("", |e| e.text_of("dkim")),
            ),
            record_row_policy_evaluated_spf: DmarcResultType::from_code(
                evaluated.map_or("", |e| e.text_of("spf")),
            ),
            record_row_policy_evaluated_disposition: DispositionType::from_code(
                evaluated.map_or("", |e| e.text_of("disposition")),
            ),
            // The override reason is genuinely optional: absent stays absent,
            // while a present reason with an unrecognized (or missing) type
            // code resolves to Unknown. Several reasons may appear; the first
            // one wins.
            record_row_policy_evaluated_reason_type: evaluated
                .and_then(|e| e.child("reason"))
                .and_then(|reason| reason.as_list().first())
                .map(|reason| PolicyOverrideType::from_code(reason.text_of("type"))),
            record_identifiers_envelope_to: identifiers
                .map_or("", |i| i.text_of("envelope_to"))
                .to_string(),
            record_identifiers_header_from: identifiers
                .map_or("", |i| i.text_of("header_from"))
                .to_string(),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml_tree::parse_xml_tree;

    const SINGLE_RECORD: &str = r#"
        <feedback>
          <report_metadata>
            <org_name>acme.example</org_name>
            <report_id>2021-01-01_example</report_id>
            <date_range><begin>1609459200</begin><end>1609545600</end></date_range>
          </report_metadata>
          <policy_published>
            <domain>example.com</domain>
            <adkim>r</adkim>
            <aspf>s</aspf>
            <p>none</p>
            <sp>quarantine</sp>
            <pct>100</pct>
          </policy_published>
          <record>
            <row>
              <source_ip>192.0.2.10</source_ip>
              <count>7</count>
              <policy_evaluated>
                <disposition>none</disposition>
                <dkim>pass</dkim>
                <spf>fail</spf>
              </policy_evaluated>
            </row>
            <identifiers>
              <envelope_to>example.com</envelope_to>
              <header_from>example.com</header_from>
            </identifiers>
          </record>
        </feedback>"#;

    fn extract(xml: &str) -> Vec<DmarcRecordRow> {
        extract_rows(&parse_xml_tree(xml).unwrap()).unwrap()
    }

    #[test]
    fn test_single_record_fidelity() {
        let rows = extract(SINGLE_RECORD);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.report_metadata_org_name, "acme.example");
        assert_eq!(row.report_metadata_date_range_begin, 1609459200);
        assert_eq!(row.report_metadata_date_range_end, 1609545600);
        assert_eq!(row.report_metadata_error, "");
        assert_eq!(row.policy_published_domain, "example.com");
        assert_eq!(row.policy_published_adkim, AlignmentType::Relaxed);
        assert_eq!(row.policy_published_aspf, AlignmentType::Strict);
        assert_eq!(row.policy_published_p, DispositionType::None);
        assert_eq!(row.policy_published_sp, DispositionType::Quarantine);
        assert_eq!(row.policy_published_pct, 100);
        assert_eq!(row.record_row_source_ip, "192.0.2.10");
        assert_eq!(row.record_row_count, 7);
        assert_eq!(row.record_row_policy_evaluated_dkim, DmarcResultType::Pass);
        assert_eq!(row.record_row_policy_evaluated_spf, DmarcResultType::Fail);
        assert_eq!(
            row.record_row_policy_evaluated_disposition,
            DispositionType::None
        );
        assert_eq!(row.record_identifiers_envelope_to, "example.com");
        assert_eq!(row.record_identifiers_header_from, "example.com");
    }

    #[test]
    fn test_report_id_first_hyphen_only() {
        let rows = extract(SINGLE_RECORD);
        assert_eq!(rows[0].report_metadata_report_id, "2021_01-01_example");
    }

    #[test]
    fn test_absent_reason_distinct_from_unknown() {
        let rows = extract(SINGLE_RECORD);
        assert_eq!(rows[0].record_row_policy_evaluated_reason_type, None);

        let with_reason = SINGLE_RECORD.replace(
            "<spf>fail</spf>",
            "<spf>fail</spf><reason><type>forwarded</type></reason>",
        );
        let rows = extract(&with_reason);
        assert_eq!(
            rows[0].record_row_policy_evaluated_reason_type,
            Some(PolicyOverrideType::Forwarded)
        );

        let with_bogus_reason = SINGLE_RECORD.replace(
            "<spf>fail</spf>",
            "<spf>fail</spf><reason><type>out_of_band</type></reason>",
        );
        let rows = extract(&with_bogus_reason);
        assert_eq!(
            rows[0].record_row_policy_evaluated_reason_type,
            Some(PolicyOverrideType::Unknown)
        );
    }

    #[test]
    fn test_unrecognized_alignment_code() {
        let rows = extract(&SINGLE_RECORD.replace("<adkim>r</adkim>", "<adkim>q</adkim>"));
        assert_eq!(rows[0].policy_published_adkim, AlignmentType::Unknown);
    }

    #[test]
    fn test_numeric_coercion_to_zero() {
        let rows = extract(
            &SINGLE_RECORD
                .replace("<count>7</count>", "<count>many</count>")
                .replace("<pct>100</pct>", ""),
        );
        assert_eq!(rows[0].record_row_count, 0);
        assert_eq!(rows[0].policy_published_pct, 0);
    }

    #[test]
    fn test_error_subtree_serialized_as_json() {
        let with_error = SINGLE_RECORD.replace(
            "</date_range>",
            "</date_range><error>partial data</error>",
        );
        let rows = extract(&with_error);
        assert_eq!(rows[0].report_metadata_error, r#""partial data""#);

        let with_errors = SINGLE_RECORD.replace(
            "</date_range>",
            "</date_range><error>a</error><error>b</error>",
        );
        let rows = extract(&with_errors);
        assert_eq!(rows[0].report_metadata_error, r#"["a","b"]"#);
    }

    #[test]
    fn test_multiple_records_share_report_fields() {
        let two_records = SINGLE_RECORD.replace(
            "</feedback>",
            r#"<record>
                 <row>
                   <source_ip>198.51.100.9</source_ip>
                   <count>2</count>
                   <policy_evaluated>
                     <disposition>reject</disposition>
                     <dkim>fail</dkim>
                     <spf>fail</spf>
                   </policy_evaluated>
                 </row>
                 <identifiers><header_from>example.com</header_from></identifiers>
               </record></feedback>"#,
        );
        let rows = extract(&two_records);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].report_metadata_report_id,
            rows[1].report_metadata_report_id
        );
        assert_eq!(
            rows[0].policy_published_domain,
            rows[1].policy_published_domain
        );
        assert_ne!(rows[0].record_row_source_ip, rows[1].record_row_source_ip);
        assert_eq!(rows[1].record_row_count, 2);
        assert_eq!(
            rows[1].record_row_policy_evaluated_disposition,
            DispositionType::Reject
        );
        // envelope_to is optional; absent collapses to empty.
        assert_eq!(rows[1].record_identifiers_envelope_to, "");
    }

    #[test]
    fn test_missing_sections_rejected() {
        let no_policy = SINGLE_RECORD.replace("policy_published>", "policy_unpublished>");
        let err = extract_rows(&parse_xml_tree(&no_policy).unwrap()).unwrap_err();
        assert!(matches!(err, RelayError::InvalidReport("policy_published")));

        let err = extract_rows(&parse_xml_tree("<other/>").unwrap()).unwrap_err();
        assert!(matches!(err, RelayError::InvalidReport("feedback")));
    }
}
