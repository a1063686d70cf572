//! Handler Module
//!
//! One message in, one batch of events out. The pipeline is strictly linear
//! (attachment → XML text → tree → rows → collector) with no state shared
//! between invocations; any stage error aborts the whole run.

use crate::config::Config;
use crate::decoder::decode_attachment;
use crate::error::Result;
use crate::hec::HecForwarder;
use crate::mail::first_attachment;
use crate::report::extract_rows;
use crate::xml_tree::parse_xml_tree;

/// Processes one raw RFC 5322 message end to end and returns the number of
/// events forwarded to the collector.
pub async fn handle_message(
    raw: &[u8],
    config: &Config,
    forwarder: &HecForwarder,
) -> Result<usize> {
    let attachment = first_attachment(raw)?;
    log::debug!("processing attachment of type {}", attachment.mime_type);

    let xml = decode_attachment(&attachment, config)?;
    let tree = parse_xml_tree(&xml)?;
    let rows = extract_rows(&tree)?;
    log::info!("extracted {} record rows", rows.len());

    forwarder.forward(&rows).await?;
    Ok(rows.len())
}
