//! Attachment Decoder Module
//!
//! This module turns an attachment into the XML text of the report it carries.
//! The compression format is decided by the attachment's declared MIME type
//! (resolved through the registry in [`crate::mime_types`]), never by sniffing
//! the content. It enforces a configurable ceiling on decompressed size.

use crate::config::Config;
use crate::error::{RelayError, Result};
use crate::mail::Attachment;
use crate::mime_types::extension_for;
use flate2::read::GzDecoder;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Decodes an attachment into XML text.
///
/// * `gz` attachments are gzip-decompressed.
/// * `zip` attachments must contain at least one entry; the first entry is
///   read and any further entries are ignored.
/// * `xml` attachments are taken as-is.
/// * Any other resolved extension is rejected, naming the extension.
pub fn decode_attachment(attachment: &Attachment, config: &Config) -> Result<String> {
    let extension = extension_for(&attachment.mime_type).unwrap_or("");
    match extension {
        "gz" => {
            let decoder = GzDecoder::new(Cursor::new(&attachment.content));
            let mut contents = String::new();
            let len = decoder
                .take(config.max_decompressed_size as u64 + 1)
                .read_to_string(&mut contents)?;
            if len > config.max_decompressed_size {
                return Err(RelayError::TooLarge(
                    "decompressed gzip payload exceeds limit".to_string(),
                ));
            }
            Ok(contents)
        }
        "zip" => {
            let mut archive = ZipArchive::new(Cursor::new(&attachment.content))?;
            if archive.is_empty() {
                return Err(RelayError::EmptyArchive);
            }
            let mut entry = archive.by_index(0)?;
            if entry.size() > config.max_decompressed_size as u64 {
                return Err(RelayError::TooLarge(format!(
                    "zip entry {} exceeds decompressed size limit",
                    entry.name()
                )));
            }
            let mut contents = String::with_capacity(entry.size() as usize);
            entry.read_to_string(&mut contents)?;
            Ok(contents)
        }
        "xml" => Ok(String::from_utf8(attachment.content.clone())?),
        other => Err(RelayError::UnsupportedAttachment(other.to_string())),
    }
}
