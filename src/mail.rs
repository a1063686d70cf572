//! Mail Boundary Module
//!
//! This module is the mail-transport boundary of the relay: it takes the raw
//! bytes of an RFC 5322 message and pulls out the first attachment. Everything
//! downstream works on the `{mime type, content}` pair it produces.

use crate::error::{RelayError, Result};
use mailparse::{parse_mail, DispositionType, ParsedMail};

/// An attachment as handed to the decoder: the declared MIME type and the
/// transfer-decoded content bytes.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub mime_type: String,
    pub content: Vec<u8>,
}

/// Extracts the first attachment from a raw message.
///
/// Only the first attachment is consulted; reports delivered across several
/// attachments are a deliberate scope limitation of this relay. A message
/// without any attachment is an error.
///
/// # Errors
///
/// Returns `RelayError::Mail` if the message cannot be parsed and
/// `RelayError::NoAttachment` if no part looks like an attachment.
pub fn first_attachment(raw: &[u8]) -> Result<Attachment> {
    let mail = parse_mail(raw)?;
    let part = locate_attachment(&mail).ok_or(RelayError::NoAttachment)?;
    Ok(Attachment {
        mime_type: part.ctype.mimetype.clone(),
        content: part.get_body_raw()?,
    })
}

/// Depth-first search for the first part that presents itself as an
/// attachment: either an `attachment` content disposition or a filename
/// parameter on the disposition or content type.
fn locate_attachment<'a, 'b>(part: &'a ParsedMail<'b>) -> Option<&'a ParsedMail<'b>> {
    let disposition = part.get_content_disposition();
    if disposition.disposition == DispositionType::Attachment
        || disposition.params.contains_key("filename")
        || part.ctype.params.contains_key("name")
    {
        return Some(part);
    }
    part.subparts.iter().find_map(locate_attachment)
}
