//! MIME Type Registry Module
//!
//! A static registry mapping registered MIME types to their canonical file
//! extensions. The decoder only cares about the handful of types DMARC
//! reporters actually send; anything outside the table resolves to `None`.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref MIME_EXTENSIONS: HashMap<&'static str, &'static str> = {
        let mut table = HashMap::new();
        table.insert("application/gzip", "gz");
        table.insert("application/x-gzip", "gz");
        table.insert("application/gzip-compressed", "gz");
        table.insert("application/zip", "zip");
        table.insert("application/x-zip-compressed", "zip");
        table.insert("application/zip-compressed", "zip");
        table.insert("text/xml", "xml");
        table.insert("application/xml", "xml");
        table
    };
}

/// Resolves a MIME type to its canonical extension.
///
/// The lookup is case-insensitive and ignores parameters, so
/// `Application/ZIP; name="report.zip"` resolves to `zip`.
pub fn extension_for(mime_type: &str) -> Option<&'static str> {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    MIME_EXTENSIONS.get(essence.as_str()).copied()
}
