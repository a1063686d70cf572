//! Error Handling Module
//!
//! This module defines the error types for dmarc-relay using the `thiserror` crate.
//! Every error is terminal for the current message: the pipeline aborts and the
//! invoking runtime decides what to do with the failure.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("no attachment found in message")]
    NoAttachment,

    #[error("unsupported attachment type: {0:?}")]
    UnsupportedAttachment(String),

    #[error("empty archive")]
    EmptyArchive,

    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XML: {0}")]
    XmlStructure(&'static str),

    #[error("invalid report structure: missing {0}")]
    InvalidReport(&'static str),

    #[error("forwarding failed: {0}")]
    Forwarding(String),

    #[error("message parse error: {0}")]
    Mail(#[from] mailparse::MailParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("invalid UTF-8 in report payload: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("payload too large: {0}")]
    TooLarge(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RelayError>;
