//! dmarc-relay Library
//!
//! This library ingests an inbound email carrying a DMARC aggregate report
//! (XML, optionally gzip- or zip-compressed), flattens the report into one
//! row per `<record>` element, and forwards the rows as events to a Splunk
//! HTTP Event Collector.
//!
//! Only the first attachment of a message is consulted; reports split across
//! several attachments are out of scope by design.

pub mod config;
pub mod decoder;
pub mod error;
pub mod handler;
pub mod hec;
pub mod mail;
pub mod mime_types;
pub mod models;
pub mod report;
pub mod xml_tree;

pub use config::Config;
pub use error::{RelayError, Result};
pub use handler::handle_message;
pub use hec::HecForwarder;
pub use models::DmarcRecordRow;
