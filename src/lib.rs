//! Deserializer for DNS messages in the RFC 1035 wire format.
//!
//! ```no_run
//! let bytes = std::fs::read("response.bin").unwrap();
//! let message = dns_deserializer::parse(&bytes).unwrap();
//! for answer in message.answers() {
//!     println!("{}", answer);
//! }
//! ```

pub mod cursor;
pub mod deserializer;
pub mod errors;
pub mod name;
pub mod protocol;
pub mod rdata;
pub mod reader;

use bytes::Bytes;

pub use crate::deserializer::MessageDeserializer;
pub use crate::errors::{ErrorKind, Malformed, ParseError};
pub use crate::name::{Label, Name};
pub use crate::protocol::{Message, MessageHeader, Question, ResourceRecord, Section};
pub use crate::rdata::{RData, ShapeError};

/// Parses one DNS message, copying it out of `buffer`.
pub fn parse(buffer: &[u8]) -> Result<Message, ParseError> {
    parse_bytes(Bytes::copy_from_slice(buffer))
}

/// Parses one DNS message; names and record data share `buffer`.
pub fn parse_bytes(buffer: Bytes) -> Result<Message, ParseError> {
    MessageDeserializer::new(buffer)?.read_message()
}
