use bytes::Bytes;
use tracing::trace;

use crate::cursor::ByteCursor;
use crate::errors::{Malformed, ParseError};
use crate::name::decode_name;
use crate::protocol::{MessageHeader, Question, ResourceRecord, HEADER_SIZE};
use crate::rdata::decode_rdata;

/// Typed readers for the fixed structures of a DNS message.
#[derive(Debug)]
pub struct StructureReader {
    cursor: ByteCursor,
}

impl StructureReader {
    pub fn new(buffer: Bytes) -> Self {
        Self {
            cursor: ByteCursor::new(buffer),
        }
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    pub fn read_message_header(&mut self) -> Result<MessageHeader, ParseError> {
        let available = self.cursor.remaining();
        if available < HEADER_SIZE {
            return Err(ParseError::TruncatedMessage {
                offset: self.cursor.position(),
                needed: HEADER_SIZE,
                available,
            });
        }

        let id = self.cursor.read_u16()?;
        // 1 bit qr, 4 bits opcode, 1 bit each for aa, tc, rd and ra,
        // 3 bits z and 4 bits rcode
        let flags = self.cursor.read_u16()?;
        let qdcount = self.cursor.read_u16()?;
        let ancount = self.cursor.read_u16()?;
        let nscount = self.cursor.read_u16()?;
        let arcount = self.cursor.read_u16()?;

        Ok(MessageHeader::from_wire(
            id,
            flags,
            [qdcount, ancount, nscount, arcount],
        ))
    }

    pub fn read_question(&mut self) -> Result<Question, ParseError> {
        let name = decode_name(&mut self.cursor)?;
        let qtype = self.cursor.read_u16()?;
        let qclass = self.cursor.read_u16()?;

        Ok(Question {
            name,
            qtype,
            qclass,
        })
    }

    pub fn read_resource_record(&mut self) -> Result<ResourceRecord, ParseError> {
        let name = decode_name(&mut self.cursor)?;
        let rtype = self.cursor.read_u16()?;
        let rclass = self.cursor.read_u16()?;
        let ttl = self.cursor.read_u32()?;
        let rdlength = usize::from(self.cursor.read_u16()?);

        let start = self.cursor.position();
        let available = self.cursor.remaining();
        if rdlength > available {
            return Err(ParseError::TruncatedMessage {
                offset: start,
                needed: rdlength,
                available,
            });
        }

        let rdata = decode_rdata(rtype, rclass, self.cursor.buffer(), start..start + rdlength)
            .map_err(|shape| {
                ParseError::malformed(
                    start,
                    Malformed::RData {
                        rtype,
                        rclass,
                        shape,
                    },
                )
            })?;
        self.cursor.skip(rdlength)?;

        trace!(%name, rtype, rclass, ttl, rdlength, "read resource record");
        Ok(ResourceRecord {
            name,
            rtype,
            rclass,
            ttl,
            rdata,
        })
    }
}
