use bytes::Bytes;
use tracing::debug;

use crate::errors::ParseError;
use crate::protocol::{Message, Question, ResourceRecord, Section, HEADER_SIZE};
use crate::reader::StructureReader;

// Smallest possible encodings: a root name plus the fixed fields.
const MIN_QUESTION_SIZE: usize = 1 + 4;
const MIN_RECORD_SIZE: usize = 1 + 10;

/// Reads one complete DNS message from a buffer.
///
/// The header is read first, then the question, answer, authority and
/// additional sections in that order, each holding exactly as many entries
/// as the header declares. The first failure ends the parse. Bytes left
/// over after the last section are ignored.
#[derive(Debug)]
pub struct MessageDeserializer {
    reader: StructureReader,
}

impl MessageDeserializer {
    pub fn new(buffer: impl Into<Bytes>) -> Result<Self, ParseError> {
        let buffer = buffer.into();
        if buffer.len() < HEADER_SIZE {
            return Err(ParseError::ShorterThanHeader {
                needed: HEADER_SIZE,
                available: buffer.len(),
            });
        }

        Ok(Self {
            reader: StructureReader::new(buffer),
        })
    }

    pub fn read_message(mut self) -> Result<Message, ParseError> {
        let header = self.reader.read_message_header()?;
        debug!(
            id = header.id,
            query_response = if header.qr { "Response" } else { "Query" },
            opcode = header.opcode_name(),
            authoritative = header.aa,
            truncated = header.tc,
            recursion_desired = header.rd,
            recursion_available = header.ra,
            response_code = header.rcode_name(),
            question_count = header.qdcount,
            answer_count = header.ancount,
            authority_count = header.nscount,
            additional_count = header.arcount,
            "DNS message header parsed"
        );

        let questions = self.read_questions(header.qdcount)?;
        let answers = self.read_resource_records(Section::Answer, header.ancount)?;
        let authorities = self.read_resource_records(Section::Authority, header.nscount)?;
        let additionals = self.read_resource_records(Section::Additional, header.arcount)?;

        let trailing = self.reader.remaining();
        if trailing > 0 {
            debug!(trailing, "ignoring bytes after the additional section");
        }

        Ok(Message::new(
            header,
            questions,
            answers,
            authorities,
            additionals,
        ))
    }

    // Question failures are passed through as-is; only resource records get
    // index context.
    fn read_questions(&mut self, count: u16) -> Result<Vec<Question>, ParseError> {
        let count = usize::from(count);
        let mut questions =
            Vec::with_capacity(count.min(self.reader.remaining() / MIN_QUESTION_SIZE));
        for _ in 0..count {
            questions.push(self.reader.read_question()?);
        }

        debug!(section = %Section::Question, count, "section parsed");
        Ok(questions)
    }

    fn read_resource_records(
        &mut self,
        section: Section,
        count: u16,
    ) -> Result<Vec<ResourceRecord>, ParseError> {
        let mut records = Vec::with_capacity(
            usize::from(count).min(self.reader.remaining() / MIN_RECORD_SIZE),
        );
        for index in 1..=usize::from(count) {
            let record = self
                .reader
                .read_resource_record()
                .map_err(|source| ParseError::ResourceRecord {
                    section,
                    index,
                    count,
                    source: Box::new(source),
                })?;
            records.push(record);
        }

        debug!(%section, count, "section parsed");
        Ok(records)
    }
}
