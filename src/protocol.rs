// DNS message structure produced by the deserializer

use std::fmt;

use crate::name::Name;
use crate::rdata::{class_name, type_name, RData};

/// Size of the fixed message header on the wire.
pub const HEADER_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub id: u16,      // Identifier, 16 bits
    pub qr: bool,     // Query or Response, 1 bit
    pub opcode: u8,   // Operation code, 4 bits
    pub aa: bool,     // Authoritative answer, 1 bit
    pub tc: bool,     // Truncated, 1 bit
    pub rd: bool,     // Recursion desired, 1 bit
    pub ra: bool,     // Recursion available, 1 bit
    pub z: u8,        // Reserved for future use, 3 bits
    pub rcode: u8,    // Response code, 4 bits
    pub qdcount: u16, // Number of questions, 16 bits
    pub ancount: u16, // Number of answers, 16 bits
    pub nscount: u16, // Number of authority records, 16 bits
    pub arcount: u16, // Number of additional records, 16 bits
}

impl MessageHeader {
    /// Splits the 16-bit flags word into its fields.
    pub(crate) fn from_wire(id: u16, flags: u16, counts: [u16; 4]) -> Self {
        let [qdcount, ancount, nscount, arcount] = counts;
        MessageHeader {
            id,
            // qr: bit 15
            qr: (flags & 0x8000) != 0,
            // opcode: bits 11-14
            opcode: ((flags & 0x7800) >> 11) as u8,
            // aa: bit 10
            aa: (flags & 0x0400) != 0,
            // tc: bit 9
            tc: (flags & 0x0200) != 0,
            // rd: bit 8
            rd: (flags & 0x0100) != 0,
            // ra: bit 7
            ra: (flags & 0x0080) != 0,
            // z: bits 4-6
            z: ((flags & 0x0070) >> 4) as u8,
            // rcode: bits 0-3
            rcode: (flags & 0x000F) as u8,
            qdcount,
            ancount,
            nscount,
            arcount,
        }
    }

    pub fn opcode_name(&self) -> &'static str {
        match self.opcode {
            0 => "QUERY",
            1 => "IQUERY",
            2 => "STATUS",
            4 => "NOTIFY",
            5 => "UPDATE",
            _ => "RESERVED",
        }
    }

    pub fn rcode_name(&self) -> &'static str {
        match self.rcode {
            0 => "NOERROR",
            1 => "FORMERR",
            2 => "SERVFAIL",
            3 => "NXDOMAIN",
            4 => "NOTIMP",
            5 => "REFUSED",
            _ => "UNKNOWN",
        }
    }

    /// Declared entry count of a section.
    pub fn count(&self, section: Section) -> u16 {
        match section {
            Section::Question => self.qdcount,
            Section::Answer => self.ancount,
            Section::Authority => self.nscount,
            Section::Additional => self.arcount,
        }
    }
}

/// The four repeated groups of a message, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Question,
    Answer,
    Authority,
    Additional,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Question,
        Section::Answer,
        Section::Authority,
        Section::Additional,
    ];
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Section::Question => "question",
            Section::Answer => "answer",
            Section::Authority => "authority",
            Section::Additional => "additional",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: Name,
    pub qtype: u16, // https://www.rfc-editor.org/rfc/rfc1035#section-3.2.2
    pub qclass: u16, // https://www.rfc-editor.org/rfc/rfc1035#section-3.2.4
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}",
            self.name,
            class_name(self.qclass),
            type_name(self.qtype)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: Name,
    pub rtype: u16,
    pub rclass: u16,
    pub ttl: u32, // Time to live in seconds
    pub rdata: RData,
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.name,
            self.ttl,
            class_name(self.rclass),
            type_name(self.rtype),
            self.rdata
        )
    }
}

/// A fully parsed DNS message.
///
/// Each section holds exactly as many entries as the header declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    header: MessageHeader,
    questions: Vec<Question>,
    answers: Vec<ResourceRecord>,
    authorities: Vec<ResourceRecord>,
    additionals: Vec<ResourceRecord>,
}

impl Message {
    pub(crate) fn new(
        header: MessageHeader,
        questions: Vec<Question>,
        answers: Vec<ResourceRecord>,
        authorities: Vec<ResourceRecord>,
        additionals: Vec<ResourceRecord>,
    ) -> Self {
        Message {
            header,
            questions,
            answers,
            authorities,
            additionals,
        }
    }

    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[ResourceRecord] {
        &self.answers
    }

    pub fn authorities(&self) -> &[ResourceRecord] {
        &self.authorities
    }

    pub fn additionals(&self) -> &[ResourceRecord] {
        &self.additionals
    }

    /// Records of one of the three resource record sections.
    ///
    /// The question section holds no resource records, so it yields an
    /// empty slice.
    pub fn records(&self, section: Section) -> &[ResourceRecord] {
        match section {
            Section::Question => &[],
            Section::Answer => &self.answers,
            Section::Authority => &self.authorities,
            Section::Additional => &self.additionals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_count_per_section() {
        let header = MessageHeader::from_wire(1, 0x8180, [1, 2, 3, 4]);
        let counts: Vec<u16> = Section::ALL
            .iter()
            .map(|&section| header.count(section))
            .collect();
        assert_eq!(counts, vec![1, 2, 3, 4]);
    }
}
