//! Record data catalog.
//!
//! Payloads are decoded through a static table keyed by record type and,
//! where the layout depends on it, record class. Combinations the table
//! does not know are kept as opaque bytes.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::ops::Range;

use bytes::Bytes;

use crate::cursor::ByteCursor;
use crate::errors::ParseError;
use crate::name::{decode_name, Name};

// DNS Record Type Constants
pub const TYPE_A: u16 = 1; // IPv4 address
pub const TYPE_NS: u16 = 2; // Name server
pub const TYPE_CNAME: u16 = 5; // Canonical name
pub const TYPE_SOA: u16 = 6; // Start of authority
pub const TYPE_PTR: u16 = 12; // Pointer record
pub const TYPE_MX: u16 = 15; // Mail exchange
pub const TYPE_TXT: u16 = 16; // Text record
pub const TYPE_AAAA: u16 = 28; // IPv6 address
pub const TYPE_SRV: u16 = 33; // Service locator

// DNS Class Constants
pub const CLASS_IN: u16 = 1; // Internet
pub const CLASS_CH: u16 = 3; // Chaos
pub const CLASS_HS: u16 = 4; // Hesiod
pub const CLASS_NONE: u16 = 254;
pub const CLASS_ANY: u16 = 255;

// Multicast DNS reuses the top class bit as the cache-flush flag.
pub const CLASS_MASK: u16 = 0x7FFF;
pub const CLASS_UNIQUE: u16 = 0x8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Soa {
    pub mname: Name,
    pub rname: Name,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

/// Typed payload of a resource record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Ns(Name),
    Cname(Name),
    Ptr(Name),
    Mx { preference: u16, exchange: Name },
    Txt(Vec<Bytes>),
    Soa(Soa),
    Srv {
        priority: u16,
        weight: u16,
        port: u16,
        target: Name,
    },
    /// Payload of a type/class combination the catalog has no layout for.
    Unknown(Bytes),
}

/// Record data that does not fit the layout its type demands
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("expected {expected} bytes of record data, found {actual}")]
    Length { expected: usize, actual: usize },

    #[error("{0} bytes left over after the record data fields")]
    TrailingBytes(usize),

    #[error("TXT record data holds no character strings")]
    EmptyText,

    #[error("record data range {start}..{end} lies outside a {len} byte message")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("record data field could not be read: {0}")]
    Field(Box<ParseError>),
}

impl From<ParseError> for ShapeError {
    fn from(err: ParseError) -> Self {
        ShapeError::Field(Box::new(err))
    }
}

type Decoder = fn(&mut ByteCursor, usize) -> Result<RData, ShapeError>;

struct CatalogEntry {
    rtype: u16,
    // None matches every class.
    rclass: Option<u16>,
    decode: Decoder,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        rtype: TYPE_A,
        rclass: Some(CLASS_IN),
        decode: decode_a,
    },
    CatalogEntry {
        rtype: TYPE_AAAA,
        rclass: Some(CLASS_IN),
        decode: decode_aaaa,
    },
    CatalogEntry {
        rtype: TYPE_NS,
        rclass: None,
        decode: decode_ns,
    },
    CatalogEntry {
        rtype: TYPE_CNAME,
        rclass: None,
        decode: decode_cname,
    },
    CatalogEntry {
        rtype: TYPE_PTR,
        rclass: None,
        decode: decode_ptr,
    },
    CatalogEntry {
        rtype: TYPE_MX,
        rclass: None,
        decode: decode_mx,
    },
    CatalogEntry {
        rtype: TYPE_TXT,
        rclass: None,
        decode: decode_txt,
    },
    CatalogEntry {
        rtype: TYPE_SOA,
        rclass: None,
        decode: decode_soa,
    },
    CatalogEntry {
        rtype: TYPE_SRV,
        rclass: None,
        decode: decode_srv,
    },
];

fn lookup(rtype: u16, rclass: u16) -> Option<Decoder> {
    let rclass = rclass & CLASS_MASK;
    CATALOG
        .iter()
        .find(|entry| entry.rtype == rtype && entry.rclass.map_or(true, |c| c == rclass))
        .map(|entry| entry.decode)
}

/// Decodes the record data occupying `range` of `message`.
///
/// The whole message is passed so that names inside the payload can follow
/// compression pointers to earlier parts of it. The payload must consume
/// exactly the bytes of `range`.
pub fn decode_rdata(
    rtype: u16,
    rclass: u16,
    message: &Bytes,
    range: Range<usize>,
) -> Result<RData, ShapeError> {
    if range.start > range.end || range.end > message.len() {
        return Err(ShapeError::OutOfBounds {
            start: range.start,
            end: range.end,
            len: message.len(),
        });
    }

    let Some(decode) = lookup(rtype, rclass) else {
        return Ok(RData::Unknown(message.slice(range)));
    };

    // Bounding the cursor at the end of the payload turns any overrun into
    // a failed read.
    let mut cursor = ByteCursor::at(message.slice(..range.end), range.start);
    let rdata = decode(&mut cursor, range.len())?;

    match range.end - cursor.position() {
        0 => Ok(rdata),
        trailing => Err(ShapeError::TrailingBytes(trailing)),
    }
}

fn expect_len(expected: usize, actual: usize) -> Result<(), ShapeError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ShapeError::Length { expected, actual })
    }
}

fn decode_a(cursor: &mut ByteCursor, len: usize) -> Result<RData, ShapeError> {
    expect_len(4, len)?;
    Ok(RData::A(Ipv4Addr::from(cursor.read_u32()?)))
}

fn decode_aaaa(cursor: &mut ByteCursor, len: usize) -> Result<RData, ShapeError> {
    expect_len(16, len)?;
    let bytes = cursor.read_bytes(16)?;
    let mut octets = [0u8; 16];
    octets.copy_from_slice(&bytes);
    Ok(RData::Aaaa(Ipv6Addr::from(octets)))
}

fn decode_ns(cursor: &mut ByteCursor, _len: usize) -> Result<RData, ShapeError> {
    Ok(RData::Ns(decode_name(cursor)?))
}

fn decode_cname(cursor: &mut ByteCursor, _len: usize) -> Result<RData, ShapeError> {
    Ok(RData::Cname(decode_name(cursor)?))
}

fn decode_ptr(cursor: &mut ByteCursor, _len: usize) -> Result<RData, ShapeError> {
    Ok(RData::Ptr(decode_name(cursor)?))
}

fn decode_mx(cursor: &mut ByteCursor, _len: usize) -> Result<RData, ShapeError> {
    let preference = cursor.read_u16()?;
    let exchange = decode_name(cursor)?;
    Ok(RData::Mx {
        preference,
        exchange,
    })
}

fn decode_txt(cursor: &mut ByteCursor, len: usize) -> Result<RData, ShapeError> {
    let end = cursor.position() + len;
    let mut strings = Vec::new();
    while cursor.position() < end {
        let length = cursor.read_u8()?;
        strings.push(cursor.read_bytes(usize::from(length))?);
    }
    if strings.is_empty() {
        return Err(ShapeError::EmptyText);
    }
    Ok(RData::Txt(strings))
}

fn decode_soa(cursor: &mut ByteCursor, _len: usize) -> Result<RData, ShapeError> {
    let mname = decode_name(cursor)?;
    let rname = decode_name(cursor)?;
    Ok(RData::Soa(Soa {
        mname,
        rname,
        serial: cursor.read_u32()?,
        refresh: cursor.read_u32()?,
        retry: cursor.read_u32()?,
        expire: cursor.read_u32()?,
        minimum: cursor.read_u32()?,
    }))
}

fn decode_srv(cursor: &mut ByteCursor, _len: usize) -> Result<RData, ShapeError> {
    let priority = cursor.read_u16()?;
    let weight = cursor.read_u16()?;
    let port = cursor.read_u16()?;
    Ok(RData::Srv {
        priority,
        weight,
        port,
        target: decode_name(cursor)?,
    })
}

/// Mnemonic for a record type, or the `TYPE<n>` form for unknown types.
pub fn type_name(rtype: u16) -> String {
    match rtype {
        TYPE_A => "A".to_string(),
        TYPE_NS => "NS".to_string(),
        TYPE_CNAME => "CNAME".to_string(),
        TYPE_SOA => "SOA".to_string(),
        TYPE_PTR => "PTR".to_string(),
        TYPE_MX => "MX".to_string(),
        TYPE_TXT => "TXT".to_string(),
        TYPE_AAAA => "AAAA".to_string(),
        TYPE_SRV => "SRV".to_string(),
        other => format!("TYPE{}", other),
    }
}

/// Mnemonic for a record class, or the `CLASS<n>` form for unknown classes.
pub fn class_name(rclass: u16) -> String {
    match rclass {
        CLASS_IN => "IN".to_string(),
        CLASS_CH => "CH".to_string(),
        CLASS_HS => "HS".to_string(),
        CLASS_NONE => "NONE".to_string(),
        CLASS_ANY => "ANY".to_string(),
        other => format!("CLASS{}", other),
    }
}

fn write_character_string(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str("\"")?;
    for &byte in bytes {
        match byte {
            b'"' | b'\\' => write!(f, "\\{}", byte as char)?,
            0x20..=0x7e => write!(f, "{}", byte as char)?,
            _ => write!(f, "\\{:03}", byte)?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RData::A(addr) => write!(f, "{}", addr),
            RData::Aaaa(addr) => write!(f, "{}", addr),
            RData::Ns(name) | RData::Cname(name) | RData::Ptr(name) => write!(f, "{}", name),
            RData::Mx {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange),
            RData::Txt(strings) => {
                for (i, string) in strings.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write_character_string(f, string)?;
                }
                Ok(())
            }
            RData::Soa(soa) => write!(
                f,
                "{} {} {} {} {} {} {}",
                soa.mname, soa.rname, soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum
            ),
            RData::Srv {
                priority,
                weight,
                port,
                target,
            } => write!(f, "{} {} {} {}", priority, weight, port, target),
            // RFC 3597 generic form
            RData::Unknown(bytes) if bytes.is_empty() => f.write_str("\\# 0"),
            RData::Unknown(bytes) => write!(f, "\\# {} {}", bytes.len(), hex::encode(bytes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, Malformed};

    fn decode(
        rtype: u16,
        rclass: u16,
        message: &'static [u8],
        start: usize,
    ) -> Result<RData, ShapeError> {
        decode_rdata(
            rtype,
            rclass,
            &Bytes::from_static(message),
            start..message.len(),
        )
    }

    #[test]
    fn test_decode_a_record() {
        let rdata = decode(TYPE_A, CLASS_IN, &[93, 184, 216, 34], 0).unwrap();
        assert_eq!(rdata, RData::A(Ipv4Addr::new(93, 184, 216, 34)));
        assert_eq!(rdata.to_string(), "93.184.216.34");
    }

    #[test]
    fn test_a_record_wrong_length() {
        let err = decode(TYPE_A, CLASS_IN, &[10, 0, 0], 0).unwrap_err();
        assert!(matches!(
            err,
            ShapeError::Length {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_a_record_outside_in_class_is_opaque() {
        let rdata = decode(TYPE_A, CLASS_CH, b"\x04host\x00\x00\x01", 0).unwrap();
        assert!(matches!(rdata, RData::Unknown(ref bytes) if bytes.len() == 8));
    }

    #[test]
    fn test_decode_aaaa_record() {
        let bytes: &'static [u8] = &[
            0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01,
        ];
        let rdata = decode(TYPE_AAAA, CLASS_IN, bytes, 0).unwrap();
        assert_eq!(rdata.to_string(), "2001:db8::1");
    }

    #[test]
    fn test_mx_exchange_follows_pointer() {
        // "example.com" at 0, then the MX payload at 13.
        let message: &'static [u8] = b"\x07example\x03com\x00\x00\x0a\x04mail\xc0\x00";
        let rdata = decode(TYPE_MX, CLASS_IN, message, 13).unwrap();
        assert_eq!(
            rdata,
            RData::Mx {
                preference: 10,
                exchange: Name::from_ascii("mail.example.com").unwrap(),
            }
        );
        assert_eq!(rdata.to_string(), "10 mail.example.com.");
    }

    #[test]
    fn test_name_overrunning_payload() {
        // The CNAME payload is cut off after "www" although the message
        // continues with bytes that would complete the name.
        let message = Bytes::from_static(b"\x03www\x07example\x00");
        let err = decode_rdata(TYPE_CNAME, CLASS_IN, &message, 0..4).unwrap_err();

        let ShapeError::Field(inner) = err else {
            panic!("expected a field error, got {err:?}");
        };
        assert_eq!(inner.kind(), ErrorKind::Truncated);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let err = decode(TYPE_NS, CLASS_IN, b"\x02ns\x00\xff\xff", 0).unwrap_err();
        assert!(matches!(err, ShapeError::TrailingBytes(2)));
    }

    #[test]
    fn test_bad_pointer_in_payload() {
        let err = decode(TYPE_PTR, CLASS_IN, b"\xc0\x05", 0).unwrap_err();
        let ShapeError::Field(inner) = err else {
            panic!("expected a field error, got {err:?}");
        };
        assert!(matches!(
            *inner,
            ParseError::MalformedMessage {
                reason: Malformed::ForwardPointer { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_decode_txt_record() {
        let rdata = decode(TYPE_TXT, CLASS_IN, b"\x05hello\x00\x08say \"hi\"", 0).unwrap();
        let RData::Txt(ref strings) = rdata else {
            panic!("expected TXT, got {rdata:?}");
        };
        assert_eq!(strings.len(), 3);
        assert_eq!(&strings[0][..], b"hello");
        assert!(strings[1].is_empty());
        assert_eq!(rdata.to_string(), "\"hello\" \"\" \"say \\\"hi\\\"\"");

        assert!(matches!(
            decode(TYPE_TXT, CLASS_IN, b"", 0),
            Err(ShapeError::EmptyText)
        ));
    }

    #[test]
    fn test_decode_soa_record() {
        let message: &'static [u8] = b"\x03ns1\x00\x05admin\x00\
            \x00\x00\x00\x01\x00\x00\x0e\x10\x00\x00\x02\x58\x00\x09\x3a\x80\x00\x00\x01\x2c";
        let RData::Soa(soa) = decode(TYPE_SOA, CLASS_IN, message, 0).unwrap() else {
            panic!("expected SOA");
        };
        assert_eq!(soa.mname.to_string(), "ns1.");
        assert_eq!(soa.rname.to_string(), "admin.");
        assert_eq!(soa.serial, 1);
        assert_eq!(soa.refresh, 3600);
        assert_eq!(soa.retry, 600);
        assert_eq!(soa.expire, 604800);
        assert_eq!(soa.minimum, 300);
    }

    #[test]
    fn test_decode_srv_record() {
        let rdata = decode(TYPE_SRV, CLASS_IN, b"\x00\x00\x00\x00\x00\x50\x00", 0).unwrap();
        assert_eq!(
            rdata,
            RData::Srv {
                priority: 0,
                weight: 0,
                port: 80,
                target: Name::root(),
            }
        );
        assert_eq!(rdata.to_string(), "0 0 80 .");
        assert_eq!(type_name(TYPE_SRV), "SRV");
    }

    #[test]
    fn test_srv_target_follows_pointer() {
        // "printer.local" at 0, then the SRV payload at 15.
        let message: &'static [u8] =
            b"\x07printer\x05local\x00\x00\x0a\x00\x05\x02\x77\x04host\xc0\x08";
        let rdata = decode(TYPE_SRV, CLASS_IN | CLASS_UNIQUE, message, 15).unwrap();
        assert_eq!(
            rdata,
            RData::Srv {
                priority: 10,
                weight: 5,
                port: 631,
                target: Name::from_ascii("host.local").unwrap(),
            }
        );
        assert_eq!(rdata.to_string(), "10 5 631 host.local.");
    }

    #[test]
    fn test_srv_record_too_short() {
        let err = decode(TYPE_SRV, CLASS_IN, &[0x00, 0x01, 0x00], 0).unwrap_err();
        let ShapeError::Field(inner) = err else {
            panic!("expected a field error, got {err:?}");
        };
        assert_eq!(inner.kind(), ErrorKind::Truncated);
    }

    #[test]
    fn test_cache_flush_bit_ignored_for_class_match() {
        let rdata = decode(TYPE_A, CLASS_IN | CLASS_UNIQUE, &[192, 168, 1, 2], 0).unwrap();
        assert_eq!(rdata, RData::A(Ipv4Addr::new(192, 168, 1, 2)));

        let rdata = decode(TYPE_A, CLASS_CH | CLASS_UNIQUE, &[192, 168, 1, 2], 0).unwrap();
        assert!(matches!(rdata, RData::Unknown(_)));
    }

    #[test]
    fn test_unknown_type_is_opaque() {
        let rdata = decode(65280, CLASS_IN, &[0xde, 0xad], 0).unwrap();
        assert_eq!(rdata, RData::Unknown(Bytes::from_static(&[0xde, 0xad])));
        assert_eq!(rdata.to_string(), "\\# 2 dead");
        assert_eq!(type_name(65280), "TYPE65280");
    }

    #[test]
    fn test_range_outside_message() {
        let message = Bytes::from_static(&[1, 2, 3]);
        let err = decode_rdata(TYPE_A, CLASS_IN, &message, 1..5).unwrap_err();
        assert!(matches!(err, ShapeError::OutOfBounds { end: 5, len: 3, .. }));
    }
}
