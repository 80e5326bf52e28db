//! Domain names and the wire decoder that handles message compression.

use std::fmt;

use bytes::Bytes;
use tracing::trace;

use crate::cursor::ByteCursor;
use crate::errors::{Malformed, ParseError};

/// Maximum length of a single label, in bytes.
pub const MAX_LABEL_LEN: usize = 63;

/// Maximum encoded length of a name, length bytes and root label included.
pub const MAX_NAME_LEN: usize = 255;

/// Maximum number of compression pointers followed while decoding one name.
pub const MAX_POINTER_HOPS: usize = 128;

const POINTER_MASK: u8 = 0b1100_0000;

/// One segment of a domain name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(Bytes);

impl Label {
    /// The zero-length label that terminates every name.
    pub fn root() -> Self {
        Label(Bytes::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in self.0.iter() {
            match byte {
                b'.' | b'\\' => write!(f, "\\{}", byte as char)?,
                0x21..=0x7e => write!(f, "{}", byte as char)?,
                _ => write!(f, "\\{:03}", byte)?,
            }
        }
        Ok(())
    }
}

/// A domain name: a sequence of labels ending in the empty root label.
///
/// Names decoded through compression pointers are indistinguishable from
/// names written out in full.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    labels: Vec<Label>,
}

impl Name {
    pub fn root() -> Self {
        Name {
            labels: vec![Label::root()],
        }
    }

    /// Builds a name from dotted text such as `example.com` or `example.com.`.
    pub fn from_ascii(text: &str) -> Result<Self, Malformed> {
        let text = text.strip_suffix('.').unwrap_or(text);
        if text.is_empty() {
            return Ok(Name::root());
        }

        let mut labels = Vec::new();
        let mut encoded_len = 1;
        for label in text.split('.') {
            if label.is_empty() {
                return Err(Malformed::EmptyLabel);
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(Malformed::LabelTooLong(label.len()));
            }
            encoded_len += 1 + label.len();
            if encoded_len > MAX_NAME_LEN {
                return Err(Malformed::NameTooLong);
            }
            labels.push(Label(Bytes::copy_from_slice(label.as_bytes())));
        }
        labels.push(Label::root());

        Ok(Name { labels })
    }

    /// All labels, the trailing empty label included.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn is_root(&self) -> bool {
        self.labels.len() == 1
    }

    /// Length of the uncompressed wire encoding.
    pub fn encoded_len(&self) -> usize {
        self.labels.iter().map(|label| 1 + label.len()).sum()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        for label in self.labels.iter().filter(|label| !label.is_empty()) {
            write!(f, "{}.", label)?;
        }
        Ok(())
    }
}

/// Decodes the name at the cursor's position.
///
/// A compression pointer must target an offset strictly before the point
/// where the current run of labels began, so every hop moves backwards and
/// the walk always terminates. On return the cursor sits just past the
/// first pointer if one was followed, or past the terminating zero byte.
pub fn decode_name(cursor: &mut ByteCursor) -> Result<Name, ParseError> {
    let start = cursor.position();
    let mut limit = start;
    let mut resume = None;
    let mut hops = 0;
    let mut labels = Vec::new();
    let mut encoded_len = 1;

    loop {
        let offset = cursor.position();
        let length = cursor.read_u8()?;

        match length & POINTER_MASK {
            POINTER_MASK => {
                let low = cursor.read_u8()?;
                let target = usize::from(u16::from_be_bytes([length & !POINTER_MASK, low]));
                if target >= limit {
                    return Err(ParseError::malformed(
                        offset,
                        Malformed::ForwardPointer { target, limit },
                    ));
                }
                hops += 1;
                if hops > MAX_POINTER_HOPS {
                    return Err(ParseError::malformed(
                        offset,
                        Malformed::TooManyPointers(MAX_POINTER_HOPS),
                    ));
                }
                if resume.is_none() {
                    resume = Some(cursor.position());
                }
                cursor.seek(target)?;
                limit = target;
            }
            0 if length == 0 => break,
            0 => {
                let label = cursor.read_bytes(usize::from(length))?;
                encoded_len += 1 + label.len();
                if encoded_len > MAX_NAME_LEN {
                    return Err(ParseError::malformed(start, Malformed::NameTooLong));
                }
                labels.push(Label(label));
            }
            _ => {
                return Err(ParseError::malformed(
                    offset,
                    Malformed::ReservedLabelType(length),
                ))
            }
        }
    }

    if let Some(resume) = resume {
        cursor.resume_at(resume);
    }
    labels.push(Label::root());

    trace!(start, labels = labels.len(), hops, "decoded name");
    Ok(Name { labels })
}
