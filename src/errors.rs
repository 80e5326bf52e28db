use crate::protocol::Section;
use crate::rdata::ShapeError;

/// The terminal classification of a failed parse.
///
/// Wrapping errors (see [`ParseError::ResourceRecord`]) never introduce a
/// kind of their own; they report the kind of the failure they wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The buffer ended before a field could be read. More bytes may help.
    Truncated,
    /// The bytes present are structurally invalid.
    Malformed,
}

/// Errors that can occur while deserializing a DNS message
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("message shorter than header: need {needed} bytes, have {available}")]
    ShorterThanHeader { needed: usize, available: usize },

    #[error("truncated message: need {needed} bytes at offset {offset}, have {available}")]
    TruncatedMessage {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("malformed message at offset {offset}: {reason}")]
    MalformedMessage { offset: usize, reason: Malformed },

    #[error("failed to read resource record {index} of {count} in {section} section")]
    ResourceRecord {
        section: Section,
        index: usize,
        count: u16,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    pub(crate) fn malformed(offset: usize, reason: Malformed) -> Self {
        ParseError::MalformedMessage { offset, reason }
    }

    /// Returns the kind of the innermost failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::ShorterThanHeader { .. } | ParseError::TruncatedMessage { .. } => {
                ErrorKind::Truncated
            }
            ParseError::MalformedMessage { .. } => ErrorKind::Malformed,
            ParseError::ResourceRecord { source, .. } => source.kind(),
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.kind() == ErrorKind::Truncated
    }

    pub fn is_malformed(&self) -> bool {
        self.kind() == ErrorKind::Malformed
    }

    /// Strips resource record wrappers and returns the failure they carry.
    pub fn root(&self) -> &ParseError {
        match self {
            ParseError::ResourceRecord { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Why a message, or a name given as text, was rejected as malformed
#[derive(Debug, thiserror::Error)]
pub enum Malformed {
    #[error("seek to offset {target} outside a {len} byte message")]
    SeekOutOfBounds { target: usize, len: usize },

    #[error("compression pointer to offset {target} does not point before offset {limit}")]
    ForwardPointer { target: usize, limit: usize },

    #[error("name follows more than {0} compression pointers")]
    TooManyPointers(usize),

    #[error("label type 0x{0:02x} is reserved")]
    ReservedLabelType(u8),

    #[error("label of {0} bytes exceeds maximum length of 63 bytes")]
    LabelTooLong(usize),

    #[error("empty label inside a name")]
    EmptyLabel,

    #[error("name exceeds maximum length of 255 bytes")]
    NameTooLong,

    #[error("record data for type {rtype} class {rclass} rejected: {shape}")]
    RData {
        rtype: u16,
        rclass: u16,
        shape: ShapeError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_names_its_reason() {
        let err = ParseError::malformed(14, Malformed::ReservedLabelType(0x45));
        assert_eq!(
            err.to_string(),
            "malformed message at offset 14: label type 0x45 is reserved"
        );
    }

    #[test]
    fn test_record_data_reason_names_the_shape() {
        let err = ParseError::malformed(
            20,
            Malformed::RData {
                rtype: 1,
                rclass: 1,
                shape: ShapeError::Length {
                    expected: 4,
                    actual: 3,
                },
            },
        );
        assert_eq!(
            err.to_string(),
            "malformed message at offset 20: record data for type 1 class 1 rejected: \
             expected 4 bytes of record data, found 3"
        );
        assert!(err.is_malformed());
    }
}
