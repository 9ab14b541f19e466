//! Fatal conversion errors
//!
//! Anything that stops a conversion. Recoverable conditions are reported
//! through [`crate::converter::Diagnostic`] instead.

use std::io;

/// Error that aborts a conversion
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("unknown escape terminator {byte:#04x} at byte offset {offset}")]
    UnknownTerminator { byte: u8, offset: u64 },

    #[error("unhandled escape command '{}' at byte offset {offset}", char::from(*.command))]
    UnhandledCommand { command: u8, offset: u64 },

    #[error("read failed at byte offset {offset}: {source}")]
    Read {
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("write failed: {0}")]
    Write(#[source] io::Error),

    #[error("invalid width {0}: must be greater than zero")]
    InvalidWidth(usize),
}

impl ConvertError {
    /// Byte offset of the failure, for errors raised while scanning input
    pub fn offset(&self) -> Option<u64> {
        match self {
            ConvertError::UnknownTerminator { offset, .. }
            | ConvertError::UnhandledCommand { offset, .. }
            | ConvertError::Read { offset, .. } => Some(*offset),
            ConvertError::Write(_) | ConvertError::InvalidWidth(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConvertError::UnknownTerminator {
            byte: 0x7f,
            offset: 12,
        };
        assert_eq!(
            err.to_string(),
            "unknown escape terminator 0x7f at byte offset 12"
        );

        let err = ConvertError::UnhandledCommand {
            command: b'c',
            offset: 3,
        };
        assert_eq!(
            err.to_string(),
            "unhandled escape command 'c' at byte offset 3"
        );

        assert_eq!(
            ConvertError::InvalidWidth(0).to_string(),
            "invalid width 0: must be greater than zero"
        );
    }

    #[test]
    fn test_error_offset() {
        let err = ConvertError::Read {
            offset: 99,
            source: io::Error::new(io::ErrorKind::Other, "boom"),
        };
        assert_eq!(err.offset(), Some(99));
        assert_eq!(ConvertError::InvalidWidth(0).offset(), None);
    }
}
