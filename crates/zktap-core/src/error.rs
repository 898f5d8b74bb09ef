//! Decode failure classification.

use thiserror::Error;

/// Errors raised while decoding the observed byte stream.
///
/// Every variant terminates the current feed cycle the same way: the decoder
/// reports it once through [`DecoderCallbacks::on_decode_error`] and stops
/// processing the chunk. The variants exist for diagnostics, not for
/// differentiated recovery — once a message's true length is in doubt the
/// stream can no longer be trusted to stay in sync.
///
/// [`DecoderCallbacks::on_decode_error`]: crate::DecoderCallbacks::on_decode_error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The declared message length is below the minimum for its category.
    #[error("packet is too small: declared length {declared} is below the minimum of {min}")]
    PacketTooSmall { declared: i32, min: usize },

    /// The declared message length exceeds the configured packet limit.
    #[error("packet is too big: declared length {declared} exceeds the limit of {limit}")]
    PacketTooBig { declared: i32, limit: u32 },

    /// A request carried an opcode outside the known enumeration.
    #[error("unknown opcode: {0}")]
    UnknownOpcode(i32),

    /// A transaction carried a sub-operation other than create, set, or check.
    #[error("unknown opcode within a transaction: {0}")]
    UnknownTransactionOpcode(i32),

    /// A response arrived for an xid with no matching outstanding request.
    /// Either a server-side bug or a desynchronized/malformed stream.
    #[error("xid {0} not found among outstanding requests")]
    XidNotFound(i32),

    /// A field read would run past the end of the buffered bytes.
    #[error("buffer underflow: {needed} bytes needed at offset {offset}, {available} available")]
    Underflow {
        needed: usize,
        offset: usize,
        available: usize,
    },

    /// A single message consumed more bytes than the configured packet limit.
    #[error("message consumed more than the {limit}-byte packet limit")]
    OversizedRead { limit: u32 },
}
