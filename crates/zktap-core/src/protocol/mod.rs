//! Wire-protocol decoding: code tables, primitive reads, framing, and the
//! per-message decoder.

pub mod codes;
pub mod decoder;
pub mod observer;
pub mod reader;

pub use codes::{create_flag_name, xids, CreateFlag, OpCode};
pub use decoder::{Decoder, DecoderConfig, DEFAULT_MAX_PACKET_BYTES};
pub use observer::DecoderCallbacks;
pub use reader::FieldReader;
