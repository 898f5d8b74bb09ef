//! # zktap-core
//!
//! Passive, bidirectional decoder for the ZooKeeper client/server wire
//! protocol, built to run inline in a TCP proxy's data path.
//!
//! One [`Decoder`] instance observes both directions of one connection. Raw
//! chunks are handed in exactly as the transport delivered them — possibly
//! splitting one message across many reads, possibly packing many messages
//! into one — and the decoder reassembles message boundaries, classifies each
//! message, extracts the observability-relevant fields, and reports them to
//! an injected [`DecoderCallbacks`] observer. Traffic is never modified,
//! delayed, or rejected; malformed input is reported through a single error
//! event instead of unwinding.
//!
//! The crate has no runtime, socket, or OS dependencies: decoding is fully
//! synchronous and bounded by the bytes at hand, which keeps it cheap enough
//! for a per-connection hot path.
//!
//! ```
//! use zktap_core::{Decoder, DecoderCallbacks, DecoderConfig, SystemTimeSource};
//!
//! #[derive(Default)]
//! struct PathLog(Vec<String>);
//!
//! impl DecoderCallbacks for PathLog {
//!     fn on_get_data_request(&mut self, path: String, _watch: bool) {
//!         self.0.push(path);
//!     }
//! }
//!
//! let mut decoder = Decoder::new(DecoderConfig::default(), PathLog::default(), SystemTimeSource);
//!
//! // [len=15][xid=1][opcode=getdata][path="/a"][watch=false]
//! let chunk = [
//!     0, 0, 0, 15, 0, 0, 0, 1, 0, 0, 0, 4, 0, 0, 0, 2, b'/', b'a', 0,
//! ];
//! decoder.on_request_data(&chunk);
//! assert_eq!(decoder.callbacks().0, vec!["/a".to_string()]);
//! ```

pub mod error;
pub mod protocol;
pub mod time;

pub use error::DecodeError;
pub use protocol::codes::{create_flag_name, xids, CreateFlag, OpCode};
pub use protocol::decoder::{Decoder, DecoderConfig, DEFAULT_MAX_PACKET_BYTES};
pub use protocol::observer::DecoderCallbacks;
pub use time::{SystemTimeSource, TimeSource};
