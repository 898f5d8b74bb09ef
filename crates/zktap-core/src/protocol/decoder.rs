//! Stream reassembly and per-message decoding for both directions of one
//! proxied connection.
//!
//! Each feed cycle runs in two phases. A forward scan walks the int32 length
//! prefixes to establish how many complete messages the buffered bytes hold,
//! validating every declared length before any semantic decoding happens;
//! only then is the complete prefix decoded message by message. The scan
//! exists because the transport may coalesce many writes into one read or
//! split one message across many reads, and decoding a truncated message
//! would leave half-emitted events behind.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::DecodeError;
use crate::protocol::codes::{widths, xids, CreateFlag, OpCode};
use crate::protocol::observer::DecoderCallbacks;
use crate::protocol::reader::FieldReader;
use crate::time::TimeSource;

/// Default packet-size ceiling. 1 MiB matches the server's own default
/// transfer limit, so legitimate traffic never trips it.
pub const DEFAULT_MAX_PACKET_BYTES: u32 = 1024 * 1024;

/// Tunables for one decoder instance.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Largest declared message length accepted in either direction.
    pub max_packet_bytes: u32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_packet_bytes: DEFAULT_MAX_PACKET_BYTES,
        }
    }
}

/// Direction of travel for a chunk of observed bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Client to server: requests.
    Request,
    /// Server to client: responses.
    Response,
}

impl Direction {
    /// Smallest declared length any message in this direction can carry:
    /// xid + opcode for requests, xid + zxid + error for responses.
    fn min_message_len(self) -> usize {
        match self {
            Direction::Request => widths::XID + widths::OPCODE,
            Direction::Response => widths::XID + widths::ZXID + widths::INT,
        }
    }
}

/// A request decoded on the outbound direction, awaiting its response.
#[derive(Debug, Clone, Copy)]
struct PendingRequest {
    opcode: OpCode,
    issued_at: Instant,
}

/// Passive decoder for one connection.
///
/// Owns the two per-direction reassembly buffers and the outstanding-request
/// table. All state is touched only by the thread that owns the connection's
/// I/O events, so nothing here is synchronized; dropping the decoder with its
/// connection discards any requests still awaiting a response.
pub struct Decoder<C, T> {
    callbacks: C,
    time_source: T,
    max_packet_bytes: u32,
    reader: FieldReader,
    requests_by_xid: HashMap<i32, PendingRequest>,
    /// Unconsumed prefix of an in-progress request message.
    request_buffer: Vec<u8>,
    /// Unconsumed prefix of an in-progress response message.
    response_buffer: Vec<u8>,
}

impl<C: DecoderCallbacks, T: TimeSource> Decoder<C, T> {
    pub fn new(config: DecoderConfig, callbacks: C, time_source: T) -> Self {
        Self {
            callbacks,
            time_source,
            max_packet_bytes: config.max_packet_bytes,
            reader: FieldReader::new(config.max_packet_bytes),
            requests_by_xid: HashMap::new(),
            request_buffer: Vec::new(),
            response_buffer: Vec::new(),
        }
    }

    /// The injected observer, for reading accumulated state back out.
    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut C {
        &mut self.callbacks
    }

    /// Number of requests still awaiting their response.
    pub fn outstanding_requests(&self) -> usize {
        self.requests_by_xid.len()
    }

    /// Feeds bytes observed on the client-to-server direction.
    pub fn on_request_data(&mut self, chunk: &[u8]) {
        self.feed(chunk, Direction::Request);
    }

    /// Feeds bytes observed on the server-to-client direction.
    pub fn on_response_data(&mut self, chunk: &[u8]) {
        self.feed(chunk, Direction::Response);
    }

    fn feed(&mut self, chunk: &[u8], direction: Direction) {
        trace!(
            ?direction,
            chunk_len = chunk.len(),
            buffered = self.residual(direction).len(),
            "feeding chunk"
        );

        // Combine with the retained prefix of an in-progress message, if any.
        // The residual is taken out whole; whatever remains incomplete after
        // this pass is put back below.
        let combined: Vec<u8>;
        let span: &[u8] = if self.residual(direction).is_empty() {
            chunk
        } else {
            let residual = self.residual_mut(direction);
            residual.extend_from_slice(chunk);
            combined = std::mem::take(residual);
            &combined
        };

        let complete_end = match self.scan(span, direction) {
            Ok(end) => end,
            Err(err) => {
                // A bad length prefix poisons the whole span; no partial
                // salvage is possible once framing is in doubt.
                debug!(%err, "abandoning feed cycle");
                self.callbacks.on_decode_error();
                return;
            }
        };

        if complete_end > 0 {
            self.decode_span(&span[..complete_end], direction);
        }
        if complete_end < span.len() {
            let tail = &span[complete_end..];
            self.residual_mut(direction).extend_from_slice(tail);
        }
    }

    /// First pass: walk the length prefixes to find where the last complete
    /// message ends. Returns the end offset of the complete prefix; bytes
    /// beyond it belong to a message still in flight.
    fn scan(&self, data: &[u8], direction: Direction) -> Result<usize, DecodeError> {
        let mut offset = 0;
        let mut complete_end = 0;

        // Fewer than four bytes cannot even hold the next length prefix;
        // they stay buffered until more arrive.
        while data.len() - offset >= widths::INT {
            let len = peek_i32(data, offset);
            self.ensure_min_length(len, direction.min_message_len())?;
            self.ensure_max_length(len)?;

            let next = offset + widths::INT + len as usize;
            if next > data.len() {
                break;
            }
            offset = next;
            complete_end = next;
        }

        Ok(complete_end)
    }

    /// Second pass: every message in `data` is complete; decode sequentially.
    fn decode_span(&mut self, data: &[u8], direction: Direction) {
        let mut offset = 0;

        while offset < data.len() {
            // The reader's cursor restarts per message, while `offset` is
            // absolute within the span and keeps advancing.
            self.reader.reset();

            let start = offset;
            let result = match direction {
                Direction::Request => self.decode_request(data, &mut offset),
                Direction::Response => self.decode_response(data, &mut offset),
            };

            match result {
                Ok(()) => match direction {
                    Direction::Request => self.callbacks.on_request_bytes(offset - start),
                    Direction::Response => self.callbacks.on_response_bytes(offset - start),
                },
                Err(err) => {
                    debug!(%err, "abandoning decode of buffered messages");
                    self.callbacks.on_decode_error();
                    return;
                }
            }
        }
    }

    fn decode_request(&mut self, data: &[u8], offset: &mut usize) -> Result<(), DecodeError> {
        let len = self.reader.read_i32(data, offset)?;
        trace!(len, offset = *offset, "decoding request");
        self.ensure_min_length(len, widths::XID + widths::OPCODE)?;
        self.ensure_max_length(len)?;

        let issued_at = self.time_source.monotonic_now();

        // Control requests carry reserved xids and manage session state:
        // connect, keep-alive, authenticate, and the legacy bulk watch
        // registration. Some client implementations also expose set-watches
        // as an ordinary data request, so it appears in both dispatch paths.
        let xid = self.reader.read_i32(data, offset)?;
        trace!(xid, offset = *offset, "request xid");
        match xid {
            xids::CONNECT => {
                self.parse_connect_request(data, offset, len)?;
                self.record_request(xid, OpCode::Connect, issued_at);
                return Ok(());
            }
            xids::PING => {
                self.reader.skip(widths::OPCODE, offset)?;
                self.callbacks.on_ping();
                self.record_request(xid, OpCode::Ping, issued_at);
                return Ok(());
            }
            xids::AUTH => {
                self.parse_auth_request(data, offset, len)?;
                self.record_request(xid, OpCode::SetAuth, issued_at);
                return Ok(());
            }
            xids::SET_WATCHES => {
                self.reader.skip(widths::OPCODE, offset)?;
                self.parse_set_watches_request(data, offset, len)?;
                self.record_request(xid, OpCode::SetWatches, issued_at);
                return Ok(());
            }
            // The watch xid is generated by the server and never appears in
            // requests; everything else is a data operation.
            _ => {}
        }

        let raw_opcode = self.reader.read_i32(data, offset)?;
        trace!(opcode = raw_opcode, offset = *offset, "request opcode");
        let opcode =
            OpCode::try_from(raw_opcode).map_err(|()| DecodeError::UnknownOpcode(raw_opcode))?;

        match opcode {
            OpCode::GetData => self.parse_get_data_request(data, offset, len)?,
            OpCode::Create | OpCode::Create2 | OpCode::CreateContainer | OpCode::CreateTtl => {
                self.parse_create_request(data, offset, len, opcode)?;
            }
            OpCode::SetData => self.parse_set_request(data, offset, len)?,
            OpCode::GetChildren => self.parse_get_children_request(data, offset, len, false)?,
            OpCode::GetChildren2 => self.parse_get_children_request(data, offset, len, true)?,
            OpCode::Delete => self.parse_delete_request(data, offset, len)?,
            OpCode::Exists => self.parse_exists_request(data, offset, len)?,
            OpCode::GetAcl => {
                let path = self.parse_path_only(data, offset, len)?;
                self.callbacks.on_get_acl_request(path);
            }
            OpCode::SetAcl => self.parse_set_acl_request(data, offset, len)?,
            OpCode::Sync => {
                let path = self.parse_path_only(data, offset, len)?;
                self.callbacks.on_sync_request(path);
            }
            OpCode::Check => self.parse_check_request(data, offset, len)?,
            OpCode::Multi => self.parse_multi_request(data, offset, len)?,
            OpCode::Reconfig => self.parse_reconfig_request(data, offset, len)?,
            OpCode::SetWatches => self.parse_set_watches_request(data, offset, len)?,
            OpCode::CheckWatches | OpCode::RemoveWatches => {
                self.parse_watch_management_request(data, offset, len, opcode)?;
            }
            OpCode::GetEphemerals => {
                let path = self.parse_path_only(data, offset, len)?;
                self.callbacks.on_get_ephemerals_request(path);
            }
            OpCode::GetAllChildrenNumber => {
                let path = self.parse_path_only(data, offset, len)?;
                self.callbacks.on_get_all_children_number_request(path);
            }
            OpCode::Close => self.callbacks.on_close_request(),
            // In-enumeration values that only ever travel under a control
            // xid are still unknown as data opcodes.
            OpCode::Connect | OpCode::Ping | OpCode::SetAuth => {
                return Err(DecodeError::UnknownOpcode(raw_opcode));
            }
        }

        self.record_request(xid, opcode, issued_at);
        Ok(())
    }

    fn decode_response(&mut self, data: &[u8], offset: &mut usize) -> Result<(), DecodeError> {
        let len = self.reader.read_i32(data, offset)?;
        trace!(len, offset = *offset, "decoding response");
        self.ensure_min_length(len, widths::XID + widths::ZXID + widths::INT)?;
        self.ensure_max_length(len)?;

        let xid = self.reader.read_i32(data, offset)?;
        trace!(xid, offset = *offset, "response xid");

        // Watch pushes are server-initiated: there is no request to correlate
        // against, by design.
        if xid == xids::WATCH {
            let zxid = self.reader.read_i64(data, offset)?;
            let error = self.reader.read_i32(data, offset)?;
            return self.parse_watch_event(data, offset, len, zxid, error);
        }

        // Every other response answers a recorded request. A miss means a
        // server-side bug or a desynchronized stream; both end the cycle.
        let pending = self
            .requests_by_xid
            .remove(&xid)
            .ok_or(DecodeError::XidNotFound(xid))?;
        let latency = self
            .time_source
            .monotonic_now()
            .saturating_duration_since(pending.issued_at);

        // Connect responses have no zxid/error header; just the protocol
        // version (already consumed in the xid slot) and the session fields.
        if xid == xids::CONNECT {
            return self.parse_connect_response(data, offset, len, latency);
        }

        let zxid = self.reader.read_i64(data, offset)?;
        let error = self.reader.read_i32(data, offset)?;
        trace!(zxid, error, offset = *offset, "response header");

        match xid {
            xids::PING => {
                self.callbacks
                    .on_response(OpCode::Ping, xid, zxid, error, latency);
            }
            xids::AUTH => {
                self.callbacks
                    .on_response(OpCode::SetAuth, xid, zxid, error, latency);
            }
            xids::SET_WATCHES => {
                self.callbacks
                    .on_response(OpCode::SetWatches, xid, zxid, error, latency);
            }
            _ => {
                self.callbacks
                    .on_response(pending.opcode, xid, zxid, error, latency);
                // Response payloads carry no extracted fields beyond the
                // header; step over whatever the declared length still holds.
                let header = widths::XID + widths::ZXID + widths::INT;
                self.reader.skip(len as usize - header, offset)?;
            }
        }

        Ok(())
    }

    fn parse_connect_request(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        len: i32,
    ) -> Result<(), DecodeError> {
        self.ensure_min_length(
            len,
            widths::XID + widths::ZXID + widths::TIMEOUT + widths::SESSION + widths::INT,
        )?;

        // Last-seen zxid, requested timeout, and session id are not surfaced.
        self.reader
            .skip(widths::ZXID + widths::TIMEOUT + widths::SESSION, offset)?;
        self.skip_string(data, offset)?; // password
        let readonly = self.maybe_read_bool(data, offset)?;

        self.callbacks.on_connect(readonly);
        Ok(())
    }

    fn parse_auth_request(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        len: i32,
    ) -> Result<(), DecodeError> {
        self.ensure_min_length(len, widths::XID + widths::OPCODE + 3 * widths::INT)?;

        // Opcode and auth type are fixed; only the scheme is interesting.
        self.reader.skip(widths::OPCODE + widths::INT, offset)?;
        let scheme = self.reader.read_string(data, offset)?;
        self.skip_string(data, offset)?; // credential

        self.callbacks.on_auth_request(scheme);
        Ok(())
    }

    fn parse_get_data_request(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        len: i32,
    ) -> Result<(), DecodeError> {
        self.ensure_min_length(len, widths::XID + widths::OPCODE + widths::INT + widths::BOOL)?;

        let path = self.reader.read_string(data, offset)?;
        let watch = self.reader.read_bool(data, offset)?;

        self.callbacks.on_get_data_request(path, watch);
        Ok(())
    }

    fn parse_create_request(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        len: i32,
        opcode: OpCode,
    ) -> Result<(), DecodeError> {
        self.ensure_min_length(len, widths::XID + widths::OPCODE + 3 * widths::INT)?;

        let path = self.reader.read_string(data, offset)?;
        self.skip_string(data, offset)?; // node data
        self.skip_acls(data, offset)?;
        let flags = self.reader.read_i32(data, offset)?;

        self.callbacks
            .on_create_request(path, CreateFlag::from_wire(flags), opcode);
        Ok(())
    }

    fn parse_set_request(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        len: i32,
    ) -> Result<(), DecodeError> {
        self.ensure_min_length(len, widths::XID + widths::OPCODE + 3 * widths::INT)?;

        let path = self.reader.read_string(data, offset)?;
        self.skip_string(data, offset)?; // node data
        self.reader.read_i32(data, offset)?; // expected version, ignored

        self.callbacks.on_set_request(path);
        Ok(())
    }

    fn parse_get_children_request(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        len: i32,
        v2: bool,
    ) -> Result<(), DecodeError> {
        self.ensure_min_length(len, widths::XID + widths::OPCODE + widths::INT + widths::BOOL)?;

        let path = self.reader.read_string(data, offset)?;
        let watch = self.reader.read_bool(data, offset)?;

        self.callbacks.on_get_children_request(path, watch, v2);
        Ok(())
    }

    fn parse_delete_request(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        len: i32,
    ) -> Result<(), DecodeError> {
        self.ensure_min_length(len, widths::XID + widths::OPCODE + 2 * widths::INT)?;

        let path = self.reader.read_string(data, offset)?;
        let version = self.reader.read_i32(data, offset)?;

        self.callbacks.on_delete_request(path, version);
        Ok(())
    }

    fn parse_exists_request(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        len: i32,
    ) -> Result<(), DecodeError> {
        self.ensure_min_length(len, widths::XID + widths::OPCODE + widths::INT + widths::BOOL)?;

        let path = self.reader.read_string(data, offset)?;
        let watch = self.reader.read_bool(data, offset)?;

        self.callbacks.on_exists_request(path, watch);
        Ok(())
    }

    fn parse_set_acl_request(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        len: i32,
    ) -> Result<(), DecodeError> {
        self.ensure_min_length(len, widths::XID + widths::OPCODE + 2 * widths::INT)?;

        let path = self.reader.read_string(data, offset)?;
        self.skip_acls(data, offset)?;
        let version = self.reader.read_i32(data, offset)?;

        self.callbacks.on_set_acl_request(path, version);
        Ok(())
    }

    /// Shared shape for operations whose payload is a single path.
    fn parse_path_only(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        len: i32,
    ) -> Result<String, DecodeError> {
        self.ensure_min_length(len, widths::XID + widths::OPCODE + widths::INT)?;
        self.reader.read_string(data, offset)
    }

    fn parse_check_request(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        len: i32,
    ) -> Result<(), DecodeError> {
        // Bound shared with transaction sub-operations, which carry no
        // xid/opcode of their own.
        self.ensure_min_length(len, 2 * widths::INT)?;

        let path = self.reader.read_string(data, offset)?;
        let version = self.reader.read_i32(data, offset)?;

        self.callbacks.on_check_request(path, version);
        Ok(())
    }

    fn parse_multi_request(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        len: i32,
    ) -> Result<(), DecodeError> {
        // An empty transaction is a decoding error; there is always at least
        // the terminating sub-header.
        self.ensure_min_length(len, widths::XID + widths::OPCODE + widths::MULTI_HEADER)?;

        loop {
            let sub_opcode = self.reader.read_i32(data, offset)?;
            let done = self.reader.read_bool(data, offset)?;
            self.reader.read_i32(data, offset)?; // per-op error slot, ignored

            if done {
                break;
            }

            // Sub-operations carry no length prefix of their own; the outer
            // declared length bounds each of them.
            match OpCode::try_from(sub_opcode) {
                Ok(OpCode::Create) => {
                    self.parse_create_request(data, offset, len, OpCode::Create)?;
                }
                Ok(OpCode::SetData) => self.parse_set_request(data, offset, len)?,
                Ok(OpCode::Check) => self.parse_check_request(data, offset, len)?,
                _ => return Err(DecodeError::UnknownTransactionOpcode(sub_opcode)),
            }
        }

        self.callbacks.on_multi_request();
        Ok(())
    }

    fn parse_reconfig_request(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        len: i32,
    ) -> Result<(), DecodeError> {
        self.ensure_min_length(
            len,
            widths::XID + widths::OPCODE + 3 * widths::INT + widths::LONG,
        )?;

        self.skip_string(data, offset)?; // joining servers
        self.skip_string(data, offset)?; // leaving servers
        self.skip_string(data, offset)?; // new members
        self.reader.read_i64(data, offset)?; // config id, not surfaced

        self.callbacks.on_reconfig_request();
        Ok(())
    }

    fn parse_set_watches_request(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        len: i32,
    ) -> Result<(), DecodeError> {
        self.ensure_min_length(len, widths::XID + widths::OPCODE + 3 * widths::INT)?;

        self.reader.read_i64(data, offset)?; // relative zxid, ignored
        self.skip_strings(data, offset)?; // data watches
        self.skip_strings(data, offset)?; // exist watches
        self.skip_strings(data, offset)?; // child watches

        self.callbacks.on_set_watches_request();
        Ok(())
    }

    fn parse_watch_management_request(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        len: i32,
        opcode: OpCode,
    ) -> Result<(), DecodeError> {
        self.ensure_min_length(len, widths::XID + widths::OPCODE + 2 * widths::INT)?;

        let path = self.reader.read_string(data, offset)?;
        let watch_type = self.reader.read_i32(data, offset)?;

        if opcode == OpCode::CheckWatches {
            self.callbacks.on_check_watches_request(path, watch_type);
        } else {
            self.callbacks.on_remove_watches_request(path, watch_type);
        }
        Ok(())
    }

    fn parse_connect_response(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        len: i32,
        latency: Duration,
    ) -> Result<(), DecodeError> {
        self.ensure_min_length(
            len,
            widths::PROTOCOL_VERSION + widths::TIMEOUT + widths::SESSION + widths::INT,
        )?;

        let timeout = self.reader.read_i32(data, offset)?;

        // Session id and password are not surfaced.
        self.reader.skip(widths::SESSION, offset)?;
        self.skip_string(data, offset)?;

        let readonly = self.maybe_read_bool(data, offset)?;

        self.callbacks.on_connect_response(0, timeout, readonly, latency);
        Ok(())
    }

    fn parse_watch_event(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        len: i32,
        zxid: i64,
        error: i32,
    ) -> Result<(), DecodeError> {
        self.ensure_min_length(len, widths::SERVER_HEADER + 3 * widths::INT)?;

        let event_type = self.reader.read_i32(data, offset)?;
        let client_state = self.reader.read_i32(data, offset)?;
        let path = self.reader.read_string(data, offset)?;

        self.callbacks
            .on_watch_event(event_type, client_state, path, zxid, error);
        Ok(())
    }

    fn skip_string(&mut self, data: &[u8], offset: &mut usize) -> Result<(), DecodeError> {
        let slen = self.reader.read_i32(data, offset)?;
        if slen < 0 {
            // An absent field; only its length prefix occupies the wire.
            trace!(slen, offset = *offset, "negative string length");
            return Ok(());
        }
        self.reader.skip(slen as usize, offset)
    }

    fn skip_strings(&mut self, data: &[u8], offset: &mut usize) -> Result<(), DecodeError> {
        let count = self.reader.read_i32(data, offset)?;
        for _ in 0..count {
            self.skip_string(data, offset)?;
        }
        Ok(())
    }

    /// Reads a count-prefixed ACL list without surfacing any of it.
    fn skip_acls(&mut self, data: &[u8], offset: &mut usize) -> Result<(), DecodeError> {
        let count = self.reader.read_i32(data, offset)?;
        for _ in 0..count {
            self.reader.read_i32(data, offset)?; // perms
            self.skip_string(data, offset)?; // scheme
            self.skip_string(data, offset)?; // credential
        }
        Ok(())
    }

    /// Reads the optional trailing readonly flag of the connect exchange,
    /// present only when at least one more byte is buffered.
    fn maybe_read_bool(&mut self, data: &[u8], offset: &mut usize) -> Result<bool, DecodeError> {
        if data.len() > *offset {
            return self.reader.read_bool(data, offset);
        }
        Ok(false)
    }

    fn record_request(&mut self, xid: i32, opcode: OpCode, issued_at: Instant) {
        self.requests_by_xid
            .insert(xid, PendingRequest { opcode, issued_at });
    }

    fn ensure_min_length(&self, len: i32, min: usize) -> Result<(), DecodeError> {
        if len < 0 || (len as usize) < min {
            return Err(DecodeError::PacketTooSmall { declared: len, min });
        }
        Ok(())
    }

    fn ensure_max_length(&self, len: i32) -> Result<(), DecodeError> {
        if len as u32 > self.max_packet_bytes {
            return Err(DecodeError::PacketTooBig {
                declared: len,
                limit: self.max_packet_bytes,
            });
        }
        Ok(())
    }

    fn residual(&self, direction: Direction) -> &Vec<u8> {
        match direction {
            Direction::Request => &self.request_buffer,
            Direction::Response => &self.response_buffer,
        }
    }

    fn residual_mut(&mut self, direction: Direction) -> &mut Vec<u8> {
        match direction {
            Direction::Request => &mut self.request_buffer,
            Direction::Response => &mut self.response_buffer,
        }
    }
}

/// Reads a big-endian `i32` without any cursor accounting. Callers guarantee
/// at least four bytes at `offset`.
fn peek_i32(data: &[u8], offset: usize) -> i32 {
    i32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::time::MockTimeSource;

    /// Observer that remembers correlated responses.
    #[derive(Default)]
    struct ResponseLog {
        responses: Vec<(OpCode, i32, i64, i32, Duration)>,
        errors: usize,
    }

    impl DecoderCallbacks for ResponseLog {
        fn on_response(
            &mut self,
            opcode: OpCode,
            xid: i32,
            zxid: i64,
            error: i32,
            latency: Duration,
        ) {
            self.responses.push((opcode, xid, zxid, error, latency));
        }

        fn on_decode_error(&mut self) {
            self.errors += 1;
        }
    }

    fn get_data_request(xid: i32, path: &str) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&xid.to_be_bytes());
        body.extend_from_slice(&(OpCode::GetData as i32).to_be_bytes());
        body.extend_from_slice(&(path.len() as i32).to_be_bytes());
        body.extend_from_slice(path.as_bytes());
        body.push(0);
        frame(body)
    }

    fn response(xid: i32, zxid: i64, error: i32) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&xid.to_be_bytes());
        body.extend_from_slice(&zxid.to_be_bytes());
        body.extend_from_slice(&error.to_be_bytes());
        frame(body)
    }

    fn frame(body: Vec<u8>) -> Vec<u8> {
        let mut message = (body.len() as i32).to_be_bytes().to_vec();
        message.extend_from_slice(&body);
        message
    }

    #[test]
    fn test_latency_is_measured_between_request_and_response() {
        let base = Instant::now();
        let mut seq = mockall::Sequence::new();
        let mut time_source = MockTimeSource::new();
        time_source
            .expect_monotonic_now()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(base);
        time_source
            .expect_monotonic_now()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(base + Duration::from_millis(7));

        let mut decoder =
            Decoder::new(DecoderConfig::default(), ResponseLog::default(), time_source);

        decoder.on_request_data(&get_data_request(5, "/node"));
        decoder.on_response_data(&response(5, 99, 0));

        let log = decoder.callbacks();
        assert_eq!(log.errors, 0);
        assert_eq!(
            log.responses,
            vec![(OpCode::GetData, 5, 99, 0, Duration::from_millis(7))]
        );
    }

    #[test]
    fn test_latency_saturates_when_clock_runs_backwards() {
        let base = Instant::now() + Duration::from_secs(10);
        let mut seq = mockall::Sequence::new();
        let mut time_source = MockTimeSource::new();
        time_source
            .expect_monotonic_now()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(base);
        time_source
            .expect_monotonic_now()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(base - Duration::from_secs(1));

        let mut decoder =
            Decoder::new(DecoderConfig::default(), ResponseLog::default(), time_source);

        decoder.on_request_data(&get_data_request(6, "/node"));
        decoder.on_response_data(&response(6, 1, 0));

        assert_eq!(
            decoder.callbacks().responses,
            vec![(OpCode::GetData, 6, 1, 0, Duration::ZERO)]
        );
    }

    #[test]
    fn test_outstanding_request_accounting() {
        let mut decoder = Decoder::new(
            DecoderConfig::default(),
            ResponseLog::default(),
            crate::time::SystemTimeSource,
        );

        decoder.on_request_data(&get_data_request(1, "/a"));
        decoder.on_request_data(&get_data_request(2, "/b"));
        assert_eq!(decoder.outstanding_requests(), 2);

        decoder.on_response_data(&response(1, 10, 0));
        assert_eq!(decoder.outstanding_requests(), 1);

        decoder.on_response_data(&response(2, 11, 0));
        assert_eq!(decoder.outstanding_requests(), 0);
    }
}
