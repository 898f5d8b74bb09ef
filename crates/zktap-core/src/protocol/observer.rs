//! Event surface the decoder reports into.

use std::time::Duration;

use crate::protocol::codes::{CreateFlag, OpCode};

/// Receives one call per decoded field group, plus byte accounting and the
/// single error notification that ends a feed cycle.
///
/// The decoder is a passive observer of traffic it cannot influence, so every
/// method is a notification with no return channel. All methods have empty
/// default bodies; an implementation overrides only the events it consumes.
///
/// After `on_decode_error` no further events are emitted for the chunk that
/// failed.
pub trait DecoderCallbacks {
    /// Decoding of the current chunk was aborted.
    fn on_decode_error(&mut self) {}

    /// A complete request message of `bytes` bytes was decoded.
    fn on_request_bytes(&mut self, bytes: usize) {
        let _ = bytes;
    }

    /// A complete response message of `bytes` bytes was decoded.
    fn on_response_bytes(&mut self, bytes: usize) {
        let _ = bytes;
    }

    /// Session-establishment request; `readonly` is the client's request to
    /// attach to a read-only server.
    fn on_connect(&mut self, readonly: bool) {
        let _ = readonly;
    }

    /// Keep-alive ping request.
    fn on_ping(&mut self) {}

    /// Authentication request carrying the scheme (`digest`, `sasl`, ...).
    fn on_auth_request(&mut self, scheme: String) {
        let _ = scheme;
    }

    fn on_get_data_request(&mut self, path: String, watch: bool) {
        let _ = (path, watch);
    }

    /// Node creation. `flag` is `None` when the wire value falls outside the
    /// known enumeration; `opcode` distinguishes the create variants.
    fn on_create_request(&mut self, path: String, flag: Option<CreateFlag>, opcode: OpCode) {
        let _ = (path, flag, opcode);
    }

    fn on_set_request(&mut self, path: String) {
        let _ = path;
    }

    /// `v2` distinguishes the stat-carrying second version of the operation.
    fn on_get_children_request(&mut self, path: String, watch: bool, v2: bool) {
        let _ = (path, watch, v2);
    }

    fn on_delete_request(&mut self, path: String, version: i32) {
        let _ = (path, version);
    }

    fn on_exists_request(&mut self, path: String, watch: bool) {
        let _ = (path, watch);
    }

    fn on_get_acl_request(&mut self, path: String) {
        let _ = path;
    }

    fn on_set_acl_request(&mut self, path: String, version: i32) {
        let _ = (path, version);
    }

    fn on_sync_request(&mut self, path: String) {
        let _ = path;
    }

    fn on_check_request(&mut self, path: String, version: i32) {
        let _ = (path, version);
    }

    /// A transactional batch finished decoding. Its sub-operations were
    /// already reported individually through the per-opcode callbacks.
    fn on_multi_request(&mut self) {}

    fn on_reconfig_request(&mut self) {}

    fn on_set_watches_request(&mut self) {}

    fn on_check_watches_request(&mut self, path: String, watch_type: i32) {
        let _ = (path, watch_type);
    }

    fn on_remove_watches_request(&mut self, path: String, watch_type: i32) {
        let _ = (path, watch_type);
    }

    fn on_get_ephemerals_request(&mut self, path: String) {
        let _ = path;
    }

    fn on_get_all_children_number_request(&mut self, path: String) {
        let _ = path;
    }

    fn on_close_request(&mut self) {}

    /// Session-establishment response. `latency` is measured from the connect
    /// request on the same connection.
    fn on_connect_response(
        &mut self,
        proto_version: i32,
        timeout: i32,
        readonly: bool,
        latency: Duration,
    ) {
        let _ = (proto_version, timeout, readonly, latency);
    }

    /// Response correlated to an earlier request. `opcode` is recovered from
    /// the outstanding-request table, not from the wire.
    fn on_response(&mut self, opcode: OpCode, xid: i32, zxid: i64, error: i32, latency: Duration) {
        let _ = (opcode, xid, zxid, error, latency);
    }

    /// Server-initiated watch notification; never correlated to a request.
    fn on_watch_event(
        &mut self,
        event_type: i32,
        client_state: i32,
        path: String,
        zxid: i64,
        error: i32,
    ) {
        let _ = (event_type, client_state, path, zxid, error);
    }
}
