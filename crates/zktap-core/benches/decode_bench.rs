//! Criterion benchmarks for the decoder hot path.
//!
//! The decoder runs inline on every proxied connection, so per-chunk decode
//! cost directly bounds proxy throughput.
//!
//! Run with:
//! ```bash
//! cargo bench --package zktap-core --bench decode_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use zktap_core::{Decoder, DecoderCallbacks, DecoderConfig, OpCode, SystemTimeSource};

/// Observer that swallows every event.
struct NullCallbacks;

impl DecoderCallbacks for NullCallbacks {}

fn frame(body: Vec<u8>) -> Vec<u8> {
    let mut message = (body.len() as i32).to_be_bytes().to_vec();
    message.extend_from_slice(&body);
    message
}

/// A chunk of coalesced read requests, all reusing one xid so the pending
/// table stays flat across iterations.
fn request_chunk(messages: usize) -> Vec<u8> {
    let mut chunk = Vec::new();
    for _ in 0..messages {
        let mut body = Vec::new();
        body.extend_from_slice(&1i32.to_be_bytes());
        body.extend_from_slice(&(OpCode::GetData as i32).to_be_bytes());
        let path = b"/service/registry/member-0001";
        body.extend_from_slice(&(path.len() as i32).to_be_bytes());
        body.extend_from_slice(path);
        body.push(1);
        chunk.extend_from_slice(&frame(body));
    }
    chunk
}

/// A chunk of watch notifications; these bypass the correlation table.
fn watch_event_chunk(messages: usize) -> Vec<u8> {
    let mut chunk = Vec::new();
    for _ in 0..messages {
        let mut body = Vec::new();
        body.extend_from_slice(&(-1i32).to_be_bytes());
        body.extend_from_slice(&42i64.to_be_bytes());
        body.extend_from_slice(&0i32.to_be_bytes());
        body.extend_from_slice(&1i32.to_be_bytes());
        body.extend_from_slice(&3i32.to_be_bytes());
        let path = b"/service/registry/member-0001";
        body.extend_from_slice(&(path.len() as i32).to_be_bytes());
        body.extend_from_slice(path);
        chunk.extend_from_slice(&frame(body));
    }
    chunk
}

fn bench_request_decode(c: &mut Criterion) {
    let chunk = request_chunk(128);
    let mut group = c.benchmark_group("decode_requests");
    group.throughput(Throughput::Bytes(chunk.len() as u64));
    group.bench_function("coalesced_get_data_x128", |b| {
        let mut decoder = Decoder::new(DecoderConfig::default(), NullCallbacks, SystemTimeSource);
        b.iter(|| decoder.on_request_data(black_box(&chunk)));
    });
    group.finish();
}

fn bench_watch_event_decode(c: &mut Criterion) {
    let chunk = watch_event_chunk(128);
    let mut group = c.benchmark_group("decode_responses");
    group.throughput(Throughput::Bytes(chunk.len() as u64));
    group.bench_function("coalesced_watch_events_x128", |b| {
        let mut decoder = Decoder::new(DecoderConfig::default(), NullCallbacks, SystemTimeSource);
        b.iter(|| decoder.on_response_data(black_box(&chunk)));
    });
    group.finish();
}

criterion_group!(benches, bench_request_decode, bench_watch_event_decode);
criterion_main!(benches);
