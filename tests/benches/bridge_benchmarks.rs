//! # MQTT-Docker Bridge Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | Envelope rejection (parse / version / method) | < 10µs |
//! | `inspect_docker` over the in-memory runtime | < 50µs |
//! | Rendezvous handoff, one item | < 20µs |
//! | Port mapping decode | < 1µs |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mdb_01_runtime_adapter::adapters::InMemoryRuntime;
use mdb_01_runtime_adapter::{RuntimeAdapter, RuntimeAdapterConfig};
use mdb_02_command_dispatch::{CommandDispatcher, LifecycleLock};
use serde_json::json;
use shared_bus::handoff_channel;
use shared_types::PortMapping;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn dispatcher(memory: Arc<InMemoryRuntime>) -> CommandDispatcher {
    let adapter = Arc::new(RuntimeAdapter::new(memory, RuntimeAdapterConfig::for_testing()));
    CommandDispatcher::with_default_handlers(adapter, LifecycleLock::new())
        .expect("default handlers register")
}

// ============================================================================
// Command dispatch
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let dispatcher = dispatcher(Arc::new(
        InMemoryRuntime::new().with_container("web1", "nginx", true),
    ));

    let mut group = c.benchmark_group("mdb-02-command-dispatch");

    let payloads = [
        ("parse_error", b"{not json".to_vec()),
        (
            "bad_version",
            serde_json::to_vec(&json!({"jsonrpc": "1.0", "id": 1, "method": "start_docker"}))
                .expect("encode"),
        ),
        (
            "unknown_method",
            serde_json::to_vec(&json!({"jsonrpc": "2.0", "id": 1, "method": "reboot"}))
                .expect("encode"),
        ),
        (
            "inspect",
            serde_json::to_vec(&json!({
                "jsonrpc": "2.0", "id": 1, "method": "inspect_docker",
                "params": {"containerName": "web1"}
            }))
            .expect("encode"),
        ),
    ];

    for (name, payload) in payloads.iter() {
        group.bench_with_input(BenchmarkId::new("handle_payload", name), payload, |b, p| {
            b.iter(|| rt.block_on(dispatcher.handle_payload(black_box(p))))
        });
    }
    group.finish();
}

// ============================================================================
// Handoff
// ============================================================================

fn bench_handoff(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("shared-bus-handoff");

    for capacity in [0usize, 16] {
        let batch = 256u64;
        group.throughput(Throughput::Elements(batch));
        group.bench_with_input(
            BenchmarkId::new("send_recv_batch", capacity),
            &capacity,
            |b, &capacity| {
                b.iter(|| {
                    rt.block_on(async {
                        let (tx, mut rx) = handoff_channel::<u64>(capacity);
                        let consumer = tokio::spawn(async move {
                            let mut sum = 0u64;
                            while let Some(v) = rx.recv().await {
                                sum += v;
                            }
                            sum
                        });
                        for i in 0..batch {
                            tx.send(i).await.expect("consumer alive");
                        }
                        drop(tx);
                        black_box(consumer.await.expect("consumer task"))
                    })
                })
            },
        );
    }
    group.finish();
}

// ============================================================================
// Parameter decode
// ============================================================================

fn bench_port_mapping(c: &mut Criterion) {
    c.bench_function("shared-types/port_mapping_parse", |b| {
        b.iter(|| black_box("80:8080").parse::<PortMapping>())
    });
}

criterion_group!(benches, bench_dispatch, bench_handoff, bench_port_mapping);
criterion_main!(benches);
