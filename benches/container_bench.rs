//! 容器解析的性能基准测试

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use futures_util::future;
use portkit::{Container, Lifecycle, OperationSignature, PortContract};
use tokio::runtime::Runtime;

/// 测试用的简单端口
trait Gauge: Send + Sync {
    fn value(&self) -> u64;
}

struct FixedGauge(u64);

impl Gauge for FixedGauge {
    fn value(&self) -> u64 {
        self.0
    }
}

struct GaugeContract;

impl PortContract for GaugeContract {
    type Instance = dyn Gauge;
    const NAME: &'static str = "gauge";
    const OPERATIONS: &'static [OperationSignature] =
        &[OperationSignature::new("value", "()", "u64")];
}

fn container_with(lifecycle: Lifecycle) -> Container {
    let container = Container::new();
    container
        .register::<GaugeContract, _, _>(
            |_| future::ready(anyhow::Ok(Arc::new(FixedGauge(42)) as Arc<dyn Gauge>)),
            lifecycle,
        )
        .unwrap();
    container
}

/// 基准测试：已缓存单例与瞬态解析
fn bench_resolution(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let mut group = c.benchmark_group("resolution");

    for lifecycle in [Lifecycle::Singleton, Lifecycle::Transient] {
        let container = container_with(lifecycle);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{lifecycle:?}")),
            &container,
            |b, container| {
                b.iter(|| {
                    runtime.block_on(async {
                        let gauge = container.resolve::<GaugeContract>().await.unwrap();
                        black_box(gauge.value())
                    })
                });
            },
        );
    }

    group.finish();
}

/// 基准测试：并发首次解析（每轮都是新容器）
fn bench_concurrent_first_resolution(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let mut group = c.benchmark_group("concurrent_first_resolution");

    for concurrency in [1usize, 10, 100] {
        group.bench_with_input(
            BenchmarkId::from_parameter(concurrency),
            &concurrency,
            |b, &concurrency| {
                b.iter(|| {
                    runtime.block_on(async {
                        let container = container_with(Lifecycle::Singleton);
                        let results = future::join_all(
                            (0..concurrency).map(|_| container.resolve::<GaugeContract>()),
                        )
                        .await;
                        black_box(results.len())
                    })
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_resolution, bench_concurrent_first_resolution);
criterion_main!(benches);
