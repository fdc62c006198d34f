mod common;

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use point_channels::prelude::*;

fn make_source(rows: usize) -> Arc<dyn DataSource> {
    let codes = (0..rows).map(|i| (i % 64) as u32).collect();
    let dictionary = (0..64).map(|i| i as f64 * 1.5).collect();
    Arc::new(
        MemorySource::new()
            .with_continuous("mass", (0..rows).map(|i| (i as f64).sqrt()).collect())
            .with_categorical("group", codes, dictionary),
    )
}

fn make_channel(kind: ChannelKind, size: usize, source: &Arc<dyn DataSource>) -> Channel {
    let mut backend = RecordingBackend::new();
    let config = ChannelConfig::new().with_table_size(size);
    let palettes = Arc::new(Palettes::with_seed(size, 1));
    Channel::new(kind, &config, &mut backend, palettes)
        .expect("valid channel")
        .with_source(source.clone())
}

fn update_benches(c: &mut Criterion) {
    let source = make_source(10_000);
    let mut group = c.benchmark_group("channel/update");

    for &size in &common::TABLE_SIZES {
        group.throughput(common::elements_throughput(size));

        group.bench_with_input(BenchmarkId::new("plain_sqrt", size), &size, |b, &size| {
            b.iter_batched(
                || make_channel(ChannelKind::Size, size, &source),
                |mut channel| {
                    channel
                        .update(Encoding::field("mass").with_range([1.0, 10.0]))
                        .expect("update ok");
                    black_box(channel)
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("lambda", size), &size, |b, &size| {
            b.iter_batched(
                || make_channel(ChannelKind::Alpha, size, &source),
                |mut channel| {
                    channel
                        .update("mass => sqrt(mass) / 10 + (mass > 50 ? 0.2 : 0)")
                        .expect("update ok");
                    black_box(channel)
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("filter", size), &size, |b, &size| {
            b.iter_batched(
                || make_channel(ChannelKind::Filter, size, &source),
                |mut channel| {
                    channel.update_filter("group => group >= 30").expect("update ok");
                    black_box(channel)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn lambda_eval_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("expr/eval");
    let inputs: Vec<f64> = (0..4096).map(|i| i as f64 * 0.25).collect();
    group.throughput(common::elements_throughput(inputs.len()));

    for (name, text) in [
        ("compare", "x => x > 100"),
        ("arith", "x => (x * 2 + 1) / 3 - x ** 0.5"),
        ("math", "x => Math.log(x + 1) * Math.sin(x)"),
    ] {
        let lambda = Lambda::parse(text).expect("compile ok");
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut acc = 0.0;
                for &x in &inputs {
                    acc += lambda.call(black_box(x));
                }
                black_box(acc)
            });
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = update_benches, lambda_eval_benches
}
criterion_main!(benches);
