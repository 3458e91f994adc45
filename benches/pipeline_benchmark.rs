use criterion::{criterion_group, criterion_main, Criterion};
use room_sensor_node::{decide, stream_buffer, Reading, SensorSource, SimulatedSensors, Thresholds};
use std::time::Duration;

fn benchmark_policy(c: &mut Criterion) {
    let mut sim = SimulatedSensors::new(42);
    let thresholds = Thresholds::default();
    c.bench_function("policy_decide", |b| {
        b.iter(|| {
            let reading = sim.sample().unwrap_or_default();
            decide(&reading, &thresholds)
        })
    });
}

fn benchmark_stream_buffer(c: &mut Criterion) {
    let (writer, reader) = stream_buffer(256);
    let record = Reading::new(30, 1).stamp(1_000);
    c.bench_function("stream_buffer_round_trip", |b| {
        b.iter(|| {
            writer.send_record(&record, Duration::ZERO).ok();
            reader.receive_record().ok()
        })
    });
}

criterion_group!(benches, benchmark_policy, benchmark_stream_buffer);
criterion_main!(benches);
