//! End-to-end tests: the four tasks wired together over real threads

use room_sensor_node::{
    spawn_pipeline, Connectivity, MemoryLog, MemoryTransport, NodeConfig, Reading, RoomSnapshot,
    ScriptedSensors,
};

fn test_config() -> NodeConfig {
    NodeConfig {
        sample_period_ms: 2,
        log_queue_depth: 256,
        ..NodeConfig::default()
    }
}

struct RunResult {
    snapshot: RoomSnapshot,
    published: Vec<serde_json::Value>,
    lines: Vec<String>,
    report: room_sensor_node::MetricsReport,
}

fn run_script(config: &NodeConfig, readings: Vec<Reading>, link_ready: bool) -> RunResult {
    let transport = MemoryTransport::new();
    let sink = MemoryLog::new(10_000);
    let handle = spawn_pipeline(
        config,
        ScriptedSensors::new(readings),
        transport.clone(),
        sink.clone(),
        Connectivity::new(link_ready),
    )
    .expect("pipeline should start");

    let room = handle.room().clone();
    let metrics = handle.metrics().clone();
    handle.join().expect("all tasks should finish cleanly");

    RunResult {
        snapshot: room.snapshot(),
        published: transport
            .published()
            .iter()
            .map(|p| serde_json::from_slice(&p.payload).expect("payload is JSON"))
            .collect(),
        lines: sink.read_all(),
        report: metrics.report(),
    }
}

// ============================================================================
// CONTROL SCENARIOS
// ============================================================================

#[test]
fn test_hot_room_with_motion() {
    let run = run_script(&test_config(), vec![Reading::new(30, 1)], true);

    assert!(run.snapshot.cooling, "cooling should be on above 25");
    assert!(!run.snapshot.heating, "heating should be off above 25");
    assert!(run.snapshot.light, "motion should turn the light on");

    assert_eq!(run.published.len(), 1);
    assert_eq!(run.published[0]["temperature"], 30);
    assert_eq!(run.published[0]["motion"], 1);
    assert_eq!(run.published[0]["sensor_id"], "101");
}

#[test]
fn test_cold_room_without_motion() {
    let run = run_script(&test_config(), vec![Reading::new(15, 0)], true);

    assert!(run.snapshot.heating);
    assert!(!run.snapshot.cooling);
    assert!(!run.snapshot.light);
}

#[test]
fn test_mild_room_turns_everything_off() {
    // Start hot with motion so there is something to switch off.
    let run = run_script(&test_config(), vec![Reading::new(30, 1), Reading::new(22, 0)], true);

    assert_eq!(
        run.snapshot,
        RoomSnapshot { temperature: 22, motion: 0, light: false, cooling: false, heating: false }
    );
}

// ============================================================================
// ORDERING AND LOG STREAM
// ============================================================================

#[test]
fn test_records_arrive_in_acquisition_order() {
    let temps: Vec<u16> = vec![31, 12, 20, 25, 26, 19, 40, 0, 99, 23];
    let readings = temps.iter().map(|&t| Reading::new(t, t % 2)).collect();
    let run = run_script(&test_config(), readings, true);

    let published: Vec<u64> = run.published.iter().map(|p| p["temperature"].as_u64().unwrap()).collect();
    assert_eq!(published, temps.iter().map(|&t| u64::from(t)).collect::<Vec<_>>());

    let stamps: Vec<u64> = run.published.iter().map(|p| p["timestamp"].as_u64().unwrap()).collect();
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]), "timestamps should not go backwards: {stamps:?}");
    assert_eq!(run.report.records_forwarded, 10);
    assert_eq!(run.report.readings_dropped, 0);
}

#[test]
fn test_every_stage_reports_to_the_log() {
    let run = run_script(&test_config(), vec![Reading::new(30, 1)], true);

    let expected_prefixes = [
        "[Acquire     ] Set sensor values: Temp:  30  Motion: 1",
        "[Acquire     ] Get sensor values: Temp:  30  Motion: 1",
        "[Controller  ] T > 25C : Cooling on, Heating off",
        "[Controller  ] Motion detected: Light on",
        "[Controller  ] Send to stream:    Temp:  30  Motion: 1  Timestamp:",
        "[Transmit    ] Transmit to gateway: Temp:  30  Motion: 1  Timestamp:",
    ];
    for prefix in expected_prefixes {
        assert!(
            run.lines.iter().any(|l| l.starts_with(prefix)),
            "missing log line starting with {prefix:?} in {:#?}",
            run.lines
        );
    }
    let transmit = run.lines.iter().position(|l| l.starts_with("[Transmit    ]")).unwrap();
    assert!(run.lines[transmit..].iter().any(|l| l == " "), "transmit ends with a separator");

    // Within one producer, lines keep their send order.
    let pos = |prefix: &str| run.lines.iter().position(|l| l.starts_with(prefix)).unwrap();
    assert!(pos("[Controller  ] T > 25C") < pos("[Controller  ] Send to stream:"));
    assert!(pos("[Acquire     ] Set sensor values:") < pos("[Acquire     ] Get sensor values:"));
}

#[test]
fn test_long_lines_are_clamped_by_the_logger() {
    let config = NodeConfig {
        log_line_max_len: 16,
        ..test_config()
    };
    let run = run_script(&config, vec![Reading::new(22, 0)], true);

    assert!(!run.lines.is_empty());
    assert!(run.lines.iter().all(|l| l.len() <= 15), "{:#?}", run.lines);
}
