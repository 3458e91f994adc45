use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;
use std::time::Duration;

use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use room_sensor_node::{
    load_config, spawn_pipeline, Connectivity, LinkTransport, NodeResult, NullTransport, SimulatedSensors,
    Transport, TransportError, WriterSink,
};

const DEFAULT_CONFIG_PATH: &str = "config/node_config.toml";
const LINK_READY_TIMEOUT: Duration = Duration::from_secs(5);

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(config_path: &str) -> NodeResult<()> {
    let config = load_config(config_path)?;

    println!("===========================================");
    println!("*** Sensor Node {:03} Starting ***", config.room_number);
    println!("===========================================\n");

    let connectivity = Connectivity::new(false);
    let transport: Box<dyn Transport> = match &config.link_path {
        Some(path) => {
            let link = File::create(path).map_err(TransportError::from)?;
            connectivity.set_ready(true);
            Box::new(LinkTransport::new(BufWriter::new(link)))
        }
        None => {
            connectivity.set_ready(true);
            Box::new(NullTransport)
        }
    };
    if !connectivity.wait_ready(LINK_READY_TIMEOUT) {
        warn!(timeout = ?LINK_READY_TIMEOUT, "link not ready, records will be dropped until it comes up");
    }

    let pipeline = spawn_pipeline(
        &config,
        SimulatedSensors::new(config.simulation_seed),
        transport,
        WriterSink::stdout(),
        connectivity,
    )?;

    match config.run_for_secs {
        Some(secs) => {
            std::thread::sleep(Duration::from_secs(secs));
            println!("\n===========================================");
            println!("Run of {secs}s completed");
            println!("===========================================");
            println!("{}", pipeline.metrics().report());
            Ok(())
        }
        None => pipeline.join(),
    }
}

fn main() -> ExitCode {
    init_tracing();
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    match run(&config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(room_sensor_node::NodeError::TaskPanicked(task)) => {
            error!(task, "task died, resetting node");
            std::process::abort();
        }
        Err(e) => {
            error!(error = %e, "sensor node stopped");
            ExitCode::FAILURE
        }
    }
}
