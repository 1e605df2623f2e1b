use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use lasersketch::console::{self, Command, ParseError};
use lasersketch::{init_logging, Config, ConnectionParams, Session, BUILD_DATE, VERSION};
use lasersketch_core::{EventCategory, EventFilter};
use lasersketch_settings::default_config_path;
use tokio::io::{AsyncBufReadExt, BufReader};

/// How often telemetry is drained while waiting for input
const PUMP_INTERVAL: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::info!("LaserSketch {} (built {})", VERSION, BUILD_DATE);

    let config_path = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => default_config_path()?,
    };
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let mut session = Session::from_config(&config)?;

    session.events().subscribe(
        EventFilter::Categories(vec![EventCategory::Connection, EventCategory::Error]),
        |event| println!("[{}]", event.description()),
    );

    if !config.connection.port.is_empty() {
        let params = ConnectionParams {
            port: config.connection.port.clone(),
            baud_rate: config.connection.baud_rate,
            read_timeout_ms: config.connection.read_timeout_ms,
            flow_control: config.connection.flow_control,
        };
        if let Err(e) = session.connect(&params) {
            tracing::warn!("Continuing without a machine: {}", e);
        }
    }

    println!("{}", console::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pump = tokio::time::interval(PUMP_INTERVAL);
    pump.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = pump.tick() => {
                session.pump_telemetry();
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match console::parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => match console::execute(&mut session, command) {
                        Ok(reply) if !reply.is_empty() => println!("{}", reply),
                        Ok(_) => {}
                        Err(e) => println!("Error: {:#}", e),
                    },
                    Err(ParseError::Empty) => {}
                    Err(e) => println!("{}", e),
                }
            }
        }
    }

    session.disconnect().await;
    tracing::info!("Goodbye");
    Ok(())
}
