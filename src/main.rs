// src/main.rs
mod acquisition;
mod config;
mod console;
mod engine;
mod gui;
mod types;
use std::path::PathBuf;
use std::sync::mpsc::channel;
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;
use acquisition::{LineSource, ManualSource, SerialSource, SimulatedSource};
use config::AppConfig;
use types::Command;

/// Live monitor for a serial sensor board.
#[derive(Parser, Debug)]
#[command(name = "sensorscope", version)]
struct Args {
    /// TOML configuration file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Serial port, e.g. COM10 or /dev/ttyACM0
    #[arg(short, long)]
    port: Option<String>,
    #[arg(short, long)]
    baud: Option<u32>,
    /// Where "save data" writes the CSV snapshot
    #[arg(long)]
    export_path: Option<PathBuf>,
    /// Generate readings instead of opening a serial port
    #[arg(long, conflicts_with = "replay")]
    simulate: bool,
    /// Feed lines from a captured text file instead of a serial port
    #[arg(long)]
    replay: Option<PathBuf>,
    /// Log-only front end; Enter saves, q quits
    #[arg(long)]
    headless: bool,
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(port) = &args.port {
        config.serial.port = port.clone();
    }
    if let Some(baud) = args.baud {
        config.serial.baud_rate = baud;
    }
    if let Some(path) = &args.export_path {
        config.export_path = path.clone();
    }
    config.validate()?;
    Ok(config)
}

fn open_source(args: &Args, config: &AppConfig) -> Result<Box<dyn LineSource + Send>> {
    if args.simulate {
        info!("using simulated sensor board");
        return Ok(Box::new(SimulatedSource::new()));
    }
    if let Some(path) = &args.replay {
        info!("replaying {}", path.display());
        return Ok(Box::new(ManualSource::replay(path)?));
    }
    let serial = &config.serial;
    let source = SerialSource::open(
        &serial.port,
        serial.baud_rate,
        serial.read_timeout(),
        serial.settle(),
    )
    .context("could not connect to the sensor board")?;
    Ok(Box::new(source))
}

// 入口函数
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = load_config(&args)?;
    let source = open_source(&args, &config)?;

    let (tx, rx) = channel();
    let (tx_cmd, rx_cmd) = channel();
    let handle = engine::spawn_thread(source, config.clone(), tx, rx_cmd);

    let front_end = if args.headless {
        console::run(tx_cmd.clone(), rx);
        Ok(())
    } else {
        gui::run(&config, tx_cmd.clone(), rx)
    };

    // 先停止采集线程，再处理前端错误
    tx_cmd.send(Command::Shutdown).ok();
    let joined = handle.join();
    front_end?;
    match joined {
        Ok(Ok(stats)) => {
            info!("bye ({} frames)", stats.accepted);
            Ok(())
        }
        // The acquisition thread already logged the diagnostic.
        Ok(Err(_)) => std::process::exit(1),
        Err(_) => Err(anyhow!("acquisition thread panicked")),
    }
}
