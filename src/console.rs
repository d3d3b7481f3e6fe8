// src/console.rs
use std::io::BufRead;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use log::info;
use crate::acquisition::{DisplaySink, LogSink};
use crate::types::{Command, SensorMessage};

/// Maps one line typed on stdin to a command. Empty line or `s` saves,
/// `q` quits, anything else is ignored.
fn command_for(input: &str) -> Option<Command> {
    match input.trim() {
        "" | "s" | "save" => Some(Command::ExportRequested),
        "q" | "quit" => Some(Command::Shutdown),
        _ => None,
    }
}

/// Headless front end: refreshes go to the log, stdin drives export and quit.
/// Returns once the acquisition thread has stopped talking.
pub fn run(tx_cmd: Sender<Command>, rx: Receiver<SensorMessage>) {
    info!("headless mode: press Enter to save data, type q to quit");
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if let Some(cmd) = command_for(&line) {
                if tx_cmd.send(cmd).is_err() {
                    break;
                }
            }
        }
    });

    let mut sink = LogSink::default();
    while let Ok(msg) = rx.recv() {
        match msg {
            SensorMessage::Frame(snapshot) => {
                for (channel, samples) in snapshot.channels.iter().enumerate() {
                    sink.render(channel, samples);
                }
                sink.refresh_done();
            }
            SensorMessage::Fatal(_) => break,
            // 采集线程已经写过日志
            SensorMessage::Log(_)
            | SensorMessage::Alert(_)
            | SensorMessage::Exported { .. }
            | SensorMessage::ExportFailed(_) => {}
        }
    }
}
