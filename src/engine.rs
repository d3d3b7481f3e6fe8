// src/engine.rs
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use log::{debug, error, info, trace, warn};
use crate::acquisition::{
    AcquisitionError, AcquisitionLoop, CsvExporter, DisplaySink, HistorySnapshot, LineSource,
    LoopStats, TickOutcome,
};
use crate::config::AppConfig;
use crate::types::{Command, SensorMessage};

/// Fixed-rate tick source. A tick that overruns its slot starts the next
/// one immediately instead of bursting to catch up.
pub struct FixedRateTicker {
    period: Duration,
    next: Instant,
}

impl FixedRateTicker {
    pub fn new(period: Duration) -> Self {
        Self { period, next: Instant::now() + period }
    }

    pub fn remaining(&self) -> Duration {
        self.next.saturating_duration_since(Instant::now())
    }

    pub fn advance(&mut self) {
        self.next = (self.next + self.period).max(Instant::now());
    }
}

/// Collects one refresh and ships it to the front end as a single snapshot.
struct ForwardingSink {
    tx: Sender<SensorMessage>,
    channels: Vec<Vec<f64>>,
}

impl DisplaySink for ForwardingSink {
    fn render(&mut self, channel: usize, samples: &[f64]) {
        if self.channels.len() <= channel {
            self.channels.resize(channel + 1, Vec::new());
        }
        self.channels[channel] = samples.to_vec();
    }

    fn refresh_done(&mut self) {
        let channels = std::mem::take(&mut self.channels);
        self.tx.send(SensorMessage::Frame(HistorySnapshot { channels })).ok();
    }
}

/// Single background writer for snapshot exports. Requests are written in
/// the order they were made; `finish` waits for the queue to drain.
struct ExportWorker {
    queue: Sender<HistorySnapshot>,
    handle: JoinHandle<()>,
}

impl ExportWorker {
    fn spawn(exporter: CsvExporter, tx: Sender<SensorMessage>) -> Self {
        let (queue, requests) = channel::<HistorySnapshot>();
        let handle = thread::spawn(move || {
            for snapshot in requests {
                match exporter.export(&snapshot) {
                    Ok(rows) => {
                        info!("saved {rows} rows to {}", exporter.path().display());
                        tx.send(SensorMessage::Exported { path: exporter.path().to_path_buf(), rows })
                            .ok();
                    }
                    Err(e) => {
                        error!("export failed: {e}");
                        tx.send(SensorMessage::ExportFailed(e.to_string())).ok();
                    }
                }
            }
        });
        Self { queue, handle }
    }

    fn request(&self, snapshot: HistorySnapshot) {
        if self.queue.send(snapshot).is_err() {
            error!("export worker is gone, request dropped");
        }
    }

    fn finish(self) {
        drop(self.queue);
        if self.handle.join().is_err() {
            error!("export worker panicked");
        }
    }
}

fn report<S: LineSource>(
    acquisition: &AcquisitionLoop<S>,
    outcome: &TickOutcome,
    tx: &Sender<SensorMessage>,
) {
    match outcome {
        TickOutcome::Idle => {}
        TickOutcome::Rejected { line, reason } => debug!("ignored line {line:?}: {reason:?}"),
        TickOutcome::Dropped(e @ AcquisitionError::Read(_)) => warn!("skipping tick: {e}"),
        TickOutcome::Dropped(e) => debug!("dropped line: {e}"),
        TickOutcome::Accepted { frame, alert } => {
            trace!("frame {:?}", frame.values());
            if let Some(alert) = alert {
                tx.send(SensorMessage::Alert(acquisition.describe(alert))).ok();
            }
        }
    }
}

/// Starts the acquisition thread. It owns the transport and the channel
/// histories until it returns; the transport is dropped and pending exports
/// are flushed on every exit path.
pub fn spawn_thread<S>(
    source: S,
    config: AppConfig,
    tx: Sender<SensorMessage>,
    rx_cmd: Receiver<Command>,
) -> JoinHandle<Result<LoopStats, AcquisitionError>>
where
    S: LineSource + Send + 'static,
{
    thread::spawn(move || {
        let exporter = CsvExporter::new(config.export_path.clone(), config.column_labels());
        let exports = ExportWorker::spawn(exporter, tx.clone());
        let mut acquisition = AcquisitionLoop::new(source, &config);
        let mut sink = ForwardingSink { tx: tx.clone(), channels: Vec::new() };
        let mut ticker = FixedRateTicker::new(config.sample_period());
        info!(
            "acquisition started: {} channels, {} samples, {} ms period",
            config.channel_count(),
            config.samples,
            config.sample_time_ms
        );
        tx.send(SensorMessage::Log("Acquisition started".to_owned())).ok();

        let result = 'acquire: loop {
            // 1. 采集一个 tick
            match acquisition.step(&mut sink) {
                Ok(outcome) => report(&acquisition, &outcome, &tx),
                Err(e) => {
                    error!("acquisition stopped: {e}");
                    tx.send(SensorMessage::Fatal(e.to_string())).ok();
                    break 'acquire Err(e);
                }
            }

            // 2. 等待下一个 tick，期间处理命令
            loop {
                match rx_cmd.recv_timeout(ticker.remaining()) {
                    Ok(Command::ExportRequested) => {
                        exports.request(acquisition.snapshot());
                    }
                    Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                        break 'acquire Ok(());
                    }
                    Err(RecvTimeoutError::Timeout) => break,
                }
            }
            ticker.advance();
        };

        let stats = acquisition.stats();
        info!(
            "acquisition finished: {} accepted, {} rejected, {} dropped, {} alerts",
            stats.accepted, stats.rejected, stats.dropped, stats.alerts
        );
        // 先停止 tick，再释放串口
        drop(acquisition.into_source());
        info!("transport released");
        // 等待未完成的导出写完
        exports.finish();
        result.map(|()| stats)
    })
}
