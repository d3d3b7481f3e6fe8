use log::warn;
use crate::acquisition::buffer::{HistorySnapshot, SensorHistory};
use crate::acquisition::parser::{LineParser, ParseOutcome, ReadingFrame, RejectReason};
use crate::acquisition::sink::DisplaySink;
use crate::acquisition::source::LineSource;
use crate::acquisition::threshold::{Alert, Comparison, ThresholdRule};
use crate::acquisition::AcquisitionError;
use crate::config::AppConfig;
/// What a single tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// Nothing arrived within the read timeout.
    Idle,
    /// Header, blank or wrong-width line; nothing was touched.
    Rejected { line: String, reason: RejectReason },
    /// Recoverable failure; the tick was skipped.
    Dropped(AcquisitionError),
    Accepted {
        frame: ReadingFrame,
        alert: Option<Alert>,
    },
}
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub accepted: u64,
    pub rejected: u64,
    pub dropped: u64,
    pub alerts: u64,
}
/// Sole owner and writer of the channel histories.
pub struct AcquisitionLoop<S: LineSource> {
    source: S,
    parser: LineParser,
    history: SensorHistory,
    rule: ThresholdRule,
    channel_names: Vec<String>,
    stats: LoopStats,
}
impl<S: LineSource> AcquisitionLoop<S> {
    pub fn new(source: S, config: &AppConfig) -> Self {
        Self {
            source,
            parser: LineParser::new(config.ceilings(), config.header_marker.clone()),
            history: SensorHistory::new(config.channel_count(), config.samples),
            rule: config.threshold,
            channel_names: config.channels.iter().map(|c| c.name.clone()).collect(),
            stats: LoopStats::default(),
        }
    }
    /// Reads at most one line and applies it. Only fatal errors are returned;
    /// everything else is folded into the outcome for the caller to report.
    pub fn tick(&mut self) -> Result<TickOutcome, AcquisitionError> {
        let line = match self.source.read_line() {
            Ok(Some(line)) => line,
            Ok(None) => return Ok(TickOutcome::Idle),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                self.stats.dropped += 1;
                return Ok(TickOutcome::Dropped(e));
            }
        };
        let frame = match self.parser.parse(&line) {
            Ok(ParseOutcome::Frame(frame)) => frame,
            Ok(ParseOutcome::Rejected(reason)) => {
                self.stats.rejected += 1;
                return Ok(TickOutcome::Rejected { line, reason });
            }
            Err(e) => {
                self.stats.dropped += 1;
                return Ok(TickOutcome::Dropped(e));
            }
        };
        self.history.apply(&frame)?;
        self.stats.accepted += 1;
        let alert = self.rule.evaluate(&frame);
        if let Some(alert) = &alert {
            self.stats.alerts += 1;
            warn!("[!] {}", self.describe(alert));
        }
        Ok(TickOutcome::Accepted { frame, alert })
    }
    /// One full cycle: tick, then push fresh copies to the sink when the
    /// history changed.
    pub fn step(&mut self, sink: &mut dyn DisplaySink) -> Result<TickOutcome, AcquisitionError> {
        let outcome = self.tick()?;
        if matches!(outcome, TickOutcome::Accepted { .. }) {
            self.refresh(sink);
        }
        Ok(outcome)
    }
    pub fn refresh(&self, sink: &mut dyn DisplaySink) {
        for channel in 0..self.history.channel_count() {
            if let Some(buffer) = self.history.channel(channel) {
                sink.render(channel, &buffer.snapshot());
            }
        }
        sink.refresh_done();
    }
    pub fn snapshot(&self) -> HistorySnapshot {
        self.history.snapshot()
    }
    pub fn stats(&self) -> LoopStats {
        self.stats
    }
    pub fn describe(&self, alert: &Alert) -> String {
        let name = self
            .channel_names
            .get(alert.channel)
            .map(String::as_str)
            .unwrap_or("channel");
        let direction = match alert.comparison {
            Comparison::Above => "high",
            Comparison::Below => "low",
        };
        format!(
            "{name} {direction}: {} (limit {})",
            alert.value, alert.limit
        )
    }
    /// Hands the transport back so the caller controls when it is released.
    pub fn into_source(self) -> S {
        self.source
    }
}
