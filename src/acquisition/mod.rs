// src/acquisition/mod.rs
pub mod buffer;
pub mod error;
pub mod export;
pub mod parser;
pub mod pipeline;
pub mod serial;
pub mod sink;
pub mod source;
pub mod threshold;
pub use buffer::HistorySnapshot;
pub use error::AcquisitionError;
pub use export::CsvExporter;
pub use pipeline::{AcquisitionLoop, LoopStats, TickOutcome};
pub use serial::SerialSource;
pub use sink::{DisplaySink, LogSink};
pub use source::{LineSource, ManualSource, SimulatedSource};
pub use threshold::{Comparison, ThresholdRule};
