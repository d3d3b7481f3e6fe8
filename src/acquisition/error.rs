use std::path::PathBuf;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("serial port {port} setup failed: {source}")]
    Setup {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("transport disconnected: {0}")]
    Disconnected(String),
    #[error("transport read failed: {0}")]
    Read(#[source] std::io::Error),
    #[error("field {index} ({field:?}) is not a finite number")]
    InvalidField { index: usize, field: String },
    #[error("frame has {actual} values but history tracks {expected} channels")]
    FrameMismatch { expected: usize, actual: usize },
    #[error("failed to write export to {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
impl AcquisitionError {
    /// Errors after which the acquisition loop must stop.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AcquisitionError::Open { .. }
                | AcquisitionError::Setup { .. }
                | AcquisitionError::Disconnected(_)
                | AcquisitionError::FrameMismatch { .. }
        )
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn per_tick_errors_are_recoverable() {
        let read = AcquisitionError::Read(std::io::Error::new(
            std::io::ErrorKind::Other,
            "framing error",
        ));
        let parse = AcquisitionError::InvalidField {
            index: 1,
            field: "abc".into(),
        };
        assert!(!read.is_fatal());
        assert!(!parse.is_fatal());
        assert!(AcquisitionError::Disconnected("eof".into()).is_fatal());
        assert!(AcquisitionError::FrameMismatch {
            expected: 4,
            actual: 3
        }
        .is_fatal());
    }
    #[test]
    fn invalid_field_message_names_the_field() {
        let err = AcquisitionError::InvalidField {
            index: 2,
            field: "12x".into(),
        };
        assert_eq!(err.to_string(), "field 2 (\"12x\") is not a finite number");
    }
}
