use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use rand::Rng;
use crate::acquisition::AcquisitionError;
/// Anything that can hand the acquisition loop one text line per tick.
///
/// `Ok(None)` means nothing arrived within the read timeout. Errors for which
/// [`AcquisitionError::is_fatal`] holds end acquisition.
pub trait LineSource {
    fn read_line(&mut self) -> Result<Option<String>, AcquisitionError>;
}
impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn read_line(&mut self) -> Result<Option<String>, AcquisitionError> {
        (**self).read_line()
    }
}
/// In-memory source useful for tests and replaying captured sessions.
pub struct ManualSource {
    queue: VecDeque<String>,
    disconnect_when_empty: bool,
}
impl ManualSource {
    pub fn new<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            queue: lines.into_iter().map(Into::into).collect(),
            disconnect_when_empty: false,
        }
    }
    /// Loads a capture file; running out of lines behaves like an unplugged device.
    pub fn replay(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read replay file {}", path.display()))?;
        let mut source = Self::new(text.lines());
        source.disconnect_when_empty = true;
        Ok(source)
    }
}
impl LineSource for ManualSource {
    fn read_line(&mut self) -> Result<Option<String>, AcquisitionError> {
        match self.queue.pop_front() {
            Some(line) => Ok(Some(line)),
            None if self.disconnect_when_empty => {
                Err(AcquisitionError::Disconnected("end of replay".into()))
            }
            None => Ok(None),
        }
    }
}
/// Fake air-quality board: MQ135 raw, temperature, pressure, light.
pub struct SimulatedSource {
    phase: f64,
    header_sent: bool,
}
impl SimulatedSource {
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            header_sent: false,
        }
    }
}
impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}
impl LineSource for SimulatedSource {
    fn read_line(&mut self) -> Result<Option<String>, AcquisitionError> {
        let mut rng = rand::thread_rng();
        // Boards print a header once after reset.
        if !self.header_sent {
            self.header_sent = true;
            return Ok(Some("MQ135,Temperatura,Presion,Luz".to_owned()));
        }
        if rng.gen_bool(0.02) {
            return Ok(Some("ERR,sensor".to_owned()));
        }
        if rng.gen_bool(0.05) {
            return Ok(None);
        }
        self.phase += 0.05;
        let gas = 300.0 + 80.0 * self.phase.sin() + rng.gen_range(-15.0..15.0);
        let temp = 24.0 + 2.0 * (self.phase * 0.3).sin() + rng.gen_range(-0.2..0.2);
        let pressure = 1012.0 + 5.0 * (self.phase * 0.7).sin() + rng.gen_range(-0.5..0.5);
        let light = 600.0 + 350.0 * (self.phase * 0.2).cos() + rng.gen_range(-20.0..20.0);
        Ok(Some(format!(
            "{:.0},{:.1},{:.1},{:.0}",
            gas,
            temp,
            pressure,
            light.max(0.0)
        )))
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    #[test]
    fn manual_source_idles_when_drained() {
        let mut source = ManualSource::new(["a", "b"]);
        assert_eq!(source.read_line().unwrap().as_deref(), Some("a"));
        assert_eq!(source.read_line().unwrap().as_deref(), Some("b"));
        assert!(source.read_line().unwrap().is_none());
    }
    #[test]
    fn replay_ends_with_disconnect() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1,2,3,4").unwrap();
        writeln!(file, "5,6,7,8").unwrap();
        let mut source = ManualSource::replay(file.path()).unwrap();
        assert_eq!(source.read_line().unwrap().as_deref(), Some("1,2,3,4"));
        assert_eq!(source.read_line().unwrap().as_deref(), Some("5,6,7,8"));
        let err = source.read_line().unwrap_err();
        assert!(err.is_fatal());
    }
    #[test]
    fn simulated_source_opens_with_header() {
        let mut source = SimulatedSource::new();
        let first = source.read_line().unwrap().unwrap();
        assert!(first.contains("MQ135"));
        for _ in 0..50 {
            if let Some(line) = source.read_line().unwrap() {
                assert!(!line.is_empty());
            }
        }
    }
}
