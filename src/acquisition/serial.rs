use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::thread;
use std::time::{Duration, Instant};
use log::{info, warn};
use serialport::ClearBuffer;
use crate::acquisition::source::LineSource;
use crate::acquisition::AcquisitionError;
/// Longest line kept while waiting for a terminator; anything longer is line noise.
const MAX_PENDING_BYTES: usize = 4096;
/// Line-oriented reader over a serial device.
///
/// Bytes that arrive without a newline before the read budget runs out are
/// kept and completed on a later tick, so a slow sender never produces split
/// frames. A single call never runs longer than the budget plus one port
/// timeout, nor buffers more than `MAX_PENDING_BYTES`.
pub struct SerialSource {
    port_name: String,
    reader: BufReader<Box<dyn Read + Send>>,
    pending: Vec<u8>,
    read_budget: Duration,
}
impl SerialSource {
    /// Opens the port, waits for the board to settle after reset, then drops
    /// whatever it printed while booting.
    pub fn open(
        port_name: &str,
        baud_rate: u32,
        read_timeout: Duration,
        settle: Duration,
    ) -> Result<Self, AcquisitionError> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(read_timeout)
            .open()
            .map_err(|source| AcquisitionError::Open {
                port: port_name.to_string(),
                source,
            })?;
        thread::sleep(settle);
        port.clear(ClearBuffer::Input)
            .map_err(|source| AcquisitionError::Setup {
                port: port_name.to_string(),
                source,
            })?;
        info!("connected to {port_name} at {baud_rate} baud");
        Ok(Self::from_reader(port_name, Box::new(port), read_timeout))
    }
    pub fn from_reader(port_name: &str, reader: Box<dyn Read + Send>, read_budget: Duration) -> Self {
        Self {
            port_name: port_name.to_string(),
            reader: BufReader::new(reader),
            pending: Vec::new(),
            read_budget,
        }
    }
    fn take_line(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.pending).trim_end().to_owned();
        self.pending.clear();
        line
    }
    fn read_failed(&mut self, e: std::io::Error) -> Result<Option<String>, AcquisitionError> {
        match e.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => Ok(None),
            ErrorKind::BrokenPipe | ErrorKind::NotConnected | ErrorKind::UnexpectedEof => Err(
                AcquisitionError::Disconnected(format!("{}: {e}", self.port_name)),
            ),
            _ => {
                self.pending.clear();
                Err(AcquisitionError::Read(e))
            }
        }
    }
}
impl LineSource for SerialSource {
    fn read_line(&mut self) -> Result<Option<String>, AcquisitionError> {
        let started = Instant::now();
        loop {
            let chunk = match self.reader.fill_buf() {
                Ok(chunk) => chunk,
                Err(e) => return self.read_failed(e),
            };
            if chunk.is_empty() {
                return Err(AcquisitionError::Disconnected(format!(
                    "{} reached end of stream",
                    self.port_name
                )));
            }
            if let Some(end) = chunk.iter().position(|&b| b == b'\n') {
                self.pending.extend_from_slice(&chunk[..=end]);
                self.reader.consume(end + 1);
                return Ok(Some(self.take_line()));
            }
            let taken = chunk.len();
            self.pending.extend_from_slice(chunk);
            self.reader.consume(taken);
            if self.pending.len() > MAX_PENDING_BYTES {
                warn!(
                    "{}: discarding {} bytes without line terminator",
                    self.port_name,
                    self.pending.len()
                );
                self.pending.clear();
                return Ok(None);
            }
            if started.elapsed() >= self.read_budget {
                return Ok(None);
            }
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    /// Scripted device: each entry is one `read` result.
    struct ScriptedPort {
        script: VecDeque<io::Result<Vec<u8>>>,
    }
    impl Read for ScriptedPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.script.pop_front() {
                Some(Ok(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Some(Err(e)) => Err(e),
                None => Ok(0),
            }
        }
    }
    fn source(script: Vec<io::Result<Vec<u8>>>) -> SerialSource {
        SerialSource::from_reader(
            "test",
            Box::new(ScriptedPort {
                script: script.into(),
            }),
            Duration::from_secs(1),
        )
    }
    fn timeout() -> io::Result<Vec<u8>> {
        Err(io::Error::new(ErrorKind::TimedOut, "timed out"))
    }
    #[test]
    fn complete_line_is_returned_without_terminator() {
        let mut src = source(vec![Ok(b"100,25.0,1013.0,500\r\n".to_vec())]);
        assert_eq!(
            src.read_line().unwrap().as_deref(),
            Some("100,25.0,1013.0,500")
        );
    }
    #[test]
    fn timeout_yields_no_data_and_keeps_partial_line() {
        let mut src = source(vec![
            Ok(b"110,25.5,".to_vec()),
            timeout(),
            Ok(b"1016.0,860\n".to_vec()),
        ]);
        assert!(src.read_line().unwrap().is_none());
        assert_eq!(
            src.read_line().unwrap().as_deref(),
            Some("110,25.5,1016.0,860")
        );
    }
    #[test]
    fn end_of_stream_is_a_disconnect() {
        let mut src = source(vec![]);
        assert!(src.read_line().unwrap_err().is_fatal());
    }
    #[test]
    fn other_read_errors_are_transient() {
        let mut src = source(vec![
            Err(io::Error::new(ErrorKind::InvalidData, "framing")),
            Ok(b"1,2,3,4\n".to_vec()),
        ]);
        let err = src.read_line().unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(src.read_line().unwrap().as_deref(), Some("1,2,3,4"));
    }
    /// Device that never terminates a line: `\r`-only endings.
    struct CarriageReturnPort {
        sent: Arc<AtomicUsize>,
    }
    impl Read for CarriageReturnPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let chunk = b"100,25.0,1013.0,500\r".repeat(4);
            let n = chunk.len().min(buf.len()).min(64);
            buf[..n].copy_from_slice(&chunk[..n]);
            self.sent.fetch_add(n, Ordering::SeqCst);
            Ok(n)
        }
    }
    #[test]
    fn endless_unterminated_input_is_bounded() {
        let sent = Arc::new(AtomicUsize::new(0));
        let mut src = SerialSource::from_reader(
            "test",
            Box::new(CarriageReturnPort { sent: sent.clone() }),
            Duration::from_secs(60),
        );
        assert!(src.read_line().unwrap().is_none());
        assert!(sent.load(Ordering::SeqCst) <= MAX_PENDING_BYTES + 64);
        assert!(src.pending.is_empty());
        // later ticks stay bounded as well
        assert!(src.read_line().unwrap().is_none());
        assert!(sent.load(Ordering::SeqCst) <= 2 * (MAX_PENDING_BYTES + 64));
    }
    #[test]
    fn exhausted_budget_keeps_partial_line() {
        let mut src = SerialSource::from_reader(
            "test",
            Box::new(ScriptedPort {
                script: vec![Ok(b"120,26.0,".to_vec()), Ok(b"1010.0,300\n".to_vec())].into(),
            }),
            Duration::ZERO,
        );
        assert!(src.read_line().unwrap().is_none());
        assert_eq!(
            src.read_line().unwrap().as_deref(),
            Some("120,26.0,1010.0,300")
        );
    }
}
