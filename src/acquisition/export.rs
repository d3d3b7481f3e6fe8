use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use crate::acquisition::buffer::HistorySnapshot;
use crate::acquisition::AcquisitionError;
/// Writes aligned history rows to a comma-separated file.
#[derive(Clone, Debug)]
pub struct CsvExporter {
    path: PathBuf,
    header: Vec<String>,
}
impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>, header: Vec<String>) -> Self {
        Self {
            path: path.into(),
            header,
        }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    /// Replaces the target file. Returns the number of data rows written.
    pub fn export(&self, snapshot: &HistorySnapshot) -> Result<usize, AcquisitionError> {
        let wrap = |source: std::io::Error| AcquisitionError::Export {
            path: self.path.clone(),
            source,
        };
        let file = File::create(&self.path).map_err(wrap)?;
        let mut w = BufWriter::new(file);
        let rows = self.write_to(&mut w, snapshot).map_err(wrap)?;
        w.flush().map_err(wrap)?;
        Ok(rows)
    }
    pub fn write_to<W: Write>(&self, w: &mut W, snapshot: &HistorySnapshot) -> std::io::Result<usize> {
        writeln!(w, "{}", self.header.join(","))?;
        let mut rows = 0;
        for row in snapshot.aligned_rows() {
            let fields: Vec<String> = row.iter().map(|v| format_value(*v)).collect();
            writeln!(w, "{}", fields.join(","))?;
            rows += 1;
        }
        Ok(rows)
    }
}
/// Shortest round-trip form that always keeps a decimal point (`850.0`).
fn format_value(value: f64) -> String {
    format!("{value:?}")
}
