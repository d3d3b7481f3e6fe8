/// Consumer of refreshed channel histories (plots, console, tests).
///
/// `render` is called once per channel per refresh with a copy of that
/// channel's samples, oldest first; `refresh_done` closes the refresh.
pub trait DisplaySink {
    fn render(&mut self, channel: usize, samples: &[f64]);
    fn refresh_done(&mut self) {}
}
/// Sink that only reports the newest value of each channel at debug level.
#[derive(Default)]
pub struct LogSink {
    latest: Vec<Option<f64>>,
}
impl DisplaySink for LogSink {
    fn render(&mut self, channel: usize, samples: &[f64]) {
        if self.latest.len() <= channel {
            self.latest.resize(channel + 1, None);
        }
        self.latest[channel] = samples.last().copied();
    }
    fn refresh_done(&mut self) {
        let values: Vec<String> = self
            .latest
            .iter()
            .map(|v| v.map_or_else(|| "-".to_owned(), |v| v.to_string()))
            .collect();
        log::debug!("refresh: [{}]", values.join(", "));
    }
}
