// src/gui.rs
use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};
use eframe::egui;
use egui::{Color32, RichText};
use egui_plot::{HLine, Legend, Line, LineStyle, Plot, PlotPoints};
use crate::acquisition::{Comparison, DisplaySink, HistorySnapshot, ThresholdRule};
use crate::config::{AppConfig, ChannelSpec};
use crate::types::{Command, SensorMessage};

const LOG_LINES: usize = 8;
const ALERT_HOLD: Duration = Duration::from_secs(2);
const COLORS: [Color32; 4] = [
    Color32::from_rgb(31, 119, 180),
    Color32::from_rgb(255, 127, 14),
    Color32::from_rgb(44, 160, 44),
    Color32::from_rgb(148, 103, 189),
];

/// Plot-ready copy of the latest refresh.
#[derive(Default)]
struct Traces {
    points: Vec<Vec<[f64; 2]>>, // channel -> (index, value)
}

impl DisplaySink for Traces {
    fn render(&mut self, channel: usize, samples: &[f64]) {
        if self.points.len() <= channel {
            self.points.resize(channel + 1, Vec::new());
        }
        self.points[channel] = samples
            .iter()
            .enumerate()
            .map(|(i, v)| [i as f64, *v])
            .collect();
    }
}

pub struct SensorScopeApp {
    channels: Vec<ChannelSpec>,
    samples: usize,
    threshold: ThresholdRule,
    period: Duration,
    traces: Traces,
    last_alert: Option<(String, Instant)>,
    log_messages: Vec<String>,
    rx: Receiver<SensorMessage>,
    tx_cmd: Sender<Command>,
}

impl SensorScopeApp {
    pub fn new(config: &AppConfig, tx_cmd: Sender<Command>, rx: Receiver<SensorMessage>) -> Self {
        Self {
            channels: config.channels.clone(),
            samples: config.samples,
            threshold: config.threshold,
            period: config.sample_period(),
            traces: Traces::default(),
            last_alert: None,
            log_messages: vec!["Waiting for data...".to_owned()],
            rx,
            tx_cmd,
        }
    }

    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > LOG_LINES { self.log_messages.remove(0); }
    }

    fn show_frame(&mut self, snapshot: &HistorySnapshot) {
        for (channel, samples) in snapshot.channels.iter().enumerate() {
            self.traces.render(channel, samples);
        }
        self.traces.refresh_done();
    }

    fn plot_channel(&self, ui: &mut egui::Ui, index: usize, height: f32) {
        let Some(spec) = self.channels.get(index) else { return };
        ui.label(RichText::new(spec.title()).strong());
        let points = self.traces.points.get(index).cloned().unwrap_or_default();
        let color = COLORS[index % COLORS.len()];
        let is_threshold_channel = self.threshold.channel == index;
        let limit = self.threshold.limit;
        Plot::new(format!("channel_{index}"))
            .height(height)
            .include_x(0.0)
            .include_x(self.samples as f64)
            .include_y(spec.y_min)
            .include_y(spec.y_max)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new(PlotPoints::new(points)).color(color).name(&spec.name));
                if is_threshold_channel {
                    let label = match self.threshold.comparison {
                        Comparison::Above => format!("{} high", spec.name),
                        Comparison::Below => format!("{} low", spec.name),
                    };
                    plot_ui.hline(
                        HLine::new(limit)
                            .color(Color32::RED)
                            .style(LineStyle::dashed_loose())
                            .name(label),
                    );
                }
            });
    }
}

impl eframe::App for SensorScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 1. 消息处理
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                SensorMessage::Log(s) => self.log(&s),
                SensorMessage::Frame(snapshot) => self.show_frame(&snapshot),
                SensorMessage::Alert(text) => {
                    self.log(&format!("[!] {text}"));
                    self.last_alert = Some((text, Instant::now()));
                }
                SensorMessage::Exported { path, rows } => {
                    self.log(&format!("Saved {} rows to {}", rows, path.display()));
                }
                SensorMessage::ExportFailed(e) => self.log(&format!("Save failed: {e}")),
                SensorMessage::Fatal(e) => {
                    self.log(&format!("Stopped: {e}"));
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            }
        }
        if self.last_alert.as_ref().is_some_and(|(_, at)| at.elapsed() > ALERT_HOLD) {
            self.last_alert = None;
        }

        // 2. UI 绘制
        egui::SidePanel::right("controls").min_width(180.0).show(ctx, |ui| {
            ui.add_space(10.0);
            ui.heading("Sensorscope");
            ui.separator();
            if ui.button("Save data").clicked() {
                self.tx_cmd.send(Command::ExportRequested).ok();
            }
            ui.add_space(10.0);
            if let Some((text, _)) = &self.last_alert {
                ui.label(RichText::new(format!("[!] {text}")).color(Color32::RED).strong());
            }
            ui.add_space(10.0);
            egui::ScrollArea::vertical().show(ui, |ui| {
                for m in &self.log_messages { ui.monospace(m); }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            // 2 列网格, 每格一个通道
            let rows = (self.channels.len() + 1) / 2;
            let height = (ui.available_height() / rows.max(1) as f32 - 30.0).max(80.0);
            for row in 0..rows {
                ui.columns(2, |cols| {
                    for (col, ui) in cols.iter_mut().enumerate() {
                        self.plot_channel(ui, row * 2 + col, height);
                    }
                });
            }
        });

        ctx.request_repaint_after(self.period);
    }
}

/// Blocks until the window closes.
pub fn run(config: &AppConfig, tx_cmd: Sender<Command>, rx: Receiver<SensorMessage>) -> anyhow::Result<()> {
    let app = SensorScopeApp::new(config, tx_cmd, rx);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 600.0])
            .with_title("Sensorscope"),
        ..Default::default()
    };
    eframe::run_native("Sensorscope", options, Box::new(move |_cc| Box::new(app)))
        .map_err(|e| anyhow::anyhow!("display failed: {e}"))
}
