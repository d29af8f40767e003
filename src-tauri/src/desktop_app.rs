use eframe::egui;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::core::{AppConfig, FFUtils, ProcessingStatus, Processor};
use crate::shell::{JobForm, JobLauncher, JobParams, Notice, ShellState};

const MAX_LOG_LINES: usize = 100;

/// Runs each job on its own worker thread and wakes the UI when it ends.
struct WorkerLauncher {
    processor: Arc<Processor>,
    ctx: egui::Context,
}

impl JobLauncher for WorkerLauncher {
    fn launch(&mut self, params: JobParams) {
        let processor = Arc::clone(&self.processor);
        let ctx = self.ctx.clone();
        thread::spawn(move || {
            if !processor.amplify(&params.input, &params.output, params.factor) {
                debug!(input = %params.input.display(), "job did not succeed");
            }
            ctx.request_repaint();
        });
    }
}

struct VideoAmplifierApp {
    processor: Arc<Processor>,
    rx: Receiver<ProcessingStatus>,
    form: JobForm,
    state: ShellState,
    output_suffix: String,
    log_messages: Vec<String>,
}

impl VideoAmplifierApp {
    fn new(processor: Arc<Processor>) -> Self {
        let config = processor.config().clone();
        let rx = processor.subscribe();
        let mut app = Self {
            processor,
            rx,
            form: JobForm::new(config.default_factor),
            state: ShellState::default(),
            output_suffix: config.output_suffix.clone(),
            log_messages: Vec::new(),
        };

        match FFUtils::new(config.ffmpeg_path.clone(), config.ffprobe_path.clone()).version() {
            Ok(version) => app.log(&format!("Found {}", version)),
            Err(e) => {
                warn!(error = %e, "ffmpeg not available");
                app.log(&format!("ffmpeg not available: {}", e));
            }
        }
        app.log("Ready. Choose a video, an output location and a factor.");
        app
    }

    /// Drain every snapshot the worker published since the last frame.
    fn drain_status(&mut self) {
        while let Ok(status) = self.rx.try_recv() {
            match self.state.apply(&status) {
                Some(Notice::Success(_)) => self.log("Processing complete"),
                Some(Notice::Error(text)) => self.log(&text),
                None if status.is_processing => {
                    self.log(&format!("{:>3.0}% {}", status.progress, status.status_message))
                }
                None => {}
            }
        }
    }

    fn start_processing(&mut self, ctx: &egui::Context) {
        let mut launcher = WorkerLauncher {
            processor: Arc::clone(&self.processor),
            ctx: ctx.clone(),
        };
        if self.state.submit(&self.form, &mut launcher) {
            info!(input = %self.form.input_path, output = %self.form.output_path, "job submitted");
            self.log(&format!("Processing {}", self.form.input_path));
            ctx.request_repaint();
        } else if let Some(err) = self.state.inline_error.clone() {
            self.log(&err);
        }
    }

    fn browse_input(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Select Video File")
            .add_filter("Video files", &["mp4", "avi", "mov", "mkv"])
            .add_filter("All files", &["*"])
            .pick_file()
        {
            self.form.select_input(&path, &self.output_suffix);
            self.log(&format!("Input: {}", self.form.input_path));
        }
    }

    fn browse_output(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Save Amplified Video As")
            .add_filter("Video files", &["mp4"])
            .add_filter("All files", &["*"])
            .set_file_name("output.mp4")
            .save_file()
        {
            let path = if path.extension().is_none() {
                path.with_extension("mp4")
            } else {
                path
            };
            self.form.output_path = path.to_string_lossy().to_string();
            self.log(&format!("Output: {}", self.form.output_path));
        }
    }

    fn log(&mut self, message: &str) {
        let timestamp = chrono::Local::now().format("[%H:%M:%S]").to_string();
        self.log_messages.push(format!("{} {}", timestamp, message));
        if self.log_messages.len() > MAX_LOG_LINES {
            self.log_messages.remove(0);
        }
    }

    fn render_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.state.notice.clone() else {
            return;
        };
        let color = match notice {
            Notice::Success(_) => egui::Color32::LIGHT_GREEN,
            Notice::Error(_) => egui::Color32::LIGHT_RED,
        };
        egui::Window::new(notice.title())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.colored_label(color, notice.text());
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    self.state.dismiss_notice();
                }
            });
    }
}

impl eframe::App for VideoAmplifierApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_status();

        egui::TopBottomPanel::bottom("log_panel")
            .resizable(true)
            .min_height(90.0)
            .show(ctx, |ui| {
                ui.collapsing("Activity log", |ui| {
                    egui::ScrollArea::vertical()
                        .auto_shrink([false; 2])
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for msg in &self.log_messages {
                                let color = if msg.contains("Error") || msg.contains("not available") {
                                    egui::Color32::LIGHT_RED
                                } else if msg.contains("complete") {
                                    egui::Color32::LIGHT_GREEN
                                } else {
                                    egui::Color32::LIGHT_GRAY
                                };
                                ui.colored_label(color, msg);
                            }
                        });
                });
            });

        let modal_open = self.state.notice.is_some();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!modal_open, |ui| {
                egui::Frame::group(ui.style()).inner_margin(10.0).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label("Input Video");
                    ui.horizontal(|ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut self.form.input_path)
                                .hint_text("Select a video file...")
                                .desired_width(400.0),
                        );
                        if ui.button("Browse").clicked() {
                            self.browse_input();
                        }
                    });
                });

                ui.add_space(5.0);

                egui::Frame::group(ui.style()).inner_margin(10.0).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label("Output Location");
                    ui.horizontal(|ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut self.form.output_path)
                                .hint_text("Where to save the amplified video...")
                                .desired_width(400.0),
                        );
                        if ui.button("Browse").clicked() {
                            self.browse_output();
                        }
                    });
                });

                ui.add_space(5.0);

                egui::Frame::group(ui.style()).inner_margin(10.0).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label("Amplification Settings");
                    ui.horizontal(|ui| {
                        ui.label("Amplification Factor:");
                        ui.add(egui::TextEdit::singleline(&mut self.form.factor).desired_width(60.0));
                        ui.small("(+10 dB per unit)");
                    });
                });

                ui.add_space(5.0);

                egui::Frame::group(ui.style()).inner_margin(10.0).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label("Progress");
                    let progress_bar = egui::ProgressBar::new(self.state.progress / 100.0)
                        .show_percentage()
                        .animate(self.state.running);
                    ui.add(progress_bar);
                    ui.label(&self.state.message);
                });

                ui.add_space(15.0);

                ui.vertical_centered(|ui| {
                    let can_start = self.state.can_start() && !self.processor.is_processing();
                    let button = egui::Button::new("Process Video").min_size(egui::vec2(140.0, 30.0));
                    let response = ui.add_enabled(can_start, button);
                    if response.clicked() {
                        self.start_processing(ctx);
                    }
                    if !can_start {
                        response.on_disabled_hover_text("A video is being processed");
                    }
                    if let Some(err) = &self.state.inline_error {
                        ui.colored_label(egui::Color32::RED, err);
                    }
                });
            });
        });

        self.render_notice(ctx);

        // Keep draining while the worker is busy.
        if self.state.running || self.processor.is_processing() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

pub fn run_desktop_app(config: AppConfig) -> Result<(), eframe::Error> {
    let processor = Arc::new(Processor::new(config));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([600.0, 400.0])
            .with_min_inner_size([480.0, 360.0])
            .with_title("Video Audio Amplifier"),
        ..Default::default()
    };

    eframe::run_native(
        "Video Audio Amplifier",
        options,
        Box::new(move |_cc| Ok(Box::new(VideoAmplifierApp::new(processor)))),
    )
}
