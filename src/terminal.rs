// SPDX-License-Identifier: GPL-3.0-only

//! Terminal demo screen
//!
//! Renders the camera preview to the terminal using Unicode half-block
//! characters and drives the application state machine: a dropdown mode
//! picker, per-mode capture keys, and a status bar showing capture results,
//! the recording timer, or the latest scanned code.

use crate::app::frame_processor::FrameProcessor;
use crate::app::state::{AppModel, Command, DemoMode, Message, PreviewView};
use crate::backends::types::{CameraFrame, FrameReceiver};
use crate::backends::CameraBackend;
use crate::config::Config;
use crate::constants::{DEVICE_RESOLVE_TIMEOUT, FRAME_CHANNEL_CAPACITY};
use crate::scanner::QrDetector;
use crate::storage;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    widgets::Widget,
};
use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Run the terminal demo screen
pub fn run(backend: Box<dyn CameraBackend>, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let crossterm_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(crossterm_backend)?;

    // Run the app
    let mut runtime = Runtime::new(backend, config)?;
    let result = runtime.run(&mut terminal);
    runtime.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Frame processor session for scanner mode.
///
/// Holds the sender feeding frames into the processor task and the watch
/// receiver for the decoded text. Dropping the sender ends the task.
struct ScannerSession {
    frame_tx: futures::channel::mpsc::Sender<Arc<CameraFrame>>,
    text_rx: watch::Receiver<String>,
}

impl ScannerSession {
    fn start(rt: &tokio::runtime::Runtime) -> Self {
        let processor = FrameProcessor::new(Arc::new(QrDetector::new()));
        let text_rx = processor.subscribe();
        let (frame_tx, frame_rx): (_, FrameReceiver) =
            futures::channel::mpsc::channel(FRAME_CHANNEL_CAPACITY);
        rt.spawn(processor.run(frame_rx));
        info!("Frame processor attached");
        Self { frame_tx, text_rx }
    }

    fn offer(&mut self, frame: Arc<CameraFrame>) {
        // Drop-on-full: the processor wants recency, not completeness
        let _ = self.frame_tx.try_send(frame);
    }

    fn latest_text(&self) -> String {
        self.text_rx.borrow().clone()
    }
}

struct Runtime {
    backend: Box<dyn CameraBackend>,
    model: AppModel,
    rt: tokio::runtime::Runtime,
    msg_tx: UnboundedSender<Message>,
    msg_rx: UnboundedReceiver<Message>,
    frames: Option<FrameReceiver>,
    scanner: Option<ScannerSession>,
    frame_widget: FrameWidget,
}

impl Runtime {
    fn new(
        backend: Box<dyn CameraBackend>,
        config: Config,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (msg_tx, msg_rx) = unbounded();
        let (model, startup) = AppModel::new(config);

        let mut runtime = Self {
            backend,
            model,
            rt,
            msg_tx,
            msg_rx,
            frames: None,
            scanner: None,
            frame_widget: FrameWidget::new(),
        };
        for command in startup {
            runtime.execute(command);
        }
        // Device resolution must not hang the screen forever
        runtime.schedule(DEVICE_RESOLVE_TIMEOUT, Message::DeviceResolveTimeout);
        Ok(runtime)
    }

    /// Send a message after a delay
    fn schedule(&self, delay: Duration, message: Message) {
        let tx = self.msg_tx.clone();
        self.rt.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.unbounded_send(message);
        });
    }

    /// Execute a side effect requested by the state machine
    fn execute(&mut self, command: Command) {
        match command {
            Command::RequestPermission => {
                let status = self.backend.request_permission();
                let _ = self.msg_tx.unbounded_send(Message::PermissionResolved(status));
            }
            Command::ResolveDevices => {
                let devices = self.backend.enumerate_devices();
                let _ = self.msg_tx.unbounded_send(Message::DevicesResolved(devices));
            }
            Command::InitializeDevice(device) => match self.backend.initialize(&device) {
                Ok(()) => {
                    self.frames = self.backend.take_frame_receiver();
                }
                Err(e) => error!(error = %e, device = %device.name, "Camera initialization failed"),
            },
            Command::CapturePhoto { flash } => {
                let result = self.backend.capture_photo(flash);
                let tx = self.msg_tx.clone();
                match result {
                    Ok(frame) => {
                        // Encoding is the slow part; keep it off the loop
                        self.rt.spawn(async move {
                            let path = storage::photo_output_path();
                            let saved = tokio::task::spawn_blocking(move || {
                                storage::save_photo(&frame, &path).map(|_| path)
                            })
                            .await
                            .unwrap_or_else(|e| {
                                Err(crate::errors::CaptureError::SaveFailed(e.to_string()))
                            });
                            let _ = tx.unbounded_send(Message::PhotoSaved(
                                saved.map_err(|e| e.to_string()),
                            ));
                        });
                    }
                    Err(e) => {
                        let _ = tx.unbounded_send(Message::PhotoSaved(Err(e.to_string())));
                    }
                }
            }
            Command::EncodeSnapshot { frame, options } => {
                let tx = self.msg_tx.clone();
                self.rt.spawn(async move {
                    let path = storage::snapshot_output_path();
                    let frame = frame.0;
                    let saved = tokio::task::spawn_blocking(move || {
                        storage::save_snapshot(&frame, &path, &options).map(|_| path)
                    })
                    .await
                    .unwrap_or_else(|e| {
                        Err(crate::errors::CaptureError::SaveFailed(e.to_string()))
                    });
                    let _ = tx.unbounded_send(Message::SnapshotSaved(
                        saved.map_err(|e| e.to_string()),
                    ));
                });
            }
            Command::StartRecording { path, flash } => {
                match self.backend.start_recording(path.clone(), flash) {
                    Ok(()) => {
                        let _ = self.msg_tx.unbounded_send(Message::RecordingStarted(path));
                    }
                    Err(e) => {
                        let _ = self
                            .msg_tx
                            .unbounded_send(Message::RecordingStopped(Err(e.to_string())));
                    }
                }
            }
            Command::StopRecording => {
                if !self.backend.is_recording() {
                    // Stopping with nothing active is a quiet no-op
                    debug!("Stop ignored, no active recording");
                    return;
                }
                let result = self.backend.stop_recording().map_err(|e| e.to_string());
                let _ = self.msg_tx.unbounded_send(Message::RecordingStopped(result));
            }
            Command::StartScanner => {
                if self.scanner.is_none() {
                    self.scanner = Some(ScannerSession::start(&self.rt));
                }
            }
            Command::StopScanner => {
                if self.scanner.take().is_some() {
                    info!("Frame processor detached");
                }
            }
        }
    }

    /// Feed a message through the state machine and run its effects
    fn dispatch(&mut self, message: Message) {
        let commands = self.model.update(message);
        for command in commands {
            self.execute(command);
        }
    }

    fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            // Drain preview frames - keep only the latest for display,
            // forward each to the scanner while it is attached
            while let Some(frame) = try_next_frame(&mut self.frames) {
                if let Some(scanner) = &mut self.scanner {
                    scanner.offer(Arc::clone(&frame));
                }
                self.dispatch(Message::CameraFrame(frame));
            }
            self.frame_widget.frame = self.model.current_frame.clone();

            // Drain async task results
            while let Ok(Some(message)) = self.msg_rx.try_next() {
                self.dispatch(message);
            }

            // Draw
            let view = self.model.active_view();
            let status = self.status_line(view);
            let model = &self.model;
            let frame_widget = &self.frame_widget;
            terminal.draw(|f| {
                let area = f.area();

                // Reserve top line for the mode bar, bottom line for status
                let preview_area = Rect {
                    x: area.x,
                    y: area.y + 1,
                    width: area.width,
                    height: area.height.saturating_sub(2),
                };

                let mode_bar = ModeBar { model };
                f.render_widget(mode_bar, Rect { height: 1, ..area });

                match view {
                    PreviewView::Blank => {}
                    PreviewView::Loading => {
                        render_centered(f.buffer_mut(), preview_area, "Resolving camera...");
                    }
                    _ => f.render_widget(frame_widget, preview_area),
                }

                if model.picker_open {
                    let picker = ModePicker { model };
                    f.render_widget(picker, preview_area);
                }

                let status_area = Rect {
                    x: area.x,
                    y: area.height.saturating_sub(1),
                    width: area.width,
                    height: 1,
                };
                f.render_widget(StatusBar { message: &status }, status_area);
            })?;

            // Handle input with timeout for frame updates
            if event::poll(Duration::from_millis(16))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    break;
                }
                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char('m') | KeyCode::Tab => self.dispatch(Message::TogglePicker),
                    KeyCode::Esc => self.dispatch(Message::ClosePicker),
                    KeyCode::Up if self.model.picker_open => {
                        let index = self.model.picker_index.saturating_sub(1);
                        self.dispatch(Message::PickerHighlight(index));
                    }
                    KeyCode::Down if self.model.picker_open => {
                        let index =
                            (self.model.picker_index + 1).min(DemoMode::ALL.len() - 1);
                        self.dispatch(Message::PickerHighlight(index));
                    }
                    KeyCode::Enter if self.model.picker_open => {
                        let mode = DemoMode::ALL[self.model.picker_index];
                        self.dispatch(Message::SelectMode(mode));
                    }
                    KeyCode::Char(' ') | KeyCode::Char('p') => match self.model.mode {
                        DemoMode::TakePhoto => self.dispatch(Message::TakePhoto),
                        DemoMode::TakeSnapshot => self.dispatch(Message::TakeSnapshot),
                        DemoMode::RecordVideo => self.dispatch(Message::ToggleRecording),
                        DemoMode::CodeScanner => {}
                    },
                    KeyCode::Char('r') => self.dispatch(Message::ToggleRecording),
                    _ => {}
                }
            }
        }

        Ok(())
    }

    fn status_line(&self, view: PreviewView) -> String {
        if self.model.picker_open {
            return "Up/Down select mode | Enter confirm | Esc cancel".to_string();
        }
        match view {
            PreviewView::Blank => match self.model.permission {
                // Denied keeps the body blank; the status only covers the
                // no-device case
                crate::app::state::PermissionState::Denied => String::new(),
                _ => "No camera available".to_string(),
            },
            PreviewView::Loading => "Resolving camera...".to_string(),
            PreviewView::Scanner => {
                let text = self
                    .scanner
                    .as_ref()
                    .map(|s| s.latest_text())
                    .unwrap_or_default();
                if text.is_empty() {
                    "Point the camera at a QR code".to_string()
                } else {
                    format!("Scanned: {}", text)
                }
            }
            PreviewView::Video => {
                if self.model.recording.is_recording() {
                    format!(
                        "REC {:02}:{:02} | 'r' stop | 'm' mode | 'q' quit",
                        self.model.recording.elapsed_secs() / 60,
                        self.model.recording.elapsed_secs() % 60
                    )
                } else if let Some(path) = &self.model.media.video_path {
                    format!("Saved: {}", path.display())
                } else {
                    "'r' record | 'm' mode | 'q' quit".to_string()
                }
            }
            PreviewView::Photo => {
                if let Some(path) = &self.model.media.photo_path {
                    format!("Saved: {}", path.display())
                } else {
                    "'p' photo | 'm' mode | 'q' quit".to_string()
                }
            }
            PreviewView::Snapshot => {
                if let Some(path) = &self.model.media.snapshot_path {
                    format!("Saved: {}", path.display())
                } else {
                    "'p' snapshot | 'm' mode | 'q' quit".to_string()
                }
            }
        }
    }

    fn shutdown(&mut self) {
        self.scanner = None;
        if let Err(e) = self.backend.shutdown() {
            error!(error = %e, "Backend shutdown failed");
        }
    }
}

/// Non-blocking receive of the next preview frame
fn try_next_frame(frames: &mut Option<FrameReceiver>) -> Option<Arc<CameraFrame>> {
    frames.as_mut()?.try_next().ok().flatten()
}

fn render_centered(buf: &mut Buffer, area: Rect, msg: &str) {
    let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
    let y = area.y + area.height / 2;
    if y < area.y + area.height && x < area.x + area.width {
        buf.set_string(x, y, msg, ratatui::style::Style::default());
    }
}

/// Top bar showing the current mode
struct ModeBar<'a> {
    model: &'a AppModel,
}

impl Widget for ModeBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }
        let label = format!(" Mode: {} ('m' to change)", self.model.mode);
        buf.set_string(
            area.x,
            area.y,
            &label,
            ratatui::style::Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray),
        );
    }
}

/// Dropdown overlay listing the demo modes
struct ModePicker<'a> {
    model: &'a AppModel,
}

impl Widget for ModePicker<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = 24u16.min(area.width);
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + 1;

        for (i, mode) in DemoMode::ALL.iter().enumerate() {
            let row = y + i as u16;
            if row >= area.y + area.height {
                break;
            }
            let selected = i == self.model.picker_index;
            let style = if selected {
                ratatui::style::Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
            } else {
                ratatui::style::Style::default()
                    .fg(Color::White)
                    .bg(Color::DarkGray)
            };
            let marker = if *mode == self.model.mode { '*' } else { ' ' };
            let label = format!(" {} {:<20}", marker, mode.label());
            buf.set_string(x, row, &label[..label.len().min(width as usize)], style);
        }
    }
}

/// Widget that renders a camera frame using half-block characters
struct FrameWidget {
    frame: Option<Arc<CameraFrame>>,
}

impl FrameWidget {
    fn new() -> Self {
        Self { frame: None }
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = &self.frame else {
            render_centered(buf, area, "Waiting for camera...");
            return;
        };

        if area.width == 0 || area.height == 0 || frame.width == 0 || frame.height == 0 {
            return;
        }

        // Each terminal cell displays 2 vertical pixels using half-blocks
        let frame_aspect = frame.width as f64 / frame.height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };
        if display_width == 0 || display_height == 0 {
            return;
        }

        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width as f64 / display_width as f64;
        let y_scale = frame.height as f64 / (display_height * 2) as f64;

        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;
                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let (tr, tg, tb) = frame.sample_rgb(src_x, src_y_top);
                let (br, bg, bb) = frame.sample_rgb(src_x, src_y_bottom);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(Color::Rgb(tr, tg, tb));
                    cell.set_bg(Color::Rgb(br, bg, bb));
                }
            }
        }
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        // Decoded QR text can be arbitrary UTF-8; truncate on characters,
        // not bytes
        let text: String = self.message.chars().take(area.width as usize).collect();

        buf.set_string(
            area.x,
            area.y,
            &text,
            ratatui::style::Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;

    #[test]
    fn status_bar_truncates_multibyte_text_on_char_boundary() {
        // Width cuts through the accented run; must not panic
        let area = Rect::new(0, 0, 12, 1);
        let mut buf = Buffer::empty(area);
        StatusBar {
            message: "Scanned: ééé est arrivé",
        }
        .render(area, &mut buf);

        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), "S");
        assert_eq!(buf.cell((9, 0)).unwrap().symbol(), "é");
    }

    #[test]
    fn status_bar_keeps_short_messages_intact() {
        let area = Rect::new(0, 0, 40, 1);
        let mut buf = Buffer::empty(area);
        StatusBar { message: "REC 00:07" }.render(area, &mut buf);

        let row: String = (0..9)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect();
        assert_eq!(row, "REC 00:07");
    }
}
