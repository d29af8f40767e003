use crate::core::ProcessingStatus;

use super::form::{JobForm, JobParams};

pub const READY: &str = "Ready";

/// Modal shown when a job reaches a terminal state.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::Success(_) => "Success",
            Notice::Error(_) => "Error",
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Notice::Success(text) | Notice::Error(text) => text,
        }
    }
}

/// Starts a validated job somewhere off the UI thread.
pub trait JobLauncher {
    fn launch(&mut self, params: JobParams);
}

/// Presentation state, driven only by status snapshots and the form.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellState {
    pub running: bool,
    pub progress: f32,
    pub message: String,
    /// Validation problem shown next to the start button.
    pub inline_error: Option<String>,
    /// Pending modal, cleared when the user dismisses it.
    pub notice: Option<Notice>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            running: false,
            progress: 0.0,
            message: READY.to_string(),
            inline_error: None,
            notice: None,
        }
    }
}

impl ShellState {
    pub fn can_start(&self) -> bool {
        !self.running
    }

    /// Fold one snapshot into the display. Returns the notice raised by a
    /// terminal snapshot, if any.
    pub fn apply(&mut self, status: &ProcessingStatus) -> Option<Notice> {
        if status.is_processing {
            self.running = true;
            self.progress = status.progress;
            self.message = status.status_message.clone();
            return None;
        }

        self.running = false;
        let notice = if status.is_success() {
            Notice::Success("Video processing completed successfully!".to_string())
        } else if let Some(err) = &status.error_message {
            Notice::Error(format!("Error processing video: {}", err))
        } else {
            return None;
        };

        self.reset_display();
        self.notice = Some(notice.clone());
        Some(notice)
    }

    /// Validate the form and hand the job to `launcher`.
    ///
    /// Nothing is launched when validation fails; the reason is kept in
    /// `inline_error` instead.
    pub fn submit(&mut self, form: &JobForm, launcher: &mut impl JobLauncher) -> bool {
        if !self.can_start() {
            return false;
        }
        match form.validate() {
            Ok(params) => {
                self.inline_error = None;
                launcher.launch(params);
                true
            }
            Err(e) => {
                self.inline_error = Some(e.to_string());
                false
            }
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    fn reset_display(&mut self) {
        self.progress = 0.0;
        self.message = READY.to_string();
    }
}
