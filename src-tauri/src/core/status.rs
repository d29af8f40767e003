/// One immutable view of where the processor is.
///
/// A new snapshot is built for every state change; nothing mutates a
/// snapshot after it has been published.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingStatus {
    pub is_processing: bool,
    /// Percentage in `0.0..=100.0`.
    pub progress: f32,
    pub status_message: String,
    /// Present only on the terminal snapshot of a failed job.
    pub error_message: Option<String>,
}

impl ProcessingStatus {
    pub const STARTING: &'static str = "Starting processing...";
    pub const COMPLETE: &'static str = "Processing complete!";
    pub const FAILED: &'static str = "Error occurred";

    /// State before any job has run.
    pub fn idle() -> Self {
        Self {
            is_processing: false,
            progress: 0.0,
            status_message: String::new(),
            error_message: None,
        }
    }

    /// Intermediate step of a running job.
    pub fn step(progress: f32, message: impl Into<String>) -> Self {
        Self {
            is_processing: true,
            progress,
            status_message: message.into(),
            error_message: None,
        }
    }

    pub fn complete() -> Self {
        Self {
            is_processing: false,
            progress: 100.0,
            status_message: Self::COMPLETE.to_string(),
            error_message: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            is_processing: false,
            progress: 0.0,
            status_message: Self::FAILED.to_string(),
            error_message: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        !self.is_processing && self.progress >= 100.0
    }

    pub fn is_failure(&self) -> bool {
        !self.is_processing && self.error_message.is_some()
    }
}

impl Default for ProcessingStatus {
    fn default() -> Self {
        Self::idle()
    }
}
