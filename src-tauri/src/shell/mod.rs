//! UI-independent half of the desktop shell: form validation and the
//! snapshot-driven display state. `desktop_app` renders it with egui.

pub mod form;
pub mod state;

pub use form::{JobForm, JobParams, ValidationError};
pub use state::{JobLauncher, Notice, ShellState};
