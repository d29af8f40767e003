use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::FFUtils;

/// Parameters of one amplification job, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct JobParams {
    pub input: PathBuf,
    pub output: PathBuf,
    pub factor: f64,
}

/// Why the form cannot start a job.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingPaths,
    InvalidFactor(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingPaths => write!(f, "Please select input and output files"),
            ValidationError::InvalidFactor(reason) => {
                write!(f, "Invalid amplification factor: {}", reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Raw text the user typed into the window.
#[derive(Debug, Clone, PartialEq)]
pub struct JobForm {
    pub input_path: String,
    pub output_path: String,
    pub factor: String,
}

impl JobForm {
    pub fn new(default_factor: f64) -> Self {
        Self {
            input_path: String::new(),
            output_path: String::new(),
            factor: default_factor.to_string(),
        }
    }

    /// Gate in front of the processor: both paths present, factor a
    /// positive finite number.
    pub fn validate(&self) -> Result<JobParams, ValidationError> {
        let input = self.input_path.trim();
        let output = self.output_path.trim();
        if input.is_empty() || output.is_empty() {
            return Err(ValidationError::MissingPaths);
        }

        let factor = parse_factor(&self.factor)?;

        Ok(JobParams {
            input: PathBuf::from(input),
            output: PathBuf::from(output),
            factor,
        })
    }

    /// Set the input and always regenerate the suggested output path.
    pub fn select_input(&mut self, path: &Path, suffix: &str) {
        self.input_path = path.to_string_lossy().to_string();
        if let Some(dst) = FFUtils::get_dst(path, suffix) {
            self.output_path = dst.to_string_lossy().to_string();
        }
    }
}

fn parse_factor(text: &str) -> Result<f64, ValidationError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidFactor(format!("'{}' is not a number", text.trim())))?;
    if !value.is_finite() {
        return Err(ValidationError::InvalidFactor(
            "Amplification factor must be a finite number".to_string(),
        ));
    }
    if value <= 0.0 {
        return Err(ValidationError::InvalidFactor(
            "Amplification factor must be positive".to_string(),
        ));
    }
    Ok(value)
}
