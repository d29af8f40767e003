use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use tracing::{debug, warn};

use super::error::{ProcessError, Result};
use super::{MediaBackend, MediaInfo, MuxJob, StreamInfo};

/// Drives the `ffmpeg` / `ffprobe` command line tools.
#[derive(Debug, Clone)]
pub struct FFUtils {
    ffmpeg: String,
    ffprobe: String,
}

impl Default for FFUtils {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl FFUtils {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Run an FFmpeg command, surfacing stderr when it fails.
    pub fn run(&self, args: &[OsString]) -> Result<()> {
        debug!(tool = %self.ffmpeg, ?args, "running");
        let output = Command::new(&self.ffmpeg)
            .args(args)
            .output()
            .map_err(|source| ProcessError::ToolSpawn {
                tool: self.ffmpeg.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(tool = %self.ffmpeg, status = %output.status, %stderr, "command failed");
            Err(ProcessError::ToolFailed {
                tool: self.ffmpeg.clone(),
                status: output.status.to_string(),
                stderr,
            })
        }
    }

    /// First line of `ffmpeg -version`, or an error if the tool is missing.
    pub fn version(&self) -> Result<String> {
        let output = Command::new(&self.ffmpeg)
            .arg("-version")
            .output()
            .map_err(|source| ProcessError::ToolSpawn {
                tool: self.ffmpeg.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(ProcessError::ToolFailed {
                tool: self.ffmpeg.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().to_string())
    }

    /// Suggested destination next to the source: `<stem><suffix>.<ext>`.
    pub fn get_dst(src: &Path, suffix: &str) -> Option<PathBuf> {
        let stem = src.file_stem()?.to_string_lossy();
        let name = match src.extension() {
            Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
            None => format!("{}{}", stem, suffix),
        };
        Some(src.with_file_name(name))
    }
}

impl MediaBackend for FFUtils {
    fn probe(&self, input: &Path) -> Result<MediaInfo> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error"])
            .args([
                "-show_entries",
                "format=duration:stream=index,codec_type,codec_name",
            ])
            .args(["-of", "json"])
            .arg(input)
            .output()
            .map_err(|source| ProcessError::ToolSpawn {
                tool: self.ffprobe.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProcessError::ToolFailed {
                tool: self.ffprobe.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_probe(input, &output.stdout)
    }

    fn extract_audio(&self, input: &Path, wav_out: &Path) -> Result<()> {
        self.run(&extract_audio_args(input, wav_out))
    }

    fn mux(&self, job: &MuxJob) -> Result<()> {
        self.run(&job.ffmpeg_args())
    }
}

/// Decode the first audio stream to 16-bit PCM WAV.
pub fn extract_audio_args(input: &Path, wav_out: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-i"].iter().map(OsString::from).collect();
    args.push(input.into());
    args.extend(
        ["-map", "0:a:0", "-vn", "-acodec", "pcm_s16le", "-loglevel", "error"]
            .iter()
            .map(OsString::from),
    );
    args.push(wav_out.into());
    args
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Deserialize)]
struct ProbeStream {
    index: u32,
    codec_type: Option<String>,
    codec_name: Option<String>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

fn parse_probe(input: &Path, stdout: &[u8]) -> Result<MediaInfo> {
    let parsed: ProbeOutput = serde_json::from_slice(stdout).map_err(|e| ProcessError::Probe {
        path: input.to_path_buf(),
        message: e.to_string(),
    })?;

    let duration = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.trim().parse::<f64>().ok());

    let streams = parsed
        .streams
        .into_iter()
        .map(|s| StreamInfo {
            index: s.index,
            codec_type: s.codec_type.unwrap_or_default(),
            codec_name: s.codec_name,
        })
        .collect();

    Ok(MediaInfo { duration, streams })
}
