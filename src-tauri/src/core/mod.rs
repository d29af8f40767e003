pub mod config;
pub mod error;
pub mod ffutils;
pub mod gain;
pub mod processor;
pub mod scratch;
pub mod status;

pub use config::AppConfig;
pub use error::ProcessError;
pub use ffutils::FFUtils;
pub use processor::Processor;
pub use status::ProcessingStatus;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// One stream as reported by the prober.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub index: u32,
    /// "video", "audio", "subtitle", ...
    pub codec_type: String,
    pub codec_name: Option<String>,
}

/// What we need to know about an input container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    pub duration: Option<f64>,
    pub streams: Vec<StreamInfo>,
}

impl MediaInfo {
    pub fn audio_stream(&self) -> Option<&StreamInfo> {
        self.streams.iter().find(|s| s.codec_type == "audio")
    }
}

/// Final re-mux: video from the original container, audio from the
/// amplified WAV, encoded with `audio_codec`.
#[derive(Debug, Clone, PartialEq)]
pub struct MuxJob {
    pub video_source: PathBuf,
    pub audio_source: PathBuf,
    pub output: PathBuf,
    pub audio_codec: String,
}

impl MuxJob {
    pub fn ffmpeg_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-i".into()];
        args.push(self.video_source.clone().into());
        args.push("-i".into());
        args.push(self.audio_source.clone().into());
        args.extend(
            ["-map", "0:v?", "-map", "1:a:0", "-c:v", "copy", "-c:a"]
                .iter()
                .map(OsString::from),
        );
        args.push(self.audio_codec.clone().into());
        args.extend(["-loglevel", "error"].iter().map(OsString::from));
        args.push(self.output.clone().into());
        args
    }
}

/// The external media tooling the pipeline delegates to.
///
/// Gain itself is applied in-process; the backend only probes, decodes
/// and muxes.
pub trait MediaBackend: Send + Sync {
    /// Inspect a container's streams.
    fn probe(&self, input: &Path) -> error::Result<MediaInfo>;

    /// Decode the first audio stream of `input` to a PCM WAV at `wav_out`.
    fn extract_audio(&self, input: &Path, wav_out: &Path) -> error::Result<()>;

    /// Write the final container described by `job`.
    fn mux(&self, job: &MuxJob) -> error::Result<()>;
}
