use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, error, info, info_span};
use uuid::Uuid;

use super::error::{ProcessError, Result};
use super::gain::{gain_db_for_factor, AudioClip};
use super::scratch::ScratchDir;
use super::{AppConfig, FFUtils, MediaBackend, MuxJob, ProcessingStatus};

const DECODED_AUDIO: &str = "temp_audio.wav";
const AMPLIFIED_AUDIO: &str = "amplified_audio.wav";

/// Runs the amplify pipeline, one job at a time.
///
/// Share it behind an `Arc` between the UI thread (which subscribes) and
/// the worker thread (which calls [`Processor::amplify`]).
pub struct Processor {
    backend: Box<dyn MediaBackend>,
    config: AppConfig,
    in_flight: AtomicBool,
    observer: Mutex<Option<Sender<ProcessingStatus>>>,
    latest: Mutex<ProcessingStatus>,
}

impl Processor {
    /// Processor backed by the ffmpeg tools named in `config`.
    pub fn new(config: AppConfig) -> Self {
        let backend = FFUtils::new(config.ffmpeg_path.clone(), config.ffprobe_path.clone());
        Self::with_backend(config, backend)
    }

    pub fn with_backend(config: AppConfig, backend: impl MediaBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            config,
            in_flight: AtomicBool::new(false),
            observer: Mutex::new(None),
            latest: Mutex::new(ProcessingStatus::idle()),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Register the single status observer, replacing any previous one.
    ///
    /// Only snapshots published after this call are delivered.
    pub fn subscribe(&self) -> Receiver<ProcessingStatus> {
        let (tx, rx) = channel();
        *lock(&self.observer) = Some(tx);
        rx
    }

    /// Latest published snapshot.
    pub fn status(&self) -> ProcessingStatus {
        lock(&self.latest).clone()
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Amplify the audio of `input` by `10 * factor` dB and write the result
    /// to `output`.
    ///
    /// Blocks until the job finishes. Returns `false` without publishing
    /// anything if another job is already running, and `false` after a
    /// terminal error snapshot if the pipeline fails.
    pub fn amplify(&self, input: &Path, output: &Path, factor: f64) -> bool {
        let Some(guard) = InFlight::acquire(&self.in_flight) else {
            debug!(input = %input.display(), "job rejected, another one is running");
            return false;
        };

        let job_id = Uuid::new_v4();
        let span = info_span!("job", %job_id);
        let _enter = span.enter();
        info!(
            input = %input.display(),
            output = %output.display(),
            factor,
            "starting amplification"
        );

        self.publish(ProcessingStatus::step(0.0, ProcessingStatus::STARTING));

        let outcome = ScratchDir::create(&self.config.scratch_dir)
            .map_err(ProcessError::from)
            .and_then(|mut scratch| self.run_pipeline(&mut scratch, input, output, factor));
        // Scratch is already removed here. Release before the terminal snapshot.
        drop(guard);

        match outcome {
            Ok(()) => {
                info!(output = %output.display(), "amplification complete");
                self.publish(ProcessingStatus::complete());
                true
            }
            Err(e) => {
                error!(error = %e, "amplification failed");
                self.publish(ProcessingStatus::failed(e.to_string()));
                false
            }
        }
    }

    fn run_pipeline(
        &self,
        scratch: &mut ScratchDir,
        input: &Path,
        output: &Path,
        factor: f64,
    ) -> Result<()> {
        self.publish(ProcessingStatus::step(10.0, "Loading video file..."));
        let media = self.backend.probe(input)?;
        debug!(streams = media.streams.len(), duration = ?media.duration, "probed input");

        self.publish(ProcessingStatus::step(20.0, "Extracting audio..."));
        let audio = media.audio_stream().ok_or(ProcessError::NoAudioStream)?;
        debug!(index = audio.index, codec = ?audio.codec_name, "selected audio stream");

        self.publish(ProcessingStatus::step(30.0, "Processing audio..."));
        let decoded = scratch.file(DECODED_AUDIO);
        self.backend.extract_audio(input, &decoded)?;

        self.publish(ProcessingStatus::step(50.0, "Amplifying audio..."));
        let mut clip = AudioClip::read_wav(&decoded)?;
        let gain_db = gain_db_for_factor(factor);
        clip.apply_gain_db(gain_db);
        debug!(
            gain_db,
            seconds = clip.duration_secs(),
            peak_dbfs = clip.peak_dbfs(),
            "gain applied"
        );

        self.publish(ProcessingStatus::step(70.0, "Exporting amplified audio..."));
        let amplified = scratch.file(AMPLIFIED_AUDIO);
        clip.write_wav(&amplified)?;

        self.publish(ProcessingStatus::step(80.0, "Combining audio with video..."));
        let job = MuxJob {
            video_source: input.to_path_buf(),
            audio_source: amplified,
            output: output.to_path_buf(),
            audio_codec: self.config.audio_codec.clone(),
        };

        self.publish(ProcessingStatus::step(90.0, "Saving final video..."));
        if let Err(e) = self.backend.mux(&job) {
            // ffmpeg may have started writing before it failed.
            if fs::remove_file(output).is_ok() {
                debug!(output = %output.display(), "removed partial output");
            }
            return Err(e);
        }

        Ok(())
    }

    fn publish(&self, status: ProcessingStatus) {
        debug!(progress = status.progress, message = %status.status_message, "status");
        *lock(&self.latest) = status.clone();
        if let Some(tx) = lock(&self.observer).as_ref() {
            let _ = tx.send(status);
        }
    }
}

/// Holds the single-job flag; clears it on drop, panics included.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
