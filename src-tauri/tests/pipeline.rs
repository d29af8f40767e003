use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::TempDir;

use video_amplifier::core::error::{ProcessError, Result};
use video_amplifier::core::gain::AudioClip;
use video_amplifier::core::{
    AppConfig, MediaBackend, MediaInfo, MuxJob, ProcessingStatus, Processor, StreamInfo,
};

/// Stands in for ffmpeg: reports a fixed stream layout, "decodes" a sine
/// tone and "muxes" by copying the amplified WAV to the output path.
struct FakeBackend {
    with_audio: bool,
    amplitude: f32,
    fail_mux: bool,
    gate: Option<Gate>,
}

/// Lets a test hold the pipeline inside the decode step.
struct Gate {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl FakeBackend {
    fn new() -> Self {
        Self {
            with_audio: true,
            amplitude: 0.01,
            fail_mux: false,
            gate: None,
        }
    }
}

impl MediaBackend for FakeBackend {
    fn probe(&self, _input: &Path) -> Result<MediaInfo> {
        let mut streams = vec![StreamInfo {
            index: 0,
            codec_type: "video".into(),
            codec_name: Some("h264".into()),
        }];
        if self.with_audio {
            streams.push(StreamInfo {
                index: 1,
                codec_type: "audio".into(),
                codec_name: Some("aac".into()),
            });
        }
        Ok(MediaInfo {
            duration: Some(0.5),
            streams,
        })
    }

    fn extract_audio(&self, _input: &Path, wav_out: &Path) -> Result<()> {
        if let Some(gate) = &self.gate {
            gate.entered.lock().unwrap().send(()).unwrap();
            gate.release.lock().unwrap().recv().unwrap();
        }
        write_sine(wav_out, self.amplitude);
        Ok(())
    }

    fn mux(&self, job: &MuxJob) -> Result<()> {
        if self.fail_mux {
            std::fs::write(&job.output, b"truncated mp4")?;
            return Err(ProcessError::ToolFailed {
                tool: "ffmpeg".into(),
                status: "exit status: 1".into(),
                stderr: "Conversion failed!".into(),
            });
        }
        assert_eq!(job.audio_codec, "aac");
        std::fs::copy(&job.audio_source, &job.output)?;
        Ok(())
    }
}

fn write_sine(path: &Path, amplitude: f32) {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..4000 {
        let t = i as f32 / 8000.0;
        let v = amplitude * (2.0 * std::f32::consts::PI * 440.0 * t).sin();
        writer.write_sample((v * 32767.0).round() as i16).unwrap();
    }
    writer.finalize().unwrap();
}

struct Fixture {
    dir: TempDir,
    scratch: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("temp_audio_processing");
        Self { dir, scratch }
    }

    fn config(&self) -> AppConfig {
        AppConfig {
            scratch_dir: self.scratch.clone(),
            ..AppConfig::default()
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

fn drain(rx: &Receiver<ProcessingStatus>) -> Vec<ProcessingStatus> {
    rx.try_iter().collect()
}

#[test]
fn successful_job_reports_every_step_in_order() {
    let fx = Fixture::new();
    let processor = Processor::with_backend(fx.config(), FakeBackend::new());
    let rx = processor.subscribe();

    assert!(processor.amplify(&fx.path("in.mp4"), &fx.path("out.mp4"), 2.0));

    let snapshots = drain(&rx);
    let progress: Vec<f32> = snapshots.iter().map(|s| s.progress).collect();
    assert_eq!(progress, vec![0.0, 10.0, 20.0, 30.0, 50.0, 70.0, 80.0, 90.0, 100.0]);
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));

    assert!(snapshots[..snapshots.len() - 1].iter().all(|s| s.is_processing));
    assert!(snapshots.iter().all(|s| s.error_message.is_none()));
    assert_eq!(snapshots[0].status_message, ProcessingStatus::STARTING);

    let last = snapshots.last().unwrap();
    assert!(last.is_success());
    assert_eq!(last.status_message, ProcessingStatus::COMPLETE);
    assert_eq!(processor.status(), *last);
    assert!(!processor.is_processing());
    assert!(fx.path("out.mp4").exists());
}

#[test]
fn missing_audio_stream_fails_and_leaves_nothing_behind() {
    let fx = Fixture::new();
    let backend = FakeBackend {
        with_audio: false,
        ..FakeBackend::new()
    };
    let processor = Processor::with_backend(fx.config(), backend);
    let rx = processor.subscribe();

    assert!(!fx.scratch.exists());
    assert!(!processor.amplify(&fx.path("in.mp4"), &fx.path("out.mp4"), 2.0));

    let snapshots = drain(&rx);
    let progress: Vec<f32> = snapshots.iter().map(|s| s.progress).collect();
    assert_eq!(progress, vec![0.0, 10.0, 20.0, 0.0]);

    let last = snapshots.last().unwrap();
    assert!(last.is_failure());
    assert_eq!(last.status_message, ProcessingStatus::FAILED);
    assert!(last
        .error_message
        .as_deref()
        .unwrap()
        .contains("No audio found"));

    assert!(!fx.scratch.exists());
    assert!(!fx.path("out.mp4").exists());
}

#[test]
fn scratch_area_is_absent_before_and_after_either_outcome() {
    let fx = Fixture::new();

    for fail_mux in [false, true] {
        let backend = FakeBackend {
            fail_mux,
            ..FakeBackend::new()
        };
        let processor = Processor::with_backend(fx.config(), backend);

        assert!(!fx.scratch.exists());
        let ok = processor.amplify(&fx.path("in.mp4"), &fx.path("out.mp4"), 1.0);
        assert_eq!(ok, !fail_mux);
        assert!(!fx.scratch.exists());
    }
}

#[test]
fn mux_failure_surfaces_tool_output() {
    let fx = Fixture::new();
    let backend = FakeBackend {
        fail_mux: true,
        ..FakeBackend::new()
    };
    let processor = Processor::with_backend(fx.config(), backend);
    let rx = processor.subscribe();

    assert!(!processor.amplify(&fx.path("in.mp4"), &fx.path("out.mp4"), 1.0));

    let snapshots = drain(&rx);
    let before_failure: Vec<f32> = snapshots[..snapshots.len() - 1]
        .iter()
        .map(|s| s.progress)
        .collect();
    assert_eq!(before_failure.last(), Some(&90.0));

    let last = snapshots.last().unwrap();
    assert_eq!(last.progress, 0.0);
    assert!(last.error_message.as_deref().unwrap().contains("Conversion failed!"));
    assert!(!fx.path("out.mp4").exists());
}

#[test]
fn existing_scratch_directory_keeps_user_files() {
    let fx = Fixture::new();
    let nested = fx.scratch.join("nested");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::write(nested.join("user_file.txt"), b"keep me").unwrap();

    for with_audio in [true, false] {
        let backend = FakeBackend {
            with_audio,
            ..FakeBackend::new()
        };
        let processor = Processor::with_backend(fx.config(), backend);
        let ok = processor.amplify(&fx.path("in.mp4"), &fx.path("out.mp4"), 1.0);
        assert_eq!(ok, with_audio);

        assert!(nested.join("user_file.txt").exists());
        assert!(!fx.scratch.join("temp_audio.wav").exists());
        assert!(!fx.scratch.join("amplified_audio.wav").exists());
    }
}

#[test]
fn second_start_while_in_flight_is_rejected_silently() {
    let fx = Fixture::new();
    let (entered_tx, entered_rx) = channel();
    let (release_tx, release_rx) = channel();
    let backend = FakeBackend {
        gate: Some(Gate {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        }),
        ..FakeBackend::new()
    };
    let processor = Arc::new(Processor::with_backend(fx.config(), backend));
    let rx = processor.subscribe();

    let worker = {
        let processor = Arc::clone(&processor);
        let input = fx.path("in.mp4");
        let output = fx.path("out.mp4");
        thread::spawn(move || processor.amplify(&input, &output, 2.0))
    };

    entered_rx.recv().unwrap();
    assert!(processor.is_processing());
    let seen = drain(&rx);
    assert_eq!(seen.last().map(|s| s.progress), Some(30.0));
    let status_before = processor.status();

    assert!(!processor.amplify(&fx.path("other.mp4"), &fx.path("other_out.mp4"), 1.0));
    assert!(rx.try_recv().is_err());
    assert_eq!(processor.status(), status_before);

    release_tx.send(()).unwrap();
    assert!(worker.join().unwrap());
    assert!(drain(&rx).last().unwrap().is_success());
    assert!(!fx.path("other_out.mp4").exists());
}

#[test]
fn guard_is_released_before_terminal_snapshot_arrives() {
    let fx = Fixture::new();
    let processor = Arc::new(Processor::with_backend(fx.config(), FakeBackend::new()));
    let rx = processor.subscribe();

    let worker = {
        let processor = Arc::clone(&processor);
        let input = fx.path("in.mp4");
        let output = fx.path("out.mp4");
        thread::spawn(move || processor.amplify(&input, &output, 1.0))
    };

    loop {
        let status = rx.recv().unwrap();
        if !status.is_processing {
            assert!(!processor.is_processing());
            break;
        }
    }
    assert!(worker.join().unwrap());
}

#[test]
fn only_the_latest_subscriber_receives_snapshots() {
    let fx = Fixture::new();
    let processor = Processor::with_backend(fx.config(), FakeBackend::new());

    let first = processor.subscribe();
    let second = processor.subscribe();
    assert!(processor.amplify(&fx.path("in.mp4"), &fx.path("out.mp4"), 1.0));

    assert!(drain(&first).is_empty());
    assert_eq!(drain(&second).len(), 9);

    let late = processor.subscribe();
    assert!(drain(&late).is_empty());
    assert!(processor.status().is_success());
}

#[test]
fn doubling_the_factor_adds_ten_decibels() {
    let fx = Fixture::new();
    let processor = Processor::with_backend(fx.config(), FakeBackend::new());

    assert!(processor.amplify(&fx.path("in.mp4"), &fx.path("one.wav"), 1.0));
    assert!(processor.amplify(&fx.path("in.mp4"), &fx.path("two.wav"), 2.0));

    let one = AudioClip::read_wav(&fx.path("one.wav")).unwrap().peak_dbfs();
    let two = AudioClip::read_wav(&fx.path("two.wav")).unwrap().peak_dbfs();
    let source = 20.0 * 0.01f64.log10();

    assert!((one - source - 10.0).abs() < 0.1, "factor 1 peak {one}");
    assert!((two - one - 10.0).abs() < 0.1, "difference {}", two - one);
}
