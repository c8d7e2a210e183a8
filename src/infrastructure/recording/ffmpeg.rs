//! FFmpeg-based segment recorder adapter

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::application::ports::{
    ActiveRecording, CaptureDevice, EventSender, OutputTarget, Recorder, RecorderEvent,
    RecorderEventKind, RecordingError, RecordingId, RecordingStats, SegmentHandle,
};
use crate::domain::recording::Quality;

/// How often the output size is sampled and reported
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_millis(500);

/// Device and quality the recorder was bound to
#[derive(Debug, Clone)]
struct Binding {
    device: CaptureDevice,
    quality: Quality,
}

/// The ffmpeg process recording the active segment
struct RunningSegment {
    id: RecordingId,
    pid: Option<u32>,
    events: EventSender,
    paused: Arc<AtomicBool>,
    stop_requested: Arc<AtomicBool>,
}

/// FFmpeg recorder writing one fragmented MP4 per segment
pub struct FfmpegRecorder {
    binding: Mutex<Option<Binding>>,
    running: Arc<Mutex<Option<RunningSegment>>>,
    next_id: AtomicU64,
    status_interval: Duration,
}

impl FfmpegRecorder {
    /// Create a new FFmpeg recorder
    pub fn new() -> Self {
        Self::with_status_interval(DEFAULT_STATUS_INTERVAL)
    }

    pub fn with_status_interval(status_interval: Duration) -> Self {
        Self {
            binding: Mutex::new(None),
            running: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(0),
            status_interval,
        }
    }

    /// Build FFmpeg args for one segment
    fn build_ffmpeg_args(
        device: &CaptureDevice,
        quality: Quality,
        audio: bool,
        output_path: &Path,
    ) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-nostdin".to_string(),
            "-f".to_string(),
            device.input_format.clone(),
            "-video_size".to_string(),
            quality.video_size(),
            "-i".to_string(),
            device.path.clone(),
        ];

        if audio {
            args.extend([
                "-f".to_string(),
                "pulse".to_string(),
                "-i".to_string(),
                "default".to_string(),
            ]);
        }

        // H.264 in fragmented MP4 so the file stays playable if ffmpeg dies
        args.extend([
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "veryfast".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
        ]);

        if audio {
            args.extend(["-c:a".to_string(), "aac".to_string()]);
        } else {
            args.push("-an".to_string());
        }

        args.extend([
            "-movflags".to_string(),
            "+frag_keyframe+empty_moov".to_string(),
            "-y".to_string(),
            output_path.to_string_lossy().to_string(),
        ]);

        args
    }

    /// Spawn FFmpeg process
    fn spawn_ffmpeg(args: Vec<String>) -> Result<Child, RecordingError> {
        Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RecordingError::FfmpegNotFound
                } else {
                    RecordingError::StartFailed(e.to_string())
                }
            })
    }

    /// Check that ffmpeg can be executed at all
    async fn probe_ffmpeg() -> Result<(), RecordingError> {
        let status = Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RecordingError::FfmpegNotFound
                } else {
                    RecordingError::BindFailed(e.to_string())
                }
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(RecordingError::BindFailed(format!(
                "ffmpeg -version exited with {}",
                status
            )))
        }
    }

    /// Send signal to FFmpeg process
    fn send_signal(pid: Option<u32>, sig: Signal) -> Result<(), RecordingError> {
        if let Some(id) = pid {
            signal::kill(Pid::from_raw(id as i32), sig)
                .map_err(|e| RecordingError::CommandFailed(format!("Signal failed: {}", e)))?;
        }
        Ok(())
    }

    /// Keep the last stderr line; reading also keeps the pipe from filling up
    fn drain_stderr(stderr: Option<ChildStderr>) -> JoinHandle<Option<String>> {
        tokio::spawn(async move {
            let stderr = stderr?;
            let mut lines = BufReader::new(stderr).lines();
            let mut last = None;
            while let Ok(Some(line)) = lines.next_line().await {
                if !line.trim().is_empty() {
                    last = Some(line);
                }
            }
            last
        })
    }

    async fn current_binding(&self) -> Result<Binding, RecordingError> {
        self.binding
            .lock()
            .await
            .clone()
            .ok_or(RecordingError::NotBound)
    }

    /// Run a command against the running segment if it is `recording`
    async fn with_running<F>(&self, recording: &ActiveRecording, f: F) -> Result<(), RecordingError>
    where
        F: FnOnce(&RunningSegment) -> Result<(), RecordingError>,
    {
        let guard = self.running.lock().await;
        match guard.as_ref() {
            Some(running) if running.id == recording.id => f(running),
            _ => Err(RecordingError::UnknownRecording(recording.id)),
        }
    }
}

impl Default for FfmpegRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Size of the output file so far; zero until ffmpeg created it
async fn file_size(path: &Path) -> u64 {
    fs::metadata(path).await.map(|m| m.len()).unwrap_or(0)
}

/// Watches one ffmpeg process: reports progress and the final result.
struct Supervisor {
    id: RecordingId,
    output: PathBuf,
    events: EventSender,
    paused: Arc<AtomicBool>,
    stop_requested: Arc<AtomicBool>,
    running: Arc<Mutex<Option<RunningSegment>>>,
    status_interval: Duration,
}

impl Supervisor {
    async fn run(self, mut child: Child) {
        let stderr = FfmpegRecorder::drain_stderr(child.stderr.take());
        self.send(RecorderEventKind::Start);

        let mut ticker = interval(self.status_interval);
        let mut recorded = Duration::ZERO;
        let mut last = Instant::now();

        let exit = loop {
            tokio::select! {
                status = child.wait() => break status,
                _ = ticker.tick() => {
                    let now = Instant::now();
                    if !self.paused.load(Ordering::SeqCst) {
                        recorded += now - last;
                    }
                    last = now;

                    let stats = RecordingStats {
                        bytes_recorded: file_size(&self.output).await,
                        duration: recorded,
                    };
                    self.send(RecorderEventKind::Status(stats));
                }
            }
        };

        if !self.paused.load(Ordering::SeqCst) {
            recorded += last.elapsed();
        }
        let last_line = stderr.await.ok().flatten();

        {
            let mut guard = self.running.lock().await;
            if guard.as_ref().is_some_and(|r| r.id == self.id) {
                *guard = None;
            }
        }

        let stats = RecordingStats {
            bytes_recorded: file_size(&self.output).await,
            duration: recorded,
        };
        let error = self.exit_error(exit, last_line, stats.bytes_recorded);
        match error {
            Some(ref e) => warn!(recording = %self.id, error = %e, "ffmpeg segment failed"),
            None => info!(recording = %self.id, bytes = stats.bytes_recorded, "segment finalized"),
        }

        self.send(RecorderEventKind::Finalize {
            stats,
            output: self.output.clone(),
            error,
        });
    }

    /// An unrequested exit is an error; so is a requested one without output.
    /// ffmpeg exits non-zero after SIGINT, which is not a failure.
    fn exit_error(
        &self,
        exit: std::io::Result<ExitStatus>,
        last_line: Option<String>,
        bytes: u64,
    ) -> Option<String> {
        let status = match exit {
            Ok(status) => status,
            Err(e) => return Some(format!("FFmpeg failed: {}", e)),
        };

        if !self.stop_requested.load(Ordering::SeqCst) {
            return Some(format!(
                "FFmpeg exited unexpectedly ({}): {}",
                status,
                last_line.as_deref().unwrap_or("unknown error")
            ));
        }
        if bytes == 0 {
            return Some("Recording file is empty".to_string());
        }
        None
    }

    fn send(&self, kind: RecorderEventKind) {
        if self.events.send(RecorderEvent::new(self.id, kind)).is_err() {
            debug!(recording = %self.id, "event receiver gone");
        }
    }
}

#[async_trait]
impl Recorder for FfmpegRecorder {
    async fn bind(&self, device: &CaptureDevice, quality: Quality) -> Result<(), RecordingError> {
        if device.path.starts_with("/dev/") && !Path::new(&device.path).exists() {
            return Err(RecordingError::BindFailed(format!(
                "{} does not exist",
                device.path
            )));
        }
        Self::probe_ffmpeg().await?;

        *self.binding.lock().await = Some(Binding {
            device: device.clone(),
            quality,
        });
        Ok(())
    }

    async fn prepare_segment(&self, target: &OutputTarget) -> Result<SegmentHandle, RecordingError> {
        self.current_binding().await?;

        if let Some(parent) = target.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| RecordingError::PrepareFailed(e.to_string()))?;
        }

        Ok(SegmentHandle {
            path: target.path.clone(),
        })
    }

    async fn start(
        &self,
        handle: SegmentHandle,
        audio: bool,
        events: EventSender,
    ) -> Result<ActiveRecording, RecordingError> {
        let binding = self.current_binding().await?;

        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(RecordingError::StartFailed(
                "Recording already in progress".to_string(),
            ));
        }

        let args = Self::build_ffmpeg_args(&binding.device, binding.quality, audio, &handle.path);
        debug!(args = ?args, "spawning ffmpeg");
        let child = Self::spawn_ffmpeg(args)?;

        let id = RecordingId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let paused = Arc::new(AtomicBool::new(false));
        let stop_requested = Arc::new(AtomicBool::new(false));

        *running = Some(RunningSegment {
            id,
            pid: child.id(),
            events: events.clone(),
            paused: Arc::clone(&paused),
            stop_requested: Arc::clone(&stop_requested),
        });
        drop(running);

        let supervisor = Supervisor {
            id,
            output: handle.path.clone(),
            events,
            paused,
            stop_requested,
            running: Arc::clone(&self.running),
            status_interval: self.status_interval,
        };
        tokio::spawn(supervisor.run(child));

        Ok(ActiveRecording {
            id,
            path: handle.path,
        })
    }

    async fn pause(&self, recording: &ActiveRecording) -> Result<(), RecordingError> {
        self.with_running(recording, |running| {
            Self::send_signal(running.pid, Signal::SIGSTOP)?;
            running.paused.store(true, Ordering::SeqCst);
            let _ = running
                .events
                .send(RecorderEvent::new(running.id, RecorderEventKind::Pause));
            Ok(())
        })
        .await
    }

    async fn resume(&self, recording: &ActiveRecording) -> Result<(), RecordingError> {
        self.with_running(recording, |running| {
            Self::send_signal(running.pid, Signal::SIGCONT)?;
            running.paused.store(false, Ordering::SeqCst);
            let _ = running
                .events
                .send(RecorderEvent::new(running.id, RecorderEventKind::Resume));
            Ok(())
        })
        .await
    }

    async fn stop(&self, recording: &ActiveRecording) -> Result<(), RecordingError> {
        self.with_running(recording, |running| {
            running.stop_requested.store(true, Ordering::SeqCst);
            // SIGINT lets ffmpeg finish the file; a stopped process needs SIGCONT to see it
            Self::send_signal(running.pid, Signal::SIGINT)?;
            if running.paused.load(Ordering::SeqCst) {
                Self::send_signal(running.pid, Signal::SIGCONT)?;
            }
            Ok(())
        })
        .await
    }
}
