//! Segmented recording controller
//!
//! Owns one recording session at a time and sequences user commands against
//! asynchronous recorder events. On every status tick the rollover policy
//! decides whether to evict old segments, stop the session, or cut a new
//! segment; on every finalize the session decides whether to continue.

use std::future::Future;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::recording::{
    CaptureState, ControllerConfig, FinalizeOutcome, InvalidStateTransition, Quality,
    RecordingSession, Segment, SegmentId, SegmentLedger, StartOutcome, StatusLabel, StatusReport,
    StopOutcome, StorageAction, MIN_FREE_CEILING,
};
use crate::domain::storage::VolumeRef;

use super::ports::{
    ActiveRecording, CaptureDevice, DeviceError, EventSender, OutputError, OutputTargetProvider,
    Recorder, RecorderEvent, RecorderEventKind, RecordingError, RecordingStats, StatusSink,
    VolumeProbe,
};
use super::storage_monitor::StorageMonitor;

/// Errors from controller operations
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),

    #[error(transparent)]
    Recording(#[from] RecordingError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("Device enumeration did not complete: {0}")]
    EnumerationAborted(String),

    #[error("No active recording")]
    NoActiveRecording,
}

/// The recording currently fed by the recorder, and its ledger entry
#[derive(Debug, Clone)]
struct ActiveSegment {
    recording: ActiveRecording,
    segment: SegmentId,
}

/// Storage-quota-aware segment scheduler in front of a [`Recorder`].
///
/// All methods take `&mut self`: the controller has a single owner (see
/// [`super::control_loop::ControlLoop`]), so recorder commands are never
/// issued concurrently.
pub struct SegmentedRecordingController<R, O, P, S>
where
    R: Recorder,
    O: OutputTargetProvider,
    P: VolumeProbe,
    S: StatusSink,
{
    recorder: R,
    outputs: O,
    monitor: StorageMonitor<P>,
    sink: S,
    events: EventSender,
    config: ControllerConfig,
    volume: VolumeRef,
    min_free_bytes: u64,
    session: RecordingSession,
    ledger: SegmentLedger,
    active: Option<ActiveSegment>,
    active_stats: RecordingStats,
    label: StatusLabel,
    next_segment: u64,
    devices: Vec<CaptureDevice>,
    camera: usize,
    quality: Quality,
}

impl<R, O, P, S> SegmentedRecordingController<R, O, P, S>
where
    R: Recorder,
    O: OutputTargetProvider,
    P: VolumeProbe,
    S: StatusSink,
{
    /// Create a controller for `volume`.
    ///
    /// The reserved headroom is derived from the volume capacity; use
    /// [`Self::select_volume`] to set it explicitly.
    pub fn new(
        recorder: R,
        outputs: O,
        probe: P,
        sink: S,
        events: EventSender,
        volume: VolumeRef,
        config: ControllerConfig,
    ) -> Self {
        let monitor = StorageMonitor::new(probe);
        let min_free_bytes = monitor.compute_min_free_bytes(&volume, MIN_FREE_CEILING);

        Self {
            recorder,
            outputs,
            monitor,
            sink,
            events,
            config,
            volume,
            min_free_bytes,
            session: RecordingSession::new(),
            ledger: SegmentLedger::new(),
            active: None,
            active_stats: RecordingStats::default(),
            label: StatusLabel::Idle,
            next_segment: 1,
            devices: Vec::new(),
            camera: 0,
            quality: Quality::default(),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.session.state()
    }

    pub fn session(&self) -> &RecordingSession {
        &self.session
    }

    pub fn ledger(&self) -> &SegmentLedger {
        &self.ledger
    }

    pub fn config(&self) -> ControllerConfig {
        self.config
    }

    pub fn volume(&self) -> &VolumeRef {
        &self.volume
    }

    pub fn min_free_bytes(&self) -> u64 {
        self.min_free_bytes
    }

    pub fn devices(&self) -> &[CaptureDevice] {
        &self.devices
    }

    /// The device that [`Self::bind`] will use
    pub fn selected_device(&self) -> Option<&CaptureDevice> {
        if self.devices.is_empty() {
            return None;
        }
        self.devices.get(self.camera % self.devices.len())
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Replace the session settings. Only allowed while idle.
    pub fn set_config(&mut self, config: ControllerConfig) -> Result<(), InvalidStateTransition> {
        self.require_idle("change settings")?;
        self.config = config;
        Ok(())
    }

    /// Switch to another volume. Only allowed while idle.
    ///
    /// The reserved headroom is recomputed from the new volume's capacity
    /// unless `min_free_bytes` is given.
    pub fn select_volume(
        &mut self,
        volume: VolumeRef,
        min_free_bytes: Option<u64>,
    ) -> Result<(), InvalidStateTransition> {
        self.require_idle("change volume")?;
        self.min_free_bytes = min_free_bytes
            .unwrap_or_else(|| self.monitor.compute_min_free_bytes(&volume, MIN_FREE_CEILING));
        info!(volume = %volume, min_free_bytes = self.min_free_bytes, "volume selected");
        self.volume = volume;
        Ok(())
    }

    /// Select a camera by index; the index wraps around the device list.
    pub fn select_camera(&mut self, index: usize) -> Result<(), InvalidStateTransition> {
        self.require_idle("change camera")?;
        self.camera = index;
        Ok(())
    }

    pub fn set_quality(&mut self, quality: Quality) -> Result<(), InvalidStateTransition> {
        self.require_idle("change quality")?;
        self.quality = quality;
        Ok(())
    }

    /// Suspension point for the one-time device enumeration.
    /// Must complete before [`Self::bind`].
    pub async fn await_enumeration<F>(&mut self, enumeration: F) -> Result<(), ControllerError>
    where
        F: Future<Output = Result<Vec<CaptureDevice>, DeviceError>>,
    {
        let devices = match enumeration.await {
            Ok(devices) if devices.is_empty() => Err(DeviceError::NoDevice),
            other => other,
        };

        match devices {
            Ok(devices) => {
                info!(count = devices.len(), "capture devices enumerated");
                self.devices = devices;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "device enumeration failed");
                self.publish_note(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Bind the recorder to the selected camera and quality.
    ///
    /// On failure the status sink is told why and the controller falls back
    /// to its default settings; nothing is retried.
    pub async fn bind(&mut self) -> Result<(), ControllerError> {
        self.require_idle("bind recorder")?;

        let device = match self.selected_device() {
            Some(device) => device.clone(),
            None => {
                self.publish_note(DeviceError::NoDevice.to_string());
                return Err(DeviceError::NoDevice.into());
            }
        };

        match self.recorder.bind(&device, self.quality).await {
            Ok(()) => {
                info!(device = %device, quality = %self.quality, "recorder bound");
                self.publish();
                Ok(())
            }
            Err(e) => {
                error!(device = %device, error = %e, "use case binding failed");
                self.reset_to_defaults();
                self.publish_note(format!("bind failed: {}", e));
                Err(e.into())
            }
        }
    }

    /// Start a new session (the capture button while idle).
    ///
    /// Ignored while a previous stop has not been confirmed by the recorder.
    pub async fn start(&mut self) -> Result<StartOutcome, ControllerError> {
        if self.session.begin()? == StartOutcome::Ignored {
            debug!("start ignored: stop still outstanding");
            return Ok(StartOutcome::Ignored);
        }

        self.ledger.clear();
        self.active_stats = RecordingStats::default();

        if let Err(e) = self.start_segment().await {
            self.session.abort();
            self.publish_note(format!("start failed: {}", e));
            return Err(e);
        }
        Ok(StartOutcome::Started)
    }

    pub async fn pause(&mut self) -> Result<(), ControllerError> {
        self.session.pause()?;
        let Some(active) = self.active.as_ref() else {
            self.session.resume()?;
            return Err(ControllerError::NoActiveRecording);
        };

        if let Err(e) = self.recorder.pause(&active.recording).await {
            self.session.resume()?;
            return Err(e.into());
        }
        Ok(())
    }

    pub async fn resume(&mut self) -> Result<(), ControllerError> {
        self.session.resume()?;
        let Some(active) = self.active.as_ref() else {
            self.session.pause()?;
            return Err(ControllerError::NoActiveRecording);
        };

        if let Err(e) = self.recorder.resume(&active.recording).await {
            self.session.pause()?;
            return Err(e.into());
        }
        Ok(())
    }

    /// The capture button: start when idle, otherwise pause/resume.
    pub async fn toggle(&mut self) -> Result<(), ControllerError> {
        match self.session.state() {
            CaptureState::Idle => self.start().await.map(|_| ()),
            CaptureState::Recording => self.pause().await,
            CaptureState::Paused => self.resume().await,
            CaptureState::Finalizing => {
                debug!("toggle ignored while finalizing");
                Ok(())
            }
        }
    }

    /// Stop the active segment.
    ///
    /// A final stop ends the session: the ledger is cleared and no next
    /// segment follows. A non-final stop is a rollover.
    pub async fn stop(&mut self, is_final: bool) -> Result<StopOutcome, ControllerError> {
        let outcome = self.session.request_stop(is_final)?;
        if is_final {
            self.ledger.clear();
        }

        if outcome == StopOutcome::AlreadyStopping {
            debug!(is_final, "stop already in flight");
            return Ok(outcome);
        }

        let Some(active) = self.active.as_ref() else {
            self.session.abort();
            return Err(ControllerError::NoActiveRecording);
        };

        info!(recording = %active.recording.id, is_final, "stopping segment");
        if let Err(e) = self.recorder.stop(&active.recording).await {
            // No finalize will follow a refused stop
            error!(error = %e, "recorder refused to stop");
            self.active = None;
            self.session.finalized(self.active_stats.duration, true);
            self.ledger.clear();
            self.label = StatusLabel::Finalized;
            self.publish_note(format!("stop failed: {}", e));
            return Err(e.into());
        }
        Ok(outcome)
    }

    /// Evict the oldest finished segment and release its storage.
    ///
    /// The segment being recorded is never evicted. A failed release is
    /// logged; the file may stay behind.
    pub async fn evict_oldest(&mut self) -> Option<Segment> {
        let active = self.active.as_ref().map(|a| a.segment);
        if self.ledger.oldest().map(Segment::id) == active {
            return None;
        }

        let segment = self.ledger.evict_oldest()?;
        match self.outputs.release(segment.path()).await {
            Ok(()) => info!(segment = %segment.id(), path = %segment.path().display(), "evicted segment"),
            Err(e) => warn!(segment = %segment.id(), error = %e, "failed to release evicted segment"),
        }
        Some(segment)
    }

    /// Apply one recorder event.
    pub async fn handle_event(&mut self, event: RecorderEvent) {
        let is_current = self
            .active
            .as_ref()
            .is_some_and(|a| a.recording.id == event.recording);
        if !is_current {
            debug!(recording = %event.recording, event = event.kind.name(), "ignoring event of inactive recording");
            return;
        }

        match event.kind {
            RecorderEventKind::Status(stats) => {
                self.record_stats(stats);
                self.on_status_tick().await;
            }
            RecorderEventKind::Start => {
                self.label = StatusLabel::Started;
                self.publish();
            }
            RecorderEventKind::Pause => {
                self.label = StatusLabel::Paused;
                self.publish();
            }
            RecorderEventKind::Resume => {
                self.label = StatusLabel::Resumed;
                self.publish();
            }
            RecorderEventKind::Finalize {
                stats,
                output,
                error,
            } => self.on_finalize(stats, output, error).await,
        }
    }

    /// Current status, as sent to the sink
    pub fn report(&self) -> StatusReport {
        StatusReport {
            label: self.label,
            state: self.session.state(),
            elapsed: self.session.cumulative_duration() + self.active_stats.duration,
            bytes_recorded: self.active_stats.bytes_recorded,
            segments: self.ledger.len(),
            stored_bytes: self.ledger.total_bytes(),
            saved_to: None,
            note: None,
        }
    }

    /// Send the current status with an extra note
    pub fn publish_note(&self, note: impl Into<String>) {
        self.emit(self.report().with_note(note));
    }

    fn publish(&self) {
        self.emit(self.report());
    }

    fn emit(&self, report: StatusReport) {
        info!("recording event: {}", report);
        self.sink.publish(&report);
    }

    async fn on_status_tick(&mut self) {
        // A final stop is already in flight; nothing left to decide
        if self.session.state() == CaptureState::Finalizing && !self.session.continues() {
            self.publish();
            return;
        }

        let full = self.monitor.is_volume_full(&self.volume, self.min_free_bytes);
        let plan = self.config.policy().evaluate(full, self.active_stats.bytes_recorded);
        let mut note = None;

        match plan.storage {
            Some(StorageAction::EvictOldest) => {
                if self.evict_oldest().await.is_none() {
                    warn!(volume = %self.volume, "volume full and no finished segment to evict");
                    note = Some("Volume full: no finished segment to evict yet".to_string());
                }
            }
            Some(StorageAction::StopSession) => {
                warn!(volume = %self.volume, "volume full, stopping");
                note = Some("Volume full, stopping".to_string());
                self.stop_quietly(true).await;
            }
            None => {}
        }

        if plan.split_segment {
            self.stop_quietly(false).await;
        }

        match note {
            Some(note) => self.publish_note(note),
            None => self.publish(),
        }
    }

    async fn on_finalize(&mut self, stats: RecordingStats, output: PathBuf, error: Option<String>) {
        let failed = error.is_some();
        self.record_stats(stats);
        self.active = None;
        self.active_stats = RecordingStats {
            bytes_recorded: stats.bytes_recorded,
            duration: std::time::Duration::ZERO,
        };
        self.label = StatusLabel::Finalized;

        if let Some(ref e) = error {
            error!(output = %output.display(), error = %e, "segment finalized with error");
        }

        match self.session.finalized(stats.duration, failed) {
            FinalizeOutcome::Continue => {
                debug!(output = %output.display(), "segment finalized, starting next");
                self.start_next_segment().await;
            }
            FinalizeOutcome::Settled => {
                self.ledger.clear();
                let mut report = self.report();
                report.saved_to = Some(self.outputs.location());
                report.note = error.map(|e| format!("recording error: {}", e));
                self.emit(report);
            }
        }
    }

    async fn start_next_segment(&mut self) {
        match self.session.start() {
            Ok(StartOutcome::Started) => {}
            Ok(StartOutcome::Ignored) => {
                debug!("next segment start ignored: stop outstanding");
                return;
            }
            Err(e) => {
                warn!(error = %e, "cannot start next segment");
                return;
            }
        }

        self.publish();
        if let Err(e) = self.start_segment().await {
            error!(error = %e, "failed to start next segment");
            self.session.abort();
            self.ledger.clear();
            self.publish_note(format!("start failed: {}", e));
        }
    }

    async fn start_segment(&mut self) -> Result<(), ControllerError> {
        let target = self.outputs.next_target().await?;
        let handle = self.recorder.prepare_segment(&target).await?;
        let recording = self
            .recorder
            .start(handle, self.config.audio, self.events.clone())
            .await?;

        let id = SegmentId::new(self.next_segment);
        self.next_segment += 1;
        self.ledger.enqueue(Segment::new(id, recording.path.clone()));
        info!(segment = %id, recording = %recording.id, path = %recording.path.display(), "recording started");

        self.active = Some(ActiveSegment {
            recording,
            segment: id,
        });
        self.active_stats = RecordingStats::default();
        Ok(())
    }

    /// Stop from inside event handling: failures are already reported
    async fn stop_quietly(&mut self, is_final: bool) {
        if let Err(e) = self.stop(is_final).await {
            warn!(is_final, error = %e, "stop failed");
        }
    }

    fn record_stats(&mut self, stats: RecordingStats) {
        self.active_stats = stats;
        if let Some(active) = self.active.as_ref() {
            if let Some(segment) = self.ledger.get_mut(active.segment) {
                segment.set_bytes_recorded(stats.bytes_recorded);
            }
        }
    }

    fn reset_to_defaults(&mut self) {
        self.camera = 0;
        self.quality = Quality::default();
        self.config = ControllerConfig::default();
    }

    fn require_idle(&self, action: &str) -> Result<(), InvalidStateTransition> {
        if self.session.is_idle() {
            Ok(())
        } else {
            Err(InvalidStateTransition {
                current_state: self.session.state(),
                action: action.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{OutputTarget, RecordingId, SegmentHandle};
    use async_trait::async_trait;
    use std::io;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Bind(String),
        Start(PathBuf),
        Pause(u64),
        Resume(u64),
        Stop(u64),
    }

    #[derive(Clone, Default)]
    struct MockRecorder {
        calls: Arc<Mutex<Vec<Call>>>,
        next_id: Arc<AtomicU64>,
        fail_bind: Arc<AtomicBool>,
        fail_start: Arc<AtomicBool>,
    }

    impl MockRecorder {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn push(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl Recorder for MockRecorder {
        async fn bind(&self, device: &CaptureDevice, _quality: Quality) -> Result<(), RecordingError> {
            if self.fail_bind.load(Ordering::SeqCst) {
                return Err(RecordingError::BindFailed("busy".to_string()));
            }
            self.push(Call::Bind(device.path.clone()));
            Ok(())
        }

        async fn prepare_segment(&self, target: &OutputTarget) -> Result<SegmentHandle, RecordingError> {
            Ok(SegmentHandle {
                path: target.path.clone(),
            })
        }

        async fn start(
            &self,
            handle: SegmentHandle,
            _audio: bool,
            _events: EventSender,
        ) -> Result<ActiveRecording, RecordingError> {
            if self.fail_start.load(Ordering::SeqCst) {
                return Err(RecordingError::StartFailed("no camera".to_string()));
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            self.push(Call::Start(handle.path.clone()));
            Ok(ActiveRecording {
                id: RecordingId::new(id),
                path: handle.path,
            })
        }

        async fn pause(&self, recording: &ActiveRecording) -> Result<(), RecordingError> {
            self.push(Call::Pause(recording.id.value()));
            Ok(())
        }

        async fn resume(&self, recording: &ActiveRecording) -> Result<(), RecordingError> {
            self.push(Call::Resume(recording.id.value()));
            Ok(())
        }

        async fn stop(&self, recording: &ActiveRecording) -> Result<(), RecordingError> {
            self.push(Call::Stop(recording.id.value()));
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct MockOutputs {
        counter: Arc<AtomicU64>,
        released: Arc<Mutex<Vec<PathBuf>>>,
    }

    #[async_trait]
    impl OutputTargetProvider for MockOutputs {
        async fn next_target(&self) -> Result<OutputTarget, OutputError> {
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(OutputTarget::new(format!("/out/seg-{}.mp4", n)))
        }

        async fn release(&self, path: &Path) -> Result<(), OutputError> {
            self.released.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }

        fn location(&self) -> PathBuf {
            PathBuf::from("/out")
        }
    }

    struct PlentyOfSpace;

    impl VolumeProbe for PlentyOfSpace {
        fn usable_space(&self, _path: &Path) -> io::Result<u64> {
            Ok(u64::MAX / 2)
        }

        fn total_space(&self, _path: &Path) -> io::Result<u64> {
            Ok(u64::MAX)
        }
    }

    #[derive(Clone, Default)]
    struct CollectingSink {
        reports: Arc<Mutex<Vec<StatusReport>>>,
    }

    impl CollectingSink {
        fn last(&self) -> StatusReport {
            self.reports.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl StatusSink for CollectingSink {
        fn publish(&self, report: &StatusReport) {
            self.reports.lock().unwrap().push(report.clone());
        }
    }

    type TestController =
        SegmentedRecordingController<MockRecorder, MockOutputs, PlentyOfSpace, CollectingSink>;

    fn controller() -> (TestController, MockRecorder, CollectingSink) {
        let recorder = MockRecorder::default();
        let sink = CollectingSink::default();
        let (tx, _rx) = mpsc::unbounded_channel();
        let controller = SegmentedRecordingController::new(
            recorder.clone(),
            MockOutputs::default(),
            PlentyOfSpace,
            sink.clone(),
            tx,
            VolumeRef::onboard("/out"),
            ControllerConfig::default(),
        );
        (controller, recorder, sink)
    }

    fn device(path: &str) -> CaptureDevice {
        CaptureDevice {
            name: path.to_string(),
            path: path.to_string(),
            input_format: "v4l2".to_string(),
        }
    }

    fn finalize(id: u64, secs: u64) -> RecorderEvent {
        RecorderEvent::new(
            RecordingId::new(id),
            RecorderEventKind::Finalize {
                stats: RecordingStats {
                    bytes_recorded: 10,
                    duration: Duration::from_secs(secs),
                },
                output: PathBuf::from("/out/x.mp4"),
                error: None,
            },
        )
    }

    #[tokio::test]
    async fn min_free_is_capped_at_ceiling() {
        let (controller, _, _) = controller();
        assert_eq!(controller.min_free_bytes(), MIN_FREE_CEILING);
    }

    #[tokio::test]
    async fn bind_requires_enumeration() {
        let (mut controller, _, _) = controller();
        let err = controller.bind().await.unwrap_err();
        assert!(matches!(err, ControllerError::Device(DeviceError::NoDevice)));
    }

    #[tokio::test]
    async fn bind_uses_selected_camera_with_wraparound() {
        let (mut controller, recorder, _) = controller();
        controller
            .await_enumeration(async { Ok(vec![device("/dev/video0"), device("/dev/video2")]) })
            .await
            .unwrap();

        controller.select_camera(3).unwrap();
        controller.bind().await.unwrap();
        assert_eq!(recorder.calls(), vec![Call::Bind("/dev/video2".to_string())]);
    }

    #[tokio::test]
    async fn empty_enumeration_is_an_error() {
        let (mut controller, _, sink) = controller();
        let result = controller.await_enumeration(async { Ok(Vec::new()) }).await;
        assert!(result.is_err());
        assert!(sink.last().note.unwrap().contains("No capture device"));
    }

    #[tokio::test]
    async fn bind_failure_resets_to_defaults() {
        let (mut controller, recorder, sink) = controller();
        recorder.fail_bind.store(true, Ordering::SeqCst);
        controller
            .await_enumeration(async { Ok(vec![device("/dev/video0"), device("/dev/video1")]) })
            .await
            .unwrap();
        controller.select_camera(1).unwrap();
        controller.set_quality(Quality::Sd).unwrap();
        controller
            .set_config(ControllerConfig {
                rolling: false,
                audio: true,
                ..ControllerConfig::default()
            })
            .unwrap();

        assert!(controller.bind().await.is_err());
        assert_eq!(controller.quality(), Quality::default());
        assert_eq!(controller.config(), ControllerConfig::default());
        assert_eq!(controller.selected_device().unwrap().path, "/dev/video0");
        assert!(sink.last().note.unwrap().contains("bind failed"));
        assert_eq!(controller.state(), CaptureState::Idle);
    }

    #[tokio::test]
    async fn start_pause_resume_stop() {
        let (mut controller, recorder, _) = controller();

        assert_eq!(controller.start().await.unwrap(), StartOutcome::Started);
        controller.pause().await.unwrap();
        assert_eq!(controller.state(), CaptureState::Paused);
        controller.resume().await.unwrap();
        assert_eq!(controller.state(), CaptureState::Recording);
        controller.stop(true).await.unwrap();
        assert_eq!(controller.state(), CaptureState::Finalizing);

        assert_eq!(
            recorder.calls(),
            vec![
                Call::Start(PathBuf::from("/out/seg-1.mp4")),
                Call::Pause(1),
                Call::Resume(1),
                Call::Stop(1),
            ]
        );
    }

    #[tokio::test]
    async fn toggle_cycles_like_capture_button() {
        let (mut controller, _, _) = controller();
        controller.toggle().await.unwrap();
        assert_eq!(controller.state(), CaptureState::Recording);
        controller.toggle().await.unwrap();
        assert_eq!(controller.state(), CaptureState::Paused);
        controller.toggle().await.unwrap();
        assert_eq!(controller.state(), CaptureState::Recording);
    }

    #[tokio::test]
    async fn pause_while_idle_is_invalid_state() {
        let (mut controller, recorder, _) = controller();
        let err = controller.pause().await.unwrap_err();
        assert!(matches!(err, ControllerError::InvalidState(_)));
        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn settings_locked_while_recording() {
        let (mut controller, _, _) = controller();
        controller.start().await.unwrap();
        assert!(controller.set_config(ControllerConfig::default()).is_err());
        assert!(controller
            .select_volume(VolumeRef::mounted_at("/media/usb"), None)
            .is_err());
    }

    #[tokio::test]
    async fn select_volume_with_explicit_threshold() {
        let (mut controller, _, _) = controller();
        controller
            .select_volume(VolumeRef::mounted_at("/media/usb"), Some(4096))
            .unwrap();
        assert_eq!(controller.min_free_bytes(), 4096);
        assert_eq!(controller.volume().label(), "usb");
    }

    #[tokio::test]
    async fn start_failure_returns_to_idle() {
        let (mut controller, recorder, sink) = controller();
        recorder.fail_start.store(true, Ordering::SeqCst);

        assert!(controller.start().await.is_err());
        assert_eq!(controller.state(), CaptureState::Idle);
        assert!(controller.ledger().is_empty());
        assert!(sink.last().note.unwrap().contains("start failed"));
    }

    #[tokio::test]
    async fn final_finalize_reports_save_location() {
        let (mut controller, _, sink) = controller();
        controller.start().await.unwrap();
        controller.stop(true).await.unwrap();
        controller.handle_event(finalize(1, 65)).await;

        let report = sink.last();
        assert_eq!(report.label, StatusLabel::Finalized);
        assert_eq!(report.saved_to, Some(PathBuf::from("/out")));
        assert_eq!(report.elapsed, Duration::from_secs(65));
        assert_eq!(controller.state(), CaptureState::Idle);
    }

    #[tokio::test]
    async fn finalize_with_error_ends_session() {
        let (mut controller, recorder, sink) = controller();
        controller.start().await.unwrap();

        controller
            .handle_event(RecorderEvent::new(
                RecordingId::new(1),
                RecorderEventKind::Finalize {
                    stats: RecordingStats::default(),
                    output: PathBuf::from("/out/seg-1.mp4"),
                    error: Some("device lost".to_string()),
                },
            ))
            .await;

        assert_eq!(controller.state(), CaptureState::Idle);
        assert_eq!(recorder.calls().len(), 1);
        assert!(sink.last().note.unwrap().contains("device lost"));
    }

    #[tokio::test]
    async fn events_of_old_recordings_are_ignored() {
        let (mut controller, recorder, _) = controller();
        controller.start().await.unwrap();

        controller.handle_event(finalize(42, 10)).await;
        assert_eq!(controller.state(), CaptureState::Recording);
        assert_eq!(recorder.calls().len(), 1);
    }

    #[tokio::test]
    async fn lifecycle_events_update_label() {
        let (mut controller, _, sink) = controller();
        controller.start().await.unwrap();

        controller
            .handle_event(RecorderEvent::new(RecordingId::new(1), RecorderEventKind::Start))
            .await;
        assert_eq!(sink.last().label, StatusLabel::Started);

        controller
            .handle_event(RecorderEvent::new(RecordingId::new(1), RecorderEventKind::Pause))
            .await;
        assert_eq!(sink.last().label, StatusLabel::Paused);
    }
}
