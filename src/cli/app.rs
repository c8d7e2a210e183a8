//! App runner for foreground capture and shared setup

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::application::ports::{
    CaptureDevice, ConfigStore, DeviceCatalog, DeviceError, OutputError, RecorderEvent,
};
use crate::application::{
    command_channel, ControlLoop, ControllerError, SegmentedRecordingController,
};
use crate::domain::config::AppConfig;
use crate::domain::storage::VolumeRef;
use crate::infrastructure::{
    ConfiguredDevice, DirectoryOutputProvider, FfmpegRecorder, StatvfsProbe, V4l2DeviceCatalog,
    XdgConfigStore,
};

use super::presenter::{Presenter, TerminalStatusSink};
use super::signals::install_signal_handlers;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable overriding the output directory
pub const OUTPUT_DIR_ENV: &str = "ROLLCAP_OUTPUT_DIR";

/// The controller wired to the real adapters
pub type CliController = SegmentedRecordingController<
    FfmpegRecorder,
    DirectoryOutputProvider,
    StatvfsProbe,
    Arc<TerminalStatusSink>,
>;

/// Record in the foreground until interrupted or the session ends
pub async fn run_capture(config: AppConfig) -> ExitCode {
    let presenter = Presenter::new();
    let sink = Arc::new(TerminalStatusSink::new());

    let (mut controller, events) = match prepare_controller(&config, Arc::clone(&sink)).await {
        Ok(parts) => parts,
        Err(e) => {
            sink.finish();
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let (tx, rx) = command_channel();
    if let Err(e) = install_signal_handlers(tx.clone()) {
        sink.finish();
        presenter.error(&format!("Failed to setup signal handler: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    if let Err(e) = controller.start().await {
        sink.finish();
        presenter.error(&format!("Failed to start recording: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    presenter.info(&format!(
        "{} | Ctrl+C: stop | kill -USR1 {}: pause/resume",
        controller.volume(),
        std::process::id()
    ));

    let (control, _status) = ControlLoop::new(controller, rx, events);
    let controller = control.exit_when_idle().run().await;
    drop(tx);
    sink.finish();

    info!(segments = controller.ledger().len(), "capture finished");
    presenter.success(&controller.report().to_string());
    ExitCode::from(EXIT_SUCCESS)
}

/// List capture devices with their camera index
pub async fn run_devices(config: AppConfig) -> ExitCode {
    let presenter = Presenter::new();
    let catalog = V4l2DeviceCatalog::new(config.input_format_or_default());

    match catalog.enumerate().await {
        Ok(devices) => {
            for (index, device) in devices.iter().enumerate() {
                presenter.output(&format!("{}: {}", index, device));
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Build the controller from `config`: volume, thresholds, devices, binding.
///
/// Device enumeration runs on its own task; the controller waits for it
/// before binding.
pub async fn prepare_controller(
    config: &AppConfig,
    sink: Arc<TerminalStatusSink>,
) -> Result<(CliController, mpsc::UnboundedReceiver<RecorderEvent>), ControllerError> {
    let input_format = config.input_format_or_default().to_string();
    let enumeration = match config.device() {
        Some(device) => {
            let catalog = ConfiguredDevice::new(device, input_format);
            tokio::spawn(async move { catalog.enumerate().await })
        }
        None => {
            let catalog = V4l2DeviceCatalog::new(input_format);
            tokio::spawn(async move { catalog.enumerate().await })
        }
    };

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let volume = config.volume_or_default();
    let output_root = prepare_output_root(config.output_root(), &volume).await?;
    let mut controller = SegmentedRecordingController::new(
        FfmpegRecorder::new(),
        DirectoryOutputProvider::new(output_root),
        StatvfsProbe::new(),
        sink,
        event_tx,
        volume.clone(),
        config.controller_config(),
    );

    if let Some(min_free) = config.min_free() {
        controller.select_volume(volume, Some(min_free.as_bytes()))?;
    }
    controller.select_camera(config.camera_or_default())?;
    controller.set_quality(config.quality_or_default())?;

    controller
        .await_enumeration(async move {
            enumeration
                .await
                .unwrap_or_else(|e| Err(DeviceError::EnumerationFailed(e.to_string())))
        })
        .await?;
    controller.bind().await?;

    if let Some(device) = controller.selected_device() {
        log_binding(device, &controller);
    }
    Ok((controller, event_rx))
}

/// Create the output tree when it lives on onboard storage or on a mounted
/// volume that is present. A missing mount is left missing so that free
/// space checks fail instead of measuring the parent filesystem.
async fn prepare_output_root(root: PathBuf, volume: &VolumeRef) -> Result<PathBuf, OutputError> {
    let on_present_volume =
        volume.is_default() || (volume.root().is_dir() && root.starts_with(volume.root()));
    if on_present_volume {
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| OutputError::CreateDirFailed {
                path: root.display().to_string(),
                message: e.to_string(),
            })?;
    }
    Ok(root)
}

fn log_binding(device: &CaptureDevice, controller: &CliController) {
    let config = controller.config();
    info!(
        device = %device,
        quality = %controller.quality(),
        rolling = config.rolling,
        audio = config.audio,
        segment_size = %config.segment_size,
        min_free_bytes = controller.min_free_bytes(),
        "controller ready"
    );
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    let env_config = AppConfig {
        output_dir: env::var(OUTPUT_DIR_ENV).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}
