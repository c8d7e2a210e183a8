//! CLI argument definitions using Clap

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::application::ControlCommand;
use crate::domain::config::{AppConfig, CaptureConfig};
use crate::domain::recording::Quality;

use super::socket::SocketRequest;

/// rollcap - segmented CCTV-style recording with storage-aware rollover
#[derive(Parser, Debug)]
#[command(name = "rollcap")]
#[command(version)]
#[command(about = "Records a camera into fixed-size segments, evicting the oldest when storage runs low")]
#[command(long_about = None)]
pub struct Cli {
    /// Directory the segments are written under
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Mount point of the volume to watch for free space
    #[arg(long, value_name = "PATH")]
    pub volume: Option<String>,

    /// Reserved free space (e.g., 512M, 2G); derived from the volume if unset
    #[arg(long, value_name = "SIZE")]
    pub min_free: Option<String>,

    /// Size at which a new segment is started (e.g., 1G, 700M)
    #[arg(short = 's', long, value_name = "SIZE")]
    pub segment_size: Option<String>,

    /// Delete the oldest segment when the volume is full
    #[arg(long, overrides_with = "no_rolling")]
    pub rolling: bool,

    /// Stop recording when the volume is full
    #[arg(long)]
    pub no_rolling: bool,

    /// Record audio
    #[arg(short = 'a', long, overrides_with = "no_audio")]
    pub audio: bool,

    /// Record video only
    #[arg(long)]
    pub no_audio: bool,

    /// Camera index among the enumerated devices (wraps around)
    #[arg(short = 'c', long, value_name = "INDEX")]
    pub camera: Option<usize>,

    /// Capture device path, overrides --camera
    #[arg(short = 'd', long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Recording quality preset
    #[arg(short = 'q', long, value_name = "QUALITY")]
    pub quality: Option<QualityArg>,

    /// Run as daemon (control via: rollcap daemon start/pause/resume/stop/status)
    #[arg(long)]
    pub daemon: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Settings given on the command line, as a partial config
    pub fn to_config(&self) -> AppConfig {
        let rolling = match (self.rolling, self.no_rolling) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };
        let audio = match (self.audio, self.no_audio) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };

        let capture = if self.device.is_some() || self.camera.is_some() || self.quality.is_some() {
            Some(CaptureConfig {
                device: self.device.clone(),
                camera: self.camera,
                quality: self.quality.map(|q| Quality::from(q).to_string()),
                input_format: None,
            })
        } else {
            None
        };

        AppConfig {
            output_dir: self.output_dir.clone(),
            volume: self.volume.clone(),
            min_free: self.min_free.clone(),
            segment_size: self.segment_size.clone(),
            rolling,
            audio,
            capture,
        }
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Send commands to running daemon
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
    /// List capture devices
    Devices,
}

/// Daemon control actions
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonAction {
    /// Start a recording session
    Start,
    /// Pause the current segment
    Pause,
    /// Resume a paused segment
    Resume,
    /// Start if idle, otherwise pause or resume
    Toggle,
    /// End the recording session
    Stop,
    /// Show daemon status as JSON
    Status,
}

impl DaemonAction {
    /// Request sent over the control socket
    pub const fn request(&self) -> SocketRequest {
        let command = match self {
            Self::Status => return SocketRequest::Status,
            Self::Start => ControlCommand::Start,
            Self::Pause => ControlCommand::Pause,
            Self::Resume => ControlCommand::Resume,
            Self::Toggle => ControlCommand::Toggle,
            Self::Stop => ControlCommand::Stop,
        };
        SocketRequest::Command(command)
    }
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Quality argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum QualityArg {
    Uhd,
    Fhd,
    Hd,
    Sd,
}

impl From<QualityArg> for Quality {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::Uhd => Quality::Uhd,
            QualityArg::Fhd => Quality::Fhd,
            QualityArg::Hd => Quality::Hd,
            QualityArg::Sd => Quality::Sd,
        }
    }
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "output_dir",
    "volume",
    "min_free",
    "segment_size",
    "rolling",
    "audio",
    "capture.device",
    "capture.camera",
    "capture.quality",
    "capture.input_format",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["rollcap"]);
        assert!(cli.output_dir.is_none());
        assert!(cli.segment_size.is_none());
        assert!(!cli.rolling);
        assert!(!cli.no_rolling);
        assert!(!cli.audio);
        assert!(!cli.daemon);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.to_config(), AppConfig::empty());
    }

    #[test]
    fn cli_parses_sizes() {
        let cli = Cli::parse_from(["rollcap", "-s", "700M", "--min-free", "2G"]);
        assert_eq!(cli.segment_size, Some("700M".to_string()));
        assert_eq!(cli.min_free, Some("2G".to_string()));
    }

    #[test]
    fn cli_parses_quality() {
        let cli = Cli::parse_from(["rollcap", "-q", "uhd"]);
        assert_eq!(cli.quality, Some(QualityArg::Uhd));
        assert_eq!(Quality::from(QualityArg::Uhd), Quality::Uhd);
    }

    #[test]
    fn no_rolling_maps_to_false() {
        let cli = Cli::parse_from(["rollcap", "--no-rolling"]);
        assert_eq!(cli.to_config().rolling, Some(false));
    }

    #[test]
    fn audio_flag_maps_to_true() {
        let cli = Cli::parse_from(["rollcap", "-a"]);
        assert_eq!(cli.to_config().audio, Some(true));
    }

    #[test]
    fn capture_flags_build_capture_config() {
        let cli = Cli::parse_from(["rollcap", "-d", "/dev/video2", "-q", "hd"]);
        let config = cli.to_config();
        assert_eq!(config.device(), Some("/dev/video2"));
        assert_eq!(config.quality_or_default(), Quality::Hd);
    }

    #[test]
    fn cli_parses_verbosity() {
        let cli = Cli::parse_from(["rollcap", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_parses_daemon_actions() {
        let cli = Cli::parse_from(["rollcap", "daemon", "pause"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Daemon {
                action: DaemonAction::Pause
            })
        ));
        assert_eq!(DaemonAction::Status.request(), SocketRequest::Status);
        assert_eq!(
            DaemonAction::Toggle.request(),
            SocketRequest::Command(ControlCommand::Toggle)
        );
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["rollcap", "config", "set", "segment_size", "512M"]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "segment_size");
            assert_eq!(value, "512M");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn cli_parses_devices() {
        let cli = Cli::parse_from(["rollcap", "devices"]);
        assert!(matches!(cli.command, Some(Commands::Devices)));
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("volume"));
        assert!(is_valid_config_key("capture.quality"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
