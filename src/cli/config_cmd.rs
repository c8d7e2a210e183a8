//! Config command handler

use std::path::Path;

use crate::application::ports::{ConfigStore, VolumeProbe};
use crate::application::StorageMonitor;
use crate::domain::config::{AppConfig, CaptureConfig};
use crate::domain::error::ConfigError;
use crate::domain::recording::{ByteSize, Quality, MIN_FREE_CEILING};
use crate::domain::storage::VolumeRef;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand.
///
/// `probe` is used to derive the reserved headroom when the volume changes.
pub async fn handle_config_command<S: ConfigStore, P: VolumeProbe>(
    action: ConfigAction,
    store: &S,
    probe: P,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => {
            handle_set(store, probe, presenter, &key, &value).await
        }
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore, P: VolumeProbe>(
    store: &S,
    probe: P,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    validate_config_value(key, value)?;

    // Selecting a volume also resets its reserved headroom
    let derived_min_free = if key == "volume" {
        let monitor = StorageMonitor::new(probe);
        let bytes = monitor.compute_min_free_bytes(&VolumeRef::mounted_at(value), MIN_FREE_CEILING);
        Some(ByteSize::from_bytes(bytes).to_string())
    } else {
        None
    };

    let key_owned = key.to_string();
    let value_owned = value.to_string();
    let min_free = derived_min_free.clone();
    store
        .update(move |config| {
            apply_value(config, &key_owned, &value_owned)?;
            if let Some(min_free) = min_free {
                config.min_free = Some(min_free);
            }
            Ok(())
        })
        .await?;

    presenter.success(&format!("{} = {}", key, value));
    if let Some(min_free) = derived_min_free {
        presenter.info(&format!("min_free = {}", min_free));
    }

    Ok(())
}

/// Store a validated value under `key`
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "output_dir" => config.output_dir = Some(value.to_string()),
        "volume" => config.volume = Some(value.to_string()),
        "min_free" => config.min_free = Some(value.to_string()),
        "segment_size" => config.segment_size = Some(value.to_string()),
        "rolling" => config.rolling = Some(parse_bool_for(key, value)?),
        "audio" => config.audio = Some(parse_bool_for(key, value)?),
        _ => {
            let capture = config.capture.get_or_insert_with(CaptureConfig::default);
            match key {
                "capture.device" => capture.device = Some(value.to_string()),
                "capture.camera" => capture.camera = Some(parse_index(key, value)?),
                "capture.quality" => capture.quality = Some(value.to_lowercase()),
                "capture.input_format" => capture.input_format = Some(value.to_string()),
                _ => return Err(unknown_key(key)),
            }
        }
    }
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let config = store.load().await?;

    match config_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        let value = config_value(&config, key);
        presenter.key_value(key, value.as_deref().unwrap_or(NOT_SET));
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

/// Stored value of `key`, rendered for display
fn config_value(config: &AppConfig, key: &str) -> Option<String> {
    let capture = config.capture.as_ref();
    match key {
        "output_dir" => config.output_dir.clone(),
        "volume" => config.volume.clone(),
        "min_free" => config.min_free.clone(),
        "segment_size" => config.segment_size.clone(),
        "rolling" => config.rolling.map(|b| b.to_string()),
        "audio" => config.audio.map(|b| b.to_string()),
        "capture.device" => capture.and_then(|c| c.device.clone()),
        "capture.camera" => capture.and_then(|c| c.camera).map(|i| i.to_string()),
        "capture.quality" => capture.and_then(|c| c.quality.clone()),
        "capture.input_format" => capture.and_then(|c| c.input_format.clone()),
        _ => None,
    }
}

/// Validate a config value based on key type
fn validate_config_value(key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "min_free" | "segment_size" => {
            value
                .parse::<ByteSize>()
                .map_err(|e| invalid(key, e.to_string()))?;
        }
        "rolling" | "audio" => {
            parse_bool_for(key, value)?;
        }
        "capture.camera" => {
            parse_index(key, value)?;
        }
        "capture.quality" => {
            value
                .parse::<Quality>()
                .map_err(|e| invalid(key, e.to_string()))?;
        }
        "volume" => {
            if !Path::new(value).is_dir() {
                return Err(invalid(key, format!("'{}' is not a directory", value)));
            }
        }
        "output_dir" | "capture.device" | "capture.input_format" => {
            if value.trim().is_empty() {
                return Err(invalid(key, "Value must not be empty".to_string()));
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(unknown_key(key))
    }
}

fn unknown_key(key: &str) -> ConfigError {
    invalid(
        key,
        format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    )
}

fn invalid(key: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message,
    }
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(()),
    }
}

fn parse_bool_for(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).map_err(|_| invalid(key, "Value must be 'true' or 'false'".to_string()))
}

fn parse_index(key: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .parse()
        .map_err(|_| invalid(key, "Value must be a non-negative integer".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::XdgConfigStore;
    use std::io;
    use tempfile::TempDir;

    struct TenGigVolume;

    impl VolumeProbe for TenGigVolume {
        fn usable_space(&self, _path: &Path) -> io::Result<u64> {
            Ok(5 * 1024 * 1024 * 1024)
        }

        fn total_space(&self, _path: &Path) -> io::Result<u64> {
            Ok(10 * 1024 * 1024 * 1024)
        }
    }

    struct SmallVolume;

    impl VolumeProbe for SmallVolume {
        fn usable_space(&self, _path: &Path) -> io::Result<u64> {
            Ok(0)
        }

        fn total_space(&self, _path: &Path) -> io::Result<u64> {
            Ok(2 * 1024 * 1024 * 1024)
        }
    }

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("true"), Ok(true));
        assert_eq!(parse_bool("off"), Ok(false));
        assert_eq!(parse_bool("1"), Ok(true));
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn validate_sizes() {
        assert!(validate_config_value("segment_size", "700M").is_ok());
        assert!(validate_config_value("min_free", "2G").is_ok());
        assert!(validate_config_value("segment_size", "big").is_err());
        assert!(validate_config_value("segment_size", "0").is_err());
    }

    #[test]
    fn validate_quality() {
        assert!(validate_config_value("capture.quality", "uhd").is_ok());
        assert!(validate_config_value("capture.quality", "8k").is_err());
    }

    #[test]
    fn validate_camera_index() {
        assert!(validate_config_value("capture.camera", "2").is_ok());
        assert!(validate_config_value("capture.camera", "-1").is_err());
    }

    #[test]
    fn validate_volume_must_exist() {
        let dir = TempDir::new().unwrap();
        assert!(validate_config_value("volume", &dir.path().to_string_lossy()).is_ok());
        assert!(validate_config_value("volume", "/nonexistent/rollcap-volume").is_err());
    }

    #[test]
    fn apply_nested_capture_key() {
        let mut config = AppConfig::empty();
        apply_value(&mut config, "capture.camera", "3").unwrap();
        apply_value(&mut config, "capture.quality", "HD").unwrap();
        assert_eq!(config.camera_or_default(), 3);
        assert_eq!(config_value(&config, "capture.quality"), Some("hd".to_string()));
    }

    #[test]
    fn unknown_key_rejected() {
        let err = check_key("api_key").unwrap_err();
        assert!(err.to_string().contains("Unknown key"));
    }

    #[tokio::test]
    async fn setting_volume_derives_min_free() {
        let dir = TempDir::new().unwrap();
        let volume = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let presenter = Presenter::new();

        handle_set(
            &store,
            TenGigVolume,
            &presenter,
            "volume",
            &volume.path().to_string_lossy(),
        )
        .await
        .unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.min_free(), Some(ByteSize::from_gib(1)));
        assert!(config.volume.is_some());
    }

    #[tokio::test]
    async fn small_volume_reserves_a_tenth() {
        let dir = TempDir::new().unwrap();
        let volume = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));

        handle_set(
            &store,
            SmallVolume,
            &Presenter::new(),
            "volume",
            &volume.path().to_string_lossy(),
        )
        .await
        .unwrap();

        let config = store.load().await.unwrap();
        // 2 GiB / 10, rounded down to bytes
        assert_eq!(
            config.min_free().map(|b| b.as_bytes()),
            Some(2 * 1024 * 1024 * 1024 / 10)
        );
    }

    #[tokio::test]
    async fn set_then_get_bool() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));

        handle_set(&store, TenGigVolume, &Presenter::new(), "rolling", "no")
            .await
            .unwrap();
        let config = store.load().await.unwrap();
        assert_eq!(config_value(&config, "rolling"), Some("false".to_string()));
    }
}
