//! rollcap CLI entry point

use std::process::ExitCode;

use clap::Parser;

use rollcap::cli::{
    app::{load_merged_config, run_capture, run_devices, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    daemon_app::run_daemon,
    daemon_cmd::handle_daemon_command,
    logging::init_logging,
    presenter::Presenter,
};
use rollcap::domain::config::AppConfig;
use rollcap::domain::recording::ByteSize;
use rollcap::infrastructure::{StatvfsProbe, XdgConfigStore};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let presenter = Presenter::new();

    // Handle subcommands
    match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) =
                handle_config_command(action, &store, StatvfsProbe::new(), &presenter).await
            {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Daemon { action }) => {
            if let Err(e) = handle_daemon_command(action, &presenter).await {
                presenter.error(&e);
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Devices) => {
            let config = load_merged_config(cli.to_config()).await;
            return run_devices(config).await;
        }
        None => {}
    }

    let config = load_merged_config(cli.to_config()).await;
    if let Err(message) = validate_sizes(&config) {
        presenter.error(&message);
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    if cli.daemon {
        run_daemon(config).await
    } else {
        run_capture(config).await
    }
}

/// Reject unparsable sizes instead of silently using defaults
fn validate_sizes(config: &AppConfig) -> Result<(), String> {
    if let Some(ref s) = config.segment_size {
        s.parse::<ByteSize>()
            .map_err(|e| format!("Invalid segment-size: {}", e))?;
    }
    if let Some(ref s) = config.min_free {
        s.parse::<ByteSize>()
            .map_err(|e| format!("Invalid min-free: {}", e))?;
    }
    Ok(())
}
