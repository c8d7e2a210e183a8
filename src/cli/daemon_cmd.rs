//! Daemon command handler - sends commands to running daemon over the socket

use super::args::DaemonAction;
use super::presenter::Presenter;
use super::socket::{default_socket_path, ControlClient};

/// Handle daemon subcommand
pub async fn handle_daemon_command(
    action: DaemonAction,
    presenter: &Presenter,
) -> Result<(), String> {
    let client = ControlClient::new(default_socket_path());
    if !client.daemon_present() {
        return Err("No daemon running. Start with: rollcap --daemon".to_string());
    }

    let request = action.request();
    let reply = client
        .request(request)
        .await
        .map_err(|e| format!("Failed to communicate with daemon: {}", e))?;

    if let Some(message) = reply.strip_prefix("error:") {
        return Err(message.trim().to_string());
    }

    match action {
        DaemonAction::Status => presenter.output(&reply),
        _ => presenter.info(&format!("Command sent: {}", request)),
    }
    Ok(())
}
