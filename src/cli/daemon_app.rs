//! Daemon app runner

use std::process::ExitCode;
use std::sync::Arc;

use crate::application::command_channel;
use crate::application::ControlLoop;
use crate::domain::config::AppConfig;

use super::app::{prepare_controller, EXIT_ERROR, EXIT_SUCCESS};
use super::pid_file::PidFile;
use super::presenter::{Presenter, TerminalStatusSink};
use super::signals::install_signal_handlers;
use super::socket::{default_socket_path, ControlSocket};

/// Run daemon mode: idle until told to record over the control socket
pub async fn run_daemon(config: AppConfig) -> ExitCode {
    let presenter = Presenter::new();

    let pid_file = match PidFile::acquire() {
        Ok(pid_file) => pid_file,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let sink = Arc::new(TerminalStatusSink::new());
    let (controller, events) = match prepare_controller(&config, Arc::clone(&sink)).await {
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

    let socket = match ControlSocket::bind(default_socket_path()) {
        Ok(socket) => socket,
        Err(e) => {
            sink.finish();
            presenter.error(&format!("Failed to bind socket: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let socket_path = socket.path().to_path_buf();

    let (control, status) = ControlLoop::new(controller, rx, events);

    let socket_tx = tx.clone();
    let socket_task = tokio::spawn(async move { socket.serve(socket_tx, status).await });

    presenter.daemon_status("Started, waiting for commands...");
    presenter.info(&format!(
        "PID: {} | Socket: {} | SIGINT: exit",
        std::process::id(),
        socket_path.display()
    ));
    drop(tx);

    control.run().await;
    sink.finish();

    // Aborting drops the socket, which removes its file
    socket_task.abort();
    let _ = socket_task.await;
    drop(pid_file);

    presenter.daemon_status("Stopped");
    ExitCode::from(EXIT_SUCCESS)
}
