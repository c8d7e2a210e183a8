//! Signal handlers feeding the control loop

use colored::Colorize;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::warn;

use crate::application::ControlCommand;

/// Exit code when a second interrupt aborts finalization
pub const EXIT_INTERRUPTED: i32 = 130;

/// Install OS signal handlers.
///
/// - SIGINT/SIGTERM: final stop, then exit once the segment is written.
///   A second SIGINT exits immediately.
/// - SIGUSR1: toggle (start, pause or resume).
pub fn install_signal_handlers(tx: mpsc::Sender<ControlCommand>) -> Result<(), std::io::Error> {
    // SIGINT (Ctrl+C)
    let tx_int = tx.clone();
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::spawn(async move {
        sigint.recv().await;
        eprintln!("{} Received SIGINT, finishing segment", "↓".cyan());
        let _ = tx_int.send(ControlCommand::Shutdown).await;

        sigint.recv().await;
        warn!("second interrupt, exiting without waiting for the recorder");
        std::process::exit(EXIT_INTERRUPTED);
    });

    // SIGTERM (shutdown)
    let tx_term = tx.clone();
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::spawn(async move {
        sigterm.recv().await;
        eprintln!("{} Received SIGTERM (shutdown)", "↓".cyan());
        let _ = tx_term.send(ControlCommand::Shutdown).await;
    });

    // SIGUSR1 (toggle), may arrive any number of times
    let mut sigusr1 = signal(SignalKind::user_defined1())?;
    tokio::spawn(async move {
        while sigusr1.recv().await.is_some() {
            if tx.send(ControlCommand::Toggle).await.is_err() {
                break;
            }
        }
    });

    Ok(())
}
